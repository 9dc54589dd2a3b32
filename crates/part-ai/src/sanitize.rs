use std::sync::LazyLock;

use part_dsl::{
    DISPLAY_HOOK, DslError, ExecutionError, Namespace, NormalizedProgram, RESULT_VARIABLE,
    parse_program,
};
use part_library::{BuildError, Registry};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// A call whose argument list contains no nested parentheses.
static CALL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(([^()]*)\)").expect("valid call pattern")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SanitizeError {
    #[error("generator did not return an allowed helper call")]
    NoValidCall { raw: String },
    #[error("arguments of `{call}` are not constant values: {source}")]
    MalformedArguments { call: String, source: DslError },
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] BuildError),
}

/// Joins the lines that can carry code, dropping blanks, imports and code
/// fences.
pub fn code_stream(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !line.starts_with("import ")
                && !line.starts_with("from ")
                && !line.starts_with("```")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First allow-listed `name(args)` in `raw`, left to right, as
/// `(name, trimmed args)`.
pub fn extract_call<'t>(text: &'t str, registry: &Registry) -> Option<(&'t str, &'t str)> {
    CALL_PATTERN.captures_iter(text).find_map(|caps| {
        let name = caps.get(1)?.as_str();
        let args = caps.get(2)?.as_str().trim();
        registry.contains(name).then_some((name, args))
    })
}

/// Reduces generator output to `shape = <call>` / `Part.show(shape)`.
///
/// Argument text is kept exactly as generated. The bound argument vector is
/// checked against the primitive's arity here, so a program that leaves
/// this function never misses a required parameter.
pub fn sanitize(raw: &str, registry: &Registry) -> Result<NormalizedProgram, SanitizeError> {
    let stream = code_stream(raw);
    let (name, args) = extract_call(&stream, registry).ok_or_else(|| SanitizeError::NoValidCall {
        raw: raw.to_string(),
    })?;
    let call = format!("{name}({args})");
    let source = format!("{RESULT_VARIABLE} = {call}\n{DISPLAY_HOOK}({RESULT_VARIABLE})");

    let program = parse_program(&source).map_err(|source| SanitizeError::MalformedArguments {
        call: call.clone(),
        source,
    })?;
    Namespace::new(*registry)
        .bind(&program.call)
        .map_err(|err| match err {
            ExecutionError::InvalidParameters(build) => SanitizeError::InvalidParameters(build),
            ExecutionError::Syntax(source) => SanitizeError::MalformedArguments {
                call: call.clone(),
                source,
            },
            _ => SanitizeError::NoValidCall {
                raw: raw.to_string(),
            },
        })?;

    debug!(call = %call, "sanitized generator output");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use part_library::{BuildError, Registry};
    use proptest::prelude::*;

    use super::{SanitizeError, code_stream, extract_call, sanitize};

    fn sanitized(raw: &str) -> String {
        sanitize(raw, &Registry::standard())
            .expect("sanitize")
            .to_source()
    }

    #[test]
    fn normalized_flange_program_passes_through_unchanged() {
        let raw = "shape = make_flange(80,40,8,60,8,6)\nPart.show(shape)";
        assert_eq!(sanitized(raw), raw);
    }

    #[test]
    fn call_nested_in_display_is_extracted() {
        assert_eq!(
            sanitized("Part.show(make_box(10, 20, 30))"),
            "shape = make_box(10, 20, 30)\nPart.show(shape)"
        );
    }

    #[test]
    fn imports_fences_and_blank_lines_are_dropped() {
        let raw = "```python\nimport FreeCAD, Part\nfrom cad_primitives import *\n\nresult = make_cylinder(5, 20)\nPart.show(result)\n```";
        assert_eq!(
            code_stream(raw),
            "result = make_cylinder(5, 20) Part.show(result)"
        );
        assert_eq!(sanitized(raw), "shape = make_cylinder(5, 20)\nPart.show(shape)");
    }

    #[test]
    fn first_allowed_call_wins() {
        let raw = "Use make_pipe(30, 20, 100) or maybe make_box(1, 2, 3)";
        assert_eq!(sanitized(raw), "shape = make_pipe(30, 20, 100)\nPart.show(shape)");

        let reversed = "make_box(1, 2, 3)\nmake_pipe(30, 20, 100)";
        assert_eq!(sanitized(reversed), "shape = make_box(1, 2, 3)\nPart.show(shape)");
    }

    #[test]
    fn unknown_calls_are_skipped_before_the_first_allowed_one() {
        let registry = Registry::standard();
        let found = extract_call("print(x) Part.show(y) make_hex_nut( 13, 6.5, 4 )", &registry);
        assert_eq!(found, Some(("make_hex_nut", "13, 6.5, 4")));
    }

    #[test]
    fn keyword_arguments_are_preserved_verbatim() {
        let raw = "shape = make_cyl_with_hole(outer_radius=10, height=20, hole_radius=4, hole_depth=12)";
        assert_eq!(
            sanitized(raw),
            "shape = make_cyl_with_hole(outer_radius=10, height=20, hole_radius=4, hole_depth=12)\nPart.show(shape)"
        );
    }

    #[test]
    fn short_depth_keyword_is_accepted_for_cylinder_holes() {
        let raw = "shape = make_cyl_with_hole(10, 20, 4, depth=12)";
        assert_eq!(sanitized(raw), format!("{raw}\nPart.show(shape)"));

        let err = sanitize(
            "make_cyl_with_hole(10, 20, 4, hole_depth=12, depth=12)",
            &Registry::standard(),
        )
        .expect_err("both spellings");
        assert!(
            matches!(
                err,
                SanitizeError::InvalidParameters(BuildError::DuplicateArgument {
                    param: "hole_depth",
                    ..
                })
            ),
            "{err:?}"
        );
    }

    #[test]
    fn text_without_allowed_call_is_rejected_with_raw_text() {
        let raw = "shape = Part.makeSphere(10)\nPart.show(shape)";
        let err = sanitize(raw, &Registry::standard()).expect_err("no helper");
        assert_eq!(
            err,
            SanitizeError::NoValidCall {
                raw: raw.to_string()
            }
        );
    }

    #[test]
    fn missing_required_parameter_is_caught_at_the_boundary() {
        let err = sanitize("shape = make_box(10, 20)", &Registry::standard()).expect_err("arity");
        assert_eq!(
            err,
            SanitizeError::InvalidParameters(BuildError::MissingArgument {
                primitive: "make_box",
                param: "H",
            })
        );
    }

    #[test]
    fn non_constant_arguments_are_malformed() {
        let err = sanitize("shape = make_box(length, 20, 30)", &Registry::standard())
            .expect_err("variable argument");
        assert!(matches!(err, SanitizeError::MalformedArguments { .. }), "{err:?}");
    }

    fn valid_call() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u32..500, 1u32..500, 1u32..500).prop_map(|(l, w, h)| format!("make_box({l}, {w}, {h})")),
            (1u32..100, 1u32..100).prop_map(|(r, h)| format!("make_cylinder(radius={r}, height={h})")),
            (2u32..100, 1u32..50).prop_map(|(d, l)| format!("make_stepped_shaft({d}, {l}, {}, {l})", d + 1)),
            (1u32..40).prop_map(|l| format!("make_fasteners_hex_bolt(\"M8\", {l})")),
        ]
    }

    proptest! {
        #[test]
        fn sanitizing_is_idempotent(
            call in valid_call(),
            before in "[a-z ,.]{0,30}",
            after in "[a-z ,.]{0,30}",
        ) {
            let registry = Registry::standard();
            let raw = format!("{before}\nHere it is: {call} {after}\nPart.show(shape)");
            let once = sanitize(&raw, &registry).expect("first pass").to_source();
            let twice = sanitize(&once, &registry).expect("second pass").to_source();
            prop_assert_eq!(once, twice);
        }
    }
}
