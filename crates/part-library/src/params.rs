use std::fmt;

use serde::Serialize;

use crate::error::BuildError;

/// Largest value a [`ParamKind::Count`] parameter accepts.
pub const MAX_COUNT: u32 = 360;

/// What a parameter measures; drives type checks and the prompt signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Millimetres.
    Length,
    /// Whole number from 0 to [`MAX_COUNT`].
    Count,
    /// Degrees.
    Angle,
    /// Metric thread designation, `M8` or `8`.
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "presence", content = "default")]
pub enum Presence {
    Required,
    Defaulted(f64),
    /// Absent means the feature is not present.
    Omittable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    #[serde(flatten)]
    pub presence: Presence,
    /// Second keyword accepted for this parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<&'static str>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
            alias: None,
        }
    }

    pub const fn defaulted(name: &'static str, kind: ParamKind, default: f64) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Defaulted(default),
            alias: None,
        }
    }

    pub const fn omittable(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Omittable,
            alias: None,
        }
    }

    pub const fn with_alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Whether `keyword` names this parameter, directly or through its alias.
    pub fn answers_to(&self, keyword: &str) -> bool {
        self.name == keyword || self.alias == Some(keyword)
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.presence {
            Presence::Required => f.write_str(self.name),
            Presence::Defaulted(value) if self.kind == ParamKind::Count => {
                write!(f, "{}={}", self.name, value.round())
            }
            Presence::Defaulted(value) => write!(f, "{}={}", self.name, format_number(value)),
            Presence::Omittable => write!(f, "{}=None", self.name),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// One argument value as written in a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Number(f64),
    Text(String),
    None,
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::None => f.write_str("None"),
        }
    }
}

/// Argument vector bound against a primitive's parameter list, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    primitive: &'static str,
    params: &'static [ParamSpec],
    values: Vec<Option<ArgValue>>,
}

impl Arguments {
    /// Binds positional then keyword arguments.
    ///
    /// Trailing defaulted or omittable parameters may be left out; `None` counts
    /// as left out. Every required parameter must end up with a value.
    pub fn bind(
        primitive: &'static str,
        params: &'static [ParamSpec],
        positional: Vec<ArgValue>,
        keywords: Vec<(String, ArgValue)>,
    ) -> Result<Self, BuildError> {
        let given = positional.len() + keywords.len();
        if positional.len() > params.len() {
            return Err(BuildError::TooManyArguments {
                primitive,
                expected: params.len(),
                got: given,
            });
        }

        let mut values: Vec<Option<ArgValue>> = vec![None; params.len()];
        for (slot, value) in values.iter_mut().zip(positional) {
            *slot = Some(value);
        }
        for (name, value) in keywords {
            let index = params
                .iter()
                .position(|param| param.answers_to(&name))
                .ok_or_else(|| BuildError::UnknownParameter {
                    primitive,
                    param: name.clone(),
                })?;
            if values[index].is_some() {
                return Err(BuildError::DuplicateArgument {
                    primitive,
                    param: params[index].name,
                });
            }
            values[index] = Some(value);
        }

        for (param, slot) in params.iter().zip(values.iter_mut()) {
            if matches!(slot, None | Some(ArgValue::None)) {
                *slot = match param.presence {
                    Presence::Required => {
                        return Err(BuildError::MissingArgument {
                            primitive,
                            param: param.name,
                        });
                    }
                    Presence::Defaulted(default) => Some(ArgValue::Number(default)),
                    Presence::Omittable => None,
                };
            }
            match (param.kind, slot.as_ref()) {
                (ParamKind::Size, _) | (_, None) => {}
                (_, Some(ArgValue::Text(_))) => {
                    return Err(BuildError::WrongType {
                        primitive,
                        param: param.name,
                        expected: "a number",
                    });
                }
                (_, Some(ArgValue::Number(value))) if !value.is_finite() => {
                    return Err(BuildError::invalid(
                        primitive,
                        format!("{} must be finite", param.name),
                    ));
                }
                _ => {}
            }
        }

        Ok(Self {
            primitive,
            params,
            values,
        })
    }

    pub fn primitive(&self) -> &'static str {
        self.primitive
    }

    fn slot(&self, name: &str) -> Result<Option<&ArgValue>, BuildError> {
        let index = self
            .params
            .iter()
            .position(|param| param.name == name)
            .ok_or_else(|| BuildError::UnknownParameter {
                primitive: self.primitive,
                param: name.to_string(),
            })?;
        Ok(self.values[index].as_ref())
    }

    /// Value of a required or defaulted numeric parameter.
    pub fn number(&self, name: &str) -> Result<f64, BuildError> {
        self.optional(name)?.ok_or_else(|| {
            BuildError::invalid(self.primitive, format!("{name} has no value"))
        })
    }

    /// Value of an omittable numeric parameter.
    pub fn optional(&self, name: &str) -> Result<Option<f64>, BuildError> {
        match self.slot(name)? {
            Some(ArgValue::Number(value)) => Ok(Some(*value)),
            Some(ArgValue::Text(_)) => Err(BuildError::invalid(
                self.primitive,
                format!("{name} must be a number"),
            )),
            Some(ArgValue::None) | None => Ok(None),
        }
    }

    /// Value of a count parameter; must be a whole number up to [`MAX_COUNT`].
    pub fn count(&self, name: &str) -> Result<u32, BuildError> {
        let value = self.number(name)?;
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(MAX_COUNT) {
            return Err(BuildError::invalid(
                self.primitive,
                format!("{name} must be a whole number from 0 to {MAX_COUNT}, got {value}"),
            ));
        }
        Ok(value as u32)
    }

    /// Raw value of a parameter, for kinds that accept text.
    pub fn raw(&self, name: &str) -> Result<Option<&ArgValue>, BuildError> {
        self.slot(name)
    }

    /// Bound values paired with their parameter names, absent ones skipped.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ArgValue)> + '_ {
        self.params
            .iter()
            .zip(&self.values)
            .filter_map(|(param, value)| value.as_ref().map(|value| (param.name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::{ArgValue, Arguments, MAX_COUNT, ParamKind, ParamSpec};
    use crate::error::BuildError;

    const PARAMS: &[ParamSpec] = &[
        ParamSpec::required("length", ParamKind::Length),
        ParamSpec::required("width", ParamKind::Length),
        ParamSpec::defaulted("count", ParamKind::Count, 2.0),
        ParamSpec::omittable("extra", ParamKind::Length),
    ];

    fn n(value: f64) -> ArgValue {
        ArgValue::Number(value)
    }

    #[test]
    fn trailing_optional_parameters_may_be_left_out() {
        let args = Arguments::bind("demo", PARAMS, vec![n(10.0), n(5.0)], Vec::new())
            .expect("binding should succeed");
        assert_eq!(args.number("length").expect("length"), 10.0);
        assert_eq!(args.count("count").expect("count"), 2);
        assert_eq!(args.optional("extra").expect("extra"), None);
    }

    #[test]
    fn keywords_bind_by_name_and_none_means_absent() {
        let args = Arguments::bind(
            "demo",
            PARAMS,
            vec![n(10.0)],
            vec![
                ("extra".to_string(), n(3.0)),
                ("width".to_string(), n(4.0)),
                ("count".to_string(), ArgValue::None),
            ],
        )
        .expect("binding should succeed");
        assert_eq!(args.number("width").expect("width"), 4.0);
        assert_eq!(args.optional("extra").expect("extra"), Some(3.0));
        assert_eq!(args.count("count").expect("count"), 2);
    }

    #[test]
    fn arity_violations_are_reported() {
        let missing = Arguments::bind("demo", PARAMS, vec![n(1.0)], Vec::new())
            .expect_err("width is required");
        assert_eq!(
            missing,
            BuildError::MissingArgument {
                primitive: "demo",
                param: "width"
            }
        );

        let too_many = Arguments::bind(
            "demo",
            PARAMS,
            vec![n(1.0), n(1.0), n(1.0), n(1.0), n(1.0)],
            Vec::new(),
        )
        .expect_err("five positional arguments exceed four parameters");
        assert!(matches!(too_many, BuildError::TooManyArguments { got: 5, .. }));

        let duplicate = Arguments::bind(
            "demo",
            PARAMS,
            vec![n(1.0), n(2.0)],
            vec![("length".to_string(), n(3.0))],
        )
        .expect_err("length bound twice");
        assert!(matches!(duplicate, BuildError::DuplicateArgument { param: "length", .. }));

        let unknown = Arguments::bind(
            "demo",
            PARAMS,
            vec![n(1.0), n(2.0)],
            vec![("depth".to_string(), n(3.0))],
        )
        .expect_err("depth is not a parameter");
        assert!(matches!(unknown, BuildError::UnknownParameter { .. }));
    }

    #[test]
    fn text_is_rejected_for_lengths_and_fractional_counts_for_counts() {
        let text = Arguments::bind(
            "demo",
            PARAMS,
            vec![ArgValue::Text("ten".to_string()), n(2.0)],
            Vec::new(),
        )
        .expect_err("length must be numeric");
        assert!(matches!(text, BuildError::WrongType { param: "length", .. }));

        let args = Arguments::bind("demo", PARAMS, vec![n(1.0), n(2.0), n(2.5)], Vec::new())
            .expect("binding should succeed");
        assert!(args.count("count").is_err());
    }

    #[test]
    fn signature_fragments_show_defaults() {
        let rendered: Vec<String> = PARAMS.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["length", "width", "count=2", "extra=None"]);
    }

    const ALIASED: &[ParamSpec] = &[
        ParamSpec::required("radius", ParamKind::Length),
        ParamSpec::required("hole_depth", ParamKind::Length).with_alias("depth"),
    ];

    #[test]
    fn alias_binds_to_its_parameter_once() {
        let args = Arguments::bind("demo", ALIASED, vec![n(4.0)], vec![("depth".to_string(), n(12.0))])
            .expect("alias binds");
        assert_eq!(args.number("hole_depth").expect("hole_depth"), 12.0);

        let both = Arguments::bind(
            "demo",
            ALIASED,
            vec![n(4.0)],
            vec![("hole_depth".to_string(), n(12.0)), ("depth".to_string(), n(10.0))],
        )
        .expect_err("both spellings given");
        assert!(matches!(both, BuildError::DuplicateArgument { param: "hole_depth", .. }));
    }

    #[test]
    fn counts_are_bounded() {
        let at_limit = Arguments::bind(
            "demo",
            PARAMS,
            vec![n(1.0), n(2.0), n(f64::from(MAX_COUNT))],
            Vec::new(),
        )
        .expect("binding should succeed");
        assert_eq!(at_limit.count("count").expect("count"), MAX_COUNT);

        let over = Arguments::bind(
            "demo",
            PARAMS,
            vec![n(1.0), n(2.0), n(f64::from(MAX_COUNT) + 1.0)],
            Vec::new(),
        )
        .expect("binding should succeed");
        let error = over.count("count").expect_err("over the limit");
        assert!(error.to_string().contains("from 0 to 360"));
    }
}
