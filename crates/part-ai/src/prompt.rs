use std::fmt::Write as _;

use part_dsl::{DISPLAY_HOOK, RESULT_VARIABLE};
use part_library::Registry;

/// First-line prefix a generator uses to ask the user for a missing detail.
pub const CLARIFICATION_MARKER: &str = "NEED_CLARIFICATION:";

/// First-line prefix a generator uses when no primitive family fits.
pub const UNSUPPORTED_MARKER: &str = "UNSUPPORTED_PART:";

const FAMILY_RULES: &[(&str, &str)] = &[
    ("a cylinder with a hole or a stated hole depth", "make_cyl_with_hole"),
    ("a rectangular tube, hollow box section or frame member", "make_rect_tube"),
    ("a pipe, hollow roller or tube with a bore", "make_pipe"),
    ("a shaft with two or three diameters along its length", "make_stepped_shaft"),
    ("a keyed shaft or a shaft with a keyway", "make_shaft_with_keyway"),
    ("a flat bar or link with two end holes", "make_flat_bar_2holes"),
    ("a plate with a long slot or oblong hole", "make_plate_with_slot"),
    ("a plate with a shallow rectangular recess or pocket", "make_plate_with_pocket"),
    ("a drum, spool or roller with flanges", "make_drum_with_flange"),
    ("a standard metric bolt given as M-size and length", "make_fasteners_hex_bolt"),
    ("a belt pulley or sheave", "make_v_pulley"),
    ("an angle bracket or L-shaped bracket", "make_L_bracket"),
];

/// Renders the system prompt from the registry, so the documented calls and
/// the callable ones are the same list.
pub fn system_prompt(registry: &Registry) -> String {
    let mut prompt = String::from(
        "You turn a short description of a mechanical part into a call to ONE helper \
         function that builds it as a 3D solid, and then display it.\n\
         Treat the description case-insensitively. All dimensions are millimetres, \
         angles are degrees.\n\nAllowed helper calls:\n",
    );

    for spec in registry.iter() {
        let _ = writeln!(prompt, "- {}", spec.signature());
        let _ = writeln!(prompt, "    {}", spec.summary);
    }

    prompt.push_str("\nRules:\n");
    prompt.push_str("- Helpers are already available. Do not write import or from statements.\n");
    let _ = writeln!(
        prompt,
        "- Do not call any other function except {DISPLAY_HOOK}({RESULT_VARIABLE})."
    );
    prompt.push_str("- Arguments are plain numbers (or a size such as \"M8\" where noted).\n");
    prompt.push_str("- Parameters written as name=value may be left out to use that value.\n");
    for (family, helper) in FAMILY_RULES {
        if registry.contains(helper) {
            let _ = writeln!(prompt, "- For {family}, ALWAYS use {helper}(...).");
        }
    }
    let _ = writeln!(
        prompt,
        "- If the part fits a helper but a deciding detail is missing, reply with one line:\n    \
         {CLARIFICATION_MARKER} <the question to ask>"
    );
    let _ = writeln!(
        prompt,
        "- If no helper can build the part, reply with one line:\n    \
         {UNSUPPORTED_MARKER} <short reason>"
    );

    prompt.push_str("\nOutput format:\n");
    let _ = writeln!(
        prompt,
        "- Exactly one assignment:\n    {RESULT_VARIABLE} = <ONE allowed helper call>"
    );
    let _ = writeln!(prompt, "- Then exactly:\n    {DISPLAY_HOOK}({RESULT_VARIABLE})");
    prompt.push_str("- Output only those two lines: no comments, no prose, no code fences.\n");
    prompt
}

pub fn user_prompt(description: &str) -> String {
    format!("Create this part: {}", description.trim())
}
