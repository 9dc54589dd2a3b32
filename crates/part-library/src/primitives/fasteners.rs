use part_core::SolidRecipe;
use tracing::debug;

use crate::error::BuildError;
use crate::params::ArgValue;
use crate::profiles::{hex_circumradius, hex_profile, through_bore};
use crate::validate::{require_less, require_positive, through_margin};

/// ISO 4014 hex bolt heads: nominal diameter, across flats `s`, head height `k`.
const ISO_4014_HEADS: &[(u32, f64, f64)] = &[
    (3, 5.5, 2.0),
    (4, 7.0, 2.8),
    (5, 8.0, 3.5),
    (6, 10.0, 4.0),
    (8, 13.0, 5.3),
    (10, 16.0, 6.4),
    (12, 18.0, 7.5),
    (16, 24.0, 10.0),
    (20, 30.0, 12.5),
    (24, 36.0, 15.0),
];

pub fn make_hex_prism(flat: f64, thickness: f64) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_hex_prism";
    require_positive(NAME, "flat", flat)?;
    require_positive(NAME, "thickness", thickness)?;
    Ok(SolidRecipe::prism(hex_profile(flat), thickness))
}

pub fn make_hex_nut(flat: f64, thickness: f64, hole_radius: f64) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_hex_nut";
    require_positive(NAME, "flat", flat)?;
    require_positive(NAME, "thickness", thickness)?;
    require_positive(NAME, "hole_radius", hole_radius)?;
    require_less(NAME, ("hole diameter", 2.0 * hole_radius), ("flat", flat))?;
    let body = SolidRecipe::prism(hex_profile(flat), thickness);
    Ok(body.cut(through_bore(hole_radius, thickness, through_margin(thickness))))
}

/// Cylindrical shaft from z = 0 with a hex head on top.
pub fn make_hex_bolt(
    shaft_radius: f64,
    shaft_length: f64,
    head_flat: f64,
    head_thickness: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_hex_bolt";
    require_positive(NAME, "shaft_radius", shaft_radius)?;
    require_positive(NAME, "shaft_length", shaft_length)?;
    require_positive(NAME, "head_flat", head_flat)?;
    require_positive(NAME, "head_thickness", head_thickness)?;
    require_less(NAME, ("shaft diameter", 2.0 * shaft_radius), ("head_flat", head_flat))?;
    Ok(SolidRecipe::fuse(vec![
        SolidRecipe::cylinder(shaft_radius, shaft_length),
        SolidRecipe::prism(hex_profile(head_flat), head_thickness)
            .translate([0.0, 0.0, shaft_length]),
    ]))
}

/// Parses `M8`, `m8`, `"8"` or `8` into a nominal diameter.
pub fn parse_thread_size(value: &ArgValue) -> Option<u32> {
    match value {
        ArgValue::Number(number) if *number > 0.0 && number.fract() == 0.0 => Some(*number as u32),
        ArgValue::Text(text) => {
            let trimmed = text.trim();
            let digits = trimmed
                .strip_prefix('M')
                .or_else(|| trimmed.strip_prefix('m'))
                .unwrap_or(trimmed);
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Standard hex bolt with head dimensions taken from ISO 4014.
pub fn make_fasteners_hex_bolt(size: &ArgValue, length_mm: f64) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_fasteners_hex_bolt";
    require_positive(NAME, "length_mm", length_mm)?;
    let nominal = parse_thread_size(size)
        .ok_or_else(|| BuildError::invalid(NAME, format!("size {size} is not a metric size")))?;
    let (_, flat, head) = ISO_4014_HEADS
        .iter()
        .find(|(d, _, _)| *d == nominal)
        .copied()
        .ok_or_else(|| {
            let known: Vec<String> = ISO_4014_HEADS.iter().map(|(d, _, _)| format!("M{d}")).collect();
            BuildError::invalid(
                NAME,
                format!("size M{nominal} is not tabulated; use one of {}", known.join(", ")),
            )
        })?;
    debug!(size = nominal, flat, head, "resolved ISO 4014 head");
    make_hex_bolt(f64::from(nominal) / 2.0, length_mm, flat, head)
        .map_err(|error| BuildError::invalid(NAME, error.to_string()))
}

/// Plain cylindrical head on a shaft; the head spans
/// `shaft_length..shaft_length + head_height`.
pub fn make_screw_blank(
    shaft_diameter: f64,
    shaft_length: f64,
    head_diameter: f64,
    head_height: f64,
) -> Result<SolidRecipe, BuildError> {
    screw_blank("make_screw_blank", shaft_diameter, shaft_length, head_diameter, head_height)
}

fn screw_blank(
    name: &'static str,
    shaft_diameter: f64,
    shaft_length: f64,
    head_diameter: f64,
    head_height: f64,
) -> Result<SolidRecipe, BuildError> {
    require_positive(name, "shaft_diameter", shaft_diameter)?;
    require_positive(name, "shaft_length", shaft_length)?;
    require_positive(name, "head_diameter", head_diameter)?;
    require_positive(name, "head_height", head_height)?;
    require_less(
        name,
        ("shaft_diameter", shaft_diameter),
        ("head_diameter", head_diameter),
    )?;
    Ok(SolidRecipe::fuse(vec![
        SolidRecipe::cylinder(shaft_diameter / 2.0, shaft_length),
        SolidRecipe::cylinder(head_diameter / 2.0, head_height)
            .translate([0.0, 0.0, shaft_length]),
    ]))
}

/// Straight slot across the head top, running along X.
fn head_slot(
    name: &'static str,
    top: f64,
    head_diameter: f64,
    head_height: f64,
    slot_width: f64,
    slot_depth: f64,
) -> Result<SolidRecipe, BuildError> {
    require_positive(name, "slot_width", slot_width)?;
    require_positive(name, "slot_depth", slot_depth)?;
    require_less(name, ("slot_width", slot_width), ("head_diameter", head_diameter))?;
    require_less(name, ("slot_depth", slot_depth), ("head_height", head_height))?;
    let slot_length = head_diameter * 1.2;
    let margin = through_margin(head_height);
    Ok(
        SolidRecipe::cuboid([slot_length, slot_width, slot_depth + margin]).translate([
            -slot_length / 2.0,
            -slot_width / 2.0,
            top - slot_depth,
        ]),
    )
}

pub fn make_slotted_screw(
    shaft_diameter: f64,
    shaft_length: f64,
    head_diameter: f64,
    head_height: f64,
    slot_width: f64,
    slot_depth: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_slotted_screw";
    let blank = screw_blank(NAME, shaft_diameter, shaft_length, head_diameter, head_height)?;
    let top = shaft_length + head_height;
    let slot = head_slot(NAME, top, head_diameter, head_height, slot_width, slot_depth)?;
    Ok(blank.cut(slot))
}

/// Slotted screw with a second slot rotated 90° about the screw axis.
pub fn make_cross_screw(
    shaft_diameter: f64,
    shaft_length: f64,
    head_diameter: f64,
    head_height: f64,
    slot_width: f64,
    slot_depth: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_cross_screw";
    let blank = screw_blank(NAME, shaft_diameter, shaft_length, head_diameter, head_height)?;
    let top = shaft_length + head_height;
    let slot = head_slot(NAME, top, head_diameter, head_height, slot_width, slot_depth)?;
    let cross = SolidRecipe::fuse(vec![slot.clone(), slot.rotate_z(90.0)]);
    Ok(blank.cut(cross))
}

/// Screw blank with a hex socket sunk 60 % of the head height into its top.
pub fn make_socket_head_screw(
    shaft_diameter: f64,
    shaft_length: f64,
    head_diameter: f64,
    head_height: f64,
    socket_flat: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_socket_head_screw";
    let blank = screw_blank(NAME, shaft_diameter, shaft_length, head_diameter, head_height)?;
    require_positive(NAME, "socket_flat", socket_flat)?;
    require_less(
        NAME,
        ("socket corner diameter", 2.0 * hex_circumradius(socket_flat)),
        ("head_diameter", head_diameter),
    )?;
    let depth = head_height * 0.6;
    let margin = through_margin(head_height);
    let socket = SolidRecipe::prism(hex_profile(socket_flat), depth + margin).translate([
        0.0,
        0.0,
        shaft_length + head_height - depth,
    ]);
    Ok(blank.cut(socket))
}

#[cfg(test)]
mod tests {
    use part_core::{SdfKernel, SdfSolid, SolidRecipe, realize};

    use super::{
        make_cross_screw, make_fasteners_hex_bolt, make_hex_bolt, make_hex_nut, make_hex_prism,
        make_slotted_screw, make_socket_head_screw, parse_thread_size,
    };
    use crate::params::ArgValue;

    fn solid(recipe: &SolidRecipe) -> SdfSolid {
        realize(&mut SdfKernel::new(), recipe).expect("recipe should realize")
    }

    #[test]
    fn hex_prism_spans_across_flats_in_y() {
        let prism = solid(&make_hex_prism(10.0, 4.0).expect("valid hex"));
        assert!(prism.contains([0.0, 4.9, 2.0]));
        assert!(!prism.contains([0.0, 5.1, 2.0]));
        assert!(prism.contains([5.7, 0.0, 2.0]));
    }

    #[test]
    fn nut_hole_must_leave_material() {
        let nut = solid(&make_hex_nut(13.0, 6.5, 4.0).expect("valid nut"));
        assert!(!nut.contains([0.0, 0.0, 3.0]));
        assert!(nut.contains([5.0, 0.0, 3.0]));
        assert!(make_hex_nut(13.0, 6.5, 6.5).is_err());
    }

    #[test]
    fn bolt_head_sits_on_top_of_shaft() {
        let bolt = solid(&make_hex_bolt(4.0, 30.0, 13.0, 5.0).expect("valid bolt"));
        assert!(bolt.contains([0.0, 6.0, 32.0]));
        assert!(!bolt.contains([0.0, 6.0, 10.0]));
        assert!((bolt.bounds().max[2] - 35.0).abs() < 1e-12);
        assert!(make_hex_bolt(7.0, 30.0, 13.0, 5.0).is_err());
    }

    #[test]
    fn iso_bolt_uses_tabulated_head() {
        let size = ArgValue::Text("M8".to_string());
        let recipe = make_fasteners_hex_bolt(&size, 40.0).expect("M8 is tabulated");
        assert_eq!(recipe, make_hex_bolt(4.0, 40.0, 13.0, 5.3).expect("valid bolt"));

        assert_eq!(parse_thread_size(&ArgValue::Number(10.0)), Some(10));
        assert_eq!(parse_thread_size(&ArgValue::Text("m12".to_string())), Some(12));
        assert!(make_fasteners_hex_bolt(&ArgValue::Text("M7".to_string()), 40.0).is_err());
        assert!(make_fasteners_hex_bolt(&ArgValue::Text("bolt".to_string()), 40.0).is_err());
    }

    #[test]
    fn slotted_screw_cuts_across_the_head_top() {
        let screw = solid(&make_slotted_screw(6.0, 20.0, 10.0, 4.0, 1.5, 2.0).expect("valid"));
        assert!(!screw.contains([3.0, 0.0, 23.5]));
        assert!(screw.contains([0.0, 3.0, 23.5]));
        assert!(screw.contains([3.0, 0.0, 21.5]));
        assert!(make_slotted_screw(6.0, 20.0, 10.0, 4.0, 1.5, 4.0).is_err());
    }

    #[test]
    fn cross_screw_has_both_slots() {
        let screw = solid(&make_cross_screw(6.0, 20.0, 10.0, 4.0, 1.5, 2.0).expect("valid"));
        assert!(!screw.contains([3.0, 0.0, 23.5]));
        assert!(!screw.contains([0.0, 3.0, 23.5]));
        assert!(screw.contains([3.0, 3.0, 23.5]));
    }

    #[test]
    fn socket_is_hex_and_blind() {
        let screw = solid(&make_socket_head_screw(8.0, 30.0, 13.0, 8.0, 6.0).expect("valid"));
        assert!(!screw.contains([0.0, 0.0, 37.0]));
        assert!(screw.contains([0.0, 0.0, 32.0]));
        assert!(make_socket_head_screw(8.0, 30.0, 13.0, 8.0, 12.0).is_err());
    }
}
