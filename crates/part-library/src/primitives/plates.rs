use part_core::SolidRecipe;

use crate::error::BuildError;
use crate::validate::{ensure, require_less, require_positive, through_margin};

pub fn make_box(length: f64, width: f64, height: f64) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_box";
    require_positive(NAME, "L", length)?;
    require_positive(NAME, "W", width)?;
    require_positive(NAME, "H", height)?;
    Ok(SolidRecipe::cuboid([length, width, height]))
}

/// Isosceles triangle `(0,0) (base,0) (base/2,height)` extruded along +Z.
pub fn make_tri_prism(base: f64, height: f64, thickness: f64) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_tri_prism";
    require_positive(NAME, "base", base)?;
    require_positive(NAME, "height", height)?;
    require_positive(NAME, "thickness", thickness)?;
    Ok(SolidRecipe::prism(
        vec![[0.0, 0.0], [base, 0.0], [base / 2.0, height]],
        thickness,
    ))
}

/// Plate with one centred through hole; no hole when `hole_radius <= 0`.
pub fn make_plate_with_hole(
    length: f64,
    width: f64,
    thickness: f64,
    hole_radius: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_plate_with_hole";
    let plate = make_plate(NAME, length, width, thickness)?;
    if hole_radius <= 0.0 {
        return Ok(plate);
    }
    require_less(
        NAME,
        ("hole diameter", 2.0 * hole_radius),
        ("smaller plate side", length.min(width)),
    )?;
    let margin = through_margin(thickness);
    let hole = SolidRecipe::cylinder(hole_radius, thickness + 2.0 * margin).translate([
        length / 2.0,
        width / 2.0,
        -margin,
    ]);
    Ok(plate.cut(hole))
}

/// Plate with one oblong slot along its length, centred in width.
///
/// The slot's rounded ends stop `edge_offset` short of each short edge.
pub fn make_plate_with_slot(
    length: f64,
    width: f64,
    thickness: f64,
    slot_width: f64,
    edge_offset: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_plate_with_slot";
    let plate = make_plate(NAME, length, width, thickness)?;
    require_positive(NAME, "slot_width", slot_width)?;
    require_positive(NAME, "edge_offset", edge_offset)?;
    require_less(NAME, ("slot_width", slot_width), ("W", width))?;
    let straight = length - 2.0 * edge_offset - slot_width;
    ensure(NAME, straight > 0.0, || {
        format!(
            "slot does not fit: L - 2*edge_offset ({}) must exceed slot_width ({slot_width})",
            length - 2.0 * edge_offset
        )
    })?;

    let margin = through_margin(thickness);
    let height = thickness + 2.0 * margin;
    let r = slot_width / 2.0;
    let (x0, x1, y) = (edge_offset + r, length - edge_offset - r, width / 2.0);
    let slot = SolidRecipe::fuse(vec![
        SolidRecipe::cuboid([straight, slot_width, height]).translate([x0, y - r, -margin]),
        SolidRecipe::cylinder(r, height).translate([x0, y, -margin]),
        SolidRecipe::cylinder(r, height).translate([x1, y, -margin]),
    ]);
    Ok(plate.cut(slot))
}

/// Plate with a centred rectangular recess in its top face.
pub fn make_plate_with_pocket(
    length: f64,
    width: f64,
    thickness: f64,
    pocket_length: f64,
    pocket_width: f64,
    pocket_depth: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_plate_with_pocket";
    let plate = make_plate(NAME, length, width, thickness)?;
    require_positive(NAME, "pocket_length", pocket_length)?;
    require_positive(NAME, "pocket_width", pocket_width)?;
    require_positive(NAME, "pocket_depth", pocket_depth)?;
    require_less(NAME, ("pocket_length", pocket_length), ("L", length))?;
    require_less(NAME, ("pocket_width", pocket_width), ("W", width))?;
    require_less(NAME, ("pocket_depth", pocket_depth), ("thickness", thickness))?;

    let margin = through_margin(pocket_depth);
    let pocket = SolidRecipe::cuboid([pocket_length, pocket_width, pocket_depth + margin])
        .translate([
            (length - pocket_length) / 2.0,
            (width - pocket_width) / 2.0,
            thickness - pocket_depth,
        ]);
    Ok(plate.cut(pocket))
}

fn make_plate(
    name: &'static str,
    length: f64,
    width: f64,
    thickness: f64,
) -> Result<SolidRecipe, BuildError> {
    require_positive(name, "L", length)?;
    require_positive(name, "W", width)?;
    require_positive(name, "thickness", thickness)?;
    Ok(SolidRecipe::cuboid([length, width, thickness]))
}
