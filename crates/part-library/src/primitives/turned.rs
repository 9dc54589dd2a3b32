//! Rotationally symmetric parts built along +Z from the origin.

use part_core::SolidRecipe;
use tracing::debug;

use crate::error::BuildError;
use crate::profiles::{bolt_circle, through_bore};
use crate::validate::{ensure, require_less, require_non_negative, require_positive, through_margin};

/// Groove depth never exceeds this fraction of the outer radius.
const MAX_GROOVE_DEPTH_RATIO: f64 = 0.35;

pub fn make_cylinder(radius: f64, height: f64) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_cylinder";
    require_positive(NAME, "radius", radius)?;
    require_positive(NAME, "height", height)?;
    Ok(SolidRecipe::cylinder(radius, height))
}

/// Cylinder with a coaxial hole opening at its base; `hole_depth >= height`
/// drills straight through.
pub fn make_cyl_with_hole(
    outer_radius: f64,
    height: f64,
    hole_radius: f64,
    hole_depth: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_cyl_with_hole";
    require_positive(NAME, "outer_radius", outer_radius)?;
    require_positive(NAME, "height", height)?;
    require_positive(NAME, "hole_radius", hole_radius)?;
    require_positive(NAME, "hole_depth", hole_depth)?;
    require_less(NAME, ("hole_radius", hole_radius), ("outer_radius", outer_radius))?;

    let margin = through_margin(height);
    let depth = if hole_depth >= height {
        height + margin
    } else {
        hole_depth
    };
    let hole = SolidRecipe::cylinder(hole_radius, depth + margin).translate([0.0, 0.0, -margin]);
    Ok(SolidRecipe::cylinder(outer_radius, height).cut(hole))
}

/// Hollow tube, or a solid round bar when `inner_d <= 0`.
pub fn make_pipe(outer_d: f64, inner_d: f64, length: f64) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_pipe";
    require_positive(NAME, "outer_d", outer_d)?;
    require_positive(NAME, "length", length)?;
    let bar = SolidRecipe::cylinder(outer_d / 2.0, length);
    if inner_d <= 0.0 {
        return Ok(bar);
    }
    require_less(NAME, ("inner_d", inner_d), ("outer_d", outer_d))?;
    Ok(bar.cut(through_bore(inner_d / 2.0, length, through_margin(length))))
}

/// Two or three coaxial segments; segment `i` starts at the summed length of
/// the segments before it. The third segment exists only when both `d3` and
/// `l3` are positive; zero or negative values leave it out like an absent one.
pub fn make_stepped_shaft(
    d1: f64,
    l1: f64,
    d2: f64,
    l2: f64,
    d3: Option<f64>,
    l3: Option<f64>,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_stepped_shaft";
    let mut segments = vec![
        (
            require_positive(NAME, "d1", d1)?,
            require_positive(NAME, "L1", l1)?,
        ),
        (
            require_positive(NAME, "d2", d2)?,
            require_positive(NAME, "L2", l2)?,
        ),
    ];
    let (d3, l3) = (d3.unwrap_or(0.0), l3.unwrap_or(0.0));
    if d3 > 0.0 && l3 > 0.0 {
        segments.push((d3, l3));
    }

    let mut start = 0.0;
    let parts = segments
        .into_iter()
        .map(|(diameter, length)| {
            let segment = SolidRecipe::cylinder(diameter / 2.0, length).translate([0.0, 0.0, start]);
            start += length;
            segment
        })
        .collect();
    Ok(SolidRecipe::fuse(parts))
}

/// Annulus with an optional bolt circle.
///
/// The bolt pattern is applied only when count, circle diameter and hole
/// diameter are all positive; otherwise a plain annulus comes back.
pub fn make_flange(
    outer_d: f64,
    inner_d: f64,
    thickness: f64,
    bolt_circle_d: f64,
    bolt_hole_d: f64,
    bolt_count: u32,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_flange";
    require_positive(NAME, "outer_d", outer_d)?;
    require_positive(NAME, "inner_d", inner_d)?;
    require_positive(NAME, "thickness", thickness)?;
    require_less(NAME, ("inner_d", inner_d), ("outer_d", outer_d))?;

    let margin = 0.1 * thickness;
    let annulus = SolidRecipe::cylinder(outer_d / 2.0, thickness)
        .cut(through_bore(inner_d / 2.0, thickness, margin));
    if bolt_count == 0 || bolt_circle_d <= 0.0 || bolt_hole_d <= 0.0 {
        return Ok(annulus);
    }

    let (r_out, r_in) = (outer_d / 2.0, inner_d / 2.0);
    let (r_bc, r_bh) = (bolt_circle_d / 2.0, bolt_hole_d / 2.0);
    require_less(NAME, ("bolt circle + hole radius", r_bc + r_bh), ("outer radius", r_out))?;
    ensure(NAME, r_bc - r_bh > r_in, || {
        format!("bolt holes ({bolt_hole_d}) on circle {bolt_circle_d} break into the bore ({inner_d})")
    })?;
    if bolt_count > 1 {
        let pitch = 2.0 * r_bc * (std::f64::consts::PI / f64::from(bolt_count)).sin();
        ensure(NAME, pitch > bolt_hole_d, || {
            format!("{bolt_count} holes of {bolt_hole_d} overlap on a {bolt_circle_d} circle")
        })?;
    }

    let holes = bolt_circle(bolt_circle_d, bolt_hole_d, bolt_count, thickness + 2.0 * margin, -margin);
    Ok(annulus.cut(holes))
}

/// Core cylinder with 0, 1 or 2 end flanges and an optional through bore.
pub fn make_drum_with_flange(
    core_d: f64,
    core_length: f64,
    flange_d: f64,
    flange_thickness: f64,
    flange_count: u32,
    bore_d: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_drum_with_flange";
    require_positive(NAME, "core_d", core_d)?;
    require_positive(NAME, "core_length", core_length)?;
    ensure(NAME, flange_count <= 2, || {
        format!("flange_count must be 0, 1 or 2, got {flange_count}")
    })?;
    if flange_count > 0 {
        require_positive(NAME, "flange_thickness", flange_thickness)?;
        require_less(NAME, ("core_d", core_d), ("flange_d", flange_d))?;
    }

    let flange = |z: f64| SolidRecipe::cylinder(flange_d / 2.0, flange_thickness).translate([0.0, 0.0, z]);
    let core_start = if flange_count > 0 { flange_thickness } else { 0.0 };
    let mut parts = Vec::with_capacity(3);
    if flange_count > 0 {
        parts.push(flange(0.0));
    }
    parts.push(SolidRecipe::cylinder(core_d / 2.0, core_length).translate([0.0, 0.0, core_start]));
    if flange_count == 2 {
        parts.push(flange(core_start + core_length));
    }
    let total = core_start + core_length + if flange_count == 2 { flange_thickness } else { 0.0 };
    let drum = SolidRecipe::fuse(parts);

    if bore_d <= 0.0 {
        return Ok(drum);
    }
    require_less(NAME, ("bore_d", bore_d), ("core_d", core_d))?;
    Ok(drum.cut(through_bore(bore_d / 2.0, total, through_margin(total))))
}

/// Shaft along +Z with a straight keyway on its +Y side.
///
/// `key_depth` is measured inward from the outer surface, so the keyway
/// floor sits at `radius - key_depth`.
pub fn make_shaft_with_keyway(
    shaft_diameter: f64,
    shaft_length: f64,
    key_width: f64,
    key_depth: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_shaft_with_keyway";
    require_positive(NAME, "shaft_diameter", shaft_diameter)?;
    require_positive(NAME, "shaft_length", shaft_length)?;
    require_positive(NAME, "key_width", key_width)?;
    require_positive(NAME, "key_depth", key_depth)?;
    let radius = shaft_diameter / 2.0;
    require_less(NAME, ("key_width", key_width), ("shaft_diameter", shaft_diameter))?;
    require_less(NAME, ("key_depth", key_depth), ("shaft radius", radius))?;

    let margin = through_margin(shaft_length);
    let key = SolidRecipe::cuboid([key_width, key_depth + margin, shaft_length + 2.0 * margin])
        .translate([-key_width / 2.0, radius - key_depth, -margin]);
    Ok(SolidRecipe::cylinder(radius, shaft_length).cut(key))
}

/// Pulley rim with one V groove around its mid-plane and an optional bore.
///
/// Groove depth is `(groove_width / 2) / tan(groove_angle / 2)`, clamped to a
/// fraction of the outer radius. The groove is a triangular `(r, z)` profile
/// revolved about the axis and subtracted from the rim.
pub fn make_v_pulley(
    outer_d: f64,
    width: f64,
    bore_d: f64,
    groove_width: f64,
    groove_angle: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_v_pulley";
    require_positive(NAME, "outer_d", outer_d)?;
    require_positive(NAME, "width", width)?;
    require_non_negative(NAME, "bore_d", bore_d)?;
    require_positive(NAME, "groove_width", groove_width)?;
    require_less(NAME, ("groove_width", groove_width), ("width", width))?;
    ensure(NAME, groove_angle > 0.0 && groove_angle < 180.0, || {
        format!("groove_angle must lie strictly between 0 and 180 degrees, got {groove_angle}")
    })?;

    let r_out = outer_d / 2.0;
    let r_bore = bore_d / 2.0;
    let half_tan = (groove_angle.to_radians() / 2.0).tan();
    let natural_depth = (groove_width / 2.0) / half_tan;
    let depth = natural_depth.min(MAX_GROOVE_DEPTH_RATIO * r_out);
    if depth < natural_depth {
        debug!(natural_depth, depth, "clamped V-groove depth");
    }
    ensure(NAME, r_out - depth > r_bore, || {
        format!(
            "groove root radius ({}) must stay outside the bore radius ({r_bore})",
            r_out - depth
        )
    })?;

    let margin = through_margin(depth);
    let mid = width / 2.0;
    let flank = (depth + margin) * half_tan;
    let groove = SolidRecipe::revolve(vec![
        [r_out - depth, mid],
        [r_out + margin, mid - flank],
        [r_out + margin, mid + flank],
    ]);
    let pulley = SolidRecipe::cylinder(r_out, width).cut(groove);
    if r_bore <= 0.0 {
        return Ok(pulley);
    }
    Ok(pulley.cut(through_bore(r_bore, width, through_margin(width))))
}
