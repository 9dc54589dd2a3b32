use part_core::SolidRecipe;

use crate::error::BuildError;
use crate::validate::{ensure, require_less, require_positive, through_margin};

/// Rectangular hollow section running along X; a solid bar when
/// `wall_thickness <= 0`.
pub fn make_rect_tube(
    length: f64,
    width: f64,
    height: f64,
    wall_thickness: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_rect_tube";
    require_positive(NAME, "length", length)?;
    require_positive(NAME, "width", width)?;
    require_positive(NAME, "height", height)?;
    let outer = SolidRecipe::cuboid([length, width, height]);
    if wall_thickness <= 0.0 {
        return Ok(outer);
    }
    let t = wall_thickness;
    require_less(NAME, ("2 * wall_thickness", 2.0 * t), ("width", width))?;
    require_less(NAME, ("2 * wall_thickness", 2.0 * t), ("height", height))?;

    let margin = through_margin(length);
    let inner = SolidRecipe::cuboid([length + 2.0 * margin, width - 2.0 * t, height - 2.0 * t])
        .translate([-margin, t, t]);
    Ok(outer.cut(inner))
}

/// Flat bar with one hole near each end, centred in width.
pub fn make_flat_bar_2holes(
    length: f64,
    width: f64,
    thickness: f64,
    hole_d: f64,
    edge_offset: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_flat_bar_2holes";
    require_positive(NAME, "length", length)?;
    require_positive(NAME, "width", width)?;
    require_positive(NAME, "thickness", thickness)?;
    require_positive(NAME, "hole_d", hole_d)?;
    require_less(NAME, ("hole_d", hole_d), ("width", width))?;
    ensure(NAME, edge_offset > hole_d / 2.0, || {
        format!("edge_offset ({edge_offset}) must exceed the hole radius ({})", hole_d / 2.0)
    })?;
    ensure(NAME, length - 2.0 * edge_offset > hole_d, || {
        format!("holes overlap: centre distance {} is not above hole_d ({hole_d})", length - 2.0 * edge_offset)
    })?;

    let margin = through_margin(thickness);
    let hole = |x: f64| {
        SolidRecipe::cylinder(hole_d / 2.0, thickness + 2.0 * margin).translate([
            x,
            width / 2.0,
            -margin,
        ])
    };
    let holes = SolidRecipe::fuse(vec![hole(edge_offset), hole(length - edge_offset)]);
    Ok(SolidRecipe::cuboid([length, width, thickness]).cut(holes))
}

/// Flat L made of a `leg_x × width` and a `width × leg_y` plate sharing the
/// origin corner, edges rounded when `fillet_radius > 0`.
pub fn make_l_bracket(
    leg_x: f64,
    leg_y: f64,
    width: f64,
    thickness: f64,
    fillet_radius: f64,
) -> Result<SolidRecipe, BuildError> {
    const NAME: &str = "make_L_bracket";
    require_positive(NAME, "leg_x", leg_x)?;
    require_positive(NAME, "leg_y", leg_y)?;
    require_positive(NAME, "width", width)?;
    require_positive(NAME, "thickness", thickness)?;
    let bracket = SolidRecipe::fuse(vec![
        SolidRecipe::cuboid([leg_x, width, thickness]),
        SolidRecipe::cuboid([width, leg_y, thickness]),
    ]);
    if fillet_radius <= 0.0 {
        return Ok(bracket);
    }
    require_less(
        NAME,
        ("fillet_radius", fillet_radius),
        ("half the thickness", thickness / 2.0),
    )?;
    Ok(bracket.fillet(fillet_radius))
}

#[cfg(test)]
mod tests {
    use part_core::{SdfKernel, SdfSolid, SolidRecipe, realize};

    use super::{make_flat_bar_2holes, make_l_bracket, make_rect_tube};
    use crate::error::BuildError;

    fn solid(recipe: &SolidRecipe) -> SdfSolid {
        realize(&mut SdfKernel::new(), recipe).expect("recipe should realize")
    }

    #[test]
    fn rect_tube_wall_must_fit_twice() {
        let error = make_rect_tube(100.0, 10.0, 10.0, 6.0).expect_err("6 * 2 = 12 > 10");
        assert!(matches!(error, BuildError::InvalidParameters { primitive: "make_rect_tube", .. }));
        assert!(make_rect_tube(100.0, 10.0, 10.0, 5.0).is_err());
        assert!(make_rect_tube(100.0, 40.0, 10.0, 5.0).is_err());
    }

    #[test]
    fn rect_tube_is_open_at_both_ends() {
        let tube = solid(&make_rect_tube(100.0, 40.0, 20.0, 2.0).expect("valid tube"));
        assert!(!tube.contains([0.1, 20.0, 10.0]));
        assert!(!tube.contains([99.9, 20.0, 10.0]));
        assert!(tube.contains([50.0, 1.0, 10.0]));
        assert!(tube.contains([50.0, 20.0, 19.0]));

        let bar = make_rect_tube(100.0, 40.0, 20.0, 0.0).expect("solid bar");
        assert_eq!(bar, SolidRecipe::cuboid([100.0, 40.0, 20.0]));
    }

    #[test]
    fn flat_bar_holes_sit_at_edge_offset() {
        let bar = solid(&make_flat_bar_2holes(120.0, 20.0, 5.0, 8.0, 10.0).expect("valid bar"));
        assert!(!bar.contains([10.0, 10.0, 2.5]));
        assert!(!bar.contains([110.0, 10.0, 2.5]));
        assert!(bar.contains([60.0, 10.0, 2.5]));
        assert!(make_flat_bar_2holes(120.0, 20.0, 5.0, 8.0, 3.0).is_err());
        assert!(make_flat_bar_2holes(20.0, 20.0, 5.0, 8.0, 7.0).is_err());
    }

    #[test]
    fn l_bracket_fillet_is_bounded_by_thickness() {
        let plain = solid(&make_l_bracket(50.0, 40.0, 10.0, 4.0, 0.0).expect("plain bracket"));
        assert!(plain.contains([45.0, 5.0, 2.0]));
        assert!(plain.contains([5.0, 35.0, 2.0]));
        assert!(!plain.contains([30.0, 30.0, 2.0]));

        let rounded = make_l_bracket(50.0, 40.0, 10.0, 4.0, 1.0).expect("rounded bracket");
        assert!(matches!(rounded, SolidRecipe::Fillet { .. }));
        assert!(make_l_bracket(50.0, 40.0, 10.0, 4.0, 2.0).is_err());
    }
}
