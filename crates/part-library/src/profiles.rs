//! Profiles and hole patterns shared by several primitives.

use std::f64::consts::PI;

use part_core::{Point2, SolidRecipe};

/// Regular hexagon from its across-flats size, centred on the origin.
///
/// Circumradius is `flat / √3`; vertices sit at 0°, 60°, … 300°.
pub fn hex_profile(flat: f64) -> Vec<Point2> {
    let r = hex_circumradius(flat);
    (0..6)
        .map(|k| {
            let angle = (60.0 * k as f64).to_radians();
            [r * angle.cos(), r * angle.sin()]
        })
        .collect()
}

pub fn hex_circumradius(flat: f64) -> f64 {
    flat / 3f64.sqrt()
}

/// `count` holes of `hole_d` evenly spaced on a circle of `circle_d`, fused into
/// one cutting tool. Hole `k` sits at angle `2πk/count`; each hole spans
/// `z0..z0 + height`.
pub fn bolt_circle(circle_d: f64, hole_d: f64, count: u32, height: f64, z0: f64) -> SolidRecipe {
    let r_bc = circle_d / 2.0;
    let holes = (0..count)
        .map(|k| {
            let angle = 2.0 * PI * f64::from(k) / f64::from(count);
            SolidRecipe::cylinder(hole_d / 2.0, height).translate([
                r_bc * angle.cos(),
                r_bc * angle.sin(),
                z0,
            ])
        })
        .collect();
    SolidRecipe::fuse(holes)
}

/// Coaxial cylinder reaching past both faces of a `thickness`-tall part.
pub fn through_bore(radius: f64, thickness: f64, margin: f64) -> SolidRecipe {
    SolidRecipe::cylinder(radius, thickness + 2.0 * margin).translate([0.0, 0.0, -margin])
}

#[cfg(test)]
mod tests {
    use super::{bolt_circle, hex_profile};
    use part_core::SolidRecipe;

    #[test]
    fn hex_profile_has_requested_flat_width() {
        let profile = hex_profile(10.0);
        assert_eq!(profile.len(), 6);
        // vertices 1 and 2 share the top flat at y = f/2
        assert!((profile[1][1] - 5.0).abs() < 1e-12);
        assert!((profile[2][1] - 5.0).abs() < 1e-12);
        assert!((profile[0][0] - 10.0 / 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn bolt_circle_places_first_hole_on_positive_x() {
        let SolidRecipe::Fuse { parts } = bolt_circle(60.0, 8.0, 6, 10.0, -1.0) else {
            panic!("bolt circle should be a fuse");
        };
        assert_eq!(parts.len(), 6);
        let SolidRecipe::Translate { offset, .. } = &parts[0] else {
            panic!("holes should be translated cylinders");
        };
        assert!((offset[0] - 30.0).abs() < 1e-12);
        assert!(offset[1].abs() < 1e-12);
        assert!((offset[2] + 1.0).abs() < 1e-12);
    }
}
