use serde::{Deserialize, Serialize};

use crate::geometry::{Point2, Point3};

/// Ordered description of kernel operations producing one solid.
///
/// A recipe is plain data: building one never touches a kernel. It is consumed
/// once by [`crate::realize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SolidRecipe {
    /// Box with its minimum corner at the origin.
    Box { size: Point3 },
    /// Cylinder with its base centred at the origin, extending along +Z.
    Cylinder { radius: f64, height: f64 },
    /// Closed XY polygon extruded along +Z from z = 0.
    Prism { profile: Vec<Point2>, height: f64 },
    /// Closed `(r, z)` polygon revolved a full turn about the Z axis.
    Revolve { profile: Vec<Point2> },
    /// Left fold of boolean unions, in order.
    Fuse { parts: Vec<SolidRecipe> },
    Cut {
        base: Box<SolidRecipe>,
        tool: Box<SolidRecipe>,
    },
    Translate {
        solid: Box<SolidRecipe>,
        offset: Point3,
    },
    Rotate {
        solid: Box<SolidRecipe>,
        center: Point3,
        axis: Point3,
        angle_deg: f64,
    },
    /// Rounds every edge of `solid`.
    Fillet { solid: Box<SolidRecipe>, radius: f64 },
}

impl SolidRecipe {
    pub fn cuboid(size: Point3) -> Self {
        Self::Box { size }
    }

    pub fn cylinder(radius: f64, height: f64) -> Self {
        Self::Cylinder { radius, height }
    }

    pub fn prism(profile: Vec<Point2>, height: f64) -> Self {
        Self::Prism { profile, height }
    }

    pub fn revolve(profile: Vec<Point2>) -> Self {
        Self::Revolve { profile }
    }

    pub fn fuse(parts: Vec<SolidRecipe>) -> Self {
        Self::Fuse { parts }
    }

    pub fn cut(self, tool: SolidRecipe) -> Self {
        Self::Cut {
            base: Box::new(self),
            tool: Box::new(tool),
        }
    }

    pub fn translate(self, offset: Point3) -> Self {
        Self::Translate {
            solid: Box::new(self),
            offset,
        }
    }

    /// Rotation about the Z axis through the origin.
    pub fn rotate_z(self, angle_deg: f64) -> Self {
        Self::Rotate {
            solid: Box::new(self),
            center: [0.0, 0.0, 0.0],
            axis: [0.0, 0.0, 1.0],
            angle_deg,
        }
    }

    pub fn fillet(self, radius: f64) -> Self {
        Self::Fillet {
            solid: Box::new(self),
            radius,
        }
    }

    /// Number of kernel calls needed to realize this recipe.
    pub fn operation_count(&self) -> usize {
        match self {
            Self::Box { .. }
            | Self::Cylinder { .. }
            | Self::Prism { .. }
            | Self::Revolve { .. } => 1,
            Self::Fuse { parts } => {
                parts.iter().map(Self::operation_count).sum::<usize>() + parts.len().saturating_sub(1)
            }
            Self::Cut { base, tool } => base.operation_count() + tool.operation_count() + 1,
            Self::Translate { solid, .. }
            | Self::Rotate { solid, .. }
            | Self::Fillet { solid, .. } => solid.operation_count() + 1,
        }
    }

    /// Number of `Cut` nodes anywhere in the recipe.
    pub fn cut_count(&self) -> usize {
        match self {
            Self::Box { .. }
            | Self::Cylinder { .. }
            | Self::Prism { .. }
            | Self::Revolve { .. } => 0,
            Self::Fuse { parts } => parts.iter().map(Self::cut_count).sum(),
            Self::Cut { base, tool } => 1 + base.cut_count() + tool.cut_count(),
            Self::Translate { solid, .. }
            | Self::Rotate { solid, .. }
            | Self::Fillet { solid, .. } => solid.cut_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SolidRecipe;

    #[test]
    fn operation_count_includes_booleans_and_transforms() {
        let recipe = SolidRecipe::cylinder(10.0, 5.0)
            .cut(SolidRecipe::cylinder(4.0, 6.0).translate([0.0, 0.0, -0.5]));
        assert_eq!(recipe.operation_count(), 4);
        assert_eq!(recipe.cut_count(), 1);

        let fused = SolidRecipe::fuse(vec![
            SolidRecipe::cuboid([1.0, 1.0, 1.0]),
            SolidRecipe::cuboid([2.0, 2.0, 2.0]),
            SolidRecipe::cuboid([3.0, 3.0, 3.0]),
        ]);
        assert_eq!(fused.operation_count(), 5);
    }

    #[test]
    fn recipe_serializes_with_operation_tag() {
        let recipe = SolidRecipe::cuboid([1.0, 2.0, 3.0]).translate([0.0, 0.0, 1.0]);
        let json = serde_json::to_value(&recipe).expect("recipe should serialize");
        assert_eq!(json["op"], "translate");
        assert_eq!(json["solid"]["op"], "box");
    }
}
