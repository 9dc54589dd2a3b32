use thiserror::Error;

use crate::geometry::{Point2, Point3};
use crate::recipe::SolidRecipe;

/// Failure raised by a geometry kernel while realizing an operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("degenerate profile: {0}")]
    DegenerateProfile(String),
    #[error("invalid dimension for {operation}: {detail}")]
    InvalidDimension {
        operation: &'static str,
        detail: String,
    },
    #[error("boolean {operation} failed: {detail}")]
    Boolean {
        operation: &'static str,
        detail: String,
    },
    #[error("{0}")]
    Other(String),
}

impl KernelError {
    pub fn invalid(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidDimension {
            operation,
            detail: detail.into(),
        }
    }
}

/// Operation set consumed by the primitive library.
///
/// Implementations return opaque solid handles; callers never inspect topology.
pub trait GeometryKernel {
    type Solid;

    fn make_box(&mut self, size: Point3) -> Result<Self::Solid, KernelError>;
    fn make_cylinder(&mut self, radius: f64, height: f64) -> Result<Self::Solid, KernelError>;
    fn extrude_polygon(
        &mut self,
        profile: &[Point2],
        height: f64,
    ) -> Result<Self::Solid, KernelError>;
    fn revolve_profile(&mut self, profile: &[Point2]) -> Result<Self::Solid, KernelError>;
    fn fuse(&mut self, a: Self::Solid, b: Self::Solid) -> Result<Self::Solid, KernelError>;
    fn cut(&mut self, base: Self::Solid, tool: Self::Solid) -> Result<Self::Solid, KernelError>;
    fn translate(&mut self, solid: Self::Solid, offset: Point3)
    -> Result<Self::Solid, KernelError>;
    fn rotate(
        &mut self,
        solid: Self::Solid,
        center: Point3,
        axis: Point3,
        angle_deg: f64,
    ) -> Result<Self::Solid, KernelError>;
    fn fillet(&mut self, solid: Self::Solid, radius: f64) -> Result<Self::Solid, KernelError>;
}

/// Issues the kernel calls described by `recipe`, depth first and in order.
///
/// A fuse realizes all of its parts before combining them pairwise.
pub fn realize<K>(kernel: &mut K, recipe: &SolidRecipe) -> Result<K::Solid, KernelError>
where
    K: GeometryKernel + ?Sized,
{
    match recipe {
        SolidRecipe::Box { size } => kernel.make_box(*size),
        SolidRecipe::Cylinder { radius, height } => kernel.make_cylinder(*radius, *height),
        SolidRecipe::Prism { profile, height } => kernel.extrude_polygon(profile, *height),
        SolidRecipe::Revolve { profile } => kernel.revolve_profile(profile),
        SolidRecipe::Fuse { parts } => {
            if parts.is_empty() {
                return Err(KernelError::Boolean {
                    operation: "fuse",
                    detail: "nothing to fuse".to_string(),
                });
            }
            let solids = parts
                .iter()
                .map(|part| realize(kernel, part))
                .collect::<Result<Vec<_>, _>>()?;
            fuse_balanced(kernel, solids)
        }
        SolidRecipe::Cut { base, tool } => {
            let base = realize(kernel, base)?;
            let tool = realize(kernel, tool)?;
            kernel.cut(base, tool)
        }
        SolidRecipe::Translate { solid, offset } => {
            let solid = realize(kernel, solid)?;
            kernel.translate(solid, *offset)
        }
        SolidRecipe::Rotate {
            solid,
            center,
            axis,
            angle_deg,
        } => {
            let solid = realize(kernel, solid)?;
            kernel.rotate(solid, *center, *axis, *angle_deg)
        }
        SolidRecipe::Fillet { solid, radius } => {
            let solid = realize(kernel, solid)?;
            kernel.fillet(solid, *radius)
        }
    }
}

/// Fuses neighbours pairwise, level by level, so the result nests
/// `ceil(log2(n))` deep however many parts there are.
fn fuse_balanced<K>(kernel: &mut K, mut level: Vec<K::Solid>) -> Result<K::Solid, KernelError>
where
    K: GeometryKernel + ?Sized,
{
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut solids = level.into_iter();
        while let Some(a) = solids.next() {
            match solids.next() {
                Some(b) => next.push(kernel.fuse(a, b)?),
                None => next.push(a),
            }
        }
        level = next;
    }
    level.pop().ok_or_else(|| KernelError::Boolean {
        operation: "fuse",
        detail: "nothing to fuse".to_string(),
    })
}

/// Kernel that records the operations it is asked for and returns their index.
///
/// Useful for asserting which calls (if any) reach the kernel boundary.
#[derive(Debug, Default)]
pub struct RecordingKernel {
    pub calls: Vec<String>,
}

impl RecordingKernel {
    fn record(&mut self, call: String) -> usize {
        self.calls.push(call);
        self.calls.len() - 1
    }
}

impl GeometryKernel for RecordingKernel {
    type Solid = usize;

    fn make_box(&mut self, size: Point3) -> Result<usize, KernelError> {
        Ok(self.record(format!("box({}, {}, {})", size[0], size[1], size[2])))
    }

    fn make_cylinder(&mut self, radius: f64, height: f64) -> Result<usize, KernelError> {
        Ok(self.record(format!("cylinder({radius}, {height})")))
    }

    fn extrude_polygon(&mut self, profile: &[Point2], height: f64) -> Result<usize, KernelError> {
        Ok(self.record(format!("extrude({} points, {height})", profile.len())))
    }

    fn revolve_profile(&mut self, profile: &[Point2]) -> Result<usize, KernelError> {
        Ok(self.record(format!("revolve({} points)", profile.len())))
    }

    fn fuse(&mut self, a: usize, b: usize) -> Result<usize, KernelError> {
        Ok(self.record(format!("fuse(#{a}, #{b})")))
    }

    fn cut(&mut self, base: usize, tool: usize) -> Result<usize, KernelError> {
        Ok(self.record(format!("cut(#{base}, #{tool})")))
    }

    fn translate(&mut self, solid: usize, offset: Point3) -> Result<usize, KernelError> {
        Ok(self.record(format!(
            "translate(#{solid}, {}, {}, {})",
            offset[0], offset[1], offset[2]
        )))
    }

    fn rotate(
        &mut self,
        solid: usize,
        _center: Point3,
        _axis: Point3,
        angle_deg: f64,
    ) -> Result<usize, KernelError> {
        Ok(self.record(format!("rotate(#{solid}, {angle_deg})")))
    }

    fn fillet(&mut self, solid: usize, radius: f64) -> Result<usize, KernelError> {
        Ok(self.record(format!("fillet(#{solid}, {radius})")))
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordingKernel, realize};
    use crate::recipe::SolidRecipe;

    #[test]
    fn realize_issues_calls_depth_first_in_order() {
        let recipe = SolidRecipe::fuse(vec![
            SolidRecipe::cylinder(5.0, 20.0),
            SolidRecipe::cylinder(10.0, 15.0).translate([0.0, 0.0, 20.0]),
        ]);
        let mut kernel = RecordingKernel::default();
        let handle = realize(&mut kernel, &recipe).expect("recipe should realize");

        assert_eq!(
            kernel.calls,
            vec![
                "cylinder(5, 20)",
                "cylinder(10, 15)",
                "translate(#1, 0, 0, 20)",
                "fuse(#0, #2)",
            ]
        );
        assert_eq!(handle, 3);
        assert_eq!(kernel.calls.len(), recipe.operation_count());
    }

    #[test]
    fn fuse_parts_combine_pairwise() {
        let recipe = SolidRecipe::fuse(vec![
            SolidRecipe::cuboid([1.0, 1.0, 1.0]),
            SolidRecipe::cuboid([2.0, 2.0, 2.0]),
            SolidRecipe::cuboid([3.0, 3.0, 3.0]),
            SolidRecipe::cuboid([4.0, 4.0, 4.0]),
            SolidRecipe::cuboid([5.0, 5.0, 5.0]),
        ]);
        let mut kernel = RecordingKernel::default();
        realize(&mut kernel, &recipe).expect("recipe should realize");

        assert_eq!(
            &kernel.calls[5..],
            &["fuse(#0, #1)", "fuse(#2, #3)", "fuse(#5, #6)", "fuse(#7, #4)"]
        );
        assert_eq!(kernel.calls.len(), recipe.operation_count());
    }

    #[test]
    fn empty_fuse_is_a_kernel_error() {
        let mut kernel = RecordingKernel::default();
        let error = realize(&mut kernel, &SolidRecipe::fuse(Vec::new()))
            .expect_err("empty fuse should fail");
        assert!(error.to_string().contains("nothing to fuse"));
        assert!(kernel.calls.is_empty());
    }
}
