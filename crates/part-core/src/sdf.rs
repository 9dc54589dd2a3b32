use std::sync::Arc;

use tracing::{trace, warn};

use crate::geometry::{
    Aabb, Point2, Point3, add, length, polygon_area, polygon_distance, rotate_about_axis, sub,
};
use crate::kernel::{GeometryKernel, KernelError};

const MIN_AREA: f64 = 1e-9;

#[derive(Debug)]
enum SdfNode {
    Box { half_extents: Point3 },
    Cylinder { radius: f64, height: f64 },
    Prism { profile: Vec<Point2>, height: f64 },
    Revolve { profile: Vec<Point2> },
    Union(SdfSolid, SdfSolid),
    Difference(SdfSolid, SdfSolid),
    Translate(SdfSolid, Point3),
    Rotate {
        solid: SdfSolid,
        center: Point3,
        axis: Point3,
        angle_rad: f64,
    },
}

/// Solid realized by [`SdfKernel`]: a signed distance field plus its bounds.
#[derive(Debug, Clone)]
pub struct SdfSolid {
    node: Arc<SdfNode>,
    bounds: Aabb,
}

impl SdfSolid {
    fn new(node: SdfNode, bounds: Aabb) -> Self {
        Self {
            node: Arc::new(node),
            bounds,
        }
    }

    /// Signed distance at `point`; negative inside the material.
    pub fn evaluate(&self, point: Point3) -> f64 {
        match self.node.as_ref() {
            SdfNode::Box { half_extents } => box_distance(sub(point, *half_extents), *half_extents),
            SdfNode::Cylinder { radius, height } => {
                let radial = (point[0] * point[0] + point[1] * point[1]).sqrt() - radius;
                extrusion_distance(radial, point[2], *height)
            }
            SdfNode::Prism { profile, height } => {
                let planar = polygon_distance(profile, [point[0], point[1]]);
                extrusion_distance(planar, point[2], *height)
            }
            SdfNode::Revolve { profile } => {
                let r = (point[0] * point[0] + point[1] * point[1]).sqrt();
                polygon_distance(profile, [r, point[2]])
            }
            SdfNode::Union(a, b) => a.evaluate(point).min(b.evaluate(point)),
            SdfNode::Difference(a, b) => a.evaluate(point).max(-b.evaluate(point)),
            SdfNode::Translate(solid, offset) => solid.evaluate(sub(point, *offset)),
            SdfNode::Rotate {
                solid,
                center,
                axis,
                angle_rad,
            } => {
                let local = rotate_about_axis(sub(point, *center), *axis, -angle_rad);
                solid.evaluate(add(local, *center))
            }
        }
    }

    pub fn contains(&self, point: Point3) -> bool {
        self.evaluate(point) <= 0.0
    }

    /// Conservative axis-aligned bounds of the material.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Volume estimate from sampling `resolution`³ cell centres inside the bounds.
    pub fn estimate_volume(&self, resolution: usize) -> f64 {
        let resolution = resolution.max(1);
        let size = self.bounds.size();
        let step = [
            size[0] / resolution as f64,
            size[1] / resolution as f64,
            size[2] / resolution as f64,
        ];
        let mut inside = 0usize;
        for i in 0..resolution {
            for j in 0..resolution {
                for k in 0..resolution {
                    let point = [
                        self.bounds.min[0] + (i as f64 + 0.5) * step[0],
                        self.bounds.min[1] + (j as f64 + 0.5) * step[1],
                        self.bounds.min[2] + (k as f64 + 0.5) * step[2],
                    ];
                    if self.contains(point) {
                        inside += 1;
                    }
                }
            }
        }
        inside as f64 * step[0] * step[1] * step[2]
    }
}

#[inline]
fn box_distance(point: Point3, half_extents: Point3) -> f64 {
    let q = [
        point[0].abs() - half_extents[0],
        point[1].abs() - half_extents[1],
        point[2].abs() - half_extents[2],
    ];
    let outside = length([q[0].max(0.0), q[1].max(0.0), q[2].max(0.0)]);
    let inside = q[0].max(q[1]).max(q[2]).min(0.0);
    outside + inside
}

/// Combines an in-plane distance with the slab `0 <= z <= height`.
#[inline]
fn extrusion_distance(planar: f64, z: f64, height: f64) -> f64 {
    let axial = (z - height * 0.5).abs() - height * 0.5;
    let outside = (planar.max(0.0).powi(2) + axial.max(0.0).powi(2)).sqrt();
    let inside = planar.max(axial).min(0.0);
    outside + inside
}

fn require_positive(operation: &'static str, name: &str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::invalid(
            operation,
            format!("{name} must be positive, got {value}"),
        ))
    }
}

fn require_profile(operation: &'static str, profile: &[Point2]) -> Result<(), KernelError> {
    if profile.len() < 3 {
        return Err(KernelError::DegenerateProfile(format!(
            "{operation} needs at least 3 points, got {}",
            profile.len()
        )));
    }
    if profile.iter().flatten().any(|value| !value.is_finite()) {
        return Err(KernelError::DegenerateProfile(format!(
            "{operation} profile has non-finite coordinates"
        )));
    }
    if polygon_area(profile).abs() <= MIN_AREA {
        return Err(KernelError::DegenerateProfile(format!(
            "{operation} profile encloses no area"
        )));
    }
    Ok(())
}

fn profile_bounds(profile: &[Point2]) -> (Point2, Point2) {
    let mut lo = [f64::INFINITY, f64::INFINITY];
    let mut hi = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for point in profile {
        lo = [lo[0].min(point[0]), lo[1].min(point[1])];
        hi = [hi[0].max(point[0]), hi[1].max(point[1])];
    }
    (lo, hi)
}

/// Deterministic reference kernel realizing solids as signed distance fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdfKernel {
    operations: usize,
}

impl SdfKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations performed so far.
    pub fn operations(&self) -> usize {
        self.operations
    }

    fn finish(&mut self, operation: &'static str, node: SdfNode, bounds: Aabb) -> SdfSolid {
        self.operations += 1;
        trace!(operation, ?bounds, "kernel operation");
        SdfSolid::new(node, bounds)
    }
}

impl GeometryKernel for SdfKernel {
    type Solid = SdfSolid;

    fn make_box(&mut self, size: Point3) -> Result<SdfSolid, KernelError> {
        for (name, value) in ["length", "width", "height"].iter().zip(size) {
            require_positive("box", name, value)?;
        }
        let half_extents = [size[0] * 0.5, size[1] * 0.5, size[2] * 0.5];
        Ok(self.finish(
            "box",
            SdfNode::Box { half_extents },
            Aabb::new([0.0, 0.0, 0.0], size),
        ))
    }

    fn make_cylinder(&mut self, radius: f64, height: f64) -> Result<SdfSolid, KernelError> {
        require_positive("cylinder", "radius", radius)?;
        require_positive("cylinder", "height", height)?;
        Ok(self.finish(
            "cylinder",
            SdfNode::Cylinder { radius, height },
            Aabb::new([-radius, -radius, 0.0], [radius, radius, height]),
        ))
    }

    fn extrude_polygon(&mut self, profile: &[Point2], height: f64) -> Result<SdfSolid, KernelError> {
        require_profile("extrude", profile)?;
        require_positive("extrude", "height", height)?;
        let (lo, hi) = profile_bounds(profile);
        Ok(self.finish(
            "extrude",
            SdfNode::Prism {
                profile: profile.to_vec(),
                height,
            },
            Aabb::new([lo[0], lo[1], 0.0], [hi[0], hi[1], height]),
        ))
    }

    fn revolve_profile(&mut self, profile: &[Point2]) -> Result<SdfSolid, KernelError> {
        require_profile("revolve", profile)?;
        if profile.iter().any(|point| point[0] < -1e-12) {
            return Err(KernelError::DegenerateProfile(
                "revolve profile crosses the axis".to_string(),
            ));
        }
        let (lo, hi) = profile_bounds(profile);
        let r = hi[0];
        Ok(self.finish(
            "revolve",
            SdfNode::Revolve {
                profile: profile.to_vec(),
            },
            Aabb::new([-r, -r, lo[1]], [r, r, hi[1]]),
        ))
    }

    fn fuse(&mut self, a: SdfSolid, b: SdfSolid) -> Result<SdfSolid, KernelError> {
        let bounds = a.bounds.union(&b.bounds);
        Ok(self.finish("fuse", SdfNode::Union(a, b), bounds))
    }

    fn cut(&mut self, base: SdfSolid, tool: SdfSolid) -> Result<SdfSolid, KernelError> {
        let bounds = base.bounds;
        Ok(self.finish("cut", SdfNode::Difference(base, tool), bounds))
    }

    fn translate(&mut self, solid: SdfSolid, offset: Point3) -> Result<SdfSolid, KernelError> {
        if offset.iter().any(|value| !value.is_finite()) {
            return Err(KernelError::invalid("translate", "offset must be finite"));
        }
        let bounds = solid.bounds.translated(offset);
        Ok(self.finish("translate", SdfNode::Translate(solid, offset), bounds))
    }

    fn rotate(
        &mut self,
        solid: SdfSolid,
        center: Point3,
        axis: Point3,
        angle_deg: f64,
    ) -> Result<SdfSolid, KernelError> {
        if length(axis) <= f64::EPSILON {
            return Err(KernelError::invalid("rotate", "axis must be non-zero"));
        }
        if !angle_deg.is_finite() {
            return Err(KernelError::invalid("rotate", "angle must be finite"));
        }
        let angle_rad = angle_deg.to_radians();
        let corners = solid.bounds.corners().map(|corner| {
            add(rotate_about_axis(sub(corner, center), axis, angle_rad), center)
        });
        let bounds = Aabb::from_points(corners).unwrap_or(solid.bounds);
        Ok(self.finish(
            "rotate",
            SdfNode::Rotate {
                solid,
                center,
                axis,
                angle_rad,
            },
            bounds,
        ))
    }

    fn fillet(&mut self, solid: SdfSolid, radius: f64) -> Result<SdfSolid, KernelError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(KernelError::invalid(
                "fillet",
                format!("radius must be non-negative, got {radius}"),
            ));
        }
        warn!(radius, "distance-field kernel keeps sharp edges; fillet not applied");
        self.operations += 1;
        Ok(solid)
    }
}
