use serde::{Deserialize, Serialize};

/// Cartesian point or vector in millimetres.
pub type Point3 = [f64; 3];

/// Planar point; `(x, y)` for prism profiles and `(r, z)` for revolve profiles.
pub type Point2 = [f64; 2];

#[inline]
pub fn dot(a: Point3, b: Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Point3, b: Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn length(v: Point3) -> f64 {
    dot(v, v).sqrt()
}

#[inline]
pub fn add(a: Point3, b: Point3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Point3, b: Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(v: Point3, factor: f64) -> Point3 {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

#[inline]
pub fn normalize(v: Point3) -> Point3 {
    let len = length(v);
    if len <= f64::EPSILON {
        [0.0, 0.0, 0.0]
    } else {
        scale(v, 1.0 / len)
    }
}

/// Rotates `point` about an axis through the origin (Rodrigues' formula).
pub fn rotate_about_axis(point: Point3, axis: Point3, angle_rad: f64) -> Point3 {
    let a = normalize(axis);
    let (sin_theta, cos_theta) = angle_rad.sin_cos();
    let along = scale(a, dot(a, point) * (1.0 - cos_theta));
    add(
        add(scale(point, cos_theta), scale(cross(a, point), sin_theta)),
        along,
    )
}

/// Signed area of a closed planar polygon; positive when counter-clockwise.
pub fn polygon_area(points: &[Point2]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a[0] * b[1] - b[0] * a[1];
    }
    twice * 0.5
}

/// Exact distance from `p` to the boundary of a closed polygon, negative inside.
pub fn polygon_distance(points: &[Point2], p: Point2) -> f64 {
    let n = points.len();
    let mut best = f64::INFINITY;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = points[i];
        let b = points[j];
        let e = [b[0] - a[0], b[1] - a[1]];
        let w = [p[0] - a[0], p[1] - a[1]];
        let denom = e[0] * e[0] + e[1] * e[1];
        let t = if denom > 0.0 {
            ((w[0] * e[0] + w[1] * e[1]) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let d = [w[0] - e[0] * t, w[1] - e[1] * t];
        best = best.min(d[0] * d[0] + d[1] * d[1]);

        if (a[1] > p[1]) != (b[1] > p[1]) {
            let x_cross = a[0] + (p[1] - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
            if p[0] < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    let distance = best.sqrt();
    if inside { -distance } else { distance }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point.
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first, first);
        for point in iter {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(point[axis]);
                bounds.max[axis] = bounds.max[axis].max(point[axis]);
            }
        }
        Some(bounds)
    }

    pub fn size(&self) -> Point3 {
        sub(self.max, self.min)
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut merged = *self;
        for axis in 0..3 {
            merged.min[axis] = merged.min[axis].min(other.min[axis]);
            merged.max[axis] = merged.max[axis].max(other.max[axis]);
        }
        merged
    }

    pub fn translated(&self, offset: Point3) -> Self {
        Self::new(add(self.min, offset), add(self.max, offset))
    }

    pub fn corners(&self) -> [Point3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            [lo[0], lo[1], lo[2]],
            [hi[0], lo[1], lo[2]],
            [lo[0], hi[1], lo[2]],
            [hi[0], hi[1], lo[2]],
            [lo[0], lo[1], hi[2]],
            [hi[0], lo[1], hi[2]],
            [lo[0], hi[1], hi[2]],
            [hi[0], hi[1], hi[2]],
        ]
    }

    pub fn volume(&self) -> f64 {
        let size = self.size();
        size[0].max(0.0) * size[1].max(0.0) * size[2].max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Aabb, polygon_area, polygon_distance, rotate_about_axis};

    #[test]
    fn rotation_about_z_maps_x_to_y() {
        let rotated = rotate_about_axis([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2);
        assert!(rotated[0].abs() < 1e-12);
        assert!((rotated[1] - 1.0).abs() < 1e-12);
        assert!(rotated[2].abs() < 1e-12);
    }

    #[test]
    fn square_polygon_distance_is_signed() {
        let square = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        assert!((polygon_area(&square) - 4.0).abs() < 1e-12);
        assert!((polygon_distance(&square, [1.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!((polygon_distance(&square, [3.0, 1.0]) - 1.0).abs() < 1e-12);
        assert!(polygon_distance(&square, [2.0, 1.0]).abs() < 1e-12);
    }

    #[test]
    fn bounds_merge_and_translate() {
        let a = Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = Aabb::new([2.0, -1.0, 0.0], [3.0, 0.5, 4.0]);
        let merged = a.union(&b).translated([1.0, 0.0, 0.0]);
        assert_eq!(merged.min, [1.0, -1.0, 0.0]);
        assert_eq!(merged.max, [4.0, 1.0, 4.0]);
        assert!((a.volume() - 1.0).abs() < 1e-12);
    }
}
