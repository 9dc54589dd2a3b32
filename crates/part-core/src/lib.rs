pub mod geometry;
pub mod kernel;
pub mod recipe;
pub mod sdf;

pub use geometry::{Aabb, Point2, Point3};
pub use kernel::{GeometryKernel, KernelError, RecordingKernel, realize};
pub use recipe::SolidRecipe;
pub use sdf::{SdfKernel, SdfSolid};
