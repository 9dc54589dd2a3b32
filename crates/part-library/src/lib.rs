//! Closed library of parametric part primitives.
//!
//! Every primitive maps a bounded parameter vector to a [`SolidRecipe`],
//! validating its preconditions first so that inadmissible input fails with
//! [`BuildError`] and never reaches a geometry kernel.

pub mod error;
pub mod params;
pub mod primitives;
pub mod profiles;
pub mod registry;
pub mod validate;

pub use error::BuildError;
pub use params::{ArgValue, Arguments, MAX_COUNT, ParamKind, ParamSpec, Presence};
pub use part_core::SolidRecipe;
pub use registry::{Builder, PrimitiveSpec, Registry};
