use std::collections::BTreeMap;

use part_core::{Aabb, SdfKernel, SdfSolid, SolidRecipe};
use part_library::ArgValue;
use serde::Serialize;

use crate::error::PartError;
use crate::pipeline::{PartBuild, Pipeline};

/// Sampling grid used when estimating volumes for reports.
pub const DEFAULT_VOLUME_RESOLUTION: usize = 48;

/// Summary of a part realized on the SDF kernel, for printing or JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub code: String,
    pub call: &'static str,
    pub arguments: BTreeMap<&'static str, ArgValue>,
    pub bounds: Aabb,
    pub volume: f64,
    pub recipe: SolidRecipe,
}

impl BuildReport {
    pub fn new(build: PartBuild, solid: &SdfSolid, resolution: usize) -> Self {
        let arguments = build
            .execution
            .arguments
            .iter()
            .map(|(name, value)| (name, value.clone()))
            .collect();
        Self {
            code: build.code,
            call: build.execution.primitive,
            arguments,
            bounds: solid.bounds(),
            volume: solid.estimate_volume(resolution),
            recipe: build.execution.recipe,
        }
    }
}

/// Runs `raw` through `pipeline` on a fresh [`SdfKernel`] and summarizes it.
pub fn build_with_sdf(
    pipeline: &Pipeline,
    raw: &str,
    resolution: usize,
) -> Result<BuildReport, PartError> {
    let mut kernel = SdfKernel::new();
    let mut shown = None;
    let build = pipeline.run_raw(raw, &mut kernel, |solid| shown = Some(solid))?;
    match shown {
        Some(solid) => Ok(BuildReport::new(build, &solid, resolution)),
        None => Err(PartError::NoValidCall {
            raw: raw.to_string(),
            detail: "display hook did not receive a solid".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use part_library::ArgValue;

    use super::build_with_sdf;
    use crate::{ErrorKind, Pipeline};

    #[test]
    fn stepped_shaft_report_has_expected_extent_and_volume() {
        let report = build_with_sdf(
            &Pipeline::default(),
            "shape = make_stepped_shaft(d1=10, L1=20, d2=20, L2=15)",
            64,
        )
        .expect("shaft builds");

        assert_eq!(report.call, "make_stepped_shaft");
        assert_eq!(report.arguments.get("L1"), Some(&ArgValue::Number(20.0)));
        assert!((report.bounds.size()[2] - 35.0).abs() < 1e-9);
        let exact = std::f64::consts::PI * (25.0 * 20.0 + 100.0 * 15.0);
        assert!(
            (report.volume - exact).abs() / exact < 0.05,
            "volume {} vs {exact}",
            report.volume
        );
    }

    #[test]
    fn report_serializes_recipe_and_bounds() {
        let report =
            build_with_sdf(&Pipeline::default(), "make_box(10, 20, 30)", 8).expect("box builds");
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["call"], "make_box");
        assert_eq!(json["code"], "shape = make_box(10, 20, 30)\nPart.show(shape)");
        assert_eq!(json["bounds"]["max"][2], 30.0);
        assert_eq!(json["recipe"]["op"], "box");
        assert!((report.volume - 6000.0).abs() < 1e-6);
    }

    #[test]
    fn flange_with_the_most_bolt_holes_builds_and_samples() {
        let report = build_with_sdf(
            &Pipeline::default(),
            "shape = make_flange(100010, 10, 5, 100000, 1, 360)\nPart.show(shape)",
            2,
        )
        .expect("360 holes build");
        assert_eq!(report.arguments.get("bolt_count"), Some(&ArgValue::Number(360.0)));
        assert!(report.volume > 0.0);

        let err = build_with_sdf(
            &Pipeline::default(),
            "shape = make_flange(100010, 10, 5, 100000, 1, 4000)\nPart.show(shape)",
            2,
        )
        .expect_err("bolt count over the limit");
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }

    #[test]
    fn failures_pass_through() {
        let err = build_with_sdf(&Pipeline::default(), "make_pipe(20, 30, 50)", 8)
            .expect_err("inner larger than outer");
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }
}
