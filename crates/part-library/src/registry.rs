use std::fmt;

use part_core::SolidRecipe;
use serde::Serialize;

use crate::error::BuildError;
use crate::params::{ArgValue, Arguments, ParamKind, ParamSpec};
use crate::primitives::{fasteners, plates, sections, turned};

use crate::params::ParamKind::{Angle, Count, Length, Size};

pub type Builder = fn(&Arguments) -> Result<SolidRecipe, BuildError>;

/// Registry entry: a primitive's name, ordered parameters and builder.
#[derive(Clone, Copy, Serialize)]
pub struct PrimitiveSpec {
    pub name: &'static str,
    pub summary: &'static str,
    pub params: &'static [ParamSpec],
    #[serde(skip)]
    pub builder: Builder,
}

impl fmt::Debug for PrimitiveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PrimitiveSpec {
    /// Call signature as documented to the generator, e.g. `make_box(L, W, H)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, params.join(", "))
    }

    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|param| param.is_required()).count()
    }

    pub fn bind(
        &self,
        positional: Vec<ArgValue>,
        keywords: Vec<(String, ArgValue)>,
    ) -> Result<Arguments, BuildError> {
        Arguments::bind(self.name, self.params, positional, keywords)
    }

    pub fn build(&self, args: &Arguments) -> Result<SolidRecipe, BuildError> {
        (self.builder)(args)
    }
}

macro_rules! req {
    ($name:literal) => {
        ParamSpec::required($name, Length)
    };
    ($name:literal, $kind:expr) => {
        ParamSpec::required($name, $kind)
    };
}

static PRIMITIVES: &[PrimitiveSpec] = &[
    PrimitiveSpec {
        name: "make_box",
        summary: "Rectangular block with a corner at the origin.",
        params: &[req!("L"), req!("W"), req!("H")],
        builder: |a: &Arguments| plates::make_box(a.number("L")?, a.number("W")?, a.number("H")?),
    },
    PrimitiveSpec {
        name: "make_cylinder",
        summary: "Solid cylinder standing on the XY plane.",
        params: &[req!("radius"), req!("height")],
        builder: |a: &Arguments| turned::make_cylinder(a.number("radius")?, a.number("height")?),
    },
    PrimitiveSpec {
        name: "make_cyl_with_hole",
        summary: "Cylinder with a coaxial hole; use this whenever a cylinder has a hole or depth.",
        params: &[
            req!("outer_radius"),
            req!("height"),
            req!("hole_radius"),
            req!("hole_depth").with_alias("depth"),
        ],
        builder: |a: &Arguments| {
            turned::make_cyl_with_hole(
                a.number("outer_radius")?,
                a.number("height")?,
                a.number("hole_radius")?,
                a.number("hole_depth")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_tri_prism",
        summary: "Triangular prism, base along X, apex along Y.",
        params: &[req!("base"), req!("height"), req!("thickness")],
        builder: |a: &Arguments| {
            plates::make_tri_prism(a.number("base")?, a.number("height")?, a.number("thickness")?)
        },
    },
    PrimitiveSpec {
        name: "make_plate_with_hole",
        summary: "Plate with one centred through hole.",
        params: &[
            req!("L"),
            req!("W"),
            req!("thickness"),
            ParamSpec::defaulted("hole_radius", Length, 0.0),
        ],
        builder: |a: &Arguments| {
            plates::make_plate_with_hole(
                a.number("L")?,
                a.number("W")?,
                a.number("thickness")?,
                a.number("hole_radius")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_hex_prism",
        summary: "Hexagonal bar stock; flat is the across-flats size.",
        params: &[req!("flat"), req!("thickness")],
        builder: |a: &Arguments| fasteners::make_hex_prism(a.number("flat")?, a.number("thickness")?),
    },
    PrimitiveSpec {
        name: "make_hex_nut",
        summary: "Hex nut with a plain through hole.",
        params: &[req!("flat"), req!("thickness"), req!("hole_radius")],
        builder: |a: &Arguments| {
            fasteners::make_hex_nut(
                a.number("flat")?,
                a.number("thickness")?,
                a.number("hole_radius")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_hex_bolt",
        summary: "Hex bolt from explicit shaft and head dimensions.",
        params: &[
            req!("shaft_radius"),
            req!("shaft_length"),
            req!("head_flat"),
            req!("head_thickness"),
        ],
        builder: |a: &Arguments| {
            fasteners::make_hex_bolt(
                a.number("shaft_radius")?,
                a.number("shaft_length")?,
                a.number("head_flat")?,
                a.number("head_thickness")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_fasteners_hex_bolt",
        summary: "Standard ISO 4014 hex bolt by metric size, e.g. \"M8\".",
        params: &[req!("size", Size), req!("length_mm")],
        builder: |a: &Arguments| {
            let size = a
                .raw("size")?
                .cloned()
                .unwrap_or(ArgValue::None);
            fasteners::make_fasteners_hex_bolt(&size, a.number("length_mm")?)
        },
    },
    PrimitiveSpec {
        name: "make_screw_blank",
        summary: "Screw with a plain cylindrical head and no drive.",
        params: &[
            req!("shaft_diameter"),
            req!("shaft_length"),
            req!("head_diameter"),
            req!("head_height"),
        ],
        builder: |a: &Arguments| {
            fasteners::make_screw_blank(
                a.number("shaft_diameter")?,
                a.number("shaft_length")?,
                a.number("head_diameter")?,
                a.number("head_height")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_slotted_screw",
        summary: "Screw with a straight slot across the head.",
        params: &[
            req!("shaft_diameter"),
            req!("shaft_length"),
            req!("head_diameter"),
            req!("head_height"),
            req!("slot_width"),
            req!("slot_depth"),
        ],
        builder: |a: &Arguments| {
            fasteners::make_slotted_screw(
                a.number("shaft_diameter")?,
                a.number("shaft_length")?,
                a.number("head_diameter")?,
                a.number("head_height")?,
                a.number("slot_width")?,
                a.number("slot_depth")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_cross_screw",
        summary: "Screw with a cross recess in the head.",
        params: &[
            req!("shaft_diameter"),
            req!("shaft_length"),
            req!("head_diameter"),
            req!("head_height"),
            req!("slot_width"),
            req!("slot_depth"),
        ],
        builder: |a: &Arguments| {
            fasteners::make_cross_screw(
                a.number("shaft_diameter")?,
                a.number("shaft_length")?,
                a.number("head_diameter")?,
                a.number("head_height")?,
                a.number("slot_width")?,
                a.number("slot_depth")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_socket_head_screw",
        summary: "Cap screw with a hex socket in the head.",
        params: &[
            req!("shaft_diameter"),
            req!("shaft_length"),
            req!("head_diameter"),
            req!("head_height"),
            req!("socket_flat"),
        ],
        builder: |a: &Arguments| {
            fasteners::make_socket_head_screw(
                a.number("shaft_diameter")?,
                a.number("shaft_length")?,
                a.number("head_diameter")?,
                a.number("head_height")?,
                a.number("socket_flat")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_flange",
        summary: "Circular flange with an optional bolt circle of at most 360 holes.",
        params: &[
            req!("outer_d"),
            req!("inner_d"),
            req!("thickness"),
            ParamSpec::defaulted("bolt_circle_d", Length, 0.0),
            ParamSpec::defaulted("bolt_hole_d", Length, 0.0),
            ParamSpec::defaulted("bolt_count", Count, 0.0),
        ],
        builder: |a: &Arguments| {
            turned::make_flange(
                a.number("outer_d")?,
                a.number("inner_d")?,
                a.number("thickness")?,
                a.number("bolt_circle_d")?,
                a.number("bolt_hole_d")?,
                a.count("bolt_count")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_L_bracket",
        summary: "Flat L-shaped bracket from two plates, optionally filleted.",
        params: &[
            req!("leg_x"),
            req!("leg_y"),
            req!("width"),
            req!("thickness"),
            ParamSpec::defaulted("fillet_radius", Length, 0.0),
        ],
        builder: |a: &Arguments| {
            sections::make_l_bracket(
                a.number("leg_x")?,
                a.number("leg_y")?,
                a.number("width")?,
                a.number("thickness")?,
                a.number("fillet_radius")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_rect_tube",
        summary: "Rectangular frame member; solid bar if wall_thickness <= 0.",
        params: &[
            req!("length"),
            req!("width"),
            req!("height"),
            ParamSpec::defaulted("wall_thickness", Length, 0.0),
        ],
        builder: |a: &Arguments| {
            sections::make_rect_tube(
                a.number("length")?,
                a.number("width")?,
                a.number("height")?,
                a.number("wall_thickness")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_pipe",
        summary: "Pipe, hollow roller or round bar (inner_d <= 0 gives a solid bar).",
        params: &[req!("outer_d"), req!("inner_d"), req!("length")],
        builder: |a: &Arguments| {
            turned::make_pipe(a.number("outer_d")?, a.number("inner_d")?, a.number("length")?)
        },
    },
    PrimitiveSpec {
        name: "make_stepped_shaft",
        summary: "Shaft with 2 or 3 different diameters along its length.",
        params: &[
            req!("d1"),
            req!("L1"),
            req!("d2"),
            req!("L2"),
            ParamSpec::omittable("d3", Length),
            ParamSpec::omittable("L3", Length),
        ],
        builder: |a: &Arguments| {
            turned::make_stepped_shaft(
                a.number("d1")?,
                a.number("L1")?,
                a.number("d2")?,
                a.number("L2")?,
                a.optional("d3")?,
                a.optional("L3")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_flat_bar_2holes",
        summary: "Flat bar or link with two end holes, centred in width.",
        params: &[
            req!("length"),
            req!("width"),
            req!("thickness"),
            req!("hole_d"),
            req!("edge_offset"),
        ],
        builder: |a: &Arguments| {
            sections::make_flat_bar_2holes(
                a.number("length")?,
                a.number("width")?,
                a.number("thickness")?,
                a.number("hole_d")?,
                a.number("edge_offset")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_drum_with_flange",
        summary: "Spool, drum or roller with 0, 1 or 2 flanges and an optional bore.",
        params: &[
            req!("core_d"),
            req!("core_length"),
            req!("flange_d"),
            req!("flange_thickness"),
            ParamSpec::defaulted("flange_count", Count, 2.0),
            ParamSpec::defaulted("bore_d", Length, 0.0),
        ],
        builder: |a: &Arguments| {
            turned::make_drum_with_flange(
                a.number("core_d")?,
                a.number("core_length")?,
                a.number("flange_d")?,
                a.number("flange_thickness")?,
                a.count("flange_count")?,
                a.number("bore_d")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_shaft_with_keyway",
        summary: "Cylindrical shaft with a straight keyway along its length.",
        params: &[
            req!("shaft_diameter"),
            req!("shaft_length"),
            req!("key_width"),
            req!("key_depth"),
        ],
        builder: |a: &Arguments| {
            turned::make_shaft_with_keyway(
                a.number("shaft_diameter")?,
                a.number("shaft_length")?,
                a.number("key_width")?,
                a.number("key_depth")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_plate_with_slot",
        summary: "Plate with one oblong slot along its length.",
        params: &[
            req!("L"),
            req!("W"),
            req!("thickness"),
            req!("slot_width"),
            req!("edge_offset"),
        ],
        builder: |a: &Arguments| {
            plates::make_plate_with_slot(
                a.number("L")?,
                a.number("W")?,
                a.number("thickness")?,
                a.number("slot_width")?,
                a.number("edge_offset")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_plate_with_pocket",
        summary: "Plate with a rectangular recess on the top face.",
        params: &[
            req!("L"),
            req!("W"),
            req!("thickness"),
            req!("pocket_length"),
            req!("pocket_width"),
            req!("pocket_depth"),
        ],
        builder: |a: &Arguments| {
            plates::make_plate_with_pocket(
                a.number("L")?,
                a.number("W")?,
                a.number("thickness")?,
                a.number("pocket_length")?,
                a.number("pocket_width")?,
                a.number("pocket_depth")?,
            )
        },
    },
    PrimitiveSpec {
        name: "make_v_pulley",
        summary: "V-belt pulley with one groove; groove_angle is the included angle in degrees.",
        params: &[
            req!("outer_d"),
            req!("width"),
            req!("bore_d"),
            req!("groove_width"),
            ParamSpec::defaulted("groove_angle", Angle, 40.0),
        ],
        builder: |a: &Arguments| {
            turned::make_v_pulley(
                a.number("outer_d")?,
                a.number("width")?,
                a.number("bore_d")?,
                a.number("groove_width")?,
                a.number("groove_angle")?,
            )
        },
    },
];

/// Immutable, process-wide table of allowed primitives.
///
/// The names in this table are the allow-list: nothing outside it can be
/// called by a generated program.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    entries: &'static [PrimitiveSpec],
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// The built-in primitive library.
    pub fn standard() -> Self {
        Self {
            entries: PRIMITIVES,
        }
    }

    pub fn new(entries: &'static [PrimitiveSpec]) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static PrimitiveSpec> {
        self.entries.iter().find(|spec| spec.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static PrimitiveSpec> + use<> {
        let entries = self.entries;
        entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + use<> {
        self.iter().map(|spec| spec.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Closest registered name, for "did you mean" hints.
    pub fn suggest(&self, name: &str) -> Option<&'static str> {
        self.names()
            .map(|candidate| (candidate, levenshtein(name, candidate)))
            .min_by_key(|(_, distance)| *distance)
            .filter(|(_, distance)| *distance <= 3)
            .map(|(candidate, _)| candidate)
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0usize; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}
