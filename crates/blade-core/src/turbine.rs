//! Turbine template registry and turbulence classes.

use serde::{Deserialize, Serialize};

use crate::errors::{BladeError, ErrorInfo};

/// Blade length of the reference turbine that variable domains are quoted for.
pub const REFERENCE_BLADE_LENGTH: f64 = 61.5;

/// Solver template bundled with the campaign tooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurbineTemplate {
    /// Template identifier used in configuration.
    pub id: &'static str,
    /// Blade length in metres.
    pub blade_length: f64,
    /// Initial chord control points (m).
    pub chord_init: [f64; 4],
    /// Initial twist control points (deg).
    pub twist_init: [f64; 4],
}

const WINDPACT_TWIST: [f64; 4] = [11.10, 6.35, 0.95, 0.08];

/// All recognized templates.
pub const TEMPLATES: [TurbineTemplate; 5] = [
    TurbineTemplate {
        id: "NREL5MW",
        blade_length: 61.5,
        chord_init: [3.2612, 4.5709, 3.3178, 1.4621],
        twist_init: [13.2783, 7.46036, 2.89317, -0.0878099],
    },
    TurbineTemplate {
        id: "WP_0.75MW",
        blade_length: 23.75,
        chord_init: [1.392, 1.723, 1.132, 0.700],
        twist_init: WINDPACT_TWIST,
    },
    TurbineTemplate {
        id: "WP_1.5MW",
        blade_length: 33.25,
        chord_init: [1.949, 2.412, 1.585, 0.980],
        twist_init: WINDPACT_TWIST,
    },
    TurbineTemplate {
        id: "WP_3.0MW",
        blade_length: 49.5 - 2.475,
        chord_init: [2.756, 3.412, 2.242, 1.386],
        twist_init: WINDPACT_TWIST,
    },
    TurbineTemplate {
        id: "WP_5.0MW",
        blade_length: 64.0 - 3.2,
        chord_init: [3.564, 4.411, 2.898, 1.793],
        twist_init: WINDPACT_TWIST,
    },
];

/// Looks up a template by identifier.
pub fn template(id: &str) -> Result<&'static TurbineTemplate, BladeError> {
    TEMPLATES.iter().find(|tpl| tpl.id == id).ok_or_else(|| {
        BladeError::Config(
            ErrorInfo::new("unknown-template", "unrecognized turbine template")
                .with_context("template", id)
                .with_hint("executable must be built from source for new templates"),
        )
    })
}

impl TurbineTemplate {
    /// Ratio used to rescale chord domains quoted for the reference blade.
    pub fn length_ratio(&self) -> f64 {
        self.blade_length / REFERENCE_BLADE_LENGTH
    }
}

/// IEC turbulence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurbulenceClass {
    /// High turbulence.
    A,
    /// Medium turbulence.
    B,
    /// Low turbulence.
    C,
}

impl TurbulenceClass {
    /// Parses a single-letter class label.
    pub fn parse(label: &str) -> Result<Self, BladeError> {
        match label {
            "A" => Ok(TurbulenceClass::A),
            "B" => Ok(TurbulenceClass::B),
            "C" => Ok(TurbulenceClass::C),
            other => Err(BladeError::Config(
                ErrorInfo::new("unknown-turbulence-class", "turbulence class must be A, B or C")
                    .with_context("class", other),
            )),
        }
    }

    /// Reference turbulence intensity for the class.
    pub fn intensity(&self) -> f64 {
        match self {
            TurbulenceClass::A => 0.12,
            TurbulenceClass::B => 0.14,
            TurbulenceClass::C => 0.16,
        }
    }

    /// Label used in directory names.
    pub fn label(&self) -> &'static str {
        match self {
            TurbulenceClass::A => "A",
            TurbulenceClass::B => "B",
            TurbulenceClass::C => "C",
        }
    }
}
