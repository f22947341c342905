//! Recognized design-load-case classes and scenario categories.

use serde::{Deserialize, Serialize};

/// Wind-input category, which also selects the master source directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Full-field turbulent wind produced by the wind generator.
    Turbulent,
    /// Deterministic hub-height wind file.
    NonTurbulent,
}

/// Symbolic scenario classes understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoadCaseClass {
    /// Rated-speed nominal wind, not a certification load case.
    Nominal,
    /// Normal turbulence model (DLC 1.2).
    NormalTurbulence,
    /// Extreme turbulence model (DLC 1.3).
    ExtremeTurbulence,
    /// Extreme coherent gust with direction change (DLC 1.4).
    CoherentGust,
    /// Extreme wind shear (DLC 1.5).
    WindShear,
    /// Parked, 50-year extreme wind model (DLC 6.1).
    ParkedFiftyYear,
    /// Parked, 1-year extreme wind model (DLC 6.3).
    ParkedOneYear,
}

impl LoadCaseClass {
    /// Every recognized class in catalog order.
    pub const ALL: [LoadCaseClass; 7] = [
        LoadCaseClass::Nominal,
        LoadCaseClass::NormalTurbulence,
        LoadCaseClass::ExtremeTurbulence,
        LoadCaseClass::CoherentGust,
        LoadCaseClass::WindShear,
        LoadCaseClass::ParkedFiftyYear,
        LoadCaseClass::ParkedOneYear,
    ];

    /// Returns the class for a symbolic identifier such as `DLC_1_2`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.id() == id.trim())
    }

    /// Symbolic identifier used in configuration files.
    pub fn id(&self) -> &'static str {
        match self {
            LoadCaseClass::Nominal => "DLC_0_0",
            LoadCaseClass::NormalTurbulence => "DLC_1_2",
            LoadCaseClass::ExtremeTurbulence => "DLC_1_3",
            LoadCaseClass::CoherentGust => "DLC_1_4",
            LoadCaseClass::WindShear => "DLC_1_5",
            LoadCaseClass::ParkedFiftyYear => "DLC_6_1",
            LoadCaseClass::ParkedOneYear => "DLC_6_3",
        }
    }

    /// Turbulence model tag embedded in generated wind-file names.
    pub fn turbulence_tag(&self) -> Option<&'static str> {
        match self {
            LoadCaseClass::NormalTurbulence => Some("NTM"),
            LoadCaseClass::ExtremeTurbulence => Some("1ETM"),
            _ => None,
        }
    }

    /// True when the class expands over the seed × mean-wind-speed grid.
    pub fn is_turbulent(&self) -> bool {
        self.turbulence_tag().is_some()
    }
}
