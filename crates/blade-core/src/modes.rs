//! Top-level run-mode selection and the options it implies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{BladeError, ErrorInfo};

/// Top-level campaign run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Optimize with the aeroelastic solver evaluated in the loop.
    SolverInLoop,
    /// Optimize without solver-derived fatigue data.
    NoSolver,
    /// Run every case once to build a fixed damage envelope.
    CalcFixedEnvelope,
    /// As [`RunMode::CalcFixedEnvelope`], starting from a previous design.
    CalcFixedEnvelopeSeq,
    /// Optimize against a previously computed envelope.
    OptWithFixedEnvelope,
    /// As [`RunMode::OptWithFixedEnvelope`], starting from a previous design.
    OptWithFixedEnvelopeSeq,
    /// Evaluate one training point of the surrogate design of experiments.
    TrainSurrogate,
    /// Optimize against a fitted surrogate model.
    OptWithSurrogate,
}

impl RunMode {
    /// Every mode in declaration order.
    pub const ALL: [RunMode; 8] = [
        RunMode::SolverInLoop,
        RunMode::NoSolver,
        RunMode::CalcFixedEnvelope,
        RunMode::CalcFixedEnvelopeSeq,
        RunMode::OptWithFixedEnvelope,
        RunMode::OptWithFixedEnvelopeSeq,
        RunMode::TrainSurrogate,
        RunMode::OptWithSurrogate,
    ];

    /// Configuration name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            RunMode::SolverInLoop => "solver_in_loop",
            RunMode::NoSolver => "no_solver",
            RunMode::CalcFixedEnvelope => "calc_fixed_envelope",
            RunMode::CalcFixedEnvelopeSeq => "calc_fixed_envelope_seq",
            RunMode::OptWithFixedEnvelope => "opt_with_fixed_envelope",
            RunMode::OptWithFixedEnvelopeSeq => "opt_with_fixed_envelope_seq",
            RunMode::TrainSurrogate => "train_surrogate",
            RunMode::OptWithSurrogate => "opt_with_surrogate",
        }
    }

    /// Expands the mode into the individual switches consumed downstream.
    pub fn flags(&self) -> RunFlags {
        let base = RunFlags::default();
        match self {
            RunMode::SolverInLoop => RunFlags {
                use_solver: true,
                ..base
            },
            RunMode::NoSolver => base,
            RunMode::CalcFixedEnvelope => RunFlags {
                use_solver: true,
                run_once: true,
                ..base
            },
            RunMode::CalcFixedEnvelopeSeq => RunFlags {
                use_solver: true,
                run_once: true,
                sequential: true,
                ..base
            },
            RunMode::OptWithFixedEnvelope => RunFlags {
                use_fixed_envelope: true,
                ..base
            },
            RunMode::OptWithFixedEnvelopeSeq => RunFlags {
                use_fixed_envelope: true,
                sequential: true,
                ..base
            },
            RunMode::TrainSurrogate => RunFlags {
                use_solver: true,
                run_once: true,
                train_surrogate: true,
                ..base
            },
            RunMode::OptWithSurrogate => RunFlags {
                use_surrogate: true,
                ..base
            },
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RunMode {
    type Err = BladeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| {
                BladeError::Config(
                    ErrorInfo::new("unknown-run-mode", "must choose a recognized run mode")
                        .with_context("mode", s),
                )
            })
    }
}

/// Switches derived from a [`RunMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunFlags {
    /// The aeroelastic solver is invoked.
    pub use_solver: bool,
    /// Cases are evaluated once instead of inside the optimizer loop.
    pub run_once: bool,
    /// The run evaluates a surrogate training point.
    pub train_surrogate: bool,
    /// A previously written envelope is consumed.
    pub use_fixed_envelope: bool,
    /// A fitted surrogate is consumed.
    pub use_surrogate: bool,
    /// The run continues from a previous optimization's design.
    pub sequential: bool,
}

/// Distribution fitted when extrapolating extreme moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremeFit {
    /// Normal distribution.
    Gaussian,
    /// Gumbel (type I extreme value) distribution.
    Gumbel,
    /// Two-parameter Weibull distribution.
    Weibull,
}

impl FromStr for ExtremeFit {
    type Err = BladeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(ExtremeFit::Gaussian),
            "gumbel" => Ok(ExtremeFit::Gumbel),
            "weibull" => Ok(ExtremeFit::Weibull),
            other => Err(BladeError::Config(
                ErrorInfo::new("unknown-fit", "unrecognized distribution fit type")
                    .with_context("fit", other),
            )),
        }
    }
}

/// Surrogate approximation handed to the external fitting library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurrogateModel {
    /// Ordinary kriging.
    #[serde(rename = "KRG")]
    Kriging,
    /// Kriging with partial least squares.
    #[serde(rename = "KPLS")]
    Kpls,
    /// Radial basis functions.
    #[serde(rename = "RBF")]
    Rbf,
    /// Linear least squares.
    #[serde(rename = "LS")]
    LeastSquares,
    /// Second-order polynomial.
    #[serde(rename = "QP")]
    Quadratic,
    /// Inverse distance weighting.
    #[serde(rename = "IDW")]
    InverseDistance,
}

impl FromStr for SurrogateModel {
    type Err = BladeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KRG" => Ok(SurrogateModel::Kriging),
            "KPLS" => Ok(SurrogateModel::Kpls),
            "RBF" => Ok(SurrogateModel::Rbf),
            "LS" => Ok(SurrogateModel::LeastSquares),
            "QP" => Ok(SurrogateModel::Quadratic),
            "IDW" => Ok(SurrogateModel::InverseDistance),
            other => Err(BladeError::Config(
                ErrorInfo::new("unknown-surrogate", "unrecognized surrogate model")
                    .with_context("model", other),
            )),
        }
    }
}
