//! The solubility-law abstraction.
//!
//! Each published law implements the small required surface (its closed
//! form plus preprocessing and calibration window); the inverse problem
//! (saturation pressure) and the saturated/undersaturated query are
//! provided on top of it, so every law inverts through the same solver
//! discipline.

use crate::activity::ActivityModel;
use crate::calibration::{CalibrationReport, CalibrationWindow};
use crate::error::{ModelError, ModelResult};
use crate::fugacity::FugacityModel;
use crate::laws::{
    AllisonCarbon, DixonCarbon, DixonWater, IaconoMarzianoCarbon, IaconoMarzianoWater, LiuCarbon,
    LiuWater, ShishkinaCarbon, ShishkinaWater,
};
use crate::types::{FluidPresence, validate_x_fluid};
use ms_chem::{Composition, Volatile};
use ms_core::units::{Pressure, Temperature, pressure_bars, temperature_k};
use ms_solver::{ScalarConfig, SolverError, solve_scalar};

/// Lowest pressure the saturation search will probe [bars].
pub const SATURATION_FLOOR_BARS: f64 = 1e-3;

/// Published seed pair for the saturation-pressure inversion [bars].
const SATURATION_SEEDS_BARS: (f64, f64) = (1000.0, 2000.0);

fn saturation_solver_config() -> ScalarConfig {
    ScalarConfig {
        max_iterations: 200,
        abs_tol: 1e-8,
        ..Default::default()
    }
}

/// One published solubility relationship for a single volatile species.
pub trait SolubilityLaw {
    fn name(&self) -> &'static str;

    /// The volatile species this law models.
    fn species(&self) -> Volatile;

    fn fugacity_model(&self) -> &FugacityModel;

    fn activity_model(&self) -> &ActivityModel;

    /// Law-specific composition normalization. Every public entry point
    /// routes the sample through this exactly once.
    fn preprocess(&self, sample: &Composition) -> ModelResult<Composition>;

    /// Dissolved wt% of the species at the given conditions; `sample` must
    /// already be preprocessed. Pressure in bars, temperature in kelvin.
    fn dissolved_preprocessed(
        &self,
        p_bars: f64,
        t_k: f64,
        sample: &Composition,
        x_fluid: f64,
    ) -> ModelResult<f64>;

    /// Published calibration window of the law itself.
    fn calibration_window(&self) -> CalibrationWindow;

    /// Dissolved wt% of the species at (P, T) for a fluid containing this
    /// species at mole fraction `x_fluid`.
    fn dissolved_volatiles(
        &self,
        pressure: Pressure,
        temperature: Temperature,
        sample: &Composition,
        x_fluid: f64,
    ) -> ModelResult<f64> {
        let x = validate_x_fluid(x_fluid)?;
        let prepped = self.preprocess(sample)?;
        let wt =
            self.dissolved_preprocessed(pressure_bars(pressure), temperature_k(temperature), &prepped, x)?;
        if !wt.is_finite() {
            return Err(ModelError::Convergence(SolverError::Evaluation {
                what: format!("{} produced a non-finite dissolved content", self.name()),
            }));
        }
        Ok(wt.max(0.0))
    }

    /// Pressure [bars] at which a pure fluid of this species saturates the
    /// sample's dissolved content.
    ///
    /// 1-D root over pressure from the published seed pair; low-pressure
    /// evaluations where the fugacity degenerates to zero count as valid
    /// zero crossings, not errors.
    fn saturation_pressure(
        &self,
        temperature: Temperature,
        sample: &Composition,
    ) -> ModelResult<f64> {
        let target = sample.volatile(self.species());
        if target <= 0.0 {
            return Err(ModelError::saturation(format!(
                "sample contains no {} to saturate",
                self.species().key()
            )));
        }
        let prepped = self.preprocess(sample)?;
        let t_k = temperature_k(temperature);
        let residual = |p: f64| {
            self.dissolved_preprocessed(p.max(SATURATION_FLOOR_BARS), t_k, &prepped, 1.0)
                .map(|wt| wt - target)
                .map_err(|e| SolverError::Evaluation {
                    what: e.to_string(),
                })
        };
        let config = saturation_solver_config();
        let root = solve_scalar(
            residual,
            SATURATION_SEEDS_BARS.0,
            SATURATION_SEEDS_BARS.1,
            Some(SATURATION_FLOOR_BARS),
            "saturation pressure",
            &config,
        )
        .map_err(|e| match e {
            SolverError::BracketFailed { .. } => ModelError::saturation(format!(
                "no saturation pressure for {} wt% {} within the search domain",
                target,
                self.species().key()
            )),
            other => ModelError::Convergence(other),
        })?;
        Ok(root.max(SATURATION_FLOOR_BARS))
    }

    /// Whether the sample at the queried pressure holds a free fluid phase.
    fn equilibrium_fluid_presence(
        &self,
        pressure: Pressure,
        temperature: Temperature,
        sample: &Composition,
    ) -> ModelResult<FluidPresence> {
        let sat_p = self.saturation_pressure(temperature, sample)?;
        if pressure_bars(pressure) <= sat_p {
            Ok(FluidPresence::Saturated)
        } else {
            Ok(FluidPresence::Undersaturated)
        }
    }

    /// Structured calibration report covering the law and both sub-models.
    fn check_calibration_range(
        &self,
        pressure: Pressure,
        temperature: Temperature,
    ) -> CalibrationReport {
        let p = pressure_bars(pressure);
        let t = temperature_k(temperature);
        let mut report = self.calibration_window().report(self.name(), p, t);
        report.extend(self.fugacity_model().calibration(p, t));
        report.extend(self.activity_model().calibration(p, t));
        report
    }
}

/// Closed set of solubility-law variants.
///
/// Every implementation is known at compile time; dispatch is a plain
/// match, so the set is exhaustively testable.
#[derive(Debug, Clone)]
pub enum Law {
    ShishkinaCarbon(ShishkinaCarbon),
    ShishkinaWater(ShishkinaWater),
    DixonCarbon(DixonCarbon),
    DixonWater(DixonWater),
    IaconoMarzianoCarbon(IaconoMarzianoCarbon),
    IaconoMarzianoWater(IaconoMarzianoWater),
    AllisonCarbon(AllisonCarbon),
    LiuCarbon(LiuCarbon),
    LiuWater(LiuWater),
}

macro_rules! dispatch {
    ($self:expr, $law:ident => $body:expr) => {
        match $self {
            Law::ShishkinaCarbon($law) => $body,
            Law::ShishkinaWater($law) => $body,
            Law::DixonCarbon($law) => $body,
            Law::DixonWater($law) => $body,
            Law::IaconoMarzianoCarbon($law) => $body,
            Law::IaconoMarzianoWater($law) => $body,
            Law::AllisonCarbon($law) => $body,
            Law::LiuCarbon($law) => $body,
            Law::LiuWater($law) => $body,
        }
    };
}

impl SolubilityLaw for Law {
    fn name(&self) -> &'static str {
        dispatch!(self, law => law.name())
    }

    fn species(&self) -> Volatile {
        dispatch!(self, law => law.species())
    }

    fn fugacity_model(&self) -> &FugacityModel {
        dispatch!(self, law => law.fugacity_model())
    }

    fn activity_model(&self) -> &ActivityModel {
        dispatch!(self, law => law.activity_model())
    }

    fn preprocess(&self, sample: &Composition) -> ModelResult<Composition> {
        dispatch!(self, law => law.preprocess(sample))
    }

    fn dissolved_preprocessed(
        &self,
        p_bars: f64,
        t_k: f64,
        sample: &Composition,
        x_fluid: f64,
    ) -> ModelResult<f64> {
        dispatch!(self, law => law.dissolved_preprocessed(p_bars, t_k, sample, x_fluid))
    }

    fn calibration_window(&self) -> CalibrationWindow {
        dispatch!(self, law => law.calibration_window())
    }
}
