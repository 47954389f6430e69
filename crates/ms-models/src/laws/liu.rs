//! Liu et al. (2005) rhyolitic H2O and CO2 solubility.
//!
//! Closed-form fits in the partial pressures of the two fluid species
//! (MPa) and temperature (K). Both laws are mixed-fluid aware: the
//! companion species' partial pressure enters the fit directly.

use crate::activity::ActivityModel;
use crate::calibration::CalibrationWindow;
use crate::error::ModelResult;
use crate::fugacity::FugacityModel;
use crate::law::SolubilityLaw;
use ms_chem::{Composition, Volatile};

const WINDOW: CalibrationWindow = CalibrationWindow {
    pressure_bars: (1.0, 5000.0),
    temperature_k: (973.15, 1473.15),
};

/// Partial pressures (H2O, CO2) in MPa for an H2O mole fraction.
fn partial_pressures_mpa(p_bars: f64, x_h2o: f64) -> (f64, f64) {
    let p_mpa = p_bars / 10.0;
    (x_h2o * p_mpa, (1.0 - x_h2o) * p_mpa)
}

#[derive(Debug, Clone)]
pub struct LiuWater {
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl Default for LiuWater {
    fn default() -> Self {
        Self {
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }
}

impl SolubilityLaw for LiuWater {
    fn name(&self) -> &'static str {
        "Liu H2O"
    }

    fn species(&self) -> Volatile {
        Volatile::H2O
    }

    fn fugacity_model(&self) -> &FugacityModel {
        &self.fugacity
    }

    fn activity_model(&self) -> &ActivityModel {
        &self.activity
    }

    /// Rhyolite-specific fit with no free compositional terms.
    fn preprocess(&self, sample: &Composition) -> ModelResult<Composition> {
        Ok(*sample)
    }

    fn dissolved_preprocessed(
        &self,
        p_bars: f64,
        t_k: f64,
        _sample: &Composition,
        x_fluid: f64,
    ) -> ModelResult<f64> {
        if x_fluid == 0.0 || p_bars <= 0.0 {
            return Ok(0.0);
        }
        let (pw, pc) = partial_pressures_mpa(p_bars, x_fluid);
        let sqrt_pw = pw.sqrt();
        let wt = (354.94 * sqrt_pw + 9.623 * pw - 1.5223 * pw.powf(1.5)) / t_k
            + 0.0012439 * pw.powf(1.5)
            + pc * (-1.084e-4 * sqrt_pw - 1.362e-5 * pw);
        Ok(wt.max(0.0))
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}

#[derive(Debug, Clone)]
pub struct LiuCarbon {
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl Default for LiuCarbon {
    fn default() -> Self {
        Self {
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }
}

impl SolubilityLaw for LiuCarbon {
    fn name(&self) -> &'static str {
        "Liu CO2"
    }

    fn species(&self) -> Volatile {
        Volatile::CO2
    }

    fn fugacity_model(&self) -> &FugacityModel {
        &self.fugacity
    }

    fn activity_model(&self) -> &ActivityModel {
        &self.activity
    }

    fn preprocess(&self, sample: &Composition) -> ModelResult<Composition> {
        Ok(*sample)
    }

    fn dissolved_preprocessed(
        &self,
        p_bars: f64,
        t_k: f64,
        _sample: &Composition,
        x_fluid: f64,
    ) -> ModelResult<f64> {
        if x_fluid == 0.0 || p_bars <= 0.0 {
            return Ok(0.0);
        }
        // x_fluid is the CO2 mole fraction here; water is the remainder.
        let (pw, pc) = partial_pressures_mpa(p_bars, 1.0 - x_fluid);
        let ppm = pc * (5668.0 - 55.99 * pw) / t_k
            + pc * (0.4133 * pw.sqrt() + 2.041e-3 * pw.powf(1.5));
        Ok((ppm / 1e4).max(0.0))
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}
