//! Shishkina et al. (2014) basaltic H2O and CO2 solubility.
//!
//! The CO2 law is a log-linear fit against fugacity and the pi* basicity
//! index (network-modifying over network-forming cations); the H2O law is
//! a fugacity polynomial with a total-alkali compositional slope. Both fits
//! take fugacity in MPa.

use crate::activity::ActivityModel;
use crate::calibration::CalibrationWindow;
use crate::error::{ModelError, ModelResult};
use crate::fugacity::FugacityModel;
use crate::law::SolubilityLaw;
use ms_chem::{Composition, Normalization, Oxide, Volatile};

const WINDOW: CalibrationWindow = CalibrationWindow {
    pressure_bars: (500.0, 5000.0),
    temperature_k: (1423.15, 1523.15),
};

/// pi* = (Ca + 0.8 K + 0.7 Na + 0.4 Mg + 0.4 Fe) / (Si + Al) on
/// volatile-free cation fractions.
fn pi_star(sample: &Composition) -> ModelResult<f64> {
    let cations = sample.cation_fractions_anhydrous();
    let formers = cations.get(Oxide::SiO2) + cations.get(Oxide::Al2O3);
    if formers <= 0.0 {
        return Err(ModelError::input(
            "pi* undefined: composition has no network-forming cations",
        ));
    }
    let modifiers = cations.get(Oxide::CaO)
        + 0.8 * cations.get(Oxide::K2O)
        + 0.7 * cations.get(Oxide::Na2O)
        + 0.4 * cations.get(Oxide::MgO)
        + 0.4 * cations.get(Oxide::FeO);
    Ok(modifiers / formers)
}

#[derive(Debug, Clone)]
pub struct ShishkinaCarbon {
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl Default for ShishkinaCarbon {
    fn default() -> Self {
        Self {
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }
}

impl SolubilityLaw for ShishkinaCarbon {
    fn name(&self) -> &'static str {
        "Shishkina CO2"
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
        Ok(sample.normalized(Normalization::Standard)?)
    }

    fn dissolved_preprocessed(
        &self,
        p_bars: f64,
        t_k: f64,
        sample: &Composition,
        x_fluid: f64,
    ) -> ModelResult<f64> {
        let fug_bars = self.fugacity.fugacity(p_bars, t_k, x_fluid)?;
        if fug_bars <= 0.0 {
            return Ok(0.0);
        }
        let f_mpa = fug_bars / 10.0;
        let pi = pi_star(sample)?;
        let ppm = (1.150 * f_mpa.ln() + 6.71 * pi - 1.345).exp();
        Ok(ppm / 1e4)
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}

#[derive(Debug, Clone)]
pub struct ShishkinaWater {
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl Default for ShishkinaWater {
    fn default() -> Self {
        Self {
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }
}

impl SolubilityLaw for ShishkinaWater {
    fn name(&self) -> &'static str {
        "Shishkina H2O"
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

    fn preprocess(&self, sample: &Composition) -> ModelResult<Composition> {
        Ok(sample.normalized(Normalization::Standard)?)
    }

    fn dissolved_preprocessed(
        &self,
        p_bars: f64,
        t_k: f64,
        sample: &Composition,
        x_fluid: f64,
    ) -> ModelResult<f64> {
        if x_fluid == 0.0 {
            // A water-free fluid holds no water in equilibrium; the raw
            // polynomial extrapolates to a nonzero intercept there.
            return Ok(0.0);
        }
        let fug_bars = self.fugacity.fugacity(p_bars, t_k, x_fluid)?;
        let f = fug_bars / 10.0;
        let cations = sample.cation_fractions_anhydrous();
        let alkalis = cations.get(Oxide::Na2O) + cations.get(Oxide::K2O);
        let a = 3.36e-7 * f.powi(3) - 2.33e-5 * f.powi(2) + 0.0711 * f - 1.1309;
        let b = -1.2e-5 * f.powi(2) + 0.0196 * f + 1.1297;
        Ok((a * alkalis + b).max(0.0))
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}
