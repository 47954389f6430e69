//! Iacono-Marziano et al. (2012) H2O and CO2 solubility.
//!
//! Both laws are log-linear fits whose compositional control is NBO/O, the
//! non-bridging-oxygen per total-oxygen ratio of the melt, computed from
//! molar oxide proportions. Two coefficient sets are published: a hydrous
//! parameterization (dissolved water counts as a network modifier) and an
//! anhydrous one. The hydrous water law is implicit, since the predicted
//! water content feeds back into NBO/O; the hydrous CO2 law consults the
//! companion water law before evaluating.

use crate::activity::ActivityModel;
use crate::calibration::CalibrationWindow;
use crate::error::{ModelError, ModelResult};
use crate::fugacity::FugacityModel;
use crate::law::SolubilityLaw;
use ms_chem::{Composition, Normalization, Oxide, Volatile};
use ms_solver::{ScalarConfig, SolverError, solve_scalar};

const WINDOW: CalibrationWindow = CalibrationWindow {
    pressure_bars: (100.0, 10_000.0),
    temperature_k: (1373.15, 1673.15),
};

/// Which published coefficient set to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameterization {
    Hydrous,
    Anhydrous,
}

struct WaterCoeffs {
    a: f64,
    b: f64,
    big_b: f64,
    c: f64,
}

struct CarbonCoeffs {
    d_h2o: f64,
    d_ai: f64,
    d_fm: f64,
    d_nk: f64,
    a: f64,
    b: f64,
    big_b: f64,
    c: f64,
}

fn water_coeffs(parameterization: Parameterization) -> WaterCoeffs {
    match parameterization {
        Parameterization::Hydrous => WaterCoeffs {
            a: 0.52096846,
            b: 2.11575907,
            big_b: -3.24443335,
            c: -0.02238884,
        },
        Parameterization::Anhydrous => WaterCoeffs {
            a: 0.54,
            b: 1.24,
            big_b: -2.95,
            c: 0.02,
        },
    }
}

fn carbon_coeffs(parameterization: Parameterization) -> CarbonCoeffs {
    match parameterization {
        Parameterization::Hydrous => CarbonCoeffs {
            d_h2o: -16.4,
            d_ai: 4.4,
            d_fm: -17.1,
            d_nk: 22.8,
            a: 1.0,
            b: 17.3,
            big_b: -6.0,
            c: 0.12,
        },
        Parameterization::Anhydrous => CarbonCoeffs {
            d_h2o: 2.3,
            d_ai: 3.8,
            d_fm: -16.3,
            d_nk: 20.1,
            a: 1.0,
            b: 15.8,
            big_b: -5.3,
            c: 0.14,
        },
    }
}

/// NBO/O from molar oxide proportions.
///
/// The ratio is invariant to the normalization total, so hydrous and
/// anhydrous variants differ only in whether H2O joins the modifier and
/// oxygen sums.
fn nbo_o(sample: &Composition, parameterization: Parameterization) -> ModelResult<f64> {
    let x = match parameterization {
        Parameterization::Hydrous => sample.mole_oxide_fractions(),
        Parameterization::Anhydrous => sample.mole_oxide_fractions_anhydrous(),
    };
    let mut nbo = 2.0
        * (x.get(Oxide::K2O) + x.get(Oxide::Na2O) + x.get(Oxide::CaO) + x.get(Oxide::MgO)
            + x.get(Oxide::FeO)
            - x.get(Oxide::Al2O3));
    let mut o = 2.0 * x.get(Oxide::SiO2)
        + 2.0 * x.get(Oxide::TiO2)
        + 3.0 * x.get(Oxide::Al2O3)
        + x.get(Oxide::MgO)
        + x.get(Oxide::FeO)
        + x.get(Oxide::CaO)
        + x.get(Oxide::Na2O)
        + x.get(Oxide::K2O);
    if parameterization == Parameterization::Hydrous {
        nbo += 2.0 * x.get(Oxide::H2O);
        o += x.get(Oxide::H2O);
    }
    if o <= 0.0 {
        return Err(ModelError::input(
            "NBO/O undefined: composition has no network oxygens",
        ));
    }
    Ok(nbo / o)
}

#[derive(Debug, Clone)]
pub struct IaconoMarzianoWater {
    parameterization: Parameterization,
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl IaconoMarzianoWater {
    pub fn new(parameterization: Parameterization) -> Self {
        Self {
            parameterization,
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }

    fn predicted(&self, sample: &Composition, fug_bars: f64, p_bars: f64, t_k: f64) -> ModelResult<f64> {
        let coeffs = water_coeffs(self.parameterization);
        let nbo = nbo_o(sample, self.parameterization)?;
        Ok((coeffs.a * fug_bars.ln() + coeffs.b * nbo + coeffs.big_b + coeffs.c * p_bars / t_k)
            .exp())
    }
}

impl Default for IaconoMarzianoWater {
    fn default() -> Self {
        Self::new(Parameterization::Hydrous)
    }
}

impl SolubilityLaw for IaconoMarzianoWater {
    fn name(&self) -> &'static str {
        match self.parameterization {
            Parameterization::Hydrous => "Iacono-Marziano H2O (hydrous)",
            Parameterization::Anhydrous => "Iacono-Marziano H2O (anhydrous)",
        }
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
            return Ok(0.0);
        }
        let fug = self.fugacity.fugacity(p_bars, t_k, x_fluid)?;
        if fug <= 0.0 {
            return Ok(0.0);
        }
        match self.parameterization {
            Parameterization::Anhydrous => self.predicted(sample, fug, p_bars, t_k),
            Parameterization::Hydrous => {
                // Dissolved water raises NBO/O which raises dissolved
                // water; solve the fixed point as a root in H2O wt%.
                let residual = |h: f64| {
                    let h = h.max(0.0);
                    let trial = sample
                        .with(Oxide::H2O, h)
                        .map_err(|e| SolverError::Evaluation { what: e.to_string() })?;
                    let predicted = self
                        .predicted(&trial, fug, p_bars, t_k)
                        .map_err(|e| SolverError::Evaluation { what: e.to_string() })?;
                    Ok(predicted - h)
                };
                let config = ScalarConfig {
                    max_iterations: 200,
                    abs_tol: 1e-10,
                    ..Default::default()
                };
                let h = solve_scalar(residual, 1.0, 2.0, Some(0.0), "hydrous NBO/O water", &config)?;
                Ok(h.max(0.0))
            }
        }
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}

#[derive(Debug, Clone)]
pub struct IaconoMarzianoCarbon {
    parameterization: Parameterization,
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl IaconoMarzianoCarbon {
    pub fn new(parameterization: Parameterization) -> Self {
        Self {
            parameterization,
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }
}

impl Default for IaconoMarzianoCarbon {
    fn default() -> Self {
        Self::new(Parameterization::Hydrous)
    }
}

impl SolubilityLaw for IaconoMarzianoCarbon {
    fn name(&self) -> &'static str {
        match self.parameterization {
            Parameterization::Hydrous => "Iacono-Marziano CO2 (hydrous)",
            Parameterization::Anhydrous => "Iacono-Marziano CO2 (anhydrous)",
        }
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
        let fug = self.fugacity.fugacity(p_bars, t_k, x_fluid)?;
        if fug <= 0.0 {
            return Ok(0.0);
        }
        // The hydrous fit was regressed with the equilibrium water content
        // in the melt; reconstruct it from the companion law at the
        // complementary fluid fraction.
        let sample_h = if self.parameterization == Parameterization::Hydrous {
            let water = IaconoMarzianoWater::new(self.parameterization);
            let h = water.dissolved_preprocessed(p_bars, t_k, sample, 1.0 - x_fluid)?;
            sample.with(Oxide::H2O, h)?
        } else {
            *sample
        };

        let coeffs = carbon_coeffs(self.parameterization);
        let x = sample_h.mole_oxide_fractions();
        let alkaline_earth = x.get(Oxide::CaO) + x.get(Oxide::K2O) + x.get(Oxide::Na2O);
        if alkaline_earth <= 0.0 {
            return Err(ModelError::input(
                "Al/(Ca+K+Na) undefined: no Ca, K, or Na in composition",
            ));
        }
        let ai = x.get(Oxide::Al2O3) / alkaline_earth;
        let fm = x.get(Oxide::FeO) + x.get(Oxide::MgO);
        let nk = x.get(Oxide::Na2O) + x.get(Oxide::K2O);
        let nbo = nbo_o(&sample_h, self.parameterization)?;

        let ln_ppm = coeffs.d_h2o * x.get(Oxide::H2O)
            + coeffs.d_ai * ai
            + coeffs.d_fm * fm
            + coeffs.d_nk * nk
            + coeffs.a * fug.ln()
            + coeffs.b * nbo
            + coeffs.big_b
            + coeffs.c * p_bars / t_k;
        Ok(ln_ppm.exp() / 1e4)
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}
