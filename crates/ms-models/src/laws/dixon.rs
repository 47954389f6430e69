//! Dixon (1997) tholeiitic basalt H2O and CO2 solubility.
//!
//! Both laws are van't Hoff molecular-species equilibria referenced to
//! 1200 degrees C, with an SiO2-keyed standard-state mole fraction and
//! weight conversions on a one-oxygen melt basis (formula weight
//! 36.594 g/mol). Total water additionally requires solving the
//! molecular-water/hydroxyl speciation equilibrium, an implicit relation
//! with a unique root in (0, 1).

use crate::activity::ActivityModel;
use crate::calibration::CalibrationWindow;
use crate::error::{ModelError, ModelResult};
use crate::fugacity::FugacityModel;
use crate::law::SolubilityLaw;
use ms_chem::{Composition, Normalization, Oxide, Volatile};
use ms_core::units::constants::R_CM3_BAR;
use ms_solver::{ScalarConfig, bisect};

/// One-oxygen formula weight of the reference tholeiite [g/mol].
const MELT_FW_ONE_OXYGEN: f64 = 36.594;
/// Reference temperature of the van't Hoff expressions [K].
const T_REF_K: f64 = 1473.15;
/// Reference pressure [bars].
const P_REF_BARS: f64 = 1.0;

const WINDOW: CalibrationWindow = CalibrationWindow {
    pressure_bars: (0.0, 5000.0),
    temperature_k: (1073.15, 1673.15),
};

/// Mole-fraction-to-wt% conversion on the one-oxygen melt basis.
fn one_oxygen_wt_percent(x: f64, species_mass: f64) -> f64 {
    100.0 * species_mass * x / (species_mass * x + (1.0 - x) * MELT_FW_ONE_OXYGEN)
}

#[derive(Debug, Clone)]
pub struct DixonCarbon {
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl Default for DixonCarbon {
    fn default() -> Self {
        Self {
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }
}

impl DixonCarbon {
    /// Standard-state carbonate mole fraction, keyed on melt SiO2.
    fn xco3_std(sample: &Composition) -> f64 {
        let si = sample.get(Oxide::SiO2);
        if si > 48.9 {
            3.817e-7
        } else {
            (8.697e-6 - 1.697e-7 * si).max(0.0)
        }
    }
}

impl SolubilityLaw for DixonCarbon {
    fn name(&self) -> &'static str {
        "Dixon CO2"
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
        const DELTA_V: f64 = 23.0; // cm3/mol
        let xco3 = Self::xco3_std(sample)
            * fug
            * (-DELTA_V * (p_bars - P_REF_BARS) / (R_CM3_BAR * T_REF_K)).exp();
        Ok(one_oxygen_wt_percent(xco3, Volatile::CO2.molar_mass()))
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}

#[derive(Debug, Clone)]
pub struct DixonWater {
    fugacity: FugacityModel,
    activity: ActivityModel,
}

impl Default for DixonWater {
    fn default() -> Self {
        Self {
            fugacity: FugacityModel::Ideal,
            activity: ActivityModel::Ideal,
        }
    }
}

impl DixonWater {
    /// Standard-state molecular-water mole fraction, keyed on melt SiO2.
    fn xh2o_std(sample: &Composition) -> f64 {
        let si = sample.get(Oxide::SiO2);
        if si > 48.9 {
            3.28e-5
        } else {
            (-3.04e-5 + 1.29e-6 * si).max(0.0)
        }
    }

    /// Mole fraction of molecular water at the given fugacity.
    fn x_molecular(&self, p_bars: f64, fug: f64, sample: &Composition) -> f64 {
        const V_H2O: f64 = 12.0; // cm3/mol
        Self::xh2o_std(sample)
            * fug
            * (-V_H2O * (p_bars - P_REF_BARS) / (R_CM3_BAR * T_REF_K)).exp()
    }

    /// Hydroxyl mole fraction from the regular-solution speciation
    /// equilibrium, solved as a bounded root in (0, 1 - X_H2Om).
    fn x_hydroxyl(x_molecular: f64) -> ModelResult<f64> {
        if x_molecular <= 0.0 {
            return Ok(0.0);
        }
        if x_molecular >= 1.0 {
            return Err(ModelError::input(
                "molecular water mole fraction reached unity; outside Dixon validity",
            ));
        }
        const A: f64 = 0.403;
        const B: f64 = 15.333;
        const C: f64 = 10.894;
        let residual = |xoh: f64| {
            let xo = 1.0 - x_molecular - xoh;
            Ok((xoh * xoh / (x_molecular * xo)).ln() - (A - B * xoh - C * x_molecular))
        };
        let hi = 1.0 - x_molecular;
        let config = ScalarConfig {
            abs_tol: 1e-12,
            ..Default::default()
        };
        // ln(XOH^2) -> -inf at the lower end and +inf as XO -> 0, so the
        // bracket always straddles the root.
        let root = bisect(residual, (1e-12, hi - 1e-12 * hi), &config)?;
        Ok(root)
    }
}

impl SolubilityLaw for DixonWater {
    fn name(&self) -> &'static str {
        "Dixon H2O"
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
        let fug = self.fugacity.fugacity(p_bars, t_k, x_fluid)?;
        if fug <= 0.0 {
            return Ok(0.0);
        }
        let xm = self.x_molecular(p_bars, fug, sample);
        if xm <= 0.0 {
            return Ok(0.0);
        }
        let xoh = Self::x_hydroxyl(xm)?;
        let xb = xm + 0.5 * xoh;
        Ok(one_oxygen_wt_percent(xb, Volatile::H2O.molar_mass()))
    }

    fn calibration_window(&self) -> CalibrationWindow {
        WINDOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_core::units::{bar, degc};

    fn tholeiite() -> Composition {
        Composition::new([
            (Oxide::SiO2, 48.5),
            (Oxide::TiO2, 1.5),
            (Oxide::Al2O3, 14.0),
            (Oxide::FeO, 10.0),
            (Oxide::MgO, 8.0),
            (Oxide::CaO, 12.0),
            (Oxide::Na2O, 2.5),
            (Oxide::K2O, 0.5),
            (Oxide::H2O, 2.0),
            (Oxide::CO2, 0.05),
        ])
        .unwrap()
    }

    #[test]
    fn xco3_std_silica_branches() {
        let low_si = Composition::new([(Oxide::SiO2, 45.0)]).unwrap();
        let high_si = Composition::new([(Oxide::SiO2, 55.0)]).unwrap();
        assert!(DixonCarbon::xco3_std(&low_si) > DixonCarbon::xco3_std(&high_si));
        assert_eq!(DixonCarbon::xco3_std(&high_si), 3.817e-7);
    }

    #[test]
    fn carbon_magnitude_at_one_kbar() {
        // Tholeiite at 1 kbar holds a few hundred ppm CO2.
        let law = DixonCarbon::default();
        let wt = law
            .dissolved_volatiles(bar(1000.0), degc(1200.0), &tholeiite(), 1.0)
            .unwrap();
        assert!(wt > 0.01 && wt < 0.1, "CO2 = {wt} wt%");
    }

    #[test]
    fn carbon_zero_fluid_gives_zero() {
        let law = DixonCarbon::default();
        let wt = law
            .dissolved_volatiles(bar(1000.0), degc(1200.0), &tholeiite(), 0.0)
            .unwrap();
        assert_eq!(wt, 0.0);
    }

    #[test]
    fn speciation_root_is_bounded() {
        for xm in [1e-6, 1e-4, 1e-2, 0.05, 0.2] {
            let xoh = DixonWater::x_hydroxyl(xm).unwrap();
            assert!(xoh > 0.0, "xm={xm} gave xoh={xoh}");
            assert!(xoh < 1.0 - xm, "xm={xm} gave xoh={xoh}");
        }
    }

    #[test]
    fn speciation_vanishes_with_molecular_water() {
        let tiny = DixonWater::x_hydroxyl(1e-10).unwrap();
        assert!(tiny < 1e-3);
        assert_eq!(DixonWater::x_hydroxyl(0.0).unwrap(), 0.0);
    }

    #[test]
    fn water_magnitude_at_one_kbar() {
        // Dixon predicts roughly 3-4 wt% total H2O at 1 kbar pure water.
        let law = DixonWater::default();
        let wt = law
            .dissolved_volatiles(bar(1000.0), degc(1200.0), &tholeiite(), 1.0)
            .unwrap();
        assert!(wt > 1.5 && wt < 6.0, "H2O = {wt} wt%");
    }

    #[test]
    fn water_increases_with_pressure() {
        let law = DixonWater::default();
        let mut last = 0.0;
        for p in [200.0, 500.0, 1000.0, 2000.0] {
            let wt = law
                .dissolved_volatiles(bar(p), degc(1200.0), &tholeiite(), 1.0)
                .unwrap();
            assert!(wt > last, "not monotonic at {p} bars");
            last = wt;
        }
    }

    #[test]
    fn carbon_round_trip_through_saturation() {
        let law = DixonCarbon::default();
        let sample = tholeiite();
        let sat_p = law.saturation_pressure(degc(1200.0), &sample).unwrap();
        let back = law
            .dissolved_volatiles(bar(sat_p), degc(1200.0), &sample, 1.0)
            .unwrap();
        assert!((back - 0.05).abs() < 1e-3, "round trip gave {back}");
    }
}
