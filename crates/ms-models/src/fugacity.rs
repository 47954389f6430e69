//! Fluid-species fugacity models.
//!
//! Two variants: the ideal gas (fugacity = P·X) and the Kerrick & Jacobs
//! (1981) hard-sphere modified Redlich-Kwong equation of state for mixed
//! H2O-CO2 fluids, a cubic-plus-virial form whose molar volume must be
//! found by root solving before the fugacity coefficient can be evaluated
//! analytically.

use crate::calibration::CalibrationReport;
use crate::error::{ModelError, ModelResult};
use ms_chem::Volatile;
use ms_core::units::constants::R_CM3_BAR;
use ms_solver::{ScalarConfig, solve_scalar};

/// Closed set of fugacity models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FugacityModel {
    /// Ideal gas: fugacity = total pressure times fluid mole fraction.
    Ideal,
    /// Kerrick & Jacobs (1981) mixed H2O-CO2 EOS for the given species.
    KerrickJacobs(Volatile),
}

/// The KJ81 mixing rules are calibrated below this temperature; hotter
/// fluids fall back to the pure-species coefficient scaled by X.
const KJ_MIXING_LIMIT_K: f64 = 1323.15;

impl FugacityModel {
    pub fn name(&self) -> &'static str {
        match self {
            FugacityModel::Ideal => "ideal gas",
            FugacityModel::KerrickJacobs(Volatile::CO2) => "Kerrick-Jacobs CO2",
            FugacityModel::KerrickJacobs(Volatile::H2O) => "Kerrick-Jacobs H2O",
        }
    }

    /// Fugacity [bars] of the species in a two-component H2O-CO2 fluid.
    ///
    /// `x_fluid` is the mole fraction of this model's species; the
    /// companion species makes up the remainder. `x_fluid = 0` returns 0
    /// without touching the EOS.
    pub fn fugacity(&self, p_bars: f64, t_k: f64, x_fluid: f64) -> ModelResult<f64> {
        if !(0.0..=1.0).contains(&x_fluid) || !x_fluid.is_finite() {
            return Err(ModelError::input(format!(
                "fluid mole fraction must lie in [0, 1], got {x_fluid}"
            )));
        }
        if p_bars <= 0.0 {
            return Ok(0.0);
        }
        match self {
            FugacityModel::Ideal => Ok(p_bars * x_fluid),
            FugacityModel::KerrickJacobs(species) => {
                if x_fluid == 0.0 {
                    return Ok(0.0);
                }
                // The mixing rules only hold in the calibrated temperature
                // window; above it, scale the pure-species fugacity by X.
                let x_eos = if t_k >= KJ_MIXING_LIMIT_K { 1.0 } else { x_fluid };
                let ln_phi = kj::ln_phi_mix(*species, p_bars, t_k, x_eos)?;
                Ok(p_bars * ln_phi.exp() * x_fluid)
            }
        }
    }

    pub fn calibration(&self, p_bars: f64, t_k: f64) -> CalibrationReport {
        let mut report = CalibrationReport::default();
        match self {
            FugacityModel::Ideal => {
                report.push(self.name(), "pressure", true);
                report.push(self.name(), "temperature", true);
            }
            FugacityModel::KerrickJacobs(_) => {
                report.push(self.name(), "pressure", p_bars <= 20_000.0);
                report.push(
                    self.name(),
                    "temperature",
                    (598.15..KJ_MIXING_LIMIT_K).contains(&t_k),
                );
            }
        }
        report
    }
}

/// Kerrick & Jacobs (1981) hard-sphere MRK internals.
mod kj {
    use super::*;

    /// Temperature-dependent attraction coefficients and covolume for one
    /// species [cm³, bar, K units].
    #[derive(Clone, Copy)]
    struct SpeciesCoeffs {
        b: f64,
        c: f64,
        d: f64,
        e: f64,
    }

    fn coeffs(species: Volatile, t: f64) -> SpeciesCoeffs {
        match species {
            Volatile::CO2 => SpeciesCoeffs {
                b: 58.0,
                c: (28.31 + 0.10721 * t - 8.81e-6 * t * t) * 1e6,
                d: (9380.0 - 8.53 * t + 1.189e-3 * t * t) * 1e6,
                e: (-368654.0 + 715.9 * t + 0.1534 * t * t) * 1e6,
            },
            Volatile::H2O => SpeciesCoeffs {
                b: 29.0,
                c: (290.78 - 0.30276 * t + 1.4774e-4 * t * t) * 1e6,
                d: (-8374.0 + 19.437 * t - 8.148e-3 * t * t) * 1e6,
                e: (76600.0 - 133.9 * t + 0.1071 * t * t) * 1e6,
            },
        }
    }

    fn companion(species: Volatile) -> Volatile {
        match species {
            Volatile::CO2 => Volatile::H2O,
            Volatile::H2O => Volatile::CO2,
        }
    }

    /// Geometric-mean cross term, floored at zero where a coefficient
    /// crosses sign at the edge of the calibrated window.
    fn cross(a: f64, b: f64) -> f64 {
        (a * b).max(0.0).sqrt()
    }

    /// Binary mixture coefficients at mole fraction `x` of the primary
    /// species.
    struct Mixture {
        b: f64,
        c: f64,
        d: f64,
        e: f64,
    }

    fn mix(own: &SpeciesCoeffs, other: &SpeciesCoeffs, x: f64) -> Mixture {
        let y = 1.0 - x;
        Mixture {
            b: x * own.b + y * other.b,
            c: x * x * own.c + 2.0 * x * y * cross(own.c, other.c) + y * y * other.c,
            d: x * x * own.d + 2.0 * x * y * cross(own.d, other.d) + y * y * other.d,
            e: x * x * own.e + 2.0 * x * y * cross(own.e, other.e) + y * y * other.e,
        }
    }

    /// EOS pressure [bars] at molar volume `v` [cm³/mol].
    fn pressure(m: &Mixture, t: f64, v: f64) -> f64 {
        let y = m.b / (4.0 * v);
        let repulsive = R_CM3_BAR * t * (1.0 + y + y * y - y * y * y) / (v * (1.0 - y).powi(3));
        let a = m.c + m.d / v + m.e / (v * v);
        let attractive = a / (t.sqrt() * v * (v + m.b));
        repulsive - attractive
    }

    /// Physical-regime volume seeds for the root solve; first matching row
    /// wins. The dense branch covers the low-temperature, high-pressure
    /// limb of the EOS where the nominal seeds straddle the hard-sphere
    /// singularity.
    struct SeedRegime {
        min_pressure_bars: f64,
        max_temperature_k: f64,
        seeds: (f64, f64),
    }

    const VOLUME_SEEDS: [SeedRegime; 2] = [
        SeedRegime {
            min_pressure_bars: 20_000.0,
            max_temperature_k: 800.0,
            seeds: (10.0, 20.0),
        },
        SeedRegime {
            min_pressure_bars: 0.0,
            max_temperature_k: f64::INFINITY,
            seeds: (40.0, 250.0),
        },
    ];

    fn volume_seeds(p: f64, t: f64) -> (f64, f64) {
        for regime in &VOLUME_SEEDS {
            if p >= regime.min_pressure_bars && t < regime.max_temperature_k {
                return regime.seeds;
            }
        }
        VOLUME_SEEDS[VOLUME_SEEDS.len() - 1].seeds
    }

    /// Molar volume [cm³/mol] of the mixture at (P, T).
    fn volume(m: &Mixture, p: f64, t: f64) -> ModelResult<f64> {
        // Below the hard-sphere packing limit the EOS is singular; the
        // residual clamps there so the solver is steered back into the
        // physical branch instead of erroring mid-iteration.
        let v_min = 0.26 * m.b;
        let residual = |v: f64| Ok(pressure(m, t, v.max(v_min)) - p);
        let (x0, x1) = volume_seeds(p, t);
        let config = ScalarConfig {
            abs_tol: 1e-6 * p.max(1.0),
            ..Default::default()
        };
        let v = solve_scalar(residual, x0, x1, Some(v_min), "EOS molar volume", &config)?;
        Ok(v.max(v_min))
    }

    /// Analytic fugacity coefficient of the primary species in the binary
    /// mixture, evaluated at the EOS molar volume.
    pub(super) fn ln_phi_mix(species: Volatile, p: f64, t: f64, x: f64) -> ModelResult<f64> {
        let own = coeffs(species, t);
        let other = coeffs(companion(species), t);
        let m = mix(&own, &other, x);
        let v = volume(&m, p, t)?;

        let y = m.b / (4.0 * v);
        let one_my = 1.0 - y;
        let l = ((v + m.b) / v).ln();
        let bm = m.b;
        let bi = own.b;

        // Composition derivatives of the quadratic mixing sums.
        let ck = 2.0 * (x * own.c + (1.0 - x) * cross(own.c, other.c));
        let dk = 2.0 * (x * own.d + (1.0 - x) * cross(own.d, other.d));
        let ek = 2.0 * (x * own.e + (1.0 - x) * cross(own.e, other.e));

        let repulsive = (4.0 * y - 3.0 * y * y) / (one_my * one_my)
            + (bi / bm) * (4.0 * y - 2.0 * y * y) / (one_my.powi(3));

        let t1 = (ck / bm - m.c * bi / (bm * bm)) * l + m.c * bi / (bm * (v + bm));
        let t2 = (dk + m.d) / (bm * v) - m.d * bi / (bm * bm * v);
        let t3 = -(dk + m.d) * l / (bm * bm) + 2.0 * m.d * bi * l / bm.powi(3)
            - m.d * bi / (bm * bm * (v + bm));
        let t4 = (2.0 * m.e + ek) / (2.0 * bm * v * v) - m.e * bi / (2.0 * bm * bm * v * v);
        let t5 = -(2.0 * m.e + ek) / (bm * bm * v) + 2.0 * m.e * bi / (bm.powi(3) * v);
        let t6 = (2.0 * m.e + ek) * l / bm.powi(3) - 3.0 * m.e * bi * l / bm.powi(4)
            + m.e * bi / (bm.powi(3) * (v + bm));

        let attractive = (t1 + t2 + t3 + t4 + t5 + t6) / (R_CM3_BAR * t.powf(1.5));
        let z = p * v / (R_CM3_BAR * t);
        if z <= 0.0 || !z.is_finite() {
            return Err(ModelError::Convergence(ms_solver::SolverError::Evaluation {
                what: format!("non-physical compressibility {z} from EOS volume"),
            }));
        }

        Ok(repulsive - attractive - z.ln())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn seed_table_regimes() {
            assert_eq!(volume_seeds(25_000.0, 700.0), (10.0, 20.0));
            assert_eq!(volume_seeds(1000.0, 1273.15), (40.0, 250.0));
            assert_eq!(volume_seeds(25_000.0, 1273.15), (40.0, 250.0));
        }

        #[test]
        fn volume_decreases_with_pressure() {
            let own = coeffs(Volatile::CO2, 1273.15);
            let other = coeffs(Volatile::H2O, 1273.15);
            let m = mix(&own, &other, 1.0);
            let v_low = volume(&m, 500.0, 1273.15).unwrap();
            let v_high = volume(&m, 5000.0, 1273.15).unwrap();
            assert!(v_low > v_high);
            assert!(v_high > m.b / 4.0);
        }

        #[test]
        fn eos_pressure_recovered_at_solved_volume() {
            let own = coeffs(Volatile::H2O, 1173.15);
            let other = coeffs(Volatile::CO2, 1173.15);
            let m = mix(&own, &other, 0.6);
            let p = 2000.0;
            let v = volume(&m, p, 1173.15).unwrap();
            assert!((pressure(&m, 1173.15, v) - p).abs() < 1e-2 * p);
        }

        #[test]
        fn pure_mixture_matches_species_coeffs() {
            let own = coeffs(Volatile::CO2, 1200.0);
            let other = coeffs(Volatile::H2O, 1200.0);
            let m = mix(&own, &other, 1.0);
            assert!((m.b - own.b).abs() < 1e-12);
            assert!((m.c - own.c).abs() < 1e-3 * own.c.abs());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideal_is_partial_pressure() {
        let model = FugacityModel::Ideal;
        assert_eq!(model.fugacity(2000.0, 1473.15, 0.25).unwrap(), 500.0);
        assert_eq!(model.fugacity(2000.0, 1473.15, 1.0).unwrap(), 2000.0);
    }

    #[test]
    fn zero_fluid_fraction_short_circuits() {
        for model in [
            FugacityModel::Ideal,
            FugacityModel::KerrickJacobs(Volatile::CO2),
            FugacityModel::KerrickJacobs(Volatile::H2O),
        ] {
            assert_eq!(model.fugacity(2000.0, 1273.15, 0.0).unwrap(), 0.0);
        }
    }

    #[test]
    fn x_fluid_outside_unit_interval_rejected() {
        let model = FugacityModel::KerrickJacobs(Volatile::CO2);
        assert!(model.fugacity(1000.0, 1273.15, 1.5).is_err());
        assert!(model.fugacity(1000.0, 1273.15, -0.2).is_err());
    }

    #[test]
    fn kj_fugacity_positive_and_increasing_in_pressure() {
        let model = FugacityModel::KerrickJacobs(Volatile::CO2);
        let f1 = model.fugacity(500.0, 1273.15, 1.0).unwrap();
        let f2 = model.fugacity(2000.0, 1273.15, 1.0).unwrap();
        let f3 = model.fugacity(5000.0, 1273.15, 1.0).unwrap();
        assert!(f1 > 0.0);
        assert!(f2 > f1);
        assert!(f3 > f2);
    }

    #[test]
    fn kj_mixture_fugacity_below_pure() {
        let model = FugacityModel::KerrickJacobs(Volatile::H2O);
        let pure = model.fugacity(2000.0, 1173.15, 1.0).unwrap();
        let mixed = model.fugacity(2000.0, 1173.15, 0.5).unwrap();
        assert!(mixed > 0.0);
        assert!(mixed < pure);
    }

    #[test]
    fn high_temperature_reduces_to_scaled_pure() {
        // Above the mixing limit the mixture coefficient path is bypassed:
        // f(X) must be exactly X times the pure-species fugacity.
        let model = FugacityModel::KerrickJacobs(Volatile::CO2);
        let t = 1423.15;
        let pure = model.fugacity(3000.0, t, 1.0).unwrap();
        let half = model.fugacity(3000.0, t, 0.5).unwrap();
        assert!((half - 0.5 * pure).abs() < 1e-9 * pure);
    }

    #[test]
    fn calibration_reports_are_per_component() {
        let model = FugacityModel::KerrickJacobs(Volatile::CO2);
        let report = model.calibration(30_000.0, 1273.15);
        assert_eq!(report.check(model.name(), "pressure"), Some(false));
        assert_eq!(report.check(model.name(), "temperature"), Some(true));
    }
}
