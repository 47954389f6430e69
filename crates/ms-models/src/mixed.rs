//! Joint two-species vapor-melt equilibrium.
//!
//! Couples one CO2 law and one H2O law (species order fixed: CO2 first) to
//! answer the questions a single-species law cannot: what fluid
//! composition coexists with a melt at depth, and at what pressure a melt
//! carrying both volatiles first saturates.

use crate::error::{ModelError, ModelResult};
use crate::calibration::CalibrationReport;
use crate::law::{Law, SATURATION_FLOOR_BARS, SolubilityLaw};
use crate::types::{
    DissolvedVolatiles, FluidComposition, FluidPresence, Isobar, IsobarPoint, Isopleth,
    IsoplethPoint, SaturationState, X_FLUID_RESOLUTION, validate_x_fluid,
};
use ms_chem::{Composition, Oxide, Volatile};
use ms_core::units::{Pressure, Temperature, bar, pressure_bars};
use ms_solver::{NewtonConfig, ScalarConfig, SolverError, bisect, newton_solve};
use nalgebra::DVector;
use rayon::prelude::*;
use tracing::debug;

/// Two single-species solubility laws solved jointly.
#[derive(Debug, Clone)]
pub struct MixedFluid {
    name: &'static str,
    co2: Law,
    h2o: Law,
}

impl MixedFluid {
    pub fn new(name: &'static str, co2: Law, h2o: Law) -> ModelResult<Self> {
        if co2.species() != Volatile::CO2 {
            return Err(ModelError::input(format!(
                "first law of {name} must model CO2, got {}",
                co2.name()
            )));
        }
        if h2o.species() != Volatile::H2O {
            return Err(ModelError::input(format!(
                "second law of {name} must model H2O, got {}",
                h2o.name()
            )));
        }
        Ok(Self { name, co2, h2o })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn carbon_law(&self) -> &Law {
        &self.co2
    }

    pub fn water_law(&self) -> &Law {
        &self.h2o
    }

    /// Dissolved wt% of both species for a fluid split given as exactly
    /// two mole fractions, CO2 first.
    pub fn dissolved_volatiles(
        &self,
        pressure: Pressure,
        temperature: Temperature,
        sample: &Composition,
        x_fluid: &[f64],
    ) -> ModelResult<DissolvedVolatiles> {
        let [x_co2, x_h2o] = x_fluid else {
            return Err(ModelError::input(format!(
                "mixed fluid takes exactly two mole fractions (CO2, H2O), got {}",
                x_fluid.len()
            )));
        };
        let x_co2 = validate_x_fluid(*x_co2)?;
        let x_h2o = validate_x_fluid(*x_h2o)?;
        if (x_co2 + x_h2o - 1.0).abs() > 1e-8 {
            return Err(ModelError::input(format!(
                "fluid mole fractions must sum to 1, got {x_co2} + {x_h2o}"
            )));
        }
        let co2 = self
            .co2
            .dissolved_volatiles(pressure, temperature, sample, x_co2)?;
        let h2o = self
            .h2o
            .dissolved_volatiles(pressure, temperature, sample, x_h2o)?;
        Ok(DissolvedVolatiles { h2o, co2 })
    }

    /// Fluid composition in equilibrium with the melt at (P, T).
    ///
    /// Undersaturated samples return the absent-fluid marker. Otherwise the
    /// CO2 mole fraction solves a lever-rule mass balance: the fluid
    /// fraction implied by the CO2 budget must equal the one implied by the
    /// H2O budget.
    pub fn equilibrium_fluid_comp(
        &self,
        pressure: Pressure,
        temperature: Temperature,
        sample: &Composition,
    ) -> ModelResult<FluidComposition> {
        let saturation = self.saturation_pressure(temperature, sample)?;
        if pressure_bars(pressure) > saturation.pressure_bars {
            return Ok(FluidComposition::none());
        }

        let wt_co2 = sample.volatile(Volatile::CO2);
        let wt_h2o = sample.volatile(Volatile::H2O);
        if wt_co2 <= 0.0 {
            return Ok(FluidComposition::from_co2(0.0)?);
        }
        if wt_h2o <= 0.0 {
            return Ok(FluidComposition::from_co2(1.0)?);
        }

        let xt_co2 = sample.bulk_volatile_mole_fraction(Volatile::CO2);
        let xt_h2o = sample.bulk_volatile_mole_fraction(Volatile::H2O);

        let residual = |x_co2: f64| self.lever_residual(pressure, temperature, sample, x_co2, xt_co2, xt_h2o);

        // The residual is positive at the H2O end-member and negative at
        // the CO2 end-member whenever both budgets are positive, so the
        // clipped interval brackets the root; the clip width is the
        // resolvable fluid increment.
        let config = ScalarConfig {
            abs_tol: 1e-10,
            ..Default::default()
        };
        let root = bisect(
            residual,
            (X_FLUID_RESOLUTION, 1.0 - X_FLUID_RESOLUTION),
            &config,
        )?;
        FluidComposition::from_co2(root)
    }

    /// Lever-rule residual at a trial fluid CO2 mole fraction.
    ///
    /// The fluid fraction implied by each budget is
    /// F = (Xt - Xm) / (Xv - Xm); equilibrium requires the two to match.
    /// The difference is evaluated multiplied through by both
    /// denominators, the one-sided limiting form that stays finite when a
    /// denominator vanishes at the end-members.
    fn lever_residual(
        &self,
        pressure: Pressure,
        temperature: Temperature,
        sample: &Composition,
        x_co2: f64,
        xt_co2: f64,
        xt_h2o: f64,
    ) -> Result<f64, SolverError> {
        let to_solver = |e: ModelError| SolverError::Evaluation {
            what: e.to_string(),
        };
        let wtm_co2 = self
            .co2
            .dissolved_volatiles(pressure, temperature, sample, x_co2)
            .map_err(to_solver)?;
        let wtm_h2o = self
            .h2o
            .dissolved_volatiles(pressure, temperature, sample, 1.0 - x_co2)
            .map_err(to_solver)?;
        let melt = sample
            .with(Oxide::CO2, wtm_co2)
            .and_then(|m| m.with(Oxide::H2O, wtm_h2o))
            .map_err(|e| SolverError::Evaluation {
                what: e.to_string(),
            })?;
        let xm_co2 = melt.bulk_volatile_mole_fraction(Volatile::CO2);
        let xm_h2o = melt.bulk_volatile_mole_fraction(Volatile::H2O);

        Ok((xt_co2 - xm_co2) * ((1.0 - x_co2) - xm_h2o)
            - (xt_h2o - xm_h2o) * (x_co2 - xm_co2))
    }

    /// Saturation pressure of the two-species system.
    ///
    /// A 2-D Newton root over (pressure, fluid CO2 fraction), seeded from
    /// the sum of the single-species saturation pressures and an equal
    /// fluid split. Samples carrying only one volatile reduce exactly to
    /// the corresponding single-species law.
    pub fn saturation_pressure(
        &self,
        temperature: Temperature,
        sample: &Composition,
    ) -> ModelResult<SaturationState> {
        let wt_co2 = sample.volatile(Volatile::CO2);
        let wt_h2o = sample.volatile(Volatile::H2O);
        if wt_co2 <= 0.0 && wt_h2o <= 0.0 {
            return Err(ModelError::saturation(
                "sample carries neither H2O nor CO2",
            ));
        }
        if wt_co2 <= 0.0 {
            let p = self.h2o.saturation_pressure(temperature, sample)?;
            return Ok(SaturationState {
                pressure_bars: p,
                fluid: FluidComposition::from_co2(0.0)?,
                fluid_mass_fraction: 0.0,
            });
        }
        if wt_h2o <= 0.0 {
            let p = self.co2.saturation_pressure(temperature, sample)?;
            return Ok(SaturationState {
                pressure_bars: p,
                fluid: FluidComposition::from_co2(1.0)?,
                fluid_mass_fraction: 0.0,
            });
        }

        let p_co2 = self.co2.saturation_pressure(temperature, sample)?;
        let p_h2o = self.h2o.saturation_pressure(temperature, sample)?;
        let p_seed = p_co2 + p_h2o;
        debug!(model = self.name, p_seed, "mixed saturation seed");

        let residual = |z: &DVector<f64>| -> Result<DVector<f64>, SolverError> {
            let p = z[0].max(SATURATION_FLOOR_BARS);
            let x_co2 = z[1].clamp(0.0, 1.0);
            let to_solver = |e: ModelError| SolverError::Evaluation {
                what: e.to_string(),
            };
            let co2 = self
                .co2
                .dissolved_volatiles(bar(p), temperature, sample, x_co2)
                .map_err(to_solver)?;
            let h2o = self
                .h2o
                .dissolved_volatiles(bar(p), temperature, sample, 1.0 - x_co2)
                .map_err(to_solver)?;
            Ok(DVector::from_vec(vec![co2 - wt_co2, h2o - wt_h2o]))
        };

        let config = NewtonConfig {
            abs_tol: 1e-8,
            ..Default::default()
        };
        let seed = DVector::from_vec(vec![p_seed, 0.5]);
        let result = newton_solve(seed, residual, project_pressure_fraction, &config)?;

        let pressure = result.x[0].max(SATURATION_FLOOR_BARS);
        let x_co2 = result.x[1].clamp(0.0, 1.0);
        Ok(SaturationState {
            pressure_bars: pressure,
            fluid: FluidComposition::from_co2(x_co2)?,
            fluid_mass_fraction: 0.0,
        })
    }

    /// Whether the sample holds a free fluid phase at the queried pressure.
    pub fn equilibrium_fluid_presence(
        &self,
        pressure: Pressure,
        temperature: Temperature,
        sample: &Composition,
    ) -> ModelResult<FluidPresence> {
        let saturation = self.saturation_pressure(temperature, sample)?;
        if pressure_bars(pressure) <= saturation.pressure_bars {
            Ok(FluidPresence::Saturated)
        } else {
            Ok(FluidPresence::Undersaturated)
        }
    }

    /// Isobars (dissolved pairs over a fluid-composition grid at each
    /// requested pressure) and isopleths (dissolved pairs over a pressure
    /// grid at each requested fluid composition).
    ///
    /// Grid points are independent; each pressure sweep runs on the rayon
    /// pool.
    pub fn isobars_and_isopleths(
        &self,
        temperature: Temperature,
        sample: &Composition,
        pressures_bars: &[f64],
        isopleth_fractions_co2: &[f64],
        grid_points: usize,
    ) -> ModelResult<(Vec<Isobar>, Vec<Isopleth>)> {
        if pressures_bars.is_empty() {
            return Err(ModelError::input("at least one isobar pressure required"));
        }
        if grid_points < 2 {
            return Err(ModelError::input("grid needs at least two points"));
        }
        for &x in isopleth_fractions_co2 {
            validate_x_fluid(x)?;
        }

        let isobars: Vec<Isobar> = pressures_bars
            .par_iter()
            .map(|&p| {
                let points = (0..grid_points)
                    .map(|i| {
                        let x_co2 = i as f64 / (grid_points - 1) as f64;
                        let dissolved = self.dissolved_volatiles(
                            bar(p),
                            temperature,
                            sample,
                            &[x_co2, 1.0 - x_co2],
                        )?;
                        Ok(IsobarPoint { x_co2, dissolved })
                    })
                    .collect::<ModelResult<Vec<_>>>()?;
                Ok(Isobar {
                    pressure_bars: p,
                    points,
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;

        let p_min = pressures_bars.iter().cloned().fold(f64::INFINITY, f64::min);
        let p_max = pressures_bars
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let isopleths: Vec<Isopleth> = isopleth_fractions_co2
            .par_iter()
            .map(|&x_co2| {
                let points = (0..grid_points)
                    .map(|i| {
                        let frac = i as f64 / (grid_points - 1) as f64;
                        let p = p_min + frac * (p_max - p_min);
                        let dissolved = self.dissolved_volatiles(
                            bar(p),
                            temperature,
                            sample,
                            &[x_co2, 1.0 - x_co2],
                        )?;
                        Ok(IsoplethPoint {
                            pressure_bars: p,
                            dissolved,
                        })
                    })
                    .collect::<ModelResult<Vec<_>>>()?;
                Ok(Isopleth { x_co2, points })
            })
            .collect::<ModelResult<Vec<_>>>()?;

        Ok((isobars, isopleths))
    }

    /// Merged calibration report from both component laws.
    pub fn check_calibration_range(
        &self,
        pressure: Pressure,
        temperature: Temperature,
    ) -> CalibrationReport {
        let mut report = self.co2.check_calibration_range(pressure, temperature);
        report.extend(self.h2o.check_calibration_range(pressure, temperature));
        report
    }
}

fn project_pressure_fraction(z: &mut DVector<f64>) {
    z[0] = z[0].max(SATURATION_FLOOR_BARS);
    z[1] = z[1].clamp(X_FLUID_RESOLUTION, 1.0 - X_FLUID_RESOLUTION);
}
