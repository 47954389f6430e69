//! Engine-backed (MagmaSat-style) model driver.
//!
//! Where the empirical laws evaluate a closed form, this driver composes
//! calls to an external `EquilibriumEngine`: descending pressure scans for
//! saturation, coarse-to-fine volatile bracketing for dissolved contents at
//! a target fluid composition, and engine-equilibrated degassing ramps.
//! All pressures convert to MPa at this boundary.

use crate::degassing::{DegassingOptions, DegassingStep, SystemKind, pressure_ramp};
use crate::engine::{EquilibriumEngine, FLUID_PHASE, LIQUID_PHASE, PhaseAssemblage};
use crate::error::{PathError, PathResult};
use ms_chem::{Composition, Normalization, Oxide, Volatile};
use ms_core::units::{Pressure, Temperature, pressure_mpa, temperature_c};
use ms_models::{
    DissolvedVolatiles, FluidComposition, SaturationState, X_FLUID_RESOLUTION, validate_x_fluid,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Search configuration for the engine scans. Defaults follow the
/// reference driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSearchConfig {
    /// Pressure the descending saturation scan starts from [MPa].
    pub start_pressure_mpa: f64,
    /// Step sizes of the three refinement passes [MPa].
    pub coarse_step_mpa: f64,
    pub mid_step_mpa: f64,
    pub fine_step_mpa: f64,
    /// Isobar sweep: melt H2O ceiling and step [wt%].
    pub isobar_h2o_max_wt: f64,
    pub isobar_h2o_step_wt: f64,
    /// CO2 increment used to force saturation [wt%].
    pub co2_increment_wt: f64,
    /// Coarse melt-H2O step for the dissolved-volatiles bracket [wt%].
    pub h2o_bracket_step_wt: f64,
}

impl Default for EngineSearchConfig {
    fn default() -> Self {
        Self {
            start_pressure_mpa: 2000.0,
            coarse_step_mpa: 100.0,
            mid_step_mpa: 10.0,
            fine_step_mpa: 1.0,
            isobar_h2o_max_wt: 15.5,
            isobar_h2o_step_wt: 0.5,
            co2_increment_wt: 0.1,
            h2o_bracket_step_wt: 0.5,
        }
    }
}

/// One isobar row from the engine sweep: melt and fluid volatile contents
/// at saturation [wt%].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineIsobarRow {
    pub pressure_bars: f64,
    pub h2o_melt: f64,
    pub co2_melt: f64,
    pub h2o_fluid_wt: f64,
    pub co2_fluid_wt: f64,
}

const MAX_SATURATION_LOOPS: usize = 1000;
const MAX_BRACKET_LOOPS: usize = 200;

/// A solubility model backed by an external equilibrium engine.
///
/// The engine handle is owned here and supplied by the caller.
pub struct EngineModel<E> {
    engine: E,
    config: EngineSearchConfig,
}

impl<E: EquilibriumEngine> EngineModel<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: EngineSearchConfig::default(),
        }
    }

    pub fn with_config(engine: E, config: EngineSearchConfig) -> Self {
        Self { engine, config }
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Saturation pressure by three descending scans at successively finer
    /// steps (coarse, mid, fine), each restarting one coarse step above the
    /// first fluid-bearing pressure of the previous pass.
    pub fn saturation_pressure(
        &mut self,
        temperature: Temperature,
        sample: &Composition,
    ) -> PathResult<SaturationState> {
        let t_c = temperature_c(temperature);
        let bulk = sample.normalized(Normalization::FixedVolatiles)?;
        let cfg = self.config;

        let coarse = self.scan_down(t_c, &bulk, cfg.start_pressure_mpa, cfg.coarse_step_mpa)?;
        let mid = self.scan_down(t_c, &bulk, coarse + cfg.coarse_step_mpa, cfg.mid_step_mpa)?;
        let fine = self.scan_down(t_c, &bulk, mid + cfg.mid_step_mpa, cfg.fine_step_mpa)?;
        debug!(coarse, mid, fine, "saturation scan converged [MPa]");

        let assemblage = self.equilibrate(t_c, fine, &bulk)?;
        let fluid_mass = assemblage.phase_mass(FLUID_PHASE);
        let total = assemblage.total_mass();
        let x_h2o = assemblage.phase_volatile_mole_fraction(FLUID_PHASE, Volatile::H2O);
        Ok(SaturationState {
            pressure_bars: fine * 10.0,
            fluid: FluidComposition::from_h2o(x_h2o)?,
            fluid_mass_fraction: if total > 0.0 { fluid_mass / total } else { 0.0 },
        })
    }

    /// Descend from `start` in fixed steps until the engine reports a fluid
    /// phase; returns that pressure [MPa].
    fn scan_down(
        &mut self,
        t_c: f64,
        bulk: &Composition,
        start_mpa: f64,
        step_mpa: f64,
    ) -> PathResult<f64> {
        let mut p = start_mpa;
        loop {
            p -= step_mpa;
            if p <= 0.0 {
                return Err(PathError::Saturation {
                    what: format!(
                        "no fluid phase above 0 MPa (scan started at {start_mpa} MPa, step {step_mpa})"
                    ),
                });
            }
            let assemblage = self.equilibrate(t_c, p, bulk)?;
            if assemblage.phase_mass(FLUID_PHASE) > 0.0 {
                return Ok(p);
            }
        }
    }

    /// Dissolved volatiles at (P, T) for a coexisting fluid with the given
    /// H2O mole fraction, found by coarse-to-fine bracketing of the melt
    /// H2O (with CO2 topped up to keep the system saturated) until the
    /// engine's reported fluid composition matches within the fluid
    /// resolution.
    pub fn dissolved_volatiles(
        &mut self,
        pressure: Pressure,
        temperature: Temperature,
        sample: &Composition,
        x_fluid_h2o: f64,
    ) -> PathResult<DissolvedVolatiles> {
        let target = validate_x_fluid(x_fluid_h2o)?;
        let p_mpa = pressure_mpa(pressure);
        let t_c = temperature_c(temperature);
        let base = sample.normalized(Normalization::Anhydrous)?;

        // Pure-water target: no CO2 top-up, just load water until a fluid
        // phase appears.
        if target >= 1.0 - X_FLUID_RESOLUTION {
            let mut h2o = 0.0;
            for _ in 0..MAX_SATURATION_LOOPS {
                h2o += self.config.h2o_bracket_step_wt;
                let bulk = base.with(Oxide::H2O, h2o)?;
                let assemblage = self.equilibrate(t_c, p_mpa, &bulk)?;
                if assemblage.phase_mass(FLUID_PHASE) > 0.0 {
                    return Ok(liquid_volatiles(&assemblage));
                }
            }
            return Err(PathError::ConvergenceFailed {
                what: format!("no pure-H2O fluid phase at {p_mpa} MPa within the H2O budget"),
            });
        }

        // Coarse upward bracket on melt H2O.
        let mut co2 = 0.0;
        let (x0, assemblage0) = self.saturated_fluid_x(t_c, p_mpa, &base, 0.0, &mut co2)?;
        if x0 >= target {
            // The CO2-saturated, water-free system already meets the
            // target; nothing to bracket.
            return Ok(liquid_volatiles(&assemblage0));
        }
        let mut lo = 0.0;
        let mut hi = 0.0;
        let mut bracketed = false;
        for _ in 0..MAX_BRACKET_LOOPS {
            hi += self.config.h2o_bracket_step_wt;
            let (x, _) = self.saturated_fluid_x(t_c, p_mpa, &base, hi, &mut co2)?;
            if x >= target {
                bracketed = true;
                break;
            }
            lo = hi;
        }
        if !bracketed {
            return Err(PathError::ConvergenceFailed {
                what: format!(
                    "fluid H2O fraction never reached the target {target} at {p_mpa} MPa"
                ),
            });
        }

        // Fine bisection of the bracket to the fluid resolution.
        for _ in 0..MAX_BRACKET_LOOPS {
            let mid = 0.5 * (lo + hi);
            let (x, assemblage) = self.saturated_fluid_x(t_c, p_mpa, &base, mid, &mut co2)?;
            if (x - target).abs() <= X_FLUID_RESOLUTION {
                return Ok(liquid_volatiles(&assemblage));
            }
            if x < target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Err(PathError::ConvergenceFailed {
            what: format!(
                "fluid composition bracket did not reach resolution {X_FLUID_RESOLUTION} at {p_mpa} MPa"
            ),
        })
    }

    /// Equilibrate with the given melt H2O, growing CO2 in fixed
    /// increments until a fluid phase appears; returns the fluid H2O mole
    /// fraction and the assemblage.
    fn saturated_fluid_x(
        &mut self,
        t_c: f64,
        p_mpa: f64,
        base: &Composition,
        h2o: f64,
        co2: &mut f64,
    ) -> PathResult<(f64, PhaseAssemblage)> {
        for _ in 0..MAX_SATURATION_LOOPS {
            let bulk = base.with(Oxide::H2O, h2o)?.with(Oxide::CO2, *co2)?;
            let assemblage = self.equilibrate(t_c, p_mpa, &bulk)?;
            if assemblage.phase_mass(FLUID_PHASE) > 0.0 {
                let x = assemblage.phase_volatile_mole_fraction(FLUID_PHASE, Volatile::H2O);
                return Ok((x, assemblage));
            }
            *co2 += self.config.co2_increment_wt;
        }
        Err(PathError::ConvergenceFailed {
            what: format!("no fluid phase at {p_mpa} MPa within the CO2 increment budget"),
        })
    }

    /// Isobar sweep: for each pressure, walk melt H2O upward and grow CO2
    /// until saturation, recording melt and fluid volatile contents at
    /// each saturated point.
    pub fn isobars(
        &mut self,
        temperature: Temperature,
        sample: &Composition,
        pressures_bars: &[f64],
    ) -> PathResult<Vec<EngineIsobarRow>> {
        if pressures_bars.is_empty() {
            return Err(PathError::InvalidArg {
                what: "at least one isobar pressure required".to_string(),
            });
        }
        let t_c = temperature_c(temperature);
        let base = sample.normalized(Normalization::Anhydrous)?;
        let cfg = self.config;

        let mut rows = Vec::new();
        for &p_bars in pressures_bars {
            let p_mpa = p_bars / 10.0;
            let mut h2o = 0.0;
            while h2o <= cfg.isobar_h2o_max_wt {
                let mut co2 = 0.0;
                let row = loop {
                    let bulk = base.with(Oxide::H2O, h2o)?.with(Oxide::CO2, co2)?;
                    let assemblage = self.equilibrate(t_c, p_mpa, &bulk)?;
                    if assemblage.phase_mass(FLUID_PHASE) > 0.0 {
                        let melt = liquid_volatiles(&assemblage);
                        let fluid = assemblage.phase_composition(FLUID_PHASE);
                        break EngineIsobarRow {
                            pressure_bars: p_bars,
                            h2o_melt: melt.h2o,
                            co2_melt: melt.co2,
                            h2o_fluid_wt: fluid.map(|c| c.volatile(Volatile::H2O)).unwrap_or(0.0),
                            co2_fluid_wt: fluid.map(|c| c.volatile(Volatile::CO2)).unwrap_or(0.0),
                        };
                    }
                    co2 += cfg.co2_increment_wt;
                    if co2 > cfg.co2_increment_wt * MAX_SATURATION_LOOPS as f64 {
                        return Err(PathError::ConvergenceFailed {
                            what: format!("no saturation at {p_mpa} MPa, H2O {h2o} wt%"),
                        });
                    }
                };
                rows.push(row);
                h2o += cfg.isobar_h2o_step_wt;
            }
        }
        Ok(rows)
    }

    /// Degassing ramp driven by engine equilibrations instead of empirical
    /// laws.
    pub fn degassing_path(
        &mut self,
        temperature: Temperature,
        sample: &Composition,
        kind: SystemKind,
        options: &DegassingOptions,
    ) -> PathResult<Vec<DegassingStep>> {
        if options.step_bars <= 0.0 || options.floor_bars <= 0.0 {
            return Err(PathError::InvalidArg {
                what: "step and floor must be positive".to_string(),
            });
        }
        let t_c = temperature_c(temperature);
        let mut bulk = sample.normalized(Normalization::FixedVolatiles)?;
        let saturation = self.saturation_pressure(temperature, &bulk)?;
        let pressures = pressure_ramp(saturation.pressure_bars, options);
        let open = matches!(kind, SystemKind::Open);

        if let SystemKind::Closed {
            initial_vapor_wt_percent: Some(target),
        } = kind
        {
            bulk = self.enrich_to_initial_vapor(t_c, &bulk, saturation.pressure_bars, target)?;
        }

        let mut steps = Vec::with_capacity(pressures.len());
        for &p_bars in &pressures {
            let assemblage = self.equilibrate(t_c, p_bars / 10.0, &bulk)?;
            let fluid_mass = assemblage.phase_mass(FLUID_PHASE);
            let total = assemblage.total_mass();
            let melt = liquid_volatiles(&assemblage);
            let fluid = if fluid_mass > 0.0 {
                FluidComposition::from_h2o(
                    assemblage.phase_volatile_mole_fraction(FLUID_PHASE, Volatile::H2O),
                )?
            } else {
                FluidComposition::none()
            };
            steps.push(DegassingStep {
                pressure_bars: p_bars,
                h2o_melt: melt.h2o,
                co2_melt: melt.co2,
                fluid,
                fluid_mass_fraction: if total > 0.0 { fluid_mass / total } else { 0.0 },
            });
            if open && fluid_mass > 0.0 {
                let liquid = assemblage
                    .phase_composition(LIQUID_PHASE)
                    .copied()
                    .unwrap_or(bulk);
                bulk = liquid.normalized(Normalization::FixedVolatiles)?;
            }
        }
        Ok(steps)
    }

    fn enrich_to_initial_vapor(
        &mut self,
        t_c: f64,
        bulk: &Composition,
        anchor_bars: f64,
        target_wt_percent: f64,
    ) -> PathResult<Composition> {
        if !(0.0..100.0).contains(&target_wt_percent) {
            return Err(PathError::InvalidArg {
                what: format!("initial vapor must lie in [0, 100) wt%, got {target_wt_percent}"),
            });
        }
        let mut enriched = *bulk;
        for _ in 0..MAX_SATURATION_LOOPS {
            let assemblage = self.equilibrate(t_c, anchor_bars / 10.0, &enriched)?;
            let total = assemblage.total_mass();
            let fraction = if total > 0.0 {
                assemblage.phase_mass(FLUID_PHASE) / total
            } else {
                0.0
            };
            if fraction * 100.0 >= target_wt_percent {
                return Ok(enriched);
            }
            let wt_h2o = assemblage
                .phase_composition(FLUID_PHASE)
                .map(|c| {
                    let h = c.volatile(Volatile::H2O);
                    let total_v = h + c.volatile(Volatile::CO2);
                    if total_v > 0.0 { h / total_v } else { 1.0 }
                })
                .unwrap_or(1.0);
            enriched = enriched
                .with(
                    Oxide::H2O,
                    enriched.volatile(Volatile::H2O) + 0.1 * wt_h2o,
                )?
                .with(
                    Oxide::CO2,
                    enriched.volatile(Volatile::CO2) + 0.1 * (1.0 - wt_h2o),
                )?
                .normalized(Normalization::FixedVolatiles)?;
        }
        Err(PathError::ConvergenceFailed {
            what: format!("engine enrichment never reached {target_wt_percent} wt% vapor"),
        })
    }

    fn equilibrate(
        &mut self,
        t_c: f64,
        p_mpa: f64,
        bulk: &Composition,
    ) -> PathResult<PhaseAssemblage> {
        self.engine.set_bulk_composition(bulk)?;
        self.engine.equilibrate(t_c, p_mpa)
    }
}

/// Melt volatile contents from the liquid phase; an absent liquid phase
/// holds nothing.
fn liquid_volatiles(assemblage: &PhaseAssemblage) -> DissolvedVolatiles {
    match assemblage.phase_composition(LIQUID_PHASE) {
        Some(liquid) => DissolvedVolatiles {
            h2o: liquid.volatile(Volatile::H2O),
            co2: liquid.volatile(Volatile::CO2),
        },
        None => DissolvedVolatiles { h2o: 0.0, co2: 0.0 },
    }
}
