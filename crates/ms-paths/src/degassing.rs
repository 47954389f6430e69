//! Stepwise degassing paths over decreasing pressure.
//!
//! From the saturation pressure down to a floor, the melt/fluid split is
//! recomputed at each step from the mixed-fluid coordinator. Open-system
//! paths remove the fluid after every step; closed-system paths conserve
//! the total volatile budget, optionally after enriching the melt until a
//! requested pre-existing vapor fraction is present.
//!
//! The caller's composition is never mutated; every step works on its own
//! value.

use crate::error::{PathError, PathResult};
use ms_chem::{Composition, Normalization, Oxide, Volatile};
use ms_core::units::{Temperature, bar};
use ms_models::{FluidComposition, MixedFluid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One row of a degassing path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegassingStep {
    /// Pressure [bars]; rows are strictly decreasing.
    pub pressure_bars: f64,
    /// Dissolved H2O in the melt [wt%].
    pub h2o_melt: f64,
    /// Dissolved CO2 in the melt [wt%].
    pub co2_melt: f64,
    /// Fluid composition (mole fractions); the absent-fluid marker when no
    /// fluid phase is present at this step.
    pub fluid: FluidComposition,
    /// Fluid mass fraction of the system at this step.
    pub fluid_mass_fraction: f64,
}

/// Open- or closed-system behavior of the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SystemKind {
    /// Exsolved fluid is removed from the system after every step.
    Open,
    /// Exsolved fluid stays in equilibrium with the melt; optionally start
    /// with a pre-existing vapor fraction [wt% of the system].
    Closed { initial_vapor_wt_percent: Option<f64> },
}

/// Ramp configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegassingOptions {
    /// Lowest pressure of the ramp [bars].
    pub floor_bars: f64,
    /// Pressure decrement per step [bars].
    pub step_bars: f64,
}

impl Default for DegassingOptions {
    fn default() -> Self {
        Self {
            floor_bars: 1.0,
            step_bars: 10.0,
        }
    }
}

/// Weight of fluid-derived volatiles added per enrichment pass [wt%].
const ENRICHMENT_INCREMENT_WT: f64 = 0.1;
const ENRICHMENT_MAX_ITERATIONS: usize = 10_000;

/// Integrate a degassing path for the sample.
///
/// Returns rows ordered by strictly decreasing pressure, from the
/// saturation pressure down to the floor.
pub fn degassing_path(
    model: &MixedFluid,
    temperature: Temperature,
    sample: &Composition,
    kind: SystemKind,
    options: &DegassingOptions,
) -> PathResult<Vec<DegassingStep>> {
    if options.step_bars <= 0.0 || !options.step_bars.is_finite() {
        return Err(PathError::InvalidArg {
            what: format!("step must be positive, got {} bars", options.step_bars),
        });
    }
    if options.floor_bars <= 0.0 || !options.floor_bars.is_finite() {
        return Err(PathError::InvalidArg {
            what: format!("floor must be positive, got {} bars", options.floor_bars),
        });
    }

    let bulk = sample.normalized(Normalization::FixedVolatiles)?;
    let saturation = model.saturation_pressure(temperature, &bulk)?;

    // With a requested pre-existing vapor fraction, the melt is enriched
    // until that much fluid coexists at the sample's own saturation
    // pressure; the ramp then starts there, vapor already present.
    let bulk = match kind {
        SystemKind::Closed {
            initial_vapor_wt_percent: Some(target),
        } => enrich_to_initial_vapor(model, temperature, &bulk, saturation.pressure_bars, target)?,
        _ => bulk,
    };
    let pressures = pressure_ramp(saturation.pressure_bars, options);

    match kind {
        SystemKind::Open => open_system(model, temperature, bulk, &pressures),
        SystemKind::Closed { .. } => closed_system(model, temperature, &bulk, &pressures),
    }
}

/// Strictly decreasing pressures from the saturation pressure to the floor.
pub(crate) fn pressure_ramp(saturation_bars: f64, options: &DegassingOptions) -> Vec<f64> {
    let mut pressures = vec![saturation_bars];
    let mut p = saturation_bars - options.step_bars;
    while p > options.floor_bars {
        pressures.push(p);
        p -= options.step_bars;
    }
    if saturation_bars > options.floor_bars {
        pressures.push(options.floor_bars);
    }
    pressures
}

fn closed_system(
    model: &MixedFluid,
    temperature: Temperature,
    bulk: &Composition,
    pressures: &[f64],
) -> PathResult<Vec<DegassingStep>> {
    let mut steps = Vec::with_capacity(pressures.len());
    for &p in pressures {
        let step = equilibrium_step(model, temperature, bulk, p)?;
        debug!(
            pressure_bars = p,
            fluid_fraction = step.fluid_mass_fraction,
            "closed-system step"
        );
        let fluid_free = step.fluid.is_none();
        steps.push(step);
        if fluid_free {
            // One degenerate fluid-free step; the split cannot change
            // below it.
            break;
        }
    }
    Ok(steps)
}

fn open_system(
    model: &MixedFluid,
    temperature: Temperature,
    bulk: Composition,
    pressures: &[f64],
) -> PathResult<Vec<DegassingStep>> {
    let mut steps = Vec::with_capacity(pressures.len());
    let mut current = bulk;
    for &p in pressures {
        let step = equilibrium_step(model, temperature, &current, p)?;
        debug!(
            pressure_bars = p,
            fluid_fraction = step.fluid_mass_fraction,
            "open-system step"
        );
        steps.push(step);
        if !step.fluid.is_none() {
            // The fluid is carried off; the melt's own residual volatile
            // content becomes the next system.
            current = current
                .with(Oxide::H2O, step.h2o_melt)?
                .with(Oxide::CO2, step.co2_melt)?
                .normalized(Normalization::FixedVolatiles)?;
        }
    }
    Ok(steps)
}

/// One melt/fluid split: an `equilibrium_fluid_comp` plus
/// `dissolved_volatiles` call pair at the given pressure.
fn equilibrium_step(
    model: &MixedFluid,
    temperature: Temperature,
    bulk: &Composition,
    p_bars: f64,
) -> PathResult<DegassingStep> {
    let fluid = model.equilibrium_fluid_comp(bar(p_bars), temperature, bulk)?;
    if fluid.is_none() {
        return Ok(DegassingStep {
            pressure_bars: p_bars,
            h2o_melt: bulk.volatile(Volatile::H2O),
            co2_melt: bulk.volatile(Volatile::CO2),
            fluid,
            fluid_mass_fraction: 0.0,
        });
    }
    let dissolved = model.dissolved_volatiles(
        bar(p_bars),
        temperature,
        bulk,
        &[fluid.x_co2(), fluid.x_h2o()],
    )?;
    Ok(DegassingStep {
        pressure_bars: p_bars,
        h2o_melt: dissolved.h2o,
        co2_melt: dissolved.co2,
        fluid,
        fluid_mass_fraction: fluid_mass_fraction(bulk, dissolved.h2o, dissolved.co2),
    })
}

/// Fluid mass fraction from the volatile mass balance: with a total
/// volatile load `wt` (per 100 of system) and melt volatile content `wm`
/// (per 100 of melt), the all-volatile fluid holds
/// F = (wt - wm) / (100 - wm) of the system mass.
fn fluid_mass_fraction(bulk: &Composition, h2o_melt: f64, co2_melt: f64) -> f64 {
    let wt = bulk.volatile(Volatile::H2O) + bulk.volatile(Volatile::CO2);
    let wm = h2o_melt + co2_melt;
    if wm >= 100.0 {
        return 0.0;
    }
    ((wt - wm) / (100.0 - wm)).clamp(0.0, 1.0)
}

/// Iteratively add fluid-derived volatiles (split by the equilibrium fluid
/// composition, converted to weight) until the exsolved fraction at the
/// original saturation pressure reaches the requested vapor wt%.
fn enrich_to_initial_vapor(
    model: &MixedFluid,
    temperature: Temperature,
    bulk: &Composition,
    anchor_bars: f64,
    target_wt_percent: f64,
) -> PathResult<Composition> {
    if !(0.0..100.0).contains(&target_wt_percent) || !target_wt_percent.is_finite() {
        return Err(PathError::InvalidArg {
            what: format!("initial vapor must lie in [0, 100) wt%, got {target_wt_percent}"),
        });
    }
    if target_wt_percent == 0.0 {
        return Ok(*bulk);
    }

    let anchor_fluid = model
        .equilibrium_fluid_comp(bar(anchor_bars), temperature, bulk)?;
    let mut enriched = *bulk;
    for _ in 0..ENRICHMENT_MAX_ITERATIONS {
        let step = equilibrium_step(model, temperature, &enriched, anchor_bars)?;
        if step.fluid_mass_fraction * 100.0 >= target_wt_percent {
            return Ok(enriched);
        }
        let split = if step.fluid.is_none() {
            anchor_fluid
        } else {
            step.fluid
        };
        let wt_h2o = split.wt_fraction_h2o();
        enriched = enriched
            .with(
                Oxide::H2O,
                enriched.volatile(Volatile::H2O) + ENRICHMENT_INCREMENT_WT * wt_h2o,
            )?
            .with(
                Oxide::CO2,
                enriched.volatile(Volatile::CO2) + ENRICHMENT_INCREMENT_WT * (1.0 - wt_h2o),
            )?
            .normalized(Normalization::FixedVolatiles)?;
    }
    Err(PathError::ConvergenceFailed {
        what: format!(
            "initial vapor enrichment did not reach {target_wt_percent} wt% within {ENRICHMENT_MAX_ITERATIONS} passes"
        ),
    })
}
