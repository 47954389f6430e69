//! Result records produced by the solubility models.

use crate::error::{ModelError, ModelResult};
use ms_chem::Volatile;
use serde::{Deserialize, Serialize};

/// Smallest fluid mole-fraction step the iterative solvers resolve.
pub const X_FLUID_RESOLUTION: f64 = 1e-4;

/// Validate a fluid mole fraction against [0, 1].
pub fn validate_x_fluid(x: f64) -> ModelResult<f64> {
    if !x.is_finite() || !(0.0..=1.0).contains(&x) {
        return Err(ModelError::input(format!(
            "X_fluid must lie in [0, 1], got {x}"
        )));
    }
    Ok(x)
}

/// Composition of a two-component H2O-CO2 fluid as mole fractions.
///
/// Invariant: `x_h2o + x_co2 == 1` for a present fluid. The special
/// `none()` value (both zero) marks an absent fluid phase in
/// undersaturated results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidComposition {
    x_h2o: f64,
    x_co2: f64,
}

impl FluidComposition {
    /// Build from the H2O mole fraction; CO2 takes the complement.
    pub fn from_h2o(x_h2o: f64) -> ModelResult<Self> {
        let x = validate_x_fluid(x_h2o)?;
        Ok(Self {
            x_h2o: x,
            x_co2: 1.0 - x,
        })
    }

    /// Build from the CO2 mole fraction; H2O takes the complement.
    pub fn from_co2(x_co2: f64) -> ModelResult<Self> {
        let x = validate_x_fluid(x_co2)?;
        Ok(Self {
            x_h2o: 1.0 - x,
            x_co2: x,
        })
    }

    /// The absent-fluid marker used for undersaturated samples.
    pub fn none() -> Self {
        Self {
            x_h2o: 0.0,
            x_co2: 0.0,
        }
    }

    /// True when this marks an absent fluid phase.
    pub fn is_none(&self) -> bool {
        self.x_h2o == 0.0 && self.x_co2 == 0.0
    }

    pub fn x_h2o(&self) -> f64 {
        self.x_h2o
    }

    pub fn x_co2(&self) -> f64 {
        self.x_co2
    }

    pub fn mole_fraction(&self, species: Volatile) -> f64 {
        match species {
            Volatile::H2O => self.x_h2o,
            Volatile::CO2 => self.x_co2,
        }
    }

    /// Weight fraction of H2O in the fluid.
    pub fn wt_fraction_h2o(&self) -> f64 {
        let mh = self.x_h2o * Volatile::H2O.molar_mass();
        let mc = self.x_co2 * Volatile::CO2.molar_mass();
        if mh + mc <= 0.0 {
            return 0.0;
        }
        mh / (mh + mc)
    }
}

/// Dissolved volatile contents of the melt [wt%].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DissolvedVolatiles {
    pub h2o: f64,
    pub co2: f64,
}

/// A converged saturation solution.
///
/// Only produced by a converged root-find; never partially populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationState {
    /// Saturation pressure [bars].
    pub pressure_bars: f64,
    /// Fluid composition at the saturation pressure.
    pub fluid: FluidComposition,
    /// Fluid mass fraction of the system at that pressure (0 at onset).
    pub fluid_mass_fraction: f64,
}

/// Whether a melt at the queried pressure holds a free fluid phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FluidPresence {
    Saturated,
    Undersaturated,
}

/// One isobar: dissolved-volatile pairs at constant pressure, swept over
/// fluid composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isobar {
    pub pressure_bars: f64,
    pub points: Vec<IsobarPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsobarPoint {
    pub x_co2: f64,
    pub dissolved: DissolvedVolatiles,
}

/// One isopleth: dissolved-volatile pairs at constant fluid composition,
/// swept over pressure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isopleth {
    pub x_co2: f64,
    pub points: Vec<IsoplethPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoplethPoint {
    pub pressure_bars: f64,
    pub dissolved: DissolvedVolatiles,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluid_composition_complement() {
        let fluid = FluidComposition::from_h2o(0.25).unwrap();
        assert_eq!(fluid.x_co2(), 0.75);
        assert_eq!(fluid.mole_fraction(Volatile::H2O), 0.25);
        assert!(!fluid.is_none());
    }

    #[test]
    fn fluid_composition_rejects_out_of_range() {
        assert!(FluidComposition::from_h2o(1.2).is_err());
        assert!(FluidComposition::from_co2(-0.1).is_err());
        assert!(FluidComposition::from_h2o(f64::NAN).is_err());
    }

    #[test]
    fn none_marker() {
        let none = FluidComposition::none();
        assert!(none.is_none());
        assert_eq!(none.wt_fraction_h2o(), 0.0);
    }

    #[test]
    fn wt_fraction_pure_endmembers() {
        assert_eq!(
            FluidComposition::from_h2o(1.0).unwrap().wt_fraction_h2o(),
            1.0
        );
        assert_eq!(
            FluidComposition::from_h2o(0.0).unwrap().wt_fraction_h2o(),
            0.0
        );
        // Equimolar fluid is lighter in H2O by weight.
        let half = FluidComposition::from_h2o(0.5).unwrap();
        assert!(half.wt_fraction_h2o() < 0.5);
    }

    #[test]
    fn serde_round_trip() {
        let state = SaturationState {
            pressure_bars: 1234.5,
            fluid: FluidComposition::from_h2o(0.8).unwrap(),
            fluid_mass_fraction: 0.0,
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: SaturationState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
