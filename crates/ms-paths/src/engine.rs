//! The external equilibrium-engine boundary.
//!
//! The engine-backed model delegates phase equilibrium to an external
//! Gibbs-minimization solver instead of an empirical law. The engine is a
//! black box behind this trait: given a bulk composition, temperature and
//! pressure, it returns the stable phase assemblage with per-phase masses
//! and compositions.
//!
//! The engine speaks MPa; everything else in this workspace speaks bars.
//! Conversion happens in the driver, nowhere else.

use crate::error::PathResult;
use ms_chem::{Composition, Volatile};
use serde::{Deserialize, Serialize};

/// Phase name the engine reports for the exsolved volatile phase.
pub const FLUID_PHASE: &str = "Fluid";
/// Phase name the engine reports for the silicate melt.
pub const LIQUID_PHASE: &str = "Liquid";

/// One stable phase: its name, mass, and composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub mass_grams: f64,
    pub composition: Composition,
}

/// The full equilibrium result for one (T, P) point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseAssemblage {
    phases: Vec<Phase>,
}

impl PhaseAssemblage {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Mass of a phase [grams]; absent phases weigh nothing.
    pub fn phase_mass(&self, name: &str) -> f64 {
        self.phases
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.mass_grams)
            .unwrap_or(0.0)
    }

    /// Composition of a phase, if present.
    pub fn phase_composition(&self, name: &str) -> Option<&Composition> {
        self.phases
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.composition)
    }

    /// Total mass of the assemblage [grams].
    pub fn total_mass(&self) -> f64 {
        self.phases.iter().map(|p| p.mass_grams).sum()
    }

    /// Mole fraction of one volatile in the named phase (0 if absent).
    pub fn phase_volatile_mole_fraction(&self, name: &str, species: Volatile) -> f64 {
        self.phase_composition(name)
            .map(|c| c.mole_oxide_fractions().get(species.oxide()))
            .unwrap_or(0.0)
    }
}

/// An external multi-phase equilibrium solver.
///
/// The handle is owned by the caller and passed explicitly to the
/// operations that need it; there is no ambient global engine.
pub trait EquilibriumEngine {
    /// Establish the system composition for subsequent equilibrations.
    fn set_bulk_composition(&mut self, bulk: &Composition) -> PathResult<()>;

    /// Equilibrate at (T [deg C], P [MPa]) and return the stable phases.
    fn equilibrate(&mut self, temperature_c: f64, pressure_mpa: f64) -> PathResult<PhaseAssemblage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_chem::Oxide;

    #[test]
    fn absent_phase_weighs_nothing() {
        let assemblage = PhaseAssemblage::new(vec![Phase {
            name: LIQUID_PHASE.to_string(),
            mass_grams: 100.0,
            composition: Composition::new([(Oxide::SiO2, 100.0)]).unwrap(),
        }]);
        assert_eq!(assemblage.phase_mass(FLUID_PHASE), 0.0);
        assert!(assemblage.phase_composition(FLUID_PHASE).is_none());
        assert_eq!(
            assemblage.phase_volatile_mole_fraction(FLUID_PHASE, Volatile::H2O),
            0.0
        );
    }

    #[test]
    fn fluid_mole_fractions_from_composition() {
        // Equal weights of H2O and CO2 are H2O-rich by moles.
        let fluid = Composition::new([(Oxide::H2O, 50.0), (Oxide::CO2, 50.0)]).unwrap();
        let assemblage = PhaseAssemblage::new(vec![Phase {
            name: FLUID_PHASE.to_string(),
            mass_grams: 5.0,
            composition: fluid,
        }]);
        let x_h2o = assemblage.phase_volatile_mole_fraction(FLUID_PHASE, Volatile::H2O);
        assert!(x_h2o > 0.7);
        let x_co2 = assemblage.phase_volatile_mole_fraction(FLUID_PHASE, Volatile::CO2);
        assert!((x_h2o + x_co2 - 1.0).abs() < 1e-12);
    }
}
