//! ms-models: volatile solubility laws for meltsat.
//!
//! Provides:
//! - Fugacity models (ideal gas; Kerrick-Jacobs mixed H2O-CO2 EOS)
//! - Activity models (ideal solution)
//! - The `SolubilityLaw` abstraction and the closed set of published
//!   variants (Shishkina, Dixon, Iacono-Marziano, Allison, Liu)
//! - The mixed-fluid coordinator for joint two-species equilibrium
//! - Calibration-range reporting and the fixed model registry
//!
//! # Architecture
//!
//! Each law implements only its published closed form plus preprocessing;
//! inversion to saturation pressure and the saturated/undersaturated query
//! are provided by the trait on top of the shared solver stack. The
//! mixed-fluid coordinator composes exactly two laws (CO2 first) and owns
//! the lever-rule and joint-saturation solves.
//!
//! # Example
//!
//! ```no_run
//! use ms_chem::{Composition, Oxide};
//! use ms_core::units::{bar, degc};
//! use ms_models::{ConfiguredModel, registry};
//!
//! let sample = Composition::new([
//!     (Oxide::SiO2, 49.0),
//!     (Oxide::Al2O3, 16.0),
//!     (Oxide::CaO, 11.0),
//!     (Oxide::H2O, 4.0),
//!     (Oxide::CO2, 0.1),
//! ])
//! .unwrap();
//!
//! if let ConfiguredModel::Mixed(model) = registry::model("Liu").unwrap() {
//!     let state = model.saturation_pressure(degc(800.0), &sample).unwrap();
//!     println!("saturates at {} bars", state.pressure_bars);
//!     let dissolved = model
//!         .dissolved_volatiles(bar(1000.0), degc(800.0), &sample, &[0.2, 0.8])
//!         .unwrap();
//!     println!("H2O {} wt%, CO2 {} wt%", dissolved.h2o, dissolved.co2);
//! }
//! ```

pub mod activity;
pub mod calibration;
pub mod error;
pub mod fugacity;
pub mod law;
pub mod laws;
pub mod mixed;
pub mod registry;
pub mod types;

// Re-exports for ergonomics
pub use activity::ActivityModel;
pub use calibration::{CalibrationCheck, CalibrationReport, CalibrationWindow};
pub use error::{ModelError, ModelResult};
pub use fugacity::FugacityModel;
pub use law::{Law, SolubilityLaw};
pub use laws::{
    AllisonCarbon, AllisonForm, AllisonLocation, DixonCarbon, DixonWater, IaconoMarzianoCarbon,
    IaconoMarzianoWater, LiuCarbon, LiuWater, Parameterization, ShishkinaCarbon, ShishkinaWater,
};
pub use mixed::MixedFluid;
pub use registry::{ConfiguredModel, model, model_names};
pub use types::{
    DissolvedVolatiles, FluidComposition, FluidPresence, Isobar, IsobarPoint, Isopleth,
    IsoplethPoint, SaturationState, X_FLUID_RESOLUTION, validate_x_fluid,
};
