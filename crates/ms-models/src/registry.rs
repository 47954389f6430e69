//! Fixed model registry.
//!
//! A name-to-configuration table built once at first use and read-only
//! thereafter. Unknown names are input errors naming the request.

use crate::error::{ModelError, ModelResult};
use crate::law::Law;
use crate::laws::{
    AllisonCarbon, AllisonForm, AllisonLocation, DixonCarbon, DixonWater, IaconoMarzianoCarbon,
    IaconoMarzianoWater, LiuCarbon, LiuWater, Parameterization, ShishkinaCarbon, ShishkinaWater,
};
use crate::mixed::MixedFluid;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::debug;

/// A registered model: one single-species law or a two-species
/// coordinator.
#[derive(Debug, Clone)]
pub enum ConfiguredModel {
    Pure(Law),
    Mixed(MixedFluid),
}

fn mixed(name: &'static str, co2: Law, h2o: Law) -> ConfiguredModel {
    // The registry pairs are constructed species-checked; a failure here
    // is a registry definition bug, caught by the tests below.
    ConfiguredModel::Mixed(
        MixedFluid::new(name, co2, h2o).expect("registry pairs are species-ordered"),
    )
}

static REGISTRY: Lazy<BTreeMap<&'static str, ConfiguredModel>> = Lazy::new(|| {
    let mut models = BTreeMap::new();

    models.insert(
        "ShishkinaCarbon",
        ConfiguredModel::Pure(Law::ShishkinaCarbon(ShishkinaCarbon::default())),
    );
    models.insert(
        "ShishkinaWater",
        ConfiguredModel::Pure(Law::ShishkinaWater(ShishkinaWater::default())),
    );
    models.insert(
        "DixonCarbon",
        ConfiguredModel::Pure(Law::DixonCarbon(DixonCarbon::default())),
    );
    models.insert(
        "DixonWater",
        ConfiguredModel::Pure(Law::DixonWater(DixonWater::default())),
    );
    models.insert(
        "IaconoMarzianoCarbon",
        ConfiguredModel::Pure(Law::IaconoMarzianoCarbon(IaconoMarzianoCarbon::default())),
    );
    models.insert(
        "IaconoMarzianoWater",
        ConfiguredModel::Pure(Law::IaconoMarzianoWater(IaconoMarzianoWater::default())),
    );
    models.insert(
        "AllisonCarbon",
        ConfiguredModel::Pure(Law::AllisonCarbon(AllisonCarbon::default())),
    );
    models.insert(
        "AllisonCarbonThermo",
        ConfiguredModel::Pure(Law::AllisonCarbon(AllisonCarbon::new(
            AllisonLocation::Sunset,
            AllisonForm::Thermodynamic,
        ))),
    );
    models.insert(
        "LiuCarbon",
        ConfiguredModel::Pure(Law::LiuCarbon(LiuCarbon::default())),
    );
    models.insert(
        "LiuWater",
        ConfiguredModel::Pure(Law::LiuWater(LiuWater::default())),
    );

    models.insert(
        "ShishkinaIdealMixed",
        mixed(
            "ShishkinaIdealMixed",
            Law::ShishkinaCarbon(ShishkinaCarbon::default()),
            Law::ShishkinaWater(ShishkinaWater::default()),
        ),
    );
    models.insert(
        "Dixon",
        mixed(
            "Dixon",
            Law::DixonCarbon(DixonCarbon::default()),
            Law::DixonWater(DixonWater::default()),
        ),
    );
    models.insert(
        "IaconoMarziano",
        mixed(
            "IaconoMarziano",
            Law::IaconoMarzianoCarbon(IaconoMarzianoCarbon::new(Parameterization::Hydrous)),
            Law::IaconoMarzianoWater(IaconoMarzianoWater::new(Parameterization::Hydrous)),
        ),
    );
    models.insert(
        "Liu",
        mixed(
            "Liu",
            Law::LiuCarbon(LiuCarbon::default()),
            Law::LiuWater(LiuWater::default()),
        ),
    );

    models
});

/// Look up a configured model by name.
pub fn model(name: &str) -> ModelResult<&'static ConfiguredModel> {
    debug!(name, "registry lookup");
    REGISTRY.get(name).ok_or_else(|| {
        ModelError::input(format!(
            "unknown model '{name}'; available: {}",
            model_names().join(", ")
        ))
    })
}

/// Names of every registered model, sorted.
pub fn model_names() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::law::SolubilityLaw;
    use ms_chem::Volatile;

    #[test]
    fn registry_contains_mixed_and_pure_models() {
        assert!(matches!(model("Liu").unwrap(), ConfiguredModel::Mixed(_)));
        assert!(matches!(
            model("AllisonCarbon").unwrap(),
            ConfiguredModel::Pure(_)
        ));
    }

    #[test]
    fn unknown_name_is_an_input_error() {
        let err = model("NotAModel").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("NotAModel"));
        assert!(matches!(err, ModelError::Input { .. }));
    }

    #[test]
    fn every_mixed_model_is_species_ordered() {
        for name in model_names() {
            if let ConfiguredModel::Mixed(m) = model(name).unwrap() {
                assert_eq!(m.carbon_law().species(), Volatile::CO2, "{name}");
                assert_eq!(m.water_law().species(), Volatile::H2O, "{name}");
            }
        }
    }

    #[test]
    fn names_are_sorted_and_stable() {
        let names = model_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"Dixon"));
        assert!(names.contains(&"ShishkinaIdealMixed"));
    }
}
