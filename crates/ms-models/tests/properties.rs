//! Cross-model property suite: saturation round-trips, pressure
//! monotonicity, end-member consistency, degenerate-fluid edges, and the
//! structured calibration reports.

use ms_chem::{Composition, Oxide, Volatile};
use ms_core::units::{Temperature, bar, degc};
use ms_models::{
    ConfiguredModel, Law, ModelError, SolubilityLaw, registry,
};

fn basalt() -> Composition {
    Composition::new([
        (Oxide::SiO2, 50.0),
        (Oxide::Al2O3, 18.0),
        (Oxide::FeO, 8.0),
        (Oxide::MgO, 7.0),
        (Oxide::CaO, 11.0),
        (Oxide::Na2O, 3.0),
        (Oxide::K2O, 1.0),
        (Oxide::H2O, 4.0),
        (Oxide::CO2, 0.5),
    ])
    .unwrap()
}

fn rhyolite() -> Composition {
    Composition::new([
        (Oxide::SiO2, 77.0),
        (Oxide::Al2O3, 13.0),
        (Oxide::Na2O, 4.0),
        (Oxide::K2O, 4.5),
        (Oxide::H2O, 4.0),
        (Oxide::CO2, 0.05),
    ])
    .unwrap()
}

fn pure_law(name: &str) -> &'static Law {
    match registry::model(name).unwrap() {
        ConfiguredModel::Pure(law) => law,
        ConfiguredModel::Mixed(_) => panic!("{name} is not a pure law"),
    }
}

/// (registry name, sample, temperature) combinations valid for each law.
///
/// Volatile budgets sit inside each law's reachable solubility range so
/// the saturation inversion has a root (Dixon and the thermodynamic
/// Allison form top out near 0.1 wt% CO2).
fn law_cases() -> Vec<(&'static str, Composition, Temperature)> {
    let dixon_sample = basalt().with(Oxide::CO2, 0.05).unwrap();
    let allison_thermo_sample = basalt().with(Oxide::CO2, 0.08).unwrap();
    vec![
        ("ShishkinaCarbon", basalt(), degc(1200.0)),
        ("ShishkinaWater", basalt(), degc(1200.0)),
        ("DixonCarbon", dixon_sample, degc(1200.0)),
        ("DixonWater", basalt(), degc(1200.0)),
        ("IaconoMarzianoCarbon", basalt(), degc(1200.0)),
        ("IaconoMarzianoWater", basalt(), degc(1200.0)),
        ("AllisonCarbon", basalt(), degc(1200.0)),
        ("AllisonCarbonThermo", allison_thermo_sample, degc(1200.0)),
        ("LiuCarbon", rhyolite(), degc(800.0)),
        ("LiuWater", rhyolite(), degc(800.0)),
    ]
}

#[test]
fn dissolved_is_monotonic_in_pressure_for_every_law() {
    for (name, sample, temperature) in law_cases() {
        let law = pure_law(name);
        let mut last = -1.0;
        for p in [500.0, 1000.0, 2000.0, 3000.0, 4000.0] {
            let wt = law
                .dissolved_volatiles(bar(p), temperature, &sample, 1.0)
                .unwrap();
            assert!(
                wt >= last,
                "{name}: dissolved fell from {last} to {wt} at {p} bars"
            );
            last = wt;
        }
    }
}

#[test]
fn saturation_round_trip_for_every_law() {
    for (name, sample, temperature) in law_cases() {
        let law = pure_law(name);
        let target = sample.volatile(law.species());
        let sat_p = law.saturation_pressure(temperature, &sample).unwrap();
        assert!(sat_p > 0.0, "{name}: non-positive saturation pressure");
        let back = law
            .dissolved_volatiles(bar(sat_p), temperature, &sample, 1.0)
            .unwrap();
        assert!(
            (back - target).abs() < 1e-3,
            "{name}: round trip gave {back} for target {target}"
        );
    }
}

#[test]
fn zero_fluid_fraction_gives_zero_fugacity_and_dissolved_carbon() {
    for name in ["ShishkinaCarbon", "DixonCarbon", "AllisonCarbon", "LiuCarbon"] {
        let law = pure_law(name);
        assert_eq!(law.species(), Volatile::CO2);
        let fug = law
            .fugacity_model()
            .fugacity(2000.0, 1473.15, 0.0)
            .unwrap();
        assert_eq!(fug, 0.0, "{name}: fugacity at X=0");
        let wt = law
            .dissolved_volatiles(bar(2000.0), degc(1200.0), &basalt(), 0.0)
            .unwrap();
        assert_eq!(wt, 0.0, "{name}: dissolved at X=0");
    }
}

#[test]
fn reference_scenario_allison_sunset_half_percent_co2() {
    // Basaltic sample with 0.5 wt% CO2 at 1200 C against the power-law
    // CO2 model: the saturation pressure must reproduce the budget on the
    // forward evaluation at pure CO2.
    let law = pure_law("AllisonCarbon");
    let sample = basalt();
    let sat_p = law.saturation_pressure(degc(1200.0), &sample).unwrap();
    let back = law
        .dissolved_volatiles(bar(sat_p), degc(1200.0), &sample, 1.0)
        .unwrap();
    assert!((back - 0.5).abs() < 1e-3, "round trip gave {back}");
}

#[test]
fn mixed_end_members_match_component_laws_exactly() {
    for name in ["ShishkinaIdealMixed", "Dixon", "IaconoMarziano", "Liu"] {
        let ConfiguredModel::Mixed(model) = registry::model(name).unwrap() else {
            panic!("{name} should be mixed");
        };
        let sample = if name == "Liu" { rhyolite() } else { basalt() };
        let t = if name == "Liu" { degc(800.0) } else { degc(1200.0) };
        let p = bar(2000.0);

        let co2_side = model
            .dissolved_volatiles(p, t, &sample, &[1.0, 0.0])
            .unwrap();
        let co2_law = model
            .carbon_law()
            .dissolved_volatiles(p, t, &sample, 1.0)
            .unwrap();
        assert_eq!(co2_side.co2, co2_law, "{name}: CO2 end-member");
        assert_eq!(co2_side.h2o, 0.0, "{name}: no water from a CO2 fluid");

        let h2o_side = model
            .dissolved_volatiles(p, t, &sample, &[0.0, 1.0])
            .unwrap();
        let h2o_law = model
            .water_law()
            .dissolved_volatiles(p, t, &sample, 1.0)
            .unwrap();
        assert_eq!(h2o_side.h2o, h2o_law, "{name}: H2O end-member");
        assert_eq!(h2o_side.co2, 0.0, "{name}: no CO2 from a water fluid");
    }
}

#[test]
fn mixed_saturation_satisfies_both_budgets() {
    // Ideal-fugacity laws make the joint problem nearly separable; the
    // solver must still couple them through the shared total pressure.
    for (name, sample, t) in [
        ("ShishkinaIdealMixed", basalt(), degc(1200.0)),
        ("Liu", rhyolite(), degc(800.0)),
    ] {
        let ConfiguredModel::Mixed(model) = registry::model(name).unwrap() else {
            panic!("{name} should be mixed");
        };
        let state = model.saturation_pressure(t, &sample).unwrap();
        let dissolved = model
            .dissolved_volatiles(
                bar(state.pressure_bars),
                t,
                &sample,
                &[state.fluid.x_co2(), state.fluid.x_h2o()],
            )
            .unwrap();
        let target_h2o = sample.volatile(Volatile::H2O);
        let target_co2 = sample.volatile(Volatile::CO2);
        assert!(
            (dissolved.h2o - target_h2o).abs() < 1e-3,
            "{name}: H2O {} vs {target_h2o}",
            dissolved.h2o
        );
        assert!(
            (dissolved.co2 - target_co2).abs() < 1e-3,
            "{name}: CO2 {} vs {target_co2}",
            dissolved.co2
        );
    }
}

#[test]
fn volatile_free_sample_raises_saturation_error() {
    let dry = basalt()
        .with(Oxide::H2O, 0.0)
        .unwrap()
        .with(Oxide::CO2, 0.0)
        .unwrap();
    let law = pure_law("ShishkinaWater");
    let err = law.saturation_pressure(degc(1200.0), &dry).unwrap_err();
    assert!(matches!(err, ModelError::Saturation { .. }));

    let ConfiguredModel::Mixed(model) = registry::model("ShishkinaIdealMixed").unwrap() else {
        panic!("expected mixed model");
    };
    let err = model.saturation_pressure(degc(1200.0), &dry).unwrap_err();
    assert!(matches!(err, ModelError::Saturation { .. }));
}

#[test]
fn out_of_range_fluid_fraction_is_an_input_error() {
    let law = pure_law("LiuWater");
    for bad in [-0.1, 1.1, f64::NAN] {
        let err = law
            .dissolved_volatiles(bar(1000.0), degc(800.0), &rhyolite(), bad)
            .unwrap_err();
        assert!(matches!(err, ModelError::Input { .. }), "accepted {bad}");
    }
}

#[test]
fn calibration_report_covers_law_and_submodels() {
    let law = pure_law("ShishkinaCarbon");
    let report = law.check_calibration_range(bar(2000.0), degc(1200.0));
    assert_eq!(report.check("Shishkina CO2", "pressure"), Some(true));
    assert_eq!(report.check("ideal gas", "pressure"), Some(true));
    assert_eq!(report.check("ideal activity", "temperature"), Some(true));

    // Outside the published window the law flags it while the ideal
    // sub-models stay in range, separably.
    let report = law.check_calibration_range(bar(50_000.0), degc(1200.0));
    assert_eq!(report.check("Shishkina CO2", "pressure"), Some(false));
    assert_eq!(report.check("ideal gas", "pressure"), Some(true));
    assert!(!report.all_in_range());
}

#[test]
fn fluid_presence_flips_across_the_saturation_pressure() {
    let law = pure_law("LiuWater");
    let sample = rhyolite();
    let t = degc(800.0);
    let sat_p = law.saturation_pressure(t, &sample).unwrap();
    assert_eq!(
        law.equilibrium_fluid_presence(bar(sat_p * 0.5), t, &sample)
            .unwrap(),
        ms_models::FluidPresence::Saturated
    );
    assert_eq!(
        law.equilibrium_fluid_presence(bar(sat_p * 2.0), t, &sample)
            .unwrap(),
        ms_models::FluidPresence::Undersaturated
    );
}

#[test]
fn preprocessing_does_not_mutate_the_input() {
    let sample = basalt();
    let before = sample;
    for (name, _, temperature) in law_cases() {
        let law = pure_law(name);
        let _ = law.dissolved_volatiles(bar(2000.0), temperature, &sample, 1.0);
        assert_eq!(sample, before, "{name} mutated the caller's composition");
    }
}
