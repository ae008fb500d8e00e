//! Integration tests for catalog resolution, ground temperatures and
//! sampling over the built-in catalog.

mod common;

use bem_paramgen::Error;
use bem_paramgen::catalog::{
    AgeRange, BuildingFunction, BuildingType, Catalog, Classification, EnvelopeObject, ParamValue,
    Tier,
};
use bem_paramgen::ground::Month;
use bem_paramgen::resolver::{ConfigurationResolver, DEFAULT_TIER};
use bem_paramgen::sampler::{Roughness, SampledValue, ValueSampler, map_roughness_value};
use bem_paramgen::user_config::UserConfig;

#[test]
fn every_builtin_range_is_ordered() {
    let user = UserConfig::default();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);

    let mut checked = 0;
    for (classification, tier, name, _) in Catalog::builtin().parameter_leaves() {
        let Ok(object) = name.parse::<EnvelopeObject>() else {
            continue;
        };
        let set = resolver
            .fetch_envelope(&classification, Some(tier), object)
            .unwrap();
        for (param, value) in &set {
            if let ParamValue::Range(spec) = value {
                let (min, max) = (spec.min_value.unwrap_or(0.0), spec.max_value.unwrap_or(0.0));
                assert!(min <= max, "{classification:?} {tier:?} {name}.{param}");
                assert!(spec.allows(min) && spec.allows(max), "{name}.{param}");
            }
        }
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn builtin_ranges_sample_within_bounds() {
    let user = UserConfig::default();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);
    let mut sampler = ValueSampler::seeded(11);
    let classification = Classification::new(
        BuildingFunction::Commercial,
        BuildingType::Other,
        AgeRange::From1975To1991,
    );

    for object in EnvelopeObject::ALL {
        let set = resolver
            .fetch_envelope(&classification, None, *object)
            .unwrap();
        for (param, value) in &set {
            let ParamValue::Range(spec) = value else {
                panic!("unexpected override in {param}");
            };
            let sampled = sampler.sample(param, value).unwrap();
            let SampledValue::Number(x) = sampled else {
                panic!("{param} autosized");
            };
            assert!(spec.min_value.is_some_and(|lo| x >= lo), "{param}={x}");
            assert!(spec.max_value.is_some_and(|hi| x <= hi), "{param}={x}");
        }
    }
}

#[test]
fn missing_selection_falls_back_to_default_tier() {
    let user = common::sample_user_config();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);

    let selected = Classification::new(
        BuildingFunction::Residential,
        BuildingType::Apartment,
        AgeRange::Before1945,
    );
    let unselected_age = Classification::new(
        BuildingFunction::Residential,
        BuildingType::Apartment,
        AgeRange::From1975To1991,
    );
    let unselected_function = Classification::new(
        BuildingFunction::Industrial,
        BuildingType::Other,
        AgeRange::Before1945,
    );

    assert_eq!(resolver.resolve_tier(&selected), Tier::Tier0);
    assert_eq!(resolver.resolve_tier(&unselected_age), DEFAULT_TIER);
    assert_eq!(resolver.resolve_tier(&unselected_function), DEFAULT_TIER);
    assert_eq!(
        resolver
            .with_default_tier(Tier::Tier2)
            .resolve_tier(&unselected_function),
        Tier::Tier2
    );
}

#[test]
fn probe_is_silent_where_fetch_fails() {
    let user = UserConfig::default();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);
    // residential buildings are never typed "Other"
    let uncovered = Classification::new(
        BuildingFunction::Residential,
        BuildingType::Other,
        AgeRange::Before1945,
    );

    assert!(
        resolver
            .probe_envelope(&uncovered, None, EnvelopeObject::Roof)
            .is_none()
    );
    let err = resolver.fetch_envelope(&uncovered, None, EnvelopeObject::Roof);
    assert!(
        matches!(err, Err(Error::ConfigurationNotFound { .. })),
        "{err:?}"
    );
}

#[test]
fn overrides_replace_only_named_parameters() {
    let user = common::sample_user_config();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);
    let classification = Classification::new(
        BuildingFunction::Residential,
        BuildingType::Detached,
        AgeRange::From1992To2005,
    );

    let windows = resolver
        .fetch_envelope(&classification, None, EnvelopeObject::Windows)
        .unwrap();
    assert_eq!(windows.get("u_factor"), Some(&ParamValue::Number(1.6)));

    let walls = resolver
        .fetch_envelope(&classification, None, EnvelopeObject::ExtWalls)
        .unwrap();
    assert_eq!(walls.len(), 5);
    assert!(
        walls
            .values()
            .all(|v| matches!(v, ParamValue::Range(_)))
    );
}

#[test]
fn large_future_increase_clamps_to_month_max() {
    let user = UserConfig::from_json_str(r#"{"user_modifications": {"future_increase": 100}}"#)
        .unwrap();
    let resolver = ConfigurationResolver::new(Catalog::builtin(), &user);
    let profile = resolver.ground_temperatures();

    assert_eq!(profile.get(Month::January), 3.0);
    assert_eq!(profile.get(Month::August), 19.5);
}

#[test]
fn roughness_categories_cover_the_scale() {
    let cases = [
        (0.1, Roughness::VerySmooth),
        (0.2, Roughness::VerySmooth),
        (0.3, Roughness::Smooth),
        (0.5, Roughness::MediumSmooth),
        (0.7, Roughness::MediumRough),
        (0.9, Roughness::Rough),
        (1.5, Roughness::VeryRough),
    ];
    for (x, expected) in cases {
        assert_eq!(map_roughness_value(x), expected, "x = {x}");
    }
}
