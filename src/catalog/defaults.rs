//! Built-in catalog content: envelope ranges per tier, HVAC function codes,
//! and monthly ground temperatures.

use super::keys::{
    AgeRange, BuildingFunction, BuildingType, Classification, EnvelopeObject, ObjectGroup,
    ObjectType, Tier,
};
use super::params::{ParameterSet, ParameterSpec, parameter_set};
use super::{Catalog, CatalogEntry, CatalogPath};
use crate::ground::{GroundTemperatures, MonthlyGroundTemperature};

const RESIDENTIAL_TYPES: &[BuildingType] = &[
    BuildingType::Apartment,
    BuildingType::TerracedHousing,
    BuildingType::SemiDetached,
    BuildingType::Detached,
];

const OTHER_TYPES: &[BuildingType] = &[BuildingType::Other];

/// HVAC function codes are not authored for the 1945-1964 band.
const HVAC_AGE_RANGES: &[AgeRange] = &[
    AgeRange::Before1945,
    AgeRange::From1965To1974,
    AgeRange::From1975To1991,
    AgeRange::From1992To2005,
    AgeRange::From2006To2014,
    AgeRange::From2015To2018,
];

fn building_types(function: BuildingFunction) -> &'static [BuildingType] {
    match function {
        BuildingFunction::Residential => RESIDENTIAL_TYPES,
        BuildingFunction::Industrial | BuildingFunction::Commercial => OTHER_TYPES,
    }
}

const fn r(min: f64, max: f64, min_allowed: f64, max_allowed: f64) -> ParameterSpec {
    ParameterSpec::range(min, max, min_allowed, max_allowed)
}

fn envelope_parameters(tier: Tier, object: EnvelopeObject) -> ParameterSet {
    use EnvelopeObject::*;
    match (tier, object) {
        (Tier::Tier0, GroundFloor) => parameter_set(&[
            ("roughness", r(0.5, 1.5, 0.4, 1.6)),
            ("thickness", r(0.15, 0.25, 0.1, 0.3)),
            ("thermal conductivity", r(1.2, 2.0, 1.0, 2.5)),
            ("density", r(2200.0, 2500.0, 2000.0, 2600.0)),
            ("specific heat", r(800.0, 1200.0, 700.0, 1300.0)),
        ]),
        (Tier::Tier0, ExtWalls) => parameter_set(&[
            ("surface roughness", r(0.3, 1.0, 0.2, 1.2)),
            ("thickness", r(0.2, 0.35, 0.15, 0.4)),
            ("thermal conductivity", r(1.1, 2.2, 1.0, 2.5)),
            ("density", r(2100.0, 2400.0, 2000.0, 2500.0)),
            ("specific heat", r(800.0, 1200.0, 700.0, 1300.0)),
        ]),
        (Tier::Tier0, Roof) => parameter_set(&[("thermal resistance", r(0.5, 2.0, 0.3, 2.5))]),
        (Tier::Tier0, Windows) => parameter_set(&[("u_factor", r(2.5, 3.5, 2.0, 4.0))]),
        (Tier::Tier0, IntWalls | IntFloors) => {
            parameter_set(&[("thermal resistance", r(0.2, 1.0, 0.15, 1.2))])
        }

        (Tier::Tier1, GroundFloor) => parameter_set(&[
            ("roughness", r(0.6, 1.4, 0.5, 1.7)),
            ("thickness", r(0.18, 0.28, 0.12, 0.32)),
            ("thermal conductivity", r(1.1, 2.1, 1.0, 2.6)),
            ("density", r(2100.0, 2400.0, 1900.0, 2500.0)),
            ("specific heat", r(800.0, 1200.0, 700.0, 1300.0)),
        ]),
        (Tier::Tier1, ExtWalls) => parameter_set(&[
            ("surface roughness", r(0.4, 1.2, 0.3, 1.3)),
            ("thickness", r(0.25, 0.4, 0.2, 0.45)),
            ("thermal conductivity", r(1.3, 2.5, 1.2, 2.7)),
            ("density", r(2200.0, 2500.0, 2000.0, 2600.0)),
            ("specific heat", r(800.0, 1200.0, 700.0, 1300.0)),
        ]),
        (Tier::Tier1, Roof) => parameter_set(&[("thermal resistance", r(0.7, 2.5, 0.4, 2.8))]),
        (Tier::Tier1, Windows) => parameter_set(&[("u_factor", r(2.0, 3.0, 1.5, 3.5))]),
        (Tier::Tier1, IntWalls | IntFloors) => {
            parameter_set(&[("thermal resistance", r(0.3, 1.2, 0.2, 1.3))])
        }

        (Tier::Tier2, GroundFloor) => parameter_set(&[
            ("roughness", r(0.7, 1.3, 0.6, 1.8)),
            ("thickness", r(0.2, 0.3, 0.15, 0.35)),
            ("thermal conductivity", r(1.0, 2.0, 0.9, 2.3)),
            ("density", r(2000.0, 2300.0, 1900.0, 2400.0)),
            ("specific heat", r(850.0, 1100.0, 750.0, 1250.0)),
        ]),
        (Tier::Tier2, ExtWalls) => parameter_set(&[
            ("surface roughness", r(0.5, 1.1, 0.4, 1.4)),
            ("thickness", r(0.3, 0.5, 0.25, 0.55)),
            ("thermal conductivity", r(1.2, 2.4, 1.1, 2.6)),
            ("density", r(2150.0, 2450.0, 2050.0, 2550.0)),
            ("specific heat", r(820.0, 1180.0, 720.0, 1280.0)),
        ]),
        (Tier::Tier2, Roof) => parameter_set(&[("thermal resistance", r(0.8, 2.8, 0.5, 3.0))]),
        (Tier::Tier2, Windows) => parameter_set(&[("u_factor", r(1.8, 2.8, 1.4, 3.2))]),
        (Tier::Tier2, IntWalls | IntFloors) => {
            parameter_set(&[("thermal resistance", r(0.4, 1.5, 0.3, 1.6))])
        }
    }
}

/// HVAC function codes (ventilation, heating, hot water, cooling) per tier.
fn hvac_functions(
    tier: Tier,
    function: BuildingFunction,
    building_type: BuildingType,
) -> &'static [&'static str] {
    use BuildingFunction::*;
    use BuildingType::*;
    match (tier, function, building_type) {
        (Tier::Tier0, Residential, TerracedHousing | SemiDetached) => &["V1", "H2", "DHV1"],
        (Tier::Tier0, Residential, Apartment) => &["V1", "H1", "DHV1"],
        (Tier::Tier0, Residential, Detached) => &["V1", "H3", "DHV1"],
        (Tier::Tier0, Industrial | Commercial, Other) => &["V2", "H2", "DHV2", "C1"],

        (Tier::Tier1, Residential, TerracedHousing | SemiDetached) => &["V2", "H1", "DHV2", "C2"],
        (Tier::Tier1, Residential, Apartment | Detached) => &["V2", "H2", "DHV2", "C1"],
        (Tier::Tier1, Industrial | Commercial, Other) => &["V2", "H3", "DHV2", "C2"],

        (Tier::Tier2, Residential, TerracedHousing | SemiDetached) => &["V3", "H1", "DHV2", "C2"],
        (Tier::Tier2, Residential, Apartment) => &["V3", "H3", "DHV2", "C2"],
        (Tier::Tier2, Residential, Detached) => &["V3", "H2", "DHV2", "C2"],
        (Tier::Tier2, Industrial | Commercial, Other) => &["V3", "H3", "DHV2", "C2"],

        _ => &[],
    }
}

pub(crate) fn ground_temperatures() -> GroundTemperatures {
    let m = |base_value, min_value, max_value| MonthlyGroundTemperature {
        base_value,
        min_value,
        max_value,
    };
    GroundTemperatures::new(
        [
            m(2.61, 2.0, 3.0),
            m(4.82, 4.0, 5.0),
            m(5.91, 5.0, 6.5),
            m(9.32, 8.0, 10.0),
            m(14.73, 13.0, 16.0),
            m(16.12, 15.0, 17.5),
            m(18.05, 17.0, 19.0),
            m(18.48, 17.5, 19.5),
            m(15.63, 14.5, 16.5),
            m(10.40, 9.0, 11.0),
            m(7.99, 7.0, 9.0),
            m(4.00, 3.0, 5.0),
        ],
        0.0,
    )
}

pub(super) fn builtin_catalog() -> Catalog {
    let mut catalog = Catalog::new(ground_temperatures());

    for function in BuildingFunction::ALL {
        for building_type in building_types(*function) {
            for age_range in AgeRange::ALL {
                let classification = Classification::new(*function, *building_type, *age_range);
                for tier in Tier::ALL {
                    for object in EnvelopeObject::ALL {
                        catalog.insert(
                            CatalogPath::envelope(classification, *tier, *object),
                            CatalogEntry::Parameters(envelope_parameters(*tier, *object)),
                        );
                    }
                }
            }
        }
    }

    for tier in Tier::ALL {
        for function in BuildingFunction::ALL {
            for building_type in building_types(*function) {
                for age_range in HVAC_AGE_RANGES {
                    let classification =
                        Classification::new(*function, *building_type, *age_range);
                    for code in hvac_functions(*tier, *function, *building_type) {
                        catalog.insert(
                            CatalogPath {
                                classification,
                                tier: *tier,
                                group: ObjectGroup::HvacSystems,
                                object_type: ObjectType::HvacFunction,
                                object_name: *code,
                            },
                            CatalogEntry::Marker,
                        );
                    }
                }
            }
        }
    }

    log::debug!("built-in catalog constructed");
    catalog
}
