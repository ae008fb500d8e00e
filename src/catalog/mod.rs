//! Static parameter catalog: a typed tree keyed by
//! function -> building type -> age range -> tier -> object group ->
//! object type -> object name.
//!
//! The built-in catalog is constructed once per process and shared by
//! reference; see [`Catalog::builtin`].

pub(crate) mod defaults;
pub mod keys;
pub mod params;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub use keys::{
    AgeRange, BuildingFunction, BuildingType, Classification, EnvelopeObject, ObjectGroup,
    ObjectType, Tier,
};
pub use params::{AUTOSIZE, ParamValue, ParameterSet, ParameterSpec};

use crate::error::{Error, Result};
use crate::ground::GroundTemperatures;

static BUILTIN: LazyLock<Catalog> = LazyLock::new(defaults::builtin_catalog);

/// A leaf of the catalog tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    /// Named parameter specs, e.g. the ranges of an envelope material.
    Parameters(ParameterSet),
    /// Presence-only entry, e.g. an HVAC function code enabled for a tier.
    Marker,
}

impl CatalogEntry {
    /// The entry's parameters; markers have none.
    pub fn parameters(&self) -> ParameterSet {
        match self {
            Self::Parameters(set) => set.clone(),
            Self::Marker => ParameterSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectTypeNode {
    pub objects: BTreeMap<String, CatalogEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGroupNode {
    pub object_types: BTreeMap<ObjectType, ObjectTypeNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierNode {
    pub groups: BTreeMap<ObjectGroup, ObjectGroupNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgeRangeNode {
    pub tiers: BTreeMap<Tier, TierNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingTypeNode {
    pub age_ranges: BTreeMap<AgeRange, AgeRangeNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionNode {
    pub building_types: BTreeMap<BuildingType, BuildingTypeNode>,
}

/// Full address of one catalog leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPath<'a> {
    pub classification: Classification,
    pub tier: Tier,
    pub group: ObjectGroup,
    pub object_type: ObjectType,
    pub object_name: &'a str,
}

impl<'a> CatalogPath<'a> {
    /// Path of one of the six envelope objects.
    pub fn envelope(classification: Classification, tier: Tier, object: EnvelopeObject) -> Self {
        Self {
            classification,
            tier,
            group: object.object_group(),
            object_type: object.object_type(),
            object_name: object.as_str(),
        }
    }
}

impl fmt::Display for CatalogPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.classification;
        write!(
            f,
            "{} -> {} -> {} -> {} -> {} -> {} -> {}",
            c.function,
            c.building_type,
            c.age_range,
            self.tier,
            self.group,
            self.object_type,
            self.object_name
        )
    }
}

/// The parameter catalog plus the monthly ground-temperature defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    functions: BTreeMap<BuildingFunction, FunctionNode>,
    ground_temperatures: GroundTemperatures,
}

impl Catalog {
    /// Creates an empty catalog around the given ground-temperature defaults.
    pub fn new(ground_temperatures: GroundTemperatures) -> Self {
        Self {
            functions: BTreeMap::new(),
            ground_temperatures,
        }
    }

    /// Process-wide built-in catalog, constructed on first use.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn ground_temperatures(&self) -> &GroundTemperatures {
        &self.ground_temperatures
    }

    pub fn functions(&self) -> &BTreeMap<BuildingFunction, FunctionNode> {
        &self.functions
    }

    /// Inserts (or replaces) a leaf, creating intermediate levels as needed.
    pub fn insert(&mut self, path: CatalogPath<'_>, entry: CatalogEntry) {
        let c = path.classification;
        self.functions
            .entry(c.function)
            .or_default()
            .building_types
            .entry(c.building_type)
            .or_default()
            .age_ranges
            .entry(c.age_range)
            .or_default()
            .tiers
            .entry(path.tier)
            .or_default()
            .groups
            .entry(path.group)
            .or_default()
            .object_types
            .entry(path.object_type)
            .or_default()
            .objects
            .insert(path.object_name.to_string(), entry);
    }

    /// Strict lookup of one leaf.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationNotFound`] naming the first level whose
    /// key is absent.
    pub fn lookup(&self, path: &CatalogPath<'_>) -> Result<&CatalogEntry> {
        let c = &path.classification;
        let missing = |level: &str, key: &dyn fmt::Display| Error::ConfigurationNotFound {
            path: path.to_string(),
            missing: format!("{level} \"{key}\""),
        };

        self.functions
            .get(&c.function)
            .ok_or_else(|| missing("function", &c.function))?
            .building_types
            .get(&c.building_type)
            .ok_or_else(|| missing("building type", &c.building_type))?
            .age_ranges
            .get(&c.age_range)
            .ok_or_else(|| missing("age range", &c.age_range))?
            .tiers
            .get(&path.tier)
            .ok_or_else(|| missing("tier", &path.tier))?
            .groups
            .get(&path.group)
            .ok_or_else(|| missing("object group", &path.group))?
            .object_types
            .get(&path.object_type)
            .ok_or_else(|| missing("object type", &path.object_type))?
            .objects
            .get(path.object_name)
            .ok_or_else(|| missing("object name", &path.object_name))
    }

    /// Probing lookup: `None` when any level is absent.
    pub fn get(&self, path: &CatalogPath<'_>) -> Option<&CatalogEntry> {
        let c = &path.classification;
        self.functions
            .get(&c.function)?
            .building_types
            .get(&c.building_type)?
            .age_ranges
            .get(&c.age_range)?
            .tiers
            .get(&path.tier)?
            .groups
            .get(&path.group)?
            .object_types
            .get(&path.object_type)?
            .objects
            .get(path.object_name)
    }

    /// Iterates every leaf holding parameters, with its path components.
    pub fn parameter_leaves(
        &self,
    ) -> impl Iterator<Item = (Classification, Tier, &str, &ParameterSet)> + '_ {
        self.functions.iter().flat_map(|(function, fnode)| {
            fnode.building_types.iter().flat_map(move |(btype, tnode)| {
                tnode.age_ranges.iter().flat_map(move |(age, anode)| {
                    let classification = Classification::new(*function, *btype, *age);
                    anode.tiers.iter().flat_map(move |(tier, tier_node)| {
                        tier_node.groups.values().flat_map(move |group| {
                            group.object_types.values().flat_map(move |otype| {
                                otype.objects.iter().filter_map(move |(name, entry)| match entry {
                                    CatalogEntry::Parameters(set) => {
                                        Some((classification, *tier, name.as_str(), set))
                                    }
                                    CatalogEntry::Marker => None,
                                })
                            })
                        })
                    })
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apartment_1965() -> Classification {
        Classification::new(
            BuildingFunction::Residential,
            BuildingType::Apartment,
            AgeRange::From1965To1974,
        )
    }

    #[test]
    fn builtin_is_constructed_once() {
        let a = Catalog::builtin() as *const Catalog;
        let b = Catalog::builtin() as *const Catalog;
        assert_eq!(a, b);
    }

    #[test]
    fn builtin_has_all_envelope_objects_for_authored_combinations() {
        let catalog = Catalog::builtin();
        for tier in Tier::ALL {
            for object in EnvelopeObject::ALL {
                let path = CatalogPath::envelope(apartment_1965(), *tier, *object);
                assert!(catalog.lookup(&path).is_ok(), "missing {path}");
            }
        }
    }

    #[test]
    fn every_builtin_range_is_ordered() {
        for (classification, tier, name, set) in Catalog::builtin().parameter_leaves() {
            for (param, value) in set {
                if let ParamValue::Range(spec) = value {
                    if let (Some(lo), Some(hi)) = (spec.min_value, spec.max_value) {
                        assert!(
                            lo <= hi,
                            "{classification:?} {tier} {name}.{param}: {lo} > {hi}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn strict_lookup_names_missing_level() {
        let catalog = Catalog::builtin();
        let residential_other = Classification::new(
            BuildingFunction::Residential,
            BuildingType::Other,
            AgeRange::Before1945,
        );
        let path = CatalogPath::envelope(residential_other, Tier::Tier1, EnvelopeObject::Roof);
        match catalog.lookup(&path) {
            Err(Error::ConfigurationNotFound { missing, path }) => {
                assert_eq!(missing, "building type \"Other\"");
                assert!(path.starts_with("Residential -> Other -> < 1945"));
            }
            other => panic!("expected ConfigurationNotFound, got {other:?}"),
        }
        assert!(catalog.get(&path).is_none());
    }

    #[test]
    fn hvac_markers_skip_unauthored_age_band() {
        let catalog = Catalog::builtin();
        let path = |age| CatalogPath {
            classification: Classification::new(
                BuildingFunction::Industrial,
                BuildingType::Other,
                age,
            ),
            tier: Tier::Tier0,
            group: ObjectGroup::HvacSystems,
            object_type: ObjectType::HvacFunction,
            object_name: "C1",
        };
        assert_eq!(
            catalog.get(&path(AgeRange::Before1945)),
            Some(&CatalogEntry::Marker)
        );
        assert!(catalog.get(&path(AgeRange::From1945To1964)).is_none());
    }

    #[test]
    fn insert_creates_intermediate_levels() {
        let mut catalog = Catalog::new(GroundTemperatures::default());
        let path = CatalogPath::envelope(apartment_1965(), Tier::Tier2, EnvelopeObject::Windows);
        assert!(catalog.get(&path).is_none());
        catalog.insert(path, CatalogEntry::Marker);
        assert_eq!(catalog.get(&path), Some(&CatalogEntry::Marker));
    }
}
