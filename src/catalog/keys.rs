//! Closed key enumerations for each level of the catalog tree.
//!
//! Every key parses from its canonical label (plus any legacy aliases) and
//! serializes back to the canonical label, so the tree can be addressed with
//! the same strings the override documents and the building inventory use.

use crate::error::Error;

/// Declares a closed catalog key enum with string parsing and serde support.
macro_rules! catalog_key {
    (
        $(#[$meta:meta])*
        $name:ident, $level:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All keys, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical label used in the catalog and override documents.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label $(| $alias)* => Ok($name::$variant),)+
                    other => Err($crate::error::Error::UnknownKey {
                        level: $level,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use catalog_key;

catalog_key! {
    /// Primary use of a building.
    BuildingFunction, "function" {
        Residential => "Residential",
        Industrial => "Industrial",
        Commercial => "Commercial",
    }
}

catalog_key! {
    /// Building typology within a function.
    BuildingType, "building type" {
        Apartment => "Apartment",
        TerracedHousing => "Terraced housing",
        SemiDetached => "Semi Detached",
        Detached => "Detached",
        Other => "Other",
    }
}

catalog_key! {
    /// Construction-age band.
    AgeRange, "age range" {
        Before1945 => "< 1945",
        From1945To1964 => "1945 - 1964",
        From1965To1974 => "1965 - 1974",
        From1975To1991 => "1975 - 1991",
        From1992To2005 => "1992 - 2005",
        From2006To2014 => "2006 - 2014",
        From2015To2018 => "2015 - 2018",
    }
}

catalog_key! {
    /// Performance tier selecting which parameter ranges apply.
    Tier, "tier" {
        Tier0 => "tier 0" | "niveau 0",
        Tier1 => "tier 1" | "niveau 1",
        Tier2 => "tier 2" | "niveau 2",
    }
}

catalog_key! {
    ObjectGroup, "object group" {
        EnvelopeParameters => "envelop parameters",
        HvacSystems => "HVAC Systems",
    }
}

catalog_key! {
    ObjectType, "object type" {
        Material => "material",
        MaterialNoMass => "material:nomass",
        SimpleGlazingSystem => "windowmaterial:simpleglazingsystem",
        HvacFunction => "HVAC Function",
    }
}

catalog_key! {
    /// One of the six building-shell categories.
    EnvelopeObject, "envelope object" {
        GroundFloor => "groundfloor",
        ExtWalls => "ext_walls",
        Roof => "roof",
        Windows => "windows",
        IntWalls => "int_walls",
        IntFloors => "int_floors",
    }
}

impl EnvelopeObject {
    /// Catalog object type under which this envelope object is authored.
    pub fn object_type(self) -> ObjectType {
        match self {
            Self::GroundFloor | Self::ExtWalls => ObjectType::Material,
            Self::Roof | Self::IntWalls | Self::IntFloors => ObjectType::MaterialNoMass,
            Self::Windows => ObjectType::SimpleGlazingSystem,
        }
    }

    /// Envelope objects always live in the envelope parameter group.
    pub fn object_group(self) -> ObjectGroup {
        ObjectGroup::EnvelopeParameters
    }
}

/// The (function, type, age) triple that classifies one building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub function: BuildingFunction,
    pub building_type: BuildingType,
    pub age_range: AgeRange,
}

impl Classification {
    pub fn new(function: BuildingFunction, building_type: BuildingType, age_range: AgeRange) -> Self {
        Self {
            function,
            building_type,
            age_range,
        }
    }

    /// Parses a classification from raw inventory strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKey`] for the first component outside its
    /// closed enumeration.
    pub fn parse(function: &str, building_type: &str, age_range: &str) -> Result<Self, Error> {
        Ok(Self {
            function: function.parse()?,
            building_type: building_type.parse()?,
            age_range: age_range.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_labels() {
        for age in AgeRange::ALL {
            assert_eq!(age.as_str().parse::<AgeRange>().unwrap(), *age);
        }
        assert_eq!(
            "Terraced housing".parse::<BuildingType>().unwrap(),
            BuildingType::TerracedHousing
        );
    }

    #[test]
    fn tier_accepts_legacy_niveau_spelling() {
        assert_eq!("niveau 2".parse::<Tier>().unwrap(), Tier::Tier2);
        assert_eq!("tier 0".parse::<Tier>().unwrap(), Tier::Tier0);
    }

    #[test]
    fn unknown_key_fails_explicitly() {
        let err = "Castle".parse::<BuildingType>();
        assert!(matches!(
            err,
            Err(Error::UnknownKey {
                level: "building type",
                ..
            })
        ));
    }

    #[test]
    fn envelope_objects_map_to_authored_types() {
        assert_eq!(EnvelopeObject::ExtWalls.object_type(), ObjectType::Material);
        assert_eq!(
            EnvelopeObject::Windows.object_type(),
            ObjectType::SimpleGlazingSystem
        );
        assert_eq!(
            EnvelopeObject::IntFloors.object_type(),
            ObjectType::MaterialNoMass
        );
    }

    #[test]
    fn classification_parse_reports_first_bad_component() {
        let err = Classification::parse("Residential", "Castle", "< 1945");
        assert!(matches!(err, Err(Error::UnknownKey { value, .. }) if value == "Castle"));
    }

    #[test]
    fn keys_serialize_as_labels() {
        let json = serde_json::to_string(&AgeRange::Before1945).unwrap();
        assert_eq!(json, "\"< 1945\"");
        let tier: Tier = serde_json::from_str("\"niveau 1\"").unwrap();
        assert_eq!(tier, Tier::Tier1);
    }
}
