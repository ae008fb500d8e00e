//! One row of the building inventory.

use serde::{Deserialize, Serialize};

use crate::catalog::Classification;
use crate::error::Result;

/// Default facade height (m) when the inventory has none.
pub const DEFAULT_HEIGHT_M: f64 = 10.0;
/// Storey height (m) used to derive the number of floors.
pub const FLOOR_HEIGHT_M: f64 = 3.0;
/// Window-to-wall ratio when the inventory has none.
pub const DEFAULT_WWR: f64 = 0.2;

/// A building row as read from the inventory.
///
/// Classification fields stay raw strings so a row with an unknown label can
/// still be carried through the batch and reported by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    #[serde(alias = "nummeraanduiding_id")]
    pub id: String,
    #[serde(default, alias = "meestvoorkomendepostcode")]
    pub postcode: Option<String>,
    pub function: String,
    pub building_type: String,
    pub age_range: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub perimeter: Option<f64>,
    #[serde(default)]
    pub average_wwr: Option<f64>,
}

impl BuildingRecord {
    /// A record with classification only; geometry left unset.
    pub fn new(
        id: impl Into<String>,
        function: impl Into<String>,
        building_type: impl Into<String>,
        age_range: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            postcode: None,
            function: function.into(),
            building_type: building_type.into(),
            age_range: age_range.into(),
            height: None,
            area: None,
            perimeter: None,
            average_wwr: None,
        }
    }

    /// Parses the classification triple.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`](crate::error::Error::UnknownKey) for the first
    /// label outside its enumeration.
    pub fn classification(&self) -> Result<Classification> {
        Classification::parse(&self.function, &self.building_type, &self.age_range)
    }

    /// Number of storeys implied by the facade height, at least one.
    pub fn storeys(&self) -> u32 {
        let height = self.height.unwrap_or(DEFAULT_HEIGHT_M);
        ((height / FLOOR_HEIGHT_M).floor() as u32).max(1)
    }

    /// Footprint `(width, length)` derived from area and perimeter, if both
    /// are known and positive.
    pub fn footprint(&self) -> Option<(f64, f64)> {
        let (area, perimeter) = (self.area?, self.perimeter?);
        if area <= 0.0 || perimeter <= 0.0 {
            return None;
        }
        let width = (area / (perimeter / 4.0)).max(area.sqrt());
        Some((width, area / width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AgeRange, BuildingType};

    #[test]
    fn classification_parses_labels() {
        let b = BuildingRecord::new("1", "Residential", "Semi Detached", "1992 - 2005");
        let c = b.classification().unwrap();
        assert_eq!(c.building_type, BuildingType::SemiDetached);
        assert_eq!(c.age_range, AgeRange::From1992To2005);
    }

    #[test]
    fn storeys_from_height() {
        let mut b = BuildingRecord::new("1", "Residential", "Detached", "< 1945");
        assert_eq!(b.storeys(), 3);
        b.height = Some(7.5);
        assert_eq!(b.storeys(), 2);
        b.height = Some(1.0);
        assert_eq!(b.storeys(), 1);
    }

    #[test]
    fn footprint_from_area_and_perimeter() {
        let mut b = BuildingRecord::new("1", "Residential", "Detached", "< 1945");
        assert_eq!(b.footprint(), None);
        b.area = Some(100.0);
        b.perimeter = Some(40.0);
        assert_eq!(b.footprint(), Some((10.0, 10.0)));
    }

    #[test]
    fn inventory_column_aliases_deserialize() {
        let json = r#"{
            "nummeraanduiding_id": "0363200000123456",
            "meestvoorkomendepostcode": "1012AB",
            "function": "Residential",
            "building_type": "Apartment",
            "age_range": "< 1945",
            "area": 120.5
        }"#;
        let b: BuildingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(b.id, "0363200000123456");
        assert_eq!(b.postcode.as_deref(), Some("1012AB"));
        assert_eq!(b.area, Some(120.5));
    }
}
