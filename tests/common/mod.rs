//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;

use bem_paramgen::building::BuildingRecord;
use bem_paramgen::config::RunConfig;
use bem_paramgen::user_config::UserConfig;

/// Ten inventory rows; row `b05` carries a building type the catalog does
/// not know.
pub fn ten_buildings() -> Vec<BuildingRecord> {
    let rows = [
        ("b00", "Residential", "Apartment", "< 1945"),
        ("b01", "Residential", "Terraced housing", "1945 - 1964"),
        ("b02", "Residential", "Semi Detached", "1965 - 1974"),
        ("b03", "Residential", "Detached", "1975 - 1991"),
        ("b04", "Industrial", "Other", "1992 - 2005"),
        ("b05", "Residential", "Bungalow", "2006 - 2014"),
        ("b06", "Commercial", "Other", "2015 - 2018"),
        ("b07", "Residential", "Apartment", "2006 - 2014"),
        ("b08", "Residential", "Detached", "< 1945"),
        ("b09", "Commercial", "Other", "1945 - 1964"),
    ];
    rows.iter()
        .map(|(id, f, t, a)| {
            let mut b = BuildingRecord::new(*id, *f, *t, *a);
            b.postcode = Some("1012AB".to_string());
            b.area = Some(120.0);
            b.perimeter = Some(46.0);
            b.height = Some(9.0);
            b.average_wwr = Some(0.25);
            b
        })
        .collect()
}

/// Id of the deliberately invalid row in [`ten_buildings`].
pub const INVALID_ID: &str = "b05";

/// Inventory CSV matching [`ten_buildings`], in the inventory's column names.
pub fn ten_buildings_csv() -> String {
    let mut csv = String::from(
        "nummeraanduiding_id,meestvoorkomendepostcode,function,building_type,age_range,height,area,perimeter,average_wwr\n",
    );
    for b in ten_buildings() {
        csv.push_str(&format!(
            "{},{},{},{},{},9.0,120.0,46.0,0.25\n",
            b.id,
            b.postcode.as_deref().unwrap_or_default(),
            b.function,
            b.building_type,
            b.age_range
        ));
    }
    csv
}

/// Seeded configuration writing into `output_dir`.
pub fn test_config(output_dir: &Path) -> RunConfig {
    let mut config = RunConfig::default();
    config.paths.output_dir = output_dir.to_path_buf();
    config.batch.max_workers = 4;
    config.batch.seed = Some(2024);
    config
}

/// A representative override document.
pub fn sample_user_config() -> UserConfig {
    let json = r#"{
        "user_selections": {
            "Residential": {
                "Apartment": { "< 1945": "tier 0", "2006 - 2014": "niveau 2" }
            },
            "Commercial": { "Other": { "2015 - 2018": "tier 2" } }
        },
        "user_modifications": {
            "windows": { "u_factor": { "value": 1.6 } },
            "roof": { "thermal resistance": { "autosize_allowed": true } },
            "future_increase": 0.5,
            "January": { "max_value": 2.8 }
        }
    }"#;
    UserConfig::from_json_str(json).unwrap()
}
