//! Monthly ground temperatures with a global future-increase offset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::keys::catalog_key;

catalog_key! {
    /// Calendar month, spelled the way the override document keys it.
    Month, "month" {
        January => "January",
        February => "February",
        March => "March",
        April => "April",
        May => "May",
        June => "June",
        July => "July",
        August => "August",
        September => "September",
        October => "October",
        November => "November",
        December => "December",
    }
}

impl Month {
    /// Zero-based position in the calendar year.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Catalog default for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGroundTemperature {
    pub base_value: f64,
    pub min_value: f64,
    pub max_value: f64,
}

/// Catalog defaults for all twelve months plus the default increase.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTemperatures {
    months: [MonthlyGroundTemperature; 12],
    /// Offset added to every month before clamping (degrees C).
    pub future_increase: f64,
}

impl GroundTemperatures {
    /// Builds the table from January..December entries.
    pub fn new(months: [MonthlyGroundTemperature; 12], future_increase: f64) -> Self {
        Self {
            months,
            future_increase,
        }
    }

    pub fn month(&self, month: Month) -> &MonthlyGroundTemperature {
        &self.months[month.index()]
    }
}

impl Default for GroundTemperatures {
    fn default() -> Self {
        crate::catalog::defaults::ground_temperatures()
    }
}

/// Per-month override from the user document; each field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonthOverride {
    pub base_value: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Ground-temperature part of the user modifications.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroundOverrides {
    pub future_increase: Option<f64>,
    pub months: BTreeMap<Month, MonthOverride>,
}

/// Adjusted temperature per month, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundTemperatureProfile([f64; 12]);

impl GroundTemperatureProfile {
    pub fn get(&self, month: Month) -> f64 {
        self.0[month.index()]
    }

    /// `(month, value)` pairs from January to December.
    pub fn iter(&self) -> impl Iterator<Item = (Month, f64)> + '_ {
        Month::ALL.iter().map(|m| (*m, self.get(*m)))
    }
}

impl Serialize for GroundTemperatureProfile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Applies the future increase to every month and clamps into the month's
/// bounds.
///
/// Bounds and base value prefer the per-month override, then the catalog
/// default. The increase is added after that resolution, and clamping comes
/// last. When the resolved bounds are inverted the lower bound wins.
pub fn adjust_ground_temperatures(
    defaults: &GroundTemperatures,
    overrides: &GroundOverrides,
) -> GroundTemperatureProfile {
    let increase = overrides
        .future_increase
        .unwrap_or(defaults.future_increase);

    let mut adjusted = [0.0; 12];
    for month in Month::ALL {
        let base = defaults.month(*month);
        let user = overrides.months.get(month).copied().unwrap_or_default();

        let base_value = user.base_value.unwrap_or(base.base_value);
        let min_value = user.min_value.unwrap_or(base.min_value);
        let max_value = user.max_value.unwrap_or(base.max_value);

        adjusted[month.index()] = (base_value + increase).min(max_value).max(min_value);
    }
    GroundTemperatureProfile(adjusted)
}
