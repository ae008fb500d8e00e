//! Parameter specs stored at the leaves of the catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

/// Label of the autosize sentinel as the downstream simulator spells it.
pub const AUTOSIZE: &str = "Autosize";

/// A bounded parameter range with an autosize escape hatch.
///
/// Catalog entries always carry both bounds with `min_value <= max_value`.
/// Specs coming from override documents may not, which is why the bounds are
/// optional and checked at sampling time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// When true, sampling yields the autosize sentinel and ignores the bounds.
    #[serde(default)]
    pub autosize_allowed: bool,
    /// Lowest value an override may reasonably set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value_allowed: Option<f64>,
    /// Highest value an override may reasonably set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value_allowed: Option<f64>,
}

impl ParameterSpec {
    /// A fully specified, non-autosize catalog range.
    pub const fn range(min: f64, max: f64, min_allowed: f64, max_allowed: f64) -> Self {
        Self {
            min_value: Some(min),
            max_value: Some(max),
            autosize_allowed: false,
            min_value_allowed: Some(min_allowed),
            max_value_allowed: Some(max_allowed),
        }
    }

    /// Whether `value` lies inside the allowed override window, treating a
    /// missing side as unbounded.
    pub fn allows(&self, value: f64) -> bool {
        self.min_value_allowed.is_none_or(|lo| value >= lo)
            && self.max_value_allowed.is_none_or(|hi| value <= hi)
    }
}

/// A parameter as held in a resolved parameter set: still a range, already a
/// concrete number, or the autosize sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Range(ParameterSpec),
    Number(f64),
    Autosize,
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Range(spec) => spec.serialize(serializer),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Autosize => serializer.serialize_str(AUTOSIZE),
        }
    }
}

/// Named parameters of one catalog object, e.g. `thickness` -> range.
pub type ParameterSet = BTreeMap<String, ParamValue>;

/// Builds a parameter set from `(name, spec)` pairs.
pub fn parameter_set(entries: &[(&str, ParameterSpec)]) -> ParameterSet {
    entries
        .iter()
        .map(|(name, spec)| ((*name).to_string(), ParamValue::Range(*spec)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_respects_allowed_window() {
        let spec = ParameterSpec::range(0.5, 1.5, 0.4, 1.6);
        assert!(spec.allows(0.4));
        assert!(spec.allows(1.6));
        assert!(!spec.allows(1.7));
        assert!(ParameterSpec::default().allows(1e9));
    }

    #[test]
    fn param_values_serialize_to_plain_json() {
        let autosize = serde_json::to_string(&ParamValue::Autosize).unwrap();
        assert_eq!(autosize, "\"Autosize\"");
        let number = serde_json::to_string(&ParamValue::Number(0.25)).unwrap();
        assert_eq!(number, "0.25");
        let range =
            serde_json::to_value(ParamValue::Range(ParameterSpec::range(1.0, 2.0, 0.5, 2.5)))
                .unwrap();
        assert_eq!(range["max_value"], 2.0);
    }
}
