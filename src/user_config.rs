//! User override document: tier selections, per-parameter overrides,
//! ground-temperature overrides, and the building filter.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::building::BuildingRecord;
use crate::catalog::{
    AgeRange, BuildingFunction, BuildingType, Catalog, Classification, ParamValue, ParameterSpec,
    Tier,
};
use crate::config::ConfigError;
use crate::error::Result;
use crate::ground::{GroundOverrides, Month, MonthOverride};

/// Tier chosen per function -> building type -> age range.
pub type TierSelections = BTreeMap<BuildingFunction, BTreeMap<BuildingType, BTreeMap<AgeRange, Tier>>>;

/// The whole override document for one request or batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub user_selections: TierSelections,
    pub user_modifications: UserModifications,
    pub filter_criteria: FilterCriteria,
}

impl UserConfig {
    /// Parses the document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, keys outside the closed catalog
    /// enumerations inside `user_selections`, or a malformed filter.
    /// Malformed `user_modifications` entries are not errors; they are
    /// dropped and reported by [`validate`](Self::validate).
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Selected tier for a classification, if the user made one.
    pub fn selected_tier(&self, classification: &Classification) -> Option<Tier> {
        self.user_selections
            .get(&classification.function)?
            .get(&classification.building_type)?
            .get(&classification.age_range)
            .copied()
    }

    /// Advisory checks against the catalog, plus any override entries
    /// dropped while parsing. Never fatal; callers log these.
    pub fn validate(&self, catalog: &Catalog) -> Vec<ConfigError> {
        let mut errors = self.user_modifications.rejected.clone();

        let mut known: BTreeMap<&str, BTreeMap<&str, ParameterSpec>> = BTreeMap::new();
        for (_, _, name, set) in catalog.parameter_leaves() {
            let params = known.entry(name).or_default();
            for (param, value) in set {
                if let ParamValue::Range(spec) = value {
                    params
                        .entry(param.as_str())
                        .and_modify(|s| widen_allowed(s, spec))
                        .or_insert(*spec);
                }
            }
        }

        for (object, params) in &self.user_modifications.objects {
            let Some(catalog_params) = known.get(object.as_str()) else {
                errors.push(ConfigError {
                    field: format!("user_modifications.{object}"),
                    message: "no catalog object with this name".into(),
                });
                continue;
            };
            for (param, ovr) in params {
                let field = format!("user_modifications.{object}.{param}");
                let Some(spec) = catalog_params.get(param.as_str()) else {
                    errors.push(ConfigError {
                        field,
                        message: "parameter not defined for this object".into(),
                    });
                    continue;
                };
                if let ParamValue::Number(v) = ovr.to_param_value() {
                    if !spec.allows(v) {
                        errors.push(ConfigError {
                            field,
                            message: format!(
                                "value {v} outside allowed [{}, {}]",
                                fmt_bound(spec.min_value_allowed),
                                fmt_bound(spec.max_value_allowed)
                            ),
                        });
                    }
                }
            }
        }

        for (month, ovr) in &self.user_modifications.ground.months {
            if let (Some(lo), Some(hi)) = (ovr.min_value, ovr.max_value) {
                if lo > hi {
                    errors.push(ConfigError {
                        field: format!("user_modifications.{month}"),
                        message: format!("min_value {lo} > max_value {hi}"),
                    });
                }
            }
        }

        errors
    }
}

fn widen_allowed(existing: &mut ParameterSpec, other: &ParameterSpec) {
    existing.min_value_allowed = match (existing.min_value_allowed, other.min_value_allowed) {
        (Some(a), Some(b)) => Some(a.min(b)),
        _ => None,
    };
    existing.max_value_allowed = match (existing.max_value_allowed, other.max_value_allowed) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    };
}

fn fmt_bound(bound: Option<f64>) -> String {
    bound.map_or_else(|| "-".to_string(), |b| b.to_string())
}

/// One parameter override. Accepts a bare number, `{"value": x}`,
/// `{"autosize_allowed": true}`, or a replacement range spec.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "OverrideRepr")]
pub struct ParameterOverride {
    pub value: Option<f64>,
    pub autosize_allowed: bool,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_value_allowed: Option<f64>,
    pub max_value_allowed: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OverrideRepr {
    Bare(f64),
    Fields {
        value: Option<f64>,
        #[serde(default)]
        autosize_allowed: bool,
        min_value: Option<f64>,
        max_value: Option<f64>,
        min_value_allowed: Option<f64>,
        max_value_allowed: Option<f64>,
    },
}

impl From<OverrideRepr> for ParameterOverride {
    fn from(repr: OverrideRepr) -> Self {
        match repr {
            OverrideRepr::Bare(v) => Self {
                value: Some(v),
                ..Self::default()
            },
            OverrideRepr::Fields {
                value,
                autosize_allowed,
                min_value,
                max_value,
                min_value_allowed,
                max_value_allowed,
            } => Self {
                value,
                autosize_allowed,
                min_value,
                max_value,
                min_value_allowed,
                max_value_allowed,
            },
        }
    }
}

impl ParameterOverride {
    /// Value that replaces the catalog entry: the autosize sentinel when
    /// flagged, else the concrete value, else the override's own range.
    pub fn to_param_value(&self) -> ParamValue {
        if self.autosize_allowed {
            ParamValue::Autosize
        } else if let Some(v) = self.value {
            ParamValue::Number(v)
        } else {
            ParamValue::Range(ParameterSpec {
                min_value: self.min_value,
                max_value: self.max_value,
                autosize_allowed: false,
                min_value_allowed: self.min_value_allowed,
                max_value_allowed: self.max_value_allowed,
            })
        }
    }
}

/// `user_modifications`: one JSON object whose keys are partitioned into
/// `future_increase`, month names, and object names.
///
/// Entries are parsed one by one. A malformed entry is left out and recorded
/// in `rejected`, so the rest of the document still applies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct UserModifications {
    pub ground: GroundOverrides,
    pub objects: BTreeMap<String, BTreeMap<String, ParameterOverride>>,
    pub rejected: Vec<ConfigError>,
}

impl UserModifications {
    fn reject(&mut self, field: String, message: impl ToString) {
        log::debug!("dropping override {field}");
        self.rejected.push(ConfigError {
            field,
            message: message.to_string(),
        });
    }
}

impl From<BTreeMap<String, Value>> for UserModifications {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut out = Self::default();
        for (key, value) in raw {
            let field = format!("user_modifications.{key}");
            if key == "future_increase" {
                match serde_json::from_value(value) {
                    Ok(v) => out.ground.future_increase = Some(v),
                    Err(e) => out.reject(field, e),
                }
            } else if let Ok(month) = key.parse::<Month>() {
                match serde_json::from_value::<MonthOverride>(value) {
                    Ok(ovr) => {
                        out.ground.months.insert(month, ovr);
                    }
                    Err(e) => out.reject(field, e),
                }
            } else {
                let Value::Object(entries) = value else {
                    out.reject(field, "expected an object of parameter overrides");
                    continue;
                };
                let mut params = BTreeMap::new();
                for (param, raw) in entries {
                    match serde_json::from_value::<ParameterOverride>(raw) {
                        Ok(ovr) => {
                            params.insert(param, ovr);
                        }
                        Err(_) => out.reject(
                            format!("{field}.{param}"),
                            "expected a number or an override object",
                        ),
                    }
                }
                out.objects.insert(key, params);
            }
        }
        out
    }
}

/// Store query filter. Both criteria present means both must match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterCriteria {
    pub postcode6: Option<String>,
    pub ids: Option<Vec<String>>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.postcode6.is_none() && self.ids.is_none()
    }

    pub fn matches(&self, building: &BuildingRecord) -> bool {
        let postcode_ok = self.postcode6.as_deref().is_none_or(|pc| {
            building
                .postcode
                .as_deref()
                .is_some_and(|b| b.eq_ignore_ascii_case(pc))
        });
        let id_ok = self
            .ids
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| *id == building.id));
        postcode_ok && id_ok
    }
}
