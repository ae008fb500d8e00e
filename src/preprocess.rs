//! Flattens each building row with its resolved envelope parameters.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::building::BuildingRecord;
use crate::catalog::{EnvelopeObject, ParameterSet, Tier};
use crate::resolver::ConfigurationResolver;

/// A building row plus one merged parameter set per envelope object the
/// catalog defines for it.
///
/// Objects the catalog lacks for this classification are absent from
/// `envelope`, never zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    #[serde(flatten)]
    pub building: BuildingRecord,
    /// `None` when the classification labels did not parse.
    pub tier: Option<Tier>,
    #[serde(flatten)]
    pub envelope: BTreeMap<EnvelopeObject, ParameterSet>,
}

impl ResolvedRecord {
    /// A record with no resolved objects.
    pub fn unresolved(building: BuildingRecord) -> Self {
        Self {
            building,
            tier: None,
            envelope: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.building.id
    }

    pub fn has_full_envelope(&self) -> bool {
        self.envelope.len() == EnvelopeObject::ALL.len()
    }
}

/// Resolves the tier and probes all six envelope objects for every row.
///
/// Never fails: unparseable classifications and catalog misses leave the
/// affected objects out of the record and are logged at debug level.
pub fn preprocess(
    rows: impl IntoIterator<Item = BuildingRecord>,
    resolver: &ConfigurationResolver<'_>,
) -> Vec<ResolvedRecord> {
    rows.into_iter()
        .map(|building| preprocess_one(building, resolver))
        .collect()
}

fn preprocess_one(building: BuildingRecord, resolver: &ConfigurationResolver<'_>) -> ResolvedRecord {
    let classification = match building.classification() {
        Ok(c) => c,
        Err(e) => {
            log::debug!("building {}: not resolved: {e}", building.id);
            return ResolvedRecord::unresolved(building);
        }
    };

    let tier = resolver.resolve_tier(&classification);
    let mut envelope = BTreeMap::new();
    for object in EnvelopeObject::ALL {
        match resolver.probe_envelope(&classification, Some(tier), *object) {
            Some(set) => {
                envelope.insert(*object, set);
            }
            None => log::debug!(
                "building {}: no catalog entry for {object} at {tier}",
                building.id
            ),
        }
    }

    ResolvedRecord {
        building,
        tier: Some(tier),
        envelope,
    }
}
