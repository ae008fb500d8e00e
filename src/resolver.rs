//! Resolves a building's tier and its effective parameters from the catalog
//! and the user override document.
//!
//! Two lookup flavours exist on purpose:
//! - `probe_*` returns `None` for a missing catalog entry. Preprocessing uses
//!   it so an absent envelope object simply stays absent from the record.
//! - `resolve_parameters` / `fetch_envelope` fail with
//!   [`ConfigurationNotFound`](crate::error::Error::ConfigurationNotFound).
//!   Model building and every other caller use these.

use crate::catalog::{
    Catalog, CatalogPath, Classification, EnvelopeObject, ObjectGroup, ObjectType, ParameterSet,
    Tier,
};
use crate::error::Result;
use crate::ground::{GroundTemperatureProfile, adjust_ground_temperatures};
use crate::user_config::UserConfig;

/// Tier used when the override document selects none for a classification.
pub const DEFAULT_TIER: Tier = Tier::Tier1;

/// Read-only view over the catalog and one override document.
///
/// Cheap to copy; every worker task can hold its own.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationResolver<'a> {
    catalog: &'a Catalog,
    user: &'a UserConfig,
    default_tier: Tier,
}

impl<'a> ConfigurationResolver<'a> {
    pub fn new(catalog: &'a Catalog, user: &'a UserConfig) -> Self {
        Self {
            catalog,
            user,
            default_tier: DEFAULT_TIER,
        }
    }

    pub fn with_default_tier(mut self, tier: Tier) -> Self {
        self.default_tier = tier;
        self
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn user(&self) -> &'a UserConfig {
        self.user
    }

    /// The user's tier selection, or the default tier when any level of the
    /// selection is absent. Never fails.
    pub fn resolve_tier(&self, classification: &Classification) -> Tier {
        self.user
            .selected_tier(classification)
            .unwrap_or(self.default_tier)
    }

    fn path<'n>(
        &self,
        classification: &Classification,
        tier: Option<Tier>,
        group: ObjectGroup,
        object_type: ObjectType,
        name: &'n str,
    ) -> CatalogPath<'n> {
        CatalogPath {
            classification: *classification,
            tier: tier.unwrap_or_else(|| self.resolve_tier(classification)),
            group,
            object_type,
            object_name: name,
        }
    }

    /// Strict lookup plus override merge. `tier` defaults to
    /// [`resolve_tier`](Self::resolve_tier).
    ///
    /// # Errors
    ///
    /// [`Error::ConfigurationNotFound`](crate::error::Error::ConfigurationNotFound)
    /// naming the missing level.
    pub fn resolve_parameters(
        &self,
        classification: &Classification,
        tier: Option<Tier>,
        group: ObjectGroup,
        object_type: ObjectType,
        name: &str,
    ) -> Result<ParameterSet> {
        let path = self.path(classification, tier, group, object_type, name);
        let entry = self.catalog.lookup(&path)?;
        Ok(self.apply_overrides(name, entry.parameters()))
    }

    /// Like [`resolve_parameters`](Self::resolve_parameters) but `None` on a
    /// catalog miss.
    pub fn probe_parameters(
        &self,
        classification: &Classification,
        tier: Option<Tier>,
        group: ObjectGroup,
        object_type: ObjectType,
        name: &str,
    ) -> Option<ParameterSet> {
        let path = self.path(classification, tier, group, object_type, name);
        let entry = self.catalog.get(&path)?;
        Some(self.apply_overrides(name, entry.parameters()))
    }

    /// Strict fetch of one envelope object.
    pub fn fetch_envelope(
        &self,
        classification: &Classification,
        tier: Option<Tier>,
        object: EnvelopeObject,
    ) -> Result<ParameterSet> {
        self.resolve_parameters(
            classification,
            tier,
            object.object_group(),
            object.object_type(),
            object.as_str(),
        )
    }

    pub fn probe_envelope(
        &self,
        classification: &Classification,
        tier: Option<Tier>,
        object: EnvelopeObject,
    ) -> Option<ParameterSet> {
        self.probe_parameters(
            classification,
            tier,
            object.object_group(),
            object.object_type(),
            object.as_str(),
        )
    }

    /// Replaces individual parameters of `set` with the user's overrides for
    /// object `name`. Parameters without an override keep their catalog value.
    pub fn apply_overrides(&self, name: &str, mut set: ParameterSet) -> ParameterSet {
        if let Some(overrides) = self.user.user_modifications.objects.get(name) {
            for (param, ovr) in overrides {
                set.insert(param.clone(), ovr.to_param_value());
            }
        }
        set
    }

    /// Monthly ground temperatures after the user's increase and bounds.
    pub fn ground_temperatures(&self) -> GroundTemperatureProfile {
        adjust_ground_temperatures(
            self.catalog.ground_temperatures(),
            &self.user.user_modifications.ground,
        )
    }
}
