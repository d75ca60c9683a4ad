// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The location tree and the resource filter are domain code written
// against these seams.
//
// Naming convention: Base* for trait names (e.g., BaseGeocoder, BaseLocationStore)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::common::{DirectoryResult, ResourceId};
use crate::domains::locations::models::{Location, NewLocation};
use crate::domains::resources::criteria::ScalarFilter;
use crate::domains::resources::models::{
    CreateResource, Resource, ResourceTag, TagCategory, UpdateResource,
};

// =============================================================================
// Geocoder Trait (Infrastructure)
// =============================================================================

/// Kind of place a geocoder matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Administrative,
    City,
    Village,
    Town,
    University,
    Other(String),
}

impl From<&str> for PlaceKind {
    fn from(raw: &str) -> Self {
        match raw {
            "administrative" => PlaceKind::Administrative,
            "city" => PlaceKind::City,
            "village" => PlaceKind::Village,
            "town" => PlaceKind::Town,
            "university" => PlaceKind::University,
            other => PlaceKind::Other(other.to_string()),
        }
    }
}

/// Structured place record returned by a geocoder lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub kind: PlaceKind,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

#[async_trait]
pub trait BaseGeocoder: Send + Sync {
    /// Best match for a free-text place name, if any
    async fn search(&self, name: &str) -> Result<Option<Place>>;
}

// =============================================================================
// Store Traits (Infrastructure - relational CRUD)
// =============================================================================

#[async_trait]
pub trait BaseLocationStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> DirectoryResult<Option<Location>>;

    /// All rows in creation order
    async fn find_all(&self) -> DirectoryResult<Vec<Location>>;

    async fn is_empty(&self) -> DirectoryResult<bool>;

    /// Fails with `DuplicateLocation` when the name is taken and
    /// `RootAlreadyExists` for a second parentless row.
    async fn insert(&self, location: NewLocation) -> DirectoryResult<Location>;
}

#[async_trait]
pub trait BaseResourceStore: Send + Sync {
    /// Resource plus all its tag rows, atomically
    async fn create_with_categories(&self, input: CreateResource) -> DirectoryResult<Resource>;

    /// Scalar update plus wholesale replacement of each provided category, atomically
    async fn update_with_categories(
        &self,
        id: ResourceId,
        input: UpdateResource,
    ) -> DirectoryResult<Option<Resource>>;

    async fn find_by_id(&self, id: ResourceId) -> DirectoryResult<Option<Resource>>;

    /// All resources in the store's natural (creation) order
    async fn find_all(&self) -> DirectoryResult<Vec<Resource>>;

    /// The given resources in natural order; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[ResourceId]) -> DirectoryResult<Vec<Resource>>;

    async fn find_ids_matching(&self, filters: &[ScalarFilter])
        -> DirectoryResult<HashSet<ResourceId>>;

    /// Resources with at least one tag in `category` whose value is in `values`
    async fn find_ids_with_any_tag(
        &self,
        category: TagCategory,
        values: &[String],
    ) -> DirectoryResult<HashSet<ResourceId>>;

    async fn find_ids_at_locations(&self, names: &[String])
        -> DirectoryResult<HashSet<ResourceId>>;

    async fn find_tags(
        &self,
        id: ResourceId,
        category: TagCategory,
    ) -> DirectoryResult<Vec<ResourceTag>>;

    async fn count_with_tag(&self, category: TagCategory, value: &str) -> DirectoryResult<i64>;
}
