//! Resource filter - multi-attribute search over the directory.
//!
//! Semantics:
//! - scalar criteria match their column exactly;
//! - a tag criterion matches resources with *any* of the listed values in
//!   that category, and every tag criterion must match;
//! - `location` matches resources placed at the location or anywhere below it.
//!
//! Each criterion produces its own candidate id set and the sets are
//! intersected. A single join across the tag tables would demand that one
//! tag row satisfy several categories at once, so it is never used.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::criteria::{FilterCriteria, ResourceQuery};
use super::models::{Resource, TagCategory};
use crate::common::{DirectoryResult, ResourceId};
use crate::domains::locations::LocationTree;
use crate::kernel::BaseResourceStore;

#[derive(Clone)]
pub struct ResourceFilter {
    store: Arc<dyn BaseResourceStore>,
    tree: LocationTree,
}

impl ResourceFilter {
    pub fn new(store: Arc<dyn BaseResourceStore>, tree: LocationTree) -> Self {
        Self { store, tree }
    }

    /// Resources matching every recognised criterion. Empty criteria match all.
    #[instrument(skip(self))]
    pub async fn filter(&self, criteria: &FilterCriteria) -> DirectoryResult<Vec<Resource>> {
        let query = ResourceQuery::parse(criteria);

        let mut resources = if query.unsatisfiable {
            Vec::new()
        } else if query.is_unconstrained() {
            self.store.find_all().await?
        } else {
            let ids = self.matching_ids(&query).await?;
            debug!(matches = ids.len(), "Filter matched resources");
            self.fetch(ids).await?
        };

        if let Some(sort) = query.sort {
            sort.apply(&mut resources);
        }

        Ok(resources)
    }

    /// Resources placed at `criteria["location"]` or anywhere beneath it.
    ///
    /// A location unknown to the tree matches nothing, and so does a
    /// criteria map without a `location` key.
    #[instrument(skip(self))]
    pub async fn location_helper(&self, criteria: &FilterCriteria) -> DirectoryResult<Vec<Resource>> {
        let Some(location) = criteria.location() else {
            return Ok(Vec::new());
        };
        let ids = self.ids_within(&location).await?;
        self.fetch(ids).await
    }

    /// Number of tag rows in `category` carrying `value`
    pub async fn tag_count(&self, category: TagCategory, value: &str) -> DirectoryResult<i64> {
        self.store.count_with_tag(category, value).await
    }

    async fn matching_ids(&self, query: &ResourceQuery) -> DirectoryResult<HashSet<ResourceId>> {
        let mut candidates: Option<HashSet<ResourceId>> = None;

        for (category, values) in &query.tags {
            let ids = self.store.find_ids_with_any_tag(*category, values).await?;
            candidates = Some(intersect(candidates, ids));
            if is_exhausted(&candidates) {
                return Ok(HashSet::new());
            }
        }

        if !query.scalars.is_empty() {
            let ids = self.store.find_ids_matching(&query.scalars).await?;
            candidates = Some(intersect(candidates, ids));
            if is_exhausted(&candidates) {
                return Ok(HashSet::new());
            }
        }

        if let Some(location) = &query.location {
            let ids = self.ids_within(location).await?;
            candidates = Some(intersect(candidates, ids));
        }

        Ok(candidates.unwrap_or_default())
    }

    async fn ids_within(&self, location: &str) -> DirectoryResult<HashSet<ResourceId>> {
        let names: Vec<String> = self.tree.descendants(location).await?.into_iter().collect();
        if names.is_empty() {
            debug!(location = %location, "Location is not in the tree");
            return Ok(HashSet::new());
        }
        self.store.find_ids_at_locations(&names).await
    }

    async fn fetch(&self, ids: HashSet<ResourceId>) -> DirectoryResult<Vec<Resource>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ResourceId> = ids.into_iter().collect();
        self.store.find_by_ids(&ids).await
    }
}

fn intersect(
    current: Option<HashSet<ResourceId>>,
    next: HashSet<ResourceId>,
) -> HashSet<ResourceId> {
    match current {
        None => next,
        Some(current) => current.intersection(&next).copied().collect(),
    }
}

fn is_exhausted(candidates: &Option<HashSet<ResourceId>>) -> bool {
    matches!(candidates, Some(ids) if ids.is_empty())
}
