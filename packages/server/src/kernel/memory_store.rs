//! In-process stores with the same contract as the Postgres ones.
//!
//! Used by the test harness and for embedding the directory without a
//! database. Each store keeps its rows behind one `RwLock`, so a write
//! (including a resource plus all of its tag rows) is observed all at once.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::{BaseLocationStore, BaseResourceStore};
use crate::common::{DirectoryError, DirectoryResult, ResourceId, ResourceTagId};
use crate::domains::locations::models::{Location, NewLocation};
use crate::domains::resources::criteria::ScalarFilter;
use crate::domains::resources::models::{
    CreateResource, Resource, ResourceTag, TagCategory, UpdateResource,
};

#[derive(Default)]
pub struct MemoryLocationStore {
    rows: RwLock<Vec<Location>>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseLocationStore for MemoryLocationStore {
    async fn find_by_name(&self, name: &str) -> DirectoryResult<Option<Location>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|l| l.name == name).cloned())
    }

    async fn find_all(&self) -> DirectoryResult<Vec<Location>> {
        Ok(self.rows.read().await.clone())
    }

    async fn is_empty(&self) -> DirectoryResult<bool> {
        Ok(self.rows.read().await.is_empty())
    }

    async fn insert(&self, location: NewLocation) -> DirectoryResult<Location> {
        location.check_parent_presence()?;

        let mut rows = self.rows.write().await;
        // A second root is never reported as a duplicate name
        if location.parent_id.is_none() && rows.iter().any(Location::is_root) {
            return Err(DirectoryError::RootAlreadyExists);
        }
        if rows.iter().any(|l| l.name == location.name) {
            return Err(DirectoryError::DuplicateLocation(location.name));
        }
        if let Some(parent_id) = location.parent_id {
            if !rows.iter().any(|l| l.id == parent_id) {
                return Err(DirectoryError::NotFound {
                    entity: "Location",
                    id: parent_id.to_string(),
                });
            }
        }

        let row = Location {
            id: location.id,
            name: location.name,
            parent_id: location.parent_id,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }
}

#[derive(Default)]
struct ResourceTables {
    resources: Vec<Resource>,
    types: Vec<ResourceTag>,
    audiences: Vec<ResourceTag>,
    client_tags: Vec<ResourceTag>,
}

impl ResourceTables {
    fn tags(&self, category: TagCategory) -> &Vec<ResourceTag> {
        match category {
            TagCategory::Types => &self.types,
            TagCategory::Audiences => &self.audiences,
            TagCategory::ClientTags => &self.client_tags,
        }
    }

    fn tags_mut(&mut self, category: TagCategory) -> &mut Vec<ResourceTag> {
        match category {
            TagCategory::Types => &mut self.types,
            TagCategory::Audiences => &mut self.audiences,
            TagCategory::ClientTags => &mut self.client_tags,
        }
    }

    fn replace_tags(&mut self, category: TagCategory, resource_id: ResourceId, values: &[String]) {
        let now = Utc::now();
        let rows = self.tags_mut(category);
        rows.retain(|tag| tag.resource_id != resource_id);
        rows.extend(values.iter().map(|value| ResourceTag {
            id: ResourceTagId::new(),
            resource_id,
            value: value.clone(),
            created_at: now,
        }));
    }
}

#[derive(Default)]
pub struct MemoryResourceStore {
    tables: RwLock<ResourceTables>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseResourceStore for MemoryResourceStore {
    async fn create_with_categories(&self, input: CreateResource) -> DirectoryResult<Resource> {
        let now = Utc::now();
        let resource = Resource {
            id: ResourceId::new(),
            title: input.title.clone(),
            url: input.url.clone(),
            contact_email: input.contact_email.clone(),
            location: input.location.clone(),
            description: input.description.clone(),
            approval_status: input.approval_status,
            flagged: input.flagged,
            approval_num: 0,
            approval_last: None,
            broken_num: 0,
            broken_last: None,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        tables.resources.push(resource.clone());
        for category in TagCategory::ALL {
            tables.replace_tags(category, resource.id, input.tags(category));
        }
        Ok(resource)
    }

    async fn update_with_categories(
        &self,
        id: ResourceId,
        input: UpdateResource,
    ) -> DirectoryResult<Option<Resource>> {
        let mut tables = self.tables.write().await;
        let Some(resource) = tables.resources.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        input.apply_to(resource);
        resource.updated_at = Utc::now();
        let updated = resource.clone();

        for category in TagCategory::ALL {
            if let Some(values) = input.tags(category) {
                tables.replace_tags(category, id, values);
            }
        }
        Ok(Some(updated))
    }

    async fn find_by_id(&self, id: ResourceId) -> DirectoryResult<Option<Resource>> {
        let tables = self.tables.read().await;
        Ok(tables.resources.iter().find(|r| r.id == id).cloned())
    }

    async fn find_all(&self) -> DirectoryResult<Vec<Resource>> {
        Ok(self.tables.read().await.resources.clone())
    }

    async fn find_by_ids(&self, ids: &[ResourceId]) -> DirectoryResult<Vec<Resource>> {
        let wanted: HashSet<&ResourceId> = ids.iter().collect();
        let tables = self.tables.read().await;
        Ok(tables
            .resources
            .iter()
            .filter(|r| wanted.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn find_ids_matching(
        &self,
        filters: &[ScalarFilter],
    ) -> DirectoryResult<HashSet<ResourceId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .resources
            .iter()
            .filter(|r| filters.iter().all(|f| f.matches(r)))
            .map(|r| r.id)
            .collect())
    }

    async fn find_ids_with_any_tag(
        &self,
        category: TagCategory,
        values: &[String],
    ) -> DirectoryResult<HashSet<ResourceId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags(category)
            .iter()
            .filter(|tag| values.contains(&tag.value))
            .map(|tag| tag.resource_id)
            .collect())
    }

    async fn find_ids_at_locations(
        &self,
        names: &[String],
    ) -> DirectoryResult<HashSet<ResourceId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .resources
            .iter()
            .filter(|r| names.contains(&r.location))
            .map(|r| r.id)
            .collect())
    }

    async fn find_tags(
        &self,
        id: ResourceId,
        category: TagCategory,
    ) -> DirectoryResult<Vec<ResourceTag>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags(category)
            .iter()
            .filter(|tag| tag.resource_id == id)
            .cloned()
            .collect())
    }

    async fn count_with_tag(&self, category: TagCategory, value: &str) -> DirectoryResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .tags(category)
            .iter()
            .filter(|tag| tag.value == value)
            .count();
        Ok(count as i64)
    }
}
