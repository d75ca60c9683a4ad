//! Postgres-backed stores (implement the store traits over `PgPool`)
//!
//! The SQL lives on the models; these adapters only forward and convert
//! errors into `DirectoryError`.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;

use super::{BaseLocationStore, BaseResourceStore};
use crate::common::{DirectoryResult, ResourceId};
use crate::domains::locations::models::{Location, NewLocation};
use crate::domains::resources::criteria::ScalarFilter;
use crate::domains::resources::models::{
    CreateResource, Resource, ResourceTag, TagCategory, UpdateResource,
};

#[derive(Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseLocationStore for PgLocationStore {
    async fn find_by_name(&self, name: &str) -> DirectoryResult<Option<Location>> {
        Ok(Location::find_by_name(name, &self.pool).await?)
    }

    async fn find_all(&self) -> DirectoryResult<Vec<Location>> {
        Ok(Location::find_all(&self.pool).await?)
    }

    async fn is_empty(&self) -> DirectoryResult<bool> {
        Ok(Location::count(&self.pool).await? == 0)
    }

    async fn insert(&self, location: NewLocation) -> DirectoryResult<Location> {
        Location::create(&location, &self.pool).await
    }
}

#[derive(Clone)]
pub struct PgResourceStore {
    pool: PgPool,
}

impl PgResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseResourceStore for PgResourceStore {
    async fn create_with_categories(&self, input: CreateResource) -> DirectoryResult<Resource> {
        Ok(Resource::create_with_categories(&input, &self.pool).await?)
    }

    async fn update_with_categories(
        &self,
        id: ResourceId,
        input: UpdateResource,
    ) -> DirectoryResult<Option<Resource>> {
        Ok(Resource::update_with_categories(id, &input, &self.pool).await?)
    }

    async fn find_by_id(&self, id: ResourceId) -> DirectoryResult<Option<Resource>> {
        Ok(Resource::find_by_id_optional(id, &self.pool).await?)
    }

    async fn find_all(&self) -> DirectoryResult<Vec<Resource>> {
        Ok(Resource::find_all(&self.pool).await?)
    }

    async fn find_by_ids(&self, ids: &[ResourceId]) -> DirectoryResult<Vec<Resource>> {
        Ok(Resource::find_by_ids(ids, &self.pool).await?)
    }

    async fn find_ids_matching(
        &self,
        filters: &[ScalarFilter],
    ) -> DirectoryResult<HashSet<ResourceId>> {
        Ok(Resource::find_ids_matching(filters, &self.pool).await?)
    }

    async fn find_ids_with_any_tag(
        &self,
        category: TagCategory,
        values: &[String],
    ) -> DirectoryResult<HashSet<ResourceId>> {
        Ok(ResourceTag::find_resource_ids_with_any(category, values, &self.pool).await?)
    }

    async fn find_ids_at_locations(
        &self,
        names: &[String],
    ) -> DirectoryResult<HashSet<ResourceId>> {
        Ok(Resource::find_ids_at_locations(names, &self.pool).await?)
    }

    async fn find_tags(
        &self,
        id: ResourceId,
        category: TagCategory,
    ) -> DirectoryResult<Vec<ResourceTag>> {
        Ok(ResourceTag::find_for_resource(category, id, &self.pool).await?)
    }

    async fn count_with_tag(&self, category: TagCategory, value: &str) -> DirectoryResult<i64> {
        Ok(ResourceTag::count_with_value(category, value, &self.pool).await?)
    }
}
