//! Resource write and lookup actions
//!
//! Validation runs before the store is touched, so an invalid payload never
//! leaves a partial resource or tag rows behind.

use tracing::info;

use super::models::{CreateResource, Resource, ResourceTag, TagCategory, UpdateResource};
use crate::common::{DirectoryError, DirectoryResult, ResourceId};
use crate::kernel::DirectoryDeps;

pub async fn create_resource(
    mut input: CreateResource,
    deps: &DirectoryDeps,
) -> DirectoryResult<Resource> {
    input.normalize_tags();
    input.validate()?;

    let resource = deps.resource_store.create_with_categories(input).await?;
    info!(resource_id = %resource.id, title = %resource.title, "Created resource");
    Ok(resource)
}

pub async fn update_resource(
    id: ResourceId,
    mut input: UpdateResource,
    deps: &DirectoryDeps,
) -> DirectoryResult<Resource> {
    input.normalize_tags();
    input.validate()?;

    let resource = deps
        .resource_store
        .update_with_categories(id, input)
        .await?
        .ok_or_else(|| DirectoryError::NotFound {
            entity: "Resource",
            id: id.to_string(),
        })?;
    info!(resource_id = %id, "Updated resource");
    Ok(resource)
}

pub async fn find_resource(
    id: ResourceId,
    deps: &DirectoryDeps,
) -> DirectoryResult<Option<Resource>> {
    deps.resource_store.find_by_id(id).await
}

/// Tag values of one category, in insertion order
pub async fn resource_tags(
    id: ResourceId,
    category: TagCategory,
    deps: &DirectoryDeps,
) -> DirectoryResult<Vec<String>> {
    let tags: Vec<ResourceTag> = deps.resource_store.find_tags(id, category).await?;
    Ok(tags.into_iter().map(|tag| tag.value).collect())
}
