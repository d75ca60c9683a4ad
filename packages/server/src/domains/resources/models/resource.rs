//! Resource model - a directory entry (opportunity, program or service)
//!
//! A resource names its place with a free-text `location` that is matched by
//! value against the location tree, never through a foreign key. Its tags
//! live in one table per category (see `resource_tag`).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashSet;

use super::resource_tag::{ResourceTag, TagCategory};
use crate::common::{DirectoryError, DirectoryResult, ResourceId};
use crate::domains::resources::criteria::{ScalarFilter, ScalarValue};

/// Upper bound for every short text column and for tag values
pub const MAX_FIELD_LENGTH: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: ResourceId,

    // Core content
    pub title: String,
    pub url: String,
    pub contact_email: String,
    pub location: String,
    pub description: Option<String>,

    // Review bookkeeping
    pub approval_status: i32,
    pub flagged: i32,
    pub approval_num: i32,
    pub approval_last: Option<DateTime<Utc>>,
    pub broken_num: i32,
    pub broken_last: Option<DateTime<Utc>>,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for the single create-with-categories operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateResource {
    pub title: String,
    pub url: String,
    pub contact_email: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub approval_status: i32,
    #[serde(default)]
    pub flagged: i32,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub audiences: Vec<String>,
    #[serde(default)]
    pub client_tags: Vec<String>,
}

impl CreateResource {
    pub fn tags(&self, category: TagCategory) -> &[String] {
        match category {
            TagCategory::Types => &self.types,
            TagCategory::Audiences => &self.audiences,
            TagCategory::ClientTags => &self.client_tags,
        }
    }

    /// Trim tag values so they compare equal to trimmed filter values
    pub fn normalize_tags(&mut self) {
        trim_all(&mut self.types);
        trim_all(&mut self.audiences);
        trim_all(&mut self.client_tags);
    }

    pub fn validate(&self) -> DirectoryResult<()> {
        check_required("title", &self.title)?;
        check_required("url", &self.url)?;
        check_required("contact_email", &self.contact_email)?;
        check_required("location", &self.location)?;
        check_email(&self.contact_email)?;
        for category in TagCategory::ALL {
            check_tags(category, self.tags(category))?;
        }
        Ok(())
    }
}

/// Partial update. A `Some` category replaces that category's rows entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateResource {
    pub title: Option<String>,
    pub url: Option<String>,
    pub contact_email: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub approval_status: Option<i32>,
    pub flagged: Option<i32>,
    pub types: Option<Vec<String>>,
    pub audiences: Option<Vec<String>>,
    pub client_tags: Option<Vec<String>>,
}

impl UpdateResource {
    pub fn tags(&self, category: TagCategory) -> Option<&[String]> {
        match category {
            TagCategory::Types => self.types.as_deref(),
            TagCategory::Audiences => self.audiences.as_deref(),
            TagCategory::ClientTags => self.client_tags.as_deref(),
        }
    }

    pub fn normalize_tags(&mut self) {
        for values in [&mut self.types, &mut self.audiences, &mut self.client_tags]
            .into_iter()
            .flatten()
        {
            trim_all(values);
        }
    }

    pub fn validate(&self) -> DirectoryResult<()> {
        if let Some(title) = &self.title {
            check_required("title", title)?;
        }
        if let Some(url) = &self.url {
            check_required("url", url)?;
        }
        if let Some(email) = &self.contact_email {
            check_required("contact_email", email)?;
            check_email(email)?;
        }
        if let Some(location) = &self.location {
            check_required("location", location)?;
        }
        for category in TagCategory::ALL {
            if let Some(values) = self.tags(category) {
                check_tags(category, values)?;
            }
        }
        Ok(())
    }

    /// Copy the provided scalar fields onto `resource`
    pub fn apply_to(&self, resource: &mut Resource) {
        if let Some(title) = &self.title {
            resource.title = title.clone();
        }
        if let Some(url) = &self.url {
            resource.url = url.clone();
        }
        if let Some(email) = &self.contact_email {
            resource.contact_email = email.clone();
        }
        if let Some(location) = &self.location {
            resource.location = location.clone();
        }
        if let Some(description) = &self.description {
            resource.description = Some(description.clone());
        }
        if let Some(status) = self.approval_status {
            resource.approval_status = status;
        }
        if let Some(flagged) = self.flagged {
            resource.flagged = flagged;
        }
    }
}

fn check_required(field: &str, value: &str) -> DirectoryResult<()> {
    if value.trim().is_empty() {
        return Err(DirectoryError::Validation(format!("{} can't be blank", field)));
    }
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(DirectoryError::Validation(format!(
            "{} is too long (maximum is {} characters)",
            field, MAX_FIELD_LENGTH
        )));
    }
    Ok(())
}

fn check_email(value: &str) -> DirectoryResult<()> {
    match value.split_once('@') {
        Some((user, host)) if !user.is_empty() && !host.is_empty() => Ok(()),
        _ => Err(DirectoryError::Validation(format!(
            "contact_email '{}' is not an email address",
            value
        ))),
    }
}

fn trim_all(values: &mut [String]) {
    for value in values.iter_mut() {
        let trimmed = value.trim();
        if trimmed.len() != value.len() {
            *value = trimmed.to_string();
        }
    }
}

fn check_tags(category: TagCategory, values: &[String]) -> DirectoryResult<()> {
    for value in values {
        check_required(category.key(), value)?;
    }
    Ok(())
}

impl Resource {
    pub async fn find_by_id_optional(id: ResourceId, pool: &PgPool) -> Result<Option<Self>> {
        let resource = sqlx::query_as::<_, Self>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(resource)
    }

    /// Every resource in creation order
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let resources = sqlx::query_as::<_, Self>(
            "SELECT * FROM resources ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(pool)
        .await?;
        Ok(resources)
    }

    pub async fn find_by_ids(ids: &[ResourceId], pool: &PgPool) -> Result<Vec<Self>> {
        let resources = sqlx::query_as::<_, Self>(
            "SELECT * FROM resources WHERE id = ANY($1) ORDER BY created_at ASC, id ASC",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(resources)
    }

    /// Ids of resources whose columns equal every given value
    pub async fn find_ids_matching(
        filters: &[ScalarFilter],
        pool: &PgPool,
    ) -> Result<HashSet<ResourceId>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM resources WHERE TRUE");
        for filter in filters {
            builder.push(" AND ");
            builder.push(filter.column.column());
            builder.push(" = ");
            match &filter.value {
                ScalarValue::Text(value) => builder.push_bind(value.clone()),
                ScalarValue::Int(value) => builder.push_bind(*value),
            };
        }

        let ids = builder
            .build_query_scalar::<ResourceId>()
            .fetch_all(pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Ids of resources placed at any of `names` (string equality)
    pub async fn find_ids_at_locations(
        names: &[String],
        pool: &PgPool,
    ) -> Result<HashSet<ResourceId>> {
        let ids = sqlx::query_scalar::<_, ResourceId>(
            "SELECT id FROM resources WHERE location = ANY($1)",
        )
        .bind(names)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    /// Insert the resource and all of its tag rows in one transaction
    pub async fn create_with_categories(input: &CreateResource, pool: &PgPool) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let resource = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO resources (id, title, url, contact_email, location, description, approval_status, flagged)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(ResourceId::new())
        .bind(&input.title)
        .bind(&input.url)
        .bind(&input.contact_email)
        .bind(&input.location)
        .bind(&input.description)
        .bind(input.approval_status)
        .bind(input.flagged)
        .fetch_one(&mut *tx)
        .await?;

        for category in TagCategory::ALL {
            ResourceTag::replace_all(category, resource.id, input.tags(category), &mut *tx).await?;
        }

        tx.commit().await?;

        Ok(resource)
    }

    /// Update scalars and replace the provided categories in one transaction
    pub async fn update_with_categories(
        id: ResourceId,
        input: &UpdateResource,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let resource = sqlx::query_as::<_, Self>(
            r#"
            UPDATE resources SET
                title = COALESCE($2, title),
                url = COALESCE($3, url),
                contact_email = COALESCE($4, contact_email),
                location = COALESCE($5, location),
                description = COALESCE($6, description),
                approval_status = COALESCE($7, approval_status),
                flagged = COALESCE($8, flagged),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.url)
        .bind(&input.contact_email)
        .bind(&input.location)
        .bind(&input.description)
        .bind(input.approval_status)
        .bind(input.flagged)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(resource) = resource else {
            return Ok(None);
        };

        for category in TagCategory::ALL {
            if let Some(values) = input.tags(category) {
                ResourceTag::replace_all(category, id, values, &mut *tx).await?;
            }
        }

        tx.commit().await?;

        Ok(Some(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateResource {
        CreateResource {
            title: "thing1".to_string(),
            url: "something.com".to_string(),
            contact_email: "something@gmail.com".to_string(),
            location: "Global".to_string(),
            types: vec!["Scholarship".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_complete_resource() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_oversized_fields() {
        let blank = CreateResource {
            title: "  ".to_string(),
            ..valid()
        };
        assert!(matches!(blank.validate(), Err(DirectoryError::Validation(_))));

        let oversized = CreateResource {
            url: "a".repeat(MAX_FIELD_LENGTH + 1),
            ..valid()
        };
        assert!(matches!(oversized.validate(), Err(DirectoryError::Validation(_))));

        let oversized_tag = CreateResource {
            audiences: vec!["x".repeat(MAX_FIELD_LENGTH + 1)],
            ..valid()
        };
        assert!(oversized_tag.validate().is_err());
    }

    #[test]
    fn rejects_malformed_contact_email() {
        let resource = CreateResource {
            contact_email: "nobody".to_string(),
            ..valid()
        };
        assert!(resource.validate().is_err());
    }

    #[test]
    fn trims_tag_values() {
        let mut create = CreateResource {
            types: vec![" Spaced ".to_string(), "Funding".to_string()],
            ..valid()
        };
        create.normalize_tags();
        assert_eq!(create.types, vec!["Spaced", "Funding"]);

        let mut update = UpdateResource {
            audiences: Some(vec!["Faculty\t".to_string()]),
            ..Default::default()
        };
        update.normalize_tags();
        assert_eq!(update.audiences, Some(vec!["Faculty".to_string()]));
        assert_eq!(update.types, None);
    }

    #[test]
    fn update_only_checks_provided_fields() {
        assert!(UpdateResource::default().validate().is_ok());

        let update = UpdateResource {
            types: Some(vec![String::new()]),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
