//! Tag rows for resources.
//!
//! Each category lives in its own table (`resource_types`,
//! `resource_audiences`, `resource_client_tags`) so a resource's types and
//! audiences are independent has-many associations. Rows are ordered by
//! insertion and are only ever replaced as a whole set per category.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::HashSet;

use crate::common::{ResourceId, ResourceTagId};

/// Canonical audience labels offered to submitters
pub const AUDIENCE_VALUES: &[&str] = &[
    "Undergraduate Student",
    "Graduate Student",
    "Faculty",
    "Staff",
    "Alumni",
    "Recent Alumni",
    "Everyone",
    "Women",
    "Investors",
    "Non-profit",
    "For-profit",
];

/// An independent many-valued classification dimension on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    Types,
    Audiences,
    ClientTags,
}

impl TagCategory {
    pub const ALL: [TagCategory; 3] = [
        TagCategory::Types,
        TagCategory::Audiences,
        TagCategory::ClientTags,
    ];

    /// Backing table; only ever interpolated from this fixed set
    pub fn table(self) -> &'static str {
        match self {
            TagCategory::Types => "resource_types",
            TagCategory::Audiences => "resource_audiences",
            TagCategory::ClientTags => "resource_client_tags",
        }
    }

    /// Key used in filter criteria and create payloads
    pub fn key(self) -> &'static str {
        match self {
            TagCategory::Types => "types",
            TagCategory::Audiences => "audiences",
            TagCategory::ClientTags => "client_tags",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }
}

impl std::fmt::Display for TagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Split a comma-delimited tag list, trimming blanks away.
///
/// `"BrokenURL, Scholarship,,Funding"` → `["BrokenURL", "Scholarship", "Funding"]`
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceTag {
    pub id: ResourceTagId,
    pub resource_id: ResourceId,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl ResourceTag {
    /// Tag rows of one category for a resource, in insertion order
    pub async fn find_for_resource(
        category: TagCategory,
        resource_id: ResourceId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT * FROM {} WHERE resource_id = $1 ORDER BY created_at ASC, id ASC",
            category.table()
        );
        let tags = sqlx::query_as::<_, Self>(&sql)
            .bind(resource_id)
            .fetch_all(pool)
            .await?;
        Ok(tags)
    }

    /// Resources carrying at least one of `values` in this category
    pub async fn find_resource_ids_with_any(
        category: TagCategory,
        values: &[String],
        pool: &PgPool,
    ) -> Result<HashSet<ResourceId>> {
        let sql = format!(
            "SELECT DISTINCT resource_id FROM {} WHERE value = ANY($1)",
            category.table()
        );
        let ids = sqlx::query_scalar::<_, ResourceId>(&sql)
            .bind(values)
            .fetch_all(pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    pub async fn count_with_value(category: TagCategory, value: &str, pool: &PgPool) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE value = $1", category.table());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(value)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Replace the whole category for a resource. Runs on the caller's
    /// transaction so the swap is never half-visible.
    pub async fn replace_all(
        category: TagCategory,
        resource_id: ResourceId,
        values: &[String],
        conn: &mut PgConnection,
    ) -> Result<()> {
        let delete = format!("DELETE FROM {} WHERE resource_id = $1", category.table());
        sqlx::query(&delete)
            .bind(resource_id)
            .execute(&mut *conn)
            .await?;

        let insert = format!(
            "INSERT INTO {} (id, resource_id, value) VALUES ($1, $2, $3)",
            category.table()
        );
        for value in values {
            sqlx::query(&insert)
                .bind(ResourceTagId::new())
                .bind(resource_id)
                .bind(value)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_comma_lists() {
        assert_eq!(
            parse_tag_list("BrokenURL, Scholarship,,Funding "),
            vec!["BrokenURL", "Scholarship", "Funding"]
        );
        assert!(parse_tag_list(" , ").is_empty());
    }

    #[test]
    fn category_keys_round_trip() {
        for category in TagCategory::ALL {
            assert_eq!(TagCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(TagCategory::from_key("colors"), None);
    }
}
