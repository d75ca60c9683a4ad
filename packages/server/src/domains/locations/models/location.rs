use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{DirectoryError, DirectoryResult, LocationId};

/// Name of the single parentless location every chain ends at
pub const ROOT_LOCATION: &str = "Global";

/// A named place in the location tree
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub parent_id: Option<LocationId>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the id is minted by the caller so both stores agree on ordering
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub id: LocationId,
    pub name: String,
    pub parent_id: Option<LocationId>,
}

impl NewLocation {
    pub fn root() -> Self {
        Self {
            id: LocationId::new(),
            name: ROOT_LOCATION.to_string(),
            parent_id: None,
        }
    }

    pub fn child_of(name: &str, parent: &Location) -> Self {
        Self {
            id: LocationId::new(),
            name: name.to_string(),
            parent_id: Some(parent.id),
        }
    }

    /// Only "Global" may be parentless. Whether a root already exists is
    /// checked by the store against its own rows.
    pub fn check_parent_presence(&self) -> DirectoryResult<()> {
        if self.parent_id.is_none() && self.name != ROOT_LOCATION {
            return Err(DirectoryError::MissingParent(self.name.clone()));
        }
        Ok(())
    }
}

impl Location {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub async fn find_by_name(name: &str, pool: &PgPool) -> Result<Option<Self>> {
        let location = sqlx::query_as::<_, Self>("SELECT * FROM locations WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(location)
    }

    pub async fn find_root(pool: &PgPool) -> Result<Option<Self>> {
        let location =
            sqlx::query_as::<_, Self>("SELECT * FROM locations WHERE parent_id IS NULL LIMIT 1")
                .fetch_optional(pool)
                .await?;
        Ok(location)
    }

    /// Every location in creation order; the tree builds its index from this
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let locations =
            sqlx::query_as::<_, Self>("SELECT * FROM locations ORDER BY created_at ASC, id ASC")
                .fetch_all(pool)
                .await?;
        Ok(locations)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM locations")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Insert a location. A lost race on the unique name comes back as
    /// `DuplicateLocation`; a second root trips the single-root index.
    pub async fn create(input: &NewLocation, pool: &PgPool) -> DirectoryResult<Self> {
        input.check_parent_presence()?;

        if input.parent_id.is_none() && Self::find_root(pool).await?.is_some() {
            return Err(DirectoryError::RootAlreadyExists);
        }

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO locations (id, name, parent_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(input.id)
        .bind(&input.name)
        .bind(input.parent_id)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::from_location_insert(e, &input.name, input.parent_id.is_none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_global_may_be_parentless() {
        assert!(NewLocation::root().check_parent_presence().is_ok());

        let orphan = NewLocation {
            id: LocationId::new(),
            name: "USA".to_string(),
            parent_id: None,
        };
        assert!(matches!(
            orphan.check_parent_presence(),
            Err(DirectoryError::MissingParent(name)) if name == "USA"
        ));
    }
}
