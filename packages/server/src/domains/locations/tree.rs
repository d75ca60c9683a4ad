//! Location tree - the hierarchy of named places resources are scoped to.
//!
//! The tree grows lazily: resolving an unknown name asks the geocoder where
//! the place sits (country, state, city) and materializes any missing
//! ancestors along the way. Reads (`descendants`, `ancestor_chain`) never
//! touch the geocoder.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::arena::LocationArena;
use super::classify::parent_for;
use super::models::{Location, NewLocation, ROOT_LOCATION};
use crate::common::{DirectoryError, DirectoryResult};
use crate::kernel::{BaseGeocoder, BaseLocationStore};

/// Bootstrap hierarchy as `(location, parent)`, parents listed first
pub const SEED_LOCATIONS: &[(&str, &str)] = &[
    ("USA", ROOT_LOCATION),
    ("California", "USA"),
    ("Berkeley", "California"),
    ("Davis", "California"),
    ("Stanfurd", "California"),
    ("Siberia", ROOT_LOCATION),
];

#[derive(Clone)]
pub struct LocationTree {
    store: Arc<dyn BaseLocationStore>,
    geocoder: Arc<dyn BaseGeocoder>,
}

impl LocationTree {
    pub fn new(store: Arc<dyn BaseLocationStore>, geocoder: Arc<dyn BaseGeocoder>) -> Self {
        Self { store, geocoder }
    }

    pub async fn is_empty(&self) -> DirectoryResult<bool> {
        self.store.is_empty().await
    }

    pub async fn contains(&self, name: &str) -> DirectoryResult<bool> {
        Ok(self.store.find_by_name(name).await?.is_some())
    }

    /// Create the root and the fixed starter hierarchy.
    ///
    /// Fails with `RootAlreadyExists` on a tree that already has a root.
    #[instrument(skip(self))]
    pub async fn insert_seed(&self) -> DirectoryResult<()> {
        self.store.insert(NewLocation::root()).await?;

        for (name, parent_name) in SEED_LOCATIONS {
            let parent = self
                .store
                .find_by_name(parent_name)
                .await?
                .ok_or_else(|| DirectoryError::NotFound {
                    entity: "Location",
                    id: parent_name.to_string(),
                })?;
            self.insert_child(name, &parent).await?;
        }

        info!(count = SEED_LOCATIONS.len() + 1, "Seeded location tree");
        Ok(())
    }

    /// Make sure `name` and its whole ancestor chain exist.
    ///
    /// Idempotent. Places the geocoder can't find or classify are left out
    /// of the tree without an error. A geocoder chain that leads back to a
    /// name already being resolved fails with `CycleDetected`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> DirectoryResult<()> {
        if self.contains(name).await? {
            return Ok(());
        }

        if self.store.is_empty().await? {
            match self.insert_seed().await {
                Ok(()) => {}
                // Another request seeded first
                Err(DirectoryError::RootAlreadyExists) => {
                    debug!("Location tree was seeded concurrently");
                }
                Err(e) => return Err(e),
            }
            if self.contains(name).await? {
                return Ok(());
            }
        }

        self.attach_chain(name).await
    }

    /// Manually place `name` under `parent_name`, resolving the parent first
    /// when it is not in the tree yet. No-op when `name` already exists.
    #[instrument(skip(self))]
    pub async fn add_location(&self, name: &str, parent_name: &str) -> DirectoryResult<()> {
        if self.contains(name).await? {
            return Ok(());
        }

        if !self.contains(parent_name).await? {
            self.resolve(parent_name).await?;
        }

        match self.store.find_by_name(parent_name).await? {
            Some(parent) => {
                self.insert_child(name, &parent).await?;
            }
            None => {
                debug!(parent = %parent_name, "Parent could not be resolved; location not added");
            }
        }

        Ok(())
    }

    /// `[name, parent, ..., "Global"]`, or empty for `None` and unknown names
    #[instrument(skip(self))]
    pub async fn ancestor_chain(&self, name: Option<&str>) -> DirectoryResult<Vec<String>> {
        let Some(name) = name else {
            return Ok(Vec::new());
        };
        Ok(self.arena().await?.ancestors(name))
    }

    /// `name` plus every location nested beneath it; empty for unknown names
    #[instrument(skip(self))]
    pub async fn descendants(&self, name: &str) -> DirectoryResult<BTreeSet<String>> {
        Ok(self.arena().await?.descendants(name))
    }

    async fn arena(&self) -> DirectoryResult<LocationArena> {
        Ok(LocationArena::build(self.store.find_all().await?))
    }

    /// Walk upward through the geocoder until a parent already in the tree
    /// (or an unplaceable place) is reached, then create the collected links
    /// top-down.
    async fn attach_chain(&self, name: &str) -> DirectoryResult<()> {
        let mut path: Vec<String> = Vec::new();
        let mut links: Vec<(String, String)> = Vec::new();
        let mut current = name.to_string();

        loop {
            if path.contains(&current) {
                path.push(current);
                warn!(name = %name, path = ?path, "Geocoder returned a cyclic parent chain");
                return Err(DirectoryError::CycleDetected {
                    name: name.to_string(),
                    path,
                });
            }
            path.push(current.clone());

            let Some(parent) = self.lookup_parent(&current).await else {
                break;
            };
            links.push((current, parent.clone()));

            if self.contains(&parent).await? {
                break;
            }
            current = parent;
        }

        for (child, parent_name) in links.into_iter().rev() {
            match self.store.find_by_name(&parent_name).await? {
                Some(parent) => {
                    self.insert_child(&child, &parent).await?;
                }
                None => {
                    debug!(location = %child, parent = %parent_name, "Parent not in tree; skipping");
                }
            }
        }

        Ok(())
    }

    /// Geocode `name` and classify it. Lookup failures are not fatal.
    async fn lookup_parent(&self, name: &str) -> Option<String> {
        match self.geocoder.search(name).await {
            Ok(Some(place)) => {
                let parent = parent_for(name, &place);
                if parent.is_none() {
                    debug!(name = %name, kind = ?place.kind, "Place can't be attached to the tree");
                }
                parent
            }
            Ok(None) => {
                debug!(name = %name, "Geocoder found no match");
                None
            }
            Err(e) => {
                warn!(name = %name, error = %e, "Geocoder lookup failed");
                None
            }
        }
    }

    /// Insert `name` under `parent` unless it exists; a lost race counts as done
    async fn insert_child(&self, name: &str, parent: &Location) -> DirectoryResult<()> {
        if self.contains(name).await? {
            return Ok(());
        }

        match self.store.insert(NewLocation::child_of(name, parent)).await {
            Ok(location) => {
                info!(location = %location.name, parent = %parent.name, "Added location");
                Ok(())
            }
            Err(DirectoryError::DuplicateLocation(_)) => {
                debug!(location = %name, "Location inserted concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
