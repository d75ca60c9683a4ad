//! Directory dependencies (using traits for testability)
//!
//! This module provides the dependency container handed to request
//! handlers. Stores and the geocoder are trait objects so tests can swap
//! in the in-memory stores and a scripted geocoder.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::locations::LocationTree;
use crate::domains::resources::ResourceFilter;
use crate::kernel::{
    BaseGeocoder, BaseLocationStore, BaseResourceStore, PgLocationStore, PgResourceStore,
};

#[derive(Clone)]
pub struct DirectoryDeps {
    pub location_store: Arc<dyn BaseLocationStore>,
    pub resource_store: Arc<dyn BaseResourceStore>,
    pub geocoder: Arc<dyn BaseGeocoder>,
}

impl DirectoryDeps {
    pub fn new(
        location_store: Arc<dyn BaseLocationStore>,
        resource_store: Arc<dyn BaseResourceStore>,
        geocoder: Arc<dyn BaseGeocoder>,
    ) -> Self {
        Self {
            location_store,
            resource_store,
            geocoder,
        }
    }

    /// Both stores over one Postgres pool
    pub fn postgres(pool: PgPool, geocoder: Arc<dyn BaseGeocoder>) -> Self {
        Self::new(
            Arc::new(PgLocationStore::new(pool.clone())),
            Arc::new(PgResourceStore::new(pool)),
            geocoder,
        )
    }

    pub fn location_tree(&self) -> LocationTree {
        LocationTree::new(self.location_store.clone(), self.geocoder.clone())
    }

    pub fn resource_filter(&self) -> ResourceFilter {
        ResourceFilter::new(self.resource_store.clone(), self.location_tree())
    }
}
