// TestDependencies - mock implementations for testing
//
// Provides a scripted geocoder and in-memory stores that can be injected
// into DirectoryDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{
    BaseGeocoder, DirectoryDeps, MemoryLocationStore, MemoryResourceStore, Place, PlaceKind,
};

// =============================================================================
// Mock Geocoder
// =============================================================================

pub struct MockGeocoder {
    places: Arc<Mutex<HashMap<String, Place>>>,
    failures: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self {
            places: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer `name` with `place`
    pub fn with_place(self, name: &str, place: Place) -> Self {
        self.places.lock().unwrap().insert(name.to_string(), place);
        self
    }

    /// A country, reported as its own country
    pub fn with_country(self, name: &str) -> Self {
        self.with_place(
            name,
            Place {
                kind: PlaceKind::Administrative,
                country: Some(name.to_string()),
                state: None,
                city: None,
            },
        )
    }

    /// A state inside `country`
    pub fn with_state(self, name: &str, country: &str) -> Self {
        self.with_place(
            name,
            Place {
                kind: PlaceKind::Administrative,
                country: Some(country.to_string()),
                state: Some(name.to_string()),
                city: None,
            },
        )
    }

    /// A city inside `state`
    pub fn with_city(self, name: &str, state: &str, country: &str) -> Self {
        self.with_place(
            name,
            Place {
                kind: PlaceKind::City,
                country: Some(country.to_string()),
                state: Some(state.to_string()),
                city: Some(name.to_string()),
            },
        )
    }

    /// Make lookups of `name` fail like a network error
    pub fn with_failure(self, name: &str) -> Self {
        self.failures.lock().unwrap().push(name.to_string());
        self
    }

    /// Every name that was looked up, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_searched(&self, name: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == name)
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseGeocoder for MockGeocoder {
    async fn search(&self, name: &str) -> Result<Option<Place>> {
        self.calls.lock().unwrap().push(name.to_string());

        if self.failures.lock().unwrap().iter().any(|f| f == name) {
            return Err(anyhow!("Mock geocoder failure for {}", name));
        }

        Ok(self.places.lock().unwrap().get(name).cloned())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builds `DirectoryDeps` over in-memory stores and a mock geocoder
pub struct TestDependencies {
    pub geocoder: Arc<MockGeocoder>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            geocoder: Arc::new(MockGeocoder::new()),
        }
    }

    pub fn with_geocoder(mut self, geocoder: MockGeocoder) -> Self {
        self.geocoder = Arc::new(geocoder);
        self
    }

    pub fn into_deps(self) -> DirectoryDeps {
        DirectoryDeps::new(
            Arc::new(MemoryLocationStore::new()),
            Arc::new(MemoryResourceStore::new()),
            self.geocoder,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
