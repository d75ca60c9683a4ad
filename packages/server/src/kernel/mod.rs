//! Kernel module - infrastructure seams and their implementations.

pub mod deps;
pub mod memory_store;
pub mod nominatim;
pub mod postgres_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::DirectoryDeps;
pub use memory_store::{MemoryLocationStore, MemoryResourceStore};
pub use nominatim::NominatimGeocoder;
pub use postgres_store::{PgLocationStore, PgResourceStore};
pub use test_dependencies::{MockGeocoder, TestDependencies};
pub use traits::*;
