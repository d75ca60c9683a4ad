// Resource Directory - Core
//
// A directory of opportunities, programs and services, searchable by type,
// audience, client tag and place. Places form a tree rooted at "Global"
// that grows on demand through a geocoder.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
