//! Locations domain - the place hierarchy resources are scoped to

pub mod arena;
pub mod classify;
pub mod models;
pub mod tree;

pub use models::{Location, NewLocation, ROOT_LOCATION};
pub use tree::{LocationTree, SEED_LOCATIONS};
