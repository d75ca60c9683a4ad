//! Typed keys for every directory table.

pub use super::id::Id;

/// Marker for rows of `locations`.
pub struct LocationRow;

/// Marker for rows of `resources`.
pub struct ResourceRow;

/// Marker for rows of the per-category tag tables.
pub struct ResourceTagRow;

pub type LocationId = Id<LocationRow>;

pub type ResourceId = Id<ResourceRow>;

pub type ResourceTagId = Id<ResourceTagRow>;
