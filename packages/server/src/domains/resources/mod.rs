//! Resources domain - directory entries and the filter engine
//!
//! Key features:
//! - Atomic create/update of a resource together with its tag rows
//! - Exact-match scalar filters, per-category any-of tag filters
//! - Location-scoped search through the location tree

pub mod actions;
pub mod criteria;
pub mod filter;
pub mod models;

pub use actions::{create_resource, find_resource, resource_tags, update_resource};
pub use criteria::{CriterionValue, FilterCriteria};
pub use filter::ResourceFilter;
pub use models::{
    CreateResource, Resource, ResourceTag, TagCategory, UpdateResource, AUDIENCE_VALUES,
};
