pub mod resource;
pub mod resource_tag;

pub use resource::{CreateResource, Resource, UpdateResource, MAX_FIELD_LENGTH};
pub use resource_tag::{parse_tag_list, ResourceTag, TagCategory, AUDIENCE_VALUES};
