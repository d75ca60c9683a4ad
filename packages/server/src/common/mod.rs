// Common types shared by the kernel and the domains

pub mod entity_ids;
pub mod errors;
pub mod id;

pub use entity_ids::*;
pub use errors::{DirectoryError, DirectoryResult};
pub use id::Id;
