pub mod location;

pub use location::{Location, NewLocation, ROOT_LOCATION};
