pub mod locations;
pub mod resources;
