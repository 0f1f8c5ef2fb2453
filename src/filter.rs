pub mod header;
pub mod resource;
