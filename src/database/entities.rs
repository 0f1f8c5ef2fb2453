pub mod canvas;
pub mod connection;
pub mod placement;
