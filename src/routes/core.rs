pub mod canvas;
pub mod events;
pub mod pixels;
