pub mod grid;
pub mod physics;
pub mod scene;
pub mod time;
