pub mod ai;
pub mod collision;
pub mod debug;
