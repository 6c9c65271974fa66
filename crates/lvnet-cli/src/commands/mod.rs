pub mod compat;
pub mod graph;
pub mod verify;
