//! Layer types held by the map and the registry that orders them.

#[macro_use]
pub mod macros;
pub mod base;
pub mod manager;
pub mod tile;
