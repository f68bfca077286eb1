pub mod connections;
pub mod definitions;
pub mod objects;
