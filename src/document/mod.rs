pub mod node;
pub mod parser;
pub mod sanitize;
pub mod splice;
