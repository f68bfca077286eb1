pub mod coords;
pub mod error;
pub mod ids;
