///! Shared data types for the stargaze workspace
mod types;

pub use types::*;
