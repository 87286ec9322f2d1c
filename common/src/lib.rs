pub mod account;
pub mod config;
pub mod games;
pub mod identifiers;
pub mod logger;
pub mod scores;

pub use identifiers::*;
