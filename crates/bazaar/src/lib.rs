#![doc = include_str!("../README.md")]

pub mod telemetry;
mod traits;

// re-export internal modules
pub use self::traits::*;
