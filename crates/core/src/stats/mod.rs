//! Dashboard aggregates over officers and duties.

mod service;

pub use service::*;
