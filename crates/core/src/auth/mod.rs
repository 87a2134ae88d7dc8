//! Registration and credential checks.

mod service;

pub use service::*;
