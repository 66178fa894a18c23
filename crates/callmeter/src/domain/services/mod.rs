//! Domain Services
//!
//! Side-effect free calculations shared by ingestion and backfill.

mod cost;
mod duration;

pub use cost::*;
pub use duration::*;
