//! Shared types and logic for the Crop Calendar platform
//!
//! This crate contains the farm context and calendar models, the calendar
//! regeneration policy and the calendar merge rules. It is shared between the
//! backend and the farmer dashboard (via WASM).

pub mod error;
pub mod models;
pub mod planning;
pub mod policy;
pub mod store;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use planning::*;
pub use policy::*;
pub use store::*;
pub use types::*;
pub use validation::*;
