//! Domain models for the Crop Calendar platform

mod calendar;
mod crop;
mod farm;
mod weather;

pub use calendar::*;
pub use crop::*;
pub use farm::*;
pub use weather::*;
