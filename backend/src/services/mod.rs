//! Business logic services for the Crop Calendar service

pub mod calendar;
pub mod crop_profile;
pub mod farm_context;
pub mod regeneration_lock;

pub use calendar::CalendarService;
pub use crop_profile::CropProfileService;
pub use farm_context::FarmContextService;
pub use regeneration_lock::RegenerationLocks;
