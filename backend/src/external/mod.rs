//! External API integrations

pub mod calendar_agent;
pub mod forecast;

pub use calendar_agent::{AgentCalendarClient, BuildCalendarRequest, CalendarBuilder};
pub use forecast::{ForecastClient, ForecastSource};
