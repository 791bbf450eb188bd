pub mod calendar;
pub mod reader;
pub mod slots;
pub mod availability;

pub use availability::AvailabilityService;
pub use reader::{ScheduleReader, SupabaseScheduleReader};
pub use slots::SlotCalculator;
