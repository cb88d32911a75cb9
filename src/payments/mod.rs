pub mod annuity;
pub mod schedule;

pub use annuity::AnnuityCalculator;
pub use schedule::{AmortizationSchedule, ScheduleBuilder};
