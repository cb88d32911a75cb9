pub mod config;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod payments;
pub mod periods;
pub mod serialization;
pub mod types;
pub mod validation;

// re-export key types
pub use config::{ScheduleConfig, TermLimits};
pub use decimal::{Money, Rate};
pub use errors::{Result, ScheduleError};
pub use interest::{MoratoriumAccrual, RateConverter};
pub use payments::{AmortizationSchedule, AnnuityCalculator, ScheduleBuilder};
pub use periods::PeriodSequencer;
pub use serialization::{generate_from_json, ScheduleResponse, ScheduleService};
pub use types::{EmiFrequency, Installment, LoanTerms, SchedulePhase};
pub use validation::{LoanTermsBuilder, RawLoanTerms, TermValidator};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;

/// generate the full repayment schedule for validated terms
pub fn generate_schedule(terms: &LoanTerms) -> Result<AmortizationSchedule> {
    AmortizationSchedule::generate(terms)
}
