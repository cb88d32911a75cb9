pub mod moratorium;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::decimal::Rate;
use crate::types::{EmiFrequency, LoanTerms};

pub use moratorium::MoratoriumAccrual;

/// converts annual nominal rates to per-period rates
///
/// Simple periodic compounding over whole months: no day-count convention is
/// applied, so a 12% loan paid monthly charges exactly 1% per period whatever
/// the length of the month.
pub struct RateConverter;

impl RateConverter {
    /// per-period rate = annual * months_per_period / 12
    pub fn periodic_rate(annual_rate: Rate, frequency: EmiFrequency) -> Rate {
        let months = Decimal::from(frequency.months());
        Rate::from_decimal(annual_rate.as_decimal() * months / dec!(12))
    }

    pub fn for_terms(terms: &LoanTerms) -> Rate {
        Self::periodic_rate(terms.interest_rate(), terms.emi_frequency())
    }
}
