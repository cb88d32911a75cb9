use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};

/// past this compound factor `c / (c - 1)` equals 1 at currency precision
const COMPOUND_SATURATION: Decimal = dec!(100000000000000000000);

/// fixed installment for a fully amortizing loan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnuityCalculator {
    rate: Rate,
}

impl AnnuityCalculator {
    pub fn new(periodic_rate: Rate) -> Self {
        Self { rate: periodic_rate }
    }

    /// EMI retiring `principal` over `periods` installments
    ///
    /// `EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)`, or `P / n` when the rate
    /// is zero, rounded half-up to currency precision. The rounding leaves a
    /// few cents of drift which the schedule absorbs on its final installment.
    pub fn emi(&self, principal: Money, periods: u32) -> Result<Money> {
        if periods == 0 {
            return Err(ScheduleError::internal(0, "annuity requested over zero periods"));
        }

        let p = principal.as_decimal();
        let r = self.rate.as_decimal();

        if r.is_zero() {
            return Ok(Money::from_decimal(p / Decimal::from(periods)));
        }

        let exact = match compound_factor(r, periods) {
            Some(compound) => p
                .checked_mul(r)
                .and_then(|interest| interest.checked_mul(compound / (compound - Decimal::ONE))),
            None => p.checked_mul(r),
        };

        exact.and_then(Money::checked_from_decimal).ok_or_else(|| {
            ScheduleError::internal(
                0,
                format!("EMI on {} at {} per period is out of range", principal, self.rate),
            )
        })
    }
}

/// (1 + r)^n, or `None` once it saturates
fn compound_factor(r: Decimal, n: u32) -> Option<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound.checked_mul(base)?;
        if compound > COMPOUND_SATURATION {
            return None;
        }
    }
    Some(compound)
}
