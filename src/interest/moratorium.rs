use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::interest::RateConverter;
use crate::types::{Installment, LoanTerms};

/// interest accrued over a moratorium window
///
/// During the window no principal is repaid. Each period bills the interest
/// on the un-reduced principal as a disclosed charge; the whole accrual is
/// capitalized into the balance on the last moratorium period, and regular
/// amortization starts from that capitalized balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoratoriumAccrual {
    principal: Money,
    periods: u32,
    period_interest: Money,
    capitalized_interest: Money,
    opening_principal: Money,
}

impl MoratoriumAccrual {
    /// `None` when the capitalized balance would pass [`Money::MAX`]
    pub fn new(principal: Money, periodic_rate: Rate, periods: u32) -> Option<Self> {
        let period_interest = if periods == 0 {
            Money::ZERO
        } else {
            principal.checked_interest_at(periodic_rate)?
        };
        let capitalized_interest = period_interest.checked_mul(Decimal::from(periods))?;
        let opening_principal = principal.checked_add(capitalized_interest)?;

        Some(Self {
            principal,
            periods,
            period_interest,
            capitalized_interest,
            opening_principal,
        })
    }

    pub fn for_terms(terms: &LoanTerms) -> Option<Self> {
        Self::new(
            terms.principal(),
            RateConverter::for_terms(terms),
            terms.moratorium_period(),
        )
    }

    pub fn periods(&self) -> u32 {
        self.periods
    }

    /// interest billed in each moratorium period
    pub fn period_interest(&self) -> Money {
        self.period_interest
    }

    /// total interest added to principal at the end of the window
    pub fn capitalized_interest(&self) -> Money {
        self.capitalized_interest
    }

    /// balance amortization starts from
    pub fn opening_principal(&self) -> Money {
        self.opening_principal
    }

    /// interest-only installment for moratorium period `k` (1-based)
    pub fn installment(&self, k: u32, date: NaiveDate) -> Installment {
        let remaining_principal = if k >= self.periods {
            self.opening_principal
        } else {
            self.principal
        };

        Installment {
            installment_no: k,
            date,
            emi: self.period_interest,
            principal_component: Money::ZERO,
            interest_component: self.period_interest,
            remaining_principal,
        }
    }
}
