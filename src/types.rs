use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{Money, Rate};
use crate::errors::ScheduleError;

/// how often an installment falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmiFrequency {
    Monthly,
    BiMonthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl EmiFrequency {
    pub const ALL: [EmiFrequency; 5] = [
        EmiFrequency::Monthly,
        EmiFrequency::BiMonthly,
        EmiFrequency::Quarterly,
        EmiFrequency::HalfYearly,
        EmiFrequency::Yearly,
    ];

    /// calendar months in one frequency unit
    pub fn months(&self) -> u32 {
        match self {
            EmiFrequency::Monthly => 1,
            EmiFrequency::BiMonthly => 2,
            EmiFrequency::Quarterly => 3,
            EmiFrequency::HalfYearly => 6,
            EmiFrequency::Yearly => 12,
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        12 / self.months()
    }

    /// wire name, as accepted in requests
    pub fn as_str(&self) -> &'static str {
        match self {
            EmiFrequency::Monthly => "monthly",
            EmiFrequency::BiMonthly => "bi-monthly",
            EmiFrequency::Quarterly => "quarterly",
            EmiFrequency::HalfYearly => "half-yearly",
            EmiFrequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for EmiFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmiFrequency {
    type Err = ScheduleError;

    /// case-insensitive; `_` and spaces are read as `-`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "monthly" => Ok(EmiFrequency::Monthly),
            "bi-monthly" | "bimonthly" => Ok(EmiFrequency::BiMonthly),
            "quarterly" => Ok(EmiFrequency::Quarterly),
            "half-yearly" | "halfyearly" => Ok(EmiFrequency::HalfYearly),
            "yearly" => Ok(EmiFrequency::Yearly),
            _ => Err(ScheduleError::invalid_terms(
                "emi_frequency",
                format!(
                    "'{}' is not one of monthly, bi-monthly, quarterly, half-yearly, yearly",
                    s.trim()
                ),
            )),
        }
    }
}

/// validated loan terms, immutable once built
///
/// Only [`crate::validation::TermValidator`] (directly or through
/// [`crate::validation::LoanTermsBuilder`]) can produce one, so every
/// `LoanTerms` in circulation satisfies the domain invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanTerms {
    disbursement_date: NaiveDate,
    principal: Money,
    tenure: u32,
    interest_rate: Rate,
    emi_frequency: EmiFrequency,
    moratorium_period: u32,
}

impl LoanTerms {
    pub(crate) fn from_validated(
        disbursement_date: NaiveDate,
        principal: Money,
        tenure: u32,
        interest_rate: Rate,
        emi_frequency: EmiFrequency,
        moratorium_period: u32,
    ) -> Self {
        Self {
            disbursement_date,
            principal,
            tenure,
            interest_rate,
            emi_frequency,
            moratorium_period,
        }
    }

    pub fn disbursement_date(&self) -> NaiveDate {
        self.disbursement_date
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    /// total installments, moratorium periods included
    pub fn tenure(&self) -> u32 {
        self.tenure
    }

    /// annual nominal rate
    pub fn interest_rate(&self) -> Rate {
        self.interest_rate
    }

    pub fn emi_frequency(&self) -> EmiFrequency {
        self.emi_frequency
    }

    pub fn moratorium_period(&self) -> u32 {
        self.moratorium_period
    }

    /// periods over which principal is actually repaid
    pub fn amortizing_periods(&self) -> u32 {
        self.tenure - self.moratorium_period
    }

    pub fn has_moratorium(&self) -> bool {
        self.moratorium_period > 0
    }
}

/// one row of a repayment schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub installment_no: u32,
    pub date: NaiveDate,
    pub emi: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_principal: Money,
}

impl Installment {
    /// true for interest-only rows (moratorium)
    pub fn is_interest_only(&self) -> bool {
        self.principal_component.is_zero()
    }
}

/// generator state while walking the periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePhase {
    /// interest billed, no principal repaid
    Moratorium,
    /// fixed EMI retiring principal
    Amortizing,
    /// balance fully repaid
    Closed,
}
