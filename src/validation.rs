use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::config::{ScheduleConfig, TermLimits};
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::interest::{MoratoriumAccrual, RateConverter};
use crate::payments::AnnuityCalculator;
use crate::periods::PeriodSequencer;
use crate::types::{EmiFrequency, LoanTerms};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// loan terms exactly as received, before any checking
///
/// Every field is kept as a raw json value so that a missing field, a field
/// of the wrong type and a field with an out-of-range value can each be
/// reported against the field that caused it. Numbers may arrive as json
/// numbers or as numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLoanTerms {
    pub disbursement_date: Option<Value>,
    pub principal: Option<Value>,
    pub tenure: Option<Value>,
    pub interest_rate: Option<Value>,
    pub emi_frequency: Option<Value>,
    pub moratorium_period: Option<Value>,
}

impl RawLoanTerms {
    /// parse a request body; anything but a json object is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        let malformed = |message: String| ScheduleError::MalformedRequest { message };

        let value: Value = serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
        // serde would happily fill the struct from an array
        if !value.is_object() {
            return Err(malformed("request body must be a json object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
    }
}

/// gate between raw input and [`LoanTerms`]
///
/// Checks run in field order and stop at the first failure, so the caller
/// always learns which field to fix and no schedule is ever built from
/// partially valid terms.
#[derive(Debug, Clone, Default)]
pub struct TermValidator {
    limits: TermLimits,
}

impl TermValidator {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            limits: config.limits.clone(),
        }
    }

    pub fn with_limits(limits: TermLimits) -> Self {
        Self { limits }
    }

    pub fn validate(&self, raw: &RawLoanTerms) -> Result<LoanTerms> {
        self.check(raw).map_err(|err| {
            if let ScheduleError::InvalidTerms { field, reason } = &err {
                tracing::debug!(%field, %reason, "loan terms rejected");
            }
            err
        })
    }

    fn check(&self, raw: &RawLoanTerms) -> Result<LoanTerms> {
        let disbursement_date = parse_date(required(&raw.disbursement_date, "disbursement_date")?)?;

        let principal = self.check_principal(required(&raw.principal, "principal")?)?;
        let tenure = self.check_tenure(required(&raw.tenure, "tenure")?)?;
        let interest_rate = self.check_interest_rate(required(&raw.interest_rate, "interest_rate")?)?;
        let emi_frequency = parse_frequency(required(&raw.emi_frequency, "emi_frequency")?)?;
        let moratorium_period = check_moratorium(optional(&raw.moratorium_period), tenure)?;

        let sequencer = PeriodSequencer::new(disbursement_date, emi_frequency, tenure);
        if sequencer.last_due_date().is_none() {
            return Err(ScheduleError::invalid_terms(
                "tenure",
                "schedule would run past the supported calendar range",
            ));
        }

        let periodic_rate = RateConverter::periodic_rate(interest_rate, emi_frequency);
        check_repayable(principal, periodic_rate, tenure, moratorium_period)?;

        Ok(LoanTerms::from_validated(
            disbursement_date,
            principal,
            tenure,
            interest_rate,
            emi_frequency,
            moratorium_period,
        ))
    }

    fn check_principal(&self, value: &Value) -> Result<Money> {
        let amount = parse_decimal(value, "principal")?;
        let principal = Money::checked_from_decimal(amount).ok_or_else(|| {
            ScheduleError::invalid_terms(
                "principal",
                format!("must not exceed {}, got {}", Money::MAX, amount),
            )
        })?;
        if !principal.is_positive() {
            return Err(ScheduleError::invalid_terms(
                "principal",
                format!("must be greater than zero, got {}", amount),
            ));
        }
        if let Some(cap) = self.limits.max_principal {
            if principal > cap {
                return Err(ScheduleError::invalid_terms(
                    "principal",
                    format!("must not exceed {}, got {}", cap, principal),
                ));
            }
        }
        Ok(principal)
    }

    fn check_tenure(&self, value: &Value) -> Result<u32> {
        let tenure = parse_whole(value, "tenure")?;
        if tenure < 1 {
            return Err(ScheduleError::invalid_terms(
                "tenure",
                format!("must be at least 1, got {}", tenure),
            ));
        }
        if tenure > i64::from(self.limits.max_tenure) {
            return Err(ScheduleError::invalid_terms(
                "tenure",
                format!("must not exceed {} periods, got {}", self.limits.max_tenure, tenure),
            ));
        }
        Ok(tenure as u32)
    }

    fn check_interest_rate(&self, value: &Value) -> Result<Rate> {
        let percent = parse_decimal(value, "interest_rate")?;
        if percent < Decimal::ZERO {
            return Err(ScheduleError::invalid_terms(
                "interest_rate",
                format!("must not be negative, got {}", percent),
            ));
        }
        if percent > self.limits.max_interest_rate {
            return Err(ScheduleError::invalid_terms(
                "interest_rate",
                format!(
                    "must not exceed {}%, got {}%",
                    self.limits.max_interest_rate, percent
                ),
            ));
        }
        Ok(Rate::from_percentage(percent))
    }
}

/// amounts stay in range and every amortizing installment repays principal
///
/// Interest only falls as the balance shrinks, so an EMI that clears the
/// first amortizing period's interest by a cent clears every later one.
fn check_repayable(principal: Money, periodic_rate: Rate, tenure: u32, moratorium: u32) -> Result<()> {
    let too_large = || {
        ScheduleError::invalid_terms(
            "principal",
            format!("{} is too large to schedule at this rate and tenure", principal),
        )
    };

    let accrual = MoratoriumAccrual::new(principal, periodic_rate, moratorium).ok_or_else(too_large)?;
    let opening = accrual.opening_principal();
    // a single-period annuity bills opening * (1 + r)
    opening
        .checked_mul(Decimal::ONE + periodic_rate.as_decimal())
        .ok_or_else(too_large)?;

    let emi = AnnuityCalculator::new(periodic_rate).emi(opening, tenure - moratorium)?;
    let interest = opening.interest_at(periodic_rate);
    if emi - interest < Money::CENT {
        return Err(ScheduleError::invalid_terms(
            "tenure",
            format!(
                "installment of {} repays no principal against interest of {}",
                emi, interest
            ),
        ));
    }
    Ok(())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn required<'a>(value: &'a Option<Value>, field: &str) -> Result<&'a Value> {
    match value {
        Some(v) if !is_blank(v) => Ok(v),
        _ => Err(ScheduleError::invalid_terms(field, "is required")),
    }
}

fn optional(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !is_blank(v))
}

fn parse_date(value: &Value) -> Result<NaiveDate> {
    let invalid = || ScheduleError::invalid_terms("disbursement_date", "must be a date in YYYY-MM-DD format");
    match value {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn parse_decimal(value: &Value, field: &str) -> Result<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(ScheduleError::invalid_terms(field, "must be a number")),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ScheduleError::invalid_terms(field, format!("must be a number, got '{}'", text)))
}

fn parse_whole(value: &Value, field: &str) -> Result<i64> {
    let number = parse_decimal(value, field)?;
    if !number.fract().is_zero() {
        return Err(ScheduleError::invalid_terms(
            field,
            format!("must be a whole number, got {}", number),
        ));
    }
    number
        .to_i64()
        .ok_or_else(|| ScheduleError::invalid_terms(field, format!("is out of range: {}", number)))
}

fn parse_frequency(value: &Value) -> Result<EmiFrequency> {
    match value {
        Value::String(s) => s.parse(),
        _ => Err(ScheduleError::invalid_terms("emi_frequency", "must be a string")),
    }
}

fn check_moratorium(value: Option<&Value>, tenure: u32) -> Result<u32> {
    let Some(value) = value else {
        return Ok(0);
    };
    let periods = parse_whole(value, "moratorium_period")?;
    if periods < 0 {
        return Err(ScheduleError::invalid_terms(
            "moratorium_period",
            format!("must not be negative, got {}", periods),
        ));
    }
    if periods >= i64::from(tenure) {
        return Err(ScheduleError::invalid_terms(
            "moratorium_period",
            format!("must be less than tenure ({}), got {}", tenure, periods),
        ));
    }
    Ok(periods as u32)
}

/// typed construction of [`LoanTerms`], still routed through [`TermValidator`]
#[derive(Debug, Clone, Default)]
pub struct LoanTermsBuilder {
    disbursement_date: Option<NaiveDate>,
    principal: Option<Money>,
    tenure: Option<u32>,
    interest_rate: Option<Decimal>,
    emi_frequency: Option<EmiFrequency>,
    moratorium_period: Option<u32>,
    limits: TermLimits,
}

impl LoanTermsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disbursement_date(mut self, date: NaiveDate) -> Self {
        self.disbursement_date = Some(date);
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn tenure(mut self, periods: u32) -> Self {
        self.tenure = Some(periods);
        self
    }

    /// annual nominal rate in percent (12 for 12%)
    pub fn interest_rate(mut self, percent: Decimal) -> Self {
        self.interest_rate = Some(percent);
        self
    }

    pub fn emi_frequency(mut self, frequency: EmiFrequency) -> Self {
        self.emi_frequency = Some(frequency);
        self
    }

    pub fn moratorium_period(mut self, periods: u32) -> Self {
        self.moratorium_period = Some(periods);
        self
    }

    pub fn limits(mut self, limits: TermLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Result<LoanTerms> {
        let raw = RawLoanTerms {
            disbursement_date: self
                .disbursement_date
                .map(|d| Value::String(d.format(DATE_FORMAT).to_string())),
            principal: self.principal.map(|p| Value::String(p.to_string())),
            tenure: self.tenure.map(Value::from),
            interest_rate: self.interest_rate.map(|r| Value::String(r.to_string())),
            // frequency defaults to monthly, as on the request form
            emi_frequency: Some(Value::String(
                self.emi_frequency.unwrap_or(EmiFrequency::Monthly).as_str().to_string(),
            )),
            moratorium_period: self.moratorium_period.map(Value::from),
        };
        TermValidator::with_limits(self.limits).validate(&raw)
    }
}

impl LoanTerms {
    pub fn builder() -> LoanTermsBuilder {
        LoanTermsBuilder::new()
    }
}
