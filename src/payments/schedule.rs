use chrono::NaiveDate;
use serde::Serialize;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::interest::{MoratoriumAccrual, RateConverter};
use crate::payments::annuity::AnnuityCalculator;
use crate::periods::PeriodSequencer;
use crate::types::{Installment, LoanTerms, SchedulePhase};

/// full repayment schedule for one set of loan terms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub periodic_rate: Rate,
    /// regular installment of the amortizing phase
    pub emi: Money,
    pub capitalized_interest: Money,
    /// balance regular amortization starts from
    pub opening_principal: Money,
    pub installments: Vec<Installment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule
    pub fn generate(terms: &LoanTerms) -> Result<Self> {
        ScheduleBuilder::new(terms).build()
    }

    /// installment by its 1-based number
    pub fn get_installment(&self, installment_no: u32) -> Option<&Installment> {
        let index = installment_no.checked_sub(1)?;
        self.installments.get(index as usize)
    }

    pub fn moratorium_installments(&self) -> &[Installment] {
        let end = (self.terms.moratorium_period() as usize).min(self.installments.len());
        &self.installments[..end]
    }

    pub fn amortizing_installments(&self) -> &[Installment] {
        let start = (self.terms.moratorium_period() as usize).min(self.installments.len());
        &self.installments[start..]
    }

    /// balance left after the last installment
    pub fn final_balance(&self) -> Money {
        self.installments
            .last()
            .map(|i| i.remaining_principal)
            .unwrap_or(self.opening_principal)
    }

    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    pub fn into_installments(self) -> Vec<Installment> {
        self.installments
    }
}

/// walks the periods of a loan and emits one installment per period
///
/// Phases run `Moratorium -> Amortizing -> Closed`. The moratorium bills
/// interest only; the amortizing phase pays the fixed EMI until either the
/// tenure is reached or the balance is gone. The final installment always
/// takes exactly the outstanding balance, so every schedule ends at zero.
pub struct ScheduleBuilder<'a> {
    terms: &'a LoanTerms,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(terms: &'a LoanTerms) -> Self {
        Self { terms }
    }

    pub fn build(&self) -> Result<AmortizationSchedule> {
        let terms = self.terms;
        let tenure = terms.tenure();
        let rate = RateConverter::for_terms(terms);
        let moratorium = MoratoriumAccrual::for_terms(terms).ok_or_else(|| {
            ScheduleError::internal(0, "capitalized moratorium interest is out of range")
        })?;
        let opening_principal = moratorium.opening_principal();
        let emi = AnnuityCalculator::new(rate).emi(opening_principal, terms.amortizing_periods())?;

        tracing::debug!(
            principal = %terms.principal(),
            tenure,
            frequency = %terms.emi_frequency(),
            periodic_rate = %rate.as_decimal(),
            moratorium = moratorium.periods(),
            opening_principal = %opening_principal,
            emi = %emi,
            "building amortization schedule"
        );

        let mut installments = Vec::with_capacity(tenure as usize);
        let mut phase = if terms.has_moratorium() {
            SchedulePhase::Moratorium
        } else {
            SchedulePhase::Amortizing
        };
        let mut balance = opening_principal;

        for (k, date) in (1..=tenure).zip(PeriodSequencer::for_terms(terms).iter()) {
            match phase {
                SchedulePhase::Moratorium => {
                    installments.push(moratorium.installment(k, date));
                    if k == moratorium.periods() {
                        phase = SchedulePhase::Amortizing;
                    }
                }
                SchedulePhase::Amortizing => {
                    let installment = amortize(k, date, &mut balance, emi, rate, k == tenure)?;
                    installments.push(installment);
                    if balance.is_zero() {
                        phase = SchedulePhase::Closed;
                    }
                }
                SchedulePhase::Closed => break,
            }
        }

        if phase != SchedulePhase::Closed {
            return Err(ScheduleError::internal(
                installments.len() as u32,
                format!(
                    "schedule stopped in {:?} after {} of {} installments",
                    phase,
                    installments.len(),
                    tenure
                ),
            ));
        }
        if installments.len() < tenure as usize {
            tracing::debug!(
                closed_at = installments.len(),
                tenure,
                "balance retired before the last scheduled period"
            );
        }

        verify(&installments, opening_principal)?;

        let total_interest = installments
            .iter()
            .map(|i| i.interest_component)
            .fold(Money::ZERO, |acc, x| acc + x);
        let total_payment = installments
            .iter()
            .map(|i| i.emi)
            .fold(Money::ZERO, |acc, x| acc + x);

        Ok(AmortizationSchedule {
            terms: terms.clone(),
            periodic_rate: rate,
            emi,
            capitalized_interest: moratorium.capitalized_interest(),
            opening_principal,
            installments,
            total_interest,
            total_payment,
        })
    }
}

/// one amortizing period; `balance` is reduced in place
fn amortize(
    k: u32,
    date: NaiveDate,
    balance: &mut Money,
    emi: Money,
    rate: Rate,
    is_last: bool,
) -> Result<Installment> {
    let interest = balance.interest_at(rate);
    let scheduled = emi - interest;
    if !is_last && !scheduled.is_positive() {
        return Err(ScheduleError::internal(
            k,
            format!("installment {} does not cover interest {}", emi, interest),
        ));
    }

    let principal = if is_last || scheduled >= *balance {
        *balance
    } else {
        scheduled
    };

    *balance -= principal;
    if balance.is_negative() {
        return Err(ScheduleError::internal(
            k,
            format!("remaining principal went negative: {}", balance),
        ));
    }

    Ok(Installment {
        installment_no: k,
        date,
        emi: principal + interest,
        principal_component: principal,
        interest_component: interest,
        remaining_principal: *balance,
    })
}

/// checks the invariants every finished schedule must hold
fn verify(installments: &[Installment], opening_principal: Money) -> Result<()> {
    let last = installments
        .last()
        .ok_or_else(|| ScheduleError::internal(0, "schedule has no installments"))?;

    if !last.remaining_principal.is_zero() {
        return Err(ScheduleError::internal(
            last.installment_no,
            format!("schedule ends with balance {}", last.remaining_principal),
        ));
    }

    let repaid = installments
        .iter()
        .map(|i| i.principal_component)
        .fold(Money::ZERO, |acc, x| acc + x);
    if repaid != opening_principal {
        return Err(ScheduleError::internal(
            last.installment_no,
            format!("principal repaid {} differs from opening principal {}", repaid, opening_principal),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::types::EmiFrequency;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn retail_terms(
        principal: Money,
        tenure: u32,
        rate: Decimal,
        moratorium: u32,
        frequency: EmiFrequency,
    ) -> Result<LoanTerms> {
        LoanTerms::builder()
            .disbursement_date(date(2024, 1, 15))
            .principal(principal)
            .tenure(tenure)
            .interest_rate(rate)
            .emi_frequency(frequency)
            .moratorium_period(moratorium)
            .limits(ScheduleConfig::retail().limits)
            .build()
    }

    fn terms(
        principal: Money,
        tenure: u32,
        rate: Decimal,
        moratorium: u32,
        frequency: EmiFrequency,
    ) -> LoanTerms {
        retail_terms(principal, tenure, rate, moratorium, frequency).unwrap()
    }

    fn standard(moratorium: u32) -> AmortizationSchedule {
        let terms = terms(Money::from_major(100_000), 12, dec!(12), moratorium, EmiFrequency::Monthly);
        AmortizationSchedule::generate(&terms).unwrap()
    }

    #[test]
    fn test_standard_monthly_schedule() {
        let schedule = standard(0);

        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule.emi, Money::from_decimal(dec!(8884.88)));

        let first = schedule.get_installment(1).unwrap();
        assert_eq!(
            first,
            &Installment {
                installment_no: 1,
                date: date(2024, 2, 15),
                emi: Money::from_decimal(dec!(8884.88)),
                principal_component: Money::from_decimal(dec!(7884.88)),
                interest_component: Money::from_decimal(dec!(1000.00)),
                remaining_principal: Money::from_decimal(dec!(92115.12)),
            }
        );

        // final installment absorbs three cents of rounding drift
        let last = schedule.get_installment(12).unwrap();
        assert_eq!(last.date, date(2025, 1, 15));
        assert_eq!(last.principal_component, Money::from_decimal(dec!(8796.88)));
        assert_eq!(last.interest_component, Money::from_decimal(dec!(87.97)));
        assert_eq!(last.emi, Money::from_decimal(dec!(8884.85)));
        assert_eq!(schedule.final_balance(), Money::ZERO);

        assert_eq!(schedule.total_interest, Money::from_decimal(dec!(6618.53)));
        assert_eq!(schedule.total_payment, Money::from_decimal(dec!(106618.53)));
    }

    #[test]
    fn test_moratorium_schedule() {
        let schedule = standard(3);

        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule.capitalized_interest, Money::from_major(3_000));
        assert_eq!(schedule.opening_principal, Money::from_major(103_000));
        assert_eq!(schedule.emi, Money::from_decimal(dec!(12024.26)));

        let moratorium = schedule.moratorium_installments();
        assert_eq!(moratorium.len(), 3);
        for installment in moratorium {
            assert_eq!(installment.principal_component, Money::ZERO);
            assert_eq!(installment.interest_component, Money::from_major(1_000));
            assert_eq!(installment.emi, installment.interest_component);
        }
        assert_eq!(moratorium[0].remaining_principal, Money::from_major(100_000));
        assert_eq!(moratorium[1].remaining_principal, Money::from_major(100_000));
        assert_eq!(moratorium[2].remaining_principal, Money::from_major(103_000));

        let fourth = schedule.get_installment(4).unwrap();
        assert_eq!(fourth.interest_component, Money::from_major(1_030));
        assert_eq!(fourth.principal_component, Money::from_decimal(dec!(10994.26)));
        assert_eq!(fourth.emi, schedule.emi);

        let last = schedule.get_installment(12).unwrap();
        assert_eq!(last.emi, Money::from_decimal(dec!(12024.24)));
        assert_eq!(schedule.final_balance(), Money::ZERO);
    }

    #[test]
    fn test_zero_interest_schedule() {
        let terms = terms(Money::from_major(100_000), 12, dec!(0), 0, EmiFrequency::Monthly);
        let schedule = AmortizationSchedule::generate(&terms).unwrap();

        assert_eq!(schedule.emi, Money::from_decimal(dec!(8333.33)));
        assert!(schedule.installments.iter().all(|i| i.interest_component.is_zero()));
        assert!(schedule.installments[..11].iter().all(|i| i.emi == schedule.emi));
        assert_eq!(schedule.installments[11].emi, Money::from_decimal(dec!(8333.37)));
        assert_eq!(schedule.total_interest, Money::ZERO);
    }

    #[test]
    fn test_single_installment() {
        let terms = terms(Money::from_major(100_000), 1, dec!(12), 0, EmiFrequency::Monthly);
        let schedule = AmortizationSchedule::generate(&terms).unwrap();

        assert_eq!(schedule.len(), 1);
        let only = &schedule.installments[0];
        assert_eq!(only.principal_component, Money::from_major(100_000));
        assert_eq!(only.interest_component, Money::from_major(1_000));
        assert_eq!(only.emi, Money::from_major(101_000));
        assert_eq!(only.remaining_principal, Money::ZERO);
    }

    #[test]
    fn test_quarterly_schedule() {
        let terms = terms(Money::from_major(100_000), 8, dec!(10), 0, EmiFrequency::Quarterly);
        let schedule = AmortizationSchedule::generate(&terms).unwrap();

        assert_eq!(schedule.periodic_rate.as_decimal(), dec!(0.025));
        assert_eq!(schedule.emi, Money::from_decimal(dec!(13946.73)));
        assert_eq!(schedule.installments[0].interest_component, Money::from_major(2_500));
        assert_eq!(schedule.installments[0].date, date(2024, 4, 15));
        assert_eq!(schedule.installments[7].date, date(2026, 1, 15));
        assert_eq!(schedule.installments[7].emi, Money::from_decimal(dec!(13946.77)));
    }

    #[test]
    fn test_month_end_disbursement() {
        let terms = LoanTerms::builder()
            .disbursement_date(date(2024, 1, 31))
            .principal(Money::from_major(12_000))
            .tenure(3)
            .interest_rate(dec!(6))
            .build()
            .unwrap();
        let schedule = AmortizationSchedule::generate(&terms).unwrap();
        let dates: Vec<_> = schedule.installments.iter().map(|i| i.date).collect();
        assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_sub_cent_emi_closes_early() {
        // EMI of 0.005 rounds up to a cent, retiring 1.00 after 100 periods
        let terms = terms(Money::from_major(1), 200, dec!(0), 0, EmiFrequency::Monthly);
        let schedule = AmortizationSchedule::generate(&terms).unwrap();

        assert_eq!(schedule.emi, Money::CENT);
        assert_eq!(schedule.len(), 100);
        assert_eq!(schedule.final_balance(), Money::ZERO);
    }

    #[test]
    fn test_lookup_bounds() {
        let schedule = standard(0);
        assert!(schedule.get_installment(0).is_none());
        assert!(schedule.get_installment(13).is_none());
        assert_eq!(schedule.amortizing_installments().len(), 12);
        assert!(schedule.moratorium_installments().is_empty());
    }

    #[test]
    fn test_interest_covering_emi_is_internal_error() {
        let err = amortize(
            5,
            date(2024, 6, 1),
            &mut Money::from_major(1_000),
            Money::from_major(30),
            Rate::from_decimal(dec!(0.03)),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InternalInconsistency { installment_no: 5, .. }));

        // the last period still settles the whole balance
        let mut balance = Money::from_major(1_000);
        let last = amortize(
            6,
            date(2024, 7, 1),
            &mut balance,
            Money::from_major(30),
            Rate::from_decimal(dec!(0.03)),
            true,
        )
        .unwrap();
        assert_eq!(last.emi, Money::from_major(1_030));
        assert!(balance.is_zero());
    }

    #[test]
    fn test_long_high_rate_schedule_amortizes_every_period() {
        // 36% monthly over 20 years leaves the EMI two cents above the first interest
        let terms = terms(Money::from_major(1_000), 240, dec!(36), 0, EmiFrequency::Monthly);
        let schedule = AmortizationSchedule::generate(&terms).unwrap();

        assert!(schedule.installments.iter().all(|i| i.principal_component.is_positive()));
        assert_eq!(schedule.final_balance(), Money::ZERO);
    }

    #[test]
    fn test_largest_default_principal_keeps_two_places() {
        let terms = LoanTerms::builder()
            .disbursement_date(date(2024, 1, 15))
            .principal(Money::from_major(1_000_000_000_000_000))
            .tenure(2)
            .interest_rate(dec!(100))
            .emi_frequency(EmiFrequency::Yearly)
            .moratorium_period(1)
            .build()
            .unwrap();
        let schedule = AmortizationSchedule::generate(&terms).unwrap();

        assert_eq!(schedule.opening_principal.to_string(), "2000000000000000.00");
        let json = serde_json::to_value(&schedule.installments[1]).unwrap();
        assert_eq!(json["interest_component"], "2000000000000000.00");
    }

    #[test]
    fn test_verify_flags_drift() {
        let installment = Installment {
            installment_no: 1,
            date: date(2024, 2, 1),
            emi: Money::from_major(10),
            principal_component: Money::from_major(9),
            interest_component: Money::from_major(1),
            remaining_principal: Money::from_major(1),
        };
        let err = verify(&[installment], Money::from_major(10)).unwrap_err();
        assert!(matches!(err, ScheduleError::InternalInconsistency { installment_no: 1, .. }));
    }

    fn frequency_strategy() -> impl Strategy<Value = EmiFrequency> {
        prop::sample::select(EmiFrequency::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_schedule_invariants(
            principal_cents in 100_000i64..1_000_000_000,
            tenure in 1u32..=120,
            rate_bps in 0u32..=3600,
            moratorium_seed in 0u32..120,
            frequency in frequency_strategy(),
        ) {
            let moratorium = moratorium_seed % tenure;
            let rate = Decimal::new(rate_bps as i64, 2);
            let terms = match retail_terms(Money::from_minor(principal_cents), tenure, rate, moratorium, frequency) {
                Ok(terms) => terms,
                Err(err) => {
                    // only terms whose EMI cannot outrun the interest are refused
                    prop_assert_eq!(err.field(), Some("tenure"));
                    return Ok(());
                }
            };
            let schedule = AmortizationSchedule::generate(&terms).unwrap();

            prop_assert!(schedule.len() <= tenure as usize);
            prop_assert!(schedule.len() > moratorium as usize);
            for (index, installment) in schedule.installments.iter().enumerate() {
                prop_assert_eq!(installment.installment_no, index as u32 + 1);
                prop_assert_eq!(
                    installment.emi,
                    installment.principal_component + installment.interest_component
                );
                prop_assert!(!installment.remaining_principal.is_negative());
            }
            prop_assert_eq!(schedule.final_balance(), Money::ZERO);

            let repaid = schedule
                .installments
                .iter()
                .map(|i| i.principal_component)
                .fold(Money::ZERO, |acc, x| acc + x);
            prop_assert_eq!(repaid, schedule.opening_principal);

            for installment in schedule.moratorium_installments() {
                prop_assert!(installment.principal_component.is_zero());
            }
            if moratorium > 0 {
                prop_assert!(schedule.opening_principal >= terms.principal());
            }
        }

        #[test]
        fn prop_amortizing_installments_repay_principal(
            principal_cents in 100_000i64..=10_000_000_000,
            tenure in 1u32..=360,
            rate_bps in 0u32..=3600,
            frequency in frequency_strategy(),
        ) {
            let rate = Decimal::new(rate_bps as i64, 2);
            let terms = match retail_terms(Money::from_minor(principal_cents), tenure, rate, 0, frequency) {
                Ok(terms) => terms,
                Err(err) => {
                    prop_assert_eq!(err.field(), Some("tenure"));
                    return Ok(());
                }
            };
            let schedule = AmortizationSchedule::generate(&terms).unwrap();

            for installment in &schedule.installments {
                prop_assert!(installment.principal_component.is_positive());
            }
        }

        #[test]
        fn prop_zero_rate_splits_evenly(
            principal_cents in 100_000i64..1_000_000_000,
            tenure in 1u32..=120,
        ) {
            let terms = terms(Money::from_minor(principal_cents), tenure, dec!(0), 0, EmiFrequency::Monthly);
            let schedule = AmortizationSchedule::generate(&terms).unwrap();
            let even = terms.principal() / Decimal::from(tenure);

            for installment in &schedule.installments[..schedule.len() - 1] {
                prop_assert!(installment.interest_component.is_zero());
                prop_assert_eq!(installment.emi, even);
            }
        }
    }
}
