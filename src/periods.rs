use chrono::{Months, NaiveDate};
use std::iter::FusedIterator;

use crate::types::{EmiFrequency, LoanTerms};

/// due dates of a schedule, one per frequency unit after disbursement
///
/// The k-th date is always computed from the disbursement date itself
/// (disbursement + k units), never by chaining from the previous due date.
/// A day that does not exist in the target month clamps to that month's
/// last day, so a loan disbursed on Jan 31 falls due on Feb 28/29, Mar 31,
/// Apr 30 and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSequencer {
    start: NaiveDate,
    frequency: EmiFrequency,
    periods: u32,
}

impl PeriodSequencer {
    pub fn new(start: NaiveDate, frequency: EmiFrequency, periods: u32) -> Self {
        Self {
            start,
            frequency,
            periods,
        }
    }

    /// sequence covering every installment of the loan
    pub fn for_terms(terms: &LoanTerms) -> Self {
        Self::new(
            terms.disbursement_date(),
            terms.emi_frequency(),
            terms.tenure(),
        )
    }

    pub fn len(&self) -> u32 {
        self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.periods == 0
    }

    /// k-th due date (1-based); `None` if k is out of range or past the calendar
    pub fn due_date(&self, k: u32) -> Option<NaiveDate> {
        if k == 0 || k > self.periods {
            return None;
        }
        let months = self.frequency.months().checked_mul(k)?;
        self.start.checked_add_months(Months::new(months))
    }

    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.due_date(self.periods)
    }

    /// how many due dates fit in the calendar, at most `len()`
    pub fn representable(&self) -> u32 {
        if self.last_due_date().is_some() {
            return self.periods;
        }
        // dates only grow with k, so the representable ones form a prefix
        let (mut low, mut high) = (0, self.periods);
        while low < high {
            let mid = high - (high - low) / 2;
            if self.due_date(mid).is_some() {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        low
    }

    /// fresh iterator from the first due date; can be called any number of times
    pub fn iter(&self) -> DueDates {
        DueDates {
            sequencer: *self,
            next: 1,
            end: self.representable(),
        }
    }
}

impl IntoIterator for &PeriodSequencer {
    type Item = NaiveDate;
    type IntoIter = DueDates;

    fn into_iter(self) -> DueDates {
        self.iter()
    }
}

/// lazy iterator over the due dates of a [`PeriodSequencer`]
#[derive(Debug, Clone)]
pub struct DueDates {
    sequencer: PeriodSequencer,
    next: u32,
    /// last k with a representable date
    end: u32,
}

impl Iterator for DueDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.next > self.end {
            return None;
        }
        let date = self.sequencer.due_date(self.next)?;
        self.next += 1;
        Some(date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end + 1).saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DueDates {}

impl FusedIterator for DueDates {}
