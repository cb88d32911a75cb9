//! json request/response surface of the generator
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::errors::Result;
use crate::payments::AmortizationSchedule;
use crate::types::Installment;
use crate::validation::{RawLoanTerms, TermValidator};

/// body returned for a schedule request
///
/// Serializes to a bare array of installments on success and to
/// `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleResponse {
    Schedule(Vec<Installment>),
    Error { error: String },
}

impl ScheduleResponse {
    pub fn from_result(result: Result<AmortizationSchedule>) -> Self {
        match result {
            Ok(schedule) => ScheduleResponse::Schedule(schedule.into_installments()),
            Err(err) => ScheduleResponse::Error {
                error: err.to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScheduleResponse::Error { .. })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("failed to encode schedule: {}", e) }).to_string()
        })
    }
}

/// validates requests and generates schedules under one configuration
#[derive(Debug, Clone, Default)]
pub struct ScheduleService {
    validator: TermValidator,
}

impl ScheduleService {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            validator: TermValidator::new(config),
        }
    }

    pub fn schedule(&self, raw: &RawLoanTerms) -> Result<AmortizationSchedule> {
        let terms = self.validator.validate(raw)?;
        AmortizationSchedule::generate(&terms)
    }

    /// answer one json request body
    pub fn handle(&self, body: &str) -> ScheduleResponse {
        let result = RawLoanTerms::from_json(body).and_then(|raw| self.schedule(&raw));
        ScheduleResponse::from_result(result)
    }
}

/// json in, json out, with the default configuration
pub fn generate_from_json(body: &str) -> String {
    ScheduleService::default().handle(body).to_json()
}
