use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};

/// a quadrillion in major units
const DEFAULT_MAX_PRINCIPAL: i64 = 1_000_000_000_000_000;

/// generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub limits: TermLimits,
}

/// upper bounds enforced on top of the domain invariants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermLimits {
    /// largest principal accepted, `None` for no cap below [`Money::MAX`]
    pub max_principal: Option<Money>,
    /// most installments in one schedule, moratorium included
    pub max_tenure: u32,
    /// highest annual nominal rate, in percent
    pub max_interest_rate: Decimal,
}

impl Default for TermLimits {
    fn default() -> Self {
        Self {
            max_principal: Some(Money::from_major(DEFAULT_MAX_PRINCIPAL)),
            max_tenure: 1200,
            max_interest_rate: dec!(100),
        }
    }
}

impl ScheduleConfig {
    /// limits suited to consumer lending: 30 years of monthly installments, 36% cap
    pub fn retail() -> Self {
        Self {
            limits: TermLimits {
                max_principal: Some(Money::from_major(100_000_000)),
                max_tenure: 360,
                max_interest_rate: dec!(36),
            },
        }
    }

    /// load from a json document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScheduleConfig =
            serde_json::from_str(json).map_err(|e| ScheduleError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.max_tenure == 0 {
            return Err(ScheduleError::InvalidConfiguration {
                message: "max_tenure must be at least 1".to_string(),
            });
        }
        if self.limits.max_interest_rate.is_sign_negative() {
            return Err(ScheduleError::InvalidConfiguration {
                message: "max_interest_rate must not be negative".to_string(),
            });
        }
        if let Some(cap) = self.limits.max_principal {
            if !cap.is_positive() {
                return Err(ScheduleError::InvalidConfiguration {
                    message: format!("max_principal must be positive, got {}", cap),
                });
            }
            if cap > Money::MAX {
                return Err(ScheduleError::InvalidConfiguration {
                    message: format!("max_principal must not exceed {}, got {}", Money::MAX, cap),
                });
            }
        }
        Ok(())
    }
}
