//! Inputs and scores of the exercise decision model.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::GrantType;
use crate::calculations::common::round_ratio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStage {
    Early,
    Growth,
    Late,
}

impl CompanyStage {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "early" | "seed" => Some(Self::Early),
            "growth" => Some(Self::Growth),
            "late" | "pre-ipo" => Some(Self::Late),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInputs {
    pub strike_price: Decimal,
    pub vested_shares: u64,
    pub available_cash: Decimal,
    pub current_income: Decimal,
    pub company_stage: CompanyStage,

    /// Expected annual growth, as a fraction (`0.25` is 25%).
    pub growth_rate: Decimal,
    pub option_type: GrantType,

    /// Two-letter state code.
    pub state: String,
    pub years_to_expiration: Decimal,
}

/// Four independent scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionFactors {
    pub financial_capacity: Decimal,
    pub company_outlook: Decimal,
    pub tax_efficiency: Decimal,

    /// Urgency: higher as expiration approaches.
    pub timing: Decimal,
}

const CAPACITY_WEIGHT: Decimal = dec!(0.3);
const OUTLOOK_WEIGHT: Decimal = dec!(0.3);
const TAX_WEIGHT: Decimal = dec!(0.2);
const TIMING_WEIGHT: Decimal = dec!(0.2);

impl DecisionFactors {
    /// Weighted mean of the four scores.
    ///
    /// | Factor             | Weight |
    /// |--------------------|--------|
    /// | financial capacity | 0.3    |
    /// | company outlook    | 0.3    |
    /// | tax efficiency     | 0.2    |
    /// | timing             | 0.2    |
    pub fn overall_score(&self) -> Decimal {
        round_ratio(
            self.financial_capacity * CAPACITY_WEIGHT
                + self.company_outlook * OUTLOOK_WEIGHT
                + self.tax_efficiency * TAX_WEIGHT
                + self.timing * TIMING_WEIGHT,
        )
    }

    /// `ExerciseNow` at an overall score of 0.7 or more, `ExercisePartially`
    /// from 0.4, otherwise `Wait`.
    pub fn recommendation(&self) -> Recommendation {
        let score = self.overall_score();
        if score >= dec!(0.7) {
            Recommendation::ExerciseNow
        } else if score >= dec!(0.4) {
            Recommendation::ExercisePartially
        } else {
            Recommendation::Wait
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ExerciseNow,
    ExercisePartially,
    Wait,
}

impl fmt::Display for Recommendation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            Self::ExerciseNow => "exercise now",
            Self::ExercisePartially => "exercise partially",
            Self::Wait => "wait",
        };
        f.write_str(text)
    }
}
