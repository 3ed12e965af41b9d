//! Patient input record for segmentation inference

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Inclusive age bounds accepted by the form and by validation.
pub const AGE_RANGE: (i64, i64) = (0, 120);
/// Inclusive hospital-stay bounds, in days.
pub const STAY_RANGE: (i64, i64) = (0, 365);
/// Inclusive billing-amount bounds, in dollars.
pub const BILLING_RANGE: (f64, f64) = (0.0, 100_000.0);

/// Admission type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionType {
    #[serde(rename = "ICU")]
    Icu,
    #[serde(rename = "ER")]
    Er,
    #[serde(rename = "OP")]
    Op,
}

impl AdmissionType {
    /// Fixed-order indicator bits: ICU -> (1,0,0), ER -> (0,1,0), OP -> (0,0,1)
    pub fn one_hot(&self) -> [f32; 3] {
        match self {
            AdmissionType::Icu => [1.0, 0.0, 0.0],
            AdmissionType::Er => [0.0, 1.0, 0.0],
            AdmissionType::Op => [0.0, 0.0, 1.0],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionType::Icu => "ICU",
            AdmissionType::Er => "ER",
            AdmissionType::Op => "OP",
        }
    }
}

/// Lab test result category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestResult {
    Positive,
    Negative,
}

impl TestResult {
    /// Single indicator bit: Positive -> 1, Negative -> 0
    pub fn indicator(&self) -> f32 {
        match self {
            TestResult::Positive => 1.0,
            TestResult::Negative => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestResult::Positive => "Positive",
            TestResult::Negative => "Negative",
        }
    }
}

/// One patient's raw parameters as captured from the form.
///
/// Constructed fresh per Predict action, validated before inference,
/// and discarded once the response is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in years
    pub age: i64,

    /// Hospital stay in days
    pub stay_days: i64,

    /// Billing amount in dollars
    pub billing_amount: f64,

    /// Admission type
    pub admission: AdmissionType,

    /// Lab test result
    pub test_result: TestResult,
}

impl PatientRecord {
    pub fn new(
        age: i64,
        stay_days: i64,
        billing_amount: f64,
        admission: AdmissionType,
        test_result: TestResult,
    ) -> Self {
        Self {
            age,
            stay_days,
            billing_amount,
            admission,
            test_result,
        }
    }

    /// Check all fields against the form bounds.
    ///
    /// Runs before inference; a record that fails here never reaches the
    /// artifacts.
    pub fn validate(&self) -> Result<()> {
        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            return Err(Error::InvalidInput(format!(
                "age {} outside [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            )));
        }
        if !(STAY_RANGE.0..=STAY_RANGE.1).contains(&self.stay_days) {
            return Err(Error::InvalidInput(format!(
                "stay_days {} outside [{}, {}]",
                self.stay_days, STAY_RANGE.0, STAY_RANGE.1
            )));
        }
        if !self.billing_amount.is_finite() {
            return Err(Error::InvalidInput(
                "billing_amount is not a finite number".to_string(),
            ));
        }
        if self.billing_amount < BILLING_RANGE.0 || self.billing_amount > BILLING_RANGE.1 {
            return Err(Error::InvalidInput(format!(
                "billing_amount {} outside [{}, {}]",
                self.billing_amount, BILLING_RANGE.0, BILLING_RANGE.1
            )));
        }
        Ok(())
    }
}
