//! Supervisor review of reported defects.
//!
//! Operators report defects; a supervisor then validates or rejects each
//! report exactly once.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ActorId, DefectCode, Timestamp};

/// Maximum length for a rejection reason.
pub const MAX_REJECTION_REASON_LENGTH: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Validated,
    Rejected,
}

impl ReviewStatus {
    pub fn is_decided(self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }
}

/// A defect reported from the line, awaiting or past review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectReport {
    pub garment_part_code: String,
    pub defect_type_code: DefectCode,
    pub quantity: u32,
    pub reported_by: ActorId,
    pub reported_at: Timestamp,
    pub status: ReviewStatus,
    pub reviewed_by: Option<ActorId>,
    pub reviewed_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
}

impl DefectReport {
    /// Create a pending report. Quantity must be at least one.
    pub fn new(
        garment_part_code: impl Into<String>,
        defect_type_code: DefectCode,
        quantity: u32,
        reported_by: impl Into<ActorId>,
        reported_at: Timestamp,
    ) -> Result<Self, CoreError> {
        if quantity == 0 {
            return Err(CoreError::Validation(
                "Defect quantity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            garment_part_code: garment_part_code.into(),
            defect_type_code,
            quantity,
            reported_by: reported_by.into(),
            reported_at,
            status: ReviewStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        })
    }

    /// Confirm the defect is real.
    pub fn validate(&mut self, reviewer: &str, at: Timestamp) -> Result<(), CoreError> {
        self.ensure_pending()?;
        self.status = ReviewStatus::Validated;
        self.reviewed_by = Some(reviewer.to_string());
        self.reviewed_at = Some(at);
        Ok(())
    }

    /// Reject the report. A reason is required.
    pub fn reject(&mut self, reviewer: &str, reason: &str, at: Timestamp) -> Result<(), CoreError> {
        self.ensure_pending()?;
        validate_rejection_reason(reason)?;
        self.status = ReviewStatus::Rejected;
        self.reviewed_by = Some(reviewer.to_string());
        self.reviewed_at = Some(at);
        self.rejection_reason = Some(reason.trim().to_string());
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), CoreError> {
        if self.status.is_decided() {
            return Err(CoreError::Conflict(format!(
                "Defect report already {:?}",
                self.status
            )));
        }
        Ok(())
    }
}

/// Validate a rejection reason: non-blank and at most [`MAX_REJECTION_REASON_LENGTH`].
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A rejection must include a reason".to_string(),
        ));
    }
    if reason.len() > MAX_REJECTION_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "Rejection reason exceeds maximum length of {MAX_REJECTION_REASON_LENGTH} characters"
        )));
    }
    Ok(())
}
