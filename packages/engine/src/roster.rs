//! Read-only projections of projects and engineers
//!
//! The evaluator only consumes the handful of attributes declared here; the
//! caller builds these snapshots from its own profile and project stores.

use crate::config;
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Building project snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Total floor area in square meters
    pub total_area: f64,
}

impl Project {
    pub fn new(total_area: f64) -> Self {
        Self { total_area }
    }

    /// Number of engineers needed when each one covers `meterage` square meters.
    ///
    /// Non-positive or non-finite quotients yield zero.
    pub fn required_count(&self, meterage: f64) -> usize {
        let quota = (self.total_area / meterage).ceil();
        if quota.is_finite() && quota > 0.0 {
            quota as usize
        } else {
            0
        }
    }
}

/// One license held by an engineer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineerLicense {
    /// Discipline code, matched against engineer item ids
    pub license_type: String,
    pub license_level: String,
    pub status: String,
    pub expiry_date: NaiveDate,
}

impl EngineerLicense {
    /// A license is active when its status is active and it has not expired
    /// before `on`.
    pub fn is_active(&self, on: NaiveDate) -> bool {
        self.status == config::ACTIVE_LICENSE_STATUS && self.expiry_date >= on
    }
}

/// Candidate engineer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engineer {
    pub id: String,
    #[serde(default)]
    pub licenses: Vec<EngineerLicense>,
}

impl Engineer {
    pub fn new(id: impl Into<String>, licenses: Vec<EngineerLicense>) -> Self {
        Self {
            id: id.into(),
            licenses,
        }
    }

    /// Whether the engineer holds an active license for `discipline` at one of
    /// the `accepted` levels.
    pub fn qualifies_for(
        &self,
        discipline: &str,
        accepted: &HashSet<String>,
        on: NaiveDate,
    ) -> bool {
        self.licenses.iter().any(|license| {
            license.license_type == discipline
                && accepted.contains(&license.license_level)
                && license.is_active(on)
        })
    }
}

/// Parse an evaluation date in `YYYY-MM-DD` form.
pub fn parse_evaluation_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidDate(format!("{}: {}", value, e)))
}
