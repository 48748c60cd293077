use crate::domain::fields::{FieldError, FieldSpec};
use crate::domain::fire_point::FirePoint;
use crate::utils::error::{HazardsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        Self {
            data: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A typed row model built from a raw [`Record`].
pub trait DataModel: Sized {
    /// Human readable model name used in validation logs.
    const NAME: &'static str;

    fn fields() -> &'static [FieldSpec];

    fn from_record(record: &Record) -> std::result::Result<Self, FieldError>;

    /// Source column alias -> field name, for every aliased field.
    fn alias_map() -> HashMap<&'static str, &'static str> {
        Self::fields()
            .iter()
            .filter_map(|spec| {
                spec.alias
                    .filter(|alias| *alias != spec.name)
                    .map(|alias| (alias, spec.name))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub tag: String,
    pub total: usize,
    pub passed: usize,
    pub skipped: usize,
    pub pass_rate: f64,
    pub tolerance: f64,
    pub healthy: bool,
}

impl ValidationReport {
    pub fn new(tag: &str, total: usize, passed: usize, tolerance: f64) -> Self {
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };

        Self {
            tag: tag.to_string(),
            total,
            passed,
            skipped: total - passed,
            pass_rate,
            tolerance,
            healthy: total > 0 && pass_rate > 1.0 - tolerance,
        }
    }

    /// Fails with [`HazardsError::UnhealthyData`] when the data is unhealthy
    /// and `fail_on_unhealthy` is set.
    pub fn ensure_healthy(&self, fail_on_unhealthy: bool) -> Result<()> {
        if !self.healthy && fail_on_unhealthy {
            return Err(HazardsError::UnhealthyData {
                pass_rate: self.pass_rate,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }
}

/// One rendered artefact of the load phase.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub processed_records: Vec<FirePoint>,
    pub displayed_records: usize,
    pub report: Option<ValidationReport>,
    pub summary: String,
    pub outputs: Vec<OutputFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_health_follows_tolerance() {
        let report = ValidationReport::new("🔥", 100, 96, 0.05);
        assert_eq!(report.skipped, 4);
        assert!(report.healthy);

        let report = ValidationReport::new("🔥", 100, 95, 0.05);
        assert!(!report.healthy);

        let empty = ValidationReport::new("🔥", 0, 0, 0.05);
        assert_eq!(empty.pass_rate, 0.0);
        assert!(!empty.healthy);
    }

    #[test]
    fn test_ensure_healthy_gates_only_when_asked() {
        let unhealthy = ValidationReport::new("🔥", 4, 3, 0.05);
        assert!(unhealthy.ensure_healthy(false).is_ok());
        assert!(matches!(
            unhealthy.ensure_healthy(true),
            Err(HazardsError::UnhealthyData { pass_rate, .. }) if pass_rate == 0.75
        ));

        let healthy = ValidationReport::new("🔥", 4, 4, 0.05);
        assert!(healthy.ensure_healthy(true).is_ok());
    }
}
