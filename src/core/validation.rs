use crate::domain::model::{DataModel, Record, ValidationReport};

/// Validates every row against `M`, skipping rows that do not conform.
///
/// The data is considered healthy when the pass rate exceeds
/// `1 - tolerance`. An unhealthy state is only logged; gate on
/// [`ValidationReport::healthy`].
pub fn validate_records<M: DataModel>(
    records: &[Record],
    tolerance: f64,
    tag: &str,
) -> (Vec<M>, ValidationReport) {
    let mut validated = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        match M::from_record(record) {
            Ok(instance) => validated.push(instance),
            Err(e) => {
                tracing::warn!("⚠️ Validation error (row {}): {}", idx, e);
                tracing::debug!("Rejected row {}: {:?}", idx, record.data);
            }
        }
    }

    let report = ValidationReport::new(tag, records.len(), validated.len(), tolerance);

    if report.passed > 0 {
        tracing::info!("{}\t✅ {} records passed validation.", tag, report.passed);
    }
    if report.skipped > 0 {
        tracing::warn!(
            "{}\t⚠ {} samples did not conform to expectations and were skipped.",
            tag,
            report.skipped
        );
    }

    if report.healthy {
        tracing::info!(
            "{}\t🌏 Healthy data state ({:.0}%) success.",
            tag,
            report.pass_rate * 100.0
        );
    } else {
        tracing::error!(
            "{}\t🚨 {:.0}% of rows conformed to the {} data model.",
            tag,
            report.pass_rate * 100.0,
            M::NAME
        );
    }

    (validated, report)
}

/// Converts rows without health accounting; rows that cannot be represented
/// by `M` are dropped.
pub fn coerce_records<M: DataModel>(records: &[Record]) -> Vec<M> {
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| match M::from_record(record) {
            Ok(instance) => Some(instance),
            Err(e) => {
                tracing::debug!("Dropping row {} without validation: {}", idx, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fire_point::FirePoint;
    use serde_json::json;

    fn fire(year: serde_json::Value, latitude: serde_json::Value) -> Record {
        Record::from_pairs([
            ("YEAR", year),
            ("MONTH", json!("5")),
            ("LATITUDE", latitude),
            ("LONGITUDE", json!("-71.0")),
        ])
    }

    #[test]
    fn test_all_valid_rows_are_healthy() {
        let records = vec![fire(json!("2001"), json!("49.0")), fire(json!("2002"), json!("50.0"))];

        let (fires, report) = validate_records::<FirePoint>(&records, 0.05, "🔥");

        assert_eq!(fires.len(), 2);
        assert_eq!(report.pass_rate, 1.0);
        assert_eq!(report.skipped, 0);
        assert!(report.healthy);
    }

    #[test]
    fn test_invalid_rows_are_skipped_and_counted() {
        let records = vec![
            fire(json!("2001"), json!("49.0")),
            fire(json!(""), json!("49.5")),
            fire(json!("2003"), json!("")),
            fire(json!("2004"), json!("north")),
        ];

        let (fires, report) = validate_records::<FirePoint>(&records, 0.05, "🔥");

        assert_eq!(fires.len(), 1);
        assert_eq!(report.total, 4);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.pass_rate, 0.25);
        assert!(!report.healthy);
    }

    #[test]
    fn test_tolerance_controls_health() {
        let mut records: Vec<Record> = (0..9).map(|_| fire(json!("2001"), json!("49.0"))).collect();
        records.push(fire(json!("bad"), json!("49.0")));

        let (_, strict) = validate_records::<FirePoint>(&records, 0.05, "🔥");
        assert!(!strict.healthy);

        let (_, lenient) = validate_records::<FirePoint>(&records, 0.2, "🔥");
        assert!(lenient.healthy);
    }

    #[test]
    fn test_empty_input_is_unhealthy() {
        let (fires, report) = validate_records::<FirePoint>(&[], 0.05, "🔥");
        assert!(fires.is_empty());
        assert_eq!(report.pass_rate, 0.0);
        assert!(!report.healthy);
    }

    #[test]
    fn test_coerce_drops_unconvertible_rows() {
        let records = vec![fire(json!("2001"), json!("49.0")), fire(json!("2001"), json!(""))];
        let fires: Vec<FirePoint> = coerce_records(&records);
        assert_eq!(fires.len(), 1);
    }
}
