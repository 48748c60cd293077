use crate::domain::fire_point::FirePoint;
use crate::visuals::maps::format_count;
use chrono::NaiveDate;

/// Earliest and latest report date among dated fires.
pub fn report_date_window(fires: &[FirePoint]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = fires.iter().filter_map(|fire| fire.report_date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), date| (lo.min(date), hi.max(date))))
}

/// Picks the cut-off date: the requested one clamped into the window, or the
/// window start when nothing was requested.
pub fn resolve_since(
    requested: Option<NaiveDate>,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Option<NaiveDate> {
    match (requested, window) {
        (Some(date), Some((lo, hi))) => Some(date.clamp(lo, hi)),
        (Some(date), None) => Some(date),
        (None, Some((lo, _))) => Some(lo),
        (None, None) => None,
    }
}

/// Fires reported on or after `since`; undated fires never match a cut-off.
pub fn filter_since(fires: &[FirePoint], since: Option<NaiveDate>) -> Vec<&FirePoint> {
    match since {
        Some(since) => fires
            .iter()
            .filter(|fire| fire.report_date.is_some_and(|date| date >= since))
            .collect(),
        None => fires.iter().collect(),
    }
}

pub fn summary_line(count: usize, since: Option<NaiveDate>) -> String {
    match since {
        Some(since) => format!(
            "Showing {} fires reported since {}",
            format_count(count),
            since.format("%A %d %B %Y")
        ),
        None => format!("Showing {} fires", format_count(count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DataModel, Record};
    use serde_json::json;

    fn fire(report_date: &str) -> FirePoint {
        FirePoint::from_record(&Record::from_pairs([
            ("YEAR", json!(2020)),
            ("MONTH", json!(1)),
            ("REP_DATE", json!(report_date)),
            ("LATITUDE", json!(48.0)),
            ("LONGITUDE", json!(-70.0)),
        ]))
        .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_ignores_undated() {
        let fires = vec![fire("2019/03/01"), fire(""), fire("2021/08/15"), fire("2020/01/01")];
        assert_eq!(report_date_window(&fires), Some((ymd(2019, 3, 1), ymd(2021, 8, 15))));
        assert_eq!(report_date_window(&[fire("0000/00/00")]), None);
    }

    #[test]
    fn test_resolve_since_clamps() {
        let window = Some((ymd(2019, 3, 1), ymd(2021, 8, 15)));
        assert_eq!(resolve_since(Some(ymd(2020, 1, 1)), window), Some(ymd(2020, 1, 1)));
        assert_eq!(resolve_since(Some(ymd(1990, 1, 1)), window), Some(ymd(2019, 3, 1)));
        assert_eq!(resolve_since(Some(ymd(2030, 1, 1)), window), Some(ymd(2021, 8, 15)));
        assert_eq!(resolve_since(None, window), Some(ymd(2019, 3, 1)));
        assert_eq!(resolve_since(None, None), None);
    }

    #[test]
    fn test_filter_since_excludes_earlier_and_undated() {
        let fires = vec![fire("2019/12/31"), fire("2020/01/01"), fire(""), fire("2021/05/05")];

        let shown = filter_since(&fires, Some(ymd(2020, 1, 1)));
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|f| f.report_date >= Some(ymd(2020, 1, 1))));

        assert_eq!(filter_since(&fires, None).len(), 4);
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(12_345, Some(ymd(2020, 1, 1))),
            "Showing 12,345 fires reported since Wednesday 01 January 2020"
        );
        assert_eq!(summary_line(3, None), "Showing 3 fires");
    }
}
