use crate::domain::fields::{
    self, optional_date, optional_float, optional_int, optional_string, required_float,
    required_int, FieldError, FieldSpec,
};
use crate::domain::model::{DataModel, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const NFDB_FIRE_ID: FieldSpec = FieldSpec::aliased("nfdb_fire_id", "NFDBFIREID");
const FIRE_ID: FieldSpec = FieldSpec::aliased("fire_id", "FIRE_ID");
const FIRE_NAME: FieldSpec = FieldSpec::aliased("fire_name", "FIRENAME");
const SRC_AGENCY: FieldSpec = FieldSpec::aliased("src_agency", "SRC_AGENCY");
const AGENCY_RESPONSE: FieldSpec = FieldSpec::aliased("agency_response", "RESPONSE");
const YEAR: FieldSpec = FieldSpec::aliased("year", "YEAR");
const MONTH: FieldSpec = FieldSpec::aliased("month", "MONTH");
const DAY: FieldSpec = FieldSpec::aliased("day", "DAY");
const IGNITION_DATE: FieldSpec = FieldSpec::aliased("ignition_date", "ATTK_DATE");
const REPORT_DATE: FieldSpec = FieldSpec::aliased("report_date", "REP_DATE");
const OUT_DATE: FieldSpec = FieldSpec::aliased("out_date", "OUT_DATE");
const ACQ_DATE: FieldSpec = FieldSpec::aliased("acq_date", "ACQ_DATE");
const CAUSE_PRIMARY: FieldSpec = FieldSpec::aliased("cause_primary", "CAUSE");
const CAUSE_SECONDARY: FieldSpec = FieldSpec::aliased("cause_secondary", "CAUSE2");
const FIRE_TYPE: FieldSpec = FieldSpec::aliased("fire_type", "FIRE_TYPE");
const SIZE_HA: FieldSpec = FieldSpec::aliased("size_ha", "SIZE_HA");
const PRESCRIBED: FieldSpec = FieldSpec::aliased("prescribed", "PRESCRIBED");
const NATIONAL_PARK: FieldSpec = FieldSpec::aliased("national_park", "NAT_PARK");
const PROTECTION_ZONE: FieldSpec = FieldSpec::aliased("protection_zone", "PROTZONE");
const MORE_INFO: FieldSpec = FieldSpec::aliased("more_info", "MORE_INFO");
const NOTE1: FieldSpec = FieldSpec::aliased("note1", "CFS_NOTE1");
const NOTE2: FieldSpec = FieldSpec::aliased("note2", "CFS_NOTE2");
const LATITUDE: FieldSpec = FieldSpec::aliased("latitude", "LATITUDE");
const LONGITUDE: FieldSpec = FieldSpec::aliased("longitude", "LONGITUDE");
const LOCATION: FieldSpec = FieldSpec::plain("location");

static FIELDS: [FieldSpec; 25] = [
    NFDB_FIRE_ID,
    FIRE_ID,
    FIRE_NAME,
    SRC_AGENCY,
    AGENCY_RESPONSE,
    YEAR,
    MONTH,
    DAY,
    IGNITION_DATE,
    REPORT_DATE,
    OUT_DATE,
    ACQ_DATE,
    CAUSE_PRIMARY,
    CAUSE_SECONDARY,
    FIRE_TYPE,
    SIZE_HA,
    PRESCRIBED,
    NATIONAL_PARK,
    PROTECTION_ZONE,
    MORE_INFO,
    NOTE1,
    NOTE2,
    LATITUDE,
    LONGITUDE,
    LOCATION,
];

/// A fire point from the Canadian National Fire Database (NFDB).
///
/// The NFDB is a collection of forest fire locations provided by Canadian
/// fire management agencies (provinces, territories and Parks Canada),
/// covering 1959 onwards and refreshed annually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirePoint {
    /// NFDB unique identifier
    pub nfdb_fire_id: Option<String>,
    /// Local fire ID
    pub fire_id: Option<String>,
    pub fire_name: Option<String>,
    /// Agency (province, territory, parks) the record was obtained from
    pub src_agency: Option<String>,
    /// Response type: FUL (full), MOD (modified), MON (monitored), or an
    /// agency specific value
    pub agency_response: Option<String>,
    /// Calendar year derived from the report date; -999 means unknown
    pub year: i32,
    pub month: i32,
    pub day: Option<i32>,
    /// Date fire attack began
    pub ignition_date: Option<NaiveDate>,
    pub report_date: Option<NaiveDate>,
    /// Date the fire was declared out
    pub out_date: Option<NaiveDate>,
    /// Date the data was acquired
    pub acq_date: Option<NaiveDate>,
    /// N (natural/lightning), H (human), H-PB (human prescribed burn) or
    /// U (unknown)
    pub cause_primary: Option<String>,
    pub cause_secondary: Option<String>,
    pub fire_type: Option<String>,
    pub size_ha: Option<f64>,
    pub prescribed: Option<bool>,
    pub national_park: Option<String>,
    /// Agency protection zone, no national standard applies
    pub protection_zone: Option<String>,
    pub more_info: Option<String>,
    pub note1: Option<String>,
    pub note2: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// (latitude, longitude)
    pub location: (f64, f64),
}

impl FirePoint {
    pub const CSV_HEADERS: [&'static str; 24] = [
        "nfdb_fire_id",
        "fire_id",
        "fire_name",
        "src_agency",
        "agency_response",
        "year",
        "month",
        "day",
        "ignition_date",
        "report_date",
        "out_date",
        "acq_date",
        "cause_primary",
        "cause_secondary",
        "fire_type",
        "size_ha",
        "prescribed",
        "national_park",
        "protection_zone",
        "more_info",
        "note1",
        "note2",
        "latitude",
        "longitude",
    ];

    pub fn to_csv_row(&self) -> Vec<String> {
        fn text(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        vec![
            text(&self.nfdb_fire_id),
            text(&self.fire_id),
            text(&self.fire_name),
            text(&self.src_agency),
            text(&self.agency_response),
            self.year.to_string(),
            self.month.to_string(),
            opt(&self.day),
            opt(&self.ignition_date),
            opt(&self.report_date),
            opt(&self.out_date),
            opt(&self.acq_date),
            text(&self.cause_primary),
            text(&self.cause_secondary),
            text(&self.fire_type),
            opt(&self.size_ha),
            opt(&self.prescribed),
            text(&self.national_park),
            text(&self.protection_zone),
            text(&self.more_info),
            text(&self.note1),
            text(&self.note2),
            self.latitude.to_string(),
            self.longitude.to_string(),
        ]
    }
}

impl DataModel for FirePoint {
    const NAME: &'static str = "FirePoint";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn from_record(record: &Record) -> Result<Self, FieldError> {
        let latitude = required_float(record, &LATITUDE)?;
        let longitude = required_float(record, &LONGITUDE)?;

        Ok(Self {
            nfdb_fire_id: optional_string(record, &NFDB_FIRE_ID),
            fire_id: optional_string(record, &FIRE_ID),
            fire_name: optional_string(record, &FIRE_NAME),
            src_agency: optional_string(record, &SRC_AGENCY),
            agency_response: optional_string(record, &AGENCY_RESPONSE),
            year: required_int(record, &YEAR)?,
            month: required_int(record, &MONTH)?,
            day: optional_int(record, &DAY)?,
            ignition_date: optional_date(record, &IGNITION_DATE),
            report_date: optional_date(record, &REPORT_DATE),
            out_date: optional_date(record, &OUT_DATE),
            acq_date: optional_date(record, &ACQ_DATE),
            cause_primary: optional_string(record, &CAUSE_PRIMARY),
            cause_secondary: optional_string(record, &CAUSE_SECONDARY),
            fire_type: optional_string(record, &FIRE_TYPE),
            size_ha: optional_float(record, &SIZE_HA)?,
            prescribed: fields::prescribed_flag(fields::lookup(record, &PRESCRIBED)),
            national_park: optional_string(record, &NATIONAL_PARK),
            protection_zone: optional_string(record, &PROTECTION_ZONE),
            more_info: optional_string(record, &MORE_INFO),
            note1: optional_string(record, &NOTE1),
            note2: optional_string(record, &NOTE2),
            latitude,
            longitude,
            location: (latitude, longitude),
        })
    }
}

impl fmt::Display for FirePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let when = match self.ignition_date {
            Some(date) => date.to_string(),
            None => format!("{}-{:02}", self.year, self.month),
        };
        write!(
            f,
            "🔥 {} on {} — {:.1} ha",
            self.fire_id.as_deref().unwrap_or("N/A"),
            when,
            self.size_ha.unwrap_or(0.0)
        )
    }
}
