//! Raw record parsing: one provider payload entry in, one typed
//! [`WorkoutRecord`] out.
//!
//! Entries with missing required numeric fields are dropped, counted and
//! logged; they never abort the batch. Optional string metadata is
//! normalized to fixed sentinels here so every downstream consumer sees a
//! total string field.

use crate::error::{ReportError, ReportResult};
use chrono::{DateTime, FixedOffset};
use otf_client::{RawClassEntry, RawMember, WorkoutsPayload};
use regex::Regex;
use std::sync::LazyLock;

pub const NO_CLASS_TYPE: &str = "No Class Type Found";
pub const NO_COACH: &str = "NoCoach";
pub const NO_STUDIO: &str = "NoStudio";

/// Seconds spent in each of the five heart-rate zones of one class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoneSeconds {
    pub black: u32,
    pub blue: u32,
    pub green: u32,
    pub orange: u32,
    pub red: u32,
}

/// One completed class. Constructed once per parsed payload entry and
/// immutable thereafter.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutRecord {
    /// BPM samples, one per elapsed minute. `None` when the provider field
    /// was absent or did not decode as a numeric list.
    pub hr_series: Option<Vec<u32>>,
    pub zone_seconds: ZoneSeconds,
    pub splat_points: u32,
    pub calories: u32,
    pub max_hr: u32,
    pub class_date: DateTime<FixedOffset>,
    pub class_type: String,
    pub coach: String,
    pub studio_name: String,
}

/// Outcome of parsing one workouts payload: usable records plus the number
/// of entries dropped as malformed.
#[derive(Clone, Debug, Default)]
pub struct ParsedWorkouts {
    pub records: Vec<WorkoutRecord>,
    pub dropped: usize,
}

// Bracketed comma-separated numbers, optional sign and decimal part. The
// provider ships the heart-rate series as a string, and anything that does
// not match this grammar is treated as missing rather than interpreted.
static HR_SERIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\s*(?:-?\d+(?:\.\d+)?\s*(?:,\s*-?\d+(?:\.\d+)?\s*)*)?\]$")
        .expect("heart-rate grammar regex is valid")
});

/// Decode the textual heart-rate series into BPM samples.
///
/// Validates the numeric-list grammar first and only then parses the text
/// as a JSON array, so an injected expression is rejected instead of ever
/// being evaluated. Fails closed: any mismatch yields `None`.
pub fn decode_hr_series(raw: &str) -> Option<Vec<u32>> {
    let trimmed = raw.trim();
    if !HR_SERIES_RE.is_match(trimmed) {
        return None;
    }
    let values: Vec<f64> = serde_json::from_str(trimmed).ok()?;
    let mut samples = Vec::with_capacity(values.len());
    for v in values {
        if !v.is_finite() || v < 0.0 || v > f64::from(u32::MAX) {
            return None;
        }
        samples.push(v.round() as u32);
    }
    Some(samples)
}

/// Parse the provider's class timestamp. Accepts RFC3339 and the naive
/// datetime form (taken as UTC).
fn parse_class_date(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.and_utc().fixed_offset());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc().fixed_offset());
    }
    None
}

fn required<T>(value: Option<T>, field: &str) -> ReportResult<T> {
    value.ok_or_else(|| ReportError::MalformedRecord(format!("missing {field}")))
}

/// Parse one raw entry. Required numeric fields are not defaulted; a record
/// missing any of them is malformed and gets dropped by the caller.
pub fn parse_entry(entry: &RawClassEntry) -> ReportResult<WorkoutRecord> {
    let zone_seconds = ZoneSeconds {
        black: required(entry.black_zone_time_second, "blackZoneTimeSecond")?,
        blue: required(entry.blue_zone_time_second, "blueZoneTimeSecond")?,
        green: required(entry.green_zone_time_second, "greenZoneTimeSecond")?,
        orange: required(entry.orange_zone_time_second, "orangeZoneTimeSecond")?,
        red: required(entry.red_zone_time_second, "redZoneTimeSecond")?,
    };
    let raw_date = required(entry.class_date.as_deref(), "classDate")?;
    let class_date = parse_class_date(raw_date)
        .ok_or_else(|| ReportError::MalformedRecord(format!("unparsable classDate {raw_date:?}")))?;

    let hr_series = match entry.minute_by_minute_hr.as_deref() {
        Some(raw) => {
            let decoded = decode_hr_series(raw);
            if decoded.is_none() {
                tracing::warn!("heart-rate series did not decode as a numeric list, treating as missing");
            }
            decoded
        }
        None => None,
    };

    Ok(WorkoutRecord {
        hr_series,
        zone_seconds,
        splat_points: required(entry.total_splat_points, "totalSplatPoints")?,
        calories: required(entry.total_calories, "totalCalories")?,
        max_hr: required(entry.max_hr, "maxHr")?,
        class_date,
        class_type: entry
            .class_type
            .clone()
            .unwrap_or_else(|| NO_CLASS_TYPE.to_string()),
        coach: entry.coach.clone().unwrap_or_else(|| NO_COACH.to_string()),
        studio_name: entry
            .studio_name
            .clone()
            .unwrap_or_else(|| NO_STUDIO.to_string()),
    })
}

/// Parse the full workouts payload, dropping malformed entries.
pub fn parse_workouts(payload: &WorkoutsPayload) -> ParsedWorkouts {
    let mut parsed = ParsedWorkouts::default();
    for (index, entry) in payload.data.iter().enumerate() {
        match parse_entry(entry) {
            Ok(record) => parsed.records.push(record),
            Err(err) => {
                tracing::warn!(index, %err, "dropping malformed class entry");
                parsed.dropped += 1;
            }
        }
    }
    parsed
}

/// The authenticated member's lifetime counters, projected for display.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberSummary {
    pub home_studio: String,
    pub total_classes_booked: u64,
    pub total_classes_attended: u64,
    pub total_intro: u64,
    pub total_ot_live_booked: u64,
    pub total_ot_live_attended: u64,
    pub total_classes_used_hrm: u64,
    pub total_studios_visited: u64,
    pub max_hr: u32,
}

impl MemberSummary {
    pub fn from_payload(member: &RawMember) -> ReportResult<Self> {
        let studio = required(member.home_studio.as_ref(), "homeStudio")?;
        let summary = required(member.member_class_summary.as_ref(), "memberClassSummary")?;
        Ok(Self {
            home_studio: required(studio.studio_name.clone(), "homeStudio.studioName")?,
            total_classes_booked: required(summary.total_classes_booked, "totalClassesBooked")?,
            total_classes_attended: required(
                summary.total_classes_attended,
                "totalClassesAttended",
            )?,
            total_intro: required(summary.total_intro, "totalIntro")?,
            total_ot_live_booked: required(
                summary.total_ot_live_classes_booked,
                "totalOTLiveClassesBooked",
            )?,
            total_ot_live_attended: required(
                summary.total_ot_live_classes_attended,
                "totalOTLiveClassesAttended",
            )?,
            total_classes_used_hrm: required(summary.total_classes_used_hrm, "totalClassesUsedHRM")?,
            total_studios_visited: required(summary.total_studios_visited, "totalStudiosVisited")?,
            max_hr: required(member.max_hr, "maxHr")?,
        })
    }

    /// Labeled, stringified counters in display order.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Home Studio", self.home_studio.clone()),
            ("Total classes booked", self.total_classes_booked.to_string()),
            (
                "Total classes attended",
                self.total_classes_attended.to_string(),
            ),
            ("Total intro classes", self.total_intro.to_string()),
            (
                "Total OT Live classes booked",
                self.total_ot_live_booked.to_string(),
            ),
            (
                "Total OT Live classes attended",
                self.total_ot_live_attended.to_string(),
            ),
            (
                "Total classes used HRM",
                self.total_classes_used_hrm.to_string(),
            ),
            (
                "Total studios visited",
                self.total_studios_visited.to_string(),
            ),
            ("Max HR", self.max_hr.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_entry() -> RawClassEntry {
        serde_json::from_value(json!({
            "minuteByMinuteHr": "[100, 110, 120]",
            "blackZoneTimeSecond": 60,
            "blueZoneTimeSecond": 120,
            "greenZoneTimeSecond": 1500,
            "orangeZoneTimeSecond": 900,
            "redZoneTimeSecond": 300,
            "totalSplatPoints": 14,
            "totalCalories": 520,
            "maxHr": 181,
            "classDate": "2023-06-05T17:15:00+00:00",
            "classType": "Orange 60 Min 2G",
            "coach": "Alex",
            "studioName": "Downtown"
        }))
        .expect("entry")
    }

    #[test]
    fn decode_accepts_plain_integer_list() {
        assert_eq!(
            decode_hr_series("[65, 70, 80]"),
            Some(vec![65, 70, 80])
        );
        assert_eq!(decode_hr_series("[]"), Some(vec![]));
        assert_eq!(decode_hr_series(" [ 99 ] "), Some(vec![99]));
    }

    #[test]
    fn decode_rejects_injected_expression() {
        assert_eq!(decode_hr_series("__import__('os')"), None);
        assert_eq!(decode_hr_series("[1, 2, 'x']"), None);
        assert_eq!(decode_hr_series("[1+1]"), None);
        assert_eq!(decode_hr_series("null"), None);
        assert_eq!(decode_hr_series("{\"a\": 1}"), None);
    }

    #[test]
    fn decode_rejects_negative_bpm() {
        // Grammar allows a minus but a negative sample still fails closed
        assert_eq!(decode_hr_series("[100, -5]"), None);
    }

    #[test]
    fn parse_entry_builds_full_record() {
        let record = parse_entry(&full_entry()).expect("record");
        assert_eq!(record.hr_series, Some(vec![100, 110, 120]));
        assert_eq!(record.zone_seconds.red, 300);
        assert_eq!(record.splat_points, 14);
        assert_eq!(record.class_type, "Orange 60 Min 2G");
    }

    #[test]
    fn parse_entry_normalizes_sentinels() {
        let mut entry = full_entry();
        entry.class_type = None;
        entry.coach = None;
        entry.studio_name = None;
        let record = parse_entry(&entry).expect("record");
        assert_eq!(record.class_type, NO_CLASS_TYPE);
        assert_eq!(record.coach, NO_COACH);
        assert_eq!(record.studio_name, NO_STUDIO);
    }

    #[test]
    fn parse_entry_keeps_record_without_hr_series() {
        let mut entry = full_entry();
        entry.minute_by_minute_hr = None;
        let record = parse_entry(&entry).expect("record");
        assert_eq!(record.hr_series, None);

        entry.minute_by_minute_hr = Some("exec('rm -rf /')".into());
        let record = parse_entry(&entry).expect("record");
        assert_eq!(record.hr_series, None);
    }

    #[test]
    fn parse_entry_rejects_missing_required_numeric_field() {
        let mut entry = full_entry();
        entry.total_calories = None;
        let err = parse_entry(&entry).expect_err("should drop");
        assert!(matches!(err, ReportError::MalformedRecord(_)));
    }

    #[test]
    fn parse_workouts_counts_dropped_entries() {
        let good = full_entry();
        let mut bad = full_entry();
        bad.class_date = Some("not a date".into());
        let payload = WorkoutsPayload {
            data: vec![good.clone(), bad, good],
        };
        let parsed = parse_workouts(&payload);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn member_summary_projection_stringifies() {
        let member: RawMember = serde_json::from_value(json!({
            "homeStudio": {"studioName": "Downtown"},
            "memberClassSummary": {
                "totalClassesBooked": 50,
                "totalClassesAttended": 42,
                "totalIntro": 1,
                "totalOTLiveClassesBooked": 0,
                "totalOTLiveClassesAttended": 0,
                "totalClassesUsedHRM": 40,
                "totalStudiosVisited": 3
            },
            "maxHr": 190
        }))
        .expect("member");
        let summary = MemberSummary::from_payload(&member).expect("summary");
        assert_eq!(summary.total_classes_attended, 42);
        let rows = summary.display_rows();
        assert_eq!(rows[0], ("Home Studio", "Downtown".to_string()));
        assert!(rows.contains(&("Total classes attended", "42".to_string())));
    }

    #[test]
    fn member_summary_missing_counter_is_malformed() {
        let member: RawMember = serde_json::from_value(json!({
            "homeStudio": {"studioName": "Downtown"},
            "memberClassSummary": {"totalClassesBooked": 50},
            "maxHr": 190
        }))
        .expect("member");
        assert!(MemberSummary::from_payload(&member).is_err());
    }
}
