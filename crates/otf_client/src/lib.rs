//! Minimal `OtfApi` trait, wire payload models and a reqwest-based client
//! for the Orangetheory in-studio workout endpoints.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;

#[derive(Debug, Error)]
pub enum OtfError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("upstream request failed with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("missing field in payload: {0}")]
    MissingField(String),
}

/// One in-studio class as the provider returns it. Every field is optional
/// at the wire level; normalization and validation happen downstream.
///
/// `minute_by_minute_hr` arrives as a *string* holding a bracketed list of
/// BPM samples (e.g. `"[65, 80, 120]"`), not as a JSON array.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawClassEntry {
    pub member_uu_id: Option<String>,
    pub minute_by_minute_hr: Option<String>,
    pub black_zone_time_second: Option<u32>,
    pub blue_zone_time_second: Option<u32>,
    pub green_zone_time_second: Option<u32>,
    pub orange_zone_time_second: Option<u32>,
    pub red_zone_time_second: Option<u32>,
    pub total_splat_points: Option<u32>,
    pub total_calories: Option<u32>,
    pub max_hr: Option<u32>,
    pub class_date: Option<String>,
    pub class_type: Option<String>,
    pub coach: Option<String>,
    pub studio_name: Option<String>,
}

/// Response of the in-studio workouts endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WorkoutsPayload {
    pub data: Vec<RawClassEntry>,
}

impl WorkoutsPayload {
    /// The member UUID carried on the first class entry. The member summary
    /// endpoint is keyed by it, so an empty history means no lookup.
    pub fn member_uuid(&self) -> Option<&str> {
        self.data
            .iter()
            .find_map(|entry| entry.member_uu_id.as_deref())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeStudio {
    pub studio_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberClassSummary {
    pub total_classes_booked: Option<u64>,
    pub total_classes_attended: Option<u64>,
    pub total_intro: Option<u64>,
    #[serde(rename = "totalOTLiveClassesBooked")]
    pub total_ot_live_classes_booked: Option<u64>,
    #[serde(rename = "totalOTLiveClassesAttended")]
    pub total_ot_live_classes_attended: Option<u64>,
    #[serde(rename = "totalClassesUsedHRM")]
    pub total_classes_used_hrm: Option<u64>,
    pub total_studios_visited: Option<u64>,
}

/// Lifetime member counters, `data` object of the member endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMember {
    pub home_studio: Option<HomeStudio>,
    pub member_class_summary: Option<MemberClassSummary>,
    pub max_hr: Option<u32>,
}

/// Provider API surface consumed by the report pipeline. The two data
/// fetches are sequential by nature: the member lookup needs the UUID
/// returned with the workout history.
#[async_trait]
pub trait OtfApi: Send + Sync + 'static {
    /// Run the Cognito USER_PASSWORD_AUTH handshake and return the IdToken.
    async fn authenticate(&self) -> Result<SecretString, OtfError>;

    /// Fetch the member's full in-studio workout history.
    async fn get_in_studio_workouts(
        &self,
        token: &SecretString,
    ) -> Result<WorkoutsPayload, OtfError>;

    /// Fetch the member's lifetime class summary.
    async fn get_member_summary(
        &self,
        token: &SecretString,
        member_uuid: &str,
    ) -> Result<RawMember, OtfError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_entry_deserializes_provider_keys() {
        let payload = json!({
            "memberUuId": "abc-123",
            "minuteByMinuteHr": "[65, 80, 120]",
            "blackZoneTimeSecond": 0,
            "redZoneTimeSecond": 300,
            "totalSplatPoints": 12,
            "totalCalories": 450,
            "maxHr": 182,
            "classDate": "2023-06-05T17:15:00+00:00",
            "classType": "Orange 60 Min 2G",
            "coach": "Alex",
            "studioName": "Downtown"
        });
        let entry: RawClassEntry = serde_json::from_value(payload).expect("entry");
        assert_eq!(entry.member_uu_id.as_deref(), Some("abc-123"));
        assert_eq!(entry.red_zone_time_second, Some(300));
        assert_eq!(entry.minute_by_minute_hr.as_deref(), Some("[65, 80, 120]"));
        // Absent keys stay None instead of failing the whole payload
        assert_eq!(entry.blue_zone_time_second, None);
    }

    #[test]
    fn member_uuid_comes_from_first_entry_that_has_one() {
        let payload: WorkoutsPayload = serde_json::from_value(json!({
            "data": [
                {"classType": "Orange 60"},
                {"memberUuId": "uuid-1"},
                {"memberUuId": "uuid-2"}
            ]
        }))
        .expect("payload");
        assert_eq!(payload.member_uuid(), Some("uuid-1"));
    }

    #[test]
    fn member_summary_handles_hrm_and_otlive_casing() {
        let member: RawMember = serde_json::from_value(json!({
            "homeStudio": {"studioName": "Downtown"},
            "memberClassSummary": {
                "totalClassesAttended": 42,
                "totalOTLiveClassesBooked": 3,
                "totalClassesUsedHRM": 40
            },
            "maxHr": 190
        }))
        .expect("member");
        let summary = member.member_class_summary.expect("summary");
        assert_eq!(summary.total_classes_attended, Some(42));
        assert_eq!(summary.total_ot_live_classes_booked, Some(3));
        assert_eq!(summary.total_classes_used_hrm, Some(40));
    }
}
