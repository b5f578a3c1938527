//! Availability schedules.

use serde::{Deserialize, Serialize};

/// An availability schedule configured on the account.
///
/// Schedules are published alongside bookings but take no part in
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Provider identifier.
    pub id: i64,
    /// Schedule name.
    #[serde(default)]
    pub name: String,
    /// IANA timezone of the schedule.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Whether this is the account's default schedule.
    #[serde(default)]
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_shape_and_ignores_extra_fields() {
        let json = r#"{
            "id": 212,
            "ownerId": 9,
            "name": "Working hours",
            "timeZone": "Europe/Berlin",
            "isDefault": true,
            "availability": []
        }"#;

        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.id, 212);
        assert_eq!(schedule.name, "Working hours");
        assert_eq!(schedule.time_zone.as_deref(), Some("Europe/Berlin"));
        assert!(schedule.is_default);
    }

    #[test]
    fn optional_fields_default() {
        let schedule: Schedule = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(schedule.name.is_empty());
        assert!(schedule.time_zone.is_none());
        assert!(!schedule.is_default);
    }
}
