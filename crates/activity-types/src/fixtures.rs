//! Record builders for tests: fixed metadata, no clock or randomness.

use crate::{ActivityAction, ActivityRecord, DeviceType, RecordMetadata};
use chrono::{DateTime, Utc};

/// A minimal desktop record for `user_id` in `section` at `timestamp`.
pub fn record_at(
    id: &str,
    user_id: &str,
    section: &str,
    timestamp: DateTime<Utc>,
) -> ActivityRecord {
    ActivityRecord {
        id: id.to_string(),
        timestamp,
        user_id: user_id.to_string(),
        user_name: user_id.to_string(),
        user_role: "staff".to_string(),
        action: ActivityAction::View,
        section: section.to_string(),
        entity_type: "car".to_string(),
        entity_id: None,
        entity_name: None,
        details: String::new(),
        vin_number: None,
        part_number: None,
        car_model: None,
        car_brand: None,
        category: None,
        location: None,
        changes: None,
        metadata: RecordMetadata {
            user_agent: "fixture".to_string(),
            session_id: "fixture-session".to_string(),
            page_url: String::new(),
            device_type: DeviceType::Desktop,
            browser_name: "Unknown".to_string(),
        },
    }
}
