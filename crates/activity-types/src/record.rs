//! Activity record model: the single immutable entry of the employee activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of user action. Any string is accepted at runtime; unknown values land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    View,
    Upload,
    Download,
    Scan,
    Move,
    Login,
    Logout,
    Export,
    Import,
    Assign,
    Other(String),
}

impl ActivityAction {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityAction::Create => "CREATE",
            ActivityAction::Update => "UPDATE",
            ActivityAction::Delete => "DELETE",
            ActivityAction::View => "VIEW",
            ActivityAction::Upload => "UPLOAD",
            ActivityAction::Download => "DOWNLOAD",
            ActivityAction::Scan => "SCAN",
            ActivityAction::Move => "MOVE",
            ActivityAction::Login => "LOGIN",
            ActivityAction::Logout => "LOGOUT",
            ActivityAction::Export => "EXPORT",
            ActivityAction::Import => "IMPORT",
            ActivityAction::Assign => "ASSIGN",
            ActivityAction::Other(s) => s.as_str(),
        }
    }

    /// Parse the wire string. Known names are matched exactly (upper-case).
    pub fn parse(s: &str) -> Self {
        match s {
            "CREATE" => ActivityAction::Create,
            "UPDATE" => ActivityAction::Update,
            "DELETE" => ActivityAction::Delete,
            "VIEW" => ActivityAction::View,
            "UPLOAD" => ActivityAction::Upload,
            "DOWNLOAD" => ActivityAction::Download,
            "SCAN" => ActivityAction::Scan,
            "MOVE" => ActivityAction::Move,
            "LOGIN" => ActivityAction::Login,
            "LOGOUT" => ActivityAction::Logout,
            "EXPORT" => ActivityAction::Export,
            "IMPORT" => ActivityAction::Import,
            "ASSIGN" => ActivityAction::Assign,
            other => ActivityAction::Other(other.to_string()),
        }
    }
}

impl From<String> for ActivityAction {
    fn from(s: String) -> Self {
        match ActivityAction::parse(&s) {
            ActivityAction::Other(_) => ActivityAction::Other(s),
            known => known,
        }
    }
}

impl From<ActivityAction> for String {
    fn from(action: ActivityAction) -> Self {
        match action {
            ActivityAction::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device class inferred from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ambient context captured when the record was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub user_agent: String,
    pub session_id: String,
    #[serde(default)]
    pub page_url: String,
    pub device_type: DeviceType,
    pub browser_name: String,
}

/// One immutable entry in the activity log.
///
/// The user fields are a snapshot taken at creation time; the entity fields are loose
/// references and the entity may no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub user_role: String,
    pub action: ActivityAction,
    pub section: String,
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Before/after diff; shape is left to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<serde_json::Value>,
    pub metadata: RecordMetadata,
}

impl ActivityRecord {
    /// Fields covered by free-text search, in a fixed order.
    pub fn text_fields(&self) -> [Option<&str>; 12] {
        [
            Some(self.user_name.as_str()),
            Some(self.action.as_str()),
            Some(self.section.as_str()),
            Some(self.entity_type.as_str()),
            self.entity_name.as_deref(),
            Some(self.details.as_str()),
            self.vin_number.as_deref(),
            self.part_number.as_deref(),
            self.car_model.as_deref(),
            self.car_brand.as_deref(),
            self.category.as_deref(),
            self.location.as_deref(),
        ]
    }

    /// Lower-cased concatenation of every searchable field, space separated.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = self.text_fields().into_iter().flatten().collect();
        if let Some(ref id) = self.entity_id {
            parts.push(id);
        }
        parts.push(&self.user_role);
        parts.join(" ").to_lowercase()
    }
}

/// The acting user, supplied explicitly by the caller of the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_role: String,
}

impl Actor {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_role: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_role: user_role.into(),
        }
    }
}

/// Request context the recorder cannot observe on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

/// Optional entity references and searchable facets for a new record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOptions {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub vin_number: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default)]
    pub car_brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub changes: Option<serde_json::Value>,
}

/// Everything the recorder needs besides the actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub action: ActivityAction,
    pub section: String,
    pub entity_type: String,
    pub details: String,
    #[serde(default)]
    pub options: RecordOptions,
    #[serde(default)]
    pub context: ClientContext,
}

impl ActivityDraft {
    pub fn new(
        action: ActivityAction,
        section: impl Into<String>,
        entity_type: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            action,
            section: section.into(),
            entity_type: entity_type.into(),
            details: details.into(),
            options: RecordOptions::default(),
            context: ClientContext::default(),
        }
    }

    pub fn with_options(mut self, options: RecordOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }
}
