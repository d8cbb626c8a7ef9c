//! Wire types for the Turbonomic REST API

use serde::{Deserialize, Serialize};

pub const TARGET_CATEGORY_CLOUD: &str = "Cloud Management";
pub const TARGET_TYPE_AWS: &str = "AWS";

// ============================================================================
// /api/v3
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(rename = "authToken")]
    pub auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Market {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub uuid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionTarget {
    #[serde(rename = "className")]
    pub class_name: Option<String>,
    pub uuid: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stat {
    pub name: Option<String>,
    /// Number on newer builds, numeric string on older ones
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub filters: Vec<StatFilter>,
}

impl Stat {
    pub fn numeric_value(&self) -> Option<f64> {
        match self.value.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatFilter {
    #[serde(rename = "type")]
    pub filter_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Risk {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionRecord {
    pub uuid: Option<String>,
    pub details: Option<String>,
    pub target: Option<ActionTarget>,
    pub risk: Option<Risk>,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BusinessUnit {
    pub uuid: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "cloudType")]
    pub cloud_type: Option<String>,
    #[serde(rename = "hasRelatedTarget", default)]
    pub has_related_target: bool,
    #[serde(default)]
    pub targets: Vec<ActionTarget>,
}

// ============================================================================
// /vmturbo/rest
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SearchMatch {
    pub targets: Option<Vec<TargetRef>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TargetRef {
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputField {
    pub name: String,
    pub value: String,
}

/// Body of `PUT /vmturbo/rest/targets/{uuid}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetUpdate {
    pub category: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(rename = "inputFields")]
    pub input_fields: Vec<InputField>,
    pub uuid: String,
}

impl TargetUpdate {
    /// AWS keys travel under the generic `username`/`password` field names
    pub fn aws_keys(uuid: &str, keys: &AwsKeys) -> Self {
        Self {
            category: TARGET_CATEGORY_CLOUD.to_string(),
            target_type: TARGET_TYPE_AWS.to_string(),
            input_fields: vec![
                InputField {
                    name: "username".to_string(),
                    value: keys.access_key.clone(),
                },
                InputField {
                    name: "password".to_string(),
                    value: keys.secret_key.clone(),
                },
            ],
            uuid: uuid.to_string(),
        }
    }
}

/// New key pair for an AWS account target
#[derive(Clone)]
pub struct AwsKeys {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for AwsKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsKeys")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

// ============================================================================
// Results handed back to callers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSummary {
    pub target_uuid: String,
    pub target_name: String,
    pub action: String,
    pub action_uuid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SavingsKind {
    Savings,
    Investment,
}

impl SavingsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsKind::Savings => "Savings",
            SavingsKind::Investment => "Investment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudAccount {
    pub name: String,
    pub cloud_type: String,
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountActionRow {
    pub kind: Option<SavingsKind>,
    pub amount: Option<f64>,
    pub target_name: String,
    pub target_uuid: String,
    pub details: String,
    pub reason: String,
}

/// One line of an account listing, in the order the server paged it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountEntry {
    Action(AccountActionRow),
    /// Cursor position whose single-item page still failed
    Skipped { cursor: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountActions {
    pub account: CloudAccount,
    pub entries: Vec<AccountEntry>,
}

impl AccountActions {
    pub fn actions(&self) -> impl Iterator<Item = &AccountActionRow> {
        self.entries.iter().filter_map(|e| match e {
            AccountEntry::Action(row) => Some(row),
            AccountEntry::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            AccountEntry::Skipped { cursor } => Some(cursor.as_str()),
            AccountEntry::Action(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_update_field_names() {
        let keys = AwsKeys {
            access_key: "AKIA".to_string(),
            secret_key: "s3cr3t".to_string(),
        };
        let update = TargetUpdate::aws_keys("abc", &keys);
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["category"], "Cloud Management");
        assert_eq!(json["type"], "AWS");
        assert_eq!(json["uuid"], "abc");
        assert_eq!(json["inputFields"].as_array().unwrap().len(), 2);
        assert_eq!(json["inputFields"][0]["name"], "username");
        assert_eq!(json["inputFields"][0]["value"], "AKIA");
        assert_eq!(json["inputFields"][1]["name"], "password");
        assert_eq!(json["inputFields"][1]["value"], "s3cr3t");
    }

    #[test]
    fn test_aws_keys_debug_hides_secret() {
        let keys = AwsKeys {
            access_key: "AKIA".to_string(),
            secret_key: "s3cr3t".to_string(),
        };
        assert!(!format!("{:?}", keys).contains("s3cr3t"));
    }

    #[test]
    fn test_action_record_tolerates_missing_fields() {
        let record: ActionRecord = serde_json::from_str(r#"{"uuid":"a1"}"#).unwrap();
        assert_eq!(record.uuid.as_deref(), Some("a1"));
        assert!(record.target.is_none());
        assert!(record.stats.is_empty());
    }
}
