use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One unit of collected host inventory data.
///
/// An item is produced by a gatherer, admitted (or dropped) by the size
/// guard, and handed to the uploader. It is immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Inventory type tag (e.g., `"Host:Network"`, `"Custom:licenses"`).
    pub name: String,
    /// Schema version of the serialized payload.
    pub schema_version: String,
    /// Serialized payload. Opaque to the core; each gatherer defines its own
    /// content format.
    pub content: String,
    /// When the gatherer captured this data.
    pub captured_at: DateTime<Utc>,
}

impl Item {
    /// Payload size as counted by the upload size guard.
    ///
    /// The ceiling applies to the serialized content; the type tag and
    /// schema version are fixed per-item overhead the backend does not
    /// meter.
    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}

/// Whether a gatherer is enabled for collection by the operator policy.
///
/// # Examples
///
/// ```
/// use inven_common::types::CollectionState;
///
/// let state: CollectionState = "Enabled".parse().unwrap();
/// assert_eq!(state, CollectionState::Enabled);
/// assert_eq!(state.to_string(), "enabled");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionState {
    #[serde(alias = "Enabled")]
    Enabled,
    #[serde(alias = "Disabled")]
    Disabled,
}

impl Default for CollectionState {
    fn default() -> Self {
        CollectionState::Disabled
    }
}

impl std::fmt::Display for CollectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionState::Enabled => write!(f, "enabled"),
            CollectionState::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for CollectionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enabled" => Ok(CollectionState::Enabled),
            "disabled" => Ok(CollectionState::Disabled),
            _ => Err(format!("unknown collection state: {s}")),
        }
    }
}

/// Per-gatherer settings from the operator policy.
///
/// `collection` is the only field the core interprets; `filters` and
/// `location` are passed through to the gatherer unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GathererConfig {
    #[serde(default)]
    pub collection: CollectionState,
    /// Gatherer-specific filter expression (e.g., a package name prefix).
    #[serde(default)]
    pub filters: Option<String>,
    /// Gatherer-specific source location (e.g., a custom inventory directory).
    #[serde(default)]
    pub location: Option<String>,
}

impl GathererConfig {
    pub fn enabled() -> Self {
        Self {
            collection: CollectionState::Enabled,
            ..Self::default()
        }
    }
}

/// Operator-declared collection configuration for one run.
///
/// Maps gatherer name to its [`GathererConfig`]. Keys are unique and
/// insertion order is irrelevant. The document is parsed by an external
/// loader; semantic validation against the capability sets is the core's
/// job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub gatherers: HashMap<String, GathererConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn collection_state_parse_and_display() {
        assert_eq!(
            "Enabled".parse::<CollectionState>().unwrap(),
            CollectionState::Enabled
        );
        assert_eq!(
            "disabled".parse::<CollectionState>().unwrap(),
            CollectionState::Disabled
        );
        assert!("sometimes".parse::<CollectionState>().is_err());
        assert_eq!(CollectionState::Enabled.to_string(), "enabled");
    }

    #[test]
    fn policy_deserializes_operator_document() {
        let doc = r#"{
            "gatherers": {
                "os": { "collection": "Enabled" },
                "application": { "collection": "enabled", "filters": "lib" },
                "custom": { "collection": "disabled", "location": "/var/lib/inven/custom" }
            }
        }"#;
        let policy: Policy = serde_json::from_str(doc).unwrap();
        assert_eq!(policy.gatherers.len(), 3);
        assert_eq!(
            policy.gatherers["os"].collection,
            CollectionState::Enabled
        );
        assert_eq!(policy.gatherers["application"].filters.as_deref(), Some("lib"));
        assert_eq!(
            policy.gatherers["custom"].collection,
            CollectionState::Disabled
        );
    }

    #[test]
    fn config_collection_defaults_to_disabled() {
        let config: GathererConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.collection, CollectionState::Disabled);
    }

    #[test]
    fn item_size_counts_content_bytes() {
        let item = Item {
            name: "Host:OperatingSystem".to_string(),
            schema_version: "1.0".to_string(),
            content: "0123456789".to_string(),
            captured_at: Utc::now(),
        };
        assert_eq!(item.size_bytes(), 10);
    }
}
