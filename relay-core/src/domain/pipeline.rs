//! Pipeline configuration domain types
//!
//! A pipeline is described declaratively as an optional start joint, an
//! ordered list of process joints and an optional end joint. Only the
//! configuration lives here; running the joints is somebody else's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::util::StringSet;

/// Free-form, joint-specific parameters
pub type Parameters = HashMap<String, JsonValue>;

/// Categorical label attached to a pipeline
///
/// The value set is owned by callers; `0` means "unset" and is omitted
/// from the stored representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phrase(pub i32);

impl Phrase {
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for Phrase {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Phrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stage of a pipeline
///
/// Joints have no identity of their own and are always embedded in a
/// [`PipelineConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// Behavior name, interpreted by the execution engine
    #[serde(rename = "joint")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Parameters,

    #[serde(default)]
    pub enabled: bool,
}

impl JointConfig {
    /// Creates an enabled joint with no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::new(),
            enabled: true,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Persisted pipeline configuration
///
/// `id`, `created` and `updated` are stamped by the store; whatever the
/// caller puts there before creation is overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Phrase::is_unset")]
    pub phrase: Phrase,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<JointConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub process: Vec<JointConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<JointConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl PipelineConfig {
    /// Creates an empty, not yet persisted configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_phrase(mut self, phrase: impl Into<Phrase>) -> Self {
        self.phrase = phrase.into();
        self
    }

    pub fn with_start(mut self, joint: JointConfig) -> Self {
        self.start = Some(joint);
        self
    }

    pub fn with_process(mut self, joint: JointConfig) -> Self {
        self.process.push(joint);
        self
    }

    pub fn with_end(mut self, joint: JointConfig) -> Self {
        self.end = Some(joint);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Whether the store has assigned an identity yet
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// All joints in execution order: start, process joints, end
    pub fn joints(&self) -> impl Iterator<Item = &JointConfig> {
        self.start
            .iter()
            .chain(self.process.iter())
            .chain(self.end.iter())
    }

    /// Names of the joints that are switched on
    pub fn enabled_joint_names(&self) -> StringSet {
        self.joints()
            .filter(|joint| joint.enabled)
            .map(|joint| joint.name.clone())
            .collect()
    }
}

/// Go-style encoders write a nil map as `null`; treat that as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
