use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::{NodeKey, SelectionKey};

const DEFAULT_TITLE: &str = "Please select";
const DEFAULT_SEARCH_PLACEHOLDER: &str = "Search";
const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(250);

/// Configuration knobs of a [`crate::CascadeSelect`] popup.
///
/// There is no `Default`: hosts must decide which node field drives
/// matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Keep the popup header (and the page behind it) pinned while open.
    #[serde(default = "default_true")]
    pub fixed_header: bool,
    #[serde(default = "default_true")]
    pub search_enabled: bool,
    #[serde(default = "default_search_placeholder")]
    pub search_placeholder: String,
    pub selection_key: SelectionKey,
    /// Leaf to open on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preselect: Option<NodeKey>,
    /// Pause between highlighting a pick and showing the next level. Zero
    /// advances synchronously.
    #[serde(
        rename = "advance_delay_ms",
        with = "millis",
        default = "default_advance_delay"
    )]
    pub advance_delay: Duration,
    /// Tab captions, one per level; missing entries read `Level N`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub level_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl SelectConfig {
    pub fn new(selection_key: SelectionKey) -> Self {
        Self {
            title: default_title(),
            fixed_header: true,
            search_enabled: true,
            search_placeholder: default_search_placeholder(),
            selection_key,
            preselect: None,
            advance_delay: DEFAULT_ADVANCE_DELAY,
            level_labels: Vec::new(),
            max_depth: None,
        }
    }

    /// Parse a JSON object. `selection_key` is mandatory.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_fixed_header(mut self, fixed_header: bool) -> Self {
        self.fixed_header = fixed_header;
        self
    }

    pub fn with_search_enabled(mut self, search_enabled: bool) -> Self {
        self.search_enabled = search_enabled;
        self
    }

    pub fn with_search_placeholder(
        mut self,
        placeholder: impl Into<String>,
    ) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    pub fn with_preselect(mut self, target: impl Into<NodeKey>) -> Self {
        self.preselect = Some(target.into());
        self
    }

    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn with_level_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.level_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Caption of the tab for `level`.
    pub fn level_label(&self, level: usize) -> String {
        self.level_labels
            .get(level)
            .cloned()
            .unwrap_or_else(|| format!("Level {}", level + 1))
    }
}

fn default_title() -> String {
    String::from(DEFAULT_TITLE)
}

fn default_search_placeholder() -> String {
    String::from(DEFAULT_SEARCH_PLACEHOLDER)
}

fn default_true() -> bool {
    true
}

fn default_advance_delay() -> Duration {
    DEFAULT_ADVANCE_DELAY
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
