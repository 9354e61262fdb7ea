//! Architecture configuration

use jframework_events::EventBusConfig;
use serde::{Deserialize, Serialize};

/// What `init_architecture` does when a component's `on_init` fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitFailurePolicy {
    /// Stop the pass at the first failure and return it
    #[default]
    Abort,
    /// Initialize every remaining component, then return the first failure
    Continue,
}

impl InitFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitFailurePolicy::Abort => "abort",
            InitFailurePolicy::Continue => "continue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureConfig {
    /// Name used in log lines and error messages
    pub name: String,

    pub init_failure: InitFailurePolicy,

    pub event_bus: EventBusConfig,
}

impl ArchitectureConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_init_failure(mut self, policy: InitFailurePolicy) -> Self {
        self.init_failure = policy;
        self
    }

    pub fn with_event_bus(mut self, config: EventBusConfig) -> Self {
        self.event_bus = config;
        self
    }
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self {
            name: "architecture".to_string(),
            init_failure: InitFailurePolicy::Abort,
            event_bus: EventBusConfig::default(),
        }
    }
}
