use crate::error::{EmbargoError, Result};
use crate::gate::DefinitionLookup;
use crate::paths;
use crate::record::WorkflowBinding;
use crate::types::Direction;
use crate::workflow::{ActionConfig, WorkflowDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Delays beyond this many days are almost always a typo.
const MAX_SENSIBLE_DELAY_DAYS: u32 = 365;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// ItemDefaults
// ---------------------------------------------------------------------------

/// Capabilities given to newly created items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefaults {
    /// Items carry embargo/expiry fields.
    #[serde(default = "default_true")]
    pub timing: bool,
    /// Items can be bound to a workflow definition.
    #[serde(default = "default_true")]
    pub workflow: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self {
            timing: true,
            workflow: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub defaults: ItemDefaults,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub workflows: BTreeMap<String, WorkflowDefinition>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            defaults: ItemDefaults::default(),
            workflows: BTreeMap::new(),
        }
    }

    /// A config with the two stock definitions `embargo init` writes.
    pub fn with_stock_workflows(project_name: impl Into<String>) -> Self {
        let mut cfg = Self::new(project_name);
        cfg.workflows.insert(
            "approve-publication".to_string(),
            WorkflowDefinition {
                description: Some("Review, then publish or schedule publication".to_string()),
                actions: vec![ActionConfig::Publish { delay_days: 0 }],
            },
        );
        cfg.workflows.insert(
            "delayed-publication".to_string(),
            WorkflowDefinition {
                description: Some("Review, then publish after a cooling-off period".to_string()),
                actions: vec![ActionConfig::Publish { delay_days: 3 }],
            },
        );
        cfg
    }

    pub fn workflow(&self, name: &str) -> Result<&WorkflowDefinition> {
        self.workflows
            .get(name)
            .ok_or_else(|| EmbargoError::WorkflowNotFound(name.to_string()))
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(EmbargoError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (name, def) in &self.workflows {
            if paths::validate_slug(name).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("workflow name '{name}' must be a lowercase slug"),
                });
            }

            if def.actions.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("workflow '{name}' has no publication actions"),
                });
            }

            for &direction in Direction::all() {
                let count = def
                    .actions
                    .iter()
                    .filter(|a| a.direction() == direction)
                    .count();
                if count > 1 {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "workflow '{name}' has {count} {direction} actions; only the first \
                             one sees the desired dates"
                        ),
                    });
                }
            }

            for action in &def.actions {
                if action.delay_days() > MAX_SENSIBLE_DELAY_DAYS {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "workflow '{name}' delays {} by {} days (>{MAX_SENSIBLE_DELAY_DAYS} is unusual)",
                            action.direction(),
                            action.delay_days()
                        ),
                    });
                }
            }
        }

        warnings
    }
}

impl DefinitionLookup for Config {
    fn definitions_for(&self, binding: &WorkflowBinding) -> Vec<&WorkflowDefinition> {
        self.workflows.definitions_for(binding)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
