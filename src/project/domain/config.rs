//! Project build configuration as declared in the repository.
//!
//! Configuration documents are YAML:
//!
//! ```yaml
//! buildvariants:
//!   - name: linux-64
//!     display_name: Linux 64-bit
//!     batchtime: 60
//!     tasks:
//!       - name: compile
//!       - name: test
//! tasks:
//!   - name: compile
//!   - name: test
//!     depends_on:
//!       - name: compile
//! ignore:
//!   - "*.md"
//! ```

use super::ConfigParseError;
use serde::{Deserialize, Serialize};

/// Top-level keys understood by the parser; anything else is a warning.
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["buildvariants", "tasks", "ignore"];

/// Reference from a build variant to a project task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTask {
    /// Task name.
    pub name: String,
}

/// A named platform/configuration combination that tasks run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildVariant {
    /// Unique variant name.
    pub name: String,
    /// Human-readable name; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Tasks that run on this variant.
    #[serde(default)]
    pub tasks: Vec<VariantTask>,
    /// Minutes between activations, overriding the project default.
    #[serde(default, rename = "batchtime", skip_serializing_if = "Option::is_none")]
    pub batch_time: Option<u32>,
    /// Disabled variants produce no builds.
    #[serde(default)]
    pub disabled: bool,
}

impl BuildVariant {
    /// Creates an enabled variant with no tasks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            tasks: Vec::new(),
            batch_time: None,
            disabled: false,
        }
    }

    /// Adds tasks by name.
    #[must_use]
    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks
            .extend(tasks.into_iter().map(|name| VariantTask { name: name.into() }));
        self
    }

    /// Sets the batch-time override.
    #[must_use]
    pub const fn with_batch_time(mut self, minutes: u32) -> Self {
        self.batch_time = Some(minutes);
        self
    }

    /// Marks the variant disabled.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Returns the display name, defaulting to the variant name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Dependency edge from one task to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    /// Name of the task depended upon.
    pub name: String,
    /// Variant of the task depended upon; the dependent's own variant when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Definition of a project task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Unique task name.
    pub name: String,
    /// Tasks that must finish first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskDependency>,
}

impl TaskSpec {
    /// Creates a task with no dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
        }
    }

    /// Adds a dependency on a task in the same variant.
    #[must_use]
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(TaskDependency {
            name: name.into(),
            variant: None,
        });
        self
    }

    /// Adds a dependency on a task in another variant.
    #[must_use]
    pub fn depends_on_variant(mut self, name: impl Into<String>, variant: impl Into<String>) -> Self {
        self.depends_on.push(TaskDependency {
            name: name.into(),
            variant: Some(variant.into()),
        });
        self
    }
}

/// Parsed project build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Build variants in declaration order.
    #[serde(default, rename = "buildvariants")]
    pub build_variants: Vec<BuildVariant>,
    /// Task definitions.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
    /// Glob patterns of files whose changes do not warrant a build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

/// A parsed configuration together with non-fatal parse warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProjectConfig {
    /// Parsed configuration.
    pub config: ProjectConfig,
    /// Warnings such as unrecognised top-level keys.
    pub warnings: Vec<String>,
}

impl ProjectConfig {
    /// Parses a YAML configuration document.
    ///
    /// Unknown top-level keys are reported as warnings rather than errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigParseError::Yaml`] when the document is not valid YAML
    /// or does not match the schema, and [`ConfigParseError::NotAMapping`]
    /// when the top level is not a mapping.
    pub fn from_yaml(raw: &str) -> Result<ParsedProjectConfig, ConfigParseError> {
        let document: serde_yaml::Value = serde_yaml::from_str(raw)?;
        let serde_yaml::Value::Mapping(mapping) = &document else {
            return Err(ConfigParseError::NotAMapping);
        };

        let warnings = mapping
            .iter()
            .filter_map(|(key, _value)| match key.as_str() {
                Some(name) if KNOWN_TOP_LEVEL_KEYS.contains(&name) => None,
                Some(name) => Some(format!("unrecognised configuration key '{name}'")),
                None => Some("configuration contains a non-string key".to_owned()),
            })
            .collect();

        let config = serde_yaml::from_value(document)?;
        Ok(ParsedProjectConfig { config, warnings })
    }

    /// Serializes the configuration back to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigParseError::Yaml`] when serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigParseError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Returns variants that are not disabled, in declaration order.
    pub fn enabled_variants(&self) -> impl Iterator<Item = &BuildVariant> {
        self.build_variants
            .iter()
            .filter(|variant| !variant.disabled)
    }

    /// Looks up a task definition by name.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|task| task.name == name)
    }

    /// Looks up a build variant by name.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&BuildVariant> {
        self.build_variants
            .iter()
            .find(|variant| variant.name == name)
    }
}
