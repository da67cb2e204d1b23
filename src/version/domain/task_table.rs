//! Task identifier table used to wire dependencies during expansion.

use super::{RevisionId, TaskId};
use crate::project::domain::{ProjectConfig, ProjectId, TaskDependency};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Identifiers for every task of every enabled variant in one expansion.
///
/// Computed once before any build is created so that forward, backward and
/// cross-variant dependency references resolve to the same identifiers the
/// tasks are persisted under. Scoped to a single expansion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskIdTable {
    by_variant: HashMap<String, HashMap<String, TaskId>>,
}

impl TaskIdTable {
    /// Builds the table for all enabled variants of `config`.
    #[must_use]
    pub fn new(
        config: &ProjectConfig,
        project: &ProjectId,
        revision: &RevisionId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let by_variant = config
            .enabled_variants()
            .map(|variant| {
                let tasks = variant
                    .tasks
                    .iter()
                    .map(|task| {
                        let id = TaskId::generate(
                            project,
                            &variant.name,
                            &task.name,
                            revision,
                            created_at,
                        );
                        (task.name.clone(), id)
                    })
                    .collect();
                (variant.name.clone(), tasks)
            })
            .collect();
        Self { by_variant }
    }

    /// Returns the identifier of `task` in `variant`.
    #[must_use]
    pub fn get(&self, variant: &str, task: &str) -> Option<&TaskId> {
        self.by_variant.get(variant).and_then(|tasks| tasks.get(task))
    }

    /// Resolves a dependency declared by a task of `variant`.
    ///
    /// Dependencies without an explicit variant resolve within `variant`.
    #[must_use]
    pub fn resolve(&self, variant: &str, dependency: &TaskDependency) -> Option<&TaskId> {
        let target_variant = dependency.variant.as_deref().unwrap_or(variant);
        self.get(target_variant, &dependency.name)
    }

    /// Returns the number of task identifiers in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_variant.values().map(HashMap::len).sum()
    }

    /// Returns `true` when no task identifiers were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
