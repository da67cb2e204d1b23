//! Built-in structural validation of project configuration.

use crate::project::{
    domain::{Diagnostic, IgnoreRules, ProjectConfig},
    ports::ProjectValidator,
};
use crate::version::domain::clean_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Structural checks every configuration must pass before expansion.
///
/// Errors block build creation; warnings are stored on the version.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxValidator;

impl SyntaxValidator {
    /// Creates the validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProjectValidator for SyntaxValidator {
    fn check(&self, config: &ProjectConfig) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        check_variants(config, &mut diagnostics);
        check_tasks(config, &mut diagnostics);
        check_identifiers(config, &mut diagnostics);
        check_cycles(config, &mut diagnostics);
        if let Err(err) = IgnoreRules::compile(&config.ignore) {
            diagnostics.push(Diagnostic::error(err.to_string()));
        }
        diagnostics
    }
}

fn check_variants(config: &ProjectConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.build_variants.is_empty() {
        diagnostics.push(Diagnostic::error("project must define at least one build variant"));
    }

    let mut seen = HashSet::new();
    for variant in &config.build_variants {
        if !seen.insert(variant.name.as_str()) {
            diagnostics.push(Diagnostic::error(format!(
                "build variant '{}' is defined more than once",
                variant.name
            )));
        }
        if variant.tasks.is_empty() {
            diagnostics.push(Diagnostic::warning(format!(
                "build variant '{}' has no tasks",
                variant.name
            )));
        }
        for task in &variant.tasks {
            if config.task(&task.name).is_none() {
                diagnostics.push(Diagnostic::error(format!(
                    "build variant '{}' references undefined task '{}'",
                    variant.name, task.name
                )));
            }
        }
    }
}

fn check_tasks(config: &ProjectConfig, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    for task in &config.tasks {
        if !seen.insert(task.name.as_str()) {
            diagnostics.push(Diagnostic::error(format!(
                "task '{}' is defined more than once",
                task.name
            )));
        }
        for dependency in &task.depends_on {
            if dependency.name == task.name && dependency.variant.is_none() {
                diagnostics.push(Diagnostic::error(format!(
                    "task '{}' depends on itself",
                    task.name
                )));
                continue;
            }
            if config.task(&dependency.name).is_none() {
                diagnostics.push(Diagnostic::error(format!(
                    "task '{}' depends on undefined task '{}'",
                    task.name, dependency.name
                )));
            }
            if let Some(variant) = dependency.variant.as_deref()
                && config.variant(variant).is_none()
            {
                diagnostics.push(Diagnostic::error(format!(
                    "task '{}' depends on undefined build variant '{variant}'",
                    task.name
                )));
            }
        }
    }
}

/// Build and task identifiers embed cleaned names, so distinct names that
/// clean to the same text would produce colliding records.
fn check_identifiers(config: &ProjectConfig, diagnostics: &mut Vec<Diagnostic>) {
    let mut variants: HashMap<String, &str> = HashMap::new();
    let mut tasks: HashMap<String, (&str, &str)> = HashMap::new();
    for variant in &config.build_variants {
        let cleaned = clean_name(&variant.name);
        match variants.get(&cleaned) {
            Some(first) if *first != variant.name => {
                diagnostics.push(Diagnostic::error(format!(
                    "build variants '{first}' and '{}' produce the same identifier '{cleaned}'",
                    variant.name
                )));
                continue;
            }
            Some(_) => continue,
            None => {
                variants.insert(cleaned, &variant.name);
            }
        }

        for task in &variant.tasks {
            let key = clean_name(&format!("{}_{}", variant.name, task.name));
            match tasks.get(&key) {
                Some((first_variant, first_task))
                    if (*first_variant, *first_task)
                        != (variant.name.as_str(), task.name.as_str()) =>
                {
                    diagnostics.push(Diagnostic::error(format!(
                        "task '{first_task}' of build variant '{first_variant}' and task '{}' of build variant '{}' produce the same identifier '{key}'",
                        task.name, variant.name
                    )));
                }
                Some(_) => {}
                None => {
                    tasks.insert(key, (&variant.name, &task.name));
                }
            }
        }
    }
}

type Node<'a> = (&'a str, &'a str);

/// Builds the `(variant, task)` dependency graph over variants that list
/// their tasks, then reports each cycle once.
fn check_cycles(config: &ProjectConfig, diagnostics: &mut Vec<Diagnostic>) {
    let mut graph: BTreeMap<Node<'_>, Vec<Node<'_>>> = BTreeMap::new();
    for variant in &config.build_variants {
        for variant_task in &variant.tasks {
            let Some(spec) = config.task(&variant_task.name) else {
                continue;
            };
            let edges = spec
                .depends_on
                .iter()
                .filter(|dependency| {
                    !(dependency.name == spec.name && dependency.variant.is_none())
                })
                .map(|dependency| {
                    (
                        dependency.variant.as_deref().unwrap_or(&variant.name),
                        dependency.name.as_str(),
                    )
                })
                .collect();
            graph.insert((variant.name.as_str(), spec.name.as_str()), edges);
        }
    }

    let mut finished = BTreeSet::new();
    for start in graph.keys() {
        let mut path = Vec::new();
        if let Some(cycle) = find_cycle(&graph, *start, &mut path, &mut finished) {
            finished.extend(cycle.iter().copied());
            let rendered: Vec<String> = cycle
                .iter()
                .map(|(variant, task)| format!("{variant}/{task}"))
                .collect();
            diagnostics.push(Diagnostic::error(format!(
                "dependency cycle detected: {}",
                rendered.join(" -> ")
            )));
        }
    }
}

fn find_cycle<'a>(
    graph: &BTreeMap<Node<'a>, Vec<Node<'a>>>,
    node: Node<'a>,
    path: &mut Vec<Node<'a>>,
    finished: &mut BTreeSet<Node<'a>>,
) -> Option<Vec<Node<'a>>> {
    if finished.contains(&node) {
        return None;
    }
    if let Some(position) = path.iter().position(|visited| *visited == node) {
        let mut cycle = path.split_off(position);
        cycle.push(node);
        return Some(cycle);
    }

    path.push(node);
    for next in graph.get(&node).into_iter().flatten() {
        if let Some(cycle) = find_cycle(graph, *next, path, finished) {
            return Some(cycle);
        }
    }
    path.pop();
    finished.insert(node);
    None
}
