//! Workflow graph builder and compiler.
//!
//! A [`Workflow`] collects task descriptors under unique aliases, workflow
//! level inputs/outputs, and a connection map between endpoints. Compiling
//! produces a flat [`WorkflowDefinition`] in the engine's schema, with every
//! connection resolved into the engine's templated reference syntax.
//!
//! An endpoint is either `alias.port` (read that task's output port) or a
//! bare `name` (read a workflow-level input).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FlowlineError, Result};
use crate::task::TaskDescriptor;

/// Resolve an endpoint into the engine's templated reference syntax.
///
/// Total over any string: `"a.b"` becomes a task-output reference, anything
/// without a separator becomes a workflow-input reference. Whether `a` names
/// a real task is the compiler's concern, not this function's.
pub fn resolve_endpoint(endpoint: &str) -> String {
    match endpoint.split_once('.') {
        Some((alias, port)) => format!("${{{}.output.{}}}", alias, port),
        None => format!("${{workflow.input.{}}}", endpoint),
    }
}

/// Builder for one data-flow graph of tasks.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    pub name: String,
    pub description: String,
    tasks: HashMap<String, TaskDescriptor>,
    inputs: Vec<(String, serde_json::Value)>,
    outputs: Vec<(String, String)>,
    connections: HashMap<String, String>,
    failure_workflow: Option<String>,
    strict: bool,
}

impl Workflow {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Add a task instance under a workflow-unique alias.
    ///
    /// Fails with [`FlowlineError::DuplicateAlias`] if the alias is already
    /// taken; the task set is unchanged in that case.
    pub fn add_task(&mut self, alias: impl Into<String>, task: TaskDescriptor) -> Result<()> {
        let alias = alias.into();
        if self.tasks.contains_key(&alias) {
            return Err(FlowlineError::DuplicateAlias { alias });
        }
        self.tasks.insert(alias, task);
        Ok(())
    }

    /// Declare a workflow-level input with a default value.
    pub fn add_input(&mut self, name: impl Into<String>, default: impl Into<serde_json::Value>) {
        let name = name.into();
        let default = default.into();
        match self.inputs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = default,
            None => self.inputs.push((name, default)),
        }
    }

    /// Declare a workflow-level output bound to a source endpoint.
    pub fn add_output(&mut self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        let source = source.into();
        match self.outputs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = source,
            None => self.outputs.push((name, source)),
        }
    }

    /// Connect a source endpoint to a destination endpoint.
    ///
    /// One source may feed many destinations. A destination has at most one
    /// source: connecting it again replaces the earlier source.
    pub fn connect(&mut self, destination: impl Into<String>, source: impl Into<String>) {
        self.connections.insert(destination.into(), source.into());
    }

    /// Workflow definition to run when this one fails.
    pub fn set_failure_workflow(&mut self, name: impl Into<String>) {
        self.failure_workflow = Some(name.into());
    }

    /// Reject connections to undeclared aliases or ports at compile time
    /// instead of silently dropping them.
    pub fn set_strict(&mut self, on: bool) {
        self.strict = on;
    }

    /// The descriptors of all tasks in this workflow, keyed by alias.
    pub fn tasks(&self) -> &HashMap<String, TaskDescriptor> {
        &self.tasks
    }

    /// Compile the graph into an engine-consumable definition.
    ///
    /// Pure and repeatable: the builder is only read, and compiling twice on
    /// unchanged state yields the same keyed content. By default a
    /// connection whose destination names an unknown alias or port emits no
    /// binding (logged, not rejected); in strict mode it is an error.
    pub fn compile(&self) -> Result<WorkflowDefinition> {
        // Group resolved bindings by destination alias.
        let mut bindings: HashMap<&str, BTreeMap<String, String>> = HashMap::new();
        for (destination, source) in &self.connections {
            let Some((alias, port)) = destination.split_once('.') else {
                // Bare destinations are workflow outputs; those are bound
                // through `add_output`, not the connection map.
                continue;
            };
            let known = self
                .tasks
                .get(alias)
                .map(|task| task.has_input(port))
                .unwrap_or(false);
            if !known {
                if self.strict {
                    return Err(FlowlineError::UnknownEndpoint {
                        endpoint: destination.clone(),
                    });
                }
                warn!(%destination, %source, "Dropping connection to undeclared endpoint");
                continue;
            }
            bindings
                .entry(alias)
                .or_default()
                .insert(port.to_string(), resolve_endpoint(source));
        }

        // Alias iteration order is not part of the contract; sort so that
        // repeated compiles serialize identically.
        let mut aliases: Vec<&String> = self.tasks.keys().collect();
        aliases.sort();

        let tasks = aliases
            .into_iter()
            .map(|alias| CompiledTask {
                name: self.tasks[alias].name.clone(),
                task_reference_name: alias.clone(),
                task_type: "SIMPLE".to_string(),
                input_parameters: bindings.remove(alias.as_str()).unwrap_or_default(),
            })
            .collect();

        Ok(WorkflowDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            version: 1,
            tasks,
            output_parameters: self
                .outputs
                .iter()
                .map(|(name, source)| (name.clone(), resolve_endpoint(source)))
                .collect(),
            input_parameters: self.inputs.iter().map(|(n, _)| n.clone()).collect(),
            failure_workflow: self.failure_workflow.clone().unwrap_or_default(),
            restartable: true,
            workflow_status_listener_enabled: true,
            schema_version: 2,
        })
    }
}

/// One task entry in a compiled definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTask {
    pub name: String,
    pub task_reference_name: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub input_parameters: BTreeMap<String, String>,
}

/// Engine-ready workflow definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    pub name: String,
    pub description: String,
    pub version: u32,
    pub tasks: Vec<CompiledTask>,
    pub output_parameters: BTreeMap<String, String>,
    pub input_parameters: Vec<String>,
    pub failure_workflow: String,
    pub restartable: bool,
    pub workflow_status_listener_enabled: bool,
    pub schema_version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_task() -> TaskDescriptor {
        let mut d = TaskDescriptor::new("sum", "adds its inputs");
        d.add_input("i0", 1.0);
        d.add_input("i1", 1.0);
        d.add_output("sum");
        d
    }

    #[test]
    fn test_resolve_task_scoped_endpoint() {
        assert_eq!(resolve_endpoint("a.b"), "${a.output.b}");
        assert_eq!(resolve_endpoint("leo.vcirc"), "${leo.output.vcirc}");
    }

    #[test]
    fn test_resolve_workflow_input_endpoint() {
        assert_eq!(resolve_endpoint("c"), "${workflow.input.c}");
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut wf = Workflow::new("wf", "wf");
        wf.add_task("sum1", sum_task()).unwrap();
        let err = wf.add_task("sum1", sum_task()).unwrap_err();
        assert!(matches!(err, FlowlineError::DuplicateAlias { .. }));
        assert_eq!(wf.tasks().len(), 1);
    }

    #[test]
    fn test_connection_binding() {
        let mut leo = TaskDescriptor::new("VCircComp", "circular orbit velocity");
        leo.add_output("vcirc");
        let mut dv1 = TaskDescriptor::new("DeltaVComp", "delta-v");
        dv1.add_input("v1", 0.0);
        dv1.add_input("v2", 0.0);

        let mut wf = Workflow::new("hohmann", "transfer");
        wf.add_task("leo", leo).unwrap();
        wf.add_task("dv1", dv1).unwrap();
        wf.connect("dv1.v1", "leo.vcirc");

        let def = wf.compile().unwrap();
        let dv1 = def
            .tasks
            .iter()
            .find(|t| t.task_reference_name == "dv1")
            .unwrap();
        assert_eq!(dv1.input_parameters["v1"], resolve_endpoint("leo.vcirc"));
    }

    #[test]
    fn test_dangling_connection_dropped() {
        let mut wf = Workflow::new("wf", "wf");
        wf.add_task("sum1", sum_task()).unwrap();
        wf.connect("ghost.i0", "sum1.sum");
        wf.connect("sum1.no_such_port", "sum1.sum");

        let def = wf.compile().unwrap();
        assert_eq!(def.tasks.len(), 1);
        assert!(def.tasks[0].input_parameters.is_empty());
    }

    #[test]
    fn test_strict_mode_rejects_dangling_connection() {
        let mut wf = Workflow::new("wf", "wf");
        wf.add_task("sum1", sum_task()).unwrap();
        wf.connect("ghost.i0", "sum1.sum");
        wf.set_strict(true);

        let err = wf.compile().unwrap_err();
        assert!(matches!(err, FlowlineError::UnknownEndpoint { .. }));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let mut wf = Workflow::new("wf", "wf");
        wf.add_task("sum1", sum_task()).unwrap();
        wf.add_task("sum2", sum_task()).unwrap();
        wf.add_input("x", 5.0);
        wf.connect("sum2.i0", "sum1.sum");
        wf.connect("sum1.i0", "x");
        wf.add_output("total", "sum2.sum");

        let first = wf.compile().unwrap();
        let second = wf.compile().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_two_sum_scenario() {
        let mut wf = Workflow::new("two-sum", "chained additions");
        wf.add_task("sum1", sum_task()).unwrap();
        wf.add_task("sum2", sum_task()).unwrap();
        wf.add_input("x", 5.0);
        wf.connect("sum1.i0", "x");
        wf.connect("sum2.i0", "sum1.sum");

        let def = wf.compile().unwrap();
        assert_eq!(def.tasks.len(), 2);

        let by_alias = |alias: &str| {
            def.tasks
                .iter()
                .find(|t| t.task_reference_name == alias)
                .unwrap()
        };
        assert_eq!(by_alias("sum1").input_parameters["i0"], "${workflow.input.x}");
        assert_eq!(by_alias("sum2").input_parameters["i0"], "${sum1.output.sum}");
        assert_eq!(def.input_parameters, vec!["x"]);
    }

    #[test]
    fn test_fixed_policy_fields() {
        let def = Workflow::new("empty", "no tasks").compile().unwrap();
        assert_eq!(def.version, 1);
        assert_eq!(def.schema_version, 2);
        assert!(def.restartable);
        assert!(def.workflow_status_listener_enabled);

        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["schemaVersion"], 2);
        assert_eq!(json["restartable"], true);
        assert_eq!(json["workflowStatusListenerEnabled"], true);
    }

    #[test]
    fn test_fan_out_and_last_write_wins() {
        let mut wf = Workflow::new("wf", "wf");
        wf.add_task("sum1", sum_task()).unwrap();
        wf.add_task("sum2", sum_task()).unwrap();
        wf.add_input("x", 1.0);
        wf.add_input("y", 2.0);
        // Fan-out: one source feeds two destinations.
        wf.connect("sum1.i0", "x");
        wf.connect("sum2.i0", "x");
        // Re-connecting a destination replaces its source.
        wf.connect("sum1.i1", "x");
        wf.connect("sum1.i1", "y");

        let def = wf.compile().unwrap();
        let by_alias = |alias: &str| {
            def.tasks
                .iter()
                .find(|t| t.task_reference_name == alias)
                .unwrap()
        };
        assert_eq!(by_alias("sum1").input_parameters["i0"], "${workflow.input.x}");
        assert_eq!(by_alias("sum2").input_parameters["i0"], "${workflow.input.x}");
        assert_eq!(by_alias("sum1").input_parameters["i1"], "${workflow.input.y}");
    }

    #[test]
    fn test_output_parameters_resolved() {
        let mut wf = Workflow::new("wf", "wf");
        wf.add_task("sum1", sum_task()).unwrap();
        wf.add_output("total", "sum1.sum");
        wf.add_output("echo", "x");

        let def = wf.compile().unwrap();
        assert_eq!(def.output_parameters["total"], "${sum1.output.sum}");
        assert_eq!(def.output_parameters["echo"], "${workflow.input.x}");
    }
}
