//! Task descriptors and the handler seam.
//!
//! A [`TaskDescriptor`] is the static metadata for one reusable unit of
//! work: its type name, named inputs with default values, and named
//! outputs. The logic itself lives behind [`TaskHandler`], which the worker
//! loop invokes with the engine-supplied input map.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::JsonMap;

/// Static metadata for a task type.
///
/// Input insertion order is preserved so registration payloads serialize
/// deterministically; re-adding an input overwrites the default in place.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    pub name: String,
    pub description: String,
    inputs: Vec<(String, serde_json::Value)>,
    outputs: Vec<String>,
    use_defaults: bool,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            use_defaults: false,
        }
    }

    /// Declare an input port with a default value.
    pub fn add_input(&mut self, name: impl Into<String>, default: impl Into<serde_json::Value>) {
        let name = name.into();
        let default = default.into();
        match self.inputs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = default,
            None => self.inputs.push((name, default)),
        }
    }

    /// Declare an output port. Duplicate names are ignored.
    pub fn add_output(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.outputs.iter().any(|n| *n == name) {
            self.outputs.push(name);
        }
    }

    /// Include the input defaults as an `inputTemplate` at registration
    /// time, so the engine fills unconnected ports with them.
    pub fn set_use_defaults(&mut self, on: bool) {
        self.use_defaults = on;
    }

    pub fn input_keys(&self) -> Vec<String> {
        self.inputs.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn output_keys(&self) -> &[String] {
        &self.outputs
    }

    /// The declared inputs as a keyed document of defaults.
    pub fn default_inputs(&self) -> JsonMap {
        self.inputs.iter().cloned().collect()
    }

    /// Whether `port` is a declared input of this task type.
    pub fn has_input(&self, port: &str) -> bool {
        self.inputs.iter().any(|(n, _)| n == port)
    }

    /// Build the engine registration payload for this descriptor.
    pub fn to_task_def(&self) -> TaskDef {
        TaskDef {
            name: self.name.clone(),
            description: self.description.clone(),
            input_keys: self.input_keys(),
            input_template: self.use_defaults.then(|| self.default_inputs()),
            output_keys: self.outputs.clone(),
            retry_count: None,
            timeout_seconds: None,
            timeout_policy: None,
            retry_logic: None,
            retry_delay_seconds: None,
            response_timeout_seconds: None,
        }
    }
}

/// Task type definition as exchanged with the engine's metadata registry.
///
/// Optional policy fields are omitted from the payload when unset so the
/// engine applies its own defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_template: Option<JsonMap>,
    #[serde(default)]
    pub output_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_logic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_timeout_seconds: Option<u64>,
}

/// Task logic — one capability, invoked by the worker loop.
pub trait TaskHandler: Send + Sync + 'static {
    /// The descriptor for the task type this handler implements.
    fn descriptor(&self) -> &TaskDescriptor;

    /// Execute the task with the given input map, returning its outputs.
    ///
    /// An `Err` surfaces to the engine as a `FAILED` task result; this core
    /// never inspects the failure beyond its message.
    fn run(&self, inputs: JsonMap) -> BoxFuture<'_, Result<JsonMap>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_descriptor() -> TaskDescriptor {
        let mut d = TaskDescriptor::new("sum", "adds its inputs");
        d.add_input("i0", 1.0);
        d.add_input("i1", 1.0);
        d.add_output("sum");
        d
    }

    #[test]
    fn test_input_order_preserved() {
        let mut d = TaskDescriptor::new("t", "t");
        d.add_input("b", 2.0);
        d.add_input("a", 1.0);
        d.add_input("c", 3.0);
        assert_eq!(d.input_keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_input_overwrites_in_place() {
        let mut d = TaskDescriptor::new("t", "t");
        d.add_input("a", 1.0);
        d.add_input("b", 2.0);
        d.add_input("a", 9.0);
        assert_eq!(d.input_keys(), vec!["a", "b"]);
        assert_eq!(d.default_inputs()["a"], serde_json::json!(9.0));
    }

    #[test]
    fn test_duplicate_output_ignored() {
        let mut d = sum_descriptor();
        d.add_output("sum");
        assert_eq!(d.output_keys(), ["sum"]);
    }

    #[test]
    fn test_task_def_omits_template_by_default() {
        let def = sum_descriptor().to_task_def();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["inputKeys"], serde_json::json!(["i0", "i1"]));
        assert_eq!(json["outputKeys"], serde_json::json!(["sum"]));
        assert!(json.get("inputTemplate").is_none());
        assert!(json.get("retryCount").is_none());
    }

    #[test]
    fn test_task_def_includes_template_with_defaults() {
        let mut d = sum_descriptor();
        d.set_use_defaults(true);
        let json = serde_json::to_value(d.to_task_def()).unwrap();
        assert_eq!(json["inputTemplate"]["i0"], serde_json::json!(1.0));
    }
}
