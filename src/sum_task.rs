//! Demo task type: sums its numeric inputs.

use futures::future::BoxFuture;

use flowline_core::{JsonMap, Result, TaskDescriptor, TaskHandler};

pub struct SumTask {
    descriptor: TaskDescriptor,
}

impl SumTask {
    pub fn new(num_inputs: usize) -> Self {
        let mut descriptor = TaskDescriptor::new("sum", "Sums its numeric inputs");
        for i in 0..num_inputs {
            descriptor.add_input(format!("i{}", i), 1.0);
        }
        descriptor.add_output("sum");
        descriptor.set_use_defaults(true);
        Self { descriptor }
    }
}

impl TaskHandler for SumTask {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn run(&self, inputs: JsonMap) -> BoxFuture<'_, Result<JsonMap>> {
        Box::pin(async move {
            let total: f64 = inputs.values().filter_map(|v| v.as_f64()).sum();
            let mut outputs = JsonMap::new();
            outputs.insert("sum".to_string(), total.into());
            Ok(outputs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sums_numeric_inputs() {
        let task = SumTask::new(3);
        assert_eq!(task.descriptor().input_keys(), vec!["i0", "i1", "i2"]);

        let inputs: JsonMap = serde_json::from_str(r#"{"i0": 1.5, "i1": 2.5, "i2": 3.0}"#).unwrap();
        let outputs = task.run(inputs).await.unwrap();
        assert_eq!(outputs["sum"], serde_json::json!(7.0));
    }
}
