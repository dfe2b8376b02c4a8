//! Compiles a small graph through the public API and checks the exact
//! engine-facing JSON shape of the definition.

use flowline_core::{TaskDescriptor, Workflow};

fn sum_task() -> TaskDescriptor {
    let mut d = TaskDescriptor::new("sum", "Sums its numeric inputs");
    d.add_input("i0", 1.0);
    d.add_input("i1", 1.0);
    d.add_output("sum");
    d
}

#[test]
fn test_two_sum_definition_shape() {
    let mut wf = Workflow::new("flowline-demo", "Two chained sum tasks");
    wf.add_task("sum1", sum_task()).unwrap();
    wf.add_task("sum2", sum_task()).unwrap();
    wf.add_input("x", 5.0);
    wf.connect("sum1.i0", "x");
    wf.connect("sum2.i0", "sum1.sum");
    wf.add_output("total", "sum2.sum");

    let json = serde_json::to_value(wf.compile().unwrap()).unwrap();

    assert_eq!(json["name"], "flowline-demo");
    assert_eq!(json["version"], 1);
    assert_eq!(json["schemaVersion"], 2);
    assert_eq!(json["restartable"], true);
    assert_eq!(json["workflowStatusListenerEnabled"], true);
    assert_eq!(json["inputParameters"], serde_json::json!(["x"]));
    assert_eq!(json["outputParameters"]["total"], "${sum2.output.sum}");

    let tasks = json["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    for task in tasks {
        assert_eq!(task["name"], "sum");
        assert_eq!(task["type"], "SIMPLE");
    }

    let by_alias = |alias: &str| {
        tasks
            .iter()
            .find(|t| t["taskReferenceName"] == alias)
            .unwrap()
    };
    assert_eq!(by_alias("sum1")["inputParameters"]["i0"], "${workflow.input.x}");
    assert_eq!(by_alias("sum2")["inputParameters"]["i0"], "${sum1.output.sum}");
}

#[test]
fn test_definition_round_trips_through_json() {
    let mut wf = Workflow::new("rt", "round trip");
    wf.add_task("sum1", sum_task()).unwrap();
    wf.add_input("x", 1.0);
    wf.connect("sum1.i0", "x");

    let definition = wf.compile().unwrap();
    let json = serde_json::to_string(&definition).unwrap();
    let parsed: flowline_core::WorkflowDefinition = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, definition);
}
