mod common;

use std::collections::BTreeMap;

use common::Probe;
use plugraph::nodes::{ContextVariables, FrameSource, TimeWarp};
use plugraph::{Context, Graph, GraphError, NodeId, PlugId, Value};

fn plug(graph: &Graph, node: NodeId, name: &str) -> PlugId {
    graph.plug(node, name).unwrap()
}

fn warp(graph: &mut Graph, name: &str, speed: f64, offset: f64) -> NodeId {
    let node = graph.add_node(name, TimeWarp::new()).unwrap();
    graph.set_value(plug(graph, node, "speed"), speed).unwrap();
    graph.set_value(plug(graph, node, "offset"), offset).unwrap();
    node
}

#[test]
fn test_nested_time_warps_compose() {
    let mut graph = Graph::new();
    let source = graph.add_node("source", FrameSource::new()).unwrap();
    let inner = warp(&mut graph, "inner", 1.0, 10.0);
    let outer = warp(&mut graph, "outer", 2.0, 0.0);
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, inner, "in"))
        .unwrap();
    graph
        .connect(plug(&graph, inner, "out"), plug(&graph, outer, "in"))
        .unwrap();

    let value = graph
        .get_value(plug(&graph, outer, "out"), &Context::with_frame(5.0))
        .unwrap();
    assert_eq!(value, Value::float(20.0));
}

#[test]
fn test_override_is_not_visible_to_caller() {
    let mut graph = Graph::new();
    let source = graph.add_node("source", FrameSource::new()).unwrap();
    let shift = warp(&mut graph, "shift", 3.0, 1.0);
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, shift, "in"))
        .unwrap();

    let ctx = Context::with_frame(2.0);
    let before = ctx.get("frame").unwrap().clone();
    let value = graph.get_value(plug(&graph, shift, "out"), &ctx).unwrap();
    assert_eq!(value, Value::float(7.0));
    assert_eq!(ctx.get("frame").unwrap(), &before);
}

#[test]
fn test_failed_upstream_request_leaves_caller_context_intact() {
    let mut graph = Graph::new();
    let probe = Probe::new();
    let source = graph.add_node("probe", probe.clone()).unwrap();
    let shift = warp(&mut graph, "shift", 1.0, 100.0);
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, shift, "in"))
        .unwrap();

    probe.set_failing(true);
    let ctx = Context::with_frame(1.0);
    let result = graph.get_value(plug(&graph, shift, "out"), &ctx);
    assert!(matches!(result, Err(GraphError::Compute { .. })));
    assert_eq!(ctx.frame().unwrap(), 1.0);
}

#[test]
fn test_identity_warp_reuses_upstream_result() {
    let mut graph = Graph::new();
    let probe = Probe::new();
    let source = graph.add_node("probe", probe.clone()).unwrap();
    let identity = graph.add_node("identity", TimeWarp::new()).unwrap();
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, identity, "in"))
        .unwrap();

    let ctx = Context::with_frame(4.0);
    let direct = graph.get_value(plug(&graph, source, "out"), &ctx).unwrap();
    let warped = graph.get_value(plug(&graph, identity, "out"), &ctx).unwrap();
    assert_eq!(direct, warped);
    assert_eq!(probe.calls(), 1);
}

#[test]
fn test_hash_does_not_force_upstream_compute() {
    let mut graph = Graph::new();
    let probe = Probe::new();
    let source = graph.add_node("probe", probe.clone()).unwrap();
    let shift = warp(&mut graph, "shift", 2.0, 0.0);
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, shift, "in"))
        .unwrap();

    let out = plug(&graph, shift, "out");
    let h1 = graph.hash(out, &Context::with_frame(1.0)).unwrap();
    let h2 = graph.hash(out, &Context::with_frame(2.0)).unwrap();
    assert_ne!(h1, h2);
    assert_eq!(probe.calls(), 0);
}

#[test]
fn test_frames_mapping_to_same_upstream_frame_share_cache() {
    let mut graph = Graph::new();
    let probe = Probe::new();
    let source = graph.add_node("probe", probe.clone()).unwrap();
    let hold = warp(&mut graph, "hold", 0.0, 12.0);
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, hold, "in"))
        .unwrap();

    let out = plug(&graph, hold, "out");
    for frame in [1.0, 2.0, 3.0] {
        let value = graph.get_value(out, &Context::with_frame(frame)).unwrap();
        assert_eq!(value, Value::float(12.0));
    }
    assert_eq!(probe.calls(), 1);
    assert_eq!(graph.cache_stats().value_misses, 2);
}

#[test]
fn test_changing_warp_parameter_dirties_output() {
    let mut graph = Graph::new();
    let source = graph.add_node("source", FrameSource::new()).unwrap();
    let shift = warp(&mut graph, "shift", 1.0, 0.0);
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, shift, "in"))
        .unwrap();
    let out = plug(&graph, shift, "out");
    let ctx = Context::with_frame(3.0);

    assert_eq!(graph.get_value(out, &ctx).unwrap(), Value::float(3.0));
    let dirtied = graph
        .set_value(plug(&graph, shift, "offset"), 5.0)
        .unwrap();
    assert!(dirtied.contains(&out));
    assert_eq!(graph.get_value(out, &ctx).unwrap(), Value::float(8.0));
}

#[test]
fn test_warp_without_frame_reports_missing_variable() {
    let mut graph = Graph::new();
    let source = graph.add_node("source", FrameSource::new()).unwrap();
    let shift = warp(&mut graph, "shift", 1.0, 1.0);
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, shift, "in"))
        .unwrap();

    let result = graph.get_value(plug(&graph, shift, "out"), &Context::new());
    assert!(matches!(result, Err(GraphError::MissingVariable { .. })));
}

#[test]
fn test_context_variables_override_upstream() {
    let mut graph = Graph::new();
    let source = graph.add_node("source", FrameSource::new()).unwrap();
    let vars = graph.add_node("vars", ContextVariables::new()).unwrap();
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, vars, "in"))
        .unwrap();

    let mut variables = BTreeMap::new();
    variables.insert("frame".to_string(), Value::float(42.0));
    graph
        .set_value(plug(&graph, vars, "variables"), Value::Map(variables))
        .unwrap();

    let ctx = Context::with_frame(1.0);
    let value = graph.get_value(plug(&graph, vars, "out"), &ctx).unwrap();
    assert_eq!(value, Value::float(42.0));
    assert_eq!(ctx.frame().unwrap(), 1.0);
}

#[test]
fn test_time_warp_inside_context_variables() {
    let mut graph = Graph::new();
    let source = graph.add_node("source", FrameSource::new()).unwrap();
    let shift = warp(&mut graph, "shift", 1.0, 1.0);
    let vars = graph.add_node("vars", ContextVariables::new()).unwrap();
    graph
        .connect(plug(&graph, source, "out"), plug(&graph, shift, "in"))
        .unwrap();
    graph
        .connect(plug(&graph, shift, "out"), plug(&graph, vars, "in"))
        .unwrap();

    let mut variables = BTreeMap::new();
    variables.insert("frame".to_string(), Value::Int(10));
    graph
        .set_value(plug(&graph, vars, "variables"), Value::Map(variables))
        .unwrap();

    let value = graph
        .get_value(plug(&graph, vars, "out"), &Context::with_frame(1.0))
        .unwrap();
    assert_eq!(value, Value::float(11.0));
}
