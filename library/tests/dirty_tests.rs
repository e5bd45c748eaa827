use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use plugraph::nodes::Add;
use plugraph::{
    ComputeNode, EngineConfig, EvalContext, Graph, GraphError, GraphResult, HashAccumulator,
    NodeId, PlugDefinition, PlugId, PlugType, Value,
};

fn plug(graph: &Graph, node: NodeId, name: &str) -> PlugId {
    graph.plug(node, name).unwrap()
}

/// Node whose affects relation is supplied by the test.
struct Declared {
    plugs: Vec<PlugDefinition>,
    affects: Vec<(&'static str, &'static str)>,
}

impl ComputeNode for Declared {
    fn type_name(&self) -> &str {
        "Declared"
    }

    fn plugs(&self) -> Vec<PlugDefinition> {
        self.plugs.clone()
    }

    fn affects(&self, plug: &str) -> Vec<&str> {
        self.affects
            .iter()
            .filter(|(input, _)| *input == plug)
            .map(|(_, output)| *output)
            .collect()
    }

    fn hash(&self, _output: &str, _ctx: &EvalContext, _h: &mut HashAccumulator) -> GraphResult<()> {
        Ok(())
    }

    fn compute(&self, _output: &str, _ctx: &EvalContext) -> GraphResult<Value> {
        Ok(Value::Int(0))
    }
}

#[test]
fn test_diamond_visits_each_plug_once() {
    let mut graph = Graph::new();
    let top = graph.add_node("top", Add::new()).unwrap();
    let left = graph.add_node("left", Add::new()).unwrap();
    let right = graph.add_node("right", Add::new()).unwrap();
    let bottom = graph.add_node("bottom", Add::new()).unwrap();
    let top_sum = plug(&graph, top, "sum");
    graph.connect(top_sum, plug(&graph, left, "a")).unwrap();
    graph.connect(top_sum, plug(&graph, right, "a")).unwrap();
    graph
        .connect(plug(&graph, left, "sum"), plug(&graph, bottom, "a"))
        .unwrap();
    graph
        .connect(plug(&graph, right, "sum"), plug(&graph, bottom, "b"))
        .unwrap();

    let root = plug(&graph, top, "a");
    let dirtied = graph.set_value(root, 1.0).unwrap();

    let unique: HashSet<_> = dirtied.iter().copied().collect();
    assert_eq!(unique.len(), dirtied.len());
    assert_eq!(dirtied.len(), 9);
    assert_eq!(dirtied[0], root);
    assert_eq!(dirtied.last(), Some(&plug(&graph, bottom, "sum")));
    assert!(!dirtied.contains(&plug(&graph, top, "b")));
}

#[test]
fn test_dirty_counts_increment() {
    let mut graph = Graph::new();
    let add = graph.add_node("add", Add::new()).unwrap();
    let sum = plug(&graph, add, "sum");
    assert_eq!(graph.dirty_count(sum).unwrap(), 0);
    graph.set_value(plug(&graph, add, "a"), 1.0).unwrap();
    graph.set_value(plug(&graph, add, "b"), 1.0).unwrap();
    assert_eq!(graph.dirty_count(sum).unwrap(), 2);
}

#[test]
fn test_subscribers_receive_dirtied_plugs() {
    let mut graph = Graph::new();
    let add = graph.add_node("add", Add::new()).unwrap();
    let received: Arc<Mutex<Vec<Vec<PlugId>>>> = Arc::default();
    let sink = Arc::clone(&received);
    let id = graph.subscribe_dirtied(move |plugs| sink.lock().unwrap().push(plugs.to_vec()));

    let dirtied = graph.set_value(plug(&graph, add, "a"), 2.0).unwrap();
    assert_eq!(received.lock().unwrap().as_slice(), &[dirtied]);

    assert!(graph.unsubscribe(id));
    graph.set_value(plug(&graph, add, "a"), 3.0).unwrap();
    assert_eq!(received.lock().unwrap().len(), 1);
    assert!(!graph.unsubscribe(id));
}

#[test]
fn test_visit_budget_fails_fast_and_keeps_value() {
    let config = EngineConfig {
        dirty_visit_budget: 3,
        ..EngineConfig::default()
    };
    let mut graph = Graph::with_config(config).unwrap();
    let a = graph.add_node("a", Add::new()).unwrap();
    let b = graph.add_node("b", Add::new()).unwrap();
    let c = graph.add_node("c", Add::new()).unwrap();
    graph
        .connect(plug(&graph, a, "sum"), plug(&graph, b, "a"))
        .unwrap();

    // a.a -> a.sum -> b.a -> b.sum fits the budget exactly.
    assert_eq!(graph.set_value(plug(&graph, a, "a"), 1.0).unwrap().len(), 4);

    graph
        .connect(plug(&graph, b, "sum"), plug(&graph, c, "a"))
        .unwrap();
    let root = plug(&graph, a, "b");
    match graph.set_value(root, 1.0) {
        Err(GraphError::CyclicAffects { .. }) => {}
        other => panic!("expected budget failure, got {:?}", other),
    }
    assert_eq!(graph.static_value(root).unwrap(), None);
    assert_eq!(graph.dirty_count(plug(&graph, c, "sum")).unwrap(), 1);
}

#[test]
fn test_cyclic_affects_declaration_rejected() {
    let mut graph = Graph::new();
    let node = Declared {
        plugs: vec![
            PlugDefinition::input("in", PlugType::Int),
            PlugDefinition::output("x", PlugType::Int),
            PlugDefinition::output("y", PlugType::Int),
        ],
        affects: vec![("in", "x"), ("x", "y"), ("y", "x")],
    };
    assert!(matches!(
        graph.add_node("loop", node),
        Err(GraphError::CyclicAffects { .. })
    ));
    assert!(graph.node("loop").is_err());
}

#[test]
fn test_output_affecting_input_rejected() {
    let mut graph = Graph::new();
    let node = Declared {
        plugs: vec![
            PlugDefinition::input("in", PlugType::Int),
            PlugDefinition::output("out", PlugType::Int),
        ],
        affects: vec![("in", "out"), ("out", "in")],
    };
    match graph.add_node("back", node) {
        Err(GraphError::CyclicAffects { plug }) => assert_eq!(plug, "back.in"),
        other => panic!("expected CyclicAffects, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_output_to_output_affects_propagates() {
    let mut graph = Graph::new();
    let node = graph
        .add_node(
            "chain",
            Declared {
                plugs: vec![
                    PlugDefinition::input("in", PlugType::Int),
                    PlugDefinition::output("object", PlugType::Int),
                    PlugDefinition::output("bound", PlugType::Int),
                ],
                affects: vec![("in", "object"), ("object", "bound")],
            },
        )
        .unwrap();
    let dirtied = graph.set_value(plug(&graph, node, "in"), 1i64).unwrap();
    assert_eq!(
        dirtied,
        vec![
            plug(&graph, node, "in"),
            plug(&graph, node, "object"),
            plug(&graph, node, "bound"),
        ]
    );
}
