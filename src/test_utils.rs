use std::fmt::Display;

use serde::Deserialize;

use crate::graph::{EdgeKind, Graph, NodeKind};

pub const GRAPH_TESTS_FILE: &str = "tests/graph_tests.toml";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TestNode {
    pub id: String,
    pub kind: NodeKind,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TestEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// One fixture: statements in, the complete expected graph out (in insertion order).
#[derive(Deserialize, Debug, Clone)]
pub struct TestGraph {
    pub name: String,
    pub statements: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<TestNode>,
    #[serde(default)]
    pub edges: Vec<TestEdge>,
}

impl TestGraph {
    pub fn actual_nodes(graph: &Graph) -> Vec<TestNode> {
        graph
            .nodes()
            .map(|node| TestNode {
                id: node.id.clone(),
                kind: node.kind,
            })
            .collect()
    }

    pub fn actual_edges(graph: &Graph) -> Vec<TestEdge> {
        graph
            .edges()
            .map(|edge| TestEdge {
                from: edge.from.to_owned(),
                to: edge.to.to_owned(),
                kind: edge.kind,
            })
            .collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TestGraphData {
    pub tests: Vec<TestGraph>,
}

impl Display for TestGraphData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
