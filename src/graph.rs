//! The diagram graph: tables and columns as nodes, `has` and `joins` as edges.
//!
//! Node identities are sanitized names, so every mutation goes through
//! [`sanitize_name`]. Nodes and edges keep their insertion order, which is the
//! order in which they are serialized.

use anyhow::anyhow;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{
    arena::{Arena, ArenaIndex},
    ast::{JoinFact, TableFact},
};

/// Maps a raw name to a node identity.
///
/// Whitespace runs become a single `_`, then anything outside `[A-Za-z0-9]` becomes `_`.
/// Distinct names may collide (`a-b` and `a b` both give `a_b`).
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        sanitized.push(if c.is_ascii_alphanumeric() { c } else { '_' });
    }
    sanitized
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Table,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Has,
    Joins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GraphEdge {
    from: ArenaIndex,
    to: ArenaIndex,
    kind: EdgeKind,
}

/// A resolved edge, endpoints given by node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    arena_nodes: Arena<GraphNode>,
    node_ids: IndexMap<String, ArenaIndex>,
    edges: IndexSet<GraphEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_node(&mut self, name: &str, kind: NodeKind) -> ArenaIndex {
        let id = sanitize_name(name);
        if let Some(idx) = self.node_ids.get(&id) {
            let existing = &self.arena_nodes[*idx];
            if existing.kind != kind {
                log::debug!(
                    "Node {} already exists as a {} node, not adding it as a {} node",
                    id,
                    existing.kind,
                    kind
                );
            }
            return *idx;
        }
        let idx = self.arena_nodes.allocate(GraphNode {
            id: id.clone(),
            kind,
        });
        self.node_ids.insert(id, idx);
        idx
    }

    /// Inserts a table node unless a node with the same identity exists.
    pub fn add_table_node(&mut self, name: &str) -> &GraphNode {
        let idx = self.add_node(name, NodeKind::Table);
        &self.arena_nodes[idx]
    }

    /// Inserts a column node unless a node with the same identity exists.
    pub fn add_column_node(&mut self, name: &str) -> &GraphNode {
        let idx = self.add_node(name, NodeKind::Column);
        &self.arena_nodes[idx]
    }

    /// Inserts a directed edge between two existing nodes.
    ///
    /// Returns `Ok(false)` if the edge was already there. Both endpoints must have been
    /// added beforehand; otherwise the graph is left untouched and an error is returned.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind) -> anyhow::Result<bool> {
        let from_id = sanitize_name(from);
        let to_id = sanitize_name(to);
        let from_idx = *self
            .node_ids
            .get(&from_id)
            .ok_or(anyhow!("Cannot add {} edge from missing node {}", kind, from_id))?;
        let to_idx = *self
            .node_ids
            .get(&to_id)
            .ok_or(anyhow!("Cannot add {} edge to missing node {}", kind, to_id))?;

        Ok(self.edges.insert(GraphEdge {
            from: from_idx,
            to: to_idx,
            kind,
        }))
    }

    /// Adds the table, then each column with a `has` edge, in declaration order.
    pub fn apply_table_fact(&mut self, fact: &TableFact) -> anyhow::Result<()> {
        self.add_table_node(&fact.name);
        for column in &fact.columns {
            self.add_column_node(&column.raw_declaration);
            self.add_edge(&fact.name, &column.raw_declaration, EdgeKind::Has)?;
        }
        Ok(())
    }

    /// Adds a `joins` edge between each pair of consecutively referenced tables.
    /// Fewer than two tables leave the graph unchanged.
    pub fn apply_join_fact(&mut self, fact: &JoinFact) -> anyhow::Result<()> {
        if fact.len() < 2 {
            return Ok(());
        }
        for table in &fact.tables {
            self.add_table_node(table);
        }
        for (from, to) in fact.pairs() {
            self.add_edge(from, to, EdgeKind::Joins)?;
        }
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_ids.get(id).map(|idx| &self.arena_nodes[*idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.arena_nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.edges.iter().map(|edge| EdgeRef {
            from: &self.arena_nodes[edge.from].id,
            to: &self.arena_nodes[edge.to].id,
            kind: edge.kind,
        })
    }

    /// Whether the edge exists; endpoints are node identities.
    pub fn has_edge(&self, from: &str, to: &str, kind: EdgeKind) -> bool {
        match (self.node_ids.get(from), self.node_ids.get(to)) {
            (Some(from), Some(to)) => self.edges.contains(&GraphEdge {
                from: *from,
                to: *to,
                kind,
            }),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.arena_nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena_nodes.is_empty()
    }

    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self
                .nodes()
                .map(|node| ExportNode {
                    id: node.id.clone(),
                    kind: node.kind,
                })
                .collect(),
            edges: self
                .edges()
                .map(|edge| ExportEdge {
                    from: edge.from.to_owned(),
                    to: edge.to.to_owned(),
                    kind: edge.kind,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportNode {
    pub id: String,
    pub kind: NodeKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// Serializable snapshot of a [`Graph`], nodes and edges in insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnSpec;

    fn table(name: &str, columns: &[&str]) -> TableFact {
        TableFact {
            name: name.to_owned(),
            columns: columns.iter().map(|col| ColumnSpec::new(col)).collect(),
        }
    }

    fn join(tables: &[&str]) -> JoinFact {
        JoinFact {
            tables: tables.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("user"), "user");
        assert_eq!(sanitize_name("id INT"), "id_INT");
        assert_eq!(sanitize_name("name VARCHAR(50)"), "name_VARCHAR_50_");
        assert_eq!(sanitize_name("a  \t b"), "a_b");
        assert_eq!(sanitize_name("shop.orders"), "shop_orders");
        assert_eq!(sanitize_name("café"), "caf_");
        assert_eq!(sanitize_name("a-b"), sanitize_name("a b"));
        assert_eq!(
            sanitize_name(&sanitize_name("x y(1)")),
            sanitize_name("x y(1)")
        );
    }

    #[test]
    fn test_nodes_are_idempotent() {
        let mut graph = Graph::new();
        graph.add_table_node("user");
        graph.add_table_node("user");
        graph.add_column_node("user");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node("user").unwrap().kind, NodeKind::Table);
    }

    #[test]
    fn test_edge_requires_endpoints() {
        let mut graph = Graph::new();
        graph.add_table_node("users");
        assert!(graph.add_edge("users", "posts", EdgeKind::Joins).is_err());
        assert!(graph.add_edge("posts", "users", EdgeKind::Joins).is_err());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = Graph::new();
        graph.add_table_node("a");
        graph.add_table_node("b");
        assert!(graph.add_edge("a", "b", EdgeKind::Joins).unwrap());
        assert!(!graph.add_edge("a", "b", EdgeKind::Joins).unwrap());
        assert!(graph.add_edge("a", "b", EdgeKind::Has).unwrap());
        assert!(graph.add_edge("b", "a", EdgeKind::Joins).unwrap());
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_apply_table_fact_twice() {
        let fact = table("user", &["id INT", "name VARCHAR(50)"]);
        let mut once = Graph::new();
        once.apply_table_fact(&fact).unwrap();
        let mut twice = Graph::new();
        twice.apply_table_fact(&fact).unwrap();
        twice.apply_table_fact(&fact).unwrap();
        assert_eq!(once.export(), twice.export());
        assert_eq!(
            once.edges().collect::<Vec<_>>(),
            vec![
                EdgeRef {
                    from: "user",
                    to: "id_INT",
                    kind: EdgeKind::Has
                },
                EdgeRef {
                    from: "user",
                    to: "name_VARCHAR_50_",
                    kind: EdgeKind::Has
                },
            ]
        );
    }

    #[test]
    fn test_apply_join_fact_consecutive_pairs() {
        let mut graph = Graph::new();
        graph.apply_join_fact(&join(&["a", "b", "c"])).unwrap();
        assert!(graph.has_edge("a", "b", EdgeKind::Joins));
        assert!(graph.has_edge("b", "c", EdgeKind::Joins));
        assert!(!graph.has_edge("a", "c", EdgeKind::Joins));
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.nodes().all(|node| node.kind == NodeKind::Table));
    }

    #[test]
    fn test_apply_short_join_fact() {
        let mut graph = Graph::new();
        graph.apply_join_fact(&join(&[])).unwrap();
        graph.apply_join_fact(&join(&["a"])).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_shared_column_nodes() {
        let mut graph = Graph::new();
        graph.apply_table_fact(&table("user", &["id INT"])).unwrap();
        graph.apply_table_fact(&table("posts", &["id INT", "title TEXT"])).unwrap();
        let ids = graph.nodes().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["user", "id_INT", "posts", "title_TEXT"]);
        assert!(graph.has_edge("posts", "id_INT", EdgeKind::Has));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_export_serializes_kinds() {
        let mut graph = Graph::new();
        graph.apply_table_fact(&table("t", &["c"])).unwrap();
        let json = serde_json::to_string(&graph.export()).unwrap();
        assert_eq!(
            json,
            r#"{"nodes":[{"id":"t","kind":"table"},{"id":"c","kind":"column"}],"edges":[{"from":"t","to":"c","kind":"has"}]}"#
        );
    }
}
