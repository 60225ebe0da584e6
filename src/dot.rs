//! Graphviz DOT serialization.

use crate::{
    config::Config,
    graph::{EdgeKind, Graph, NodeKind},
};

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

fn attributes(attrs: &[(&str, &str)]) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let attrs = attrs
        .iter()
        .map(|(key, value)| format!("{}={}", key, quote(value)))
        .collect::<Vec<String>>()
        .join(", ");
    format!(" [{}]", attrs)
}

/// Writes every node, then every edge, once each and in insertion order.
pub fn to_dot(graph: &Graph, config: &Config) -> String {
    let mut out = format!("digraph {} {{\n", quote(&config.graph_name));

    for node in graph.nodes() {
        let mut attrs = vec![];
        match node.kind {
            NodeKind::Table => attrs.push(("shape", config.table_shape.as_str())),
            NodeKind::Column => {
                if let Some(shape) = &config.column_shape {
                    attrs.push(("shape", shape.as_str()));
                }
            }
        }
        out.push_str(&format!("\t{}{};\n", quote(&node.id), attributes(&attrs)));
    }

    for edge in graph.edges() {
        let mut attrs = vec![];
        if let (EdgeKind::Joins, Some(style)) = (edge.kind, &config.join_edge_style) {
            attrs.push(("style", style.as_str()));
        }
        out.push_str(&format!(
            "\t{} -> {}{};\n",
            quote(edge.from),
            quote(edge.to),
            attributes(&attrs)
        ));
    }

    out.push_str("}\n");
    out
}
