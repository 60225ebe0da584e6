use sqluml::{
    build_graph,
    config::Config,
    dot::to_dot,
    test_utils::{GRAPH_TESTS_FILE, TestGraph, TestGraphData},
};

fn load_tests() -> TestGraphData {
    let graph_test_file =
        std::fs::read_to_string(GRAPH_TESTS_FILE).expect("Cannot open graph test cases");
    toml::from_str(&graph_test_file).expect("Cannot parse test cases defined in toml")
}

#[test]
fn test_graphs() {
    for test in load_tests().tests {
        println!("Testing graph: {}", test.name);
        let graph = build_graph(&test.statements).unwrap();
        assert_eq!(TestGraph::actual_nodes(&graph), test.nodes, "{}", test.name);
        assert_eq!(TestGraph::actual_edges(&graph), test.edges, "{}", test.name);
    }
}

#[test]
fn test_graphs_are_case_insensitive_to_keywords() {
    for test in load_tests().tests {
        let upper = test
            .statements
            .iter()
            .map(|stmt| uppercase_keywords(stmt))
            .collect::<Vec<_>>();
        let graph = build_graph(&upper).unwrap();
        assert_eq!(TestGraph::actual_edges(&graph), test.edges, "{}", test.name);
    }
}

fn uppercase_keywords(sql: &str) -> String {
    sql.split(' ')
        .map(|word| match word.to_lowercase().as_str() {
            "create" | "table" | "select" | "from" | "join" | "left" | "outer" | "inner"
            | "on" | "as" => word.to_uppercase(),
            _ => word.to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_statement_order_is_insertion_order() {
    let graph = build_graph(&[
        "SELECT * FROM b JOIN a ON a.id = b.id;",
        "CREATE TABLE a (id INT);",
    ])
    .unwrap();
    let ids = graph.nodes().map(|node| node.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["b", "a", "id_INT"]);
}

#[test]
fn test_dot_lists_every_fixture_node() {
    for test in load_tests().tests {
        let graph = build_graph(&test.statements).unwrap();
        let dot = to_dot(&graph, &Config::default());
        for node in &test.nodes {
            assert!(dot.contains(&format!("\t\"{}\"", node.id)), "{}", test.name);
        }
        for edge in &test.edges {
            assert!(
                dot.contains(&format!("\t\"{}\" -> \"{}\"", edge.from, edge.to)),
                "{}",
                test.name
            );
        }
    }
}
