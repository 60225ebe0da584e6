use serde::Serialize;

use crate::{
    ast::StatementKind,
    graph::{Graph, sanitize_name},
    parser::{classify, parse_join_fact, parse_table_fact},
};

/// What happened to a single statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// The extracted facts were applied in full.
    Applied(StatementKind),
    /// The statement was recognized but only partially understood; whatever could be
    /// extracted was applied.
    Degraded { kind: StatementKind, reason: String },
    /// Not a statement kind that contributes to the diagram.
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub applied: usize,
    pub degraded: usize,
    pub skipped: usize,
}

impl BuildReport {
    fn record(&mut self, outcome: &StatementOutcome) {
        match outcome {
            StatementOutcome::Applied(_) => self.applied += 1,
            StatementOutcome::Degraded { .. } => self.degraded += 1,
            StatementOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.applied + self.degraded + self.skipped
    }
}

/// Feeds statements, in order, into a graph it owns until [`GraphBuilder::finish`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    report: BuildReport,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn finish(self) -> Graph {
        log::info!(
            "Built graph with {} nodes and {} edges from {} statements ({} applied, {} degraded, {} skipped)",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.report.total(),
            self.report.applied,
            self.report.degraded,
            self.report.skipped
        );
        self.graph
    }

    pub fn process_all<S: AsRef<str>>(&mut self, statements: &[S]) -> anyhow::Result<()> {
        for statement in statements {
            self.process(statement.as_ref())?;
        }
        Ok(())
    }

    /// Classifies one statement and applies whatever facts it yields.
    ///
    /// Malformed statements never fail; they come back as [`StatementOutcome::Degraded`].
    /// An error here means the graph rejected a mutation.
    pub fn process(&mut self, statement: &str) -> anyhow::Result<StatementOutcome> {
        let kind = classify(statement);
        log::debug!("[{}] {}", kind, statement.trim());

        let outcome = match kind {
            StatementKind::SchemaDefinition => self.process_schema_definition(statement)?,
            StatementKind::RelationshipQuery => self.process_relationship_query(statement)?,
            StatementKind::Unrecognized => StatementOutcome::Skipped,
        };

        if let StatementOutcome::Degraded { kind, reason } = &outcome {
            log::warn!(
                "Degraded {} statement ({}): {}",
                kind,
                reason,
                statement.trim()
            );
        }
        self.report.record(&outcome);
        Ok(outcome)
    }

    fn process_schema_definition(&mut self, statement: &str) -> anyhow::Result<StatementOutcome> {
        let kind = StatementKind::SchemaDefinition;
        let fact = parse_table_fact(statement);

        if sanitize_name(&fact.name).is_empty() {
            return Ok(StatementOutcome::Degraded {
                kind,
                reason: "no table name".to_owned(),
            });
        }

        self.graph.apply_table_fact(&fact)?;

        if fact.columns.is_empty() {
            Ok(StatementOutcome::Degraded {
                kind,
                reason: format!("no columns found for table {}", fact.name),
            })
        } else {
            Ok(StatementOutcome::Applied(kind))
        }
    }

    fn process_relationship_query(&mut self, statement: &str) -> anyhow::Result<StatementOutcome> {
        let kind = StatementKind::RelationshipQuery;
        let fact = match parse_join_fact(statement) {
            Ok(fact) => fact,
            Err(err) => {
                return Ok(StatementOutcome::Degraded {
                    kind,
                    reason: err.to_string(),
                });
            }
        };

        if fact.is_empty() {
            return Ok(StatementOutcome::Degraded {
                kind,
                reason: "no table references".to_owned(),
            });
        }
        if fact.len() < 2 {
            return Ok(StatementOutcome::Degraded {
                kind,
                reason: format!("only one table referenced ({})", fact.tables[0]),
            });
        }

        self.graph.apply_join_fact(&fact)?;
        Ok(StatementOutcome::Applied(kind))
    }
}

/// Builds the diagram graph for a sequence of statements.
pub fn build_graph<S: AsRef<str>>(statements: &[S]) -> anyhow::Result<Graph> {
    let mut builder = GraphBuilder::new();
    builder.process_all(statements)?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeKind, NodeKind};

    const CREATE_USER: &str = "CREATE TABLE user (id INT, name VARCHAR(50));";
    const SELECT_JOIN: &str =
        "SELECT users.name, posts.title FROM users INNER JOIN posts ON users.id = posts.user_id;";
    const DROP_USER: &str = "DROP TABLE user;";

    #[test]
    fn test_schema_definition_scenario() {
        let graph = build_graph(&[CREATE_USER]).unwrap();
        assert_eq!(graph.node("user").unwrap().kind, NodeKind::Table);
        assert_eq!(graph.node("id_INT").unwrap().kind, NodeKind::Column);
        assert_eq!(
            graph.node("name_VARCHAR_50_").unwrap().kind,
            NodeKind::Column
        );
        assert!(graph.has_edge("user", "id_INT", EdgeKind::Has));
        assert!(graph.has_edge("user", "name_VARCHAR_50_", EdgeKind::Has));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_relationship_query_scenario() {
        let graph = build_graph(&[SELECT_JOIN]).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge("users", "posts", EdgeKind::Joins));
    }

    #[test]
    fn test_unrecognized_statement_is_skipped() {
        let mut builder = GraphBuilder::new();
        builder.process(CREATE_USER).unwrap();
        let before = builder.graph().export();
        assert_eq!(
            builder.process(DROP_USER).unwrap(),
            StatementOutcome::Skipped
        );
        assert_eq!(builder.graph().export(), before);
    }

    #[test]
    fn test_statements_do_not_interfere() {
        let isolated: usize = [CREATE_USER, SELECT_JOIN, DROP_USER]
            .iter()
            .map(|stmt| build_graph(&[stmt]).unwrap().edge_count())
            .sum();
        let combined = build_graph(&[CREATE_USER, SELECT_JOIN, DROP_USER]).unwrap();
        assert_eq!(combined.edge_count(), isolated);
        assert_eq!(combined.edge_count(), 3);
    }

    #[test]
    fn test_outcomes_and_report() {
        let mut builder = GraphBuilder::new();
        assert_eq!(
            builder.process(CREATE_USER).unwrap(),
            StatementOutcome::Applied(StatementKind::SchemaDefinition)
        );
        assert!(matches!(
            builder.process("CREATE TABLE lonely;").unwrap(),
            StatementOutcome::Degraded {
                kind: StatementKind::SchemaDefinition,
                ..
            }
        ));
        assert!(matches!(
            builder.process("SELECT 1;").unwrap(),
            StatementOutcome::Degraded {
                kind: StatementKind::RelationshipQuery,
                ..
            }
        ));
        assert!(matches!(
            builder.process("SELECT * FROM users;").unwrap(),
            StatementOutcome::Degraded { .. }
        ));
        assert!(matches!(
            builder.process("SELECT 'broken FROM a JOIN b").unwrap(),
            StatementOutcome::Degraded { .. }
        ));
        assert_eq!(
            builder.process(DROP_USER).unwrap(),
            StatementOutcome::Skipped
        );
        assert_eq!(
            builder.report(),
            BuildReport {
                applied: 1,
                degraded: 4,
                skipped: 1
            }
        );

        let graph = builder.finish();
        // the lonely table still shows up, the single-table query does not
        assert!(graph.node("lonely").is_some());
        assert!(graph.node("users").is_none());
    }

    #[test]
    fn test_empty_join_fact_reason() {
        let mut builder = GraphBuilder::new();
        for statement in [
            "SELECT 1;",
            "SELECT * FROM (SELECT 1);",
            "SELECT a JOIN b ON a.x = b.x FROM",
        ] {
            assert_eq!(
                builder.process(statement).unwrap(),
                StatementOutcome::Degraded {
                    kind: StatementKind::RelationshipQuery,
                    reason: "no table references".to_owned(),
                },
                "{}",
                statement
            );
        }
        assert!(builder.graph().is_empty());
    }

    #[test]
    fn test_operators_keep_join_edges() {
        let graph = build_graph(&["SELECT * FROM a JOIN b ON a.flags & b.mask = 1;"]).unwrap();
        assert!(graph.has_edge("a", "b", EdgeKind::Joins));

        let graph = build_graph(&[
            "SELECT EXTRACT(YEAR FROM created_at) FROM orders JOIN users ON orders.uid = users.id;",
        ])
        .unwrap();
        assert!(graph.has_edge("orders", "users", EdgeKind::Joins));
        assert!(graph.node("created_at").is_none());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_nameless_table_leaves_graph_untouched() {
        let mut builder = GraphBuilder::new();
        let outcome = builder.process("CREATE TABLE (id INT);").unwrap();
        assert!(matches!(outcome, StatementOutcome::Degraded { .. }));
        assert!(builder.graph().is_empty());
    }
}
