//! # sqluml
//!
//! A library for turning SQL statements into a table/column diagram.
//!
//! # Features
//!
//! - Classify statements into schema definitions (`CREATE ...`), relationship queries
//!   (`SELECT ...`) and everything else, which is ignored.
//! - Extract table names and raw column declarations from `CREATE TABLE` statements.
//! - Extract the tables joined by a query from its `FROM` and `JOIN` clauses.
//! - Accumulate everything in an insertion-ordered graph without duplicate nodes or edges.
//! - Serialize the graph to Graphviz DOT or JSON, and render it with `dot`.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqluml::{builder::GraphBuilder, config::Config, dot::to_dot, render::Renderer};
//!
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!
//!     let statements = [
//!         "CREATE TABLE user (id INT, name VARCHAR(50), email VARCHAR(100));",
//!         "CREATE TABLE posts (id INT, title VARCHAR(100), content TEXT, user_id INT);",
//!         "SELECT users.name, posts.title FROM users INNER JOIN posts ON users.id = posts.user_id;",
//!     ];
//!
//!     let mut builder = GraphBuilder::new();
//!     for statement in statements {
//!         let outcome = builder.process(statement)?;
//!         println!("{:?}: {}", outcome, statement);
//!     }
//!     let graph = builder.finish();
//!
//!     let config = Config::default();
//!     let dot = to_dot(&graph, &config);
//!     println!("{}", dot);
//!
//!     Renderer::new(&config.renderer).render(&dot, std::path::Path::new("uml.png"))?;
//!     Ok(())
//! }
//! ```
mod arena;
pub mod ast;
pub mod builder;
pub mod config;
pub mod dot;
pub mod graph;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod source;
pub mod test_utils;

pub use builder::build_graph;
