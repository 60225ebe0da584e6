use std::path::PathBuf;
use std::time::Instant;

use clap::Parser as ClapParser;
use clap::Subcommand;
use serde::Serialize;
use sqluml::builder::{BuildReport, GraphBuilder};
use sqluml::config::Config;
use sqluml::dot::to_dot;
use sqluml::graph::{Graph, GraphExport};
use sqluml::render::Renderer;
use sqluml::source::read_statements;

#[derive(clap::Parser)]
#[command(name = "sqluml")]
#[command(about = "Table and relationship diagrams from SQL statements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the diagram to an image with Graphviz.
    Render(RenderCommand),
    /// Print the diagram as DOT.
    Dot(InputArgs),
    /// Print the diagram graph as JSON.
    Graph(GraphCommand),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Path to the SQL file or directory containing SQL files.
    #[arg(value_name = "SQL_[FILE|DIR]")]
    sql: PathBuf,
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct RenderCommand {
    #[command(flatten)]
    input: InputArgs,
    /// Path of the rendered image.
    #[arg(short, long, default_value = "uml.png")]
    output: PathBuf,
}

#[derive(clap::Args)]
struct GraphCommand {
    #[command(flatten)]
    input: InputArgs,
    /// Pretty-print the output graph.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct OutGraph {
    graph: GraphExport,
    report: BuildReport,
}

fn build(input: &InputArgs) -> anyhow::Result<(Config, Graph, BuildReport)> {
    let config = Config::load_or_default(input.config.as_deref())?;
    let statements = read_statements(&input.sql)?;

    let mut builder = GraphBuilder::new();
    builder.process_all(&statements)?;
    let report = builder.report();
    Ok((config, builder.finish(), report))
}

fn main() -> anyhow::Result<()> {
    let now = Instant::now();

    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Render(render_command) => {
            let (config, graph, _) = build(&render_command.input)?;
            let renderer = Renderer::new(&config.renderer);
            renderer.render(&to_dot(&graph, &config), &render_command.output)?;
            println!(
                "UML diagram saved as '{}'",
                render_command.output.display()
            );
        }
        Commands::Dot(input) => {
            let (config, graph, _) = build(input)?;
            print!("{}", to_dot(&graph, &config));
        }
        Commands::Graph(graph_command) => {
            let (_, graph, report) = build(&graph_command.input)?;
            let out_graph = OutGraph {
                graph: graph.export(),
                report,
            };
            let out_str = if graph_command.pretty {
                serde_json::to_string_pretty(&out_graph)?
            } else {
                serde_json::to_string(&out_graph)?
            };
            println!("{}", out_str);
        }
    }

    let elapsed = now.elapsed();
    log::info!("Elapsed: {:.2?}", elapsed);

    Ok(())
}
