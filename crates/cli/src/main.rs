//! # funcgraph
//!
//! Command line front end for the traversal pipeline. Points at a local
//! function project (or a git URL), runs the analysis and prints the
//! resulting functions and proxies maps as JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use funcgraph_traverse::{traverse_function_project, TraversalOptions};

#[derive(Debug, Parser)]
#[command(name = "funcgraph", version, about = "Map the call graph of a function project")]
struct Cli {
    /// Path to the project folder, or an http(s) git URL to clone.
    project: String,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Skip `dotnet publish` for in-process projects and read
    /// descriptors from the source tree instead.
    #[arg(long)]
    no_publish: bool,

    /// History depth for remote clones; 0 clones full history.
    #[arg(long, value_name = "N", default_value_t = 1)]
    clone_depth: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = TraversalOptions {
        publish: !cli.no_publish,
        clone_depth: (cli.clone_depth > 0).then_some(cli.clone_depth),
    };

    let result = traverse_function_project(&cli.project, &options)
        .await
        .with_context(|| format!("failed to traverse {}", cli.project))?;

    for dir in &result.temp_directories {
        log::info!("left temp directory in place: {}", dir.display());
    }

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");
    Ok(())
}
