//! Tinypack CLI
//!
//! Bundles a graph of JavaScript modules into one script, or prints the
//! dependency graph the bundle would contain.

mod commands;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{bundle::BundleArgs, graph::GraphArgs};
use output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "tinypack")]
#[command(about = "Minimal JavaScript module bundler", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// When to use colors
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle an entry module and its relative imports into one file
    Bundle(BundleArgs),

    /// Print the dependency graph reachable from an entry module
    Graph(GraphArgs),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));
    let result = match cli.command {
        Commands::Bundle(args) => commands::bundle::execute(args, &mut out),
        Commands::Graph(args) => commands::graph::execute(args, &mut out),
    };

    if let Err(e) = result {
        out.error_msg(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bundle_flags() {
        let cli = Cli::try_parse_from([
            "tinypack",
            "bundle",
            "src/main.js",
            "-o",
            "out/app.js",
            "--order",
            "dependencies-first",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Bundle(args) = cli.command else {
            panic!("expected bundle command");
        };
        assert_eq!(args.entry.as_deref(), Some(std::path::Path::new("src/main.js")));
        assert_eq!(args.output.as_deref(), Some(std::path::Path::new("out/app.js")));
    }

    #[test]
    fn test_invalid_color_rejected() {
        assert!(Cli::try_parse_from(["tinypack", "--color", "sometimes", "graph"]).is_err());
    }
}
