//! `tinypack graph`: print the module graph without writing a bundle.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tinypack_engine::{Bundler, ConfigFile, FsLoader, ModuleResolver, Resolution};

use super::{load_config, ProjectArgs};
use crate::output::StyledOutput;

/// Arguments for `tinypack graph`
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// Entry module [default: ./index.js]
    pub entry: Option<PathBuf>,

    /// Print the graph as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// JSON form of a resolved graph
#[derive(Debug, Serialize)]
struct GraphJson {
    entry: String,
    modules: Vec<ModuleJson>,
    externals: Vec<String>,
    diagnostics: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ModuleJson {
    path: String,
    resolved: bool,
    dependencies: Vec<String>,
}

impl GraphJson {
    fn new(resolution: &Resolution, resolver: &ModuleResolver) -> Self {
        Self {
            entry: resolver.display_path(&resolution.entry),
            modules: resolution
                .graph
                .iter()
                .map(|(path, deps)| ModuleJson {
                    path: resolver.display_path(path),
                    resolved: !resolution.cache.is_unresolved(path),
                    dependencies: deps.iter().map(|d| resolver.display_path(d)).collect(),
                })
                .collect(),
            externals: resolution.externals.iter().cloned().collect(),
            diagnostics: resolution.diagnostics.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn execute(args: GraphArgs, out: &mut StyledOutput) -> anyhow::Result<()> {
    let config = load_config(
        &args.project,
        ConfigFile {
            entry: args.entry,
            ..ConfigFile::default()
        },
    )?;

    let bundler = Bundler::new(config);
    let resolver = bundler.module_resolver()?;
    let resolution = bundler.resolve_with(&resolver, &mut FsLoader);
    let graph = GraphJson::new(&resolution, &resolver);

    if args.json {
        out.plain(&serde_json::to_string_pretty(&graph)?);
        out.newline();
    } else {
        print_tree(&graph, out);
    }
    out.flush();
    Ok(())
}

fn print_tree(graph: &GraphJson, out: &mut StyledOutput) {
    for module in &graph.modules {
        out.bold(&module.path);
        if !module.resolved {
            out.warning(" (unresolved)");
        }
        out.newline();
        for dep in &module.dependencies {
            out.plain("  -> ");
            out.info(dep);
            out.newline();
        }
    }
    if !graph.externals.is_empty() {
        out.plain(&format!("external: {}", graph.externals.join(", ")));
        out.newline();
    }
}
