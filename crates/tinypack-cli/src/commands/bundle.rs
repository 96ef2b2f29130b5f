//! `tinypack bundle`: write the bundle artifact.

use std::path::PathBuf;

use clap::Args;
use tinypack_engine::{BundleReport, Bundler, ConfigFile};

use super::{load_config, OrderArg, ProjectArgs};
use crate::output::StyledOutput;

/// Arguments for `tinypack bundle`
#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    /// Entry module [default: ./index.js]
    pub entry: Option<PathBuf>,

    /// Output file [default: ./dist/bundle.js]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Order of module wrappers in the output
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn execute(args: BundleArgs, out: &mut StyledOutput) -> anyhow::Result<()> {
    let config = load_config(
        &args.project,
        ConfigFile {
            entry: args.entry,
            output: args.output,
            order: args.order.map(Into::into),
            ..ConfigFile::default()
        },
    )?;

    let report = Bundler::new(config).bundle()?;
    print_summary(&report, out);
    Ok(())
}

fn print_summary(report: &BundleReport, out: &mut StyledOutput) {
    out.success("Bundled");
    out.plain(&format!(" {} ", module_count(report.modules.len())));
    out.plain("to ");
    out.bold(&report.output.display().to_string());
    out.info(&format!(" ({} bytes)", report.bytes));
    out.newline();

    if !report.unresolved.is_empty() {
        out.warning_msg(&format!(
            "{} left out because {} could not be loaded or parsed",
            module_count(report.unresolved.len()),
            if report.unresolved.len() == 1 { "it" } else { "they" }
        ));
    }
    if !report.externals.is_empty() {
        out.plain(&format!(
            "Left to the runtime loader: {}",
            report.externals.join(", ")
        ));
        out.newline();
    }
    out.flush();
}

fn module_count(n: usize) -> String {
    if n == 1 {
        "1 module".to_string()
    } else {
        format!("{} modules", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_count() {
        assert_eq!(module_count(0), "0 modules");
        assert_eq!(module_count(1), "1 module");
        assert_eq!(module_count(12), "12 modules");
    }
}
