//! `hubwire generate` - run the pipeline and write artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use hubwire_codegen::{CompilationUnit, Generator, RenderOptions, write_artifacts};

use crate::config::HubwireConfig;

pub fn run(
    source: Option<String>,
    output: Option<String>,
    interfaces: bool,
    config: Option<String>,
) -> Result<()> {
    let config = HubwireConfig::resolve(config.as_deref().map(Path::new))?;

    let source = source
        .map(PathBuf::from)
        .or_else(|| config.source.clone())
        .unwrap_or_else(|| PathBuf::from("src"));
    let output = output
        .map(PathBuf::from)
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| PathBuf::from("generated"));
    let options = RenderOptions {
        emit_capability_interfaces: interfaces || config.emit_capability_interfaces,
    };

    let unit = CompilationUnit::from_dir(&source)
        .with_context(|| format!("Failed to scan {}", source.display()))?;
    let outcome = Generator::new(options).run(&unit);

    crate::report_diagnostics(&outcome.diagnostics);

    write_artifacts(&outcome.artifacts, &output)
        .with_context(|| format!("Failed to write artifacts to {}", output.display()))?;

    println!(
        "Generated {} artifact(s) in {}",
        outcome.artifacts.len(),
        output.display()
    );

    if outcome.has_errors() {
        bail!("generation completed with errors");
    }
    Ok(())
}
