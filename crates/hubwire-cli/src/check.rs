//! `hubwire check` - scan and report without writing artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use hubwire_codegen::{CompilationUnit, Generator};

use crate::config::HubwireConfig;

pub fn run(source: Option<String>, config: Option<String>) -> Result<()> {
    let config = HubwireConfig::resolve(config.as_deref().map(Path::new))?;

    let source = source
        .map(PathBuf::from)
        .or_else(|| config.source.clone())
        .unwrap_or_else(|| PathBuf::from("src"));

    let unit = CompilationUnit::from_dir(&source)
        .with_context(|| format!("Failed to scan {}", source.display()))?;
    let outcome = Generator::default().run(&unit);

    crate::report_diagnostics(&outcome.diagnostics);

    println!(
        "{} declaration(s) would generate, {} diagnostic(s)",
        outcome.artifacts.len(),
        outcome.diagnostics.len()
    );

    if outcome.has_errors() {
        bail!("check found errors");
    }
    Ok(())
}
