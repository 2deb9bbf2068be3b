//! Metamodel → GraphQL CLI
//!
//! Walks an input directory for metamodel resources, transforms each one and
//! writes it under the output directory with the `.graphqls` extension.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use metamodel_graphql::metamodel::{collect_resources, load_resource};
use metamodel_graphql::{print_schema, transform, TransformConfig, TransformError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metamodel-graphql")]
#[command(version)]
#[command(about = "Compile metamodel resources into GraphQL schemas")]
struct Cli {
    /// Directory containing metamodel resources
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the generated SDL (created if missing)
    #[arg(short, long)]
    output: PathBuf,

    /// Explicit config file, layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration as TOML before processing
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// Outcome of one resource
enum Outcome {
    Written { warnings: usize },
    Failed(String),
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when at least one resource failed
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = TransformConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(path) = &cli.write_config {
        config
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("💾 configuration written to {}", path.display());
    }

    let resources = collect_resources(&cli.input, &config.load_config())
        .with_context(|| format!("failed to walk {}", cli.input.display()))?;

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;

    println!("🔍 {} resource(s) under {}", resources.len(), cli.input.display());

    let mut failed = 0usize;
    for relative in &resources {
        match process(&cli.input, &cli.output, relative, &config) {
            Outcome::Written { warnings } => {
                println!("  ✅ {} ({} warning(s))", relative.display(), warnings);
            }
            Outcome::Failed(reason) => {
                failed += 1;
                println!("  ❌ {}", relative.display());
                eprintln!("{}", reason);
            }
        }
    }

    println!();
    println!(
        "📊 {} written, {} failed",
        resources.len() - failed,
        failed
    );

    Ok(failed == 0)
}

fn process(input: &Path, output: &Path, relative: &Path, config: &TransformConfig) -> Outcome {
    let resource = match load_resource(input, relative) {
        Ok(r) => r,
        Err(e) => return Outcome::Failed(e.to_string()),
    };

    let out = match transform(&resource.metamodel) {
        Ok(out) => out,
        Err(TransformError::Rejected(diagnostics)) => {
            return Outcome::Failed(diagnostics.format_all());
        }
        Err(e) => return Outcome::Failed(e.to_string()),
    };

    let warnings = out.diagnostics.warning_count();
    if config.diagnostics.deny_warnings && warnings > 0 {
        return Outcome::Failed(format!(
            "warnings denied by configuration:\n{}",
            out.diagnostics.format_all()
        ));
    }

    let options = config.print_options(&resource.path, &resource.digest);
    let sdl = print_schema(&out.schema, &options);

    let target = config.output_path(output, relative);
    if let Err(e) = write_output(&target, &sdl) {
        return Outcome::Failed(format!("{:#}", e));
    }

    tracing::info!(
        resource = %relative.display(),
        target = %target.display(),
        "schema written"
    );

    Outcome::Written { warnings }
}

fn write_output(target: &Path, sdl: &str) -> anyhow::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(target, sdl).with_context(|| format!("failed to write {}", target.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["metamodel-graphql", "--version"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_write_config_written_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        let saved = dir.path().join("effective.toml");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("empty.json"), r#"{"packages": []}"#).unwrap();

        let cli = Cli::try_parse_from([
            "metamodel-graphql",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--write-config",
            saved.to_str().unwrap(),
        ])
        .unwrap();
        assert!(run(cli).unwrap());

        let config = TransformConfig::load_from(Some(saved.as_path())).unwrap();
        assert_eq!(config.output.extension, "graphqls");
        assert!(output.join("empty.graphqls").exists());
    }
}
