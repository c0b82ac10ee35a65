use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use abibind::codegen::{BindingGenerator, GeneratorOptions};
use abibind::config;
use abibind::domain::abi::ContractDescription;
use abibind::infrastructure::AbiScanner;

#[derive(Debug, Parser)]
#[command(
    name = "abibind",
    version,
    about = "abibind: typed Rust bindings for EVM smart contracts"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate binding modules from ABI and artifact files
    Generate(GenerateArgs),
    /// Show selectors, event topics and deployability of one artifact
    Inspect {
        /// ABI or artifact JSON file
        file: PathBuf,
    },
}

#[derive(Debug, clap::Args)]
struct GenerateArgs {
    /// Config file (default: $ABIBIND_CONFIG, ./abibind.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory or file to scan; repeatable. Overrides `artifact_paths`
    #[arg(long = "artifacts")]
    artifacts: Vec<PathBuf>,

    /// Output directory. Overrides `out_dir`
    #[arg(long)]
    out: Option<PathBuf>,

    /// Crate path generated code imports the runtime from
    #[arg(long)]
    runtime_crate: Option<String>,

    /// Only generate this contract; repeatable
    #[arg(long)]
    include: Vec<String>,

    /// Fail if the output directory is not up to date instead of writing
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Generate(generate) => run_generate(generate),
        Command::Inspect { file } => run_inspect(&file),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if !args.artifacts.is_empty() {
        config.artifact_paths = args
            .artifacts
            .iter()
            .map(|p| p.display().to_string())
            .collect();
    }
    if let Some(out) = &args.out {
        config.out_dir = out.display().to_string();
    }
    if let Some(runtime_crate) = args.runtime_crate {
        config.runtime_crate = runtime_crate;
    }
    if !args.include.is_empty() {
        config.include = args.include;
    }

    let roots = scan_roots_from_config(&config);
    let report = AbiScanner::scan_roots(&roots);
    info!(
        files = report.scanned_files,
        contracts = report.sources.len(),
        ms = report.scan_ms as u64,
        "scanned artifacts"
    );
    for error in &report.errors {
        warn!("{error}");
    }

    let sources: Vec<_> = report
        .sources
        .into_iter()
        .filter(|source| config.includes(&source.name))
        .collect();
    for name in &config.include {
        if !sources.iter().any(|s| &s.name == name) {
            warn!(contract = %name, "included contract not found");
        }
    }
    if sources.is_empty() {
        bail!("no contracts found in {}", display_roots(&roots));
    }

    let descriptions = sources
        .iter()
        .map(|source| {
            source
                .describe()
                .with_context(|| format!("invalid interface in {}", source.path.display()))
        })
        .collect::<Result<Vec<ContractDescription>>>()?;

    let generator = BindingGenerator::new(GeneratorOptions {
        runtime_crate: config.runtime_crate.clone(),
    });
    let bindings = generator.generate_all(&descriptions)?;
    let out_dir = expand_path(&config.out_dir).unwrap_or_else(|| PathBuf::from(&config.out_dir));

    if args.check {
        let stale = bindings.check(&out_dir)?;
        if !stale.is_empty() {
            for path in &stale {
                println!("out of date: {}", path.display());
            }
            bail!("{} generated file(s) out of date", stale.len());
        }
        println!("bindings in {} are up to date", out_dir.display());
        return Ok(());
    }

    let written = bindings.write_to(&out_dir)?;
    for contract in &bindings.contracts {
        println!(
            "{:<32} {}::{{{}, {}}}",
            contract.name, contract.module, contract.accessor, contract.factory
        );
    }
    println!("wrote {} file(s) to {}", written.len(), out_dir.display());
    Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
    let Some(source) = AbiScanner::load_file(file)? else {
        bail!("{} contains no ABI", file.display());
    };
    let desc = source.describe()?;

    println!("contract    {}", desc.name);
    println!(
        "deployable  {}",
        if desc.is_deployable() { "yes" } else { "no (no bytecode)" }
    );
    if let Some(ctor) = &desc.constructor {
        let inputs: Vec<String> = ctor.inputs.iter().map(|p| p.ty.canonical()).collect();
        println!(
            "constructor ({}) {}",
            inputs.join(","),
            ctor.mutability.as_str()
        );
    }

    if !desc.functions.is_empty() {
        println!();
        println!("functions");
        for function in &desc.functions {
            println!(
                "  {}  {:<48} {}",
                function.selector_hex(),
                function.signature,
                function.mutability.as_str()
            );
        }
    }

    if !desc.events.is_empty() {
        println!();
        println!("events");
        for event in &desc.events {
            let anonymous = if event.anonymous { " (anonymous)" } else { "" };
            println!("  {}  {}{}", event.topic, event.signature, anonymous);
        }
    }

    if !desc.errors.is_empty() {
        println!();
        println!("errors");
        for error in &desc.errors {
            println!("  0x{}  {}", hex::encode(error.selector), error.signature);
        }
    }

    Ok(())
}

fn scan_roots_from_config(config: &config::Config) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for raw in &config.artifact_paths {
        match expand_path(raw) {
            Some(path) if path.exists() => roots.push(path),
            Some(path) => warn!(path = %path.display(), "artifact path does not exist"),
            None => {}
        }
    }
    roots
}

fn display_roots(roots: &[PathBuf]) -> String {
    if roots.is_empty() {
        return "(no existing artifact paths)".to_string();
    }
    roots
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}
