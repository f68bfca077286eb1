use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "fbxbake", version)]
struct Cli {
    /// Log debug diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake a capture JSON into a copy of an FBX template.
    Bake(BakeArgs),
    /// List the top-level sections of an ASCII FBX file.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct BakeArgs {
    /// ASCII FBX template.
    #[arg(long)]
    template: PathBuf,

    /// Capture JSON.
    #[arg(long)]
    capture: PathBuf,

    /// Output file path.
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// Output directory; the file gets a timestamped name.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Captured frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Export config JSON; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// ASCII FBX file.
    #[arg(long)]
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    match cli.cmd {
        Command::Bake(args) => cmd_bake(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_bake(args: BakeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => fbxbake::ExportConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => fbxbake::ExportConfig::default(),
    };
    config.template_path = Some(args.template);
    if let Some(out) = &args.out {
        let name = out
            .file_name()
            .with_context(|| format!("output '{}' has no file name", out.display()))?;
        config.output_file = Some(name.to_string_lossy().into_owned());
        config.output_dir = out
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
    }
    if let Some(dir) = args.out_dir {
        config.output_dir = dir;
        config.output_file = None;
    }
    if let Some(fps) = args.fps {
        config.frame_rate = fps;
    }

    let capture = fbxbake::CaptureFile::from_path(&args.capture)
        .with_context(|| format!("load capture '{}'", args.capture.display()))?;
    let report = fbxbake::bake(config, capture.into_tracked()).context("bake failed")?;

    for name in &report.skipped {
        eprintln!("skipped '{name}': no matching model in template");
    }
    eprintln!(
        "wrote {} ({} curve nodes, {} curves, {} connections)",
        report.output_path.display(),
        report.curve_nodes,
        report.curves,
        report.connections
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("read '{}'", args.file.display()))?;
    let doc = fbxbake::Document::parse(&text)
        .with_context(|| format!("parse '{}'", args.file.display()))?;
    for node in &doc.nodes {
        println!("{}\t{}", node.name, node.children.len());
    }
    Ok(())
}
