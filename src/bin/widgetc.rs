use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use widgetc::{
    BatchOptions, CompiledPlatform, DataContext, GeneratorOptions, Size, StyleConfig,
    WidgetLayout,
};

#[derive(Parser, Debug)]
#[command(
    name = "widgetc",
    version,
    about = "Compile JSON widget layouts to Glance and SwiftUI sources",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    generate: GenerateArgs,

    /// Log library events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one layout to a standalone HTML preview page.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Directory searched recursively for layout JSON files.
    #[arg(short, long, default_value = "layouts")]
    input: PathBuf,

    /// Output directory; files go to `glance/` and `swiftui/` below it.
    #[arg(short, long, default_value = "generated")]
    output: PathBuf,

    /// Only generate these widgets (file stem or layout name).
    #[arg(short, long = "widget")]
    widgets: Vec<String>,

    /// Target platform.
    #[arg(short, long, value_enum, default_value_t = PlatformChoice::All)]
    platform: PlatformChoice,

    /// Style configuration JSON (palettes, alignment and font tables).
    #[arg(long)]
    style: Option<PathBuf>,

    /// Package of generated Kotlin files.
    #[arg(long, default_value = widgetc::DEFAULT_KOTLIN_PACKAGE)]
    kotlin_package: String,

    /// Worker threads.
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Layout JSON file.
    #[arg(long)]
    layout: PathBuf,

    /// Data JSON file (the `data` / `item` root).
    #[arg(long)]
    data: PathBuf,

    /// Settings JSON object.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Declared size id; defaults to the largest.
    #[arg(long)]
    size: Option<String>,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Style configuration JSON.
    #[arg(long)]
    style: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlatformChoice {
    Glance,
    Swiftui,
    All,
}

impl PlatformChoice {
    fn platforms(self) -> Vec<CompiledPlatform> {
        match self {
            PlatformChoice::Glance => vec![CompiledPlatform::Glance],
            PlatformChoice::Swiftui => vec![CompiledPlatform::SwiftUi],
            PlatformChoice::All => CompiledPlatform::ALL.to_vec(),
        }
    }
}

/// A widget failed; the others were still written.
const EXIT_WIDGET_FAILED: u8 = 1;
/// Bad arguments, unreadable configuration or input.
const EXIT_SETUP: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let result = match cli.cmd {
        Some(Command::Preview(args)) => cmd_preview(args).map(|()| ExitCode::SUCCESS),
        None => cmd_generate(cli.generate),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_SETUP)
        }
    }
}

fn load_style(path: Option<&Path>) -> anyhow::Result<StyleConfig> {
    match path {
        Some(p) => StyleConfig::from_path(p)
            .with_context(|| format!("load style config '{}'", p.display())),
        None => Ok(StyleConfig::builtin()),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<ExitCode> {
    let config = load_style(args.style.as_deref())?;
    if !args.input.is_dir() {
        anyhow::bail!("input directory '{}' does not exist", args.input.display());
    }
    let options = GeneratorOptions {
        kotlin_package: args.kotlin_package,
    };
    let batch = BatchOptions {
        platforms: args.platform.platforms(),
        widgets: args.widgets,
        jobs: args.jobs,
    };

    let report = widgetc::generate_batch(&args.input, &args.output, &config, &options, &batch)?;
    if report.outcomes.is_empty() {
        eprintln!("no layouts found in {}", args.input.display());
    }
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(files) => {
                for f in files {
                    let mark = match f.status {
                        widgetc::WriteStatus::Written => "wrote",
                        widgetc::WriteStatus::Unchanged => "unchanged",
                    };
                    eprintln!("{mark} {}", f.path.display());
                }
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
    let failed = report.failures().count();
    eprintln!(
        "{} widget(s): {} written, {} unchanged, {failed} failed",
        report.outcomes.len(),
        report.written(),
        report.unchanged(),
    );
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_WIDGET_FAILED)
    })
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse JSON '{}'", path.display()))
}

fn pick_size(layout: &WidgetLayout, id: Option<&str>) -> anyhow::Result<Size> {
    let spec = match id {
        Some(id) => layout
            .size(id)
            .with_context(|| format!("layout '{}' declares no size '{id}'", layout.name))?,
        None => layout
            .sizes_by_area_desc()
            .into_iter()
            .next()
            .with_context(|| format!("layout '{}' declares no sizes", layout.name))?,
    };
    Ok(spec.size())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let config = load_style(args.style.as_deref())?;
    let text = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("read layout '{}'", args.layout.display()))?;
    let layout = widgetc::parse_layout(&text)
        .with_context(|| format!("load layout '{}'", args.layout.display()))?;

    let settings: BTreeMap<String, serde_json::Value> = match &args.settings {
        Some(p) => serde_json::from_value(read_json(p)?)
            .with_context(|| format!("settings '{}' must be a JSON object", p.display()))?,
        None => BTreeMap::new(),
    };
    let ctx = DataContext {
        data: read_json(&args.data)?,
        settings,
    };
    let size = pick_size(&layout, args.size.as_deref())?;

    let page = widgetc::preview_page(&layout, &ctx, size, &config)?;
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, page)
        .with_context(|| format!("write preview '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
