use crate::codegen::{GeneratorOptions, SourceFile, generate};
use crate::foundation::core::CompiledPlatform;
use crate::foundation::error::{WidgetError, WidgetResult};
use crate::foundation::path::JsonPath;
use crate::layout::model::WidgetLayout;
use crate::layout::parse::parse_layout;
use crate::style::config::StyleConfig;
use anyhow::Context as _;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What a batch run covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    /// Platforms to generate for.
    pub platforms: Vec<CompiledPlatform>,
    /// Restrict the run to these widgets (file stem or layout name). Empty means all.
    pub widgets: Vec<String>,
    /// Worker threads; `None` uses the rayon default.
    pub jobs: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            platforms: CompiledPlatform::ALL.to_vec(),
            widgets: Vec::new(),
            jobs: None,
        }
    }
}

/// Whether a generated file touched the disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    /// Contents changed and were written.
    Written,
    /// The file already had these contents.
    Unchanged,
}

/// One file produced by a batch run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Platform the file targets.
    pub platform: CompiledPlatform,
    /// Output path.
    pub path: PathBuf,
    /// Write result.
    pub status: WriteStatus,
}

/// Result for one layout file, or for a requested widget no file declares.
#[derive(Debug)]
pub struct WidgetOutcome {
    /// Layout file.
    pub source: PathBuf,
    /// Widget name, or the file stem when the layout did not parse.
    pub widget: String,
    /// Files written, or the first error (scoped to the widget).
    pub result: WidgetResult<Vec<GeneratedFile>>,
}

/// Outcome of a whole batch: one entry per layout in path order, then unmatched requests.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-widget outcomes.
    pub outcomes: Vec<WidgetOutcome>,
}

impl BatchReport {
    /// `true` when every widget generated.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Failed widgets with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &WidgetError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Err(e) => Some((o.widget.as_str(), e)),
            Ok(_) => None,
        })
    }

    /// Number of files whose contents changed.
    pub fn written(&self) -> usize {
        self.files()
            .filter(|f| f.status == WriteStatus::Written)
            .count()
    }

    /// Number of files left untouched.
    pub fn unchanged(&self) -> usize {
        self.files()
            .filter(|f| f.status == WriteStatus::Unchanged)
            .count()
    }

    fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
    }
}

/// Output subdirectory of a platform.
pub fn platform_dir(platform: CompiledPlatform) -> &'static str {
    match platform {
        CompiledPlatform::Glance => "glance",
        CompiledPlatform::SwiftUi => "swiftui",
    }
}

/// All `*.json` files below `dir`, sorted by path.
pub fn discover_layouts(dir: &Path) -> WidgetResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        let entries = std::fs::read_dir(&d)
            .with_context(|| format!("read layout directory '{}'", d.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("list layout directory '{}'", d.display()))?
                .path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "json") {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// Generate every layout under `input` into `output/<platform>/`.
///
/// Widgets are independent: a failing widget produces no files and does not stop the others.
/// Layouts sharing a widget name fail together, as do requested widgets matching no layout.
/// Files are written atomically and only when their contents change.
#[tracing::instrument(skip(config, options, batch), fields(input = %input.display()))]
pub fn generate_batch(
    input: &Path,
    output: &Path,
    config: &StyleConfig,
    options: &GeneratorOptions,
    batch: &BatchOptions,
) -> WidgetResult<BatchReport> {
    let files = discover_layouts(input)?;
    let pool = build_thread_pool(batch.jobs)?;
    for p in &batch.platforms {
        let dir = output.join(platform_dir(*p));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
    }

    let loaded: Vec<Loaded> =
        pool.install(|| files.par_iter().map(|source| Loaded::read(source)).collect());
    let unmatched: Vec<&String> = batch
        .widgets
        .iter()
        .filter(|w| !loaded.iter().any(|l| l.matches(w)))
        .collect();
    let mut selected: Vec<Loaded> = loaded
        .into_iter()
        .filter(|l| batch.widgets.is_empty() || batch.widgets.iter().any(|w| l.matches(w)))
        .collect();
    reject_duplicate_names(&mut selected, input);

    let mut outcomes: Vec<WidgetOutcome> = pool.install(|| {
        selected
            .into_par_iter()
            .map(|l| l.generate(output, config, options, &batch.platforms))
            .collect()
    });
    for w in unmatched {
        tracing::warn!(widget = %w, "no layout matches requested widget");
        let err = WidgetError::config(format!("no layout named '{w}'"));
        outcomes.push(WidgetOutcome {
            source: input.to_path_buf(),
            widget: w.clone(),
            result: Err(err.in_widget(w.clone())),
        });
    }

    let report = BatchReport { outcomes };
    tracing::info!(
        widgets = report.outcomes.len(),
        written = report.written(),
        unchanged = report.unchanged(),
        failed = report.failures().count(),
        "batch finished"
    );
    Ok(report)
}

/// One discovered layout file, parsed or not.
struct Loaded {
    source: PathBuf,
    stem: String,
    layout: WidgetResult<WidgetLayout>,
}

impl Loaded {
    fn read(source: &Path) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source: source.to_path_buf(),
            stem,
            layout: load_layout(source),
        }
    }

    /// Selected by `-w`: file stem or layout name.
    fn matches(&self, widget: &str) -> bool {
        widget == self.stem || self.layout.as_ref().is_ok_and(|l| l.name == widget)
    }

    fn name(&self) -> Option<&str> {
        self.layout.as_ref().ok().map(|l| l.name.as_str())
    }

    fn generate(
        self,
        output: &Path,
        config: &StyleConfig,
        options: &GeneratorOptions,
        platforms: &[CompiledPlatform],
    ) -> WidgetOutcome {
        let layout = match self.layout {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(source = %self.source.display(), error = %e, "layout rejected");
                return WidgetOutcome {
                    source: self.source,
                    widget: self.stem.clone(),
                    result: Err(e.in_widget(self.stem)),
                };
            }
        };
        let result = generate_all(&layout, config, options, platforms)
            .and_then(|generated| write_all(output, generated))
            .map_err(|e| e.in_widget(layout.name.clone()));
        if let Err(e) = &result {
            tracing::warn!(widget = %layout.name, error = %e, "widget failed");
        }
        WidgetOutcome {
            source: self.source,
            widget: layout.name,
            result,
        }
    }
}

/// Widget names pick output file names, so a name declared twice fails every declaring file.
fn reject_duplicate_names(loaded: &mut [Loaded], input: &Path) {
    let mut by_name: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, l) in loaded.iter().enumerate() {
        if let Some(name) = l.name() {
            by_name.entry(name.to_string()).or_default().push(i);
        }
    }
    for (name, indices) in by_name.into_iter().filter(|(_, v)| v.len() > 1) {
        let sources: Vec<String> = indices
            .iter()
            .map(|&i| {
                let src = &loaded[i].source;
                src.strip_prefix(input).unwrap_or(src).display().to_string()
            })
            .collect();
        let reason = format!("widget name '{name}' is declared by {}", sources.join(", "));
        let path = JsonPath::root().field("name");
        for i in indices {
            loaded[i].layout = Err(WidgetError::schema(&path, &reason));
            loaded[i].stem = name.clone();
        }
    }
}

fn load_layout(source: &Path) -> WidgetResult<WidgetLayout> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("read layout '{}'", source.display()))?;
    parse_layout(&text)
}

/// Every platform in memory first so a failure leaves no partial output.
fn generate_all(
    layout: &WidgetLayout,
    config: &StyleConfig,
    options: &GeneratorOptions,
    platforms: &[CompiledPlatform],
) -> WidgetResult<Vec<(CompiledPlatform, SourceFile)>> {
    platforms
        .iter()
        .map(|p| Ok((*p, generate(layout, *p, config, options)?)))
        .collect()
}

fn write_all(
    output: &Path,
    generated: Vec<(CompiledPlatform, SourceFile)>,
) -> WidgetResult<Vec<GeneratedFile>> {
    generated
        .into_iter()
        .map(|(platform, file)| {
            let path = output.join(platform_dir(platform)).join(&file.file_name);
            let status = write_if_changed(&path, &file.contents)?;
            Ok(GeneratedFile {
                platform,
                path,
                status,
            })
        })
        .collect()
}

/// Temp file plus rename, skipped when the file already holds `contents`.
pub(crate) fn write_if_changed(path: &Path, contents: &str) -> WidgetResult<WriteStatus> {
    if let Ok(existing) = std::fs::read_to_string(path)
        && existing == contents
    {
        return Ok(WriteStatus::Unchanged);
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{name}.tmp"));
    std::fs::write(&tmp, contents).with_context(|| format!("write '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replace '{}'", path.display()))?;
    Ok(WriteStatus::Written)
}

fn build_thread_pool(jobs: Option<usize>) -> WidgetResult<rayon::ThreadPool> {
    if jobs == Some(0) {
        return Err(WidgetError::config("jobs must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = jobs {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| WidgetError::config(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/codegen/batch.rs"]
mod tests;
