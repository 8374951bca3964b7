//! Static example pages for the `build` task.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use vctools_core::TaskError;
use vctools_server::{ExampleRenderer, ExampleSource, SourceKind};

use crate::settings::Settings;

/// Example sources to render, sorted by file name.
///
/// Files starting with `~` are scratch files. A `.ts`/`.tsx` example hides
/// a `.js`/`.jsx` file with the same stem.
pub fn select_examples(dir: &Path) -> io::Result<Vec<ExampleSource>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('~') {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();

    let shadowed: BTreeSet<PathBuf> = files
        .iter()
        .filter(|f| SourceKind::from_path(f).is_some_and(SourceKind::is_typescript))
        .flat_map(|f| [f.with_extension("js"), f.with_extension("jsx")])
        .collect();

    Ok(files
        .into_iter()
        .filter(|f| !shadowed.contains(f))
        .filter_map(|path| SourceKind::from_path(&path).map(|kind| ExampleSource { path, kind }))
        .collect())
}

/// Renders every example into `build/examples/<name>.html`.
pub fn build_examples(settings: &Settings) -> Result<usize, TaskError> {
    let dir = settings.path("examples");
    if !dir.is_dir() {
        return Ok(0);
    }

    let renderer = ExampleRenderer::new(&settings.cwd, &settings.project, settings.port)
        .map_err(|e| TaskError::message(e.to_string()))?;
    let dest = settings.path("build/examples");
    fs::create_dir_all(&dest)?;

    let sources = select_examples(&dir)?;
    for source in &sources {
        let html = renderer
            .render(source, &Default::default())
            .map_err(|e| TaskError::message(e.to_string()))?;
        fs::write(dest.join(format!("{}.html", source.name())), html)?;
    }
    info!("Rendered {} example page(s)", sources.len());
    Ok(sources.len())
}
