//! Removal of compile and build output.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::settings::Settings;

fn remove_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Removes `lib`, `es` and the compiled `assets/*.css`.
pub fn clean_compile(settings: &Settings) -> io::Result<()> {
    remove_dir(&settings.path("lib"))?;
    remove_dir(&settings.path("es"))?;

    let assets = settings.path("assets");
    if assets.is_dir() {
        for entry in fs::read_dir(&assets)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "css") {
                fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}

/// Removes `build`.
pub fn clean_build(settings: &Settings) -> io::Result<()> {
    remove_dir(&settings.path("build"))
}

pub fn clean(settings: &Settings) -> io::Result<()> {
    clean_compile(settings)?;
    clean_build(settings)
}
