//! Locating the example source behind an `.html` request.

use std::path::{Path, PathBuf};

/// Languages an example may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Tsx,
    Ts,
    Jsx,
    Js,
}

impl SourceKind {
    /// Lookup order for sibling sources.
    pub const ORDER: [SourceKind; 4] = [Self::Tsx, Self::Ts, Self::Jsx, Self::Js];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Tsx => "tsx",
            Self::Ts => "ts",
            Self::Jsx => "jsx",
            Self::Js => "js",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ORDER.into_iter().find(|kind| kind.extension() == ext)
    }

    pub fn is_typescript(self) -> bool {
        matches!(self, Self::Tsx | Self::Ts)
    }
}

/// A source file an example page is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSource {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl ExampleSource {
    /// File stem used as the example name.
    pub fn name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

/// Finds the first existing sibling of `html` with a source extension.
pub fn find_source(html: &Path) -> Option<ExampleSource> {
    SourceKind::ORDER.into_iter().find_map(|kind| {
        let path = html.with_extension(kind.extension());
        path.is_file().then_some(ExampleSource { path, kind })
    })
}

/// True when an `.html` file exists with real content.
///
/// Empty files and files containing only `placeholder` are rendered
/// from source instead.
pub fn is_real_page(html: &Path) -> bool {
    match std::fs::read_to_string(html) {
        Ok(content) => {
            let content = content.trim();
            !content.is_empty() && content != "placeholder"
        }
        Err(_) => false,
    }
}

/// True when the example has a sibling stylesheet.
pub fn has_stylesheet(source: &Path) -> bool {
    ["css", "less"]
        .iter()
        .any(|ext| source.with_extension(ext).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            SourceKind::from_path(Path::new("a/b.tsx")),
            Some(SourceKind::Tsx)
        );
        assert_eq!(SourceKind::from_path(Path::new("a/b.js")), Some(SourceKind::Js));
        assert_eq!(SourceKind::from_path(Path::new("a/b.less")), None);
        assert!(SourceKind::Ts.is_typescript());
        assert!(!SourceKind::Jsx.is_typescript());
    }
}
