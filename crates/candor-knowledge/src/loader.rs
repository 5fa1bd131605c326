use std::path::{Path, PathBuf};

use candor_common::{Error, Result};
use tracing::{debug, info, warn};

use crate::context::KnowledgeContext;

/// Document formats the loader can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Scans a directory of resume material and concatenates it into a single
/// [`KnowledgeContext`]. Individual document failures are logged and skipped.
pub struct KnowledgeLoader {
    dir: PathBuf,
}

impl KnowledgeLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self) -> KnowledgeContext {
        if !self.dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.dir) {
                warn!(
                    "failed to create knowledge directory {}: {}",
                    self.dir.display(),
                    e
                );
                return KnowledgeContext::empty();
            }
            info!("created empty knowledge directory {}", self.dir.display());
            return KnowledgeContext::empty();
        }

        let entries = match self.list_documents() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to read knowledge directory: {}", e);
                return KnowledgeContext::empty();
            }
        };

        let mut text = String::new();
        let mut sources = Vec::new();
        for (path, kind) in entries {
            let name = file_name(&path);
            match extract(&path, kind) {
                Ok(content) => {
                    debug!(file = %name, chars = content.len(), "loaded document");
                    text.push_str(&content);
                    sources.push(name);
                }
                Err(e) => warn!("error loading {}: {}", name, e),
            }
        }

        info!(
            "loaded {} document(s) from {}",
            sources.len(),
            self.dir.display()
        );
        KnowledgeContext::new(text, sources)
    }

    /// Supported files in the directory, sorted by file name.
    fn list_documents(&self) -> Result<Vec<(PathBuf, DocumentKind)>> {
        let mut docs = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            if let Some(kind) = DocumentKind::from_path(&path) {
                docs.push((path, kind));
            }
        }
        docs.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
        Ok(docs)
    }
}

fn extract(path: &Path, kind: DocumentKind) -> Result<String> {
    match kind {
        DocumentKind::Text => Ok(std::fs::read_to_string(path)?),
        DocumentKind::Pdf => extract_pdf(path),
    }
}

fn extract_pdf(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| Error::Knowledge(format!("failed to open PDF: {e}")))?;

    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        let page_text = doc.extract_text(&[*page_number]).map_err(|e| {
            Error::Knowledge(format!("failed to extract page {page_number}: {e}"))
        })?;
        text.push_str(&page_text);
        text.push('\n');
    }
    Ok(text)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_created_empty() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("data");

        let ctx = KnowledgeLoader::new(&dir).load();

        assert!(ctx.is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn concatenates_text_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_projects.txt"), "Built a compiler.\n").unwrap();
        std::fs::write(dir.path().join("a_summary.txt"), "Ten years in infra.\n").unwrap();

        let ctx = KnowledgeLoader::new(dir.path()).load();

        assert_eq!(ctx.as_str(), "Ten years in infra.\nBuilt a compiler.\n");
        assert_eq!(ctx.sources(), ["a_summary.txt", "b_projects.txt"]);
    }

    #[test]
    fn ignores_unsupported_extensions_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "markdown").unwrap();
        std::fs::write(dir.path().join("photo.png"), [0u8, 1, 2]).unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();
        std::fs::write(dir.path().join("cv.TXT"), "upper").unwrap();

        let ctx = KnowledgeLoader::new(dir.path()).load();

        assert_eq!(ctx.as_str(), "upper");
        assert_eq!(ctx.sources(), ["cv.TXT"]);
    }

    #[test]
    fn broken_documents_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"not really a pdf").unwrap();
        std::fs::write(dir.path().join("b.txt"), [0xffu8, 0xfe, 0xfd]).unwrap();
        std::fs::write(dir.path().join("c.txt"), "survivor").unwrap();

        let ctx = KnowledgeLoader::new(dir.path()).load();

        assert_eq!(ctx.as_str(), "survivor");
        assert_eq!(ctx.sources(), ["c.txt"]);
    }

    #[test]
    fn document_kind_detection() {
        assert_eq!(
            DocumentKind::from_path(Path::new("resume.pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("cover.txt")),
            Some(DocumentKind::Text)
        );
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
        assert_eq!(DocumentKind::from_path(Path::new("x.docx")), None);
    }
}
