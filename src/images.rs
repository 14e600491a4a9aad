use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::RdkError;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Where a resolved image came from; rendered as the caption next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    LocalFolder,
    Bundle,
    BuiltIn,
}

impl ImageSource {
    pub fn caption(&self) -> &'static str {
        match self {
            ImageSource::LocalFolder => "local folder",
            ImageSource::Bundle => "uploaded bundle",
            ImageSource::BuiltIn => "built-in repository",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub source: ImageSource,
}

/// Strategy interface: given a vendor or program name, find its image.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Result<Option<ResolvedImage>, RdkError>;
}

/// Directory-backed strategy. Matches files whose name starts with the key
/// (case-insensitive) and carries a .jpg/.jpeg/.png extension. When several
/// names share the prefix the lexicographically smallest wins, since
/// directory iteration order is not guaranteed.
pub struct FolderResolver {
    root: PathBuf,
    source: ImageSource,
}

impl FolderResolver {
    pub fn new(root: impl Into<PathBuf>, source: ImageSource) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }
}

impl ImageResolver for FolderResolver {
    fn resolve(&self, key: &str) -> Result<Option<ResolvedImage>, RdkError> {
        let prefix = key.trim().to_lowercase();
        if prefix.is_empty() || !self.root.is_dir() {
            return Ok(None);
        }

        let mut candidates: Vec<String> = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let Some((_, ext)) = name.rsplit_once('.') else {
                continue;
            };
            if !IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                continue;
            }
            if name.to_lowercase().starts_with(&prefix) {
                candidates.push(name);
            }
        }

        candidates.sort();
        let Some(name) = candidates.into_iter().next() else {
            return Ok(None);
        };

        debug!(file = %name, dir = %self.root.display(), "resolved image");
        let bytes = fs::read(self.root.join(&name))?;
        Ok(Some(ResolvedImage {
            bytes,
            file_name: name,
            source: self.source,
        }))
    }
}

/// Fixed-priority resolver chain: explicit local folder first, then
/// bundle-extracted folders, then the built-in repository folder.
#[derive(Default)]
pub struct ImageCatalog {
    resolvers: Vec<Box<dyn ImageResolver>>,
}

impl ImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(
        local_folder: Option<PathBuf>,
        bundle_dirs: &[PathBuf],
        built_in: Option<PathBuf>,
    ) -> Self {
        let mut resolvers: Vec<Box<dyn ImageResolver>> = Vec::new();
        if let Some(dir) = local_folder {
            resolvers.push(Box::new(FolderResolver::new(dir, ImageSource::LocalFolder)));
        }
        for dir in bundle_dirs {
            resolvers.push(Box::new(FolderResolver::new(dir.clone(), ImageSource::Bundle)));
        }
        if let Some(dir) = built_in {
            resolvers.push(Box::new(FolderResolver::new(dir, ImageSource::BuiltIn)));
        }
        Self { resolvers }
    }

    /// First hit along the chain wins; None when no source has a match.
    pub fn resolve(&self, key: &str) -> Result<Option<ResolvedImage>, RdkError> {
        for resolver in &self.resolvers {
            if let Some(image) = resolver.resolve(key)? {
                return Ok(Some(image));
            }
        }
        Ok(None)
    }
}
