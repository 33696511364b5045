//! Filesystem-backed artifact storage.
//!
//! Content is stored in a content-addressable layout keyed by artifact kind
//! and SHA-256 hash, so identical generations deduplicate automatically.

use crate::{ArtifactReference, ArtifactStore};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use taleforge_core::ArtifactKind;
use taleforge_error::{StoreError, StoreErrorKind, TaleForgeResult};
use uuid::Uuid;

/// Filesystem storage backend.
///
/// Layout: `{base_path}/{kind}/{hash[0:2]}/{hash[2:4]}/{hash}`. Writes go to
/// a temp file and are renamed into place, so a crash never leaves a
/// half-written artifact at its final path. The public reference is
/// `{public_base_url}/{kind}/{hash}`.
///
/// # Examples
///
/// ```no_run
/// use taleforge_core::ArtifactKind;
/// use taleforge_storage::{ArtifactStore, FileSystemArtifactStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> taleforge_error::TaleForgeResult<()> {
/// let store = FileSystemArtifactStore::new("/var/taleforge/artifacts", "https://cdn.taleforge.app")?;
/// let reference = store.store(ArtifactKind::Image, b"png bytes", "image/png").await?;
/// assert!(reference.url.starts_with("https://cdn.taleforge.app/image/"));
/// # Ok(())
/// # }
/// ```
pub struct FileSystemArtifactStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FileSystemArtifactStore {
    /// Create a filesystem store rooted at `base_path`.
    ///
    /// Creates the root directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path, public_base_url))]
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> TaleForgeResult<Self> {
        let base_path = base_path.into();
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem artifact store");
        Ok(Self {
            base_path,
            public_base_url,
        })
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Path layout: `{base}/{kind}/{hash[0:2]}/{hash[2:4]}/{hash}`.
    fn content_path(&self, kind: ArtifactKind, hash: &str) -> PathBuf {
        self.base_path
            .join(kind.to_string())
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(hash)
    }

    fn public_url(&self, kind: ArtifactKind, hash: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, kind, hash)
    }

    fn reference(
        &self,
        kind: ArtifactKind,
        hash: String,
        path: &Path,
        size: usize,
        content_type: &str,
    ) -> ArtifactReference {
        ArtifactReference {
            id: Uuid::new_v4(),
            url: self.public_url(kind, &hash),
            content_hash: hash,
            storage_backend: "filesystem".to_string(),
            storage_path: path.to_string_lossy().to_string(),
            size_bytes: size as u64,
            kind,
            content_type: content_type.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileSystemArtifactStore {
    #[tracing::instrument(skip(self, data), fields(size = data.len(), kind = %kind))]
    async fn store(
        &self,
        kind: ArtifactKind,
        data: &[u8],
        content_type: &str,
    ) -> TaleForgeResult<ArtifactReference> {
        let hash = Self::compute_hash(data);
        let path = self.content_path(kind, &hash);

        // Identical content resolves to the same path; skip the rewrite.
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(hash = %hash, "Artifact already stored, reusing");
            return Ok(self.reference(kind, hash, &path, data.len(), content_type));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Temp file + rename keeps the final path atomic.
        let temp_path = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StoreError::new(StoreErrorKind::WriteFailed(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StoreError::new(StoreErrorKind::WriteFailed(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(hash = %hash, path = %path.display(), size = data.len(), "Stored artifact");
        Ok(self.reference(kind, hash, &path, data.len(), content_type))
    }

    #[tracing::instrument(skip(self, reference), fields(hash = %reference.content_hash))]
    async fn retrieve(&self, reference: &ArtifactReference) -> TaleForgeResult<Vec<u8>> {
        let path = Path::new(&reference.storage_path);

        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::new(StoreErrorKind::NotFound(reference.storage_path.clone()))
            } else {
                StoreError::new(StoreErrorKind::ReadFailed(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let actual = Self::compute_hash(&data);
        if actual != reference.content_hash {
            return Err(StoreError::new(StoreErrorKind::HashMismatch(format!(
                "expected {}, got {}",
                reference.content_hash, actual
            ))))?;
        }

        Ok(data)
    }

    async fn exists(&self, reference: &ArtifactReference) -> TaleForgeResult<bool> {
        let path = Path::new(&reference.storage_path);
        Ok(tokio::fs::try_exists(path).await.unwrap_or(false))
    }
}
