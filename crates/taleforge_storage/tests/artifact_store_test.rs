//! Tests for the filesystem artifact store.

use taleforge_core::ArtifactKind;
use taleforge_storage::{ArtifactStore, FileSystemArtifactStore};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> FileSystemArtifactStore {
    FileSystemArtifactStore::new(dir.path(), "https://cdn.test").unwrap()
}

#[tokio::test]
async fn test_store_and_retrieve() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);

    let data = b"a painted fox in a moonlit garden";
    let reference = store
        .store(ArtifactKind::Image, data, "image/png")
        .await
        .unwrap();

    assert_eq!(reference.storage_backend, "filesystem");
    assert_eq!(reference.kind, ArtifactKind::Image);
    assert_eq!(reference.content_type, "image/png");
    assert_eq!(reference.size_bytes, data.len() as u64);
    assert!(reference.url.starts_with("https://cdn.test/image/"));
    assert!(reference.url.ends_with(&reference.content_hash));

    let retrieved = store.retrieve(&reference).await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_identical_content_deduplicates() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);

    let data = b"narration track bytes";
    let ref1 = store
        .store(ArtifactKind::Audio, data, "audio/mp3")
        .await
        .unwrap();
    let ref2 = store
        .store(ArtifactKind::Audio, data, "audio/mp3")
        .await
        .unwrap();

    assert_eq!(ref1.content_hash, ref2.content_hash);
    assert_eq!(ref1.storage_path, ref2.storage_path);
    assert_eq!(ref1.url, ref2.url);
}

#[tokio::test]
async fn test_kinds_partition_the_layout() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);

    let data = b"same bytes, different kinds";
    let image = store
        .store(ArtifactKind::Image, data, "image/png")
        .await
        .unwrap();
    let video = store
        .store(ArtifactKind::Video, data, "video/mp4")
        .await
        .unwrap();

    assert_eq!(image.content_hash, video.content_hash);
    assert_ne!(image.storage_path, video.storage_path);
}

#[tokio::test]
async fn test_retrieve_detects_corruption() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);

    let reference = store
        .store(ArtifactKind::Image, b"original", "image/png")
        .await
        .unwrap();

    tokio::fs::write(&reference.storage_path, b"tampered")
        .await
        .unwrap();

    assert!(store.retrieve(&reference).await.is_err());
}

#[tokio::test]
async fn test_exists_tracks_content() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);

    let reference = store
        .store(ArtifactKind::Video, b"frames", "video/mp4")
        .await
        .unwrap();
    assert!(store.exists(&reference).await.unwrap());

    tokio::fs::remove_file(&reference.storage_path).await.unwrap();
    assert!(!store.exists(&reference).await.unwrap());
}
