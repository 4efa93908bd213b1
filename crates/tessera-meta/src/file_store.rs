//! On-disk manifests: one [`FileManifestStore`] file of newline-separated hex keys per filename.

use std::io::Write;
use std::path::{Path, PathBuf};

use tessera_types::{BlockKey, validate_filename};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::MetaError;
use crate::traits::ManifestStore;

type Result<T> = std::result::Result<T, MetaError>;

/// Suffix appended to a filename to form its manifest file name.
const MANIFEST_SUFFIX: &str = ".txt";

/// Manifest store writing one text file per filename.
///
/// The manifest for `name` lives at `{dir}/{name}.txt` and contains each
/// block key as 64 lowercase hex characters followed by `\n`, in block order.
/// Files are replaced by write-then-rename, and one store-wide `RwLock`
/// orders saves against loads.
pub struct FileManifestStore {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl FileManifestStore {
    /// Open a manifest store in `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: RwLock::new(()),
        })
    }

    /// Directory holding the manifest files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn manifest_path(&self, filename: &str) -> Result<PathBuf> {
        validate_filename(filename).map_err(|reason| MetaError::InvalidName {
            name: filename.to_string(),
            reason,
        })?;
        Ok(self.dir.join(format!("{filename}{MANIFEST_SUFFIX}")))
    }
}

/// Replace `path` with `body` via a synced dot-prefixed temp file in `dir`.
fn write_atomic(dir: &Path, path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".manifest.")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Render keys in the on-disk format: one hex key per line, each newline-terminated.
fn render_manifest(keys: &[BlockKey]) -> String {
    let mut out = String::with_capacity(keys.len() * 65);
    for key in keys {
        out.push_str(&key.to_string());
        out.push('\n');
    }
    out
}

/// Parse the on-disk format.
///
/// Trailing whitespace is trimmed before splitting on `\n`; blank lines
/// are skipped so an empty file is an empty manifest.
fn parse_manifest(filename: &str, text: &str) -> Result<Vec<BlockKey>> {
    text.trim_end()
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| {
            line.parse::<BlockKey>().map_err(|source| MetaError::Malformed {
                filename: filename.to_string(),
                line: i + 1,
                source,
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl ManifestStore for FileManifestStore {
    async fn save(&self, filename: &str, keys: &[BlockKey]) -> Result<()> {
        let path = self.manifest_path(filename)?;
        let body = render_manifest(keys);

        let _guard = self.lock.write().await;

        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, body.as_bytes()))
            .await
            .map_err(std::io::Error::other)??;

        debug!(filename, blocks = keys.len(), "saved manifest");
        Ok(())
    }

    async fn load(&self, filename: &str) -> Result<Vec<BlockKey>> {
        let path = self.manifest_path(filename)?;

        let text = {
            let _guard = self.lock.read().await;
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(MetaError::NotFound(filename.to_string()));
                }
                Err(e) => return Err(MetaError::Io(e)),
            }
        };

        parse_manifest(filename, &text)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let _guard = self.lock.read().await;

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && !name.starts_with('.')
                && let Some(stem) = name.strip_suffix(MANIFEST_SUFFIX)
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tempfile::TempDir;

    fn make_store() -> (FileManifestStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileManifestStore::new(dir.path()).unwrap();
        (store, dir)
    }

    fn keys(n: usize) -> Vec<BlockKey> {
        (0..n)
            .map(|i| BlockKey::from_data(format!("block-{i}").as_bytes()))
            .collect()
    }

    #[tokio::test]
    async fn test_save_load_preserves_order() {
        let (store, _dir) = make_store();
        let mut ks = keys(5);
        ks.reverse();

        store.save("doc.txt", &ks).await.unwrap();
        assert_eq!(store.load("doc.txt").await.unwrap(), ks);
    }

    #[tokio::test]
    async fn test_on_disk_format() {
        let (store, dir) = make_store();
        let ks = keys(2);
        store.save("report.pdf", &ks).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("report.pdf.txt")).unwrap();
        assert_eq!(text, format!("{}\n{}\n", ks[0], ks[1]));
    }

    #[tokio::test]
    async fn test_reads_existing_manifest_files() {
        let (store, dir) = make_store();
        let ks = keys(3);
        // Hand-written file with trailing blank lines.
        let text = format!("{}\n{}\n{}\n\n  \n", ks[0], ks[1], ks[2]);
        std::fs::write(dir.path().join("legacy.bin.txt"), text).unwrap();

        assert_eq!(store.load("legacy.bin").await.unwrap(), ks);
    }

    #[tokio::test]
    async fn test_empty_manifest_roundtrip() {
        let (store, dir) = make_store();
        store.save("empty.txt", &[]).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("empty.txt.txt")).unwrap(),
            ""
        );
        assert!(store.load("empty.txt").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_returns_not_found() {
        let (store, _dir) = make_store();
        let err = store.load("nope.txt").await.unwrap_err();
        assert!(matches!(err, MetaError::NotFound(ref name) if name == "nope.txt"));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_manifest() {
        let (store, _dir) = make_store();
        let ks = keys(4);

        store.save("a", &ks).await.unwrap();
        store.save("a", &ks[..1]).await.unwrap();

        assert_eq!(store.load("a").await.unwrap(), vec![ks[0]]);
    }

    #[tokio::test]
    async fn test_malformed_line_is_reported() {
        let (store, dir) = make_store();
        let ks = keys(1);
        std::fs::write(
            dir.path().join("bad.txt"),
            format!("{}\nnot-a-key\n", ks[0]),
        )
        .unwrap();

        let err = store.load("bad").await.unwrap_err();
        assert!(
            matches!(err, MetaError::Malformed { line: 2, .. }),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn test_unsafe_names_rejected() {
        let (store, dir) = make_store();
        for name in ["../escape", "a/b", "", ".hidden"] {
            let err = store.save(name, &keys(1)).await.unwrap_err();
            assert!(
                matches!(err, MetaError::InvalidName { .. }),
                "{name:?} should be rejected, got {err}"
            );
        }
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_list_returns_filenames() {
        let (store, dir) = make_store();
        store.save("b.doc", &keys(1)).await.unwrap();
        store.save("a.doc", &keys(2)).await.unwrap();
        std::fs::write(dir.path().join(".manifest.1.1.tmp"), b"").unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["a.doc", "b.doc"]);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_no_temp_file() {
        let (store, dir) = make_store();
        // A directory squatting on the manifest path makes the rename fail.
        std::fs::create_dir(dir.path().join("blocked.txt")).unwrap();

        let err = store.save("blocked", &keys(1)).await.unwrap_err();
        assert!(matches!(err, MetaError::Io(_)), "unexpected error: {err}");

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["blocked.txt"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_never_see_partial_manifest() {
        let (store, _dir) = make_store();
        let store = Arc::new(store);
        let old = keys(64);
        let new: Vec<BlockKey> = keys(128).into_iter().skip(64).collect();
        store.save("f", &old).await.unwrap();

        let writer = {
            let s = Arc::clone(&store);
            let (old, new) = (old.clone(), new.clone());
            tokio::spawn(async move {
                for i in 0..50 {
                    let next = if i % 2 == 0 { &new } else { &old };
                    s.save("f", next).await.unwrap();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let s = Arc::clone(&store);
            let (old, new) = (old.clone(), new.clone());
            readers.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let got = s.load("f").await.unwrap();
                    assert!(got == old || got == new, "observed a torn manifest");
                }
            }));
        }

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
    }

    #[test]
    fn test_render_parse_inverse() {
        let ks = keys(3);
        assert_eq!(parse_manifest("x", &render_manifest(&ks)).unwrap(), ks);
    }
}
