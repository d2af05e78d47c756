//! Template archive extraction.
//!
//! Unpacks a tar stream (gzip-compressed or plain) into a destination
//! directory. Every entry path is passed through the request's
//! [`PathRewrite`] first; by default this drops the archive's wrapper
//! directory.
//!
//! Only regular files and directories are written. Links and other entry
//! types are skipped, as are paths that are absolute or contain `..`.

pub mod rewrite;

pub use rewrite::{strip_root, PathRewrite};

use crate::error::{GititError, Result};
use flate2::read::GzDecoder;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// What to extract, where, and how to rewrite entry paths.
#[derive(Clone)]
pub struct ExtractionRequest {
    /// Archive file to read.
    pub archive: PathBuf,
    /// Directory entries are written under.
    pub dest: PathBuf,
    /// Entry path rewrite.
    pub rewrite: PathRewrite,
}

impl ExtractionRequest {
    /// Extract `archive` into `dest`, dropping the wrapper directory.
    pub fn new(archive: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            dest: dest.into(),
            rewrite: strip_root(None),
        }
    }

    /// Remap `subdir` inside the archive to the destination root.
    pub fn with_subdir(mut self, subdir: Option<&str>) -> Self {
        self.rewrite = strip_root(subdir);
        self
    }

    /// Use a custom path rewrite.
    pub fn with_rewrite(mut self, rewrite: PathRewrite) -> Self {
        self.rewrite = rewrite;
        self
    }
}

impl fmt::Debug for ExtractionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionRequest")
            .field("archive", &self.archive)
            .field("dest", &self.dest)
            .finish_non_exhaustive()
    }
}

/// Counts from one extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Regular files written.
    pub files: usize,
    /// Directories created.
    pub directories: usize,
    /// Entries excluded or of an unsupported type.
    pub skipped: usize,
}

/// Extract an archive as described by `request`.
///
/// The destination may be left partially populated on failure.
pub fn extract(request: &ExtractionRequest) -> Result<ExtractSummary> {
    let fail = |message: String| GititError::Extraction {
        archive: request.archive.clone(),
        message,
    };

    let reader = open_archive(&request.archive).map_err(|e| fail(e.to_string()))?;
    let mut archive = Archive::new(reader);
    let mut summary = ExtractSummary::default();

    fs::create_dir_all(&request.dest)
        .map_err(|e| fail(format!("cannot create {}: {}", request.dest.display(), e)))?;

    let entries = archive.entries().map_err(|e| fail(e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| fail(e.to_string()))?;
        let raw = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        let Some(relative) = (request.rewrite)(&raw) else {
            summary.skipped += 1;
            continue;
        };

        if !is_safe_relative(Path::new(&relative)) {
            tracing::warn!("Skipping unsafe archive entry: {}", raw);
            summary.skipped += 1;
            continue;
        }

        let target = request.dest.join(&relative);
        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target)
                    .map_err(|e| fail(format!("cannot create {}: {}", target.display(), e)))?;
                summary.directories += 1;
            }
            EntryType::Regular | EntryType::Continuous => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        fail(format!("cannot create {}: {}", parent.display(), e))
                    })?;
                }
                entry
                    .unpack(&target)
                    .map_err(|e| fail(format!("cannot write {}: {}", target.display(), e)))?;
                summary.files += 1;
            }
            other => {
                tracing::debug!("Skipping {:?} entry: {}", other, raw);
                summary.skipped += 1;
            }
        }
    }

    tracing::debug!(
        "Extracted {} files and {} directories into {} ({} skipped)",
        summary.files,
        summary.directories,
        request.dest.display(),
        summary.skipped
    );

    Ok(summary)
}

/// Open an archive, decompressing it if it starts with the gzip magic.
///
/// Files with a `.tar` suffix are always read uncompressed.
fn open_archive(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let plain = path.extension().is_some_and(|ext| ext == "tar");
    let reader = BufReader::new(file);
    if !plain && read == GZIP_MAGIC.len() && magic == GZIP_MAGIC {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// A relative path that stays below its base.
fn is_safe_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tar::{Builder, Header};
    use tempfile::TempDir;

    fn tar_bytes(files: &[(&str, &str)], dirs: &[&str]) -> Vec<u8> {
        let mut builder = Builder::new(Vec::new());
        for dir in dirs {
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, dir, std::io::empty()).unwrap();
        }
        for (path, content) in files {
            let mut header = Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn write_archive(temp: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn strips_wrapper_directory() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            &temp,
            "t.tar.gz",
            &gzip(&tar_bytes(
                &[
                    ("template-main/package.json", "{}"),
                    ("template-main/src/index.ts", "export {}"),
                ],
                &["template-main/"],
            )),
        );
        let dest = temp.path().join("out");

        let summary = extract(&ExtractionRequest::new(&archive, &dest)).unwrap();

        assert_eq!(fs::read_to_string(dest.join("package.json")).unwrap(), "{}");
        assert_eq!(
            fs::read_to_string(dest.join("src/index.ts")).unwrap(),
            "export {}"
        );
        assert!(!dest.join("template-main").exists());
        assert_eq!(summary.files, 2);
    }

    #[test]
    fn subdir_remap_drops_siblings() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            &temp,
            "t.tar.gz",
            &gzip(&tar_bytes(
                &[
                    ("pkg-main/examples/basic/index.js", "basic"),
                    ("pkg-main/examples/other/index.js", "other"),
                    ("pkg-main/README.md", "readme"),
                ],
                &[],
            )),
        );
        let dest = temp.path().join("out");

        extract(&ExtractionRequest::new(&archive, &dest).with_subdir(Some("examples/basic")))
            .unwrap();

        assert_eq!(fs::read_to_string(dest.join("index.js")).unwrap(), "basic");
        assert!(!dest.join("README.md").exists());
        assert!(!dest.join("examples").exists());
    }

    #[test]
    fn files_without_directory_entries_get_parents() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            &temp,
            "t.tar.gz",
            &gzip(&tar_bytes(&[("root/a/b/c/deep.txt", "deep")], &[])),
        );
        let dest = temp.path().join("out");

        extract(&ExtractionRequest::new(&archive, &dest)).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a/b/c/deep.txt")).unwrap(), "deep");
    }

    #[test]
    fn plain_tar_is_accepted() {
        let temp = TempDir::new().unwrap();
        let bytes = tar_bytes(&[("root/plain.txt", "plain")], &[]);
        let dest = temp.path().join("out");

        let archive = write_archive(&temp, "t.tar", &bytes);
        extract(&ExtractionRequest::new(&archive, &dest)).unwrap();
        assert_eq!(fs::read_to_string(dest.join("plain.txt")).unwrap(), "plain");

        // Uncompressed bytes behind a .tar.gz name
        let misnamed = write_archive(&temp, "m.tar.gz", &bytes);
        let dest2 = temp.path().join("out2");
        extract(&ExtractionRequest::new(&misnamed, &dest2)).unwrap();
        assert!(dest2.join("plain.txt").exists());
    }

    #[test]
    fn symlinks_are_skipped() {
        let temp = TempDir::new().unwrap();
        let mut builder = Builder::new(Vec::new());
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_cksum();
        builder
            .append_link(&mut header, "root/link", "/etc/passwd")
            .unwrap();
        let mut file = Header::new_gnu();
        file.set_size(2);
        file.set_cksum();
        builder.append_data(&mut file, "root/ok.txt", &b"ok"[..]).unwrap();
        let archive = write_archive(&temp, "t.tar.gz", &gzip(&builder.into_inner().unwrap()));
        let dest = temp.path().join("out");

        let summary = extract(&ExtractionRequest::new(&archive, &dest)).unwrap();

        assert!(dest.join("ok.txt").exists());
        assert!(fs::symlink_metadata(dest.join("link")).is_err());
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn parent_traversal_is_skipped() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            &temp,
            "t.tar.gz",
            &gzip(&tar_bytes(&[("root/ok.txt", "ok")], &[])),
        );
        let dest = temp.path().join("out");

        let escape: PathRewrite =
            std::sync::Arc::new(|_path: &str| Some("../escaped.txt".to_string()));
        let summary =
            extract(&ExtractionRequest::new(&archive, &dest).with_rewrite(escape)).unwrap();

        assert!(!temp.path().join("escaped.txt").exists());
        assert_eq!(summary.files, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn custom_rewrite_can_exclude() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            &temp,
            "t.tar.gz",
            &gzip(&tar_bytes(&[("root/keep.txt", "k"), ("root/drop.md", "d")], &[])),
        );
        let dest = temp.path().join("out");

        let base = strip_root(None);
        let rewrite: PathRewrite = std::sync::Arc::new(move |path: &str| {
            base(path).filter(|p| !p.ends_with(".md"))
        });
        extract(&ExtractionRequest::new(&archive, &dest).with_rewrite(rewrite)).unwrap();

        assert!(dest.join("keep.txt").exists());
        assert!(!dest.join("drop.md").exists());
    }

    #[test]
    fn existing_files_are_overwritten() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            &temp,
            "t.tar.gz",
            &gzip(&tar_bytes(&[("root/a.txt", "new")], &[])),
        );
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.txt"), "old").unwrap();

        extract(&ExtractionRequest::new(&archive, &dest)).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn malformed_archive_is_extraction_error() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(&temp, "bad.tar.gz", &[0x1f, 0x8b, 0x00, 0x01, 0x02, 0x03]);
        let dest = temp.path().join("out");

        let err = extract(&ExtractionRequest::new(&archive, &dest)).unwrap_err();

        assert!(matches!(err, GititError::Extraction { .. }));
        assert!(err.to_string().contains("bad.tar.gz"));
    }

    #[test]
    fn missing_archive_is_extraction_error() {
        let temp = TempDir::new().unwrap();
        let err = extract(&ExtractionRequest::new(
            temp.path().join("nope.tar.gz"),
            temp.path().join("out"),
        ))
        .unwrap_err();

        assert!(matches!(err, GititError::Extraction { .. }));
    }
}
