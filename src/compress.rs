//! Gzip siblings for large text assets.
//!
//! A `<name>.gz` is kept only when it pays for itself: the original must be
//! larger than the threshold and the compressed size below
//! `min_ratio × original`. Originals are never modified.

use crate::config::GzipOptions;
use crate::logger::ProgressLine;
use crate::log;
use flate2::Compression;
use flate2::write::GzEncoder;
use jwalk::WalkDir;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CompressionSettings {
    pub extensions: FxHashSet<String>,
    pub threshold: u64,
    pub min_ratio: f64,
}

impl From<&GzipOptions> for CompressionSettings {
    fn from(options: &GzipOptions) -> Self {
        Self {
            extensions: options
                .extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            threshold: options.threshold,
            min_ratio: options.min_ratio,
        }
    }
}

impl CompressionSettings {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }
}

/// Result for a single candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOutcome {
    Compressed { original: u64, compressed: u64 },
    /// The ratio was not good enough; no `.gz` is left behind.
    CompressionSkipped { original: u64, compressed: u64 },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompressionReport {
    pub compressed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_saved: u64,
}

/// Sibling path with `.gz` appended to the full file name.
pub fn gz_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".gz");
    PathBuf::from(name)
}

/// Files under `dir` eligible for compression, sorted.
fn candidates(dir: &Path, settings: &CompressionSettings) -> Vec<(PathBuf, u64)> {
    let mut files: Vec<(PathBuf, u64)> = WalkDir::new(dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| settings.accepts(path))
        .filter_map(|path| {
            let size = fs::metadata(&path).ok()?.len();
            (size > settings.threshold).then_some((path, size))
        })
        .collect();
    files.sort();
    files
}

fn gzip(path: &Path) -> io::Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()
}

/// Compress one file, writing or clearing its `.gz` sibling.
pub fn compress_file(
    path: &Path,
    original: u64,
    settings: &CompressionSettings,
) -> io::Result<CompressionOutcome> {
    let data = gzip(path)?;
    let compressed = data.len() as u64;
    let target = gz_path(path);

    if (compressed as f64) < settings.min_ratio * original as f64 {
        fs::write(&target, data)?;
        Ok(CompressionOutcome::Compressed {
            original,
            compressed,
        })
    } else {
        match fs::remove_file(&target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(CompressionOutcome::CompressionSkipped {
            original,
            compressed,
        })
    }
}

/// Compress every eligible file under `dir` in parallel.
pub fn compress(dir: &Path, settings: &CompressionSettings) -> CompressionReport {
    let files = candidates(dir, settings);
    if files.is_empty() {
        return CompressionReport::default();
    }

    let progress = ProgressLine::new("gzip", &[("files", files.len())]);
    let outcomes: Vec<_> = files
        .par_iter()
        .map(|(path, size)| {
            let outcome = compress_file(path, *size, settings);
            progress.inc("files");
            (path, outcome)
        })
        .collect();
    progress.finish();

    let mut report = CompressionReport::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(CompressionOutcome::Compressed {
                original,
                compressed,
            }) => {
                report.compressed += 1;
                report.bytes_saved += original - compressed;
            }
            Ok(CompressionOutcome::CompressionSkipped { .. }) => report.skipped += 1,
            Err(e) => {
                log!("warning"; "gzip {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings() -> CompressionSettings {
        CompressionSettings::from(&GzipOptions {
            enable: true,
            extensions: vec!["js".into(), "css".into()],
            threshold: 10240,
            min_ratio: 0.8,
        })
    }

    /// Bytes gzip cannot shrink (xorshift stream).
    fn noise(len: usize) -> Vec<u8> {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_compressible_asset_gets_sibling() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("app.js");
        let text = "function add(a, b) { return a + b; }\n".repeat(560);
        assert!(text.len() > 20_000);
        fs::write(&path, &text).unwrap();

        let report = compress(tmp.path(), &settings());
        assert_eq!(report.compressed, 1);
        let gz = fs::metadata(gz_path(&path)).unwrap().len();
        assert!(gz < 16 * 1024);
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_incompressible_asset_has_no_sibling() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vendor.js");
        fs::write(&path, noise(20 * 1024)).unwrap();
        fs::write(gz_path(&path), "stale").unwrap();

        let report = compress(tmp.path(), &settings());
        assert_eq!(report.skipped, 1);
        assert_eq!(report.compressed, 0);
        assert!(!gz_path(&path).exists());
    }

    #[test]
    fn test_small_and_foreign_files_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("tiny.css"), "a{}".repeat(100)).unwrap();
        fs::write(tmp.path().join("data.json"), "{}".repeat(20_000)).unwrap();

        let report = compress(tmp.path(), &settings());
        assert_eq!(report, CompressionReport::default());
        assert!(!tmp.path().join("tiny.css.gz").exists());
        assert!(!tmp.path().join("data.json.gz").exists());
    }

    #[test]
    fn test_gz_path_appends() {
        assert_eq!(gz_path(Path::new("a/app.1a.js")), PathBuf::from("a/app.1a.js.gz"));
    }
}
