//! Publishing of files referenced from content into the output directory

use backon::{BlockingRetryable, ExponentialBuilder};
use image::imageops::FilterType;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A published file: where it is on disk and where it is on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub path: PathBuf,
    pub url: String,
}

/// A published image with its display width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedImage {
    pub file: Published,
    pub width: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Copies files into `<public>/<static_dir>/<content hash>/<file name>`.
///
/// Identical content maps to one URL. Writes land under a temporary name
/// and are renamed into place.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    public_dir: PathBuf,
    static_dir: String,
}

impl StaticFiles {
    pub fn new(public_dir: impl Into<PathBuf>, static_dir: &str) -> Self {
        Self {
            public_dir: public_dir.into(),
            static_dir: static_dir.trim_matches('/').to_string(),
        }
    }

    /// Copy `source` verbatim
    pub fn publish(&self, source: &Path) -> Result<Published, PublishError> {
        let bytes = with_retry(|| fs::read(source))?;
        let target = self.target(source, hash_bytes(&bytes, None));
        if !target.path.exists() {
            with_retry(|| write_atomically(&target.path, &bytes))?;
        }
        Ok(target)
    }

    /// Copy an image, scaling it down to `max_width` when it is wider
    pub fn publish_image(
        &self,
        source: &Path,
        max_width: u32,
    ) -> Result<PublishedImage, PublishError> {
        let bytes = with_retry(|| fs::read(source))?;
        let target = self.target(source, hash_bytes(&bytes, Some(max_width)));

        let format = image::ImageFormat::from_path(source)?;
        let img = image::load_from_memory_with_format(&bytes, format)?;

        let width = if img.width() > max_width {
            let height = scaled_height(img.width(), img.height(), max_width);
            if !target.path.exists() {
                let resized = img.resize_exact(max_width, height, FilterType::Lanczos3);
                let mut encoded = io::Cursor::new(Vec::new());
                resized.write_to(&mut encoded, format)?;
                with_retry(|| write_atomically(&target.path, encoded.get_ref()))?;
            }
            max_width
        } else {
            if !target.path.exists() {
                with_retry(|| write_atomically(&target.path, &bytes))?;
            }
            img.width()
        };

        Ok(PublishedImage {
            file: target,
            width,
        })
    }

    fn target(&self, source: &Path, dir: String) -> Published {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        Published {
            path: self
                .public_dir
                .join(&self.static_dir)
                .join(&dir)
                .join(&name),
            url: format!(
                "/{}/{}/{}",
                self.static_dir,
                dir,
                crate::helpers::encode_path(&name)
            ),
        }
    }
}

fn scaled_height(width: u32, height: u32, max_width: u32) -> u32 {
    let scaled = (height as u64 * max_width as u64 + width as u64 / 2) / width.max(1) as u64;
    (scaled as u32).max(1)
}

/// First 16 hex digits of the SHA-256 of `bytes` and the resize variant
fn hash_bytes(bytes: &[u8], variant: Option<u32>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    match variant {
        Some(width) => {
            hasher.update(b"\x01");
            hasher.update(width.to_le_bytes());
        }
        None => hasher.update(b"\x00"),
    }
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!("tmp-{:?}", std::thread::current().id()));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Run a filesystem operation, retrying transient failures with backoff
fn with_retry<T>(op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    op.retry(
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(20))
            .with_max_times(3),
    )
    .sleep(std::thread::sleep)
    .when(is_transient)
    .notify(|err: &io::Error, dur: Duration| {
        tracing::debug!("Retrying file operation in {:?}: {}", dur, err);
    })
    .call()
}
