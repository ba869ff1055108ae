//! Storage for uploaded post images.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::ImageFormat;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Directory under the media root that holds post images.
const POSTS_DIR: &str = "posts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("The submitted file is empty.")]
    Empty,
    #[error("The file is too large; the limit is 5 MiB.")]
    TooLarge,
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    NotAnImage,
    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url: url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Router prefix the stored files are served under, e.g. `/media`.
    pub fn mount_path(&self) -> String {
        let trimmed = self.url.trim_matches('/');
        if trimmed.is_empty() {
            "/media".to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    /// Checks size and magic bytes. Only raster formats browsers display are accepted.
    pub fn validate(&self, upload: &Upload) -> Result<ImageFormat, MediaError> {
        if upload.data.is_empty() {
            return Err(MediaError::Empty);
        }
        if upload.data.len() > MAX_IMAGE_BYTES {
            return Err(MediaError::TooLarge);
        }

        match image::guess_format(&upload.data) {
            Ok(
                format @ (ImageFormat::Gif
                | ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::WebP
                | ImageFormat::Bmp),
            ) => Ok(format),
            _ => Err(MediaError::NotAnImage),
        }
    }

    /// Writes the upload below `<root>/posts` and returns the stored path relative to the root.
    pub async fn save(&self, upload: &Upload) -> Result<String, MediaError> {
        let format = self.validate(upload)?;
        let directory = self.root.join(POSTS_DIR);
        tokio::fs::create_dir_all(&directory).await?;

        let (stem, extension) = split_file_name(&upload.file_name, format);
        let mut name = format!("{stem}.{extension}");

        loop {
            let target = directory.join(&name);
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await;

            match file {
                Ok(mut file) => {
                    file.write_all(&upload.data).await?;
                    file.flush().await?;
                    break;
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    name = format!("{stem}_{}.{extension}", cuid2::create_id());
                }
                Err(error) => return Err(error.into()),
            }
        }

        let stored = format!("{POSTS_DIR}/{name}");
        info!(path = %stored, bytes = upload.data.len(), "stored upload");
        Ok(stored)
    }

    /// Deletes a file written by [`MediaStore::save`]. Failures are only logged.
    pub async fn remove(&self, stored: &str) {
        if let Err(error) = tokio::fs::remove_file(self.root.join(stored)).await {
            warn!(?error, path = %stored, "failed to remove stored upload");
        }
    }
}

fn split_file_name(file_name: &str, format: ImageFormat) -> (String, String) {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let (stem, extension) = match base.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, extension.to_ascii_lowercase()),
        _ => (base, default_extension(format).to_string()),
    };

    let stem: String = stem
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(*c, '-' | '_'))
        .collect();
    let extension: String = extension
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    let stem = if stem.is_empty() { "image".to_string() } else { stem };
    let extension = if extension.is_empty() {
        default_extension(format).to_string()
    } else {
        extension
    };

    (stem, extension)
}

fn default_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Gif => "gif",
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        _ => "img",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) const SMALL_GIF: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
        0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
        0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
    ];

    fn upload(name: &str, data: &[u8]) -> Upload {
        Upload {
            file_name: name.to_string(),
            data: Bytes::copy_from_slice(data),
        }
    }

    #[test]
    fn gif_upload_is_accepted() {
        let store = MediaStore::new("media", "/media/");
        let format = store.validate(&upload("small.gif", SMALL_GIF)).unwrap();
        assert_eq!(format, ImageFormat::Gif);
    }

    #[test]
    fn empty_and_foreign_uploads_are_rejected() {
        let store = MediaStore::new("media", "/media/");
        assert!(matches!(
            store.validate(&upload("empty.gif", b"")),
            Err(MediaError::Empty)
        ));
        assert!(matches!(
            store.validate(&upload("notes.txt", b"just some text")),
            Err(MediaError::NotAnImage)
        ));
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let store = MediaStore::new("media", "/media/");
        let mut data = SMALL_GIF.to_vec();
        data.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(matches!(
            store.validate(&upload("big.gif", &data)),
            Err(MediaError::TooLarge)
        ));
    }

    #[test]
    fn file_names_are_sanitised() {
        assert_eq!(
            split_file_name("../../etc/small.GIF", ImageFormat::Gif),
            ("small".to_string(), "gif".to_string())
        );
        assert_eq!(
            split_file_name("", ImageFormat::Png),
            ("image".to_string(), "png".to_string())
        );
        assert_eq!(
            split_file_name("my photo!.jpeg", ImageFormat::Jpeg),
            ("myphoto".to_string(), "jpeg".to_string())
        );
    }

    #[tokio::test]
    async fn save_keeps_name_and_suffixes_collisions() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path(), "/media/");

        let first = store.save(&upload("small.gif", SMALL_GIF)).await.unwrap();
        assert_eq!(first, "posts/small.gif");
        assert!(dir.path().join("posts/small.gif").exists());

        let second = store.save(&upload("small.gif", SMALL_GIF)).await.unwrap();
        assert_ne!(second, first);
        assert!(second.starts_with("posts/small_"));
        assert!(second.ends_with(".gif"));

        assert_eq!(store.mount_path(), "/media");
    }
}
