//! On-disk storage for uploaded catalog images.

use std::io;
use std::path::{Path, PathBuf};

use simsy_model::ImageSlot;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Upload size cap, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const EXTENSIONS: [&str; 4] = ["png", "jpg", "webp", "gif"];

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("Unsupported image type '{0}'; use png, jpeg, webp or gif")]
    UnsupportedType(String),
    #[error("Image is empty")]
    Empty,
    #[error("Body is not a valid {declared} image")]
    Mismatch { declared: &'static str },
    #[error("Image exceeds {MAX_IMAGE_BYTES} bytes")]
    TooLarge,
    #[error("Failed to store image: {0}")]
    Io(#[from] io::Error),
}

/// File extension for an accepted image content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Extension for the format named by the leading bytes, if it is one we
/// accept.
pub fn sniff_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some("webp");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("gif");
    }
    None
}

/// Writes images to `<root>/<collection>/<slot>/<id>.<ext>`; the public
/// path is the same layout below `/media`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, slot: ImageSlot) -> PathBuf {
        self.root.join(slot.collection()).join(slot.slot())
    }

    /// Store `bytes` for entity `id`, replacing any earlier upload whatever
    /// its format. Returns the public path.
    pub async fn save(
        &self,
        slot: ImageSlot,
        id: i64,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| ImageStoreError::UnsupportedType(content_type.to_string()))?;
        if bytes.is_empty() {
            return Err(ImageStoreError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageStoreError::TooLarge);
        }

        if sniff_extension(bytes) != Some(ext) {
            warn!(declared = ext, bytes = bytes.len(), "image body does not match its content type");
            return Err(ImageStoreError::Mismatch { declared: ext });
        }

        let dir = self.dir(slot);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{id}.{ext}");
        let staging = dir.join(format!(".{file_name}.{}.part", Uuid::new_v4()));
        if let Err(err) = tokio::fs::write(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }
        if let Err(err) = tokio::fs::rename(&staging, dir.join(&file_name)).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }
        self.remove_variants(&dir, id, ext).await?;
        debug!(collection = slot.collection(), slot = slot.slot(), id, bytes = bytes.len(), "stored image");

        Ok(format!(
            "/media/{}/{}/{}",
            slot.collection(),
            slot.slot(),
            file_name
        ))
    }

    /// Drop earlier uploads of `id` stored under another format.
    async fn remove_variants(&self, dir: &Path, id: i64, keep: &str) -> Result<(), ImageStoreError> {
        for ext in EXTENSIONS.into_iter().filter(|ext| *ext != keep) {
            match tokio::fs::remove_file(dir.join(format!("{id}.{ext}"))).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simsy_model::TaxonomyKind;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";
    const JPEG: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF";
    const WEBP: &[u8] = b"RIFF\x24\x00\x00\x00WEBPVP8 ";

    #[test]
    fn content_types_map_to_extensions() {
        assert_eq!(extension_for("image/PNG"), Some("png"));
        assert_eq!(extension_for("image/jpeg; charset=binary"), Some("jpg"));
        assert_eq!(extension_for("text/plain"), None);
    }

    #[test]
    fn sniffs_leading_bytes() {
        assert_eq!(sniff_extension(PNG), Some("png"));
        assert_eq!(sniff_extension(GIF), Some("gif"));
        assert_eq!(sniff_extension(JPEG), Some("jpg"));
        assert_eq!(sniff_extension(WEBP), Some("webp"));
        assert_eq!(sniff_extension(b"<html><script>"), None);
        assert_eq!(sniff_extension(b"RIFF"), None);
    }

    #[tokio::test]
    async fn replaces_previous_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let png = store.save(ImageSlot::Show, 4, "image/png", PNG).await.unwrap();
        assert_eq!(png, "/media/shows/image/4.png");

        let gif = store.save(ImageSlot::Show, 4, "image/gif", GIF).await.unwrap();
        assert_eq!(gif, "/media/shows/image/4.gif");
        assert!(!dir.path().join("shows/image/4.png").exists());
        assert_eq!(std::fs::read(dir.path().join("shows/image/4.gif")).unwrap(), GIF);

        // Only the final file is left behind.
        let entries = std::fs::read_dir(dir.path().join("shows/image")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn same_format_upload_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        store.save(ImageSlot::Artist, 9, "image/jpeg", JPEG).await.unwrap();
        let mut newer = JPEG.to_vec();
        newer.extend_from_slice(b"more");
        store.save(ImageSlot::Artist, 9, "image/jpeg", &newer).await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("artists/image/9.jpg")).unwrap(), newer);
    }

    #[tokio::test]
    async fn flags_and_taxonomy_use_their_own_folders() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let flag = store
            .save(ImageSlot::CountryFlag, 1, "image/webp", WEBP)
            .await
            .unwrap();
        assert_eq!(flag, "/media/countries/flag/1.webp");

        let genre = store
            .save(ImageSlot::Taxonomy(TaxonomyKind::Genre), 2, "image/png", PNG)
            .await
            .unwrap();
        assert_eq!(genre, "/media/genres/image/2.png");
    }

    #[tokio::test]
    async fn rejects_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        assert!(matches!(
            store.save(ImageSlot::Artist, 1, "text/html", b"<p>").await,
            Err(ImageStoreError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.save(ImageSlot::Artist, 1, "image/png", b"").await,
            Err(ImageStoreError::Empty)
        ));
    }

    #[tokio::test]
    async fn body_must_match_declared_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(matches!(
            store
                .save(ImageSlot::Show, 1, "image/png", b"<html><script>alert(1)</script>")
                .await,
            Err(ImageStoreError::Mismatch { declared: "png" })
        ));
        assert!(matches!(
            store.save(ImageSlot::Show, 1, "image/png", GIF).await,
            Err(ImageStoreError::Mismatch { declared: "png" })
        ));

        // A rejected upload keeps the earlier image.
        store.save(ImageSlot::Show, 2, "image/gif", GIF).await.unwrap();
        assert!(store.save(ImageSlot::Show, 2, "image/png", b"nope").await.is_err());
        assert!(dir.path().join("shows/image/2.gif").exists());
        assert!(!dir.path().join("shows/image/1.png").exists());
    }
}
