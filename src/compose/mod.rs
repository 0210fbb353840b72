//! Quote creation flow: validate the draft, upload the image, create the quote.
//!
//! A failure at either network step leaves the draft untouched so the user
//! can resubmit. Media uploaded before a failed create is not cleaned up and
//! is not reused on retry.

use crate::api::{ApiClient, ApiError, MediaUpload, Quote};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest image accepted for upload (10MB).
pub const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;

/// Generic message for any network-side failure of the flow.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create quote. Please try again.";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Quote text is required")]
    EmptyText,
    #[error("Choose an image to upload")]
    NoImage,
    #[error("Image not found: {0}")]
    ImageNotFound(String),
    #[error("Not a regular file: {0}")]
    NotAFile(String),
    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),
    #[error("Image too large ({size} bytes, max {max})")]
    ImageTooLarge { size: u64, max: u64 },
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Media upload failed: {0}")]
    Upload(#[source] ApiError),
    #[error("Quote creation failed: {0}")]
    Create(#[source] ApiError),
}

impl ComposeError {
    /// True for problems caught before any request was made.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            ComposeError::Upload(_) | ComposeError::Create(_) | ComposeError::NotAuthenticated
        )
    }

    /// True when the service rejected the session token.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ComposeError::NotAuthenticated => true,
            ComposeError::Upload(e) | ComposeError::Create(e) => e.is_auth_failure(),
            _ => false,
        }
    }

    /// Message shown on the form: specific for validation, generic otherwise.
    pub fn user_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            CREATE_FAILED_MESSAGE.to_string()
        }
    }
}

/// The create form's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteDraft {
    pub text: String,
    pub image: Option<PathBuf>,
}

/// MIME type for an image path, by extension. `None` if not an image.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// Expand a leading `~/` using `$HOME`.
pub fn expand_home(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Validate the draft and read the image into an upload.
pub async fn prepare_upload(draft: &QuoteDraft) -> Result<MediaUpload, ComposeError> {
    if draft.text.trim().is_empty() {
        return Err(ComposeError::EmptyText);
    }
    let path = draft.image.as_deref().ok_or(ComposeError::NoImage)?;
    let shown = path.display().to_string();

    let mime = image_mime(path).ok_or_else(|| ComposeError::UnsupportedImage(shown.clone()))?;

    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ComposeError::ImageNotFound(shown));
        }
        Err(e) => return Err(ComposeError::Io(e)),
    };
    if !metadata.is_file() {
        return Err(ComposeError::NotAFile(shown));
    }
    if metadata.len() > MAX_IMAGE_SIZE {
        return Err(ComposeError::ImageTooLarge {
            size: metadata.len(),
            max: MAX_IMAGE_SIZE,
        });
    }

    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(MediaUpload {
        file_name,
        mime,
        bytes,
    })
}

/// Run the whole flow: validate, upload, create.
///
/// Returns the created quote if the service echoed one back.
pub async fn submit(
    api: &ApiClient,
    token: Option<&SecretString>,
    draft: &QuoteDraft,
) -> Result<Option<Quote>, ComposeError> {
    let token = token.ok_or(ComposeError::NotAuthenticated)?;
    let upload = prepare_upload(draft).await?;

    let media_url = api
        .upload_media(upload)
        .await
        .map_err(ComposeError::Upload)?;
    tracing::info!(media_url = %media_url, "Media uploaded");

    let created = api
        .create_quote(token, &draft.text, &media_url)
        .await
        .map_err(|e| {
            tracing::warn!(media_url = %media_url, "Quote creation failed after upload; media left orphaned");
            ComposeError::Create(e)
        })?;
    tracing::info!(id = ?created.as_ref().map(|q| q.id.as_str()), "Quote created");
    Ok(created)
}
