//! Asynchronous image loading for backgrounds and photo fields.
//!
//! A source is either a filesystem path or a `data:` URI. Loads are bounded
//! by a timeout so a stalled read degrades to the placeholder instead of
//! hanging the whole job; decode runs off the async threads.

use std::path::PathBuf;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;

use crate::types::{RenderError, Result};

/// Upper bound on a single image load, read and decode included.
pub const IMAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Load and decode an image from a path or data URI.
pub async fn load_image(source: &str) -> Result<DynamicImage> {
    let label = display_label(source);
    let bytes = tokio::time::timeout(IMAGE_LOAD_TIMEOUT, read_bytes(source))
        .await
        .map_err(|_| RenderError::AssetTimeout(label))??;
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
    Ok(image)
}

async fn read_bytes(source: &str) -> Result<Vec<u8>> {
    if let Some(rest) = source.strip_prefix("data:") {
        return decode_data_uri(rest);
    }
    let path = PathBuf::from(source);
    Ok(tokio::fs::read(path).await?)
}

/// Decode the payload of a `data:<mediatype>;base64,<data>` URI.
fn decode_data_uri(rest: &str) -> Result<Vec<u8>> {
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Asset("data URI without a comma".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(RenderError::Asset(
            "only base64 data URIs are supported".to_string(),
        ));
    }
    BASE64
        .decode(data.trim())
        .map_err(|e| RenderError::Asset(format!("bad base64 payload: {e}")))
}

/// Short form of a source for log messages; data URIs are elided.
fn display_label(source: &str) -> String {
    if source.starts_with("data:") {
        "data URI".to_string()
    } else {
        source.to_string()
    }
}
