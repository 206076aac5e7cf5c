//! Resolving image references to their intrinsic size.

use std::path::Path;

use crate::{ExportError, Result};

/// Resolves an image reference (a local path or a URL) to the intrinsic size
/// of the image in pixels.
pub trait ImageResolver {
    /// `page_number` selects a page of multi-page sources; formats with a
    /// single image ignore it.
    fn size(&self, reference: &str, page_number: Option<usize>) -> Result<(f32, f32)>;
}

/// Reads image headers from disk, or from the network for `http(s)`
/// references when the `remote-images` feature is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLoader;

impl ImageLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ImageResolver for ImageLoader {
    fn size(&self, reference: &str, _page_number: Option<usize>) -> Result<(f32, f32)> {
        let (width, height) = if is_remote(reference) {
            remote_dimensions(reference)?
        } else {
            let path = reference.strip_prefix("file://").unwrap_or(reference);
            image::image_dimensions(Path::new(path)).map_err(|source| {
                ExportError::Image { reference: reference.to_string(), source }
            })?
        };
        log::debug!("resolved image {reference} to {width}x{height}");
        Ok((width as f32, height as f32))
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

#[cfg(feature = "remote-images")]
fn remote_dimensions(reference: &str) -> Result<(u32, u32)> {
    use std::io::Cursor;

    static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

    let http_error = |err: reqwest::Error| ExportError::Http {
        reference: reference.to_string(),
        message: err.to_string(),
    };
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(http_error)?;
    let bytes = client
        .get(reference)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(http_error)?;

    let image_error =
        |source| ExportError::Image { reference: reference.to_string(), source };
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| image_error(image::ImageError::IoError(err)))?
        .into_dimensions()
        .map_err(image_error)
}

#[cfg(not(feature = "remote-images"))]
fn remote_dimensions(reference: &str) -> Result<(u32, u32)> {
    Err(ExportError::Image {
        reference: reference.to_string(),
        source: image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::Unknown,
                image::error::UnsupportedErrorKind::GenericFeature(
                    "remote images (enable the `remote-images` feature)".to_string(),
                ),
            ),
        ),
    })
}
