use base64::Engine;
use thiserror::Error;

/// Largest image the service accepts, before base64 encoding.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please upload an image file.")]
    NotAnImage,
    #[error("File size too large. Please upload an image smaller than 5MB.")]
    TooLarge,
    #[error("The image data could not be decoded.")]
    InvalidEncoding,
}

/// Base64 image data tagged with the MIME type the provider is told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub data: String,
}

impl EncodedImage {
    /// Lenient parse used for anything already accepted: strips a `data:` header
    /// if present and maps the declared type onto png/jpeg/webp (png otherwise).
    pub fn from_data_uri(uri: &str) -> Self {
        let data = match uri.split_once(',') {
            Some((_, rest)) if !rest.is_empty() => rest,
            _ => uri,
        };
        Self { mime_type: provider_mime(uri), data: data.to_string() }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn provider_mime(uri: &str) -> &'static str {
    if uri.contains("data:image/jpeg") {
        "image/jpeg"
    } else if uri.contains("data:image/webp") {
        "image/webp"
    } else {
        "image/png"
    }
}

/// Validates an incoming `data:` URI: declared type must be `image/*`, the
/// decoded payload at most [`MAX_UPLOAD_BYTES`], and the bytes a recognisable image.
pub fn accept_image(uri: &str) -> Result<EncodedImage, UploadError> {
    let (header, data) = uri.split_once(',').ok_or(UploadError::InvalidEncoding)?;
    let declared = header
        .strip_prefix("data:")
        .and_then(|h| h.split(';').next())
        .ok_or(UploadError::InvalidEncoding)?;
    if !declared.starts_with("image/") {
        return Err(UploadError::NotAnImage);
    }
    if !header.ends_with(";base64") {
        return Err(UploadError::InvalidEncoding);
    }

    // base64 inflates by 4/3; reject obviously oversized payloads before decoding
    if data.len() / 4 * 3 > MAX_UPLOAD_BYTES + 3 {
        return Err(UploadError::TooLarge);
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|_| UploadError::InvalidEncoding)?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    if image::guess_format(&bytes).is_err() {
        return Err(UploadError::NotAnImage);
    }

    Ok(EncodedImage::from_data_uri(uri))
}
