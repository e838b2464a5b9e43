use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::form::FileBlob;

const DATA_URI_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{name} contains no data")]
    EmptyFile { name: String },
}

/// Turns the selected file into transmittable text.
#[async_trait]
pub trait FileEncoder: Send + Sync {
    async fn encode(&self, file: &FileBlob) -> Result<String, EncodingError>;
}

/// Standard-alphabet, padded base64 with no line breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64FileEncoder;

#[async_trait]
impl FileEncoder for Base64FileEncoder {
    async fn encode(&self, file: &FileBlob) -> Result<String, EncodingError> {
        let bytes = file.read_bytes().await.map_err(|source| EncodingError::Read {
            name: file.name().into_owned(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(EncodingError::EmptyFile {
                name: file.name().into_owned(),
            });
        }
        Ok(STANDARD.encode(bytes))
    }
}

/// Removes a leading `data:<mime>;base64,` prefix, leaving only the payload.
///
/// Input without such a prefix is returned unchanged.
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    let Some(rest) = encoded.strip_prefix(DATA_URI_SCHEME) else {
        return encoded;
    };
    match rest.rfind(BASE64_MARKER) {
        Some(idx) if idx > 0 => &rest[idx + BASE64_MARKER.len()..],
        _ => encoded,
    }
}
