// SPDX-License-Identifier: MIT
// `data:<mime>;base64,<payload>` helpers. Bare base64 is accepted on decode.

use base64::{engine::general_purpose, Engine as _};

#[derive(Debug)]
pub enum DataUrlError {
    Empty,
    NotBase64,
    Base64(base64::DecodeError),
}

impl From<base64::DecodeError> for DataUrlError { fn from(e: base64::DecodeError) -> Self { Self::Base64(e) } }

impl std::fmt::Display for DataUrlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataUrlError::Empty => write!(f, "empty image payload"),
            DataUrlError::NotBase64 => write!(f, "data URL is not base64-encoded"),
            DataUrlError::Base64(e) => write!(f, "invalid base64: {}", e),
        }
    }
}

impl std::error::Error for DataUrlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataUrlError::Base64(e) => Some(e),
            _ => None,
        }
    }
}

/// Decoded payload. `mime_type` is `None` for bare base64 input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, general_purpose::STANDARD.encode(bytes))
}

pub fn decode(payload: &str) -> Result<DecodedDataUrl, DataUrlError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(DataUrlError::Empty);
    }

    let (mime_type, body) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',').ok_or(DataUrlError::NotBase64)?;
            let mime = header.strip_suffix(";base64").ok_or(DataUrlError::NotBase64)?;
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            (mime, body)
        }
        None => (None, payload),
    };

    let bytes = general_purpose::STANDARD.decode(body)?;
    if bytes.is_empty() {
        return Err(DataUrlError::Empty);
    }
    Ok(DecodedDataUrl { mime_type, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_and_bare_forms() {
        let url = encode("image/png", b"\x89PNG");
        assert_eq!(url, "data:image/png;base64,iVBORw==");

        let parsed = decode(&url).unwrap();
        assert_eq!(parsed.mime_type.as_deref(), Some("image/png"));
        assert_eq!(parsed.bytes, b"\x89PNG");

        let bare = decode("iVBORw==").unwrap();
        assert_eq!(bare.mime_type, None);
        assert_eq!(bare.bytes, b"\x89PNG");
    }

    #[test]
    fn rejects_non_base64_data_urls() {
        assert!(matches!(decode("data:text/plain,hello"), Err(DataUrlError::NotBase64)));
        assert!(matches!(decode("   "), Err(DataUrlError::Empty)));
        assert!(matches!(decode("data:image/png;base64,@@@"), Err(DataUrlError::Base64(_))));
    }
}
