use base64::Engine;

use crate::error::{FinsightsError, Result};

/// Embed raw bytes as a data URI, the form the durable record carries.
pub fn encode_data_uri(data: &[u8], mime_type: &str) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{}", mime_type, b64)
}

/// Recover the bytes of a `data:<mime>;base64,<payload>` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FinsightsError::Parse("payload is not a data URI".to_string()))?;
    let (_, encoded) = rest
        .split_once(";base64,")
        .ok_or_else(|| FinsightsError::Parse("payload is not base64 encoded".to_string()))?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| FinsightsError::Parse(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_bytes_survive_the_data_uri() {
        let data: Vec<u8> = (0..=255).collect();
        let uri = encode_data_uri(&data, "application/pdf");
        assert!(uri.starts_with("data:application/pdf;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), data);
    }

    #[test]
    fn rejects_plain_text() {
        assert!(decode_data_uri("%PDF-1.4").is_err());
        assert!(decode_data_uri("data:application/pdf,raw").is_err());
        assert!(decode_data_uri("data:application/pdf;base64,@@@").is_err());
    }
}
