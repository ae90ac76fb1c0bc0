//! Baidu OCR client (accurate_basic endpoint).
//!
//! Photographed records are often re-shot from screens; the endpoint rejects
//! payloads over 4 MB, so oversized images are re-encoded as JPEG while
//! keeping enough resolution for the OCR to separate glyphs from screen moiré.

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use std::env;
use std::io::Cursor;
use tracing::{debug, info};

const TOKEN_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";
const OCR_URL: &str = "https://aip.baidubce.com/rest/2.0/ocr/v1/accurate_basic";

/// Only payloads above this get recompressed.
const COMPRESS_THRESHOLD: usize = 3 * 1024 * 1024;
/// Second, harsher pass when the first still flirts with the 4 MB API limit.
const RETRY_THRESHOLD: usize = (3.8 * 1024.0 * 1024.0) as usize;
/// Screen re-shots must not be shrunk too far or the OCR loses the glyphs.
const MAX_DIMENSION: u32 = 3800;

#[derive(Clone)]
pub struct OcrClient {
    http: reqwest::blocking::Client,
    api_key: String,
    secret_key: String,
}

impl OcrClient {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Reads `BAIDU_API_KEY` / `BAIDU_SECRET_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("BAIDU_API_KEY")
            .map_err(|_| Error::MissingCredential { name: "BAIDU_API_KEY" })?;
        let secret_key = env::var("BAIDU_SECRET_KEY").map_err(|_| Error::MissingCredential {
            name: "BAIDU_SECRET_KEY",
        })?;
        Ok(Self::new(api_key, secret_key))
    }

    pub fn fetch_access_token(&self) -> Result<String> {
        let value: Value = self
            .http
            .post(TOKEN_URL)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.secret_key.as_str()),
            ])
            .send()?
            .json()?;
        match value.get("access_token").and_then(Value::as_str) {
            Some(token) => Ok(token.to_string()),
            None => Err(api_error(&value, "access token request rejected")),
        }
    }

    /// Runs one image through OCR and returns newline-joined recognized lines.
    pub fn recognize(&self, image_bytes: &[u8]) -> Result<String> {
        let token = self.fetch_access_token()?;
        self.recognize_with_token(image_bytes, &token)
    }

    pub fn recognize_with_token(&self, image_bytes: &[u8], access_token: &str) -> Result<String> {
        let payload = prepare_payload(image_bytes)?;
        info!(bytes = payload.len(), "submitting image to OCR");
        let value: Value = self
            .http
            .post(OCR_URL)
            .query(&[("access_token", access_token)])
            .form(&[("image", BASE64.encode(&payload))])
            .send()?
            .json()?;
        words_from_response(&value)
    }
}

/// Joins `words_result` lines, or surfaces the service's `error_msg`.
pub(crate) fn words_from_response(value: &Value) -> Result<String> {
    match value.get("words_result").and_then(Value::as_array) {
        Some(items) => {
            let lines: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("words").and_then(Value::as_str))
                .collect();
            Ok(lines.join("\n"))
        }
        None => Err(api_error(value, "unknown OCR error")),
    }
}

fn api_error(value: &Value, fallback: &str) -> Error {
    let message = value
        .get("error_msg")
        .or_else(|| value.get("error_description"))
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string();
    Error::Api { message }
}

/// Returns the bytes to upload: unchanged when small enough, otherwise a
/// JPEG re-encode capped at `MAX_DIMENSION` on the long edge.
pub(crate) fn prepare_payload(image_bytes: &[u8]) -> Result<Vec<u8>> {
    if image_bytes.len() <= COMPRESS_THRESHOLD {
        return Ok(image_bytes.to_vec());
    }
    let mut img = image::load_from_memory(image_bytes)?;
    if img.width().max(img.height()) > MAX_DIMENSION {
        img = img.thumbnail(MAX_DIMENSION, MAX_DIMENSION);
    }
    let first = encode_jpeg(&img, 85)?;
    if first.len() <= RETRY_THRESHOLD {
        debug!(
            from = image_bytes.len(),
            to = first.len(),
            "recompressed oversized OCR payload"
        );
        return Ok(first);
    }
    let second = encode_jpeg(&img, 65)?;
    debug!(
        from = image_bytes.len(),
        to = second.len(),
        "recompressed oversized OCR payload (second pass)"
    );
    Ok(second)
}

fn encode_jpeg(img: &image::DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    img.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_recognized_lines() {
        let value = json!({
            "words_result": [{"words": "出院小结"}, {"words": "CA19-9 2100"}],
            "words_result_num": 2
        });
        assert_eq!(words_from_response(&value).unwrap(), "出院小结\nCA19-9 2100");
    }

    #[test]
    fn surfaces_service_error_message() {
        let value = json!({"error_code": 17, "error_msg": "Open api daily request limit reached"});
        let err = words_from_response(&value).unwrap_err();
        assert!(matches!(err, Error::Api { ref message } if message.contains("daily request limit")));
    }

    #[test]
    fn small_payloads_pass_through_untouched() {
        let bytes = vec![0u8; 1024];
        assert_eq!(prepare_payload(&bytes).unwrap(), bytes);
    }
}
