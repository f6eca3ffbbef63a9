// ABOUTME: Low-level HTTP GET for the video-listing API.
// ABOUTME: Handles query/header assembly, content-length limits, status checks, and charset decoding.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::FetchError;

/// Maximum allowed response size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub query: Vec<(&'static str, String)>,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decodes the body using the charset from the content-type header, UTF-8 otherwise.
    /// Undecodable bytes become U+FFFD, which the sanitizer later repairs.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Decode body bytes to a String using charset from content-type header (JSON defaults to UTF-8).
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(extract_charset)
        .and_then(|charset| encoding_rs::Encoding::for_label(charset.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// `charset` parameter of a Content-Type value, lowercased and unquoted.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_ascii_lowercase())
    })
}

fn too_large(url: &str, len: usize) -> Option<FetchError> {
    (len > MAX_CONTENT_LENGTH).then(|| {
        FetchError::network(
            url,
            "Fetch",
            Some(anyhow::anyhow!("response of {} bytes exceeds {} byte limit", len, MAX_CONTENT_LENGTH)),
        )
    })
}

/// Fetch a resource from the given URL. Any status other than 200 is an Upstream error.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    let target = url::Url::parse(url).map_err(|e| {
        FetchError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(FetchError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("unsupported scheme {}", target.scheme())),
        ));
    }

    let mut request = client.get(target).query(&opts.query);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| FetchError::from_transport(url, "Fetch", e))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(FetchError::upstream(url, "Fetch", status));
    }

    if let Some(err) = response
        .content_length()
        .and_then(|len| too_large(url, len as usize))
    {
        return Err(err);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_transport(url, "Fetch", e))?;

    if let Some(err) = too_large(url, body.len()) {
        return Err(err);
    }

    Ok(FetchResult {
        status,
        content_type,
        body,
    })
}
