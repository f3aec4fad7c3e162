//! Literotica JSON API access: story-URL parsing, metadata fetch, and the
//! sequential page fetch.
//!
//! Two endpoints, both GET, both keyed by story id: the metadata endpoint
//! (`/api/3/stories/{id}`) and the same path with a `params` query selecting
//! one content page. Every request is a single attempt; the first failure
//! aborts the fetch and discards anything gathered so far.

mod client;
mod error;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::FetchError;

use crate::model::{SeriesItem, StoryId, StoryInfo};
use log::debug;
use reqwest::Url;
use serde::Deserialize;

const STORIES_API_BASE: &str = "https://www.literotica.com/api/3/stories";

fn story_api_url(base: &str, id: &StoryId) -> String {
    format!("{}/{}", base, id)
}

fn page_api_url(base: &str, id: &StoryId, page: u32) -> String {
    format!("{}/{}?params={{\"contentPage\":{}}}", base, id, page)
}

/// Wire shape of the metadata endpoint. Converted to [StoryInfo] after validation.
#[derive(Debug, Deserialize)]
struct StoryResponse {
    submission: Submission,
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Submission {
    author: AuthorRef,
    title: String,
    #[serde(default)]
    series: Option<Series>,
}

#[derive(Debug, Deserialize)]
struct AuthorRef {
    username: String,
}

#[derive(Debug, Deserialize)]
struct Series {
    items: Vec<SeriesItem>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    pages_count: u32,
}

/// Wire shape of one content-page response.
#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(rename = "pageText")]
    page_text: String,
}

/// Extract the story id from a URL of the shape `https://<host>/s/<identifier>`.
///
/// The identifier is the full path remainder after `/s/` (it may itself
/// contain `/`); the query string is not part of it. Anything else is
/// [FetchError::InvalidUrl].
pub fn parse_story_url(input: &str) -> Result<StoryId, FetchError> {
    let invalid = || FetchError::InvalidUrl {
        input: input.to_string(),
    };
    let url = Url::parse(input).map_err(|_| invalid())?;
    if url.scheme() != "https" {
        return Err(invalid());
    }
    let host = url.host_str().ok_or_else(invalid)?;
    if host != "literotica.com" && !host.ends_with(".literotica.com") {
        return Err(invalid());
    }
    let id = url.path().strip_prefix("/s/").ok_or_else(invalid)?;
    if id.is_empty() {
        return Err(invalid());
    }
    Ok(StoryId::new(id))
}

/// Check response status and read the body. Non-2xx is [FetchError::HttpStatus].
fn check_response(
    response: reqwest::blocking::Response,
    url: &str,
) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response.text().map_err(|e| FetchError::Network {
        url: url.to_string(),
        source: e,
    })
}

/// Parse a metadata response body into [StoryInfo].
fn story_info_from_json(id: &StoryId, url: &str, body: &str) -> Result<StoryInfo, FetchError> {
    let parsed: StoryResponse =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    if parsed.meta.pages_count == 0 {
        return Err(FetchError::MalformedResponse {
            url: url.to_string(),
            reason: "meta.pages_count must be at least 1".to_string(),
        });
    }
    Ok(StoryInfo {
        id: id.clone(),
        title: parsed.submission.title,
        author: parsed.submission.author.username,
        page_count: parsed.meta.pages_count,
        series_items: parsed.submission.series.map(|s| s.items),
    })
}

/// Parse a content-page response body into the page text.
fn page_text_from_json(url: &str, body: &str) -> Result<String, FetchError> {
    let parsed: PageResponse =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(parsed.page_text)
}

/// Fetch story metadata: title, author username, page count, and the series
/// listing when the story belongs to one. One outbound request.
pub fn fetch_story_info(client: &ApiClient, id: &StoryId) -> Result<StoryInfo, FetchError> {
    fetch_story_info_from(client, STORIES_API_BASE, id)
}

fn fetch_story_info_from(
    client: &ApiClient,
    base: &str,
    id: &StoryId,
) -> Result<StoryInfo, FetchError> {
    let url = story_api_url(base, id);
    debug!("Fetching story info from {}", url);
    let response = client.get(&url).map_err(|e| FetchError::Network {
        url: url.clone(),
        source: e,
    })?;
    let body = check_response(response, &url)?;
    story_info_from_json(id, &url, &body)
}

/// Fetch all content pages of a story, strictly sequentially in ascending
/// page order, and return them in that order.
///
/// `progress` is called with (pages fetched so far, page_count) after each
/// page. Any page failure aborts the whole fetch; no partial result is
/// returned.
pub fn fetch_story_text(
    client: &ApiClient,
    id: &StoryId,
    page_count: u32,
    progress: Option<&dyn Fn(u32, u32)>,
) -> Result<Vec<String>, FetchError> {
    fetch_story_text_from(client, STORIES_API_BASE, id, page_count, progress)
}

fn fetch_story_text_from(
    client: &ApiClient,
    base: &str,
    id: &StoryId,
    page_count: u32,
    progress: Option<&dyn Fn(u32, u32)>,
) -> Result<Vec<String>, FetchError> {
    let mut pages = Vec::with_capacity(page_count as usize);
    for page in 1..=page_count {
        let url = page_api_url(base, id, page);
        debug!("Fetching page {} from {}", page, url);
        let response = client.get(&url).map_err(|e| FetchError::Network {
            url: url.clone(),
            source: e,
        })?;
        let body = check_response(response, &url)?;
        pages.push(page_text_from_json(&url, &body)?);
        if let Some(cb) = progress {
            cb(page, page_count);
        }
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_story_url_extracts_path_remainder() -> Result<(), FetchError> {
        let id = parse_story_url("https://www.literotica.com/s/lovers-in-the-dark")?;
        assert_eq!(id, StoryId::new("lovers-in-the-dark"));
        Ok(())
    }

    #[test]
    fn parse_story_url_keeps_nested_path_segments() -> Result<(), FetchError> {
        let id = parse_story_url("https://www.literotica.com/s/foo/bar")?;
        assert_eq!(id, StoryId::new("foo/bar"));
        Ok(())
    }

    #[test]
    fn parse_story_url_ignores_query_string() -> Result<(), FetchError> {
        let id = parse_story_url("https://www.literotica.com/s/some-story?page=2")?;
        assert_eq!(id, StoryId::new("some-story"));
        Ok(())
    }

    #[test]
    fn parse_story_url_rejects_non_story_paths() {
        for input in [
            "https://www.literotica.com/stories/memberpage.php",
            "https://www.literotica.com/s/",
            "https://www.literotica.com/",
        ] {
            assert!(
                matches!(parse_story_url(input), Err(FetchError::InvalidUrl { .. })),
                "expected InvalidUrl for {input}"
            );
        }
    }

    #[test]
    fn parse_story_url_accepts_bare_and_subdomain_hosts() {
        assert!(parse_story_url("https://literotica.com/s/some-story").is_ok());
        assert!(parse_story_url("https://german.literotica.com/s/some-story").is_ok());
    }

    #[test]
    fn parse_story_url_rejects_other_hosts_and_schemes() {
        for input in [
            "https://example.com/s/some-story",
            "https://notliterotica.com/s/some-story",
            "https://literotica.com.evil.example/s/some-story",
            "http://www.literotica.com/s/some-story",
            "not-a-url",
        ] {
            assert!(
                matches!(parse_story_url(input), Err(FetchError::InvalidUrl { .. })),
                "expected InvalidUrl for {input}"
            );
        }
    }

    #[test]
    fn page_api_url_carries_content_page_param() {
        let url = page_api_url(STORIES_API_BASE, &StoryId::new("abc"), 3);
        assert_eq!(
            url,
            r#"https://www.literotica.com/api/3/stories/abc?params={"contentPage":3}"#
        );
    }

    const METADATA_SINGLE: &str = r#"{
        "submission": {
            "author": {"username": "jdoe"},
            "title": "My Story"
        },
        "meta": {"pages_count": 2}
    }"#;

    const METADATA_SERIES: &str = r#"{
        "submission": {
            "author": {"username": "jdoe"},
            "title": "My Story Pt. 01",
            "series": {"items": [
                {"id": 101, "title": "My Story Pt. 01"},
                {"id": "my-story-pt-02", "title": "My Story Pt. 02"}
            ]}
        },
        "meta": {"pages_count": 4}
    }"#;

    #[test]
    fn story_info_from_json_single_story() -> Result<(), FetchError> {
        let id = StoryId::new("my-story");
        let info = story_info_from_json(&id, "u", METADATA_SINGLE)?;
        assert_eq!(info.id, id);
        assert_eq!(info.title, "My Story");
        assert_eq!(info.author, "jdoe");
        assert_eq!(info.page_count, 2);
        assert!(info.series_items.is_none());
        Ok(())
    }

    #[test]
    fn story_info_from_json_series_listing_in_order() -> Result<(), FetchError> {
        let info = story_info_from_json(&StoryId::new("my-story-pt-01"), "u", METADATA_SERIES)?;
        let items = info.series_items.expect("series items");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, StoryId::new("101"));
        assert_eq!(items[0].title, "My Story Pt. 01");
        assert_eq!(items[1].id, StoryId::new("my-story-pt-02"));
        Ok(())
    }

    #[test]
    fn story_info_from_json_missing_fields_is_malformed() {
        let cases = [
            // no submission
            r#"{"meta": {"pages_count": 1}}"#,
            // no author username
            r#"{"submission": {"author": {}, "title": "T"}, "meta": {"pages_count": 1}}"#,
            // no title
            r#"{"submission": {"author": {"username": "a"}}, "meta": {"pages_count": 1}}"#,
            // no pages_count
            r#"{"submission": {"author": {"username": "a"}, "title": "T"}, "meta": {}}"#,
            // not JSON at all
            "<html>guard page</html>",
        ];
        for body in cases {
            let result = story_info_from_json(&StoryId::new("x"), "u", body);
            assert!(
                matches!(result, Err(FetchError::MalformedResponse { .. })),
                "expected MalformedResponse for {body}"
            );
        }
    }

    #[test]
    fn story_info_from_json_zero_pages_is_malformed() {
        let body = r#"{"submission": {"author": {"username": "a"}, "title": "T"}, "meta": {"pages_count": 0}}"#;
        assert!(matches!(
            story_info_from_json(&StoryId::new("x"), "u", body),
            Err(FetchError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn page_text_from_json_extracts_text() -> Result<(), FetchError> {
        assert_eq!(
            page_text_from_json("u", r#"{"pageText": "Hello "}"#)?,
            "Hello "
        );
        Ok(())
    }

    #[test]
    fn page_text_from_json_missing_field_is_malformed() {
        assert!(matches!(
            page_text_from_json("u", r#"{"text": "Hello"}"#),
            Err(FetchError::MalformedResponse { .. })
        ));
    }

    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Serve the given (status, body) responses in order on a fresh local port,
    /// one connection per response. Returns the base URL to fetch against and a
    /// handle yielding the request paths in arrival order.
    fn serve_responses(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let mut paths = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    if header == "\r\n" || header.is_empty() {
                        break;
                    }
                }
                paths.push(
                    request_line
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("")
                        .to_string(),
                );
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
            paths
        });
        (format!("http://127.0.0.1:{}", addr.port()), handle)
    }

    /// Pull the contentPage number out of a request path, tolerating
    /// percent-encoded braces.
    fn page_param(path: &str) -> Option<u32> {
        let idx = path.rfind(':')?;
        let tail = &path[idx + 1..];
        let tail = tail.strip_suffix("%7D").unwrap_or(tail);
        let tail = tail.strip_suffix('}').unwrap_or(tail);
        tail.parse().ok()
    }

    #[test]
    fn fetch_story_text_requests_all_pages_in_ascending_order() {
        let (base, handle) = serve_responses(vec![
            (200, r#"{"pageText": "Hello "}"#.to_string()),
            (200, r#"{"pageText": "World"}"#.to_string()),
        ]);
        let client = ApiClient::new().unwrap();
        let seen = std::cell::RefCell::new(Vec::new());
        let progress = |n: u32, total: u32| seen.borrow_mut().push((n, total));
        let pages =
            fetch_story_text_from(&client, &base, &StoryId::new("abc"), 2, Some(&progress))
                .unwrap();
        assert_eq!(pages, vec!["Hello ".to_string(), "World".to_string()]);
        assert_eq!(*seen.borrow(), vec![(1, 2), (2, 2)]);
        let paths = handle.join().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.starts_with("/abc?")));
        let pages_requested: Vec<u32> = paths.iter().filter_map(|p| page_param(p)).collect();
        assert_eq!(pages_requested, vec![1, 2]);
    }

    #[test]
    fn fetch_story_text_mid_sequence_http_error_discards_fetched_pages() {
        let (base, handle) = serve_responses(vec![
            (200, r#"{"pageText": "Hello "}"#.to_string()),
            (500, r#"{"error": "server"}"#.to_string()),
        ]);
        let client = ApiClient::new().unwrap();
        let result = fetch_story_text_from(&client, &base, &StoryId::new("abc"), 3, None);
        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 500, .. })
        ));
        // The failing page aborts the fetch: page 3 is never requested.
        let paths = handle.join().unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn fetch_story_text_missing_page_text_field_is_malformed() {
        let (base, _handle) = serve_responses(vec![
            (200, r#"{"pageText": "Hello "}"#.to_string()),
            (200, r#"{"body": "no page text here"}"#.to_string()),
        ]);
        let client = ApiClient::new().unwrap();
        let result = fetch_story_text_from(&client, &base, &StoryId::new("abc"), 2, None);
        assert!(matches!(
            result,
            Err(FetchError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn fetch_story_info_parses_metadata_over_http() {
        let (base, handle) = serve_responses(vec![(200, METADATA_SINGLE.to_string())]);
        let client = ApiClient::new().unwrap();
        let info = fetch_story_info_from(&client, &base, &StoryId::new("my-story")).unwrap();
        assert_eq!(info.title, "My Story");
        assert_eq!(info.author, "jdoe");
        assert_eq!(info.page_count, 2);
        let paths = handle.join().unwrap();
        assert_eq!(paths, vec!["/my-story".to_string()]);
    }

    #[test]
    fn fetch_story_info_surfaces_http_status() {
        let (base, _handle) = serve_responses(vec![(404, "{}".to_string())]);
        let client = ApiClient::new().unwrap();
        let result = fetch_story_info_from(&client, &base, &StoryId::new("gone"));
        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 404, .. })
        ));
    }
}
