//! HTTP response handlers.

use anyhow::{Result, anyhow};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::hash;
use crate::utils::mime::{HTML, JSON, PLAIN};

/// Body of `GET /api/content`
#[derive(Serialize)]
struct ContentBody<'a> {
    content: &'a str,
}

/// Body of a successful write
#[derive(Serialize)]
struct SaveBody {
    ok: bool,
    changed: bool,
}

/// Body of a rejected write
#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    error: &'a str,
}

/// Respond with the editor page.
pub fn respond_index(request: Request, body: String) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, HTML, None);
    }
    send_body(request, 200, HTML, body.into_bytes(), None)
}

/// Respond with the document as JSON (`{"content": ...}`).
pub fn respond_content_json(request: Request, content: &str) -> Result<()> {
    let body = serde_json::to_vec(&ContentBody { content })?;
    respond_tagged(request, content, JSON, body)
}

/// Respond with the document as plain text.
pub fn respond_content_raw(request: Request, content: &str) -> Result<()> {
    respond_tagged(request, content, PLAIN, content.as_bytes().to_vec())
}

/// Content responses carry an ETag and honour `If-None-Match`.
fn respond_tagged(
    request: Request,
    content: &str,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let etag = hash::etag(content);

    let not_modified = header_value(&request, "If-None-Match")
        .is_some_and(|value| hash::etag_matches(&value, &etag));
    if not_modified {
        let response = Response::empty(StatusCode(304)).with_header(make_header("ETag", &etag)?);
        request.respond(response)?;
        return Ok(());
    }

    if is_head_request(&request) {
        return send_head(request, 200, content_type, Some(&etag));
    }
    send_body(request, 200, content_type, body, Some(&etag))
}

/// Respond to an accepted write.
pub fn respond_saved(request: Request, changed: bool) -> Result<()> {
    let body = serde_json::to_vec(&SaveBody { ok: true, changed })?;
    send_body(request, 200, JSON, body, None)
}

/// Respond to a rejected write body (4xx).
pub fn respond_bad_payload(request: Request, status: u16, error: &str) -> Result<()> {
    let body = serde_json::to_vec(&ErrorBody { ok: false, error })?;
    send_body(request, status, JSON, body, None)
}

/// Respond with 404 Not Found.
pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN, None);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec(), None)
}

/// Respond with 405 Method Not Allowed.
pub fn respond_method_not_allowed(request: Request, allow: &'static str) -> Result<()> {
    let response = Response::from_data(b"405 Method Not Allowed".to_vec())
        .with_status_code(StatusCode(405))
        .with_header(make_header("Content-Type", PLAIN)?)
        .with_header(make_header("Allow", allow)?);
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down or engine gone).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec(), None)
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

/// First value of a request header, matched case-insensitively.
pub fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.to_string())
}

fn send_head(
    request: Request,
    status: u16,
    content_type: &'static str,
    etag: Option<&str>,
) -> Result<()> {
    let mut response =
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type)?);
    if let Some(etag) = etag {
        response = response.with_header(make_header("ETag", etag)?);
    }
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    etag: Option<&str>,
) -> Result<()> {
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-cache")?);
    if let Some(etag) = etag {
        response = response.with_header(make_header("ETag", etag)?);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_header() {
        let header = make_header("ETag", "\"abc\"").unwrap();
        assert!(header.field.equiv("etag"));
        assert_eq!(header.value.as_str(), "\"abc\"");
    }

    #[test]
    fn test_bodies_serialize() {
        let json = serde_json::to_string(&SaveBody { ok: true, changed: false }).unwrap();
        assert_eq!(json, r#"{"ok":true,"changed":false}"#);

        let json = serde_json::to_string(&ContentBody { content: "a\"b" }).unwrap();
        assert_eq!(json, r#"{"content":"a\"b"}"#);
    }
}
