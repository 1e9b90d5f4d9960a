//! Form body decoding
//!
//! Only `application/x-www-form-urlencoded` bodies are read. Any other or a
//! missing content type yields an empty form. Malformed escapes and `;`
//! separators are rejected rather than decoded leniently, in the body and
//! in the query string alike.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::CONTENT_TYPE;
use hyper::Request;
use thiserror::Error;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Error, Debug)]
pub enum FormError {
    #[error("invalid Content-Type: {0:?}")]
    InvalidContentType(String),

    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("request body too large (max {0} bytes)")]
    TooLarge(u64),

    #[error("invalid URL escape in {0:?}")]
    InvalidEscape(String),

    #[error("invalid semicolon separator in form data")]
    Semicolon,
}

/// Read and decode the form body of `req`
///
/// Pairs are returned in body order with duplicates preserved. The query
/// string is validated with the same rules but its values are not returned.
pub async fn read_form<B>(
    req: Request<B>,
    max_body_size: u64,
) -> Result<Vec<(String, String)>, FormError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(query) = req.uri().query() {
        parse_urlencoded(query.as_bytes())?;
    }

    let content_type = match req.headers().get(CONTENT_TYPE) {
        Some(value) => value
            .to_str()
            .map_err(|_| FormError::InvalidContentType(format!("{value:?}")))?,
        None => return Ok(Vec::new()),
    };

    if media_type(content_type)? != FORM_URLENCODED {
        return Ok(Vec::new());
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                FormError::TooLarge(max_body_size)
            } else {
                FormError::Body(e.to_string())
            }
        })?
        .to_bytes();

    parse_urlencoded(&body)
}

/// Lower-cased media type of a Content-Type value
///
/// Parameters are checked for syntax and duplicate names, then dropped.
fn media_type(content_type: &str) -> Result<String, FormError> {
    let invalid = || FormError::InvalidContentType(content_type.to_string());

    let (essence, params) = content_type
        .find(';')
        .map_or((content_type, ""), |i| content_type.split_at(i));
    let essence = essence.trim().to_ascii_lowercase();

    let (kind, rest) = split_token(&essence);
    let valid = !kind.is_empty()
        && (rest.is_empty() || rest.strip_prefix('/').is_some_and(is_token));
    if !valid || !media_params_valid(params) {
        return Err(invalid());
    }
    Ok(essence)
}

/// Walk `; name=value` parameters, rejecting malformed or repeated ones
fn media_params_valid(mut rest: &str) -> bool {
    let mut seen: Vec<String> = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return true;
        }
        let Some(param) = rest.strip_prefix(';') else {
            return false;
        };
        let param = param.trim_start();
        let (name, tail) = split_token(param);
        if name.is_empty() {
            // A lone trailing semicolon is tolerated
            return param.trim().is_empty();
        }
        let Some(tail) = tail.trim_start().strip_prefix('=') else {
            return false;
        };
        let Some(tail) = skip_param_value(tail.trim_start()) else {
            return false;
        };

        let name = name.to_ascii_lowercase();
        if seen.contains(&name) {
            return false;
        }
        seen.push(name);
        rest = tail;
    }
}

/// Skip a token or quoted-string value and return what follows it
fn skip_param_value(s: &str) -> Option<&str> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (value, tail) = split_token(s);
        return (!value.is_empty()).then_some(tail);
    };

    let mut escaped = false;
    for (i, c) in quoted.char_indices() {
        match c {
            '\r' | '\n' => return None,
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(&quoted[i + 1..]),
            _ => {}
        }
    }
    None
}

/// Split off the leading run of token characters
fn split_token(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(_, c)| !is_token_char(c))
        .map_or(s.len(), |(i, _)| i);
    s.split_at(end)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Printable ASCII other than MIME tspecials
fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}

/// Decode a urlencoded body after strict validation
pub fn parse_urlencoded(body: &[u8]) -> Result<Vec<(String, String)>, FormError> {
    for segment in body.split(|b| *b == b'&') {
        if segment.contains(&b';') {
            return Err(FormError::Semicolon);
        }
        if !escapes_valid(segment) {
            return Err(FormError::InvalidEscape(
                String::from_utf8_lossy(segment).into_owned(),
            ));
        }
    }

    Ok(url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// Every `%` must be followed by two hex digits
fn escapes_valid(segment: &[u8]) -> bool {
    let mut i = 0;
    while i < segment.len() {
        if segment[i] == b'%' {
            let hex = segment.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
