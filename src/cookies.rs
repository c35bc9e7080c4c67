//! Recovery of the provider's session cookie.
//!
//! Supabase stores the serialized session as URL-encoded JSON in a cookie named
//! `sb-<project>-auth-token`. When that value is too large for one cookie it is
//! split into chunks suffixed `.0`, `.1`, ... which have to be glued back
//! together in name order before decoding.

use std::sync::LazyLock;

use axum::http::{HeaderMap, header};
use regex::Regex;
use serde_json::{Map, Value};

use crate::token::AuthTokens;

static AUTH_COOKIE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sb-[a-z]+-auth-token.*$").expect("auth cookie pattern is valid")
});

/// Returns true for the session cookie and any of its chunks.
pub fn is_auth_cookie(name: &str) -> bool {
    AUTH_COOKIE_NAME.is_match(name)
}

/// Reassembles the session cookie and pulls the token pair out of it.
///
/// `None` covers both a missing cookie and one whose contents cannot be
/// decoded; callers are not told which. A session object lacking one of the
/// tokens still yields a pair, with that token left empty.
pub fn extract_tokens_from_cookies<I, K, V>(cookies: I) -> Option<AuthTokens>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut auth_cookies: Vec<(K, V)> = cookies
        .into_iter()
        .filter(|(name, _)| is_auth_cookie(name.as_ref()))
        .collect();

    if auth_cookies.is_empty() {
        tracing::debug!("no auth cookie on request");
        return None;
    }

    auth_cookies.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));

    let joined: String = auth_cookies
        .iter()
        .map(|(_, value)| value.as_ref())
        .collect();

    if has_malformed_escape(&joined) {
        tracing::debug!(chunks = auth_cookies.len(), "auth cookie has a malformed escape");
        return None;
    }

    let decoded = match urlencoding::decode(&joined) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(chunks = auth_cookies.len(), "auth cookie is not valid UTF-8: {e}");
            return None;
        }
    };

    let session = match serde_json::from_str::<Value>(&decoded) {
        Ok(Value::Object(session)) => session,
        Ok(_) => {
            tracing::debug!(chunks = auth_cookies.len(), "auth cookie is not a JSON object");
            return None;
        }
        Err(e) => {
            tracing::debug!(chunks = auth_cookies.len(), "auth cookie is not a session: {e}");
            return None;
        }
    };

    Some(AuthTokens {
        access_token: token_field(&session, "access_token"),
        refresh_token: token_field(&session, "refresh_token"),
    })
}

fn token_field(session: &Map<String, Value>, name: &str) -> String {
    session
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// True when a `%` is not followed by two hex digits.
fn has_malformed_escape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !matches!(
                bytes.get(i + 1..i + 3),
                Some([high, low]) if high.is_ascii_hexdigit() && low.is_ascii_hexdigit()
            )
    })
}

/// Collects the raw name/value pairs from every `Cookie` header.
///
/// Values are returned as sent; percent-decoding happens only after chunk
/// reassembly.
pub fn parse_cookie_header(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const SESSION: &str = r#"{"access_token":"header.payload.signature","refresh_token":"r3fr3sh","token_type":"bearer"}"#;

    fn encoded() -> String {
        urlencoding::encode(SESSION).into_owned()
    }

    #[test]
    fn test_cookie_name_pattern() {
        assert!(is_auth_cookie("sb-abcdef-auth-token"));
        assert!(is_auth_cookie("sb-abcdef-auth-token.0"));
        assert!(is_auth_cookie("sb-abcdef-auth-token-code-verifier"));
        assert!(!is_auth_cookie("sb-ABC-auth-token"));
        assert!(!is_auth_cookie("sb-abc123-auth-token"));
        assert!(!is_auth_cookie("sb--auth-token"));
        assert!(!is_auth_cookie("xsb-abc-auth-token"));
        assert!(!is_auth_cookie("session"));
    }

    #[test]
    fn test_single_cookie() {
        let cookies = vec![
            ("theme", "dark".to_string()),
            ("sb-proj-auth-token", encoded()),
        ];

        let tokens = extract_tokens_from_cookies(cookies).unwrap();
        assert_eq!(tokens.access_token, "header.payload.signature");
        assert_eq!(tokens.refresh_token, "r3fr3sh");
    }

    #[test]
    fn test_unencoded_json_cookie() {
        let tokens = extract_tokens_from_cookies([("sb-proj-auth-token", SESSION)]).unwrap();
        assert_eq!(tokens.refresh_token, "r3fr3sh");
    }

    #[test]
    fn test_chunks_are_joined_in_name_order() {
        let value = encoded();
        let (head, tail) = value.split_at(value.len() / 2);

        // Delivered out of order on purpose.
        let cookies = [
            ("sb-proj-auth-token.1", tail),
            ("other", "x"),
            ("sb-proj-auth-token.0", head),
        ];

        let tokens = extract_tokens_from_cookies(cookies).unwrap();
        assert_eq!(tokens.access_token, "header.payload.signature");
    }

    #[test]
    fn test_swapped_chunks_do_not_parse() {
        let value = encoded();
        let (head, tail) = value.split_at(value.len() / 2);

        let cookies = [("sb-proj-auth-token.0", tail), ("sb-proj-auth-token.1", head)];

        assert!(extract_tokens_from_cookies(cookies).is_none());
    }

    #[test]
    fn test_no_matching_cookie() {
        let cookies = [("sb-auth-token", "x"), ("auth-token", "y")];
        assert!(extract_tokens_from_cookies(cookies).is_none());
        assert!(extract_tokens_from_cookies(Vec::<(String, String)>::new()).is_none());
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(extract_tokens_from_cookies([("sb-proj-auth-token", "not json")]).is_none());
        assert!(extract_tokens_from_cookies([("sb-proj-auth-token", "%7B%22access")]).is_none());
        assert!(extract_tokens_from_cookies([("sb-proj-auth-token", "%FF%FE")]).is_none());
        assert!(extract_tokens_from_cookies([("sb-proj-auth-token", "null")]).is_none());
        assert!(extract_tokens_from_cookies([("sb-proj-auth-token", "[1,2]")]).is_none());
    }

    #[test]
    fn test_bad_escape_inside_string_value() {
        let cookies = [(
            "sb-proj-auth-token",
            r#"{"access_token":"header.payload.signature","refresh_token":"r%zz"}"#,
        )];
        assert!(extract_tokens_from_cookies(cookies).is_none());

        let truncated = [(
            "sb-proj-auth-token",
            r#"{"access_token":"a","refresh_token":"r%4"}"#,
        )];
        assert!(extract_tokens_from_cookies(truncated).is_none());
    }

    #[test]
    fn test_escape_detection() {
        assert!(!has_malformed_escape("%7B%22a%22%3A1%7d"));
        assert!(!has_malformed_escape("plain"));
        assert!(has_malformed_escape("%"));
        assert!(has_malformed_escape("abc%2"));
        assert!(has_malformed_escape("%g1"));
        assert!(has_malformed_escape("%%41"));
    }

    #[test]
    fn test_missing_token_fields_are_left_empty() {
        let tokens =
            extract_tokens_from_cookies([("sb-proj-auth-token", r#"{"access_token":"a"}"#)])
                .unwrap();
        assert_eq!(tokens.access_token, "a");
        assert_eq!(tokens.refresh_token, "");

        let tokens = extract_tokens_from_cookies([(
            "sb-proj-auth-token",
            r#"{"refresh_token":"r","access_token":42}"#,
        )])
        .unwrap();
        assert_eq!(tokens.access_token, "");
        assert_eq!(tokens.refresh_token, "r");
    }

    #[test]
    fn test_parse_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sb-proj-auth-token.0=%7B%22a"),
        );
        headers.append(header::COOKIE, HeaderValue::from_static("lang=en;broken"));

        let cookies = parse_cookie_header(&headers);
        assert_eq!(
            cookies,
            vec![
                ("theme".to_string(), "dark".to_string()),
                ("sb-proj-auth-token.0".to_string(), "%7B%22a".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
    }
}
