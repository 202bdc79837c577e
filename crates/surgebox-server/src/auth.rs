//! Password check, session cookies and path tokens.

use axum::http::{header, HeaderMap, HeaderValue};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

type HmacSha256 = Hmac<Sha256>;

/// Compare `input` to the configured password in constant time.
///
/// Both values are zero-padded to a common length before comparing so the
/// time taken does not depend on where they first differ. An empty
/// configured password never matches.
pub fn verify_password(expected: &str, input: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let a = expected.as_bytes();
    let b = input.as_bytes();
    let len = a.len().max(b.len());

    let mut pa = vec![0u8; len];
    let mut pb = vec![0u8; len];
    pa[..a.len()].copy_from_slice(a);
    pb[..b.len()].copy_from_slice(b);

    let same_bytes = pa.ct_eq(&pb);
    let same_len = (a.len() as u64).ct_eq(&(b.len() as u64));
    (same_bytes & same_len).into()
}

/// Compare a path token against the configured one in constant time.
///
/// When no token is configured every path token is accepted.
pub fn path_token_matches(expected: &str, actual: &str) -> bool {
    expected.is_empty() || bool::from(expected.as_bytes().ct_eq(actual.as_bytes()))
}

/// First path segment, which carries the access token.
pub fn token_from_path(path: &str) -> &str {
    path.split('/').find(|s| !s.is_empty()).unwrap_or("")
}

/// Issues and checks HMAC-signed session values of the form
/// `<expiry_unix>.<hex signature>`.
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
    ttl_secs: u64,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: u64) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        mac
    }

    /// New session value valid for the configured lifetime from `now`.
    pub fn issue(&self, now: i64) -> String {
        let expires = now + self.ttl_secs as i64;
        let payload = expires.to_string();
        let signature = hex::encode(self.mac(&payload).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    /// Whether `value` carries a valid signature and has not expired.
    pub fn verify(&self, value: &str, now: i64) -> bool {
        if self.key.is_empty() {
            return false;
        }
        let Some((payload, signature)) = value.split_once('.') else {
            return false;
        };
        let Ok(expires) = payload.parse::<i64>() else {
            return false;
        };
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        self.mac(payload).verify_slice(&signature).is_ok() && expires > now
    }
}

/// Extract a cookie value from the request headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value installing a session.
pub fn session_cookie(value: &str, max_age: u64, secure: bool) -> HeaderValue {
    build_cookie(value, max_age, secure)
}

/// `Set-Cookie` value removing the session.
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    build_cookie("", 0, secure)
}

fn build_cookie(value: &str, max_age: u64, secure: bool) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        SESSION_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    // Session values are ASCII digits, '.', and hex
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("session=; Max-Age=0"))
}

/// Client address for rate limiting: first `x-forwarded-for` entry, or
/// loopback when absent.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("127.0.0.1")
        .to_string()
}
