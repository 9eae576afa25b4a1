//! Passwords and session cookies
//!
//! Passwords are stored as `pbkdf2_sha256$<rounds>$<salt>$<hash>` with
//! base64 salt and hash. Sessions are stateless: the cookie carries
//! `<user_id>.<expires>.<signature>`, signed with HMAC-SHA256.

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "blogicum_session";

const HASH_ALGORITHM: &str = "pbkdf2_sha256";
const DEFAULT_ROUNDS: u32 = 600_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> String {
    hash_password_with_rounds(password, DEFAULT_ROUNDS)
}

/// Hash with an explicit round count (tests use a low one).
pub fn hash_password_with_rounds(password: &str, rounds: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let hash = derive(password, &salt, rounds);
    format!(
        "{}${}${}${}",
        HASH_ALGORITHM,
        rounds,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(hash)
    )
}

/// Check a password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(HASH_ALGORITHM), Some(rounds), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (URL_SAFE_NO_PAD.decode(salt), URL_SAFE_NO_PAD.decode(hash))
    else {
        return false;
    };

    constant_time_eq(&derive(password, &salt, rounds), &expected)
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Issues and verifies signed session tokens
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }

    /// Token for `user_id`, valid until `expires`.
    pub fn issue(&self, user_id: i64, expires: DateTime<Utc>) -> String {
        let payload = format!("{}.{}", user_id, expires.timestamp());
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    /// User id from a token, if the signature holds and it hasn't expired.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<i64> {
        let (payload, signature) = token.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let (user_id, expires) = payload.split_once('.')?;
        let expires: i64 = expires.parse().ok()?;
        if expires <= now.timestamp() {
            return None;
        }
        user_id.parse().ok()
    }
}

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        SESSION_COOKIE
    )
}

/// Find a cookie value in the request headers.
pub fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Only same-site paths are accepted as post-login targets.
///
/// Browsers drop tab, CR and LF while parsing a URL, so `/\t/host` would
/// become `//host`. Control characters are rejected outright.
pub fn safe_next(next: Option<&str>) -> &str {
    let Some(path) = next else {
        return "/";
    };
    let local = path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(|c| c.is_ascii_control());

    if local {
        path
    } else {
        "/"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, TimeZone};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn password_roundtrip() {
        let stored = hash_password_with_rounds("war-and-peace", 1_000);
        assert!(stored.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("war-and-peace", &stored));
        assert!(!verify_password("anna-karenina", &stored));
    }

    #[test]
    fn salts_differ() {
        let a = hash_password_with_rounds("same", 1_000);
        let b = hash_password_with_rounds("same", 1_000);
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hashes_never_match() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$1$a$b"));
        assert!(!verify_password("x", "pbkdf2_sha256$many$a$b"));
        assert!(!verify_password("x", "pbkdf2_sha256$1$!!$b"));
        assert!(!verify_password("x", "pbkdf2_sha256$1$a$b$extra"));
    }

    #[test]
    fn session_token_roundtrip() {
        let signer = SessionSigner::new(SECRET);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = signer.issue(42, now + Duration::days(1));

        assert_eq!(signer.verify(&token, now), Some(42));
        assert_eq!(signer.verify(&token, now + Duration::days(2)), None);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let signer = SessionSigner::new(SECRET);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = signer.issue(42, now + Duration::days(1));

        let forged = token.replacen("42.", "1.", 1);
        assert_eq!(signer.verify(&forged, now), None);

        let other = SessionSigner::new("another-secret-another-secret-xx");
        assert_eq!(other.verify(&token, now), None);

        assert_eq!(signer.verify("garbage", now), None);
    }

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; blogicum_session=abc.def; lang=ru"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok", 60, true);
        assert!(cookie.starts_with("blogicum_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn next_must_be_local() {
        assert_eq!(safe_next(Some("/posts/1/")), "/posts/1/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn next_with_control_characters_is_dropped() {
        assert_eq!(safe_next(Some("/\t/evil.example/")), "/");
        assert_eq!(safe_next(Some("/\n/evil.example/")), "/");
        assert_eq!(safe_next(Some("/\r/evil.example/")), "/");
        assert_eq!(safe_next(Some("\t//evil.example/")), "/");
        assert_eq!(safe_next(Some("/posts/\x00")), "/");
        assert_eq!(safe_next(Some("/profile/leo/?page=2")), "/profile/leo/?page=2");
    }
}
