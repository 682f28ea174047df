use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use uuid::Uuid;

use crate::models::{Account, Role};

pub const SESSION_COOKIE: &str = "commune_session";

/// Cookie payload naming the logged-in account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken {
    pub role: Role,
    pub account_id: Uuid,
}

impl SessionToken {
    pub fn for_account(account: &Account) -> Self {
        Self {
            role: account.role(),
            account_id: account.id(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.role, self.account_id)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (role, id) = raw.split_once(':')?;
        Some(Self {
            role: role.parse().ok()?,
            account_id: Uuid::parse_str(id).ok()?,
        })
    }
}

#[derive(Clone)]
pub struct SessionManager {
    key: Key,
    secure: bool,
}

impl SessionManager {
    pub fn new(key: Key, secure: bool) -> Self {
        Self { key, secure }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn start(&self, jar: SignedCookieJar, account: &Account) -> SignedCookieJar {
        let cookie = Cookie::build((SESSION_COOKIE, SessionToken::for_account(account).encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);
        jar.add(cookie)
    }

    pub fn end(&self, jar: SignedCookieJar) -> SignedCookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    /// Unsigned, tampered or malformed cookies read as no session.
    pub fn read(&self, jar: &SignedCookieJar) -> Option<SessionToken> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| SessionToken::decode(cookie.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    #[test]
    fn test_token_decodes_what_it_encodes() {
        let token = SessionToken {
            role: Role::Organization,
            account_id: Uuid::new_v4(),
        };
        assert_eq!(SessionToken::decode(&token.encode()), Some(token));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        assert_eq!(SessionToken::decode(""), None);
        assert_eq!(SessionToken::decode("volunteer"), None);
        assert_eq!(SessionToken::decode("admin:6f1c1a52-1e1b-4a53-9a55-4d0c7f0d8f11"), None);
        assert_eq!(SessionToken::decode("volunteer:not-a-uuid"), None);
    }

    #[test]
    fn test_unsigned_cookie_is_ignored() {
        let manager = SessionManager::new(Key::generate(), false);
        let forged = format!("{SESSION_COOKIE}=volunteer:{}", Uuid::new_v4());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&forged).unwrap());
        let jar = SignedCookieJar::from_headers(&headers, manager.key().clone());

        assert_eq!(manager.read(&jar), None);
    }
}
