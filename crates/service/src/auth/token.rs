//! HS256 access/refresh token pair.
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by both token kinds; `id` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs: access_ttl_secs as i64,
            refresh_ttl_secs: refresh_ttl_secs as i64,
        }
    }

    pub fn issue(&self, user_id: Uuid, typ: TokenKind) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let ttl = match typ {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        };
        let claims = Claims { id: user_id, typ, iat: now, exp: now + ttl };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    /// Decode and check signature, expiry and kind. Any failure is `InvalidToken`.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;
        if data.claims.typ != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_round_trips_with_kinds() {
        let issuer = TokenIssuer::new("secret", 60, 120);
        let uid = Uuid::new_v4();
        let pair = issuer.issue_pair(uid).unwrap();

        let access = issuer.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.id, uid);
        assert_eq!(access.exp - access.iat, 60);

        let refresh = issuer.verify(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.id, uid);
        assert_eq!(refresh.exp - refresh.iat, 120);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let issuer = TokenIssuer::new("secret", 60, 120);
        let pair = issuer.issue_pair(Uuid::new_v4()).unwrap();
        assert!(matches!(issuer.verify(&pair.refresh_token, TokenKind::Access), Err(AuthError::InvalidToken)));
        assert!(matches!(issuer.verify(&pair.access_token, TokenKind::Refresh), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn foreign_signature_and_garbage_are_rejected() {
        let ours = TokenIssuer::new("secret", 60, 120);
        let theirs = TokenIssuer::new("other-secret", 60, 120);
        let token = theirs.issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        assert!(ours.verify(&token, TokenKind::Access).is_err());
        assert!(ours.verify("not.a.jwt", TokenKind::Access).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("secret", 60, 120);
        let now = chrono::Utc::now().timestamp();
        let claims = Claims { id: Uuid::new_v4(), typ: TokenKind::Access, iat: now - 7200, exp: now - 3600 };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(matches!(issuer.verify(&token, TokenKind::Access), Err(AuthError::InvalidToken)));
    }
}
