//! Signed session tokens (HS256 JWT).
//!
//! Token = base64url(header).base64url(payload).base64url(HMAC-SHA256(header.payload, secret)).
//!
//! - One server-held secret, loaded at startup, shared read-only by every request
//! - Expiry is checked by us against an explicit clock, after the signature has been verified
//! - Structural problems are reported as `Malformed`; everything that points at the signature
//!   (bad bytes, wrong key, unexpected algorithm) is reported as `InvalidSignature`

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::services::auth::{error::AuthError, principal::Principal};

pub const MIN_SECRET_BYTES: usize = 32;

/// One year. Longer lifetimes are refused at startup.
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The principal's (normalized) email.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::KeyMisconfigured(
                "secret must be at least 32 bytes",
            ));
        }
        if ttl_seconds == 0 {
            return Err(AuthError::KeyMisconfigured("token ttl must be positive"));
        }
        if ttl_seconds > MAX_TTL_SECONDS {
            return Err(AuthError::KeyMisconfigured("token ttl is too long"));
        }
        let ttl = i64::try_from(ttl_seconds)
            .map(Duration::seconds)
            .map_err(|_| AuthError::KeyMisconfigured("token ttl is too long"))?;

        let mut validation = Validation::new(ALGORITHM);
        // exp is checked in `verify_at` against the caller's clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
            ttl,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        self.issue_at(principal, Utc::now())
    }

    pub fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: principal.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        check_structure(token)?;

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                // header and payload already decoded cleanly, so a base64 failure
                // here can only come from the signature segment
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
                    AuthError::InvalidSignature
                }
                _ => AuthError::Malformed,
            })?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::Malformed);
        }
        if claims.exp < now.timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

fn check_structure(token: &str) -> Result<(), AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::Malformed);
    };

    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(AuthError::Malformed);
    }

    jsonwebtoken::decode_header(token).map_err(|_| AuthError::Malformed)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::Malformed)?;
    match serde_json::from_slice::<serde_json::Value>(&payload) {
        Ok(serde_json::Value::Object(_)) => Ok(()),
        _ => Err(AuthError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;

    const SECRET: &[u8] = b"test-secret-key-that-is-at-least-32-bytes-long";
    const TTL: u64 = 86_400;
    const B64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, TTL).unwrap()
    }

    fn principal() -> Principal {
        Principal::new(Uuid::new_v4(), "user@example.com", "User", "hash")
    }

    // Swap a base64url character for another one that differs in its high bit,
    // so the decoded bytes are guaranteed to change.
    fn flip(c: u8) -> u8 {
        let idx = B64URL.iter().position(|&a| a == c).unwrap();
        B64URL[idx ^ 0x20]
    }

    #[test]
    fn issued_token_verifies_with_subject_and_ttl() {
        let codec = codec();
        let before = Utc::now().timestamp();

        let token = codec.issue(&principal()).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, "user@example.com");
        assert!(claims.iat >= before);
        assert_eq!(claims.exp - claims.iat, TTL as i64);
    }

    #[test]
    fn token_has_three_segments_and_hs256_header() {
        let token = codec().issue(&principal()).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn flipping_any_signature_byte_is_invalid_signature() {
        let codec = codec();
        let token = codec.issue(&principal()).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for i in sig_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = flip(bytes[i]);
            let tampered = String::from_utf8(bytes).unwrap();

            match codec.verify(&tampered) {
                Err(AuthError::InvalidSignature) => {}
                other => panic!("byte {i}: expected InvalidSignature, got {other:?}"),
            }
        }
    }

    #[test]
    fn tampered_payload_is_invalid_signature() {
        let codec = codec();
        let token = codec.issue(&principal()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged = serde_json::json!({"sub": "admin@example.com", "iat": 0, "exp": i64::MAX});
        let forged = URL_SAFE_NO_PAD.encode(forged.to_string());
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

        assert!(matches!(
            codec.verify(&tampered),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let other = TokenCodec::new(b"another-secret-key-that-is-also-32-bytes!!", TTL).unwrap();
        let token = other.issue(&principal()).unwrap();

        assert!(matches!(
            codec().verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn token_with_another_algorithm_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user@example.com".into(),
            iat: now,
            exp: now + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            codec().verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn expiry_boundary() {
        let codec = codec();
        let issued = Utc::now();
        let token = codec.issue_at(&principal(), issued).unwrap();
        let ttl = Duration::seconds(TTL as i64);

        assert!(
            codec
                .verify_at(&token, issued + ttl - Duration::seconds(1))
                .is_ok()
        );
        assert!(codec.verify_at(&token, issued + ttl).is_ok());
        assert!(matches!(
            codec.verify_at(&token, issued + ttl + Duration::seconds(1)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn structurally_broken_tokens_are_malformed() {
        let codec = codec();
        let token = codec.issue(&principal()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let cases = vec![
            String::new(),
            "not-a-token".to_string(),
            format!("{}.{}", parts[0], parts[1]),
            format!("{}.{}.{}.{}", parts[0], parts[1], parts[2], parts[2]),
            format!("{}.{}.", parts[0], parts[1]),
            format!("{}.!!!.{}", parts[0], parts[2]),
            format!("{}.{}.{}", URL_SAFE_NO_PAD.encode("{}"), parts[1], parts[2]),
            format!("{}.{}.{}", parts[0], URL_SAFE_NO_PAD.encode("[1,2]"), parts[2]),
        ];

        for case in cases {
            assert!(
                matches!(codec.verify(&case), Err(AuthError::Malformed)),
                "expected Malformed for {case:?}"
            );
        }
    }

    #[test]
    fn short_secret_is_a_startup_error() {
        assert!(matches!(
            TokenCodec::new(b"too-short", TTL),
            Err(AuthError::KeyMisconfigured(_))
        ));
    }

    #[test]
    fn oversized_ttl_is_a_startup_error() {
        for ttl in [MAX_TTL_SECONDS + 1, i64::MAX as u64 + 1, u64::MAX] {
            assert!(matches!(
                TokenCodec::new(SECRET, ttl),
                Err(AuthError::KeyMisconfigured(_))
            ));
        }
    }

    #[test]
    fn longest_allowed_ttl_still_verifies_fresh_tokens() {
        let codec = TokenCodec::new(SECRET, MAX_TTL_SECONDS).unwrap();
        let now = Utc::now();
        let token = codec.issue_at(&principal(), now).unwrap();

        let claims = codec.verify_at(&token, now).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TTL_SECONDS as i64);
    }

    #[test]
    fn debug_does_not_leak_the_secret() {
        let out = format!("{:?}", codec());
        assert!(!out.contains("test-secret"));
    }
}
