use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims des access tokens émis par le service d'authentification.
/// `user_id` est accepté comme alias de `sub` (format simplejwt).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "user_id")]
    pub sub: i32,
    #[serde(default)]
    pub username: String,
    pub exp: i64,
}

/// Vérifie et décode un JWT token (HS256)
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Génère un token signé, utilisé par les tests pour simuler l'émetteur
#[cfg(test)]
pub fn generate_token(secret: &str, user_id: i32, username: &str) -> Result<String, String> {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let expiration = Utc::now()
        .checked_add_signed(Duration::days(2))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_generate_and_verify_token() {
        let token = generate_token(SECRET, 123, "testuser").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, 123);
        assert_eq!(claims.username, "testuser");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_token(SECRET, 1, "alice").unwrap();
        assert!(verify_token("another-secret", &token).is_err());
    }

    #[test]
    fn test_simplejwt_user_id_claim() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = encode(
            &Header::default(),
            &serde_json::json!({ "token_type": "access", "user_id": 42, "exp": exp }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.username.is_empty());
    }

    #[test]
    fn test_invalid_token() {
        assert!(verify_token(SECRET, "invalid.token.here").is_err());
    }
}
