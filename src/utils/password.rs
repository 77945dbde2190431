use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "pbkdf2_sha256";
#[cfg(not(test))]
const ITERATIONS: u32 = 600_000;
#[cfg(test)]
const ITERATIONS: u32 = 1_000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 22;

/// Hash un mot de passe au format Django (compatible avec les comptes existants)
/// Format: pbkdf2_sha256$iterations$salt$hash_base64
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect();

    hash_with(password, &salt, ITERATIONS)
}

fn hash_with(password: &str, salt: &str, iterations: u32) -> Result<String, String> {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    Ok(format!("{}${}${}${}", ALGORITHM, iterations, salt, STANDARD.encode(key)))
}

/// Vérifie un mot de passe contre un hash Django
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    // Le sel Django ne contient jamais '$'
    let parts: Vec<&str> = stored_hash.splitn(4, '$').collect();
    if parts.len() != 4 {
        return Err("Invalid hash format".to_string());
    }

    if parts[0] != ALGORITHM {
        return Err(format!("Unsupported hash algorithm: {}", parts[0]));
    }

    let iterations = parts[1]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    let expected = STANDARD
        .decode(parts[3])
        .map_err(|e| format!("Invalid hash encoding: {}", e))?;

    let mut computed = vec![0u8; expected.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), parts[2].as_bytes(), iterations, &mut computed)
        .map_err(|e| format!("PBKDF2 hash verification failed: {}", e))?;

    Ok(constant_time_eq(&computed, &expected))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_with("secret123", "abcdefghijklmnopqrstuv", 1_000).unwrap();
        assert!(hash.starts_with("pbkdf2_sha256$1000$abcdefghijklmnopqrstuv$"));
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hash_layout_matches_django() {
        let hash = hash_password("pass123").unwrap();
        let parts: Vec<&str> = hash.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[2].len(), SALT_LENGTH);
        assert_eq!(STANDARD.decode(parts[3]).unwrap().len(), KEY_LENGTH);
    }

    #[test]
    fn rejects_unknown_formats() {
        assert!(verify_password("x", "pbkdf2:sha256:260000$salt$hash").is_err());
        assert!(verify_password("x", "argon2$1$salt$hash").is_err());
    }
}
