use argon2::{
    password_hash::{Output, SaltString},
    Argon2, PasswordHasher,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// Hash output and the salt it was derived with, both base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub hash: String,
    pub salt: String,
}

fn derive(plain: &str, salt: &SaltString) -> anyhow::Result<Output> {
    let hashed = Argon2::default()
        .hash_password(plain.as_bytes(), salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?;
    hashed
        .hash
        .ok_or_else(|| anyhow::anyhow!("argon2 produced no hash output"))
}

pub fn hash_password(plain: &str) -> anyhow::Result<PasswordDigest> {
    let salt = SaltString::generate(&mut OsRng);
    let output = derive(plain, &salt)?;
    Ok(PasswordDigest {
        hash: output.to_string(),
        salt: salt.as_str().to_string(),
    })
}

/// Recomputes the hash with the stored salt. `Output` equality is constant time.
pub fn verify_password(plain: &str, stored_hash: &str, stored_salt: &str) -> bool {
    let salt = match SaltString::from_b64(stored_salt) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "stored salt is malformed");
            return false;
        }
    };
    let expected = match Output::b64_decode(stored_hash) {
        Ok(o) => o,
        Err(e) => {
            warn!(error = %e, "stored hash is malformed");
            return false;
        }
    };
    match derive(plain, &salt) {
        Ok(actual) => actual == expected,
        Err(_) => false,
    }
}
