use ring::rand::SecureRandom;
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),
}

/// Random lowercase hex string encoding `len` random bytes
pub(crate) fn gen_random_hex(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;

    let mut encoded = String::with_capacity(len * 2);
    for byte in bytes {
        let _ = write!(encoded, "{byte:02x}");
    }
    Ok(encoded)
}

/// URL slug for a display name
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters collapses into a single `-`. Names with no ASCII alphanumerics
/// produce an empty slug.
pub(crate) fn slug_for(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
