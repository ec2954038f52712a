/// Hash a plaintext password for storage.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, cost)
}

/// Check a plaintext password against a stored hash. Malformed hashes never verify.
#[cfg(test)]
pub(crate) fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}
