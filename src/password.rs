//! Argon2id password storage. Stored values are PHC strings that carry
//! their own salt and parameters.

use argon2::password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Fixed cost: 19 MiB of memory, 2 passes, one lane.
const COST: (u32, u32, u32) = (19 * 1024, 2, 1);

fn argon2id() -> Result<Argon2<'static>, password_hash::Error> {
    let (memory_kib, passes, lanes) = COST;
    let params = Params::new(memory_kib, passes, lanes, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash `plaintext` under a fresh random salt.
pub fn hash(plaintext: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = argon2id()?.hash_password(plaintext.as_bytes(), &salt)?;
    Ok(phc.to_string())
}

/// Whether `plaintext` hashes to the stored `phc` value. A malformed
/// stored value never matches.
pub fn matches(plaintext: &str, phc: &str) -> bool {
    let Ok(stored) = PasswordHash::new(phc) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &stored)
        .is_ok()
}
