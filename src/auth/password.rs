use tracing::{error, warn};

/// bcrypt work factor. Deliberately slow; callers run hashing on the
/// blocking pool so the event loop stays free.
pub const HASH_COST: u32 = 12;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    bcrypt::hash(plain, HASH_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e.to_string())
    })
}

/// Fails closed: a malformed stored hash counts as a mismatch, never an
/// error surfaced to the login path.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(plain, hash) {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "bcrypt verify error, treating as mismatch");
            false
        }
    }
}
