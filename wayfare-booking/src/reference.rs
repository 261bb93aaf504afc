use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const REF_PREFIX: &str = "WF";
const REF_SUFFIX_LEN: usize = 4;
const ACCESS_TOKEN_LEN: usize = 32;

/// Human-typeable booking reference, unique in practice: a minute-resolution
/// timestamp plus a random alphanumeric suffix, uppercased.
pub fn generate_booking_ref() -> String {
    let stamp = Utc::now().format("%y%m%d%H%M");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REF_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}-{}", REF_PREFIX, stamp, suffix).to_uppercase()
}

/// Opaque self-service token for bookings created outside the datastore
/// procedure (the in-memory store mints these; Postgres has a column
/// default).
pub fn generate_access_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCESS_TOKEN_LEN)
        .map(char::from)
        .collect()
}
