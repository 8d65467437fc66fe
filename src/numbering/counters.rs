//! Monthly counters for registration, verification, and correction numbers.
//!
//! Same algorithm for every counter: resolve the window, read the highest
//! previously issued value from the store ledger, increment, format. The
//! read-then-increment is deliberately not atomic; a rare concurrent
//! issuance is caught downstream by the persisted uniqueness constraint
//! rather than serialized here.

use chrono::{DateTime, Utc};

use crate::store::{CounterKind, DocumentStore, IssuedNumber, StoreError};
use crate::utils::month_window_key;

use super::NumberingError;

/// A counter value plus the ledger entry the caller must persist with the
/// transition that uses it.
#[derive(Debug, Clone)]
pub struct MintedNumber {
    pub formatted: String,
    pub issued: IssuedNumber,
}

async fn next_in_month(
    store: &dyn DocumentStore,
    counter: CounterKind,
    at: DateTime<Utc>,
) -> Result<(u32, String), StoreError> {
    let window = month_window_key(at);
    let max = store.max_issued(counter, &window).await?;
    let value = max.unwrap_or(0).saturating_add(1);
    Ok((value, window))
}

/// Mint the next registration number: `REG-yyyyMMdd-NNNN`, seeded at 1 each
/// calendar month.
pub async fn next_registration_number(
    store: &dyn DocumentStore,
    at: DateTime<Utc>,
) -> Result<MintedNumber, StoreError> {
    let (value, window) = next_in_month(store, CounterKind::Registration, at).await?;
    Ok(MintedNumber {
        formatted: format!("REG-{}-{value:04}", at.format("%Y%m%d")),
        issued: IssuedNumber {
            counter: CounterKind::Registration,
            window,
            value,
        },
    })
}

/// Mint the next verification number: `VRF-yyyyMMdd-NNNN`, monthly window.
pub async fn next_verification_number(
    store: &dyn DocumentStore,
    at: DateTime<Utc>,
) -> Result<MintedNumber, StoreError> {
    let (value, window) = next_in_month(store, CounterKind::Verification, at).await?;
    Ok(MintedNumber {
        formatted: format!("VRF-{}-{value:04}", at.format("%Y%m%d")),
        issued: IssuedNumber {
            counter: CounterKind::Verification,
            window,
            value,
        },
    })
}

/// A minted correction number. `sequence` is the raw monthly counter value
/// and is stored on the document as an integer; nothing ever re-parses the
/// formatted string to recover it.
#[derive(Debug, Clone)]
pub struct MintedCorrection {
    pub formatted: String,
    pub sequence: u32,
    pub issued: IssuedNumber,
}

/// Numeric suffix of a registration number (`REG-20250115-0007` -> `7`).
#[must_use]
pub fn registration_suffix(registration_number: &str) -> Option<u32> {
    registration_number.rsplit('-').next()?.parse().ok()
}

/// Mint the next correction number:
/// `<registration suffix>-K-<monthly sequence, zero padded>`.
pub async fn next_correction_number(
    store: &dyn DocumentStore,
    registration_number: &str,
    at: DateTime<Utc>,
) -> Result<MintedCorrection, NumberingError> {
    let base = registration_suffix(registration_number).ok_or_else(|| {
        NumberingError::MalformedRegistrationNumber(registration_number.to_string())
    })?;
    let (value, window) = next_in_month(store, CounterKind::Correction, at).await?;
    Ok(MintedCorrection {
        formatted: format!("{base}-K-{value:04}"),
        sequence: value,
        issued: IssuedNumber {
            counter: CounterKind::Correction,
            window,
            value,
        },
    })
}
