//! Placeholder transaction ids.

use rand::Rng;

/// Length of a transaction id, in hex digits.
pub const TRANSACTION_ID_LEN: usize = 64;

/// A random id shaped like a real transaction: 64 lowercase hex digits.
pub fn mock_transaction_id() -> String {
    mock_transaction_id_with(&mut rand::rng())
}

pub fn mock_transaction_id_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TRANSACTION_ID_LEN)
        .map(|_| format!("{:x}", rng.random_range(0..16u8)))
        .collect()
}
