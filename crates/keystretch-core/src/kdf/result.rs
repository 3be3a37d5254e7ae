//! The output of a successful derivation.

use zeroize::Zeroizing;

use super::params::KdfCost;

/// Length of derived key in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

/// A stretched key together with the inputs needed to re-derive it.
///
/// Immutable once produced. Key material is zeroized when dropped.
pub struct EncryptionParameters {
    key: Zeroizing<[u8; KEY_LENGTH]>,
    salt: Vec<u8>,
    cost: KdfCost,
}

impl EncryptionParameters {
    pub fn new(key: Zeroizing<[u8; KEY_LENGTH]>, salt: Vec<u8>, cost: KdfCost) -> Self {
        Self { key, salt, cost }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn key(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn cost(&self) -> KdfCost {
        self.cost
    }

    /// Short BLAKE3 digest of the key, safe to display.
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(self.key.as_slice());
        hash.to_hex()[..16].to_string()
    }
}

impl std::fmt::Debug for EncryptionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionParameters")
            .field("key", &"[REDACTED]")
            .field("salt_len", &self.salt.len())
            .field("cost", &self.cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(byte: u8) -> EncryptionParameters {
        EncryptionParameters::new(
            Zeroizing::new([byte; KEY_LENGTH]),
            b"salt-1234567890123456".to_vec(),
            KdfCost::default(),
        )
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = sample(7);
        assert_eq!(a.fingerprint(), sample(7).fingerprint());
        assert_eq!(a.fingerprint().len(), 16);
        assert_ne!(a.fingerprint(), sample(8).fingerprint());
    }

    #[test]
    fn test_debug_redacts_key() {
        let params = sample(0xab);
        let debug_output = format!("{:?}", params);
        assert!(debug_output.contains("REDACTED"));
        let key_hex = hex::encode(&params.key()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
