//! Rendering of derived keys.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use keystretch_core::{EncryptionParameters, KdfCost};
use zeroize::Zeroizing;

/// A finished derivation, ready for display.
pub struct DerivedOutput {
    pub key_base64: Zeroizing<String>,
    pub salt_hex: String,
    pub fingerprint: String,
    pub cost: KdfCost,
    pub elapsed: Duration,
    pub derived_at: DateTime<Utc>,
}

impl DerivedOutput {
    pub fn new(result: &EncryptionParameters, elapsed: Duration, derived_at: DateTime<Utc>) -> Self {
        Self {
            key_base64: Zeroizing::new(STANDARD.encode(result.key())),
            salt_hex: hex::encode(result.salt()),
            fingerprint: result.fingerprint(),
            cost: result.cost(),
            elapsed,
            derived_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "key": self.key_base64.as_str(),
            "salt": self.salt_hex,
            "fingerprint": self.fingerprint,
            "cost": self.cost,
            "elapsed_ms": self.elapsed.as_millis() as u64,
            "derived_at": self.derived_at,
        })
    }

    pub fn to_text(&self) -> String {
        format!(
            "Fingerprint: {}\nSalt:        {}\nKey:         {}\nCost:        memory {} KiB, iterations {}, lanes {}, rounds {}\nElapsed:     {:.2}s",
            self.fingerprint,
            self.salt_hex,
            self.key_base64.as_str(),
            self.cost.memory_kib,
            self.cost.iterations,
            self.cost.lanes,
            self.cost.rounds,
            self.elapsed.as_secs_f64()
        )
    }
}
