//! Iterated Argon2id stretching.
//!
//! A single Argon2 call can neither report progress nor be interrupted, so the
//! derivation is split into `rounds` chained Argon2id calls. Round 0 hashes the
//! passphrase; every later round hashes the previous round's output under the
//! same salt. Between rounds the work publishes progress and checks for
//! cancellation.

use argon2::{Algorithm, Argon2, Block, Version};
use tracing::debug;
use zeroize::Zeroizing;

use super::params::KdfParameters;
use super::result::{EncryptionParameters, KEY_LENGTH};
use super::work::{CancellableWork, WorkError};

/// The default [`CancellableWork`]: iterated Argon2id.
///
/// Same passphrase + salt + cost always produces the same key.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Work;

impl CancellableWork for Argon2Work {
    /// # Panics
    ///
    /// Panics if Argon2 rejects parameters that [`KdfParameters::new`] already
    /// validated.
    fn generate(&self, params: &KdfParameters) -> Result<EncryptionParameters, WorkError> {
        let cost = params.cost();
        let argon2_params = cost
            .argon2_params()
            .unwrap_or_else(|e| panic!("validated cost rejected: {}", e));
        let block_count = argon2_params.block_count();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

        // Reserved once, reused by every round.
        let mut blocks = allocate_blocks(block_count)?;

        let mut current = Zeroizing::new([0u8; KEY_LENGTH]);
        let mut next = Zeroizing::new([0u8; KEY_LENGTH]);

        for round in 0..cost.rounds {
            if params.is_cancel_requested() {
                debug!(round, "cancellation observed");
                return Err(WorkError::Cancelled);
            }

            let input: &[u8] = if round == 0 {
                params.passphrase_bytes()
            } else {
                current.as_slice()
            };
            argon2
                .hash_password_into_with_memory(
                    input,
                    params.salt(),
                    next.as_mut_slice(),
                    &mut blocks[..],
                )
                .unwrap_or_else(|e| panic!("argon2 round {} failed: {}", round, e));
            std::mem::swap(&mut current, &mut next);

            params.set_progress(f64::from(round + 1) / f64::from(cost.rounds));
        }

        Ok(EncryptionParameters::new(
            current,
            params.salt().to_vec(),
            cost,
        ))
    }
}

fn allocate_blocks(count: usize) -> Result<Vec<Block>, WorkError> {
    let mut blocks = Vec::new();
    blocks.try_reserve_exact(count).map_err(|e| {
        WorkError::ResourceExhausted(format!(
            "cannot reserve {} KiB for the Argon2 memory matrix: {}",
            count, e
        ))
    })?;
    blocks.resize(count, Block::default());
    Ok(blocks)
}
