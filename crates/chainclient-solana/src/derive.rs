//! Program-derived addresses.
//!
//! A program-derived address is `sha256(seed_0 ‖ … ‖ seed_n ‖ program ‖
//! "ProgramDerivedAddress")`, accepted only if the digest is *not* a valid
//! ed25519 point, so that no private key can sign for it. [`find_program_address`]
//! appends a one-byte bump seed, trying 255 downwards, until the digest falls
//! off the curve.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::address::PUBKEY_LEN;

/// Longest single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Most seeds per derivation, bump included.
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeriveError {
    #[error("seed {index} is {len} bytes, longer than {MAX_SEED_LEN}")]
    SeedTooLong { index: usize, len: usize },

    #[error("{0} seeds given, at most {MAX_SEEDS} allowed")]
    TooManySeeds(usize),

    #[error("derived address lies on the ed25519 curve")]
    OnCurve,

    #[error("no bump seed yields an off-curve address")]
    NoViableBump,
}

/// Returns `true` if `bytes` decompresses to a point on ed25519.
pub fn is_on_curve(bytes: &[u8; PUBKEY_LEN]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

/// Derive the address for exactly these seeds, failing if it lands on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program: &[u8; PUBKEY_LEN],
) -> Result<[u8; PUBKEY_LEN], DeriveError> {
    if seeds.len() > MAX_SEEDS {
        return Err(DeriveError::TooManySeeds(seeds.len()));
    }
    let mut hasher = Sha256::new();
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(DeriveError::SeedTooLong {
                index,
                len: seed.len(),
            });
        }
        hasher.update(seed);
    }
    hasher.update(program);
    hasher.update(PDA_MARKER);

    let digest: [u8; PUBKEY_LEN] = hasher.finalize().into();
    if is_on_curve(&digest) {
        return Err(DeriveError::OnCurve);
    }
    Ok(digest)
}

/// Find the first off-curve address for `seeds`, returning it with its bump.
pub fn find_program_address(
    seeds: &[&[u8]],
    program: &[u8; PUBKEY_LEN],
) -> Result<([u8; PUBKEY_LEN], u8), DeriveError> {
    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);
        match create_program_address(&with_bump, program) {
            Ok(address) => return Ok((address, bump)),
            Err(DeriveError::OnCurve) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(DeriveError::NoViableBump)
}

/// Derives the account a program stores its state under.
pub trait ProgramAddressDeriver: Send + Sync {
    fn derive(
        &self,
        seeds: &[&[u8]],
        program: &[u8; PUBKEY_LEN],
    ) -> Result<([u8; PUBKEY_LEN], u8), DeriveError>;
}

/// The cluster's own derivation rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaPda;

impl ProgramAddressDeriver for SolanaPda {
    fn derive(
        &self,
        seeds: &[&[u8]],
        program: &[u8; PUBKEY_LEN],
    ) -> Result<([u8; PUBKEY_LEN], u8), DeriveError> {
        find_program_address(seeds, program)
    }
}
