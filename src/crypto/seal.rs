// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Authenticated box used for backend-issued tokens.
//!
//! The backend seals a token body to one specific relay: both sides
//! derive the same AES-256-GCM key from an X25519 shared secret
//! (backend private x relay public on one side, relay private x router
//! box public on the other) expanded through HKDF-SHA256 with a
//! per-token-kind info string. A relay holding a different private key
//! derives a different key and the tag check fails.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use hkdf::Hkdf;
use rand::RngExt;
use sha2::Sha256;
use thiserror::Error;
use x25519_dalek::{PublicKey, StaticSecret};

pub const NONCE_BYTES: usize = 12;
pub const TAG_BYTES: usize = 16;

/// Bytes added to a body by [`seal`]: nonce prefix plus AEAD tag.
pub const SEAL_OVERHEAD_BYTES: usize = NONCE_BYTES + TAG_BYTES;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("sealed box too short: {0} bytes")]
    Length(usize),
    #[error("authentication failed")]
    Authentication,
}

/// Derive the box key for one token kind from a key pair.
pub fn derive_box_key(
    secret: &StaticSecret,
    public: &PublicKey,
    info: &[u8],
) -> [u8; 32] {
    let shared = secret.diffie_hellman(public);
    let hkdf = Hkdf::<Sha256>::new(None, shared.as_bytes());
    let mut key = [0u8; 32];
    hkdf.expand(info, &mut key)
        .expect("32 bytes is a valid hkdf-sha256 output length");
    key
}

/// Open `sealed` (nonce || ciphertext || tag) with `key`.
pub fn open(sealed: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, SealError> {
    if sealed.len() < SEAL_OVERHEAD_BYTES {
        return Err(SealError::Length(sealed.len()));
    }
    let cipher = Aes256Gcm::new(&(*key).into());
    cipher
        .decrypt(Nonce::from_slice(&sealed[..NONCE_BYTES]), &sealed[NONCE_BYTES..])
        .map_err(|_| SealError::Authentication)
}

/// Seal `body` with `key` under a fresh random nonce. This is the
/// backend's side of the exchange; the relay only ever opens, but the
/// tests stand in for the backend.
pub fn seal(body: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, SealError> {
    let mut nonce = [0u8; NONCE_BYTES];
    rand::rng().fill(&mut nonce);
    let cipher = Aes256Gcm::new(&(*key).into());
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), body)
        .map_err(|_| SealError::Authentication)?;
    let mut out = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}
