// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Key material the relay needs at startup, parsed once from
//! base64-encoded environment variables.

use anyhow::{Context, Result, ensure};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::VerifyingKey;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::crypto::seal;

pub const KEY_BYTES: usize = 32;

pub const ROUTE_TOKEN_INFO: &[u8] = b"route token v1";
pub const CONTINUE_TOKEN_INFO: &[u8] = b"continue token v1";

/// The router public key env var carries two keys back to back: the
/// Ed25519 verifying key for backend response signatures and the X25519
/// public key tokens are boxed with.
pub const ROUTER_PUBLIC_KEY_BYTES: usize = KEY_BYTES * 2;

pub struct Keychain {
    pub relay_public_key: PublicKey,
    pub relay_private_key: StaticSecret,
    pub router_sign_key: VerifyingKey,
    pub router_box_key: PublicKey,
    /// Precomputed box keys; they depend only on static key material.
    pub route_token_key: [u8; 32],
    pub continue_token_key: [u8; 32],
}

impl Keychain {
    pub fn parse(
        relay_public_key: &str,
        relay_private_key: &str,
        router_public_key: &str,
    ) -> Result<Self> {
        let relay_public = decode_key(relay_public_key, "RELAY_PUBLIC_KEY")?;
        let relay_private = decode_key(relay_private_key, "RELAY_PRIVATE_KEY")?;

        let router = STANDARD
            .decode(router_public_key)
            .context("RELAY_ROUTER_PUBLIC_KEY is not valid base64")?;
        ensure!(
            router.len() == ROUTER_PUBLIC_KEY_BYTES,
            "RELAY_ROUTER_PUBLIC_KEY must decode to {ROUTER_PUBLIC_KEY_BYTES} bytes, got {}",
            router.len()
        );
        let mut sign_key = [0u8; KEY_BYTES];
        sign_key.copy_from_slice(&router[..KEY_BYTES]);
        let mut box_key = [0u8; KEY_BYTES];
        box_key.copy_from_slice(&router[KEY_BYTES..]);

        let relay_public_key = PublicKey::from(relay_public);
        let relay_private_key = StaticSecret::from(relay_private);
        let router_sign_key = VerifyingKey::from_bytes(&sign_key)
            .context("RELAY_ROUTER_PUBLIC_KEY signing half is not a valid ed25519 key")?;
        let router_box_key = PublicKey::from(box_key);

        let route_token_key =
            seal::derive_box_key(&relay_private_key, &router_box_key, ROUTE_TOKEN_INFO);
        let continue_token_key =
            seal::derive_box_key(&relay_private_key, &router_box_key, CONTINUE_TOKEN_INFO);

        Ok(Self {
            relay_public_key,
            relay_private_key,
            router_sign_key,
            router_box_key,
            route_token_key,
            continue_token_key,
        })
    }

    /// Stable identity this relay reports to the backend.
    pub fn relay_id(&self) -> u64 {
        let digest = blake3::hash(self.relay_public_key.as_bytes());
        let mut id = [0u8; 8];
        id.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(id)
    }
}

fn decode_key(encoded: &str, name: &str) -> Result<[u8; KEY_BYTES]> {
    let bytes = STANDARD
        .decode(encoded)
        .with_context(|| format!("{name} is not valid base64"))?;
    ensure!(
        bytes.len() == KEY_BYTES,
        "{name} must decode to {KEY_BYTES} bytes, got {}",
        bytes.len()
    );
    let mut key = [0u8; KEY_BYTES];
    key.copy_from_slice(&bytes);
    Ok(key)
}
