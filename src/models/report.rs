// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The octet-stream bodies exchanged with the backend each control
//! cycle: the relay's report up, the signed relay-set response down.

use anyhow::{Context, Result, bail, ensure};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::{
    core::{
        relay_manager::{MAX_RELAYS, RelayPingInfo, RelayStatsEntry},
        throughput::NUM_THROUGHPUT_COUNTERS,
    },
    net::address::{ADDRESS_BYTES, Address},
    wire,
};

pub const REPORT_VERSION: u8 = 1;

pub const SIGNATURE_BYTES: usize = 64;

/// Everything the relay tells the backend about one cycle.
#[derive(Debug, Clone)]
pub struct RelayReport {
    pub relay_id: u64,
    pub relay_addr: Address,
    /// Seconds since the relay process started.
    pub uptime: f64,
    pub session_count: u64,
    pub envelope_up: u64,
    pub envelope_down: u64,
    pub counters: [(u64, u64); NUM_THROUGHPUT_COUNTERS],
    pub relays: Vec<RelayStatsEntry>,
}

impl RelayReport {
    pub fn encoded_len(&self) -> usize {
        1 + 8
            + ADDRESS_BYTES
            + 8
            + 8 * 3
            + NUM_THROUGHPUT_COUNTERS * 16
            + 4
            + self.relays.len() * (8 + 4 * 3)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.encoded_len()];
        let mut index = 0;
        wire::write_u8(&mut buf, &mut index, REPORT_VERSION);
        wire::write_u64(&mut buf, &mut index, self.relay_id);
        wire::write_address(&mut buf, &mut index, &self.relay_addr);
        wire::write_f64(&mut buf, &mut index, self.uptime);
        wire::write_u64(&mut buf, &mut index, self.session_count);
        wire::write_u64(&mut buf, &mut index, self.envelope_up);
        wire::write_u64(&mut buf, &mut index, self.envelope_down);
        for (packets, bytes) in self.counters {
            wire::write_u64(&mut buf, &mut index, packets);
            wire::write_u64(&mut buf, &mut index, bytes);
        }
        wire::write_u32(&mut buf, &mut index, self.relays.len() as u32);
        for relay in &self.relays {
            wire::write_u64(&mut buf, &mut index, relay.id);
            wire::write_f32(&mut buf, &mut index, relay.stats.rtt);
            wire::write_f32(&mut buf, &mut index, relay.stats.jitter);
            wire::write_f32(&mut buf, &mut index, relay.stats.packet_loss);
        }
        debug_assert_eq!(index, buf.len());
        buf
    }
}

/// What the backend answers with: its clock and the relay neighbour
/// set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub backend_timestamp: u64,
    pub relays: Vec<RelayPingInfo>,
}

impl BackendResponse {
    /// Parse and verify a signed response body.
    pub fn parse_signed(buf: &[u8], key: &VerifyingKey) -> Result<Self> {
        ensure!(
            buf.len() >= SIGNATURE_BYTES + 12,
            "backend response too short: {} bytes",
            buf.len()
        );
        let signature_bytes: [u8; SIGNATURE_BYTES] = buf[..SIGNATURE_BYTES]
            .try_into()
            .context("backend response signature")?;
        let signature = Signature::from_bytes(&signature_bytes);
        let payload = &buf[SIGNATURE_BYTES..];
        key.verify(payload, &signature)
            .context("backend response signature does not verify")?;
        Self::parse_payload(payload)
    }

    /// Parse the payload after (or without, for tests) signature
    /// verification.
    pub fn parse_payload(payload: &[u8]) -> Result<Self> {
        let mut index = 0;
        let backend_timestamp = wire::read_u64(payload, &mut index);
        let num_relays = wire::read_u32(payload, &mut index) as usize;
        ensure!(num_relays <= MAX_RELAYS, "backend sent {num_relays} relays");
        let expected = index + num_relays * (8 + ADDRESS_BYTES);
        if payload.len() < expected {
            bail!(
                "backend response truncated: {} bytes, need {expected}",
                payload.len()
            );
        }
        let mut relays = Vec::with_capacity(num_relays);
        for _ in 0..num_relays {
            let id = wire::read_u64(payload, &mut index);
            let address = wire::read_address(payload, &mut index);
            relays.push(RelayPingInfo { id, address });
        }
        Ok(Self { backend_timestamp, relays })
    }

    /// Encode the unsigned payload; tests sign it to impersonate the
    /// backend.
    pub fn write_payload(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 12 + self.relays.len() * (8 + ADDRESS_BYTES)];
        let mut index = 0;
        wire::write_u64(&mut buf, &mut index, self.backend_timestamp);
        wire::write_u32(&mut buf, &mut index, self.relays.len() as u32);
        for relay in &self.relays {
            wire::write_u64(&mut buf, &mut index, relay.id);
            wire::write_address(&mut buf, &mut index, &relay.address);
        }
        buf
    }
}
