// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Per-packet-type traffic counters. Workers bump these on every
//! receive and send; the control loop drains them into the backend
//! report once per cycle.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ThroughputStats {
    packets: AtomicU64,
    bytes: AtomicU64,
}

impl ThroughputStats {
    #[inline]
    pub fn add(&self, bytes: usize) {
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.packets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn snapshot(&self) -> (u64, u64) {
        (self.packets.load(Ordering::Relaxed), self.bytes.load(Ordering::Relaxed))
    }

    /// Read and reset, for the once-per-cycle report.
    #[inline]
    pub fn drain(&self) -> (u64, u64) {
        (self.packets.swap(0, Ordering::Relaxed), self.bytes.swap(0, Ordering::Relaxed))
    }
}

pub const NUM_THROUGHPUT_COUNTERS: usize = 22;

#[derive(Debug, Default)]
pub struct ThroughputRecorder {
    /// Pings this relay emitted towards its peers.
    pub outbound_ping_tx: ThroughputStats,

    pub route_request_rx: ThroughputStats,
    pub route_request_tx: ThroughputStats,

    pub route_response_rx: ThroughputStats,
    pub route_response_tx: ThroughputStats,

    pub client_to_server_rx: ThroughputStats,
    pub client_to_server_tx: ThroughputStats,

    pub server_to_client_rx: ThroughputStats,
    pub server_to_client_tx: ThroughputStats,

    pub inbound_ping_rx: ThroughputStats,
    pub inbound_ping_tx: ThroughputStats,

    pub pong_rx: ThroughputStats,

    pub session_ping_rx: ThroughputStats,

    pub session_pong_rx: ThroughputStats,
    /// Pongs answered locally for session pings.
    pub session_pong_tx: ThroughputStats,

    pub continue_request_rx: ThroughputStats,
    pub continue_request_tx: ThroughputStats,

    pub continue_response_rx: ThroughputStats,
    pub continue_response_tx: ThroughputStats,

    pub near_ping_rx: ThroughputStats,
    pub near_ping_tx: ThroughputStats,

    pub unknown_rx: ThroughputStats,
}

impl ThroughputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters in wire-report order. The order is part of the backend
    /// interface; append only.
    pub fn counters(&self) -> [&ThroughputStats; NUM_THROUGHPUT_COUNTERS] {
        [
            &self.outbound_ping_tx,
            &self.route_request_rx,
            &self.route_request_tx,
            &self.route_response_rx,
            &self.route_response_tx,
            &self.client_to_server_rx,
            &self.client_to_server_tx,
            &self.server_to_client_rx,
            &self.server_to_client_tx,
            &self.inbound_ping_rx,
            &self.inbound_ping_tx,
            &self.pong_rx,
            &self.session_ping_rx,
            &self.session_pong_rx,
            &self.session_pong_tx,
            &self.continue_request_rx,
            &self.continue_request_tx,
            &self.continue_response_rx,
            &self.continue_response_tx,
            &self.near_ping_rx,
            &self.near_ping_tx,
            &self.unknown_rx,
        ]
    }

    /// Drain every counter into `(packets, bytes)` pairs in report
    /// order.
    pub fn drain_all(&self) -> [(u64, u64); NUM_THROUGHPUT_COUNTERS] {
        let mut out = [(0u64, 0u64); NUM_THROUGHPUT_COUNTERS];
        for (slot, stats) in out.iter_mut().zip(self.counters()) {
            *slot = stats.drain();
        }
        out
    }
}
