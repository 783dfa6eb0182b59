// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! RTT / jitter / packet-loss derived from a ping history over a time
//! window.

use crate::core::ping_history::{INVALID_SEQUENCE, PingHistory};

/// Sentinel RTT when no pong arrived inside the window.
pub const NO_RTT_MILLIS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStats {
    pub rtt: f32,
    /// -1 when there were no jitter samples.
    pub jitter: f32,
    /// -1 when no pings fell inside the loss window.
    pub packet_loss: f32,
}

impl Default for RouteStats {
    fn default() -> Self {
        Self { rtt: 0.0, jitter: -1.0, packet_loss: -1.0 }
    }
}

impl PingHistory {
    /// Compute stats over pings sent inside `[start, end]`.
    ///
    /// Packet loss only counts pings older than `safety` before `end`,
    /// so a pong still in flight is not reported as a loss.
    pub fn route_stats(&self, start: f64, end: f64, safety: f64) -> RouteStats {
        let mut stats = RouteStats::default();

        let mut num_pings_sent = 0u32;
        let mut num_pongs_received = 0u32;
        let mut total_rtt = 0.0f64;
        let mut num_pongs = 0u32;

        for entry in self.entries() {
            // slots that never held a ping must not count, even when
            // the window start is below the clock's zero
            if entry.sequence == INVALID_SEQUENCE || entry.time_ping_sent < start {
                continue;
            }
            if entry.time_ping_sent <= end - safety {
                num_pings_sent += 1;
                if entry.time_pong_received >= entry.time_ping_sent {
                    num_pongs_received += 1;
                }
            }
            if entry.time_ping_sent <= end
                && entry.time_pong_received > entry.time_ping_sent
            {
                total_rtt += 1000.0 * (entry.time_pong_received - entry.time_ping_sent);
                num_pongs += 1;
            }
        }

        let mean_rtt = if num_pongs > 0 {
            total_rtt / f64::from(num_pongs)
        } else {
            NO_RTT_MILLIS
        };

        if num_pings_sent > 0 {
            stats.packet_loss = (100.0
                * (1.0 - f64::from(num_pongs_received) / f64::from(num_pings_sent)))
                as f32;
        }
        stats.rtt = mean_rtt as f32;

        // Jitter is 3 sigma over the samples slower than the mean.
        let mut num_jitter_samples = 0u32;
        let mut std_dev_rtt = 0.0f64;

        for entry in self.entries() {
            if entry.sequence != INVALID_SEQUENCE
                && (start..=end).contains(&entry.time_ping_sent)
                && entry.time_pong_received > entry.time_ping_sent
            {
                let rtt = 1000.0 * (entry.time_pong_received - entry.time_ping_sent);
                if rtt >= mean_rtt {
                    let error = rtt - mean_rtt;
                    std_dev_rtt += error * error;
                    num_jitter_samples += 1;
                }
            }
        }

        if num_jitter_samples > 0 {
            stats.jitter =
                3.0 * (std_dev_rtt / f64::from(num_jitter_samples)).sqrt() as f32;
        }

        stats
    }
}
