// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The control loop: once a second, report throughput and relay stats
//! to the backend, then apply whatever it answers: its clock first,
//! then the relay set, then a session purge at the fresh time.
//!
//! A failed cycle is logged and retried next tick; the data plane keeps
//! forwarding with the last good configuration.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::{select, time::sleep};
use tracing::{debug, warn};

use crate::{
    models::report::{BackendResponse, RelayReport},
    net::backend::BackendClient,
    state::State,
};

pub const BACKEND_UPDATE_SECONDS: u64 = 1;

pub async fn run_control_loop(state: Arc<State>, backend: BackendClient) {
    loop {
        select! {
            _ = state.shutdown.cancelled() => break,
            _ = sleep(Duration::from_secs(BACKEND_UPDATE_SECONDS)) => {},
        }
        if let Err(e) = update_cycle(&state, &backend).await {
            warn!("backend update failed: {e:#}");
        }
    }
    debug!("control loop stopped");
}

async fn update_cycle(state: &State, backend: &BackendClient) -> Result<()> {
    let report = build_report(state);
    let body = backend.update(report.encode()).await?;

    let response = BackendResponse::parse_signed(&body, &state.keychain.router_sign_key)
        .context("bad backend response")?;

    // Timestamp first: handlers must see the new clock before the
    // relay set that came with it.
    state.router_info.set_timestamp(response.backend_timestamp);
    state.relays.update(&response.relays);

    let purged = state.sessions.purge(state.router_info.current_timestamp());
    if purged > 0 {
        debug!(purged, "purged expired sessions");
    }

    debug!(
        sessions = state.sessions.size(),
        envelope_up = state.sessions.envelope_up_total(),
        envelope_down = state.sessions.envelope_down_total(),
        relays = state.relays.count(),
        "control cycle complete"
    );
    Ok(())
}

fn build_report(state: &State) -> RelayReport {
    RelayReport {
        relay_id: state.keychain.relay_id(),
        relay_addr: state.relay_address,
        uptime: state.clock.elapsed_secs(),
        session_count: state.sessions.size() as u64,
        envelope_up: state.sessions.envelope_up_total(),
        envelope_down: state.sessions.envelope_down_total(),
        counters: state.recorder.drain_all(),
        relays: state.relays.get_stats(state.clock.elapsed_secs()),
    }
}
