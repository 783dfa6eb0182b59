// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use overlay_relay_rs::{
    cfg::{env::Env, logger::init_logger},
    control,
    crypto::keychain::Keychain,
    net::{
        address::Address,
        backend::BackendClient,
        socket::{DEFAULT_RECV_TIMEOUT, DEFAULT_SOCKET_BUFFER_BYTES, RelaySocket, SocketMode},
    },
    state::State,
    worker,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let env = Env::from_env()?;
    let _log_guards = init_logger(env.log_file.as_deref())?;

    let keychain = Keychain::parse(
        &env.relay_public_key,
        &env.relay_private_key,
        &env.relay_router_public_key,
    )
    .context("failed to parse keychain")?;

    let relay_address: Address = env
        .relay_address
        .parse()
        .context("failed to parse RELAY_ADDRESS")?;
    ensure!(relay_address.port() != 0, "RELAY_ADDRESS must carry a fixed port");

    let worker_count = env.processor_count.unwrap_or_else(|| {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    });
    let send_buffer = env.send_buffer_size.unwrap_or(DEFAULT_SOCKET_BUFFER_BYTES);
    let recv_buffer = env.recv_buffer_size.unwrap_or(DEFAULT_SOCKET_BUFFER_BYTES);

    let backend = BackendClient::new(&env.backend_hostname)?;
    let state = Arc::new(State::new(keychain, relay_address));

    let cores = core_affinity::get_core_ids().unwrap_or_default();
    let mut workers = Vec::with_capacity(worker_count);
    for index in 0..worker_count {
        // every worker binds the same address; SO_REUSEPORT fans
        // datagrams out across them
        let socket = RelaySocket::bind(
            relay_address,
            SocketMode::Timeout(DEFAULT_RECV_TIMEOUT),
            send_buffer,
            recv_buffer,
        )
        .with_context(|| format!("failed to bind worker socket {index}"))?;
        let core = if cores.is_empty() {
            None
        } else {
            Some(cores[index % cores.len()])
        };
        let state = Arc::clone(&state);
        let handle = std::thread::Builder::new()
            .name(format!("relay-worker-{index}"))
            .spawn(move || worker::run_worker(index, core, socket, state))
            .context("failed to spawn worker thread")?;
        workers.push(handle);
    }

    info!(
        relay_id = state.keychain.relay_id(),
        address = %relay_address,
        workers = worker_count,
        "relay started"
    );

    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown requested");
        shutdown.cancel();
    });

    control::run_control_loop(state, backend).await;

    for handle in workers {
        let _ = handle.join();
    }

    info!("relay stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = terminate.recv() => {},
                }
            },
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                let _ = ctrl_c.await;
            },
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
