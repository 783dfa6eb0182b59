// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Process configuration. The relay is configured through environment
//! variables only; the names are a stable interface shared with the
//! fleet tooling. A missing required variable is an initialisation
//! error and the process exits 1.

use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Default)]
pub struct Env {
    /// External UDP bind address, `ip:port`.
    pub relay_address: String,
    /// Base64, 32 bytes.
    pub relay_private_key: String,
    /// Base64, 32 bytes.
    pub relay_public_key: String,
    /// Base64, 64 bytes: router signing key then router box key.
    pub relay_router_public_key: String,
    /// Backend host, no scheme; the relay always speaks https to it.
    pub backend_hostname: String,
    pub send_buffer_size: Option<usize>,
    pub recv_buffer_size: Option<usize>,
    pub processor_count: Option<usize>,
    pub log_file: Option<PathBuf>,
}

impl Env {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            relay_address: required("RELAY_ADDRESS")?,
            relay_private_key: required("RELAY_PRIVATE_KEY")?,
            relay_public_key: required("RELAY_PUBLIC_KEY")?,
            relay_router_public_key: required("RELAY_ROUTER_PUBLIC_KEY")?,
            backend_hostname: required("RELAY_BACKEND_HOSTNAME")?,
            send_buffer_size: optional_usize("RELAY_SEND_BUFFER_SIZE")?,
            recv_buffer_size: optional_usize("RELAY_RECV_BUFFER_SIZE")?,
            processor_count: optional_usize("RELAY_PROCESSOR_COUNT")?,
            log_file: std::env::var("RELAY_LOG_FILE").ok().map(PathBuf::from),
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} not set"))
}

fn optional_usize(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(value) => {
            let parsed = value
                .parse::<usize>()
                .with_context(|| format!("{name} is not a number: {value:?}"))?;
            Ok(Some(parsed))
        },
        Err(_) => Ok(None),
    }
}
