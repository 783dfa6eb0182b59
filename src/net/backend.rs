// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! HTTPS client for the control plane's single report endpoint.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;

pub const BACKEND_TIMEOUT_SECONDS: u64 = 10;

pub const UPDATE_ENDPOINT: &str = "/relay_update";

pub struct BackendClient {
    client: reqwest::Client,
    url: String,
}

impl BackendClient {
    pub fn new(hostname: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(BACKEND_TIMEOUT_SECONDS))
            .user_agent("overlay relay")
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            url: format!("https://{hostname}{UPDATE_ENDPOINT}"),
        })
    }

    /// POST one report, return the raw signed response body.
    pub async fn update(&self, body: Vec<u8>) -> Result<Bytes> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .with_context(|| format!("post to {} failed", self.url))?;
        let status = response.status();
        ensure!(status.is_success(), "backend returned {status}");
        response
            .bytes()
            .await
            .context("failed to read backend response body")
    }
}
