// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Backend-aligned clock.
//!
//! Token expiry is judged against the backend's idea of time, never the
//! local wall clock: the last timestamp the backend sent plus the
//! monotonic seconds since it arrived. Until the first backend response
//! the timestamp is zero, which rejects nothing (tokens are far in the
//! future of epoch zero) and admits nothing stale once time is set.

use std::time::Instant;

use parking_lot::Mutex;

struct Inner {
    backend_timestamp: u64,
    since: Instant,
}

pub struct RouterInfo {
    inner: Mutex<Inner>,
}

impl Default for RouterInfo {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                backend_timestamp: 0,
                since: Instant::now(),
            }),
        }
    }
}

impl RouterInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh backend timestamp and restart the monotonic base.
    pub fn set_timestamp(&self, timestamp: u64) {
        let mut inner = self.inner.lock();
        inner.backend_timestamp = timestamp;
        inner.since = Instant::now();
    }

    pub fn backend_timestamp(&self) -> u64 {
        self.inner.lock().backend_timestamp
    }

    pub fn current_time(&self) -> f64 {
        let inner = self.inner.lock();
        inner.backend_timestamp as f64 + inner.since.elapsed().as_secs_f64()
    }

    pub fn current_timestamp(&self) -> u64 {
        let inner = self.inner.lock();
        inner.backend_timestamp + inner.since.elapsed().as_secs()
    }
}
