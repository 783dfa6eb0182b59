// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Concurrent session table shared by every worker thread.
//!
//! Reads go straight to the sharded map. All mutating operations
//! additionally serialise on one mutex so the running envelope totals
//! can never drift from the map contents: a writer adjusts the totals
//! while it still owns the write lock that covers its map change.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{
    DashMap,
    mapref::one::{Ref, RefMut},
};
use parking_lot::Mutex;

use crate::core::session::Session;

/// Sessions survive this many seconds past their expiry before the
/// purge sweep drops them.
pub const SESSION_GRACE_SECONDS: u64 = 1;

#[derive(Default)]
pub struct SessionMap {
    inner: DashMap<u64, Session>,
    write_lock: Mutex<()>,
    envelope_up: AtomicU64,
    envelope_down: AtomicU64,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared borrow of a session, scoped to the calling handler.
    #[inline]
    pub fn get(&self, hash: u64) -> Option<Ref<'_, u64, Session>> {
        self.inner.get(&hash)
    }

    /// Exclusive borrow of a session, scoped to the calling handler.
    #[inline]
    pub fn get_mut(&self, hash: u64) -> Option<RefMut<'_, u64, Session>> {
        self.inner.get_mut(&hash)
    }

    /// Insert or overwrite, keeping the envelope totals in step.
    pub fn set(&self, hash: u64, session: Session) {
        let _writer = self.write_lock.lock();
        let (new_up, new_down) = (u64::from(session.kbps_up), u64::from(session.kbps_down));
        let old = self.inner.insert(hash, session);
        self.envelope_up.fetch_add(new_up, Ordering::Relaxed);
        self.envelope_down.fetch_add(new_down, Ordering::Relaxed);
        if let Some(old) = old {
            self.envelope_up.fetch_sub(u64::from(old.kbps_up), Ordering::Relaxed);
            self.envelope_down.fetch_sub(u64::from(old.kbps_down), Ordering::Relaxed);
        }
    }

    /// Remove one session; returns whether it was present.
    pub fn erase(&self, hash: u64) -> bool {
        let _writer = self.write_lock.lock();
        match self.inner.remove(&hash) {
            Some((_, old)) => {
                self.envelope_up.fetch_sub(u64::from(old.kbps_up), Ordering::Relaxed);
                self.envelope_down.fetch_sub(u64::from(old.kbps_down), Ordering::Relaxed);
                true
            },
            None => false,
        }
    }

    /// Drop every session expired (past grace) at backend time `now`.
    /// Returns how many were removed.
    pub fn purge(&self, now: u64) -> usize {
        let _writer = self.write_lock.lock();
        let mut removed = 0usize;
        let mut removed_up = 0u64;
        let mut removed_down = 0u64;
        self.inner.retain(|_, session| {
            if session.expire_timestamp + SESSION_GRACE_SECONDS < now {
                removed += 1;
                removed_up += u64::from(session.kbps_up);
                removed_down += u64::from(session.kbps_down);
                false
            } else {
                true
            }
        });
        self.envelope_up.fetch_sub(removed_up, Ordering::Relaxed);
        self.envelope_down.fetch_sub(removed_down, Ordering::Relaxed);
        removed
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.inner.len()
    }

    /// Sum of `kbps_up` over present sessions.
    #[inline]
    pub fn envelope_up_total(&self) -> u64 {
        self.envelope_up.load(Ordering::Relaxed)
    }

    /// Sum of `kbps_down` over present sessions.
    #[inline]
    pub fn envelope_down_total(&self) -> u64 {
        self.envelope_down.load(Ordering::Relaxed)
    }
}
