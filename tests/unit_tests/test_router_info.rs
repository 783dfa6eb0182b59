// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{thread::sleep, time::Duration};

use overlay_relay_rs::core::router_info::RouterInfo;

#[test]
fn test_starts_at_epoch_zero() {
    let info = RouterInfo::new();
    assert_eq!(info.backend_timestamp(), 0);
    assert!(info.current_time() < 1.0);
}

#[test]
fn test_set_timestamp_resets_the_base() {
    let info = RouterInfo::new();

    sleep(Duration::from_millis(50));
    assert!(info.current_time() >= 0.05);
    assert_eq!(info.backend_timestamp(), 0);

    info.set_timestamp(100);
    assert_eq!(info.backend_timestamp(), 100);
    // the monotonic part restarted together with the timestamp
    assert!(info.current_time() >= 100.0);
    assert!(info.current_time() < 101.0);
    assert_eq!(info.current_timestamp(), 100);
}

#[test]
fn test_current_time_advances_from_backend_base() {
    let info = RouterInfo::new();
    info.set_timestamp(100);
    sleep(Duration::from_millis(50));
    assert!(info.current_time() >= 100.05);
}
