// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use overlay_relay_rs::core::replay::{REPLAY_WINDOW_SIZE, ReplayProtection};

#[test]
fn test_each_sequence_accepted_once() {
    let mut replay = ReplayProtection::new();

    for seq in 0..100 {
        assert!(replay.accept(seq), "first delivery of {seq}");
    }
    for seq in 0..100 {
        assert!(!replay.accept(seq), "replay of {seq}");
    }
}

#[test]
fn test_out_of_order_within_window() {
    let mut replay = ReplayProtection::new();

    assert!(replay.accept(10));
    assert!(replay.accept(5));
    assert!(replay.accept(7));
    assert!(!replay.accept(5));
    assert!(!replay.accept(10));
    assert_eq!(replay.highest(), 10);
}

#[test]
fn test_too_old_is_rejected() {
    let mut replay = ReplayProtection::new();

    assert!(replay.accept(REPLAY_WINDOW_SIZE + 10));
    // exactly window-size behind is already out
    assert!(!replay.accept(10));
    // one inside the window and never seen: fine
    assert!(replay.accept(11));
}

#[test]
fn test_window_advance_clears_reused_slots() {
    let mut replay = ReplayProtection::new();

    assert!(replay.accept(1));
    // sequence 1 + 256 lands on the same slot; it must be accepted
    assert!(replay.accept(1 + REPLAY_WINDOW_SIZE));
    assert!(!replay.accept(1 + REPLAY_WINDOW_SIZE));
}

#[test]
fn test_reset_forgets_everything() {
    let mut replay = ReplayProtection::new();
    assert!(replay.accept(42));
    assert!(!replay.accept(42));

    replay.reset();
    assert!(replay.accept(42));
}
