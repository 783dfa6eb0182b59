// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use ed25519_dalek::{Signer, SigningKey};
use overlay_relay_rs::{
    core::{
        relay_manager::{RelayPingInfo, RelayStatsEntry},
        route_stats::RouteStats,
        throughput::{NUM_THROUGHPUT_COUNTERS, ThroughputRecorder},
    },
    models::report::{BackendResponse, REPORT_VERSION, RelayReport, SIGNATURE_BYTES},
    wire,
};

fn sample_report() -> RelayReport {
    let mut counters = [(0u64, 0u64); NUM_THROUGHPUT_COUNTERS];
    counters[0] = (10, 300);
    RelayReport {
        relay_id: 0x0102030405060708,
        relay_addr: "127.0.0.1:40000".parse().expect("addr"),
        uptime: 12.5,
        session_count: 3,
        envelope_up: 60,
        envelope_down: 90,
        counters,
        relays: vec![
            RelayStatsEntry {
                id: 77,
                stats: RouteStats { rtt: 3.0, jitter: 0.5, packet_loss: 0.0 },
            },
            RelayStatsEntry { id: 78, stats: RouteStats::default() },
        ],
    }
}

#[test]
fn test_report_encodes_to_declared_length() {
    let report = sample_report();
    let body = report.encode();
    assert_eq!(body.len(), report.encoded_len());

    let mut index = 0;
    assert_eq!(wire::read_u8(&body, &mut index), REPORT_VERSION);
    assert_eq!(wire::read_u64(&body, &mut index), 0x0102030405060708);
}

#[test]
fn test_counter_order_is_stable() {
    let recorder = ThroughputRecorder::new();
    recorder.outbound_ping_tx.add(100);
    recorder.unknown_rx.add(7);

    let drained = recorder.drain_all();
    assert_eq!(drained[0], (1, 100));
    assert_eq!(drained[NUM_THROUGHPUT_COUNTERS - 1], (1, 7));

    // draining resets
    let drained = recorder.drain_all();
    assert!(drained.iter().all(|&(packets, bytes)| packets == 0 && bytes == 0));
}

#[test]
fn test_backend_response_payload_round_trip() {
    let response = BackendResponse {
        backend_timestamp: 1700000000,
        relays: vec![
            RelayPingInfo { id: 1, address: "10.0.0.1:40000".parse().expect("a") },
            RelayPingInfo { id: 2, address: "[::1]:40001".parse().expect("a") },
        ],
    };

    let payload = response.write_payload();
    let parsed = BackendResponse::parse_payload(&payload).expect("parse");
    assert_eq!(parsed, response);
}

#[test]
fn test_backend_response_signature_checks() {
    let signing = SigningKey::from_bytes(&[11u8; 32]);
    let response = BackendResponse {
        backend_timestamp: 42,
        relays: vec![RelayPingInfo {
            id: 9,
            address: "10.0.0.1:40000".parse().expect("a"),
        }],
    };

    let payload = response.write_payload();
    let signature = signing.sign(&payload);

    let mut body = Vec::with_capacity(SIGNATURE_BYTES + payload.len());
    body.extend_from_slice(&signature.to_bytes());
    body.extend_from_slice(&payload);

    let parsed = BackendResponse::parse_signed(&body, &signing.verifying_key())
        .expect("verify");
    assert_eq!(parsed, response);

    // tampering with the payload breaks the signature
    let mut tampered = body.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    assert!(
        BackendResponse::parse_signed(&tampered, &signing.verifying_key()).is_err()
    );

    // a different backend key does not verify
    let other = SigningKey::from_bytes(&[12u8; 32]);
    assert!(BackendResponse::parse_signed(&body, &other.verifying_key()).is_err());
}

#[test]
fn test_backend_response_truncation_is_rejected() {
    let signing = SigningKey::from_bytes(&[11u8; 32]);
    let response = BackendResponse {
        backend_timestamp: 42,
        relays: vec![RelayPingInfo {
            id: 9,
            address: "10.0.0.1:40000".parse().expect("a"),
        }],
    };

    // claim two relays but only carry one
    let mut payload = response.write_payload();
    payload[8] = 2;
    let signature = signing.sign(&payload);
    let mut body = Vec::new();
    body.extend_from_slice(&signature.to_bytes());
    body.extend_from_slice(&payload);

    assert!(BackendResponse::parse_signed(&body, &signing.verifying_key()).is_err());
}
