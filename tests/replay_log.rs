//! End-to-end event-log and replay tests: a live engine journals its
//! commands to a real file, and a replayed engine must be observationally
//! identical. Framing failures are crafted with raw bytes.

use journal_matching_engine::order_gen::{drive, Command, Generator, GeneratorConfig};
use journal_matching_engine::{
    Engine, EventLog, NoopTradeSink, Order, OrderBook, OrderId, RecordingTradeSink, ReplayError,
    RestingOrder, Side,
};
use std::fs;
use std::path::{Path, PathBuf};

fn logged_engine(dir: &tempfile::TempDir, name: &str) -> (Engine, PathBuf, RecordingTradeSink) {
    let path = dir.path().join(name);
    let log = EventLog::open(&path).expect("open log");
    let sink = RecordingTradeSink::new();
    let engine = Engine::new(OrderBook::new(), Some(log), Box::new(sink.clone()));
    (engine, path, sink)
}

/// Observable book state for equivalence checks.
fn observe(engine: &Engine) -> (u64, usize, Option<u64>, Option<u64>, Vec<RestingOrder>) {
    (
        engine.seq(),
        engine.open_orders(),
        engine.best_bid(),
        engine.best_ask(),
        engine.resting_orders(),
    )
}

fn raw_record(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![kind];
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn raw_add(id: u64, price: u64, quantity: u64, ts: u64, side: u8, order_type: u8) -> Vec<u8> {
    let mut payload = [0u8; 40];
    payload[0..8].copy_from_slice(&id.to_le_bytes());
    payload[8..16].copy_from_slice(&price.to_le_bytes());
    payload[16..24].copy_from_slice(&quantity.to_le_bytes());
    payload[24..32].copy_from_slice(&ts.to_le_bytes());
    payload[32] = side;
    payload[33] = order_type;
    raw_record(0, &payload)
}

fn write_log(path: &Path, records: &[Vec<u8>]) {
    let bytes: Vec<u8> = records.iter().flatten().copied().collect();
    fs::write(path, bytes).expect("write crafted log");
}

#[test]
fn replayed_engine_matches_live_engine_on_generated_stream() {
    let dir = tempfile::tempdir().unwrap();
    let (mut live, path, _sink) = logged_engine(&dir, "stream.evlog");

    let commands = Generator::new(GeneratorConfig {
        seed: 2024,
        num_commands: 500,
        cancel_ratio: 0.15,
        ..Default::default()
    })
    .all_commands();
    drive(&mut live, commands).unwrap();
    live.sync_log().unwrap();

    let replayed = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(observe(&live), observe(&replayed));
}

#[test]
fn replay_is_deterministic_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (mut live, path, _sink) = logged_engine(&dir, "twice.evlog");
    let commands = Generator::new(GeneratorConfig {
        seed: 7,
        num_commands: 200,
        ..Default::default()
    })
    .all_commands();
    drive(&mut live, commands).unwrap();
    live.sync_log().unwrap();

    let a = journal_matching_engine::replay::replay(&path).unwrap();
    let b = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(observe(&a), observe(&b));
}

#[test]
fn log_records_adds_before_their_trades() {
    let dir = tempfile::tempdir().unwrap();
    let (mut live, path, sink) = logged_engine(&dir, "cross.evlog");
    live.submit(Order::limit(OrderId(1), Side::Sell, 100, 5)).unwrap();
    live.submit(Order::limit(OrderId(2), Side::Buy, 100, 5)).unwrap();
    live.sync_log().unwrap();
    assert_eq!(sink.trades().len(), 1);

    // Add(1), Add(2), Trade: 45 + 45 + 45 bytes, types 0, 0, 2.
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 3 * 45);
    assert_eq!(bytes[0], 0);
    assert_eq!(bytes[45], 0);
    assert_eq!(bytes[90], 2);
    // The Trade payload carries (buy=2, sell=1, qty=5, price=100, ts=2).
    let trade = &bytes[95..135];
    assert_eq!(trade[0..8], 2u64.to_le_bytes());
    assert_eq!(trade[8..16], 1u64.to_le_bytes());
    assert_eq!(trade[16..24], 5u64.to_le_bytes());
    assert_eq!(trade[24..32], 100u64.to_le_bytes());
    assert_eq!(trade[32..40], 2u64.to_le_bytes());
}

#[test]
fn cancel_of_already_filled_order_is_journaled_and_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let (mut live, path, _sink) = logged_engine(&dir, "late_cancel.evlog");
    live.submit(Order::limit(OrderId(1), Side::Sell, 100, 5)).unwrap();
    live.submit(Order::limit(OrderId(2), Side::Buy, 100, 5)).unwrap();
    // Order 1 is fully filled; the cancel fails live but still hits the log.
    assert!(live.cancel(OrderId(1)).is_err());
    live.sync_log().unwrap();

    let replayed = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(observe(&live), observe(&replayed));
}

#[test]
fn tombstone_cancel_path_replays_identically() {
    let dir = tempfile::tempdir().unwrap();
    let (mut live, path, sink) = logged_engine(&dir, "tombstone.evlog");
    live.submit(Order::limit(OrderId(1), Side::Sell, 100, 5)).unwrap();
    live.cancel(OrderId(1)).unwrap();
    live.submit(Order::limit(OrderId(2), Side::Buy, 100, 5)).unwrap();
    live.sync_log().unwrap();
    assert!(sink.trades().is_empty());

    let replayed = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(observe(&live), observe(&replayed));
    assert_eq!(replayed.remaining_quantity(OrderId(2)), Some(5));
}

#[test]
fn snapshot_record_fast_forwards_the_clock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.evlog");
    let mut snapshot = vec![0u8; 8];
    snapshot[0..8].copy_from_slice(&500u64.to_le_bytes());
    write_log(&path, &[raw_record(3, &snapshot), raw_add(1, 100, 5, 501, 0, 0)]);

    let engine = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(engine.seq(), 501);
    assert_eq!(engine.remaining_quantity(OrderId(1)), Some(5));
}

#[test]
fn live_snapshot_roundtrips_through_replay() {
    let dir = tempfile::tempdir().unwrap();
    let (mut live, path, _sink) = logged_engine(&dir, "live_snap.evlog");
    live.submit(Order::limit(OrderId(1), Side::Buy, 99, 5)).unwrap();
    live.submit(Order::limit(OrderId(2), Side::Sell, 101, 5)).unwrap();
    live.snapshot().unwrap();
    live.sync_log().unwrap();

    let replayed = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(observe(&live), observe(&replayed));
    assert_eq!(replayed.seq(), 2);
}

#[test]
fn sequence_counter_lifts_to_replayed_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lift.evlog");
    write_log(&path, &[raw_add(1, 100, 5, 10, 0, 0)]);

    let engine = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(engine.seq(), 10);
}

#[test]
fn trade_records_are_skipped_by_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades_only.evlog");
    write_log(&path, &[raw_record(2, &[0u8; 40])]);

    let engine = journal_matching_engine::replay::replay(&path).unwrap();
    assert_eq!(engine.open_orders(), 0);
    assert_eq!(engine.seq(), 0);
}

#[test]
fn truncated_tail_aborts_replay() {
    let dir = tempfile::tempdir().unwrap();
    let (mut live, path, _sink) = logged_engine(&dir, "trunc.evlog");
    live.submit(Order::limit(OrderId(1), Side::Buy, 100, 5)).unwrap();
    live.submit(Order::limit(OrderId(2), Side::Buy, 101, 5)).unwrap();
    live.sync_log().unwrap();
    drop(live);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 90);
    fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    match journal_matching_engine::replay::replay(&path).unwrap_err() {
        // The second record starts at offset 45.
        ReplayError::Truncated { offset: 45 } => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_add_payload_aborts_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("malformed.evlog");
    write_log(&path, &[raw_record(0, &[0u8; 39])]);

    match journal_matching_engine::replay::replay(&path).unwrap_err() {
        ReplayError::MalformedPayload { record: "add", offset: 0 } => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_side_byte_in_add_aborts_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad_side.evlog");
    write_log(&path, &[raw_add(1, 100, 5, 1, 9, 0)]);

    assert!(matches!(
        journal_matching_engine::replay::replay(&path).unwrap_err(),
        ReplayError::MalformedPayload { record: "add", .. }
    ));
}

#[test]
fn replay_of_replayed_state_requires_no_trade_records() {
    // A log with adds and cancels but no trade records (as a foreign writer
    // might produce) replays to the same book as the full log.
    let dir = tempfile::tempdir().unwrap();
    let full = dir.path().join("full.evlog");
    let slim = dir.path().join("slim.evlog");

    let (mut live, _, _sink) = logged_engine(&dir, "full.evlog");
    let commands = Generator::new(GeneratorConfig {
        seed: 99,
        num_commands: 120,
        cancel_ratio: 0.2,
        ..Default::default()
    })
    .all_commands();
    drive(&mut live, commands.clone()).unwrap();
    live.sync_log().unwrap();

    // Rebuild the slim log from the command stream with engine-stamped ts.
    let mut records = Vec::new();
    let mut seq = 0u64;
    let mut shadow = Engine::new(OrderBook::new(), None, Box::new(NoopTradeSink));
    for command in commands {
        match command {
            Command::Submit(order) => {
                seq += 1;
                records.push(raw_add(
                    order.id.0,
                    order.price,
                    order.quantity,
                    seq,
                    match order.side {
                        Side::Buy => 0,
                        Side::Sell => 1,
                    },
                    match order.order_type {
                        journal_matching_engine::OrderType::Limit => 0,
                        journal_matching_engine::OrderType::Market => 1,
                    },
                ));
                shadow.submit(order).unwrap();
            }
            Command::Cancel(id) => {
                records.push(raw_record(1, &id.0.to_le_bytes()));
                let _ = shadow.cancel(id);
            }
        }
    }
    write_log(&slim, &records);

    let from_full = journal_matching_engine::replay::replay(&full).unwrap();
    let from_slim = journal_matching_engine::replay::replay(&slim).unwrap();
    assert_eq!(observe(&from_full), observe(&from_slim));
    assert_eq!(observe(&from_full), observe(&shadow));
}
