//! # Backing-Store Port Tests
//!
//! Handshake resolution, adapter forwarding (against a mock store), the memory
//! store model, latency models, and the protocol monitor.

use mockall::predicate::function;
use pretty_assertions::assert_eq;
use wbcache_core::common::ProtocolViolation;
use wbcache_core::config::{BackingStoreConfig, Controller};
use wbcache_core::port::controller::{FixedLatency, LatencyModel, RowBufferLatency, latency_model};
use wbcache_core::port::memory::MemoryStore;
use wbcache_core::port::monitor::ProtocolMonitor;
use wbcache_core::port::{
    BackingStore, Command, PortAdapter, PortRequest, PortResponse, ReadBeat, Transfers, WriteBeat,
};

use crate::common::mocks::store::MockStore;

fn write_cmd(addr: u64) -> Command {
    Command {
        addr,
        we: true,
        last: false,
    }
}

fn read_cmd(addr: u64) -> Command {
    Command {
        addr,
        we: false,
        last: true,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Handshakes and forwarding
// ══════════════════════════════════════════════════════════

#[test]
fn test_transfer_needs_valid_and_ready() {
    let request = PortRequest {
        cmd: Some(write_cmd(1)),
        w: Some(WriteBeat {
            data: vec![1, 2, 3, 4],
            byte_enable: 0xF,
        }),
        r_ready: true,
    };
    let response = PortResponse {
        cmd_ready: true,
        w_ready: false,
        r: None,
    };
    let transfers = Transfers::resolve(&request, response);
    assert_eq!(transfers.cmd, Some(write_cmd(1)));
    assert!(transfers.w.is_none());
    assert!(transfers.r.is_none());
    assert!(!transfers.is_empty());

    assert!(Transfers::resolve(&request, PortResponse::IDLE).is_empty());
}

#[test]
fn test_adapter_forwards_store_response_verbatim() {
    let mut store = MockStore::new();
    let _ = store.expect_respond().times(1).returning(|| PortResponse {
        cmd_ready: true,
        ..PortResponse::IDLE
    });
    let _ = store
        .expect_clock()
        .with(function(|t: &Transfers| t.cmd == Some(read_cmd(9)) && t.r.is_none()))
        .times(1)
        .return_const(());

    let mut adapter = PortAdapter::new(store);
    let response = adapter.drive();
    assert!(response.cmd_ready);

    let request = PortRequest {
        cmd: Some(read_cmd(9)),
        w: None,
        r_ready: true,
    };
    let transfers = adapter.commit(&request, response).unwrap();
    assert_eq!(transfers.cmd, Some(read_cmd(9)));
    assert!(adapter.monitor().is_busy());
}

#[test]
fn test_adapter_clocks_store_even_on_violation() {
    let mut store = MockStore::new();
    let _ = store.expect_clock().times(2).return_const(());
    let mut adapter = PortAdapter::new(store);

    let request = PortRequest {
        cmd: Some(read_cmd(0)),
        ..PortRequest::IDLE
    };
    let ready = PortResponse {
        cmd_ready: true,
        ..PortResponse::IDLE
    };
    let _ = adapter.commit(&request, ready).unwrap();
    assert_eq!(
        adapter.commit(&request, PortResponse::IDLE),
        Err(ProtocolViolation::OverlappingCommand { cycle: 1 })
    );
}

// ══════════════════════════════════════════════════════════
// 2. Memory store
// ══════════════════════════════════════════════════════════

#[test]
fn test_memory_store_write_operation() {
    let mut mem = MemoryStore::new(4, 8, Box::new(FixedLatency::new(1)));
    assert!(mem.respond().cmd_ready);
    mem.clock(&Transfers {
        cmd: Some(write_cmd(5)),
        ..Transfers::default()
    });
    assert!(!mem.respond().w_ready);
    mem.clock(&Transfers::default());
    assert!(mem.respond().w_ready);
    mem.clock(&Transfers {
        w: Some(WriteBeat {
            data: vec![9, 8, 7, 6],
            byte_enable: 0b0011,
        }),
        ..Transfers::default()
    });
    assert!(mem.respond().cmd_ready);
    assert_eq!(mem.read_block(5), vec![9, 8, 0, 0]);
    assert_eq!(mem.writes(), 1);
}

#[test]
fn test_memory_store_masks_block_address() {
    let mut mem = MemoryStore::new(4, 4, Box::new(FixedLatency::new(0)));
    mem.write_block(0x13, &[1, 1, 1, 1], 0xF);
    assert_eq!(mem.read_block(0x3), vec![1, 1, 1, 1]);
}

#[test]
fn test_memory_store_from_config_uses_backing_width() {
    let config = BackingStoreConfig {
        data_width: 64,
        ..BackingStoreConfig::default()
    };
    assert_eq!(MemoryStore::from_config(&config).line_bytes(), 8);
}

// ══════════════════════════════════════════════════════════
// 3. Latency models
// ══════════════════════════════════════════════════════════

#[test]
fn test_row_buffer_latency() {
    let mut model = RowBufferLatency::new(2, 3, 5, 4);
    assert_eq!(model.access_latency(0x10), 3 + 2);
    assert_eq!(model.access_latency(0x1F), 2);
    assert_eq!(model.access_latency(0x20), 5 + 3 + 2);
}

#[test]
fn test_latency_model_follows_controller() {
    let simple = BackingStoreConfig {
        latency: 7,
        ..BackingStoreConfig::default()
    };
    assert_eq!(latency_model(&simple).access_latency(0), 7);

    let dram = BackingStoreConfig {
        controller: Controller::Dram,
        t_cas: 1,
        t_ras: 2,
        t_pre: 4,
        ..BackingStoreConfig::default()
    };
    let mut model = latency_model(&dram);
    assert_eq!(model.access_latency(0), 3);
    assert_eq!(model.access_latency(0), 1);
}

// ══════════════════════════════════════════════════════════
// 4. Protocol monitor
// ══════════════════════════════════════════════════════════

#[test]
fn test_monitor_logs_write_after_split_handshakes() {
    let mut mon = ProtocolMonitor::new();
    let beat = WriteBeat {
        data: vec![1; 4],
        byte_enable: 0xF,
    };
    let both = PortRequest {
        cmd: Some(write_cmd(2)),
        w: Some(beat.clone()),
        r_ready: false,
    };
    mon.observe(
        &both,
        &Transfers {
            cmd: Some(write_cmd(2)),
            ..Transfers::default()
        },
    )
    .unwrap();

    let data_only = PortRequest {
        cmd: None,
        w: Some(beat.clone()),
        r_ready: false,
    };
    mon.observe(
        &data_only,
        &Transfers {
            w: Some(beat),
            ..Transfers::default()
        },
    )
    .unwrap();

    assert_eq!(mon.writes().count(), 1);
    assert_eq!(mon.log()[0].cycle, 1);
    assert!(!mon.is_busy());
}

#[test]
fn test_monitor_rejects_read_under_write_command() {
    let mut mon = ProtocolMonitor::new();
    let request = PortRequest {
        cmd: Some(write_cmd(0)),
        w: None,
        r_ready: true,
    };
    let transfers = Transfers {
        cmd: Some(write_cmd(0)),
        w: None,
        r: Some(ReadBeat { data: vec![0; 4] }),
    };
    assert_eq!(
        mon.observe(&request, &transfers),
        Err(ProtocolViolation::MismatchedBeat {
            cycle: 0,
            beat: "read",
            we: true,
        })
    );
}

#[test]
fn test_monitor_rejects_duplicate_write_beat() {
    let mut mon = ProtocolMonitor::new();
    let beat = WriteBeat {
        data: vec![0; 4],
        byte_enable: 0xF,
    };
    let request = PortRequest {
        cmd: None,
        w: Some(beat.clone()),
        r_ready: false,
    };
    mon.observe(
        &request,
        &Transfers {
            w: Some(beat),
            ..Transfers::default()
        },
    )
    .unwrap();
    assert_eq!(
        mon.observe(&request, &Transfers::default()),
        Err(ProtocolViolation::DuplicateWrite { cycle: 1 })
    );
}
