// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Simulated tuner session: a scripted peer connects, subscribes, watches a
//! few scan cycles stream out, patches a parameter, and disconnects.
//!
//! Run with `RUST_LOG=debug cargo run --example tuner_session` to see the
//! per-notification traffic.

use std::cell::Cell;
use std::collections::VecDeque;

use consts::{DEVICE_NAME, NOTIFICATION_PKT_SIZE, TUNER_SERVICE_UUID};
use log::{debug, info};
use tuner_protocol::{
    scan_loop_step, ConnHandle, LinkEvent, NotificationPump, NotifyError, SensingEngine, Session,
    TunerLink,
};

const TUNER_STRUCT_SIZE: u16 = 1000;

enum PeerEvent {
    Connected(u16),
    Disconnected,
    Subscribe(Vec<u8>),
    Patch(Vec<u8>),
}

/// In-memory stand-in for the radio stack: the "peer" pushes events into a
/// queue, and the link reports busy on every other poll to exercise the
/// backpressure path.
struct SimLink {
    queue: VecDeque<PeerEvent>,
    current: Option<PeerEvent>,
    busy_toggle: Cell<bool>,
    notifications: Vec<Vec<u8>>,
}

impl SimLink {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            busy_toggle: Cell::new(false),
            notifications: Vec::new(),
        }
    }
}

impl TunerLink for SimLink {
    fn poll_event(&mut self) -> Option<LinkEvent<'_>> {
        self.current = Some(self.queue.pop_front()?);
        Some(match self.current.as_ref().unwrap() {
            PeerEvent::Connected(handle) => LinkEvent::Connected(ConnHandle(*handle)),
            PeerEvent::Disconnected => LinkEvent::Disconnected,
            PeerEvent::Subscribe(payload) => LinkEvent::SubscribeWrite(payload),
            PeerEvent::Patch(payload) => LinkEvent::PatchWrite(payload),
        })
    }

    fn is_busy(&self) -> bool {
        let busy = self.busy_toggle.get();
        self.busy_toggle.set(!busy);
        busy
    }

    fn notify(&mut self, payload: &[u8]) -> Result<(), NotifyError> {
        debug!("notify: {} bytes", payload.len());
        self.notifications.push(payload.to_vec());
        Ok(())
    }
}

/// Sensing engine stand-in; scans complete instantly. Each scan rewrites the
/// readings half of the structure and leaves the parameter half alone, the
/// way the real engine only touches what it measures.
struct SimEngine {
    scan: u8,
}

impl SensingEngine for SimEngine {
    fn is_busy(&self) -> bool {
        false
    }

    fn start_scan(&mut self) {
        self.scan = self.scan.wrapping_add(1);
    }

    fn process(&mut self, buffer: &mut [u8]) {
        let mid = buffer.len() / 2;
        buffer[mid..].fill(self.scan);
    }
}

fn main() {
    pretty_env_logger::init();

    info!(
        "{}: simulated session, {} byte structure, {} byte fragments",
        DEVICE_NAME, TUNER_STRUCT_SIZE, NOTIFICATION_PKT_SIZE
    );
    debug!("tuner service uuid: {:032x}", TUNER_SERVICE_UUID);

    let mut session = Session::new(TUNER_STRUCT_SIZE);
    let mut buffer = vec![0u8; usize::from(TUNER_STRUCT_SIZE)];
    let mut link = SimLink::new();
    let mut engine = SimEngine { scan: 0 };
    let pump = NotificationPump::new();

    // peer connects and enables notifications
    link.queue.push_back(PeerEvent::Connected(1));
    link.queue.push_back(PeerEvent::Subscribe(vec![1]));

    let outcome = scan_loop_step(&mut engine, &pump, &mut session, &mut buffer, &mut link);
    info!(
        "first scan cycle: {:?}, {} notifications out",
        outcome,
        link.notifications.len()
    );
    info!("init notice: {:02x?}", link.notifications[0]);

    let reassembled: Vec<u8> = link.notifications[1..].concat();
    assert_eq!(reassembled, buffer);
    info!("peer reassembled {} bytes", reassembled.len());

    // peer patches two bytes at offset 10 (reversed on the wire)
    link.queue
        .push_back(PeerEvent::Patch(vec![2, 0, 10, 0xAA, 0xBB, 0, 0]));
    scan_loop_step(&mut engine, &pump, &mut session, &mut buffer, &mut link);
    info!("patched bytes at offset 10: {:02x?}", &buffer[10..12]);

    // peer drops the link; the next cycle is a no-op
    link.queue.push_back(PeerEvent::Disconnected);
    let outcome = scan_loop_step(&mut engine, &pump, &mut session, &mut buffer, &mut link);
    info!(
        "after disconnect: {:?}, dropped writes: {}",
        outcome,
        session.dropped_writes()
    );
}
