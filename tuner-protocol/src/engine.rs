// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Boundary to the sensing engine and the cooperative control loop.

use crate::pump::{service_link_events, CycleOutcome, NotificationPump, TunerLink};
use crate::session::Session;

/// Boundary to the sensing engine that owns the scan hardware.
///
/// The engine repopulates the shared tuner structure during [`process`],
/// between transfer cycles; scans run asynchronously after [`start_scan`]
/// and [`is_busy`] reports completion.
///
/// [`process`]: SensingEngine::process
/// [`start_scan`]: SensingEngine::start_scan
/// [`is_busy`]: SensingEngine::is_busy
pub trait SensingEngine {
    /// Whether a scan is still in flight.
    fn is_busy(&self) -> bool;

    /// Kicks off the next scan.
    fn start_scan(&mut self);

    /// Post-scan processing; rewrites the tuner structure in place.
    fn process(&mut self, buffer: &mut [u8]);
}

/// One iteration of the single-threaded control loop.
///
/// Pumps pending link events, and — only when the engine is idle — processes
/// the finished scan, runs one transfer cycle, and starts the next scan.
/// Returns the cycle outcome, or `None` when the engine was still busy and
/// no cycle ran. One cycle always completes or aborts before the next is
/// considered, so fragments of two cycles never interleave.
pub fn scan_loop_step<E: SensingEngine, L: TunerLink>(
    engine: &mut E,
    pump: &NotificationPump,
    session: &mut Session,
    buffer: &mut [u8],
    link: &mut L,
) -> Option<CycleOutcome> {
    service_link_events(session, buffer, link);

    if engine.is_busy() {
        return None;
    }

    engine.process(buffer);
    let outcome = pump.run_transfer_cycle(session, buffer, link);
    engine.start_scan();
    Some(outcome)
}
