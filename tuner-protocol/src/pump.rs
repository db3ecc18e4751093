// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backpressure-gated notification pump.
//!
//! [`NotificationPump::run_transfer_cycle`] walks the shared tuner structure
//! out to the peer, one [`FragmentCursor`](crate::cursor::FragmentCursor)
//! fragment per notification. The wait for a free link is a poll loop that
//! itself services the link event queue — that is the load-bearing detail:
//! patch writes land and disconnects become observable *between* fragments,
//! not only after the cycle.

use crate::command::apply_patch;
use crate::session::{Effect, LinkEvent, Session};

/// Error returned by [`TunerLink::notify`]. Transient: the caller re-attempts
/// after the next free signal, there is no error queueing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotifyError;

/// Boundary to the radio/link stack.
///
/// Connection establishment, advertising and PHY negotiation live behind
/// this trait; the protocol only needs event delivery, a per-peer busy
/// query, and the send-notification primitive.
pub trait TunerLink {
    /// Pops the next pending link event, if any.
    fn poll_event(&mut self) -> Option<LinkEvent<'_>>;

    /// Whether the stack can currently accept an outbound notification.
    fn is_busy(&self) -> bool;

    /// Sends one notification on the tuner data characteristic.
    fn notify(&mut self, payload: &[u8]) -> Result<(), NotifyError>;
}

/// How a transfer cycle ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Peer has not enabled notifications; nothing was sent.
    Idle,
    /// Every fragment went out.
    Complete,
    /// A disconnect was observed mid-cycle; remaining fragments were never
    /// sent and nothing is retransmitted. The next cycle starts from
    /// fragment 0 after a fresh handshake.
    Disconnected,
    /// The poll budget expired while waiting for a free link. Treated like a
    /// disconnect: the cycle is abandoned.
    Stalled,
}

/// Drains the link event queue, feeding each event through the session state
/// machine and executing the resulting effects against `buffer` and `link`.
///
/// Patches land here, possibly in the middle of a transfer cycle; a fragment
/// sent afterwards reflects the patched bytes. That interleaving is the
/// accepted consistency model of the tuner link, not a race to lock away.
pub fn service_link_events<L: TunerLink>(session: &mut Session, buffer: &mut [u8], link: &mut L) {
    while let Some(event) = link.poll_event() {
        let effects = session.on_event(event);
        for effect in effects {
            match effect {
                Effect::SendInitNotice(notice) => {
                    // Sent once per activation, not retried: a lost notice
                    // surfaces on the peer as a failed handshake and the
                    // peer re-issues the enable write.
                    let _ = link.notify(&notice.to_bytes());
                }
                Effect::ApplyPatch(cmd) => {
                    if apply_patch(buffer, &cmd).is_err() {
                        session.note_dropped_write();
                    }
                }
            }
        }
    }
}

/// The send loop driving one full buffer transfer per scan cycle.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationPump {
    poll_budget: Option<u32>,
}

impl NotificationPump {
    /// Pump with an unbounded backpressure wait; a disconnect event is the
    /// only thing that aborts a cycle.
    pub const fn new() -> Self {
        Self { poll_budget: None }
    }

    /// Pump that gives up on a fragment after `budget` consecutive
    /// unsuccessful polls, aborting the cycle with
    /// [`CycleOutcome::Stalled`]. Bounds worst-case latency when the link
    /// stack wedges without delivering a disconnect.
    pub const fn with_poll_budget(budget: u32) -> Self {
        Self {
            poll_budget: Some(budget),
        }
    }

    /// Transmits `buffer` to the peer as `session.fragment_count()`
    /// notifications in ascending offset order.
    ///
    /// `buffer` must be the tuner structure the session was created for.
    /// Returns immediately with [`CycleOutcome::Idle`] when the peer is not
    /// subscribed. Each fragment waits for the link to report free, and the
    /// wait services the event queue so a sticky disconnect aborts the cycle
    /// on the next iteration. A failed send blocks its fragment index until
    /// the link frees up again; fragments are never skipped or reordered.
    pub fn run_transfer_cycle<L: TunerLink>(
        &self,
        session: &mut Session,
        buffer: &mut [u8],
        link: &mut L,
    ) -> CycleOutcome {
        service_link_events(session, buffer, link);

        if !session.is_subscribed() {
            return CycleOutcome::Idle;
        }

        let cursor = session.cursor();
        for index in 0..session.fragment_count() {
            let Some(fragment) = cursor.fragment(index) else {
                break;
            };

            let mut polls: u32 = 0;
            loop {
                service_link_events(session, buffer, link);

                if session.is_disconnected() {
                    return CycleOutcome::Disconnected;
                }

                if !link.is_busy() {
                    let end = fragment.offset + fragment.len;
                    let Some(payload) = buffer.get(fragment.offset..end) else {
                        // session geometry disagrees with the buffer handed
                        // in; nothing sane to send
                        return CycleOutcome::Stalled;
                    };
                    if link.notify(payload).is_ok() {
                        break;
                    }
                }

                polls = polls.saturating_add(1);
                if let Some(budget) = self.poll_budget {
                    if polls >= budget {
                        return CycleOutcome::Stalled;
                    }
                }
            }
        }

        CycleOutcome::Complete
    }
}
