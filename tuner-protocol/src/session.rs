// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-peer session state and the event state machine.
//!
//! Link-stack callbacks are modelled as a closed [`LinkEvent`] enum and fed
//! to [`Session::on_event`], which updates the session and returns the
//! [`Effect`]s the driver must carry out. Keeping the machine free of I/O is
//! what makes it testable without a live link.

use heapless::Vec;

use crate::cursor::FragmentCursor;
use crate::wire::{InitNotice, PatchCommand};

/// Opaque token identifying the current peer link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnHandle(pub u16);

/// Events delivered by the link stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent<'a> {
    /// A peer connected.
    Connected(ConnHandle),
    /// The link went down, from either side.
    Disconnected,
    /// Write to the notify-enable descriptor; payload first byte is a
    /// boolean (0 = disable, nonzero = enable).
    SubscribeWrite(&'a [u8]),
    /// Fire-and-forget write to the data characteristic carrying a patch
    /// command.
    PatchWrite(&'a [u8]),
    /// Any other stack event; ignored by this protocol.
    Other,
}

/// Actions the driver must perform after an event is processed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Send the handshake notification, ahead of any data fragment.
    SendInitNotice(InitNotice),
    /// Apply a validated-shape patch to the shared tuner structure.
    ApplyPatch(PatchCommand),
}

/// One event never produces more than one effect.
pub const MAX_EFFECTS: usize = 1;

/// Process-wide tuner session state.
///
/// States: idle (no connection) → connected/unsubscribed →
/// connected/subscribed. The `disconnected` flag is sticky from link-down
/// until the next connect, so an in-flight transfer cycle can observe it as
/// a plain flag check.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    subscribed: bool,
    disconnected: bool,
    connection: Option<ConnHandle>,
    buffer_size: u16,
    fragment_size: usize,
    fragment_count: usize,
    dropped_writes: u32,
}

impl Session {
    /// New idle session for a tuner structure of `buffer_size` bytes, using
    /// the deployment fragment size [`consts::NOTIFICATION_PKT_SIZE`].
    pub fn new(buffer_size: u16) -> Self {
        Self::with_fragment_size(buffer_size, consts::NOTIFICATION_PKT_SIZE)
    }

    /// Same, with an explicit fragment size. Must be non-zero.
    pub fn with_fragment_size(buffer_size: u16, fragment_size: usize) -> Self {
        debug_assert!(fragment_size > 0);
        Self {
            subscribed: false,
            disconnected: false,
            connection: None,
            buffer_size,
            fragment_size,
            fragment_count: 1,
            dropped_writes: 0,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    pub fn connection(&self) -> Option<ConnHandle> {
        self.connection
    }

    pub fn buffer_size(&self) -> u16 {
        self.buffer_size
    }

    pub fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    /// Fragment count fixed at the last subscription activation.
    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    /// Inbound writes dropped as malformed or out of bounds.
    pub fn dropped_writes(&self) -> u32 {
        self.dropped_writes
    }

    /// Cursor over the tuner structure at the current deployment geometry.
    pub fn cursor(&self) -> FragmentCursor {
        FragmentCursor::new(usize::from(self.buffer_size), self.fragment_size)
    }

    pub(crate) fn note_dropped_write(&mut self) {
        self.dropped_writes = self.dropped_writes.saturating_add(1);
    }

    /// Advances the state machine by one event.
    ///
    /// Pure with respect to the outside world: all I/O and buffer mutation
    /// is returned as [`Effect`]s for the driver to execute. Malformed
    /// inbound writes produce no effect and bump [`Self::dropped_writes`].
    pub fn on_event(&mut self, event: LinkEvent<'_>) -> Vec<Effect, MAX_EFFECTS> {
        let mut effects = Vec::new();
        match event {
            LinkEvent::Connected(handle) => {
                self.connection = Some(handle);
                self.disconnected = false;
                self.subscribed = false;
                // prior session counters are discarded; a fresh handshake
                // recomputes the fragment count
                self.fragment_count = 1;
            }
            LinkEvent::Disconnected => {
                self.connection = None;
                self.disconnected = true;
                self.subscribed = false;
            }
            LinkEvent::SubscribeWrite(payload) => match payload.first() {
                Some(0) => self.subscribed = false,
                Some(_) => {
                    if !self.subscribed {
                        self.subscribed = true;
                        let cursor = self.cursor();
                        self.fragment_count = cursor.fragment_count();
                        let notice = InitNotice {
                            buffer_size: self.buffer_size,
                            // 8-bit wire field, saturating
                            fragment_count: u8::try_from(self.fragment_count)
                                .unwrap_or(u8::MAX),
                        };
                        let _ = effects.push(Effect::SendInitNotice(notice));
                    }
                }
                None => self.note_dropped_write(),
            },
            LinkEvent::PatchWrite(payload) => match PatchCommand::parse(payload) {
                Ok(cmd) => {
                    let _ = effects.push(Effect::ApplyPatch(cmd));
                }
                Err(_) => self.note_dropped_write(),
            },
            LinkEvent::Other => {}
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANDLE: ConnHandle = ConnHandle(7);

    fn connected_session() -> Session {
        let mut session = Session::with_fragment_size(1000, 492);
        assert!(session.on_event(LinkEvent::Connected(HANDLE)).is_empty());
        session
    }

    #[test]
    fn subscribe_emits_one_init_notice() {
        let mut session = connected_session();
        let effects = session.on_event(LinkEvent::SubscribeWrite(&[1]));
        assert_eq!(
            effects.as_slice(),
            &[Effect::SendInitNotice(InitNotice {
                buffer_size: 1000,
                fragment_count: 3,
            })]
        );
        assert!(session.is_subscribed());
        assert_eq!(session.fragment_count(), 3);

        // a second enable write is not a false→true transition
        assert!(session.on_event(LinkEvent::SubscribeWrite(&[1])).is_empty());
    }

    #[test]
    fn init_notice_bytes_match_the_peer_tool() {
        let mut session = connected_session();
        let effects = session.on_event(LinkEvent::SubscribeWrite(&[1]));
        let Effect::SendInitNotice(notice) = effects[0] else {
            panic!("expected init notice");
        };
        assert_eq!(notice.to_bytes(), [0xE8, 0x03, 3]);
    }

    #[test]
    fn resubscription_reproduces_the_identical_notice() {
        let mut session = connected_session();
        let first = session.on_event(LinkEvent::SubscribeWrite(&[1]));
        assert!(session.on_event(LinkEvent::SubscribeWrite(&[0])).is_empty());
        assert!(!session.is_subscribed());
        let second = session.on_event(LinkEvent::SubscribeWrite(&[1]));
        assert_eq!(first, second);
        assert_eq!(session.fragment_count(), 3);
    }

    #[test]
    fn disconnect_is_sticky_until_the_next_connect() {
        let mut session = connected_session();
        session.on_event(LinkEvent::SubscribeWrite(&[1]));
        session.on_event(LinkEvent::Disconnected);
        assert!(session.is_disconnected());
        assert!(!session.is_subscribed());
        assert_eq!(session.connection(), None);

        session.on_event(LinkEvent::Connected(ConnHandle(8)));
        assert!(!session.is_disconnected());
        assert!(!session.is_subscribed());
        assert_eq!(session.connection(), Some(ConnHandle(8)));
        assert_eq!(session.fragment_count(), 1);
    }

    #[test]
    fn malformed_patch_writes_are_counted_and_dropped() {
        let mut session = connected_session();
        assert!(session.on_event(LinkEvent::PatchWrite(&[1, 0, 0, 1, 2, 3])).is_empty());
        assert!(session
            .on_event(LinkEvent::PatchWrite(&[1, 0, 0, 1, 2, 3, 4, 5]))
            .is_empty());
        assert!(session
            .on_event(LinkEvent::PatchWrite(&[5, 0, 0, 1, 2, 3, 4]))
            .is_empty());
        assert_eq!(session.dropped_writes(), 3);
    }

    #[test]
    fn empty_subscribe_write_is_dropped() {
        let mut session = connected_session();
        assert!(session.on_event(LinkEvent::SubscribeWrite(&[])).is_empty());
        assert!(!session.is_subscribed());
        assert_eq!(session.dropped_writes(), 1);
    }

    #[test]
    fn valid_patch_write_yields_an_apply_effect() {
        let mut session = connected_session();
        let effects = session.on_event(LinkEvent::PatchWrite(&[2, 0x00, 0x0A, 0xAA, 0xBB, 0, 0]));
        assert_eq!(
            effects.as_slice(),
            &[Effect::ApplyPatch(PatchCommand {
                length: 2,
                offset: 10,
                data: [0xAA, 0xBB, 0, 0],
            })]
        );
    }

    #[test]
    fn fragment_count_saturates_on_the_wire() {
        // 492 * 300 bytes would need 300 fragments; the wire field caps at 255
        let mut session = Session::with_fragment_size(u16::MAX, 4);
        session.on_event(LinkEvent::Connected(HANDLE));
        let effects = session.on_event(LinkEvent::SubscribeWrite(&[1]));
        let Effect::SendInitNotice(notice) = effects[0] else {
            panic!("expected init notice");
        };
        assert_eq!(notice.fragment_count, u8::MAX);
        assert_eq!(session.fragment_count(), 16384);
    }
}
