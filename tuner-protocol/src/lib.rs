// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chunked notification transfer protocol for the sensing-engine tuner
//! bridge.
//!
//! The device keeps a large, fixed-size tuner/configuration structure that a
//! remote tuning tool wants to watch live and patch in place. This crate is
//! the wire-facing core of that bridge: it announces the structure geometry
//! when the peer enables notifications, streams the structure out as
//! fixed-size notification fragments gated by link backpressure, and applies
//! small offset-addressed patch commands written back by the peer — all
//! while staying correct when the link drops mid-transfer.
//!
//! The radio stack and the sensing engine are collaborators behind the
//! [`TunerLink`] and [`SensingEngine`] traits; the crate itself is `no_std`
//! and performs no I/O of its own.

#![no_std]

pub mod command;
pub mod cursor;
pub mod engine;
pub mod pump;
pub mod session;
pub mod wire;

pub use command::{apply_patch, PatchError};
pub use cursor::{Fragment, FragmentCursor};
pub use engine::{scan_loop_step, SensingEngine};
pub use pump::{service_link_events, CycleOutcome, NotificationPump, NotifyError, TunerLink};
pub use session::{ConnHandle, Effect, LinkEvent, Session, MAX_EFFECTS};
pub use wire::{InitNotice, PatchCommand, WireError};
