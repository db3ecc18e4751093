// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire formats exchanged with the tuner peer.
//!
//! Both formats are fixed raw byte layouts and must stay byte-exact: the
//! remote tuner tool hardcodes them on its side.

use consts::{INIT_NOTICE_SIZE, MAX_PATCH_DATA, PATCH_COMMAND_SIZE};

/// Errors produced while decoding an inbound message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// Message is not exactly [`PATCH_COMMAND_SIZE`] bytes.
    BadMessageLength { len: usize },
    /// Patch data length field exceeds [`MAX_PATCH_DATA`].
    BadDataLength { len: u8 },
}

/// Handshake notification sent once per notify-enable, ahead of any data
/// fragment. Announces the tuner structure size (little-endian 16-bit) and
/// the number of data notifications needed to carry it, so the peer can
/// pre-size its receive buffer and reassembly loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitNotice {
    pub buffer_size: u16,
    /// 8-bit on the wire; saturates at 255. Buffers needing more fragments
    /// than that cannot be announced to the existing peer tool.
    pub fragment_count: u8,
}

impl InitNotice {
    /// Wire layout: `[size & 0xFF, size >> 8, fragment_count]`.
    pub fn to_bytes(self) -> [u8; INIT_NOTICE_SIZE] {
        let size = self.buffer_size.to_le_bytes();
        [size[0], size[1], self.fragment_count]
    }

    pub fn parse(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() != INIT_NOTICE_SIZE {
            return Err(WireError::BadMessageLength { len: buf.len() });
        }
        Ok(Self {
            buffer_size: u16::from_le_bytes([buf[0], buf[1]]),
            fragment_count: buf[2],
        })
    }
}

/// Inbound patch command: a small in-place write into the tuner structure.
///
/// Wire layout: `[length, offsetHi, offsetLo, d0, d1, d2, d3]`. Only the
/// first `length` data bytes are meaningful and they apply in reverse order
/// (`buffer[offset + i] = data[length - 1 - i]`), reconciling the peer's
/// big-endian framing with the little-endian structure layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatchCommand {
    pub length: u8,
    pub offset: u16,
    pub data: [u8; MAX_PATCH_DATA],
}

impl PatchCommand {
    /// Decodes a patch command. The message must be exactly
    /// [`PATCH_COMMAND_SIZE`] bytes and carry a length of at most
    /// [`MAX_PATCH_DATA`]; anything else is rejected so the caller can drop
    /// it without touching the tuner structure.
    pub fn parse(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() != PATCH_COMMAND_SIZE {
            return Err(WireError::BadMessageLength { len: buf.len() });
        }
        let length = buf[0];
        if usize::from(length) > MAX_PATCH_DATA {
            return Err(WireError::BadDataLength { len: length });
        }
        let mut data = [0u8; MAX_PATCH_DATA];
        data.copy_from_slice(&buf[3..]);
        Ok(Self {
            length,
            offset: u16::from_be_bytes([buf[1], buf[2]]),
            data,
        })
    }

    pub fn to_bytes(self) -> [u8; PATCH_COMMAND_SIZE] {
        let offset = self.offset.to_be_bytes();
        [
            self.length,
            offset[0],
            offset[1],
            self.data[0],
            self.data[1],
            self.data[2],
            self.data[3],
        ]
    }
}
