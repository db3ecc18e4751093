// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Application of decoded patch commands to the shared tuner structure.

use crate::wire::PatchCommand;

/// Errors produced while applying a patch command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatchError {
    /// `offset + length` lands past the end of the tuner structure.
    OutOfBounds {
        offset: u16,
        length: u8,
        buffer_size: usize,
    },
}

/// Writes `cmd.length` bytes into `buffer` starting at `cmd.offset`, in
/// reverse data order: `buffer[offset + i] = data[length - 1 - i]`.
///
/// The whole command is rejected before any byte lands if it would overrun
/// the buffer. A zero-length command is a no-op.
pub fn apply_patch(buffer: &mut [u8], cmd: &PatchCommand) -> Result<(), PatchError> {
    let offset = usize::from(cmd.offset);
    let length = usize::from(cmd.length);

    let out_of_bounds = PatchError::OutOfBounds {
        offset: cmd.offset,
        length: cmd.length,
        buffer_size: buffer.len(),
    };
    let end = offset.checked_add(length).ok_or(out_of_bounds)?;
    let target = buffer.get_mut(offset..end).ok_or(out_of_bounds)?;

    for (i, byte) in target.iter_mut().enumerate() {
        *byte = cmd.data[length - 1 - i];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(length: u8, offset: u16, data: [u8; 4]) -> PatchCommand {
        PatchCommand {
            length,
            offset,
            data,
        }
    }

    #[test]
    fn two_byte_patch_applies_reversed() {
        let mut buffer = [0u8; 16];
        apply_patch(&mut buffer, &cmd(2, 10, [0xAA, 0xBB, 0x00, 0x00])).unwrap();
        assert_eq!(buffer[10], 0xBB);
        assert_eq!(buffer[11], 0xAA);
        // nothing else touched
        assert!(buffer[..10].iter().all(|&b| b == 0));
        assert!(buffer[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn four_byte_patch_applies_reversed() {
        let mut buffer = [0u8; 8];
        apply_patch(&mut buffer, &cmd(4, 2, [1, 2, 3, 4])).unwrap();
        assert_eq!(&buffer[2..6], &[4, 3, 2, 1]);
    }

    #[test]
    fn zero_length_patch_is_a_noop() {
        let mut buffer = [0x55u8; 4];
        apply_patch(&mut buffer, &cmd(0, 1, [1, 2, 3, 4])).unwrap();
        assert_eq!(buffer, [0x55; 4]);
    }

    #[test]
    fn patch_at_the_very_end_is_accepted() {
        let mut buffer = [0u8; 12];
        apply_patch(&mut buffer, &cmd(2, 10, [0xAA, 0xBB, 0x00, 0x00])).unwrap();
        assert_eq!(&buffer[10..], &[0xBB, 0xAA]);
    }

    #[test]
    fn overrun_is_rejected_without_mutation() {
        let mut buffer = [0u8; 12];
        let err = apply_patch(&mut buffer, &cmd(3, 10, [1, 2, 3, 0])).unwrap_err();
        assert_eq!(
            err,
            PatchError::OutOfBounds {
                offset: 10,
                length: 3,
                buffer_size: 12
            }
        );
        assert_eq!(buffer, [0; 12]);
    }

    #[test]
    fn offset_past_the_end_is_rejected() {
        let mut buffer = [0u8; 12];
        assert!(apply_patch(&mut buffer, &cmd(1, 0xFFFF, [1, 0, 0, 0])).is_err());
        assert_eq!(buffer, [0; 12]);
    }
}
