// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fragment arithmetic for walking the tuner structure out as fixed-size
//! notification payloads.

/// One fragment of the tuner structure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fragment {
    pub index: usize,
    pub offset: usize,
    pub len: usize,
}

/// Pure descriptor of how a buffer splits into notification fragments.
///
/// Every fragment carries `fragment_size` bytes except the last, which
/// carries the remainder — or a full `fragment_size` when the buffer size is
/// an exact multiple, so an evenly divisible buffer never produces a
/// zero-length tail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FragmentCursor {
    buffer_size: usize,
    fragment_size: usize,
}

impl FragmentCursor {
    /// `fragment_size` is a deployment constant and must be non-zero.
    pub fn new(buffer_size: usize, fragment_size: usize) -> Self {
        debug_assert!(fragment_size > 0);
        Self {
            buffer_size,
            fragment_size,
        }
    }

    /// Number of notifications needed to cover the buffer, at least 1.
    pub fn fragment_count(&self) -> usize {
        self.buffer_size.div_ceil(self.fragment_size).max(1)
    }

    /// Fragment at `index`, or `None` past the end.
    pub fn fragment(&self, index: usize) -> Option<Fragment> {
        if index >= self.fragment_count() {
            return None;
        }
        let offset = index * self.fragment_size;
        Some(Fragment {
            index,
            offset,
            len: self.fragment_size.min(self.buffer_size - offset),
        })
    }

    /// Fragments in ascending offset order.
    pub fn iter(&self) -> impl Iterator<Item = Fragment> + '_ {
        (0..self.fragment_count()).filter_map(|index| self.fragment(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_matches_ceil_division() {
        assert_eq!(FragmentCursor::new(1000, 492).fragment_count(), 3);
        assert_eq!(FragmentCursor::new(492, 492).fragment_count(), 1);
        assert_eq!(FragmentCursor::new(493, 492).fragment_count(), 2);
        assert_eq!(FragmentCursor::new(1, 492).fragment_count(), 1);
    }

    #[test]
    fn exact_multiple_has_no_zero_length_tail() {
        let cursor = FragmentCursor::new(984, 492);
        assert_eq!(cursor.fragment_count(), 2);
        let last = cursor.fragment(1).unwrap();
        assert_eq!(last.offset, 492);
        assert_eq!(last.len, 492);
        assert_eq!(cursor.fragment(2), None);
    }

    #[test]
    fn last_fragment_carries_remainder() {
        let cursor = FragmentCursor::new(1000, 492);
        assert_eq!(
            cursor.fragment(2),
            Some(Fragment {
                index: 2,
                offset: 984,
                len: 16
            })
        );
    }

    #[test]
    fn fragments_partition_the_buffer() {
        for (buffer_size, fragment_size) in
            [(1000, 492), (984, 492), (492, 492), (1, 492), (7, 3), (491, 492), (4096, 128)]
        {
            let cursor = FragmentCursor::new(buffer_size, fragment_size);
            let mut expected_offset = 0;
            let mut total = 0;
            for fragment in cursor.iter() {
                assert_eq!(fragment.offset, expected_offset);
                assert!(fragment.len > 0);
                assert!(fragment.len <= fragment_size);
                expected_offset += fragment.len;
                total += fragment.len;
            }
            assert_eq!(total, buffer_size);
            assert_eq!(cursor.iter().count(), cursor.fragment_count());
        }
    }
}
