//! Little-endian field helpers shared by the account and instruction codecs.

use crate::{Result, RewardsError};

/// Copy `N` bytes starting at `offset`. `expected` is the full record size
/// reported when the buffer is too short.
pub(crate) fn read_array<const N: usize>(
    data: &[u8],
    offset: usize,
    expected: usize,
) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(RewardsError::MalformedAccount {
            expected,
            actual: data.len(),
        })
}

pub(crate) fn narrow_u64(field: &'static str, value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| RewardsError::ValueOutOfRange {
        field,
        value,
        max: u64::MAX as u128,
    })
}

pub(crate) fn narrow_u8(field: &'static str, value: u128) -> Result<u8> {
    u8::try_from(value).map_err(|_| RewardsError::ValueOutOfRange {
        field,
        value,
        max: u8::MAX as u128,
    })
}
