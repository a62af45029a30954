use std::fmt;
use num_enum::TryFromPrimitive;

use crate::constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};

#[inline]
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        let hex: String = b.iter().map(|c| format!("{:02x}", c)).collect();
        format!("0x{}", hex)
    }
}

/// Round a requested chunk size to a power of two in
/// `MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE`. `None` gives the default.
pub fn best_chunk_size(requested: Option<usize>) -> usize {
    match requested {
        None => DEFAULT_CHUNK_SIZE,
        Some(size) if size <= MIN_CHUNK_SIZE => MIN_CHUNK_SIZE,
        Some(size) if size >= MAX_CHUNK_SIZE => MAX_CHUNK_SIZE,
        Some(size) => size.next_power_of_two(),
    }
}
