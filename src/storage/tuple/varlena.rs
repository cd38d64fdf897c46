//! Variable-length attribute headers.
//!
//! The first byte of a varlena tells its kind (little-endian layout):
//!
//! - `0x01`: external TOAST pointer, followed by a tag byte and the pointer body
//! - `xxxxxxx1`: short inline value, total length in the upper 7 bits
//! - `xxxxxx00`: 4-byte header, total length in the upper 30 bits
//! - `xxxxxx10`: 4-byte header, inline compressed

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use super::error::DecodeError;

pub const VARHDRSZ: usize = 4;
pub const VARHDRSZ_SHORT: usize = 1;
pub const VARHDRSZ_EXTERNAL: usize = 2;
pub const VARHDRSZ_COMPRESSED: usize = 8;

/// Largest total size that fits a short header
pub const VARATT_SHORT_MAX: usize = 0x7F;

pub const VARTAG_ONDISK: u8 = 18;
const TOAST_POINTER_SIZE: usize = 16;

const VARLENA_SIZE_MASK: u32 = 0x3FFF_FFFF;

/// Compression method stored in the top two bits of the size word
pub const COMPRESSION_PGLZ: u8 = 0;
pub const COMPRESSION_LZ4: u8 = 1;

/// Location of a value stored out of line in a toast relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToastPointer {
    /// Original size including the 4-byte header
    pub raw_size: i32,
    /// Bytes stored in the toast relation
    pub ext_size: u32,
    pub compression: u8,
    pub value_id: u32,
    pub toast_relid: u32,
}

impl ToastPointer {
    pub fn is_compressed(&self) -> bool {
        (self.ext_size as i64) < self.raw_size as i64 - VARHDRSZ as i64
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let extinfo = LittleEndian::read_u32(&bytes[4..8]);
        Self {
            raw_size: LittleEndian::read_i32(&bytes[0..4]),
            ext_size: extinfo & VARLENA_SIZE_MASK,
            compression: (extinfo >> 30) as u8,
            value_id: LittleEndian::read_u32(&bytes[8..12]),
            toast_relid: LittleEndian::read_u32(&bytes[12..16]),
        }
    }

    fn to_bytes(self) -> [u8; TOAST_POINTER_SIZE] {
        let mut bytes = [0u8; TOAST_POINTER_SIZE];
        LittleEndian::write_i32(&mut bytes[0..4], self.raw_size);
        LittleEndian::write_u32(&mut bytes[4..8], (self.ext_size & VARLENA_SIZE_MASK) | ((self.compression as u32) << 30));
        LittleEndian::write_u32(&mut bytes[8..12], self.value_id);
        LittleEndian::write_u32(&mut bytes[12..16], self.toast_relid);
        bytes
    }
}

/// A varlena attribute as stored in the tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Varlena<'a> {
    Inline(&'a [u8]),
    Compressed { raw_size: usize, method: u8, data: &'a [u8] },
    External(ToastPointer),
}

fn truncated(needed: usize, available: usize) -> DecodeError {
    DecodeError::Truncated { offset: 0, needed, available }
}

/// Parse the varlena starting at `bytes[0]`.
///
/// Returns the value and the number of bytes it occupies. An error means the
/// stored length is unknown.
pub fn read_varlena(bytes: &[u8]) -> Result<(Varlena<'_>, usize), DecodeError> {
    let first = *bytes.first().ok_or_else(|| truncated(1, 0))?;

    if first == 0x01 {
        if bytes.len() < VARHDRSZ_EXTERNAL {
            return Err(truncated(VARHDRSZ_EXTERNAL, bytes.len()));
        }
        let tag = bytes[1];
        if tag != VARTAG_ONDISK {
            return Err(DecodeError::UnsupportedExternalTag(tag));
        }
        let total = VARHDRSZ_EXTERNAL + TOAST_POINTER_SIZE;
        if bytes.len() < total {
            return Err(truncated(total, bytes.len()));
        }
        let pointer = ToastPointer::from_bytes(&bytes[VARHDRSZ_EXTERNAL..total]);
        return Ok((Varlena::External(pointer), total));
    }

    if first & 0x01 == 0x01 {
        let total = (first >> 1) as usize;
        if total < VARHDRSZ_SHORT {
            return Err(DecodeError::InvalidVarlena(first));
        }
        if bytes.len() < total {
            return Err(truncated(total, bytes.len()));
        }
        return Ok((Varlena::Inline(&bytes[VARHDRSZ_SHORT..total]), total));
    }

    if bytes.len() < VARHDRSZ {
        return Err(truncated(VARHDRSZ, bytes.len()));
    }
    let header = LittleEndian::read_u32(&bytes[0..4]);
    let total = ((header >> 2) & VARLENA_SIZE_MASK) as usize;
    if total < VARHDRSZ {
        return Err(DecodeError::InvalidVarlena(first));
    }
    if bytes.len() < total {
        return Err(truncated(total, bytes.len()));
    }

    if first & 0x03 == 0x02 {
        if total < VARHDRSZ_COMPRESSED {
            return Err(DecodeError::InvalidVarlena(first));
        }
        let tcinfo = LittleEndian::read_u32(&bytes[4..8]);
        return Ok((
            Varlena::Compressed {
                raw_size: (tcinfo & VARLENA_SIZE_MASK) as usize,
                method: (tcinfo >> 30) as u8,
                data: &bytes[VARHDRSZ_COMPRESSED..total],
            },
            total,
        ));
    }

    Ok((Varlena::Inline(&bytes[VARHDRSZ..total]), total))
}

/// Encode an inline value, using the short header when it fits
pub fn encode_inline(payload: &[u8]) -> Vec<u8> {
    if payload.len() + VARHDRSZ_SHORT <= VARATT_SHORT_MAX {
        let mut out = Vec::with_capacity(payload.len() + VARHDRSZ_SHORT);
        out.push((((payload.len() + VARHDRSZ_SHORT) as u8) << 1) | 0x01);
        out.extend_from_slice(payload);
        out
    } else {
        let mut out = vec![0u8; VARHDRSZ];
        LittleEndian::write_u32(&mut out[0..4], ((payload.len() + VARHDRSZ) as u32) << 2);
        out.extend_from_slice(payload);
        out
    }
}

/// Encode an inline compressed value with a 4-byte header
pub fn encode_compressed(raw_size: usize, method: u8, compressed: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; VARHDRSZ_COMPRESSED];
    LittleEndian::write_u32(&mut out[0..4], (((compressed.len() + VARHDRSZ_COMPRESSED) as u32) << 2) | 0x02);
    LittleEndian::write_u32(&mut out[4..8], (raw_size as u32 & VARLENA_SIZE_MASK) | ((method as u32) << 30));
    out.extend_from_slice(compressed);
    out
}

/// Encode an on-disk TOAST pointer
pub fn encode_external(pointer: ToastPointer) -> Vec<u8> {
    let mut out = vec![0x01, VARTAG_ONDISK];
    out.extend_from_slice(&pointer.to_bytes());
    out
}
