//! Decompressor for the pglz format used by inline and toasted compressed values.
//!
//! The stream is a sequence of control bytes, each followed by up to eight items.
//! A clear control bit means one literal byte; a set bit means a back reference:
//!
//! ```text
//! byte 0: high nibble = offset bits 8..12, low nibble = length - 3
//! byte 1: offset bits 0..8
//! byte 2: extra length, present only when the low nibble is 0x0F
//! ```

use super::error::DecodeError;

/// Decompress `source` into exactly `raw_size` bytes
pub fn decompress(source: &[u8], raw_size: usize) -> Result<Vec<u8>, DecodeError> {
    let mut dest: Vec<u8> = Vec::with_capacity(raw_size);
    let mut sp = 0;

    while sp < source.len() && dest.len() < raw_size {
        let mut ctrl = source[sp];
        sp += 1;

        for _ in 0..8 {
            if sp >= source.len() || dest.len() >= raw_size {
                break;
            }

            if ctrl & 1 == 1 {
                if sp + 1 >= source.len() {
                    return Err(corrupt("back reference cut short"));
                }
                let mut len = (source[sp] & 0x0F) as usize + 3;
                let off = (((source[sp] & 0xF0) as usize) << 4) | source[sp + 1] as usize;
                sp += 2;
                if len == 18 {
                    let extra = *source.get(sp).ok_or_else(|| corrupt("length extension cut short"))?;
                    len += extra as usize;
                    sp += 1;
                }

                if off == 0 || off > dest.len() {
                    return Err(corrupt("back reference before start of output"));
                }
                let len = len.min(raw_size - dest.len());

                // Source and destination may overlap, so copy byte by byte
                let start = dest.len() - off;
                for i in 0..len {
                    let b = dest[start + i];
                    dest.push(b);
                }
            } else {
                dest.push(source[sp]);
                sp += 1;
            }

            ctrl >>= 1;
        }
    }

    if dest.len() != raw_size {
        return Err(corrupt(&format!("produced {} bytes, expected {}", dest.len(), raw_size)));
    }

    Ok(dest)
}

fn corrupt(reason: &str) -> DecodeError {
    DecodeError::Decompression(format!("compressed data is corrupt: {}", reason))
}
