use std::borrow::Cow;
use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};

use super::error::DecodeError;
use super::pglz;
use super::varlena::{ToastPointer, Varlena, COMPRESSION_PGLZ, VARHDRSZ};

/// Fetches the stored bytes of an out-of-line value.
///
/// Implementations return the concatenated chunk data exactly as stored; when the
/// pointer is compressed that data starts with the 4-byte size/method word.
pub trait ToastResolver {
    fn fetch(&self, pointer: &ToastPointer) -> Result<Vec<u8>, String>;
}

/// Toast values kept in memory, keyed by (toast relation, value id)
#[derive(Debug, Default, Clone)]
pub struct MemoryToast {
    values: HashMap<(u32, u32), Vec<u8>>,
}

impl MemoryToast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, toast_relid: u32, value_id: u32, stored: Vec<u8>) {
        self.values.insert((toast_relid, value_id), stored);
    }
}

impl ToastResolver for MemoryToast {
    fn fetch(&self, pointer: &ToastPointer) -> Result<Vec<u8>, String> {
        self.values
            .get(&(pointer.toast_relid, pointer.value_id))
            .cloned()
            .ok_or_else(|| format!("no chunks for value {} in toast relation {}", pointer.value_id, pointer.toast_relid))
    }
}

fn decompress(method: u8, data: &[u8], raw_size: usize) -> Result<Vec<u8>, DecodeError> {
    match method {
        COMPRESSION_PGLZ => pglz::decompress(data, raw_size),
        other => Err(DecodeError::UnsupportedCompression(other)),
    }
}

/// Materialize the payload of a varlena, decompressing and following toast pointers
pub fn detoast<'a>(value: Varlena<'a>, resolver: Option<&dyn ToastResolver>) -> Result<Cow<'a, [u8]>, DecodeError> {
    match value {
        Varlena::Inline(bytes) => Ok(Cow::Borrowed(bytes)),
        Varlena::Compressed { raw_size, method, data } => Ok(Cow::Owned(decompress(method, data, raw_size)?)),
        Varlena::External(pointer) => {
            let resolver = resolver.ok_or(DecodeError::UnresolvedToast {
                value_id: pointer.value_id,
                toast_relid: pointer.toast_relid,
            })?;
            let stored = resolver.fetch(&pointer).map_err(DecodeError::Toast)?;
            if stored.len() != pointer.ext_size as usize {
                return Err(DecodeError::Toast(format!(
                    "value {} has {} stored bytes, pointer says {}",
                    pointer.value_id,
                    stored.len(),
                    pointer.ext_size
                )));
            }

            if !pointer.is_compressed() {
                return Ok(Cow::Owned(stored));
            }

            if stored.len() < 4 {
                return Err(DecodeError::Toast(format!("compressed value {} is missing its size word", pointer.value_id)));
            }
            let raw_size = (pointer.raw_size as usize).saturating_sub(VARHDRSZ);
            let tcinfo = LittleEndian::read_u32(&stored[0..4]);
            let method = (tcinfo >> 30) as u8;
            Ok(Cow::Owned(decompress(method, &stored[4..], raw_size)?))
        }
    }
}
