//! Attribute extraction from a heap tuple.
//!
//! Walks the data area in attribute order, applying each column's alignment and
//! storage length. Values are returned as slices into the page; nothing is
//! copied until a value is converted.

use crate::catalog::{Column, StorageLength};
use super::error::DecodeError;
use super::header::TupleView;
use super::varlena::{read_varlena, Varlena};

/// One attribute as stored on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawAttribute<'a> {
    Null,
    Fixed(&'a [u8]),
    Varlena(Varlena<'a>),
}

/// Split a tuple into one raw attribute per column of the current schema.
///
/// Columns past the stored attribute count are null. Once an attribute's length
/// cannot be determined, every later non-null attribute is `OffsetLost`.
pub fn deform_tuple<'a>(tuple: &TupleView<'a>, columns: &[Column]) -> Vec<Result<RawAttribute<'a>, DecodeError>> {
    let data = tuple.data();
    let mut attributes = Vec::with_capacity(columns.len());
    let mut off = 0usize;
    let mut lost = false;

    for (attnum, column) in columns.iter().enumerate() {
        if tuple.is_null(attnum) {
            attributes.push(Ok(RawAttribute::Null));
            continue;
        }
        if lost {
            attributes.push(Err(DecodeError::OffsetLost));
            continue;
        }

        let result = match column.storage_length() {
            StorageLength::Fixed(len) => {
                off = column.alignment().align(off);
                match data.get(off..off + len) {
                    Some(bytes) => {
                        off += len;
                        Ok(RawAttribute::Fixed(bytes))
                    }
                    None => Err(DecodeError::Truncated {
                        offset: off,
                        needed: len,
                        available: data.len().saturating_sub(off),
                    }),
                }
            }
            StorageLength::Varlena => {
                // A non-zero byte here is a header; zero bytes are alignment padding
                if data.get(off).is_none_or(|&b| b == 0) {
                    off = column.alignment().align(off);
                }
                let start = off.min(data.len());
                match read_varlena(&data[start..]) {
                    Ok((value, size)) => {
                        off += size;
                        Ok(RawAttribute::Varlena(value))
                    }
                    Err(DecodeError::Truncated { needed, available, .. }) => Err(DecodeError::Truncated {
                        offset: off,
                        needed,
                        available,
                    }),
                    Err(e) => Err(e),
                }
            }
        };

        if result.is_err() {
            lost = true;
        }
        attributes.push(result);
    }

    attributes
}
