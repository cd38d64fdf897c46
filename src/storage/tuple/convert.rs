// Type Conversion Utilities
//
// This module converts between stored attribute bytes and DataValue, per column type.

use byteorder::{ByteOrder, LittleEndian};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::catalog::{Column, DataType, StorageLength};
use crate::catalog::schema::NAMEDATALEN;
use crate::common::value::DataValue;
use super::error::{BuildError, DecodeError};
use super::varlena::encode_inline;

const DATE_INFINITY: i32 = i32::MAX;
const DATE_NEG_INFINITY: i32 = i32::MIN;
const TIMESTAMP_INFINITY: i64 = i64::MAX;
const TIMESTAMP_NEG_INFINITY: i64 = i64::MIN;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const UTC_SUFFIX: &str = "+00";

/// Dates and timestamps count from 2000-01-01
fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

fn epoch_timestamp() -> NaiveDateTime {
    epoch_date().and_hms_opt(0, 0, 0).unwrap_or_default()
}

/// A value in its stored form, ready to be placed in a tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    Null,
    Fixed(Vec<u8>),
    /// Complete varlena including its header
    Varlena(Vec<u8>),
}

fn fixed<const N: usize>(data_type: DataType, bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    bytes.try_into().map_err(|_| DecodeError::invalid_length(data_type, N, bytes.len()))
}

fn utf8(data_type: DataType, bytes: &[u8]) -> Result<String, DecodeError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8(data_type.to_string()))
}

/// Convert the payload of a fixed-width or detoasted varlena attribute
pub fn decode_value(data_type: DataType, bytes: &[u8]) -> Result<DataValue, DecodeError> {
    let value = match data_type {
        DataType::Boolean => DataValue::Boolean(fixed::<1>(data_type, bytes)?[0] != 0),
        DataType::Char => {
            let b = fixed::<1>(data_type, bytes)?[0];
            if b.is_ascii() {
                DataValue::Text((b as char).to_string())
            } else {
                DataValue::Text(format!("\\{:03o}", b))
            }
        }
        DataType::SmallInt => DataValue::Integer(LittleEndian::read_i16(&fixed::<2>(data_type, bytes)?) as i64),
        DataType::Integer => DataValue::Integer(LittleEndian::read_i32(&fixed::<4>(data_type, bytes)?) as i64),
        DataType::BigInt => DataValue::Integer(LittleEndian::read_i64(&fixed::<8>(data_type, bytes)?)),
        DataType::Oid => DataValue::Integer(LittleEndian::read_u32(&fixed::<4>(data_type, bytes)?) as i64),
        DataType::Real => DataValue::Float(LittleEndian::read_f32(&fixed::<4>(data_type, bytes)?) as f64),
        DataType::Double => DataValue::Float(LittleEndian::read_f64(&fixed::<8>(data_type, bytes)?)),
        DataType::Date => {
            let days = LittleEndian::read_i32(&fixed::<4>(data_type, bytes)?);
            DataValue::Date(format_date(days)?)
        }
        DataType::Timestamp | DataType::TimestampTz => {
            let micros = LittleEndian::read_i64(&fixed::<8>(data_type, bytes)?);
            let mut text = format_timestamp(micros)?;
            if data_type == DataType::TimestampTz && micros != TIMESTAMP_INFINITY && micros != TIMESTAMP_NEG_INFINITY {
                text.push_str(UTC_SUFFIX);
            }
            DataValue::Timestamp(text)
        }
        DataType::Uuid => {
            let raw = fixed::<16>(data_type, bytes)?;
            let h = hex::encode(raw);
            DataValue::Text(format!("{}-{}-{}-{}-{}", &h[0..8], &h[8..12], &h[12..16], &h[16..20], &h[20..32]))
        }
        DataType::Name => {
            let raw = fixed::<NAMEDATALEN>(data_type, bytes)?;
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            DataValue::Text(utf8(data_type, &raw[..end])?)
        }
        DataType::Text | DataType::Varchar | DataType::Bpchar => DataValue::Text(utf8(data_type, bytes)?),
        DataType::Bytea => DataValue::Blob(bytes.to_vec()),
    };
    Ok(value)
}

fn format_date(days: i32) -> Result<String, DecodeError> {
    match days {
        DATE_INFINITY => Ok("infinity".to_string()),
        DATE_NEG_INFINITY => Ok("-infinity".to_string()),
        _ => epoch_date()
            .checked_add_signed(Duration::days(days as i64))
            .map(|d| d.format(DATE_FORMAT).to_string())
            .ok_or_else(|| DecodeError::OutOfRange(DataType::Date.to_string())),
    }
}

fn format_timestamp(micros: i64) -> Result<String, DecodeError> {
    match micros {
        TIMESTAMP_INFINITY => Ok("infinity".to_string()),
        TIMESTAMP_NEG_INFINITY => Ok("-infinity".to_string()),
        _ => epoch_timestamp()
            .checked_add_signed(Duration::microseconds(micros))
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .ok_or_else(|| DecodeError::OutOfRange(DataType::Timestamp.to_string())),
    }
}

fn parse_date(text: &str) -> Option<i32> {
    match text {
        "infinity" => Some(DATE_INFINITY),
        "-infinity" => Some(DATE_NEG_INFINITY),
        _ => {
            let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
            i32::try_from(date.signed_duration_since(epoch_date()).num_days()).ok()
        }
    }
}

fn parse_timestamp(text: &str) -> Option<i64> {
    match text {
        "infinity" => Some(TIMESTAMP_INFINITY),
        "-infinity" => Some(TIMESTAMP_NEG_INFINITY),
        _ => {
            let text = text.strip_suffix(UTC_SUFFIX).unwrap_or(text);
            let ts = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?;
            ts.signed_duration_since(epoch_timestamp()).num_microseconds()
        }
    }
}

/// Convert a value into the stored form for `column`
pub fn encode_value(column: &Column, value: &DataValue) -> Result<StoredValue, BuildError> {
    let data_type = *column.data_type();
    let mismatch = || BuildError::TypeMismatch {
        column: column.name().to_string(),
        data_type,
        value: value.type_name(),
    };
    let out_of_range = || BuildError::OutOfRange(column.name().to_string());

    if value.is_null() {
        return Ok(StoredValue::Null);
    }

    let bytes: Vec<u8> = match (data_type, value) {
        (DataType::Boolean, DataValue::Boolean(b)) => vec![*b as u8],
        (DataType::Char, DataValue::Text(s)) if s.len() == 1 => s.as_bytes().to_vec(),
        (DataType::SmallInt, DataValue::Integer(i)) => i16::try_from(*i).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (DataType::Integer, DataValue::Integer(i)) => i32::try_from(*i).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (DataType::BigInt, DataValue::Integer(i)) => i.to_le_bytes().to_vec(),
        (DataType::Oid, DataValue::Integer(i)) => u32::try_from(*i).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (DataType::Real, DataValue::Float(f)) => (*f as f32).to_le_bytes().to_vec(),
        (DataType::Double, DataValue::Float(f)) => f.to_le_bytes().to_vec(),
        (DataType::Date, DataValue::Date(s) | DataValue::Text(s)) => {
            parse_date(s).ok_or_else(out_of_range)?.to_le_bytes().to_vec()
        }
        (DataType::Timestamp | DataType::TimestampTz, DataValue::Timestamp(s) | DataValue::Text(s)) => {
            parse_timestamp(s).ok_or_else(out_of_range)?.to_le_bytes().to_vec()
        }
        (DataType::Uuid, DataValue::Text(s)) => {
            let raw = hex::decode(s.replace('-', "")).map_err(|_| out_of_range())?;
            if raw.len() != 16 {
                return Err(out_of_range());
            }
            raw
        }
        (DataType::Name, DataValue::Text(s)) => {
            if s.len() >= NAMEDATALEN {
                return Err(out_of_range());
            }
            let mut raw = s.as_bytes().to_vec();
            raw.resize(NAMEDATALEN, 0);
            raw
        }
        (DataType::Text | DataType::Varchar | DataType::Bpchar, DataValue::Text(s)) => s.as_bytes().to_vec(),
        (DataType::Bytea, DataValue::Blob(b)) => b.clone(),
        _ => return Err(mismatch()),
    };

    match data_type.storage_length() {
        StorageLength::Fixed(_) => Ok(StoredValue::Fixed(bytes)),
        StorageLength::Varlena => Ok(StoredValue::Varlena(encode_inline(&bytes))),
    }
}
