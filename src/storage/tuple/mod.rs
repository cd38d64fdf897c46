pub mod builder;
pub mod convert;
pub mod decoder;
pub mod error;
pub mod header;
pub mod pglz;
pub mod toast;
pub mod varlena;

pub use builder::TupleBuilder;
pub use convert::{decode_value, encode_value, StoredValue};
pub use decoder::{deform_tuple, RawAttribute};
pub use error::{BuildError, DecodeError, TupleFormatError};
pub use header::{HeapTupleHeader, TupleView, TUPLE_HEADER_SIZE};
pub use toast::{detoast, MemoryToast, ToastResolver};
pub use varlena::{ToastPointer, Varlena};
