//! Readers for fixed-width values in binary payloads.

mod value_reader_slice;
pub use value_reader_slice::*;
