//! This module provides the `ValueReaderSlice` struct for reading fixed-width values from a byte slice.
//!
//! # Examples
//!
//! ```rust
//! use tileshard_core::io::ValueReaderSlice;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let data = &[0x01, 0x02, 0x03, 0x04, 0x05];
//!
//!     let mut reader = ValueReaderSlice::new_le(data);
//!     assert_eq!(reader.read_u32()?, 0x04030201);
//!     assert_eq!(reader.remaining(), 1);
//!
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result, ensure};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::{
	io::{Cursor, Read},
	marker::PhantomData,
};

/// Reads values from a byte slice using the byte order `E`.
pub struct ValueReaderSlice<'a, E: ByteOrder> {
	_phantom: PhantomData<E>,
	cursor: Cursor<&'a [u8]>,
	len: u64,
}

impl<'a, E: ByteOrder> ValueReaderSlice<'a, E> {
	#[must_use]
	pub fn new(slice: &'a [u8]) -> ValueReaderSlice<'a, E> {
		ValueReaderSlice {
			_phantom: PhantomData,
			len: slice.len() as u64,
			cursor: Cursor::new(slice),
		}
	}

	#[must_use]
	pub fn position(&self) -> u64 {
		self.cursor.position()
	}

	#[must_use]
	pub fn remaining(&self) -> u64 {
		self.len.saturating_sub(self.position())
	}

	pub fn read_u32(&mut self) -> Result<u32> {
		let position = self.position();
		self
			.cursor
			.read_u32::<E>()
			.with_context(|| format!("reading u32 at offset {position} of {} bytes", self.len))
	}

	/// Reads exactly `length` bytes.
	pub fn read_bytes(&mut self, length: u64) -> Result<Vec<u8>> {
		ensure!(
			length <= self.remaining(),
			"reading {length} bytes at offset {} exceeds length {}",
			self.position(),
			self.len
		);
		let mut buffer = vec![0u8; length as usize];
		self.cursor.read_exact(&mut buffer)?;
		Ok(buffer)
	}
}

impl<'a> ValueReaderSlice<'a, LittleEndian> {
	#[must_use]
	pub fn new_le(slice: &'a [u8]) -> ValueReaderSlice<'a, LittleEndian> {
		ValueReaderSlice::new(slice)
	}
}
