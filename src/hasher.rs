//! Streaming content digests for change detection
//!
//! Files are read sequentially in fixed-size chunks and fed into a BLAKE3
//! hasher, so memory use does not depend on file size.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::SyncError;

/// Default read buffer for hashing (32 KiB)
pub const HASH_BUFFER_SIZE: usize = 32 * 1024;

/// Fixed-length digest of a file's bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}

	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl From<blake3::Hash> for ContentDigest {
	fn from(h: blake3::Hash) -> Self {
		ContentDigest(*h.as_bytes())
	}
}

impl fmt::Display for ContentDigest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl fmt::Debug for ContentDigest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ContentDigest({})", &self.to_hex()[..16])
	}
}

/// Digest of the file at `path` using the default buffer size
pub fn digest(path: &Path) -> Result<ContentDigest, SyncError> {
	digest_with_buffer(path, HASH_BUFFER_SIZE)
}

/// Digest of the file at `path`, reading `buf_size` bytes at a time
pub fn digest_with_buffer(path: &Path, buf_size: usize) -> Result<ContentDigest, SyncError> {
	let file = File::open(path).map_err(|e| SyncError::from_io(path, e))?;
	digest_reader(file, buf_size).map_err(|e| SyncError::from_io(path, e))
}

/// Digest everything `reader` yields until end of stream
pub fn digest_reader<R: Read>(mut reader: R, buf_size: usize) -> io::Result<ContentDigest> {
	let mut hasher = blake3::Hasher::new();
	let mut buf = vec![0u8; buf_size.max(1)];

	loop {
		let n = match reader.read(&mut buf) {
			Ok(0) => break,
			Ok(n) => n,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		};
		hasher.update(&buf[..n]);
	}

	Ok(hasher.finalize().into())
}


// vim: ts=4
