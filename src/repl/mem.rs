use crate::repl::{ReplError, Result};

/// Half-open readable address range in the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemSpan {
	/// First readable address.
	pub base: usize,
	/// Length in bytes.
	pub len: usize,
}

impl MemSpan {
	/// Span covering one live host value.
	pub fn of<T>(value: &T) -> Self {
		Self {
			base: std::ptr::from_ref(value) as usize,
			len: size_of::<T>(),
		}
	}

	/// Span covering a live byte buffer.
	pub fn of_bytes(bytes: &[u8]) -> Self {
		Self {
			base: bytes.as_ptr() as usize,
			len: bytes.len(),
		}
	}

	/// Exclusive end address.
	pub fn end(&self) -> usize {
		self.base.saturating_add(self.len)
	}

	/// Whether `[addr, addr+len)` lies fully inside this span.
	pub fn contains(&self, addr: usize, len: usize) -> bool {
		let Some(end) = addr.checked_add(len) else { return false };
		addr >= self.base && end <= self.end()
	}
}

/// Bounds-checked view over the address ranges a session may read.
///
/// Every raw read in the crate goes through [`MemView::read`]; an access that
/// is not fully inside one registered span is rejected as stale instead of
/// touching memory.
#[derive(Debug, Default)]
pub struct MemView {
	spans: Vec<MemSpan>,
}

impl MemView {
	/// Build a view from the given spans.
	pub fn new(mut spans: Vec<MemSpan>) -> Self {
		spans.sort_by_key(|span| span.base);
		Self { spans }
	}

	/// Read `len` bytes at `addr`, rejecting addresses outside every span.
	pub fn read(&self, addr: usize, len: usize) -> Result<&[u8]> {
		// Spans may nest: backing storage lives inside the loaded module's
		// image. Every span starting at or before `addr` is a candidate.
		let idx = self.spans.partition_point(|span| span.base <= addr);
		if !self.spans[..idx].iter().rev().any(|span| span.contains(addr, len)) {
			return Err(ReplError::StaleAddress { addr, len });
		}

		// SAFETY: the span table only contains ranges the session recorded as
		// live (the loaded module image and bound backing allocations), and the
		// access was bounds-checked against one of them above.
		Ok(unsafe { std::slice::from_raw_parts(addr as *const u8, len) })
	}

	/// Read a native-endian pointer-sized word.
	pub fn read_usize(&self, addr: usize) -> Result<usize> {
		let raw = self.read(addr, size_of::<usize>())?;
		let mut buf = [0_u8; size_of::<usize>()];
		buf.copy_from_slice(raw);
		Ok(usize::from_ne_bytes(buf))
	}

	/// Read a native-endian `u16`.
	pub fn read_u16(&self, addr: usize) -> Result<u16> {
		let raw = self.read(addr, 2)?;
		let mut buf = [0_u8; 2];
		buf.copy_from_slice(raw);
		Ok(u16::from_ne_bytes(buf))
	}

	/// Read a native-endian `u32`.
	pub fn read_u32(&self, addr: usize) -> Result<u32> {
		let raw = self.read(addr, 4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_ne_bytes(buf))
	}

	/// Read a native-endian `u64`.
	pub fn read_u64(&self, addr: usize) -> Result<u64> {
		let raw = self.read(addr, 8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_ne_bytes(buf))
	}

	/// Return the registered spans in ascending base order.
	pub fn spans(&self) -> &[MemSpan] {
		&self.spans
	}
}

#[cfg(test)]
mod tests;
