//! Reuse pools for the scratch objects used while reading and writing frames
//!
//! A tag can hold hundreds of small frames, every one of them needs a bounded reader and
//! a buffer while parsing, or a buffered writer while writing. These are borrowed from
//! process wide pools instead of being allocated per frame.
//!
//! Borrowing hands out a [`Pooled`] guard. The object goes back to its pool when the guard
//! is dropped, so it is returned on every exit path, including `?` and panics.

use crate::util::text_utils::{encode_text, TextEncoding};

use std::io::{self, Read, Write};
use std::ops::{Deref, DerefMut};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// How many idle objects each pool keeps around
const MAX_IDLE: usize = 32;
/// Buffers that grew past this are dropped instead of returned
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;
/// Size of the fixed chunk used to skip over unwanted bytes
const DISCARD_CHUNK: usize = 4 * 1024;

static BYTE_BUFFERS: Lazy<Pool<ByteBuffer>> = Lazy::new(|| Pool::new(MAX_IDLE));
static LIMITED_READERS: Lazy<Pool<LimitedReader>> = Lazy::new(|| Pool::new(MAX_IDLE));
static FRAME_WRITERS: Lazy<Pool<FrameWriter>> = Lazy::new(|| Pool::new(MAX_IDLE));

/// Borrow a cleared byte buffer
pub fn byte_buffer() -> Pooled<'static, ByteBuffer> {
	BYTE_BUFFERS.get()
}

/// Borrow a reader that reports end-of-stream after `limit` bytes
pub fn limited_reader(limit: u64) -> Pooled<'static, LimitedReader> {
	let mut reader = LIMITED_READERS.get();
	reader.set_limit(limit);
	reader
}

/// Borrow an empty frame writer
pub fn frame_writer() -> Pooled<'static, FrameWriter> {
	FRAME_WRITERS.get()
}

/// An object that can be handed out by a [`Pool`]
pub trait Reusable: Default {
	/// Clear any state left behind by the previous borrower
	fn reset(&mut self);

	/// Whether the object is still worth keeping once it is returned
	fn is_reusable(&self) -> bool {
		true
	}
}

/// A thread-safe pool of reusable objects
pub struct Pool<T> {
	idle: Mutex<Vec<T>>,
	max_idle: usize,
}

impl<T: Reusable> Pool<T> {
	/// Create a pool keeping at most `max_idle` returned objects
	pub fn new(max_idle: usize) -> Self {
		Self {
			idle: Mutex::new(Vec::with_capacity(max_idle)),
			max_idle,
		}
	}

	/// Take an object out of the pool, or create a new one if none is idle
	pub fn get(&self) -> Pooled<'_, T> {
		let item = self.idle.lock().pop().unwrap_or_default();

		Pooled { item, pool: self }
	}

	/// The number of objects waiting to be borrowed
	pub fn idle(&self) -> usize {
		self.idle.lock().len()
	}

	fn put(&self, mut item: T) {
		if !item.is_reusable() {
			return;
		}

		item.reset();

		let mut idle = self.idle.lock();
		if idle.len() < self.max_idle {
			idle.push(item);
		}
	}
}

/// Exclusive access to a pooled object, which is returned on drop
pub struct Pooled<'a, T: Reusable> {
	item: T,
	pool: &'a Pool<T>,
}

impl<T: Reusable> Deref for Pooled<'_, T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		&self.item
	}
}

impl<T: Reusable> DerefMut for Pooled<'_, T> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.item
	}
}

impl<T: Reusable> Drop for Pooled<'_, T> {
	fn drop(&mut self) {
		self.pool.put(std::mem::take(&mut self.item));
	}
}

/// A growable byte buffer
#[derive(Default, Debug)]
pub struct ByteBuffer(Vec<u8>);

impl Reusable for ByteBuffer {
	fn reset(&mut self) {
		self.0.clear();
	}

	fn is_reusable(&self) -> bool {
		self.0.capacity() <= MAX_RETAINED_CAPACITY
	}
}

impl Deref for ByteBuffer {
	type Target = Vec<u8>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for ByteBuffer {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

/// Bounds any byte source to a fixed number of bytes
///
/// The reader itself holds no source, it is bound to one with [`LimitedReader::bind`].
/// Once `limit` bytes went through, the bound reader reports end-of-stream no matter how
/// much the source still has.
#[derive(Default, Debug)]
pub struct LimitedReader {
	remaining: u64,
	exhausted: bool,
	scratch: Vec<u8>,
}

impl Reusable for LimitedReader {
	fn reset(&mut self) {
		self.remaining = 0;
		self.exhausted = false;
	}
}

impl LimitedReader {
	/// Start a new limit, forgetting about any previous source
	pub fn set_limit(&mut self, limit: u64) {
		self.remaining = limit;
		self.exhausted = false;
	}

	/// Bytes that can still be read before the limit is reached
	pub fn remaining(&self) -> u64 {
		self.remaining
	}

	/// Whether the source ran dry before the limit was reached
	pub fn source_exhausted(&self) -> bool {
		self.exhausted
	}

	/// Bind the limit to `inner`
	pub fn bind<'a, R>(&'a mut self, inner: &'a mut R) -> Bounded<'a, R>
	where
		R: Read + ?Sized,
	{
		Bounded {
			limit: self,
			inner,
		}
	}

	/// Read everything up to the limit into `out`, returning the number of bytes read
	///
	/// Stopping early because the source ended is not an error,
	/// see [`LimitedReader::source_exhausted`].
	pub fn read_to_end<R>(&mut self, inner: &mut R, out: &mut Vec<u8>) -> io::Result<usize>
	where
		R: Read + ?Sized,
	{
		// The limit comes from untrusted size fields, grow with what is actually there
		let hint = usize::try_from(self.remaining)
			.map_or(MAX_RETAINED_CAPACITY, |remaining| remaining.min(MAX_RETAINED_CAPACITY));
		out.reserve(hint);

		self.bind(inner).read_to_end(out)
	}

	/// Skip everything up to the limit, returning the number of bytes skipped
	///
	/// Only a fixed size chunk is used, regardless of the limit.
	pub fn discard<R>(&mut self, inner: &mut R) -> io::Result<u64>
	where
		R: Read + ?Sized,
	{
		let mut scratch = std::mem::take(&mut self.scratch);
		scratch.resize(DISCARD_CHUNK, 0);

		let mut skipped = 0;
		let result = loop {
			match self.bind(inner).read(&mut scratch) {
				Ok(0) => break Ok(skipped),
				Ok(n) => skipped += n as u64,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
				Err(e) => break Err(e),
			}
		};

		self.scratch = scratch;
		result
	}
}

/// A [`LimitedReader`] bound to a source
pub struct Bounded<'a, R: ?Sized> {
	limit: &'a mut LimitedReader,
	inner: &'a mut R,
}

impl<R: Read + ?Sized> Read for Bounded<'_, R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.limit.remaining == 0 || buf.is_empty() {
			return Ok(0);
		}

		let max = usize::try_from(self.limit.remaining).map_or(buf.len(), |r| r.min(buf.len()));
		let n = self.inner.read(&mut buf[..max])?;

		if n == 0 {
			self.limit.exhausted = true;
		}

		self.limit.remaining -= n as u64;
		Ok(n)
	}
}

/// A buffered writer that keeps count of the bytes handed to it
///
/// Frames serialize into the buffer, which is pushed to the sink with [`FrameWriter::flush_to`].
#[derive(Default, Debug)]
pub struct FrameWriter {
	buf: Vec<u8>,
	written: u64,
}

impl Reusable for FrameWriter {
	fn reset(&mut self) {
		self.buf.clear();
		self.written = 0;
	}

	fn is_reusable(&self) -> bool {
		self.buf.capacity() <= MAX_RETAINED_CAPACITY
	}
}

impl FrameWriter {
	/// Total number of bytes written, buffered or not
	pub fn written(&self) -> u64 {
		self.written
	}

	/// Number of bytes waiting to be flushed
	pub fn buffered(&self) -> usize {
		self.buf.len()
	}

	pub fn write_u8(&mut self, byte: u8) {
		self.buf.push(byte);
		self.written += 1;
	}

	pub fn write_bytes(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
		self.written += bytes.len() as u64;
	}

	/// Encode `text`, without a terminator
	pub fn write_text(&mut self, text: &str, encoding: TextEncoding) {
		let before = self.buf.len();
		encode_text(text, encoding, &mut self.buf);
		self.written += (self.buf.len() - before) as u64;
	}

	pub fn write_terminator(&mut self, encoding: TextEncoding) {
		self.write_bytes(encoding.terminator());
	}

	/// Push the buffered bytes to `sink`
	pub fn flush_to<W>(&mut self, sink: &mut W) -> io::Result<()>
	where
		W: Write + ?Sized,
	{
		sink.write_all(&self.buf)?;
		self.buf.clear();
		sink.flush()
	}
}

impl Write for FrameWriter {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.write_bytes(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{ByteBuffer, FrameWriter, LimitedReader, Pool, Reusable, MAX_RETAINED_CAPACITY};
	use crate::util::text_utils::TextEncoding;
	use pretty_assertions::assert_eq;
	use std::io::Read;
	use std::sync::Arc;

	#[test]
	fn returned_objects_are_reset_and_reused() {
		let pool = Pool::<ByteBuffer>::new(4);

		{
			let mut buf = pool.get();
			buf.extend_from_slice(b"some frame body");
		}

		assert_eq!(pool.idle(), 1);

		let buf = pool.get();
		assert!(buf.is_empty());
		assert!(buf.capacity() >= 15);
		assert_eq!(pool.idle(), 0);
	}

	#[test]
	fn returned_on_error_paths() {
		fn fails(pool: &Pool<ByteBuffer>) -> std::io::Result<()> {
			let mut buf = pool.get();
			buf.push(1);
			Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
		}

		let pool = Pool::<ByteBuffer>::new(4);
		assert!(fails(&pool).is_err());
		assert_eq!(pool.idle(), 1);
	}

	#[test]
	fn idle_count_is_bounded() {
		let pool = Pool::<ByteBuffer>::new(2);

		let borrowed = (0..5).map(|_| pool.get()).collect::<Vec<_>>();
		drop(borrowed);

		assert_eq!(pool.idle(), 2);
	}

	#[test]
	fn oversized_buffers_are_dropped() {
		let pool = Pool::<ByteBuffer>::new(2);

		{
			let mut buf = pool.get();
			buf.reserve(MAX_RETAINED_CAPACITY * 2);
		}

		assert_eq!(pool.idle(), 0);
	}

	#[test]
	fn shared_between_threads() {
		let pool = Arc::new(Pool::<FrameWriter>::new(8));

		let handles = (0..8)
			.map(|i| {
				let pool = Arc::clone(&pool);
				std::thread::spawn(move || {
					for _ in 0..100 {
						let mut writer = pool.get();
						assert_eq!(writer.written(), 0);
						writer.write_text(&format!("thread {i}"), TextEncoding::UTF8);
						assert_eq!(writer.written(), 8);
					}
				})
			})
			.collect::<Vec<_>>();

		for handle in handles {
			handle.join().unwrap();
		}

		assert!(pool.idle() <= 8);
	}

	#[test]
	fn limited_reader_stops_at_limit() {
		let source = b"0123456789";
		let mut source = &source[..];

		let mut reader = LimitedReader::default();
		reader.set_limit(4);

		let mut out = Vec::new();
		assert_eq!(reader.read_to_end(&mut source, &mut out).unwrap(), 4);
		assert_eq!(out, b"0123");
		assert!(!reader.source_exhausted());

		// The rest of the source is untouched
		assert_eq!(source, b"456789");
	}

	#[test]
	fn limited_reader_reports_short_source() {
		let mut source = &b"abc"[..];

		let mut reader = LimitedReader::default();
		reader.set_limit(10);

		let mut out = Vec::new();
		assert_eq!(reader.read_to_end(&mut source, &mut out).unwrap(), 3);
		assert!(reader.source_exhausted());
		assert_eq!(reader.remaining(), 7);

		reader.reset();
		assert!(!reader.source_exhausted());
	}

	#[test]
	fn discard_skips_exactly_the_limit() {
		let data = (0..=255_u8).cycle().take(10_000).collect::<Vec<_>>();
		let mut source = &data[..];

		let mut reader = LimitedReader::default();
		reader.set_limit(9_000);

		assert_eq!(reader.discard(&mut source).unwrap(), 9_000);
		assert_eq!(source.len(), 1_000);
		assert_eq!(reader.scratch.len(), super::DISCARD_CHUNK);

		let mut rest = Vec::new();
		source.read_to_end(&mut rest).unwrap();
		assert_eq!(rest[0], (9_000 % 256) as u8);
	}

	#[test]
	fn frame_writer_counts_across_flushes() {
		let mut writer = FrameWriter::default();
		writer.write_u8(3);
		writer.write_text("abc", TextEncoding::UTF8);
		writer.write_terminator(TextEncoding::UTF16);

		assert_eq!(writer.written(), 6);

		let mut sink = Vec::new();
		writer.flush_to(&mut sink).unwrap();
		assert_eq!(sink, [3, b'a', b'b', b'c', 0, 0]);
		assert_eq!(writer.buffered(), 0);

		// Flushing keeps the running total
		writer.write_bytes(b"more");
		assert_eq!(writer.written(), 10);
		assert_eq!(writer.buffered(), 4);
	}
}
