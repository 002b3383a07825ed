//! Fixed-size tensor arena.
//!
//! One contiguous buffer reserved once at setup and never resized.  Tensor
//! and scratch regions are carved from it with a bump pointer during the
//! single allocation pass; nothing is ever freed individually.
//!
//! ```text
//!  base (16-aligned)
//!   │
//!   ▼
//!  ┌──────────┬───────────┬────────────────────┬──────────────┐
//!  │ input    │ output    │ scratch            │   unused     │
//!  └──────────┴───────────┴────────────────────┴──────────────┘
//!                                               ▲
//!                                              head
//! ```

use core::fmt;
use core::ops::Range;

/// Region alignment, matching the TFLM buffer alignment.
pub const ARENA_ALIGNMENT: usize = 16;

/// A carved region, as a byte range into the arena buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
}

impl Region {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Returned when a request does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaFull {
    pub requested: usize,
    pub available: usize,
}

impl fmt::Display for ArenaFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arena full: requested {} bytes, {} available",
            self.requested, self.available
        )
    }
}

/// Bump-allocated tensor arena.
pub struct TensorArena {
    buf: Box<[u8]>,
    /// First 16-aligned offset in `buf`.
    base: usize,
    /// Next free offset.
    head: usize,
}

impl TensorArena {
    /// Reserve `size` bytes.  This is the arena's only allocation.
    pub fn new(size: usize) -> Self {
        let buf = vec![0u8; size].into_boxed_slice();
        let misalign = buf.as_ptr() as usize % ARENA_ALIGNMENT;
        let base = if misalign == 0 {
            0
        } else {
            (ARENA_ALIGNMENT - misalign).min(size)
        };
        Self {
            buf,
            base,
            head: base,
        }
    }

    /// Usable bytes after base alignment.
    pub fn capacity(&self) -> usize {
        self.buf.len() - self.base
    }

    /// Bytes consumed by carved regions, including alignment padding.
    pub fn used(&self) -> usize {
        self.head - self.base
    }

    pub fn available(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Carve `len` bytes at the next aligned offset.  An empty region
    /// sits at the head and consumes no padding.
    pub fn carve(&mut self, len: usize) -> Result<Region, ArenaFull> {
        match carve_end(self.used(), len).filter(|&end| end <= self.capacity()) {
            Some(end) => {
                let offset = self.base + (end - len);
                self.head = self.base + end;
                Ok(Region { offset, len })
            }
            None => Err(ArenaFull {
                requested: len,
                available: self.available(),
            }),
        }
    }

    /// What [`used`](Self::used) would read after carving `lens` in order,
    /// padding included.  `None` if the total overflows `usize`.
    pub fn footprint(&self, lens: &[usize]) -> Option<usize> {
        lens.iter().try_fold(self.used(), |used, &len| carve_end(used, len))
    }

    pub fn slice(&self, region: Region) -> &[u8] {
        &self.buf[region.range()]
    }

    pub fn slice_mut(&mut self, region: Region) -> &mut [u8] {
        &mut self.buf[region.range()]
    }

    /// Borrow three carved regions at once.
    ///
    /// Regions must be in carve order (`a` before `b` before `c`), which the
    /// bump allocator guarantees for regions carved in that sequence.
    pub fn split3_mut(
        &mut self,
        a: Region,
        b: Region,
        c: Region,
    ) -> (&mut [u8], &mut [u8], &mut [u8]) {
        assert!(
            a.end() <= b.offset && b.end() <= c.offset,
            "regions out of carve order"
        );
        let (head, rest) = self.buf.split_at_mut(b.offset);
        let (mid, tail) = rest.split_at_mut(c.offset - b.offset);
        (
            &mut head[a.range()],
            &mut mid[..b.len],
            &mut tail[..c.len],
        )
    }
}

impl fmt::Debug for TensorArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorArena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish()
    }
}

/// End offset (relative to base) of a `len`-byte region carved after
/// `used` bytes.
fn carve_end(used: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return Some(used);
    }
    used.checked_next_multiple_of(ARENA_ALIGNMENT)?.checked_add(len)
}

/// View raw arena bytes as signed 8-bit samples.
pub fn as_i8(bytes: &[u8]) -> &[i8] {
    // SAFETY: u8 and i8 have identical size, alignment and validity.
    unsafe { core::slice::from_raw_parts(bytes.as_ptr().cast::<i8>(), bytes.len()) }
}

/// Mutable variant of [`as_i8`].
pub fn as_i8_mut(bytes: &mut [u8]) -> &mut [i8] {
    // SAFETY: u8 and i8 have identical size, alignment and validity; the
    // exclusive borrow is carried over to the returned slice.
    unsafe { core::slice::from_raw_parts_mut(bytes.as_mut_ptr().cast::<i8>(), bytes.len()) }
}
