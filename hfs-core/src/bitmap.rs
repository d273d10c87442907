//! Allocation bitmap: one bit per allocation block, big-endian within each
//! byte (bit 7 of byte 0 is block 0), tracking which blocks are in use.

/// An in-memory allocation bitmap covering `total_blocks` blocks.
#[derive(Debug, Clone)]
pub struct AllocationBitmap {
    bits: Vec<u8>,
    total_blocks: u32,
}

impl AllocationBitmap {
    /// Build an all-free bitmap sized for `total_blocks`.
    pub fn new(total_blocks: u32) -> Self {
        let bytes = total_blocks.div_ceil(8) as usize;
        AllocationBitmap { bits: vec![0u8; bytes], total_blocks }
    }

    /// Wrap an existing bitmap read off disk.
    pub fn from_bytes(bits: Vec<u8>, total_blocks: u32) -> Self {
        AllocationBitmap { bits, total_blocks }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn total_blocks(&self) -> u32 {
        self.total_blocks
    }

    pub fn is_allocated(&self, block: u32) -> bool {
        if block >= self.total_blocks {
            return false;
        }
        let byte = block as usize / 8;
        let bit = 7 - (block % 8);
        self.bits.get(byte).map(|b| (b >> bit) & 1 == 1).unwrap_or(false)
    }

    pub fn set_allocated(&mut self, block: u32, allocated: bool) {
        if block >= self.total_blocks {
            return;
        }
        let byte = block as usize / 8;
        let bit = 7 - (block % 8);
        if allocated {
            self.bits[byte] |= 1 << bit;
        } else {
            self.bits[byte] &= !(1 << bit);
        }
    }

    /// Mark a contiguous run `[start, start + count)` as allocated or free.
    pub fn set_range(&mut self, start: u32, count: u32, allocated: bool) {
        for b in start..start + count {
            self.set_allocated(b, allocated);
        }
    }

    /// Count of blocks currently marked allocated.
    pub fn count_allocated(&self) -> u64 {
        let mut count = 0u64;
        for b in 0..self.total_blocks {
            if self.is_allocated(b) {
                count += 1;
            }
        }
        count
    }

    /// Find the first run of `count` consecutive free blocks at or after
    /// `start_hint`, wrapping around to the beginning once if necessary.
    /// Mirrors the "next-fit from drAllocPtr" allocator classic HFS and
    /// HFS+ both use for first-fit allocation.
    pub fn find_free_run(&self, count: u32, start_hint: u32) -> Option<u32> {
        if count == 0 || count > self.total_blocks {
            return None;
        }
        let scan_from = |from: u32, to: u32| -> Option<u32> {
            let mut run_start = None;
            let mut run_len = 0u32;
            for b in from..to {
                if !self.is_allocated(b) {
                    if run_start.is_none() {
                        run_start = Some(b);
                    }
                    run_len += 1;
                    if run_len == count {
                        return run_start;
                    }
                } else {
                    run_start = None;
                    run_len = 0;
                }
            }
            None
        };
        scan_from(start_hint, self.total_blocks).or_else(|| scan_from(0, start_hint))
    }
}

/// Compute the size in bytes of the allocation bitmap for `total_blocks`.
pub fn bitmap_byte_size(total_blocks: u32) -> u32 {
    total_blocks.div_ceil(8)
}

/// Cross-check a bitmap's set-bit count against the volume header's
/// `total_blocks - free_blocks`. Returns `Some((counted, expected))` on
/// disagreement, `None` when they match.
pub fn count_mismatch(bitmap: &AllocationBitmap, total_blocks: u64, free_blocks: u64) -> Option<(u64, u64)> {
    let counted = bitmap.count_allocated();
    let expected = total_blocks.saturating_sub(free_blocks);
    if counted == expected {
        None
    } else {
        Some((counted, expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_bitmap_is_all_free() {
        let bm = AllocationBitmap::new(100);
        assert_eq!(bm.count_allocated(), 0);
        assert!(!bm.is_allocated(50));
    }

    #[test]
    fn set_range_marks_and_counts() {
        let mut bm = AllocationBitmap::new(100);
        bm.set_range(10, 5, true);
        assert_eq!(bm.count_allocated(), 5);
        assert!(bm.is_allocated(10));
        assert!(bm.is_allocated(14));
        assert!(!bm.is_allocated(15));
    }

    #[test]
    fn find_free_run_finds_gap() {
        let mut bm = AllocationBitmap::new(20);
        bm.set_range(0, 10, true);
        let found = bm.find_free_run(5, 0).unwrap();
        assert_eq!(found, 10);
    }

    #[test]
    fn find_free_run_wraps_around() {
        let mut bm = AllocationBitmap::new(20);
        bm.set_range(5, 15, true);
        let found = bm.find_free_run(3, 10).unwrap();
        assert_eq!(found, 0);
    }

    #[test]
    fn find_free_run_none_when_full() {
        let mut bm = AllocationBitmap::new(10);
        bm.set_range(0, 10, true);
        assert!(bm.find_free_run(1, 0).is_none());
    }

    #[test]
    fn bitmap_byte_size_rounds_up() {
        assert_eq!(bitmap_byte_size(1), 1);
        assert_eq!(bitmap_byte_size(8), 1);
        assert_eq!(bitmap_byte_size(9), 2);
    }
}
