//! Slot layout for heap pages holding fixed-length records.
//!
//! # Layout
//! ```text
//! ┌──────────────────────┬────────┬────────┬─────┬────────┬─────────┐
//! │ occupancy bitmap     │ slot 0 │ slot 1 │ ... │ slot N │ padding │
//! │ ceil(N / 8) bytes    │        │        │     │        │         │
//! └──────────────────────┴────────┴────────┴─────┴────────┴─────────┘
//! ```
//!
//! Bit `i` of the bitmap (least-significant bit first within each byte) is set
//! when slot `i` holds a record. Each record costs `record_size * 8 + 1` bits,
//! so a page fits `page_size * 8 / (record_size * 8 + 1)` slots.

use super::PageData;

/// Slot geometry for one record size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapPageLayout {
    record_size: usize,
    slots: usize,
    header_len: usize,
}

impl HeapPageLayout {
    /// Compute the layout for `record_size`-byte records on `page_size`-byte pages.
    ///
    /// Returns None if `record_size` is 0 or not even one record fits.
    pub fn new(record_size: usize, page_size: usize) -> Option<Self> {
        if record_size == 0 {
            return None;
        }
        let slots = (page_size * 8) / (record_size * 8 + 1);
        if slots == 0 {
            return None;
        }
        Some(Self {
            record_size,
            slots,
            header_len: slots.div_ceil(8),
        })
    }

    /// Bytes per record.
    #[inline]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Slots per page.
    #[inline]
    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn is_used(&self, page: &PageData, slot: usize) -> bool {
        page.as_slice()[slot / 8] & (1 << (slot % 8)) != 0
    }

    fn set_used(&self, page: &mut PageData, slot: usize, used: bool) {
        let byte = &mut page.as_mut_slice()[slot / 8];
        if used {
            *byte |= 1 << (slot % 8);
        } else {
            *byte &= !(1 << (slot % 8));
        }
    }

    /// First free slot, if any.
    pub fn free_slot(&self, page: &PageData) -> Option<usize> {
        (0..self.slots).find(|&slot| !self.is_used(page, slot))
    }

    fn slot_range(&self, slot: usize) -> std::ops::Range<usize> {
        let start = self.header_len + slot * self.record_size;
        start..start + self.record_size
    }

    /// Store `bytes` in `slot` and mark it used.
    pub fn write(&self, page: &mut PageData, slot: usize, bytes: &[u8]) {
        let range = self.slot_range(slot);
        page.as_mut_slice()[range].copy_from_slice(bytes);
        self.set_used(page, slot, true);
    }

    /// Payload of a used slot.
    pub fn read<'a>(&self, page: &'a PageData, slot: usize) -> Option<&'a [u8]> {
        if slot >= self.slots || !self.is_used(page, slot) {
            return None;
        }
        Some(&page.as_slice()[self.slot_range(slot)])
    }

    /// Mark `slot` free and zero its bytes. Returns false if it was already free.
    pub fn clear(&self, page: &mut PageData, slot: usize) -> bool {
        if slot >= self.slots || !self.is_used(page, slot) {
            return false;
        }
        let range = self.slot_range(slot);
        page.as_mut_slice()[range].fill(0);
        self.set_used(page, slot, false);
        true
    }

    /// Every used slot in ascending order.
    pub fn used_slots<'a>(&'a self, page: &'a PageData) -> impl Iterator<Item = usize> + 'a {
        (0..self.slots).filter(move |&slot| self.is_used(page, slot))
    }
}
