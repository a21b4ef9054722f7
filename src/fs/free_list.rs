//! bounded LIFO stacks of reusable block and inode ids

use bitvec::prelude::*;

use super::{FsError, Result};

/// a bounded stack of free ids in `first..end`
///
/// next to the stack, a bitmap remembers which ids are currently free,
/// so a release of an id that is already free or outside the range
/// is rejected instead of corrupting the stack
#[derive(Debug, Clone)]
pub struct FreeList {
    /// "block" or "inode", used in errors
    kind: &'static str,
    first: u16,
    stack: Vec<u16>,
    free_bitmap: BitVec<u8, Lsb0>,
}

impl FreeList {
    /// a list holding every id of `first..end`, lowest id popped first
    pub fn full(kind: &'static str, first: u16, end: u16) -> Self {
        Self::from_free_ids(kind, first, end, first..end)
    }

    /// a list over `first..end` holding exactly `free_ids`, lowest id popped first
    pub fn from_free_ids<I>(kind: &'static str, first: u16, end: u16, free_ids: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let capacity = end.saturating_sub(first) as usize;
        let mut list = FreeList {
            kind,
            first,
            stack: Vec::with_capacity(capacity),
            free_bitmap: bitvec![u8, Lsb0; 0; capacity],
        };
        let mut ids: Vec<u16> = free_ids
            .into_iter()
            .filter(|id| (first..end).contains(id))
            .collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.dedup();
        for id in ids {
            list.free_bitmap.set((id - first) as usize, true);
            list.stack.push(id);
        }
        list
    }

    /// take the most recently released id
    pub fn pop(&mut self) -> Option<u16> {
        let id = self.stack.pop()?;
        self.free_bitmap.set((id - self.first) as usize, false);
        Some(id)
    }

    /// release an id so the next `pop` returns it
    pub fn push(&mut self, id: u16) -> Result<()> {
        let invalid = FsError::InvalidId {
            kind: self.kind,
            id,
        };
        let Some(index) = id.checked_sub(self.first).map(usize::from) else {
            return Err(invalid);
        };
        if index >= self.capacity() || self.free_bitmap[index] || self.stack.len() == self.capacity()
        {
            return Err(invalid);
        }
        self.free_bitmap.set(index, true);
        self.stack.push(id);
        Ok(())
    }

    /// number of ids available
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// number of ids the list manages
    pub fn capacity(&self) -> usize {
        self.free_bitmap.len()
    }

    pub fn is_free(&self, id: u16) -> bool {
        id.checked_sub(self.first)
            .and_then(|index| self.free_bitmap.get(index as usize).as_deref().copied())
            .unwrap_or(false)
    }
}
