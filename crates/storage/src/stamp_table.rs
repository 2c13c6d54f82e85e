//! Stamp interning
//!
//! Committed stamps are interned into dense [`StampSequence`]s. Versions refer
//! to their stamp by sequence, so a stamp shared by thousands of versions
//! (one import, one commit) is stored once.
//!
//! Interning is referentially transparent: the same 5-tuple always yields the
//! same sequence, and any differing field yields a different one.

use chronicle_core::{Error, Nid, Result, Stamp, StampSequence, Status, Timestamp};
use dashmap::DashMap;
use parking_lot::RwLock;

/// Interned table of committed stamps
pub struct StampTable {
    by_stamp: DashMap<Stamp, StampSequence>,
    /// Sequence `n` lives at index `n - 1`
    stamps: RwLock<Vec<Stamp>>,
}

impl StampTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            by_stamp: DashMap::new(),
            stamps: RwLock::new(Vec::new()),
        }
    }

    /// Intern a committed stamp
    ///
    /// # Errors
    ///
    /// `UncommittedStamp` if the stamp's time is the uncommitted sentinel.
    pub fn intern(&self, stamp: Stamp) -> Result<StampSequence> {
        if stamp.is_uncommitted() {
            return Err(Error::UncommittedStamp);
        }
        if let Some(seq) = self.by_stamp.get(&stamp) {
            return Ok(*seq.value());
        }
        // Lock order: `stamps` before any `by_stamp` shard
        let mut stamps = self.stamps.write();
        if let Some(seq) = self.by_stamp.get(&stamp) {
            return Ok(*seq.value());
        }
        stamps.push(stamp);
        let seq = StampSequence::new(stamps.len() as u32);
        self.by_stamp.insert(stamp, seq);
        tracing::debug!(%seq, %stamp, "interned stamp");
        Ok(seq)
    }

    /// Intern a stamp given as its five coordinates
    pub fn intern_parts(
        &self,
        status: Status,
        time: Timestamp,
        author: Nid,
        module: Nid,
        path: Nid,
    ) -> Result<StampSequence> {
        self.intern(Stamp::new(status, time, author, module, path))
    }

    /// Resolve a sequence back to its stamp
    pub fn stamp(&self, seq: StampSequence) -> Result<Stamp> {
        let index = (seq.as_u32() as usize)
            .checked_sub(1)
            .ok_or(Error::UnknownStampSequence(seq))?;
        self.stamps
            .read()
            .get(index)
            .copied()
            .ok_or(Error::UnknownStampSequence(seq))
    }

    /// Sequence of an already interned stamp, without interning
    pub fn lookup(&self, stamp: &Stamp) -> Option<StampSequence> {
        self.by_stamp.get(stamp).map(|e| *e.value())
    }

    /// Every interned (sequence, stamp) pair in sequence order
    pub fn entries(&self) -> Vec<(StampSequence, Stamp)> {
        self.stamps
            .read()
            .iter()
            .enumerate()
            .map(|(i, stamp)| (StampSequence::new(i as u32 + 1), *stamp))
            .collect()
    }

    /// Re-install rows read back from a stamp table record
    ///
    /// Rows must continue the dense numbering. Rows already present with the
    /// same tuple are accepted; a sequence bound to a different tuple is a
    /// corruption.
    pub fn restore(&self, rows: &[(StampSequence, Stamp)]) -> Result<()> {
        let mut stamps = self.stamps.write();
        for (seq, stamp) in rows {
            let index = (seq.as_u32() as usize)
                .checked_sub(1)
                .ok_or(Error::UnknownStampSequence(*seq))?;
            match stamps.get(index) {
                Some(existing) if existing == stamp => continue,
                Some(existing) => {
                    return Err(Error::Corruption(format!(
                        "{} is bound to {} but record says {}",
                        seq, existing, stamp
                    )))
                }
                None if index == stamps.len() => {
                    if stamp.is_uncommitted() {
                        return Err(Error::UncommittedStamp);
                    }
                    stamps.push(*stamp);
                    self.by_stamp.insert(*stamp, *seq);
                }
                None => {
                    return Err(Error::Corruption(format!(
                        "stamp table gap: expected sequence {}, got {}",
                        stamps.len() + 1,
                        seq
                    )))
                }
            }
        }
        Ok(())
    }

    /// Number of interned stamps
    pub fn len(&self) -> usize {
        self.stamps.read().len()
    }

    /// Check if nothing was interned
    pub fn is_empty(&self) -> bool {
        self.stamps.read().is_empty()
    }

    /// Forget every interned stamp
    pub fn reset(&self) {
        let mut stamps = self.stamps.write();
        self.by_stamp.clear();
        stamps.clear();
    }
}

impl Default for StampTable {
    fn default() -> Self {
        Self::new()
    }
}
