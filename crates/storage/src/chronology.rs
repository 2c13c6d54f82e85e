//! Chronologies: the append-only version history of one component
//!
//! A [`Chronology`] owns every [`Version`] ever created for its component.
//! Committed versions are kept in commit order (oldest first); versions are
//! never edited or removed once committed. Drafts live in separate slots
//! until they are committed, at which point they are appended to the
//! committed sequence.
//!
//! # Ordering
//!
//! Commit times on one chronology are non-decreasing in stored order. An
//! append that would place a committed version before an earlier one is
//! rejected with `TimeRegression`.

use crate::codec::BrittleTuple;
use chronicle_core::{ComponentKind, Error, Nid, Result, Stamp, StampSequence, Timestamp};

/// Type-specific content of a version
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Concept versions carry no fields of their own
    Concept,
    /// Structured semantic versions carry a brittle field tuple
    Fields(BrittleTuple),
}

impl Payload {
    /// Field tuple of a semantic payload
    pub fn fields(&self) -> Option<&BrittleTuple> {
        match self {
            Payload::Concept => None,
            Payload::Fields(tuple) => Some(tuple),
        }
    }

    /// Encoded payload bytes (empty for concepts)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Concept => &[],
            Payload::Fields(tuple) => tuple.as_bytes(),
        }
    }
}

/// Immutable snapshot of a component at one stamp
#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    stamp: Stamp,
    stamp_sequence: Option<StampSequence>,
    payload: Payload,
}

impl Version {
    pub(crate) fn draft(stamp: Stamp, payload: Payload) -> Self {
        Self {
            stamp,
            stamp_sequence: None,
            payload,
        }
    }

    pub(crate) fn committed(stamp: Stamp, seq: StampSequence, payload: Payload) -> Self {
        Self {
            stamp,
            stamp_sequence: Some(seq),
            payload,
        }
    }

    /// The version's stamp
    #[inline]
    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    /// Interned stamp sequence (`None` while uncommitted)
    #[inline]
    pub fn stamp_sequence(&self) -> Option<StampSequence> {
        self.stamp_sequence
    }

    /// Commit time (`UNCOMMITTED` for drafts)
    #[inline]
    pub fn time(&self) -> Timestamp {
        self.stamp.time
    }

    /// Check if the version has been committed
    #[inline]
    pub fn is_committed(&self) -> bool {
        self.stamp_sequence.is_some()
    }

    /// Type-specific content
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Field tuple, for semantic versions
    pub fn fields(&self) -> Option<&BrittleTuple> {
        self.payload.fields()
    }
}

/// Address of a version slot within a chronology
///
/// Every append occupies one slot. Committing the slot's draft moves the
/// version into the committed sequence; the slot remembers the sequence it
/// was committed under so a second commit is reported as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionHandle {
    /// Component the version belongs to
    pub nid: Nid,
    /// Slot within the component's chronology
    pub slot: u32,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Pending(Version),
    Committed(StampSequence),
}

/// Ordered version history of one component
#[derive(Debug, Clone, PartialEq)]
pub struct Chronology {
    nid: Nid,
    kind: ComponentKind,
    assemblage: Option<Nid>,
    referenced: Option<Nid>,
    /// Committed versions in commit order
    versions: Vec<Version>,
    slots: Vec<Slot>,
}

impl Chronology {
    /// Create an empty concept chronology
    pub fn concept(nid: Nid) -> Self {
        Self {
            nid,
            kind: ComponentKind::Concept,
            assemblage: None,
            referenced: None,
            versions: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Create an empty semantic chronology
    pub fn semantic(nid: Nid, assemblage: Nid, referenced: Nid) -> Self {
        Self {
            nid,
            kind: ComponentKind::Semantic,
            assemblage: Some(assemblage),
            referenced: Some(referenced),
            versions: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Component this chronology belongs to
    #[inline]
    pub fn nid(&self) -> Nid {
        self.nid
    }

    /// Kind of the component
    #[inline]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Assemblage of a semantic chronology
    #[inline]
    pub fn assemblage(&self) -> Option<Nid> {
        self.assemblage
    }

    /// Component a semantic is about
    #[inline]
    pub fn referenced_component(&self) -> Option<Nid> {
        self.referenced
    }

    /// Committed versions, oldest first
    pub fn committed(&self) -> &[Version] {
        &self.versions
    }

    /// Drafts not yet committed, in append order
    pub fn pending(&self) -> impl Iterator<Item = &Version> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Pending(v) => Some(v),
            Slot::Committed(_) => None,
        })
    }

    /// Every version: committed ones in commit order, then pending drafts
    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter().chain(self.pending())
    }

    /// Time of the newest committed version
    pub fn latest_committed_time(&self) -> Option<Timestamp> {
        self.versions.last().map(Version::time)
    }

    /// Number of committed versions
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Check if nothing was committed yet
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Check that a commit at `time` keeps commit order
    pub(crate) fn check_order(&self, time: Timestamp) -> Result<()> {
        match self.latest_committed_time() {
            Some(last) if time < last => Err(Error::TimeRegression {
                nid: self.nid,
                last,
                attempted: time,
            }),
            _ => Ok(()),
        }
    }

    /// Append a version that arrives already committed
    pub(crate) fn append_committed(&mut self, version: Version) -> Result<u32> {
        debug_assert!(version.is_committed());
        self.check_order(version.time())?;
        let seq = version
            .stamp_sequence()
            .ok_or_else(|| Error::InvalidOperation("version has no stamp sequence".into()))?;
        self.versions.push(version);
        self.slots.push(Slot::Committed(seq));
        Ok(self.slots.len() as u32 - 1)
    }

    /// Append a draft, returning its slot
    pub(crate) fn append_draft(&mut self, version: Version) -> u32 {
        debug_assert!(!version.is_committed());
        self.slots.push(Slot::Pending(version));
        self.slots.len() as u32 - 1
    }

    /// Draft at `slot`, failing if it was already committed
    pub fn draft(&self, slot: u32) -> Result<&Version> {
        match self.slots.get(slot as usize) {
            Some(Slot::Pending(v)) => Ok(v),
            Some(Slot::Committed(stamp)) => Err(Error::AlreadyCommitted {
                nid: self.nid,
                stamp: *stamp,
            }),
            None => Err(Error::UnknownVersion {
                nid: self.nid,
                draft: slot,
            }),
        }
    }

    /// Replace the payload of a pending draft in place
    pub(crate) fn replace_draft_payload(&mut self, slot: u32, payload: Payload) -> Result<()> {
        self.draft(slot)?;
        if let Some(Slot::Pending(v)) = self.slots.get_mut(slot as usize) {
            v.payload = payload;
        }
        Ok(())
    }

    /// Check that the draft at `slot` may be committed at `time`
    pub(crate) fn check_commit(&self, slot: u32, time: Timestamp) -> Result<&Version> {
        let draft = self.draft(slot)?;
        self.check_order(time)?;
        Ok(draft)
    }

    /// Move the draft at `slot` into the committed sequence
    ///
    /// Callers run [`Chronology::check_commit`] first, under the same lock.
    pub(crate) fn commit_draft(
        &mut self,
        slot: u32,
        stamp: Stamp,
        seq: StampSequence,
    ) -> Result<&Version> {
        self.check_commit(slot, stamp.time)?;
        let entry = self
            .slots
            .get_mut(slot as usize)
            .ok_or(Error::UnknownVersion {
                nid: self.nid,
                draft: slot,
            })?;
        let payload = match std::mem::replace(entry, Slot::Committed(seq)) {
            Slot::Pending(v) => v.payload,
            Slot::Committed(earlier) => {
                *entry = Slot::Committed(earlier);
                return Err(Error::AlreadyCommitted {
                    nid: self.nid,
                    stamp: earlier,
                });
            }
        };
        self.versions.push(Version::committed(stamp, seq, payload));
        Ok(&self.versions[self.versions.len() - 1])
    }
}
