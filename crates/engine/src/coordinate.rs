//! Coordinate filters
//!
//! A [`StampFilter`] is the point of view a query resolves from: which
//! statuses are allowed, where on which paths the reader stands, which
//! modules are acceptable (in priority order), and which languages are
//! preferred for descriptions.
//!
//! Filters are immutable values. Build one with [`StampFilter::builder`] and
//! share it freely across threads.

use chronicle_core::{Error, Nid, Result, Status, Timestamp};
use std::fmt;

/// Set of allowed statuses
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusSet(u8);

impl StatusSet {
    /// No status allowed
    pub const fn empty() -> Self {
        StatusSet(0)
    }

    /// Every status allowed
    pub const fn all() -> Self {
        StatusSet(0b1111)
    }

    /// Only `Active`
    pub const fn active() -> Self {
        StatusSet(Status::Active.bit())
    }

    /// This set plus `status`
    #[must_use]
    pub const fn with(self, status: Status) -> Self {
        StatusSet(self.0 | status.bit())
    }

    /// Add a status in place
    pub fn insert(&mut self, status: Status) {
        self.0 |= status.bit();
    }

    /// Check if `status` is allowed
    #[inline]
    pub const fn contains(&self, status: Status) -> bool {
        self.0 & status.bit() != 0
    }

    /// Statuses allowed by either set
    #[must_use]
    pub const fn union(self, other: StatusSet) -> Self {
        StatusSet(self.0 | other.0)
    }

    /// Check if every status of `self` is in `other`
    pub const fn is_subset(&self, other: &StatusSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Check if nothing is allowed
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Allowed statuses in tag order
    pub fn iter(&self) -> impl Iterator<Item = Status> + '_ {
        Status::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<Status> for StatusSet {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        iter.into_iter().fold(StatusSet::empty(), StatusSet::with)
    }
}

impl fmt::Debug for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Where a reader stands on one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StampPosition {
    /// The path
    pub path: Nid,
    /// Newest visible instant on that path
    pub time: Timestamp,
}

impl StampPosition {
    /// Create a position
    pub const fn new(path: Nid, time: Timestamp) -> Self {
        StampPosition { path, time }
    }
}

/// Which modules are acceptable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ModuleFilter {
    /// Every module, none preferred over another
    #[default]
    Any,
    /// Only the listed modules; earlier entries win ties
    Prioritized(Vec<Nid>),
}

impl ModuleFilter {
    /// Check if versions from `module` pass the filter
    pub fn allows(&self, module: Nid) -> bool {
        match self {
            ModuleFilter::Any => true,
            ModuleFilter::Prioritized(modules) => modules.contains(&module),
        }
    }

    /// Rank of `module` (0 is the highest priority)
    ///
    /// Every module ranks 0 under `Any`.
    pub fn priority(&self, module: Nid) -> Option<usize> {
        match self {
            ModuleFilter::Any => Some(0),
            ModuleFilter::Prioritized(modules) => modules.iter().position(|m| *m == module),
        }
    }

    /// Check if the filter expresses a preference between modules
    pub fn is_prioritized(&self) -> bool {
        matches!(self, ModuleFilter::Prioritized(_))
    }
}

/// Immutable point-of-view configuration used to resolve versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampFilter {
    statuses: StatusSet,
    positions: Vec<StampPosition>,
    modules: ModuleFilter,
    languages: Vec<Nid>,
}

impl StampFilter {
    /// Start building a filter
    pub fn builder() -> StampFilterBuilder {
        StampFilterBuilder::default()
    }

    /// Active content, any module, newest state of `path`
    pub fn latest_on(path: Nid) -> Self {
        StampFilter {
            statuses: StatusSet::active(),
            positions: vec![StampPosition::new(path, Timestamp::LATEST)],
            modules: ModuleFilter::Any,
            languages: Vec::new(),
        }
    }

    /// Allowed statuses
    pub fn statuses(&self) -> StatusSet {
        self.statuses
    }

    /// Path positions, one per path
    pub fn positions(&self) -> &[StampPosition] {
        &self.positions
    }

    /// Module filter
    pub fn modules(&self) -> &ModuleFilter {
        &self.modules
    }

    /// Preferred description languages, most preferred first
    pub fn languages(&self) -> &[Nid] {
        &self.languages
    }

    /// Copy of this filter with a different status set
    #[must_use]
    pub fn with_statuses(&self, statuses: StatusSet) -> Self {
        StampFilter {
            statuses,
            ..self.clone()
        }
    }

    /// Copy of this filter with a different module filter
    #[must_use]
    pub fn with_modules(&self, modules: ModuleFilter) -> Self {
        StampFilter {
            modules,
            ..self.clone()
        }
    }
}

/// Builder for [`StampFilter`]
#[derive(Debug, Clone, Default)]
pub struct StampFilterBuilder {
    statuses: StatusSet,
    positions: Vec<StampPosition>,
    modules: Option<Vec<Nid>>,
    languages: Vec<Nid>,
}

impl StampFilterBuilder {
    /// Allow versions with `status`
    pub fn allow_status(mut self, status: Status) -> Self {
        self.statuses.insert(status);
        self
    }

    /// Allow every status in `statuses`
    pub fn allow_statuses(mut self, statuses: StatusSet) -> Self {
        self.statuses = self.statuses.union(statuses);
        self
    }

    /// Stand on `path` at `time`
    pub fn position(mut self, path: Nid, time: Timestamp) -> Self {
        self.positions.push(StampPosition::new(path, time));
        self
    }

    /// Accept `module`, ranked after every module added before it
    pub fn module(mut self, module: Nid) -> Self {
        self.modules.get_or_insert_with(Vec::new).push(module);
        self
    }

    /// Accept every module without preference
    pub fn any_module(mut self) -> Self {
        self.modules = None;
        self
    }

    /// Prefer descriptions in `language`, after earlier languages
    pub fn language(mut self, language: Nid) -> Self {
        self.languages.push(language);
        self
    }

    /// Build the filter
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if no position was given or a path is positioned
    /// twice.
    pub fn build(self) -> Result<StampFilter> {
        if self.positions.is_empty() {
            return Err(Error::InvalidCoordinate(
                "filter needs at least one path position".to_string(),
            ));
        }
        for (i, position) in self.positions.iter().enumerate() {
            if self.positions[..i].iter().any(|p| p.path == position.path) {
                return Err(Error::InvalidCoordinate(format!(
                    "{} positioned twice",
                    position.path
                )));
            }
        }
        Ok(StampFilter {
            statuses: self.statuses,
            positions: self.positions,
            modules: match self.modules {
                Some(modules) => ModuleFilter::Prioritized(modules),
                None => ModuleFilter::Any,
            },
            languages: self.languages,
        })
    }
}
