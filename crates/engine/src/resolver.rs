//! Coordinate resolution
//!
//! A [`Resolver`] binds a [`StampFilter`] to a consistent copy of the path
//! origin graph and answers "which version of this chronology is visible
//! from here". Resolution runs in five steps:
//!
//! 1. Flatten the filter's path positions into one visibility window per
//!    path. A position `(P, t)` opens `P` up to `t`; each origin `(O, o)` of
//!    `P` opens `O` up to `min(t, o)`, recursively. A path reached through
//!    several routes keeps the widest window.
//! 2. Drop versions whose status is not allowed.
//! 3. Drop versions whose module is not allowed.
//! 4. Per path, keep the version with the greatest time. Equal times go to
//!    the higher-priority module, then to the later append.
//! 5. Across paths, apply the configured [`TieBreakOrder`]. Candidates still
//!    tied afterwards form a [`LatestVersion::Contradiction`].
//!
//! The origin graph is checked for cycles when the resolver is built, before
//! any traversal; a cycle fails with `InvalidCoordinate`.

use crate::coordinate::{StampFilter, StatusSet};
use chronicle_core::{Error, Nid, Result, Stamp, Timestamp};
use chronicle_storage::{Chronology, PathOrigins, Version};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// One tie-break rule applied across paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// Drop candidates whose path is an origin of another candidate's path
    PathSpecificity,
    /// Keep only candidates from the highest-priority module
    ModulePriority,
}

impl TieBreak {
    /// Name used in configuration files
    pub const fn as_str(&self) -> &'static str {
        match self {
            TieBreak::PathSpecificity => "path_specificity",
            TieBreak::ModulePriority => "module_priority",
        }
    }

    /// Parse a configuration name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "path_specificity" => Some(TieBreak::PathSpecificity),
            "module_priority" => Some(TieBreak::ModulePriority),
            _ => None,
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of tie-break rules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TieBreakOrder(Vec<TieBreak>);

impl TieBreakOrder {
    /// Create an order, rejecting repeated rules
    pub fn new(rules: Vec<TieBreak>) -> Result<Self> {
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].contains(rule) {
                return Err(Error::Config(format!("tie-break {} listed twice", rule)));
            }
        }
        Ok(TieBreakOrder(rules))
    }

    /// Rules in application order
    pub fn rules(&self) -> &[TieBreak] {
        &self.0
    }
}

impl Default for TieBreakOrder {
    fn default() -> Self {
        TieBreakOrder(vec![TieBreak::PathSpecificity, TieBreak::ModulePriority])
    }
}

/// Outcome of resolving a chronology
#[derive(Debug, Clone, PartialEq)]
pub enum LatestVersion {
    /// Nothing visible
    Empty,
    /// Exactly one visible version
    Present(Version),
    /// Two or more versions tied after every tie-break
    Contradiction(Vec<Version>),
}

impl LatestVersion {
    /// Check if nothing is visible
    pub fn is_empty(&self) -> bool {
        matches!(self, LatestVersion::Empty)
    }

    /// Check if the result is a contradiction
    pub fn is_contradiction(&self) -> bool {
        matches!(self, LatestVersion::Contradiction(_))
    }

    /// The single visible version, if there is exactly one
    pub fn present(&self) -> Option<&Version> {
        match self {
            LatestVersion::Present(v) => Some(v),
            _ => None,
        }
    }

    /// Every version in the result (zero, one, or the tied set)
    pub fn versions(&self) -> &[Version] {
        match self {
            LatestVersion::Empty => &[],
            LatestVersion::Present(v) => std::slice::from_ref(v),
            LatestVersion::Contradiction(vs) => vs,
        }
    }

    fn from_candidates(mut candidates: Vec<Version>) -> Self {
        match candidates.len() {
            0 => LatestVersion::Empty,
            1 => LatestVersion::Present(candidates.remove(0)),
            _ => LatestVersion::Contradiction(candidates),
        }
    }
}

/// Visibility resolver for one filter and one path graph snapshot
#[derive(Debug, Clone)]
pub struct Resolver {
    filter: StampFilter,
    windows: FxHashMap<Nid, Timestamp>,
    /// Transitive origins of every path with a window
    ancestors: FxHashMap<Nid, FxHashSet<Nid>>,
    tie_break: TieBreakOrder,
}

impl Resolver {
    /// Build a resolver with the default tie-break order
    pub fn new(filter: StampFilter, origins: &PathOrigins) -> Result<Self> {
        Self::with_tie_break(filter, origins, TieBreakOrder::default())
    }

    /// Build a resolver with an explicit tie-break order
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if a positioned path reaches an origin cycle.
    pub fn with_tie_break(
        filter: StampFilter,
        origins: &PathOrigins,
        tie_break: TieBreakOrder,
    ) -> Result<Self> {
        for position in filter.positions() {
            origins.check_acyclic_from(position.path)?;
        }

        let mut windows: FxHashMap<Nid, Timestamp> = FxHashMap::default();
        let mut stack: Vec<(Nid, Timestamp)> =
            filter.positions().iter().map(|p| (p.path, p.time)).collect();
        while let Some((path, time)) = stack.pop() {
            match windows.get(&path) {
                Some(open) if *open >= time => continue,
                _ => {
                    windows.insert(path, time);
                }
            }
            for origin in origins.origins(path) {
                stack.push((origin.path, time.min(origin.time)));
            }
        }

        let mut ancestors = FxHashMap::default();
        for path in windows.keys() {
            ancestors.insert(*path, origins.ancestors(*path)?);
        }

        Ok(Resolver {
            filter,
            windows,
            ancestors,
            tie_break,
        })
    }

    /// The filter this resolver applies
    pub fn filter(&self) -> &StampFilter {
        &self.filter
    }

    /// Tie-break rules applied across paths
    pub fn tie_break(&self) -> &TieBreakOrder {
        &self.tie_break
    }

    /// Newest visible instant on `path`, if the path is visible at all
    pub fn window(&self, path: Nid) -> Option<Timestamp> {
        self.windows.get(&path).copied()
    }

    /// Check if a stamp lies inside the visibility windows (step 1 only)
    pub fn in_window(&self, stamp: &Stamp) -> bool {
        !stamp.is_uncommitted()
            && self
                .windows
                .get(&stamp.path)
                .map_or(false, |open| stamp.time <= *open)
    }

    fn passes(&self, version: &Version, statuses: StatusSet) -> bool {
        let stamp = version.stamp();
        version.is_committed()
            && self.in_window(stamp)
            && statuses.contains(stamp.status)
            && self.filter.modules().allows(stamp.module)
    }

    /// Committed versions that survive steps 1 to 3, in stored order
    pub fn visible_versions(&self, chronology: &Chronology) -> Vec<Version> {
        chronology
            .committed()
            .iter()
            .filter(|v| self.passes(v, self.filter.statuses()))
            .cloned()
            .collect()
    }

    /// The latest visible version of a chronology
    pub fn latest(&self, chronology: &Chronology) -> LatestVersion {
        self.resolve(chronology, self.filter.statuses())
    }

    /// The latest version regardless of status, kept only if its status is
    /// allowed
    ///
    /// Unlike [`Resolver::latest`], a newer `Inactive` version hides an older
    /// `Active` one even when the filter admits only `Active`. This is how
    /// retirement is observed.
    pub fn current(&self, chronology: &Chronology) -> LatestVersion {
        let allowed = self.filter.statuses();
        match self.resolve(chronology, StatusSet::all()) {
            LatestVersion::Empty => LatestVersion::Empty,
            LatestVersion::Present(v) if allowed.contains(v.stamp().status) => {
                LatestVersion::Present(v)
            }
            LatestVersion::Present(_) => LatestVersion::Empty,
            LatestVersion::Contradiction(vs) => LatestVersion::from_candidates(
                vs.into_iter()
                    .filter(|v| allowed.contains(v.stamp().status))
                    .collect(),
            ),
        }
    }

    fn module_rank(&self, module: Nid) -> usize {
        self.filter.modules().priority(module).unwrap_or(usize::MAX)
    }

    fn resolve(&self, chronology: &Chronology, statuses: StatusSet) -> LatestVersion {
        // Step 4: one candidate per path, as an index into the committed list
        let committed = chronology.committed();
        let mut best: FxHashMap<Nid, usize> = FxHashMap::default();
        for (index, version) in committed.iter().enumerate() {
            if !self.passes(version, statuses) {
                continue;
            }
            let stamp = version.stamp();
            let replace = match best.get(&stamp.path) {
                None => true,
                Some(&held) => {
                    let current = committed[held].stamp();
                    stamp.time > current.time
                        || (stamp.time == current.time
                            && self.module_rank(stamp.module) <= self.module_rank(current.module))
                }
            };
            if replace {
                best.insert(stamp.path, index);
            }
        }

        let mut candidates: Vec<usize> = best.into_values().collect();
        candidates.sort_by_key(|i| committed[*i].stamp().path);

        // Step 5
        for rule in self.tie_break.rules() {
            if candidates.len() < 2 {
                break;
            }
            match rule {
                TieBreak::PathSpecificity => {
                    let paths: Vec<Nid> = candidates.iter().map(|i| committed[*i].stamp().path).collect();
                    candidates.retain(|i| {
                        let path = committed[*i].stamp().path;
                        !paths.iter().any(|other| {
                            *other != path
                                && self
                                    .ancestors
                                    .get(other)
                                    .map_or(false, |origins| origins.contains(&path))
                        })
                    });
                }
                TieBreak::ModulePriority => {
                    if !self.filter.modules().is_prioritized() {
                        continue;
                    }
                    let top = candidates
                        .iter()
                        .map(|i| self.module_rank(committed[*i].stamp().module))
                        .min()
                        .unwrap_or(usize::MAX);
                    candidates.retain(|i| self.module_rank(committed[*i].stamp().module) == top);
                }
            }
        }

        let result =
            LatestVersion::from_candidates(candidates.iter().map(|i| committed[*i].clone()).collect());
        if result.is_contradiction() {
            tracing::debug!(
                nid = %chronology.nid(),
                tied = result.versions().len(),
                "contradiction"
            );
        }
        result
    }
}
