//! Path origin graph
//!
//! A path is a concept that names a line of development. Each path may
//! declare origin paths, each with an origin time: the path inherits all
//! history of the origin up to (and including) that time, then diverges.
//!
//! Origins are accepted as declared. Cycles are a structural fault; they are
//! reported with `InvalidCoordinate` by [`PathGraph::validate`] and by every
//! traversal that would have to walk one.

use chronicle_core::{Error, Nid, Result, Timestamp};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

/// One origin of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathOrigin {
    /// The origin path
    pub path: Nid,
    /// Last instant of the origin's history that is inherited
    pub time: Timestamp,
}

impl PathOrigin {
    /// Create an origin
    pub const fn new(path: Nid, time: Timestamp) -> Self {
        PathOrigin { path, time }
    }
}

/// Immutable copy of the origin edges, safe to traverse without locks
#[derive(Debug, Clone, Default)]
pub struct PathOrigins {
    edges: FxHashMap<Nid, Vec<PathOrigin>>,
}

impl PathOrigins {
    /// Origins of a path, in declaration order (empty for root or unknown paths)
    pub fn origins(&self, path: Nid) -> &[PathOrigin] {
        self.edges.get(&path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check that no path reachable from `start` lies on an origin cycle
    pub fn check_acyclic_from(&self, start: Nid) -> Result<()> {
        let mut done = FxHashSet::default();
        let mut on_stack = FxHashSet::default();
        self.visit(start, &mut done, &mut on_stack)
    }

    /// Check the whole graph for origin cycles
    pub fn check_acyclic(&self) -> Result<()> {
        let mut done = FxHashSet::default();
        let mut on_stack = FxHashSet::default();
        let mut paths: Vec<Nid> = self.edges.keys().copied().collect();
        paths.sort();
        for path in paths {
            self.visit(path, &mut done, &mut on_stack)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        start: Nid,
        done: &mut FxHashSet<Nid>,
        on_stack: &mut FxHashSet<Nid>,
    ) -> Result<()> {
        if done.contains(&start) {
            return Ok(());
        }
        on_stack.insert(start);
        // (path, index of the next origin to follow)
        let mut stack: Vec<(Nid, usize)> = vec![(start, 0)];
        while let Some((path, next)) = stack.last_mut() {
            let path = *path;
            let Some(origin) = self.origins(path).get(*next) else {
                stack.pop();
                on_stack.remove(&path);
                done.insert(path);
                continue;
            };
            *next += 1;
            let origin = origin.path;
            if done.contains(&origin) {
                continue;
            }
            if !on_stack.insert(origin) {
                tracing::error!(path = %origin, "path origin cycle");
                return Err(Error::InvalidCoordinate(format!(
                    "path origin cycle through {}",
                    origin
                )));
            }
            stack.push((origin, 0));
        }
        Ok(())
    }

    /// Every path `path` transitively inherits from (excluding itself)
    pub fn ancestors(&self, path: Nid) -> Result<FxHashSet<Nid>> {
        self.check_acyclic_from(path)?;
        let mut seen = FxHashSet::default();
        let mut stack: Vec<Nid> = self.origins(path).iter().map(|o| o.path).collect();
        while let Some(next) = stack.pop() {
            if seen.insert(next) {
                stack.extend(self.origins(next).iter().map(|o| o.path));
            }
        }
        Ok(seen)
    }

    /// Check if `origin` is a transitive origin of `path`
    pub fn is_origin_of(&self, origin: Nid, path: Nid) -> Result<bool> {
        Ok(self.ancestors(path)?.contains(&origin))
    }
}

/// Shared, mutable registry of path origins
pub struct PathGraph {
    origins: RwLock<PathOrigins>,
}

impl PathGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            origins: RwLock::new(PathOrigins::default()),
        }
    }

    /// Declare a path and its origins
    ///
    /// A path may be declared once. Re-declaring it with the same origins is
    /// a no-op; with different origins it is rejected.
    pub fn add_path(&self, path: Nid, origins: Vec<PathOrigin>) -> Result<()> {
        let mut graph = self.origins.write();
        if let Some(existing) = graph.edges.get(&path) {
            if *existing == origins {
                return Ok(());
            }
            return Err(Error::InvalidOperation(format!(
                "{} already declared with different origins",
                path
            )));
        }
        tracing::debug!(%path, origins = origins.len(), "declared path");
        graph.edges.insert(path, origins);
        Ok(())
    }

    /// Check if a path was declared
    pub fn contains(&self, path: Nid) -> bool {
        self.origins.read().edges.contains_key(&path)
    }

    /// Origins of a path, in declaration order
    pub fn origins(&self, path: Nid) -> Vec<PathOrigin> {
        self.origins.read().origins(path).to_vec()
    }

    /// Every path `path` transitively inherits from
    pub fn ancestors(&self, path: Nid) -> Result<FxHashSet<Nid>> {
        self.origins.read().ancestors(path)
    }

    /// Check if `origin` is a transitive origin of `path`
    pub fn is_origin_of(&self, origin: Nid, path: Nid) -> Result<bool> {
        self.origins.read().is_origin_of(origin, path)
    }

    /// Check the whole graph for origin cycles
    pub fn validate(&self) -> Result<()> {
        self.origins.read().check_acyclic()
    }

    /// Consistent copy of the graph for lock-free traversal
    pub fn snapshot(&self) -> PathOrigins {
        self.origins.read().clone()
    }

    /// Number of declared paths
    pub fn len(&self) -> usize {
        self.origins.read().edges.len()
    }

    /// Check if no path was declared
    pub fn is_empty(&self) -> bool {
        self.origins.read().edges.is_empty()
    }

    /// Forget every declared path
    pub fn reset(&self) {
        self.origins.write().edges.clear();
    }
}

impl Default for PathGraph {
    fn default() -> Self {
        Self::new()
    }
}
