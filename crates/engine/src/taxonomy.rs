//! Taxonomy snapshots
//!
//! A [`TaxonomySnapshot`] derives a parent/child graph over concepts from one
//! assemblage whose semantics encode edges: the referenced component is the
//! parent, one NID field holds the child.
//!
//! Nothing is cached. Every query fetches candidate edges from the store's
//! secondary indices, resolves each edge under the snapshot's resolver and
//! keeps it only if the edge is current and the concept on the far end still
//! has a visible version. Index hits are treated as hints; stale entries are
//! filtered out and logged.

use crate::closure::ClosureIndex;
use crate::resolver::{LatestVersion, Resolver};
use chronicle_core::{Error, FieldType, Nid, Result};
use chronicle_storage::{ChronicleStore, FieldValueIndex, Version};
use std::collections::BTreeSet;
use std::sync::Arc;

/// How a contradicted edge is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContradictionPolicy {
    /// Every tied version contributes its edge
    #[default]
    Include,
    /// A contradicted edge contributes nothing
    Exclude,
}

impl ContradictionPolicy {
    /// Name used in configuration files
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContradictionPolicy::Include => "include",
            ContradictionPolicy::Exclude => "exclude",
        }
    }

    /// Parse a configuration name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "include" => Some(ContradictionPolicy::Include),
            "exclude" => Some(ContradictionPolicy::Exclude),
            _ => None,
        }
    }
}

/// Parent/child view of one assemblage under one resolver
pub struct TaxonomySnapshot {
    store: Arc<ChronicleStore>,
    reverse: Arc<dyn FieldValueIndex>,
    closure: Option<Arc<dyn ClosureIndex>>,
    resolver: Resolver,
    assemblage: Nid,
    child_field: usize,
    contradictions: ContradictionPolicy,
}

impl TaxonomySnapshot {
    /// Create a snapshot over `assemblage`, reading the child from field
    /// `child_field`
    ///
    /// The store's own reverse index is used for `parents` until another one
    /// is attached.
    ///
    /// # Errors
    ///
    /// - `UnknownAssemblage` if the assemblage has no declared schema
    /// - `FieldTypeMismatch` if `child_field` is not a NID field
    /// - `ArityMismatch` if `child_field` is out of range
    pub fn new(
        store: Arc<ChronicleStore>,
        assemblage: Nid,
        child_field: usize,
        resolver: Resolver,
    ) -> Result<Self> {
        let schema = store.schema(assemblage)?;
        match schema.field_type(child_field) {
            Some(FieldType::Nid) => {}
            Some(actual) => {
                return Err(Error::FieldTypeMismatch {
                    index: child_field,
                    expected: FieldType::Nid,
                    actual,
                })
            }
            None => {
                return Err(Error::ArityMismatch {
                    declared: schema.arity(),
                    actual: child_field + 1,
                })
            }
        }
        let reverse: Arc<dyn FieldValueIndex> = store.clone();
        Ok(TaxonomySnapshot {
            store,
            reverse,
            closure: None,
            resolver,
            assemblage,
            child_field,
            contradictions: ContradictionPolicy::default(),
        })
    }

    /// Use an external reverse value index for `parents`
    pub fn with_reverse_index(mut self, reverse: Arc<dyn FieldValueIndex>) -> Self {
        self.reverse = reverse;
        self
    }

    /// Treat contradicted edges according to `policy`
    pub fn with_contradictions(mut self, policy: ContradictionPolicy) -> Self {
        self.contradictions = policy;
        self
    }

    /// Answer transitive queries from a materialized closure
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the closure was built over another assemblage.
    pub fn with_closure(mut self, closure: Arc<dyn ClosureIndex>) -> Result<Self> {
        if closure.assemblage() != self.assemblage {
            return Err(Error::InvalidOperation(format!(
                "closure covers assemblage {}, not {}",
                closure.assemblage(),
                self.assemblage
            )));
        }
        self.closure = Some(closure);
        Ok(self)
    }

    /// The assemblage edges are read from
    pub fn assemblage(&self) -> Nid {
        self.assemblage
    }

    /// The resolver deciding visibility
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Check if a concept has a visible version
    pub fn is_visible(&self, concept: Nid) -> Result<bool> {
        let chronology = self.store.chronology(concept)?;
        Ok(!self.resolver.current(&chronology).is_empty())
    }

    /// Children asserted by the current versions of one edge semantic
    fn edge_children(&self, semantic: Nid, current: &LatestVersion) -> Vec<Nid> {
        let versions: &[Version] = match current {
            LatestVersion::Empty => &[],
            LatestVersion::Present(v) => std::slice::from_ref(v),
            LatestVersion::Contradiction(vs) => {
                tracing::warn!(
                    %semantic,
                    tied = vs.len(),
                    policy = self.contradictions.as_str(),
                    "contradicted taxonomy edge"
                );
                match self.contradictions {
                    ContradictionPolicy::Include => vs.as_slice(),
                    ContradictionPolicy::Exclude => &[],
                }
            }
        };
        versions
            .iter()
            .filter_map(|v| v.fields().and_then(|f| f.nid_at(self.child_field)))
            .collect()
    }

    /// Concepts directly below `parent`
    pub fn children(&self, parent: Nid) -> Result<BTreeSet<Nid>> {
        if !self.store.contains(parent) {
            return Err(Error::UnknownIdentifier(parent));
        }
        let mut children = BTreeSet::new();
        for semantic in self.store.semantics_referencing(self.assemblage, parent) {
            let chronology = self.store.chronology(semantic)?;
            let current = self.resolver.current(&chronology);
            for child in self.edge_children(semantic, &current) {
                if self.visible_or_skip(child)? {
                    children.insert(child);
                }
            }
        }
        Ok(children)
    }

    /// Concepts directly above `child`
    pub fn parents(&self, child: Nid) -> Result<BTreeSet<Nid>> {
        if !self.store.contains(child) {
            return Err(Error::UnknownIdentifier(child));
        }
        let mut parents = BTreeSet::new();
        for semantic in self.reverse.find_semantics_referencing_field_value(child) {
            let chronology = match self.store.chronology(semantic) {
                Ok(chronology) => chronology,
                Err(Error::UnknownIdentifier(_)) => {
                    tracing::warn!(%semantic, %child, "reverse index names an unknown semantic");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let parent = match (chronology.assemblage(), chronology.referenced_component()) {
                (Some(assemblage), Some(parent)) if assemblage == self.assemblage => parent,
                _ => continue,
            };
            let current = self.resolver.current(&chronology);
            if !self.edge_children(semantic, &current).contains(&child) {
                tracing::trace!(%semantic, %child, "stale reverse index entry");
                continue;
            }
            if self.visible_or_skip(parent)? {
                parents.insert(parent);
            }
        }
        Ok(parents)
    }

    fn visible_or_skip(&self, concept: Nid) -> Result<bool> {
        match self.is_visible(concept) {
            Ok(visible) => Ok(visible),
            Err(Error::UnknownIdentifier(_)) => {
                tracing::warn!(%concept, "taxonomy edge points at an unknown concept");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Check if `child` sits directly below `parent`
    pub fn is_child_of(&self, child: Nid, parent: Nid) -> Result<bool> {
        Ok(self.parents(child)?.contains(&parent))
    }

    /// Check if nothing sits below `concept`
    pub fn is_leaf(&self, concept: Nid) -> Result<bool> {
        Ok(self.children(concept)?.is_empty())
    }

    /// Check if nothing sits above `concept`
    pub fn is_root(&self, concept: Nid) -> Result<bool> {
        Ok(self.parents(concept)?.is_empty())
    }

    fn closure(&self) -> Result<&dyn ClosureIndex> {
        self.closure
            .as_deref()
            .ok_or(Error::UnsupportedByAssemblage(self.assemblage))
    }

    /// Check if `descendant` lies transitively below `ancestor`
    ///
    /// # Errors
    ///
    /// `UnsupportedByAssemblage` unless a closure index was attached.
    pub fn is_descendant_of(&self, descendant: Nid, ancestor: Nid) -> Result<bool> {
        Ok(self.closure()?.is_descendant_of(descendant, ancestor))
    }

    /// Check if `concept` is `kind` or one of its descendants
    ///
    /// # Errors
    ///
    /// `UnsupportedByAssemblage` unless a closure index was attached.
    pub fn kind_of(&self, concept: Nid, kind: Nid) -> Result<bool> {
        let closure = self.closure()?;
        Ok(concept == kind || closure.is_descendant_of(concept, kind))
    }
}
