//! The `visitor` module contains the traversal pair behind the mutation walker: a
//! counting visitor that enumerates an operator's candidate nodes in pre-order, and a
//! mutating visitor that re-locates the nth candidate to apply or revert one mutation.
//!
//! Both visitors observe exactly the same node sequence (expressions and blocks, in
//! `syn`'s generated traversal order) so the ordinal recorded by the counting pass
//! identifies the same node in the mutating pass.  Operator shape predicates are
//! stable under the operator's own mutations, which keeps the ordinals aligned for
//! the revert pass as well.

use crate::error::{MutatrixError, Result};
use crate::filter::FilteredMutator;
use crate::mutator::{NodeMut, NodeRef, NodeSnapshot};
use crate::types::TypeIndex;
use syn::visit::{self, Visit};
use syn::visit_mut::{self, VisitMut};

/// One mutable site found by the counting pass: the pre-order ordinal of the node
/// among the operator's shape matches, and the number of mutations proposed there.
pub(crate) struct Site {
    pub ordinal: usize,
    pub mutations: usize,
}

/// Enumerate the sites at which `mutator` proposes mutations in `file`.
pub(crate) fn collect_sites(
    file: &syn::File,
    mutator: &FilteredMutator<'_>,
    types: &TypeIndex,
) -> Vec<Site> {
    let mut counter = SiteCounter {
        mutator,
        types,
        seen: 0,
        sites: Vec::new(),
    };
    counter.visit_file(file);
    counter.sites
}

/// Apply mutation `variant` at the node with shape-match ordinal `ordinal`, returning
/// the snapshot needed to revert it.
pub(crate) fn apply_at_site(
    file: &mut syn::File,
    mutator: &FilteredMutator<'_>,
    types: &TypeIndex,
    ordinal: usize,
    variant: usize,
) -> Result<NodeSnapshot> {
    let mut site_mutator = SiteMutator {
        mutator,
        types,
        target: ordinal,
        seen: 0,
        action: Some(SiteAction::Apply { variant }),
        snapshot: None,
        error: None,
        done: false,
    };
    site_mutator.visit_file_mut(file);

    if let Some(error) = site_mutator.error {
        return Err(error);
    }
    site_mutator
        .snapshot
        .ok_or_else(|| MutatrixError::NoSuchMutation(mutator.name().to_string(), variant))
}

/// Restore the node at `ordinal` from `snapshot`, reverting a previous apply.
pub(crate) fn restore_at_site(
    file: &mut syn::File,
    mutator: &FilteredMutator<'_>,
    ordinal: usize,
    snapshot: NodeSnapshot,
) -> Result<()> {
    let empty = TypeIndex::empty();
    let mut site_mutator = SiteMutator {
        mutator,
        types: &empty,
        target: ordinal,
        seen: 0,
        action: Some(SiteAction::Restore { snapshot }),
        snapshot: None,
        error: None,
        done: false,
    };
    site_mutator.visit_file_mut(file);

    if site_mutator.done {
        Ok(())
    } else {
        Err(MutatrixError::RevertMismatch(mutator.name().to_string()))
    }
}

struct SiteCounter<'a, 'b> {
    mutator: &'a FilteredMutator<'b>,
    types: &'a TypeIndex,
    seen: usize,
    sites: Vec<Site>,
}

impl<'a, 'b> SiteCounter<'a, 'b> {
    fn observe(&mut self, node: NodeRef<'_>) {
        if self.mutator.matches(node) {
            let mutations = self.mutator.mutation_count(self.types, node);
            if mutations > 0 {
                self.sites.push(Site {
                    ordinal: self.seen,
                    mutations,
                });
            }
            self.seen += 1;
        }
    }
}

impl<'a, 'b, 'ast> Visit<'ast> for SiteCounter<'a, 'b> {
    fn visit_expr(&mut self, node: &'ast syn::Expr) {
        self.observe(NodeRef::Expr(node));
        visit::visit_expr(self, node);
    }

    fn visit_block(&mut self, node: &'ast syn::Block) {
        self.observe(NodeRef::Block(node));
        visit::visit_block(self, node);
    }

    // Expressions in type position (array lengths, const generics) are not mutable
    // sites; mutating them cannot produce a viable program.
    fn visit_type(&mut self, _node: &'ast syn::Type) {}

    fn visit_attribute(&mut self, _node: &'ast syn::Attribute) {}
}

enum SiteAction {
    Apply { variant: usize },
    Restore { snapshot: NodeSnapshot },
}

struct SiteMutator<'a, 'b> {
    mutator: &'a FilteredMutator<'b>,
    types: &'a TypeIndex,
    target: usize,
    seen: usize,
    action: Option<SiteAction>,
    snapshot: Option<NodeSnapshot>,
    error: Option<MutatrixError>,
    done: bool,
}

impl<'a, 'b> SiteMutator<'a, 'b> {
    /// Handle one candidate node.  Returns true when traversal should not descend
    /// into the node (the target has been handled).
    fn act(&mut self, node: NodeMut<'_>) -> bool {
        if self.done {
            return true;
        }
        if !self.mutator.matches(node.as_ref()) {
            return false;
        }

        if self.seen == self.target {
            match self.action.take().expect("site action consumed twice") {
                SiteAction::Apply { variant } => {
                    let snapshot = NodeSnapshot::of(node.as_ref());
                    match self.mutator.mutate(self.types, node, variant) {
                        Ok(()) => self.snapshot = Some(snapshot),
                        Err(error) => self.error = Some(error),
                    }
                }
                SiteAction::Restore { snapshot } => snapshot.restore(node),
            }
            self.done = true;
            return true;
        }

        self.seen += 1;
        false
    }
}

impl<'a, 'b> VisitMut for SiteMutator<'a, 'b> {
    fn visit_expr_mut(&mut self, node: &mut syn::Expr) {
        if self.done {
            return;
        }
        if !self.act(NodeMut::Expr(node)) {
            visit_mut::visit_expr_mut(self, node);
        }
    }

    fn visit_block_mut(&mut self, node: &mut syn::Block) {
        if self.done {
            return;
        }
        if !self.act(NodeMut::Block(node)) {
            visit_mut::visit_block_mut(self, node);
        }
    }

    // Mirror the counting pass: type-position expressions are never candidates.
    fn visit_type_mut(&mut self, _node: &mut syn::Type) {}

    fn visit_attribute_mut(&mut self, _node: &mut syn::Attribute) {}
}
