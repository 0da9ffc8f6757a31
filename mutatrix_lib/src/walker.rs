//! The `walker` module drives the mutation traversal: operators in registry order,
//! sites in tree pre-order, one mutation applied at a time.
//!
//! For every mutation the walker performs the apply/yield/revert handshake: it
//! applies the edit in place, hands the mutated tree to the consumer, and restores
//! the saved node before moving to the next site.  The consumer therefore observes
//! the tree only while a mutation is applied, and the tree is back in its original
//! state whenever the walker advances — no two mutations are ever live at once.
//! The rendezvous is rendered as a callback invoked between apply and revert, which
//! preserves exactly the synchronous yield/ack protocol of a zero-capacity channel.
//!
//! After every revert the walker verifies that the canonical serialization matches
//! the pristine form.  A mismatch means an operator broke the revert contract; the
//! mutant is dropped, the tree is rebuilt from a pristine copy, and the walk
//! continues.

use crate::error::{MutatrixError, Result};
use crate::filter::{FilteredMutator, NodeFilter};
use crate::mutator::Mutator;
use crate::printer;
use crate::types::TypeIndex;
use crate::visitor;

/// The mutated tree as handed to the consumer for one mutant.
pub struct MutantView<'a> {
    /// The whole file with exactly one mutation applied.
    pub file: &'a syn::File,

    /// The registered name of the operator that produced this mutant.
    pub mutator_name: &'a str,
}

/// The mutation walker for one source file.
pub struct MutationWalker<'a> {
    mutators: &'a [(String, Box<dyn Mutator>)],
    filters: &'a [Box<dyn NodeFilter>],
    types: &'a TypeIndex,
}

impl<'a> MutationWalker<'a> {
    /// Create a walker over the given operators, node filters, and type information.
    ///
    /// # Arguments
    ///
    /// * `mutators` - The enabled operators, in registry order.
    /// * `filters` - Node filters composed around every operator.
    /// * `types` - The type side table for the file under mutation.
    pub fn new(
        mutators: &'a [(String, Box<dyn Mutator>)],
        filters: &'a [Box<dyn NodeFilter>],
        types: &'a TypeIndex,
    ) -> MutationWalker<'a> {
        MutationWalker {
            mutators,
            filters,
            types,
        }
    }

    /// Produce every mutant of `file`, handing each to `consumer` while it is
    /// applied.
    ///
    /// Operator-internal failures (a mutation that cannot be applied or reverted)
    /// drop the affected mutant and continue; an error returned by the consumer
    /// aborts the walk after the tree has been restored.
    pub fn walk<F>(&self, file: &mut syn::File, mut consumer: F) -> Result<()>
    where
        F: FnMut(MutantView<'_>) -> Result<()>,
    {
        let pristine_tree = file.clone();
        let pristine_bytes = printer::canonical_bytes(file);

        for (name, mutator) in self.mutators {
            log::debug!("Mutator {}", name);

            let filtered = FilteredMutator::new(name, mutator.as_ref(), self.filters);
            let sites = visitor::collect_sites(file, &filtered, self.types);

            for site in &sites {
                for variant in 0..site.mutations {
                    let snapshot = match visitor::apply_at_site(
                        file,
                        &filtered,
                        self.types,
                        site.ordinal,
                        variant,
                    ) {
                        Ok(snapshot) => snapshot,
                        Err(error) => {
                            log::error!("INTERNAL ERROR {}", error);
                            continue;
                        }
                    };

                    let consumed = consumer(MutantView {
                        file,
                        mutator_name: name,
                    });

                    let restored =
                        visitor::restore_at_site(file, &filtered, site.ordinal, snapshot);

                    match restored {
                        Ok(()) if printer::canonical_bytes(file) == pristine_bytes => {}
                        Ok(()) => {
                            log::error!(
                                "INTERNAL ERROR {}",
                                MutatrixError::RevertMismatch(name.clone())
                            );
                            *file = pristine_tree.clone();
                        }
                        Err(error) => {
                            log::error!("INTERNAL ERROR {}", error);
                            *file = pristine_tree.clone();
                        }
                    }

                    consumed?;
                }
            }
        }

        Ok(())
    }
}
