//! The `filter` module provides the node filters composed around each mutation
//! operator during traversal, plus the decorator that applies them.
//!
//! A filter answers "should this operator skip this node?".  Filters are consulted
//! by the walker's counting pass; a rejected (node, operator) pair behaves exactly
//! as if the operator had proposed no mutations there.

use crate::astutil;
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;
use proc_macro2::Span;
use regex::Regex;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};

/// Trait for objects that can veto mutation of a node by a named operator.
pub trait NodeFilter {
    /// Return true to skip mutation of `node` by the operator named `mutator_name`.
    fn skip(&self, node: NodeRef<'_>, mutator_name: &str) -> bool;
}

/// A position range in the source file, in (line, column) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpanRange {
    start: (usize, usize),
    end: (usize, usize),
}

impl SpanRange {
    fn of(span: Span) -> SpanRange {
        let start = span.start();
        let end = span.end();
        SpanRange {
            start: (start.line, start.column),
            end: (end.line, end.column),
        }
    }

    /// True if `span` starts inside this range.
    fn contains_start(&self, span: Span) -> bool {
        let point = (span.start().line, span.start().column);
        self.start <= point && point <= self.end
    }
}

/// Call names whose arguments are capacity hints: mutating them never changes
/// observable behavior, only allocation sizing, so every proposed mutation there is
/// noise.
const CAPACITY_CALLS: &[&str] = &["with_capacity", "reserve", "reserve_exact"];

/// Filter that suppresses mutation inside the argument lists of capacity-hint
/// builtins such as `Vec::with_capacity` and `reserve`.
pub struct CapacityArgsFilter {
    argument_spans: Vec<SpanRange>,
}

impl CapacityArgsFilter {
    /// Collect the argument spans of all capacity-hint calls in `file`.
    pub fn collect(file: &syn::File) -> CapacityArgsFilter {
        let mut collector = CapacityArgsCollector {
            argument_spans: Vec::new(),
        };
        collector.visit_file(file);

        CapacityArgsFilter {
            argument_spans: collector.argument_spans,
        }
    }
}

impl NodeFilter for CapacityArgsFilter {
    fn skip(&self, node: NodeRef<'_>, _mutator_name: &str) -> bool {
        let span = node.span();
        self.argument_spans.iter().any(|r| r.contains_start(span))
    }
}

struct CapacityArgsCollector {
    argument_spans: Vec<SpanRange>,
}

impl CapacityArgsCollector {
    fn record_arguments<'a>(&mut self, args: impl Iterator<Item = &'a syn::Expr>) {
        for arg in args {
            self.argument_spans.push(SpanRange::of(arg.span()));
        }
    }
}

impl<'ast> Visit<'ast> for CapacityArgsCollector {
    fn visit_expr_call(&mut self, call: &'ast syn::ExprCall) {
        if let syn::Expr::Path(path) = call.func.as_ref() {
            if let Some(segment) = path.path.segments.last() {
                if CAPACITY_CALLS.contains(&segment.ident.to_string().as_str()) {
                    self.record_arguments(call.args.iter());
                }
            }
        }
        visit::visit_expr_call(self, call);
    }

    fn visit_expr_method_call(&mut self, call: &'ast syn::ExprMethodCall) {
        if CAPACITY_CALLS.contains(&call.method.to_string().as_str()) {
            self.record_arguments(call.args.iter());
        }
        visit::visit_expr_method_call(self, call);
    }
}

/// Filter that limits mutation to functions whose name matches a pattern.
///
/// The pattern is matched against every function [`astutil::functions`] finds in the
/// file; nodes starting outside a matching function's lines are skipped.
pub struct FunctionMatchFilter {
    matched_lines: Vec<(usize, usize)>,
}

impl FunctionMatchFilter {
    /// Build the filter from the user's pattern string, validating it as a regex.
    pub fn from_pattern(pattern: &str, file: &syn::File) -> crate::error::Result<FunctionMatchFilter> {
        let regex = Regex::new(pattern)?;
        Ok(FunctionMatchFilter::new(&regex, file))
    }

    /// Build the filter from the user's regex and a parsed file.
    pub fn new(pattern: &Regex, file: &syn::File) -> FunctionMatchFilter {
        let matched_lines = astutil::functions(file)
            .into_iter()
            .filter(|function| pattern.is_match(&function.name))
            .map(|function| (function.start_line, function.end_line))
            .collect();

        FunctionMatchFilter { matched_lines }
    }
}

impl NodeFilter for FunctionMatchFilter {
    fn skip(&self, node: NodeRef<'_>, _mutator_name: &str) -> bool {
        let line = node.start_line();
        !self
            .matched_lines
            .iter()
            .any(|(start, end)| (*start..=*end).contains(&line))
    }
}

/// Decorator composing a set of filters around one operator.
///
/// The decorated operator reports zero mutations at any node a filter rejects; the
/// shape predicate passes through untouched so the walker's node ordinals stay
/// aligned with the undecorated traversal.
pub struct FilteredMutator<'a> {
    name: &'a str,
    inner: &'a dyn Mutator,
    filters: &'a [Box<dyn NodeFilter>],
}

impl<'a> FilteredMutator<'a> {
    pub fn new(
        name: &'a str,
        inner: &'a dyn Mutator,
        filters: &'a [Box<dyn NodeFilter>],
    ) -> FilteredMutator<'a> {
        FilteredMutator {
            name,
            inner,
            filters,
        }
    }

    /// The operator's registered name.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.inner.matches(node)
    }

    pub fn mutation_count(&self, types: &TypeIndex, node: NodeRef<'_>) -> usize {
        if self.filters.iter().any(|f| f.skip(node, self.name)) {
            return 0;
        }
        self.inner.mutation_count(types, node)
    }

    pub fn mutate(
        &self,
        types: &TypeIndex,
        node: NodeMut<'_>,
        variant: usize,
    ) -> crate::error::Result<()> {
        self.inner.mutate(types, node, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_node_on_line(file: &syn::File, wanted: &str) -> bool {
        // Helper: find an integer literal expression equal to `wanted` and report
        // whether the capacity filter would skip it.
        struct Finder<'a> {
            wanted: &'a str,
            found: Option<Span>,
        }
        impl<'a, 'ast> Visit<'ast> for Finder<'a> {
            fn visit_expr_lit(&mut self, lit: &'ast syn::ExprLit) {
                if let syn::Lit::Int(int) = &lit.lit {
                    if int.base10_digits() == self.wanted {
                        self.found = Some(lit.span());
                    }
                }
                visit::visit_expr_lit(self, lit);
            }
        }

        let mut finder = Finder {
            wanted,
            found: None,
        };
        finder.visit_file(file);
        finder.found.is_some()
    }

    #[test]
    fn test_filter_capacity_args_skipped() {
        let file: syn::File = syn::parse_str(
            "fn f() {
                let mut v = Vec::with_capacity(16);
                v.reserve(8);
                v.push(42);
            }",
        )
        .unwrap();
        assert!(expr_node_on_line(&file, "16"));

        let filter = CapacityArgsFilter::collect(&file);

        struct Check<'a> {
            filter: &'a CapacityArgsFilter,
            skipped: Vec<String>,
        }
        impl<'a, 'ast> Visit<'ast> for Check<'a> {
            fn visit_expr(&mut self, expr: &'ast syn::Expr) {
                if let syn::Expr::Lit(lit) = expr {
                    if let syn::Lit::Int(int) = &lit.lit {
                        if self.filter.skip(NodeRef::Expr(expr), "numbers/incrementer") {
                            self.skipped.push(int.base10_digits().to_string());
                        }
                    }
                }
                visit::visit_expr(self, expr);
            }
        }

        let mut check = Check {
            filter: &filter,
            skipped: Vec::new(),
        };
        check.visit_file(&file);

        assert!(check.skipped.contains(&"16".to_string()));
        assert!(check.skipped.contains(&"8".to_string()));
        assert!(!check.skipped.contains(&"42".to_string()));
    }

    #[test]
    fn test_filter_function_match() {
        let file: syn::File = syn::parse_str(
            "fn keep_me() { let a = 1 + 2; }
             fn drop_me() { let b = 3 + 4; }",
        )
        .unwrap();

        let regex = Regex::new("^keep").unwrap();
        let filter = FunctionMatchFilter::new(&regex, &file);

        struct Check<'a> {
            filter: &'a FunctionMatchFilter,
            skipped: Vec<String>,
        }
        impl<'a, 'ast> Visit<'ast> for Check<'a> {
            fn visit_expr(&mut self, expr: &'ast syn::Expr) {
                if let syn::Expr::Binary(_) = expr {
                    let verdict = self.filter.skip(NodeRef::Expr(expr), "arithmetic/base");
                    self.skipped.push(format!("{}", verdict));
                }
                visit::visit_expr(self, expr);
            }
        }

        let mut check = Check {
            filter: &filter,
            skipped: Vec::new(),
        };
        check.visit_file(&file);

        // One binary expression kept (keep_me), one rejected (drop_me).
        assert_eq!(check.skipped, vec!["false", "true"]);
    }
}
