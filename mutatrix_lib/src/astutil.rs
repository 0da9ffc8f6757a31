//! The `astutil` module provides small syntax-tree helpers: function enumeration
//! and a debug dump of the parsed tree.

use syn::spanned::Spanned;
use syn::visit::{self, Visit};

/// Name and position of one function in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Enumerate every free function and method in `file`, in source order.
pub fn functions(file: &syn::File) -> Vec<FunctionInfo> {
    let mut collector = FunctionLister {
        functions: Vec::new(),
    };
    collector.visit_file(file);
    collector.functions
}

/// Render the parsed tree for `--print-ast`.
pub fn dump_ast(file: &syn::File) -> String {
    format!("{:#?}", file)
}

struct FunctionLister {
    functions: Vec<FunctionInfo>,
}

impl FunctionLister {
    fn record(&mut self, name: String, span: proc_macro2::Span) {
        self.functions.push(FunctionInfo {
            name,
            start_line: span.start().line,
            end_line: span.end().line,
        });
    }
}

impl<'ast> Visit<'ast> for FunctionLister {
    fn visit_item_fn(&mut self, item: &'ast syn::ItemFn) {
        self.record(item.sig.ident.to_string(), item.span());
        visit::visit_item_fn(self, item);
    }

    fn visit_impl_item_fn(&mut self, item: &'ast syn::ImplItemFn) {
        self.record(item.sig.ident.to_string(), item.span());
        visit::visit_impl_item_fn(self, item);
    }
}
