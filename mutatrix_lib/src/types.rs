//! The `types` module provides `TypeIndex`, the resolved-type side table consulted by
//! operators that must reject type-incorrect mutations.
//!
//! The index answers one question: is an expression string-typed?  Arithmetic
//! operators use it to skip `+` on strings, where the surface operator looks
//! arithmetic but the operation is concatenation.  The index is built in a single
//! pre-pass that records the names of locals and parameters bound to string values;
//! expression queries then combine those names with the syntactic forms that
//! produce strings.

use std::collections::HashSet;
use syn::visit::{self, Visit};

/// Method names whose receiver-independent result is a string.
const STRING_METHODS: &[&str] = &[
    "to_string",
    "to_owned",
    "to_uppercase",
    "to_lowercase",
    "join",
    "concat",
    "repeat",
];

/// Macro names that expand to string values.
const STRING_MACROS: &[&str] = &["format", "concat", "stringify"];

/// Resolved identifier/type information for one source file.
pub struct TypeIndex {
    string_bindings: HashSet<String>,
}

impl TypeIndex {
    /// Build the index for one parsed file.
    pub fn build(file: &syn::File) -> TypeIndex {
        let mut collector = BindingCollector {
            index: TypeIndex {
                string_bindings: HashSet::new(),
            },
        };
        collector.visit_file(file);
        collector.index
    }

    /// An empty index, for callers that have no file context (tests mostly).
    pub fn empty() -> TypeIndex {
        TypeIndex {
            string_bindings: HashSet::new(),
        }
    }

    /// Return true if `expr` is known to evaluate to a string.
    ///
    /// This is deliberately conservative: an expression the index cannot classify is
    /// reported as not-a-string, and the resulting mutant is left for the compiler to
    /// reject (classified Skipped by the harness).
    pub fn is_string_expr(&self, expr: &syn::Expr) -> bool {
        match expr {
            syn::Expr::Lit(lit) => matches!(lit.lit, syn::Lit::Str(_)),
            syn::Expr::Path(path) => match path.path.get_ident() {
                Some(ident) => self.string_bindings.contains(&ident.to_string()),
                None => false,
            },
            syn::Expr::Macro(mac) => is_string_macro(&mac.mac),
            syn::Expr::MethodCall(call) => {
                let name = call.method.to_string();
                STRING_METHODS.contains(&name.as_str())
                    || (name == "clone" && self.is_string_expr(&call.receiver))
            }
            syn::Expr::Call(call) => is_string_from_call(&call.func),
            syn::Expr::Binary(binary) => {
                // String concatenation chains: `a + b + c`.
                matches!(binary.op, syn::BinOp::Add(_))
                    && (self.is_string_expr(&binary.left) || self.is_string_expr(&binary.right))
            }
            syn::Expr::Reference(reference) => self.is_string_expr(&reference.expr),
            syn::Expr::Paren(paren) => self.is_string_expr(&paren.expr),
            _ => false,
        }
    }

    fn record_binding(&mut self, name: String) {
        self.string_bindings.insert(name);
    }
}

/// Return true if `ty` names a string type (`String`, `str`, `&str`).
fn is_string_type(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(path) => match path.path.segments.last() {
            Some(segment) => segment.ident == "String" || segment.ident == "str",
            None => false,
        },
        syn::Type::Reference(reference) => is_string_type(&reference.elem),
        _ => false,
    }
}

fn is_string_macro(mac: &syn::Macro) -> bool {
    match mac.path.segments.last() {
        Some(segment) => STRING_MACROS.contains(&segment.ident.to_string().as_str()),
        None => false,
    }
}

/// Return true if `func` is a path like `String::from` or `str::to_owned`.
fn is_string_from_call(func: &syn::Expr) -> bool {
    if let syn::Expr::Path(path) = func {
        let segments: Vec<String> = path
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect();
        if segments.len() >= 2 {
            let owner = &segments[segments.len() - 2];
            return owner == "String" || owner == "str";
        }
    }
    false
}

struct BindingCollector {
    index: TypeIndex,
}

impl<'ast> Visit<'ast> for BindingCollector {
    fn visit_local(&mut self, local: &'ast syn::Local) {
        let (name, annotated) = match &local.pat {
            syn::Pat::Ident(ident) => (Some(ident.ident.to_string()), false),
            syn::Pat::Type(typed) => match typed.pat.as_ref() {
                syn::Pat::Ident(ident) => {
                    (Some(ident.ident.to_string()), is_string_type(&typed.ty))
                }
                _ => (None, false),
            },
            _ => (None, false),
        };

        if let Some(name) = name {
            let init_is_string = local
                .init
                .as_ref()
                .map(|init| self.index.is_string_expr(&init.expr))
                .unwrap_or(false);

            if annotated || init_is_string {
                self.index.record_binding(name);
            }
        }

        visit::visit_local(self, local);
    }

    fn visit_fn_arg(&mut self, arg: &'ast syn::FnArg) {
        if let syn::FnArg::Typed(typed) = arg {
            if let syn::Pat::Ident(ident) = typed.pat.as_ref() {
                if is_string_type(&typed.ty) {
                    self.index.record_binding(ident.ident.to_string());
                }
            }
        }

        visit::visit_fn_arg(self, arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_expr(src: &str) -> syn::Expr {
        syn::parse_str::<syn::Expr>(src).unwrap()
    }

    #[test]
    fn test_types_literal_and_macro_are_strings() {
        let index = TypeIndex::empty();
        assert!(index.is_string_expr(&first_expr("\"abc\"")));
        assert!(index.is_string_expr(&first_expr("format!(\"{}\", x)")));
        assert!(!index.is_string_expr(&first_expr("42")));
        assert!(!index.is_string_expr(&first_expr("a * b")));
    }

    #[test]
    fn test_types_method_and_call_forms() {
        let index = TypeIndex::empty();
        assert!(index.is_string_expr(&first_expr("x.to_string()")));
        assert!(index.is_string_expr(&first_expr("String::from(\"a\")")));
        assert!(!index.is_string_expr(&first_expr("x.len()")));
    }

    #[test]
    fn test_types_bindings_from_let_and_args() {
        let file: syn::File = syn::parse_str(
            "fn greet(name: &str) -> String {
                let prefix = String::from(\"hello \");
                let n = 3;
                prefix + name
            }",
        )
        .unwrap();

        let index = TypeIndex::build(&file);
        assert!(index.is_string_expr(&first_expr("prefix")));
        assert!(index.is_string_expr(&first_expr("name")));
        assert!(!index.is_string_expr(&first_expr("n")));
        assert!(index.is_string_expr(&first_expr("prefix + name")));
    }

    #[test]
    fn test_types_annotated_binding() {
        let file: syn::File = syn::parse_str(
            "fn f(input: i64) {
                let label: String = compute(input);
                let total = input + 1;
            }",
        )
        .unwrap();

        let index = TypeIndex::build(&file);
        assert!(index.is_string_expr(&first_expr("label")));
        assert!(!index.is_string_expr(&first_expr("total")));
    }
}
