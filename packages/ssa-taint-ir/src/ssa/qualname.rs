//! Splits the qualified names the SSA IR attaches to functions, methods and
//! named types into the `(package, receiver, method)` / `(package, type)`
//! triples the §6 matcher rules (`package_regex`/`receiver_regex`/
//! `method_regex`, `package_regex`/`type_regex`) are defined over.
//!
//! The spec treats the configuration loader's matchers as consuming
//! already-split predicate inputs; it never says how a caller derives those
//! parts from one IR-supplied identifier string. This module is that glue,
//! grounded on the same "strip to the last identifier" idiom as
//! `taint_analysis::infrastructure::library_summaries::unqualified_name`,
//! extended to also recover a receiver type for bound-method names.

/// Splits a call target name into `(package, receiver, method)`.
///
/// Recognizes two shapes:
/// - `"pkg.Func"` → `("pkg", "", "Func")`
/// - `"(*pkg.Type).Method"` or `"(pkg.Type).Method"` → `("pkg", "Type", "Method")`
///
/// A bare `"Func"` with no separators yields `("", "", "Func")`.
pub fn split_call_name(name: &str) -> (String, String, String) {
    if let Some(rest) = name.strip_prefix('(') {
        if let Some(close) = rest.find(").") {
            let receiver_part = rest[..close].trim_start_matches('*');
            let method = &rest[close + 2..];
            let (package, receiver) = split_type_name(receiver_part);
            return (package, receiver, method.to_string());
        }
    }
    match name.rfind('.') {
        Some(i) => (name[..i].to_string(), String::new(), name[i + 1..].to_string()),
        None => (String::new(), String::new(), name.to_string()),
    }
}

/// Splits a named type's identifier into `(package, type_name)`, e.g.
/// `"example.com/secrets.Credentials"` → `("example.com/secrets", "Credentials")`.
pub fn split_type_name(name: &str) -> (String, String) {
    match name.rfind('.') {
        Some(i) => (name[..i].to_string(), name[i + 1..].to_string()),
        None => (String::new(), name.to_string()),
    }
}

/// Peels `Pointer` and `Named` wrappers down to the `(package, type_name)`
/// of the first `Named` type found — used to resolve the struct a
/// `FieldAddr`'s base pointer addresses into matcher-shaped parts. Yields
/// `("", "")` when no `Named` wrapper is present (anonymous structs,
/// basic kinds).
pub fn struct_parts(ty: &super::types::Type) -> (String, String) {
    use super::types::Type;
    match ty {
        Type::Named { name, .. } => split_type_name(name),
        Type::Pointer(inner) => struct_parts(inner),
        _ => (String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn splits_plain_function_name() {
        assert_eq!(split_call_name("fmt.Sprintf"), ("fmt".into(), "".into(), "Sprintf".into()));
    }

    #[test]
    fn splits_bound_method_name() {
        assert_eq!(
            split_call_name("(*example.com/secrets.Client).Fetch"),
            ("example.com/secrets".into(), "Client".into(), "Fetch".into())
        );
        assert_eq!(
            split_call_name("(example.com/secrets.Client).Fetch"),
            ("example.com/secrets".into(), "Client".into(), "Fetch".into())
        );
    }

    #[test]
    fn bare_name_has_no_package_or_receiver() {
        assert_eq!(split_call_name("println"), ("".into(), "".into(), "println".into()));
    }

    #[test]
    fn splits_named_type() {
        assert_eq!(split_type_name("example.com/secrets.Credentials"), ("example.com/secrets".into(), "Credentials".into()));
        assert_eq!(split_type_name("Credentials"), ("".into(), "Credentials".into()));
    }

    #[test]
    fn struct_parts_peels_pointer_to_named() {
        use super::super::types::Type;
        let named = Type::Named { name: "example.com/secrets.Credentials".into(), underlying: Box::new(Type::Struct(Arc::from(vec![]))) };
        assert_eq!(struct_parts(&Type::Pointer(Box::new(named))), ("example.com/secrets".into(), "Credentials".into()));
    }

    #[test]
    fn struct_parts_is_empty_for_anonymous_struct() {
        use super::super::types::Type;
        assert_eq!(struct_parts(&Type::Struct(Arc::from(vec![]))), ("".into(), "".into()));
    }
}
