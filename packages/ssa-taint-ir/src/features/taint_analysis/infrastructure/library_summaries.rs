//! External library summaries (§4.C6 "External library summaries"; reused
//! by §4.C4.2's "known library calls" — the two components share one
//! table, just applying its bits for different purposes: C4 turns a
//! summary into unification/field-install constraints, C6 turns the same
//! summary into taint-propagation decisions).

/// A bitmask over argument positions; bit `i` set means "argument `i`
/// matters for this rule". `u64` covers any realistic arity.
pub type ArgMask = u64;

pub struct LibrarySummary {
    /// The unqualified function/method name this entry matches.
    pub name: &'static str,
    /// If any of these argument positions are tainted/reference-bearing,
    /// this entry is relevant.
    pub if_tainted_bitmask: ArgMask,
    /// Argument positions that receive propagated taint/aliasing from other
    /// arguments.
    pub tainted_args: ArgMask,
    /// Whether the return value receives propagated taint/aliasing.
    pub tainted_rets: bool,
}

/// A small, fixed table covering common I/O, string, bytes, encoding, and
/// templating APIs (§4.C6). Matched by unqualified name; the transformer
/// and propagator strip any package qualifier before consulting this table.
pub const SUMMARIES: &[LibrarySummary] = &[
    LibrarySummary { name: "Sprintf", if_tainted_bitmask: !0, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "Sprint", if_tainted_bitmask: !0, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "Sprintln", if_tainted_bitmask: !0, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "Errorf", if_tainted_bitmask: !0, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "Fprintf", if_tainted_bitmask: !0 & !1, tainted_args: 1, tainted_rets: false },
    LibrarySummary { name: "Fprint", if_tainted_bitmask: !0 & !1, tainted_args: 1, tainted_rets: false },
    LibrarySummary { name: "Fprintln", if_tainted_bitmask: !0 & !1, tainted_args: 1, tainted_rets: false },
    LibrarySummary { name: "Join", if_tainted_bitmask: !0, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "Replace", if_tainted_bitmask: 0b1, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "ReplaceAll", if_tainted_bitmask: 0b1, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "TrimSpace", if_tainted_bitmask: 0b1, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "Marshal", if_tainted_bitmask: 0b1, tainted_args: 0, tainted_rets: true },
    LibrarySummary { name: "Execute", if_tainted_bitmask: !0 & !1, tainted_args: 0, tainted_rets: false },
];

/// Strips a `pkg.Name` or `(*T).Name` qualifier down to the bare method or
/// function name the summary table matches on.
pub fn unqualified_name(qualified: &str) -> &str {
    qualified.rsplit(['.', ')']).next().unwrap_or(qualified)
}

pub fn lookup(qualified_name: &str) -> Option<&'static LibrarySummary> {
    let short = unqualified_name(qualified_name);
    SUMMARIES.iter().find(|s| s.name == short)
}

/// Matches the two glob rules C4.2 calls out explicitly (`Sprint*`,
/// `Errorf`) without requiring a table entry.
pub fn matches_sprint_family(qualified_name: &str) -> bool {
    let short = unqualified_name(qualified_name);
    short.starts_with("Sprint") || short == "Errorf"
}

pub fn matches_fprint_family(qualified_name: &str) -> bool {
    unqualified_name(qualified_name).starts_with("Fprint")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_package_qualifier() {
        assert_eq!(unqualified_name("fmt.Sprintf"), "Sprintf");
        assert_eq!(unqualified_name("(*bytes.Buffer).Write"), "Write");
    }

    #[test]
    fn recognizes_sprint_and_fprint_families() {
        assert!(matches_sprint_family("fmt.Sprintln"));
        assert!(matches_sprint_family("fmt.Errorf"));
        assert!(!matches_sprint_family("fmt.Fprintf"));
        assert!(matches_fprint_family("fmt.Fprintln"));
    }

    #[test]
    fn table_lookup_finds_known_entries() {
        assert!(lookup("strings.TrimSpace").is_some());
        assert!(lookup("totally.Unknown").is_none());
    }
}
