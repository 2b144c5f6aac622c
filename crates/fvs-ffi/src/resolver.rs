// SPDX-License-Identifier: Apache-2.0
//! Routine resolution and variant identification.
//!
//! Resolution is pure logic over a [`SymbolSource`]: for every routine in
//! [`Routine::ALL`] try the plain spelling, then the decorated spelling, and
//! accept the first one that is callable. A symbol exported as data counts
//! as missing. If anything is missing the whole table is rejected, listing
//! every missing routine in declaration order.
//!
//! The dynamic loader is one [`SymbolSource`]
//! ([`FvsLibrary`](crate::library::FvsLibrary) wraps `libloading`); tests
//! use an in-memory one.

use std::fmt;
use std::path::Path;

use crate::error::{FvsError, Result};
use crate::routines::{ROUTINE_COUNT, Routine, Spelling};

/// Marker that precedes the variant code in an FVS library filename
/// (`FVSso.so`, `libFVSpn.so`, `FVSie.dll`).
pub const VARIANT_MARKER: &str = "FVS";

// ---------------------------------------------------------------------------
// Symbol sources
// ---------------------------------------------------------------------------

/// Outcome of looking up one symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolLookup {
    /// The symbol exists and its address is executable code.
    Callable(usize),
    /// The symbol exists but is not a function (e.g. exported data).
    NotCallable,
    /// No such symbol.
    Missing,
}

/// Anything that can answer "is `name` exported, and is it callable?".
pub trait SymbolSource {
    fn lookup(&self, symbol: &str) -> SymbolLookup;
}

// ---------------------------------------------------------------------------
// Routine table
// ---------------------------------------------------------------------------

/// One resolved routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRoutine {
    pub routine: Routine,
    pub spelling: Spelling,
    pub(crate) address: usize,
}

impl ResolvedRoutine {
    /// The exact symbol name that resolved.
    pub fn symbol(&self) -> String {
        self.spelling.symbol(self.routine)
    }
}

/// Every required routine, resolved. Immutable once built.
///
/// Addresses are stored as `usize` so the table is `Send`; they are only
/// meaningful while the library they came from stays loaded.
#[derive(Clone, PartialEq, Eq)]
pub struct RoutineTable {
    entries: Vec<ResolvedRoutine>,
}

impl RoutineTable {
    /// The resolution for `routine`.
    pub fn get(&self, routine: Routine) -> &ResolvedRoutine {
        &self.entries[routine.index()]
    }

    /// Raw address of `routine`.
    pub(crate) fn address(&self, routine: Routine) -> usize {
        self.get(routine).address
    }

    /// All resolutions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedRoutine> {
        self.entries.iter()
    }

    /// How many routines resolved under the decorated spelling.
    pub fn decorated_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|r| r.spelling == Spelling::Decorated)
            .count()
    }
}

impl fmt::Debug for RoutineTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|r| (r.routine.name(), r.symbol())))
            .finish()
    }
}

/// Resolve every required routine from `source`.
///
/// # Errors
///
/// Returns [`FvsError::MissingRoutines`] naming every routine that resolved
/// under neither spelling.
pub fn resolve_routines<S: SymbolSource + ?Sized>(source: &S) -> Result<RoutineTable> {
    let mut entries = Vec::with_capacity(ROUTINE_COUNT);
    let mut missing = Vec::new();

    for routine in Routine::ALL {
        match resolve_one(source, routine) {
            Some(resolved) => {
                if resolved.spelling == Spelling::Plain {
                    tracing::debug!("found {routine} as expected");
                } else {
                    tracing::debug!("found {routine} renamed as {}", resolved.symbol());
                }
                entries.push(resolved);
            }
            None => missing.push(routine.name().to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(FvsError::MissingRoutines { missing });
    }

    Ok(RoutineTable { entries })
}

fn resolve_one<S: SymbolSource + ?Sized>(source: &S, routine: Routine) -> Option<ResolvedRoutine> {
    for spelling in [Spelling::Plain, Spelling::Decorated] {
        let symbol = spelling.symbol(routine);
        tracing::trace!("resolving symbol '{symbol}'");

        match source.lookup(&symbol) {
            SymbolLookup::Callable(address) => {
                return Some(ResolvedRoutine {
                    routine,
                    spelling,
                    address,
                });
            }
            SymbolLookup::NotCallable => {
                tracing::debug!("symbol '{symbol}' is exported but not callable");
            }
            SymbolLookup::Missing => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Variant identifier
// ---------------------------------------------------------------------------

/// Derive the variant code from a library path.
///
/// Takes the filename up to its first `.`, drops everything up to and
/// including the last [`VARIANT_MARKER`], and upper-cases the rest:
/// `/usr/local/lib/FVSso.so` gives `SO`, `libFVSpn.so` gives `PN`.
/// A filename without the marker yields its whole upper-cased stem.
pub fn variant_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    let code = stem.rsplit(VARIANT_MARKER).next().unwrap_or(stem);
    code.to_uppercase()
}

/// Whether the filename carries the [`VARIANT_MARKER`].
pub fn has_variant_marker(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().contains(VARIANT_MARKER))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    /// In-memory symbol table standing in for a loaded library.
    #[derive(Default)]
    struct FakeLibrary {
        symbols: HashMap<String, SymbolLookup>,
    }

    impl FakeLibrary {
        fn with_spelling(spelling: Spelling) -> Self {
            let mut lib = Self::default();
            for (i, routine) in Routine::ALL.iter().enumerate() {
                lib.export(&spelling.symbol(*routine), SymbolLookup::Callable(0x1000 + i));
            }
            lib
        }

        fn export(&mut self, symbol: &str, lookup: SymbolLookup) {
            self.symbols.insert(symbol.to_string(), lookup);
        }

        fn remove(&mut self, symbol: &str) {
            self.symbols.remove(symbol);
        }
    }

    impl SymbolSource for FakeLibrary {
        fn lookup(&self, symbol: &str) -> SymbolLookup {
            self.symbols
                .get(symbol)
                .copied()
                .unwrap_or(SymbolLookup::Missing)
        }
    }

    fn all_names_except(skip: &[Routine]) -> Vec<String> {
        Routine::ALL
            .iter()
            .filter(|r| !skip.contains(r))
            .map(|r| r.name().to_string())
            .collect()
    }

    #[test]
    fn resolves_plain_names() {
        let table = resolve_routines(&FakeLibrary::with_spelling(Spelling::Plain)).unwrap();
        assert_eq!(table.iter().count(), ROUTINE_COUNT);
        assert_eq!(table.decorated_count(), 0);
        assert_eq!(table.get(Routine::StandId).symbol(), "fvsStandID");
    }

    #[test]
    fn resolves_decorated_names() {
        let table = resolve_routines(&FakeLibrary::with_spelling(Spelling::Decorated)).unwrap();
        assert_eq!(table.decorated_count(), ROUTINE_COUNT);
        assert_eq!(table.get(Routine::SetCmdLine).symbol(), "fvssetcmdline_");
        assert_eq!(table.address(Routine::Fvs), 0x1000);
    }

    #[test]
    fn plain_spelling_wins_when_both_exist() {
        let mut lib = FakeLibrary::with_spelling(Spelling::Decorated);
        lib.export("fvsDimSizes", SymbolLookup::Callable(0xdead));
        let table = resolve_routines(&lib).unwrap();
        let dims = table.get(Routine::DimSizes);
        assert_eq!(dims.spelling, Spelling::Plain);
        assert_eq!(dims.address, 0xdead);
    }

    #[test]
    fn mixed_spellings_resolve() {
        let mut lib = FakeLibrary::with_spelling(Spelling::Plain);
        lib.remove("fvsSummary");
        lib.export("fvssummary_", SymbolLookup::Callable(0x2000));
        let table = resolve_routines(&lib).unwrap();
        assert_eq!(table.get(Routine::Summary).spelling, Spelling::Decorated);
        assert_eq!(table.decorated_count(), 1);
    }

    #[test]
    fn missing_lists_every_name_in_order() {
        let mut lib = FakeLibrary::default();
        lib.export("fvs", SymbolLookup::Callable(0x1000));

        let err = resolve_routines(&lib).unwrap_err();
        match &err {
            FvsError::MissingRoutines { missing } => {
                assert_eq!(*missing, all_names_except(&[Routine::Fvs]));
            }
            other => panic!("expected MissingRoutines, got {other:?}"),
        }
        assert!(err.to_string().starts_with("fvsAddActivity, fvsAddTrees, "));
        assert!(err.to_string().ends_with("(maybe they weren't exported when library was built)"));
    }

    #[test]
    fn non_callable_symbol_counts_as_missing() {
        let mut lib = FakeLibrary::with_spelling(Spelling::Plain);
        lib.export("fvs", SymbolLookup::NotCallable);

        match resolve_routines(&lib).unwrap_err() {
            FvsError::MissingRoutines { missing } => assert_eq!(missing, vec!["fvs"]),
            other => panic!("expected MissingRoutines, got {other:?}"),
        }
    }

    #[test]
    fn non_callable_plain_falls_back_to_decorated() {
        let mut lib = FakeLibrary::with_spelling(Spelling::Plain);
        lib.export("fvsTreeAttr", SymbolLookup::NotCallable);
        lib.export("fvstreeattr_", SymbolLookup::Callable(0x3000));
        let table = resolve_routines(&lib).unwrap();
        assert_eq!(table.get(Routine::TreeAttr).spelling, Spelling::Decorated);
    }

    #[test]
    fn every_symbol_non_callable_lists_all() {
        let mut lib = FakeLibrary::default();
        for routine in Routine::ALL {
            lib.export(routine.name(), SymbolLookup::NotCallable);
        }
        match resolve_routines(&lib).unwrap_err() {
            FvsError::MissingRoutines { missing } => {
                assert_eq!(missing, all_names_except(&[]));
            }
            other => panic!("expected MissingRoutines, got {other:?}"),
        }
    }

    #[test]
    fn variant_examples() {
        assert_eq!(variant_from_path(Path::new("/not/a/real/dir/FVSxx.so")), "XX");
        assert_eq!(variant_from_path(Path::new("/usr/local/lib/FVSso.so")), "SO");
        assert_eq!(variant_from_path(Path::new("libFVSpn.so")), "PN");
        assert_eq!(variant_from_path(Path::new("FVSie.dll")), "IE");
        assert_eq!(variant_from_path(Path::new("libFVSyz.so.1.2")), "YZ");
        assert_eq!(variant_from_path(Path::new("libforest.so")), "LIBFOREST");
        assert!(has_variant_marker(Path::new("/lib/FVSak.so")));
        assert!(!has_variant_marker(Path::new("/lib/fvsak.so")));
    }

    proptest! {
        #[test]
        fn variant_is_upper_cased_suffix(
            dir in "[a-z/]{0,12}",
            prefix in "(lib)?",
            code in "[a-z]{1,4}",
            ext in "(so|dylib|dll)",
        ) {
            let path = format!("{dir}/{prefix}FVS{code}.{ext}");
            prop_assert_eq!(variant_from_path(Path::new(&path)), code.to_uppercase());
        }
    }
}
