// SPDX-License-Identifier: Apache-2.0
//! Load an FVS shared library and resolve its routines.
//!
//! This module handles the `dlopen` + dual-spelling `dlsym` dance. The
//! library handle lives as long as the [`FvsLibrary`], so the function
//! pointers handed out by its accessors never outlive the code they point
//! into.

use std::ffi::c_void;
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::error::{FvsError, Result};
use crate::ffi;
use crate::resolver::{self, RoutineTable, SymbolLookup, SymbolSource};
use crate::routines::Routine;

/// A loaded FVS library with every required routine resolved.
///
/// Not `Clone`: each `FvsLibrary` is one independent `dlopen`. Note that
/// loading the *same* file twice yields the same process-global engine
/// state, so two libraries over one file must not be driven at once.
pub struct FvsLibrary {
    /// Prevent the shared library from being unloaded.
    _library: Library,

    /// Absolute path the library was loaded from.
    path: PathBuf,

    /// Variant code derived from the filename (e.g. "SO", "PN").
    variant: String,

    table: RoutineTable,
}

impl FvsLibrary {
    /// Load an FVS shared library and resolve all required routines.
    ///
    /// # Errors
    ///
    /// Returns [`FvsError::LoadFailed`] if `dlopen` fails, or
    /// [`FvsError::MissingRoutines`] listing every routine that is not
    /// exported as a callable under either spelling.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let path_str = path.display().to_string();

        // SAFETY: we are loading an external shared library. The caller is
        // responsible for ensuring the library is trustworthy.
        let library = unsafe { Library::new(&path) }.map_err(|e| FvsError::LoadFailed {
            path: path_str.clone(),
            cause: e.to_string(),
        })?;

        let variant = resolver::variant_from_path(&path);
        if !resolver::has_variant_marker(&path) {
            tracing::warn!(
                "library name '{path_str}' lacks the '{}' marker; using '{variant}' as variant",
                resolver::VARIANT_MARKER
            );
        }

        let source = LoadedSymbols {
            library: &library,
            regions: ExecutableRegions::snapshot(),
        };
        let table = resolver::resolve_routines(&source)?;

        tracing::info!(
            "loaded FVS library '{path_str}' (variant {variant}, {} decorated routine names)",
            table.decorated_count()
        );

        Ok(Self {
            _library: library,
            path,
            variant,
            table,
        })
    }

    /// The variant code, e.g. `"SO"`.
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Absolute path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How each routine was resolved.
    pub fn routines(&self) -> &RoutineTable {
        &self.table
    }

    fn raw(&self, routine: Routine) -> *const c_void {
        self.table.address(routine) as *const c_void
    }
}

/// Typed accessors over the routine table.
///
/// Each transmutes the resolved address to the routine's declared signature.
macro_rules! routine_accessors {
    ($($method:ident => $routine:ident : $ty:ty),* $(,)?) => {
        impl FvsLibrary {
            $(
                #[inline]
                pub(crate) fn $method(&self) -> $ty {
                    // SAFETY: the address was resolved from this library as a
                    // callable symbol under the routine's name, and `$ty`
                    // matches the routine's C signature. The library is kept
                    // alive by `self`.
                    unsafe { std::mem::transmute::<*const c_void, $ty>(self.raw(Routine::$routine)) }
                }
            )*
        }
    };
}

routine_accessors! {
    fn_fvs => Fvs: ffi::FnFvs,
    fn_set_cmd_line => SetCmdLine: ffi::FnSetCmdLine,
    fn_set_stoppoint_codes => SetStoppointCodes: ffi::FnSetStoppointCodes,
    fn_get_rtn_code => GetRtnCode: ffi::FnGetRtnCode,
    fn_get_restart_code => GetRestartCode: ffi::FnGetRestartCode,
    fn_get_ic_code => GetICCode: ffi::FnGetICCode,
    fn_dim_sizes => DimSizes: ffi::FnDimSizes,
    fn_svs_dim_sizes => SvsDimSizes: ffi::FnSvsDimSizes,
    fn_stand_id => StandId: ffi::FnStandId,
    fn_tree_attr => TreeAttr: ffi::FnTreeAttr,
    fn_species_attr => SpeciesAttr: ffi::FnSpeciesAttr,
    fn_evmon_attr => EvmonAttr: ffi::FnEvmonAttr,
    fn_ffe_attrs => FfeAttrs: ffi::FnFfeAttrs,
    fn_svs_obj_data => SvsObjData: ffi::FnSvsObjData,
    fn_unit_conversion => UnitConversion: ffi::FnUnitConversion,
    fn_species_code => SpeciesCode: ffi::FnSpeciesCode,
    fn_summary => Summary: ffi::FnSummary,
    fn_add_trees => AddTrees: ffi::FnAddTrees,
    fn_add_activity => AddActivity: ffi::FnAddActivity,
}

impl Drop for FvsLibrary {
    fn drop(&mut self) {
        tracing::debug!(
            "releasing FVS library '{}' (variant {})",
            self.path.display(),
            self.variant
        );
    }
}

#[allow(clippy::missing_fields_in_debug)]
impl fmt::Debug for FvsLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FvsLibrary")
            .field("path", &self.path)
            .field("variant", &self.variant)
            .field("routines", &self.table)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// libloading-backed symbol source
// ---------------------------------------------------------------------------

struct LoadedSymbols<'lib> {
    library: &'lib Library,
    regions: Option<ExecutableRegions>,
}

impl SymbolSource for LoadedSymbols<'_> {
    fn lookup(&self, symbol: &str) -> SymbolLookup {
        // SAFETY: we only read the symbol's address, never call or
        // dereference it here.
        let sym: Symbol<'_, *const c_void> = match unsafe { self.library.get(symbol.as_bytes()) } {
            Ok(sym) => sym,
            Err(_) => return SymbolLookup::Missing,
        };
        let address = *sym as usize;

        if address == 0 {
            return SymbolLookup::Missing;
        }

        match &self.regions {
            Some(regions) if !regions.contains(address) => SymbolLookup::NotCallable,
            _ => SymbolLookup::Callable(address),
        }
    }
}

// ---------------------------------------------------------------------------
// Executable mappings
// ---------------------------------------------------------------------------

/// Address ranges mapped executable in this process.
///
/// `dlsym` does not say whether a symbol is code or data, so a found symbol
/// is only accepted as callable when it lies inside one of these ranges.
/// Available on Linux (from `/proc/self/maps`); elsewhere every found symbol
/// is assumed callable.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExecutableRegions {
    ranges: Vec<(usize, usize)>,
}

impl ExecutableRegions {
    /// Read the current executable mappings, if the platform exposes them.
    pub(crate) fn snapshot() -> Option<Self> {
        if !cfg!(target_os = "linux") {
            return None;
        }
        match std::fs::read_to_string("/proc/self/maps") {
            Ok(maps) => Some(Self::parse(&maps)),
            Err(e) => {
                tracing::debug!("cannot read /proc/self/maps ({e}); assuming symbols are callable");
                None
            }
        }
    }

    /// Parse `/proc/<pid>/maps` content: `start-end perms offset dev inode [path]`.
    pub(crate) fn parse(maps: &str) -> Self {
        let ranges = maps
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let range = fields.next()?;
                let perms = fields.next()?;
                if perms.as_bytes().get(2) != Some(&b'x') {
                    return None;
                }
                let (start, end) = range.split_once('-')?;
                let start = usize::from_str_radix(start, 16).ok()?;
                let end = usize::from_str_radix(end, 16).ok()?;
                Some((start, end))
            })
            .collect();
        Self { ranges }
    }

    pub(crate) fn contains(&self, address: usize) -> bool {
        self.ranges
            .iter()
            .any(|&(start, end)| (start..end).contains(&address))
    }
}
