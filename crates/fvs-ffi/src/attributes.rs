// SPDX-License-Identifier: Apache-2.0
//! Typed wrappers over the engine's attribute, table and input routines.
//!
//! The attribute routines share one calling shape: a name and its length, a
//! `"get"`/`"set"` action, a value buffer, and a trailing return code. A
//! non-zero return code becomes [`FvsError::Attribute`].

use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use crate::error::{FvsError, Result};
use crate::ffi;
use crate::routines::Routine;
use crate::session::{FvsSession, fixed_field, to_c_len};

/// Column order of the attribute block passed to `fvsAddTrees`.
pub const ADD_TREE_COLUMNS: [&str; 8] = ["plot", "tpa", "species", "dbh", "dg", "ht", "htg", "cratio"];

/// Column names of one row of the per-cycle summary table.
pub const SUMMARY_FIELDS: [&str; ffi::SUMMARY_COLUMNS] = [
    "Year", "Age", "Tpa", "TCuFt", "MCuFt", "BdFt", "RTpa", "RTCuFt", "RMCuFt", "RBdFt", "ATBA",
    "ATCCF", "ATTopHt", "PrdLen", "Acc", "Mort", "SampWt", "ForTyp", "SizeCls", "StkCls",
];

/// One tree record for [`FvsSession::add_trees`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NewTree {
    pub plot: f64,
    pub tpa: f64,
    pub species: f64,
    pub dbh: f64,
    pub dg: f64,
    pub ht: f64,
    pub htg: f64,
    pub cratio: f64,
}

impl NewTree {
    fn columns(&self) -> [f64; ADD_TREE_COLUMNS.len()] {
        [
            self.plot,
            self.tpa,
            self.species,
            self.dbh,
            self.dg,
            self.ht,
            self.htg,
            self.cratio,
        ]
    }
}

/// Current and maximum SVS object counts (`fvsSVSDimSizes`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SvsDimensions {
    pub nsvsobjs: i32,
    pub ndeadobjs: i32,
    pub ncwdobjs: i32,
    pub mxsvsobjs: i32,
    pub mxdeadobjs: i32,
    pub mxcwdobjs: i32,
}

/// The three codes the engine knows a species by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesCode {
    pub fvs: String,
    pub fia: String,
    pub plants: String,
}

/// One row of the per-cycle summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRow {
    pub values: [i32; ffi::SUMMARY_COLUMNS],
}

impl SummaryRow {
    /// Value of the named column (see [`SUMMARY_FIELDS`]).
    pub fn get(&self, field: &str) -> Option<i32> {
        SUMMARY_FIELDS
            .iter()
            .position(|f| f.eq_ignore_ascii_case(field))
            .map(|i| self.values[i])
    }

    pub fn year(&self) -> i32 {
        self.values[0]
    }
}

/// A name marshalled for the engine: NUL-terminated text plus its length.
struct AttrName<'a> {
    name: &'a str,
    text: CString,
    nch: c_int,
}

impl<'a> AttrName<'a> {
    fn new(name: &'a str) -> Result<Self> {
        let nch = to_c_len(name.len())?;
        let text = CString::new(name)
            .map_err(|_| FvsError::InvalidArgument(format!("name {name:?} contains a NUL byte")))?;
        Ok(Self { name, text, nch })
    }

    fn check(&self, routine: Routine, code: c_int) -> Result<()> {
        if code == 0 {
            Ok(())
        } else {
            Err(FvsError::Attribute {
                routine: routine.name(),
                name: self.name.to_string(),
                code,
            })
        }
    }
}

fn action(set: bool) -> *const c_char {
    let action = if set { ffi::ACTION_SET } else { ffi::ACTION_GET };
    action.as_ptr().cast()
}

fn count(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

impl FvsSession {
    // -----------------------------------------------------------------------
    // Tree, species and event monitor attributes
    // -----------------------------------------------------------------------

    /// One value of attribute `name` per tree in memory.
    pub fn tree_attr(&self, name: &str) -> Result<Vec<f64>> {
        let ntrees = self.dimensions()?.ntrees;
        let mut values = vec![0.0; count(ntrees)];
        self.tree_attr_raw(name, false, ntrees, &mut values)?;
        Ok(values)
    }

    /// Overwrite attribute `name` for every tree in memory.
    ///
    /// # Errors
    ///
    /// [`FvsError::InvalidArgument`] unless exactly one value per tree is
    /// given.
    pub fn set_tree_attr(&self, name: &str, values: &[f64]) -> Result<()> {
        let ntrees = self.dimensions()?.ntrees;
        if values.len() != count(ntrees) {
            return Err(FvsError::InvalidArgument(format!(
                "{} values given for {ntrees} trees",
                values.len()
            )));
        }
        let mut values = values.to_vec();
        self.tree_attr_raw(name, true, ntrees, &mut values)
    }

    fn tree_attr_raw(&self, name: &str, set: bool, ntrees: c_int, values: &mut [f64]) -> Result<()> {
        let name = AttrName::new(name)?;
        let mut rtn: c_int = 0;
        // SAFETY: `values` holds `ntrees` elements, and every other pointer
        // refers to a live local or a NUL-terminated constant.
        unsafe {
            (self.library.fn_tree_attr())(
                name.text.as_ptr(),
                &name.nch,
                action(set),
                &ntrees,
                values.as_mut_ptr(),
                &mut rtn,
            );
        }
        name.check(Routine::TreeAttr, rtn)
    }

    /// One value of attribute `name` per species the variant defines.
    pub fn species_attr(&self, name: &str) -> Result<Vec<f64>> {
        let maxspecies = self.dimensions()?.maxspecies;
        let mut values = vec![0.0; count(maxspecies)];
        self.species_attr_raw(name, false, &mut values)?;
        Ok(values)
    }

    /// Overwrite attribute `name` for every species.
    pub fn set_species_attr(&self, name: &str, values: &[f64]) -> Result<()> {
        let maxspecies = self.dimensions()?.maxspecies;
        if values.len() != count(maxspecies) {
            return Err(FvsError::InvalidArgument(format!(
                "{} values given for {maxspecies} species",
                values.len()
            )));
        }
        let mut values = values.to_vec();
        self.species_attr_raw(name, true, &mut values)
    }

    fn species_attr_raw(&self, name: &str, set: bool, values: &mut [f64]) -> Result<()> {
        let name = AttrName::new(name)?;
        let mut rtn: c_int = 0;
        // SAFETY: `values` holds `maxspecies` elements, the count the engine
        // reads or writes.
        unsafe {
            (self.library.fn_species_attr())(
                name.text.as_ptr(),
                &name.nch,
                action(set),
                values.as_mut_ptr(),
                &mut rtn,
            );
        }
        name.check(Routine::SpeciesAttr, rtn)
    }

    /// Current value of an event monitor variable.
    pub fn evmon_attr(&self, name: &str) -> Result<f64> {
        let mut value = 0.0;
        self.evmon_attr_raw(name, false, &mut value)?;
        Ok(value)
    }

    /// Set (or define) an event monitor variable.
    pub fn set_evmon_attr(&self, name: &str, value: f64) -> Result<()> {
        let mut value = value;
        self.evmon_attr_raw(name, true, &mut value)
    }

    fn evmon_attr_raw(&self, name: &str, set: bool, value: &mut f64) -> Result<()> {
        self.require_keyfile()?;
        let name = AttrName::new(name)?;
        let mut rtn: c_int = 0;
        // SAFETY: one value slot, live for the call.
        unsafe {
            (self.library.fn_evmon_attr())(name.text.as_ptr(), &name.nch, action(set), value, &mut rtn);
        }
        name.check(Routine::EvmonAttr, rtn)
    }

    // -----------------------------------------------------------------------
    // Extensions: fire and fuels, stand visualization
    // -----------------------------------------------------------------------

    /// Fire and fuels extension attribute, `nobjs` values.
    pub fn ffe_attr(&self, name: &str, nobjs: usize) -> Result<Vec<f64>> {
        self.require_keyfile()?;
        let name = AttrName::new(name)?;
        let n = to_c_len(nobjs)?;
        let mut values = vec![0.0; nobjs];
        let mut rtn: c_int = 0;
        // SAFETY: `values` holds `nobjs` elements.
        unsafe {
            (self.library.fn_ffe_attrs())(
                name.text.as_ptr(),
                &name.nch,
                action(false),
                &n,
                values.as_mut_ptr(),
                &mut rtn,
            );
        }
        name.check(Routine::FfeAttrs, rtn)?;
        Ok(values)
    }

    /// Stand visualization object attribute, `nobjs` values.
    pub fn svs_obj_attr(&self, name: &str, nobjs: usize) -> Result<Vec<f64>> {
        self.require_keyfile()?;
        let name = AttrName::new(name)?;
        let n = to_c_len(nobjs)?;
        let mut values = vec![0.0; nobjs];
        let mut rtn: c_int = 0;
        // SAFETY: `values` holds `nobjs` elements.
        unsafe {
            (self.library.fn_svs_obj_data())(
                name.text.as_ptr(),
                &name.nch,
                action(false),
                &n,
                values.as_mut_ptr(),
                &mut rtn,
            );
        }
        name.check(Routine::SvsObjData, rtn)?;
        Ok(values)
    }

    /// Current and maximum stand visualization object counts.
    pub fn svs_dimensions(&self) -> Result<SvsDimensions> {
        self.require_keyfile()?;
        let mut d = SvsDimensions::default();
        // SAFETY: every out-pointer refers to a field of a live local.
        unsafe {
            (self.library.fn_svs_dim_sizes())(
                &mut d.nsvsobjs,
                &mut d.ndeadobjs,
                &mut d.ncwdobjs,
                &mut d.mxsvsobjs,
                &mut d.mxdeadobjs,
                &mut d.mxcwdobjs,
            );
        }
        Ok(d)
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    /// Codes of species `index` (1-based).
    pub fn species_code(&self, index: i32) -> Result<SpeciesCode> {
        self.require_keyfile()?;
        let mut fvs = [0 as c_char; ffi::SPECIES_CODE_LEN + 1];
        let mut fia = [0 as c_char; ffi::SPECIES_CODE_LEN + 1];
        let mut plants = [0 as c_char; ffi::SPECIES_CODE_LEN + 1];
        let (mut nfvs, mut nfia, mut nplants): (c_int, c_int, c_int) = (0, 0, 0);
        let mut rtn: c_int = 0;

        // SAFETY: each code buffer is wider than any species code field.
        unsafe {
            (self.library.fn_species_code())(
                fvs.as_mut_ptr(),
                fia.as_mut_ptr(),
                plants.as_mut_ptr(),
                &index,
                &mut nfvs,
                &mut nfia,
                &mut nplants,
                &mut rtn,
            );
        }
        if rtn != 0 {
            return Err(FvsError::Attribute {
                routine: Routine::SpeciesCode.name(),
                name: index.to_string(),
                code: rtn,
            });
        }

        Ok(SpeciesCode {
            fvs: fixed_field(&fvs, nfvs),
            fia: fixed_field(&fia, nfia),
            plants: fixed_field(&plants, nplants),
        })
    }

    /// The per-cycle summary table of the stand in memory.
    pub fn summary(&self) -> Result<Vec<SummaryRow>> {
        self.require_keyfile()?;

        let (ncycle, maxcol) = {
            let mut row = [0 as c_int; ffi::SUMMARY_COLUMNS];
            let (ncycle, _maxrow, maxcol) = self.summary_row(0, &mut row)?;
            (ncycle, maxcol)
        };
        if count(maxcol) != ffi::SUMMARY_COLUMNS {
            tracing::debug!("engine reports {maxcol} summary columns; reading {}", ffi::SUMMARY_COLUMNS);
        }

        let width = count(maxcol).max(ffi::SUMMARY_COLUMNS);
        let mut rows = Vec::with_capacity(count(ncycle));
        for icycle in 1..=ncycle {
            let mut buf = vec![0 as c_int; width];
            self.summary_row(icycle, &mut buf)?;
            let mut values = [0; ffi::SUMMARY_COLUMNS];
            values.copy_from_slice(&buf[..ffi::SUMMARY_COLUMNS]);
            rows.push(SummaryRow { values });
        }
        Ok(rows)
    }

    /// Read one summary row; returns `(ncycle, maxrow, maxcol)`.
    fn summary_row(&self, icycle: c_int, row: &mut [c_int]) -> Result<(c_int, c_int, c_int)> {
        let (mut ncycle, mut maxrow, mut maxcol): (c_int, c_int, c_int) = (0, 0, 0);
        let mut rtn: c_int = 0;
        // SAFETY: `row` is at least as wide as the engine's summary row.
        unsafe {
            (self.library.fn_summary())(
                row.as_mut_ptr(),
                &icycle,
                &mut ncycle,
                &mut maxrow,
                &mut maxcol,
                &mut rtn,
            );
        }
        if rtn != 0 {
            return Err(FvsError::Attribute {
                routine: Routine::Summary.name(),
                name: format!("cycle {icycle}"),
                code: rtn,
            });
        }
        Ok((ncycle, maxrow, maxcol))
    }

    /// Conversion factor for a named unit conversion, e.g. `"FTtoM"`.
    pub fn unit_conversion(&self, name: &str) -> Result<f64> {
        self.require_keyfile()?;
        let name = AttrName::new(name)?;
        let mut value = 0.0;
        let mut rtn: c_int = 0;
        // SAFETY: one value slot, live for the call.
        unsafe {
            (self.library.fn_unit_conversion())(name.text.as_ptr(), &name.nch, &mut value, &mut rtn);
        }
        name.check(Routine::UnitConversion, rtn)?;
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Append trees to the stand in memory.
    ///
    /// Only accepted while the engine is paused inside a stand.
    pub fn add_trees(&self, trees: &[NewTree]) -> Result<()> {
        self.require_keyfile()?;
        if trees.is_empty() {
            return Ok(());
        }
        let ntrees = to_c_len(trees.len())?;

        let mut block = vec![0.0; trees.len() * ADD_TREE_COLUMNS.len()];
        for (row, tree) in trees.iter().enumerate() {
            for (col, value) in tree.columns().into_iter().enumerate() {
                block[col * trees.len() + row] = value;
            }
        }

        let mut rtn: c_int = 0;
        // SAFETY: `block` holds 8 columns of `ntrees` values.
        unsafe { (self.library.fn_add_trees())(block.as_ptr(), &ntrees, &mut rtn) };
        if rtn != 0 {
            return Err(FvsError::Attribute {
                routine: Routine::AddTrees.name(),
                name: format!("{} trees", trees.len()),
                code: rtn,
            });
        }
        tracing::debug!("added {} trees", trees.len());
        Ok(())
    }

    /// Schedule activity `activity_code` in `year` with its parameters.
    pub fn add_activity(&self, year: i32, activity_code: i32, params: &[f64]) -> Result<()> {
        self.require_keyfile()?;
        let nprms = to_c_len(params.len())?;
        let mut rtn: c_int = 0;
        // SAFETY: `params` holds `nprms` values and is only read.
        unsafe {
            (self.library.fn_add_activity())(&year, &activity_code, params.as_ptr(), &nprms, &mut rtn);
        }
        if rtn != 0 {
            return Err(FvsError::Attribute {
                routine: Routine::AddActivity.name(),
                name: format!("activity {activity_code} in {year}"),
                code: rtn,
            });
        }
        Ok(())
    }
}
