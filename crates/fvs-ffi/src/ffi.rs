// SPDX-License-Identifier: Apache-2.0
//! Raw FFI constants and function pointer types for the FVS C-callable API.
//!
//! The FVS shared library is built from Fortran with a thin C layer. Every
//! argument is passed by reference, and no routine returns a value: results
//! come back through out-pointers, with a trailing `rtnCode` slot on the
//! attribute routines.
//!
//! All function pointers are resolved at runtime from the shared library
//! (see [`crate::resolver`]), never linked statically.

use std::os::raw::{c_char, c_int};

// ===========================================================================
// Run status codes (`itrncd`)
// ===========================================================================

/// FVS has not been started.
pub const ITRNCD_NOT_STARTED: c_int = -1;
/// FVS is in a good running state.
pub const ITRNCD_GOOD: c_int = 0;
/// FVS detected an error; new input must be supplied before continuing.
pub const ITRNCD_ERROR: c_int = 1;
/// FVS finished processing all stands; new input may be supplied.
pub const ITRNCD_FINISHED: c_int = 2;

// ===========================================================================
// Restart codes
// ===========================================================================

/// No stop has occurred yet.
pub const RESTART_INITIAL: c_int = 0;
/// One stand was completely processed.
pub const RESTART_STAND_COMPLETE: c_int = 100;

// ===========================================================================
// Stop-point codes and years
// ===========================================================================

/// Stop at every stop-point location.
pub const STOP_CODE_EVERY: c_int = -1;
/// Never stop.
pub const STOP_CODE_NEVER: c_int = 0;
/// Largest specific stop-point location.
pub const STOP_CODE_MAX: c_int = 7;

/// Never stop, regardless of code.
pub const STOP_YEAR_NEVER: c_int = 0;
/// Stop in every cycle.
pub const STOP_YEAR_EVERY_CYCLE: c_int = -1;

// ===========================================================================
// Fixed buffer sizes
// ===========================================================================

/// Width of the stand identifier field (`character(len=26)`).
pub const STAND_ID_LEN: usize = 26;
/// Width of the stand control number field (`character(len=40)`).
pub const STAND_CN_LEN: usize = 40;
/// Width of the management identifier field (`character(len=4)`).
pub const MGMT_ID_LEN: usize = 4;
/// Width of each species code field returned by `fvsSpeciesCode`.
pub const SPECIES_CODE_LEN: usize = 10;
/// Columns in one row of the per-cycle summary table.
pub const SUMMARY_COLUMNS: usize = 20;

/// Action strings accepted by the attribute routines (4 chars incl. NUL).
pub const ACTION_GET: &[u8; 4] = b"get\0";
pub const ACTION_SET: &[u8; 4] = b"set\0";

// ===========================================================================
// Function pointer types
// ===========================================================================

// -- Run control (6) --------------------------------------------------------

/// `void fvs(int *itrncd)`
pub type FnFvs = unsafe extern "C" fn(itrncd: *mut c_int);

/// `void fvsSetCmdLine(const char *cmdline, int *nch, int *itrncd)`
pub type FnSetCmdLine =
    unsafe extern "C" fn(cmdline: *const c_char, nch: *const c_int, itrncd: *mut c_int);

/// `void fvsSetStoppointCodes(int *spptcd, int *spptyr)`
pub type FnSetStoppointCodes = unsafe extern "C" fn(code: *const c_int, year: *const c_int);

/// `void fvsGetRtnCode(int *itrncd)`
pub type FnGetRtnCode = unsafe extern "C" fn(itrncd: *mut c_int);

/// `void fvsGetRestartCode(int *restart)`
pub type FnGetRestartCode = unsafe extern "C" fn(restart: *mut c_int);

/// `void fvsGetICCode(int *iccode)`
pub type FnGetICCode = unsafe extern "C" fn(iccode: *mut c_int);

// -- Dimensions and identity (3) --------------------------------------------

/// `void fvsDimSizes(int *ntrees, int *ncycles, int *nplots, int *maxtrees,
///                   int *maxspecies, int *maxplots, int *maxcycles)`
pub type FnDimSizes = unsafe extern "C" fn(
    ntrees: *mut c_int,
    ncycles: *mut c_int,
    nplots: *mut c_int,
    maxtrees: *mut c_int,
    maxspecies: *mut c_int,
    maxplots: *mut c_int,
    maxcycles: *mut c_int,
);

/// `void fvsSVSDimSizes(int *nsvsobjs, int *ndeadobjs, int *ncwdobjs,
///                      int *mxsvsobjs, int *mxdeadobjs, int *mxcwdobjs)`
pub type FnSvsDimSizes = unsafe extern "C" fn(
    nsvsobjs: *mut c_int,
    ndeadobjs: *mut c_int,
    ncwdobjs: *mut c_int,
    mxsvsobjs: *mut c_int,
    mxdeadobjs: *mut c_int,
    mxcwdobjs: *mut c_int,
);

/// `void fvsStandID(char *sid, char *scn, char *mid, int *ncsid, int *nccn, int *ncmid)`
pub type FnStandId = unsafe extern "C" fn(
    sid: *mut c_char,
    scn: *mut c_char,
    mid: *mut c_char,
    ncsid: *mut c_int,
    nccn: *mut c_int,
    ncmid: *mut c_int,
);

// -- Attribute access (6) ---------------------------------------------------

/// `void fvsTreeAttr(const char *name, int *nch, const char *action,
///                   int *ntrees, double *attr, int *rtncode)`
pub type FnTreeAttr = unsafe extern "C" fn(
    name: *const c_char,
    nch: *const c_int,
    action: *const c_char,
    ntrees: *const c_int,
    attr: *mut f64,
    rtncode: *mut c_int,
);

/// `void fvsSpeciesAttr(const char *name, int *nch, const char *action,
///                      double *attr, int *rtncode)`
pub type FnSpeciesAttr = unsafe extern "C" fn(
    name: *const c_char,
    nch: *const c_int,
    action: *const c_char,
    attr: *mut f64,
    rtncode: *mut c_int,
);

/// `void fvsEvmonAttr(const char *name, int *nch, const char *action,
///                    double *attr, int *rtncode)`
pub type FnEvmonAttr = unsafe extern "C" fn(
    name: *const c_char,
    nch: *const c_int,
    action: *const c_char,
    attr: *mut f64,
    rtncode: *mut c_int,
);

/// `void fvsFFEAttrs(const char *name, int *nch, const char *action,
///                   int *nobjs, double *attr, int *rtncode)`
pub type FnFfeAttrs = unsafe extern "C" fn(
    name: *const c_char,
    nch: *const c_int,
    action: *const c_char,
    nobjs: *const c_int,
    attr: *mut f64,
    rtncode: *mut c_int,
);

/// `void fvsSVSObjData(const char *name, int *nch, const char *action,
///                     int *nobjs, double *attr, int *rtncode)`
pub type FnSvsObjData = unsafe extern "C" fn(
    name: *const c_char,
    nch: *const c_int,
    action: *const c_char,
    nobjs: *const c_int,
    attr: *mut f64,
    rtncode: *mut c_int,
);

/// `void fvsUnitConversion(const char *name, int *nch, double *value, int *rtncode)`
pub type FnUnitConversion = unsafe extern "C" fn(
    name: *const c_char,
    nch: *const c_int,
    value: *mut f64,
    rtncode: *mut c_int,
);

// -- Tables and input (4) ---------------------------------------------------

/// `void fvsSpeciesCode(char *fvs, char *fia, char *plants, int *indx,
///                      int *nchfvs, int *nchfia, int *nchplants, int *rtncode)`
pub type FnSpeciesCode = unsafe extern "C" fn(
    fvs_code: *mut c_char,
    fia_code: *mut c_char,
    plants_code: *mut c_char,
    indx: *const c_int,
    nchfvs: *mut c_int,
    nchfia: *mut c_int,
    nchplants: *mut c_int,
    rtncode: *mut c_int,
);

/// `void fvsSummary(int *summary, int *icycle, int *ncycle, int *maxrow,
///                  int *maxcol, int *rtncode)`
pub type FnSummary = unsafe extern "C" fn(
    summary: *mut c_int,
    icycle: *const c_int,
    ncycle: *mut c_int,
    maxrow: *mut c_int,
    maxcol: *mut c_int,
    rtncode: *mut c_int,
);

/// `void fvsAddTrees(double *in_attrs, int *ntrees, int *rtncode)`
///
/// `in_attrs` is column-major: all plots, then all tpa, and so on in
/// [`crate::attributes::ADD_TREE_COLUMNS`] order.
pub type FnAddTrees =
    unsafe extern "C" fn(in_attrs: *const f64, ntrees: *const c_int, rtncode: *mut c_int);

/// `void fvsAddActivity(int *idt, int *iactk, double *inprms, int *nprms, int *rtncode)`
pub type FnAddActivity = unsafe extern "C" fn(
    idt: *const c_int,
    iactk: *const c_int,
    inprms: *const f64,
    nprms: *const c_int,
    rtncode: *mut c_int,
);
