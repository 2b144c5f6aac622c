// SPDX-License-Identifier: Apache-2.0
//! # fvs-ffi
//!
//! Runtime binding and session control for the Forest Vegetation Simulator
//! (FVS) shared libraries.
//!
//! FVS ships one shared library per regional variant (`FVSso.so`,
//! `FVSpn.so`, ...). This crate loads such a library with `dlopen`, resolves
//! its 19 C-callable routines under either export spelling (`fvsSetCmdLine`
//! or `fvssetcmdline_`), and drives the engine through its step-wise
//! protocol: hand it a keyfile, run until a stop point or the end of a
//! stand, then query status, dimensions and attributes.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │   client / fvs   │
//!                  └────────┬─────────┘
//!                           │ RunOutcome, Dimensions, attributes
//!                  ┌────────┴─────────┐
//!                  │     fvs-ffi      │
//!                  │                  │
//!                  │  FvsSession      │ ← keyfile, stop points, run loop
//!                  │  FvsLibrary      │ ← dlopen + dual-spelling dlsym
//!                  │  RoutineTable    │ ← resolved routines, immutable
//!                  └────────┬─────────┘
//!                           │ C ABI (extern "C", by reference)
//!               ┌───────────┴───────────┐
//!               │  FVS variant .so      │
//!               │  (e.g. FVSso, FVSpn)  │
//!               └───────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fvs_ffi::FvsSession;
//!
//! let mut fvs = FvsSession::open("/usr/local/lib/FVSso.so")
//!     .expect("failed to load FVS");
//! fvs.load_keyfile("stand.key").expect("failed to read keyfile");
//!
//! // Pause right after the inventory is loaded.
//! let outcome = fvs.run(Some(7), None).expect("run failed");
//! println!("{} stopped at {:?}", fvs.variant(), outcome.stopped_at());
//!
//! let dims = fvs.dimensions().expect("dimensions");
//! println!("{} trees on {} plots", dims.ntrees, dims.nplots);
//!
//! // Finish every stand, then let the engine close its output.
//! while fvs.run(Some(0), None).expect("run failed").status.code() == 0 {}
//! ```

pub mod attributes;
pub mod error;
pub mod ffi;
pub mod library;
pub mod resolver;
pub mod routines;
pub mod session;
pub mod status;

// Re-export the most commonly used types at crate root.
pub use attributes::{NewTree, SpeciesCode, SummaryRow, SvsDimensions};
pub use error::{FvsError, Result};
pub use library::FvsLibrary;
pub use resolver::{RoutineTable, SymbolLookup, SymbolSource, resolve_routines, variant_from_path};
pub use routines::{Routine, Spelling};
pub use session::{Dimensions, FvsSession, Keyfile, StandIdentifiers};
pub use status::{RestartCode, RunOutcome, RunStatus, StopPoint, StopPointCode, StopPointRequest, StopYear};
