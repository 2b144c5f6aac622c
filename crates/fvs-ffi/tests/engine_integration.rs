// SPDX-License-Identifier: Apache-2.0
//! Integration tests against a real FVS variant library.
//!
//! These tests only run when `FVS_LIBRARY_PATH` points to a compiled FVS
//! shared library and `FVS_KEYFILE_PATH` to a keyfile the engine accepts:
//!
//! ```bash
//! export FVS_LIBRARY_PATH=/opt/fvs/lib/FVSpn.so
//! export FVS_KEYFILE_PATH=$PWD/testdata/pn_stand.key
//! cargo test -p fvs-ffi --test engine_integration
//! ```
//!
//! The engine writes its report files next to the keyfile.

use std::sync::{Mutex, MutexGuard};

use fvs_ffi::{FvsError, FvsSession, RestartCode, RunStatus};

static ENGINE: Mutex<()> = Mutex::new(());

struct RealEngine {
    session: FvsSession,
    keyfile: String,
    _guard: MutexGuard<'static, ()>,
}

fn load_engine() -> Option<RealEngine> {
    let library = std::env::var("FVS_LIBRARY_PATH").ok()?;
    let keyfile = std::env::var("FVS_KEYFILE_PATH").ok()?;
    let guard = ENGINE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let session = FvsSession::open(&library).expect("failed to load FVS library");
    Some(RealEngine {
        session,
        keyfile,
        _guard: guard,
    })
}

/// Skip the test gracefully when no engine is available.
macro_rules! require_engine {
    () => {
        match load_engine() {
            Some(e) => e,
            None => {
                eprintln!("FVS_LIBRARY_PATH or FVS_KEYFILE_PATH not set; skipping engine test");
                return;
            }
        }
    };
}

#[test]
fn test_engine_status_lifecycle() {
    let mut engine = require_engine!();
    let (fvs, keyfile) = (&mut engine.session, engine.keyfile.clone());

    assert_eq!(fvs.status_code(), -1);
    assert!(matches!(fvs.dimensions(), Err(FvsError::NoKeyfile)));

    fvs.load_keyfile(&keyfile).unwrap();
    assert_eq!(fvs.status_code(), 0);
    assert!(matches!(fvs.stand_ids(), Err(FvsError::NoInventory)));
}

#[test]
fn test_engine_runs_stand_then_finishes() {
    let mut engine = require_engine!();
    let (fvs, keyfile) = (&mut engine.session, engine.keyfile.clone());
    fvs.load_keyfile(&keyfile).unwrap();

    let outcome = fvs.run(None, None).unwrap();
    assert_eq!(outcome.restart, RestartCode::StandComplete);
    assert_eq!(outcome.status, RunStatus::Running);

    // One call per remaining stand, then the finalizing call.
    let mut outcome = fvs.run(None, None).unwrap();
    while outcome.status == RunStatus::Running {
        assert_eq!(outcome.restart, RestartCode::StandComplete);
        outcome = fvs.run(None, None).unwrap();
    }
    assert_eq!(outcome.status, RunStatus::Finished);
}

#[test]
fn test_engine_pauses_at_stop_point() {
    let mut engine = require_engine!();
    let (fvs, keyfile) = (&mut engine.session, engine.keyfile.clone());
    fvs.load_keyfile(&keyfile).unwrap();

    // A projection that never reaches 2010 simply completes the stand.
    fvs.run(Some(2), Some(2010)).unwrap();
    assert_eq!(fvs.status_code(), 0);
    if fvs.restart_code() == 100 {
        return;
    }
    assert_eq!(fvs.restart_code(), 2);

    // The 2010 request is resent and must not pause in later cycles.
    fvs.run(None, None).unwrap();
    assert_eq!(fvs.restart_code(), 100);
    assert_eq!(fvs.stop_point_year(), Some(2010));
}

#[test]
fn test_engine_dimensions_after_inventory() {
    let mut engine = require_engine!();
    let (fvs, keyfile) = (&mut engine.session, engine.keyfile.clone());
    fvs.load_keyfile(&keyfile).unwrap();

    let before = fvs.dimensions().unwrap();
    assert_eq!((before.ntrees, before.ncycles, before.nplots), (0, 0, 0));
    assert!(before.maxtrees > 0);

    fvs.run(Some(-1), None).unwrap();
    let after = fvs.dimensions().unwrap();
    assert!(after.ntrees > 0);
    assert!(after.ncycles > 0);
    assert!(after.nplots > 0);
    assert!(!fvs.stand_ids().unwrap().stand_id.is_empty());
}
