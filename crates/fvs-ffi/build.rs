// SPDX-License-Identifier: Apache-2.0
//! Build script: compile the mock FVS engine into several shared libraries
//! for the integration tests.
//!
//! Each flavour exercises a different export layout:
//!
//! | library             | flags                  | exports                          |
//! |---------------------|------------------------|----------------------------------|
//! | `libFVSmk`          | none                   | all routines, plain spelling     |
//! | `libFVSmu`          | `MOCK_FORTRAN_NAMES`   | all routines, `lower_` spelling  |
//! | `libFVSmx`          | `MOCK_INCOMPLETE`      | only `fvs`                       |
//! | `libFVSmd`          | `MOCK_DATA_SYMBOL`     | `fvs` exported as data           |

use std::env;
use std::path::PathBuf;
use std::process::Command;

const MOCK_SRC: &str = "mock_engine/mock_fvs.c";

/// (library stem, preprocessor define, env var carrying the path)
const FLAVOURS: &[(&str, Option<&str>, &str)] = &[
    ("libFVSmk", None, "MOCK_FVS_PATH"),
    (
        "libFVSmu",
        Some("MOCK_FORTRAN_NAMES"),
        "MOCK_FVS_UNDERSCORE_PATH",
    ),
    ("libFVSmx", Some("MOCK_INCOMPLETE"), "MOCK_FVS_INCOMPLETE_PATH"),
    ("libFVSmd", Some("MOCK_DATA_SYMBOL"), "MOCK_FVS_DATA_SYMBOL_PATH"),
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Only build the mock engine if the source exists (it's part of this crate).
    if !std::path::Path::new(MOCK_SRC).exists() {
        return;
    }

    let ext = if cfg!(target_os = "macos") {
        "dylib"
    } else {
        "so"
    };

    for (stem, define, env_var) in FLAVOURS {
        let so_path = out_dir.join(format!("{stem}.{ext}"));

        let mut cmd = Command::new("cc");
        cmd.args(["-shared", "-fPIC", "-o"])
            .arg(&so_path)
            .arg(MOCK_SRC)
            .args(["-Wall", "-Wextra", "-O2"]);
        if let Some(define) = define {
            cmd.arg(format!("-D{define}"));
        }

        let status = cmd.status().expect("failed to invoke C compiler");
        assert!(
            status.success(),
            "failed to compile mock FVS engine {stem}: {status}"
        );

        println!("cargo:rustc-env={env_var}={}", so_path.display());
    }

    // Re-run if the mock engine source changes.
    println!("cargo:rerun-if-changed={MOCK_SRC}");
}
