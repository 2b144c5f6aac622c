//! Build script: compile the mock FVS engine from `fvs-ffi` so the binary
//! tests can drive `fvs` against a real shared library.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const MOCK_SRC: &str = "../fvs-ffi/mock_engine/mock_fvs.c";

/// (library stem, preprocessor define, env var carrying the path)
const FLAVOURS: &[(&str, Option<&str>, &str)] = &[
    ("libFVSmk", None, "MOCK_FVS_PATH"),
    (
        "libFVSmu",
        Some("MOCK_FORTRAN_NAMES"),
        "MOCK_FVS_UNDERSCORE_PATH",
    ),
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Packaged on its own the crate has no mock source; the tests need it.
    if !Path::new(MOCK_SRC).exists() {
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

    println!("cargo:rerun-if-changed={MOCK_SRC}");
}
