//! Working directory and build artifact paths
//!
//! Each scenario gets a fresh working directory. The example contracts are
//! cloned into a fixed subdirectory of it and built for the wasm target.

use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory of the working directory holding the example contracts clone
const EXAMPLES_DIR_NAME: &str = "soroban_examples";

/// Cargo target triple the example contracts are built for
pub const WASM_TARGET: &str = "wasm32-unknown-unknown";

/// Where the example contracts repository is cloned for a scenario
pub fn examples_dir(working_dir: &Path) -> PathBuf {
    working_dir.join(EXAMPLES_DIR_NAME)
}

/// Path of a compiled contract inside the examples clone
pub fn wasm_artifact(working_dir: &Path, file_name: &str) -> PathBuf {
    examples_dir(working_dir)
        .join("target")
        .join(WASM_TARGET)
        .join("release")
        .join(file_name)
}

/// Remove the directory and everything under it; absent is not an error
pub fn remove_dir_forcibly(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Remove any previous contents and create the directory empty
pub fn recreate_dir(dir: &Path) -> io::Result<()> {
    remove_dir_forcibly(dir)?;
    std::fs::create_dir_all(dir)
}
