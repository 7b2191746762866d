//! vein-test - Regression test support for the vein pipeline
//!
//! [`RegParams`] collects the checks of one `*_reg` test and reports
//! them together. [`synth`] builds the synthetic images the tests run
//! on, so no binary fixtures need to be checked in.
//!
//! # Usage
//!
//! ```ignore
//! use vein_test::RegParams;
//!
//! let mut rp = RegParams::new("conncomp");
//! rp.compare_values(4452.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod params;
pub mod synth;

pub use params::RegParams;

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // vein-test is at crates/vein-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Get a scratch path under the regout directory for a test's own files
pub fn regout_path(name: &str) -> String {
    format!("{}/{}", regout_dir(), name)
}
