//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so it can be served with an immutable
//! cache lifetime. The hashed copy lands in `static/css/derived/`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in the fingerprint (8 hex characters).
const FINGERPRINT_BYTES: usize = 4;

fn main() {
    let manifest_dir = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo"),
    );
    fingerprint_stylesheet(&manifest_dir);
}

/// Copy `static/css/main.css` to `static/css/derived/main.<hash>.css`.
///
/// Exposes the hash as `CSS_HASH` for `env!("CSS_HASH")`.
fn fingerprint_stylesheet(manifest_dir: &Path) {
    let source = manifest_dir.join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", source.display());

    let Ok(content) = fs::read(&source) else {
        println!("cargo:warning=main.css not found, CSS_HASH left empty");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let hash = fingerprint(&content);
    println!("cargo:rustc-env=CSS_HASH={hash}");

    let derived = manifest_dir.join("static/css/derived");
    fs::create_dir_all(&derived).expect("Failed to create derived CSS directory");
    fs::copy(&source, derived.join(format!("main.{hash}.css")))
        .expect("Failed to copy fingerprinted CSS");
}

fn fingerprint(content: &[u8]) -> String {
    Sha256::digest(content)
        .iter()
        .take(FINGERPRINT_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect()
}
