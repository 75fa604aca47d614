//! Build script for the site crate.
//!
//! Fingerprints the static stylesheet and script so templates can reference
//! them with a cache-busting version.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let root = Path::new(&manifest_dir);

    fingerprint(&root.join("static/css/site.css"), "CSS_HASH");
    fingerprint(&root.join("static/js/site.js"), "JS_HASH");
}

/// Hash a static asset and expose the first 8 hex chars as `env!(var)`.
fn fingerprint(path: &Path, var: &str) {
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);

    println!("cargo:rustc-env={var}={short_hash}");
}
