// Build script embedding the crate version for the /version endpoint.
// CI can replace the patch segment through SNAPSEARCH_PATCH_VERSION.

use std::env;

fn main() {
    let version = env::var("CARGO_PKG_VERSION").expect("CARGO_PKG_VERSION not set");

    let (major_minor, patch) = version
        .rsplit_once('.')
        .unwrap_or_else(|| panic!("Invalid version format in Cargo.toml: {version}"));
    if !major_minor.contains('.') {
        panic!("Invalid version format in Cargo.toml: {version}");
    }

    let patch = env::var("SNAPSEARCH_PATCH_VERSION").unwrap_or_else(|_| patch.to_string());

    println!("cargo:rustc-env=SNAPSEARCH_VERSION={major_minor}.{patch}");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=SNAPSEARCH_PATCH_VERSION");
}
