// Build script that mirrors the static site (page + wasm-pack output) into `dist/`.
use std::{fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");
    println!("cargo:rerun-if-changed=src/shaders");

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }
    fs::create_dir_all(out_dir).ok();

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }
    let options = CopyOptions::new().overwrite(true).content_only(true);
    if let Err(err) = copy(static_dir, out_dir, &options) {
        println!("cargo:warning=could not copy static/ to dist/: {err}");
    }
}
