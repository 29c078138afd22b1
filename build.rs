// Copyright (c) 2026 rezky_nightky

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=GLYPHDRIFT_BUILD");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let build_id = env::var("GLYPHDRIFT_BUILD")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(target_triple_short);
    println!("cargo:rustc-env=GLYPHDRIFT_BUILD={}", build_id);

    let sha = head_sha().unwrap_or_default();
    println!("cargo:rustc-env=GLYPHDRIFT_GIT_SHA={}", sha);
}

/// `{os}-{arch}`, e.g. `linux-x86_64`.
fn target_triple_short() -> String {
    let os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_else(|_| "unknown".into());
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".into());
    format!("{os}-{arch}")
}

fn head_sha() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_ascii_lowercase();
    (!sha.is_empty() && sha.chars().all(|c| c.is_ascii_hexdigit())).then_some(sha)
}
