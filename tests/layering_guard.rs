//! Layering guardrails for the workspace crates.
//!
//! `subcase_core` is the pure semantic core: no logging, no diagnostics rendering, no regex engine. Those belong to
//! the `subcase` crate. These tests scan the core's `Cargo.toml` and fail if any of them appears in
//! `[dependencies]`.

/// Names listed in the `[dependencies]` table of `manifest`.
fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_ambient_dependencies() {
    let names = dependency_names(include_str!("../crates/subcase_core/Cargo.toml"));
    for forbidden in ["tracing", "tracing-subscriber", "miette", "regex", "subcase"] {
        assert!(
            !names.iter().any(|name| name == forbidden),
            "`{forbidden}` must not appear in subcase_core's [dependencies]"
        );
    }
}

#[test]
fn derive_crate_does_not_depend_on_runtime() {
    let names = dependency_names(include_str!("../crates/subcase_derive/Cargo.toml"));
    assert!(
        !names.iter().any(|name| name.starts_with("subcase")),
        "proc-macro crate must only emit `::subcase` paths, not depend on the runtime"
    );
}

#[test]
fn root_depends_on_both_workspace_crates() {
    let names = dependency_names(include_str!("../Cargo.toml"));
    assert!(names.iter().any(|name| name == "subcase_core"));
    assert!(names.iter().any(|name| name == "subcase_derive"));
}
