use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

/// Write an executable shell script standing in for an external tool.
pub fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A controller stub that appends each invocation's arguments, one per
/// line, to `calls` and echoes the command back on stdout.
pub fn recording_proxmark(dir: &Path, calls: &Path) -> PathBuf {
    stub(
        dir,
        "proxmark3",
        &format!(
            r#"for arg in "$@"; do echo "$arg" >> '{calls}'; done
echo "--" >> '{calls}'
echo "ran $3""#,
            calls = calls.display()
        ),
    )
}

/// Invocations recorded by [`recording_proxmark`], split per call.
pub fn recorded_calls(calls: &Path) -> Vec<Vec<String>> {
    let Ok(data) = fs::read_to_string(calls) else {
        return Vec::new();
    };

    data.split_terminator("--\n")
        .map(|call| call.lines().map(str::to_string).collect())
        .collect()
}
