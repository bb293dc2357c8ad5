//! CLI arg parsing tests for lanwatch
use assert_cmd::Command;

fn run(args: &[&str]) -> (bool, String) {
    let td = tempfile::tempdir().unwrap();
    let out = Command::cargo_bin("lanwatch")
        .expect("lanwatch binary")
        .env("XDG_CONFIG_HOME", td.path())
        .args(args)
        .output()
        .expect("run lanwatch");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    (out.status.success(), text)
}

#[test]
fn test_help_mentions_short_and_long_flags() {
    let (ok, text) = run(&["--help"]);
    assert!(ok);
    for flag in ["--tls-ca", "-t", "--profile", "-P", "--demo", "--no-fallback", "--log-file"] {
        assert!(text.contains(flag), "help text missing {flag}\n{text}");
    }
}

#[test]
fn test_flags_before_help_are_accepted() {
    for args in [
        &["--tls-ca", "/tmp/cert.pem", "--help"][..],
        &["-t", "/tmp/cert.pem", "--help"][..],
        &["--profile", "dev", "--help"][..],
        &["--demo", "--no-fallback", "--help"][..],
    ] {
        let (ok, text) = run(args);
        assert!(ok, "{args:?} did not succeed");
        assert!(text.contains("Usage:"), "{args:?}: {text}");
    }
}

#[test]
fn test_unknown_flag_prints_usage() {
    let (_ok, text) = run(&["--frobnicate"]);
    assert!(text.contains("Unknown flag '--frobnicate'"), "{text}");
    assert!(text.contains("Usage:"));
}

#[test]
fn test_dry_run_demo_resolves_without_network() {
    let (ok, text) = run(&["--demo", "--dry-run"]);
    assert!(ok);
    assert_eq!(text.trim(), "demo");
}
