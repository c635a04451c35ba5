use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "tilequest"])
        .status()
        .expect("failed to invoke cargo check for tilequest CLI binary");

    assert!(status.success(), "cargo check --bin tilequest should succeed");
}

#[test]
fn cli_runs_the_demo_map() {
    let demo = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/maps/demo.json");
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["run", "--quiet", "--bin", "tilequest", "--", demo, "--script", "W*3,E"])
        .output()
        .expect("failed to invoke tilequest on the demo map");

    assert!(output.status.success(), "tilequest should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticks: 3"), "unexpected summary: {stdout}");
}
