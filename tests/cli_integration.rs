use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_oxildm").to_string()
}

#[test]
fn cli_compress_decompress_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let packed = dir.path().join("packed.ldm");
    let output = dir.path().join("output.bin");

    let data: Vec<u8> = (0..=255u8).cycle().take(100 * 1024).collect();
    std::fs::write(&input, &data).unwrap();

    let st = Command::new(bin())
        .arg("--force")
        .arg("compress")
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .arg("--force")
        .arg("decompress")
        .arg(&packed)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[test]
fn cli_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let packed = dir.path().join("exists.ldm");
    std::fs::write(&input, b"payload").unwrap();
    std::fs::write(&packed, b"already here").unwrap();

    let st = Command::new(bin())
        .arg("compress")
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&packed).unwrap(), b"already here");
}

#[test]
fn cli_stdin_stdout_pipeline() {
    let dir = tempdir().unwrap();
    let data = b"stream me through stdin, please".repeat(64);

    let packed = Command::new(bin())
        .arg("compress")
        .arg("-c")
        .arg("--quiet")
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::Write;
            child.stdin.as_mut().unwrap().write_all(&data)?;
            child.wait_with_output()
        })
        .unwrap();
    assert!(packed.status.success());
    assert!(!packed.stdout.is_empty());

    let packed_path = dir.path().join("piped.ldm");
    std::fs::write(&packed_path, &packed.stdout).unwrap();

    let out = Command::new(bin())
        .arg("decompress")
        .arg("-c")
        .arg(&packed_path)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, data);
}

#[test]
fn cli_config_prints_defaults() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("window log"));
    assert!(text.contains("min match length"));
}

#[test]
fn cli_header_reports_sizes() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("hdr_in.bin");
    let packed = dir.path().join("hdr.ldm");
    std::fs::write(&input, vec![7u8; 5000]).unwrap();

    let st = Command::new(bin())
        .arg("--force")
        .arg("compress")
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin()).arg("header").arg(&packed).output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("decompressed size: 5000"), "got: {text}");
}

#[test]
fn cli_blocks_lists_structure() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("blk_in.bin");
    let packed = dir.path().join("blk.ldm");
    // A long run compresses to one match block plus the trailing run.
    std::fs::write(&input, vec![0u8; 4096]).unwrap();

    let st = Command::new(bin())
        .arg("--force")
        .arg("compress")
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin()).arg("blocks").arg(&packed).output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("offset 1"), "got: {text}");
    assert!(text.contains("trailing run"), "got: {text}");
}

#[test]
fn cli_json_stats_on_stderr() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("json_in.bin");
    let packed = dir.path().join("json.ldm");
    std::fs::write(&input, vec![3u8; 2048]).unwrap();

    let out = Command::new(bin())
        .arg("--force")
        .arg("--json")
        .arg("compress")
        .arg(&input)
        .arg(&packed)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    let json_start = stderr.find('{').expect("json object on stderr");
    let parsed: serde_json::Value = serde_json::from_str(&stderr[json_start..]).unwrap();
    assert_eq!(parsed["command"], "compress");
    assert_eq!(parsed["input_size"], 2048);
}

#[test]
fn cli_custom_tuning_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tune_in.bin");
    let packed = dir.path().join("tune.ldm");
    let output = dir.path().join("tune_out.bin");

    let data = b"abcdefgh".repeat(2000);
    std::fs::write(&input, &data).unwrap();

    let st = Command::new(bin())
        .arg("--force")
        .arg("compress")
        .args(["--min-match", "16", "--window-log", "16", "--sample-every", "2"])
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .arg("--force")
        .arg("decompress")
        .args(["--min-match", "16"])
        .arg(&packed)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[test]
fn cli_rejects_corrupt_container() {
    let dir = tempdir().unwrap();
    let bogus = dir.path().join("bogus.ldm");
    std::fs::write(&bogus, b"definitely not a container").unwrap();

    let out = Command::new(bin())
        .arg("decompress")
        .arg(&bogus)
        .arg(dir.path().join("out.bin"))
        .output()
        .unwrap();
    assert!(!out.status.success());
}
