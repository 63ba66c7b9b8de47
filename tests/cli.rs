use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn utfconv(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_utfconv"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn dump_lines(output: &Output) -> Vec<Vec<String>> {
    stdout(output)
        .lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_validate_exit_status() {
    let valid = utfconv(&["validate", "-e", "utf-8"], "Grüße".as_bytes());
    assert!(valid.status.success(), "{}", stderr(&valid));
    assert!(stdout(&valid).contains("valid UTF-8"));

    let invalid = utfconv(&["validate", "-e", "utf-8", "--show-errors"], &[0x41, 0xFF]);
    assert_eq!(invalid.status.code(), Some(1));
    assert!(stdout(&invalid).contains("malformed lead byte 0xFF at position 1"));
}

#[test]
fn test_validate_json() {
    let output = utfconv(&["--format", "json", "validate", "-e", "utf-16le"], &[0x00, 0xDC]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains(r#""valid": false"#), "{text}");
    assert!(text.contains(r#""error_position": 0"#), "{text}");
}

#[test]
fn test_dump_offsets_after_bom() {
    // BOM, 'A', then a surrogate pair, 'B'
    let input = [0xFF, 0xFE, 0x41, 0x00, 0x3D, 0xD8, 0x00, 0xDE, 0x42, 0x00];
    let output = utfconv(&["dump", "-e", "utf-16"], &input);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        dump_lines(&output),
        vec![
            vec!["2", "U+0041"],
            vec!["4", "U+1F600"],
            vec!["8", "U+0042"],
        ]
    );
}

#[test]
fn test_dump_needs_byte_order_without_bom() {
    let input = [0x00, 0x41, 0x00, 0x42];

    let output = utfconv(&["dump", "-e", "utf-16"], &input);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--assume"), "{}", stderr(&output));

    let output = utfconv(&["dump", "-e", "utf-16", "--assume", "be"], &input);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(dump_lines(&output), vec![vec!["0", "U+0041"], vec!["2", "U+0042"]]);
}

#[test]
fn test_convert_with_assumed_byte_order() {
    let output = utfconv(
        &["convert", "-f", "utf16", "-t", "utf8", "--assume", "le"],
        &[0x41, 0x00, 0xAC, 0x20],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(output.stdout, "A€".as_bytes());
}

#[test]
fn test_convert_json_report_keeps_stdout_clean() {
    let output = utfconv(
        &["--format", "json", "convert", "-f", "utf-8", "-t", "utf-16be"],
        b"Hi",
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(output.stdout, [0x00, 0x48, 0x00, 0x69]);
    assert!(stderr(&output).contains(r#""code_points": 2"#));
}

#[test]
fn test_convert_json_report_with_output_file() {
    let path = std::env::temp_dir().join(format!("utfconv-cli-{}.txt", std::process::id()));
    let output = utfconv(
        &[
            "--format",
            "json",
            "convert",
            "-f",
            "utf-8",
            "-t",
            "utf-16le",
            "--add-bom",
            "-o",
            path.to_str().unwrap(),
        ],
        b"Hi",
    );
    let written = fs::read(&path);
    let _ = fs::remove_file(&path);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(written.unwrap(), [0xFF, 0xFE, 0x48, 0x00, 0x69, 0x00]);
    let report = stdout(&output);
    assert!(report.contains(r#""bytes_written": 6"#), "{report}");
    assert!(report.contains(r#""bom_written": true"#), "{report}");
}

#[test]
fn test_detect_huge_sample_size() {
    let output = utfconv(&["detect", "--sample-size", &usize::MAX.to_string()], b"hi");
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Detected encoding: UTF-8"));
}
