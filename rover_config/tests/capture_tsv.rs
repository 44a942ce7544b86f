use rover_config::{CaptureRow, load_capture_tsv};
use std::io::Write;
use tempfile::NamedTempFile;

fn write(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn parses_tab_separated_rows() {
    let f = write("0.01\t-0.02\t0.98\n0.5\t0.25\t1.0\n");
    let rows = load_capture_tsv(f.path()).unwrap();
    assert_eq!(
        rows,
        vec![
            CaptureRow { x: 0.01, y: -0.02, z: 0.98 },
            CaptureRow { x: 0.5, y: 0.25, z: 1.0 },
        ]
    );
}

#[test]
fn reports_bad_row_with_line_number() {
    let f = write("0\t0\t0\n0\tbad\t0\n");
    let err = load_capture_tsv(f.path()).unwrap_err();
    assert!(format!("{err}").contains("row 2"), "{err}");
}

#[test]
fn rejects_short_rows() {
    let f = write("0\t0\n");
    assert!(load_capture_tsv(f.path()).is_err());
}

#[test]
fn rejects_empty_file() {
    let f = write("");
    let err = load_capture_tsv(f.path()).unwrap_err();
    assert!(format!("{err}").contains("no rows"), "{err}");
}

#[test]
fn missing_file_is_an_error() {
    let err = load_capture_tsv(std::path::Path::new("/nonexistent/capture.txt")).unwrap_err();
    assert!(format!("{err}").contains("open capture file"), "{err}");
}
