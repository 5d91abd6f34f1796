use std::io::Write;

use gps_ingest::{IngestError, SourceFormat, parse_report};

const CATAPULT_EXPORT: &str = "\
Session: MD-1 training
Player,Total Distance (m),Max Speed (km/h),HSR %
J. Smith,5400,28.8,12.5
A. Jones,6100,30.1,14.0
,,,
Team Average,5750,29.45,13.25
Total,11500,,
";

#[test]
fn summary_rows_never_become_data_rows() {
    let report = parse_report(CATAPULT_EXPORT.as_bytes(), SourceFormat::Csv).unwrap();
    assert_eq!(
        report.headers,
        vec!["Player", "Total Distance (m)", "Max Speed (km/h)", "HSR %"]
    );
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0][0], "J. Smith");
    assert_eq!(report.rows[1][0], "A. Jones");
    assert_eq!(report.skipped_summary, 2);
    assert_eq!(report.skipped_blank, 1);
}

#[test]
fn n_data_rows_plus_k_summary_rows_give_n_rows() {
    for (n, k) in [(0, 3), (1, 1), (5, 2), (12, 4)] {
        let mut text = String::from("Player,TD\n");
        for idx in 0..n {
            text.push_str(&format!("Player {idx},{}\n", 5000 + idx));
        }
        for label in ["Average", "Total", "Sum", "Итого"].iter().cycle().take(k) {
            text.push_str(&format!("{label},1\n"));
        }
        let report = parse_report(text.as_bytes(), SourceFormat::Csv).unwrap();
        assert_eq!(report.rows.len(), n, "n={n} k={k}");
        assert_eq!(report.skipped_summary, k);
    }
}

#[test]
fn athletes_named_like_summary_words_are_kept() {
    let text = "Player,TD\nSum Ka Wai,5000\nMean Jones,4000\nJohn Smith,3000\nTotal,12000\n";
    let report = parse_report(text.as_bytes(), SourceFormat::Csv).unwrap();
    let names: Vec<&str> = report.rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(names, vec!["Sum Ka Wai", "Mean Jones", "John Smith"]);
    assert_eq!(report.skipped_summary, 1);
}

#[test]
fn placeholder_only_rows_are_skipped_as_blank() {
    let text = "Player,TD\nJohn Smith,5000\n-,-\nn/a,n/a\n—, \n";
    let report = parse_report(text.as_bytes(), SourceFormat::Csv).unwrap();
    assert_eq!(report.rows, vec![vec!["John Smith", "5000"]]);
    assert_eq!(report.skipped_blank, 3);
    assert_eq!(report.skipped_summary, 0);
}

#[test]
fn semicolon_exports_with_decimal_commas() {
    let text = "Игрок;Дистанция;Макс. скорость\nИван Петров;5400;28,8\nСреднее;5400;28,8\n";
    let report = parse_report(text.as_bytes(), SourceFormat::Csv).unwrap();
    assert_eq!(report.headers.len(), 3);
    assert_eq!(report.rows, vec![vec!["Иван Петров", "5400", "28,8"]]);
}

#[test]
fn workbook_rows_render_like_a_csv_export() {
    let bytes = include_bytes!("fixtures/catapult_session.xlsx");
    let report = parse_report(bytes, SourceFormat::Spreadsheet).unwrap();
    assert_eq!(
        report.headers,
        vec!["Player", "Duration", "Total Distance (m)", "HSR %"]
    );
    assert_eq!(
        report.rows,
        vec![
            vec!["John Smith", "1:30:00", "5400", "0.125"],
            vec!["Ivan Petrov", "1:03:00", "6100.5", "0.14"],
            vec!["Sum Ka Wai", "1:30:00", "4000", "0.1"],
        ]
    );
    assert_eq!(report.skipped_summary, 1);
    assert_eq!(report.skipped_blank, 0);
}

#[test]
fn declared_format_must_be_supported() {
    let err = "pdf".parse::<SourceFormat>().unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn oversized_input_is_rejected() {
    let bytes = vec![b'a'; gps_ingest::MAX_REPORT_BYTES + 1];
    assert!(matches!(
        parse_report(&bytes, SourceFormat::Csv),
        Err(IngestError::FileTooLarge { .. })
    ));
}

#[test]
fn reads_report_written_to_disk() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(CATAPULT_EXPORT.as_bytes()).unwrap();
    let format = SourceFormat::from_path(file.path()).unwrap();
    let bytes = std::fs::read(file.path()).unwrap();
    let report = parse_report(&bytes, format).unwrap();
    assert_eq!(report.rows.len(), 2);
}
