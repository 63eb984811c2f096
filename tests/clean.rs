mod common;

use std::fs;

use retail_clean::{CleanError, CleanOptions, clean};

use common::{TestWorkspace, column, fixture_path, read_table};

const SAMPLE: &str = "retail_sample.csv";

#[test]
fn cleans_retail_sample_end_to_end() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("output").join("clean.csv");

    let report = clean(&fixture_path(SAMPLE), &output, &CleanOptions::quiet())
        .expect("clean sample");

    assert_eq!(report.output, output);
    assert_eq!(report.rows_loaded, 9);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.incomplete_removed, 2);
    assert_eq!(report.rows_written, 6);

    let (headers, rows) = read_table(&output, b',');
    assert_eq!(
        headers,
        vec![
            "CustomerID",
            "Quantity",
            "Price",
            "TransactionDate",
            "PaymentMethod",
            "ProductCategory",
            "DiscountApplied",
            "TotalAmount",
        ]
    );
    assert_eq!(report.columns, headers);
    assert_eq!(rows.len(), 6);

    assert_eq!(
        column(&headers, &rows, "CustomerID"),
        vec!["109318", "993229", "579675", "799826", "121413", "888163"]
    );
    assert_eq!(
        column(&headers, &rows, "TransactionDate"),
        vec![
            "2023-12-26 12:32:00",
            "2023-08-05 00:00:00",
            "2024-03-11 18:51:00",
            "2023-10-27 22:00:00",
            "2023-12-22 11:38:00",
            "2023-12-26 09:03:00",
        ]
    );
    assert_eq!(
        column(&headers, &rows, "PaymentMethod"),
        vec!["0", "0", "0", "2", "0", "1"]
    );
    assert_eq!(
        column(&headers, &rows, "ProductCategory"),
        vec!["0", "2", "0", "1", "1", "1"]
    );
    assert_eq!(
        column(&headers, &rows, "DiscountApplied"),
        vec![
            "18.6770995",
            "14.12175058",
            "15.94353791",
            "6.686337083",
            "4.03044",
            "10.21050849",
        ]
    );

    let mappings = report
        .encodings
        .iter()
        .map(|m| (m.column.as_str(), m.labels.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        mappings,
        vec![
            (
                "PaymentMethod",
                vec!["Cash".to_string(), "Credit Card".into(), "PayPal".into()]
            ),
            (
                "ProductCategory",
                vec!["Books".to_string(), "Electronics".into(), "Home Decor".into()]
            ),
        ]
    );
}

#[test]
fn missing_source_reports_path_and_writes_nothing() {
    let workspace = TestWorkspace::new();
    let input = workspace.path().join("nope.csv");
    let output = workspace.path().join("out").join("clean.csv");

    let err = clean(&input, &output, &CleanOptions::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CleanError>(),
        Some(CleanError::SourceNotFound(path)) if path == &input
    ));
    assert!(err.to_string().contains("nope.csv"));
    assert!(!workspace.path().join("out").exists());
}

#[test]
fn repeated_runs_produce_identical_output() {
    let workspace = TestWorkspace::new();
    let first = workspace.path().join("a").join("clean.csv");
    let second = workspace.path().join("b").join("clean.csv");
    let input = fixture_path(SAMPLE);

    clean(&input, &first, &CleanOptions::quiet()).expect("first run");
    clean(&input, &second, &CleanOptions::quiet()).expect("second run");
    clean(&input, &second, &CleanOptions::quiet()).expect("rerun into existing dir");

    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn missing_value_in_dropped_column_still_removes_row() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "raw.csv",
        "TransactionId,StoreLocation,Amount\n1,Downtown,5\n2,,6\n3,Uptown,7\n",
    );
    let output = workspace.path().join("clean.csv");

    let report = clean(&input, &output, &CleanOptions::quiet()).expect("clean");
    assert_eq!(report.incomplete_removed, 1);
    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, "TransactionId,Amount\n1,5\n3,7\n");
}

#[test]
fn tables_without_known_columns_pass_through() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("raw.csv", "a,b\nx,1.5\ny,2\nx,1.5\n");
    let output = workspace.path().join("clean.csv");

    let report = clean(&input, &output, &CleanOptions::default()).expect("clean");
    assert!(report.encodings.is_empty());
    assert_eq!(fs::read_to_string(&output).unwrap(), "a,b\nx,1.5\ny,2.0\n");
}

#[test]
fn tab_separated_input_keeps_tab_output() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "raw.tsv",
        "PaymentMethod\tDiscountApplied(%)\nCash\t5\nPayPal\t10\n",
    );
    let output = workspace.path().join("clean.tsv");

    clean(&input, &output, &CleanOptions::quiet()).expect("clean tsv");
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "PaymentMethod\tDiscountApplied\n0\t5\n1\t10\n"
    );
}

#[test]
fn ragged_rows_surface_as_failures() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("raw.csv", "a,b\n1,2\n3\n");
    let output = workspace.path().join("clean.csv");

    let err = clean(&input, &output, &CleanOptions::quiet()).unwrap_err();
    assert!(err.downcast_ref::<CleanError>().is_none());
    assert!(!output.exists());
}

#[test]
fn date_only_timestamps_render_as_dates() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "raw.csv",
        "TransactionDate,Amount\n2024-01-05,1\n01/06/2024,2\n",
    );
    let output = workspace.path().join("clean.csv");

    clean(&input, &output, &CleanOptions::quiet()).expect("clean");
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "TransactionDate,Amount\n2024-01-05,1\n2024-01-06,2\n"
    );
}

#[test]
fn empty_input_fails_without_output() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("raw.csv", "");
    let output = workspace.path().join("out").join("clean.csv");

    let err = clean(&input, &output, &CleanOptions::quiet()).unwrap_err();
    assert!(err.downcast_ref::<CleanError>().is_none());
    assert!(format!("{err:#}").contains("No columns"));
    assert!(!output.exists());
    assert!(!workspace.path().join("out").exists());
}

#[test]
fn boolean_columns_pass_through_unchanged() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("raw.csv", "Flag,n\nTrue,1\nFalse,2\n");
    let output = workspace.path().join("clean.csv");

    clean(&input, &output, &CleanOptions::quiet()).expect("clean");
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Flag,n\nTrue,1\nFalse,2\n"
    );
}

#[test]
fn integer_column_with_missing_cell_is_written_as_float() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("raw.csv", "Quantity,note\n7,a\n,b\n3,c\n");
    let output = workspace.path().join("clean.csv");

    clean(&input, &output, &CleanOptions::quiet()).expect("clean");
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Quantity,note\n7.0,a\n3.0,c\n"
    );
}
