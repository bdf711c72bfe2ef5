//! Integration tests for raw table normalization.

use unipick_engine::{normalize, Feature, NormalizationError, NormalizerConfig};

const HEADER: &str = "College_Name,Stream,State,UG_fee,PG_fee,Rating,Academic,Accommodation,Faculty,Infrastructure,Placement,Social_Life";

fn table(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

fn run(text: &str) -> Result<unipick_engine::NormalizedDataset, NormalizationError> {
    normalize(text.as_bytes(), &NormalizerConfig::default())
}

// ---------------------------------------------------------------------------
// Fee repair and imputation
// ---------------------------------------------------------------------------

#[test]
fn fee_median_is_computed_before_rows_are_dropped() {
    let text = table(&[
        r#"Alpha,CS,X,"1,00,000",200000,8,8,8,8,8,8,8"#,
        "Beta,CS,X,--,300000,7,7,7,7,7,7,7",
        "Gamma,CS,X,300000,--,9,9,9,9,9,9,9",
        // Dropped for its missing rating, but its fees still count.
        "Delta,CS,X,500000,400000,--,6,6,6,6,6,6",
    ]);
    let out = run(&text).unwrap();

    assert_eq!(out.report.ug_fee_median, Some(300000.0));
    assert_eq!(out.report.pg_fee_median, Some(300000.0));
    assert_eq!(out.report.imputed_ug_fee, 1);
    assert_eq!(out.report.imputed_pg_fee, 1);
    assert_eq!(out.report.rows_read, 4);
    assert_eq!(out.report.rows_kept, 3);
    assert_eq!(out.report.dropped_rows, 1);

    let ds = &out.dataset;
    assert_eq!(ds.find_by_name("Alpha").unwrap().ug_fee, 100000.0);
    assert_eq!(ds.find_by_name("Beta").unwrap().ug_fee, 300000.0);
    assert_eq!(ds.find_by_name("Gamma").unwrap().pg_fee, 300000.0);
    assert!(ds.find_by_name("Delta").is_none());
}

#[test]
fn even_count_median_averages_middle_values() {
    let text = table(&[
        "A,CS,X,100,10,8,8,8,8,8,8,8",
        "B,CS,X,200,20,8,8,8,8,8,8,8",
        "C,CS,X,300,30,8,8,8,8,8,8,8",
        "D,CS,X,400,40,8,8,8,8,8,8,8",
        "E,CS,X,--,not listed,8,8,8,8,8,8,8",
    ]);
    let out = run(&text).unwrap();
    let e = out.dataset.find_by_name("E").unwrap();
    assert!((e.ug_fee - 250.0).abs() < 1e-6, "ug_fee = {}", e.ug_fee);
    assert!((e.pg_fee - 25.0).abs() < 1e-6, "pg_fee = {}", e.pg_fee);
}

#[test]
fn fee_column_without_values_drops_every_row() {
    let text = table(&[
        "A,CS,X,--,10,8,8,8,8,8,8,8",
        "B,CS,X,--,20,8,8,8,8,8,8,8",
    ]);
    match run(&text) {
        Err(NormalizationError::NoUsableRows { dropped }) => assert_eq!(dropped, 2),
        other => panic!("expected NoUsableRows, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Score coercion and row dropping
// ---------------------------------------------------------------------------

#[test]
fn rows_with_missing_scores_or_identity_are_dropped() {
    let text = table(&[
        "A,CS,X,100,10,8,8,8,8,8,8,8",
        "B,CS,X,100,10,8,8,N/A,8,8,8,8",
        "--,CS,X,100,10,8,8,8,8,8,8,8",
        "D,,X,100,10,8,8,8,8,8,8,8",
        "E,CS,X,100,10,8,8,8,8,8,8",
    ]);
    let out = run(&text).unwrap();
    assert_eq!(out.dataset.len(), 1);
    assert_eq!(out.report.dropped_rows, 4);
}

#[test]
fn malformed_score_drops_row_by_default() {
    let text = table(&[
        "A,CS,X,100,10,8,8,8,8,8,8,8",
        "B,CS,X,100,10,8,8,8,excellent,8,8,8",
    ]);
    let out = run(&text).unwrap();
    assert_eq!(out.dataset.len(), 1);
    assert_eq!(out.report.malformed_rows, 1);
    assert_eq!(out.report.dropped_rows, 0);
}

#[test]
fn malformed_score_is_fatal_in_strict_mode() {
    let text = table(&[
        "A,CS,X,100,10,8,8,8,8,8,8,8",
        "B,CS,X,100,10,8,8,8,excellent,8,8,8",
    ]);
    let config = NormalizerConfig {
        strict_scores: true,
        ..NormalizerConfig::default()
    };
    match normalize(text.as_bytes(), &config) {
        Err(NormalizationError::InvalidScore { row, column, value }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "Faculty");
            assert_eq!(value, "excellent");
        }
        other => panic!("expected InvalidScore, got {:?}", other),
    }
}

#[test]
fn duplicate_names_keep_first_occurrence() {
    let text = table(&[
        "A,CS,X,100,10,8,8,8,8,8,8,8",
        "B,CS,X,200,20,7,7,7,7,7,7,7",
        "A,ME,Y,300,30,6,6,6,6,6,6,6",
    ]);
    let out = run(&text).unwrap();
    assert_eq!(out.dataset.len(), 2);
    assert_eq!(out.report.duplicate_rows, 1);
    assert_eq!(out.dataset.find_by_name("A").unwrap().stream, "CS");
}

#[test]
fn surviving_rows_keep_source_order_and_are_finite() {
    let text = table(&[
        "Zed,CS,X,100,10,8,8,8,8,8,8,8",
        "Dropped,CS,X,100,10,--,8,8,8,8,8,8",
        "Mid,ME,Y,\"2,50,000\",--,7.5,7,7,7,7,7,7",
        "Ace,CS,X,--,--,9,9,9,9,9,9,9",
    ]);
    let out = run(&text).unwrap();

    let names: Vec<&str> = out.dataset.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Zed", "Mid", "Ace"]);
    for record in &out.dataset {
        for feature in Feature::ALL {
            assert!(
                record.feature(feature).is_finite(),
                "{} {} not finite",
                record.name,
                feature
            );
        }
    }
    assert_eq!(out.dataset.streams(), vec!["CS", "ME"]);
    assert_eq!(out.dataset.states(), vec!["X", "Y"]);
}

// ---------------------------------------------------------------------------
// Fatal load errors
// ---------------------------------------------------------------------------

#[test]
fn empty_source_is_fatal() {
    assert!(matches!(run(""), Err(NormalizationError::Empty)));
    assert!(matches!(
        run(&format!("{}\n", HEADER)),
        Err(NormalizationError::Empty)
    ));
}

#[test]
fn missing_required_column_is_fatal() {
    let text = "College_Name,Stream,State,UG_fee,PG_fee,Rating,Academic,Accommodation,Faculty,Infrastructure,Social_Life\n\
                A,CS,X,100,10,8,8,8,8,8,8\n";
    match run(text) {
        Err(NormalizationError::MissingColumn(name)) => assert_eq!(name, "Placement"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Optional columns and configuration
// ---------------------------------------------------------------------------

#[test]
fn coordinates_are_carried_through() {
    let text = format!(
        "{},Latitude,Longitude\nA,CS,X,100,10,8,8,8,8,8,8,8,12.97,77.59\nB,CS,X,100,10,8,8,8,8,8,8,8,--,\n",
        HEADER
    );
    let out = run(&text).unwrap();
    let a = out.dataset.find_by_name("A").unwrap();
    assert_eq!(a.latitude, Some(12.97));
    assert_eq!(a.longitude, Some(77.59));
    let b = out.dataset.find_by_name("B").unwrap();
    assert_eq!(b.latitude, None);
    assert_eq!(b.longitude, None);
    assert_eq!(out.dataset.len(), 2);
}

#[test]
fn custom_delimiter_and_markers() {
    let text = "College_Name;Stream;State;UG_fee;PG_fee;Rating;Academic;Accommodation;Faculty;Infrastructure;Placement;Social_Life\n\
                A;CS;X;1,000;500;8;8;8;8;8;8;8\n\
                B;CS;X;unknown;700;8;8;8;8;8;8;8\n";
    let config = NormalizerConfig {
        delimiter: ';',
        missing_markers: vec!["unknown".to_string()],
        ..NormalizerConfig::default()
    };
    let out = normalize(text.as_bytes(), &config).unwrap();
    assert_eq!(out.dataset.find_by_name("A").unwrap().ug_fee, 1000.0);
    assert_eq!(out.dataset.find_by_name("B").unwrap().ug_fee, 1000.0);
    assert_eq!(out.report.imputed_ug_fee, 1);
}
