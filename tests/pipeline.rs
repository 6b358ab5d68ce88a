//! End-to-end pipeline runs over on-disk fixtures.

use std::io::Write;
use std::path::PathBuf;

use verenigingenkaart::data::{FilterCriteria, SchemaError, REQUIRED_COLUMNS};
use verenigingenkaart::export::{CsvExporter, EXPORT_FILE_NAME};
use verenigingenkaart::geo::GeoIndex;
use verenigingenkaart::pipeline::{DataSource, Pipeline, PipelineError};

const INPUT_CSV: &str = "\
id,Vereniging,sport,bond,adres,postcode,plaats,gemeente
1,SC Leeuwarden,Voetbal,KNVB,Hoofdstraat 1,8911 AB,Leeuwarden,Leeuwarden
2,Sneek Wit Zwart,Voetbal,KNVB,Leeuwarderweg 117,8601 CC,Sneek,Súdwest-Fryslân
3,HV Nitert,Handbal,NHV,Burdinewei 3,geen,Ferwert,Noardeast-Fryslân
";

const CENTROIDS_CSV: &str = "\
pc4,latitude,longitude
8911,53.20,5.78
8601,53.03,5.66
";

fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

fn fixture_pipeline(dir: &tempfile::TempDir) -> (PathBuf, Pipeline) {
    let input = write_fixture(dir, "verenigingen.csv", INPUT_CSV);
    let centroids = write_fixture(dir, "centroids.csv", CENTROIDS_CSV);
    let index = GeoIndex::from_csv(&centroids).unwrap();
    (input, Pipeline::new(index))
}

#[test]
fn full_run_enriches_filters_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let (input, mut pipeline) = fixture_pipeline(&dir);
    let source = DataSource::Upload(input);

    let output = pipeline.run(&source, &FilterCriteria::default()).unwrap();

    // The extra id column is gone; enrichment appended pc4/lat/lng.
    let names: Vec<String> = output
        .enriched
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut expected: Vec<String> = REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect();
    expected.extend(["pc4".to_string(), "lat".to_string(), "lng".to_string()]);
    assert_eq!(names, expected);

    let lat = output.enriched.column("lat").unwrap().f64().unwrap();
    let lng = output.enriched.column("lng").unwrap().f64().unwrap();
    assert_eq!(lat.get(0), Some(53.20));
    assert_eq!(lng.get(0), Some(5.78));
    assert_eq!(lat.get(2), None); // no 4-digit run in "geen"

    assert_eq!(output.summary.total_rows, 3);
    assert_eq!(output.summary.filtered_rows, 3);
    assert_eq!(output.summary.geocoded_rows, 2);
    assert_eq!(output.summary.in_friesland_rows, 2);

    // Retained under its own gemeente, gone under another.
    let leeuwarden = FilterCriteria {
        municipalities: ["Leeuwarden".to_string()].into(),
        ..Default::default()
    };
    let output = pipeline.run(&source, &leeuwarden).unwrap();
    assert_eq!(output.summary.filtered_rows, 1);
    let kept = output.filtered.column("Vereniging").unwrap().str().unwrap();
    assert_eq!(kept.get(0), Some("SC Leeuwarden"));

    let sneek = FilterCriteria {
        municipalities: ["Sneek".to_string()].into(),
        ..Default::default()
    };
    let output = pipeline.run(&source, &sneek).unwrap();
    assert_eq!(output.summary.filtered_rows, 0);
    assert_eq!(output.filtered.height(), 0);

    // Export carries the filtered frame's full header.
    let export_path = CsvExporter::write(&output.filtered, dir.path()).unwrap();
    assert!(export_path.ends_with(EXPORT_FILE_NAME));
    let content = std::fs::read_to_string(&export_path).unwrap();
    assert!(content.starts_with("Vereniging,sport,bond,adres,postcode,plaats,gemeente,pc4,lat,lng"));
}

#[test]
fn repeated_triggers_hit_the_caches() {
    let dir = tempfile::tempdir().unwrap();
    let (input, mut pipeline) = fixture_pipeline(&dir);
    let source = DataSource::Upload(input);

    pipeline.run(&source, &FilterCriteria::default()).unwrap();
    let query = FilterCriteria {
        query: "sneek".to_string(),
        ..Default::default()
    };
    pipeline.run(&source, &query).unwrap();

    // Same bytes, same validated frame: one entry per cache, not two.
    assert_eq!(pipeline.cache_stats(), (1, 1));
}

#[test]
fn missing_columns_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "kaal.csv",
        "Vereniging,sport,bond,adres\nSC Leeuwarden,Voetbal,KNVB,Hoofdstraat 1\n",
    );
    let centroids = write_fixture(&dir, "centroids.csv", CENTROIDS_CSV);
    let index = GeoIndex::from_csv(&centroids).unwrap();
    let mut pipeline = Pipeline::new(index);

    let err = pipeline
        .run(&DataSource::Upload(input), &FilterCriteria::default())
        .unwrap_err();

    match err {
        PipelineError::Schema(SchemaError::MissingColumns { missing }) => {
            assert_eq!(missing, vec!["postcode", "plaats", "gemeente"]);
        }
        other => panic!("expected MissingColumns, got {other}"),
    }
}
