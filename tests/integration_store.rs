//! Integration tests for the SQLite output store
//!
//! Builds a minimal but schema-complete store and drives the tabular and
//! time-series extractors through the public API, down to DataFrames.

use eplus_results::{
    ConversionOutcome, ExtractConfig, OutputStore, TabularExtractor, TabularReportKey,
    TimeSeriesExtractor, UnitSystem,
};
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_store(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("eplusout.sql");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "
        CREATE TABLE Simulations (SimulationIndex INTEGER PRIMARY KEY, EnergyPlusVersion TEXT);
        INSERT INTO Simulations VALUES (1, 'Version 9.4.0');

        CREATE TABLE Strings (StringIndex INTEGER PRIMARY KEY, StringTypeIndex INTEGER, Value TEXT);
        INSERT INTO Strings VALUES
            (1, 1, 'EnergyMeters'), (2, 2, 'Entire Facility'), (3, 3, 'Annual and Peak Values - Electricity'),
            (4, 4, 'Electricity:Facility'), (5, 5, 'Electricity Annual Value'), (6, 6, 'GJ'),
            (7, 5, 'Electricity Maximum Value Time'), (8, 6, '');

        CREATE TABLE TabularData (
            TabularDataIndex INTEGER PRIMARY KEY, ReportNameIndex INTEGER, ReportForStringIndex INTEGER,
            TableNameIndex INTEGER, RowNameIndex INTEGER, ColumnNameIndex INTEGER, UnitsIndex INTEGER,
            SimulationIndex INTEGER, RowId INTEGER, ColumnId INTEGER, Value TEXT);
        INSERT INTO TabularData VALUES
            (1, 1, 2, 3, 4, 5, 6, 1, 0, 0, '      1017.52'),
            (2, 1, 2, 3, 4, 7, 8, 1, 0, 1, '21-JUL-14:00');

        CREATE TABLE ReportDataDictionary (
            ReportDataDictionaryIndex INTEGER PRIMARY KEY, IsMeter INTEGER, Type TEXT, IndexGroup TEXT,
            TimestepType TEXT, KeyValue TEXT, Name TEXT, ReportingFrequency TEXT, ScheduleName TEXT, Units TEXT);
        INSERT INTO ReportDataDictionary VALUES
            (10, 0, 'Avg', 'System', 'HVAC System', 'BOILER Water Inlet Node', 'System Node Standard Density Volume Flow Rate', 'Hourly', NULL, 'm3/s'),
            (11, 1, 'Sum', 'Facility:Electricity', 'Zone', '', 'Electricity:Facility', 'Hourly', NULL, 'J');

        CREATE TABLE ReportData (ReportDataIndex INTEGER PRIMARY KEY, TimeIndex INTEGER, ReportDataDictionaryIndex INTEGER, Value REAL);
        INSERT INTO ReportData VALUES (1, 1, 10, 0.001), (2, 2, 10, 0.002), (3, 1, 11, 3600.0), (4, 2, 11, 7200.0);

        CREATE TABLE Time (TimeIndex INTEGER PRIMARY KEY, Month INTEGER, Day INTEGER, Hour INTEGER, Minute INTEGER, Interval INTEGER);
        INSERT INTO Time VALUES (1, 7, 21, 14, 0, 60), (2, 7, 21, 15, 0, 60);
        ",
    )
    .unwrap();
    path
}

#[test]
fn test_tabular_report_to_dataframe() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    let extractor = TabularExtractor::open(&path).unwrap();

    let key = TabularReportKey::new(
        "EnergyMeters",
        "Entire Facility",
        "Annual and Peak Values - Electricity",
    );
    let report = extractor.get_tabular(&key).unwrap();
    let df = report.to_dataframe(" | ").unwrap();

    assert_eq!(df.height(), 1);
    let annual = df
        .column("Electricity Annual Value | GJ")
        .unwrap()
        .f64()
        .unwrap();
    assert_eq!(annual.get(0), Some(1017.52));
    let peak = df
        .column("Electricity Maximum Value Time")
        .unwrap()
        .str()
        .unwrap();
    assert_eq!(peak.get(0), Some("21-JUL-14:00"));

    assert_eq!(TabularReportKey::from_dataframe(&df).unwrap(), key);
}

#[test]
fn test_time_series_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    let extractor = TimeSeriesExtractor::open(&path).unwrap();
    assert_eq!(extractor.config().unit_system, UnitSystem::Ip);

    let frame = extractor.get_series(vec![10, 11]).unwrap();
    assert_eq!(frame.row_count(), 2);
    assert_eq!(
        frame.timestamps[0].format("%m-%d %H:%M").to_string(),
        "07-21 13:00"
    );

    // No node file: the key's "Water Inlet" decides the domain
    let flow = frame
        .column("BOILER Water Inlet Node", "System Node Standard Density Volume Flow Rate")
        .unwrap();
    assert_eq!(flow.key.units, "gpm");
    assert_eq!(flow.values, vec![Some(0.001 * 15850.0), Some(0.002 * 15850.0)]);

    let meter = frame.column("", "Electricity:Facility").unwrap();
    assert_eq!(meter.key.units, "Wh");
    assert_eq!(meter.values, vec![Some(1.0), Some(2.0)]);
    assert!(
        frame
            .conversions
            .iter()
            .all(|c| matches!(c.outcome, ConversionOutcome::Converted { .. }))
    );

    let long = frame.to_long_dataframe().unwrap();
    assert_eq!(long.height(), 4);
}

#[test]
fn test_si_and_ip_differ_only_in_converted_columns() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);

    let si = TimeSeriesExtractor::open_with_config(&path, ExtractConfig::default().with_si_units())
        .unwrap()
        .get_series("Electricity")
        .unwrap();
    assert_eq!(si.columns.len(), 1);
    assert_eq!(si.columns[0].key.units, "J");
    assert_eq!(si.columns[0].values, vec![Some(3600.0), Some(7200.0)]);

    let ip = TimeSeriesExtractor::open(&path)
        .unwrap()
        .get_series("Electricity")
        .unwrap();
    assert_eq!(ip.timestamps, si.timestamps);
    assert_eq!(ip.columns.len(), 1);
    assert_eq!(ip.columns[0].key.units, "Wh");
    assert_eq!(ip.columns[0].values, vec![Some(1.0), Some(2.0)]);

    // Everything but the unit is shared
    let mut relabelled = ip.columns[0].key.clone();
    relabelled.units = "J".to_string();
    assert_eq!(relabelled, si.columns[0].key);
}

#[test]
fn test_node_file_next_to_store() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    fs::write(
        dir.path().join("eplusout.bnd"),
        " Node,1,BOILER Water Inlet Node,Air,1\n",
    )
    .unwrap();

    // Opened without the extension; the node file shares the stem
    let extractor = TimeSeriesExtractor::open(dir.path().join("eplusout")).unwrap();
    let frame = extractor.get_series(vec![10]).unwrap();

    // The node map takes precedence over the name heuristic
    assert_eq!(frame.columns[0].key.units, "cfm");
    assert_eq!(extractor.converter().unwrap().node_map().len(), 1);
    assert_eq!(extractor.store().path(), path.as_path());
}

#[test]
fn test_simulations_frame() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);

    let df = OutputStore::open(&path).unwrap().simulations().unwrap();
    assert_eq!(df.width(), 2);
    assert_eq!(df.height(), 1);
}
