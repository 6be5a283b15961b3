//! Shared fixtures for output store tests

use rusqlite::{Connection, params};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;


pub const REPORT: &str = "AnnualBuildingUtilityPerformanceSummary";
pub const FACILITY: &str = "Entire Facility";
pub const SITE_ENERGY: &str = "Site and Source Energy";
pub const END_USES: &str = "End Uses";

/// Node description file written next to the fixture store
pub const NODE_FILE: &str = "Program Version,EnergyPlus, Version 9.4.0
! <Node>,<NodeNumber>,<Node Name>,<Node Fluid Type>,<# Times Node Referenced After Definition>
 Node,1,SUPPLY OUTLET NODE,Air,3
 Node,2,CHW OUTLET NODE,Water,2
";

const SCHEMA: &str = "
CREATE TABLE Simulations (
    SimulationIndex INTEGER PRIMARY KEY,
    EnergyPlusVersion TEXT,
    TimeStamp TEXT,
    NumTimestepsPerHour INTEGER,
    Completed BOOL,
    CompletedSuccessfully BOOL
);
CREATE TABLE Strings (
    StringIndex INTEGER PRIMARY KEY,
    StringTypeIndex INTEGER,
    Value TEXT
);
CREATE TABLE TabularData (
    TabularDataIndex INTEGER PRIMARY KEY,
    ReportNameIndex INTEGER,
    ReportForStringIndex INTEGER,
    TableNameIndex INTEGER,
    RowNameIndex INTEGER,
    ColumnNameIndex INTEGER,
    UnitsIndex INTEGER,
    SimulationIndex INTEGER,
    RowId INTEGER,
    ColumnId INTEGER,
    Value TEXT
);
CREATE TABLE ReportDataDictionary (
    ReportDataDictionaryIndex INTEGER PRIMARY KEY,
    IsMeter INTEGER,
    Type TEXT,
    IndexGroup TEXT,
    TimestepType TEXT,
    KeyValue TEXT,
    Name TEXT,
    ReportingFrequency TEXT,
    ScheduleName TEXT,
    Units TEXT
);
CREATE TABLE ReportData (
    ReportDataIndex INTEGER PRIMARY KEY,
    TimeIndex INTEGER,
    ReportDataDictionaryIndex INTEGER,
    Value REAL
);
CREATE TABLE Time (
    TimeIndex INTEGER PRIMARY KEY,
    Month INTEGER,
    Day INTEGER,
    Hour INTEGER,
    Minute INTEGER,
    Interval INTEGER
);
";

/// A populated store inside a temporary directory
pub struct StoreFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl StoreFixture {
    /// Path of the store without its extension
    pub fn stem(&self) -> PathBuf {
        self.path.with_extension("")
    }

    pub fn write_node_file(&self) {
        fs::write(self.path.with_extension("bnd"), NODE_FILE).unwrap();
    }
}

/// Build the standard fixture store
pub fn create_test_store() -> StoreFixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eplusout.sql");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();

    populate_strings(&conn);
    populate_tabular(&conn);
    populate_timeseries(&conn);

    conn.execute(
        "INSERT INTO Simulations VALUES (1, 'Version 9.4.0', 'YMD=2024.01.01', 4, 1, 1)",
        [],
    )
    .unwrap();

    StoreFixture { dir, path }
}

fn populate_strings(conn: &Connection) {
    let strings: &[(i64, i64, &str)] = &[
        (1, 1, REPORT),
        (2, 2, FACILITY),
        (3, 3, SITE_ENERGY),
        (4, 3, END_USES),
        (5, 4, "Total Site Energy"),
        (6, 4, "Net Site Energy"),
        (7, 4, "Heating"),
        (8, 5, "Total Energy"),
        (9, 5, "Energy Per Total Building Area"),
        (10, 5, "Electricity"),
        (11, 6, "GJ"),
        (12, 6, "MJ/m2"),
        // Stored twice under the same tag
        (13, 3, "Duplicated"),
        (14, 3, "Duplicated"),
        (15, 4, "Comment"),
        (16, 5, "Note"),
        (17, 6, ""),
    ];

    for (id, string_type, value) in strings {
        conn.execute(
            "INSERT INTO Strings VALUES (?1, ?2, ?3)",
            params![id, string_type, value],
        )
        .unwrap();
    }
}

fn populate_tabular(conn: &Connection) {
    // (table, row, column, units, row_id, column_id, value)
    let cells: &[(i64, i64, i64, i64, i64, i64, &str)] = &[
        (3, 5, 8, 11, 0, 0, "       130.00"),
        (3, 5, 9, 12, 0, 1, "      1250.50"),
        (3, 6, 8, 11, 1, 0, "       123.45"),
        (3, 6, 9, 12, 1, 1, "      1187.20"),
        (3, 15, 16, 17, 2, 2, "Values gathered over the run period"),
        (4, 7, 10, 11, 0, 0, "        12.00"),
    ];

    for (index, (table, row, column, units, row_id, column_id, value)) in
        cells.iter().enumerate()
    {
        conn.execute(
            "INSERT INTO TabularData VALUES (?1, 1, 2, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8)",
            params![index as i64 + 1, table, row, column, units, row_id, column_id, value],
        )
        .unwrap();
    }
}

fn populate_timeseries(conn: &Connection) {
    let dictionary: &[(i64, &str, &str, &str, &str, &str)] = &[
        (
            1,
            "Zone",
            "Environment",
            "Site Outdoor Air Drybulb Temperature",
            "Hourly",
            "C",
        ),
        (
            2,
            "HVAC",
            "SUPPLY OUTLET NODE",
            "System Node Standard Density Volume Flow Rate",
            "Hourly",
            "m3/s",
        ),
        (
            3,
            "HVAC",
            "CHW OUTLET NODE",
            "System Node Standard Density Volume Flow Rate",
            "Hourly",
            "m3/s",
        ),
        (
            4,
            "Zone",
            "Environment",
            "Site Outdoor Air Drybulb Temperature",
            "Daily",
            "C",
        ),
    ];

    for (index, timestep, key, name, frequency, units) in dictionary {
        conn.execute(
            "INSERT INTO ReportDataDictionary VALUES (?1, 0, 'Avg', 'Facility:Site', ?2, ?3, ?4, ?5, NULL, ?6)",
            params![index, timestep, key, name, frequency, units],
        )
        .unwrap();
    }

    // Three hourly stamps and one daily stamp
    let times: &[(i64, i64, i64, i64, i64)] = &[
        (1, 1, 1, 1, 60),
        (2, 1, 1, 2, 60),
        (3, 1, 1, 3, 60),
        (4, 1, 1, 24, 1440),
    ];
    for (index, month, day, hour, interval) in times {
        conn.execute(
            "INSERT INTO Time VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![index, month, day, hour, interval],
        )
        .unwrap();
    }

    // (time index, series, value)
    let data: &[(i64, i64, f64)] = &[
        (1, 1, 0.0),
        (2, 1, 100.0),
        (3, 1, 10.0),
        (1, 2, 1.0),
        (2, 2, 0.5),
        (3, 2, 0.25),
        (1, 3, 1.0),
        (2, 3, 2.0),
        (3, 3, 3.0),
        (4, 4, 37.0),
    ];
    for (index, (time_index, series, value)) in data.iter().enumerate() {
        conn.execute(
            "INSERT INTO ReportData VALUES (?1, ?2, ?3, ?4)",
            params![index as i64 + 1, time_index, series, value],
        )
        .unwrap();
    }
}

/// Build a store containing only an empty `Strings` table
pub fn create_bare_store() -> StoreFixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bare.sql");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE Strings (StringIndex INTEGER PRIMARY KEY, Value TEXT);")
        .unwrap();
    StoreFixture { dir, path }
}
