use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::enrich::{prepare_name, AttemptLog, CompanyRecord};

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS companies (
            name          TEXT PRIMARY KEY,
            resolved      TEXT,
            total_funding TEXT NOT NULL DEFAULT '[]',
            n_employees   TEXT NOT NULL DEFAULT '[]',
            series        TEXT NOT NULL DEFAULT '[]',
            location      TEXT NOT NULL DEFAULT '[]',
            website       TEXT NOT NULL DEFAULT '[]',
            status        TEXT NOT NULL CHECK(status IN ('found','not_found')),
            enriched_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Every request made during enrichment, including retries
        CREATE TABLE IF NOT EXISTS attempts (
            id           INTEGER PRIMARY KEY,
            name         TEXT NOT NULL,
            status       INTEGER,
            attempted_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_attempts_name ON attempts(name);
        CREATE INDEX IF NOT EXISTS idx_attempts_status ON attempts(status);
        ",
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Found,
    NotFound,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Found => "found",
            RecordStatus::NotFound => "not_found",
        }
    }
}

// ── Records ──

pub fn save_record(
    conn: &Connection,
    name: &str,
    resolved: Option<&str>,
    record: &CompanyRecord,
    status: RecordStatus,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO companies
         (name, resolved, total_funding, n_employees, series, location, website, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            name,
            resolved,
            serde_json::to_string(&record.total_funding)?,
            serde_json::to_string(&record.n_employees)?,
            serde_json::to_string(&record.series)?,
            serde_json::to_string(&record.location)?,
            serde_json::to_string(&record.website)?,
            status.as_str(),
        ],
    )?;
    Ok(())
}

/// Bulk insert, e.g. from a previous JSON export. Returns rows written.
pub fn save_records(conn: &Connection, records: &BTreeMap<String, CompanyRecord>) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for (name, record) in records {
        let status = if record.is_empty() {
            RecordStatus::NotFound
        } else {
            RecordStatus::Found
        };
        save_record(&tx, name, None, record, status)?;
    }
    tx.commit()?;
    Ok(records.len())
}

/// Stored names in slug form, so imported keys like `Deep Genomics` match
/// the `deep-genomics` a lookup would use.
pub fn known_names(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM companies")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .map(|name| name.map(|n| prepare_name(&n)))
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(names)
}

pub fn fetch_records(conn: &Connection) -> Result<BTreeMap<String, CompanyRecord>> {
    let mut stmt = conn.prepare(
        "SELECT name, total_funding, n_employees, series, location, website
         FROM companies ORDER BY name",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                [
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ],
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = BTreeMap::new();
    for (name, [fin, emp, ser, loc, web]) in rows {
        let record = CompanyRecord {
            total_funding: serde_json::from_str(&fin)?,
            n_employees: serde_json::from_str(&emp)?,
            series: serde_json::from_str(&ser)?,
            location: serde_json::from_str(&loc)?,
            website: serde_json::from_str(&web)?,
        };
        out.insert(name, record);
    }
    Ok(out)
}

// ── Attempts ──

pub fn save_attempts(conn: &Connection, log: &AttemptLog) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO attempts (name, status, attempted_at) VALUES (?1, ?2, ?3)")?;
        for a in log.attempts() {
            stmt.execute(rusqlite::params![a.name, a.status, a.at.to_rfc3339()])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Stats ──

pub struct Stats {
    pub records: usize,
    pub with_data: usize,
    pub not_found: usize,
    pub attempts: usize,
    pub blocked: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let records: usize = conn.query_row("SELECT COUNT(*) FROM companies", [], |r| r.get(0))?;
    let not_found: usize = conn.query_row(
        "SELECT COUNT(*) FROM companies WHERE status = 'not_found'",
        [],
        |r| r.get(0),
    )?;
    let with_data: usize = conn.query_row(
        "SELECT COUNT(*) FROM companies
         WHERE total_funding != '[]' OR n_employees != '[]' OR series != '[]'
            OR location != '[]' OR website != '[]'",
        [],
        |r| r.get(0),
    )?;
    let attempts: usize = conn.query_row("SELECT COUNT(*) FROM attempts", [], |r| r.get(0))?;
    let blocked: usize =
        conn.query_row("SELECT COUNT(*) FROM attempts WHERE status = 403", [], |r| r.get(0))?;
    Ok(Stats {
        records,
        with_data,
        not_found,
        attempts,
        blocked,
    })
}
