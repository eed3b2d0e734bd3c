use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::parser::candidate::ProcessedContent;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            id             INTEGER PRIMARY KEY,
            source         TEXT UNIQUE NOT NULL,
            body           TEXT NOT NULL,
            display_text   TEXT NOT NULL,
            resource_count INTEGER NOT NULL DEFAULT 0,
            processed_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS resources (
            id            INTEGER PRIMARY KEY,
            message_id    INTEGER NOT NULL REFERENCES messages(id),
            position      INTEGER NOT NULL,
            title         TEXT NOT NULL,
            author        TEXT,
            resource_type TEXT,
            level         TEXT,
            duration      TEXT,
            description   TEXT,
            cover_url     TEXT,
            detail_url    TEXT NOT NULL,
            strategy_rank INTEGER NOT NULL,
            text_offset   INTEGER NOT NULL,
            UNIQUE(message_id, position)
        );
        CREATE INDEX IF NOT EXISTS idx_resources_message ON resources(message_id);
        CREATE INDEX IF NOT EXISTS idx_resources_type ON resources(resource_type);
        ",
    )?;
    Ok(())
}

// ── Saving ──

pub struct MessageRow {
    /// File name, or `file.json#index` for transcript entries.
    pub source: String,
    pub body: String,
    pub processed: ProcessedContent,
}

/// Store processed messages; a source seen before replaces its old rows.
pub fn save_processed(conn: &Connection, rows: &[MessageRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut saved = 0;
    {
        let mut drop_resources = tx.prepare(
            "DELETE FROM resources WHERE message_id IN (SELECT id FROM messages WHERE source = ?1)",
        )?;
        let mut drop_message = tx.prepare("DELETE FROM messages WHERE source = ?1")?;
        let mut insert_message = tx.prepare(
            "INSERT INTO messages (source, body, display_text, resource_count)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut insert_resource = tx.prepare(
            "INSERT INTO resources
             (message_id, position, title, author, resource_type, level, duration,
              description, cover_url, detail_url, strategy_rank, text_offset)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;

        for row in rows {
            drop_resources.execute([&row.source])?;
            drop_message.execute([&row.source])?;
            insert_message.execute(rusqlite::params![
                row.source,
                row.body,
                row.processed.display_text,
                row.processed.resources.len(),
            ])?;
            let message_id = tx.last_insert_rowid();

            for (i, r) in row.processed.resources.iter().enumerate() {
                insert_resource.execute(rusqlite::params![
                    message_id,
                    i + 1,
                    r.title,
                    r.author,
                    r.resource_type,
                    r.level,
                    r.duration,
                    r.description,
                    r.cover_url,
                    r.detail_url,
                    r.strategy_rank,
                    r.text_offset,
                ])?;
            }
            saved += 1;
        }
    }
    tx.commit()?;
    Ok(saved)
}

// ── Overview ──

pub struct OverviewRow {
    pub source: String,
    pub position: usize,
    pub title: String,
    pub author: String,
    pub resource_type: String,
    pub detail_url: String,
}

pub fn fetch_overview(
    conn: &Connection,
    resource_type: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let where_clause = match resource_type {
        Some(t) => {
            params.push(Box::new(format!("%{}%", t.to_lowercase())));
            " WHERE LOWER(r.resource_type) LIKE ?1"
        }
        None => "",
    };

    let sql = format!(
        "SELECT m.source, r.position, r.title, COALESCE(r.author,''),
                COALESCE(r.resource_type,''), r.detail_url
         FROM resources r
         JOIN messages m ON m.id = r.message_id{}
         ORDER BY m.source, r.position
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(OverviewRow {
                source: row.get(0)?,
                position: row.get(1)?,
                title: row.get(2)?,
                author: row.get(3)?,
                resource_type: row.get(4)?,
                detail_url: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub messages: usize,
    pub with_resources: usize,
    pub resources: usize,
    pub linked: usize,
    pub by_type: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let messages: usize = conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?;
    let with_resources: usize = conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE resource_count > 0",
        [],
        |r| r.get(0),
    )?;
    let resources: usize = conn.query_row("SELECT COUNT(*) FROM resources", [], |r| r.get(0))?;
    let linked: usize = conn.query_row(
        "SELECT COUNT(*) FROM resources WHERE detail_url <> '#'",
        [],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT COALESCE(resource_type, '(none)'), COUNT(*) FROM resources
         GROUP BY 1 ORDER BY 2 DESC, 1",
    )?;
    let by_type = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stats {
        messages,
        with_resources,
        resources,
        linked,
        by_type,
    })
}
