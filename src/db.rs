use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::roster::Student;

pub const DB_FILE: &str = "homeboard.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS boards(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            photo_url TEXT,
            sort_order INTEGER NOT NULL,
            updated_at TEXT,
            FOREIGN KEY(board_id) REFERENCES boards(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_board_sort ON students(board_id, sort_order)",
        [],
    )?;

    Ok(conn)
}

pub fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn board_exists(conn: &Connection, board_id: &str) -> rusqlite::Result<bool> {
    conn.query_row("SELECT 1 FROM boards WHERE id = ?", [board_id], |r| {
        r.get::<_, i64>(0)
    })
    .optional()
    .map(|v| v.is_some())
}

/// Students of a board in their stored (original) order.
pub fn board_students(conn: &Connection, board_id: &str) -> rusqlite::Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, photo_url
         FROM students
         WHERE board_id = ?
         ORDER BY sort_order, id",
    )?;
    stmt.query_map([board_id], |r| {
        let photo_url: Option<String> = r.get(3)?;
        Ok(Student {
            id: r.get(0)?,
            first_name: r.get(1)?,
            last_name: r.get(2)?,
            photo_url: photo_url.and_then(|s| {
                let t = s.trim().to_string();
                if t.is_empty() {
                    None
                } else {
                    Some(t)
                }
            }),
        })
    })
    .and_then(|it| it.collect::<Result<Vec<_>, _>>())
}

pub fn next_sort_order(conn: &Connection, board_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM students WHERE board_id = ?",
        [board_id],
        |r| r.get(0),
    )
}
