use rusqlite::Connection;
use thiserror::Error;

use crate::db;
use crate::roster::Student;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("board not found: {0}")]
    BoardNotFound(String),
    #[error("student query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Source of the roster for a board ("get-homeboard-students").
pub trait StudentDirectory {
    fn homeboard_students(&self, board_id: &str) -> Result<Vec<Student>, LoadError>;
}

pub struct SqliteDirectory<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteDirectory<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteDirectory { conn }
    }
}

impl StudentDirectory for SqliteDirectory<'_> {
    fn homeboard_students(&self, board_id: &str) -> Result<Vec<Student>, LoadError> {
        if !db::board_exists(self.conn, board_id)? {
            return Err(LoadError::BoardNotFound(board_id.to_string()));
        }
        Ok(db::board_students(self.conn, board_id)?)
    }
}
