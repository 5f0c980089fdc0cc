use crate::db;
use crate::directory::{LoadError, SqliteDirectory, StudentDirectory};
use crate::ipc::error::{get_required_str, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

fn require_db(state: &AppState) -> Result<&Connection, HandlerErr> {
    state
        .db
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

fn require_board(conn: &Connection, board_id: &str) -> Result<(), HandlerErr> {
    match db::board_exists(conn, board_id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(HandlerErr::new("not_found", "board not found")),
        Err(e) => Err(HandlerErr::new("db_query_failed", e.to_string())),
    }
}

fn students_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let board_id = get_required_str(params, "boardId")?;
    require_board(conn, &board_id)?;
    let students = db::board_students(conn, &board_id)
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    Ok(json!({ "students": students }))
}

fn students_create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let board_id = get_required_str(params, "boardId")?;
    let first_name = get_required_str(params, "firstName")?.trim().to_string();
    let last_name = get_required_str(params, "lastName")?.trim().to_string();
    if first_name.is_empty() && last_name.is_empty() {
        return Err(HandlerErr::new("bad_params", "student needs a first or last name"));
    }
    let photo_url = params
        .get("photoUrl")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    require_board(conn, &board_id)?;

    let sort_order = db::next_sort_order(conn, &board_id)
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    conn.execute(
        "INSERT INTO students(board_id, first_name, last_name, photo_url, sort_order, updated_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &board_id,
            &first_name,
            &last_name,
            &photo_url,
            sort_order,
            db::now_stamp(),
        ),
    )
    .map_err(|e| HandlerErr {
        code: "db_insert_failed",
        message: e.to_string(),
        details: Some(json!({ "table": "students" })),
    })?;

    Ok(json!({
        "studentId": conn.last_insert_rowid(),
        "sortOrder": sort_order
    }))
}

fn students_delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let board_id = get_required_str(params, "boardId")?;
    let student_id = params
        .get("studentId")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::new("bad_params", "missing studentId"))?;
    let changed = conn
        .execute(
            "DELETE FROM students WHERE board_id = ? AND id = ?",
            (&board_id, student_id),
        )
        .map_err(|e| HandlerErr::new("db_delete_failed", e.to_string()))?;
    if changed == 0 {
        return Err(HandlerErr::new("not_found", "student not found"));
    }
    Ok(json!({ "ok": true }))
}

/// The directory read the page loads from.
fn homeboard_students(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let board_id = get_required_str(params, "boardId")?;
    let students = SqliteDirectory::new(conn)
        .homeboard_students(&board_id)
        .map_err(|e| match e {
            LoadError::BoardNotFound(_) => HandlerErr::new("not_found", e.to_string()),
            LoadError::Query(_) => HandlerErr::new("db_query_failed", e.to_string()),
        })?;
    Ok(json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => students_list(state, &req.params),
        "students.create" => students_create(state, &req.params),
        "students.delete" => students_delete(state, &req.params),
        "homeboard.students" => homeboard_students(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
