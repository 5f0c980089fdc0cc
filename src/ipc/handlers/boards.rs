use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use uuid::Uuid;

fn handle_boards_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "boards": [] }));
    };

    let mut stmt = match conn.prepare(
        "SELECT
           b.id,
           b.name,
           (SELECT COUNT(*) FROM students s WHERE s.board_id = b.id) AS student_count
         FROM boards b
         ORDER BY b.name",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let name: String = row.get(1)?;
            let student_count: i64 = row.get(2)?;
            Ok(json!({
                "id": id,
                "name": name,
                "studentCount": student_count
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(boards) => ok(&req.id, json!({ "boards": boards })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_boards_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let name = match req.params.get("name").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing name", None),
    };
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }

    let board_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO boards(id, name, updated_at) VALUES(?, ?, ?)",
        (&board_id, &name, db::now_stamp()),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "boards" })),
        );
    }

    ok(&req.id, json!({ "boardId": board_id, "name": name }))
}

fn handle_boards_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let board_id = match req.params.get("boardId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing boardId", None),
    };

    match db::board_exists(conn, &board_id) {
        Ok(true) => {}
        Ok(false) => return err(&req.id, "not_found", "board not found", None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    }

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };

    // No ON DELETE CASCADE; children first.
    for table in ["students", "boards"] {
        let column = if table == "boards" { "id" } else { "board_id" };
        if let Err(e) = tx.execute(
            &format!("DELETE FROM {} WHERE {} = ?", table, column),
            [&board_id],
        ) {
            let _ = tx.rollback();
            return err(
                &req.id,
                "db_delete_failed",
                e.to_string(),
                Some(json!({ "table": table })),
            );
        }
    }
    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "boards.list" => Some(handle_boards_list(state, req)),
        "boards.create" => Some(handle_boards_create(state, req)),
        "boards.delete" => Some(handle_boards_delete(state, req)),
        _ => None,
    }
}
