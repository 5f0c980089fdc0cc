use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_homeboardd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn homeboardd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn error_code(resp: &serde_json::Value) -> Option<&str> {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

#[test]
fn ordering_is_gated_until_students_load() {
    let workspace = temp_dir("homeboard-load-gate");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let no_ws = request(
        &mut stdin,
        &mut reader,
        "0",
        "board.open",
        json!({ "boardId": "missing" }),
    );
    assert_eq!(error_code(&no_ws), Some("no_workspace"));

    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let no_page = request(&mut stdin, &mut reader, "2", "board.page", json!({}));
    assert_eq!(error_code(&no_page), Some("no_page"));

    let board_id = request(
        &mut stdin,
        &mut reader,
        "3",
        "boards.create",
        json!({ "name": "Empty" }),
    )["result"]["boardId"]
        .as_str()
        .expect("boardId")
        .to_string();
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "board.open",
        json!({ "boardId": board_id }),
    );

    let early_reload = request(&mut stdin, &mut reader, "4b", "board.reload", json!({}));
    assert_eq!(error_code(&early_reload), Some("not_loaded"));

    let early = request(
        &mut stdin,
        &mut reader,
        "5",
        "toolbar.action",
        json!({ "action": "sort-first" }),
    );
    assert_eq!(error_code(&early), Some("not_loaded"));

    let loaded = request(&mut stdin, &mut reader, "6", "board.load", json!({}));
    assert_eq!(loaded["result"]["loadState"], "loaded");
    assert_eq!(loaded["result"]["students"], json!([]));

    for (i, kind) in ["sortByFirstName", "sortByLastName", "reverse", "clearToDefault"]
        .iter()
        .enumerate()
    {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("7-{}", i),
            "board.apply",
            json!({ "request": { "kind": kind } }),
        );
        assert_eq!(resp["result"]["students"], json!([]));
    }

    let again = request(&mut stdin, &mut reader, "8", "board.load", json!({}));
    assert_eq!(error_code(&again), Some("already_loaded"));

    let bad = request(
        &mut stdin,
        &mut reader,
        "9",
        "board.apply",
        json!({ "request": { "kind": "shuffle" } }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));

    drop(stdin);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn deleted_board_surfaces_load_failure() {
    let workspace = temp_dir("homeboard-load-error");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let board_id = request(
        &mut stdin,
        &mut reader,
        "2",
        "boards.create",
        json!({ "name": "Doomed" }),
    )["result"]["boardId"]
        .as_str()
        .expect("boardId")
        .to_string();
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "board.open",
        json!({ "boardId": board_id }),
    );

    // The page stays open; its one fetch now fails.
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "boards.delete",
        json!({ "boardId": board_id }),
    );
    let failed = request(&mut stdin, &mut reader, "5", "board.load", json!({}));
    assert_eq!(failed["result"]["loadState"], "error");
    assert_eq!(failed["result"]["message"], "Failed to load");
    assert!(failed["result"].get("students").is_none());

    let gated = request(
        &mut stdin,
        &mut reader,
        "5b",
        "toolbar.action",
        json!({ "action": "search", "text": "a" }),
    );
    assert_eq!(error_code(&gated), Some("not_loaded"));

    let reopen = request(
        &mut stdin,
        &mut reader,
        "6",
        "board.open",
        json!({ "boardId": board_id }),
    );
    assert_eq!(error_code(&reopen), Some("not_found"));

    let directory = request(
        &mut stdin,
        &mut reader,
        "7",
        "homeboard.students",
        json!({ "boardId": board_id }),
    );
    assert_eq!(error_code(&directory), Some("not_found"));

    drop(stdin);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn reload_failure_after_load_clears_students() {
    let workspace = temp_dir("homeboard-reload-error");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let board_id = request(
        &mut stdin,
        &mut reader,
        "2",
        "boards.create",
        json!({ "name": "Short-lived" }),
    )["result"]["boardId"]
        .as_str()
        .expect("boardId")
        .to_string();
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "boardId": board_id, "firstName": "Ada", "lastName": "Byron" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "board.open",
        json!({ "boardId": board_id }),
    );
    let loaded = request(&mut stdin, &mut reader, "5", "board.load", json!({}));
    assert_eq!(loaded["result"]["loadState"], "loaded");
    let sorted = request(
        &mut stdin,
        &mut reader,
        "6",
        "toolbar.action",
        json!({ "action": "sort-last" }),
    );
    assert_eq!(sorted["result"]["students"][0]["firstName"], "Ada");

    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "boards.delete",
        json!({ "boardId": board_id }),
    );

    let failed = request(&mut stdin, &mut reader, "9", "board.reload", json!({}));
    assert_eq!(failed["result"]["loadState"], "error");
    assert_eq!(failed["result"]["message"], "Failed to load");
    assert!(failed["result"].get("students").is_none());

    let gated = request(
        &mut stdin,
        &mut reader,
        "10",
        "toolbar.action",
        json!({ "action": "reverse" }),
    );
    assert_eq!(error_code(&gated), Some("not_loaded"));

    drop(stdin);
    let _ = std::fs::remove_dir_all(workspace);
}
