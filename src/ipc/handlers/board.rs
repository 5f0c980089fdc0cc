use crate::board::{BoardPage, ToolbarAction};
use crate::db;
use crate::directory::SqliteDirectory;
use crate::ipc::error::{get_required_str, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::roster::OrderingRequest;
use tracing::info;

pub(super) fn page_mut(state: &mut AppState) -> Result<&mut BoardPage, HandlerErr> {
    state
        .page
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_page", "open a board first"))
}

fn board_open(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = state
        .db
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))?;
    let board_id = get_required_str(params, "boardId")?;
    match db::board_exists(conn, &board_id) {
        Ok(true) => {}
        Ok(false) => return Err(HandlerErr::new("not_found", "board not found")),
        Err(e) => return Err(HandlerErr::new("db_query_failed", e.to_string())),
    }
    info!(board = %board_id, "board opened");
    let page = BoardPage::open(board_id);
    let model = page.model();
    state.page = Some(page);
    Ok(model)
}

fn board_load(state: &mut AppState, reload: bool) -> Result<serde_json::Value, HandlerErr> {
    let conn = state
        .db
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))?;
    let page = state
        .page
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_page", "open a board first"))?;
    let directory = SqliteDirectory::new(conn);
    if reload {
        page.reload(&directory)?;
    } else {
        page.load(&directory)?;
    }
    info!(state = page.load_state().as_str(), reload, "board fetched");
    Ok(page.model())
}

fn board_page(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(page_mut(state)?.model())
}

fn board_apply(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let raw = params
        .get("request")
        .cloned()
        .ok_or_else(|| HandlerErr::new("bad_params", "missing request"))?;
    let request: OrderingRequest = serde_json::from_value(raw)
        .map_err(|e| HandlerErr::new("bad_params", format!("invalid request: {}", e)))?;
    let page = page_mut(state)?;
    page.apply(&request)?;
    Ok(page.model())
}

fn toolbar_action(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let action = get_required_str(params, "action")?;
    let text = params.get("text").and_then(|v| v.as_str());
    let action = ToolbarAction::parse(&action, text)?;
    let page = page_mut(state)?;
    page.toolbar(action)?;
    Ok(page.model())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "board.open" => board_open(state, &req.params),
        "board.load" => board_load(state, false),
        "board.reload" => board_load(state, true),
        "board.page" => board_page(state),
        "board.apply" => board_apply(state, &req.params),
        "toolbar.action" => toolbar_action(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
