use super::board::page_mut;
use crate::ipc::error::{get_required_str, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::roll::RollEvent;

fn roll_start(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let page = page_mut(state)?;
    page.roll(RollEvent::Start);
    Ok(page.model())
}

/// Signals coming back from the roll overlay.
fn roll_action(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let action = get_required_str(params, "action")?;
    let event = RollEvent::parse_overlay(&action)
        .ok_or_else(|| HandlerErr::new("bad_params", format!("unknown roll action: {}", action)))?;
    let page = page_mut(state)?;
    page.roll(event);
    Ok(page.model())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "roll.start" => roll_start(state),
        "roll.action" => roll_action(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
