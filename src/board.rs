use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::directory::StudentDirectory;
use crate::roll::{RollController, RollEvent, RollTransition};
use crate::roster::{self, DisplayedView, OrderingRequest, Student};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("students are not loaded")]
    NotLoaded,
    #[error("students already loaded for this page; use board.reload")]
    AlreadyLoaded,
    #[error("unknown toolbar action: {0}")]
    UnknownAction(String),
}

impl PageError {
    pub fn code(&self) -> &'static str {
        match self {
            PageError::NotLoaded => "not_loaded",
            PageError::AlreadyLoaded => "already_loaded",
            PageError::UnknownAction(_) => "bad_params",
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Loaded(Vec<Student>),
    Error(String),
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Loading => "loading",
            LoadState::Loaded(_) => "loaded",
            LoadState::Error(_) => "error",
        }
    }
}

/// What a toolbar click means to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarAction {
    Order(OrderingRequest),
    StartRoll,
}

impl ToolbarAction {
    pub fn parse(action: &str, text: Option<&str>) -> Result<Self, PageError> {
        Ok(match action {
            "sort-first" => ToolbarAction::Order(OrderingRequest::SortByFirstName),
            "sort-last" => ToolbarAction::Order(OrderingRequest::SortByLastName),
            "reverse" => ToolbarAction::Order(OrderingRequest::Reverse),
            "search" => ToolbarAction::Order(OrderingRequest::Search {
                text: text.unwrap_or_default().to_string(),
            }),
            "start-roll" => ToolbarAction::StartRoll,
            other => return Err(PageError::UnknownAction(other.to_string())),
        })
    }
}

#[derive(Debug)]
pub struct BoardPage {
    board_id: String,
    load: LoadState,
    view: DisplayedView,
    roll: RollController,
}

fn log_transition(t: &RollTransition) {
    info!(from = ?t.from, to = ?t.to, event = ?t.event, "roll mode changed");
}

impl BoardPage {
    pub fn open(board_id: impl Into<String>) -> Self {
        BoardPage {
            board_id: board_id.into(),
            load: LoadState::Loading,
            view: DisplayedView::default_for(&[]),
            roll: RollController::with_observer(Box::new(log_transition)),
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    #[cfg(test)]
    pub fn view(&self) -> &DisplayedView {
        &self.view
    }

    pub fn is_roll_mode(&self) -> bool {
        self.roll.is_active()
    }

    /// Issues the one fetch for this page display.
    pub fn load(&mut self, directory: &dyn StudentDirectory) -> Result<(), PageError> {
        if !matches!(self.load, LoadState::Loading) {
            return Err(PageError::AlreadyLoaded);
        }
        self.fetch(directory);
        Ok(())
    }

    /// Refetches the roster and re-derives the current view from it. The
    /// first fetch must go through `load`.
    pub fn reload(&mut self, directory: &dyn StudentDirectory) -> Result<(), PageError> {
        if matches!(self.load, LoadState::Loading) {
            return Err(PageError::NotLoaded);
        }
        self.fetch(directory);
        Ok(())
    }

    fn fetch(&mut self, directory: &dyn StudentDirectory) {
        match directory.homeboard_students(&self.board_id) {
            Ok(students) => {
                debug!(board = %self.board_id, count = students.len(), "roster loaded");
                self.view = match &self.load {
                    LoadState::Loaded(_) => roster::rederive(&students, &self.view),
                    _ => DisplayedView::default_for(&students),
                };
                self.load = LoadState::Loaded(students);
            }
            Err(e) => {
                warn!(board = %self.board_id, error = %e, "roster load failed");
                self.view = DisplayedView::default_for(&[]);
                self.load = LoadState::Error(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub fn apply(&mut self, request: &OrderingRequest) -> Result<(), PageError> {
        let LoadState::Loaded(students) = &self.load else {
            return Err(PageError::NotLoaded);
        };
        self.view = roster::apply(students, request, &self.view);
        debug!(request = ?request, shown = self.view.students.len(), "ordering applied");
        Ok(())
    }

    pub fn roll(&mut self, event: RollEvent) -> bool {
        let changed = self.roll.handle(event).is_some();
        if !changed {
            debug!(event = ?event, mode = ?self.roll.mode(), "roll event ignored");
        } else if event == RollEvent::Start {
            if let LoadState::Loaded(students) = &self.load {
                debug!(students = students.len(), "roll started");
            }
        }
        changed
    }

    pub fn toolbar(&mut self, action: ToolbarAction) -> Result<(), PageError> {
        match action {
            ToolbarAction::Order(request) => self.apply(&request),
            ToolbarAction::StartRoll => {
                self.roll(RollEvent::Start);
                Ok(())
            }
        }
    }

    /// The page as the front end draws it.
    pub fn model(&self) -> serde_json::Value {
        let is_roll_mode = self.is_roll_mode();
        let mut model = json!({
            "boardId": self.board_id,
            "loadState": self.load.as_str(),
            "isRollMode": is_roll_mode,
            "overlay": { "isActive": is_roll_mode },
        });
        match &self.load {
            LoadState::Loading => {}
            LoadState::Error(message) => {
                model["message"] = json!(message);
            }
            LoadState::Loaded(_) => {
                let tiles: Vec<serde_json::Value> = self
                    .view
                    .students
                    .iter()
                    .map(|s| {
                        json!({
                            "id": s.id,
                            "firstName": s.first_name,
                            "lastName": s.last_name,
                            "displayName": s.display_name(),
                            "photoUrl": s.photo_url,
                            "isRollMode": is_roll_mode,
                        })
                    })
                    .collect();
                model["mode"] = json!(self.view.mode);
                model["orientation"] = json!(self.view.orientation);
                model["students"] = json!(tiles);
            }
        }
        model
    }
}
