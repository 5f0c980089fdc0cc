use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    #[default]
    Off,
    On,
}

/// Signals that drive roll mode. `Exit` and `Complete` come from the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RollEvent {
    Start,
    Exit,
    Complete,
}

impl RollEvent {
    pub fn parse_overlay(s: &str) -> Option<Self> {
        match s {
            "exit" => Some(RollEvent::Exit),
            "complete" => Some(RollEvent::Complete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollTransition {
    pub from: RollMode,
    pub to: RollMode,
    pub event: RollEvent,
}

pub type RollObserver = Box<dyn Fn(&RollTransition)>;

#[derive(Default)]
pub struct RollController {
    mode: RollMode,
    observer: Option<RollObserver>,
}

impl RollController {
    pub fn with_observer(observer: RollObserver) -> Self {
        RollController {
            mode: RollMode::Off,
            observer: Some(observer),
        }
    }

    pub fn mode(&self) -> RollMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode == RollMode::On
    }

    /// Returns the transition taken, or `None` when the event has no edge
    /// from the current mode.
    pub fn handle(&mut self, event: RollEvent) -> Option<RollTransition> {
        let to = match (self.mode, event) {
            (RollMode::Off, RollEvent::Start) => RollMode::On,
            (RollMode::On, RollEvent::Exit) | (RollMode::On, RollEvent::Complete) => RollMode::Off,
            _ => return None,
        };
        let transition = RollTransition {
            from: self.mode,
            to,
            event,
        };
        self.mode = to;
        if let Some(observer) = &self.observer {
            observer(&transition);
        }
        Some(transition)
    }
}

impl std::fmt::Debug for RollController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollController")
            .field("mode", &self.mode)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
