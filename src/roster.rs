use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The latest user action against the list. Only `Reverse` looks at the
/// previously displayed view; every other request is derived from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderingRequest {
    SortByFirstName,
    SortByLastName,
    Reverse,
    Search { text: String },
    ClearToDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewMode {
    Default,
    FirstName,
    LastName,
    Search { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Ascending,
    Descending,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Ascending => Orientation::Descending,
            Orientation::Descending => Orientation::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedView {
    pub students: Vec<Student>,
    pub mode: ViewMode,
    pub orientation: Orientation,
}

impl DisplayedView {
    /// The roster as supplied, before any user action.
    pub fn default_for(roster: &[Student]) -> Self {
        DisplayedView {
            students: roster.to_vec(),
            mode: ViewMode::Default,
            orientation: Orientation::Ascending,
        }
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<i64> {
        self.students.iter().map(|s| s.id).collect()
    }
}

fn sorted_by<F>(roster: &[Student], name: F) -> Vec<Student>
where
    F: Fn(&Student) -> &str,
{
    let mut out = roster.to_vec();
    out.sort_by_cached_key(|s| (name(s).to_lowercase(), s.id));
    out
}

fn search(roster: &[Student], text: &str) -> Vec<Student> {
    if text.is_empty() {
        return roster.to_vec();
    }
    let needle = text.to_lowercase();
    roster
        .iter()
        .filter(|s| s.first_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn apply(roster: &[Student], request: &OrderingRequest, prior: &DisplayedView) -> DisplayedView {
    match request {
        OrderingRequest::SortByFirstName => DisplayedView {
            students: sorted_by(roster, |s| s.first_name.as_str()),
            mode: ViewMode::FirstName,
            orientation: Orientation::Ascending,
        },
        OrderingRequest::SortByLastName => DisplayedView {
            students: sorted_by(roster, |s| s.last_name.as_str()),
            mode: ViewMode::LastName,
            orientation: Orientation::Ascending,
        },
        OrderingRequest::Reverse => {
            // Nothing has been sorted or searched yet: show the roster as given.
            if prior.mode == ViewMode::Default {
                return prior.clone();
            }
            let mut students = prior.students.clone();
            students.reverse();
            DisplayedView {
                students,
                mode: prior.mode.clone(),
                orientation: prior.orientation.flipped(),
            }
        }
        OrderingRequest::Search { text } => DisplayedView {
            students: search(roster, text),
            mode: ViewMode::Search { text: text.clone() },
            orientation: Orientation::Ascending,
        },
        OrderingRequest::ClearToDefault => DisplayedView::default_for(roster),
    }
}

/// Recomputes `view` against a replaced roster, keeping its mode and orientation.
pub fn rederive(roster: &[Student], view: &DisplayedView) -> DisplayedView {
    let base = DisplayedView::default_for(roster);
    let request = match &view.mode {
        ViewMode::Default => return base,
        ViewMode::FirstName => OrderingRequest::SortByFirstName,
        ViewMode::LastName => OrderingRequest::SortByLastName,
        ViewMode::Search { text } => OrderingRequest::Search { text: text.clone() },
    };
    let next = apply(roster, &request, &base);
    match view.orientation {
        Orientation::Ascending => next,
        Orientation::Descending => apply(roster, &OrderingRequest::Reverse, &next),
    }
}
