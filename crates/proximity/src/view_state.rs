// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Selection and expansion state for a map + list shell.
//!
//! State is a plain serializable value and every change goes through
//! [`reduce`], so a front end can persist, replay, or diff it.

use serde::{Deserialize, Serialize};

/// Which collection the list and map are showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Resorts,
    Dialysis,
    Hospitals,
    UrgentCare,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Identifier of the selected record in the current mode.
    pub selected: Option<String>,
    /// Identifier of the record whose detail card is expanded.
    pub expanded: Option<String>,
    /// Rank of the highlighted neighbor of the selected record.
    pub highlighted_neighbor: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ViewAction {
    SetMode(ViewMode),
    Select(String),
    ClearSelection,
    ToggleExpanded(String),
    HighlightNeighbor(usize),
    ClearHighlight,
}

/// Apply an action, returning the next state.
#[must_use]
pub fn reduce(state: &ViewState, action: ViewAction) -> ViewState {
    match action {
        ViewAction::SetMode(mode) if mode == state.mode => state.clone(),
        ViewAction::SetMode(mode) => ViewState {
            mode,
            ..ViewState::default()
        },
        ViewAction::Select(id) => {
            let highlighted_neighbor = if state.selected.as_deref() == Some(id.as_str()) {
                state.highlighted_neighbor
            } else {
                None
            };
            ViewState {
                selected: Some(id),
                highlighted_neighbor,
                ..state.clone()
            }
        }
        ViewAction::ClearSelection => ViewState {
            selected: None,
            highlighted_neighbor: None,
            ..state.clone()
        },
        ViewAction::ToggleExpanded(id) => {
            let expanded = if state.expanded.as_deref() == Some(id.as_str()) {
                None
            } else {
                Some(id)
            };
            ViewState {
                expanded,
                ..state.clone()
            }
        }
        ViewAction::HighlightNeighbor(rank) => ViewState {
            highlighted_neighbor: state.selected.as_ref().map(|_| rank),
            ..state.clone()
        },
        ViewAction::ClearHighlight => ViewState {
            highlighted_neighbor: None,
            ..state.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(actions: Vec<ViewAction>) -> ViewState {
        actions
            .into_iter()
            .fold(ViewState::default(), |state, action| reduce(&state, action))
    }

    #[test]
    fn test_mode_switch_clears_selection() {
        let state = apply(vec![
            ViewAction::Select("Vail|CO".to_string()),
            ViewAction::ToggleExpanded("Vail|CO".to_string()),
            ViewAction::HighlightNeighbor(1),
            ViewAction::SetMode(ViewMode::Hospitals),
        ]);
        assert_eq!(
            state,
            ViewState {
                mode: ViewMode::Hospitals,
                ..ViewState::default()
            }
        );
    }

    #[test]
    fn test_same_mode_is_noop() {
        let state = apply(vec![
            ViewAction::Select("Vail|CO".to_string()),
            ViewAction::SetMode(ViewMode::Resorts),
        ]);
        assert_eq!(state.selected.as_deref(), Some("Vail|CO"));
    }

    #[test]
    fn test_new_selection_clears_highlight() {
        let state = apply(vec![
            ViewAction::Select("A".to_string()),
            ViewAction::HighlightNeighbor(2),
        ]);
        assert_eq!(state.highlighted_neighbor, Some(2));

        let reselected = reduce(&state, ViewAction::Select("A".to_string()));
        assert_eq!(reselected.highlighted_neighbor, Some(2));

        let moved = reduce(&state, ViewAction::Select("B".to_string()));
        assert_eq!(moved.highlighted_neighbor, None);
    }

    #[test]
    fn test_highlight_requires_selection() {
        let state = apply(vec![ViewAction::HighlightNeighbor(0)]);
        assert_eq!(state.highlighted_neighbor, None);
    }

    #[test]
    fn test_toggle_expanded() {
        let state = apply(vec![ViewAction::ToggleExpanded("A".to_string())]);
        assert_eq!(state.expanded.as_deref(), Some("A"));
        let state = reduce(&state, ViewAction::ToggleExpanded("B".to_string()));
        assert_eq!(state.expanded.as_deref(), Some("B"));
        let state = reduce(&state, ViewAction::ToggleExpanded("B".to_string()));
        assert_eq!(state.expanded, None);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = apply(vec![
            ViewAction::SetMode(ViewMode::UrgentCare),
            ViewAction::Select("osm-42".to_string()),
        ]);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"urgent-care\""));
        let restored: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
