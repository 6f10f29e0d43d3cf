//! Derived view state: which of the six screens applies right now

use tui_dispatch::DataResource;

use crate::state::{AppState, DetailRecord, SummaryRecord};

/// Everything the derivation looks at
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewInputs<'a> {
    pub list_loading: bool,
    pub detail_loading: bool,
    pub records: &'a [SummaryRecord],
    pub list_error: Option<&'a str>,
    pub detail_error: Option<&'a str>,
    pub details: &'a [DetailRecord],
    pub selected_id: Option<&'a str>,
}

impl<'a> ViewInputs<'a> {
    pub fn from_state(state: &'a AppState, selected_id: Option<&'a str>) -> Self {
        Self {
            list_loading: state.summaries.is_loading(),
            detail_loading: state.detail.is_loading(),
            records: state.records(),
            list_error: failure(&state.summaries),
            detail_error: failure(&state.detail),
            details: state.details(),
            selected_id,
        }
    }
}

fn failure<T>(resource: &DataResource<T>) -> Option<&str> {
    match resource {
        DataResource::Failed(message) => Some(message.as_str()),
        _ => None,
    }
}

/// Detail overlay content for the selected id
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetailOverlay<'a> {
    pub id: &'a str,
    /// `None` when the detail query came back without a record
    pub detail: Option<&'a DetailRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewState<'a> {
    ListLoading,
    DetailLoading,
    Empty,
    ListError(&'a str),
    DetailError(&'a str),
    Populated {
        records: &'a [SummaryRecord],
        overlay: Option<DetailOverlay<'a>>,
    },
}

impl ViewState<'_> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::ListLoading | ViewState::DetailLoading)
    }

    /// Whether the detail overlay owns input
    pub fn is_modal(&self) -> bool {
        matches!(
            self,
            ViewState::DetailLoading
                | ViewState::DetailError(_)
                | ViewState::Populated {
                    overlay: Some(_),
                    ..
                }
        )
    }

    /// Whether the search controls are on screen
    pub fn shows_search(&self) -> bool {
        matches!(self, ViewState::Empty | ViewState::Populated { .. })
    }
}

/// Picks the view, first match wins:
/// list loading, detail loading, no records, list error, detail error, populated.
///
/// Detail status only counts while an id is selected.
pub fn derive_view<'a>(inputs: &ViewInputs<'a>) -> ViewState<'a> {
    let selected = inputs.selected_id.is_some();
    if inputs.list_loading {
        return ViewState::ListLoading;
    }
    if selected && inputs.detail_loading {
        return ViewState::DetailLoading;
    }
    if inputs.records.is_empty() {
        return ViewState::Empty;
    }
    if let Some(error) = inputs.list_error {
        return ViewState::ListError(error);
    }
    if let (true, Some(error)) = (selected, inputs.detail_error) {
        return ViewState::DetailError(error);
    }
    ViewState::Populated {
        records: inputs.records,
        overlay: inputs.selected_id.map(|id| DetailOverlay {
            id,
            detail: inputs.details.first(),
        }),
    }
}

/// Derives the view for `state` and hands it to `f`
pub fn with_view<R>(state: &AppState, f: impl FnOnce(ViewState<'_>) -> R) -> R {
    let selected = state.selected_id();
    let inputs = ViewInputs::from_state(state, selected.as_deref());
    f(derive_view(&inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulbasaur() -> SummaryRecord {
        SummaryRecord {
            id: "1".into(),
            name: Some("Bulbasaur".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_precedence_is_total_and_ordered() {
        let records = [bulbasaur()];
        for list_loading in [false, true] {
            for detail_loading in [false, true] {
                for count in [0usize, 1] {
                    for list_error in [None, Some("list down")] {
                        for detail_error in [None, Some("detail down")] {
                            let inputs = ViewInputs {
                                list_loading,
                                detail_loading,
                                records: &records[..count],
                                list_error,
                                detail_error,
                                details: &[],
                                selected_id: Some("1"),
                            };
                            let expected = if list_loading {
                                ViewState::ListLoading
                            } else if detail_loading {
                                ViewState::DetailLoading
                            } else if count == 0 {
                                ViewState::Empty
                            } else if let Some(e) = list_error {
                                ViewState::ListError(e)
                            } else if let Some(e) = detail_error {
                                ViewState::DetailError(e)
                            } else {
                                ViewState::Populated {
                                    records: &records[..],
                                    overlay: Some(DetailOverlay {
                                        id: "1",
                                        detail: None,
                                    }),
                                }
                            };
                            assert_eq!(derive_view(&inputs), expected);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_detail_states_need_a_selection() {
        let records = [bulbasaur()];
        let inputs = ViewInputs {
            detail_loading: true,
            detail_error: Some("stale"),
            records: &records,
            selected_id: None,
            ..Default::default()
        };
        assert_eq!(
            derive_view(&inputs),
            ViewState::Populated {
                records: &records,
                overlay: None
            }
        );
    }

    #[test]
    fn test_list_loading_hides_pending_detail() {
        let inputs = ViewInputs {
            list_loading: true,
            detail_loading: true,
            selected_id: Some("4"),
            ..Default::default()
        };
        assert_eq!(derive_view(&inputs), ViewState::ListLoading);
    }

    #[test]
    fn test_overlay_uses_first_detail() {
        let records = [bulbasaur()];
        let details = [
            DetailRecord {
                id: "1".into(),
                weight: 69,
                ..Default::default()
            },
            DetailRecord {
                id: "2".into(),
                ..Default::default()
            },
        ];
        let inputs = ViewInputs {
            records: &records,
            details: &details,
            selected_id: Some("1"),
            ..Default::default()
        };
        let ViewState::Populated {
            overlay: Some(overlay),
            ..
        } = derive_view(&inputs)
        else {
            panic!("expected populated view with overlay");
        };
        assert_eq!(overlay.detail.map(|d| d.weight), Some(69));
    }

    #[test]
    fn test_error_with_no_records_is_empty() {
        let inputs = ViewInputs {
            list_error: Some("network"),
            ..Default::default()
        };
        assert_eq!(derive_view(&inputs), ViewState::Empty);
        assert!(derive_view(&inputs).shows_search());
    }
}
