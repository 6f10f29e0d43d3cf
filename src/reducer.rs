//! Reducer - pure function: (state, action) -> DispatchResult

use tracing::{debug, trace, warn};
use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::AppState;
use crate::view;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let mut effects = vec![request_summaries(state)];
            if let Some(id) = state.selected_id() {
                effects.push(request_detail(state, id));
            }
            DispatchResult::changed_with_many(effects)
        }

        // ===== Search =====
        Action::SearchInput(text) => {
            if state.search.pending == text {
                return DispatchResult::unchanged();
            }
            state.search.pending = text;
            DispatchResult::changed()
        }

        Action::SearchCommit => {
            state.search.committed = state.search.pending.clone();
            debug!(committed = %state.search.committed, "search committed");
            DispatchResult::changed_with(request_summaries(state))
        }

        // ===== Navigation =====
        Action::Navigate(path) => {
            let previous = state.selected_id();
            state.location = path;
            let next = state.selected_id();
            if previous == next {
                return DispatchResult::changed();
            }
            match next {
                Some(id) => DispatchResult::changed_with(request_detail(state, id)),
                None => {
                    state.detail = DataResource::Empty;
                    DispatchResult::changed_with(Effect::CancelDetail)
                }
            }
        }

        // ===== Query results =====
        Action::SummariesDidLoad { search, records } => {
            if search != state.search.pattern() {
                trace!(%search, "dropping stale summaries");
                return DispatchResult::unchanged();
            }
            let urls: Vec<String> = records.iter().filter_map(|r| r.sprite.clone()).collect();
            state.summaries = DataResource::Loaded(records);
            state.cursor = 0;
            state.message = None;
            DispatchResult::changed_with_many(request_sprites(state, urls))
        }

        Action::SummariesDidError { search, error } => {
            if search != state.search.pattern() {
                trace!(%search, "dropping stale summary error");
                return DispatchResult::unchanged();
            }
            warn!(%error, "summary query failed");
            state.message = Some(format!("Error: {error}"));
            state.summaries = DataResource::Failed(error);
            state.cursor = 0;
            DispatchResult::changed()
        }

        Action::DetailDidLoad { id, records } => {
            if state.selected_id().as_deref() != Some(id.as_str()) {
                trace!(%id, "dropping detail for a closed overlay");
                return DispatchResult::unchanged();
            }
            let urls: Vec<String> = records
                .first()
                .and_then(|r| r.sprite.clone())
                .into_iter()
                .collect();
            state.detail = DataResource::Loaded(records);
            DispatchResult::changed_with_many(request_sprites(state, urls))
        }

        Action::DetailDidError { id, error } => {
            if state.selected_id().as_deref() != Some(id.as_str()) {
                trace!(%id, "dropping detail error for a closed overlay");
                return DispatchResult::unchanged();
            }
            warn!(%id, %error, "detail query failed");
            state.message = Some(format!("Error: {error}"));
            state.detail = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::SpriteDidLoad { url, sprite } => match state.sprites.get_mut(&url) {
            Some(entry) => {
                *entry = DataResource::Loaded(sprite);
                DispatchResult::changed()
            }
            None => DispatchResult::unchanged(),
        },

        Action::SpriteDidError { url, error } => match state.sprites.get_mut(&url) {
            Some(entry) => {
                debug!(%url, %error, "sprite unavailable");
                *entry = DataResource::Failed(error);
                DispatchResult::changed()
            }
            None => DispatchResult::unchanged(),
        },

        // ===== Focus / cursor =====
        Action::FocusNext => {
            state.focus = state.focus.next();
            DispatchResult::changed()
        }

        Action::FocusPrev => {
            state.focus = state.focus.prev();
            DispatchResult::changed()
        }

        Action::FocusSet(area) => {
            if state.focus == area {
                return DispatchResult::unchanged();
            }
            state.focus = area;
            DispatchResult::changed()
        }

        Action::CursorMove(delta) => {
            let len = state.records().len();
            let next = clamp_index(state.cursor, len, delta);
            set_cursor(state, next)
        }

        Action::CursorSet(index) => {
            let len = state.records().len();
            if index >= len {
                return DispatchResult::unchanged();
            }
            set_cursor(state, index)
        }

        Action::Render => DispatchResult::changed(),

        Action::Tick => {
            if view::with_view(state, |view| view.is_loading()) {
                state.tick = state.tick.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Marks the list query loading and returns the effect that runs it
fn request_summaries(state: &mut AppState) -> Effect {
    state.summaries = DataResource::Loading;
    Effect::FetchSummaries {
        search: state.search.pattern(),
    }
}

fn request_detail(state: &mut AppState, id: String) -> Effect {
    state.detail = DataResource::Loading;
    Effect::FetchDetail { id }
}

/// Marks artwork loading for each URL not already loading or loaded
fn request_sprites(state: &mut AppState, urls: Vec<String>) -> Vec<Effect> {
    let mut effects = Vec::new();
    for url in urls {
        if matches!(
            state.sprites.get(&url),
            Some(DataResource::Loading | DataResource::Loaded(_))
        ) {
            continue;
        }
        state.sprites.insert(url.clone(), DataResource::Loading);
        effects.push(Effect::FetchSprite { url });
    }
    effects
}

fn set_cursor(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if index == state.cursor {
        return DispatchResult::unchanged();
    }
    state.cursor = index;
    DispatchResult::changed()
}

fn clamp_index(current: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    let max = (len - 1) as i64;
    (current as i64 + delta as i64).clamp(0, max) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchMode;
    use crate::route::Route;
    use crate::sprite::SpriteData;
    use crate::state::{DetailRecord, FocusArea, SummaryRecord};

    fn record(id: &str, name: &str) -> SummaryRecord {
        SummaryRecord {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    fn loaded(records: Vec<SummaryRecord>) -> AppState {
        AppState {
            summaries: DataResource::Loaded(records),
            ..Default::default()
        }
    }

    #[test]
    fn test_init_fetches_list_only_without_selection() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::Init);

        assert!(result.changed);
        assert!(state.summaries.is_loading());
        assert!(state.detail.is_empty());
        assert_eq!(
            result.effects,
            vec![Effect::FetchSummaries {
                search: "(?i).*.*".into()
            }]
        );
    }

    #[test]
    fn test_init_with_detail_location_fetches_both() {
        let mut state = AppState::new("/pokemon/4", SearchMode::Pattern);
        let result = reducer(&mut state, Action::Init);

        assert!(state.summaries.is_loading());
        assert!(state.detail.is_loading());
        assert_eq!(result.effects.len(), 2);
        assert_eq!(result.effects[1], Effect::FetchDetail { id: "4".into() });
    }

    #[test]
    fn test_search_input_does_not_fetch() {
        let mut state = loaded(vec![record("1", "Bulbasaur")]);
        let result = reducer(&mut state, Action::SearchInput("char".into()));

        assert!(result.changed);
        assert!(result.effects.is_empty());
        assert_eq!(state.search.pending, "char");
        assert_eq!(state.search.committed, "");
        assert!(state.summaries.is_loaded());
    }

    #[test]
    fn test_commit_promotes_pending() {
        let mut state = AppState::default();
        reducer(&mut state, Action::SearchInput("char".into()));
        let result = reducer(&mut state, Action::SearchCommit);

        assert_eq!(state.search.committed, "char");
        assert!(state.summaries.is_loading());
        assert_eq!(
            result.effects,
            vec![Effect::FetchSummaries {
                search: "(?i).*char.*".into()
            }]
        );
    }

    #[test]
    fn test_literal_mode_commit_escapes() {
        let mut state = AppState::new(Route::List.path(), SearchMode::Literal);
        reducer(&mut state, Action::SearchInput("mr.".into()));
        let result = reducer(&mut state, Action::SearchCommit);
        assert_eq!(
            result.effects,
            vec![Effect::FetchSummaries {
                search: r"(?i).*mr\..*".into()
            }]
        );
    }

    #[test]
    fn test_stale_summaries_are_dropped() {
        let mut state = AppState::default();
        reducer(&mut state, Action::SearchInput("bulb".into()));
        reducer(&mut state, Action::SearchCommit);
        reducer(&mut state, Action::SearchInput("char".into()));
        reducer(&mut state, Action::SearchCommit);

        let stale = reducer(
            &mut state,
            Action::SummariesDidLoad {
                search: "(?i).*bulb.*".into(),
                records: vec![record("1", "Bulbasaur")],
            },
        );
        assert!(!stale.changed);
        assert!(state.summaries.is_loading());

        reducer(
            &mut state,
            Action::SummariesDidLoad {
                search: "(?i).*char.*".into(),
                records: vec![record("4", "Charmander")],
            },
        );
        assert_eq!(state.records(), &[record("4", "Charmander")]);
    }

    #[test]
    fn test_navigate_to_detail_fetches() {
        let mut state = loaded(vec![record("1", "Bulbasaur")]);
        let result = reducer(&mut state, Action::Navigate("/pokemon/1".into()));

        assert_eq!(state.selected_id().as_deref(), Some("1"));
        assert!(state.detail.is_loading());
        assert_eq!(result.effects, vec![Effect::FetchDetail { id: "1".into() }]);
        assert!(state.summaries.is_loaded());
    }

    #[test]
    fn test_navigate_to_list_clears_detail() {
        let mut state = AppState {
            location: "/pokemon/1".into(),
            detail: DataResource::Failed("boom".into()),
            ..loaded(vec![record("1", "Bulbasaur")])
        };
        let result = reducer(&mut state, Action::Navigate("/list".into()));

        assert_eq!(state.selected_id(), None);
        assert!(state.detail.is_empty());
        assert_eq!(result.effects, vec![Effect::CancelDetail]);
    }

    #[test]
    fn test_navigate_same_id_does_not_refetch() {
        let mut state = AppState {
            location: "/pokemon/1".into(),
            ..Default::default()
        };
        let result = reducer(&mut state, Action::Navigate("/pokemon/1/".into()));
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_detail_for_closed_overlay_is_dropped() {
        let mut state = loaded(vec![record("1", "Bulbasaur")]);
        reducer(&mut state, Action::Navigate("/pokemon/1".into()));
        reducer(&mut state, Action::Navigate("/list".into()));

        let result = reducer(
            &mut state,
            Action::DetailDidLoad {
                id: "1".into(),
                records: vec![DetailRecord::default()],
            },
        );
        assert!(!result.changed);
        assert!(state.detail.is_empty());
    }

    #[test]
    fn test_summary_error_sets_message() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        reducer(
            &mut state,
            Action::SummariesDidError {
                search: "(?i).*.*".into(),
                error: "request failed: offline".into(),
            },
        );
        assert!(matches!(state.summaries, DataResource::Failed(_)));
        assert_eq!(
            state.message.as_deref(),
            Some("Error: request failed: offline")
        );
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut state = loaded(vec![record("1", "a"), record("2", "b"), record("3", "c")]);
        reducer(&mut state, Action::CursorMove(5));
        assert_eq!(state.cursor, 2);
        reducer(&mut state, Action::CursorMove(-10));
        assert_eq!(state.cursor, 0);

        let result = reducer(&mut state, Action::CursorSet(7));
        assert!(!result.changed);
    }

    #[test]
    fn test_focus_cycles() {
        let mut state = AppState::default();
        assert_eq!(state.focus, FocusArea::Cards);
        reducer(&mut state, Action::FocusNext);
        assert_eq!(state.focus, FocusArea::SearchInput);
        reducer(&mut state, Action::FocusPrev);
        assert_eq!(state.focus, FocusArea::Cards);
    }

    #[test]
    fn test_loaded_records_request_each_sprite_once() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        let with_art = |id: &str| SummaryRecord {
            sprite: Some(format!("https://img/{id}.png")),
            ..record(id, "x")
        };
        let result = reducer(
            &mut state,
            Action::SummariesDidLoad {
                search: "(?i).*.*".into(),
                records: vec![with_art("1"), record("2", "no art"), with_art("1")],
            },
        );
        assert_eq!(
            result.effects,
            vec![Effect::FetchSprite {
                url: "https://img/1.png".into()
            }]
        );
        assert!(state.sprites["https://img/1.png"].is_loading());

        // The overlay reuses the card's artwork
        reducer(&mut state, Action::Navigate("/pokemon/1".into()));
        let result = reducer(
            &mut state,
            Action::DetailDidLoad {
                id: "1".into(),
                records: vec![DetailRecord {
                    sprite: Some("https://img/1.png".into()),
                    ..Default::default()
                }],
            },
        );
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_sprite_results_fill_the_cache() {
        let url = "https://img/4.png".to_string();
        let mut state = AppState::default();
        state.sprites.insert(url.clone(), DataResource::Loading);

        let sprite = SpriteData {
            width: 1,
            height: 1,
            pixels: vec![255, 0, 0, 255],
        };
        let result = reducer(
            &mut state,
            Action::SpriteDidLoad {
                url: url.clone(),
                sprite: sprite.clone(),
            },
        );
        assert!(result.changed);
        assert_eq!(state.sprite(Some(&url)).and_then(|s| s.data()), Some(&sprite));

        let unknown = reducer(
            &mut state,
            Action::SpriteDidError {
                url: "https://img/9.png".into(),
                error: "404".into(),
            },
        );
        assert!(!unknown.changed);
        assert!(!state.sprites.contains_key("https://img/9.png"));
    }

    #[test]
    fn test_failed_sprite_is_retried_on_next_load() {
        let url = "https://img/7.png".to_string();
        let mut state = AppState::default();
        state
            .sprites
            .insert(url.clone(), DataResource::Failed("timeout".into()));
        let effects = request_sprites(&mut state, vec![url.clone()]);
        assert_eq!(effects, vec![Effect::FetchSprite { url }]);
    }

    #[test]
    fn test_tick_only_while_loading() {
        let mut state = loaded(vec![record("1", "a")]);
        assert!(!reducer(&mut state, Action::Tick).changed);

        state.summaries = DataResource::Loading;
        assert!(reducer(&mut state, Action::Tick).changed);
        assert_eq!(state.tick, 1);
    }
}
