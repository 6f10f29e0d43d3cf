//! Store and harness tests: search, navigation, and stale-result handling

use pokedex::{
    action::Action,
    effect::Effect,
    reducer::reducer,
    state::{AppState, DetailRecord, SummaryRecord},
};
use tui_dispatch::testing::*;
use tui_dispatch::{assert_emitted, assert_not_emitted, DataResource, EffectStore};

fn bulbasaur() -> SummaryRecord {
    SummaryRecord {
        id: "1".into(),
        name: Some("Bulbasaur".into()),
        types: vec![Some("Grass".into()), Some("Poison".into())],
        sprite: None,
    }
}

fn listed() -> AppState {
    AppState {
        summaries: DataResource::Loaded(vec![bulbasaur()]),
        ..Default::default()
    }
}

#[test]
fn test_init_flow_with_harness() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.summaries.is_loading());

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::FetchSummaries { .. }));
    effects.effects_none_match(|e| matches!(e, Effect::FetchDetail { .. }));

    harness.complete_action(Action::SummariesDidLoad {
        search: "(?i).*.*".into(),
        records: vec![bulbasaur()],
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));
    harness.assert_state(|s| s.records().len() == 1);
}

#[test]
fn test_typing_never_fetches() {
    let mut harness = EffectStoreTestHarness::new(listed(), reducer);

    for text in ["c", "ch", "cha", "char"] {
        harness.dispatch_collect(Action::SearchInput(text.into()));
    }
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.search.pending == "char" && s.search.committed.is_empty());

    harness.dispatch_collect(Action::SearchCommit);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(
        |e| matches!(e, Effect::FetchSummaries { search } if search == "(?i).*char.*"),
    );
}

#[test]
fn test_select_then_dismiss() {
    let mut store = EffectStore::new(listed(), reducer);

    let result = store.dispatch(Action::Navigate("/pokemon/1".into()));
    assert_eq!(result.effects, vec![Effect::FetchDetail { id: "1".into() }]);
    assert_eq!(store.state().selected_id().as_deref(), Some("1"));

    store.dispatch(Action::DetailDidLoad {
        id: "1".into(),
        records: vec![DetailRecord {
            id: "1".into(),
            weight: 69,
            height: 7,
            ..Default::default()
        }],
    });
    assert!(store.state().detail.is_loaded());

    let result = store.dispatch(Action::Navigate("/list".into()));
    assert_eq!(result.effects, vec![Effect::CancelDetail]);
    assert_eq!(store.state().selected_id(), None);
    assert!(store.state().detail.is_empty());
}

#[test]
fn test_last_committed_search_wins() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::SearchInput("bulb".into()));
    harness.dispatch_collect(Action::SearchCommit);
    harness.dispatch_collect(Action::SearchInput("char".into()));
    harness.dispatch_collect(Action::SearchCommit);

    // Newer response lands first, older one afterwards
    harness.complete_action(Action::SummariesDidLoad {
        search: "(?i).*char.*".into(),
        records: vec![SummaryRecord {
            id: "4".into(),
            name: Some("Charmander".into()),
            ..Default::default()
        }],
    });
    harness.complete_action(Action::SummariesDidLoad {
        search: "(?i).*bulb.*".into(),
        records: vec![bulbasaur()],
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 2));

    harness.assert_state(|s| s.records()[0].display_name() == "Charmander");
}

#[test]
fn test_detail_error_is_dropped_after_switching_records() {
    let mut store = EffectStore::new(listed(), reducer);
    store.dispatch(Action::Navigate("/pokemon/1".into()));
    store.dispatch(Action::Navigate("/pokemon/4".into()));

    let result = store.dispatch(Action::DetailDidError {
        id: "1".into(),
        error: "timeout".into(),
    });
    assert!(!result.changed);
    assert!(store.state().detail.is_loading());
    assert_eq!(store.state().message, None);
}

#[test]
fn test_list_failure_reports_message() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::SummariesDidError {
        search: "(?i).*.*".into(),
        error: "request failed: connection refused".into(),
    });

    assert!(matches!(store.state().summaries, DataResource::Failed(_)));
    assert_eq!(
        store.state().message.as_deref(),
        Some("Error: request failed: connection refused")
    );

    // A later successful search clears it
    store.dispatch(Action::SearchCommit);
    store.dispatch(Action::SummariesDidLoad {
        search: "(?i).*.*".into(),
        records: vec![bulbasaur()],
    });
    assert_eq!(store.state().message, None);
}

#[test]
fn test_action_categories() {
    let did_load = Action::SummariesDidLoad {
        search: String::new(),
        records: Vec::new(),
    };

    assert_eq!(did_load.category(), Some("summaries_did"));
    assert!(did_load.is_summaries_did());
    assert_eq!(Action::SearchCommit.category(), None);
    assert_eq!(Action::FocusNext.category(), None);
    assert_eq!(Action::Tick.category(), None);
}

#[test]
fn test_assert_emitted_macro() {
    let actions = vec![Action::SearchInput("pika".into()), Action::SearchCommit];

    assert_emitted!(actions, Action::SearchInput(_));
    assert_emitted!(actions, Action::SearchCommit);
    assert_not_emitted!(actions, Action::Navigate(_));
}
