//! Tests for SearchState.

use super::*;
use crate::model::column_ids;
use crate::sync::MemoryHistory;
use std::cell::RefCell;

type Calls = Rc<RefCell<Vec<(String, Vec<ColumnId>)>>>;

fn recorded(state: &mut SearchState) -> Calls {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    state.set_on_search(move |query, columns| {
        sink.borrow_mut().push((query.to_owned(), columns.to_vec()));
    });
    calls
}

fn scoped() -> SearchOptions {
    SearchOptions {
        searchable_columns: column_ids(["name", "email", "city"]),
        ..SearchOptions::default()
    }
}

fn url_synced(history_mode: HistoryMode) -> SearchOptions {
    SearchOptions {
        sync_with_url: true,
        history_mode,
        ..SearchOptions::default()
    }
}

// ===== Debounce =====

#[test]
fn burst_commits_once_with_last_value() {
    // GIVEN keystrokes at t=0, 50, 100 with the default 300ms window
    let mut state = SearchState::new(SearchOptions::default(), None);
    let calls = recorded(&mut state);

    state.set_search("a", 0);
    state.set_search("ab", 50);
    state.set_search("abc", 100);

    // WHEN time advances past the last deadline
    assert_eq!(state.next_deadline_ms(), Some(400));
    assert!(!state.poll(399));
    assert!(state.poll(400));
    assert!(!state.poll(1_000));

    // THEN exactly one commit with the last value
    assert_eq!(*calls.borrow(), vec![("abc".to_string(), Vec::new())]);
    assert_eq!(state.query(), "abc");
    assert!(state.has_search());
}

#[test]
fn pending_tracks_the_debounce_window() {
    let mut state = SearchState::new(SearchOptions::default(), None);
    assert!(!state.is_pending());

    state.set_search("x", 0);
    assert!(state.is_pending());
    assert_eq!(state.raw(), "x");
    assert_eq!(state.query(), "");

    state.poll(300);
    assert!(!state.is_pending());
}

#[test]
fn clear_search_commits_immediately() {
    let mut state = SearchState::new(SearchOptions::default(), None);
    state.set_search("abc", 0);
    state.poll(300);
    let calls = recorded(&mut state);

    state.set_search("abcd", 400);
    state.clear_search(450);

    assert_eq!(state.query(), "");
    assert!(!state.is_pending());
    assert_eq!(*calls.borrow(), vec![(String::new(), Vec::new())]);
    assert!(!state.poll(10_000), "the in-flight keystroke must not land later");
}

#[test]
fn clear_search_when_already_empty_is_silent() {
    let mut state = SearchState::new(SearchOptions::default(), None);
    let calls = recorded(&mut state);
    state.clear_search(0);
    assert!(calls.borrow().is_empty());
}

#[test]
fn dropping_manager_discards_pending_commit() {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    {
        let mut state = SearchState::new(SearchOptions::default(), None);
        let sink = Rc::clone(&calls);
        state.set_on_search(move |q, c| sink.borrow_mut().push((q.to_owned(), c.to_vec())));
        state.set_search("never", 0);
    }
    assert!(calls.borrow().is_empty());
}

// ===== Column scoping =====

#[test]
fn all_searchable_columns_start_active() {
    let state = SearchState::new(scoped(), None);
    assert_eq!(state.active_columns(), column_ids(["name", "email", "city"]).as_slice());
}

#[test]
fn initial_active_columns_are_restricted_to_searchable() {
    let options = SearchOptions {
        initial_active_columns: Some(column_ids(["city", "unknown"])),
        ..scoped()
    };
    let state = SearchState::new(options, None);
    assert_eq!(state.active_columns(), column_ids(["city"]).as_slice());
}

#[test]
fn toggling_columns_with_empty_query_does_not_notify() {
    let mut state = SearchState::new(scoped(), None);
    let calls = recorded(&mut state);

    state.toggle_column(&ColumnId::from("email"));

    assert_eq!(state.active_columns(), column_ids(["name", "city"]).as_slice());
    assert!(calls.borrow().is_empty());
}

#[test]
fn toggling_columns_with_committed_query_notifies() {
    let mut state = SearchState::new(scoped(), None);
    state.set_search("bob", 0);
    state.poll(300);
    let calls = recorded(&mut state);

    state.toggle_column(&ColumnId::from("email"));
    state.toggle_column(&ColumnId::from("email"));

    let calls = calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, column_ids(["name", "city"]));
    assert_eq!(
        calls[1].1,
        column_ids(["name", "email", "city"]),
        "re-activated column returns to its configured position"
    );
}

#[test]
fn toggling_non_searchable_column_is_ignored() {
    let mut state = SearchState::new(scoped(), None);
    state.toggle_column(&ColumnId::from("password"));
    assert_eq!(state.active_columns().len(), 3);
}

#[test]
fn set_active_columns_filters_unknown_ids() {
    let mut state = SearchState::new(scoped(), None);
    state.set_active_columns(&column_ids(["city", "nope", "name"]));
    assert_eq!(state.active_columns(), column_ids(["name", "city"]).as_slice());
}

// ===== URL =====

#[test]
fn url_is_not_touched_by_default() {
    let history = Rc::new(MemoryHistory::new("search=from-url"));
    let mut state = SearchState::new(SearchOptions::default(), Some(history.clone()));

    state.set_search("typed", 0);
    state.poll(300);

    assert_eq!(state.query(), "typed");
    assert_eq!(history.query(), "search=from-url");
}

#[test]
fn url_value_seeds_initial_query() {
    let history = Rc::new(MemoryHistory::new("search=hello+world"));
    let options = SearchOptions {
        initial: "ignored".to_string(),
        ..url_synced(HistoryMode::Replace)
    };

    let state = SearchState::new(options, Some(history));

    assert_eq!(state.query(), "hello world");
    assert_eq!(state.raw(), "hello world");
}

#[test]
fn url_receives_only_committed_values() {
    let history = Rc::new(MemoryHistory::new(""));
    let mut state = SearchState::new(url_synced(HistoryMode::Push), Some(history.clone()));

    state.set_search("a", 0);
    state.set_search("ab", 10);
    assert_eq!(history.query(), "", "raw keystrokes never reach the URL");

    state.poll(310);
    assert_eq!(history.query(), "search=ab");
    assert_eq!(history.len(), 2, "one entry per committed value");

    state.clear_search(400);
    assert_eq!(history.query(), "");
}

#[test]
fn sync_from_url_commits_without_debounce() {
    let history = Rc::new(MemoryHistory::new(""));
    let mut state = SearchState::new(url_synced(HistoryMode::Push), Some(history.clone()));
    state.set_search("first", 0);
    state.poll(300);
    state.set_search("second", 400);
    state.poll(700);
    let calls = recorded(&mut state);

    history.back();
    state.sync_from_url();

    assert_eq!(state.query(), "first");
    assert!(!state.is_pending());
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(history.len(), 3);
}

#[test]
fn percent_encoded_url_query_is_canonicalized_in_place() {
    let history = Rc::new(MemoryHistory::new("search=a%20b"));

    let state = SearchState::new(url_synced(HistoryMode::Push), Some(history.clone()));

    assert_eq!(state.query(), "a b");
    assert_eq!(history.query(), "search=a+b");
    assert_eq!(history.len(), 1);
}
