//! The persistence seam: a trait standing in for the embedded relational
//! store, plus an in-memory reference implementation for tests and the demo
//! CLI.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::config::AppConfig;
use crate::domain::{Category, Event, OneOffTodo, TaskStatus, Todo};

/// Read/write access to persisted categories, todos, events and one-offs.
///
/// A real implementation backs this with an embedded relational database;
/// that implementation is out of scope here (see `SPEC_FULL.md` §1) — this
/// trait is the contract a real one would satisfy.
pub trait Store: Send + Sync {
    /// All categories.
    fn categories(&self) -> Vec<Category>;
    /// All todos.
    fn todos(&self) -> Vec<Todo>;
    /// All events.
    fn events(&self) -> Vec<Event>;
    /// All one-off todos.
    fn one_off_todos(&self) -> Vec<OneOffTodo>;
    /// Records that `event` fired now. No-op if the event name is unknown.
    fn trigger_event(&self, event_name: &str);
    /// Sets a todo's live status.
    fn set_todo_status(&self, todo_id: i64, status: TaskStatus);
    /// Sets a one-off todo's live status.
    fn set_one_off_status(&self, one_off_id: i64, status: TaskStatus);
}

#[derive(Debug, Default)]
struct InMemoryState {
    categories: Vec<Category>,
    todos: Vec<Todo>,
    events: Vec<Event>,
    one_off_todos: Vec<OneOffTodo>,
}

/// A `Store` backed by in-process `Vec`s, seeded from an [`AppConfig`].
///
/// New tasks default to `status = Incomplete`, `reset_count = 0`, matching
/// `SPEC_FULL.md` §3's lifecycle note that config never overwrites live
/// fields on reload.
#[derive(Debug)]
pub struct InMemoryStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryStore {
    /// Seeds a store from `config`, assigning ids by declaration order.
    ///
    /// Category ids and todo ids are drawn from disjoint ranges so they
    /// never collide when handed to the graph.
    #[must_use]
    pub fn seed_from_config(config: &AppConfig) -> Self {
        let mut categories = Vec::new();
        let mut todos = Vec::new();
        let mut next_category_id: i64 = 1;
        let mut next_todo_id: i64 = 1;
        let mut category_ids_by_name: HashMap<String, i64> = HashMap::new();

        for category_cfg in &config.categories {
            let cid = next_category_id;
            next_category_id += 1;
            category_ids_by_name.insert(category_cfg.name.clone(), cid);
            categories.push(Category {
                id: cid,
                name: category_cfg.name.clone(),
                description: category_cfg.description.clone(),
            });

            for (position, todo_cfg) in category_cfg.todos.iter().enumerate() {
                let tid = next_todo_id;
                next_todo_id += 1;
                todos.push(Todo {
                    id: tid,
                    title: todo_cfg.title.clone(),
                    category_id: cid,
                    status: TaskStatus::Incomplete,
                    reset_interval: todo_cfg.reset_interval.max(1) as u32,
                    reset_count: 0,
                    position: position as u32,
                    in_progress_start: None,
                    cumulative_in_progress_seconds: 0,
                });
            }
        }

        let one_off_todos = config
            .oneoff_todos
            .iter()
            .enumerate()
            .map(|(i, cfg)| OneOffTodo {
                id: i as i64 + 1,
                title: cfg.title.clone(),
                status: TaskStatus::Incomplete,
            })
            .collect();

        let events = Vec::new();

        Self {
            state: Mutex::new(InMemoryState {
                categories,
                todos,
                events,
                one_off_todos,
            }),
        }
    }

    /// Registers an event name with no timestamp yet, if it isn't already known.
    pub fn ensure_event(&self, name: &str) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.events.iter().any(|e| e.name == name) {
            return;
        }
        let id = state.events.len() as i64 + 1;
        state.events.push(Event {
            id,
            name: name.to_string(),
            timestamp: None,
        });
    }
}

impl Store for InMemoryStore {
    fn categories(&self) -> Vec<Category> {
        self.state.lock().expect("store mutex poisoned").categories.clone()
    }

    fn todos(&self) -> Vec<Todo> {
        self.state.lock().expect("store mutex poisoned").todos.clone()
    }

    fn events(&self) -> Vec<Event> {
        self.state.lock().expect("store mutex poisoned").events.clone()
    }

    fn one_off_todos(&self) -> Vec<OneOffTodo> {
        self.state.lock().expect("store mutex poisoned").one_off_todos.clone()
    }

    fn trigger_event(&self, event_name: &str) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if let Some(event) = state.events.iter_mut().find(|e| e.name == event_name) {
            event.timestamp = Some(Utc::now());
        }
    }

    fn set_todo_status(&self, todo_id: i64, status: TaskStatus) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if let Some(todo) = state.todos.iter_mut().find(|t| t.id == todo_id) {
            let now = Utc::now();
            if matches!(status, TaskStatus::InProgress) && !matches!(todo.status, TaskStatus::InProgress) {
                todo.in_progress_start = Some(now);
            } else if matches!(todo.status, TaskStatus::InProgress) && !matches!(status, TaskStatus::InProgress) {
                if let Some(start) = todo.in_progress_start.take() {
                    todo.cumulative_in_progress_seconds += (now - start).num_seconds().max(0) as u64;
                }
            }
            todo.status = status;
        }
    }

    fn set_one_off_status(&self, one_off_id: i64, status: TaskStatus) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if let Some(one_off) = state.one_off_todos.iter_mut().find(|o| o.id == one_off_id) {
            one_off.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn seeds_categories_and_todos_with_defaults() {
        let doc = r#"
            [[categories]]
            name = "morning"

            [[categories.todos]]
            title = "make bed"

            [[categories.todos]]
            title = "brush teeth"
        "#;
        let cfg = parse_config(doc).unwrap();
        let store = InMemoryStore::seed_from_config(&cfg);

        assert_eq!(store.categories().len(), 1);
        let todos = store.todos();
        assert_eq!(todos.len(), 2);
        assert!(todos.iter().all(|t| t.status == TaskStatus::Incomplete));
        assert!(todos.iter().all(|t| t.reset_count == 0));
    }

    #[test]
    fn trigger_event_sets_timestamp() {
        let store = InMemoryStore::seed_from_config(&AppConfig::default());
        store.ensure_event("bedtime");
        store.trigger_event("bedtime");
        let event = store.events().into_iter().find(|e| e.name == "bedtime").unwrap();
        assert!(event.timestamp.is_some());
    }

    #[test]
    fn set_todo_status_tracks_in_progress_duration() {
        let doc = r#"
            [[categories]]
            name = "morning"
            [[categories.todos]]
            title = "make bed"
        "#;
        let cfg = parse_config(doc).unwrap();
        let store = InMemoryStore::seed_from_config(&cfg);
        let tid = store.todos()[0].id;

        store.set_todo_status(tid, TaskStatus::InProgress);
        assert!(store.todos()[0].in_progress_start.is_some());

        store.set_todo_status(tid, TaskStatus::Complete);
        let todo = store.todos().into_iter().find(|t| t.id == tid).unwrap();
        assert!(todo.in_progress_start.is_none());
    }
}
