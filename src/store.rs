use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};
use tracing::{debug, info};

use crate::domain::{
    DUMMY_MOOD_POOL, Entry, EntryDraft, MoodSelection, TodoItem, Toggles, local_day_start_utc,
};

const DUMMY_SPREAD_SECONDS: i64 = 20 * 60 * 60;
const DUMMY_MAX_ENTRIES_PER_DAY: u32 = 2;
const DUMMY_MAX_MOODS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
pub struct EntriesSnapshot {
    pub version: u64,
    pub entries: Arc<Vec<Entry>>,
}

#[derive(Debug, Clone)]
pub struct TodosSnapshot {
    pub version: u64,
    pub todos: Arc<Vec<TodoItem>>,
}

impl TodosSnapshot {
    pub fn on(&self, date: NaiveDate) -> Vec<TodoItem> {
        self.todos
            .iter()
            .filter(|todo| todo.date == date)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum StoreChange {
    Entries(EntriesSnapshot),
    Todos(TodosSnapshot),
}

type Subscriber = Box<dyn FnMut(&StoreChange)>;

// Mutations swap in a new collection; snapshots already handed out never change.
pub struct EntryStore {
    next_entry_id: AtomicU64,
    next_todo_id: AtomicU64,
    next_subscription_id: u64,
    entries_version: u64,
    todos_version: u64,
    entries: Arc<Vec<Entry>>,
    todos: Arc<Vec<TodoItem>>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    pub fn new() -> Self {
        Self {
            next_entry_id: AtomicU64::new(0),
            next_todo_id: AtomicU64::new(0),
            next_subscription_id: 0,
            entries_version: 0,
            todos_version: 0,
            entries: Arc::new(Vec::new()),
            todos: Arc::new(Vec::new()),
            subscribers: Vec::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.entries_version + self.todos_version
    }

    pub fn entries(&self) -> EntriesSnapshot {
        EntriesSnapshot {
            version: self.entries_version,
            entries: Arc::clone(&self.entries),
        }
    }

    pub fn todos(&self) -> TodosSnapshot {
        TodosSnapshot {
            version: self.todos_version,
            todos: Arc::clone(&self.todos),
        }
    }

    pub fn find(&self, id: u64) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn add_entry(&mut self, draft: EntryDraft) -> u64 {
        self.add_entry_at(draft, Utc::now())
    }

    pub fn add_entry_at(&mut self, draft: EntryDraft, created_at: DateTime<Utc>) -> u64 {
        let id = self.allocate_entry_id();
        let entry = draft.into_entry(id, created_at);
        Arc::make_mut(&mut self.entries).push(entry);
        self.sort_entries();
        debug!(entry_id = id, "entry added");
        self.publish_entries();
        id
    }

    pub fn delete_entry(&mut self, id: u64) -> Option<Entry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        let removed = Arc::make_mut(&mut self.entries).remove(index);
        debug!(entry_id = id, "entry deleted");
        self.publish_entries();
        Some(removed)
    }

    pub fn restore_entry(&mut self, entry: Entry) {
        let id = entry.id;
        self.next_entry_id.fetch_max(id, Ordering::SeqCst);

        let entries = Arc::make_mut(&mut self.entries);
        entries.retain(|existing| existing.id != id);
        entries.push(entry);
        self.sort_entries();
        debug!(entry_id = id, "entry restored");
        self.publish_entries();
    }

    pub fn generate_dummy(&mut self, start: NaiveDate, end: NaiveDate) -> usize {
        self.generate_dummy_with(start, end, &mut thread_rng())
    }

    pub fn generate_dummy_with<R: Rng + ?Sized>(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        rng: &mut R,
    ) -> usize {
        if end < start {
            return 0;
        }

        let mut batch = Vec::new();
        for day in start.iter_days().take_while(|day| *day <= end) {
            let day_start = local_day_start_utc(day);
            for _ in 0..rng.gen_range(0..=DUMMY_MAX_ENTRIES_PER_DAY) {
                let created_at = day_start + Duration::seconds(rng.gen_range(0..DUMMY_SPREAD_SECONDS));
                let draft = dummy_draft(day, rng);
                batch.push(draft.into_entry(self.allocate_entry_id(), created_at));
            }
        }

        let added = batch.len();
        if added == 0 {
            return 0;
        }

        Arc::make_mut(&mut self.entries).extend(batch);
        self.sort_entries();
        info!(%start, %end, added, "generated dummy entries");
        self.publish_entries();
        added
    }

    pub fn clear_test_data(&mut self) -> usize {
        let before = self.entries.len();
        if !self.entries.iter().any(|entry| entry.is_test) {
            return 0;
        }

        Arc::make_mut(&mut self.entries).retain(|entry| !entry.is_test);
        let removed = before - self.entries.len();
        info!(removed, "cleared test entries");
        self.publish_entries();
        removed
    }

    pub fn todos_on(&self, date: NaiveDate) -> Vec<TodoItem> {
        self.todos().on(date)
    }

    pub fn add_todo(&mut self, date: NaiveDate, text: impl Into<String>) -> u64 {
        let id = self.next_todo_id.fetch_add(1, Ordering::SeqCst) + 1;
        Arc::make_mut(&mut self.todos).push(TodoItem {
            id,
            date,
            text: text.into(),
            done: false,
        });
        debug!(todo_id = id, %date, "todo added");
        self.publish_todos();
        id
    }

    pub fn toggle_todo(&mut self, id: u64) -> bool {
        let Some(index) = self.todos.iter().position(|todo| todo.id == id) else {
            return false;
        };

        let todo = &mut Arc::make_mut(&mut self.todos)[index];
        todo.done = !todo.done;
        debug!(todo_id = id, done = todo.done, "todo toggled");
        self.publish_todos();
        true
    }

    pub fn subscribe(&mut self, on_change: impl FnMut(&StoreChange) + 'static) -> SubscriptionId {
        self.next_subscription_id += 1;
        let id = SubscriptionId(self.next_subscription_id);
        self.subscribers.push((id, Box::new(on_change)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    fn allocate_entry_id(&self) -> u64 {
        self.next_entry_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn sort_entries(&mut self) {
        Arc::make_mut(&mut self.entries).sort_by_key(|entry| entry.created_at);
    }

    fn publish_entries(&mut self) {
        self.entries_version += 1;
        let change = StoreChange::Entries(self.entries());
        self.notify(&change);
    }

    fn publish_todos(&mut self) {
        self.todos_version += 1;
        let change = StoreChange::Todos(self.todos());
        self.notify(&change);
    }

    fn notify(&mut self, change: &StoreChange) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(change);
        }
    }
}

fn dummy_draft<R: Rng + ?Sized>(day: NaiveDate, rng: &mut R) -> EntryDraft {
    let mut pool = DUMMY_MOOD_POOL;
    pool.shuffle(rng);
    let mood_count = rng.gen_range(0..=DUMMY_MAX_MOODS);
    let mood_emojis: MoodSelection = pool[..mood_count].iter().copied().collect();

    EntryDraft {
        title: format!("Auto {}", day.format("%-m/%-d")),
        body: String::new(),
        mood_emojis,
        toggles: Toggles {
            x: rng.gen_bool(0.5),
            y: rng.gen_bool(0.5),
            z: rng.gen_bool(0.5),
            w: rng.gen_bool(0.5),
        },
        sleep_hours: rng.gen_range(3.5f32..=9.5),
        is_test: true,
    }
}
