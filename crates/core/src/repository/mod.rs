//! In-memory registry of the five station collections.
//!
//! Every mutating operation persists the complete state through the
//! [`SnapshotStore`] before it returns and then flushes the journal.
//! Structural changes are staged on a shallow copy of the collections, so a
//! failed snapshot write leaves both the file and the in-memory maps as they
//! were.

use std::{
    collections::{btree_map::Entry, BTreeMap},
    fmt,
    path::PathBuf,
};

use tracing::{debug, info, warn};

use crate::{
    config::{AppConfig, CollisionPolicy, SaleCollision},
    error::{RepositoryError, RepositoryResult},
    journal::Journal,
    models::{Shared, TicketSalesSheet, Train, TrainBrigade, TrainTimetable, Worker},
    snapshot::SnapshotStore,
};

mod brigades;
mod keys;
mod sales;
mod timetables;
mod trains;
mod workers;


pub use brigades::BrigadeInsert;
pub use sales::SaleInsert;
pub use timetables::TimetableInsert;

/// The five top-level collections, in iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Station employees keyed by name.
    Workers,
    /// Timetable entries keyed by train number.
    TrainTimetables,
    /// Trains keyed by number.
    Trains,
    /// Crews keyed by brigade number.
    TrainBrigades,
    /// Ticket sales keyed by sale time.
    TicketSalesSheets,
}

impl CollectionKind {
    /// Every collection in iteration order.
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::Workers,
        CollectionKind::TrainTimetables,
        CollectionKind::Trains,
        CollectionKind::TrainBrigades,
        CollectionKind::TicketSalesSheets,
    ];

    /// Snapshot name of the collection.
    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::Workers => "workers",
            CollectionKind::TrainTimetables => "train_timetables",
            CollectionKind::Trains => "trains",
            CollectionKind::TrainBrigades => "train_brigades",
            CollectionKind::TicketSalesSheets => "ticket_sales_sheets",
        }
    }

    /// User-facing title.
    pub fn title(self) -> &'static str {
        match self {
            CollectionKind::Workers => "Workers",
            CollectionKind::TrainTimetables => "Timetables",
            CollectionKind::Trains => "Trains",
            CollectionKind::TrainBrigades => "Brigades",
            CollectionKind::TicketSalesSheets => "Ticket sales",
        }
    }

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The collections themselves. Cloning is shallow: handles are shared.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub(crate) workers: BTreeMap<String, Shared<Worker>>,
    pub(crate) train_timetables: BTreeMap<String, Shared<TrainTimetable>>,
    pub(crate) trains: BTreeMap<String, Shared<Train>>,
    pub(crate) train_brigades: BTreeMap<String, Shared<TrainBrigade>>,
    pub(crate) ticket_sales_sheets: BTreeMap<String, Shared<TicketSalesSheet>>,
}

impl Collections {
    /// Workers by name.
    pub fn workers(&self) -> &BTreeMap<String, Shared<Worker>> {
        &self.workers
    }

    /// Timetable entries by train number.
    pub fn train_timetables(&self) -> &BTreeMap<String, Shared<TrainTimetable>> {
        &self.train_timetables
    }

    /// Trains by number.
    pub fn trains(&self) -> &BTreeMap<String, Shared<Train>> {
        &self.trains
    }

    /// Brigades by number.
    pub fn train_brigades(&self) -> &BTreeMap<String, Shared<TrainBrigade>> {
        &self.train_brigades
    }

    /// Sales sheets by sale time.
    pub fn ticket_sales_sheets(&self) -> &BTreeMap<String, Shared<TicketSalesSheet>> {
        &self.ticket_sales_sheets
    }

    /// Number of entries in `kind`.
    pub fn len(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Workers => self.workers.len(),
            CollectionKind::TrainTimetables => self.train_timetables.len(),
            CollectionKind::Trains => self.trains.len(),
            CollectionKind::TrainBrigades => self.train_brigades.len(),
            CollectionKind::TicketSalesSheets => self.ticket_sales_sheets.len(),
        }
    }

    /// True when every collection is empty.
    pub fn is_empty(&self) -> bool {
        CollectionKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }

    /// Keys of `kind` in sorted order.
    pub fn keys(&self, kind: CollectionKind) -> Vec<String> {
        match kind {
            CollectionKind::Workers => self.workers.keys().cloned().collect(),
            CollectionKind::TrainTimetables => self.train_timetables.keys().cloned().collect(),
            CollectionKind::Trains => self.trains.keys().cloned().collect(),
            CollectionKind::TrainBrigades => self.train_brigades.keys().cloned().collect(),
            CollectionKind::TicketSalesSheets => self.ticket_sales_sheets.keys().cloned().collect(),
        }
    }

    /// Whether `key` is present in `kind`.
    pub fn contains(&self, kind: CollectionKind, key: &str) -> bool {
        match kind {
            CollectionKind::Workers => self.workers.contains_key(key),
            CollectionKind::TrainTimetables => self.train_timetables.contains_key(key),
            CollectionKind::Trains => self.trains.contains_key(key),
            CollectionKind::TrainBrigades => self.train_brigades.contains_key(key),
            CollectionKind::TicketSalesSheets => self.ticket_sales_sheets.contains_key(key),
        }
    }

    /// Full summary line of the entry, if present.
    pub fn describe(&self, kind: CollectionKind, key: &str) -> Option<String> {
        match kind {
            CollectionKind::Workers => self.workers.get(key).map(|it| it.read().summary()),
            CollectionKind::TrainTimetables => {
                self.train_timetables.get(key).map(|it| it.read().summary())
            }
            CollectionKind::Trains => self.trains.get(key).map(|it| it.read().summary()),
            CollectionKind::TrainBrigades => {
                self.train_brigades.get(key).map(|it| it.read().summary())
            }
            CollectionKind::TicketSalesSheets => {
                self.ticket_sales_sheets.get(key).map(|it| it.read().summary())
            }
        }
    }
}

/// Key disambiguation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyPolicy {
    /// Suffix rule for trains, timetables and brigades.
    pub collision: CollisionPolicy,
    /// Same-second sales handling.
    pub sale_collision: SaleCollision,
}

impl From<&AppConfig> for KeyPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            collision: config.collision_policy,
            sale_collision: config.sale_collision,
        }
    }
}

/// Station registry with snapshot persistence.
#[derive(Debug)]
pub struct Repository {
    store: SnapshotStore,
    journal: Journal,
    policy: KeyPolicy,
    data: Collections,
    cursor: usize,
}

impl Repository {
    /// Open the registry described by `config`.
    pub fn open(config: &AppConfig) -> RepositoryResult<Self> {
        let journal = config
            .journal_path()
            .map(Journal::new)
            .unwrap_or_else(Journal::disabled);
        Self::open_with(
            SnapshotStore::new(config.snapshot_path()),
            journal,
            KeyPolicy::from(config),
        )
    }

    /// Open a registry from explicit parts. A missing snapshot is created
    /// empty right away.
    pub fn open_with(
        store: SnapshotStore,
        journal: Journal,
        policy: KeyPolicy,
    ) -> RepositoryResult<Self> {
        let mut repository = Self {
            store,
            journal,
            policy,
            data: Collections::default(),
            cursor: 0,
        };
        match repository.store.load()? {
            Some(data) => {
                repository.data = data;
                info!(
                    path = %repository.store.path().display(),
                    workers = repository.data.workers.len(),
                    trains = repository.data.trains.len(),
                    "registry loaded"
                );
            }
            None => {
                repository.store.save(&repository.data)?;
                info!(path = %repository.store.path().display(), "initialised empty registry");
            }
        }
        Ok(repository)
    }

    /// Current collections.
    pub fn data(&self) -> &Collections {
        &self.data
    }

    /// Active key policy.
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    /// Write the full state to the snapshot.
    pub fn save(&self) -> RepositoryResult<()> {
        self.store.save(&self.data)?;
        Ok(())
    }

    /// Replace the in-memory state with the snapshot on disk, or with empty
    /// collections when there is none.
    pub fn reload(&mut self) -> RepositoryResult<()> {
        self.data = self.store.load()?.unwrap_or_default();
        debug!(path = %self.store.path().display(), "registry reloaded");
        Ok(())
    }

    /// See [`Collections::len`].
    pub fn len(&self, kind: CollectionKind) -> usize {
        self.data.len(kind)
    }

    /// See [`Collections::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// See [`Collections::keys`].
    pub fn keys(&self, kind: CollectionKind) -> Vec<String> {
        self.data.keys(kind)
    }

    /// See [`Collections::contains`].
    pub fn contains(&self, kind: CollectionKind, key: &str) -> bool {
        self.data.contains(kind, key)
    }

    /// See [`Collections::describe`].
    pub fn describe(&self, kind: CollectionKind, key: &str) -> Option<String> {
        self.data.describe(kind, key)
    }

    /// Remove `key` from `kind`.
    pub fn delete(&mut self, kind: CollectionKind, key: &str) -> RepositoryResult<()> {
        match kind {
            CollectionKind::Workers => self.delete_worker(key).map(drop),
            CollectionKind::TrainTimetables => self.delete_train_timetable(key).map(drop),
            CollectionKind::Trains => self.delete_train(key).map(drop),
            CollectionKind::TrainBrigades => self.delete_train_brigade(key).map(drop),
            CollectionKind::TicketSalesSheets => self.delete_ticket_sales_sheet(key).map(drop),
        }
    }

    /// Collections with their sizes, in iteration order.
    pub fn collections(&self) -> impl Iterator<Item = (CollectionKind, usize)> + '_ {
        CollectionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.data.len(kind)))
    }

    /// Collection under the cursor.
    pub fn current_collection(&self) -> CollectionKind {
        CollectionKind::ALL[self.cursor]
    }

    /// Advance the cursor. Returns `None` and stays put at the last collection.
    pub fn next_collection(&mut self) -> Option<CollectionKind> {
        if self.cursor + 1 >= CollectionKind::ALL.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current_collection())
    }

    /// Move the cursor back. Returns `None` and stays put at the first collection.
    pub fn prev_collection(&mut self) -> Option<CollectionKind> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current_collection())
    }

    /// Point the cursor at `kind`.
    pub fn select_collection(&mut self, kind: CollectionKind) {
        self.cursor = kind.position();
    }

    /// Reset the cursor to the first collection.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Persist `staged` and adopt it as the current state.
    fn commit(&mut self, staged: Collections, operation: String) -> RepositoryResult<()> {
        self.store.save(&staged)?;
        self.data = staged;
        self.finish(operation);
        Ok(())
    }

    /// Persist an in-place field update, running `revert` if the write fails.
    fn persist_or_revert(
        &mut self,
        operation: String,
        revert: impl FnOnce(),
    ) -> RepositoryResult<()> {
        if let Err(err) = self.store.save(&self.data) {
            revert();
            return Err(err.into());
        }
        self.finish(operation);
        Ok(())
    }

    fn finish(&mut self, operation: String) {
        info!(operation = %operation, "registry updated");
        self.journal.record(operation);
        if let Err(err) = self.journal.flush() {
            warn!("Failed to flush journal: {err:#}");
        }
    }
}

/// Insert `candidate` under `key` unless the key is taken. Returns the
/// handle stored under `key` and whether it was inserted now.
fn backfill<T>(
    map: &mut BTreeMap<String, Shared<T>>,
    kind: CollectionKind,
    key: &str,
    candidate: &Shared<T>,
) -> (Shared<T>, bool) {
    match map.entry(key.to_string()) {
        Entry::Occupied(entry) => (entry.get().clone(), false),
        Entry::Vacant(entry) => {
            debug!(collection = %kind, key, "backfilled related record");
            (entry.insert(candidate.clone()).clone(), true)
        }
    }
}

/// Remove `key` from `map`, or report it missing from `kind`.
fn take_entry<T>(
    map: &mut BTreeMap<String, Shared<T>>,
    kind: CollectionKind,
    key: &str,
) -> RepositoryResult<Shared<T>> {
    map.remove(key)
        .ok_or_else(|| RepositoryError::not_found(kind, key))
}
