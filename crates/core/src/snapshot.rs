//! Snapshot persistence of the whole repository state.
//!
//! Every distinct entity is written once into an arena; collections and
//! embedding entities refer to it by index. Loading rebuilds one handle per
//! arena slot, so records that shared a handle before saving share it again
//! afterwards.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    models::{shared, Shared, Stop, TicketSalesSheet, Train, TrainBrigade, TrainTimetable, Worker},
    repository::Collections,
};

/// Snapshot layout version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized representation of a snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    arena: Arena,
    #[serde(default)]
    collections: CollectionIndex,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Arena {
    #[serde(default)]
    workers: Vec<Worker>,
    #[serde(default)]
    trains: Vec<Train>,
    #[serde(default)]
    timetables: Vec<TimetableRecord>,
    #[serde(default)]
    brigades: Vec<BrigadeRecord>,
    #[serde(default)]
    sheets: Vec<SheetRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CollectionIndex {
    #[serde(default)]
    workers: BTreeMap<String, usize>,
    #[serde(default)]
    train_timetables: BTreeMap<String, usize>,
    #[serde(default)]
    trains: BTreeMap<String, usize>,
    #[serde(default)]
    train_brigades: BTreeMap<String, usize>,
    #[serde(default)]
    ticket_sales_sheets: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TimetableRecord {
    train: usize,
    departure: Stop,
    arrival: Stop,
    route: Option<String>,
    ticket_price: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BrigadeRecord {
    brigade_number: String,
    train: usize,
    members: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SheetRecord {
    sold_at: NaiveDateTime,
    passenger_fullname: String,
    passport: String,
    timetable: usize,
    tickets: u64,
    benefits: Option<String>,
    price: u64,
}

/// Assigns arena slots by handle identity.
struct Interner<T, R> {
    slots: HashMap<*const parking_lot::RwLock<T>, usize>,
    records: Vec<R>,
}

impl<T, R> Interner<T, R> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            records: Vec::new(),
        }
    }

    fn intern(&mut self, handle: &Shared<T>, build: impl FnOnce(&T) -> R) -> usize {
        let ptr = Arc::as_ptr(handle);
        if let Some(slot) = self.slots.get(&ptr) {
            return *slot;
        }
        let record = build(&handle.read());
        let slot = self.records.len();
        self.records.push(record);
        self.slots.insert(ptr, slot);
        slot
    }
}

impl SnapshotPayload {
    /// Flatten the collections into an arena payload.
    pub fn capture(data: &Collections) -> Self {
        let mut workers = Interner::<Worker, Worker>::new();
        let mut trains = Interner::<Train, Train>::new();
        let mut timetables = Interner::<TrainTimetable, TimetableRecord>::new();
        let mut brigades = Interner::<TrainBrigade, BrigadeRecord>::new();
        let mut sheets = Interner::<TicketSalesSheet, SheetRecord>::new();
        let mut index = CollectionIndex::default();

        for (key, handle) in data.workers() {
            let slot = workers.intern(handle, Worker::clone);
            index.workers.insert(key.clone(), slot);
        }
        for (key, handle) in data.trains() {
            let slot = trains.intern(handle, Train::clone);
            index.trains.insert(key.clone(), slot);
        }

        let mut intern_timetable =
            |handle: &Shared<TrainTimetable>, trains: &mut Interner<Train, Train>| {
                timetables.intern(handle, |timetable| TimetableRecord {
                    train: trains.intern(timetable.train(), Train::clone),
                    departure: timetable.departure().clone(),
                    arrival: timetable.arrival().clone(),
                    route: timetable.route().map(str::to_string),
                    ticket_price: timetable.ticket_price(),
                })
            };

        for (key, handle) in data.train_timetables() {
            let slot = intern_timetable(handle, &mut trains);
            index.train_timetables.insert(key.clone(), slot);
        }
        for (key, handle) in data.ticket_sales_sheets() {
            let slot = sheets.intern(handle, |sheet| SheetRecord {
                sold_at: sheet.sold_at(),
                passenger_fullname: sheet.passenger_fullname().to_string(),
                passport: sheet.passport().to_string(),
                timetable: intern_timetable(sheet.timetable(), &mut trains),
                tickets: sheet.tickets(),
                benefits: sheet.benefits().map(str::to_string),
                price: sheet.price(),
            });
            index.ticket_sales_sheets.insert(key.clone(), slot);
        }
        for (key, handle) in data.train_brigades() {
            let slot = brigades.intern(handle, |brigade| BrigadeRecord {
                brigade_number: brigade.brigade_number().to_string(),
                train: trains.intern(brigade.train(), Train::clone),
                members: brigade
                    .members()
                    .iter()
                    .map(|member| workers.intern(member, Worker::clone))
                    .collect(),
            });
            index.train_brigades.insert(key.clone(), slot);
        }

        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            arena: Arena {
                workers: workers.records,
                trains: trains.records,
                timetables: timetables.records,
                brigades: brigades.records,
                sheets: sheets.records,
            },
            collections: index,
        }
    }

    /// Rebuild collections, resolving every arena reference.
    pub fn restore(self) -> Result<Collections> {
        if self.version != SNAPSHOT_VERSION {
            bail!(
                "unsupported snapshot version {} (expected {})",
                self.version,
                SNAPSHOT_VERSION
            );
        }
        let arena = self.arena;

        let workers: Vec<Shared<Worker>> = arena.workers.into_iter().map(shared).collect();
        let trains: Vec<Shared<Train>> = arena.trains.into_iter().map(shared).collect();

        let timetables = arena
            .timetables
            .into_iter()
            .map(|record| -> Result<Shared<TrainTimetable>> {
                let train = resolve(&trains, record.train, "train")?;
                Ok(shared(TrainTimetable::with_train(
                    train,
                    record.departure,
                    record.arrival,
                    record.route,
                    record.ticket_price,
                )))
            })
            .collect::<Result<Vec<_>>>()?;

        let brigades = arena
            .brigades
            .into_iter()
            .map(|record| -> Result<Shared<TrainBrigade>> {
                if record.members.is_empty() {
                    bail!("brigade {} has no members", record.brigade_number);
                }
                let train = resolve(&trains, record.train, "train")?;
                let members = record
                    .members
                    .iter()
                    .map(|slot| resolve(&workers, *slot, "worker"))
                    .collect::<Result<Vec<_>>>()?;
                Ok(shared(TrainBrigade::from_parts(
                    record.brigade_number,
                    train,
                    members,
                )))
            })
            .collect::<Result<Vec<_>>>()?;

        let sheets = arena
            .sheets
            .into_iter()
            .map(|record| -> Result<Shared<TicketSalesSheet>> {
                let timetable = resolve(&timetables, record.timetable, "timetable")?;
                Ok(shared(TicketSalesSheet::from_parts(
                    record.sold_at,
                    record.passenger_fullname,
                    record.passport,
                    timetable,
                    record.tickets,
                    record.benefits,
                    record.price,
                )))
            })
            .collect::<Result<Vec<_>>>()?;

        let index = self.collections;
        Ok(Collections {
            workers: resolve_all(index.workers, &workers, "worker")?,
            train_timetables: resolve_all(index.train_timetables, &timetables, "timetable")?,
            trains: resolve_all(index.trains, &trains, "train")?,
            train_brigades: resolve_all(index.train_brigades, &brigades, "brigade")?,
            ticket_sales_sheets: resolve_all(index.ticket_sales_sheets, &sheets, "sales sheet")?,
        })
    }

    /// Time the snapshot was captured.
    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }
}

fn resolve<T>(pool: &[Shared<T>], slot: usize, what: &str) -> Result<Shared<T>> {
    pool.get(slot)
        .cloned()
        .ok_or_else(|| anyhow!("dangling {what} reference {slot} (arena holds {})", pool.len()))
}

fn resolve_all<T>(
    index: BTreeMap<String, usize>,
    pool: &[Shared<T>],
    what: &str,
) -> Result<BTreeMap<String, Shared<T>>> {
    index
        .into_iter()
        .map(|(key, slot)| -> Result<(String, Shared<T>)> {
            let handle = resolve(pool, slot, what).with_context(|| format!("key '{key}'"))?;
            Ok((key, handle))
        })
        .collect()
}

/// Reads and atomically rewrites the snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collections, returning `None` when no snapshot exists yet.
    pub fn load(&self) -> Result<Option<Collections>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let payload = self.read_payload()?;
        let data = payload
            .restore()
            .with_context(|| format!("corrupt snapshot {}", self.path.display()))?;
        debug!(path = %self.path.display(), "snapshot loaded");
        Ok(Some(data))
    }

    /// Replace the snapshot with the given state.
    pub fn save(&self, data: &Collections) -> Result<DateTime<Utc>> {
        let payload = SnapshotPayload::capture(data);
        self.write_payload(&payload)?;
        Ok(payload.saved_at)
    }

    fn write_payload(&self, payload: &SnapshotPayload) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let serialised = serde_json::to_vec_pretty(payload)?;
        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
        temp.write_all(&serialised)
            .with_context(|| format!("failed to write {}", temp.path().display()))?;
        temp.flush()?;
        temp.persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn read_payload(&self) -> Result<SnapshotPayload> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let payload = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewBrigade, NewTrain, NewWorker};
    use tempfile::tempdir;

    fn crew() -> Result<Collections> {
        let brigade = TrainBrigade::new(NewBrigade {
            brigade_number: "7".to_string(),
            train: NewTrain::numbered("42"),
            member: NewWorker::named("Petrov", "Ivan", "driver"),
        })?;
        let mut data = Collections::default();
        data.workers.insert("Ivan".to_string(), brigade.leader().clone());
        data.trains.insert("42".to_string(), brigade.train().clone());
        data.train_brigades.insert("7".to_string(), shared(brigade));
        Ok(data)
    }

    #[test]
    fn shared_records_are_written_once() -> Result<()> {
        let payload = SnapshotPayload::capture(&crew()?);
        assert_eq!(payload.arena.workers.len(), 1);
        assert_eq!(payload.arena.trains.len(), 1);
        assert_eq!(payload.arena.brigades[0].members, vec![0]);
        Ok(())
    }

    #[test]
    fn store_round_trip_restores_identity() -> Result<()> {
        let dir = tempdir()?;
        let store = SnapshotStore::new(dir.path().join("data").join("station.json"));
        assert!(store.load()?.is_none());

        store.save(&crew()?)?;
        let data = store.load()?.context("snapshot written")?;
        let brigade = data.train_brigades()["7"].read();
        assert!(Arc::ptr_eq(brigade.leader(), &data.workers()["Ivan"]));
        assert!(Arc::ptr_eq(brigade.train(), &data.trains()["42"]));
        assert_eq!(brigade.leader().read().surname(), "Petrov");
        Ok(())
    }

    #[test]
    fn unknown_version_is_rejected() -> Result<()> {
        let mut payload = SnapshotPayload::capture(&Collections::default());
        payload.version = SNAPSHOT_VERSION + 1;
        let err = payload.restore().unwrap_err();
        assert!(err.to_string().contains("unsupported snapshot version"));
        Ok(())
    }

    #[test]
    fn dangling_reference_names_the_key() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("station.json");
        let raw = serde_json::json!({
            "version": SNAPSHOT_VERSION,
            "saved_at": Utc::now(),
            "collections": { "workers": { "Ivan": 3 } },
        });
        fs::write(&path, raw.to_string())?;

        let err = SnapshotStore::new(&path).load().unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("dangling worker reference 3"), "{message}");
        assert!(message.contains("key 'Ivan'"), "{message}");
        Ok(())
    }
}
