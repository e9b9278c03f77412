#![warn(clippy::all, missing_docs)]

//! Core domain logic for the railway station registry.
//!
//! This crate hosts the entity models, configuration handling, the
//! snapshot-backed repository and the transaction journal used by the
//! terminal UI and any future frontends.

pub mod config;
pub mod error;
pub mod journal;
pub mod models;
pub mod repository;
pub mod snapshot;

pub use config::{AppConfig, CollisionPolicy, SaleCollision};
pub use error::{BoundedField, RepositoryError, RepositoryResult, ValidationError};
pub use journal::Journal;
pub use models::{
    Adjustment, BoundedInput, NewBrigade, NewSale, NewTimetable, NewTrain, NewWorker, Shared, Stop,
    TicketSalesSheet, Train, TrainBrigade, TrainTimetable, Worker,
};
pub use repository::{
    BrigadeInsert, CollectionKind, Collections, KeyPolicy, Repository, SaleInsert,
    TimetableInsert,
};
pub use snapshot::SnapshotStore;
