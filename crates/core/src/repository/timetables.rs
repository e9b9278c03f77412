use super::{backfill, keys::free_key, take_entry, trains::TRAIN_SUFFIX, CollectionKind, Repository};
use crate::{
    error::{RepositoryError, RepositoryResult},
    models::{shared, Adjustment, BoundedInput, NewTimetable, Shared, Train, TrainTimetable},
};

/// Result of [`Repository::add_train_timetable`].
#[derive(Debug, Clone)]
pub struct TimetableInsert {
    /// The stored timetable entry.
    pub timetable: Shared<TrainTimetable>,
    /// The train stored under the timetable's number. This is the embedded
    /// train when it was backfilled, otherwise the record that was already
    /// there.
    pub train: Shared<Train>,
    /// Whether the embedded train was added to the train collection.
    pub train_backfilled: bool,
}

impl Repository {
    /// Add a timetable entry keyed by its train number. On collision the
    /// embedded train is renumbered with a `".1"` suffix. The embedded train
    /// is backfilled into the train collection when its number is free.
    pub fn add_train_timetable(
        &mut self,
        input: NewTimetable,
    ) -> RepositoryResult<TimetableInsert> {
        let timetable = TrainTimetable::new(input);
        let mut staged = self.data.clone();
        let slot = free_key(
            &staged.train_timetables,
            CollectionKind::TrainTimetables,
            &timetable.number(),
            TRAIN_SUFFIX,
            self.policy.collision,
        );
        if slot.renamed {
            timetable.train().write().set_number(slot.key.clone());
        }

        let embedded = timetable.train().clone();
        let handle = shared(timetable);
        staged
            .train_timetables
            .insert(slot.key.clone(), handle.clone());
        let (train, train_backfilled) =
            backfill(&mut staged.trains, CollectionKind::Trains, &slot.key, &embedded);

        self.commit(staged, format!("add train timetable {}", slot.key))?;
        Ok(TimetableInsert {
            timetable: handle,
            train,
            train_backfilled,
        })
    }

    /// Remove the timetable entry stored under `number`. The embedded
    /// train stays in the train collection.
    pub fn delete_train_timetable(
        &mut self,
        number: &str,
    ) -> RepositoryResult<Shared<TrainTimetable>> {
        let mut staged = self.data.clone();
        let removed = take_entry(
            &mut staged.train_timetables,
            CollectionKind::TrainTimetables,
            number,
        )?;
        self.commit(staged, format!("delete train timetable {number}"))?;
        Ok(removed)
    }

    /// Timetable entry stored under `number`.
    pub fn train_timetable(&self, number: &str) -> Option<Shared<TrainTimetable>> {
        self.data.train_timetables.get(number).cloned()
    }

    /// Update the ticket price of a timetable entry.
    pub fn change_ticket_price(
        &mut self,
        number: &str,
        value: impl BoundedInput,
    ) -> RepositoryResult<()> {
        let handle = self
            .train_timetable(number)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::TrainTimetables, number))?;
        let previous = handle.read().clone();
        handle.write().set_ticket_price(value)?;
        let price = handle.read().ticket_price().unwrap_or_default();
        self.persist_or_revert(format!("change ticket price of timetable {number} to {price}"), || {
            *handle.write() = previous;
        })
    }

    /// Apply `adjustment` to a ticket price and return the new price.
    pub fn adjust_ticket_price(
        &mut self,
        number: &str,
        adjustment: Adjustment,
    ) -> RepositoryResult<u64> {
        let mut timetable = self
            .train_timetable(number)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::TrainTimetables, number))?
            .read()
            .clone();
        let price = timetable.adjust_ticket_price(adjustment)?;
        self.change_ticket_price(number, price)?;
        Ok(price)
    }
}
