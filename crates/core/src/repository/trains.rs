use std::sync::Arc;

use super::{keys::free_key, take_entry, CollectionKind, Repository};
use crate::{
    error::{RepositoryError, RepositoryResult},
    models::{shared, Adjustment, BoundedInput, NewTrain, Shared, Train},
};

pub(super) const TRAIN_SUFFIX: &str = ".1";

impl Repository {
    /// Add a train keyed by number, suffixing `".1"` on collision.
    pub fn add_train(&mut self, input: NewTrain) -> RepositoryResult<Shared<Train>> {
        let mut train = Train::new(input);
        let mut staged = self.data.clone();
        let slot = free_key(
            &staged.trains,
            CollectionKind::Trains,
            train.number(),
            TRAIN_SUFFIX,
            self.policy.collision,
        );
        if slot.renamed {
            train.set_number(slot.key.clone());
        }

        let handle = shared(train);
        staged.trains.insert(slot.key.clone(), handle.clone());
        self.commit(staged, format!("add train {}", slot.key))?;
        Ok(handle)
    }

    /// Remove the train stored under `number`.
    pub fn delete_train(&mut self, number: &str) -> RepositoryResult<Shared<Train>> {
        let mut staged = self.data.clone();
        let removed = take_entry(&mut staged.trains, CollectionKind::Trains, number)?;
        self.commit(staged, format!("delete train {number}"))?;
        Ok(removed)
    }

    /// Train stored under `number`.
    pub fn train(&self, number: &str) -> Option<Shared<Train>> {
        self.data.trains.get(number).cloned()
    }

    /// Update the carriage count of a train and of the train embedded in the
    /// timetable entry with the same number.
    pub fn change_number_of_carriages(
        &mut self,
        number: &str,
        value: impl BoundedInput,
    ) -> RepositoryResult<()> {
        let train = self
            .train(number)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::Trains, number))?;
        let previous = train.read().clone();
        train.write().set_carriages(value)?;
        let carriages = train.read().carriages().unwrap_or_default();

        let scheduled = self
            .data
            .train_timetables
            .get(number)
            .map(|timetable| timetable.read().train().clone())
            .filter(|embedded| !Arc::ptr_eq(embedded, &train));
        let scheduled_previous = scheduled.as_ref().map(|embedded| embedded.read().clone());
        if let Some(embedded) = scheduled.as_ref() {
            embedded.write().set_carriages(carriages)?;
        }

        self.persist_or_revert(
            format!("change number of carriages of train {number} to {carriages}"),
            || {
                *train.write() = previous;
                if let (Some(embedded), Some(previous)) = (scheduled, scheduled_previous) {
                    *embedded.write() = previous;
                }
            },
        )
    }

    /// Apply `adjustment` to a train's carriage count, keeping the timetable
    /// entry in step, and return the new count.
    pub fn adjust_number_of_carriages(
        &mut self,
        number: &str,
        adjustment: Adjustment,
    ) -> RepositoryResult<u64> {
        let mut train = self
            .train(number)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::Trains, number))?
            .read()
            .clone();
        let carriages = train.adjust_carriages(adjustment)?;
        self.change_number_of_carriages(number, carriages)?;
        Ok(carriages)
    }
}
