use super::{backfill, keys::free_key, take_entry, CollectionKind, Repository};
use crate::{
    error::{RepositoryError, RepositoryResult},
    models::{
        shared, validate_brigade_number, NewBrigade, Shared, Train, TrainBrigade, Worker,
    },
};

const BRIGADE_SUFFIX: &str = "1";

/// Result of [`Repository::add_train_brigade`].
#[derive(Debug, Clone)]
pub struct BrigadeInsert {
    /// The stored brigade.
    pub brigade: Shared<TrainBrigade>,
    /// Worker stored under the leader's name.
    pub worker: Shared<Worker>,
    /// Train stored under the brigade's train number.
    pub train: Shared<Train>,
    /// Whether the founding member was added to the worker collection.
    pub worker_backfilled: bool,
    /// Whether the brigade's train was added to the train collection.
    pub train_backfilled: bool,
}

impl Repository {
    /// Add a brigade with its founding member. Taken numbers get `"1"`
    /// appended. The member and the train are backfilled into their
    /// collections when their keys are free.
    pub fn add_train_brigade(&mut self, input: NewBrigade) -> RepositoryResult<BrigadeInsert> {
        let mut brigade = TrainBrigade::new(input)?;
        let mut staged = self.data.clone();
        let slot = free_key(
            &staged.train_brigades,
            CollectionKind::TrainBrigades,
            brigade.brigade_number(),
            BRIGADE_SUFFIX,
            self.policy.collision,
        );
        if slot.renamed {
            brigade.force_brigade_number(slot.key.clone());
        }

        let leader = brigade.leader().clone();
        let leader_name = leader.read().name().to_string();
        let embedded = brigade.train().clone();
        let train_number = embedded.read().number().to_string();

        let handle = shared(brigade);
        staged.train_brigades.insert(slot.key.clone(), handle.clone());
        let (worker, worker_backfilled) =
            backfill(&mut staged.workers, CollectionKind::Workers, &leader_name, &leader);
        let (train, train_backfilled) =
            backfill(&mut staged.trains, CollectionKind::Trains, &train_number, &embedded);

        self.commit(staged, format!("add train brigade {}", slot.key))?;
        Ok(BrigadeInsert {
            brigade: handle,
            worker,
            train,
            worker_backfilled,
            train_backfilled,
        })
    }

    /// Remove the brigade stored under `number`.
    pub fn delete_train_brigade(&mut self, number: &str) -> RepositoryResult<Shared<TrainBrigade>> {
        let mut staged = self.data.clone();
        let removed =
            take_entry(&mut staged.train_brigades, CollectionKind::TrainBrigades, number)?;
        self.commit(staged, format!("delete train brigade {number}"))?;
        Ok(removed)
    }

    /// Brigade stored under `number`.
    pub fn train_brigade(&self, number: &str) -> Option<Shared<TrainBrigade>> {
        self.data.train_brigades.get(number).cloned()
    }

    /// Renumber a brigade. The new number must read as a non-negative
    /// integer and must not belong to another brigade.
    pub fn change_brigade_number(
        &mut self,
        number: &str,
        new_number: &str,
    ) -> RepositoryResult<()> {
        let handle = self
            .train_brigade(number)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::TrainBrigades, number))?;
        let new_number = validate_brigade_number(new_number)?;
        if new_number == number {
            return Ok(());
        }
        if self.data.train_brigades.contains_key(&new_number) {
            return Err(RepositoryError::duplicate(CollectionKind::TrainBrigades, new_number));
        }

        let mut staged = self.data.clone();
        staged.train_brigades.remove(number);
        staged
            .train_brigades
            .insert(new_number.clone(), handle.clone());

        let previous = handle.read().brigade_number().to_string();
        handle.write().force_brigade_number(new_number.clone());
        let operation = format!("change brigade number {number} -> {new_number}");
        if let Err(err) = self.commit(staged, operation) {
            handle.write().force_brigade_number(previous);
            return Err(err);
        }
        Ok(())
    }
}
