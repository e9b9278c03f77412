use super::{keys::free_key, take_entry, CollectionKind, Repository};
use crate::{
    config::CollisionPolicy,
    error::{RepositoryError, RepositoryResult},
    models::{shared, Adjustment, BoundedInput, NewWorker, Shared, Worker},
};

const WORKER_SUFFIX: &str = "1";

impl Repository {
    /// Add a worker keyed by name. A taken name gets `"1"` appended until it
    /// is unique, and the stored worker carries the final name.
    pub fn add_worker(&mut self, input: NewWorker) -> RepositoryResult<Shared<Worker>> {
        if input.name.trim().is_empty() {
            return Err(RepositoryError::EmptyKey {
                collection: CollectionKind::Workers,
            });
        }
        let mut worker = Worker::new(input);
        let mut staged = self.data.clone();
        let slot = free_key(
            &staged.workers,
            CollectionKind::Workers,
            worker.name(),
            WORKER_SUFFIX,
            CollisionPolicy::Repeat,
        );
        if slot.renamed {
            worker.set_name(slot.key.clone());
        }

        let handle = shared(worker);
        staged.workers.insert(slot.key.clone(), handle.clone());
        self.commit(staged, format!("add worker {}", slot.key))?;
        Ok(handle)
    }

    /// Remove the worker stored under `name`.
    pub fn delete_worker(&mut self, name: &str) -> RepositoryResult<Shared<Worker>> {
        let mut staged = self.data.clone();
        let removed = take_entry(&mut staged.workers, CollectionKind::Workers, name)?;
        self.commit(staged, format!("delete worker {name}"))?;
        Ok(removed)
    }

    /// Worker stored under `name`.
    pub fn worker(&self, name: &str) -> Option<Shared<Worker>> {
        self.data.workers.get(name).cloned()
    }

    /// Rename a worker, moving it to the `new_name` key. Blank names are
    /// rejected.
    pub fn rename_worker(&mut self, name: &str, new_name: &str) -> RepositoryResult<()> {
        let handle = self
            .worker(name)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::Workers, name))?;
        if new_name.trim().is_empty() {
            return Err(RepositoryError::EmptyKey {
                collection: CollectionKind::Workers,
            });
        }
        if name == new_name {
            return Ok(());
        }
        if self.data.workers.contains_key(new_name) {
            return Err(RepositoryError::duplicate(CollectionKind::Workers, new_name));
        }

        let mut staged = self.data.clone();
        staged.workers.remove(name);
        staged.workers.insert(new_name.to_string(), handle.clone());

        let previous = handle.read().name().to_string();
        handle.write().set_name(new_name);
        if let Err(err) = self.commit(staged, format!("rename worker {name} -> {new_name}")) {
            handle.write().set_name(previous);
            return Err(err);
        }
        Ok(())
    }

    /// Update seniority. Invalid input leaves the stored value untouched.
    pub fn change_worker_seniority(
        &mut self,
        name: &str,
        value: impl BoundedInput,
    ) -> RepositoryResult<()> {
        let handle = self
            .worker(name)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::Workers, name))?;
        let previous = handle.read().clone();
        handle.write().set_seniority(value)?;
        let current = handle.read().seniority();
        self.persist_or_revert(format!("change seniority of worker {name} to {current}"), || {
            *handle.write() = previous;
        })
    }

    /// Apply `adjustment` to a worker's seniority and return the new value.
    pub fn adjust_worker_seniority(
        &mut self,
        name: &str,
        adjustment: Adjustment,
    ) -> RepositoryResult<u64> {
        let mut worker = self
            .worker(name)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::Workers, name))?
            .read()
            .clone();
        let seniority = worker.adjust_seniority(adjustment)?;
        self.change_worker_seniority(name, seniority)?;
        Ok(seniority)
    }

    /// Add a year of service to a worker.
    pub fn increment_worker_seniority(&mut self, name: &str) -> RepositoryResult<u64> {
        self.adjust_worker_seniority(name, Adjustment::Add(1))
    }
}
