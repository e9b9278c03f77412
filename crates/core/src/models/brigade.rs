use std::{fmt, sync::Arc};

use super::{shared, BoundedInput, NewTrain, NewWorker, Shared, Train, Worker};
use crate::error::{BoundedField, ValidationError};

/// Construction data for a [`TrainBrigade`]. The brigade starts with a
/// single member built from `member`.
#[derive(Debug, Clone, Default)]
pub struct NewBrigade {
    pub brigade_number: String,
    pub train: NewTrain,
    pub member: NewWorker,
}

/// Crew serving a train: drivers, technicians, conductors and service staff.
#[derive(Debug, Clone)]
pub struct TrainBrigade {
    brigade_number: String,
    train: Shared<Train>,
    members: Vec<Shared<Worker>>,
}

/// Brigade numbers are text that must read as a non-negative integer.
pub(crate) fn validate_brigade_number(number: &str) -> Result<String, ValidationError> {
    number.into_bounded(BoundedField::BrigadeNumber)?;
    Ok(number.trim().to_string())
}

impl TrainBrigade {
    pub fn new(input: NewBrigade) -> Result<Self, ValidationError> {
        let brigade_number = validate_brigade_number(&input.brigade_number)?;
        Ok(Self {
            brigade_number,
            train: shared(Train::new(input.train)),
            members: vec![shared(Worker::new(input.member))],
        })
    }

    pub(crate) fn from_parts(
        brigade_number: String,
        train: Shared<Train>,
        members: Vec<Shared<Worker>>,
    ) -> Self {
        Self {
            brigade_number,
            train,
            members,
        }
    }

    pub fn brigade_number(&self) -> &str {
        &self.brigade_number
    }

    pub fn set_brigade_number(&mut self, number: &str) -> Result<(), ValidationError> {
        self.brigade_number = validate_brigade_number(number)?;
        Ok(())
    }

    /// Unchecked assignment used for collision suffixes, which keep the
    /// number numeric.
    pub(crate) fn force_brigade_number(&mut self, number: String) {
        self.brigade_number = number;
    }

    pub fn train(&self) -> &Shared<Train> {
        &self.train
    }

    /// Members in the order they joined. Never empty.
    pub fn members(&self) -> &[Shared<Worker>] {
        &self.members
    }

    /// The founding member, which is the one backfilled into the worker
    /// collection.
    pub fn leader(&self) -> &Shared<Worker> {
        &self.members[0]
    }

    pub fn add_member(&mut self, worker: Shared<Worker>) {
        self.members.push(worker);
    }

    pub fn summary(&self) -> String {
        let members = self
            .members
            .iter()
            .map(|member| member.read().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Brigade No.{}, serves {}. Workers: [{}]",
            self.brigade_number,
            self.train.read(),
            members
        )
    }
}

impl PartialEq for TrainBrigade {
    fn eq(&self, other: &Self) -> bool {
        self.brigade_number == other.brigade_number
            && (Arc::ptr_eq(&self.train, &other.train) || *self.train.read() == *other.train.read())
            && self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(left, right)| Arc::ptr_eq(left, right) || *left.read() == *right.read())
    }
}

impl fmt::Display for TrainBrigade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Brigade number {}", self.brigade_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(number: &str) -> NewBrigade {
        NewBrigade {
            brigade_number: number.to_string(),
            train: NewTrain::numbered("42"),
            member: NewWorker::named("Ivanov", "ivan", "driver"),
        }
    }

    #[test]
    fn number_must_be_non_negative_integer_text() {
        assert!(TrainBrigade::new(input("7")).is_ok());
        assert!(matches!(
            TrainBrigade::new(input("seven")),
            Err(ValidationError::InvalidType { field: BoundedField::BrigadeNumber, .. })
        ));
        assert!(matches!(
            TrainBrigade::new(input("-7")),
            Err(ValidationError::InvalidValue { value: -7, .. })
        ));
    }

    #[test]
    fn summary_lists_members() -> Result<(), ValidationError> {
        let mut brigade = TrainBrigade::new(input("7"))?;
        brigade.add_member(shared(Worker::new(NewWorker::named("Petrova", "anna", "conductor"))));
        assert_eq!(brigade.leader().read().name(), "ivan");
        assert_eq!(
            brigade.summary(),
            "Brigade No.7, serves Train number 42. Workers: [Ivan, Anna]"
        );

        assert!(brigade.set_brigade_number("x1").is_err());
        assert_eq!(brigade.brigade_number(), "7");
        Ok(())
    }
}
