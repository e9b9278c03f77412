use std::fmt;

use serde::{Deserialize, Serialize};

use super::{display_or_dash, title_case, Adjustment, BoundedInput};
use crate::error::{BoundedField, ValidationError};

/// Construction data for a [`Worker`].
#[derive(Debug, Clone, Default)]
pub struct NewWorker {
    pub surname: String,
    pub name: String,
    pub patronymic: String,
    pub year_of_birth: Option<i32>,
    pub year_of_employment: Option<i32>,
    pub seniority: u64,
    pub position: String,
    pub gender: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

impl NewWorker {
    /// Minimal record with only the identifying fields filled in.
    pub fn named(
        surname: impl Into<String>,
        name: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            surname: surname.into(),
            name: name.into(),
            position: position.into(),
            ..Self::default()
        }
    }
}

/// Station employee, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    surname: String,
    name: String,
    patronymic: String,
    year_of_birth: Option<i32>,
    year_of_employment: Option<i32>,
    seniority: u64,
    position: String,
    gender: String,
    address: String,
    city: String,
    phone: String,
}

impl Worker {
    pub fn new(input: NewWorker) -> Self {
        Self {
            surname: input.surname,
            name: input.name,
            patronymic: input.patronymic,
            year_of_birth: input.year_of_birth,
            year_of_employment: input.year_of_employment,
            seniority: input.seniority,
            position: input.position,
            gender: input.gender,
            address: input.address,
            city: input.city,
            phone: input.phone,
        }
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the worker. The repository keeps the collection key in sync.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn patronymic(&self) -> &str {
        &self.patronymic
    }

    pub fn year_of_birth(&self) -> Option<i32> {
        self.year_of_birth
    }

    pub fn year_of_employment(&self) -> Option<i32> {
        self.year_of_employment
    }

    pub fn seniority(&self) -> u64 {
        self.seniority
    }

    /// Assign seniority in years. Rejected values leave the current one untouched.
    pub fn set_seniority(&mut self, value: impl BoundedInput) -> Result<(), ValidationError> {
        self.seniority = value.into_bounded(BoundedField::Seniority)?;
        Ok(())
    }

    /// Apply `adjustment` to seniority and return the new value.
    pub fn adjust_seniority(&mut self, adjustment: Adjustment) -> Result<u64, ValidationError> {
        let seniority = adjustment.apply(BoundedField::Seniority, self.seniority)?;
        self.set_seniority(seniority)?;
        Ok(seniority)
    }

    /// One more year of service.
    pub fn increment_seniority(&mut self) -> Result<u64, ValidationError> {
        self.adjust_seniority(Adjustment::Add(1))
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Full one-line description with every field.
    pub fn summary(&self) -> String {
        format!(
            "Worker: {} {} {}\t Position: {}\t Seniority: {}\t Born: {}\t Employed: {}\t \
             Gender: {}\t Address: {}, {}\t Phone: {}",
            self.surname,
            self.name,
            self.patronymic,
            self.position,
            self.seniority,
            display_or_dash(self.year_of_birth),
            display_or_dash(self.year_of_employment),
            self.gender,
            self.address,
            self.city,
            self.phone,
        )
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&title_case(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Worker {
        Worker::new(NewWorker {
            patronymic: "Petrovich".to_string(),
            seniority: 4,
            ..NewWorker::named("Ivanov", "ivan", "driver")
        })
    }

    #[test]
    fn seniority_setter_validates() {
        let mut worker = sample();
        worker.set_seniority(9).expect("valid seniority");
        assert_eq!(worker.seniority(), 9);

        assert!(matches!(
            worker.set_seniority(-1),
            Err(ValidationError::InvalidValue { value: -1, .. })
        ));
        assert!(matches!(
            worker.set_seniority(2.5),
            Err(ValidationError::InvalidType { .. })
        ));
        assert_eq!(worker.seniority(), 9);
    }

    #[test]
    fn seniority_adjustments_stay_non_negative() {
        let mut worker = sample();
        assert_eq!(worker.increment_seniority(), Ok(5));
        assert_eq!(worker.adjust_seniority(Adjustment::Mul(3)), Ok(15));
        assert_eq!(worker.adjust_seniority(Adjustment::FloorDiv(4)), Ok(3));
        assert!(matches!(
            worker.adjust_seniority(Adjustment::Sub(4)),
            Err(ValidationError::InvalidValue { value: -1, .. })
        ));
        assert_eq!(
            worker.adjust_seniority(Adjustment::FloorDiv(0)),
            Err(ValidationError::DivisionByZero {
                field: BoundedField::Seniority
            })
        );
        assert_eq!(worker.seniority(), 3);
    }

    #[test]
    fn display_uses_title_case_name() {
        let worker = sample();
        assert_eq!(worker.to_string(), "Ivan");
        assert!(worker.summary().starts_with("Worker: Ivanov ivan Petrovich\t Position: driver"));
    }
}
