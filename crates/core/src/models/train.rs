use std::fmt;

use serde::{Deserialize, Serialize};

use super::{display_or_dash, Adjustment, BoundedInput};
use crate::error::{BoundedField, ValidationError};

/// Construction data for a [`Train`].
#[derive(Debug, Clone, Default)]
pub struct NewTrain {
    pub number: String,
    pub release_year: Option<i32>,
    pub carriages: Option<u64>,
    /// Free-form kind, e.g. commuter, express or high-speed.
    pub train_type: Option<String>,
}

impl NewTrain {
    /// Train known only by its number.
    pub fn numbered(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Self::default()
        }
    }
}

/// Rolling stock entry, keyed by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    number: String,
    release_year: Option<i32>,
    carriages: Option<u64>,
    train_type: Option<String>,
}

impl Train {
    pub fn new(input: NewTrain) -> Self {
        Self {
            number: input.number,
            release_year: input.release_year,
            carriages: input.carriages,
            train_type: input.train_type,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn set_number(&mut self, number: impl Into<String>) {
        self.number = number.into();
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_year
    }

    pub fn carriages(&self) -> Option<u64> {
        self.carriages
    }

    pub fn set_carriages(&mut self, value: impl BoundedInput) -> Result<(), ValidationError> {
        self.carriages = Some(value.into_bounded(BoundedField::Carriages)?);
        Ok(())
    }

    /// Apply `adjustment` to the carriage count. An unknown count counts as zero.
    pub fn adjust_carriages(&mut self, adjustment: Adjustment) -> Result<u64, ValidationError> {
        let carriages =
            adjustment.apply(BoundedField::Carriages, self.carriages.unwrap_or_default())?;
        self.set_carriages(carriages)?;
        Ok(carriages)
    }

    pub fn train_type(&self) -> Option<&str> {
        self.train_type.as_deref()
    }

    pub fn summary(&self) -> String {
        format!(
            "Train: {}\t Type: {}\t Released: {}\t Carriages: {}",
            self.number,
            display_or_dash(self.train_type.as_deref()),
            display_or_dash(self.release_year),
            display_or_dash(self.carriages),
        )
    }
}

impl fmt::Display for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Train number {}", self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriages_keep_previous_value_on_rejection() {
        let mut train = Train::new(NewTrain {
            carriages: Some(8),
            ..NewTrain::numbered("42")
        });
        assert!(train.set_carriages("ten").is_err());
        assert!(train.set_carriages(-2).is_err());
        assert_eq!(train.carriages(), Some(8));

        train.set_carriages(12_u32).expect("valid count");
        assert_eq!(train.carriages(), Some(12));
    }

    #[test]
    fn carriage_adjustments_start_from_zero() {
        let mut train = Train::new(NewTrain::numbered("42"));
        assert_eq!(train.adjust_carriages(Adjustment::Add(6)), Ok(6));
        assert_eq!(train.adjust_carriages(Adjustment::Mul(2)), Ok(12));
        assert!(train.adjust_carriages(Adjustment::Sub(13)).is_err());
        assert_eq!(train.carriages(), Some(12));
    }

    #[test]
    fn renders_labels() {
        let train = Train::new(NewTrain {
            train_type: Some("express".to_string()),
            ..NewTrain::numbered("701")
        });
        assert_eq!(train.to_string(), "Train number 701");
        assert_eq!(
            train.summary(),
            "Train: 701\t Type: express\t Released: -\t Carriages: -"
        );
    }
}
