use std::fmt;

use crate::error::{BoundedField, ValidationError};

/// Values that can be assigned to a bounded numeric field.
///
/// Integers are range checked, text is parsed first. Floats are never
/// accepted, even when integral, since the field only takes integers.
pub trait BoundedInput {
    /// Validate the value for `field`, returning the accepted count.
    fn into_bounded(self, field: BoundedField) -> Result<u64, ValidationError>;
}

fn check_signed(field: BoundedField, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value).map_err(|_| ValidationError::InvalidValue { field, value })
}

impl BoundedInput for i64 {
    fn into_bounded(self, field: BoundedField) -> Result<u64, ValidationError> {
        check_signed(field, self)
    }
}

impl BoundedInput for i32 {
    fn into_bounded(self, field: BoundedField) -> Result<u64, ValidationError> {
        check_signed(field, i64::from(self))
    }
}

impl BoundedInput for u32 {
    fn into_bounded(self, _field: BoundedField) -> Result<u64, ValidationError> {
        Ok(u64::from(self))
    }
}

impl BoundedInput for u64 {
    fn into_bounded(self, _field: BoundedField) -> Result<u64, ValidationError> {
        Ok(self)
    }
}

impl BoundedInput for f64 {
    fn into_bounded(self, field: BoundedField) -> Result<u64, ValidationError> {
        Err(ValidationError::InvalidType {
            field,
            value: self.to_string(),
        })
    }
}

impl BoundedInput for &str {
    fn into_bounded(self, field: BoundedField) -> Result<u64, ValidationError> {
        let trimmed = self.trim();
        match trimmed.parse::<i64>() {
            Ok(value) => check_signed(field, value),
            // digits that overflow i64 are still a valid non-negative integer
            Err(_) => trimmed
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidType {
                    field,
                    value: self.to_string(),
                }),
        }
    }
}

impl BoundedInput for String {
    fn into_bounded(self, field: BoundedField) -> Result<u64, ValidationError> {
        self.as_str().into_bounded(field)
    }
}

/// Arithmetic change applied to the current value of a bounded field.
///
/// The result goes back through [`BoundedInput`], so a step below zero is
/// an [`ValidationError::InvalidValue`] and the field keeps its old value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Add the operand.
    Add(i64),
    /// Subtract the operand.
    Sub(i64),
    /// Multiply by the operand.
    Mul(i64),
    /// Divide by the operand, rounding toward negative infinity.
    FloorDiv(i64),
}

impl Adjustment {
    /// Compute the adjusted value of `field` starting from `current`.
    pub fn apply(self, field: BoundedField, current: u64) -> Result<u64, ValidationError> {
        let current = i128::from(current);
        let adjusted = match self {
            Adjustment::Add(operand) => current.checked_add(i128::from(operand)),
            Adjustment::Sub(operand) => current.checked_sub(i128::from(operand)),
            Adjustment::Mul(operand) => current.checked_mul(i128::from(operand)),
            Adjustment::FloorDiv(0) => return Err(ValidationError::DivisionByZero { field }),
            Adjustment::FloorDiv(operand) => floor_div(current, i128::from(operand)),
        }
        .ok_or(ValidationError::OutOfRange { field })?;

        match i64::try_from(adjusted) {
            Ok(value) => value.into_bounded(field),
            Err(_) => u64::try_from(adjusted).map_err(|_| ValidationError::OutOfRange { field }),
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::Add(operand) => write!(f, "+ {operand}"),
            Adjustment::Sub(operand) => write!(f, "- {operand}"),
            Adjustment::Mul(operand) => write!(f, "* {operand}"),
            Adjustment::FloorDiv(operand) => write!(f, "// {operand}"),
        }
    }
}

fn floor_div(lhs: i128, rhs: i128) -> Option<i128> {
    let quotient = lhs.checked_div(rhs)?;
    if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_negative_integers() {
        for value in [0_i64, 1, 7, 120, i64::MAX] {
            assert_eq!(
                value.into_bounded(BoundedField::Seniority),
                Ok(value as u64)
            );
        }
        assert_eq!(12_u32.into_bounded(BoundedField::Carriages), Ok(12));
        assert_eq!(" 42 ".into_bounded(BoundedField::TicketPrice), Ok(42));
    }

    #[test]
    fn negative_values_are_invalid_values() {
        let err = (-3_i32).into_bounded(BoundedField::TicketCount).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidValue {
                field: BoundedField::TicketCount,
                value: -3
            }
        );
        assert!(matches!(
            "-1".into_bounded(BoundedField::Seniority),
            Err(ValidationError::InvalidValue { value: -1, .. })
        ));
    }

    #[test]
    fn non_integers_are_invalid_types() {
        for raw in ["abc", "3.5", "", "4e2"] {
            let err = raw.into_bounded(BoundedField::Carriages).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidType { .. }),
                "{raw} produced {err:?}"
            );
        }
        let err = 3.0_f64.into_bounded(BoundedField::Seniority).unwrap_err();
        assert_eq!(err.field(), BoundedField::Seniority);
        assert!(matches!(err, ValidationError::InvalidType { .. }));
    }

    #[test]
    fn adjustments_follow_integer_arithmetic() {
        let field = BoundedField::TicketPrice;
        assert_eq!(Adjustment::Add(250).apply(field, 1500), Ok(1750));
        assert_eq!(Adjustment::Sub(1500).apply(field, 1500), Ok(0));
        assert_eq!(Adjustment::Mul(3).apply(field, 7), Ok(21));
        assert_eq!(Adjustment::FloorDiv(2).apply(field, 7), Ok(3));
        assert_eq!(Adjustment::FloorDiv(-2).apply(field, 0), Ok(0));
        assert_eq!(Adjustment::Add(-2).to_string(), "+ -2");
    }

    #[test]
    fn adjustments_below_zero_or_by_zero_are_rejected() {
        let field = BoundedField::Seniority;
        assert_eq!(
            Adjustment::Sub(5).apply(field, 3),
            Err(ValidationError::InvalidValue { field, value: -2 })
        );
        // floor division rounds -7 / 2 down to -4
        assert_eq!(
            Adjustment::FloorDiv(-2).apply(field, 7),
            Err(ValidationError::InvalidValue { field, value: -4 })
        );
        assert_eq!(
            Adjustment::FloorDiv(0).apply(field, 7),
            Err(ValidationError::DivisionByZero { field })
        );
        assert_eq!(
            Adjustment::Mul(2).apply(field, u64::MAX),
            Err(ValidationError::OutOfRange { field })
        );
        assert_eq!(Adjustment::Add(1).apply(field, i64::MAX as u64), Ok(i64::MAX as u64 + 1));
    }
}
