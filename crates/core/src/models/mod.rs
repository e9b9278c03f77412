#![allow(missing_docs)]

//! Station entity models.

use std::sync::Arc;

use parking_lot::RwLock;

mod bounded;
mod brigade;
mod sales;
mod timetable;
mod train;
mod worker;

pub use bounded::{Adjustment, BoundedInput};
pub use brigade::{NewBrigade, TrainBrigade};
pub(crate) use brigade::validate_brigade_number;
pub use sales::{NewSale, TicketSalesSheet, SALE_KEY_FORMAT};
pub use timetable::{NewTimetable, Stop, TrainTimetable};
pub use train::{NewTrain, Train};
pub use worker::{NewWorker, Worker};

/// Handle to a stored entity. Collections and embedding entities clone the
/// handle, so every holder observes the same record.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wrap a freshly built entity in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// Upper-case the first letter of every whitespace separated word and
/// lower-case the rest.
pub(crate) fn title_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(ch);
            at_word_start = true;
        }
    }
    result
}

fn display_or_dash<T: ToString>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("ivan"), "Ivan");
        assert_eq!(title_case("anna-maria petrova"), "Anna-Maria Petrova");
        assert_eq!(title_case("IVAN1"), "Ivan1");
    }
}
