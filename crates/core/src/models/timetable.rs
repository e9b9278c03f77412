use std::{fmt, sync::Arc};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{display_or_dash, shared, Adjustment, BoundedInput, NewTrain, Shared, Train};
use crate::error::{BoundedField, ValidationError};

/// Departure or arrival point of a trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub place: Option<String>,
}

impl Stop {
    pub fn new(date: NaiveDate, time: NaiveTime, place: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            time: Some(time),
            place: Some(place.into()),
        }
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            display_or_dash(self.date),
            display_or_dash(self.time.map(|time| time.format("%H:%M")))
        )?;
        if let Some(place) = self.place.as_deref().filter(|place| !place.is_empty()) {
            write!(f, " ({place})")?;
        }
        Ok(())
    }
}

/// Construction data for a [`TrainTimetable`]. The train is always built
/// fresh from `train`; it is never looked up in the train collection.
#[derive(Debug, Clone, Default)]
pub struct NewTimetable {
    pub train: NewTrain,
    pub departure: Stop,
    pub arrival: Stop,
    /// Start and end points plus the main junctions.
    pub route: Option<String>,
    pub ticket_price: Option<u64>,
}

impl NewTimetable {
    /// Timetable entry known only by the train number.
    pub fn for_train(number: impl Into<String>) -> Self {
        Self {
            train: NewTrain::numbered(number),
            ..Self::default()
        }
    }
}

/// Scheduled trip of one train, keyed by the train number.
#[derive(Debug, Clone)]
pub struct TrainTimetable {
    train: Shared<Train>,
    departure: Stop,
    arrival: Stop,
    route: Option<String>,
    ticket_price: Option<u64>,
}

impl TrainTimetable {
    pub fn new(input: NewTimetable) -> Self {
        Self::with_train(
            shared(Train::new(input.train)),
            input.departure,
            input.arrival,
            input.route,
            input.ticket_price,
        )
    }

    pub(crate) fn with_train(
        train: Shared<Train>,
        departure: Stop,
        arrival: Stop,
        route: Option<String>,
        ticket_price: Option<u64>,
    ) -> Self {
        Self {
            train,
            departure,
            arrival,
            route,
            ticket_price,
        }
    }

    /// Handle to the embedded train.
    pub fn train(&self) -> &Shared<Train> {
        &self.train
    }

    /// Number of the embedded train, which doubles as the timetable key.
    pub fn number(&self) -> String {
        self.train.read().number().to_string()
    }

    pub fn departure(&self) -> &Stop {
        &self.departure
    }

    pub fn arrival(&self) -> &Stop {
        &self.arrival
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn ticket_price(&self) -> Option<u64> {
        self.ticket_price
    }

    pub fn set_ticket_price(&mut self, value: impl BoundedInput) -> Result<(), ValidationError> {
        self.ticket_price = Some(value.into_bounded(BoundedField::TicketPrice)?);
        Ok(())
    }

    /// Apply `adjustment` to the ticket price. An unset price counts as zero.
    pub fn adjust_ticket_price(&mut self, adjustment: Adjustment) -> Result<u64, ValidationError> {
        let price =
            adjustment.apply(BoundedField::TicketPrice, self.ticket_price.unwrap_or_default())?;
        self.set_ticket_price(price)?;
        Ok(price)
    }

    pub fn summary(&self) -> String {
        format!(
            "Timetable:\t Train: {}\t Route: {}\t Departure: {}\t Arrival: {}\t Ticket price: {} rub.",
            self.train.read(),
            display_or_dash(self.route.as_deref()),
            self.departure,
            self.arrival,
            display_or_dash(self.ticket_price),
        )
    }
}

impl PartialEq for TrainTimetable {
    fn eq(&self, other: &Self) -> bool {
        let same_train =
            Arc::ptr_eq(&self.train, &other.train) || *self.train.read() == *other.train.read();
        same_train
            && self.departure == other.departure
            && self.arrival == other.arrival
            && self.route == other.route
            && self.ticket_price == other.ticket_price
    }
}

impl fmt::Display for TrainTimetable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timetable of {}", self.train.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrainTimetable {
        TrainTimetable::new(NewTimetable {
            departure: Stop::new(
                NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
                NaiveTime::from_hms_opt(9, 30, 0).expect("time"),
                "Moscow",
            ),
            route: Some("Moscow - Tver".to_string()),
            ticket_price: Some(1500),
            ..NewTimetable::for_train("42")
        })
    }

    #[test]
    fn summary_has_fixed_order() {
        let timetable = sample();
        assert_eq!(timetable.to_string(), "Timetable of Train number 42");
        assert_eq!(
            timetable.summary(),
            "Timetable:\t Train: Train number 42\t Route: Moscow - Tver\t \
             Departure: 2024-05-01 - 09:30 (Moscow)\t Arrival: - - -\t Ticket price: 1500 rub."
        );
    }

    #[test]
    fn ticket_price_is_validated() {
        let mut timetable = sample();
        assert!(timetable.set_ticket_price(-100).is_err());
        assert!(timetable.set_ticket_price("cheap").is_err());
        assert_eq!(timetable.ticket_price(), Some(1500));
        timetable.set_ticket_price(0).expect("free ride is allowed");
        assert_eq!(timetable.ticket_price(), Some(0));
    }

    #[test]
    fn ticket_price_adjusts_by_floor_division() {
        let mut timetable = sample();
        assert_eq!(timetable.adjust_ticket_price(Adjustment::FloorDiv(7)), Ok(214));
        assert_eq!(timetable.adjust_ticket_price(Adjustment::Sub(14)), Ok(200));
        assert!(timetable.adjust_ticket_price(Adjustment::Sub(201)).is_err());
        assert_eq!(timetable.ticket_price(), Some(200));
    }

    #[test]
    fn embedded_train_is_shared() {
        let timetable = sample();
        let handle = Arc::clone(timetable.train());
        handle.write().set_carriages(10).expect("valid count");
        assert_eq!(timetable.train().read().carriages(), Some(10));
    }
}
