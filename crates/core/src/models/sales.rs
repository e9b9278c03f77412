use std::{fmt, sync::Arc};

use chrono::{NaiveDateTime, Timelike};

use super::{shared, Adjustment, BoundedInput, NewTimetable, Shared, TrainTimetable};
use crate::error::{BoundedField, ValidationError};

/// Format of the sale timestamp used as the sales sheet key.
pub const SALE_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Construction data for a [`TicketSalesSheet`].
#[derive(Debug, Clone, Default)]
pub struct NewSale {
    /// Trip the tickets were sold for.
    pub train_number: String,
    pub passenger_fullname: String,
    pub passport: String,
    pub tickets: u64,
    /// Description of the benefit (pensioner, orphan, ...), if any applies.
    pub benefits: Option<String>,
    pub price: u64,
}

/// Record of a single ticket sale, keyed by the second it happened.
#[derive(Debug, Clone)]
pub struct TicketSalesSheet {
    sold_at: NaiveDateTime,
    passenger_fullname: String,
    passport: String,
    timetable: Shared<TrainTimetable>,
    tickets: u64,
    benefits: Option<String>,
    price: u64,
}

impl TicketSalesSheet {
    /// Build a sheet with a fresh timetable entry that knows only the train number.
    pub fn new(sold_at: NaiveDateTime, input: NewSale) -> Self {
        let timetable = shared(TrainTimetable::new(NewTimetable::for_train(input.train_number)));
        Self::from_parts(
            sold_at,
            input.passenger_fullname,
            input.passport,
            timetable,
            input.tickets,
            input.benefits,
            input.price,
        )
    }

    pub(crate) fn from_parts(
        sold_at: NaiveDateTime,
        passenger_fullname: String,
        passport: String,
        timetable: Shared<TrainTimetable>,
        tickets: u64,
        benefits: Option<String>,
        price: u64,
    ) -> Self {
        Self {
            sold_at: sold_at.with_nanosecond(0).unwrap_or(sold_at),
            passenger_fullname,
            passport,
            timetable,
            tickets,
            benefits,
            price,
        }
    }

    pub fn sold_at(&self) -> NaiveDateTime {
        self.sold_at
    }

    /// Collection key: the sale time at second resolution.
    pub fn key(&self) -> String {
        self.sold_at.format(SALE_KEY_FORMAT).to_string()
    }

    pub fn passenger_fullname(&self) -> &str {
        &self.passenger_fullname
    }

    pub fn passport(&self) -> &str {
        &self.passport
    }

    pub fn timetable(&self) -> &Shared<TrainTimetable> {
        &self.timetable
    }

    pub fn tickets(&self) -> u64 {
        self.tickets
    }

    pub fn set_ticket_count(&mut self, value: impl BoundedInput) -> Result<(), ValidationError> {
        self.tickets = value.into_bounded(BoundedField::TicketCount)?;
        Ok(())
    }

    /// Apply `adjustment` to the number of tickets.
    pub fn adjust_tickets(&mut self, adjustment: Adjustment) -> Result<u64, ValidationError> {
        let tickets = adjustment.apply(BoundedField::TicketCount, self.tickets)?;
        self.set_ticket_count(tickets)?;
        Ok(tickets)
    }

    pub fn benefits(&self) -> Option<&str> {
        self.benefits.as_deref()
    }

    pub fn has_benefits(&self) -> bool {
        self.benefits.is_some()
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn summary(&self) -> String {
        format!(
            "Sold at: {}\t Passenger: {}\t Passport: {}\t Trip: {}\t Tickets: {}\t \
             Benefits: {}\t Price: {} rub.",
            self.key(),
            self.passenger_fullname,
            self.passport,
            self.timetable.read(),
            self.tickets,
            self.benefits.as_deref().unwrap_or("none"),
            self.price,
        )
    }
}

impl PartialEq for TicketSalesSheet {
    fn eq(&self, other: &Self) -> bool {
        self.sold_at == other.sold_at
            && self.passenger_fullname == other.passenger_fullname
            && self.passport == other.passport
            && (Arc::ptr_eq(&self.timetable, &other.timetable)
                || *self.timetable.read() == *other.timetable.read())
            && self.tickets == other.tickets
            && self.benefits == other.benefits
            && self.price == other.price
    }
}

impl fmt::Display for TicketSalesSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sales sheet {}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn key_drops_sub_second_precision() {
        let sold_at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_milli_opt(10, 15, 30, 750))
            .expect("timestamp");
        let sheet = TicketSalesSheet::new(
            sold_at,
            NewSale {
                train_number: "42".to_string(),
                passenger_fullname: "Sidorov Petr Ilyich".to_string(),
                passport: "4510 123456".to_string(),
                tickets: 2,
                benefits: Some("pensioner".to_string()),
                price: 3000,
            },
        );
        assert_eq!(sheet.key(), "2024-05-01 10:15:30");
        assert_eq!(sheet.to_string(), "Sales sheet 2024-05-01 10:15:30");
        assert!(sheet.has_benefits());
        assert_eq!(sheet.timetable().read().number(), "42");
        assert!(sheet.summary().contains("Trip: Timetable of Train number 42\t Tickets: 2"));
    }

    #[test]
    fn ticket_count_is_validated() {
        let sold_at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .expect("timestamp");
        let mut sheet = TicketSalesSheet::new(sold_at, NewSale::default());
        assert!(sheet.set_ticket_count(-1).is_err());
        assert!(sheet.set_ticket_count(1.5).is_err());
        assert_eq!(sheet.tickets(), 0);
        sheet.set_ticket_count(3).expect("valid count");
        assert_eq!(sheet.tickets(), 3);

        assert_eq!(sheet.adjust_tickets(Adjustment::Add(2)), Ok(5));
        assert!(sheet.adjust_tickets(Adjustment::Sub(6)).is_err());
        assert_eq!(sheet.tickets(), 5);
    }
}
