use chrono::{Local, NaiveDateTime};
use tracing::warn;

use super::{backfill, take_entry, CollectionKind, Repository};
use crate::{
    config::SaleCollision,
    error::{RepositoryError, RepositoryResult},
    models::{
        shared, Adjustment, BoundedInput, NewSale, Shared, TicketSalesSheet, Train, TrainTimetable,
    },
};

/// Result of [`Repository::add_ticket_sales_sheet`].
#[derive(Debug, Clone)]
pub struct SaleInsert {
    /// The stored sales sheet.
    pub sheet: Shared<TicketSalesSheet>,
    /// Timetable entry stored under the sheet's train number.
    pub timetable: Shared<TrainTimetable>,
    /// Train stored under the sheet's train number.
    pub train: Shared<Train>,
    /// Whether the sheet's trip was added to the timetable collection.
    pub timetable_backfilled: bool,
    /// Whether the trip's train was added to the train collection.
    pub train_backfilled: bool,
}

impl Repository {
    /// Record a sale at the current local time.
    pub fn add_ticket_sales_sheet(&mut self, input: NewSale) -> RepositoryResult<SaleInsert> {
        self.add_ticket_sales_sheet_at(Local::now().naive_local(), input)
    }

    /// Record a sale at `sold_at`, keyed by that time at second resolution.
    /// The sheet's trip is backfilled into the timetable and train
    /// collections when the train number is free there.
    pub fn add_ticket_sales_sheet_at(
        &mut self,
        sold_at: NaiveDateTime,
        input: NewSale,
    ) -> RepositoryResult<SaleInsert> {
        let sheet = TicketSalesSheet::new(sold_at, input);
        let key = sheet.key();
        if self.data.ticket_sales_sheets.contains_key(&key) {
            match self.policy.sale_collision {
                SaleCollision::Reject => {
                    return Err(RepositoryError::duplicate(CollectionKind::TicketSalesSheets, key));
                }
                SaleCollision::Overwrite => {
                    warn!(key = %key, "sale in the same second replaces earlier sheet");
                }
            }
        }

        let trip = sheet.timetable().clone();
        let embedded = trip.read().train().clone();
        let number = trip.read().number();

        let mut staged = self.data.clone();
        let handle = shared(sheet);
        staged.ticket_sales_sheets.insert(key.clone(), handle.clone());
        let (timetable, timetable_backfilled) = backfill(
            &mut staged.train_timetables,
            CollectionKind::TrainTimetables,
            &number,
            &trip,
        );
        let (train, train_backfilled) =
            backfill(&mut staged.trains, CollectionKind::Trains, &number, &embedded);

        self.commit(staged, format!("add ticket sales sheet {key} for train {number}"))?;
        Ok(SaleInsert {
            sheet: handle,
            timetable,
            train,
            timetable_backfilled,
            train_backfilled,
        })
    }

    /// Remove the sales sheet stored under `key`.
    pub fn delete_ticket_sales_sheet(
        &mut self,
        key: &str,
    ) -> RepositoryResult<Shared<TicketSalesSheet>> {
        let mut staged = self.data.clone();
        let removed = take_entry(
            &mut staged.ticket_sales_sheets,
            CollectionKind::TicketSalesSheets,
            key,
        )?;
        self.commit(staged, format!("delete ticket sales sheet {key}"))?;
        Ok(removed)
    }

    /// Sales sheet stored under `key`, a sale time such as
    /// `2024-05-01 10:15:30`.
    pub fn ticket_sales_sheet(&self, key: &str) -> Option<Shared<TicketSalesSheet>> {
        self.data.ticket_sales_sheets.get(key).cloned()
    }

    /// Update the number of tickets on a sales sheet.
    pub fn change_number_of_tickets(
        &mut self,
        key: &str,
        value: impl BoundedInput,
    ) -> RepositoryResult<()> {
        let handle = self
            .ticket_sales_sheet(key)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::TicketSalesSheets, key))?;
        let previous = handle.read().clone();
        handle.write().set_ticket_count(value)?;
        let tickets = handle.read().tickets();
        self.persist_or_revert(format!("change number of tickets of sheet {key} to {tickets}"), || {
            *handle.write() = previous;
        })
    }

    /// Apply `adjustment` to the number of tickets on a sheet and return the
    /// new count.
    pub fn adjust_number_of_tickets(
        &mut self,
        key: &str,
        adjustment: Adjustment,
    ) -> RepositoryResult<u64> {
        let mut sheet = self
            .ticket_sales_sheet(key)
            .ok_or_else(|| RepositoryError::not_found(CollectionKind::TicketSalesSheets, key))?
            .read()
            .clone();
        let tickets = sheet.adjust_tickets(adjustment)?;
        self.change_number_of_tickets(key, tickets)?;
        Ok(tickets)
    }
}
