//! Filtering and pagination over the reservation collection.

use crate::model::{Estado, Reserva};
use chrono::NaiveDate;

/// Optional, AND-combined predicates over the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub estado: Option<Estado>,
    /// Lower travel-date bound, inclusive.
    pub desde: Option<NaiveDate>,
    /// Upper travel-date bound, inclusive (whole day).
    pub hasta: Option<NaiveDate>,
    pub destino: Option<u64>,
    pub nave: Option<u64>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }

    /// Predicates apply in order: status, lower date bound, upper date
    /// bound, destination, ship. Date bounds compare the travel date at
    /// day granularity, so the upper bound is inclusive of its whole day.
    pub fn matches(&self, reserva: &Reserva) -> bool {
        if let Some(estado) = self.estado
            && reserva.estado != estado
        {
            return false;
        }
        if let Some(desde) = self.desde
            && reserva.fecha_viaje < desde
        {
            return false;
        }
        if let Some(hasta) = self.hasta
            && reserva.fecha_viaje > hasta
        {
            return false;
        }
        if let Some(destino) = self.destino
            && reserva.destino_id != destino
        {
            return false;
        }
        if let Some(nave) = self.nave
            && reserva.nave_id != nave
        {
            return false;
        }
        true
    }
}

/// Client-side pagination state, updated by paginated loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            total: 0,
        }
    }
}

impl Pagination {
    /// Pages needed to show `item_count` items at the current page size.
    pub fn total_pages(&self, item_count: usize) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        (item_count as u32).div_ceil(self.per_page)
    }

    /// The index range `[start, end)` of the current page.
    pub fn slice_bounds(&self, item_count: usize) -> (usize, usize) {
        let start = (self.page.saturating_sub(1) as usize) * self.per_page as usize;
        let end = (start + self.per_page as usize).min(item_count);
        (start.min(item_count), end)
    }
}
