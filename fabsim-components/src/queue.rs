//! Bounded product buffers with reservation slots.
//!
//! A queue tracks two counters: `occupancy` (products physically held) and
//! `reserved` (slots promised to in-flight requests). A reservation is a
//! named promise identified by a monotone [`ReservationId`]; committing it
//! atomically moves a product into the promised slot, releasing cancels it.
//! Referencing an unknown reservation id is an engine bug and surfaces as a
//! hard error at the driver level.

use std::collections::{HashSet, VecDeque};

use crate::ids::{ProductIdx, QueueIdx};

/// A promise of one queue slot. Ids are unique across the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReservationId(pub u64);

/// Outcome of an operation that needs a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueVerdict {
    Accepted,
    Full,
}

#[derive(Debug)]
pub struct ProductQueue {
    pub id: String,
    pub idx: QueueIdx,
    /// `None` is unbounded (configured capacity 0).
    capacity: Option<usize>,
    pub location: Option<[f64; 2]>,
    items: VecDeque<ProductIdx>,
    reservations: HashSet<u64>,
}

impl ProductQueue {
    pub fn new(id: &str, idx: QueueIdx, capacity: i64, location: Option<[f64; 2]>) -> Self {
        Self {
            id: id.to_string(),
            idx,
            capacity: if capacity <= 0 {
                None
            } else {
                Some(capacity as usize)
            },
            location,
            items: VecDeque::new(),
            reservations: HashSet::new(),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn occupancy(&self) -> usize {
        self.items.len()
    }

    pub fn reserved(&self) -> usize {
        self.reservations.len()
    }

    /// Occupancy plus promised slots; what routing policies compare.
    pub fn load(&self) -> usize {
        self.occupancy() + self.reserved()
    }

    pub fn has_space(&self) -> bool {
        self.capacity.map_or(true, |cap| self.load() < cap)
    }

    /// Promise one slot. Fails with [`QueueVerdict::Full`] when
    /// `occupancy + reserved` has reached capacity.
    pub fn reserve(&mut self, next_reservation: &mut u64) -> Result<ReservationId, QueueVerdict> {
        if !self.has_space() {
            return Err(QueueVerdict::Full);
        }
        *next_reservation += 1;
        let id = ReservationId(*next_reservation);
        self.reservations.insert(id.0);
        Ok(id)
    }

    /// Move `product` into the slot promised by `reservation`.
    pub fn commit(
        &mut self,
        reservation: ReservationId,
        product: ProductIdx,
    ) -> Result<(), String> {
        if !self.reservations.remove(&reservation.0) {
            return Err(format!(
                "reservation {} not found in queue '{}'",
                reservation.0, self.id
            ));
        }
        self.items.push_back(product);
        Ok(())
    }

    /// Cancel a promise without filling the slot.
    pub fn release(&mut self, reservation: ReservationId) -> Result<(), String> {
        if !self.reservations.remove(&reservation.0) {
            return Err(format!(
                "reservation {} not found in queue '{}'",
                reservation.0, self.id
            ));
        }
        Ok(())
    }

    /// Whether a previously issued reservation is still open.
    pub fn holds(&self, reservation: ReservationId) -> bool {
        self.reservations.contains(&reservation.0)
    }

    /// Plain put without a prior reservation (sources placing fresh
    /// products). Fails when full.
    pub fn push(&mut self, product: ProductIdx) -> QueueVerdict {
        if !self.has_space() {
            return QueueVerdict::Full;
        }
        self.items.push_back(product);
        QueueVerdict::Accepted
    }

    /// Lift a specific product out of the queue. Controllers pick items out
    /// of order; FIFO position is irrelevant once a request is selected.
    pub fn take(&mut self, product: ProductIdx) -> bool {
        if let Some(pos) = self.items.iter().position(|&p| p == product) {
            self.items.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, product: ProductIdx) -> bool {
        self.items.contains(&product)
    }
}
