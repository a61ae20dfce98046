//! System-wide routing.
//!
//! For each product's next required process the router enumerates candidate
//! resources, filters out those whose input queue cannot take a reservation,
//! orders the survivors by the product's routing policy, and reserves the
//! input slot on the winner before the transport request is created. Products
//! with no feasible candidate wait here and are re-offered in arrival order
//! whenever any queue frees a slot.

use std::collections::VecDeque;

use fabsim_core::SimRng;
use fabsim_model::RoutingHeuristicKind;

use crate::ids::ProductIdx;

/// A feasibility-filtered routing candidate, in configuration order.
#[derive(Debug, Clone)]
pub struct RouteCandidate {
    /// Resource (or sink) id, the documented tie-break for shortest_queue.
    pub id: String,
    /// `occupancy + reserved` of the input queue that would take the
    /// reservation.
    pub load: usize,
    /// Arrival order of the candidate into the system (configuration
    /// order); what the FIFO policy compares.
    pub arrival_rank: usize,
}

/// Pick the winning candidate position for `policy`.
pub fn choose(
    policy: RoutingHeuristicKind,
    candidates: &[RouteCandidate],
    rng: &mut SimRng,
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let winner = match policy {
        RoutingHeuristicKind::Random => rng.index(candidates.len()),
        RoutingHeuristicKind::ShortestQueue => candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.load.cmp(&b.load).then_with(|| a.id.cmp(&b.id)))
            .map(|(i, _)| i)?,
        RoutingHeuristicKind::Fifo => candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.arrival_rank)
            .map(|(i, _)| i)?,
    };
    Some(winner)
}

/// The waiting room for products that currently have no feasible route.
#[derive(Debug)]
pub struct Router {
    waiting: VecDeque<ProductIdx>,
    pub poll_scheduled: bool,
    pub rng: SimRng,
}

impl Router {
    pub fn new(rng: SimRng) -> Self {
        Self {
            waiting: VecDeque::new(),
            poll_scheduled: false,
            rng,
        }
    }

    pub fn park(&mut self, product: ProductIdx) {
        if !self.waiting.contains(&product) {
            self.waiting.push_back(product);
        }
    }

    /// Drain the waiting list in arrival order for a re-offer round.
    pub fn drain_waiting(&mut self) -> Vec<ProductIdx> {
        self.waiting.drain(..).collect()
    }

    pub fn has_waiting(&self) -> bool {
        !self.waiting.is_empty()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }
}
