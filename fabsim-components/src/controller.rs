//! Sequencing policies.
//!
//! A controller owns the pending requests awaiting its resource and, on each
//! opportunity, selects the next one among those currently executable. The
//! policy only orders; executability is decided by the driver, which knows
//! queue and state conditions. A controller never preempts an in-progress
//! activity.

use fabsim_model::ControlPolicyKind;

use crate::request::Request;

/// Pick the winner among `candidates` (positions into `pending`).
///
/// `expected_time` estimates the request's processing time for the SPT
/// flavors; for `SPT_transport` the driver folds the empty-move distance in.
/// Ties fall back to arrival order, which makes selection fully
/// deterministic.
pub fn select(
    policy: ControlPolicyKind,
    pending: &[Request],
    candidates: &[usize],
    mut expected_time: impl FnMut(&Request) -> f64,
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let winner = match policy {
        ControlPolicyKind::FIFO => candidates
            .iter()
            .copied()
            .min_by_key(|&i| pending[i].seq)?,
        ControlPolicyKind::LIFO => candidates
            .iter()
            .copied()
            .max_by_key(|&i| pending[i].seq)?,
        ControlPolicyKind::SPT | ControlPolicyKind::SPT_transport => {
            let mut best = candidates[0];
            let mut best_time = expected_time(&pending[best]);
            for &i in &candidates[1..] {
                let t = expected_time(&pending[i]);
                if t < best_time || (t == best_time && pending[i].seq < pending[best].seq) {
                    best = i;
                    best_time = t;
                }
            }
            best
        }
    };
    Some(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ProcessIdx, ProductIdx, QueueIdx, ResourceIdx, SourceIdx};
    use crate::request::{RequestKind, SiteRef};

    fn request(seq: u64, process: u32) -> Request {
        Request {
            seq,
            kind: RequestKind::Production,
            product: ProductIdx(seq as u32),
            process: ProcessIdx(process),
            plan_process: Some(ProcessIdx(process)),
            resource: ResourceIdx(0),
            origin_queue: QueueIdx(0),
            origin_site: SiteRef::Source(SourceIdx(0)),
            target: None,
            reservation: None,
            next_process: None,
        }
    }

    #[test]
    fn test_fifo_picks_oldest() {
        let pending = vec![request(5, 0), request(2, 0), request(9, 0)];
        let winner = select(ControlPolicyKind::FIFO, &pending, &[0, 1, 2], |_| 0.0);
        assert_eq!(winner, Some(1));
    }

    #[test]
    fn test_lifo_picks_newest() {
        let pending = vec![request(5, 0), request(2, 0), request(9, 0)];
        let winner = select(ControlPolicyKind::LIFO, &pending, &[0, 1, 2], |_| 0.0);
        assert_eq!(winner, Some(2));
    }

    #[test]
    fn test_spt_picks_shortest_expected_time() {
        let pending = vec![request(1, 0), request(2, 1), request(3, 2)];
        let winner = select(ControlPolicyKind::SPT, &pending, &[0, 1, 2], |r| {
            match r.process {
                ProcessIdx(0) => 3.0,
                ProcessIdx(1) => 1.0,
                _ => 2.0,
            }
        });
        assert_eq!(winner, Some(1));
    }

    #[test]
    fn test_spt_ties_break_fifo() {
        let pending = vec![request(7, 0), request(3, 1)];
        let winner = select(ControlPolicyKind::SPT, &pending, &[0, 1], |_| 1.0);
        assert_eq!(winner, Some(1));
    }

    #[test]
    fn test_selection_ignores_non_candidates() {
        let pending = vec![request(1, 0), request(2, 0)];
        let winner = select(ControlPolicyKind::FIFO, &pending, &[1], |_| 0.0);
        assert_eq!(winner, Some(1));
        assert_eq!(
            select(ControlPolicyKind::FIFO, &pending, &[], |_| 0.0),
            None
        );
    }
}
