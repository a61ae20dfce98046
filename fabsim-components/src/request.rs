//! Requests: orders for one process step on one product at one resource.
//!
//! The router creates transport requests after reserving the target input
//! slot; the driver turns a completed transport into a production request at
//! the target. Controllers consume requests from their pending lists.

use crate::ids::{ProcessIdx, ProductIdx, QueueIdx, ResourceIdx, SinkIdx, SourceIdx};
use crate::queue::ReservationId;

/// Where a transported product is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef {
    ResourceInput {
        resource: ResourceIdx,
        queue: QueueIdx,
    },
    SinkInput {
        sink: SinkIdx,
        queue: QueueIdx,
    },
}

impl TargetRef {
    pub fn queue(&self) -> QueueIdx {
        match self {
            TargetRef::ResourceInput { queue, .. } | TargetRef::SinkInput { queue, .. } => *queue,
        }
    }
}

/// A site a product can physically be at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteRef {
    Source(SourceIdx),
    Resource(ResourceIdx),
    Sink(SinkIdx),
    /// Aboard a transport resource.
    Transport(ResourceIdx),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Production,
    Transport,
}

/// An order to perform one process.
#[derive(Debug, Clone)]
pub struct Request {
    /// Global arrival counter; the FIFO/LIFO tie-break.
    pub seq: u64,
    pub kind: RequestKind,
    pub product: ProductIdx,
    /// The concrete process the executing resource will run.
    pub process: ProcessIdx,
    /// The plan entry this request fulfills (differs from `process` for
    /// capability-matched steps; `None` for moves to a sink).
    pub plan_process: Option<ProcessIdx>,
    pub resource: ResourceIdx,
    /// Queue the product currently sits in.
    pub origin_queue: QueueIdx,
    /// Site the product currently sits at (pickup coordinates for
    /// transports).
    pub origin_site: SiteRef,
    /// Transport only: destination and the input-slot promise made by the
    /// router.
    pub target: Option<TargetRef>,
    pub reservation: Option<ReservationId>,
    /// Transport only: the process to request at the target on arrival.
    pub next_process: Option<ProcessIdx>,
}

impl Request {
    pub fn is_transport(&self) -> bool {
        self.kind == RequestKind::Transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_queue_accessor() {
        let target = TargetRef::ResourceInput {
            resource: ResourceIdx(1),
            queue: QueueIdx(4),
        };
        assert_eq!(target.queue(), QueueIdx(4));

        let sink = TargetRef::SinkInput {
            sink: SinkIdx(0),
            queue: QueueIdx(7),
        };
        assert_eq!(sink.queue(), QueueIdx(7));
    }
}
