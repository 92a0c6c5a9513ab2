//! The event relay: UDP ingestion on one side, viewer fan-out on the other.

mod ingester;
mod registry;

pub use ingester::EventIngester;
pub use registry::{ClientRegistry, ViewerGuard};
