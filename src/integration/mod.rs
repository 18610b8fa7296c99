//! External Collaborators
//!
//! The venue core trusts its host for three things: a current time, a
//! custody ledger that moves real funds, and a best-effort event sink
//! for off-chain observers. Each is a trait seam with an in-process
//! implementation suitable for tests and embedded hosts.
//!
//! Caller identity is the fourth collaborator concern; it arrives as a
//! plain authenticated string on every venue operation, so it needs no
//! trait of its own.

pub mod clock;
pub mod custody;
pub mod events;

pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::{Custody, CustodyError, InMemoryCustody, PaymentId, TransferKind, TransferRecord};
pub use events::{EventSink, RecordingSink, TracingSink, VenueEvent};
