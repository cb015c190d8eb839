//! Terminal application layer.
//!
//! [`PosSession`] wires the catalog, directories, and register together and
//! owns the simulated-latency timers (barcode lookup, payment settlement,
//! completion banner). Time is injected through the [`Clock`] trait so tests
//! advance virtual time instead of sleeping.

pub mod clock;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock, TimerId, TimerKind, TimerQueue};
pub use session::{
    PosSession, SessionOutcome, BANNER_DELAY_MS, PAYMENT_DELAY_MS, SCAN_DELAY_MS,
};
