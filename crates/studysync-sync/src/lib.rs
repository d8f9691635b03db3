//! Studysync Sync - Reconciliation and lifecycle monitoring
//!
//! Two components live here:
//!
//! - [`Reconciler`] drains the pending-operation queue against the live
//!   backend: strict FIFO, per-item removal on confirmed success, per-item
//!   skip on failure, one run at a time with coalesced triggers.
//! - [`LifecycleMonitor`] owns the process-wide lifecycle state machine
//!   (`Initializing → Ready(Online ⇄ Offline)`), consumes platform events
//!   from a single channel, and drives the reconciler on reconnect.
//!
//! ## Flow
//!
//! ```text
//! connectivity probe ──→ mpsc::Receiver ──→ LifecycleMonitor ──→ Reconciler::trigger()
//!                                                │                      │
//!                                          status snapshot        drain() against
//!                                                                 IBackendGateway
//! ```

pub mod monitor;
pub mod reconciler;

pub use monitor::{LifecycleMonitor, StatusSnapshot};
pub use reconciler::{DrainReport, Reconciler};
