//! stellar — client-side reservation state engine for the Stellar booking API.
//!
//! The backend, auth subsystem, WebSocket transport and UI are external
//! collaborators; this crate is the in-memory state layer between them:
//!
//! - [`store::ReservationStore`] — the composition root: loads, optimistic
//!   cancel/modify with commit-or-rollback, filtered/paginated views,
//!   full diff synchronization.
//! - [`cache::BoundedTtlCache`] — TTL-bounded, size-bounded snapshot cache
//!   with oldest-first eviction.
//! - [`api::ReservasApi`] — the HTTP gateway, normalizing every failure
//!   into [`api::errors::ApiError`].
//! - [`realtime`] — the subscription seam for server-pushed updates.
//! - A janitor task sweeps the cache and purges orphaned pending
//!   operations on a fixed cadence until the store is shut down.
//!
//! State changes are optimistic: a cancel or modify is visible immediately,
//! tracked in a pending-operation ledger, and later either committed with
//! the server's authoritative fields or rolled back to the pre-mutation
//! snapshot. Resolutions are keyed by operation id, so when mutations on
//! the same reservation overlap, only the latest one can touch state.

pub mod api;
pub mod cache;
pub mod config;
pub mod model;
pub mod notify;
pub mod realtime;
pub mod store;

pub use api::errors::ApiError;
pub use api::{ReservasApi, ReservasGateway};
pub use cache::{BoundedTtlCache, CacheMetrics};
pub use config::StoreConfig;
pub use model::{
    Estado, ListParams, NuevaReserva, Page, Reserva, ReservaEvent, ReservaId, ReservaPatch,
};
pub use notify::{Notifier, TracingNotifier};
pub use realtime::{LocalChannel, RealtimeChannel, RESERVA_ACTUALIZADA};
pub use store::filter::{Filters, Pagination};
pub use store::{PageResult, ReservationStore};
