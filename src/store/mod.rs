//! Reservation store: the composition root.
//!
//! Owns the canonical reservation collection and composes the cache, the
//! gateway, the mutation ledger, the realtime listener and the janitor into
//! the public operations. Exactly one authoritative copy of each
//! reservation lives in the collection; reads materialize it with any
//! unconfirmed optimistic patch on top.
//!
//! All shared state sits in [`StoreInner`] behind a single `RwLock`, and no
//! lock is held across a network await: a mutation takes the lock to record
//! its optimistic patch, releases it for the gateway call, and re-acquires
//! it to commit or roll back. Resolution is keyed by operation id, so a
//! stale response from a superseded mutation can never clobber newer state.

pub mod filter;
mod janitor;
pub mod mutation;

use crate::api::errors::ApiError;
use crate::api::ReservasGateway;
use crate::cache::{BoundedTtlCache, CacheMetrics};
use crate::config::StoreConfig;
use crate::model::{
    Estado, ListParams, NuevaReserva, Reserva, ReservaEvent, ReservaId, ReservaPatch,
};
use crate::notify::Notifier;
use crate::realtime::{RealtimeChannel, RESERVA_ACTUALIZADA};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use filter::{Filters, Pagination};
use indexmap::IndexMap;
use mutation::{MutationLedger, OpKind};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use ulid::Ulid;

const LOAD_ERROR: &str = "No se pudieron cargar las reservas. Por favor, intenta nuevamente.";
const LOAD_ONE_ERROR: &str =
    "No se pudo cargar la información de la reserva. Por favor, intenta nuevamente.";
const CREATE_ERROR: &str = "No se pudo crear la reserva. Por favor, intenta nuevamente.";
const CANCEL_ERROR: &str = "No se pudo cancelar la reserva. Por favor, intenta nuevamente.";
const MODIFY_ERROR: &str = "No se pudo modificar la reserva. Por favor, intenta nuevamente.";

fn cache_key(id: ReservaId) -> String {
    format!("reserva_{id}")
}

/// Result of a paginated load, echoing the request's page and limit.
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    pub items: Vec<Reserva>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Everything the store mutates, behind one lock.
pub(crate) struct StoreInner {
    pub(crate) reservas: IndexMap<ReservaId, Reserva>,
    pub(crate) current: Option<ReservaId>,
    pub(crate) ledger: MutationLedger,
    pub(crate) cache: BoundedTtlCache<Reserva>,
    pub(crate) filters: Filters,
    pub(crate) pagination: Pagination,
    pub(crate) last_error: Option<String>,
}

impl StoreInner {
    pub(crate) fn new(config: &StoreConfig) -> Self {
        Self {
            reservas: IndexMap::new(),
            current: None,
            ledger: MutationLedger::new(),
            cache: BoundedTtlCache::new(config.cache_ttl(), config.cache_max_entries),
            filters: Filters::default(),
            pagination: Pagination {
                per_page: config.page_size,
                ..Pagination::default()
            },
            last_error: None,
        }
    }

    /// The canonical record with any unconfirmed patch merged on top.
    fn materialize(&self, reserva: &Reserva) -> Reserva {
        let mut out = reserva.clone();
        if let Some(patch) = self.ledger.patch_for(reserva.id) {
            patch.apply_to(&mut out);
            out.is_optimistic = true;
        }
        out
    }

    /// Everything tied to the signed-in session. Filters and pagination are
    /// presentation state and survive.
    fn clear_session(&mut self) {
        self.reservas.clear();
        self.current = None;
        self.ledger.clear();
        self.cache.clear();
        self.last_error = None;
    }
}

/// Client-side reservation state engine.
///
/// Cheap to clone (all shared internals). Owns background tasks — the
/// janitor, the auth watcher, and any attached realtime listener — which
/// all stop when [`ReservationStore::shutdown`] is called; call it when
/// discarding the store so no timer outlives its owner.
#[derive(Clone)]
pub struct ReservationStore {
    gateway: Arc<dyn ReservasGateway>,
    notifier: Arc<dyn Notifier>,
    config: StoreConfig,
    inner: Arc<RwLock<StoreInner>>,
    auth: watch::Receiver<bool>,
    /// Per-id singleflight: the receiver resolves when the owning load ends.
    inflight: Arc<DashMap<ReservaId, watch::Receiver<()>>>,
    cancel_token: CancellationToken,
}

impl ReservationStore {
    pub fn new(
        config: StoreConfig,
        gateway: Arc<dyn ReservasGateway>,
        notifier: Arc<dyn Notifier>,
        auth: watch::Receiver<bool>,
    ) -> Self {
        let inner = Arc::new(RwLock::new(StoreInner::new(&config)));
        let cancel_token = CancellationToken::new();

        janitor::spawn(
            inner.clone(),
            config.janitor_interval(),
            config.orphan_age(),
            cancel_token.clone(),
        );

        let store = Self {
            gateway,
            notifier,
            config,
            inner,
            auth,
            inflight: Arc::new(DashMap::new()),
            cancel_token,
        };
        store.spawn_auth_watcher();
        store
    }

    /// Stop the janitor and every listener task. The store's data remains
    /// readable afterwards; only background work ends.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_authenticated(&self) -> bool {
        *self.auth.borrow()
    }

    // ---- loads ------------------------------------------------------------

    /// Return the in-memory collection, fetching it first only when empty
    /// or when `force` is set. Unauthenticated calls yield an empty list.
    pub async fn load_all(&self, force: bool) -> Result<Vec<Reserva>, ApiError> {
        if !self.is_authenticated() {
            return Ok(Vec::new());
        }

        {
            let inner = self.inner.read().await;
            if !inner.reservas.is_empty() && !force {
                return Ok(inner
                    .reservas
                    .values()
                    .map(|reserva| inner.materialize(reserva))
                    .collect());
            }
        }

        match self.gateway.list(&ListParams::default()).await {
            Ok(page) => {
                let mut inner = self.inner.write().await;
                inner.last_error = None;
                inner.reservas = page
                    .data
                    .iter()
                    .map(|reserva| (reserva.id, reserva.clone()))
                    .collect();
                debug!(count = page.data.len(), "reservations loaded");
                Ok(page.data)
            }
            Err(err) => Err(self.load_failed(err, LOAD_ERROR).await),
        }
    }

    /// Load one page. Page 1 replaces the collection; later pages append
    /// only reservations not already present, so overlapping pages never
    /// produce duplicates.
    pub async fn load_page(&self, params: ListParams) -> Result<PageResult, ApiError> {
        if !self.is_authenticated() {
            return Ok(PageResult::default());
        }

        let page_number = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(self.config.page_size);
        let params = ListParams {
            page: Some(page_number),
            limit: Some(limit),
            ..params
        };

        match self.gateway.list(&params).await {
            Ok(page) => {
                let mut inner = self.inner.write().await;
                inner.last_error = None;

                if page_number == 1 {
                    inner.reservas = page
                        .data
                        .iter()
                        .map(|reserva| (reserva.id, reserva.clone()))
                        .collect();
                } else {
                    for reserva in &page.data {
                        if !inner.reservas.contains_key(&reserva.id) {
                            inner.reservas.insert(reserva.id, reserva.clone());
                        }
                    }
                }

                let total = if page.meta.total > 0 {
                    page.meta.total
                } else {
                    inner.reservas.len() as u64
                };
                inner.pagination = Pagination {
                    page: page_number,
                    per_page: limit,
                    total,
                };

                Ok(PageResult {
                    items: page.data,
                    total,
                    page: page_number,
                    limit,
                })
            }
            Err(err) => Err(self.load_failed(err, LOAD_ERROR).await),
        }
    }

    /// Load a single reservation: the collection first (with any optimistic
    /// patch applied), then the cache, then the gateway. Concurrent calls
    /// for an id already being fetched wait for that fetch instead of
    /// issuing a duplicate request.
    pub async fn load_one(&self, id: ReservaId) -> Result<Option<Reserva>, ApiError> {
        if id.0 == 0 {
            warn!("load_one called without a valid id");
            return Ok(None);
        }

        loop {
            {
                let mut inner = self.inner.write().await;
                let materialized = inner.reservas.get(&id).map(|r| inner.materialize(r));
                if let Some(materialized) = materialized {
                    inner.cache.set(cache_key(id), materialized.clone());
                    inner.current = Some(id);
                    return Ok(Some(materialized));
                }
                if let Some(cached) = inner.cache.get(&cache_key(id)) {
                    inner.current = Some(id);
                    return Ok(Some(cached));
                }
            }

            enum Claim {
                Owner(watch::Sender<()>),
                Waiter(watch::Receiver<()>),
            }

            let claim = match self.inflight.entry(id) {
                dashmap::mapref::entry::Entry::Occupied(entry) => Claim::Waiter(entry.get().clone()),
                dashmap::mapref::entry::Entry::Vacant(vacant) => {
                    let (tx, rx) = watch::channel(());
                    vacant.insert(rx);
                    Claim::Owner(tx)
                }
            };

            match claim {
                Claim::Waiter(mut rx) => {
                    // Another task owns this fetch; wait for it to finish,
                    // then re-check local state.
                    let _ = rx.changed().await;
                }
                Claim::Owner(tx) => {
                    let result = self.fetch_one(id).await;
                    self.inflight.remove(&id);
                    let _ = tx.send(());
                    return result;
                }
            }
        }
    }

    async fn fetch_one(&self, id: ReservaId) -> Result<Option<Reserva>, ApiError> {
        debug!(%id, "fetching reservation");
        match self.gateway.get(id).await {
            Ok(reserva) => {
                let mut inner = self.inner.write().await;
                inner.last_error = None;
                inner.reservas.insert(id, reserva.clone());
                inner.cache.set(cache_key(id), reserva.clone());
                inner.current = Some(id);
                Ok(Some(reserva))
            }
            Err(err) => Err(self.load_failed(err, LOAD_ONE_ERROR).await),
        }
    }

    /// Shared load error path: record the store-level error, notify unless
    /// the request was cancelled, hand the error back.
    async fn load_failed(&self, err: ApiError, message: &str) -> ApiError {
        {
            let mut inner = self.inner.write().await;
            inner.last_error = Some(message.to_owned());
        }
        if !err.is_cancelled() {
            self.notifier.error("Error", message);
        }
        error!(error = %err, "load failed");
        err
    }

    // ---- mutations --------------------------------------------------------

    /// Create a reservation and prepend it to the collection.
    pub async fn create(&self, data: NuevaReserva) -> Result<Reserva, ApiError> {
        match self.gateway.create(&data).await {
            Ok(reserva) => {
                {
                    let mut inner = self.inner.write().await;
                    inner.reservas.shift_insert(0, reserva.id, reserva.clone());
                    inner.cache.set(cache_key(reserva.id), reserva.clone());
                }
                debug!(id = %reserva.id, "reservation created");
                self.notifier
                    .success("Reserva creada", "Tu reserva ha sido creada correctamente");
                Ok(reserva)
            }
            Err(err) => {
                error!(error = %err, "failed to create reservation");
                self.notifier.error("Error", &err.user_message(CREATE_ERROR));
                Err(err)
            }
        }
    }

    /// Cancel optimistically: the status flips locally at once and either
    /// commits with the server's answer or rolls back to the snapshot.
    pub async fn cancel(&self, id: ReservaId, motivo: &str) -> Result<Option<Reserva>, ApiError> {
        if id.0 == 0 {
            warn!("cancel called without a valid id");
            return Ok(None);
        }
        self.mutate(
            id,
            OpKind::Cancelar,
            ReservaPatch::cancellation(motivo),
            ("Reserva cancelada", "Tu reserva ha sido cancelada correctamente"),
            CANCEL_ERROR,
        )
        .await
    }

    /// Modify optimistically, same lifecycle as [`ReservationStore::cancel`].
    pub async fn modify(
        &self,
        id: ReservaId,
        cambios: ReservaPatch,
    ) -> Result<Option<Reserva>, ApiError> {
        if id.0 == 0 {
            warn!("modify called without a valid id");
            return Ok(None);
        }
        if cambios.is_empty() {
            warn!(%id, "modify called without changes");
            return Ok(None);
        }
        self.mutate(
            id,
            OpKind::Modificar,
            cambios,
            ("Reserva modificada", "Tu reserva ha sido modificada correctamente"),
            MODIFY_ERROR,
        )
        .await
    }

    async fn mutate(
        &self,
        id: ReservaId,
        kind: OpKind,
        patch: ReservaPatch,
        success: (&str, &str),
        fallback: &str,
    ) -> Result<Option<Reserva>, ApiError> {
        let op_id = {
            let mut inner = self.inner.write().await;
            let snapshot = inner.reservas.get(&id).map(|r| inner.materialize(r));
            let Some(mut snapshot) = snapshot else {
                warn!(%id, kind = kind.as_str(), "reservation not found; mutation rejected");
                return Ok(None);
            };
            snapshot.is_optimistic = false;
            inner.ledger.begin(id, kind, snapshot, patch.clone())
        };
        debug!(%id, op = %op_id, kind = kind.as_str(), "optimistic mutation started");

        let result = match kind {
            OpKind::Cancelar => {
                self.gateway
                    .update_status(id, Estado::Cancelada, patch.motivo_cancelacion.as_deref())
                    .await
            }
            OpKind::Modificar => self.gateway.modify(id, &patch).await,
        };

        match result {
            Ok(server) => Ok(self.commit(op_id, server, success).await),
            Err(err) => {
                self.rollback(op_id, &err, fallback).await;
                Err(err)
            }
        }
    }

    /// Apply the server's reported fields to the canonical record and clear
    /// the operation's bookkeeping. Fields the server did not report keep
    /// their pre-mutation values. A superseded operation is a no-op.
    async fn commit(
        &self,
        op_id: Ulid,
        server: ReservaPatch,
        success: (&str, &str),
    ) -> Option<Reserva> {
        let committed = {
            let mut inner = self.inner.write().await;
            let Some(op) = inner.ledger.take(op_id) else {
                debug!(op = %op_id, "stale mutation result ignored");
                return None;
            };
            let id = op.reserva_id;
            match inner.reservas.get_mut(&id) {
                Some(record) => {
                    server.apply_to(record);
                    let updated = record.clone();
                    inner.cache.set(cache_key(id), updated.clone());
                    Some(updated)
                }
                None => None,
            }
        };

        if let Some(ref reserva) = committed {
            debug!(id = %reserva.id, op = %op_id, "optimistic mutation committed");
            self.notifier.success(success.0, success.1);
        }
        committed
    }

    /// Restore the pre-mutation snapshot and surface the failure. A
    /// superseded operation is a no-op.
    async fn rollback(&self, op_id: Ulid, err: &ApiError, fallback: &str) {
        let id = {
            let mut inner = self.inner.write().await;
            let Some(op) = inner.ledger.take(op_id) else {
                debug!(op = %op_id, "stale mutation failure ignored");
                return;
            };
            let id = op.reserva_id;
            if inner.reservas.contains_key(&id) {
                let mut snapshot = op.snapshot;
                snapshot.is_optimistic = false;
                inner.reservas.insert(id, snapshot);
            }
            id
        };

        error!(%id, op = %op_id, error = %err, "mutation failed; rolled back");
        self.notifier.error("Error", &err.user_message(fallback));
    }

    // ---- synchronization --------------------------------------------------

    /// Full diff-sync against the server's list: upsert new and changed
    /// reservations, drop the ones the server no longer returns, keep the
    /// cache coherent, and notify with counts. Returns whether anything
    /// changed. Failures are swallowed (logged) — this runs opportunistically.
    pub async fn synchronize(&self) -> Result<bool, ApiError> {
        if !self.is_authenticated() {
            return Ok(false);
        }

        let page = match self.gateway.list(&ListParams::default()).await {
            Ok(page) => page,
            Err(err) => {
                error!(error = %err, "synchronization failed");
                return Ok(false);
            }
        };

        let (added, updated, removed) = {
            let mut inner = self.inner.write().await;

            let server_ids: std::collections::HashSet<ReservaId> =
                page.data.iter().map(|reserva| reserva.id).collect();
            let removed_ids: Vec<ReservaId> = inner
                .reservas
                .keys()
                .filter(|id| !server_ids.contains(id))
                .copied()
                .collect();

            let mut added = 0usize;
            let mut updated = 0usize;
            for reserva in &page.data {
                match inner.reservas.get_mut(&reserva.id) {
                    Some(local) => {
                        // Only meaningful changes count as updates.
                        if local.estado != reserva.estado
                            || local.fecha_actualizacion != reserva.fecha_actualizacion
                        {
                            *local = reserva.clone();
                            inner.cache.set(cache_key(reserva.id), reserva.clone());
                            updated += 1;
                        }
                    }
                    None => {
                        inner.reservas.insert(reserva.id, reserva.clone());
                        inner.cache.set(cache_key(reserva.id), reserva.clone());
                        added += 1;
                    }
                }
            }

            for id in &removed_ids {
                inner.reservas.shift_remove(id);
                inner.cache.delete(&cache_key(*id));
            }

            (added, updated, removed_ids.len())
        };

        if added > 0 {
            self.notifier.info(
                "Nuevas reservas",
                &format!("Se han añadido {added} nuevas reservas"),
            );
        }
        if updated > 0 {
            self.notifier.info(
                "Reservas actualizadas",
                &format!("Se han actualizado {updated} reservas"),
            );
        }
        if added > 0 || updated > 0 || removed > 0 {
            debug!(added, updated, removed, "synchronized with server");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ---- realtime ---------------------------------------------------------

    /// Start consuming `reserva_actualizada` events from `channel`. The
    /// listener re-subscribes on every reconnect edge and stops on shutdown.
    pub fn attach_realtime(&self, channel: Arc<dyn RealtimeChannel>) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut connected = channel.connected();
            let mut events = channel.subscribe(RESERVA_ACTUALIZADA);
            loop {
                tokio::select! {
                    _ = store.cancel_token.cancelled() => break,
                    changed = connected.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *connected.borrow_and_update() {
                            // The pre-disconnect receiver may be closed or
                            // have lagged arbitrarily; start clean.
                            events = channel.subscribe(RESERVA_ACTUALIZADA);
                            debug!("realtime channel reconnected; resubscribed");
                        }
                    }
                    event = events.recv() => match event {
                        Ok(payload) => store.apply_remote_update(payload).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "realtime listener lagged behind");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            if connected.changed().await.is_err() {
                                break;
                            }
                            if *connected.borrow_and_update() {
                                events = channel.subscribe(RESERVA_ACTUALIZADA);
                            }
                        }
                    },
                }
            }
        });
    }

    /// Merge a pushed update into the canonical record (last write wins at
    /// field level), refresh the cache entry if present, notify the user.
    async fn apply_remote_update(&self, payload: serde_json::Value) {
        let event: ReservaEvent = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "discarding malformed realtime update");
                return;
            }
        };

        let id = event.id;
        {
            let mut inner = self.inner.write().await;
            if let Some(record) = inner.reservas.get_mut(&id) {
                event.cambios.apply_to(record);
            }
            let key = cache_key(id);
            if let Some(mut cached) = inner.cache.peek(&key).cloned() {
                event.cambios.apply_to(&mut cached);
                inner.cache.set(key, cached);
            }
        }
        debug!(%id, "applied pushed update");
        self.notifier.info(
            "Reserva actualizada",
            &format!("La reserva #{id} ha sido actualizada"),
        );
    }

    // ---- auth -------------------------------------------------------------

    fn spawn_auth_watcher(&self) {
        let store = self.clone();
        let mut auth = self.auth.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = store.cancel_token.cancelled() => break,
                    changed = auth.changed() => {
                        if changed.is_err() {
                            break; // auth source gone; nothing left to watch
                        }
                        let authenticated = *auth.borrow_and_update();
                        if authenticated {
                            debug!("signed in; reloading reservations");
                            if let Err(err) = store.load_all(true).await {
                                warn!(error = %err, "reload after sign-in failed");
                            }
                        } else {
                            store.inner.write().await.clear_session();
                            debug!("signed out; local reservation state cleared");
                        }
                    }
                }
            }
        });
    }

    // ---- derived views ----------------------------------------------------

    /// Materialized view of a single reservation.
    pub async fn get(&self, id: ReservaId) -> Option<Reserva> {
        let inner = self.inner.read().await;
        inner.reservas.get(&id).map(|reserva| inner.materialize(reserva))
    }

    /// The reservation most recently loaded via [`ReservationStore::load_one`].
    pub async fn current(&self) -> Option<Reserva> {
        let inner = self.inner.read().await;
        let id = inner.current?;
        inner.reservas.get(&id).map(|reserva| inner.materialize(reserva))
    }

    /// The whole collection, materialized, in insertion order.
    pub async fn all(&self) -> Vec<Reserva> {
        let inner = self.inner.read().await;
        inner
            .reservas
            .values()
            .map(|reserva| inner.materialize(reserva))
            .collect()
    }

    /// The collection with the active filters applied (see
    /// [`Filters::matches`] for the predicate order).
    pub async fn filtered(&self) -> Vec<Reserva> {
        let inner = self.inner.read().await;
        inner
            .reservas
            .values()
            .map(|reserva| inner.materialize(reserva))
            .filter(|reserva| inner.filters.matches(reserva))
            .collect()
    }

    /// The current page of the filtered collection.
    pub async fn paginated(&self) -> Vec<Reserva> {
        let inner = self.inner.read().await;
        let filtered: Vec<Reserva> = inner
            .reservas
            .values()
            .map(|reserva| inner.materialize(reserva))
            .filter(|reserva| inner.filters.matches(reserva))
            .collect();
        let (start, end) = inner.pagination.slice_bounds(filtered.len());
        filtered[start..end].to_vec()
    }

    pub async fn total_pages(&self) -> u32 {
        let inner = self.inner.read().await;
        let count = inner
            .reservas
            .values()
            .map(|reserva| inner.materialize(reserva))
            .filter(|reserva| inner.filters.matches(reserva))
            .count();
        inner.pagination.total_pages(count)
    }

    pub async fn by_status(&self, estado: Estado) -> Vec<Reserva> {
        let inner = self.inner.read().await;
        inner
            .reservas
            .values()
            .map(|reserva| inner.materialize(reserva))
            .filter(|reserva| reserva.estado == estado)
            .collect()
    }

    pub async fn pending(&self) -> Vec<Reserva> {
        self.by_status(Estado::Pendiente).await
    }

    pub async fn confirmed(&self) -> Vec<Reserva> {
        self.by_status(Estado::Confirmada).await
    }

    pub async fn cancelled(&self) -> Vec<Reserva> {
        self.by_status(Estado::Cancelada).await
    }

    pub async fn completed(&self) -> Vec<Reserva> {
        self.by_status(Estado::Completada).await
    }

    /// The earliest-dated non-cancelled reservation whose travel date is
    /// today or later.
    pub async fn next_upcoming(&self) -> Option<Reserva> {
        self.next_upcoming_from(Utc::now().date_naive()).await
    }

    pub async fn next_upcoming_from(&self, today: NaiveDate) -> Option<Reserva> {
        let inner = self.inner.read().await;
        inner
            .reservas
            .values()
            .map(|reserva| inner.materialize(reserva))
            .filter(|reserva| reserva.estado != Estado::Cancelada && reserva.fecha_viaje >= today)
            .min_by_key(|reserva| reserva.fecha_viaje)
    }

    // ---- filters, pagination, cache control --------------------------------

    /// Replace the active filters and reset to page 1.
    pub async fn set_filters(&self, filters: Filters) {
        let mut inner = self.inner.write().await;
        inner.filters = filters;
        inner.pagination.page = 1;
    }

    pub async fn clear_filters(&self) {
        self.set_filters(Filters::default()).await;
    }

    pub async fn set_page(&self, page: u32) {
        let mut inner = self.inner.write().await;
        inner.pagination.page = page.max(1);
    }

    pub async fn filters(&self) -> Filters {
        self.inner.read().await.filters.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.inner.read().await.pagination
    }

    pub async fn cache_metrics(&self) -> CacheMetrics {
        self.inner.read().await.cache.metrics()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    /// Drop the cache entry for one reservation.
    pub async fn invalidate(&self, id: ReservaId) {
        self.inner.write().await.cache.delete(&cache_key(id));
    }

    pub async fn clear_cache(&self) {
        self.inner.write().await.cache.clear();
    }
}
