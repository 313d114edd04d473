//! Shared test harness: a scriptable in-process gateway, a recording
//! notification sink, and a store wired to both.

// Not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stellar::{
    ApiError, Estado, ListParams, Notifier, NuevaReserva, Page, Reserva, ReservaId, ReservaPatch,
    ReservasGateway, ReservationStore, StoreConfig,
};
use tokio::sync::watch;

pub fn reserva(id: u64) -> Reserva {
    Reserva {
        id: ReservaId(id),
        estado: Estado::Pendiente,
        destino_id: 3,
        nave_id: 7,
        fecha_viaje: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
        fecha_regreso: Some(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()),
        pasajeros: 2,
        precio: 15500.0,
        motivo_cancelacion: None,
        fecha_creacion: Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap(),
        fecha_actualizacion: Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap(),
        is_optimistic: false,
    }
}

#[derive(Default)]
pub struct CallCounts {
    pub list: AtomicUsize,
    pub get: AtomicUsize,
    pub create: AtomicUsize,
    pub mutate: AtomicUsize,
}

/// Scriptable gateway. `data` backs `list`/`get`; queued responses and
/// errors drive the mutation endpoints; per-endpoint delays let tests
/// observe in-flight state.
#[derive(Default)]
pub struct MockGateway {
    pub data: Mutex<Vec<Reserva>>,
    /// Page-number → page contents; used instead of `data` when a request
    /// carries a page parameter and the page is scripted.
    pub pages: Mutex<HashMap<u32, Vec<Reserva>>>,
    pub total: Mutex<u64>,
    pub list_errors: Mutex<VecDeque<ApiError>>,
    /// Scripted responses for `update_status`/`modify`, popped per call.
    pub mutation_responses: Mutex<VecDeque<ReservaPatch>>,
    pub mutation_errors: Mutex<VecDeque<ApiError>>,
    pub get_delay: Mutex<Duration>,
    pub mutation_delay: Mutex<Duration>,
    pub calls: CallCounts,
}

impl MockGateway {
    pub fn with_data(reservas: Vec<Reserva>) -> Arc<Self> {
        let gateway = MockGateway::default();
        *gateway.data.lock().unwrap() = reservas;
        Arc::new(gateway)
    }

    fn default_mutation_response(
        &self,
        estado: Option<Estado>,
        motivo: Option<&str>,
    ) -> ReservaPatch {
        ReservaPatch {
            estado,
            motivo_cancelacion: motivo.map(str::to_owned),
            fecha_actualizacion: Some(Utc::now()),
            ..ReservaPatch::default()
        }
    }

    async fn mutation_outcome(
        &self,
        fallback: ReservaPatch,
    ) -> Result<ReservaPatch, ApiError> {
        // Claim the scripted outcome before sleeping so concurrent calls
        // consume the queues in call order.
        let scripted_error = self.mutation_errors.lock().unwrap().pop_front();
        let scripted_response = self.mutation_responses.lock().unwrap().pop_front();
        let delay = *self.mutation_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        if let Some(err) = scripted_error {
            return Err(err);
        }
        Ok(scripted_response.unwrap_or(fallback))
    }
}

#[async_trait]
impl ReservasGateway for MockGateway {
    async fn list(&self, params: &ListParams) -> Result<Page, ApiError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_errors.lock().unwrap().pop_front() {
            return Err(err);
        }

        let scripted_page = params
            .page
            .and_then(|page| self.pages.lock().unwrap().get(&page).cloned());
        let data = match scripted_page {
            Some(page) => page,
            None => self.data.lock().unwrap().clone(),
        };
        let total = *self.total.lock().unwrap();
        Ok(Page {
            data,
            meta: stellar::model::PageMeta { total },
        })
    }

    async fn get(&self, id: ReservaId) -> Result<Reserva, ApiError> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        let delay = *self.get_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        self.data
            .lock()
            .unwrap()
            .iter()
            .find(|reserva| reserva.id == id)
            .cloned()
            .ok_or(ApiError::NotFound { id })
    }

    async fn create(&self, data: &NuevaReserva) -> Result<Reserva, ApiError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        let mut reservas = self.data.lock().unwrap();
        let next_id = reservas.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let created = Reserva {
            id: ReservaId(next_id),
            estado: Estado::Pendiente,
            destino_id: data.destino_id,
            nave_id: data.nave_id,
            fecha_viaje: data.fecha_viaje,
            fecha_regreso: data.fecha_regreso,
            pasajeros: data.pasajeros,
            precio: data.precio,
            motivo_cancelacion: None,
            fecha_creacion: Utc::now(),
            fecha_actualizacion: Utc::now(),
            is_optimistic: false,
        };
        reservas.push(created.clone());
        Ok(created)
    }

    async fn update_status(
        &self,
        _id: ReservaId,
        estado: Estado,
        motivo: Option<&str>,
    ) -> Result<ReservaPatch, ApiError> {
        self.calls.mutate.fetch_add(1, Ordering::SeqCst);
        let fallback = self.default_mutation_response(Some(estado), motivo);
        self.mutation_outcome(fallback).await
    }

    async fn modify(
        &self,
        _id: ReservaId,
        cambios: &ReservaPatch,
    ) -> Result<ReservaPatch, ApiError> {
        self.calls.mutate.fetch_add(1, Ordering::SeqCst);
        let fallback = ReservaPatch {
            fecha_actualizacion: Some(Utc::now()),
            ..cambios.clone()
        };
        self.mutation_outcome(fallback).await
    }
}

/// Records every notification for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(&'static str, String, String)>>,
}

impl RecordingNotifier {
    fn record(&self, level: &'static str, title: &str, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push((level, title.to_owned(), message.to_owned()));
    }

    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|(l, title, message)| *l == level && (title.contains(needle) || message.contains(needle)))
    }

    pub fn count(&self, level: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|(l, _, _)| *l == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, title: &str, message: &str) {
        self.record("success", title, message);
    }

    fn error(&self, title: &str, message: &str) {
        self.record("error", title, message);
    }

    fn info(&self, title: &str, message: &str) {
        self.record("info", title, message);
    }
}

pub struct Harness {
    pub store: ReservationStore,
    pub gateway: Arc<MockGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub auth_tx: watch::Sender<bool>,
}

pub fn harness_with(config: StoreConfig, reservas: Vec<Reserva>) -> Harness {
    let gateway = MockGateway::with_data(reservas);
    let notifier = Arc::new(RecordingNotifier::default());
    let (auth_tx, auth_rx) = watch::channel(true);
    let store = ReservationStore::new(config, gateway.clone(), notifier.clone(), auth_rx);
    Harness {
        store,
        gateway,
        notifier,
        auth_tx,
    }
}

pub fn harness(reservas: Vec<Reserva>) -> Harness {
    harness_with(StoreConfig::default(), reservas)
}

/// Poll `predicate` until it holds or the timeout elapses.
pub async fn wait_for<F>(timeout: Duration, mut predicate: F) -> bool
where
    F: AsyncFnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
