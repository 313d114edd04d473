//! End-to-end behavior of the optimistic mutation engine: speculative local
//! state, commit merges, rollback, supersession, and reconciliation races.

mod common;

use common::{harness, reserva, wait_for};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stellar::{ApiError, Estado, LocalChannel, ReservaId, ReservaPatch, RESERVA_ACTUALIZADA};

#[tokio::test]
async fn cancel_shows_immediately_then_commits() {
    let h = harness(vec![reserva(42)]);
    h.store.load_all(false).await.unwrap();

    *h.gateway.mutation_delay.lock().unwrap() = Duration::from_millis(80);
    h.gateway
        .mutation_responses
        .lock()
        .unwrap()
        .push_back(ReservaPatch {
            estado: Some(Estado::Cancelada),
            motivo_cancelacion: Some("change of plans".into()),
            ..ReservaPatch::default()
        });

    let store = h.store.clone();
    let cancel_task =
        tokio::spawn(async move { store.cancel(ReservaId(42), "change of plans").await });

    // While the gateway call is in flight, the view already shows the
    // speculative state.
    let optimistic_visible = wait_for(Duration::from_millis(60), async || {
        h.store
            .get(ReservaId(42))
            .await
            .is_some_and(|r| r.estado == Estado::Cancelada && r.is_optimistic)
    })
    .await;
    assert!(optimistic_visible, "optimistic state never became visible");

    let committed = cancel_task.await.unwrap().unwrap().unwrap();
    assert_eq!(committed.estado, Estado::Cancelada);
    assert_eq!(committed.motivo_cancelacion.as_deref(), Some("change of plans"));
    assert!(!committed.is_optimistic);

    let final_state = h.store.get(ReservaId(42)).await.unwrap();
    assert_eq!(final_state, committed);
    assert!(h.notifier.contains("success", "Reserva cancelada"));

    h.store.shutdown();
}

#[tokio::test]
async fn failed_cancel_rolls_back_to_snapshot() {
    let h = harness(vec![reserva(42)]);
    h.store.load_all(false).await.unwrap();

    let before = h.store.get(ReservaId(42)).await.unwrap();
    h.gateway
        .mutation_errors
        .lock()
        .unwrap()
        .push_back(ApiError::Server {
            status: 500,
            message: Some("Network error".into()),
        });

    let result = h.store.cancel(ReservaId(42), "change of plans").await;
    assert!(result.is_err());

    let after = h.store.get(ReservaId(42)).await.unwrap();
    assert_eq!(after, before, "rollback must restore the exact snapshot");
    assert_eq!(after.estado, Estado::Pendiente);
    assert!(!after.is_optimistic);

    // The server-supplied message wins over the generic fallback.
    assert!(h.notifier.contains("error", "Network error"));
    assert_eq!(h.notifier.count("success"), 0);

    h.store.shutdown();
}

#[tokio::test]
async fn commit_merges_server_fields_over_local_values() {
    let h = harness(vec![reserva(10)]);
    h.store.load_all(false).await.unwrap();

    let server_ts = Utc.with_ymd_and_hms(2026, 8, 5, 16, 0, 0).unwrap();
    h.gateway
        .mutation_responses
        .lock()
        .unwrap()
        .push_back(ReservaPatch {
            pasajeros: Some(4),
            fecha_actualizacion: Some(server_ts),
            ..ReservaPatch::default()
        });

    // Ask for 4 passengers and a price change; the server only reports the
    // passenger count back.
    let result = h
        .store
        .modify(
            ReservaId(10),
            ReservaPatch {
                pasajeros: Some(4),
                precio: Some(99000.0),
                ..ReservaPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    // Server-specified fields win; everything else keeps its pre-mutation
    // value, including the price the server did not acknowledge.
    assert_eq!(result.pasajeros, 4);
    assert_eq!(result.fecha_actualizacion, server_ts);
    assert_eq!(result.precio, reserva(10).precio);
    assert!(!result.is_optimistic);

    h.store.shutdown();
}

#[tokio::test]
async fn stale_resolution_cannot_clobber_newer_mutation() {
    let h = harness(vec![reserva(7)]);
    h.store.load_all(false).await.unwrap();

    *h.gateway.mutation_delay.lock().unwrap() = Duration::from_millis(80);
    {
        let mut responses = h.gateway.mutation_responses.lock().unwrap();
        responses.push_back(ReservaPatch {
            pasajeros: Some(3),
            ..ReservaPatch::default()
        });
        responses.push_back(ReservaPatch {
            pasajeros: Some(5),
            ..ReservaPatch::default()
        });
    }

    let store = h.store.clone();
    let first = tokio::spawn(async move {
        store
            .modify(
                ReservaId(7),
                ReservaPatch {
                    pasajeros: Some(3),
                    ..ReservaPatch::default()
                },
            )
            .await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;

    let store = h.store.clone();
    let second = tokio::spawn(async move {
        store
            .modify(
                ReservaId(7),
                ReservaPatch {
                    pasajeros: Some(5),
                    ..ReservaPatch::default()
                },
            )
            .await
    });

    // The superseded first attempt resolves to a no-op.
    let first_result = first.await.unwrap().unwrap();
    assert!(first_result.is_none(), "stale commit must not apply");

    let second_result = second.await.unwrap().unwrap().unwrap();
    assert_eq!(second_result.pasajeros, 5);

    let final_state = h.store.get(ReservaId(7)).await.unwrap();
    assert_eq!(final_state.pasajeros, 5);
    assert!(!final_state.is_optimistic);

    h.store.shutdown();
}

#[tokio::test]
async fn pushed_update_and_optimistic_cancel_merge_without_loss() {
    let h = harness(vec![reserva(7)]);
    h.store.load_all(false).await.unwrap();

    let channel = Arc::new(LocalChannel::new());
    h.store.attach_realtime(channel.clone());
    // Give the listener a beat to subscribe.
    tokio::time::sleep(Duration::from_millis(20)).await;

    *h.gateway.mutation_delay.lock().unwrap() = Duration::from_millis(80);
    h.gateway
        .mutation_responses
        .lock()
        .unwrap()
        .push_back(ReservaPatch {
            estado: Some(Estado::Cancelada),
            motivo_cancelacion: Some("cambio de planes".into()),
            ..ReservaPatch::default()
        });

    let store = h.store.clone();
    let cancel_task =
        tokio::spawn(async move { store.cancel(ReservaId(7), "cambio de planes").await });

    // While the cancel is in flight, a pushed update touches a different field.
    let pushed_ts = "2026-08-06T18:30:00Z";
    tokio::time::sleep(Duration::from_millis(20)).await;
    channel.publish(
        RESERVA_ACTUALIZADA,
        json!({ "id": 7, "fechaActualizacion": pushed_ts }),
    );

    let pushed_applied = wait_for(Duration::from_millis(50), async || {
        h.notifier.contains("info", "Reserva actualizada")
    })
    .await;
    assert!(pushed_applied, "pushed update was never applied");

    cancel_task.await.unwrap().unwrap();

    // Non-overlapping fields merged without loss: the cancellation and the
    // pushed timestamp both survive.
    let final_state = h.store.get(ReservaId(7)).await.unwrap();
    assert_eq!(final_state.estado, Estado::Cancelada);
    assert_eq!(
        final_state.fecha_actualizacion,
        pushed_ts.parse::<chrono::DateTime<Utc>>().unwrap()
    );

    h.store.shutdown();
}

#[tokio::test]
async fn mutations_on_unknown_reservations_are_rejected() {
    let h = harness(vec![]);
    let result = h.store.cancel(ReservaId(99), "motivo").await.unwrap();
    assert!(result.is_none());
    assert_eq!(h.gateway.calls.mutate.load(std::sync::atomic::Ordering::SeqCst), 0);
    h.store.shutdown();
}
