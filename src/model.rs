//! Domain types for the Stellar reservations API.
//!
//! Wire shapes follow the backend exactly (camelCase Spanish field names);
//! everything is parsed into explicit typed records at the gateway boundary
//! so malformed payloads fail there instead of leaking `null`s into state.
//! `Reserva::is_optimistic` is a client-only flag and never crosses the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Reservation identity, assigned server-side on creation.
///
/// The backend emits ids as JSON numbers or numeric strings depending on the
/// endpoint, so deserialization accepts both forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ReservaId(pub u64);

impl fmt::Display for ReservaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ReservaId {
    fn from(val: u64) -> Self {
        Self(val)
    }
}

impl<'de> Deserialize<'de> for ReservaId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = ReservaId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a reservation id as a number or numeric string")
            }

            fn visit_u64<E>(self, v: u64) -> Result<ReservaId, E> {
                Ok(ReservaId(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<ReservaId, E> {
                u64::try_from(v)
                    .map(ReservaId)
                    .map_err(|_| E::custom(format!("negative reservation id: {v}")))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<ReservaId, E> {
                v.parse::<u64>()
                    .map(ReservaId)
                    .map_err(|_| E::custom(format!("invalid reservation id: {v:?}")))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Reservation lifecycle state. Wire values are the Spanish lowercase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Estado {
    Pendiente,
    Confirmada,
    Cancelada,
    Completada,
}

impl Estado {
    pub fn as_str(self) -> &'static str {
        match self {
            Estado::Pendiente => "pendiente",
            Estado::Confirmada => "confirmada",
            Estado::Cancelada => "cancelada",
            Estado::Completada => "completada",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reservation as served by the backend.
///
/// Cancellation is a status transition, never a deletion, so
/// `motivo_cancelacion` is only present once `estado` is `cancelada`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Reserva {
    pub id: ReservaId,
    pub estado: Estado,
    pub destino_id: u64,
    pub nave_id: u64,
    pub fecha_viaje: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_regreso: Option<NaiveDate>,
    #[serde(default)]
    pub pasajeros: u32,
    #[serde(default)]
    pub precio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivo_cancelacion: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
    /// True only between a locally-initiated mutation and its resolution.
    #[serde(skip)]
    #[ts(skip)]
    pub is_optimistic: bool,
}

/// Partial field overrides for a reservation.
///
/// Triple duty, mirroring the object-spread merges of the frontend this API
/// was built for: the optimistic patch map, the `modify` request body, and
/// the parsed body of mutation responses and realtime events. Merging honors
/// only the fields that are present; absent fields keep their prior values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ReservaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<Estado>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destino_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nave_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_viaje: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_regreso: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pasajeros: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo_cancelacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_actualizacion: Option<DateTime<Utc>>,
}

impl ReservaPatch {
    /// A cancellation patch: status transition plus the user-supplied reason.
    pub fn cancellation(motivo: &str) -> Self {
        Self {
            estado: Some(Estado::Cancelada),
            motivo_cancelacion: Some(motivo.to_owned()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.estado.is_none()
            && self.destino_id.is_none()
            && self.nave_id.is_none()
            && self.fecha_viaje.is_none()
            && self.fecha_regreso.is_none()
            && self.pasajeros.is_none()
            && self.precio.is_none()
            && self.motivo_cancelacion.is_none()
            && self.fecha_actualizacion.is_none()
    }

    /// Overwrite `reserva` with every field this patch specifies.
    pub fn apply_to(&self, reserva: &mut Reserva) {
        if let Some(estado) = self.estado {
            reserva.estado = estado;
        }
        if let Some(destino_id) = self.destino_id {
            reserva.destino_id = destino_id;
        }
        if let Some(nave_id) = self.nave_id {
            reserva.nave_id = nave_id;
        }
        if let Some(fecha_viaje) = self.fecha_viaje {
            reserva.fecha_viaje = fecha_viaje;
        }
        if let Some(fecha_regreso) = self.fecha_regreso {
            reserva.fecha_regreso = Some(fecha_regreso);
        }
        if let Some(pasajeros) = self.pasajeros {
            reserva.pasajeros = pasajeros;
        }
        if let Some(precio) = self.precio {
            reserva.precio = precio;
        }
        if let Some(ref motivo) = self.motivo_cancelacion {
            reserva.motivo_cancelacion = Some(motivo.clone());
        }
        if let Some(fecha_actualizacion) = self.fecha_actualizacion {
            reserva.fecha_actualizacion = fecha_actualizacion;
        }
    }
}

/// Creation payload. The server assigns the id and timestamps.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NuevaReserva {
    pub destino_id: u64,
    pub nave_id: u64,
    pub fecha_viaje: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_regreso: Option<NaiveDate>,
    pub pasajeros: u32,
    pub precio: f64,
}

/// A server-pushed `reserva_actualizada` event: the entity id plus whatever
/// fields changed.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservaEvent {
    pub id: ReservaId,
    #[serde(flatten)]
    pub cambios: ReservaPatch,
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<Estado>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destino_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nave_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_fin: Option<NaiveDate>,
}

/// List-endpoint envelope: a page of data plus pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Reserva>,
    #[serde(default)]
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
}
