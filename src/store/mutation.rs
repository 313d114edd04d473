//! Optimistic mutation bookkeeping.
//!
//! Every locally-initiated cancel/modify registers a [`PendingOp`] keyed by
//! a ULID operation id, plus an entry in the per-entity patch map that reads
//! merge over the canonical record. The ledger entry owns the pre-mutation
//! snapshot; resolving the operation (commit or rollback) claims it with
//! [`MutationLedger::take`].
//!
//! Latest-wins invariant: starting a second mutation on an entity drops the
//! first operation's ledger entry and overwrites its patch. When the first
//! attempt's network call eventually resolves, `take` returns `None` and the
//! resolution must not touch state.

use crate::model::{Reserva, ReservaId, ReservaPatch};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use ulid::Ulid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Cancelar,
    Modificar,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Cancelar => "cancelar",
            OpKind::Modificar => "modificar",
        }
    }
}

/// One in-flight optimistic mutation attempt.
#[derive(Debug, Clone)]
pub struct PendingOp {
    pub op_id: Ulid,
    pub reserva_id: ReservaId,
    pub kind: OpKind,
    /// Materialized view of the record as it stood before this mutation,
    /// restored verbatim on rollback.
    pub snapshot: Reserva,
    /// Wall-clock start, checked by the janitor's orphan purge.
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MutationLedger {
    pending: HashMap<Ulid, PendingOp>,
    /// Latest operation id per entity; only this op may resolve.
    latest: HashMap<ReservaId, Ulid>,
    /// Unconfirmed field overrides, merged over canonical state on read.
    patches: HashMap<ReservaId, ReservaPatch>,
}

impl MutationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mutation attempt and return its operation id.
    ///
    /// A previous unresolved attempt on the same entity is superseded: its
    /// ledger entry is dropped and its patch overwritten.
    pub fn begin(
        &mut self,
        reserva_id: ReservaId,
        kind: OpKind,
        snapshot: Reserva,
        patch: ReservaPatch,
    ) -> Ulid {
        let op_id = Ulid::new();
        if let Some(superseded) = self.latest.insert(reserva_id, op_id) {
            self.pending.remove(&superseded);
        }
        self.pending.insert(
            op_id,
            PendingOp {
                op_id,
                reserva_id,
                kind,
                snapshot,
                started_at: Utc::now(),
            },
        );
        self.patches.insert(reserva_id, patch);
        op_id
    }

    /// Claim the pending record for a resolving operation, removing its
    /// patch alongside. Returns `None` when the operation was superseded by
    /// a newer attempt or already purged — the caller must then leave all
    /// state untouched.
    pub fn take(&mut self, op_id: Ulid) -> Option<PendingOp> {
        let op = self.pending.remove(&op_id)?;
        if self.latest.get(&op.reserva_id) == Some(&op_id) {
            self.latest.remove(&op.reserva_id);
            self.patches.remove(&op.reserva_id);
        }
        Some(op)
    }

    pub fn patch_for(&self, reserva_id: ReservaId) -> Option<&ReservaPatch> {
        self.patches.get(&reserva_id)
    }

    pub fn is_pending(&self, reserva_id: ReservaId) -> bool {
        self.latest.contains_key(&reserva_id)
    }

    /// Drop every pending operation started before `cutoff`, along with its
    /// patch. Returns how many were purged.
    pub fn purge_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let orphaned: Vec<Ulid> = self
            .pending
            .values()
            .filter(|op| op.started_at < cutoff)
            .map(|op| op.op_id)
            .collect();

        for op_id in &orphaned {
            if let Some(op) = self.pending.remove(op_id)
                && self.latest.get(&op.reserva_id) == Some(op_id)
            {
                self.latest.remove(&op.reserva_id);
                self.patches.remove(&op.reserva_id);
            }
        }
        orphaned.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything. Used when the session ends.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.latest.clear();
        self.patches.clear();
    }
}
