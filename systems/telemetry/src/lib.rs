#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Append-only telemetry sink fed by world events.
//!
//! The sink records spawns, passes and collisions together with the pair's
//! variant, gap and speed so balance can be analysed offline. Records are
//! stamped with the simulation clock, never the wall clock, which keeps the
//! stream replayable and lets two runs be compared through [`Telemetry::digest`].

use std::{collections::BTreeMap, time::Duration};

use gauntlet_core::{Event, TelemetryEvent, TelemetryKind, Variant};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Collects telemetry records for a session.
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    records: Vec<TelemetryEvent>,
}

impl Telemetry {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the spawn, pass and collision events of one tick.
    ///
    /// `now` is the simulation clock the records are stamped with.
    pub fn handle(&mut self, events: &[Event], now: Duration) {
        let timestamp_ms = u64::try_from(now.as_millis()).unwrap_or(u64::MAX);
        for event in events {
            let (kind, variant, gap, speed) = match event {
                Event::PairSpawned { request, .. } => (
                    TelemetryKind::Spawn,
                    request.variant,
                    request.gap,
                    request.speed,
                ),
                Event::PairPassed {
                    variant, gap, speed, ..
                } => (TelemetryKind::Pass, *variant, *gap, *speed),
                Event::PlayerCollided {
                    variant, gap, speed, ..
                } => (TelemetryKind::Collision, *variant, *gap, *speed),
                _ => continue,
            };
            self.records.push(TelemetryEvent {
                timestamp_ms,
                kind,
                variant: Some(variant),
                gap: Some(gap),
                speed: Some(speed),
            });
        }
    }

    /// Returns an owned copy of every record captured so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TelemetryEvent> {
        self.records.clone()
    }

    /// Borrows the captured records.
    #[must_use]
    pub fn events(&self) -> &[TelemetryEvent] {
        &self.records
    }

    /// Number of captured records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every captured record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Aggregates the captured records.
    #[must_use]
    pub fn summary(&self) -> TelemetrySummary {
        let mut summary = TelemetrySummary::default();
        let mut gap_total = 0.0_f64;
        let mut speed_total = 0.0_f64;

        for record in &self.records {
            match record.kind {
                TelemetryKind::Spawn => {
                    summary.spawns += 1;
                    if let Some(variant) = record.variant {
                        *summary.spawns_by_variant.entry(variant).or_default() += 1;
                    }
                    gap_total += f64::from(record.gap.unwrap_or_default());
                    speed_total += f64::from(record.speed.unwrap_or_default());
                }
                TelemetryKind::Pass => summary.passes += 1,
                TelemetryKind::Collision => summary.collisions += 1,
            }
        }

        if summary.spawns > 0 {
            let count = summary.spawns as f64;
            summary.mean_spawn_gap = Some((gap_total / count) as f32);
            summary.mean_spawn_speed = Some((speed_total / count) as f32);
        }
        summary
    }

    /// SHA-256 over the record stream.
    ///
    /// Equal seeds and inputs produce equal digests.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(record.timestamp_ms.to_le_bytes());
            hasher.update([kind_code(record.kind)]);
            hasher.update(record.variant.map_or("", Variant::tag).as_bytes());
            hasher.update([0_u8]);
            hasher.update(record.gap.unwrap_or(f32::NAN).to_bits().to_le_bytes());
            hasher.update(record.speed.unwrap_or(f32::NAN).to_bits().to_le_bytes());
        }
        hasher.finalize().into()
    }
}

fn kind_code(kind: TelemetryKind) -> u8 {
    match kind {
        TelemetryKind::Spawn => 0,
        TelemetryKind::Pass => 1,
        TelemetryKind::Collision => 2,
    }
}

/// Aggregated view over a telemetry stream.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TelemetrySummary {
    /// Number of pairs spawned.
    pub spawns: usize,
    /// Number of pairs passed.
    pub passes: usize,
    /// Number of collisions.
    pub collisions: usize,
    /// Spawn counts keyed by variant.
    pub spawns_by_variant: BTreeMap<Variant, usize>,
    /// Mean gap over every spawn.
    pub mean_spawn_gap: Option<f32>,
    /// Mean horizontal speed over every spawn.
    pub mean_spawn_speed: Option<f32>,
}

/// Formats a digest as lowercase hex.
#[must_use]
pub fn digest_hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}
