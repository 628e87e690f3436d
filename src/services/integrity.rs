use crate::models::{find_overlaps, Reservation};
use crate::store::{AvailabilityStore, StoreError};

/// Inconsistencies an operator needs to reconcile by hand.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    /// Reservations with no blocking restriction row.
    pub orphans: Vec<Reservation>,
    /// Restriction id pairs on the same room with overlapping spans.
    pub overlaps: Vec<(i64, i64)>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.overlaps.is_empty()
    }
}

pub async fn check_integrity(store: &dyn AvailabilityStore) -> Result<IntegrityReport, StoreError> {
    let orphans = store.orphaned_reservations().await?;
    let restrictions = store.all_restrictions().await?;
    let overlaps = find_overlaps(&restrictions);

    Ok(IntegrityReport { orphans, overlaps })
}

/// Logs the report: one line when clean, one line per problem otherwise.
pub fn log_report(report: &IntegrityReport) {
    if report.is_clean() {
        tracing::info!("integrity check passed");
        return;
    }
    for res in &report.orphans {
        tracing::error!(
            reservation_id = res.id,
            room_id = res.room_id,
            start_date = %res.start_date,
            end_date = %res.end_date,
            "orphaned reservation: no room restriction blocks its dates"
        );
    }
    for (a, b) in &report.overlaps {
        tracing::error!(restriction_a = a, restriction_b = b, "overlapping room restrictions");
    }
}
