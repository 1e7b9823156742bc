//! Extra invalidation keys of the airspace cache.

use super::statements::StatementKey;
use crate::model::{Airspace, AirspaceFilter, AltitudeFilter};

/// Remembers the filter the airspace list was fetched with.
#[derive(Debug, Default)]
pub struct AirspaceFilterState {
    last: Option<AirspaceFilter>,
}

impl AirspaceFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `filter`, returning true if it differs from the previous one.
    ///
    /// The first call always reports a change.
    pub fn changed(&mut self, filter: &AirspaceFilter) -> bool {
        if self.last.as_ref() == Some(filter) {
            return false;
        }
        tracing::debug!(
            types = ?filter.types,
            altitude = ?filter.altitude,
            "Airspace filter changed"
        );
        self.last = Some(*filter);
        true
    }

    pub fn current(&self) -> Option<&AirspaceFilter> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Statement for an altitude filter mode.
pub fn statement_for(altitude: AltitudeFilter) -> StatementKey {
    match altitude {
        AltitudeFilter::None => StatementKey::AirspaceByRect,
        AltitudeFilter::Below(_) => StatementKey::AirspaceByRectBelowAlt,
        AltitudeFilter::Above(_) => StatementKey::AirspaceByRectAboveAlt,
        AltitudeFilter::AtFlightPlan(_) => StatementKey::AirspaceByRectAtAlt,
    }
}

/// Stable sort by drawing priority, lowest first.
pub fn sort_by_priority(airspaces: &mut [Airspace]) {
    airspaces.sort_by_key(|a| a.kind.drawing_priority());
}
