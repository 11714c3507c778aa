//! Point insertion for street geometries.
//!
//! Two interchangeable strategies add one point to either end of a stored
//! polyline:
//!
//! - [`InMemoryMerge`]: fetch, splice in process, replace the whole street.
//! - [`NativeAtomic`]: one UPDATE that rewrites the geometry inside the database.
//!
//! [`StrategySelector`] picks one per call from [`FeatureFlags::use_native`].
//! There is no fallback from one strategy to the other.

mod in_memory;
mod native;

pub use in_memory::InMemoryMerge;
pub use native::NativeAtomic;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::FeatureFlags;
use crate::db::Database;
use crate::error::{Result, StreetError};
use crate::models::Coordinate;
use crate::store::{FeatureStore, PointStatement};

/// The strategy resolved for a single call.
#[derive(Clone, Copy)]
pub enum Strategy<'a> {
    InMemory(&'a InMemoryMerge),
    Native(&'a NativeAtomic),
}

impl Strategy<'_> {
    pub const IN_MEMORY: &'static str = "in_memory";
    pub const NATIVE: &'static str = "native";

    pub fn name(&self) -> &'static str {
        match self {
            Self::InMemory(_) => Strategy::IN_MEMORY,
            Self::Native(_) => Strategy::NATIVE,
        }
    }

    pub async fn add_point(&self, street_id: i64, point: Coordinate, add_to_end: bool) -> Result<()> {
        match self {
            Self::InMemory(s) => s.add_point(street_id, point, add_to_end).await,
            Self::Native(s) => s.add_point(street_id, point, add_to_end).await,
        }
    }
}

/// Dispatches point insertion to the strategy the feature flag names.
///
/// The flag is read on every call, so [`set_use_native`](Self::set_use_native)
/// takes effect for the next request.
pub struct StrategySelector {
    use_native: AtomicBool,
    in_memory: Option<InMemoryMerge>,
    native: Option<NativeAtomic>,
}

impl StrategySelector {
    /// Build a selector from whichever strategies are available. Selecting a
    /// strategy that was not supplied fails with `Configuration`.
    pub fn new(
        flags: FeatureFlags,
        in_memory: Option<InMemoryMerge>,
        native: Option<NativeAtomic>,
    ) -> Self {
        Self {
            use_native: AtomicBool::new(flags.use_native),
            in_memory,
            native,
        }
    }

    /// Wire both strategies against separate store and statement handles.
    pub fn with_ports(
        flags: FeatureFlags,
        store: Arc<dyn FeatureStore>,
        statement: Arc<dyn PointStatement>,
    ) -> Self {
        Self::new(
            flags,
            Some(InMemoryMerge::new(store)),
            Some(NativeAtomic::new(statement)),
        )
    }

    /// Wire both strategies against one database.
    pub fn from_database(db: Database, flags: FeatureFlags) -> Self {
        let db = Arc::new(db);
        Self::with_ports(flags, db.clone(), db)
    }

    pub fn uses_native(&self) -> bool {
        self.use_native.load(Ordering::Acquire)
    }

    /// Name of the strategy the flag currently selects, whether or not it is wired.
    pub fn selected_name(&self) -> &'static str {
        if self.uses_native() {
            Strategy::NATIVE
        } else {
            Strategy::IN_MEMORY
        }
    }

    pub fn set_use_native(&self, use_native: bool) {
        self.use_native.store(use_native, Ordering::Release);
        tracing::info!(use_native, "Point insertion strategy flag changed");
    }

    /// Resolve the strategy for the current flag value.
    pub fn resolve(&self) -> Result<Strategy<'_>> {
        let strategy = if self.uses_native() {
            self.native.as_ref().map(Strategy::Native)
        } else {
            self.in_memory.as_ref().map(Strategy::InMemory)
        };
        strategy.ok_or_else(|| missing_strategy(self.selected_name()))
    }

    pub async fn add_point(&self, street_id: i64, point: Coordinate, add_to_end: bool) -> Result<()> {
        let strategy = self.resolve()?;
        tracing::debug!(street_id, strategy = strategy.name(), "Adding point to street");
        strategy.add_point(street_id, point, add_to_end).await
    }
}

fn missing_strategy(name: &str) -> StreetError {
    tracing::error!("Point insertion strategy '{}' is not configured", name);
    StreetError::Configuration(format!(
        "point insertion strategy '{}' is selected but not configured",
        name
    ))
}
