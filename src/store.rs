//! Ports the insertion strategies depend on.
//!
//! [`FeatureStore`] is the whole-street read/replace contract used by the
//! in-memory merge strategy. [`PointStatement`] is the single server-side
//! statement used by the native strategy. [`Database`] implements both.

use async_trait::async_trait;

use crate::db::Database;
use crate::error::Result;
use crate::models::Street;

/// Whole-street persistence. No partial-field updates.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Fails with `InvalidId` for `id <= 0` and `NotFound` if absent.
    async fn fetch(&self, id: i64) -> Result<Street>;

    /// Fails with `Validation` for a malformed snapshot and `NotFound` if the
    /// id no longer exists.
    async fn replace(&self, street: &Street) -> Result<()>;
}

/// A parameterized append/prepend statement run entirely by the data store.
#[async_trait]
pub trait PointStatement: Send + Sync {
    /// Returns the number of rows the statement touched.
    async fn execute_add_point(&self, x: f64, y: f64, id: i64, add_to_end: bool)
        -> Result<usize>;
}

#[async_trait]
impl FeatureStore for Database {
    async fn fetch(&self, id: i64) -> Result<Street> {
        self.fetch_street(id)
    }

    async fn replace(&self, street: &Street) -> Result<()> {
        self.replace_street(street)
    }
}

#[async_trait]
impl PointStatement for Database {
    async fn execute_add_point(
        &self,
        x: f64,
        y: f64,
        id: i64,
        add_to_end: bool,
    ) -> Result<usize> {
        self.add_point_atomic(x, y, id, add_to_end)
    }
}
