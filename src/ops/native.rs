use std::sync::Arc;

use crate::error::{Result, StreetError};
use crate::models::Coordinate;
use crate::store::PointStatement;

/// Single-statement insertion: the data store appends or prepends the point
/// inside the stored geometry while executing one UPDATE. Nothing is read
/// first, so concurrent calls on the same street each land on whatever the
/// row holds when their statement runs and none are lost. Relative order of
/// simultaneous calls is whatever order the store commits them in.
pub struct NativeAtomic {
    statement: Arc<dyn PointStatement>,
}

impl NativeAtomic {
    pub fn new(statement: Arc<dyn PointStatement>) -> Self {
        Self { statement }
    }

    /// A non-positive id or a non-finite point is ignored and reported as
    /// success. This differs from [`super::InMemoryMerge`], which rejects both.
    pub async fn add_point(&self, street_id: i64, point: Coordinate, add_to_end: bool) -> Result<()> {
        if street_id <= 0 || !point.is_finite() {
            tracing::warn!(
                street_id,
                x = point.x,
                y = point.y,
                "Ignoring native point insertion with invalid input"
            );
            return Ok(());
        }

        let rows = self
            .statement
            .execute_add_point(point.x, point.y, street_id, add_to_end)
            .await?;

        if rows == 0 {
            tracing::warn!(street_id, "Native point insertion matched no street");
            return Err(StreetError::NotFound(street_id));
        }

        tracing::debug!(street_id, add_to_end, "Inserted point with native statement");
        Ok(())
    }
}
