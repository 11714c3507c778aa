use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;
use crate::models::Coordinate;
use crate::store::FeatureStore;

/// Read-modify-write insertion: fetch the street, splice the point into a new
/// coordinate list, write the whole street back.
///
/// `splice_lock` is shared by every call on this instance and covers only the
/// splice. The fetch and the replace run outside it, so two concurrent calls
/// on the same street can read the same base geometry and the later replace
/// wins. That lost update is known behavior of this strategy; use
/// [`super::NativeAtomic`] when concurrent writers must all be kept.
pub struct InMemoryMerge {
    store: Arc<dyn FeatureStore>,
    splice_lock: Mutex<()>,
}

impl InMemoryMerge {
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self {
            store,
            splice_lock: Mutex::new(()),
        }
    }

    pub async fn add_point(&self, street_id: i64, point: Coordinate, add_to_end: bool) -> Result<()> {
        let mut street = self.store.fetch(street_id).await?;

        {
            let _guard = self
                .splice_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            street.geometry = street.with_point(point, add_to_end);
        }

        self.store.replace(&street).await?;

        tracing::debug!(
            street_id,
            add_to_end,
            points = street.geometry.len(),
            "Merged point into street geometry"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreetError;
    use crate::models::Street;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        streets: Mutex<HashMap<i64, Street>>,
    }

    #[async_trait]
    impl FeatureStore for MapStore {
        async fn fetch(&self, id: i64) -> Result<Street> {
            if id <= 0 {
                return Err(StreetError::InvalidId(id));
            }
            self.streets
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or(StreetError::NotFound(id))
        }

        async fn replace(&self, street: &Street) -> Result<()> {
            street.validate()?;
            match self.streets.lock().unwrap().get_mut(&street.id) {
                Some(stored) => {
                    *stored = street.clone();
                    Ok(())
                }
                None => Err(StreetError::NotFound(street.id)),
            }
        }
    }

    fn store_with(id: i64, geometry: Vec<Coordinate>) -> Arc<MapStore> {
        let store = MapStore::default();
        store.streets.lock().unwrap().insert(
            id,
            Street {
                id,
                name: "Elm".to_string(),
                capacity: 3,
                geometry,
            },
        );
        Arc::new(store)
    }

    #[tokio::test]
    async fn appends_and_prepends_through_store() {
        let store = store_with(1, vec![Coordinate::new(0.0, 0.0)]);
        let merge = InMemoryMerge::new(store.clone());

        merge.add_point(1, Coordinate::new(1.0, 1.0), true).await.unwrap();
        merge.add_point(1, Coordinate::new(-1.0, -1.0), false).await.unwrap();

        let stored = store.fetch(1).await.unwrap();
        assert_eq!(
            stored.geometry,
            vec![
                Coordinate::new(-1.0, -1.0),
                Coordinate::new(0.0, 0.0),
                Coordinate::new(1.0, 1.0)
            ]
        );
        assert_eq!(stored.capacity, 3);
    }

    #[tokio::test]
    async fn propagates_invalid_id() {
        let merge = InMemoryMerge::new(store_with(1, vec![]));
        let err = merge
            .add_point(0, Coordinate::new(1.0, 1.0), true)
            .await
            .unwrap_err();
        assert!(matches!(err, StreetError::InvalidId(0)));
    }

    #[tokio::test]
    async fn propagates_validation_for_non_finite_point() {
        let store = store_with(1, vec![]);
        let merge = InMemoryMerge::new(store.clone());
        let err = merge
            .add_point(1, Coordinate::new(f64::INFINITY, 0.0), true)
            .await
            .unwrap_err();

        assert!(matches!(err, StreetError::Validation(_)));
        assert!(store.fetch(1).await.unwrap().geometry.is_empty());
    }
}
