//! Dataset loading by category or by slice index.

use crate::category::CategoryTree;
use crate::error::{LayersError, Result};
use crate::format::decode_points;
use crate::storage::ResourceStore;
use geolayers_types::dataset::{Dataset, DatasetSource};
use geolayers_types::id::CategoryId;
use geolayers_types::point::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static mapping from leaf category id to resource key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTable(BTreeMap<CategoryId, String>);

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding of a leaf to a resource key.
    pub fn bind(mut self, category: impl Into<CategoryId>, resource: impl Into<String>) -> Self {
        self.0.insert(category.into(), resource.into());
        self
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.0.get(category).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryId, &str)> {
        self.0.iter().map(|(id, key)| (id, key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every bound id must be a leaf of `tree` and every key non-empty.
    pub fn validate(&self, tree: &CategoryTree) -> std::result::Result<(), String> {
        for (id, key) in &self.0 {
            if !tree.contains(id) {
                return Err(format!("Resource table binds unknown category '{}'", id));
            }
            if !tree.is_leaf(id) {
                return Err(format!(
                    "Resource table binds parent category '{}'; only leaves carry data",
                    id
                ));
            }
            if key.is_empty() {
                return Err(format!("Resource key for '{}' cannot be empty", id));
            }
        }
        Ok(())
    }
}

impl<C: Into<CategoryId>, K: Into<String>> FromIterator<(C, K)> for ResourceTable {
    fn from_iter<T: IntoIterator<Item = (C, K)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, key)| (id.into(), key.into()))
                .collect(),
        )
    }
}

/// Resolves categories and slice indices to freshly decoded datasets.
///
/// Nothing is cached: every call reads and decodes its resource again, and
/// the returned dataset belongs to the caller.
#[derive(Debug)]
pub struct DatasetLoader<S> {
    store: S,
    resources: ResourceTable,
    slice_prefix: String,
}

impl<S: ResourceStore> DatasetLoader<S> {
    pub fn new(store: S, resources: ResourceTable, slice_prefix: impl Into<String>) -> Self {
        Self {
            store,
            resources,
            slice_prefix: slice_prefix.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Resource key for slice `index`: the prefix followed by the decimal index.
    pub fn slice_key(&self, index: u32) -> String {
        format!("{}{}", self.slice_prefix, index)
    }

    /// # Errors
    ///
    /// `ResourceNotFound` when the id has no table entry or its resource is
    /// absent; `MalformedData` when the resource does not decode.
    pub fn load_by_category(&self, id: &str) -> Result<Dataset> {
        let key = self
            .resources
            .get(id)
            .ok_or_else(|| LayersError::ResourceNotFound(id.to_string()))?;
        let points = self.load_resource(key)?;
        log::debug!("Loaded {} points for category '{}'", points.len(), id);
        Ok(Dataset::new(
            DatasetSource::Category(CategoryId::from(id)),
            points,
        ))
    }

    /// # Errors
    ///
    /// Same as [`DatasetLoader::load_by_category`], keyed by [`DatasetLoader::slice_key`].
    pub fn load_by_slice(&self, index: u32) -> Result<Dataset> {
        let key = self.slice_key(index);
        let points = self.load_resource(&key)?;
        log::debug!("Loaded {} weighted points for slice {}", points.len(), index);
        Ok(Dataset::new(DatasetSource::Slice(index), points))
    }

    fn load_resource(&self, key: &str) -> Result<Vec<GeoPoint>> {
        let data = self
            .store
            .fetch(key)?
            .ok_or_else(|| LayersError::ResourceNotFound(key.to_string()))?;
        decode_points(key, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn loader() -> DatasetLoader<MemoryStore> {
        let store = MemoryStore::new()
            .with("child0", r#"[{"lat": 59.9, "lng": 30.3}, {"lat": 59.8, "lng": 30.2}]"#)
            .with("broken", "{not json")
            .with("d2013", r#"[{"lat": 59.9, "lng": 30.3, "weight": 5}]"#);
        let resources = ResourceTable::new()
            .bind("arts_centre", "child0")
            .bind("cafe", "broken")
            .bind("spa", "wo1");
        DatasetLoader::new(store, resources, "d201")
    }

    #[test]
    fn test_load_by_category() {
        let dataset = loader().load_by_category("arts_centre").unwrap();
        assert_eq!(
            dataset.source(),
            &DatasetSource::Category(CategoryId::new("arts_centre"))
        );
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.points()[1], GeoPoint::new(59.8, 30.2));
    }

    #[test]
    fn test_unmapped_category_not_found() {
        let err = loader().load_by_category("missing").unwrap_err();
        assert!(matches!(err, LayersError::ResourceNotFound(ref key) if key == "missing"));
    }

    #[test]
    fn test_mapped_but_absent_resource_not_found() {
        let err = loader().load_by_category("spa").unwrap_err();
        assert!(matches!(err, LayersError::ResourceNotFound(ref key) if key == "wo1"));
    }

    #[test]
    fn test_malformed_category_resource() {
        let err = loader().load_by_category("cafe").unwrap_err();
        assert!(
            matches!(err, LayersError::MalformedData { ref resource, .. } if resource == "broken")
        );
    }

    #[test]
    fn test_load_by_slice() {
        let loader = loader();
        assert_eq!(loader.slice_key(3), "d2013");

        let dataset = loader.load_by_slice(3).unwrap();
        assert_eq!(dataset.source(), &DatasetSource::Slice(3));
        assert_eq!(dataset.total_weight(), 5.0);

        let err = loader.load_by_slice(4).unwrap_err();
        assert!(matches!(err, LayersError::ResourceNotFound(ref key) if key == "d2014"));
    }

    #[test]
    fn test_every_load_is_fresh() {
        let loader = loader();
        let first = loader.load_by_category("arts_centre").unwrap();
        let second = loader.load_by_category("arts_centre").unwrap();
        assert_eq!(first, second);
        assert_ne!(first.points().as_ptr(), second.points().as_ptr());
    }

    #[test]
    fn test_resource_table_validation() {
        let tree = CategoryTree::builder()
            .parent("pub", ["cafe", "club"])
            .build()
            .unwrap();

        let ok: ResourceTable = [("cafe", "pub1"), ("club", "pub2")].into_iter().collect();
        assert!(ok.validate(&tree).is_ok());

        let parent = ResourceTable::new().bind("pub", "pub0");
        assert!(parent.validate(&tree).is_err());

        let unknown = ResourceTable::new().bind("bank", "money0");
        assert!(unknown.validate(&tree).is_err());

        let empty_key = ResourceTable::new().bind("cafe", "");
        assert!(empty_key.validate(&tree).is_err());
    }
}
