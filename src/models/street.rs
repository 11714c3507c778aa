use serde::{Deserialize, Serialize};

use crate::error::{Result, StreetError};

/// A 2-D coordinate. `x` and `y` are stored as given; no projection or SRID
/// handling happens here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.x, c.y]
    }
}

/// A street: a named linear feature.
///
/// `id` is assigned by the database on creation and never changes.
/// `capacity` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Street {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
    pub geometry: Vec<Coordinate>,
}

impl Street {
    /// Check that this snapshot can be written back as a whole.
    pub fn validate(&self) -> Result<()> {
        if self.id <= 0 {
            return Err(StreetError::Validation(format!(
                "street id must be positive, got {}",
                self.id
            )));
        }
        validate_name(&self.name)?;
        validate_geometry(&self.geometry)
    }

    /// Build a new coordinate sequence with `point` at the requested end.
    ///
    /// The existing geometry is left as it is; callers swap the result in.
    pub fn with_point(&self, point: Coordinate, add_to_end: bool) -> Vec<Coordinate> {
        let mut updated = Vec::with_capacity(self.geometry.len() + 1);
        if add_to_end {
            updated.extend_from_slice(&self.geometry);
            updated.push(point);
        } else {
            updated.push(point);
            updated.extend_from_slice(&self.geometry);
        }
        updated
    }
}

/// Input for creating a street. Geometry arrives as `[x, y]` pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStreetInput {
    pub name: String,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub geometry: Vec<[f64; 2]>,
}

impl CreateStreetInput {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.geometry.iter().copied().map(Coordinate::from).collect()
    }
}

/// Body of an add-point request.
///
/// Older clients send `latitude`/`longitude`; these map onto `x`/`y`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPointInput {
    #[serde(alias = "latitude")]
    pub x: f64,
    #[serde(alias = "longitude")]
    pub y: f64,
    #[serde(default = "default_add_to_end", alias = "addToEnd")]
    pub add_to_end: bool,
}

impl AddPointInput {
    pub fn point(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

fn default_add_to_end() -> bool {
    true
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StreetError::Validation(
            "street name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_geometry(geometry: &[Coordinate]) -> Result<()> {
    if let Some(index) = geometry.iter().position(|c| !c.is_finite()) {
        return Err(StreetError::Validation(format!(
            "coordinate at index {} is not finite",
            index
        )));
    }
    Ok(())
}
