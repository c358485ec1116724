use glam::{Quat, Vec3};

/// Identifier of a placed record, unique within a room.
///
/// Ids are assigned by [`crate::RoomLayoutStore::add`] from a monotonically
/// increasing counter and are never reused within a session.
pub type RecordId = u32;

/// One placed object: which catalog asset it is and where it stands.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRecord {
    /// Catalog sub-path of the asset (category/subcategory).
    pub asset_path: String,
    /// Catalog entry name of the asset.
    pub asset_name: String,
    /// World-space position.
    pub position: Vec3,
    /// World-space rotation. Stored as given; the store never normalizes.
    pub orientation: Quat,
}

impl PlacedRecord {
    /// Create a record from its catalog identity and transform.
    pub fn new(
        asset_path: impl Into<String>,
        asset_name: impl Into<String>,
        position: Vec3,
        orientation: Quat,
    ) -> Self {
        Self {
            asset_path: asset_path.into(),
            asset_name: asset_name.into(),
            position,
            orientation,
        }
    }
}
