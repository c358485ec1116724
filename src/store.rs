//! The in-memory layout store driving room persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use tracing::{debug, info, warn};

use crate::error::LayoutError;
use crate::persist;
use crate::record::{PlacedRecord, RecordId};

/// Authoritative set of placed-object records for the current room.
///
/// Created once per editing session and owned by the session controller.
/// All mutation comes in through explicit method calls from the editor's
/// input layer; the store never polls anything itself. Uses `BTreeMap` so
/// iteration and save output are deterministic.
pub struct RoomLayoutStore {
    root_dir: PathBuf,
    room_name: Option<String>,
    records: BTreeMap<RecordId, PlacedRecord>,
    next_id: RecordId,
}

impl RoomLayoutStore {
    /// Create a store persisting rooms under the given directory.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self, LayoutError> {
        let root_dir = root_dir.as_ref().to_path_buf();
        fs::create_dir_all(&root_dir)?;
        Ok(Self {
            root_dir,
            room_name: None,
            records: BTreeMap::new(),
            next_id: 0,
        })
    }

    /// Name the room. First write wins; the name is lower-cased and later
    /// calls are silently ignored.
    pub fn set_room_name(&mut self, name: &str) {
        if self.room_name.is_none() {
            self.room_name = Some(name.to_lowercase());
        }
    }

    /// The room name, if one has been set.
    pub fn room_name(&self) -> Option<&str> {
        self.room_name.as_deref()
    }

    /// The file this room persists to, once the room is named.
    pub fn room_file(&self) -> Option<PathBuf> {
        self.room_name
            .as_deref()
            .map(|name| self.root_dir.join(persist::room_file_name(name)))
    }

    /// Add a record under a freshly assigned id and return that id.
    ///
    /// Ids start at 0, increase by one per call, and are never reused
    /// within a session (removal does not give an id back).
    pub fn add(&mut self, record: PlacedRecord) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, asset = %record.asset_name, "placed record added");
        self.records.insert(id, record);
        id
    }

    /// Insert or overwrite the record at an explicit id.
    ///
    /// Used when re-saving a previously assigned object after modification;
    /// does not advance the id counter.
    pub fn insert(&mut self, id: RecordId, record: PlacedRecord) {
        self.records.insert(id, record);
    }

    /// Remove the record with the given id. No-op when absent.
    pub fn remove(&mut self, id: RecordId) {
        if self.records.remove(&id).is_some() {
            debug!(id, "placed record removed");
        }
    }

    /// Move the record with the given id.
    pub fn update_position(&mut self, id: RecordId, position: Vec3) -> Result<(), LayoutError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(LayoutError::NotFound { id })?;
        record.position = position;
        Ok(())
    }

    /// Rotate the record with the given id.
    pub fn update_orientation(
        &mut self,
        id: RecordId,
        orientation: Quat,
    ) -> Result<(), LayoutError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(LayoutError::NotFound { id })?;
        record.orientation = orientation;
        Ok(())
    }

    /// Get the record with the given id.
    pub fn get(&self, id: RecordId) -> Option<&PlacedRecord> {
        self.records.get(&id)
    }

    /// Iterate all records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &PlacedRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next auto-assigning [`add`](Self::add) will hand out.
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// Persist the full record list to the room's file.
    ///
    /// The file is replaced atomically: a failed write leaves the previous
    /// layout on disk untouched. Returns the path written.
    pub fn save(&self) -> Result<PathBuf, LayoutError> {
        let path = self.room_file().ok_or(LayoutError::UnnamedRoom)?;

        let wire: Vec<persist::RoomFileRecord> = self
            .records
            .iter()
            .map(|(id, record)| persist::RoomFileRecord::from_record(*id, record))
            .collect();

        persist::write_room_file(&path, &wire)?;
        info!(path = %path.display(), records = wire.len(), "room layout saved");
        Ok(path)
    }

    /// Restore the room's persisted layout.
    ///
    /// Every loaded record is re-inserted into the store and handed to
    /// `materialize` so the caller can re-instantiate it in its scene; the
    /// id counter advances past the highest loaded id so later additions
    /// cannot collide with persisted ones. If the room has never been saved
    /// an empty layout file is created instead and no callback fires. A
    /// file that fails validation is moved aside to `<file>.corrupt` and
    /// reported; the store stays usable and empty.
    ///
    /// Returns the number of records loaded.
    pub fn load<F>(&mut self, mut materialize: F) -> Result<usize, LayoutError>
    where
        F: FnMut(RecordId, &PlacedRecord),
    {
        let path = self.room_file().ok_or(LayoutError::UnnamedRoom)?;

        if !path.exists() {
            // First visit to this room: persist the (empty) layout.
            self.save()?;
            return Ok(0);
        }

        let wire = match persist::read_room_file(&path) {
            Ok(wire) => wire,
            Err(err @ LayoutError::Corrupt { .. }) => {
                match persist::quarantine_room_file(&path) {
                    Ok(aside) => {
                        warn!(path = %path.display(), aside = %aside.display(), "corrupt room file quarantined")
                    }
                    Err(rename_err) => {
                        warn!(path = %path.display(), error = %rename_err, "failed to quarantine corrupt room file")
                    }
                }
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let count = wire.len();
        for entry in wire {
            let (id, record) = entry.into_parts();
            if id >= self.next_id {
                self.next_id = id + 1;
            }
            materialize(id, &record);
            self.records.insert(id, record);
        }

        info!(path = %path.display(), records = count, "room layout loaded");
        Ok(count)
    }

    /// Drop every record and return the store to its initial state:
    /// empty, id counter at 0, room unnamed.
    pub fn clear(&mut self) {
        self.records.clear();
        self.next_id = 0;
        self.room_name = None;
    }
}
