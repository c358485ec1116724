//! Room file encoding and decoding.
//!
//! One `.dat` file per room: a fixed 14-byte header (magic, format version,
//! CRC32, payload length) followed by a zstd-compressed bincode payload
//! holding the record list. Writes go through a temp file and an atomic
//! rename so a failed save never clobbers the previous layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::record::{PlacedRecord, RecordId};

/// Magic number for room file identification ("ROOM").
const ROOM_MAGIC: u32 = 0x524F4F4D;

/// Current room file format version.
const ROOM_VERSION: u16 = 1;

/// Serialized header size in bytes.
const HEADER_LEN: usize = 14;

/// Room file header structure.
#[derive(Debug, Clone)]
struct RoomFileHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl RoomFileHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: ROOM_MAGIC,
            version: ROOM_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < HEADER_LEN {
            return Err("header too short".to_string());
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != ROOM_MAGIC {
            return Err(format!(
                "invalid magic: expected 0x{:08X}, got 0x{:08X}",
                ROOM_MAGIC, magic
            ));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != ROOM_VERSION {
            return Err(format!(
                "unsupported format version {} (expected {})",
                version, ROOM_VERSION
            ));
        }

        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

/// One record as it appears on disk.
///
/// Explicit wire schema: the id key plus the catalog identity and the raw
/// transform components. Position and orientation are stored as plain float
/// arrays so the file layout is independent of the in-memory math types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomFileRecord {
    /// Record id the object was stored under.
    pub id: RecordId,
    /// Catalog sub-path of the asset.
    pub asset_path: String,
    /// Catalog entry name of the asset.
    pub asset_name: String,
    /// Position as `[x, y, z]`.
    pub position: [f32; 3],
    /// Orientation as `[x, y, z, w]`.
    pub orientation: [f32; 4],
}

impl RoomFileRecord {
    /// Build a wire record from a store entry.
    pub fn from_record(id: RecordId, record: &PlacedRecord) -> Self {
        Self {
            id,
            asset_path: record.asset_path.clone(),
            asset_name: record.asset_name.clone(),
            position: record.position.to_array(),
            orientation: record.orientation.to_array(),
        }
    }

    /// Split a wire record back into its id and in-memory record.
    pub fn into_parts(self) -> (RecordId, PlacedRecord) {
        let record = PlacedRecord {
            asset_path: self.asset_path,
            asset_name: self.asset_name,
            position: Vec3::from_array(self.position),
            orientation: Quat::from_array(self.orientation),
        };
        (self.id, record)
    }
}

/// Compute the file name for a room.
///
/// The name is lower-cased and any character outside `[a-z0-9_-]` maps to
/// `_`, so a room name can never point outside the layout directory.
pub fn room_file_name(room_name: &str) -> String {
    let sanitized: String = room_name
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if matches!(c, 'a'..='z' | '0'..='9' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("room_{}.dat", sanitized)
}

/// Encode a record list into the full file image (header + payload).
pub fn encode_room(records: &[RoomFileRecord]) -> Result<Vec<u8>, LayoutError> {
    let serialized = bincode::serialize(records)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    // Level 3 for balanced speed/compression.
    let compressed = zstd::encode_all(&serialized[..], 3)?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let crc32 = hasher.finalize();

    let header = RoomFileHeader::new(crc32, compressed.len() as u32);

    let mut image = header.to_bytes();
    image.extend_from_slice(&compressed);
    Ok(image)
}

/// Decode a full file image into its record list.
///
/// Every failure mode (short file, bad magic, unknown version, CRC mismatch,
/// decompression or deserialization error) comes back as
/// [`LayoutError::Corrupt`] naming `path`.
pub fn decode_room(path: &Path, bytes: &[u8]) -> Result<Vec<RoomFileRecord>, LayoutError> {
    let corrupt = |detail: String| LayoutError::Corrupt {
        path: path.to_path_buf(),
        detail,
    };

    let header = RoomFileHeader::from_bytes(bytes).map_err(corrupt)?;

    let payload = &bytes[HEADER_LEN..];
    if payload.len() != header.payload_len as usize {
        return Err(corrupt(format!(
            "payload length mismatch: header says {}, file has {}",
            header.payload_len,
            payload.len()
        )));
    }

    let mut hasher = Hasher::new();
    hasher.update(payload);
    let computed_crc = hasher.finalize();
    if computed_crc != header.crc32 {
        return Err(corrupt(format!(
            "CRC32 mismatch: expected {:08X}, got {:08X}",
            header.crc32, computed_crc
        )));
    }

    let decompressed =
        zstd::decode_all(payload).map_err(|e| corrupt(format!("decompression failed: {}", e)))?;

    bincode::deserialize(&decompressed)
        .map_err(|e| corrupt(format!("record list deserialization failed: {}", e)))
}

/// Read and decode a room file.
pub fn read_room_file(path: &Path) -> Result<Vec<RoomFileRecord>, LayoutError> {
    let bytes = fs::read(path)?;
    decode_room(path, &bytes)
}

/// Encode and write a room file, replacing any previous file atomically.
pub fn write_room_file(path: &Path, records: &[RoomFileRecord]) -> Result<(), LayoutError> {
    let image = encode_room(records)?;

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    fs::write(&tmp_path, &image)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Move a corrupt room file aside so the next save can start fresh.
///
/// Returns the quarantine path.
pub fn quarantine_room_file(path: &Path) -> Result<PathBuf, io::Error> {
    let mut aside = path.as_os_str().to_owned();
    aside.push(".corrupt");
    let aside = PathBuf::from(aside);
    fs::rename(path, &aside)?;
    Ok(aside)
}

/// List the (sanitized) names of all rooms persisted under `root_dir`.
pub fn list_rooms(root_dir: &Path) -> Result<Vec<String>, LayoutError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(stem) = file_name
            .strip_prefix("room_")
            .and_then(|rest| rest.strip_suffix(".dat"))
        {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = RoomFileHeader::new(0xDEADBEEF, 1234);
        let bytes = header.to_bytes();
        let decoded = RoomFileHeader::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.magic, ROOM_MAGIC);
        assert_eq!(decoded.version, ROOM_VERSION);
        assert_eq!(decoded.crc32, 0xDEADBEEF);
        assert_eq!(decoded.payload_len, 1234);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = RoomFileHeader::new(0, 0).to_bytes();
        bytes[0] ^= 0xFF;
        let err = RoomFileHeader::from_bytes(&bytes).unwrap_err();
        assert!(err.contains("invalid magic"), "unexpected error: {}", err);
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = RoomFileHeader::new(0, 0).to_bytes();
        bytes[4] = 0xFF;
        let err = RoomFileHeader::from_bytes(&bytes).unwrap_err();
        assert!(err.contains("version"), "unexpected error: {}", err);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let records = vec![
            RoomFileRecord {
                id: 0,
                asset_path: "Tables".to_string(),
                asset_name: "Desk".to_string(),
                position: [1.0, 2.0, 3.0],
                orientation: [0.0, 0.0, 0.0, 1.0],
            },
            RoomFileRecord {
                id: 7,
                asset_path: "Chairs/Office".to_string(),
                asset_name: "SwivelChair".to_string(),
                position: [-4.5, 0.0, 2.25],
                orientation: [0.0, 0.7071, 0.0, 0.7071],
            },
        ];

        let image = encode_room(&records).unwrap();
        let decoded = decode_room(Path::new("room_test.dat"), &image).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, 0);
        assert_eq!(decoded[0].asset_name, "Desk");
        assert_eq!(decoded[1].id, 7);
        assert_eq!(decoded[1].position, [-4.5, 0.0, 2.25]);
    }

    #[test]
    fn detects_payload_corruption() {
        let records = vec![RoomFileRecord {
            id: 0,
            asset_path: "Tables".to_string(),
            asset_name: "Desk".to_string(),
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }];

        let mut image = encode_room(&records).unwrap();
        let last = image.len() - 1;
        image[last] ^= 0xFF;

        let err = decode_room(Path::new("room_test.dat"), &image).unwrap_err();
        match err {
            LayoutError::Corrupt { detail, .. } => {
                assert!(detail.contains("CRC32"), "unexpected detail: {}", detail)
            }
            other => panic!("expected Corrupt, got {:?}", other),
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(room_file_name("kitchen"), "room_kitchen.dat");
        assert_eq!(room_file_name("Living Room"), "room_living_room.dat");
        assert_eq!(room_file_name("../etc"), "room____etc.dat");
    }
}
