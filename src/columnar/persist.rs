//! Column snapshots on disk
//!
//! A column named `name` is stored in `dir/name` as:
//!
//! ```text
//! magic "LUMACOL\x01" | bincode header | body len (u64 LE) | crc32 (u32 LE) | bincode body
//! ```
//!
//! The header records codec, attribute type and row count so a snapshot is
//! never loaded into a column of the wrong shape. The body is the storage
//! struct itself.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::element::{ColumnElement, RowAccess};
use super::typed::{ColumnStorage, TypedColumn};
use super::Column;
use crate::error::{ColumnError, Result};
use crate::types::{AttributeType, CompressionCodec};

const MAGIC: &[u8; 8] = b"LUMACOL\x01";
const FORMAT_VERSION: u16 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotHeader {
    version: u16,
    codec: CompressionCodec,
    attribute_type: AttributeType,
    name: String,
    rows: u64,
}

/// File holding the snapshot of column `name` under `dir`
pub fn snapshot_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

pub(crate) fn store<T, S>(column: &TypedColumn<T, S>, dir: &Path) -> Result<()>
where
    T: ColumnElement,
    S: ColumnStorage<T>,
{
    let path = snapshot_path(dir, column.name());
    let storage = column.storage();
    let body = bincode::serialize(storage)?;
    let header = SnapshotHeader {
        version: FORMAT_VERSION,
        codec: S::CODEC,
        attribute_type: T::ATTRIBUTE_TYPE,
        name: column.name().to_string(),
        rows: storage.row_count() as u64,
    };

    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(MAGIC)?;
    bincode::serialize_into(&mut writer, &header)?;
    writer.write_all(&(body.len() as u64).to_le_bytes())?;
    writer.write_all(&crc32fast::hash(&body).to_le_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;

    debug!(
        column = column.name(),
        path = %path.display(),
        rows = header.rows,
        bytes = body.len(),
        "Stored column snapshot"
    );
    Ok(())
}

/// Replace the column's rows with the snapshot in `dir`.
///
/// The column is left untouched unless the whole snapshot validates.
pub(crate) fn load<T, S>(column: &mut TypedColumn<T, S>, dir: &Path) -> Result<()>
where
    T: ColumnElement,
    S: ColumnStorage<T>,
{
    let path = snapshot_path(dir, column.name());
    let file = File::open(&path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    read_exact(&mut reader, &mut magic)?;
    if &magic != MAGIC {
        return Err(ColumnError::Format(format!("{} is not a column snapshot", path.display())));
    }

    let header: SnapshotHeader = bincode::deserialize_from(&mut reader).map_err(truncated)?;
    if header.version != FORMAT_VERSION {
        return Err(ColumnError::Format(format!("unsupported snapshot version {}", header.version)));
    }
    if header.codec != S::CODEC {
        return Err(ColumnError::Format(format!(
            "snapshot holds a {} column, expected {}",
            header.codec,
            S::CODEC
        )));
    }
    if header.attribute_type != T::ATTRIBUTE_TYPE {
        return Err(ColumnError::Format(format!(
            "snapshot holds {} values, expected {}",
            header.attribute_type,
            T::ATTRIBUTE_TYPE
        )));
    }

    let mut len = [0u8; 8];
    read_exact(&mut reader, &mut len)?;
    let len = u64::from_le_bytes(len);
    let mut crc = [0u8; 4];
    read_exact(&mut reader, &mut crc)?;
    let expected = u32::from_le_bytes(crc);

    let mut body = Vec::new();
    reader.take(len).read_to_end(&mut body)?;
    if body.len() as u64 != len {
        return Err(ColumnError::Format("truncated snapshot body".into()));
    }
    let actual = crc32fast::hash(&body);
    if actual != expected {
        return Err(ColumnError::ChecksumMismatch { expected, actual });
    }

    let mut storage: S = bincode::deserialize(&body)?;
    storage.finish_load()?;
    if storage.row_count() as u64 != header.rows {
        return Err(ColumnError::Format(format!(
            "snapshot header claims {} rows, body holds {}",
            header.rows,
            storage.row_count()
        )));
    }

    debug!(
        column = column.name(),
        path = %path.display(),
        rows = header.rows,
        "Loaded column snapshot"
    );
    column.restore(storage);
    Ok(())
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ColumnError::Format("truncated snapshot".into()),
        _ => ColumnError::Io(e),
    })
}

fn truncated(e: bincode::Error) -> ColumnError {
    let eof = matches!(&*e, bincode::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof);
    if eof {
        ColumnError::Format("truncated snapshot header".into())
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columnar::{Column, DictionaryColumn, PlainColumn, RleColumn};
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_keeps_layout() {
        let dir = tempdir().unwrap();
        let mut col = DictionaryColumn::<i32>::new("ints");
        col.extend([5, 3, 5, 3, 5]);
        col.remove(1).unwrap();
        col.store(dir.path()).unwrap();

        let mut loaded = DictionaryColumn::<i32>::new("ints");
        loaded.load(dir.path()).unwrap();
        assert_eq!(loaded.storage(), col.storage());
        assert!(loaded == col);
    }

    #[test]
    fn test_load_replaces_existing_rows() {
        let dir = tempdir().unwrap();
        let mut col = RleColumn::<String>::new("names");
        col.extend(["a", "a", "b"].map(String::from));
        col.store(dir.path()).unwrap();

        let mut target = RleColumn::<String>::new("names");
        target.push("zzz".into());
        target.load(dir.path()).unwrap();
        assert_eq!(target.to_vec(), col.to_vec());
        assert_eq!(target.storage().runs().len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let mut col = PlainColumn::<i32>::new("absent");
        assert!(matches!(col.load(dir.path()), Err(ColumnError::Io(_))));
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("ints"), b"NOTACOLUMNFILE").unwrap();
        let mut col = PlainColumn::<i32>::new("ints");
        let err = col.load(dir.path()).unwrap_err();
        assert!(matches!(err, ColumnError::Format(_)));
        assert!(err.is_corruption());
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("ints"), b"LUM").unwrap();
        let mut col = PlainColumn::<i32>::new("ints");
        assert!(matches!(col.load(dir.path()), Err(ColumnError::Format(_))));
    }

    #[test]
    fn test_corrupted_body_fails_checksum() {
        let dir = tempdir().unwrap();
        let mut col = PlainColumn::<i32>::new("ints");
        col.extend([1, 2, 3, 4]);
        col.store(dir.path()).unwrap();

        let path = dir.path().join("ints");
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        let mut loaded = PlainColumn::<i32>::new("ints");
        loaded.push(42);
        assert!(matches!(loaded.load(dir.path()), Err(ColumnError::ChecksumMismatch { .. })));
        assert_eq!(loaded.to_vec(), vec![42]);
    }

    #[test]
    fn test_shape_mismatch() {
        let dir = tempdir().unwrap();
        let mut col = PlainColumn::<i32>::new("col");
        col.push(1);
        col.store(dir.path()).unwrap();

        let mut floats = PlainColumn::<f32>::new("col");
        assert!(matches!(floats.load(dir.path()), Err(ColumnError::Format(_))));

        let mut dict = DictionaryColumn::<i32>::new("col");
        assert!(matches!(dict.load(dir.path()), Err(ColumnError::Format(_))));
    }
}
