//! Metafile structure parsing.
//!
//! Walks the record stream front to back: exactly one header record first,
//! then drawing/state records, terminated by EMR_EOF. Every record advances
//! the read position by exactly its declared size.

use crate::error::{Error, Result};
use crate::records::reader::RecordCursor;
use crate::records::types::{is_known_record_type, RecordKind, RectL, SizeL, ENHMETA_SIGNATURE};
use crate::records::{self, EmfRecord};
use log::{debug, warn};

/// EMR_HEADER: file-level metadata and the device bounds the canvas is
/// sized from.
#[derive(Debug, Clone)]
pub struct HeaderRecord {
    /// Drawing extents in device units, inclusive-inclusive.
    pub bounds: RectL,
    /// Frame rectangle in 0.01 mm units.
    pub frame: RectL,
    pub version: u32,
    pub bytes: u32,
    pub records: u32,
    pub handles: u16,
    pub n_description: u32,
    pub off_description: u32,
    pub n_pal_entries: u32,
    /// Reference device size in pixels.
    pub device: SizeL,
    /// Reference device size in millimeters.
    pub millimeters: SizeL,
}

impl HeaderRecord {
    /// Canvas width: bounds are inclusive on both ends.
    pub fn width(&self) -> u32 {
        (self.bounds.width() + 1).max(1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bounds.height() + 1).max(1) as u32
    }
}

/// EMR_EOF.
#[derive(Debug, Clone, Copy)]
pub struct EofRecord {
    pub n_pal_entries: u32,
    pub off_pal_entries: u32,
    pub size_last: u32,
}

/// A parsed metafile: the header, the playback records in file order, and
/// the EOF trailer.
#[derive(Debug)]
pub struct EmfFile {
    pub header: HeaderRecord,
    pub records: Vec<EmfRecord>,
    pub eof: EofRecord,
}

fn decode_header(body: &[u8]) -> Result<HeaderRecord> {
    let cur = &mut RecordCursor::new(body);
    let bounds = cur.read::<RectL>()?;
    let frame = cur.read::<RectL>()?;
    let signature = cur.read_u32()?;
    if signature != ENHMETA_SIGNATURE {
        return Err(Error::Malformed(format!("bad signature {signature:#010x}")));
    }
    let version = cur.read_u32()?;
    let bytes = cur.read_u32()?;
    let records = cur.read_u32()?;
    let handles = cur.read_u16()?;
    let _reserved = cur.read_u16()?;
    let n_description = cur.read_u32()?;
    let off_description = cur.read_u32()?;
    let n_pal_entries = cur.read_u32()?;
    let device = cur.read::<SizeL>()?;
    let millimeters = cur.read::<SizeL>()?;
    // Later header revisions append pixel-format and OpenGL fields; the
    // record loop advances past them by the declared size.
    Ok(HeaderRecord {
        bounds,
        frame,
        version,
        bytes,
        records,
        handles,
        n_description,
        off_description,
        n_pal_entries,
        device,
        millimeters,
    })
}

fn decode_eof(body: &[u8]) -> Result<EofRecord> {
    let cur = &mut RecordCursor::new(body);
    let n_pal_entries = cur.read_u32()?;
    let off_pal_entries = cur.read_u32()?;
    if n_pal_entries > 0 {
        warn!("ignoring {n_pal_entries} palette entries in EOF record");
    }
    let size_last = cur.read_u32()?;
    Ok(EofRecord {
        n_pal_entries,
        off_pal_entries,
        size_last,
    })
}

impl EmfFile {
    /// Parse a metafile from an in-memory byte buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut pos = 0usize;
        let mut header: Option<HeaderRecord> = None;
        let mut eof: Option<EofRecord> = None;
        let mut playback = Vec::new();

        while pos < data.len() {
            if data.len() - pos < 8 {
                return Err(Error::Malformed("truncated record".into()));
            }
            let rtype =
                u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
            let size =
                u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]]);
            if size < 8 || size % 4 != 0 {
                return Err(Error::Malformed(format!("invalid record size {size}")));
            }
            let size = size as usize;
            if data.len() - pos < size {
                return Err(Error::Malformed("truncated record".into()));
            }
            let body = &data[pos + 8..pos + size];

            if header.is_none() {
                if rtype != RecordKind::Header as u32 {
                    return Err(Error::Malformed(
                        "file does not start with a header record".into(),
                    ));
                }
                header = Some(decode_header(body)?);
            } else {
                match RecordKind::from_u32(rtype) {
                    Some(RecordKind::Header) => {
                        return Err(Error::Malformed("duplicate header record".into()));
                    }
                    Some(RecordKind::Eof) => {
                        eof = Some(decode_eof(body)?);
                        pos += size;
                        break;
                    }
                    Some(kind) => playback.push(records::decode(kind, body)?),
                    None => {
                        if is_known_record_type(rtype) {
                            playback.push(EmfRecord::Skipped { kind: rtype });
                        } else {
                            debug!("skipping unknown record type {rtype} ({size} bytes)");
                            playback.push(EmfRecord::Unknown {
                                kind: rtype,
                                size: size as u32,
                            });
                        }
                    }
                }
            }
            pos += size;
        }

        let header = header.ok_or_else(|| Error::Malformed("missing header record".into()))?;
        let eof = eof.ok_or_else(|| Error::Malformed("missing EOF record".into()))?;
        if pos < data.len() {
            debug!("{} trailing bytes after EOF record", data.len() - pos);
        }

        Ok(EmfFile {
            header,
            records: playback,
            eof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rtype: u32, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&rtype.to_le_bytes());
        out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn header_record(bounds: (i32, i32, i32, i32)) -> Vec<u8> {
        let mut body = Vec::new();
        for v in [bounds.0, bounds.1, bounds.2, bounds.3] {
            body.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0i32, 0, 1000, 1000] {
            body.extend_from_slice(&v.to_le_bytes()); // frame
        }
        body.extend_from_slice(&ENHMETA_SIGNATURE.to_le_bytes());
        body.extend_from_slice(&0x0001_0000u32.to_le_bytes()); // version
        body.extend_from_slice(&0u32.to_le_bytes()); // bytes
        body.extend_from_slice(&3u32.to_le_bytes()); // records
        body.extend_from_slice(&1u16.to_le_bytes()); // handles
        body.extend_from_slice(&0u16.to_le_bytes()); // reserved
        body.extend_from_slice(&[0u8; 12]); // description, palette
        for v in [1920i32, 1080, 509, 286] {
            body.extend_from_slice(&v.to_le_bytes()); // device, millimeters
        }
        record(1, &body)
    }

    fn eof_record() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());
        body.extend_from_slice(&20u32.to_le_bytes());
        record(14, &body)
    }

    #[test]
    fn test_minimal_file() {
        let mut data = header_record((0, 0, 10, 10));
        data.extend_from_slice(&eof_record());

        let file = EmfFile::parse(&data).unwrap();
        assert_eq!(file.header.width(), 11);
        assert_eq!(file.header.height(), 11);
        assert!(file.records.is_empty());
        assert_eq!(file.eof.size_last, 20);
    }

    #[test]
    fn test_bad_signature() {
        let mut data = header_record((0, 0, 10, 10));
        data[8 + 32] ^= 0xFF; // corrupt signature
        data.extend_from_slice(&eof_record());
        assert!(matches!(EmfFile::parse(&data), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_size_too_small() {
        let mut data = header_record((0, 0, 10, 10));
        data.extend_from_slice(&33u32.to_le_bytes());
        data.extend_from_slice(&4u32.to_le_bytes()); // size < 8
        assert!(matches!(EmfFile::parse(&data), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_misaligned_size() {
        let mut data = header_record((0, 0, 10, 10));
        let mut body = vec![0u8; 6];
        let mut rec = Vec::new();
        rec.extend_from_slice(&33u32.to_le_bytes());
        rec.extend_from_slice(&14u32.to_le_bytes()); // not a multiple of 4
        rec.append(&mut body);
        data.extend_from_slice(&rec);
        assert!(matches!(EmfFile::parse(&data), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_truncated_record_body() {
        let mut data = header_record((0, 0, 10, 10));
        data.extend_from_slice(&27u32.to_le_bytes());
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]); // declares 16, provides 12
        assert!(matches!(EmfFile::parse(&data), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_unknown_type_skipped_by_size() {
        let mut data = header_record((0, 0, 10, 10));
        data.extend_from_slice(&record(0x4001, &[0u8; 12])); // EMF+ comment range
        data.extend_from_slice(&eof_record());

        let file = EmfFile::parse(&data).unwrap();
        assert_eq!(file.records.len(), 1);
        assert!(matches!(
            file.records[0],
            EmfRecord::Unknown { kind: 0x4001, size: 20 }
        ));
    }

    #[test]
    fn test_known_unsupported_type_skipped_silently() {
        let mut data = header_record((0, 0, 10, 10));
        data.extend_from_slice(&record(42, &[0u8; 16])); // ellipse
        data.extend_from_slice(&eof_record());

        let file = EmfFile::parse(&data).unwrap();
        assert!(matches!(file.records[0], EmfRecord::Skipped { kind: 42 }));
    }

    #[test]
    fn test_records_after_eof_ignored() {
        let mut data = header_record((0, 0, 10, 10));
        data.extend_from_slice(&eof_record());
        data.extend_from_slice(&record(27, &[0u8; 8])); // trailing junk

        let file = EmfFile::parse(&data).unwrap();
        assert!(file.records.is_empty());
    }

    #[test]
    fn test_missing_eof() {
        let data = header_record((0, 0, 10, 10));
        assert!(matches!(EmfFile::parse(&data), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_first_record_must_be_header() {
        let data = eof_record();
        assert!(matches!(EmfFile::parse(&data), Err(Error::Malformed(_))));
    }
}
