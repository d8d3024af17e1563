use std::borrow::Cow;
use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};

use super::node::{uses_wide_records, FbxDocument, FbxNode, Property, DEFAULT_FOOTER_ID};
use super::{FbxError, FbxResult, MAGIC};

/// Largest decoded array accepted, checked before anything is inflated.
const MAX_ARRAY_BYTES: usize = 1 << 30;

pub fn decode_document(data: &[u8]) -> FbxResult<FbxDocument> {
    if !data.starts_with(MAGIC) {
        if is_ascii_fbx(data) {
            return Err(FbxError::AsciiUnsupported);
        }

        return Err(FbxError::BadMagic);
    }

    let mut reader = RecordReader {
        cursor: Cursor::new(data),
        wide: false,
    };
    reader.cursor.set_position(MAGIC.len() as u64);

    let version = reader.read_u32()?;
    reader.wide = uses_wide_records(version);

    let mut nodes = Vec::new();
    while reader.remaining() >= reader.null_record_len() {
        match reader.read_node()? {
            Some(node) => nodes.push(node),
            None => break,
        }
    }

    let footer_id = reader.read_footer_id();

    log::trace!(
        "Decoded FBX {} document with {} top-level nodes",
        version,
        nodes.len()
    );

    Ok(FbxDocument {
        version,
        nodes,
        footer_id,
    })
}

fn is_ascii_fbx(data: &[u8]) -> bool {
    let data = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);
    let start = data
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(data.len());
    let text = &data[start..];

    text.starts_with(b";") || text.starts_with(b"FBXHeaderExtension")
}

struct RecordReader<'a> {
    cursor: Cursor<&'a [u8]>,
    wide: bool,
}

impl<'a> RecordReader<'a> {
    fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position())
    }

    fn null_record_len(&self) -> u64 {
        if self.wide {
            25
        } else {
            13
        }
    }

    fn check<T>(offset: u64, result: io::Result<T>) -> FbxResult<T> {
        result.map_err(|error| match error.kind() {
            io::ErrorKind::UnexpectedEof => FbxError::UnexpectedEof { offset },
            _ => FbxError::Io(error),
        })
    }

    fn read_u8(&mut self) -> FbxResult<u8> {
        let offset = self.position();
        Self::check(offset, self.cursor.read_u8())
    }

    fn read_i16(&mut self) -> FbxResult<i16> {
        let offset = self.position();
        Self::check(offset, self.cursor.read_i16::<LittleEndian>())
    }

    fn read_u32(&mut self) -> FbxResult<u32> {
        let offset = self.position();
        Self::check(offset, self.cursor.read_u32::<LittleEndian>())
    }

    fn read_i32(&mut self) -> FbxResult<i32> {
        let offset = self.position();
        Self::check(offset, self.cursor.read_i32::<LittleEndian>())
    }

    fn read_i64(&mut self) -> FbxResult<i64> {
        let offset = self.position();
        Self::check(offset, self.cursor.read_i64::<LittleEndian>())
    }

    fn read_f32(&mut self) -> FbxResult<f32> {
        let offset = self.position();
        Self::check(offset, self.cursor.read_f32::<LittleEndian>())
    }

    fn read_f64(&mut self) -> FbxResult<f64> {
        let offset = self.position();
        Self::check(offset, self.cursor.read_f64::<LittleEndian>())
    }

    fn read_offset(&mut self) -> FbxResult<u64> {
        let offset = self.position();
        if self.wide {
            Self::check(offset, self.cursor.read_u64::<LittleEndian>())
        } else {
            Self::check(offset, self.cursor.read_u32::<LittleEndian>()).map(u64::from)
        }
    }

    fn read_bytes(&mut self, len: usize) -> FbxResult<&'a [u8]> {
        let offset = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = usize::try_from(offset).map_err(|_| FbxError::UnexpectedEof { offset })?;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or(FbxError::UnexpectedEof { offset })?;

        self.cursor.set_position(end as u64);
        Ok(&data[start..end])
    }

    fn read_footer_id(&mut self) -> [u8; 16] {
        self.read_bytes(16)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .unwrap_or(DEFAULT_FOOTER_ID)
    }

    fn read_node(&mut self) -> FbxResult<Option<FbxNode>> {
        let offset = self.position();
        let end_offset = self.read_offset()?;
        let property_count = self.read_offset()?;
        let _property_list_len = self.read_offset()?;
        let name_len = self.read_u8()?;

        if end_offset == 0 {
            return Ok(None);
        }

        if end_offset <= offset || end_offset > self.len() {
            return Err(FbxError::BadNodeEnd { offset, end_offset });
        }

        let name = std::str::from_utf8(self.read_bytes(name_len.into())?)
            .map_err(|_| FbxError::InvalidNodeName { offset })?
            .to_owned();

        let mut properties = Vec::with_capacity(property_count.min(64) as usize);
        for _ in 0..property_count {
            properties.push(self.read_property()?);
        }

        let mut children = Vec::new();
        let mut null_record = false;
        while self.position() < end_offset {
            match self.read_node()? {
                Some(child) => children.push(child),
                None => {
                    null_record = true;
                    break;
                }
            }
        }

        if self.position() != end_offset {
            return Err(FbxError::BadNodeEnd { offset, end_offset });
        }

        // Only recorded where the writer would not emit a null record on its own.
        let explicit_null_record = null_record && children.is_empty() && !properties.is_empty();

        Ok(Some(FbxNode {
            name,
            properties,
            children,
            explicit_null_record,
        }))
    }

    fn read_property(&mut self) -> FbxResult<Property> {
        let offset = self.position();
        let code = self.read_u8()?;

        let property = match code {
            b'Y' => Property::I16(self.read_i16()?),
            b'C' => Property::Bool(self.read_u8()? != 0),
            b'I' => Property::I32(self.read_i32()?),
            b'F' => Property::F32(self.read_f32()?),
            b'D' => Property::F64(self.read_f64()?),
            b'L' => Property::I64(self.read_i64()?),
            b'f' => Property::F32Array(self.read_array(4, |c| c.read_f32::<LittleEndian>())?),
            b'd' => Property::F64Array(self.read_array(8, |c| c.read_f64::<LittleEndian>())?),
            b'l' => Property::I64Array(self.read_array(8, |c| c.read_i64::<LittleEndian>())?),
            b'i' => Property::I32Array(self.read_array(4, |c| c.read_i32::<LittleEndian>())?),
            b'b' => Property::BoolArray(self.read_array(1, |c| c.read_u8().map(|b| b != 0))?),
            b'S' => {
                let len = self.read_u32()? as usize;
                Property::String(self.read_bytes(len)?.to_vec())
            }
            b'R' => {
                let len = self.read_u32()? as usize;
                Property::Raw(self.read_bytes(len)?.to_vec())
            }
            _ => return Err(FbxError::UnknownPropertyType { code, offset }),
        };

        Ok(property)
    }

    fn read_array<T>(
        &mut self,
        element_size: usize,
        mut read_element: impl FnMut(&mut Cursor<&[u8]>) -> io::Result<T>,
    ) -> FbxResult<Vec<T>> {
        let offset = self.position();
        let count = self.read_u32()? as usize;
        let encoding = self.read_u32()?;
        let stored_len = self.read_u32()? as usize;

        let expected = count.saturating_mul(element_size);
        if expected > MAX_ARRAY_BYTES {
            return Err(FbxError::ArrayTooLarge {
                offset,
                len: expected,
                limit: MAX_ARRAY_BYTES,
            });
        }

        let stored = self.read_bytes(stored_len)?;

        let data: Cow<[u8]> = match encoding {
            0 => Cow::Borrowed(stored),
            1 => Cow::Owned(
                inflate::inflate_bytes_zlib(stored)
                    .map_err(|message| FbxError::Inflate { offset, message })?,
            ),
            _ => return Err(FbxError::UnknownArrayEncoding { encoding, offset }),
        };

        if data.len() != expected {
            return Err(FbxError::ArrayLength {
                offset,
                expected,
                got: data.len(),
            });
        }

        let mut cursor = Cursor::new(data.as_ref());
        let values = (0..count)
            .map(|_| read_element(&mut cursor))
            .collect::<io::Result<Vec<T>>>()?;

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // inflate has no encoder, so compressed fixtures are built as stored deflate blocks.
    fn zlib_stored(data: &[u8]) -> Vec<u8> {
        let len = data.len() as u16;
        let mut out = vec![0x78, 0x01, 0x01];
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(data);

        let (mut a, mut b) = (1u32, 0u32);
        for &byte in data {
            a = (a + u32::from(byte)) % 65521;
            b = (b + a) % 65521;
        }
        out.extend_from_slice(&((b << 16) | a).to_be_bytes());
        out
    }

    /// A 7.4 file with a single `Vertices` node whose array is zlib-encoded.
    fn compressed_vertices_file(values: &[f64]) -> Vec<u8> {
        let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let packed = zlib_stored(&raw);

        let mut property = vec![b'd'];
        property.extend_from_slice(&(values.len() as u32).to_le_bytes());
        property.extend_from_slice(&1u32.to_le_bytes());
        property.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        property.extend_from_slice(&packed);

        let name = b"Vertices";
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&7400u32.to_le_bytes());
        let end = data.len() + 13 + name.len() + property.len();
        data.extend_from_slice(&(end as u32).to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&(property.len() as u32).to_le_bytes());
        data.push(name.len() as u8);
        data.extend_from_slice(name);
        data.extend_from_slice(&property);
        data.extend_from_slice(&[0; 13]);
        data
    }

    #[test]
    fn inflates_compressed_arrays() {
        let document = decode_document(&compressed_vertices_file(&[1.0, 2.0, 3.0, -4.5])).unwrap();

        assert_eq!(document.version, 7400);
        assert_eq!(document.nodes.len(), 1);
        assert_eq!(document.nodes[0].name, "Vertices");
        assert_eq!(
            document.nodes[0].properties,
            vec![Property::F64Array(vec![1.0, 2.0, 3.0, -4.5])]
        );
        assert_eq!(document.footer_id, DEFAULT_FOOTER_ID);
    }

    #[test]
    fn rejects_ascii_fbx() {
        let data = b"; FBX 7.4.0 project file\n; ----\nFBXHeaderExtension:  {\n}";
        assert!(matches!(
            decode_document(data),
            Err(FbxError::AsciiUnsupported)
        ));

        let data = b"\xef\xbb\xbf  \nFBXHeaderExtension:  {\n}";
        assert!(matches!(
            decode_document(data),
            Err(FbxError::AsciiUnsupported)
        ));
    }

    #[test]
    fn rejects_unknown_magic() {
        assert!(matches!(
            decode_document(b"glTF\x02\x00\x00\x00"),
            Err(FbxError::BadMagic)
        ));
        assert!(matches!(decode_document(b""), Err(FbxError::BadMagic)));
    }

    #[test]
    fn reports_truncated_header() {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&[0xe8, 0x1c]);

        match decode_document(&data) {
            Err(FbxError::UnexpectedEof { offset }) => assert_eq!(offset, MAGIC.len() as u64),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }

    #[test]
    fn reports_truncated_node() {
        let mut data = compressed_vertices_file(&[1.0, 2.0, 3.0]);
        data.truncate(data.len() - 20);

        assert!(matches!(
            decode_document(&data),
            Err(FbxError::BadNodeEnd { .. })
        ));
    }

    #[test]
    fn rejects_unknown_property_type() {
        let name = b"Bad";
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&7400u32.to_le_bytes());
        let property_offset = data.len() + 13 + name.len();
        data.extend_from_slice(&((property_offset + 2) as u32).to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.push(name.len() as u8);
        data.extend_from_slice(name);
        data.extend_from_slice(&[b'Q', 0]);
        data.extend_from_slice(&[0; 13]);

        match decode_document(&data) {
            Err(FbxError::UnknownPropertyType { code, offset }) => {
                assert_eq!(code, b'Q');
                assert_eq!(offset, property_offset as u64);
            }
            other => panic!("expected UnknownPropertyType, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_array_encoding() {
        let mut data = compressed_vertices_file(&[1.0]);
        // encoding field follows magic, version, node header, name and type code
        let encoding_at = MAGIC.len() + 4 + 13 + b"Vertices".len() + 1 + 4;
        data[encoding_at] = 7;

        assert!(matches!(
            decode_document(&data),
            Err(FbxError::UnknownArrayEncoding { encoding: 7, .. })
        ));
    }

    #[test]
    fn rejects_oversized_arrays_before_inflating() {
        let mut data = compressed_vertices_file(&[1.0]);
        // count field follows magic, version, node header, name and type code
        let count_at = MAGIC.len() + 4 + 13 + b"Vertices".len() + 1;
        data[count_at..count_at + 4].copy_from_slice(&0x2000_0000u32.to_le_bytes());

        match decode_document(&data) {
            Err(FbxError::ArrayTooLarge { len, limit, .. }) => {
                assert_eq!(len, 0x2000_0000 * 8);
                assert_eq!(limit, MAX_ARRAY_BYTES);
            }
            other => panic!("expected ArrayTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn keeps_null_record_of_childless_node() {
        let name = b"AnimationLayer";
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&7400u32.to_le_bytes());
        let node_start = data.len();
        let end = node_start + 13 + name.len() + 9 + 13;
        data.extend_from_slice(&(end as u32).to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&9u32.to_le_bytes());
        data.push(name.len() as u8);
        data.extend_from_slice(name);
        data.push(b'L');
        data.extend_from_slice(&77i64.to_le_bytes());
        data.extend_from_slice(&[0; 13]);
        data.extend_from_slice(&[0; 13]);

        let document = decode_document(&data).unwrap();
        assert!(document.nodes[0].explicit_null_record);
        assert!(document.nodes[0].children.is_empty());

        let encoded = crate::fbx::encode_document(&document).unwrap();
        assert_eq!(&encoded[..end + 13], &data[..]);
        assert_eq!(decode_document(&encoded).unwrap(), document);
    }
}
