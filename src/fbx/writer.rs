use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::node::{uses_wide_records, FbxDocument, FbxNode, Property};
use super::{FbxError, FbxResult, FOOTER_MAGIC, MAGIC};

/// Encodes a document as binary FBX. Arrays are always written uncompressed.
pub fn encode_document(document: &FbxDocument) -> FbxResult<Vec<u8>> {
    let mut writer = RecordWriter {
        buffer: Vec::new(),
        version: document.version,
        wide: uses_wide_records(document.version),
    };

    writer.buffer.extend_from_slice(MAGIC);
    writer.buffer.write_u32::<LittleEndian>(document.version)?;

    for node in &document.nodes {
        writer.write_node(node)?;
    }
    writer.write_null_record();
    writer.write_footer(document)?;

    Ok(writer.buffer)
}

struct RecordWriter {
    buffer: Vec<u8>,
    version: u32,
    wide: bool,
}

impl RecordWriter {
    fn offset_size(&self) -> usize {
        if self.wide {
            8
        } else {
            4
        }
    }

    fn narrow(&self, what: &'static str, value: usize) -> FbxResult<u32> {
        u32::try_from(value).map_err(|_| FbxError::OffsetOverflow {
            what,
            value,
            version: self.version,
        })
    }

    fn write_offset(&mut self, what: &'static str, value: usize) -> FbxResult<()> {
        if self.wide {
            self.buffer.write_u64::<LittleEndian>(value as u64)?;
        } else {
            let value = self.narrow(what, value)?;
            self.buffer.write_u32::<LittleEndian>(value)?;
        }

        Ok(())
    }

    fn patch_offset(&mut self, what: &'static str, at: usize, value: usize) -> FbxResult<()> {
        if self.wide {
            LittleEndian::write_u64(&mut self.buffer[at..at + 8], value as u64);
        } else {
            let value = self.narrow(what, value)?;
            LittleEndian::write_u32(&mut self.buffer[at..at + 4], value);
        }

        Ok(())
    }

    fn write_null_record(&mut self) {
        let len = 3 * self.offset_size() + 1;
        self.buffer.resize(self.buffer.len() + len, 0);
    }

    fn write_node(&mut self, node: &FbxNode) -> FbxResult<()> {
        let header_at = self.buffer.len();
        let name = node.name.as_bytes();
        let name_len = u8::try_from(name.len()).map_err(|_| FbxError::NameTooLong(name.len()))?;

        // end offset and property list length are patched once known
        self.write_offset("end offset", 0)?;
        self.write_offset("property count", node.properties.len())?;
        self.write_offset("property list length", 0)?;
        self.buffer.write_u8(name_len)?;
        self.buffer.extend_from_slice(name);

        let properties_at = self.buffer.len();
        for property in &node.properties {
            self.write_property(property)?;
        }
        let property_list_len = self.buffer.len() - properties_at;

        if node.explicit_null_record || !node.children.is_empty() || node.properties.is_empty() {
            for child in &node.children {
                self.write_node(child)?;
            }
            self.write_null_record();
        }

        let end_offset = self.buffer.len();
        let size = self.offset_size();
        self.patch_offset("end offset", header_at, end_offset)?;
        self.patch_offset("property list length", header_at + 2 * size, property_list_len)?;

        Ok(())
    }

    fn write_property(&mut self, property: &Property) -> FbxResult<()> {
        self.buffer.write_u8(property.type_code())?;

        match property {
            Property::I16(value) => self.buffer.write_i16::<LittleEndian>(*value)?,
            Property::Bool(value) => self.buffer.write_u8(u8::from(*value))?,
            Property::I32(value) => self.buffer.write_i32::<LittleEndian>(*value)?,
            Property::F32(value) => self.buffer.write_f32::<LittleEndian>(*value)?,
            Property::F64(value) => self.buffer.write_f64::<LittleEndian>(*value)?,
            Property::I64(value) => self.buffer.write_i64::<LittleEndian>(*value)?,
            Property::F32Array(values) => {
                self.write_array_header(values.len(), 4)?;
                for value in values {
                    self.buffer.write_f32::<LittleEndian>(*value)?;
                }
            }
            Property::F64Array(values) => {
                self.write_array_header(values.len(), 8)?;
                for value in values {
                    self.buffer.write_f64::<LittleEndian>(*value)?;
                }
            }
            Property::I64Array(values) => {
                self.write_array_header(values.len(), 8)?;
                for value in values {
                    self.buffer.write_i64::<LittleEndian>(*value)?;
                }
            }
            Property::I32Array(values) => {
                self.write_array_header(values.len(), 4)?;
                for value in values {
                    self.buffer.write_i32::<LittleEndian>(*value)?;
                }
            }
            Property::BoolArray(values) => {
                self.write_array_header(values.len(), 1)?;
                self.buffer.extend(values.iter().map(|&value| u8::from(value)));
            }
            Property::String(bytes) | Property::Raw(bytes) => {
                let len = self.narrow("string length", bytes.len())?;
                self.buffer.write_u32::<LittleEndian>(len)?;
                self.buffer.extend_from_slice(bytes);
            }
        }

        Ok(())
    }

    fn write_array_header(&mut self, count: usize, element_size: usize) -> FbxResult<()> {
        let count_field = self.narrow("array length", count)?;
        let byte_len = self.narrow("array byte length", count * element_size)?;

        self.buffer.write_u32::<LittleEndian>(count_field)?;
        self.buffer.write_u32::<LittleEndian>(0)?;
        self.buffer.write_u32::<LittleEndian>(byte_len)?;

        Ok(())
    }

    fn write_footer(&mut self, document: &FbxDocument) -> FbxResult<()> {
        self.buffer.extend_from_slice(&document.footer_id);
        self.buffer.extend_from_slice(&[0; 4]);

        let padding = match self.buffer.len() % 16 {
            0 => 16,
            rem => 16 - rem,
        };
        self.buffer.resize(self.buffer.len() + padding, 0);

        self.buffer.write_u32::<LittleEndian>(document.version)?;
        self.buffer.resize(self.buffer.len() + 120, 0);
        self.buffer.extend_from_slice(&FOOTER_MAGIC);

        Ok(())
    }
}
