//! Binary FBX node-record codec.
//!
//! Decodes the whole file into an [`FbxDocument`] tree and encodes it back.
//! Nothing here knows about scenes, models or meshes.

mod error;
mod node;
mod reader;
mod writer;

pub use error::{FbxError, FbxResult};
pub use node::{FbxDocument, FbxNode, Property};
pub use reader::decode_document;
pub use writer::encode_document;

pub const MAGIC: &[u8; 23] = b"Kaydara FBX Binary  \x00\x1a\x00";

pub const FOOTER_MAGIC: [u8; 16] = [
    0xf8, 0x5a, 0x8c, 0x6a, 0xde, 0xf5, 0xd9, 0x7e, 0xec, 0xe9, 0x0c, 0xe3, 0x75, 0x8f, 0x29, 0x0b,
];
