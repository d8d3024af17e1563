use thiserror::Error;

pub type FbxResult<T> = Result<T, FbxError>;

#[derive(Debug, Error)]
pub enum FbxError {
    #[error("ASCII FBX files are not supported, re-export the asset as binary FBX")]
    AsciiUnsupported,

    #[error("not a binary FBX file (bad magic)")]
    BadMagic,

    #[error("unexpected end of file at offset {offset}")]
    UnexpectedEof { offset: u64 },

    #[error("unknown property type code {code:#04x} at offset {offset}")]
    UnknownPropertyType { code: u8, offset: u64 },

    #[error("unknown array encoding {encoding} at offset {offset}")]
    UnknownArrayEncoding { encoding: u32, offset: u64 },

    #[error("failed to inflate array at offset {offset}: {message}")]
    Inflate { offset: u64, message: String },

    #[error("array at offset {offset} has {got} bytes of data, expected {expected}")]
    ArrayLength {
        offset: u64,
        expected: usize,
        got: usize,
    },

    #[error("array at offset {offset} would decode to {len} bytes, the limit is {limit}")]
    ArrayTooLarge {
        offset: u64,
        len: usize,
        limit: usize,
    },

    #[error("node record at offset {offset} claims to end at {end_offset}")]
    BadNodeEnd { offset: u64, end_offset: u64 },

    #[error("node name at offset {offset} is not valid UTF-8")]
    InvalidNodeName { offset: u64 },

    #[error("node name is {0} bytes long, the limit is 255")]
    NameTooLong(usize),

    #[error("{what} of {value} does not fit a 32-bit FBX {version} record")]
    OffsetOverflow {
        what: &'static str,
        value: usize,
        version: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
