use bincode::{
    Decode, Encode,
    config::{self, Config},
    error::{DecodeError, EncodeError},
};
use std::io::{self, Read, Write};

/// Maximum allowed message size (1MB) to prevent DoS attacks via unbounded allocation
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Fixed-width little-endian integers, one-byte bools, and u64
/// length-prefixed text.
fn wire_config() -> impl Config {
    config::legacy().with_limit::<MAX_MESSAGE_SIZE>()
}

fn encode_error(error: EncodeError) -> io::Error {
    match error {
        EncodeError::Io { inner, .. } => inner,
        error => io::Error::new(io::ErrorKind::InvalidData, error.to_string()),
    }
}

fn decode_error(error: DecodeError) -> io::Error {
    match error {
        DecodeError::Io { inner, .. } => inner,
        DecodeError::UnexpectedEnd { .. } => io::ErrorKind::UnexpectedEof.into(),
        error => io::Error::new(io::ErrorKind::InvalidData, error.to_string()),
    }
}

/// Encodes a value into its wire bytes.
pub fn encode<T: Encode>(value: T) -> io::Result<Vec<u8>> {
    let buf = bincode::encode_to_vec(value, wire_config()).map_err(encode_error)?;
    if buf.len() > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "serialized message size {} exceeds maximum allowed size of {} bytes",
                buf.len(),
                MAX_MESSAGE_SIZE
            ),
        ));
    }
    Ok(buf)
}

/// Reads one value. A would-block error means the peer stopped
/// mid-message and is reported as invalid data.
pub fn read_value<T: Decode<()>, R: Read>(reader: &mut R) -> io::Result<T> {
    bincode::decode_from_std_read(reader, wire_config())
        .map_err(decode_error)
        .map_err(|error| match error.kind() {
            io::ErrorKind::WouldBlock => io::ErrorKind::InvalidData.into(),
            _ => error,
        })
}

/// Writes one value. The encoded bytes go out in a single chunk so a
/// reader never sees half a message from an interleaved writer.
pub fn write_value<T: Encode, W: Write>(writer: &mut W, value: T) -> io::Result<()> {
    let buf = encode(value)?;
    writer.write_all(&buf)?;
    writer.flush()
}
