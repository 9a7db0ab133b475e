// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

// Commands are flat arrays; anything nested deeper than this is rejected.
const MAX_DEPTH: usize = 32;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("unsupported frame data type: {0:?}")]
    UnsupportedDataType(char),
    #[error("protocol error; arrays nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
    /// Invalid message encoding.
    #[error("{0}")]
    Other(crate::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

// Protocol specification: https://redis.io/docs/reference/protocol-spec/
impl Frame {
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Self::parse_nested(src, 0)
    }

    fn parse_nested(src: &mut Cursor<&[u8]>, depth: usize) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let string = get_line_string(src)?;
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => {
                let string = get_line_string(src)?;
                Ok(Frame::Error(string))
            }
            DataType::Integer => {
                let integer = get_line_string(src)?
                    .parse::<i64>()
                    .map_err(|e| Error::Other(e.into()))?;

                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => match get_length(src)? {
                None => Ok(Frame::Null),
                Some(length) => {
                    let data = get_exact_bytes(src, length)?;
                    Ok(Frame::Bulk(Bytes::copy_from_slice(data)))
                }
            },
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => match get_length(src)? {
                None => Ok(Frame::Null),
                Some(_) if depth >= MAX_DEPTH => Err(Error::TooDeep),
                Some(length) => {
                    let mut frames = Vec::with_capacity(length.min(1024));
                    for _ in 0..length {
                        frames.push(Self::parse_nested(src, depth + 1)?);
                    }
                    Ok(Frame::Array(frames))
                }
            },
            DataType::Null => {
                // Advance the cursor to the end of the frame.
                get_frame_bytes(src)?;

                Ok(Frame::Null)
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes);
        bytes
    }

    fn write_to(&self, dst: &mut Vec<u8>) {
        match self {
            Frame::Simple(s) => write_line(dst, DataType::SimpleString, s.as_bytes()),
            Frame::Error(s) => write_line(dst, DataType::SimpleError, s.as_bytes()),
            Frame::Integer(i) => write_line(dst, DataType::Integer, i.to_string().as_bytes()),
            Frame::Bulk(data) => {
                write_line(dst, DataType::BulkString, data.len().to_string().as_bytes());
                dst.extend_from_slice(data);
                dst.extend_from_slice(CRLF);
            }
            // RESP2 clients only understand the null bulk string.
            Frame::Null => write_line(dst, DataType::BulkString, b"-1"),
            Frame::Array(arr) => {
                write_line(dst, DataType::Array, arr.len().to_string().as_bytes());
                for frame in arr {
                    frame.write_to(dst);
                }
            }
        }
    }

    /// A score as a bulk string, in the shortest form that parses back to the same value.
    pub fn score(score: f64) -> Frame {
        Frame::Bulk(Bytes::from(score.to_string()))
    }

    /// Members, each optionally followed by its score, as a flat array.
    pub fn entries(entries: Vec<(Bytes, f64)>, with_scores: bool) -> Frame {
        let mut frames = Vec::with_capacity(entries.len() * if with_scores { 2 } else { 1 });
        for (member, score) in entries {
            frames.push(Frame::Bulk(member));
            if with_scores {
                frames.push(Frame::score(score));
            }
        }
        Frame::Array(frames)
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for frame in arr {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
        }
    }
}

fn write_line(dst: &mut Vec<u8>, data_type: DataType, line: &[u8]) {
    dst.push(u8::from(data_type));
    dst.extend_from_slice(line);
    dst.extend_from_slice(CRLF);
}

fn get_frame_bytes<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len();

    let frame_end_position = src.get_ref()[start..end]
        .windows(2)
        .position(|window| window == CRLF)
        .ok_or(Error::Incomplete)
        .map(|index| start + index)?;

    src.set_position((frame_end_position + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..frame_end_position])
}

fn get_line_string(src: &mut Cursor<&[u8]>) -> Result<String, Error> {
    let bytes = get_frame_bytes(src)?.to_vec();
    Ok(String::from_utf8(bytes)?)
}

// Reads a `<length>\r\n` header. `-1` is the RESP2 null marker.
fn get_length(src: &mut Cursor<&[u8]>) -> Result<Option<usize>, Error> {
    let length = get_line_string(src)?
        .parse::<i64>()
        .map_err(|e| Error::Other(e.into()))?;

    match length {
        -1 => Ok(None),
        length => usize::try_from(length)
            .map(Some)
            .map_err(|_| format!("protocol error; invalid length {length}").into()),
    }
}

// Bulk payloads are binary safe, so they are read by length rather than up to the next CRLF.
fn get_exact_bytes<'a>(src: &mut Cursor<&'a [u8]>, length: usize) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = start + length;

    if src.get_ref().len() < end + CRLF.len() {
        return Err(Error::Incomplete);
    }
    if &src.get_ref()[end..end + CRLF.len()] != CRLF {
        return Err("protocol error; bulk string is not terminated by CRLF".into());
    }

    src.set_position((end + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..end])
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
    // RESP3 null. Accepted from clients, never sent back.
    Null, // '_'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            b'_' => Ok(Self::Null),
            b'!' | b'#' | b',' | b'(' | b'=' | b'%' | b'~' | b'>' => {
                Err(Error::UnsupportedDataType(char::from(byte)))
            }
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
            DataType::Null => b'_',
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl From<&str> for Error {
    fn from(src: &str) -> Error {
        src.to_string().into()
    }
}

impl From<String> for Error {
    fn from(src: String) -> Error {
        Error::Other(src.into())
    }
}
