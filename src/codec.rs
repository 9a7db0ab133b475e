use bytes::{Buf, BytesMut};
use std::io::Cursor;
use tokio_util::codec::Decoder;

use crate::frame::{self, Frame};
use crate::Error;

/// Decodes RESP frames out of a byte stream. Refuses to buffer more than `max_frame_size` bytes
/// of a single incomplete frame.
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> FrameCodec {
        FrameCodec { max_frame_size }
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            // Not enough data to parse a frame.
            Err(frame::Error::Incomplete) => {
                if src.len() > self.max_frame_size {
                    return Err("frame size exceeds limit".into());
                }
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let position = usize::try_from(cursor.position())?;

        // Remove the parsed frame from the buffer.
        src.advance(position);

        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn decodes_consecutive_frames() {
        let mut codec = FrameCodec::new(1024);
        let mut buf = BytesMut::from(&b"+OK\r\n:42\r\n$3\r\nf"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Frame::Simple("OK".to_string()))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Frame::Integer(42)));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"oo\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Frame::Bulk(Bytes::from("foo")))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn rejects_oversized_frames() {
        let mut codec = FrameCodec::new(8);
        let mut buf = BytesMut::from(&b"$100\r\naaaaaaaaaa"[..]);

        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn rejects_invalid_data() {
        let mut codec = FrameCodec::new(1024);
        let mut buf = BytesMut::from(&b"?what\r\n"[..]);

        assert!(codec.decode(&mut buf).is_err());
    }
}
