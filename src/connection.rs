use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Error;

/// A client connection: frames are decoded from the read half as they arrive, responses are
/// serialized straight into the write half.
pub struct Connection {
    pub id: Uuid,
    reader: FramedRead<OwnedReadHalf, FrameCodec>,
    writer: OwnedWriteHalf,
}

impl Connection {
    pub fn new(stream: TcpStream, max_frame_size: usize) -> Connection {
        let (reader, writer) = stream.into_split();

        Connection {
            id: Uuid::new_v4(),
            reader: FramedRead::new(reader, FrameCodec::new(max_frame_size)),
            writer,
        }
    }

    /// Reads the next frame. Returns `None` once the peer closed the connection cleanly.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        self.reader.next().await.transpose()
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        self.writer.write_all(&frame.serialize()).await?;
        Ok(())
    }
}
