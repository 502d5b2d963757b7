//! # Wire Framing
//!
//! ```text
//! [len: u32 BE][bincode(Message): len bytes]
//! ```
//!
//! A connection starts with one `Hello` in each direction; everything after
//! that is `Block`.

use serde::{Deserialize, Serialize};
use seq_types::Block;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::PeerId;
use crate::errors::GossipError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Hello {
        peer_id: PeerId,
        listen_port: u16,
    },
    Block {
        /// Node that first broadcast the block.
        origin: PeerId,
        block: Block,
        /// Origin's ed25519 signature over the block hash.
        signature: Vec<u8>,
    },
}

/// Encode `message` as a length-prefixed frame.
pub fn encode(message: &Message, max_frame_bytes: usize) -> Result<Vec<u8>, GossipError> {
    let body = bincode::serialize(message).map_err(|e| GossipError::Encoding(e.to_string()))?;
    if body.len() > max_frame_bytes {
        return Err(GossipError::FrameTooLarge {
            size: body.len(),
            max: max_frame_bytes,
        });
    }

    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Read one message. `Ok(None)` on a clean end of stream.
pub async fn read_message<R>(reader: &mut R, max_frame_bytes: usize) -> Result<Option<Message>, GossipError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if len > max_frame_bytes {
        return Err(GossipError::FrameTooLarge {
            size: len,
            max: max_frame_bytes,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    bincode::deserialize(&body)
        .map(Some)
        .map_err(|e| GossipError::Encoding(e.to_string()))
}

pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<(), GossipError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await?;
    Ok(())
}
