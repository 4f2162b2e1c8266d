//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian
//! length. Intents travel panel -> daemon; notifications (`events` module)
//! travel daemon -> panel. The two directions are independent channels,
//! never correlated request/response pairs.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame body
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Intents, panel -> daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Intent {
    /// Final slider value for one source (sent once per gesture)
    SetVolume { source: String, volume: i32 },

    /// Request a full table snapshot
    GetCurrentVolumes,

    /// Per-source mute button; the panel's mute-all button sends the
    /// reserved source id `master`
    ToggleMute { source: String },
}

/// Read one length-prefixed JSON frame. Returns Ok(None) on clean EOF.
pub async fn read_frame<T, R>(reader: &mut R) -> Result<Option<T>>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        bail!("frame too large: {len} bytes");
    }

    let mut msg_buf = vec![0u8; len];
    reader.read_exact(&mut msg_buf).await?;

    let msg = serde_json::from_slice(&msg_buf).context("failed to parse message")?;
    Ok(Some(msg))
}

/// Write one length-prefixed JSON frame
pub async fn write_frame<T, W>(writer: &mut W, msg: &T) -> Result<()>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    writer.write_all(&msg_len).await?;
    writer.write_all(&msg_bytes).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_tags() {
        let intent = Intent::SetVolume {
            source: "browser".to_string(),
            volume: 70,
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains(r#""type":"set-volume""#));
        assert!(json.contains(r#""source":"browser""#));

        let json = serde_json::to_string(&Intent::GetCurrentVolumes).unwrap();
        assert_eq!(json, r#"{"type":"get-current-volumes"}"#);
    }

    #[tokio::test]
    async fn test_frame_round_trip() {
        let (mut a, mut b) = tokio::io::duplex(256);

        let intent = Intent::ToggleMute {
            source: "master".to_string(),
        };
        write_frame(&mut a, &intent).await.unwrap();

        let decoded: Intent = read_frame(&mut b).await.unwrap().unwrap();
        assert!(matches!(decoded, Intent::ToggleMute { source } if source == "master"));
    }

    #[tokio::test]
    async fn test_clean_eof_yields_none() {
        let (a, mut b) = tokio::io::duplex(64);
        drop(a);

        let decoded: Option<Intent> = read_frame(&mut b).await.unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);

        let len = ((MAX_FRAME_LEN + 1) as u32).to_le_bytes();
        a.write_all(&len).await.unwrap();

        let result: Result<Option<Intent>> = read_frame(&mut b).await;
        assert!(result.is_err());
    }
}
