//! WebSocket を使った Connector 実装
//!
//! ## 責務
//!
//! - `tokio-tungstenite` で接続を確立する
//! - 接続を送信側 (`FrameSink`) と受信側 (`FrameStream`) に分割する
//! - テキスト以外のフレーム (binary, ping, pong) を受信側で読み飛ばす

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt, future, stream};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::domain::{Connector, FrameSink, FrameStream, TransportError};

/// WebSocket を使った Connector 実装
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &str) -> Result<(FrameSink, FrameStream), TransportError> {
        let (ws_stream, response) = connect_async(endpoint)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(
            "WebSocket handshake with {} completed (HTTP {})",
            endpoint,
            response.status()
        );

        let (write, read) = ws_stream.split();

        let sink = write
            .sink_map_err(|e| TransportError::Send(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, TransportError>(Message::Text(text.into()))));

        let stream = stream::unfold(read, |mut read| async move {
            loop {
                match read.next().await? {
                    Ok(Message::Text(text)) => return Some((Ok(text.as_str().to_owned()), read)),
                    Ok(Message::Binary(data)) => {
                        tracing::debug!("Ignoring {} bytes of binary data", data.len());
                    }
                    Ok(Message::Close(frame)) => {
                        tracing::info!("Server closed the connection: {:?}", frame);
                        return None;
                    }
                    // ping/pong are answered by tungstenite itself
                    Ok(_) => {}
                    Err(e) => return Some((Err(TransportError::Receive(e.to_string())), read)),
                }
            }
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
