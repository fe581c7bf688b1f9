use crate::error::SinkError;
use async_trait::async_trait;
use model::records::batch::Batch;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt, Stdout},
    sync::{Mutex, mpsc},
};

/// Downstream end of the poller. A batch is either accepted whole or the
/// call fails and nothing may be assumed delivered.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, batch: Batch) -> Result<(), SinkError>;
}

/// Hands batches to the host over a bounded channel.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Batch>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Batch>) -> Self {
        Self { tx }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Batch>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn deliver(&self, batch: Batch) -> Result<(), SinkError> {
        // backpressure: waits for capacity
        self.tx.send(batch).await.map_err(|_| SinkError::Closed)
    }
}

/// Writes each event body as one line.
pub struct WriterSink<W> {
    out: Mutex<W>,
}

pub type StdoutSink = WriterSink<Stdout>;

impl StdoutSink {
    pub fn stdout() -> Self {
        WriterSink::new(tokio::io::stdout())
    }
}

impl<W> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> EventSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn deliver(&self, batch: Batch) -> Result<(), SinkError> {
        let mut out = self.out.lock().await;
        for event in &batch.events {
            out.write_all(&event.body).await?;
            out.write_all(b"\n").await?;
        }
        out.flush().await?;
        Ok(())
    }
}
