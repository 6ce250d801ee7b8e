use bytes::Bytes;
use flux_config::SessionConfig;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::decoder::{ChunkDecoder, RtcpPacket, RtcpPlaceholder, RtpDecoder};
use crate::error::SessionError;
use crate::packet::RtpPacket;
use crate::stats::{SessionStats, StatsSnapshot};
use crate::transport::{Channel, Transport};

/// RTP/RTCP 接收会话
///
/// 每个通道一个读循环，读到的数据块经工作队列交给固定数量的分发 worker，
/// 解码结果发布到容量有限的输出队列。输出队列满时 worker 阻塞，读循环不受影响。
///
/// 连接读取失败时该通道的读循环退出，worker 处理完已排队的数据块后关闭输出队列，
/// 消费者随后收到 `None`。
pub struct RtpSession {
    media_rx: mpsc::Receiver<RtpPacket>,
    control_rx: mpsc::Receiver<RtcpPacket>,
    stats: Arc<SessionStats>,
}

impl RtpSession {
    /// 使用默认配置启动会话，必须在 tokio 运行时内调用
    pub fn new<M, C>(media: M, control: C) -> Self
    where
        M: Transport,
        C: Transport,
    {
        Self::spawn(media, control, &SessionConfig::default())
    }

    /// 使用指定配置启动会话
    pub fn with_config<M, C>(
        media: M,
        control: C,
        config: &SessionConfig,
    ) -> Result<Self, SessionError>
    where
        M: Transport,
        C: Transport,
    {
        config
            .validate()
            .map_err(|e| SessionError::InvalidConfig(e.to_string()))?;
        Ok(Self::spawn(media, control, config))
    }

    fn spawn<M, C>(media: M, control: C, config: &SessionConfig) -> Self
    where
        M: Transport,
        C: Transport,
    {
        let stats = Arc::new(SessionStats::default());

        let media_rx = spawn_channel(Channel::Media, media, RtpDecoder, config, stats.clone());
        let control_rx = spawn_channel(
            Channel::Control,
            control,
            RtcpPlaceholder,
            config,
            stats.clone(),
        );

        info!(
            target: "rtp_session",
            queue_capacity = config.queue_capacity,
            dispatch_workers = config.dispatch_workers,
            "RTP session started"
        );

        Self {
            media_rx,
            control_rx,
            stats,
        }
    }

    /// 接收下一个 RTP 包，媒体通道结束后返回 `None`
    pub async fn recv_media(&mut self) -> Option<RtpPacket> {
        self.media_rx.recv().await
    }

    /// 接收下一个 RTCP 值，控制通道结束后返回 `None`
    pub async fn recv_control(&mut self) -> Option<RtcpPacket> {
        self.control_rx.recv().await
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// 共享的统计计数器，拆分消费端后仍可读取
    pub fn stats_handle(&self) -> Arc<SessionStats> {
        self.stats.clone()
    }

    /// 拆分为两个独立的消费端
    pub fn into_receivers(self) -> (mpsc::Receiver<RtpPacket>, mpsc::Receiver<RtcpPacket>) {
        (self.media_rx, self.control_rx)
    }
}

fn spawn_channel<T, D>(
    channel: Channel,
    transport: T,
    decoder: D,
    config: &SessionConfig,
    stats: Arc<SessionStats>,
) -> mpsc::Receiver<D::Output>
where
    T: Transport,
    D: ChunkDecoder,
{
    let (out_tx, out_rx) = mpsc::channel(config.queue_capacity);
    let (work_tx, work_rx) = mpsc::channel(config.work_queue_capacity);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let decoder = Arc::new(decoder);

    for worker in 0..config.dispatch_workers {
        tokio::spawn(dispatch_worker(
            channel,
            worker,
            decoder.clone(),
            work_rx.clone(),
            out_tx.clone(),
            stats.clone(),
        ));
    }

    tokio::spawn(read_loop(
        channel,
        transport,
        config.chunk_size,
        work_tx,
        stats,
    ));

    out_rx
}

/// 读循环：读取数据块，复制出独立缓冲区后交给 worker
async fn read_loop<T: Transport>(
    channel: Channel,
    mut transport: T,
    chunk_size: usize,
    work_tx: mpsc::Sender<Bytes>,
    stats: Arc<SessionStats>,
) {
    let mut buffer = vec![0u8; chunk_size];

    loop {
        match transport.read_chunk(&mut buffer).await {
            Ok(len) => {
                stats.channel(channel).record_chunk();
                let chunk = Bytes::copy_from_slice(&buffer[..len]);

                if work_tx.send(chunk).await.is_err() {
                    info!(
                        target: "rtp_session",
                        %channel,
                        "All dispatch workers stopped, ending read loop"
                    );
                    break;
                }
            }
            Err(source) => {
                let err = SessionError::TransportRead { channel, source };
                error!(target: "rtp_session", "{}", err);
                break;
            }
        }
    }
    // work_tx 在此释放，worker 排空队列后关闭输出队列
}

/// 分发 worker：解码并发布到输出队列
async fn dispatch_worker<D: ChunkDecoder>(
    channel: Channel,
    worker: usize,
    decoder: Arc<D>,
    work_rx: Arc<Mutex<mpsc::Receiver<Bytes>>>,
    out_tx: mpsc::Sender<D::Output>,
    stats: Arc<SessionStats>,
) {
    loop {
        let chunk = {
            let mut rx = work_rx.lock().await;
            rx.recv().await
        };
        let Some(chunk) = chunk else {
            break;
        };

        if out_tx.is_closed() {
            debug!(target: "rtp_session", %channel, worker, "Output queue closed");
            break;
        }

        let len = chunk.len();
        match decoder.decode(chunk) {
            Ok(Some(value)) => {
                if out_tx.send(value).await.is_err() {
                    debug!(target: "rtp_session", %channel, worker, "Output queue closed");
                    break;
                }
                stats.channel(channel).record_published();
            }
            Ok(None) => {}
            Err(e) => {
                stats.channel(channel).record_decode_error(&e);
                warn!(
                    target: "rtp_session",
                    %channel,
                    len,
                    "Dropping chunk: {}", e
                );
            }
        }
    }

    debug!(target: "rtp_session", %channel, worker, "Dispatch worker exited");
}
