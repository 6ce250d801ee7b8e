use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::UdpSocket;

/// 会话中的传输通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Media,
    Control,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Media => f.write_str("media"),
            Channel::Control => f.write_str("control"),
        }
    }
}

/// 由调用方建立好的连接
///
/// 每次 `read_chunk` 返回一个完整的包。返回错误表示连接不可再用，读循环随之结束。
#[async_trait]
pub trait Transport: Send + 'static {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

#[async_trait]
impl Transport for UdpSocket {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (len, _addr) = self.recv_from(buf).await?;
        Ok(len)
    }
}

#[async_trait]
impl Transport for Arc<UdpSocket> {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (len, _addr) = self.recv_from(buf).await?;
        Ok(len)
    }
}

/// 字节流连接，按原样透传每次读取
///
/// 只有对端按包写入时数据块才与包边界对齐；读到 0 字节视为连接关闭。
pub struct StreamTransport<R> {
    inner: R,
}

impl<R> StreamTransport<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[async_trait]
impl<R> Transport for StreamTransport<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.inner.read(buf).await?;
        if len == 0 && !buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream closed by peer",
            ));
        }
        Ok(len)
    }
}

/// RFC 4571 分帧：每个包前带 16 位大端长度
pub struct FramedTransport<R> {
    inner: R,
}

impl<R> FramedTransport<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[async_trait]
impl<R> Transport for FramedTransport<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.inner.read_u16().await? as usize;
        if len > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame of {} bytes exceeds chunk size {}", len, buf.len()),
            ));
        }
        self.inner.read_exact(&mut buf[..len]).await?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_stream_transport_passes_reads_through() {
        let mock = Builder::new().read(b"abc").read(b"defg").build();
        let mut transport = StreamTransport::new(mock);
        let mut buf = [0u8; 16];

        assert_eq!(transport.read_chunk(&mut buf).await.unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(transport.read_chunk(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf[..4], b"defg");

        let err = transport.read_chunk(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_framed_transport_reassembles_frames() {
        // 一个帧被拆成两次读取，第二次读取又带上了下一个帧
        let mock = Builder::new()
            .read(&[0x00, 0x05, b'h', b'e'])
            .read(&[b'l', b'l', b'o', 0x00, 0x02, b'o', b'k'])
            .build();
        let mut transport = FramedTransport::new(mock);
        let mut buf = [0u8; 16];

        assert_eq!(transport.read_chunk(&mut buf).await.unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(transport.read_chunk(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], b"ok");
        assert!(transport.read_chunk(&mut buf).await.is_err());
    }

    #[tokio::test]
    async fn test_framed_transport_rejects_oversized_frame() {
        let mock = Builder::new().read(&[0x01, 0x00]).build();
        let mut transport = FramedTransport::new(mock);
        let mut buf = [0u8; 16];

        let err = transport.read_chunk(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_udp_transport_reads_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(b"datagram", receiver.local_addr().unwrap())
            .await
            .unwrap();

        let mut transport = receiver;
        let mut buf = [0u8; 64];
        let len = transport.read_chunk(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"datagram");
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Media.to_string(), "media");
        assert_eq!(Channel::Control.to_string(), "control");
    }
}
