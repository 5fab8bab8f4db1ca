use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flint_remoting::attributes::{AttributeStore, AttributeValue};
use flint_remoting::channel::{
    Addressable, AttributeBearing, ChannelEventHandler, RemotingChannel, Resettable, Sendable,
};
use flint_remoting::codec::CodecRegistry;
use flint_remoting::endpoint::{EndpointConfig, PeerCore};
use flint_remoting::error::{ChannelLabel, RemotingError, TransportFault};
use flint_remoting::payload::Payload;
use flint_remoting::transport::TransportConnection;
use flint_remoting::url::EndpointUrl;

/// Tokio 运行时上的逻辑通道。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 把一条底层传输连接包装为上层可消费的逻辑通道：寻址与存活实时透传、
///   属性仓储独占持有、发送带有界等待、配置可在线重置；
/// - 通道对连接独占：同一连接在注册表中至多对应一个通道实例。
///
/// ## 逻辑 (How)
/// - 公共状态经 [`PeerCore`] 与 [`EndpointConfig`] 嵌入复用；
/// - 发送先过“通道未关闭”前置检查，再提交写入，随后按 `await_delivery`
///   与当前响应超时决定是否有界等待；
/// - 有界等待是完成信号与计时器之间的 select，超时后仅补查一次已记录
///   的故障，不取消写入。
///
/// ## 契约 (What)
/// - `remote_addr`/`local_addr`/`is_connected`：对底层连接的实时查询，
///   绝不缓存；
/// - `send`：见 [`Sendable`] 的契约描述；
/// - `reset`：通道已关闭时失败且不改动任何字段，否则逐项部分重配置；
/// - **后置条件**：任何失败都以 [`RemotingError`] 形态携带通道标签浮出。
///
/// ## 注意事项 (Trade-offs)
/// - 超时判定边界上（计时器触发与写入完成几乎同时）以计时器为准上报
///   超时，此时写入可能已经成功，调用方重试前应自行考虑幂等性。
pub struct TokioChannel {
    connection: Arc<dyn TransportConnection>,
    peer: PeerCore,
    endpoint: EndpointConfig,
    attributes: AttributeStore,
}

impl TokioChannel {
    /// 以连接、配置 URL、事件处理器与编解码注册中心构造通道。
    pub fn new(
        connection: Arc<dyn TransportConnection>,
        url: Arc<EndpointUrl>,
        handler: Arc<dyn ChannelEventHandler>,
        codecs: Arc<dyn CodecRegistry>,
    ) -> Self {
        let endpoint = EndpointConfig::from_url(url.as_ref(), codecs);
        Self {
            connection,
            peer: PeerCore::new(url, handler),
            endpoint,
            attributes: AttributeStore::new(),
        }
    }

    /// 诊断标签：连接标识加远端地址。
    pub fn label(&self) -> ChannelLabel {
        ChannelLabel {
            id: self.connection.id(),
            remote: self.connection.remote_addr(),
        }
    }

    /// 构造期绑定的配置 URL。
    pub fn url(&self) -> &Arc<EndpointUrl> {
        self.peer.url()
    }

    /// 构造期绑定的事件处理器。
    pub fn handler(&self) -> &Arc<dyn ChannelEventHandler> {
        self.peer.handler()
    }

    /// 端点配置（超时与编解码绑定）。
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// 底层传输连接。
    pub fn connection(&self) -> &Arc<dyn TransportConnection> {
        &self.connection
    }

    /// 标记通道关闭，此后发送与重配置均被拒绝。
    pub fn close(&self) {
        self.peer.close();
    }

    /// 通道是否已标记关闭。
    pub fn is_closed(&self) -> bool {
        self.peer.is_closed()
    }

    fn send_failed(&self, message: String, fault: TransportFault) -> RemotingError {
        RemotingError::SendFailed {
            channel: self.label(),
            message,
            fault,
        }
    }
}

impl Addressable for TokioChannel {
    fn remote_addr(&self) -> SocketAddr {
        self.connection.remote_addr()
    }

    fn local_addr(&self) -> SocketAddr {
        self.connection.local_addr()
    }

    fn is_connected(&self) -> bool {
        self.connection.is_active()
    }
}

impl AttributeBearing for TokioChannel {
    fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains(key)
    }

    fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes.get(key)
    }

    fn set_attribute(&self, key: &str, value: Option<AttributeValue>) {
        self.attributes.set(key, value);
    }

    fn remove_attribute(&self, key: &str) {
        self.attributes.remove(key);
    }
}

#[async_trait]
impl Sendable for TokioChannel {
    async fn send(&self, payload: Payload, await_delivery: bool) -> Result<(), RemotingError> {
        let label = self.label();
        self.peer.ensure_open("send message", label)?;

        let message = payload.to_string();
        let mut ticket = self.connection.write_and_flush(payload);

        if !await_delivery {
            // 已记录的故障必须立即上报；尚未完成的写入不再等待。
            return match ticket.try_outcome() {
                Some(Err(fault)) => Err(self.send_failed(message, fault)),
                _ => Ok(()),
            };
        }

        let timeout_ms = self.endpoint.timeout_ms();
        if timeout_ms == 0 {
            // 超时为 0：只做一次无阻塞判定，不等待网络完成。
            return match ticket.try_outcome() {
                Some(Ok(())) => Ok(()),
                Some(Err(fault)) => Err(self.send_failed(message, fault)),
                None => Err(RemotingError::SendTimeout {
                    channel: label,
                    message,
                    timeout_ms: 0,
                }),
            };
        }

        match tokio::time::timeout(Duration::from_millis(timeout_ms), &mut ticket).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(fault)) => Err(self.send_failed(message, fault)),
            // 计时器先于完成信号触发：补查一次已记录的故障，随后以超时
            // 上报；已提交的写入继续推进，不做取消。
            Err(_elapsed) => match ticket.try_outcome() {
                Some(Err(fault)) => Err(self.send_failed(message, fault)),
                _ => Err(RemotingError::SendTimeout {
                    channel: label,
                    message,
                    timeout_ms,
                }),
            },
        }
    }
}

impl Resettable for TokioChannel {
    fn reset(&self, url: &EndpointUrl) -> Result<(), RemotingError> {
        self.peer.ensure_open("reset parameters", self.label())?;
        self.endpoint.apply(url);
        Ok(())
    }
}

impl RemotingChannel for TokioChannel {
    fn label(&self) -> ChannelLabel {
        TokioChannel::label(self)
    }
}

impl fmt::Debug for TokioChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioChannel")
            .field("connection", &self.connection.id())
            .field("remote", &self.connection.remote_addr())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TokioChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tokio-{}", self.label())
    }
}
