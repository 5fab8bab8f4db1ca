//! 测试协作方：可编排的伪传输连接与计数编解码注册中心。
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use flint_remoting::channel::{ChannelEventHandler, NoopChannelEventHandler};
use flint_remoting::codec::{CodecError, CodecRegistry, MessageCodec, StaticCodecRegistry};
use flint_remoting::error::TransportFault;
use flint_remoting::payload::Payload;
use flint_remoting::transport::{ConnectionId, TransportConnection, WriteCompleter, WriteTicket};
use flint_remoting::url::EndpointUrl;

/// 伪连接的写入行为编排。
#[derive(Clone, Copy, Debug)]
pub enum WriteBehavior {
    /// 写入永不完成，完成端被暂存供测试随后回报。
    Stall,
    /// 写入同步成功。
    CompleteOk,
    /// 写入同步回报指定码值的故障。
    Fail(&'static str),
}

/// 满足 [`TransportConnection`] 契约的可编排伪连接。
#[derive(Debug)]
pub struct FakeConnection {
    id: ConnectionId,
    active: AtomicBool,
    local: SocketAddr,
    remote: SocketAddr,
    behavior: WriteBehavior,
    writes: AtomicUsize,
    pending: Mutex<VecDeque<WriteCompleter>>,
}

impl FakeConnection {
    fn with_behavior(id: u64, behavior: WriteBehavior) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(id),
            active: AtomicBool::new(true),
            local: "127.0.0.1:30880".parse().expect("本端测试地址应合法"),
            remote: format!("10.1.0.1:{}", 20_000 + id)
                .parse()
                .expect("远端测试地址应合法"),
            behavior,
            writes: AtomicUsize::new(0),
            pending: Mutex::new(VecDeque::new()),
        })
    }

    /// 写入永不完成的连接。
    pub fn stalled(id: u64) -> Arc<Self> {
        Self::with_behavior(id, WriteBehavior::Stall)
    }

    /// 写入同步成功的连接。
    pub fn completing(id: u64) -> Arc<Self> {
        Self::with_behavior(id, WriteBehavior::CompleteOk)
    }

    /// 写入同步失败的连接。
    pub fn failing(id: u64, code: &'static str) -> Arc<Self> {
        Self::with_behavior(id, WriteBehavior::Fail(code))
    }

    /// 翻转传输层视角的存活状态。
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    /// 已提交的写入次数。
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }

    /// 暂存中的未完成写入数量。
    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("测试锁不应中毒").len()
    }

    /// 回报最早一笔暂存写入的结果。
    ///
    /// 返回 `None` 表示没有暂存写入；`Some(delivered)` 中的布尔值表示
    /// 等待方是否仍在监听。
    pub fn complete_first_pending(&self, outcome: Result<(), TransportFault>) -> Option<bool> {
        let completer = self.pending.lock().expect("测试锁不应中毒").pop_front()?;
        Some(completer.complete(outcome))
    }

    /// 以 trait 对象形式暴露连接。
    pub fn as_connection(self: &Arc<Self>) -> Arc<dyn TransportConnection> {
        Arc::clone(self) as Arc<dyn TransportConnection>
    }
}

impl TransportConnection for FakeConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    fn write_and_flush(&self, _payload: Payload) -> WriteTicket {
        self.writes.fetch_add(1, Ordering::AcqRel);
        match self.behavior {
            WriteBehavior::Stall => {
                let (completer, ticket) = WriteTicket::pair();
                self.pending
                    .lock()
                    .expect("测试锁不应中毒")
                    .push_back(completer);
                ticket
            }
            WriteBehavior::CompleteOk => WriteTicket::completed(Ok(())),
            WriteBehavior::Fail(code) => {
                WriteTicket::completed(Err(TransportFault::new(code, "injected fault")))
            }
        }
    }
}

/// 名称可配置的直通编解码器。
#[derive(Debug)]
pub struct StubCodec(pub &'static str);

impl MessageCodec for StubCodec {
    fn name(&self) -> &str {
        self.0
    }

    fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError> {
        Ok(payload.body().clone())
    }

    fn decode(&self, frame: Bytes) -> Result<Payload, CodecError> {
        Ok(Payload::from_bytes(frame))
    }
}

/// 注册了指定名称直通实现的注册中心。
pub fn codec_registry(names: &[&'static str]) -> Arc<StaticCodecRegistry> {
    let registry = StaticCodecRegistry::new();
    for name in names {
        registry.register(Arc::new(StubCodec(name)));
    }
    Arc::new(registry)
}

/// 统计解析次数的注册中心包装，用于证明“恰好构造一次”。
#[derive(Debug)]
pub struct CountingCodecRegistry {
    inner: Arc<StaticCodecRegistry>,
    resolves: AtomicUsize,
}

impl CountingCodecRegistry {
    pub fn new(inner: Arc<StaticCodecRegistry>) -> Self {
        Self {
            inner,
            resolves: AtomicUsize::new(0),
        }
    }

    /// 累计解析调用次数；每次通道构造恰好解析一次。
    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::Acquire)
    }
}

impl CodecRegistry for CountingCodecRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn MessageCodec>> {
        self.resolves.fetch_add(1, Ordering::AcqRel);
        self.inner.resolve(name)
    }
}

/// 空事件处理器。
pub fn noop_handler() -> Arc<dyn ChannelEventHandler> {
    Arc::new(NoopChannelEventHandler)
}

/// 默认编解码名称可命中的测试 URL。
pub fn endpoint_url() -> Arc<EndpointUrl> {
    Arc::new(EndpointUrl::new("flint", "10.1.0.1", 20_880))
}

/// 三字节的请求载荷。
pub fn request_payload() -> Payload {
    Payload::new("request", Bytes::from_static(b"\x0b\x0e\x0e"))
}
