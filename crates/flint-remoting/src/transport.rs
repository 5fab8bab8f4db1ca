//! 传输协作方的窄接口：连接、连接标识与写入完成信号。
//!
//! 具体的事件循环与套接字实现不在本层范围内；实现方只需满足
//! [`TransportConnection`] 的存活查询、地址查询与异步“写入并刷新”原语，
//! 并通过 [`WriteCompleter`] 回报写入结果。

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::TransportFault;
use crate::payload::Payload;

/// 底层传输连接的进程内唯一标识，通道注册表以此为键。
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// 以原始数值构造标识。
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// 原始数值。
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// 已建立的传输连接必须满足的最小契约。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 逻辑通道不关心事件循环与套接字细节，只消费“存活、寻址、异步写入”
///   三项能力；
/// - 存活与地址查询为实时透传（调用即查询传输层），逻辑通道不做缓存，
///   保证读到的永远是当前传输状态。
///
/// ## 契约 (What)
/// - `id`：进程内稳定且唯一，同一连接多次查询返回同值；
/// - `is_active`：反映传输层当前视角的连接存活状态；
/// - `write_and_flush`：提交一次写入并立即返回完成信号票据；写入一经
///   提交即不可收回，实现方必须在写入结束时通过配对的
///   [`WriteCompleter`] 回报结果（或故障）。
///
/// ## 注意事项 (Trade-offs)
/// - 单连接上的写入顺序由传输实现自身的写队列保证，本契约不附加也不
///   放松顺序约束。
pub trait TransportConnection: Send + Sync + fmt::Debug + 'static {
    /// 连接标识。
    fn id(&self) -> ConnectionId;

    /// 连接当前是否存活。
    fn is_active(&self) -> bool;

    /// 本端地址。
    fn local_addr(&self) -> SocketAddr;

    /// 远端地址。
    fn remote_addr(&self) -> SocketAddr;

    /// 提交一次异步“写入并刷新”，返回完成信号票据。
    fn write_and_flush(&self, payload: Payload) -> WriteTicket;
}

/// 一次挂起写入的完成信号票据。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 把“写入是否完成、是否出错”建模为一次性信号，使逻辑通道可以在
///   完成信号与计时器之间做 select 式有界等待，而非睡眠轮询；
/// - 票据与写入解耦：丢弃票据（等待方放弃）不会取消已提交的写入，
///   等待的取消只是建议性的。
///
/// ## 契约 (What)
/// - 作为 `Future` 输出 `Result<(), TransportFault>`；完成端被丢弃时
///   解析为 [`TransportFault::detached`]；
/// - [`try_outcome`](WriteTicket::try_outcome) 提供无阻塞探测：尚未完成
///   返回 `None`，已完成返回记录的结果；
/// - 票据只应由单一等待方持有，完成后不应再次轮询。
#[derive(Debug)]
pub struct WriteTicket {
    receiver: oneshot::Receiver<Result<(), TransportFault>>,
}

/// 写入完成信号的回报端，由传输实现方持有。
#[derive(Debug)]
pub struct WriteCompleter {
    sender: oneshot::Sender<Result<(), TransportFault>>,
}

impl WriteTicket {
    /// 创建一对完成信号端点。
    pub fn pair() -> (WriteCompleter, WriteTicket) {
        let (sender, receiver) = oneshot::channel();
        (WriteCompleter { sender }, WriteTicket { receiver })
    }

    /// 构造一张已解析的票据，供同步完成的写入路径直接返回。
    pub fn completed(outcome: Result<(), TransportFault>) -> Self {
        let (completer, ticket) = Self::pair();
        completer.complete(outcome);
        ticket
    }

    /// 无阻塞探测写入结果。
    ///
    /// - **契约 (What)**：尚未完成返回 `None`；完成端已丢弃视同
    ///   [`TransportFault::detached`] 故障。
    pub fn try_outcome(&mut self) -> Option<Result<(), TransportFault>> {
        match self.receiver.try_recv() {
            Ok(Some(outcome)) => Some(outcome),
            Ok(None) => None,
            Err(_cancelled) => Some(Err(TransportFault::detached())),
        }
    }
}

impl Future for WriteTicket {
    type Output = Result<(), TransportFault>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_cancelled)) => Poll::Ready(Err(TransportFault::detached())),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl WriteCompleter {
    /// 回报写入结果。
    ///
    /// - **契约 (What)**：返回 `true` 表示等待方仍在监听并收到结果；
    ///   返回 `false` 表示票据已被丢弃（例如“只提交不等待”的发送），
    ///   此时故障仍可由传输实现方自行记录，结果通道本身即观测点。
    pub fn complete(self, outcome: Result<(), TransportFault>) -> bool {
        self.sender.send(outcome).is_ok()
    }

    /// 回报成功。
    pub fn succeed(self) -> bool {
        self.complete(Ok(()))
    }

    /// 回报故障。
    pub fn fail(self, fault: TransportFault) -> bool {
        self.complete(Err(fault))
    }
}
