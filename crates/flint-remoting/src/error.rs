//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为通道操作对外暴露的错误语义提供集中定义：关闭、超时、传输故障三类
//!   失败全部汇入统一的 [`RemotingError`]，调用方无需捕获任何原始传输
//!   错误；
//! - 传输协作方以 [`TransportFault`] 回报底层故障，携带稳定错误码供
//!   告警与自动化治理使用。
//!
//! ## 设计要求（What）
//! - 所有错误类型实现 `thiserror::Error` 以兼容 `std::error::Error`；
//! - 每个发送路径失败都携带受累通道的 [`ChannelLabel`]，保证远端地址等
//!   诊断上下文不丢失；
//! - 本层不做任何重试，重试策略由发送方上层决定。

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

use crate::transport::ConnectionId;

/// 传输故障的稳定错误码。
///
/// - **契约 (What)**：码值遵循 `<域>.<语义>` 约定，视作兼容面，新增不删改。
pub mod codes {
    /// 写入在传输层执行失败。
    pub const WRITE_FAILED: &str = "transport.write.failed";
    /// 完成信号的发送端被丢弃，写入结果不可知。
    pub const WRITE_DETACHED: &str = "transport.write.detached";
    /// 底层连接已丢失。
    pub const CONNECTION_LOST: &str = "transport.connection.lost";
}

/// 受累通道的诊断快照。
///
/// # 教案式注释
/// - **意图 (Why)**：错误对象需要携带“哪条通道出了问题”，但不应持有通道
///   本体（避免延长其生命周期）；快照只含连接标识与远端地址；
/// - **契约 (What)**：`Copy` 且 `Display` 稳定，可直接嵌入错误文本与日志。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelLabel {
    /// 底层连接标识。
    pub id: ConnectionId,
    /// 远端地址。
    pub remote: SocketAddr,
}

impl fmt::Display for ChannelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel({}, remote={})", self.id, self.remote)
    }
}

/// 底层传输回报的结构化故障。
///
/// - **意图 (Why)**：传输实现方不直接构造 [`RemotingError`]，而是回报带
///   稳定码值的故障，由逻辑通道在边界处统一包装；
/// - **契约 (What)**：`code` 取自 [`codes`] 或实现方登记的自定义码；
///   `detail` 面向排障人员，不应包含敏感信息。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{code}: {detail}")]
pub struct TransportFault {
    code: &'static str,
    detail: String,
}

impl TransportFault {
    /// 构造传输故障。
    pub fn new(code: &'static str, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// 完成信号发送端被丢弃时的兜底故障。
    pub fn detached() -> Self {
        Self::new(
            codes::WRITE_DETACHED,
            "write completer dropped before reporting an outcome",
        )
    }

    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 人类可读描述。
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// 通道操作失败的统一错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“连接已关闭”“有界等待超时”“传输故障”归并为一个
///   可模式匹配的枚举，调用方按变体决定重建连接、重试或放弃，无需依赖
///   异常机制或错误码字符串解析；
/// - **契约 (What)**：
///   - 每个变体均携带 [`ChannelLabel`]，`Display` 文本嵌入消息摘要与
///     远端地址；
///   - `SendFailed` 通过 `source()` 保留底层 [`TransportFault`]；
///   - 所有变体满足 `Send + Sync + 'static`，可安全跨线程传播；
/// - **设计取舍 (Trade-offs)**：消息摘要以 `String` 存储，牺牲少量分配
///   换取错误在脱离载荷后仍可独立成文。
#[derive(Debug, Error)]
pub enum RemotingError {
    /// 对已关闭的通道执行发送或重配置。
    ///
    /// - **契约 (What)**：`operation` 描述被拒绝的操作；调用方必须先重建
    ///   连接再重试。
    #[error("{channel} is closed, cannot {operation}")]
    ChannelClosed {
        channel: ChannelLabel,
        operation: &'static str,
    },

    /// 有界等待在配置的超时内未观察到写入完成。
    ///
    /// - **契约 (What)**：已提交的写入不会被取消，仅改变向调用方的报告；
    ///   `timeout_ms` 为判定时采用的超时值。
    #[error("failed to send {message} to {channel} in timeout({timeout_ms}ms) limit")]
    SendTimeout {
        channel: ChannelLabel,
        message: String,
        timeout_ms: u64,
    },

    /// 传输层在写入过程中回报故障。
    ///
    /// - **契约 (What)**：底层原因以 `source()` 形式保留，错误文本同时
    ///   嵌入故障码与描述。
    #[error("failed to send {message} to {channel}, cause: {fault}")]
    SendFailed {
        channel: ChannelLabel,
        message: String,
        #[source]
        fault: TransportFault,
    },
}

impl RemotingError {
    /// 受累通道的诊断快照。
    pub fn channel(&self) -> ChannelLabel {
        match self {
            RemotingError::ChannelClosed { channel, .. }
            | RemotingError::SendTimeout { channel, .. }
            | RemotingError::SendFailed { channel, .. } => *channel,
        }
    }
}
