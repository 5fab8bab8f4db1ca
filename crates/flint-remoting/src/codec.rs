use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;

use crate::payload::Payload;

/// 编解码失败的结构化描述。
///
/// - **契约 (What)**：`codec` 为失败实现的名称，`operation` 标注方向
///   （编码/解码），`detail` 面向排障人员。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("codec `{codec}` failed to {operation}: {detail}")]
pub struct CodecError {
    codec: String,
    operation: &'static str,
    detail: String,
}

impl CodecError {
    /// 构造编解码错误。
    pub fn new(codec: impl Into<String>, operation: &'static str, detail: impl Into<String>) -> Self {
        Self {
            codec: codec.into(),
            operation,
            detail: detail.into(),
        }
    }
}

/// 消息编解码策略的挂载点。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 端点按名称从注册中心选定编解码器并可在重配置时替换，本 trait 只
///   固定“载荷 ↔ 线缆帧”的转换边界，不定义任何具体线缆格式；
/// - 对象安全设计使编解码器可作为 `Arc<dyn MessageCodec>` 原子换入
///   端点配置。
///
/// ## 契约 (What)
/// - `name`：注册中心内的稳定查找键；
/// - `encode`/`decode`：单条消息的无状态转换；带连接状态的分帧逻辑属于
///   传输实现，不在本契约内。
pub trait MessageCodec: Send + Sync + 'static {
    /// 编解码器名称。
    fn name(&self) -> &str;

    /// 将载荷编码为线缆帧。
    fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError>;

    /// 将线缆帧解码为载荷。
    fn decode(&self, frame: Bytes) -> Result<Payload, CodecError>;
}

/// 编解码注册中心契约：按名称解析实现。
///
/// - **意图 (Why)**：端点不持有编解码器的装配知识，统一经注册中心按名
///   查找；注册中心由宿主显式注入，而非进程级隐藏单例；
/// - **契约 (What)**：`resolve` 未命中返回 `None`，由调用方决定降级或
///   告警；实现必须可跨线程共享。
pub trait CodecRegistry: Send + Sync + 'static {
    /// 按名称解析编解码器。
    fn resolve(&self, name: &str) -> Option<Arc<dyn MessageCodec>>;
}

/// 基于 `DashMap` 的进程内注册中心实现。
///
/// # 教案式注释
/// - **意图 (Why)**：为宿主与测试提供开箱即用的注册中心，注册与解析
///   均为键级原子操作；
/// - **契约 (What)**：以 [`MessageCodec::name`] 为键，重复注册后写胜出；
/// - **风险 (Trade-offs)**：不提供注销接口，编解码器集合应在装配期确定。
#[derive(Default)]
pub struct StaticCodecRegistry {
    entries: DashMap<String, Arc<dyn MessageCodec>>,
}

impl StaticCodecRegistry {
    /// 创建空注册中心。
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册编解码器，同名覆盖旧实现。
    pub fn register(&self, codec: Arc<dyn MessageCodec>) {
        self.entries.insert(codec.name().to_owned(), codec);
    }

    /// 已注册的实现数量。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 注册中心是否为空。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CodecRegistry for StaticCodecRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn MessageCodec>> {
        self.entries.get(name).map(|entry| Arc::clone(entry.value()))
    }
}

impl fmt::Debug for StaticCodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        f.debug_struct("StaticCodecRegistry")
            .field("codecs", &names)
            .finish()
    }
}
