//! 端点基座：被具体通道类型嵌入复用的公共状态。
//!
//! ## 核心意图（Why）
//! - [`PeerCore`] 持有构造期固定的 URL 与处理器引用，外加幂等的关闭
//!   标志，为发送与重配置提供统一的“通道未关闭”前置检查；
//! - [`EndpointConfig`] 持有从 URL 推导的编解码绑定与两个超时值，三个
//!   字段各自独立原子可读写，发送路径读取配置的同时，重配置可以并发
//!   替换其中任意字段，读方绝不会观察到半更新的单字段，但单次重配置的
//!   跨字段一致性不作承诺。
//!
//! ## 行为契约（What）
//! - 构造期推导：超时参数经“非正值回退默认”读取，编解码按名称向注册
//!   中心解析，未命中时以未绑定状态运行并记录告警；
//! - [`EndpointConfig::apply`]：对 URL 中出现的参数逐项独立校验替换，
//!   单项失败仅记录日志并跳过，未出现的参数保持原值。

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::channel::ChannelEventHandler;
use crate::codec::{CodecRegistry, MessageCodec};
use crate::constants::{
    CODEC_KEY, CONNECT_TIMEOUT_KEY, DEFAULT_CODEC, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_TIMEOUT_MS,
    TIMEOUT_KEY,
};
use crate::error::{ChannelLabel, RemotingError};
use crate::url::EndpointUrl;

/// 通道公共基座：URL、处理器与关闭标志。
///
/// # 教案式注释
/// - **意图 (Why)**：每个具体通道类型都需要这三样状态，以嵌入值的方式
///   复用，而非继承；
/// - **契约 (What)**：
///   - `url` 与 `handler` 构造后不可变，通道层只线穿处理器引用，
///     不主动调用它；
///   - `close` 幂等；`ensure_open` 在已关闭时返回
///     [`RemotingError::ChannelClosed`]，并注明被拒绝的操作。
pub struct PeerCore {
    url: Arc<EndpointUrl>,
    handler: Arc<dyn ChannelEventHandler>,
    closed: AtomicBool,
}

impl PeerCore {
    /// 构造基座，初始为未关闭状态。
    pub fn new(url: Arc<EndpointUrl>, handler: Arc<dyn ChannelEventHandler>) -> Self {
        Self {
            url,
            handler,
            closed: AtomicBool::new(false),
        }
    }

    /// 构造期绑定的配置 URL。
    pub fn url(&self) -> &Arc<EndpointUrl> {
        &self.url
    }

    /// 构造期绑定的事件处理器。
    pub fn handler(&self) -> &Arc<dyn ChannelEventHandler> {
        &self.handler
    }

    /// 标记通道关闭，幂等。
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// 通道是否已关闭。
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// “通道未关闭”前置检查。
    pub fn ensure_open(
        &self,
        operation: &'static str,
        channel: ChannelLabel,
    ) -> Result<(), RemotingError> {
        if self.is_closed() {
            return Err(RemotingError::ChannelClosed { channel, operation });
        }
        Ok(())
    }
}

impl fmt::Debug for PeerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerCore")
            .field("url", &self.url)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// 编解码绑定快照：名称加可能未命中的实现。
struct CodecSlot {
    name: Arc<str>,
    codec: Option<Arc<dyn MessageCodec>>,
}

impl fmt::Debug for CodecSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecSlot")
            .field("name", &self.name)
            .field("resolved", &self.codec.is_some())
            .finish()
    }
}

/// 端点配置：编解码绑定与两个超时值，支持字段级原子重配置。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 发送路径每次调用都读取当前响应超时，重配置后的新值对后续发送即时
///   生效，无需重建通道；
/// - 编解码绑定整体作为快照换入换出，读方拿到的名称与实现永远配套。
///
/// ## 契约 (What)
/// - **前置条件**：注册中心由宿主注入且生命周期覆盖端点；
/// - 超时字段恒为正，除非宿主显式调用
///   [`set_timeout_ms`](EndpointConfig::set_timeout_ms) 写入 0；0 的
///   含义是“发送路径不等待网络完成，只做即时判定”；
/// - [`apply`](EndpointConfig::apply) 见方法文档。
///
/// ## 注意事项 (Trade-offs)
/// - 三个字段独立原子，不提供跨字段事务：并发发送可能观察到一次重配置
///   的“旧超时 + 新编解码”组合，这是此层明确接受的一致性边界。
pub struct EndpointConfig {
    timeout_ms: AtomicU64,
    connect_timeout_ms: AtomicU64,
    codec: ArcSwap<CodecSlot>,
    codecs: Arc<dyn CodecRegistry>,
}

impl EndpointConfig {
    /// 从 URL 推导初始配置。
    ///
    /// - **后置条件**：两个超时字段为正（非法输入已回退默认值）；编解码
    ///   按 URL 中的名称（缺省 `telnet`）解析，未命中时绑定为空并记录
    ///   告警。
    pub fn from_url(url: &EndpointUrl, codecs: Arc<dyn CodecRegistry>) -> Self {
        let timeout_ms = url.positive_parameter(TIMEOUT_KEY, DEFAULT_TIMEOUT_MS);
        let connect_timeout_ms =
            url.positive_parameter(CONNECT_TIMEOUT_KEY, DEFAULT_CONNECT_TIMEOUT_MS);
        let slot = resolve_slot(url.parameter_or(CODEC_KEY, DEFAULT_CODEC), codecs.as_ref());
        Self {
            timeout_ms: AtomicU64::new(timeout_ms),
            connect_timeout_ms: AtomicU64::new(connect_timeout_ms),
            codec: ArcSwap::from_pointee(slot),
            codecs,
        }
    }

    /// 当前响应超时（毫秒）。
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.load(Ordering::Acquire)
    }

    /// 当前建连超时（毫秒）。
    pub fn connect_timeout_ms(&self) -> u64 {
        self.connect_timeout_ms.load(Ordering::Acquire)
    }

    /// 当前响应超时。
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms())
    }

    /// 当前建连超时。
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms())
    }

    /// 直接覆盖响应超时。
    ///
    /// - **契约 (What)**：供宿主程序化调优；写入 0 表示发送路径只做
    ///   无阻塞判定。经 URL 的常规路径（构造与 [`apply`](Self::apply)）
    ///   不会产生 0。
    pub fn set_timeout_ms(&self, timeout_ms: u64) {
        self.timeout_ms.store(timeout_ms, Ordering::Release);
    }

    /// 直接覆盖建连超时。
    pub fn set_connect_timeout_ms(&self, connect_timeout_ms: u64) {
        self.connect_timeout_ms.store(connect_timeout_ms, Ordering::Release);
    }

    /// 当前编解码绑定名称。
    pub fn codec_name(&self) -> Arc<str> {
        Arc::clone(&self.codec.load().name)
    }

    /// 当前编解码实现，未命中注册中心时为 `None`。
    pub fn codec(&self) -> Option<Arc<dyn MessageCodec>> {
        self.codec.load().codec.clone()
    }

    /// 以新 URL 做部分重配置。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：运行中的端点需要吸收推送下来的新参数，且一个
    ///   非法参数不应使整次重配置流产；
    /// - **契约 (What)**：
    ///   - URL 未携带的参数保持原值（部分重配置，非整体替换）；
    ///   - 响应/建连超时要求严格正整数，校验失败记录告警后跳过；
    ///   - 编解码名称需在注册中心命中，否则保留原有绑定并记录告警；
    ///   - 三个子更新相互隔离，任何一项失败不阻断其余两项；
    /// - **后置条件**：方法总是返回（不向调用方传播校验失败），“通道
    ///   未关闭”前置由持有 [`PeerCore`] 的通道在调用前检查。
    pub fn apply(&self, url: &EndpointUrl) {
        if url.has_parameter(TIMEOUT_KEY) {
            match url.positive_parameter_strict(TIMEOUT_KEY) {
                Ok(value) => self.set_timeout_ms(value),
                Err(error) => {
                    tracing::warn!(error = %error, "忽略无效的响应超时参数，保留原值");
                }
            }
        }

        if url.has_parameter(CONNECT_TIMEOUT_KEY) {
            match url.positive_parameter_strict(CONNECT_TIMEOUT_KEY) {
                Ok(value) => self.set_connect_timeout_ms(value),
                Err(error) => {
                    tracing::warn!(error = %error, "忽略无效的建连超时参数，保留原值");
                }
            }
        }

        if url.has_parameter(CODEC_KEY) {
            let name = url.parameter_or(CODEC_KEY, DEFAULT_CODEC);
            match self.codecs.resolve(name) {
                Some(codec) => {
                    self.codec.store(Arc::new(CodecSlot {
                        name: Arc::from(name),
                        codec: Some(codec),
                    }));
                }
                None => {
                    tracing::warn!(codec = name, "注册中心未命中新的编解码器名称，保留原有绑定");
                }
            }
        }
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("timeout_ms", &self.timeout_ms())
            .field("connect_timeout_ms", &self.connect_timeout_ms())
            .field("codec", &**self.codec.load())
            .finish_non_exhaustive()
    }
}

fn resolve_slot(name: &str, codecs: &dyn CodecRegistry) -> CodecSlot {
    let codec = codecs.resolve(name);
    if codec.is_none() {
        tracing::warn!(codec = name, "注册中心未命中编解码器名称，通道将以未绑定状态运行");
    }
    CodecSlot {
        name: Arc::from(name),
        codec,
    }
}
