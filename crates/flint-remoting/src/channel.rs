//! 通道能力契约：以小型可组合 trait 取代深层继承链。
//!
//! ## 核心意图（Why）
//! - 每种传输只需实现一个具体通道类型，并按需拼装寻址、属性、发送与
//!   重配置四项能力；公共状态（URL、处理器、关闭标志、超时/编解码配置）
//!   通过嵌入 [`PeerCore`](crate::endpoint::PeerCore) 与
//!   [`EndpointConfig`](crate::endpoint::EndpointConfig) 组合复用。
//!
//! ## 行为契约（What）
//! - [`Addressable`] 的查询全部实时透传底层连接，绝不缓存；
//! - [`Sendable::send`] 是唯一的消息出口，失败统一为
//!   [`RemotingError`](crate::error::RemotingError)；
//! - [`Resettable::reset`] 在通道存活期内原子替换配置字段，通道已关闭时
//!   必须显式失败而非静默忽略；
//! - [`RemotingChannel`] 把四项能力捆绑为对象安全的统一视图，供处理器
//!   等协作方以 `&dyn` 形式消费。

use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;

use crate::attributes::AttributeValue;
use crate::error::{ChannelLabel, RemotingError};
use crate::payload::Payload;
use crate::url::EndpointUrl;

/// 寻址与存活查询能力。
///
/// - **契约 (What)**：三个查询均为对底层传输的实时透传，调用方读到的
///   永远是传输层当前视角，不存在缓存滞后。
pub trait Addressable {
    /// 远端地址。
    fn remote_addr(&self) -> SocketAddr;

    /// 本端地址。
    fn local_addr(&self) -> SocketAddr;

    /// 底层连接当前是否存活。
    fn is_connected(&self) -> bool;
}

/// 通道属性读写能力。
///
/// - **契约 (What)**：语义与
///   [`AttributeStore`](crate::attributes::AttributeStore) 一致：
///   `set_attribute(key, None)` 移除该键，移除缺失键为空操作。
pub trait AttributeBearing {
    /// 是否存在指定属性。
    fn has_attribute(&self, key: &str) -> bool;

    /// 读取属性。
    fn get_attribute(&self, key: &str) -> Option<AttributeValue>;

    /// 写入或移除属性。
    fn set_attribute(&self, key: &str, value: Option<AttributeValue>);

    /// 移除属性。
    fn remove_attribute(&self, key: &str);
}

/// 消息发送能力。
#[async_trait]
pub trait Sendable {
    /// 发送一条消息。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：同一入口同时覆盖“只提交”与“有界等待交付”两种
    ///   语义，由 `await_delivery` 区分；
    /// - **契约 (What)**：
    ///   - **前置条件**：通道未关闭，否则在提交任何写入前即返回
    ///     [`RemotingError::ChannelClosed`]；
    ///   - `await_delivery = false`：写入提交即返回，仅当票据上已记录
    ///     故障时立即上报；
    ///   - `await_delivery = true`：按端点当前响应超时做有界等待；超时
    ///     为 0 时只做一次无阻塞判定，不等待网络完成；
    ///   - **后置条件**：等待超时不取消已提交的写入；本层不做任何重试。
    async fn send(&self, payload: Payload, await_delivery: bool) -> Result<(), RemotingError>;
}

/// 动态重配置能力。
pub trait Resettable {
    /// 以新 URL 重配置端点参数。
    ///
    /// - **契约 (What)**：通道已关闭时返回
    ///   [`RemotingError::ChannelClosed`] 且不改动任何字段；URL 中出现的
    ///   参数逐项独立校验与替换，单项失败记录日志后继续处理其余项，
    ///   未出现的参数保持原值。
    fn reset(&self, url: &EndpointUrl) -> Result<(), RemotingError>;
}

/// 逻辑通道的统一对象安全视图。
///
/// - **意图 (Why)**：处理器与诊断设施需要以 `&dyn` 消费通道而不关心
///   具体传输类型；
/// - **契约 (What)**：实现方即“某一传输的具体通道类型”，在四项能力外
///   额外提供稳定的诊断标签。
pub trait RemotingChannel:
    Addressable + AttributeBearing + Sendable + Resettable + Send + Sync + fmt::Debug
{
    /// 诊断标签：连接标识加远端地址的快照。
    fn label(&self) -> ChannelLabel;
}

/// 通道事件处理器：传输层向上回调的挂载点。
///
/// # 教案式注释
/// - **意图 (Why)**：通道层只负责在构造期把处理器引用线穿到位，事件的
///   实际触发由范围之外的传输/事件循环层完成；
/// - **契约 (What)**：全部方法提供空实现默认值，实现方按需覆写；回调
///   在事件循环线程上执行，不应阻塞；
/// - **风险 (Trade-offs)**：`on_received` 按值接收载荷（`Bytes` 克隆
///   廉价），处理器如需转发可直接移动所有权。
pub trait ChannelEventHandler: Send + Sync + 'static {
    /// 连接建立。
    fn on_connected(&self, _channel: &dyn RemotingChannel) {}

    /// 连接断开。
    fn on_disconnected(&self, _channel: &dyn RemotingChannel) {}

    /// 收到一条消息。
    fn on_received(&self, _channel: &dyn RemotingChannel, _payload: Payload) {}

    /// 通道上浮出一个错误。
    fn on_caught(&self, _channel: &dyn RemotingChannel, _error: &RemotingError) {}
}

/// 全部事件取默认空实现的处理器，供测试与纯客户端装配使用。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopChannelEventHandler;

impl ChannelEventHandler for NoopChannelEventHandler {}
