#![doc = r#"
# flint-remoting

## 设计动机（Why）
- **定位**：该 crate 定义 Flint 远程调用栈中“传输通道抽象层”的核心契约，
  把底层网络传输（套接字、事件循环 IO）适配为带属性、编解码与超时配置的
  逻辑通道。
- **架构角色**：位于可插拔传输实现与上层 RPC 调度逻辑之间，向上暴露统一的
  通道能力（寻址、属性、发送、重配置），向下只依赖一组窄接口（连接、编解码
  注册中心、配置 URL）。
- **设计理念**：以组合替代继承：`PeerCore` 与 `EndpointConfig` 作为可嵌入的
  基座值被具体通道类型持有，能力通过 `Addressable`/`AttributeBearing`/
  `Sendable`/`Resettable` 等小型 trait 拼装，而非多层类体系。

## 核心契约（What）
- **输入条件**：调用方通过 [`EndpointUrl`](url::EndpointUrl) 以编程方式提供
  配置参数；传输实现方实现 [`TransportConnection`](transport::TransportConnection)
  并以 [`WriteTicket`](transport::WriteTicket) 回报写入完成信号；
- **输出保障**：所有通道操作失败统一汇入
  [`RemotingError`](error::RemotingError)，携带受累通道标签、消息摘要与底层
  原因，调用方可按变体模式匹配（关闭 / 超时 / 传输故障）；
- **前置约束**：本 crate 不定义线缆协议、不做方法分发、不含重试策略，
  这些均由上下游协作方承担。

## 实现策略（How）
- **配置读取**：`EndpointUrl` 的正整数参数读取在缺失、非法或非正值时一律
  回退到编译期默认值，杜绝 0 或负值进入超时配置；
- **动态重配置**：`EndpointConfig` 的三个字段（响应超时、建连超时、编解码
  绑定）各自独立原子可读写，`apply` 中单个参数校验失败仅记录日志并跳过，
  不阻断其余字段的更新；
- **完成信号**：写入完成采用 `futures` oneshot 通道建模，契约层保持运行时
  中立，由 `flint-remoting-tokio` 等绑定层负责有界等待。

## 风险与考量（Trade-offs）
- **一致性边界**：并发的发送与重配置之间只保证字段级原子性，单次 `Reset`
  的跨字段一致性不作承诺；
- **编解码解析**：编解码器按名称查询注册中心，未命中时通道以未绑定状态
  运行并记录告警，由宿主决定是否补注册。
"#]
#![deny(unsafe_code)]

pub use async_trait::async_trait;

pub mod attributes;
pub mod channel;
pub mod codec;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod payload;
pub mod transport;
pub mod url;

pub use attributes::{AttributeStore, AttributeValue};
pub use channel::{
    Addressable, AttributeBearing, ChannelEventHandler, NoopChannelEventHandler, RemotingChannel,
    Resettable, Sendable,
};
pub use codec::{CodecError, CodecRegistry, MessageCodec, StaticCodecRegistry};
pub use endpoint::{EndpointConfig, PeerCore};
pub use error::{ChannelLabel, RemotingError, TransportFault};
pub use payload::Payload;
pub use transport::{ConnectionId, TransportConnection, WriteCompleter, WriteTicket};
pub use url::{EndpointUrl, UrlParameterError};
