#![doc = r#"
# flint-remoting-tokio

## 设计动机（Why）
- **定位**：该 crate 提供 Flint 通道契约在 Tokio 运行时上的实现：把一条
  已建立的传输连接适配为带属性、编解码与超时配置的逻辑通道，并以显式
  注入的注册表保证“一条连接至多一个逻辑通道”。
- **架构角色**：作为事件循环绑定层，向下消费
  [`TransportConnection`](flint_remoting::TransportConnection) 的窄接口，
  向上交付实现全部通道能力 trait 的 [`TokioChannel`]。
- **设计理念**：有界等待通过完成信号与计时器之间的 select
  （`tokio::time::timeout`）实现，绝不睡眠轮询；等待超时只改变向调用方
  的报告，已提交的写入继续推进。

## 核心契约（What）
- **输入条件**：调用方在 Tokio 运行时中使用本实现；注册表与编解码
  注册中心由宿主显式构造并注入，不存在进程级隐藏单例；
- **输出保障**：发送路径的全部失败统一为
  [`RemotingError`](flint_remoting::RemotingError)，携带通道标签、消息
  摘要与底层原因；
- **前置约束**：连接的建立、事件回调的触发与线缆编解码由范围之外的
  传输层承担。

## 实现策略（How）
- **注册表原子性**：`DashMap::entry` 的占位插入保证并发首次访问只构造
  一个通道，落败方拿到胜出方的同一实例；
- **注销守卫**：连接断开回调的时序因传输实现而异，注销条件以
  [`EvictionGuard`](registry::EvictionGuard) 在构造期二选一；
- **超时语义**：响应超时每次发送时实时读取，重配置即时生效；超时为 0
  时仅做一次无阻塞判定。

## 风险与考量（Trade-offs）
- **只提交不等待**：`await_delivery = false` 的发送在提交后立即返回，
  其后出现的写入故障不再送达该调用方，只能由传输实现方经完成信号自行
  记录；这是文档化的观测缺口，而非静默吞没；
- **注销不失效**：注册表移除条目不会作废在途调用方手中的通道引用，
  引用计数自然回收。
"#]
#![deny(unsafe_code)]

mod channel;
mod registry;

pub use channel::TokioChannel;
pub use registry::{ChannelRegistry, EvictionGuard};
