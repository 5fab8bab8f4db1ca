//! # ChannelRegistry：连接到逻辑通道的唯一性仓储
//!
//! ## 核心意图（Why）
//! - 保证“一条底层连接至多一个逻辑通道”的系统级不变式：并发的首次访问
//!   必须收敛到同一实例，且只构造一次；
//! - 仓储由接纳连接的组件显式持有并注入，生命周期与测试隔离都是显式的，
//!   不存在进程级隐藏全局表。
//!
//! ## 行为契约（What）
//! - `get_or_add`：`None` 连接直接返回 `None` 且不触碰任何状态；否则以
//!   `DashMap::entry` 的占位插入做原子“缺则构造”，竞争落败方拿到胜出方
//!   的同一 `Arc`；
//! - `remove_if_disconnected`：按构造期选定的 [`EvictionGuard`] 判定是否
//!   移除条目；移除只是注销，不作废在途引用；
//! - 仓储仅由连接生命周期回调（建立插入、断开移除）修改，发送路径只读。
//!
//! ## 风险提示（Trade-offs）
//! - `DashMap` guard 在持有期间阻塞同分片写操作，`get_or_add` 在克隆出
//!   `Arc` 后立即释放 guard，构造闭包之外不执行任何耗时逻辑。

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use flint_remoting::channel::ChannelEventHandler;
use flint_remoting::codec::CodecRegistry;
use flint_remoting::transport::{ConnectionId, TransportConnection};
use flint_remoting::url::EndpointUrl;

use crate::channel::TokioChannel;

/// 注销守卫：`remove_if_disconnected` 在何种存活状态下移除条目。
///
/// # 教案式说明
/// - **意图 (Why)**：断开回调与传输层存活标志翻转的先后顺序因实现而异。
///   回调先于标志翻转到达时，条目须趁连接仍报告存活移除；回调晚于翻转
///   到达时，则须在存活已消失后移除。两种时序都真实存在，守卫在构造期
///   二选一；
/// - **契约 (What)**：
///   - [`WhileActive`](EvictionGuard::WhileActive)（默认）：仅当连接仍
///     报告存活时移除；若判定时存活已消失，条目保留在表中；
///   - [`WhenInactive`](EvictionGuard::WhenInactive)：仅当存活已消失时
///     移除；
/// - **风险 (Trade-offs)**：守卫与传输实现的回调时序不匹配会让条目滞留，
///   直至同一连接标识再次触发移除；宿主应按所用传输的实际时序选择。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EvictionGuard {
    /// 仅当连接仍报告存活时移除条目。
    #[default]
    WhileActive,
    /// 仅当连接存活已消失时移除条目。
    WhenInactive,
}

/// 连接标识到逻辑通道的并发安全仓储。
pub struct ChannelRegistry {
    channels: DashMap<ConnectionId, Arc<TokioChannel>>,
    codecs: Arc<dyn CodecRegistry>,
    eviction: EvictionGuard,
}

impl ChannelRegistry {
    /// 以默认注销守卫创建仓储。
    pub fn new(codecs: Arc<dyn CodecRegistry>) -> Self {
        Self::with_eviction_guard(codecs, EvictionGuard::default())
    }

    /// 显式指定注销守卫创建仓储。
    pub fn with_eviction_guard(codecs: Arc<dyn CodecRegistry>, eviction: EvictionGuard) -> Self {
        Self {
            channels: DashMap::new(),
            codecs,
            eviction,
        }
    }

    /// 当前生效的注销守卫。
    pub fn eviction_guard(&self) -> EvictionGuard {
        self.eviction
    }

    /// 查找或构造连接对应的逻辑通道。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：连接建立回调与任意数量的 RPC 调用点都会索要
    ///   通道，必须保证并发首次访问只构造一个实例；
    /// - **契约 (What)**：
    ///   - `connection` 为 `None` 时返回 `None`，不构造包装也不触碰仓储
    ///     （防御性空操作）；
    ///   - 否则对连接标识执行原子“缺则插入”：构造仅发生在占位成功的
    ///     一侧，所有调用方（含竞争落败方）收到同一 `Arc`；
    ///   - **后置条件**：返回的通道在仓储注销后依旧有效，由引用计数
    ///     决定其生命周期。
    pub fn get_or_add(
        &self,
        connection: Option<Arc<dyn TransportConnection>>,
        url: Arc<EndpointUrl>,
        handler: Arc<dyn ChannelEventHandler>,
    ) -> Option<Arc<TokioChannel>> {
        let connection = connection?;
        let id = connection.id();
        let entry = self.channels.entry(id).or_insert_with(|| {
            tracing::debug!(connection = %id, "登记新的逻辑通道");
            Arc::new(TokioChannel::new(
                connection,
                url,
                handler,
                Arc::clone(&self.codecs),
            ))
        });
        let channel = Arc::clone(entry.value());
        drop(entry);
        Some(channel)
    }

    /// 按注销守卫判定并移除连接对应的条目。
    ///
    /// - **契约 (What)**：`None` 连接为空操作；守卫不满足时条目保留；
    ///   移除不作废在途调用方手中的通道引用。
    pub fn remove_if_disconnected(&self, connection: Option<&Arc<dyn TransportConnection>>) {
        let Some(connection) = connection else {
            return;
        };
        let evict = match self.eviction {
            EvictionGuard::WhileActive => connection.is_active(),
            EvictionGuard::WhenInactive => !connection.is_active(),
        };
        if evict && self.channels.remove(&connection.id()).is_some() {
            tracing::debug!(connection = %connection.id(), "注销逻辑通道");
        }
    }

    /// 按连接标识查找已登记的通道。
    pub fn lookup(&self, id: ConnectionId) -> Option<Arc<TokioChannel>> {
        self.channels.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// 已登记的通道数量。
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// 仓储是否为空。
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("len", &self.channels.len())
            .field("eviction", &self.eviction)
            .finish_non_exhaustive()
    }
}
