use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

/// 属性值的统一表示：任意可跨线程共享的对象。
pub type AttributeValue = Arc<dyn Any + Send + Sync>;

/// 逻辑通道私有的字符串键属性仓储。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 上层协议常需要在通道上挂载会话状态（鉴权结果、心跳时间戳等），
///   仓储由通道独占持有，任意持有通道引用的调用方都可并发读写；
/// - 以 `DashMap` 提供键级原子性，不做跨键事务。
///
/// ## 契约 (What)
/// - `set(key, None)` 等价于移除，绝不存入空占位值；
/// - 移除不存在的键是无副作用的空操作；
/// - 同键覆盖写采用“后写胜出”；
/// - `get` 克隆 `Arc` 返回，不向调用方泄漏分片锁 guard。
///
/// ## 注意事项 (Trade-offs)
/// - 值类型擦除为 `dyn Any`，类型还原由 [`get_as`](AttributeStore::get_as)
///   的向下转型承担，类型不匹配时返回 `None` 而非 panic。
pub struct AttributeStore {
    entries: DashMap<String, AttributeValue>,
}

impl AttributeStore {
    /// 创建空仓储。
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// 是否存在指定键。
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 读取属性值。
    pub fn get(&self, key: &str) -> Option<AttributeValue> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// 写入或移除属性。
    ///
    /// - **契约 (What)**：`Some(value)` 插入并覆盖旧值；`None` 移除该键，
    ///   键不存在时为空操作。
    pub fn set(&self, key: impl Into<String>, value: Option<AttributeValue>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.entries.insert(key, value);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    /// 移除并返回属性值，键不存在时返回 `None`。
    pub fn remove(&self, key: &str) -> Option<AttributeValue> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// 以具体类型读取属性，类型不匹配或键缺失均返回 `None`。
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key).and_then(|value| value.downcast::<T>().ok())
    }

    /// 当前属性数量。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 仓储是否为空。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("len", &self.entries.len())
            .finish()
    }
}
