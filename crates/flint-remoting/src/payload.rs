use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;

/// 通道发送的消息载荷。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 发送路径与失败描述都需要一个“可廉价克隆、可摘要打印”的消息表示：
///   `Bytes` 承担零拷贝字节体，`kind` 提供人类可读的语义标签；
/// - 失败文本只嵌入摘要（类别与长度），避免把原始字节倾倒进日志。
///
/// ## 契约 (What)
/// - `kind`：消息语义标签（如 `request`、`heartbeat`），仅用于诊断；
/// - `body`：完整字节体，克隆只增加引用计数；
/// - `Display` 输出 `kind(lenB)`，文本稳定可进入错误消息。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payload {
    kind: Cow<'static, str>,
    body: Bytes,
}

impl Payload {
    /// 以语义标签与字节体构造载荷。
    pub fn new(kind: impl Into<Cow<'static, str>>, body: Bytes) -> Self {
        Self {
            kind: kind.into(),
            body,
        }
    }

    /// 以默认标签 `raw` 包装字节体。
    pub fn from_bytes(body: Bytes) -> Self {
        Self::new("raw", body)
    }

    /// 语义标签。
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// 字节体。
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// 字节体长度。
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// 字节体是否为空。
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}B)", self.kind, self.body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 验证摘要格式稳定且不暴露原始字节。
    #[test]
    fn display_is_a_compact_summary() {
        let payload = Payload::new("request", Bytes::from_static(b"\x01\x02\x03"));
        assert_eq!(payload.to_string(), "request(3B)");
        assert_eq!(payload.kind(), "request");
        assert_eq!(payload.len(), 3);
        assert!(!payload.is_empty());
    }
}
