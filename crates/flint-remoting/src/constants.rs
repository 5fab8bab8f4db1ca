//! 配置参数键与编译期默认值。
//!
//! ## 角色定位（Why）
//! - 集中声明通道层识别的 URL 参数键，避免各模块散落字符串字面量；
//! - 默认值是“非正值回退”语义的落点：任何缺失或非法的超时参数最终落到
//!   这里的正整数，杜绝 0 超时意外进入配置。
//!
//! ## 契约说明（What）
//! - 键名稳定，视作对外兼容面的一部分；
//! - 默认值单位为毫秒；编解码默认名对应注册中心中的兜底实现。

/// 响应超时参数键。
pub const TIMEOUT_KEY: &str = "timeout";

/// 建连超时参数键。
pub const CONNECT_TIMEOUT_KEY: &str = "connect.timeout";

/// 编解码器名称参数键。
pub const CODEC_KEY: &str = "codec";

/// 响应超时默认值（毫秒）。
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;

/// 建连超时默认值（毫秒）。
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;

/// 默认编解码器名称。
pub const DEFAULT_CODEC: &str = "telnet";
