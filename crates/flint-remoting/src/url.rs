use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// 端点配置 URL，通道层所有可调参数的只读来源。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 为通道与端点提供统一的键值参数视图，替代在构造函数间层层透传的
///   零散配置项；
/// - 参数读取带类型化语义：正整数参数在缺失或非法时回退默认值，使超时
///   配置永远为正。
///
/// ## 契约 (What)
/// - 构造后只读；`with_parameter` 采用 Builder 风格在构造期追加参数；
/// - `positive_parameter`：缺失、非整数、零或负值一律返回 `default`；
/// - `positive_parameter_strict`：供重配置路径使用，以
///   [`UrlParameterError`] 精确区分失败原因，调用方可记录后跳过；
/// - `Display` 输出 `scheme://host:port?k=v&…`，参数按键序稳定排列。
///
/// ## 注意事项 (Trade-offs)
/// - 本类型不承担字符串解析职责（线缆格式超出范围），由宿主以编程方式
///   构造；
/// - 参数统一以字符串存储，类型化读取在访问期完成，牺牲少量解析开销换取
///   与多种来源（命令行、注册中心推送）的兼容。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointUrl {
    scheme: Cow<'static, str>,
    host: Cow<'static, str>,
    port: u16,
    parameters: BTreeMap<String, String>,
}

impl EndpointUrl {
    /// 构造不带参数的 URL。
    pub fn new(
        scheme: impl Into<Cow<'static, str>>,
        host: impl Into<Cow<'static, str>>,
        port: u16,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
            parameters: BTreeMap::new(),
        }
    }

    /// 追加一个参数并返回新的 URL，同键覆盖旧值。
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// 协议名。
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// 主机名。
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 端口号。
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` 形式的地址文本，用于日志与错误描述。
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 是否携带指定参数。
    pub fn has_parameter(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    /// 读取参数原始值。
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// 读取参数，缺失时返回 `default`。
    pub fn parameter_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.parameter(key).unwrap_or(default)
    }

    /// 严格读取正整数参数。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：重配置路径需要区分“参数非法”与“参数缺失”，前者
    ///   应记录告警后跳过，后者意味着字段保持不变；
    /// - **契约 (What)**：
    ///   - 缺失返回 [`UrlParameterError::Missing`]；
    ///   - 无法解析为整数返回 [`UrlParameterError::NotAnInteger`]；
    ///   - 解析成功但 ≤ 0 返回 [`UrlParameterError::NotPositive`]；
    ///   - 成功时返回严格正的 `u64`。
    pub fn positive_parameter_strict(&self, key: &str) -> Result<u64, UrlParameterError> {
        let Some(raw) = self.parameter(key) else {
            return Err(UrlParameterError::Missing {
                key: key.to_owned(),
            });
        };
        let value: i64 = raw.parse().map_err(|_| UrlParameterError::NotAnInteger {
            key: key.to_owned(),
            value: raw.to_owned(),
        })?;
        if value <= 0 {
            return Err(UrlParameterError::NotPositive {
                key: key.to_owned(),
                value: raw.to_owned(),
            });
        }
        Ok(value as u64)
    }

    /// 宽松读取正整数参数，任何失败都回退到 `default`。
    ///
    /// - **契约 (What)**：返回值恒为正（前提是 `default` 为正）；构造期
    ///   配置推导应使用本方法，确保超时字段不会装入 0 或负值。
    pub fn positive_parameter(&self, key: &str, default: u64) -> u64 {
        self.positive_parameter_strict(key).unwrap_or(default)
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)?;
        let mut separator = '?';
        for (key, value) in &self.parameters {
            write!(f, "{separator}{key}={value}")?;
            separator = '&';
        }
        Ok(())
    }
}

/// 正整数参数读取失败的具体原因。
///
/// - **意图 (Why)**：让重配置路径能够打印准确的跳过原因，而非笼统的
///   “参数无效”；
/// - **契约 (What)**：三个变体互斥；`Display` 文本稳定，可直接进入日志。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum UrlParameterError {
    /// URL 未携带该参数。
    #[error("parameter `{key}` is absent")]
    Missing { key: String },

    /// 参数值不是整数。
    #[error("parameter `{key}` value `{value}` is not an integer")]
    NotAnInteger { key: String, value: String },

    /// 参数值不是正数。
    #[error("parameter `{key}` value `{value}` must be positive")]
    NotPositive { key: String, value: String },
}
