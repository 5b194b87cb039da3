//! 统一错误类型模块
//!
//! 提供 otprs 库中所有操作的错误类型定义。
//!
//! 所有错误均作为返回值同步传递，不使用异常式控制流。验证器在窗口
//! 扫描中遇到生成错误时立即中止并原样返回该错误（fail-fast），不会
//! 与 [`Error::InvalidOtp`] 混淆。

use std::fmt;

/// otprs 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// otprs 库的错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 验证码位数超出支持范围（1 到 8 位）
    InvalidDigitCount {
        /// 请求的位数
        digits: u32,
    },

    /// 请求的 HMAC 算法未实现
    InvalidHmacAlgorithm(String),

    /// 验证码格式化结果与目标长度不一致
    FormatError {
        /// 期望的长度
        expected: usize,
        /// 实际格式化出的长度
        actual: usize,
    },

    /// 给定的验证码在搜索窗口内没有匹配
    InvalidOtp,

    /// 密钥无效
    InvalidSecret(String),

    /// 内部错误
    Internal(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 创建一个密钥无效错误
    pub fn invalid_secret(msg: impl Into<String>) -> Self {
        Error::InvalidSecret(msg.into())
    }
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDigitCount { digits } => {
                write!(f, "invalid digit count: {} (supported range is 1 to 8)", digits)
            }
            Error::InvalidHmacAlgorithm(name) => {
                write!(f, "unsupported HMAC algorithm: {}", name)
            }
            Error::FormatError { expected, actual } => {
                write!(
                    f,
                    "OTP formatting failed: expected {} digits, got {}",
                    expected, actual
                )
            }
            Error::InvalidOtp => write!(f, "OTP not found within the search window"),
            Error::InvalidSecret(msg) => write!(f, "invalid secret: {}", msg),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
