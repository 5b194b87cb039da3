//! # otprs
//!
//! 一个简单的一次性密码 (OTP) 库，实现 HOTP 与 TOTP 算法。
//!
//! ## 功能特性
//!
//! - **HOTP**: 符合 RFC 4226 的基于计数器的一次性密码，含同步窗口验证
//! - **TOTP**: 符合 RFC 6238 的基于时间的一次性密码，含双向时间窗口验证
//! - **多种哈希算法**: SHA-1 / SHA-256 / SHA-512
//! - **截断策略**: 动态截断或固定偏移量截断
//! - **校验和数字**: RFC 4226 参考实现的校验和算法
//! - **密钥工具**: 安全随机密钥生成与 Base32 编解码
//!
//! 库本身无状态：每次调用只依赖传入的参数，可以安全地在多线程环境
//! 中并发使用。
//!
//! ## HOTP 示例
//!
//! ```rust
//! use otprs::{HotpConfig, HotpGenerator, OtpSecret};
//!
//! let generator = HotpGenerator::new(HotpConfig::default());
//! let secret = OtpSecret::from_bytes(b"12345678901234567890".to_vec());
//!
//! // 生成计数器 0 的验证码
//! let code = generator.generate(&secret, 0).unwrap();
//! assert_eq!(code, "755224");
//!
//! // 在同步窗口内验证，返回匹配的 0 基偏移量
//! let offset = generator.validate(&secret, &code, 0).unwrap();
//! assert_eq!(offset, 0);
//! ```
//!
//! ## TOTP 示例
//!
//! ```rust
//! use otprs::{OtpSecret, TotpConfig, TotpManager};
//!
//! let manager = TotpManager::new(TotpConfig::default());
//! let secret = OtpSecret::from_bytes(b"12345678901234567890".to_vec());
//!
//! // 生成指定时间的验证码（RFC 6238 的测试时间点）
//! let code = manager.generate_code_at(&secret, 59).unwrap();
//!
//! // 在时间窗口内验证，返回匹配的步数、计数器和带符号偏移
//! let matched = manager.validate_at(&secret, &code, 59).unwrap();
//! assert_eq!(matched.step, 0);
//! assert_eq!(matched.drift, 0);
//! ```

pub mod error;
pub mod hotp;
pub mod random;
pub mod totp;

pub use error::{Error, Result};

// ============================================================================
// HOTP 相关导出
// ============================================================================

pub use hotp::{
    checksum_digit, generate_raw, HmacAlgorithm, HotpConfig, HotpGenerator, HotpVerifyResult,
    OtpSecret, Truncation, MAX_DIGITS, MIN_DIGITS,
};

// ============================================================================
// TOTP 相关导出
// ============================================================================

pub use totp::{TotpConfig, TotpManager, TotpMatch, DEFAULT_START_OFFSET, DEFAULT_TIME_STEP};

// ============================================================================
// 随机数与比较辅助导出
// ============================================================================

pub use random::{constant_time_compare, constant_time_compare_str, generate_random_bytes};
