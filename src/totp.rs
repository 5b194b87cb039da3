//! TOTP (基于时间的一次性密码) 实现模块
//!
//! 提供符合 RFC 6238 的验证码生成与验证功能，兼容 Google
//! Authenticator、Authy 等应用。TOTP 将经过的时间步数作为计数器，
//! 其余算法全部复用 HOTP 核心生成器。
//!
//! ## 特性
//!
//! - 符合 RFC 6238 标准
//! - 支持自定义时间步长、起始时间和位数
//! - 双向时间窗口验证，按与当前时间步的距离由近及远搜索
//!
//! ## 示例
//!
//! ```rust
//! use otprs::totp::{TotpConfig, TotpManager};
//! use otprs::hotp::OtpSecret;
//!
//! let manager = TotpManager::new(TotpConfig::default());
//! let secret = OtpSecret::from_bytes(b"12345678901234567890".to_vec());
//!
//! // 生成指定时间的验证码
//! let code = manager.generate_code_at(&secret, 59).unwrap();
//!
//! // 在时间窗口内验证
//! let matched = manager.validate_at(&secret, &code, 59).unwrap();
//! assert_eq!(matched.step, 0);
//! assert_eq!(matched.drift, 0);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::hotp::{generate_raw, HmacAlgorithm, OtpSecret, Truncation};
use crate::random::{constant_time_compare, generate_random_bytes};

/// 默认时间步长（秒）
pub const DEFAULT_TIME_STEP: u64 = 30;

/// 默认的时间步计数起始时间（Unix 时间）
pub const DEFAULT_START_OFFSET: u64 = 0;

/// TOTP 配置
#[derive(Debug, Clone)]
pub struct TotpConfig {
    /// 时间步长（秒）；配置为 0 时按默认的 30 秒处理
    pub time_step: u64,

    /// 时间步计数的起始时间（Unix 时间），默认 0
    pub start_offset: u64,

    /// 验证码位数，默认 6 位
    pub digits: u32,

    /// HMAC 哈希算法
    pub algorithm: HmacAlgorithm,

    /// 允许的时间偏差窗口（前后各多少个时间步）
    /// 默认为 1，即允许前后各 30 秒的误差
    pub skew: u64,

    /// 密钥长度（字节），默认 20 字节（160 位）
    pub secret_length: usize,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            start_offset: DEFAULT_START_OFFSET,
            digits: 6,
            algorithm: HmacAlgorithm::SHA1,
            skew: 1,
            secret_length: 20,
        }
    }
}

impl TotpConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置时间步长
    pub fn with_time_step(mut self, seconds: u64) -> Self {
        self.time_step = seconds;
        self
    }

    /// 设置时间步计数的起始时间
    pub fn with_start_offset(mut self, start_offset: u64) -> Self {
        self.start_offset = start_offset;
        self
    }

    /// 设置验证码位数
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// 设置哈希算法
    pub fn with_algorithm(mut self, algorithm: HmacAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 设置时间偏差窗口
    pub fn with_skew(mut self, skew: u64) -> Self {
        self.skew = skew;
        self
    }

    /// 设置密钥长度
    pub fn with_secret_length(mut self, length: usize) -> Self {
        assert!(length >= 16, "secret length must be at least 16 bytes");
        self.secret_length = length;
        self
    }

    /// 创建 Google Authenticator 兼容配置
    pub fn google_authenticator() -> Self {
        Self::default()
    }

    /// 创建高安全性配置
    pub fn high_security() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            start_offset: DEFAULT_START_OFFSET,
            digits: 8,
            algorithm: HmacAlgorithm::SHA256,
            skew: 0,
            secret_length: 32,
        }
    }
}

/// TOTP 验证匹配结果
///
/// `step` 为匹配时的迭代步数（无符号距离），与匹配方向无关；方向由
/// `drift` 的符号给出，匹配使用的绝对计数器值为 `counter`。三个字段
/// 总是同时填充，不存在只有距离没有方向的返回形态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpMatch {
    /// 距当前时间步的步数（0 表示当前步）
    pub step: u64,

    /// 匹配的绝对计数器值
    pub counter: u64,

    /// 带符号的时间步偏移（正数表示未来，负数表示过去）
    pub drift: i64,
}

/// TOTP 管理器
#[derive(Debug, Clone)]
pub struct TotpManager {
    config: TotpConfig,
}

impl TotpManager {
    /// 创建新的 TOTP 管理器
    pub fn new(config: TotpConfig) -> Self {
        Self { config }
    }

    /// 使用默认配置创建管理器
    pub fn default_manager() -> Self {
        Self::new(TotpConfig::default())
    }

    /// 生成新的 TOTP 密钥
    pub fn generate_secret(&self) -> Result<OtpSecret> {
        let bytes = generate_random_bytes(self.config.secret_length)?;
        Ok(OtpSecret::from_bytes(bytes))
    }

    /// 实际生效的时间步长
    ///
    /// 配置值为 0 时视为默认的 30 秒。
    pub fn effective_time_step(&self) -> u64 {
        if self.config.time_step == 0 {
            DEFAULT_TIME_STEP
        } else {
            self.config.time_step
        }
    }

    /// 计算指定时间对应的计数器值
    ///
    /// `counter = (now - start_offset) / time_step`（向下取整）。
    /// `start_offset` 晚于 `now` 时按 0 计。
    pub fn counter_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.config.start_offset) / self.effective_time_step()
    }

    /// 生成当前时间的 TOTP 验证码
    pub fn generate_code(&self, secret: &OtpSecret) -> Result<String> {
        self.generate_code_at(secret, current_timestamp())
    }

    /// 生成指定时间的 TOTP 验证码
    pub fn generate_code_at(&self, secret: &OtpSecret, now: u64) -> Result<String> {
        generate_raw(
            &secret.raw,
            self.counter_at(now),
            self.config.digits,
            false,
            Truncation::Dynamic,
            self.config.algorithm,
        )
    }

    /// 验证当前时间的 TOTP 验证码
    pub fn verify(&self, secret: &OtpSecret, code: &str) -> Result<bool> {
        self.verify_at(secret, code, current_timestamp())
    }

    /// 验证指定时间的 TOTP 验证码
    ///
    /// 窗口内没有匹配时返回 `Ok(false)`，其余错误原样返回。
    pub fn verify_at(&self, secret: &OtpSecret, code: &str, now: u64) -> Result<bool> {
        match self.validate_at(secret, code, now) {
            Ok(_) => Ok(true),
            Err(Error::InvalidOtp) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 在时间窗口内验证 TOTP 验证码并返回匹配详情
    ///
    /// 按与当前时间步距离递增的顺序搜索：先检查当前计数器，随后对
    /// 每个步数 `k = 1..=skew` 依次检查 `counter + k` 与
    /// `counter - k`，遇到第一个匹配即返回。向过去搜索越过计数器 0
    /// 的部分被跳过。验证码位数由输入长度推断。
    ///
    /// # 错误
    ///
    /// - 窗口内没有匹配时返回 [`Error::InvalidOtp`]
    /// - 生成过程中的错误立即返回，不再继续扫描
    pub fn validate_at(&self, secret: &OtpSecret, code: &str, now: u64) -> Result<TotpMatch> {
        // 规范化输入码
        let normalized = code.replace([' ', '-'], "");
        let digits = normalized.len() as u32;
        let counter = self.counter_at(now);

        for step in 0..=self.config.skew {
            let ahead = counter + step;
            let expected = generate_raw(
                &secret.raw,
                ahead,
                digits,
                false,
                Truncation::Dynamic,
                self.config.algorithm,
            )?;
            if constant_time_compare(normalized.as_bytes(), expected.as_bytes()) {
                return Ok(TotpMatch {
                    step,
                    counter: ahead,
                    drift: step as i64,
                });
            }

            if step == 0 {
                continue;
            }

            if let Some(behind) = counter.checked_sub(step) {
                let expected = generate_raw(
                    &secret.raw,
                    behind,
                    digits,
                    false,
                    Truncation::Dynamic,
                    self.config.algorithm,
                )?;
                if constant_time_compare(normalized.as_bytes(), expected.as_bytes()) {
                    return Ok(TotpMatch {
                        step,
                        counter: behind,
                        drift: -(step as i64),
                    });
                }
            }
        }

        Err(Error::InvalidOtp)
    }

    /// 获取当前验证码的剩余有效时间（秒）
    pub fn time_remaining(&self) -> u64 {
        let step = self.effective_time_step();
        step - (current_timestamp().saturating_sub(self.config.start_offset) % step)
    }

    /// 获取配置
    pub fn config(&self) -> &TotpConfig {
        &self.config
    }
}

/// 获取当前 Unix 时间戳
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
