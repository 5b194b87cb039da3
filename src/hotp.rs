//! HOTP (基于计数器的一次性密码) 实现模块
//!
//! 提供符合 RFC 4226 的验证码生成与验证功能，是 TOTP 模块的算法核心。
//!
//! ## 特性
//!
//! - 符合 RFC 4226 标准，支持 1 到 8 位验证码
//! - 支持 SHA-1 / SHA-256 / SHA-512 三种 HMAC 算法
//! - 支持动态截断与固定偏移量截断
//! - 可选的校验和数字（RFC 4226 参考实现算法）
//! - 计数器同步窗口验证
//!
//! ## 示例
//!
//! ```rust
//! use otprs::hotp::{HotpConfig, HotpGenerator, OtpSecret};
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

use base32::{decode as base32_decode, encode as base32_encode, Alphabet};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::{Error, Result};
use crate::random::{constant_time_compare, generate_random_bytes};

/// 支持的最小验证码位数
pub const MIN_DIGITS: u32 = 1;

/// 支持的最大验证码位数
pub const MAX_DIGITS: u32 = 8;

/// OTP 使用的 HMAC 哈希算法
///
/// 每个变体同时提供哈希计算（[`hmac`](HmacAlgorithm::hmac)）与输出
/// 长度（[`output_size`](HmacAlgorithm::output_size)）能力，调用方
/// 按值选择变体即可，无需自行分发哈希实现。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HmacAlgorithm {
    /// SHA-1（默认，最广泛支持）
    #[default]
    SHA1,
    /// SHA-256
    SHA256,
    /// SHA-512
    SHA512,
}

impl HmacAlgorithm {
    /// 获取算法名称
    pub fn as_str(&self) -> &'static str {
        match self {
            HmacAlgorithm::SHA1 => "SHA1",
            HmacAlgorithm::SHA256 => "SHA256",
            HmacAlgorithm::SHA512 => "SHA512",
        }
    }

    /// 按名称查找算法（大小写不敏感）
    ///
    /// 未实现的算法名称返回 [`Error::InvalidHmacAlgorithm`]。
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(HmacAlgorithm::SHA1),
            "SHA256" => Ok(HmacAlgorithm::SHA256),
            "SHA512" => Ok(HmacAlgorithm::SHA512),
            _ => Err(Error::InvalidHmacAlgorithm(name.to_string())),
        }
    }

    /// 哈希输出长度（字节）
    ///
    /// 固定偏移量截断的有效范围受此长度约束。
    pub fn output_size(&self) -> usize {
        match self {
            HmacAlgorithm::SHA1 => 20,
            HmacAlgorithm::SHA256 => 32,
            HmacAlgorithm::SHA512 => 64,
        }
    }

    /// 以 `secret` 为密钥对 `message` 计算 HMAC
    pub fn hmac(&self, secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        match self {
            HmacAlgorithm::SHA1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(secret)
                    .map_err(|_| Error::internal("invalid hmac key"))?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            HmacAlgorithm::SHA256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                    .map_err(|_| Error::internal("invalid hmac key"))?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            HmacAlgorithm::SHA512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(secret)
                    .map_err(|_| Error::internal("invalid hmac key"))?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
        }
    }
}

/// 截断策略
///
/// RFC 4226 的动态截断取哈希最后一个字节的低 4 位作为读取偏移量。
/// 固定偏移量 `o` 仅在 `0 <= o <= hash_size - 4` 时生效，超出范围时
/// 静默回退为动态截断，不视为错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Truncation {
    /// 动态截断（RFC 4226 5.3 节）
    #[default]
    Dynamic,
    /// 从指定的字节偏移量读取 4 字节
    Offset(usize),
}

/// OTP 共享密钥
///
/// 同时保存原始字节和 Base32 编码形式。库不会修改调用方的密钥，
/// 也不会在调用之外保留它。
#[derive(Debug, Clone)]
pub struct OtpSecret {
    /// 原始密钥字节
    pub raw: Vec<u8>,

    /// Base32 编码的密钥（用于显示和手工录入）
    pub base32: String,
}

impl OtpSecret {
    /// 从原始字节创建
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let base32 = base32_encode(Alphabet::Rfc4648 { padding: false }, &bytes);
        Self { raw: bytes, base32 }
    }

    /// 从 Base32 字符串创建
    pub fn from_base32(base32: &str) -> Result<Self> {
        let clean = base32.replace([' ', '-'], "").to_uppercase();
        let raw = base32_decode(Alphabet::Rfc4648 { padding: false }, &clean)
            .ok_or_else(|| Error::invalid_secret("invalid base32 secret"))?;
        Ok(Self { raw, base32: clean })
    }
}

/// 校验和数字替换表（RFC 4226 参考实现）
const CHECKSUM_SUBSTITUTION: [u64; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// 计算验证码的校验和数字
///
/// 从最低位开始扫描 `digits` 个十进制数字，每隔一位（从最低位起）
/// 先经替换表替换再求和，校验和为 `(10 - sum % 10) % 10`。该数字
/// 作为新的最低位附加到验证码末尾，可检测单个数字的录入错误。
pub fn checksum_digit(otp: u64, digits: u32) -> u64 {
    let mut remaining = otp;
    let mut double_digit = true;
    let mut total = 0;

    for _ in 0..digits {
        let mut digit = remaining % 10;
        remaining /= 10;
        if double_digit {
            digit = CHECKSUM_SUBSTITUTION[digit as usize];
        }
        total += digit;
        double_digit = !double_digit;
    }

    (10 - total % 10) % 10
}

/// 生成一个 HOTP 验证码
///
/// OTP 核心算法：计数器按 8 字节大端序编码后作为消息计算 HMAC，按
/// `truncation` 策略截取 4 字节（首字节最高位清零）得到 31 位整数，
/// 对 10^`digits` 取模后零填充为定长十进制字符串。`add_checksum`
/// 为真时在末尾附加一位校验和数字，输出长度加一。
///
/// # 错误
///
/// - `digits` 不在 1 到 8 之间时返回 [`Error::InvalidDigitCount`]
/// - 格式化长度与目标不一致时返回 [`Error::FormatError`]
pub fn generate_raw(
    secret: &[u8],
    counter: u64,
    digits: u32,
    add_checksum: bool,
    truncation: Truncation,
    algorithm: HmacAlgorithm,
) -> Result<String> {
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        return Err(Error::InvalidDigitCount { digits });
    }

    let counter_bytes = counter.to_be_bytes();
    let hash = algorithm.hmac(secret, &counter_bytes)?;

    // 动态截断：最后一个字节的低 4 位决定读取偏移量；
    // 有效范围内的固定偏移量优先生效
    let offset = match truncation {
        Truncation::Offset(o) if o <= hash.len() - 4 => o,
        _ => (hash[hash.len() - 1] & 0x0f) as usize,
    };

    let binary = ((hash[offset] & 0x7f) as u32) << 24
        | (hash[offset + 1] as u32) << 16
        | (hash[offset + 2] as u32) << 8
        | (hash[offset + 3] as u32);

    let modulo = 10u64.pow(digits);
    let mut value = binary as u64 % modulo;

    // 校验和作为额外的最低位附加，目标长度加一
    let mut width = digits as usize;
    if add_checksum {
        value = value * 10 + checksum_digit(value, digits);
        width += 1;
    }

    let code = format!("{:0width$}", value, width = width);
    if code.len() != width {
        return Err(Error::FormatError {
            expected: width,
            actual: code.len(),
        });
    }

    Ok(code)
}

/// HOTP 配置
#[derive(Debug, Clone)]
pub struct HotpConfig {
    /// 验证码位数（1 到 8），默认 6 位
    pub digits: u32,

    /// HMAC 哈希算法
    pub algorithm: HmacAlgorithm,

    /// 截断策略，默认动态截断
    pub truncation: Truncation,

    /// 是否在生成的验证码末尾附加校验和数字
    pub add_checksum: bool,

    /// 同步窗口大小（验证时向前额外尝试的计数器数量）
    pub look_ahead_window: u64,

    /// 密钥长度（字节），默认 20 字节（160 位）
    pub secret_length: usize,
}

impl Default for HotpConfig {
    fn default() -> Self {
        Self {
            digits: 6,
            algorithm: HmacAlgorithm::SHA1,
            truncation: Truncation::Dynamic,
            add_checksum: false,
            look_ahead_window: 10,
            secret_length: 20,
        }
    }
}

impl HotpConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置验证码位数
    ///
    /// 超出 1 到 8 范围的位数在生成时返回
    /// [`Error::InvalidDigitCount`]，此处不做检查。
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// 设置哈希算法
    pub fn with_algorithm(mut self, algorithm: HmacAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 设置截断策略
    pub fn with_truncation(mut self, truncation: Truncation) -> Self {
        self.truncation = truncation;
        self
    }

    /// 设置是否附加校验和数字
    pub fn with_checksum(mut self, add_checksum: bool) -> Self {
        self.add_checksum = add_checksum;
        self
    }

    /// 设置同步窗口大小
    pub fn with_look_ahead_window(mut self, window: u64) -> Self {
        self.look_ahead_window = window;
        self
    }

    /// 设置密钥长度
    pub fn with_secret_length(mut self, length: usize) -> Self {
        assert!(length >= 16, "secret length must be at least 16 bytes");
        self.secret_length = length;
        self
    }
}

/// HOTP 验证结果
#[derive(Debug, Clone)]
pub struct HotpVerifyResult {
    /// 是否验证成功
    pub valid: bool,

    /// 匹配时的计数器值（如果验证成功）
    pub matched_counter: Option<u64>,

    /// 建议的下一个计数器值
    pub next_counter: u64,
}

/// HOTP 生成器
#[derive(Debug, Clone)]
pub struct HotpGenerator {
    config: HotpConfig,
}

impl HotpGenerator {
    /// 创建新的 HOTP 生成器
    pub fn new(config: HotpConfig) -> Self {
        Self { config }
    }

    /// 使用默认配置创建生成器
    pub fn default_generator() -> Self {
        Self::new(HotpConfig::default())
    }

    /// 生成新的 HOTP 密钥
    pub fn generate_secret(&self) -> Result<OtpSecret> {
        let bytes = generate_random_bytes(self.config.secret_length)?;
        Ok(OtpSecret::from_bytes(bytes))
    }

    /// 生成 HOTP 验证码
    ///
    /// # 参数
    ///
    /// * `secret` - 密钥
    /// * `counter` - 计数器值
    ///
    /// # 返回
    ///
    /// 返回生成的验证码字符串
    pub fn generate(&self, secret: &OtpSecret, counter: u64) -> Result<String> {
        generate_raw(
            &secret.raw,
            counter,
            self.config.digits,
            self.config.add_checksum,
            self.config.truncation,
            self.config.algorithm,
        )
    }

    /// 在同步窗口内验证 HOTP 验证码
    ///
    /// 验证码位数由输入长度推断，与配置的生成位数无关；窗口内的候选
    /// 码一律按动态截断、无校验和生成。从 `start_counter` 起连同窗口
    /// 共检查 `look_ahead_window + 1` 个计数器，返回第一个匹配的
    /// 0 基偏移量。
    ///
    /// # 错误
    ///
    /// - 窗口内没有匹配时返回 [`Error::InvalidOtp`]
    /// - 生成过程中的错误立即返回，不再继续扫描
    pub fn validate(&self, secret: &OtpSecret, code: &str, start_counter: u64) -> Result<u64> {
        // 规范化输入码
        let normalized = code.replace([' ', '-'], "");
        let digits = normalized.len() as u32;

        for offset in 0..=self.config.look_ahead_window {
            let expected = generate_raw(
                &secret.raw,
                start_counter + offset,
                digits,
                false,
                Truncation::Dynamic,
                self.config.algorithm,
            )?;

            if constant_time_compare(normalized.as_bytes(), expected.as_bytes()) {
                return Ok(offset);
            }
        }

        Err(Error::InvalidOtp)
    }

    /// 验证 HOTP 验证码
    ///
    /// # 参数
    ///
    /// * `secret` - 密钥
    /// * `code` - 用户输入的验证码
    /// * `counter` - 当前计数器值
    ///
    /// # 返回
    ///
    /// 返回 (是否有效, 新的计数器值)
    pub fn verify(&self, secret: &OtpSecret, code: &str, counter: u64) -> Result<(bool, u64)> {
        let result = self.verify_with_result(secret, code, counter)?;
        Ok((result.valid, result.next_counter))
    }

    /// 验证 HOTP 验证码并返回详细结果
    pub fn verify_with_result(
        &self,
        secret: &OtpSecret,
        code: &str,
        counter: u64,
    ) -> Result<HotpVerifyResult> {
        match self.validate(secret, code, counter) {
            Ok(offset) => Ok(HotpVerifyResult {
                valid: true,
                matched_counter: Some(counter + offset),
                next_counter: counter + offset + 1,
            }),
            Err(Error::InvalidOtp) => Ok(HotpVerifyResult {
                valid: false,
                matched_counter: None,
                next_counter: counter,
            }),
            Err(e) => Err(e),
        }
    }

    /// 获取配置
    pub fn config(&self) -> &HotpConfig {
        &self.config
    }
}
