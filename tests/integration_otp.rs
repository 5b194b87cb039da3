//! 集成测试：一次性密码 (OTP)
//!
//! 测试 HOTP/TOTP 生成验证流程和密钥处理。

use otprs::hotp::{HmacAlgorithm, HotpConfig, HotpGenerator, OtpSecret, Truncation};
use otprs::totp::{TotpConfig, TotpManager};
use otprs::Error;

/// RFC 4226 / RFC 6238 共用的 20 字节测试密钥
const RFC_SECRET: &[u8] = b"12345678901234567890";

/// 测试 HOTP 基本流程（RFC 4226 测试向量）
#[test]
fn test_hotp_basic_flow() {
    let generator = HotpGenerator::new(HotpConfig::default());
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());

    // 1. 生成一系列验证码，应与 RFC 4226 附录 D 一致
    let expected = [
        "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583", "399871",
        "520489",
    ];
    for (counter, want) in expected.iter().enumerate() {
        let code = generator
            .generate(&secret, counter as u64)
            .expect("Code generation should succeed");
        assert_eq!(&code, want, "RFC 4226 vector mismatch at {}", counter);
    }

    // 2. 每个验证码对其计数器的匹配偏移量为 0
    for counter in 0..10u64 {
        let code = generator.generate(&secret, counter).unwrap();
        let offset = generator
            .validate(&secret, &code, counter)
            .expect("Validation should succeed");
        assert_eq!(offset, 0, "Self-consistency failed at {}", counter);
    }
}

/// 测试 HOTP 同步窗口搜索
#[test]
fn test_hotp_window_search() {
    let generator = HotpGenerator::new(HotpConfig::default());
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());

    // "162583" 是计数器 7 的验证码
    // 从计数器 3 开始、默认窗口 10 内应在偏移量 4 处命中
    let offset = generator
        .validate(&secret, "162583", 3)
        .expect("Validation should succeed");
    assert_eq!(offset, 4);

    // 窗口缩小到 2 时同一验证码应被拒绝
    let narrow = HotpGenerator::new(HotpConfig::default().with_look_ahead_window(2));
    let err = narrow.validate(&secret, "162583", 3).unwrap_err();
    assert_eq!(err, Error::InvalidOtp, "Code outside window should fail");
}

/// 测试带校验和数字的 HOTP 流程
#[test]
fn test_hotp_checksum_flow() {
    let generator = HotpGenerator::new(HotpConfig::default().with_checksum(true));
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());

    // 校验和作为额外一位附加在标准验证码之后
    let code = generator
        .generate(&secret, 0)
        .expect("Code generation should succeed");
    assert_eq!(code, "7552243", "Checksum digit should be appended");
    assert_eq!(code.len(), 7, "Checksum code should be one digit longer");
}

/// 测试固定偏移量截断
#[test]
fn test_hotp_explicit_truncation() {
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());

    // 有效偏移量生效
    let generator =
        HotpGenerator::new(HotpConfig::default().with_truncation(Truncation::Offset(4)));
    let code = generator.generate(&secret, 0).unwrap();
    assert_eq!(code, "455891");

    // 超出范围的偏移量静默回退为动态截断
    let generator =
        HotpGenerator::new(HotpConfig::default().with_truncation(Truncation::Offset(99)));
    let code = generator.generate(&secret, 0).unwrap();
    assert_eq!(code, "755224");
}

/// 测试 TOTP 基本流程（RFC 6238 测试向量）
#[test]
fn test_totp_basic_flow() {
    let manager = TotpManager::new(TotpConfig::default().with_digits(8));
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());

    // 1. 指定时间的验证码应与 RFC 6238 附录 B 一致
    let code = manager
        .generate_code_at(&secret, 59)
        .expect("Code generation should succeed");
    assert_eq!(code, "94287082");

    // 2. 同一时间验证应命中当前时间步
    let matched = manager
        .validate_at(&secret, &code, 59)
        .expect("Validation should succeed");
    assert_eq!(matched.step, 0);
    assert_eq!(matched.drift, 0);
    assert_eq!(matched.counter, 1);
}

/// 测试 TOTP 双向时间窗口
#[test]
fn test_totp_drift_window() {
    let manager = TotpManager::new(TotpConfig::default().with_skew(2));
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());
    let now = 1234567890;

    // 客户端时钟快了 2 个时间步
    let ahead = manager.generate_code_at(&secret, now + 60).unwrap();
    let matched = manager
        .validate_at(&secret, &ahead, now)
        .expect("Code within forward window should validate");
    assert_eq!(matched.step, 2);
    assert_eq!(matched.drift, 2);

    // 客户端时钟慢了 2 个时间步
    let behind = manager.generate_code_at(&secret, now - 60).unwrap();
    let matched = manager
        .validate_at(&secret, &behind, now)
        .expect("Code within backward window should validate");
    assert_eq!(matched.step, 2);
    assert_eq!(matched.drift, -2);

    // 偏差 3 个时间步超出窗口
    let stale = manager.generate_code_at(&secret, now + 90).unwrap();
    let err = manager.validate_at(&secret, &stale, now).unwrap_err();
    assert_eq!(err, Error::InvalidOtp, "Code outside window should fail");
}

/// 测试验证器对生成错误的 fail-fast 行为
#[test]
fn test_validators_fail_fast() {
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());

    // 9 位候选码推断出无效位数，两个验证器都应立即报错
    let generator = HotpGenerator::new(HotpConfig::default());
    let err = generator.validate(&secret, "123456789", 0).unwrap_err();
    assert_eq!(err, Error::InvalidDigitCount { digits: 9 });

    let manager = TotpManager::new(TotpConfig::default());
    let err = manager
        .validate_at(&secret, "123456789", 1234567890)
        .unwrap_err();
    assert_eq!(err, Error::InvalidDigitCount { digits: 9 });
}

/// 测试各哈希算法的端到端流程
#[test]
fn test_otp_with_all_algorithms() {
    for name in ["SHA1", "SHA256", "SHA512"] {
        let algorithm = HmacAlgorithm::from_name(name).expect("Known algorithm should resolve");

        let generator = HotpGenerator::new(HotpConfig::default().with_algorithm(algorithm));
        let secret = generator
            .generate_secret()
            .expect("Secret generation should succeed");

        let code = generator.generate(&secret, 42).unwrap();
        assert_eq!(code.len(), 6);
        assert_eq!(
            generator.validate(&secret, &code, 42).unwrap(),
            0,
            "Failed for algorithm {}",
            name
        );
    }

    // 未实现的算法名称应被拒绝
    let err = HmacAlgorithm::from_name("MD5").unwrap_err();
    assert_eq!(err, Error::InvalidHmacAlgorithm("MD5".to_string()));
}

/// 测试 TOTP 密钥从 base32 恢复
#[test]
fn test_totp_secret_restore() {
    let manager = TotpManager::new(TotpConfig::default());

    // 生成原始密钥
    let original_secret = manager.generate_secret().unwrap();
    let base32_string = original_secret.base32.clone();

    // 从 base32 恢复密钥
    let restored_secret =
        OtpSecret::from_base32(&base32_string).expect("Secret should be restored from base32");

    // 两个密钥在同一时间生成的码应该相同
    let now = 1234567890;
    let original_code = manager.generate_code_at(&original_secret, now).unwrap();
    let restored_code = manager.generate_code_at(&restored_secret, now).unwrap();

    assert_eq!(
        original_code, restored_code,
        "Restored secret should generate same code"
    );
}

/// 测试所有生成的验证码保留前导零格式
#[test]
fn test_code_formatting() {
    let generator = HotpGenerator::new(HotpConfig::default());
    let secret = OtpSecret::from_bytes(RFC_SECRET.to_vec());

    let mut codes = std::collections::HashSet::new();
    for counter in 0..50u64 {
        let code = generator.generate(&secret, counter).unwrap();
        assert_eq!(code.len(), 6, "Code length must be fixed at {}", counter);
        assert!(
            code.chars().all(|c| c.is_ascii_digit()),
            "Code should only contain digits"
        );
        codes.insert(code);
    }

    // 50 个连续计数器的验证码几乎必然各不相同
    assert!(codes.len() > 45, "Codes should be well distributed");
}
