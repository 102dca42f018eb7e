//! # 记录标识
//!
//! 每张表的主键都是 24 位十六进制字符串：4 字节秒级时间戳 + 8 字节随机数

use chrono::Utc;

/// 记录标识长度
pub const RECORD_ID_LEN: usize = 24;

/// 生成新的记录标识
#[must_use]
pub fn new_record_id() -> String {
    let seconds = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
    let random: [u8; 8] = rand::random();

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..].copy_from_slice(&random);
    hex::encode(bytes)
}

/// 判断字符串是否为语法上合法的记录标识
#[must_use]
pub fn is_record_id(value: &str) -> bool {
    value.len() == RECORD_ID_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}
