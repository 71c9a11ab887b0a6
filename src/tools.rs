use chrono::{DateTime, Utc};
use std::net::IpAddr;

/// 纳秒精度的小数位数
const NANOS_DIGITS: usize = 9;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// IPv4 受限广播地址
const BROADCAST_V4: &str = "255.255.255.255";

/// 把 Zeek 的 Unix 时间戳（`seconds[.fraction]`）转换为 UTC 时间
///
/// 小数部分按十进制小数解释并补齐到纳秒，例如 `.70526` 表示 705260000 纳秒。
/// 负数时间戳的小数部分同样向零的反方向计，`-1.5` 表示纪元前 1.5 秒。
/// 格式错误或超出范围时返回 `None`。
pub fn unix_str_to_time(value: &str) -> Option<DateTime<Utc>> {
    let (secs_text, frac) = value.split_once('.').unwrap_or((value, ""));

    let secs: i64 = secs_text.parse().ok()?;
    if frac.len() > NANOS_DIGITS || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut nanos: u32 = 0;
    for idx in 0..NANOS_DIGITS {
        let digit = frac.as_bytes().get(idx).map_or(0, |b| u32::from(b - b'0'));
        nanos = nanos * 10 + digit;
    }

    // `-0.5` 的整数部分解析为 0，符号只能从文本判断
    if secs_text.starts_with('-') && nanos > 0 {
        return DateTime::from_timestamp(secs.checked_sub(1)?, NANOS_PER_SEC - nanos);
    }
    DateTime::from_timestamp(secs, nanos)
}

/// 判断地址是否为组播或广播地址
///
/// 便于在分析脚本中排除/筛选这类流量。无法解析的地址返回 `false`。
pub fn is_multicast_or_broadcast(address: &str) -> bool {
    if address == BROADCAST_V4 {
        return true;
    }
    address
        .parse::<IpAddr>()
        .map(|ip| ip.is_multicast())
        .unwrap_or(false)
}
