use crate::error::{AnnotationError, Result};

/// 检查字符串是否只包含ASCII数字
pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// 检查字符串是否为有效的秒数（整数或带小数）
pub fn is_seconds_field(s: &str) -> bool {
    match s.split_once('.') {
        Some((int_part, frac_part)) => {
            (int_part.is_empty() || is_digits(int_part))
                && (frac_part.is_empty() || is_digits(frac_part))
                && !(int_part.is_empty() && frac_part.is_empty())
        }
        None => is_digits(s),
    }
}

/// 解析 `[h:]m:ss[.fff]` 或 `ss[.fff]` 形式的时间字符串为秒
///
/// Leading fields are not range checked, so `90:00` is accepted as ninety
/// minutes. Only the last field may carry a fractional part.
pub fn parse_clock_seconds(s: &str) -> Result<f64> {
    let invalid = || AnnotationError::InvalidTimeString(s.to_string());

    let s_trimmed = s.trim();
    if s_trimmed.is_empty() {
        return Err(invalid());
    }

    // 处理符号
    let (negative, body) = if let Some(rest) = s_trimmed.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s_trimmed.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s_trimmed)
    };

    let fields: Vec<&str> = body.split(':').collect();
    if fields.len() > 3 {
        return Err(invalid());
    }

    let (last, leading) = match fields.split_last() {
        Some(parts) => parts,
        None => return Err(invalid()),
    };

    if !is_seconds_field(last) {
        return Err(invalid());
    }
    let mut seconds: f64 = last.parse().map_err(|_| invalid())?;

    // 从秒往前依次是分钟、小时
    let mut scale = 60.0;
    for field in leading.iter().rev() {
        if !is_digits(field) {
            return Err(invalid());
        }
        let value: u64 = field.parse().map_err(|_| invalid())?;
        seconds += value as f64 * scale;
        scale *= 60.0;
    }

    Ok(if negative { -seconds } else { seconds })
}

/// 解析 WFDB 的 `sNNN` 采样点形式
pub fn parse_sample_form(s: &str) -> Option<i64> {
    let rest = s.trim().strip_prefix('s')?;
    if is_digits(rest) {
        rest.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_seconds_field() {
        assert!(is_seconds_field("12"));
        assert!(is_seconds_field("12.5"));
        assert!(is_seconds_field(".5"));
        assert!(is_seconds_field("3."));
        assert!(!is_seconds_field("."));
        assert!(!is_seconds_field("1.2.3"));
        assert!(!is_seconds_field("abc"));
        assert!(!is_seconds_field(""));
    }

    #[test]
    fn test_parse_clock_seconds() {
        assert_eq!(parse_clock_seconds("0:00.000").unwrap(), 0.0);
        assert_eq!(parse_clock_seconds("1:30").unwrap(), 90.0);
        assert_eq!(parse_clock_seconds("1:00:01.5").unwrap(), 3601.5);
        assert_eq!(parse_clock_seconds("42").unwrap(), 42.0);
        assert_eq!(parse_clock_seconds("-0:02").unwrap(), -2.0);
        assert!(parse_clock_seconds("1:2:3:4").is_err());
        assert!(parse_clock_seconds("a:00").is_err());
        assert!(parse_clock_seconds("1.5:00").is_err());
        assert!(parse_clock_seconds("").is_err());
    }

    #[test]
    fn test_parse_sample_form() {
        assert_eq!(parse_sample_form("s1234"), Some(1234));
        assert_eq!(parse_sample_form(" s0 "), Some(0));
        assert_eq!(parse_sample_form("s"), None);
        assert_eq!(parse_sample_form("1234"), None);
    }
}
