//! Division-code structure: `PPCCAA`, where PP is the province, CC the city
//! and AA the area. The level of a code follows from its trailing zeros.

/// Label used for the city tier of municipalities that have none
/// (北京, 上海, 天津, 重庆 and similar).
pub const DIRECT_UNITS_LABEL: &str = "市辖区";

/// Default placeholder for unresolved address components.
pub const UNKNOWN_PLACEHOLDER: &str = "未知";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DivisionLevel {
    /// 省级: `PP0000`
    Province,
    /// 地级: `PPCC00`
    City,
    /// 县级: `PPCCAA`
    Area,
}

impl DivisionLevel {
    pub fn as_chinese(&self) -> &'static str {
        match self {
            Self::Province => "省",
            Self::City => "市",
            Self::Area => "区县",
        }
    }

    /// Number of leading digits that identify a division at this level.
    pub fn code_width(&self) -> usize {
        match self {
            Self::Province => 2,
            Self::City => 4,
            Self::Area => 6,
        }
    }
}

/// True for exactly six ASCII digits.
pub fn is_division_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a code by its trailing-zero pattern.
/// Returns `None` for anything that is not a 6-digit code.
pub fn level_of(code: &str) -> Option<DivisionLevel> {
    if !is_division_code(code) {
        return None;
    }
    if code.ends_with("0000") {
        Some(DivisionLevel::Province)
    } else if code.ends_with("00") {
        Some(DivisionLevel::City)
    } else {
        Some(DivisionLevel::Area)
    }
}

/// A code that can be resolved to an area: six digits, area part not `00`.
pub fn is_area_code(code: &str) -> bool {
    level_of(code) == Some(DivisionLevel::Area)
}

/// `110101` → `110000`; `None` unless `code` is a 6-digit code.
pub fn province_code(code: &str) -> Option<String> {
    is_division_code(code).then(|| format!("{}0000", &code[..2]))
}

/// `110101` → `110100`; `None` unless `code` is a 6-digit code.
pub fn city_code(code: &str) -> Option<String> {
    is_division_code(code).then(|| format!("{}00", &code[..4]))
}

/// Leading `width` characters of `s`, or `None` if `s` is shorter.
/// Works on chars so non-ASCII input never splits a code point.
pub fn prefix(s: &str, width: usize) -> Option<&str> {
    match s.char_indices().nth(width) {
        Some((idx, _)) => Some(&s[..idx]),
        None if s.chars().count() == width => Some(s),
        None => None,
    }
}
