// ==========================================
// 订单工序排程系统 - 领域类型定义
// ==========================================
// 班次为小时的派生分类，不持久化、无身份
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 班次 (Shift)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与产能表 shift 列一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Day,   // 白班
    Night, // 夜班
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Day => "DAY",
            Shift::Night => "NIGHT",
        }
    }

    /// 国际化资源键（导出时使用）
    pub fn i18n_key(&self) -> &'static str {
        match self {
            Shift::Day => "shift.day",
            Shift::Night => "shift.night",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DAY" | "白班" => Ok(Shift::Day),
            "NIGHT" | "夜班" => Ok(Shift::Night),
            other => Err(format!("未知班次: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_round_trip_through_str() {
        assert_eq!("day".parse::<Shift>().unwrap(), Shift::Day);
        assert_eq!(" NIGHT ".parse::<Shift>().unwrap(), Shift::Night);
        assert_eq!("夜班".parse::<Shift>().unwrap(), Shift::Night);
        assert!("swing".parse::<Shift>().is_err());
        assert_eq!(Shift::Day.to_string(), "DAY");
    }

    #[test]
    fn test_shift_serde_uses_upper_case() {
        let json = serde_json::to_string(&Shift::Night).unwrap();
        assert_eq!(json, "\"NIGHT\"");
    }
}
