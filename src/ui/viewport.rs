use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// md ブレークポイント（これ未満はモバイル扱い）
pub const MOBILE_BREAKPOINT: f32 = 900.0;

/// 描画対象のビューポート区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Desktop,
}

impl Viewport {
    pub const ALL: [Viewport; 2] = [Viewport::Mobile, Viewport::Desktop];

    pub fn from_width(width: f32) -> Self {
        if width < MOBILE_BREAKPOINT {
            Viewport::Mobile
        } else {
            Viewport::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Viewport::Mobile => "mobile",
            Viewport::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Viewport::Mobile),
            "desktop" => Ok(Viewport::Desktop),
            other => Err(format!("Unknown viewport '{}' (expected mobile/desktop)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_width() {
        assert_eq!(Viewport::from_width(320.0), Viewport::Mobile);
        assert_eq!(Viewport::from_width(899.9), Viewport::Mobile);
        assert_eq!(Viewport::from_width(900.0), Viewport::Desktop);
        assert_eq!(Viewport::from_width(1920.0), Viewport::Desktop);
    }

    #[test]
    fn test_parse() {
        assert_eq!("mobile".parse::<Viewport>(), Ok(Viewport::Mobile));
        assert!("tablet".parse::<Viewport>().is_err());
    }
}
