// ========================================
// テーマトークン
// ========================================
//
// 名前付きプリセットに AppConfig のカスタムパレットを重ね、
// CSSカスタムプロパティとして出力する。

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use crate::model::app_config::{AppConfig, ThemeMode, ThemePalette};

lazy_static! {
    /// 16進表記・色名・rgb()/hsl() 関数のみ受け付ける
    static ref CSS_COLOR: Regex =
        Regex::new(r"^(?:#[0-9A-Fa-f]{3,8}|[A-Za-z]+|(?:rgb|rgba|hsl|hsla)\([0-9.,%\s/]+\))$").expect("valid color regex");
}

/// CSS の宣言に埋め込んでよい色の値か
pub fn is_css_color(value: &str) -> bool {
    CSS_COLOR.is_match(value.trim())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeTokens {
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub paper: String,
    pub text: String,
}

impl ThemeTokens {
    fn preset(name: &str, colors: [&str; 5]) -> Self {
        Self {
            name: name.to_string(),
            primary: colors[0].to_string(),
            secondary: colors[1].to_string(),
            background: colors[2].to_string(),
            paper: colors[3].to_string(),
            text: colors[4].to_string(),
        }
    }

    fn overlay(mut self, palette: &ThemePalette) -> Self {
        let apply = |slot: &mut String, value: &Option<String>| {
            match value.as_deref().filter(|v| !v.is_empty()) {
                Some(v) if is_css_color(v) => *slot = v.trim().to_string(),
                Some(v) => warn!("Ignoring theme color '{}': not a CSS color", v),
                None => {}
            }
        };
        apply(&mut self.primary, &palette.primary);
        apply(&mut self.secondary, &palette.secondary);
        apply(&mut self.background, &palette.background);
        apply(&mut self.paper, &palette.paper);
        apply(&mut self.text, &palette.text);
        self
    }

    pub fn to_css_variables(&self) -> String {
        format!(
            ":root {{ --pk-primary: {}; --pk-secondary: {}; --pk-background: {}; --pk-paper: {}; --pk-text: {}; }}",
            self.primary, self.secondary, self.background, self.paper, self.text
        )
    }
}

/// プリセット名からトークンを取得（未知の名前は default-theme）
pub fn preset(name: &str, mode: ThemeMode) -> ThemeTokens {
    match (name, mode) {
        ("cyberpunk", _) => ThemeTokens::preset(name, ["#ff00a0", "#00e5ff", "#0d0221", "#1b0f3a", "#f5f5f5"]),
        ("dark", _) | (_, ThemeMode::Dark) if name != "mint" => {
            ThemeTokens::preset("dark", ["#90caf9", "#f48fb1", "#121212", "#1e1e1e", "#ffffff"])
        }
        ("mint", ThemeMode::Dark) => ThemeTokens::preset(name, ["#3ddc97", "#6c63ff", "#0f1f1a", "#16302a", "#e8fff6"]),
        ("mint", ThemeMode::Light) => ThemeTokens::preset(name, ["#11a36b", "#6c63ff", "#f3fffa", "#ffffff", "#10241d"]),
        _ => ThemeTokens::preset("default-theme", ["#3f51b5", "#f50057", "#fafafa", "#ffffff", "#111111"]),
    }
}

/// AppConfig から現在のモードのテーマを解決する
pub fn resolve_theme(config: &AppConfig) -> ThemeTokens {
    let mode = config.default_theme_mode.unwrap_or(ThemeMode::Light);
    let base = preset(&config.theme, mode);
    let custom = match mode {
        ThemeMode::Light => config.custom_theme_light.as_ref(),
        ThemeMode::Dark => config.custom_theme_dark.as_ref(),
    };
    match custom {
        Some(palette) => base.overlay(palette),
        None => base,
    }
}
