// ========================================
// ページセクション定義
// ========================================
//
// `type` をタグとするタグ付きユニオン。登録済みの型はそれぞれ型付きの
// 設定構造体を持ち、未登録の型は Unknown として生のJSONを保持する
// （描画はされないが、保存時に失われない）。

use log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::ui::viewport::Viewport;

// ========================================
// セクション型の一覧（列挙型とタグ文字列の対応）
// ========================================

macro_rules! section_kinds {
    ($($variant:ident($payload:ty) => $tag:literal),+ $(,)?) => {
        /// 登録済みのセクション型
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SectionType {
            $($variant,)+
        }

        impl SectionType {
            pub const ALL: &'static [SectionType] = &[$(SectionType::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(SectionType::$variant => $tag,)+
                }
            }

            /// 型選択直後の空の設定
            pub fn default_kind(&self) -> SectionKind {
                match self {
                    $(SectionType::$variant => SectionKind::$variant(<$payload>::default()),)+
                }
            }
        }

        impl FromStr for SectionType {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(SectionType::$variant),)+
                    other => Err(format!("Unknown section type '{}'", other)),
                }
            }
        }

        /// セクション本体（型ごとの設定）
        #[derive(Debug, Clone, PartialEq)]
        pub enum SectionKind {
            $($variant($payload),)+
            Unknown { type_name: String, raw: Map<String, Value> },
        }

        impl SectionKind {
            pub fn type_name(&self) -> &str {
                match self {
                    $(SectionKind::$variant(_) => $tag,)+
                    SectionKind::Unknown { type_name, .. } => type_name,
                }
            }

            pub fn section_type(&self) -> Option<SectionType> {
                match self {
                    $(SectionKind::$variant(_) => Some(SectionType::$variant),)+
                    SectionKind::Unknown { .. } => None,
                }
            }

            fn payload_to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
                let value = match self {
                    $(SectionKind::$variant(p) => serde_json::to_value(p)?,)+
                    SectionKind::Unknown { raw, .. } => return Ok(raw.clone()),
                };
                match value {
                    Value::Object(map) => Ok(map),
                    _ => Ok(Map::new()),
                }
            }

            /// 設定が壊れている登録済みの型も Unknown として生のまま保持する
            fn from_parts(type_name: &str, rest: Map<String, Value>) -> Self {
                match type_name {
                    $($tag => match serde_json::from_value(Value::Object(rest.clone())) {
                        Ok(payload) => SectionKind::$variant(payload),
                        Err(e) => {
                            warn!("Invalid '{}' section kept as raw JSON: {}", type_name, e);
                            SectionKind::Unknown { type_name: type_name.to_string(), raw: rest }
                        }
                    },)+
                    other => SectionKind::Unknown { type_name: other.to_string(), raw: rest },
                }
            }
        }
    };
}

section_kinds! {
    Swap(SwapSection) => "swap",
    Exchange(ExchangeSection) => "exchange",
    Wallet(WalletSection) => "wallet",
    Markdown(MarkdownSection) => "markdown",
    Collection(CollectionSection) => "collection",
    Showcase(ShowcaseSection) => "showcase",
    Carousel(CarouselSection) => "carousel",
    Commerce(CommerceSection) => "commerce",
    Referral(ReferralSection) => "referral",
    Ranking(RankingSection) => "ranking",
    Video(VideoSection) => "video",
    CallToAction(CallToActionSection) => "call-to-action",
    Featured(FeaturedSection) => "featured",
    CodePage(CodePageSection) => "code-page-section",
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// ページセクション
// ========================================

/// ページに配置される1つのセクション
#[derive(Debug, Clone, PartialEq)]
pub struct AppPageSection {
    pub name: Option<String>,
    pub title: Option<String>,
    pub hide_mobile: Option<bool>,
    pub hide_desktop: Option<bool>,
    pub kind: SectionKind,
}

const COMMON_FIELDS: [&str; 4] = ["name", "title", "hideMobile", "hideDesktop"];

impl AppPageSection {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            name: None,
            title: None,
            hide_mobile: None,
            hide_desktop: None,
            kind,
        }
    }

    /// 指定した型の空セクション
    pub fn blank(section_type: SectionType) -> Self {
        Self::new(section_type.default_kind())
    }

    pub fn section_type(&self) -> Option<SectionType> {
        self.kind.section_type()
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// 現在のビューポートで非表示かどうか
    pub fn is_hidden_on(&self, viewport: Viewport) -> bool {
        match viewport {
            Viewport::Mobile => self.hide_mobile.unwrap_or(false),
            Viewport::Desktop => self.hide_desktop.unwrap_or(false),
        }
    }

    /// タブなどに使う表示名（name → title の順）
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.title.as_deref().filter(|t| !t.is_empty()))
    }

    pub fn to_value(&self) -> Result<Value, String> {
        serde_json::to_value(self).map_err(|e| format!("Failed to serialize section: {}", e))
    }
}

impl Serialize for AppPageSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;

        let mut map = self.kind.payload_to_map().map_err(S::Error::custom)?;
        map.insert("type".to_string(), Value::String(self.kind.type_name().to_string()));
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(title) = &self.title {
            map.insert("title".to_string(), Value::String(title.clone()));
        }
        if let Some(hide) = self.hide_mobile {
            map.insert("hideMobile".to_string(), Value::Bool(hide));
        }
        if let Some(hide) = self.hide_desktop {
            map.insert("hideDesktop".to_string(), Value::Bool(hide));
        }
        Value::Object(map).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppPageSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            other => {
                return Err(D::Error::custom(format!(
                    "section must be an object, got {}",
                    other
                )));
            }
        };

        let type_name = match map.remove("type") {
            Some(Value::String(s)) => s,
            Some(other) => return Err(D::Error::custom(format!("section type must be a string, got {}", other))),
            None => return Err(D::Error::missing_field("type")),
        };

        // 型が合わない共通フィールドは設定側に残し、保存時にそのまま書き戻す
        let name = take_common(&mut map, COMMON_FIELDS[0], |v| v.as_str().map(str::to_string));
        let title = take_common(&mut map, COMMON_FIELDS[1], |v| v.as_str().map(str::to_string));
        let hide_mobile = take_common(&mut map, COMMON_FIELDS[2], Value::as_bool);
        let hide_desktop = take_common(&mut map, COMMON_FIELDS[3], Value::as_bool);

        let kind = SectionKind::from_parts(&type_name, map);

        Ok(Self {
            name,
            title,
            hide_mobile,
            hide_desktop,
            kind,
        })
    }
}

fn take_common<T>(map: &mut Map<String, Value>, key: &str, pick: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = map.get(key).and_then(pick)?;
    map.remove(key);
    Some(value)
}

// ========================================
// 型ごとの設定構造体
// ========================================
// 未知のフィールドは extra に保持して往復で失われないようにする

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub config: SwapConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_slippage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_url_params: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeSection {
    #[serde(default)]
    pub settings: ExchangeSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pair: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSection {
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownSection {
    #[serde(default)]
    pub data: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSection {
    #[serde(default)]
    pub config: CollectionConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_filters: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseSection {
    #[serde(default)]
    pub settings: ShowcaseSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(default)]
    pub items: Vec<LinkItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ショーケースや注目アイテムで共有するリンク付きカード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSection {
    #[serde(default)]
    pub settings: CarouselSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSettings {
    /// 自動送り間隔（ミリ秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<ResponsiveHeight>,
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveHeight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionButton>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionButton {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_in_new_page: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceSection {
    #[serde(default)]
    pub settings: CommerceSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceSettings {
    /// "store" / "checkout" / "collection"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSection {
    #[serde(default)]
    pub config: ReferralConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSection {
    #[serde(default)]
    pub settings: RankingSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSection {
    /// "youtube" / "vimeo"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_type: Option<String>,
    #[serde(default)]
    pub video_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToActionSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<ActionButton>,
    #[serde(default)]
    pub items: Vec<LinkItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedSection {
    #[serde(default)]
    pub items: Vec<LinkItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePageSection {
    #[serde(default)]
    pub config: CodeConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
