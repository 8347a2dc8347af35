// ========================================
// セクション型のメタデータと設定フォーム定義
// ========================================

use super::form_schema::{FieldKind, FieldSpec, FormSchema};
use super::BuilderKit;
use crate::model::section::SectionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionCategory {
    Content,
    Swap,
    Nft,
    Commerce,
    Community,
}

/// 型選択グリッドに並べる情報
#[derive(Debug, Clone, PartialEq)]
pub struct SectionTypeInfo {
    pub section_type: SectionType,
    pub title: &'static str,
    pub description: &'static str,
    pub category: SectionCategory,
    pub kits: &'static [BuilderKit],
}

const ALL_KITS: &[BuilderKit] = &[BuilderKit::General, BuilderKit::Nft, BuilderKit::Swap];
const GENERAL: &[BuilderKit] = &[BuilderKit::General];
const GENERAL_NFT: &[BuilderKit] = &[BuilderKit::General, BuilderKit::Nft];
const GENERAL_SWAP: &[BuilderKit] = &[BuilderKit::General, BuilderKit::Swap];

impl SectionType {
    pub fn info(&self) -> SectionTypeInfo {
        use SectionCategory::*;
        let (title, description, category, kits) = match self {
            SectionType::Swap => ("Swap", "Token swap widget", Swap, GENERAL_SWAP),
            SectionType::Exchange => ("Exchange", "Order book trading widget", Swap, GENERAL_SWAP),
            SectionType::Wallet => ("Wallet", "Balances and transfers for the connected wallet", Swap, GENERAL_SWAP),
            SectionType::Markdown => ("Markdown", "Free-form formatted text", Content, ALL_KITS),
            SectionType::Collection => ("Collection", "NFT collection gallery", Nft, GENERAL_NFT),
            SectionType::Showcase => ("Showcase", "Grid of highlighted links or assets", Nft, GENERAL_NFT),
            SectionType::Carousel => ("Carousel", "Rotating banner slides", Content, ALL_KITS),
            SectionType::Commerce => ("Commerce", "Store, checkout or product collection", Commerce, GENERAL),
            SectionType::Referral => ("Referral", "Referral link generator", Community, GENERAL_SWAP),
            SectionType::Ranking => ("Ranking", "Leaderboard of a ranking campaign", Community, GENERAL),
            SectionType::Video => ("Video", "Embedded YouTube or Vimeo video", Content, ALL_KITS),
            SectionType::CallToAction => ("Call to action", "Headline with a button and featured items", Content, ALL_KITS),
            SectionType::Featured => ("Featured", "Featured assets and collections", Nft, GENERAL_NFT),
            SectionType::CodePage => ("Code", "Custom HTML, CSS and JavaScript", Content, GENERAL),
        };
        SectionTypeInfo {
            section_type: *self,
            title,
            description,
            category,
            kits,
        }
    }

    /// 設定フォームのスキーマ。パスはセクションJSON内のドット区切り。
    pub fn form_schema(&self) -> FormSchema {
        use FieldKind::*;
        let fields = match self {
            SectionType::Swap => vec![
                FieldSpec::optional("config.defaultChainId", "Default network", Number),
                FieldSpec::optional("config.defaultSlippage", "Default slippage (%)", Number),
                FieldSpec::optional("config.enableUrlParams", "Read tokens from URL", Bool),
                FieldSpec::optional("variant", "Variant", Select(&["default", "uniswap"])),
            ],
            SectionType::Exchange => vec![
                FieldSpec::optional("settings.defaultNetwork", "Default network", Text),
                FieldSpec::optional("settings.defaultPair", "Default pair", Text),
            ],
            SectionType::Wallet => vec![FieldSpec::optional("config", "Wallet options", Json)],
            SectionType::Markdown => vec![FieldSpec::required("data", "Content", Markdown)],
            SectionType::Collection => vec![
                FieldSpec::required("config.network", "Network", Text),
                FieldSpec::required("config.address", "Contract address", Text),
                FieldSpec::optional("config.hideFilters", "Hide filters", Bool),
            ],
            SectionType::Showcase => vec![
                FieldSpec::optional("settings.title", "Title", Text),
                FieldSpec::optional("settings.subtitle", "Subtitle", Text),
                FieldSpec::optional("settings.alignment", "Alignment", Select(&["left", "center", "right"])),
                FieldSpec::optional("settings.items", "Items", List),
            ],
            SectionType::Carousel => vec![
                FieldSpec::optional("settings.interval", "Interval (ms)", Number),
                FieldSpec::optional("settings.height.mobile", "Mobile height", Number),
                FieldSpec::optional("settings.height.desktop", "Desktop height", Number),
                FieldSpec::required("settings.slides", "Slides", List),
            ],
            SectionType::Commerce => vec![
                FieldSpec::required(
                    "settings.contentType",
                    "Content",
                    Select(&["store", "checkout", "collection"]),
                ),
                FieldSpec::optional("settings.id", "Item id", Text),
            ],
            SectionType::Referral => vec![
                FieldSpec::optional("config.title", "Title", Text),
                FieldSpec::optional("config.subtitle", "Subtitle", Text),
            ],
            SectionType::Ranking => vec![FieldSpec::required("settings.rankingId", "Ranking", Number)],
            SectionType::Video => vec![
                FieldSpec::optional("embedType", "Provider", Select(&["youtube", "vimeo"])),
                FieldSpec::required("videoUrl", "Video URL", Url),
            ],
            SectionType::CallToAction => vec![
                FieldSpec::optional("variant", "Variant", Select(&["light", "dark"])),
                FieldSpec::optional("subtitle", "Subtitle", Text),
                FieldSpec::optional("button.title", "Button label", Text),
                FieldSpec::optional("button.url", "Button link", Url),
                FieldSpec::optional("button.openInNewPage", "Open in new tab", Bool),
                FieldSpec::optional("items", "Items", List),
            ],
            SectionType::Featured => vec![FieldSpec::required("items", "Items", List)],
            SectionType::CodePage => vec![
                FieldSpec::optional("config.html", "HTML", Text),
                FieldSpec::optional("config.css", "CSS", Text),
                FieldSpec::optional("config.js", "JavaScript", Text),
            ],
        };

        let mut all = vec![
            FieldSpec::optional("name", "Name", Text),
            FieldSpec::optional("title", "Title", Text),
            FieldSpec::optional("hideMobile", "Hide on mobile", Bool),
            FieldSpec::optional("hideDesktop", "Hide on desktop", Bool),
        ];
        all.extend(fields);
        FormSchema {
            section_type: *self,
            fields: all,
        }
    }
}

/// 型選択グリッドの項目（キットで絞り込み）
pub fn section_selector(kit: BuilderKit) -> Vec<SectionTypeInfo> {
    SectionType::ALL
        .iter()
        .map(SectionType::info)
        .filter(|info| info.kits.contains(&kit))
        .collect()
}
