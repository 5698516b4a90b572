//! 投影片解析の型定義
//!
//! CLIと生成クライアントで共有される型:
//! - Slide: 入力（タイトル + 本文）
//! - Category / InfographicKind: 分類ラベルとインフォグラフィックの種類
//! - KeyElements: カテゴリ別の抽出結果
//! - Analysis: 1枚分の解析結果
//! - ColorPalette: 配色

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 投影片の本文（文字列 or 行の配列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideContent {
    Text(String),
    Lines(Vec<String>),
}

impl SlideContent {
    /// 解析用の1本の文字列にする（配列はカンマ区切り）
    pub fn joined(&self) -> String {
        match self {
            SlideContent::Text(text) => text.clone(),
            SlideContent::Lines(lines) => lines.join(","),
        }
    }
}

impl Default for SlideContent {
    fn default() -> Self {
        SlideContent::Text(String::new())
    }
}

impl From<&str> for SlideContent {
    fn from(text: &str) -> Self {
        SlideContent::Text(text.to_string())
    }
}

impl From<String> for SlideContent {
    fn from(text: String) -> Self {
        SlideContent::Text(text)
    }
}

impl From<Vec<String>> for SlideContent {
    fn from(lines: Vec<String>) -> Self {
        SlideContent::Lines(lines)
    }
}

/// 投影片1枚分の入力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(default)]
    pub index: usize,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: SlideContent,
}

impl Slide {
    pub fn new(index: usize, title: impl Into<String>, content: impl Into<SlideContent>) -> Self {
        Self {
            index,
            title: title.into(),
            content: content.into(),
        }
    }

    /// 分類・抽出の対象テキスト（タイトル + 空白 + 本文）
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.content.joined())
    }
}

/// JSON配列から投影片を読み込む（indexは配列上の位置で振り直す）
pub fn parse_slides(json: &str) -> Result<Vec<Slide>> {
    let mut slides: Vec<Slide> = serde_json::from_str(json)?;
    for (index, slide) in slides.iter_mut().enumerate() {
        slide.index = index;
    }
    Ok(slides)
}

/// 内容カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Statistics,
    Process,
    Comparison,
    Timeline,
    CompanyIntro,
    Concept,
    TextOnly,
}

impl Category {
    /// 全カテゴリ（RuleTable の並び順）
    pub const ALL: [Category; 7] = [
        Category::Statistics,
        Category::Process,
        Category::Comparison,
        Category::Timeline,
        Category::CompanyIntro,
        Category::Concept,
        Category::TextOnly,
    ];

    /// スコア計算の対象になるカテゴリ（評価順）
    pub const SCORED: [Category; 6] = [
        Category::Statistics,
        Category::Process,
        Category::Comparison,
        Category::Timeline,
        Category::CompanyIntro,
        Category::Concept,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Statistics => "statistics",
            Category::Process => "process",
            Category::Comparison => "comparison",
            Category::Timeline => "timeline",
            Category::CompanyIntro => "company_intro",
            Category::Concept => "concept",
            Category::TextOnly => "text_only",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// 視覚要素の要否
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualNeed {
    #[serde(rename = "infographic")]
    Infographic,
    #[serde(rename = "none")]
    NoVisual,
}

/// インフォグラフィックの種類（プロンプトテンプレート単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfographicKind {
    Statistics,
    Process,
    Comparison,
    Timeline,
    Concept,
    Hierarchy,
    Company,
}

impl InfographicKind {
    pub const ALL: [InfographicKind; 7] = [
        InfographicKind::Statistics,
        InfographicKind::Process,
        InfographicKind::Comparison,
        InfographicKind::Timeline,
        InfographicKind::Concept,
        InfographicKind::Hierarchy,
        InfographicKind::Company,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfographicKind::Statistics => "statistics",
            InfographicKind::Process => "process",
            InfographicKind::Comparison => "comparison",
            InfographicKind::Timeline => "timeline",
            InfographicKind::Concept => "concept",
            InfographicKind::Hierarchy => "hierarchy",
            InfographicKind::Company => "company",
        }
    }

    /// 名前から種類を得る。未知の名前は concept 扱い
    pub fn parse_lossy(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        InfographicKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .unwrap_or(InfographicKind::Concept)
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for InfographicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 数値の増減
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
}

impl Trend {
    /// context文字列用の表示名
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Increase => "上升",
            Trend::Decrease => "下降",
        }
    }
}

/// 統計カテゴリの抽出結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsElements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// 比較の片側
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSide {
    pub title: String,
}

/// 時間軸の1イベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub year: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// カテゴリ別の抽出結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyElements {
    Statistics(StatisticsElements),
    Process {
        steps: Vec<String>,
    },
    Comparison {
        left: ComparisonSide,
        right: ComparisonSide,
        items: usize,
    },
    Timeline {
        events: Vec<TimelineEvent>,
    },
    CompanyIntro {
        keywords: Vec<String>,
    },
    Concept {
        concept: String,
        elements: Vec<String>,
    },
    /// 階層図。分類からは生成されず、プロンプトを直接組み立てる場合に使う
    Hierarchy {
        levels: usize,
    },
    #[default]
    Empty,
}

/// `KeyElements` を出力用のレコードとして読み書きする
///
/// `Empty` は空オブジェクト `{}` になり、`{}` は `Empty` として読む。
pub mod key_elements_record {
    use super::KeyElements;
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(elements: &KeyElements, serializer: S) -> Result<S::Ok, S::Error> {
        match elements {
            KeyElements::Empty => serializer.serialize_map(Some(0))?.end(),
            other => other.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<KeyElements, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match &value {
            serde_json::Value::Object(map) if map.is_empty() => Ok(KeyElements::Empty),
            _ => KeyElements::deserialize(value).map_err(D::Error::custom),
        }
    }
}

impl KeyElements {
    pub fn number(&self) -> Option<&str> {
        match self {
            KeyElements::Statistics(stats) => stats.number.as_deref(),
            _ => None,
        }
    }

    pub fn trend(&self) -> Option<Trend> {
        match self {
            KeyElements::Statistics(stats) => stats.trend,
            _ => None,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            KeyElements::Statistics(stats) => stats.subject.as_deref(),
            _ => None,
        }
    }

    pub fn steps(&self) -> &[String] {
        match self {
            KeyElements::Process { steps } => steps,
            _ => &[],
        }
    }

    pub fn events(&self) -> &[TimelineEvent] {
        match self {
            KeyElements::Timeline { events } => events,
            _ => &[],
        }
    }

    pub fn item_count(&self) -> Option<usize> {
        match self {
            KeyElements::Comparison { items, .. } => Some(*items),
            _ => None,
        }
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            KeyElements::CompanyIntro { keywords } => keywords,
            _ => &[],
        }
    }

    pub fn concept(&self) -> Option<&str> {
        match self {
            KeyElements::Concept { concept, .. } => Some(concept),
            _ => None,
        }
    }

    pub fn levels(&self) -> Option<usize> {
        match self {
            KeyElements::Hierarchy { levels } => Some(*levels),
            _ => None,
        }
    }
}

/// 1枚分の解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub slide_index: usize,
    pub title: String,
    pub content_type: Category,
    pub content_type_name: String,
    pub visual_need: VisualNeed,
    pub infographic_type: Option<InfographicKind>,
    pub match_score: f64,
    #[serde(with = "key_elements_record")]
    pub key_elements: KeyElements,
}

/// 既定の配色
pub const DEFAULT_PRIMARY: &str = "#1E5128";
pub const DEFAULT_SECONDARY: &str = "#4E9F3D";
pub const DEFAULT_ACCENT: &str = "#FFFFFF";
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// 全フィールドが埋まった配色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.into(),
            secondary: DEFAULT_SECONDARY.into(),
            accent: DEFAULT_ACCENT.into(),
            background: DEFAULT_BACKGROUND.into(),
        }
    }
}

/// 呼び出し側が指定する配色（未指定は既定値で補完）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialColorPalette {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl PartialColorPalette {
    /// 既定値とマージする。空文字は未指定扱い
    pub fn resolve(&self) -> ColorPalette {
        fn pick(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }

        ColorPalette {
            primary: pick(&self.primary, DEFAULT_PRIMARY),
            secondary: pick(&self.secondary, DEFAULT_SECONDARY),
            accent: pick(&self.accent, DEFAULT_ACCENT),
            background: pick(&self.background, DEFAULT_BACKGROUND),
        }
    }

    /// `other` の指定値で上書きした配色を返す
    pub fn overlay(&self, other: &PartialColorPalette) -> PartialColorPalette {
        PartialColorPalette {
            primary: other.primary.clone().or_else(|| self.primary.clone()),
            secondary: other.secondary.clone().or_else(|| self.secondary.clone()),
            accent: other.accent.clone().or_else(|| self.accent.clone()),
            background: other.background.clone().or_else(|| self.background.clone()),
        }
    }
}

impl From<&ColorPalette> for PartialColorPalette {
    fn from(colors: &ColorPalette) -> Self {
        Self {
            primary: Some(colors.primary.clone()),
            secondary: Some(colors.secondary.clone()),
            accent: Some(colors.accent.clone()),
            background: Some(colors.background.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_string_content() {
        let slide = Slide::new(0, "服務流程", "安裝容器");
        assert_eq!(slide.full_text(), "服務流程 安裝容器");
    }

    #[test]
    fn test_full_text_lines_joined_with_comma() {
        let slide = Slide::new(0, "重點", vec!["第一點".to_string(), "第二點".to_string()]);
        assert_eq!(slide.full_text(), "重點 第一點,第二點");
    }

    #[test]
    fn test_parse_slides_assigns_index_by_position() {
        let json = r#"[
            {"title": "A", "content": "a"},
            {"title": "B", "content": ["b1", "b2"], "index": 9},
            {"title": "C"}
        ]"#;

        let slides = parse_slides(json).expect("パース失敗");
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[1].index, 1);
        assert_eq!(slides[1].content, SlideContent::Lines(vec!["b1".into(), "b2".into()]));
        assert_eq!(slides[2].content, SlideContent::default());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("company_intro".parse::<Category>().unwrap(), Category::CompanyIntro);
        assert_eq!("Company-Intro".parse::<Category>().unwrap(), Category::CompanyIntro);
        assert!(matches!("photo".parse::<Category>(), Err(Error::UnknownCategory(_))));
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::TextOnly).unwrap();
        assert_eq!(json, "\"text_only\"");
    }

    #[test]
    fn test_infographic_kind_parse_lossy() {
        assert_eq!(InfographicKind::parse_lossy("timeline"), InfographicKind::Timeline);
        assert_eq!(InfographicKind::parse_lossy("HIERARCHY"), InfographicKind::Hierarchy);
        assert_eq!(InfographicKind::parse_lossy("venn"), InfographicKind::Concept);
    }

    #[test]
    fn test_resolve_fills_missing_colors() {
        let partial = PartialColorPalette {
            primary: Some("#000000".into()),
            accent: Some("".into()),
            ..Default::default()
        };

        let colors = partial.resolve();
        assert_eq!(colors.primary, "#000000");
        assert_eq!(colors.secondary, DEFAULT_SECONDARY);
        assert_eq!(colors.accent, DEFAULT_ACCENT);
        assert_eq!(colors.background, DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_overlay_prefers_other() {
        let base = PartialColorPalette {
            primary: Some("#111111".into()),
            secondary: Some("#222222".into()),
            ..Default::default()
        };
        let other = PartialColorPalette {
            secondary: Some("#333333".into()),
            ..Default::default()
        };

        let merged = base.overlay(&other);
        assert_eq!(merged.primary.as_deref(), Some("#111111"));
        assert_eq!(merged.secondary.as_deref(), Some("#333333"));
        assert_eq!(merged.accent, None);
    }

    #[test]
    fn test_key_elements_serialize_tagged() {
        let elements = KeyElements::Process {
            steps: vec!["安裝容器".into()],
        };
        let json = serde_json::to_string(&elements).unwrap();
        assert!(json.contains("\"kind\":\"process\""));
        assert!(json.contains("\"steps\":[\"安裝容器\"]"));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        #[serde(with = "key_elements_record")]
        elements: KeyElements,
    }

    #[test]
    fn test_empty_key_elements_is_empty_record() {
        let json = serde_json::to_string(&Record { elements: KeyElements::Empty }).unwrap();
        assert_eq!(json, r#"{"elements":{}}"#);

        let parsed: Record = serde_json::from_str(r#"{"elements":{}}"#).unwrap();
        assert_eq!(parsed.elements, KeyElements::Empty);

        let parsed: Record =
            serde_json::from_str(r#"{"elements":{"kind":"process","steps":["a"]}}"#).unwrap();
        assert_eq!(parsed.elements.steps(), &["a".to_string()]);
    }

    #[test]
    fn test_key_elements_accessors_default_for_other_variants() {
        let elements = KeyElements::Empty;
        assert!(elements.steps().is_empty());
        assert!(elements.events().is_empty());
        assert_eq!(elements.number(), None);
        assert_eq!(elements.item_count(), None);
    }
}
