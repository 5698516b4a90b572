//! カテゴリ判定ルールとインフォグラフィック様式の表
//!
//! どちらも起動時に1度だけ組み立てる不変データ。
//! `Classifier` / `DecisionEngine` に明示的に渡して使う。

use crate::error::Result;
use crate::types::{Category, InfographicKind, VisualNeed};
use regex::Regex;

/// 名前付きシグナル（1つの語彙・構造パターン）
#[derive(Debug, Clone)]
pub struct Signal {
    name: String,
    pattern: Regex,
}

impl Signal {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// 組み込みパターン用。リテラルなので失敗しない
    fn fixed(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// テキストに対するこのシグナルの得点
    ///
    /// 一致で 1 点。一致結果が複数要素（全体 + キャプチャグループ）なら +0.5。
    /// 出現回数ではなくパターンのグループ有無で決まる点に注意。
    pub fn evaluate(&self, text: &str) -> f64 {
        match self.pattern.captures(text) {
            Some(caps) if caps.len() > 1 => 1.5,
            Some(_) => 1.0,
            None => 0.0,
        }
    }
}

/// カテゴリの静的メタデータ
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInfo {
    pub category: Category,
    /// 表示名
    pub name: &'static str,
    pub description: &'static str,
    pub visual: VisualNeed,
    pub infographic: Option<InfographicKind>,
}

/// カテゴリ1つ分のルール
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub info: CategoryInfo,
    pub signals: Vec<Signal>,
}

/// カテゴリ判定ルール表（`Category::ALL` の順で全カテゴリを持つ）
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl RuleTable {
    /// 標準のルール表
    pub fn standard() -> Self {
        let rules = Category::ALL
            .iter()
            .map(|&category| CategoryRule {
                info: standard_info(category),
                signals: standard_signals(category),
            })
            .collect();

        Self { rules }
    }

    /// シグナルを1つ追加した表を返す
    pub fn with_signal(mut self, category: Category, signal: Signal) -> Self {
        self.rules[category.index()].signals.push(signal);
        self
    }

    pub fn rule(&self, category: Category) -> &CategoryRule {
        &self.rules[category.index()]
    }

    pub fn info(&self, category: Category) -> &CategoryInfo {
        &self.rule(category).info
    }

    pub fn signals(&self, category: Category) -> &[Signal] {
        &self.rule(category).signals
    }

    pub fn rules(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_info(category: Category) -> CategoryInfo {
    let (name, description, infographic) = match category {
        Category::Statistics => (
            "統計數據",
            "包含百分比、數字、比較數據",
            Some(InfographicKind::Statistics),
        ),
        Category::Process => (
            "流程說明",
            "步驟、流程、順序、方法",
            Some(InfographicKind::Process),
        ),
        Category::Comparison => (
            "比較對照",
            "A vs B、優缺點、差異比較",
            Some(InfographicKind::Comparison),
        ),
        Category::Timeline => (
            "時間軸",
            "年份、歷史、發展歷程",
            Some(InfographicKind::Timeline),
        ),
        Category::CompanyIntro => (
            "公司介紹",
            "公司、品牌、產品介紹",
            Some(InfographicKind::Company),
        ),
        Category::Concept => (
            "概念說明",
            "抽象概念、策略、理念",
            Some(InfographicKind::Concept),
        ),
        Category::TextOnly => ("純文字", "不需要視覺輔助的內容", None),
    };

    CategoryInfo {
        category,
        name,
        description,
        visual: if infographic.is_some() {
            VisualNeed::Infographic
        } else {
            VisualNeed::NoVisual
        },
        infographic,
    }
}

fn standard_signals(category: Category) -> Vec<Signal> {
    let specs: &[(&str, &str)] = match category {
        Category::Statistics => &[
            ("percentage", r"([0-9]+(\.[0-9]+)?)\s*%"),
            ("trend_word", r"減少|降低|增加|成長|提升"),
            ("large_number", r"[0-9]+\s*(萬|億|千|百)"),
            ("ranking", r"第\s*[0-9]+\s*(大|名|位)"),
            ("multiple", r"倍|翻倍"),
            ("data_comparison", r"比較|對比.*數據"),
        ],
        Category::Process => &[
            ("step_word", r"(?i)步驟|流程|階段|phase"),
            ("numbered_step", r"第\s*[0-9]+\s*(步|階段)"),
            ("connector", r"→|->|⟶|然後|接著|最後"),
            ("end_to_end", r"(?i)一條龍|端到端|end.to.end"),
            ("from_to", r"從.*到.*的"),
        ],
        Category::Comparison => &[
            ("versus", r"(?i)vs\.?|versus|對比|比較"),
            ("pros_cons", r"優點|缺點|優勢|劣勢"),
            ("contrast", r"傳統.*vs|.*與.*的差異"),
            ("check_mark", r"✓|✗|√|×"),
            ("outcome", r"勝出|落後|領先"),
        ],
        Category::Timeline => &[
            ("year", r"[0-9]{4}\s*年"),
            ("history", r"歷史|發展|沿革|里程碑"),
            ("origin", r"創立|成立|創辦|起源"),
            ("present", r"至今|迄今|目前|現在"),
            ("span", r"從.*年.*到"),
        ],
        Category::CompanyIntro => &[
            ("company_word", r"公司|企業|集團|品牌"),
            ("headquarters", r"(?i)總部|headquarters"),
            ("leader", r"創辦人|CEO|執行長"),
            ("founded", r"成立於|創立於"),
            ("customers", r"服務.*客戶|客戶.*家"),
        ],
        Category::Concept => &[
            ("concept_word", r"策略|戰略|模式|理念"),
            ("core_word", r"核心|價值|願景|使命"),
            ("business_model", r"(?i)商業模式|business model"),
            ("advantage", r"競爭優勢|差異化"),
            ("modern_concept", r"永續|ESG|創新"),
        ],
        Category::TextOnly => &[],
    };

    specs
        .iter()
        .map(|(name, pattern)| Signal::fixed(name, pattern))
        .collect()
}

/// インフォグラフィック1種類分の様式
#[derive(Debug, Clone, PartialEq)]
pub struct InfographicStyle {
    pub style: &'static str,
    pub elements: &'static [&'static str],
    pub layout: &'static str,
}

/// 種類 → 様式の表
#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: Vec<InfographicStyle>,
}

impl StyleTable {
    pub fn standard() -> Self {
        let styles = InfographicKind::ALL
            .iter()
            .map(|&kind| standard_style(kind))
            .collect();

        Self { styles }
    }

    pub fn style(&self, kind: InfographicKind) -> &InfographicStyle {
        &self.styles[kind.index()]
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_style(kind: InfographicKind) -> InfographicStyle {
    match kind {
        InfographicKind::Statistics => InfographicStyle {
            style: "modern infographic",
            elements: &["large numbers", "trend arrows", "progress bars"],
            layout: "centered focal point",
        },
        InfographicKind::Process => InfographicStyle {
            style: "flow diagram",
            elements: &["numbered steps", "connecting arrows", "icons"],
            layout: "horizontal or vertical flow",
        },
        InfographicKind::Comparison => InfographicStyle {
            style: "comparison chart",
            elements: &["two columns", "check marks", "icons"],
            layout: "side by side",
        },
        InfographicKind::Timeline => InfographicStyle {
            style: "timeline graphic",
            elements: &["year markers", "milestone dots", "connecting line"],
            layout: "horizontal timeline",
        },
        InfographicKind::Concept => InfographicStyle {
            style: "concept diagram",
            elements: &["central idea", "radiating elements", "icons"],
            layout: "hub and spoke",
        },
        InfographicKind::Hierarchy => InfographicStyle {
            style: "pyramid diagram",
            elements: &["stacked levels", "level icons", "upward progression"],
            layout: "vertical pyramid",
        },
        InfographicKind::Company => InfographicStyle {
            style: "corporate illustration",
            elements: &["building silhouette", "globe", "team icons", "growth chart"],
            layout: "centered composition",
        },
    }
}
