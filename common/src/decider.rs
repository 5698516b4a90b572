//! 視覚決策エンジン
//!
//! 解析結果から「生成するか / しないか」を決め、生成パラメータを組み立てる。
//! バッチ処理では全投影片の決策が揃ってから予算上限を適用する。
//!
//! ## 処理フロー
//! 1. 投影片ごとに解析 → 決策（互いに独立）
//! 2. 予算上限があれば matchScore の高い順に残し、残りを降格
//! 3. サマリー（枚数・概算コスト）を計算

use crate::analyzer::{estimate_cost, map_slides, SlideAnalyzer};
use crate::prompts;
use crate::rules::{RuleTable, StyleTable};
use crate::types::{
    Analysis, Category, ColorPalette, InfographicKind, KeyElements, PartialColorPalette, Slide,
    VisualNeed,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// これ未満の matchScore で生成を要求すると警告する
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 1.5;

/// 生成元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategySource {
    Generator,
}

/// 画像生成の設定値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub model: String,
    /// "WxH"
    pub size: String,
    pub quality: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "4o-image".into(),
            size: "1024x576".into(),
            quality: "high".into(),
        }
    }
}

/// 視覚戦略。source が None なら視覚要素なし
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub source: Option<StrategySource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

impl Strategy {
    pub fn generation(settings: &GenerationSettings) -> Self {
        Self {
            source: Some(StrategySource::Generator),
            model: Some(settings.model.clone()),
            size: Some(settings.size.clone()),
            quality: Some(settings.quality.clone()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_generation(&self) -> bool {
        self.source == Some(StrategySource::Generator)
    }
}

/// プロンプト生成に渡す完全なパラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(rename = "type")]
    pub kind: InfographicKind,
    pub style: String,
    pub elements: Vec<String>,
    pub layout: String,
    #[serde(with = "crate::types::key_elements_record")]
    pub data: KeyElements,
    pub colors: ColorPalette,
    pub title: String,
    pub context: String,
}

impl GenerationParams {
    /// このパラメータから画像生成プロンプトを作る
    pub fn prompt(&self) -> String {
        prompts::build_prompt(self.kind, &self.data, &PartialColorPalette::from(&self.colors))
    }
}

/// 1枚分の決策
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub slide_index: usize,
    pub title: String,
    pub analysis: Analysis,
    pub strategy: Strategy,
    pub params: Option<GenerationParams>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub budget_limited: bool,
}

impl Decision {
    pub fn needs_generation(&self) -> bool {
        self.strategy.is_generation()
    }

    /// 予算超過で「視覚なし」に降格する
    pub fn downgrade_for_budget(&mut self) {
        self.strategy = Strategy::none();
        self.params = None;
        self.budget_limited = true;
    }
}

/// 1枚分の決策オプション
#[derive(Debug, Clone, Default)]
pub struct DecideOptions {
    pub colors: PartialColorPalette,
    pub force_type: Option<Category>,
}

/// 予算設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfig {
    pub max_infographics: usize,
}

/// バッチ決策オプション
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub colors: PartialColorPalette,
    pub budget: Option<BudgetConfig>,
    pub force_type: Option<Category>,
}

/// バッチのサマリー
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSummary {
    pub total_slides: usize,
    pub infographic_count: usize,
    pub no_visual_count: usize,
    pub estimated_cost: f64,
}

impl DecisionSummary {
    pub fn from_decisions(decisions: &[Decision]) -> Self {
        let infographic_count = decisions.iter().filter(|d| d.needs_generation()).count();

        Self {
            total_slides: decisions.len(),
            infographic_count,
            no_visual_count: decisions.len() - infographic_count,
            estimated_cost: estimate_cost(infographic_count),
        }
    }

    /// 表示用のコスト文字列（小数2桁）
    pub fn cost_display(&self) -> String {
        format!("{:.2}", self.estimated_cost)
    }
}

/// バッチ決策の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDecision {
    pub decisions: Vec<Decision>,
    pub summary: DecisionSummary,
}

/// 決策エンジン
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    analyzer: SlideAnalyzer,
    styles: Arc<StyleTable>,
    settings: GenerationSettings,
}

impl DecisionEngine {
    pub fn new(rules: Arc<RuleTable>, styles: Arc<StyleTable>, settings: GenerationSettings) -> Self {
        Self {
            analyzer: SlideAnalyzer::new(rules),
            styles,
            settings,
        }
    }

    pub fn analyzer(&self) -> &SlideAnalyzer {
        &self.analyzer
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// 1枚分の決策
    pub fn decide(&self, slide: &Slide, options: &DecideOptions) -> Decision {
        let analysis = match options.force_type {
            Some(category) => self.analyzer.analyze_as(slide, category),
            None => self.analyzer.analyze(slide),
        };

        let (strategy, params) = match (analysis.visual_need, analysis.infographic_type) {
            (VisualNeed::Infographic, Some(kind)) => (
                Strategy::generation(&self.settings),
                Some(self.build_params(&analysis, kind, &options.colors)),
            ),
            _ => (Strategy::none(), None),
        };

        Decision {
            slide_index: slide.index,
            title: slide.title.clone(),
            analysis,
            strategy,
            params,
            budget_limited: false,
        }
    }

    /// プレゼン全体の決策（予算上限つき）
    pub fn decide_batch(&self, slides: &[Slide], options: &BatchOptions) -> BatchDecision {
        let per_slide = DecideOptions {
            colors: options.colors.clone(),
            force_type: options.force_type,
        };

        let mut decisions = map_slides(slides, |slide| self.decide(slide, &per_slide));

        if let Some(budget) = &options.budget {
            let downgraded = optimize_for_budget(&mut decisions, budget);
            if downgraded > 0 {
                log::debug!(
                    "予算上限 {} 枚: {} 枚を降格",
                    budget.max_infographics,
                    downgraded
                );
            }
        }

        let summary = DecisionSummary::from_decisions(&decisions);
        BatchDecision { decisions, summary }
    }

    fn build_params(
        &self,
        analysis: &Analysis,
        kind: InfographicKind,
        colors: &PartialColorPalette,
    ) -> GenerationParams {
        let style = self.styles.style(kind);

        GenerationParams {
            kind,
            style: style.style.to_string(),
            elements: style.elements.iter().map(|e| e.to_string()).collect(),
            layout: style.layout.to_string(),
            data: analysis.key_elements.clone(),
            colors: colors.resolve(),
            title: analysis.title.clone(),
            context: build_context(analysis),
        }
    }
}

/// プロンプト用の文脈文字列（存在するフィールドのみ、固定順）
pub fn build_context(analysis: &Analysis) -> String {
    let elements = &analysis.key_elements;
    let mut parts = Vec::new();

    if !analysis.title.is_empty() {
        parts.push(format!("標題: {}", analysis.title));
    }
    if !analysis.content_type_name.is_empty() {
        parts.push(format!("類型: {}", analysis.content_type_name));
    }
    if let Some(number) = elements.number() {
        parts.push(format!("數據: {}", number));
    }
    if let Some(trend) = elements.trend() {
        parts.push(format!("趨勢: {}", trend.label()));
    }
    if !elements.steps().is_empty() {
        parts.push(format!("步驟數: {}", elements.steps().len()));
    }
    if !elements.events().is_empty() {
        parts.push(format!("時間點: {}個", elements.events().len()));
    }

    parts.join(", ")
}

/// 予算上限を適用する
///
/// 生成対象を matchScore 降順に安定ソートし、上位 `max_infographics` 枚だけ残す。
/// 同点は元の順序を保つ。降格した枚数を返す。
pub fn optimize_for_budget(decisions: &mut [Decision], budget: &BudgetConfig) -> usize {
    let mut ranked: Vec<usize> = decisions
        .iter()
        .enumerate()
        .filter(|(_, d)| d.needs_generation())
        .map(|(i, _)| i)
        .collect();

    if ranked.len() <= budget.max_infographics {
        return 0;
    }

    // sort_by は安定ソート
    ranked.sort_by(|&a, &b| {
        decisions[b]
            .analysis
            .match_score
            .total_cmp(&decisions[a].analysis.match_score)
    });

    let losers = &ranked[budget.max_infographics..];
    for &i in losers {
        decisions[i].downgrade_for_budget();
    }
    losers.len()
}

/// 決策の検証結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// 決策が実行可能か検証する
///
/// 生成が必要なのに認証情報がなければ invalid。
/// 低スコアのまま生成を要求している場合は警告のみ。
pub fn validate(decision: &Decision, has_credential: bool) -> ValidationResult {
    let mut result = ValidationResult {
        valid: true,
        ..Default::default()
    };

    if decision.needs_generation() {
        if !has_credential {
            result.valid = false;
            result.errors.push("缺少圖片生成 API 金鑰".to_string());
        }

        if decision.analysis.match_score < LOW_CONFIDENCE_THRESHOLD {
            result.warnings.push(format!(
                "投影片 {} 的匹配分數較低 ({})，視覺效果可能不夠精準",
                decision.slide_index, decision.analysis.match_score
            ));
        }
    }

    result
}
