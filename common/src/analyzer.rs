//! 投影片解析（分類 + 要素抽出）
//!
//! 1枚ずつ独立した純粋計算なので、プレゼン全体は並列に処理できる。

use crate::classifier::{Classification, Classifier};
use crate::extractor;
use crate::rules::RuleTable;
use crate::types::{Analysis, Category, Slide, VisualNeed};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// インフォグラフィック1枚あたりの概算コスト（USD）
pub const COST_PER_INFOGRAPHIC: f64 = 0.05;

/// 分類と抽出をまとめて行う解析器
#[derive(Debug, Clone, Default)]
pub struct SlideAnalyzer {
    classifier: Classifier,
}

impl SlideAnalyzer {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self {
            classifier: Classifier::new(rules),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// 1枚を解析する
    pub fn analyze(&self, slide: &Slide) -> Analysis {
        let text = slide.full_text();
        let classification = self.classifier.classify(&text);
        self.build_analysis(slide, &text, classification)
    }

    /// カテゴリを指定して解析する（得点はそのカテゴリ自身の得点）
    pub fn analyze_as(&self, slide: &Slide, category: Category) -> Analysis {
        let text = slide.full_text();
        let classification = Classification {
            category,
            match_score: self.classifier.score(category, &text),
        };
        self.build_analysis(slide, &text, classification)
    }

    /// プレゼン全体を解析する（indexは位置で振り直す）
    pub fn analyze_presentation(&self, slides: &[Slide]) -> Vec<Analysis> {
        map_slides(slides, |slide| self.analyze(slide))
    }

    fn build_analysis(&self, slide: &Slide, text: &str, classification: Classification) -> Analysis {
        let info = self.classifier.rules().info(classification.category);

        Analysis {
            slide_index: slide.index,
            title: slide.title.clone(),
            content_type: classification.category,
            content_type_name: info.name.to_string(),
            visual_need: info.visual,
            infographic_type: info.infographic,
            match_score: classification.match_score,
            key_elements: extractor::extract(text, classification.category),
        }
    }
}

/// 位置でindexを振り直してから各投影片に `f` を適用する
pub(crate) fn map_slides<T, F>(slides: &[Slide], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Slide) -> T + Sync + Send,
{
    let apply = |(index, slide): (usize, &Slide)| {
        if slide.index == index {
            f(slide)
        } else {
            f(&Slide {
                index,
                ..slide.clone()
            })
        }
    };

    #[cfg(feature = "parallel")]
    let results: Vec<T> = slides.par_iter().enumerate().map(apply).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<T> = slides.iter().enumerate().map(apply).collect();

    results
}

/// 視覚要素の需要サマリー
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSummary {
    pub total_slides: usize,
    pub infographic_count: usize,
    pub no_visual_count: usize,
    pub by_type: BTreeMap<Category, usize>,
    pub estimated_cost: f64,
}

/// 解析結果から需要サマリーを作る
pub fn summarize(analyses: &[Analysis]) -> VisualSummary {
    let mut summary = VisualSummary {
        total_slides: analyses.len(),
        ..Default::default()
    };

    for analysis in analyses {
        match analysis.visual_need {
            VisualNeed::Infographic => summary.infographic_count += 1,
            VisualNeed::NoVisual => summary.no_visual_count += 1,
        }
        *summary.by_type.entry(analysis.content_type).or_insert(0) += 1;
    }

    summary.estimated_cost = estimate_cost(summary.infographic_count);
    summary
}

/// 生成枚数から概算コストを出す（セント単位で丸め）
pub fn estimate_cost(count: usize) -> f64 {
    (count as f64 * COST_PER_INFOGRAPHIC * 100.0).round() / 100.0
}
