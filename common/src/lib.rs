//! Slide Visual Common Library
//!
//! 投影片テキストの分類・要素抽出・視覚決策・プロンプト生成。
//! I/Oを持たない純粋ロジックのみ。CLIや生成クライアントはルートクレート側。

pub mod analyzer;
pub mod classifier;
pub mod decider;
pub mod error;
pub mod extractor;
pub mod prompts;
pub mod rules;
pub mod types;

pub use analyzer::{estimate_cost, summarize, SlideAnalyzer, VisualSummary, COST_PER_INFOGRAPHIC};
pub use classifier::{Classification, Classifier};
pub use decider::{
    optimize_for_budget, validate, BatchDecision, BatchOptions, BudgetConfig, DecideOptions,
    Decision, DecisionEngine, DecisionSummary, GenerationParams, GenerationSettings, Strategy,
    StrategySource, ValidationResult,
};
pub use error::{Error, Result};
pub use prompts::{build_prompt, build_prompt_by_name};
pub use rules::{RuleTable, Signal, StyleTable};
pub use types::{
    parse_slides, Analysis, Category, ColorPalette, InfographicKind, KeyElements,
    PartialColorPalette, Slide, SlideContent, Trend, VisualNeed,
};
