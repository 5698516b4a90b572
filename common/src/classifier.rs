//! 投影片テキストのカテゴリ分類
//!
//! 全カテゴリのシグナルを評価し、最高得点のカテゴリを返す。
//! 純粋関数なので同じテキストには常に同じ結果を返す。

use crate::rules::RuleTable;
use crate::types::Category;
use std::sync::Arc;

/// 勝者とみなす最低得点
pub const MIN_MATCH_SCORE: f64 = 1.0;

/// 分類結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub match_score: f64,
}

impl Classification {
    pub fn text_only() -> Self {
        Self {
            category: Category::TextOnly,
            match_score: 0.0,
        }
    }
}

/// ルール表に基づく分類器
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<RuleTable>,
}

impl Classifier {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// 1カテゴリ分の得点
    pub fn score(&self, category: Category, text: &str) -> f64 {
        self.rules
            .signals(category)
            .iter()
            .map(|signal| signal.evaluate(text))
            .sum()
    }

    /// テキストを分類する
    ///
    /// 同点は先に評価したカテゴリが勝つ（`>` で比較）。
    /// 最高得点が [`MIN_MATCH_SCORE`] 未満なら text_only / 0 点。
    pub fn classify(&self, text: &str) -> Classification {
        let mut best = Classification::text_only();

        for category in Category::SCORED {
            let score = self.score(category, text);
            if score > best.match_score {
                best = Classification {
                    category,
                    match_score: score,
                };
            }
        }

        if best.match_score < MIN_MATCH_SCORE {
            return Classification::text_only();
        }

        log::debug!("分類: {} ({})", best.category, best.match_score);
        best
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(RuleTable::standard()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Signal;

    fn classifier() -> Classifier {
        Classifier::default()
    }

    #[test]
    fn test_no_signal_is_text_only() {
        let result = classifier().classify("總結 感謝您的時間，如有任何問題歡迎聯繫。");
        assert_eq!(result, Classification::text_only());
    }

    #[test]
    fn test_empty_text_is_text_only() {
        let result = classifier().classify(" ");
        assert_eq!(result.category, Category::TextOnly);
        assert_eq!(result.match_score, 0.0);
    }

    #[test]
    fn test_statistics_with_percentage_and_trend() {
        let result = classifier().classify("針扎傷害減少 87% ");
        assert_eq!(result.category, Category::Statistics);
        // 百分比 1.5 + 趨勢詞 1
        assert_eq!(result.match_score, 2.5);
    }

    #[test]
    fn test_process_steps_with_arrows() {
        let result = classifier()
            .classify("服務流程 步驟 1: 安裝容器 → 步驟 2: 定期收運 → 步驟 3: 專業處理");
        assert_eq!(result.category, Category::Process);
        assert_eq!(result.match_score, 2.0);
    }

    #[test]
    fn test_tie_goes_to_first_category() {
        // statistics: 倍 (1) / process: 然後 (1)
        let result = classifier().classify("產能翻倍，然後上市");
        assert_eq!(result.category, Category::Statistics);
        assert_eq!(result.match_score, 1.0);
    }

    #[test]
    fn test_score_for_single_category() {
        let c = classifier();
        assert_eq!(c.score(Category::Timeline, "1986 年創立，至今"), 3.0);
        assert_eq!(c.score(Category::TextOnly, "1986 年創立"), 0.0);
    }

    #[test]
    fn test_custom_signal_changes_winner() {
        let rules = RuleTable::standard()
            .with_signal(Category::Concept, Signal::new("mission_en", "(?i)mission").unwrap());
        let c = Classifier::new(Arc::new(rules));
        let result = c.classify("Our mission");
        assert_eq!(result.category, Category::Concept);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let c = classifier();
        let text = "傳統容器 vs Sharpsmart ✓ 防刺穿 ✗ 無此功能";
        assert_eq!(c.classify(text), c.classify(text));
    }
}
