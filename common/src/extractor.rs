//! カテゴリ別のキー要素抽出
//!
//! 勝ったカテゴリと元テキストから構造化データを取り出す。
//! 一致しなければ既定値に落ちるだけで、エラーにはならない。

use crate::types::{
    Category, ComparisonSide, KeyElements, StatisticsElements, TimelineEvent, Trend,
};
use regex::Regex;

/// 箇条書きラベルとみなす矢印区切りの最大文字数（未満）
const MAX_ARROW_LABEL_CHARS: usize = 20;
/// 年表イベント説明の文字数範囲
const MIN_EVENT_DESCRIPTION_CHARS: usize = 5;
const MAX_EVENT_DESCRIPTION_CHARS: usize = 30;
/// 比較項目数の下限
const MIN_COMPARISON_ITEMS: usize = 3;

lazy_static::lazy_static! {
    static ref PERCENT_RE: Regex = Regex::new(r"([0-9]+(\.[0-9]+)?)\s*%").unwrap();
    static ref DECREASE_RE: Regex = Regex::new(r"減少|降低|下降").unwrap();
    static ref INCREASE_RE: Regex = Regex::new(r"增加|成長|提升|上升").unwrap();
    static ref SUBJECT_RE: Regex = Regex::new(r"針扎|傷害|成本|效率|銷售|營收|用戶|客戶").unwrap();

    static ref STEP_MARKER_RE: Regex = Regex::new(r"(?i)(?:步驟|階段|Phase)\s*[0-9]+[：:]\s*").unwrap();
    static ref ARROW_SPLIT_RE: Regex = Regex::new(r"→|->").unwrap();

    static ref VERSUS_RE: Regex = Regex::new(r"(?i)(.{2,10})\s*(?:vs\.?|對比|比較)\s*(.{2,10})").unwrap();
    static ref MARK_RE: Regex = Regex::new(r"✓|✗|√|×|優點|缺點").unwrap();

    static ref YEAR_MARKER_RE: Regex = Regex::new(r"([0-9]{4})\s*年?[：:\s]*").unwrap();

    static ref NAME_RE: Regex = Regex::new(r"[A-Za-z][A-Za-z\s]*").unwrap();
    static ref INDUSTRY_RES: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)醫療|healthcare").unwrap(), "healthcare"),
        (Regex::new(r"(?i)科技|technology").unwrap(), "technology"),
        (Regex::new(r"環保|環境").unwrap(), "environmental"),
        (Regex::new(r"(?i)金融|finance").unwrap(), "finance"),
    ];

    static ref CONCEPT_RE: Regex = Regex::new(r"策略|模式|理念|價值|願景|商業模式|競爭優勢").unwrap();
}

/// テキストからカテゴリ別のキー要素を抽出する
pub fn extract(text: &str, category: Category) -> KeyElements {
    match category {
        Category::Statistics => KeyElements::Statistics(extract_statistics(text)),
        Category::Process => KeyElements::Process {
            steps: extract_steps(text),
        },
        Category::Comparison => extract_comparison(text),
        Category::Timeline => KeyElements::Timeline {
            events: extract_events(text),
        },
        Category::CompanyIntro => KeyElements::CompanyIntro {
            keywords: extract_company_keywords(text),
        },
        Category::Concept => KeyElements::Concept {
            concept: CONCEPT_RE
                .find(text)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "核心概念".to_string()),
            elements: Vec::new(),
        },
        Category::TextOnly => KeyElements::Empty,
    }
}

fn extract_statistics(text: &str) -> StatisticsElements {
    let trend = if DECREASE_RE.is_match(text) {
        Some(Trend::Decrease)
    } else if INCREASE_RE.is_match(text) {
        Some(Trend::Increase)
    } else {
        None
    };

    StatisticsElements {
        number: PERCENT_RE.find(text).map(|m| m.as_str().to_string()),
        trend,
        subject: SUBJECT_RE.find(text).map(|m| m.as_str().to_string()),
    }
}

/// 手順を抽出する
///
/// 1. 「步驟 N:」などの明示マーカー（説明は次のマーカー・矢印・句点・改行まで）
/// 2. なければ矢印区切りの短い断片
/// 3. それもなければ汎用の3手順
pub fn extract_steps(text: &str) -> Vec<String> {
    let markers: Vec<_> = STEP_MARKER_RE.find_iter(text).collect();

    let mut steps: Vec<String> = markers
        .iter()
        .enumerate()
        .filter_map(|(i, marker)| {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
            let segment = cut_at_terminator(&text[marker.end()..end]);
            let segment = segment.trim();
            (!segment.is_empty()).then(|| segment.to_string())
        })
        .collect();

    if steps.is_empty() && text.contains('→') {
        steps = ARROW_SPLIT_RE
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.chars().count() < MAX_ARROW_LABEL_CHARS)
            .map(str::to_string)
            .collect();
    }

    if steps.is_empty() {
        steps = (1..=3).map(|n| format!("步驟 {}", n)).collect();
    }

    steps
}

fn cut_at_terminator(segment: &str) -> &str {
    const TERMINATORS: &[&str] = &["。", "\n", "→", "->", "⟶"];
    let end = TERMINATORS
        .iter()
        .filter_map(|t| segment.find(*t))
        .min()
        .unwrap_or(segment.len());
    &segment[..end]
}

fn extract_comparison(text: &str) -> KeyElements {
    let (left, right) = match VERSUS_RE.captures(text) {
        Some(caps) => (caps[1].trim().to_string(), caps[2].trim().to_string()),
        None => ("傳統方案".to_string(), "新方案".to_string()),
    };

    let marks = MARK_RE.find_iter(text).count();

    KeyElements::Comparison {
        left: ComparisonSide { title: left },
        right: ComparisonSide { title: right },
        items: MIN_COMPARISON_ITEMS.max(marks.div_ceil(2)),
    }
}

/// 4桁の年マーカーごとにイベントを抽出する
///
/// 説明は次の年マーカー・句点・改行まで（最大30文字）。5文字未満なら空。
pub fn extract_events(text: &str) -> Vec<TimelineEvent> {
    let markers: Vec<_> = YEAR_MARKER_RE.captures_iter(text).collect();

    let mut events: Vec<TimelineEvent> = markers
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let year = caps.get(1)?.as_str().to_string();
            let end = markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |next| next.start());

            Some(TimelineEvent {
                year,
                description: event_description(&text[whole.end()..end]),
            })
        })
        .collect();

    if events.is_empty() {
        events = ["2020", "2022", "2024"]
            .iter()
            .map(|year| TimelineEvent {
                year: year.to_string(),
                description: String::new(),
            })
            .collect();
    }

    events
}

fn event_description(segment: &str) -> String {
    let end = segment
        .find(|c: char| c == '。' || c == '\n')
        .unwrap_or(segment.len());
    let description: String = segment[..end]
        .chars()
        .take(MAX_EVENT_DESCRIPTION_CHARS)
        .collect();
    let description = description
        .trim()
        .trim_end_matches(|c: char| matches!(c, '，' | ',' | '、' | '；' | ';'))
        .trim_end();

    if description.chars().count() < MIN_EVENT_DESCRIPTION_CHARS {
        String::new()
    } else {
        description.to_string()
    }
}

fn extract_company_keywords(text: &str) -> Vec<String> {
    let mut keywords = Vec::new();

    if let Some(name) = NAME_RE.find(text) {
        let name = name.as_str().trim();
        if !name.is_empty() {
            keywords.push(name.to_string());
        }
    }

    for (re, industry) in INDUSTRY_RES.iter() {
        if re.is_match(text) {
            keywords.push(industry.to_string());
        }
    }

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_decrease() {
        let elements = extract("針扎傷害減少 87% ", Category::Statistics);
        assert_eq!(elements.number(), Some("87%"));
        assert_eq!(elements.trend(), Some(Trend::Decrease));
        assert_eq!(elements.subject(), Some("針扎"));
    }

    #[test]
    fn test_statistics_increase_and_decimal() {
        let elements = extract("營收成長 12.5 %", Category::Statistics);
        assert_eq!(elements.number(), Some("12.5 %"));
        assert_eq!(elements.trend(), Some(Trend::Increase));
        assert_eq!(elements.subject(), Some("營收"));
    }

    #[test]
    fn test_statistics_fields_omitted() {
        let elements = extract("產能翻倍", Category::Statistics);
        assert_eq!(elements, KeyElements::Statistics(StatisticsElements::default()));
    }

    #[test]
    fn test_steps_from_markers() {
        let steps = extract_steps("服務流程 步驟 1: 安裝容器 → 步驟 2: 定期收運 → 步驟 3: 專業處理");
        assert_eq!(steps, vec!["安裝容器", "定期收運", "專業處理"]);
    }

    #[test]
    fn test_steps_from_phase_markers_case_insensitive() {
        let steps = extract_steps("PHASE 1：規劃。phase 2: 執行");
        assert_eq!(steps, vec!["規劃", "執行"]);
    }

    #[test]
    fn test_steps_from_arrows() {
        let steps = extract_steps("導入流程 需求訪談 → 方案設計 -> 上線");
        assert_eq!(steps, vec!["導入流程 需求訪談", "方案設計", "上線"]);
    }

    #[test]
    fn test_steps_arrow_segments_too_long_are_dropped() {
        let steps = extract_steps("短 → 這一段文字實在是太長了所以不應該被當作一個步驟的標籤");
        assert_eq!(steps, vec!["短"]);
    }

    #[test]
    fn test_steps_fallback() {
        let steps = extract_steps("一條龍服務");
        assert_eq!(steps, vec!["步驟 1", "步驟 2", "步驟 3"]);
    }

    #[test]
    fn test_comparison_versus() {
        let elements = extract(
            "傳統容器 vs Sharpsmart 傳統一次性容器有刺穿風險 ✓ 防刺穿 ✓ 防溢出 ✗ 傳統容器無此功能",
            Category::Comparison,
        );
        match elements {
            KeyElements::Comparison { left, right, items } => {
                assert_eq!(left.title, "傳統容器");
                assert_eq!(right.title, "Sharpsmart");
                assert_eq!(items, 3);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_comparison_items_from_marks() {
        let text = "優點 ✓ ✓ ✓ 缺點 ✗ ✗ ✗ ×";
        let elements = extract(text, Category::Comparison);
        // 9個 → ceil(9/2) = 5
        assert_eq!(elements.item_count(), Some(5));
    }

    #[test]
    fn test_comparison_fallback_labels() {
        match extract("優勢與劣勢", Category::Comparison) {
            KeyElements::Comparison { left, right, items } => {
                assert_eq!(left.title, "傳統方案");
                assert_eq!(right.title, "新方案");
                assert_eq!(items, 3);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_events_from_years() {
        let events = extract_events(
            "公司發展歷程 1986 年在澳洲創立，2000 年進入美國市場，2015 年成為美國第二大醫療廢棄物公司。",
        );
        let years: Vec<&str> = events.iter().map(|e| e.year.as_str()).collect();
        assert_eq!(years, vec!["1986", "2000", "2015"]);
        assert_eq!(events[0].description, "在澳洲創立");
        assert_eq!(events[1].description, "進入美國市場");
        assert_eq!(events[2].description, "成為美國第二大醫療廢棄物公司");
    }

    #[test]
    fn test_events_short_description_dropped() {
        let events = extract_events("2019 年上市");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].year, "2019");
        assert_eq!(events[0].description, "");
    }

    #[test]
    fn test_events_fallback() {
        let events = extract_events("沿革");
        let years: Vec<&str> = events.iter().map(|e| e.year.as_str()).collect();
        assert_eq!(years, vec!["2020", "2022", "2024"]);
    }

    #[test]
    fn test_company_keywords() {
        let elements = extract(
            "關於 Daniels Health Daniels Health 是全球醫療廢棄物管理領導者，總部位於芝加哥。",
            Category::CompanyIntro,
        );
        assert_eq!(
            elements.keywords(),
            &["Daniels Health Daniels Health".to_string(), "healthcare".to_string()]
        );
    }

    #[test]
    fn test_company_keywords_empty() {
        let elements = extract("集團 簡介", Category::CompanyIntro);
        assert!(elements.keywords().is_empty());
    }

    #[test]
    fn test_concept_label() {
        let elements = extract("我們的商業模式", Category::Concept);
        assert_eq!(elements.concept(), Some("商業模式"));

        let fallback = extract("永續發展", Category::Concept);
        assert_eq!(fallback.concept(), Some("核心概念"));
    }

    #[test]
    fn test_text_only_is_empty() {
        assert_eq!(extract("感謝聆聽", Category::TextOnly), KeyElements::Empty);
    }
}
