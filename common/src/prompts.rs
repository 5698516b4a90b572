//! インフォグラフィック生成プロンプト
//!
//! 種類ごとに1テンプレート。すべて共通のベーススタイルから始まる。
//! 画像内に文字を入れない指示を必ず含める（文字は後段で重ねる）。

use crate::types::{InfographicKind, KeyElements, PartialColorPalette, Trend};

/// 全テンプレート共通のスタイル指示
pub const BASE_STYLE: &str = "
Create a professional infographic illustration with:
- Clean, modern design
- Simple flat design style
- No text or labels (text will be added separately)
- High contrast colors
- White or light background
- Suitable for business presentations
- 16:9 aspect ratio
";

const DEFAULT_STEP_COUNT: usize = 4;
const DEFAULT_COMPARISON_ROWS: usize = 4;
const DEFAULT_EVENT_COUNT: usize = 4;
const DEFAULT_HIERARCHY_LEVELS: usize = 3;

/// 種類・キー要素・配色からプロンプトを組み立てる
///
/// 配色の欠けたフィールドは既定色で埋める。
/// キー要素に無いデータはテンプレート側の既定値を使う。
pub fn build_prompt(
    kind: InfographicKind,
    data: &KeyElements,
    colors: &PartialColorPalette,
) -> String {
    let colors = colors.resolve();
    let (primary, secondary, accent) = (&colors.primary, &colors.secondary, &colors.accent);

    let body = match kind {
        InfographicKind::Statistics => {
            let trend = match data.trend() {
                Some(Trend::Increase) => "upward trending arrow, growth indicator",
                Some(Trend::Decrease) => "downward trending arrow, reduction indicator",
                None => "neutral metric display",
            };
            let subject = data.subject().unwrap_or("the concept");

            format!(
                "Design a statistics infographic showing:
- A large, prominent circular or semi-circular gauge/meter as the focal point
- The gauge should visually represent a percentage or metric
- {trend}
- Abstract icons representing {subject}
- Subtle grid or dot pattern background
- Visual elements suggesting data/analytics

Color scheme:
- Primary: {primary}
- Secondary: {secondary}
- Accent: {accent}

Style: Corporate data visualization, clean metrics display
NO TEXT, NO NUMBERS - pure visual representation"
            )
        }
        InfographicKind::Process => {
            let step_count = non_zero_or(data.steps().len(), DEFAULT_STEP_COUNT);

            format!(
                "Design a process flow infographic with:
- {step_count} connected stages/steps arranged horizontally
- Each step represented by a circular node or icon container
- Flowing arrows or lines connecting each step
- Subtle numbered indicators (1, 2, 3...) within each node
- Professional icons inside each step representing different phases
- Gradient or color progression through the flow

Color scheme:
- Primary: {primary}
- Secondary: {secondary}
- Flow should progress from darker to lighter or use gradient

Style: Modern workflow diagram, clean connections
Each step should be visually distinct but part of a cohesive flow
NO TEXT LABELS - only visual icons and numbered indicators"
            )
        }
        InfographicKind::Comparison => {
            let rows = non_zero_or(data.item_count().unwrap_or(0), DEFAULT_COMPARISON_ROWS);

            format!(
                "Design a comparison infographic with:
- Clear two-column layout divided vertically
- Left side and right side clearly distinguished by color
- {rows} rows of comparison points
- Check marks (✓) and X marks (✗) or similar indicators
- Professional icons representing each comparison category
- Central dividing line or element
- Balance scale or versus symbol as header element

Color scheme:
- Left side: {primary} tones
- Right side: {secondary} tones
- Indicators: Green for positive, Red for negative

Style: Clean comparison chart, professional evaluation matrix
Clear visual hierarchy showing advantages and disadvantages
NO TEXT - only visual indicators and icons"
            )
        }
        InfographicKind::Timeline => {
            let event_count = non_zero_or(data.events().len(), DEFAULT_EVENT_COUNT);

            format!(
                "Design a timeline infographic with:
- Horizontal timeline line as the central element
- {event_count} milestone markers along the timeline
- Each milestone with a circular node and vertical connector
- Alternating positions (above/below) for milestone details
- Year/date indicators at each milestone point
- Small icons representing each milestone event
- Subtle decorative elements suggesting progress/growth

Color scheme:
- Timeline line: {primary}
- Milestone nodes: {secondary}
- Alternating accent colors for variety

Style: Modern horizontal timeline, corporate milestones visualization
Progressive flow from left (past) to right (present/future)
Include year markers but NO descriptive text"
            )
        }
        InfographicKind::Concept => format!(
            "Design a concept diagram infographic with:
- Central hub element representing the core concept
- 4-6 radiating elements connected to the center
- Each element with a distinct icon
- Connecting lines or arrows from center to each element
- Hub-and-spoke or mind-map style layout
- Subtle background patterns suggesting interconnection

Color scheme:
- Central hub: {primary}
- Radiating elements: {secondary}
- Connections: lighter tones

Style: Strategic concept visualization, relationship diagram
Shows how multiple elements connect to a central idea
Professional, corporate strategy look
NO TEXT - only visual elements and icons"
        ),
        InfographicKind::Hierarchy => {
            let levels = non_zero_or(data.levels().unwrap_or(0), DEFAULT_HIERARCHY_LEVELS);

            format!(
                "Design a hierarchy/pyramid infographic with:
- {levels}-level pyramid structure
- Each level clearly distinguished by size and color
- Icons or symbols representing each level
- Upward progression suggesting importance/priority
- Subtle shadows or 3D effect for depth
- Professional business hierarchy appearance

Color scheme:
- Top level: {accent}
- Middle levels: {primary}
- Base level: {secondary}

Style: Corporate pyramid diagram, organizational hierarchy
Clear visual progression from base to apex
NO TEXT - pure visual hierarchy representation"
            )
        }
        InfographicKind::Company => {
            let industry = industry_hint(data.keywords());

            format!(
                "Design a corporate/company introduction infographic with:
- Central building or headquarters silhouette
- Globe or world map element suggesting global presence
- Team/people icons showing organization
- Upward growth arrow or chart element
- Industry-specific icons for {industry}
- Professional, trustworthy corporate aesthetic
- Subtle connection lines between elements

Color scheme:
- Primary: {primary}
- Secondary: {secondary}
- Accent highlights: {accent}

Style: Corporate identity visualization, company overview graphic
Professional and trustworthy appearance
NO TEXT, NO COMPANY NAMES - pure visual representation"
            )
        }
    };

    format!("{}\n\n{}", BASE_STYLE, body)
}

/// 種類名からプロンプトを組み立てる（未知の名前は concept）
pub fn build_prompt_by_name(name: &str, data: &KeyElements, colors: &PartialColorPalette) -> String {
    build_prompt(InfographicKind::parse_lossy(name), data, colors)
}

/// 業種キーワードから図柄のヒントを選ぶ（後勝ち）
fn industry_hint(keywords: &[String]) -> &'static str {
    let has = |k: &str| keywords.iter().any(|kw| kw == k);

    let mut hint = "corporate business";
    if has("healthcare") {
        hint = "healthcare medical";
    }
    if has("technology") {
        hint = "technology innovation";
    }
    if has("environmental") {
        hint = "sustainability green";
    }
    hint
}

fn non_zero_or(value: usize, default: usize) -> usize {
    if value == 0 {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComparisonSide, StatisticsElements, TimelineEvent};

    fn default_colors() -> PartialColorPalette {
        PartialColorPalette::default()
    }

    #[test]
    fn test_every_kind_starts_with_base_style() {
        for kind in InfographicKind::ALL {
            let prompt = build_prompt(kind, &KeyElements::Empty, &default_colors());
            assert!(prompt.starts_with(BASE_STYLE), "{}", kind);
            assert!(prompt.contains("16:9 aspect ratio"));
            assert!(prompt.contains("No text or labels"));
            match kind {
                InfographicKind::Timeline => assert!(prompt.contains("NO descriptive text")),
                _ => assert!(prompt.contains("NO TEXT"), "{}", kind),
            }
        }
    }

    #[test]
    fn test_statistics_trend_and_subject() {
        let data = KeyElements::Statistics(StatisticsElements {
            number: Some("87%".into()),
            trend: Some(Trend::Decrease),
            subject: Some("針扎".into()),
        });
        let prompt = build_prompt(InfographicKind::Statistics, &data, &default_colors());

        assert!(prompt.contains("downward trending arrow, reduction indicator"));
        assert!(prompt.contains("Abstract icons representing 針扎"));
    }

    #[test]
    fn test_statistics_without_trend_is_neutral() {
        let prompt = build_prompt(InfographicKind::Statistics, &KeyElements::Empty, &default_colors());
        assert!(prompt.contains("neutral metric display"));
        assert!(prompt.contains("representing the concept"));
    }

    #[test]
    fn test_process_uses_step_count() {
        let data = KeyElements::Process {
            steps: vec!["安裝容器".into(), "定期收運".into(), "專業處理".into()],
        };
        let prompt = build_prompt(InfographicKind::Process, &data, &default_colors());
        assert!(prompt.contains("- 3 connected stages/steps"));
    }

    #[test]
    fn test_template_defaults_when_data_absent() {
        let empty = KeyElements::Empty;
        let colors = default_colors();

        assert!(build_prompt(InfographicKind::Process, &empty, &colors).contains("- 4 connected stages"));
        assert!(build_prompt(InfographicKind::Comparison, &empty, &colors).contains("- 4 rows of comparison"));
        assert!(build_prompt(InfographicKind::Timeline, &empty, &colors).contains("- 4 milestone markers"));
        assert!(build_prompt(InfographicKind::Hierarchy, &empty, &colors).contains("- 3-level pyramid"));
    }

    #[test]
    fn test_comparison_layout_and_indicators() {
        let data = KeyElements::Comparison {
            left: ComparisonSide { title: "傳統容器".into() },
            right: ComparisonSide { title: "Sharpsmart".into() },
            items: 3,
        };
        let prompt = build_prompt(InfographicKind::Comparison, &data, &default_colors());

        assert!(prompt.contains("two-column layout"));
        assert!(prompt.contains("Green for positive, Red for negative"));
        assert!(prompt.contains("- 3 rows of comparison points"));
        assert!(prompt.contains("Left side: #1E5128 tones"));
    }

    #[test]
    fn test_timeline_direction() {
        let data = KeyElements::Timeline {
            events: vec![
                TimelineEvent { year: "1986".into(), description: String::new() },
                TimelineEvent { year: "2024".into(), description: String::new() },
            ],
        };
        let prompt = build_prompt(InfographicKind::Timeline, &data, &default_colors());

        assert!(prompt.contains("- 2 milestone markers"));
        assert!(prompt.contains("from left (past) to right (present/future)"));
    }

    #[test]
    fn test_hierarchy_levels_and_colors() {
        let data = KeyElements::Hierarchy { levels: 5 };
        let colors = PartialColorPalette {
            accent: Some("#FFD700".into()),
            ..Default::default()
        };
        let prompt = build_prompt(InfographicKind::Hierarchy, &data, &colors);

        assert!(prompt.contains("- 5-level pyramid structure"));
        assert!(prompt.contains("Top level: #FFD700"));
        assert!(prompt.contains("Base level: #4E9F3D"));
    }

    #[test]
    fn test_company_industry_hint_last_wins() {
        let data = KeyElements::CompanyIntro {
            keywords: vec!["Sharpsmart".into(), "healthcare".into(), "environmental".into()],
        };
        let prompt = build_prompt(InfographicKind::Company, &data, &default_colors());
        assert!(prompt.contains("Industry-specific icons for sustainability green"));

        let plain = build_prompt(InfographicKind::Company, &KeyElements::Empty, &default_colors());
        assert!(plain.contains("Industry-specific icons for corporate business"));
    }

    #[test]
    fn test_unknown_name_falls_back_to_concept() {
        let colors = default_colors();
        let unknown = build_prompt_by_name("mystery", &KeyElements::Empty, &colors);
        let concept = build_prompt(InfographicKind::Concept, &KeyElements::Empty, &colors);
        assert_eq!(unknown, concept);
        assert!(unknown.contains("Hub-and-spoke"));
    }

    #[test]
    fn test_custom_colors_override_defaults() {
        let colors = PartialColorPalette {
            primary: Some("#003366".into()),
            ..Default::default()
        };
        let prompt = build_prompt(InfographicKind::Concept, &KeyElements::Empty, &colors);
        assert!(prompt.contains("Central hub: #003366"));
        assert!(prompt.contains("Radiating elements: #4E9F3D"));
    }
}
