//! Permissive parsing of model-written insight lists

/// Insights kept per research run
pub const MAX_INSIGHTS: usize = 8;

/// Unmarked lines stop being accepted once this many insights exist
const UNMARKED_LINE_LIMIT: usize = 10;

const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];

/// Extract insights from a completion.
///
/// Lines starting with `•`, `-` or `*` always count, with the marker removed.
/// Any other non-blank line counts only while fewer than ten insights have
/// been collected. The result is truncated to [`MAX_INSIGHTS`].
pub fn parse_insights(text: &str) -> Vec<String> {
    let mut insights: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim) {
        let mut chars = line.chars();
        match chars.next() {
            Some(first) if BULLET_MARKERS.contains(&first) => {
                insights.push(chars.as_str().trim().to_string());
            }
            Some(_) if insights.len() < UNMARKED_LINE_LIMIT => {
                insights.push(line.to_string());
            }
            _ => {}
        }
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

/// Render search results as the `Title:`/`Snippet:` blocks the insight prompt expects.
pub fn format_results(results: &[crate::search::SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("Title: {}\nSnippet: {}", r.title, r.snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::synthetic_results;

    #[test]
    fn test_bullets_are_stripped() {
        let text = "• First insight\n- Second insight\n*   Third insight";
        assert_eq!(
            parse_insights(text),
            vec!["First insight", "Second insight", "Third insight"]
        );
    }

    #[test]
    fn test_unmarked_lines_accepted() {
        let text = "Key insights:\n\n1. Adoption is rising\n   \n2. Costs are falling";
        assert_eq!(
            parse_insights(text),
            vec!["Key insights:", "1. Adoption is rising", "2. Costs are falling"]
        );
    }

    #[test]
    fn test_truncates_to_eight() {
        let text = (1..=12)
            .map(|i| format!("- insight {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let insights = parse_insights(&text);
        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert_eq!(insights[7], "insight 8");
    }

    #[test]
    fn test_empty_bullet_yields_empty_insight() {
        assert_eq!(parse_insights("-\nreal"), vec!["", "real"]);
    }

    #[test]
    fn test_unmarked_limit_only_matters_for_plain_lines() {
        // ten plain lines fill the list, so the eleventh plain line is dropped,
        // but a later bullet is still accepted before truncation
        let mut lines: Vec<String> = (0..11).map(|i| format!("plain {}", i)).collect();
        lines.push("- bullet".to_string());
        let insights = parse_insights(&lines.join("\n"));
        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert!(insights.iter().all(|i| i.starts_with("plain")));
    }

    #[test]
    fn test_blank_text() {
        assert!(parse_insights("\n  \n").is_empty());
    }

    #[test]
    fn test_format_results() {
        let text = format_results(&synthetic_results("edge computing"));
        assert!(text.starts_with("Title: Comprehensive Guide to edge computing\nSnippet: "));
        assert_eq!(text.matches("\n\nTitle: ").count(), 2);
    }
}
