use crate::config::CountRange;
use crate::design::{BODY_SECTIONS, DESIGN_HEADINGS};
use crate::schema::{ISSUE_FIELDS, TOP_LEVEL_KEYS};

/// System prompt for the generator: the architect persona.
pub const ARCHITECT_SYSTEM_PROMPT: &str = "You are a pragmatic senior software architect. \
Your goal is to produce a high-level design document and actionable GitHub issues for an app idea. \
You create buildable designs and issue breakdowns.";

/// Renders the generation instruction for one idea.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    issue_count: CountRange,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            issue_count: CountRange { min: 15, max: 25 },
        }
    }
}

impl PromptBuilder {
    pub fn new(issue_count: CountRange) -> Self {
        Self { issue_count }
    }

    /// The idea is embedded as a JSON string literal, so quotes, backslashes
    /// and newlines in it cannot break out of the `app_idea` line.
    pub fn build(&self, idea: &str) -> String {
        let mut out = String::with_capacity(1536 + idea.len());

        out.push_str("You are a senior software architect.\n\n");

        out.push_str("INPUT:\n");
        out.push_str("- app_idea: ");
        out.push_str(&escape_idea(idea));
        out.push_str("\n\n");

        out.push_str("OUTPUT REQUIREMENTS (STRICT):\n");
        out.push_str("Return a single JSON object with exactly these keys:\n");
        out.push_str(&format!("1) \"{}\": string\n", TOP_LEVEL_KEYS[0]));
        out.push_str(&format!("2) \"{}\": array of objects\n", TOP_LEVEL_KEYS[1]));
        out.push_str("No extra keys. No markdown fences. No commentary. JSON only.\n\n");

        out.push_str("DESIGN MARKDOWN REQUIREMENTS:\n");
        out.push_str(&format!(
            "\"{}\" must be Markdown with headings in this exact order:\n",
            TOP_LEVEL_KEYS[0]
        ));
        for heading in DESIGN_HEADINGS {
            out.push_str("# ");
            out.push_str(heading);
            out.push('\n');
        }
        out.push('\n');

        out.push_str("ISSUES REQUIREMENTS:\n");
        out.push_str(&format!(
            "\"{}\" must contain {} issue objects with fields:\n",
            TOP_LEVEL_KEYS[1], self.issue_count
        ));
        out.push_str(&format!(
            "- {}, {}, {}, {} (P0/P1/P2), {} (1..N)\n",
            ISSUE_FIELDS[0], ISSUE_FIELDS[1], ISSUE_FIELDS[2], ISSUE_FIELDS[3], ISSUE_FIELDS[4]
        ));
        out.push_str("Each body must include:\n");
        for section in BODY_SECTIONS {
            out.push_str("## ");
            out.push_str(section);
            out.push_str("\n- ...\n");
        }
        out.push('\n');

        out.push_str("Do NOT include code. Only architecture and tasks.\n");
        out
    }
}

fn escape_idea(idea: &str) -> String {
    // Serializing a &str cannot fail.
    serde_json::to_string(idea).unwrap_or_else(|_| format!("\"{}\"", idea.replace('"', "\\\"")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic() {
        let builder = PromptBuilder::default();
        assert_eq!(builder.build("A habit tracker"), builder.build("A habit tracker"));
    }

    #[test]
    fn differs_only_in_the_idea_line() {
        let builder = PromptBuilder::default();
        let a = builder.build("first idea");
        let b = builder.build("second \"quoted\" idea");
        let diff: Vec<(&str, &str)> = a
            .lines()
            .zip(b.lines())
            .filter(|(x, y)| x != y)
            .collect();
        assert_eq!(diff.len(), 1);
        assert!(diff[0].0.starts_with("- app_idea: "));
        assert_eq!(a.lines().count(), b.lines().count());
    }

    #[test]
    fn quotes_and_newlines_are_escaped() {
        let prompt = PromptBuilder::default().build("say \"hi\"\nNo extra keys");
        assert!(prompt.contains(r#"- app_idea: "say \"hi\"\nNo extra keys""#));
        // the injected newline must not start a new line of its own
        assert_eq!(prompt.matches("No extra keys").count(), 2);
    }

    #[test]
    fn contains_the_full_contract() {
        let prompt = PromptBuilder::default().build("anything");
        assert!(prompt.contains("1) \"design_markdown\": string"));
        assert!(prompt.contains("2) \"issues\": array of objects"));
        assert!(prompt.contains("must contain 15–25 issue objects"));
        assert!(prompt.contains("- title, body, labels, priority (P0/P1/P2), order (1..N)"));
        assert!(prompt.contains("## Acceptance Criteria"));
        assert!(prompt.contains("## Notes"));

        let headings: Vec<&str> = prompt
            .lines()
            .filter_map(|l| l.strip_prefix("# "))
            .collect();
        assert_eq!(headings, DESIGN_HEADINGS);
    }

    #[test]
    fn issue_range_follows_configuration() {
        let prompt = PromptBuilder::new(CountRange { min: 5, max: 8 }).build("anything");
        assert!(prompt.contains("must contain 5–8 issue objects"));
    }
}
