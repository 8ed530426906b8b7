// ============================================================================
// File: src/verdict.rs
// Verdict classification from free-text analysis output
// ============================================================================

use colored::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Heuristic display category derived from an analysis result.
///
/// Not an authoritative judgment; recomputed from the result text whenever
/// it is needed and never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    True,
    False,
    Misleading,
    Unverified,
    AiDetected,
    Human,
}

/// Display metadata for a verdict
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerdictStyle {
    pub verdict: Verdict,
    pub label: &'static str,
    pub symbol: &'static str,
    pub color: Color,
}

static VERDICT_STYLES: [VerdictStyle; 6] = [
    VerdictStyle {
        verdict: Verdict::True,
        label: "Verified True",
        symbol: "✔",
        color: Color::Green,
    },
    VerdictStyle {
        verdict: Verdict::False,
        label: "False",
        symbol: "✘",
        color: Color::Red,
    },
    VerdictStyle {
        verdict: Verdict::Misleading,
        label: "Misleading",
        symbol: "⚠",
        color: Color::Yellow,
    },
    VerdictStyle {
        verdict: Verdict::Unverified,
        label: "Unverifiable",
        symbol: "?",
        color: Color::BrightBlack,
    },
    VerdictStyle {
        verdict: Verdict::AiDetected,
        label: "AI Generated",
        symbol: "🤖",
        color: Color::Magenta,
    },
    VerdictStyle {
        verdict: Verdict::Human,
        label: "Likely Human",
        symbol: "✔",
        color: Color::Blue,
    },
];

/// Map analysis output to a verdict.
///
/// Case-insensitive substring matching, first match wins. The rule order is
/// the tie-break policy: AI/human markers beat truth keywords, and text that
/// mentions both "true" and "false" can never be classified `True`.
pub fn classify(result_text: &str) -> Verdict {
    let lower = result_text.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("likely ai") || has("ai generated") || has("ai-generated") {
        return Verdict::AiDetected;
    }
    if has("likely human") || has("human written") {
        return Verdict::Human;
    }
    if has("true") && !has("false") && !has("partially") {
        return Verdict::True;
    }
    if has("false") && !has("true") {
        return Verdict::False;
    }
    if has("misleading") || has("partially") {
        return Verdict::Misleading;
    }
    Verdict::Unverified
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::True => "true",
            Verdict::False => "false",
            Verdict::Misleading => "misleading",
            Verdict::Unverified => "unverified",
            Verdict::AiDetected => "ai_detected",
            Verdict::Human => "human",
        }
    }

    pub fn style(&self) -> &'static VerdictStyle {
        VERDICT_STYLES
            .iter()
            .find(|style| style.verdict == *self)
            .unwrap_or(&VERDICT_STYLES[3])
    }
}

/// Look up display metadata by verdict name; unknown names get the `unverified` entry
pub fn style_for(name: &str) -> &'static VerdictStyle {
    name.parse::<Verdict>()
        .unwrap_or(Verdict::Unverified)
        .style()
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Verdict::True),
            "false" => Ok(Verdict::False),
            "misleading" => Ok(Verdict::Misleading),
            "unverified" => Ok(Verdict::Unverified),
            "ai_detected" => Ok(Verdict::AiDetected),
            "human" => Ok(Verdict::Human),
            other => Err(format!("unknown verdict '{}'", other)),
        }
    }
}
