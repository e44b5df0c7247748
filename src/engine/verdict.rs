use std::cmp::Ordering;
use std::fmt;

/// Severity of a message, ordered from harmless to enforceable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Safe,
    Questionable,
    Scam,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Safe, Verdict::Questionable, Verdict::Scam];

    pub fn rank(self) -> u8 {
        match self {
            Verdict::Safe => 0,
            Verdict::Questionable => 10,
            Verdict::Scam => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Safe => "SAFE",
            Verdict::Questionable => "QUESTIONABLE",
            Verdict::Scam => "SCAM",
        }
    }
}

impl Ord for Verdict {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Verdict {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one filter, or the merge of several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    pub verdict: Verdict,
    pub explanation: Option<Vec<String>>,
}

impl FilterResult {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            explanation: None,
        }
    }

    pub fn with_explanation(verdict: Verdict, explanation: Vec<String>) -> Self {
        Self {
            verdict,
            explanation: Some(explanation),
        }
    }

    /// Identity of [`FilterResult::merge`].
    pub fn empty() -> Self {
        Self::new(Verdict::Safe)
    }

    /// Worst verdict wins, explanations are concatenated in call order.
    pub fn merge(self, other: FilterResult) -> FilterResult {
        let verdict = self.verdict.max(other.verdict);
        let explanation = match (self.explanation, other.explanation) {
            (None, None) => None,
            (lhs, rhs) => {
                let mut lines = lhs.unwrap_or_default();
                lines.extend(rhs.unwrap_or_default());
                if lines.is_empty() {
                    None
                } else {
                    Some(lines)
                }
            }
        };
        FilterResult {
            verdict,
            explanation,
        }
    }

    pub fn merge_all(results: impl IntoIterator<Item = FilterResult>) -> FilterResult {
        results
            .into_iter()
            .fold(FilterResult::empty(), FilterResult::merge)
    }

    pub fn is_enforceable(&self) -> bool {
        self.verdict >= Verdict::Scam
    }
}

impl Default for FilterResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for FilterResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verdict)?;
        if let Some(lines) = self.explanation.as_ref().filter(|l| !l.is_empty()) {
            f.write_str(" based on the following evidence:")?;
            for line in lines {
                write!(f, "\n{}", line)?;
            }
        }
        Ok(())
    }
}
