use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    pub rank: i32,
}

const MISS: MatchResult = MatchResult {
    matched: false,
    rank: -1,
};

/// An empty pattern matches every candidate: any subsequence query a later
/// keystroke produces is an extension of it.
const EMPTY_MATCH: MatchResult = MatchResult {
    matched: true,
    rank: 0,
};

struct FirstCharProbe {
    queried: char,
    variants: [char; 2],
}

/// Per-session match/rank engine. Single-character patterns take a scan
/// fast path; longer patterns delegate to the fuzzy matcher. Results are
/// memoized per candidate string, since one name may be probed both as a
/// bare name and as a container-qualified name within a session.
pub struct MatchRanker {
    first_char: Option<FirstCharProbe>,
    pattern: Option<Pattern>,
    matcher: Matcher,
    utf32_buf: Vec<char>,
    saved: HashMap<String, MatchResult>,
}

impl MatchRanker {
    pub fn new(pattern_text: &str) -> Self {
        let mut chars = pattern_text.chars();
        let first_char = match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(FirstCharProbe {
                queried: ch,
                variants: [
                    ch.to_uppercase().next().unwrap_or(ch),
                    ch.to_lowercase().next().unwrap_or(ch),
                ],
            }),
            _ => None,
        };
        let pattern = if first_char.is_none() && !pattern_text.is_empty() {
            Some(Pattern::new(
                pattern_text,
                CaseMatching::Smart,
                Normalization::Smart,
                AtomKind::Fuzzy,
            ))
        } else {
            None
        };
        Self {
            first_char,
            pattern,
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            utf32_buf: Vec::new(),
            saved: HashMap::new(),
        }
    }

    pub fn match_rank(&mut self, name: &str) -> MatchResult {
        if let Some(saved) = self.saved.get(name) {
            return *saved;
        }
        let result = self.compute(name);
        self.saved.insert(name.to_string(), result);
        result
    }

    fn compute(&mut self, name: &str) -> MatchResult {
        if let Some(probe) = &self.first_char {
            let len = name.chars().count() as i32;
            for (idx, ch) in name.chars().enumerate() {
                if ch != probe.variants[0] && ch != probe.variants[1] {
                    continue;
                }
                // Earlier occurrence and shorter name rank higher; a
                // case-insensitive hit is worth half an exact one.
                let mut rank = i32::MAX
                    .saturating_sub((len - 1).saturating_mul(10))
                    .saturating_sub(idx as i32);
                if ch != probe.queried {
                    rank /= 2;
                }
                return MatchResult {
                    matched: true,
                    rank,
                };
            }
            return MISS;
        }
        let Some(pattern) = &self.pattern else {
            return EMPTY_MATCH;
        };
        let haystack = Utf32Str::new(name, &mut self.utf32_buf);
        match pattern.score(haystack, &mut self.matcher) {
            Some(score) => MatchResult {
                matched: true,
                rank: score.min(i32::MAX as u32) as i32,
            },
            None => MISS,
        }
    }
}
