use crate::index::matcher::MatchRanker;
use crate::proto::MEMBER_TAGS;
use crate::proto::MatchHit;
use crate::proto::SearchPattern;
use crate::proto::SymbolKind;
use crate::proto::SymbolRecord;
use crate::proto::TYPE_TAGS;
use crate::proto::kinds_for_tag;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Receives matches as they are found. Streaming, not batch: the sink sees
/// every hit the moment the scan produces it.
pub type ResultCallback = Arc<dyn Fn(MatchHit) + Send + Sync>;

const CANCEL_CHECK_INTERVAL: usize = 100;

/// Kinds that never appear in go-to-symbol results.
const UNSEARCHABLE: &[SymbolKind] = &[
    SymbolKind::Constructor,
    SymbolKind::Module,
    SymbolKind::Indexer,
];

/// The state of one evaluated query: its pattern, memoizing ranker, and the
/// filtered candidate list a refining follow-up query may scan instead of
/// the whole index. A `None` filtered list marks the session indeterminate
/// (its scan was abandoned) and blocks reuse.
pub struct SearchSession {
    pattern: SearchPattern,
    pub include_types: bool,
    pub include_members: bool,
    pub include_files: bool,
    allowed_kinds: Option<&'static [SymbolKind]>,
    ranker: MatchRanker,
    filtered: Option<Vec<SymbolRecord>>,
}

impl SearchSession {
    pub fn new(pattern: SearchPattern) -> Self {
        let tag = pattern.tag.as_deref();
        let include_types = tag.is_none_or(|t| TYPE_TAGS.contains(&t));
        let include_members = tag.is_none_or(|t| MEMBER_TAGS.contains(&t));
        let allowed_kinds = tag.map(kinds_for_tag);
        let ranker = MatchRanker::new(&pattern.text);
        Self {
            pattern,
            include_types,
            include_members,
            include_files: true,
            allowed_kinds,
            ranker,
            filtered: None,
        }
    }

    pub fn pattern(&self) -> &SearchPattern {
        &self.pattern
    }

    /// The post-match candidate list, absent while unevaluated or after an
    /// abandoned scan.
    pub fn filtered(&self) -> Option<&[SymbolRecord]> {
        self.filtered.as_deref()
    }

    /// Whether `next` may scan this session's filtered list instead of the
    /// full snapshot: `next`'s pattern textually extends this one under the
    /// same tag and the same qualified mode, and this session's scan ran to
    /// completion. Entering qualified mode always rescans the snapshot,
    /// since container-name matches can come from candidates an unqualified
    /// pass already dropped.
    pub fn can_extend(&self, next: &SearchSession) -> bool {
        self.filtered.is_some()
            && next.pattern.text.starts_with(&self.pattern.text)
            && self.pattern.tag == next.pattern.tag
            && self.pattern.qualified == next.pattern.qualified
    }

    /// Scan `candidates` in order, streaming every hit to `sink`. Returns
    /// the number of hits reported. Checks `cancel` every
    /// `CANCEL_CHECK_INTERVAL` candidates; once signaled the scan stops,
    /// the filtered list becomes indeterminate, and already-streamed hits
    /// stand.
    pub fn evaluate(
        &mut self,
        candidates: &[SymbolRecord],
        cancel: &CancellationToken,
        sink: &ResultCallback,
    ) -> usize {
        let mut filtered = Vec::new();
        let mut reported = 0usize;
        if self.include_types || self.include_members {
            for (scanned, symbol) in candidates.iter().enumerate() {
                if scanned % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                    self.filtered = None;
                    return reported;
                }
                if UNSEARCHABLE.contains(&symbol.kind) {
                    continue;
                }
                if let Some(allowed) = self.allowed_kinds
                    && !allowed.contains(&symbol.kind)
                {
                    continue;
                }
                if let Some(hit) = self.check_symbol(symbol) {
                    filtered.push(symbol.clone());
                    reported += 1;
                    sink(hit);
                }
            }
        }
        self.filtered = Some(filtered);
        reported
    }

    fn check_symbol(&mut self, symbol: &SymbolRecord) -> Option<MatchHit> {
        let result = self.ranker.match_rank(&symbol.name);
        if result.matched {
            return Some(MatchHit {
                matched_text: symbol.name.clone(),
                rank: result.rank,
                symbol: symbol.clone(),
                qualified_match: false,
            });
        }
        if !self.pattern.qualified {
            return None;
        }
        let container = symbol.container_name.as_deref()?;
        let result = self.ranker.match_rank(container);
        if result.matched {
            return Some(MatchHit {
                matched_text: container.to_string(),
                rank: result.rank,
                symbol: symbol.clone(),
                qualified_match: true,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    fn record(name: &str, kind: SymbolKind) -> SymbolRecord {
        SymbolRecord {
            name: name.to_string(),
            container_name: None,
            kind,
        }
    }

    fn contained(name: &str, container: &str, kind: SymbolKind) -> SymbolRecord {
        SymbolRecord {
            name: name.to_string(),
            container_name: Some(container.to_string()),
            kind,
        }
    }

    fn collecting_sink() -> (ResultCallback, Arc<Mutex<Vec<MatchHit>>>) {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let sink_hits = hits.clone();
        let sink: ResultCallback = Arc::new(move |hit| {
            sink_hits.lock().unwrap().push(hit);
        });
        (sink, hits)
    }

    fn session(pattern: &str, tag: Option<&str>) -> SearchSession {
        SearchSession::new(SearchPattern::parse(pattern, tag))
    }

    #[test]
    fn streams_matches_and_records_filtered_list() {
        let candidates = vec![
            record("Foo", SymbolKind::Class),
            record("FooBar", SymbolKind::Method),
            record("Baz", SymbolKind::Struct),
        ];
        let (sink, hits) = collecting_sink();
        let mut session = session("Foo", None);
        let reported = session.evaluate(&candidates, &CancellationToken::new(), &sink);
        assert_eq!(reported, 2);
        let names: Vec<String> = hits
            .lock()
            .unwrap()
            .iter()
            .map(|hit| hit.symbol.name.clone())
            .collect();
        assert_eq!(names, vec!["Foo".to_string(), "FooBar".to_string()]);
        assert_eq!(session.filtered().map(<[SymbolRecord]>::len), Some(2));
    }

    #[test]
    fn unsearchable_kinds_are_skipped() {
        let candidates = vec![
            record("Widget", SymbolKind::Constructor),
            record("Widget", SymbolKind::Module),
            record("Widget", SymbolKind::Indexer),
            record("Widget", SymbolKind::Class),
        ];
        let (sink, hits) = collecting_sink();
        let mut session = session("Widget", None);
        let reported = session.evaluate(&candidates, &CancellationToken::new(), &sink);
        assert_eq!(reported, 1);
        assert_eq!(hits.lock().unwrap()[0].symbol.kind, SymbolKind::Class);
    }

    #[test]
    fn tag_narrows_to_matching_kind() {
        let candidates = vec![
            record("Parser", SymbolKind::Class),
            record("Parse", SymbolKind::Method),
            record("ParserState", SymbolKind::Struct),
        ];
        let (sink, hits) = collecting_sink();
        let mut tagged = session("Par", Some("c"));
        tagged.evaluate(&candidates, &CancellationToken::new(), &sink);
        let tagged_hits = hits.lock().unwrap().clone();
        assert_eq!(tagged_hits.len(), 1);
        assert_eq!(tagged_hits[0].symbol.kind, SymbolKind::Class);

        let (sink, hits) = collecting_sink();
        let mut untagged = session("Par", None);
        untagged.evaluate(&candidates, &CancellationToken::new(), &sink);
        let untagged_names: Vec<String> = hits
            .lock()
            .unwrap()
            .iter()
            .map(|hit| hit.symbol.name.clone())
            .collect();
        for hit in &tagged_hits {
            assert!(untagged_names.contains(&hit.symbol.name));
        }
    }

    #[test]
    fn unknown_tag_yields_empty_completed_scan() {
        let candidates = vec![record("Foo", SymbolKind::Class)];
        let (sink, hits) = collecting_sink();
        let mut session = session("Foo", Some("z"));
        assert!(!session.include_types);
        assert!(!session.include_members);
        let reported = session.evaluate(&candidates, &CancellationToken::new(), &sink);
        assert_eq!(reported, 0);
        assert!(hits.lock().unwrap().is_empty());
        assert_eq!(session.filtered().map(<[SymbolRecord]>::len), Some(0));
    }

    #[test]
    fn qualified_pattern_probes_container_names() {
        let candidates = vec![
            contained("draw_frame", "widgets.canvas", SymbolKind::Method),
            record("unrelated", SymbolKind::Method),
        ];
        let (sink, hits) = collecting_sink();
        let mut session = session("widgets.can", None);
        let reported = session.evaluate(&candidates, &CancellationToken::new(), &sink);
        assert_eq!(reported, 1);
        let hits = hits.lock().unwrap();
        assert!(hits[0].qualified_match);
        assert_eq!(hits[0].matched_text, "widgets.canvas");
        assert_eq!(hits[0].symbol.name, "draw_frame");
    }

    #[test]
    fn name_match_wins_over_container_match() {
        let candidates = vec![contained(
            "widgets.theme",
            "widgets.canvas",
            SymbolKind::Property,
        )];
        let (sink, hits) = collecting_sink();
        let mut session = session("widgets.t", None);
        session.evaluate(&candidates, &CancellationToken::new(), &sink);
        let hits = hits.lock().unwrap();
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].qualified_match);
        assert_eq!(hits[0].matched_text, "widgets.theme");
    }

    #[test]
    fn cancellation_mid_scan_marks_session_indeterminate() {
        let candidates: Vec<SymbolRecord> = (0..1000)
            .map(|i| record(&format!("a{i}"), SymbolKind::Class))
            .collect();
        let token = CancellationToken::new();
        let reported = Arc::new(AtomicUsize::new(0));
        let sink: ResultCallback = {
            let token = token.clone();
            let reported = reported.clone();
            Arc::new(move |_hit| {
                if reported.fetch_add(1, Ordering::SeqCst) + 1 == 150 {
                    token.cancel();
                }
            })
        };
        let mut session = session("a", None);
        let count = session.evaluate(&candidates, &token, &sink);
        assert!(count < 1000);
        assert!(session.filtered().is_none());

        let next = SearchSession::new(SearchPattern::parse("a0", None));
        assert!(!session.can_extend(&next));
    }

    #[test]
    fn reuse_requires_prefix_tag_and_mode() {
        let candidates = vec![record("Foo", SymbolKind::Class)];
        let (sink, _hits) = collecting_sink();
        let mut prev = session("Fo", None);
        prev.evaluate(&candidates, &CancellationToken::new(), &sink);

        assert!(prev.can_extend(&session("Foo", None)));
        assert!(!prev.can_extend(&session("Bar", None)));
        assert!(!prev.can_extend(&session("Foo", Some("c"))));
        // Entering qualified mode must rescan the full snapshot.
        assert!(!prev.can_extend(&session("Fo.x", None)));
    }
}
