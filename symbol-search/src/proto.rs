use serde::Deserialize;
use serde::Serialize;

/// Tags selecting type declarations. The bare `type` tag covers the
/// whole group; the single-letter tags narrow to one kind.
pub const TYPE_TAGS: &[&str] = &["type", "c", "s", "i", "e", "d"];

/// Tags selecting member declarations, `member` covering the group.
pub const MEMBER_TAGS: &[&str] = &["member", "m", "p", "f", "evt"];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    Constructor,
    Module,
    Indexer,
    Method,
    Property,
    Field,
    Event,
}

/// One declared program entity as produced by a [`crate::source::SymbolSource`].
/// Immutable once aggregated into a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolRecord {
    pub name: String,
    /// Container-qualified name, absent for top-level declarations.
    pub container_name: Option<String>,
    pub kind: SymbolKind,
}

/// A parsed query pattern with its derived search-mode flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPattern {
    pub text: String,
    pub tag: Option<String>,
    /// The pattern contains a qualifying separator, so container-qualified
    /// names are probed as well. A leading separator does not count.
    pub qualified: bool,
    /// The pattern carries a trailing `:<digits>` jump-to-line suffix,
    /// which symbol search does not handle.
    pub line_suffix: bool,
}

impl SearchPattern {
    pub fn parse(text: &str, tag: Option<&str>) -> Self {
        let qualified = text.find('.').is_some_and(|idx| idx > 0);
        let line_suffix = match text.rsplit_once(':') {
            Some((_, suffix)) => {
                !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        };
        Self {
            text: text.to_string(),
            tag: tag.map(str::to_string),
            qualified,
            line_suffix,
        }
    }
}

/// One streamed match, pushed to the result sink as soon as it is found.
/// Emission order is unsorted; presentation ranking is the sink's concern.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchHit {
    /// The text the pattern matched: the bare name, or the container
    /// name for qualified-name matches.
    pub matched_text: String,
    pub rank: i32,
    pub symbol: SymbolRecord,
    pub qualified_match: bool,
}

pub fn tags() -> Vec<&'static str> {
    TYPE_TAGS.iter().chain(MEMBER_TAGS.iter()).copied().collect()
}

pub fn is_valid_tag(tag: &str) -> bool {
    TYPE_TAGS.contains(&tag) || MEMBER_TAGS.contains(&tag)
}

/// Static tag-to-kind mapping, resolved once per search session.
/// Unrecognized tags map to the empty set: such a query narrows to no
/// results rather than failing.
pub fn kinds_for_tag(tag: &str) -> &'static [SymbolKind] {
    match tag {
        "type" => &[
            SymbolKind::Class,
            SymbolKind::Struct,
            SymbolKind::Interface,
            SymbolKind::Enum,
            SymbolKind::Delegate,
        ],
        "c" => &[SymbolKind::Class],
        "s" => &[SymbolKind::Struct],
        "i" => &[SymbolKind::Interface],
        "e" => &[SymbolKind::Enum],
        "d" => &[SymbolKind::Delegate],
        "member" => &[
            SymbolKind::Method,
            SymbolKind::Property,
            SymbolKind::Field,
            SymbolKind::Event,
        ],
        "m" => &[SymbolKind::Method],
        "p" => &[SymbolKind::Property],
        "f" => &[SymbolKind::Field],
        "evt" => &[SymbolKind::Event],
        _ => &[],
    }
}
