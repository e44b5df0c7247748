//! Link and mention extraction plus host canonicalization.

use crate::message::{Message, SpanKind, Update};
use rustc_hash::FxHashSet;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Url,
    TextLink,
    Mention,
}

/// A link or handle exactly as it appears in the message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawReference {
    pub kind: ReferenceKind,
    pub value: String,
}

impl RawReference {
    pub fn new(kind: ReferenceKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Collects every url, text-link and mention of the message body and caption.
pub fn extract(message: &Message) -> FxHashSet<RawReference> {
    let mut refs = FxHashSet::default();
    for annotated in message.texts() {
        for span in &annotated.spans {
            let reference = match &span.kind {
                SpanKind::TextLink { url } => {
                    Some(RawReference::new(ReferenceKind::TextLink, url.clone()))
                }
                SpanKind::Url => span
                    .resolve(&annotated.text)
                    .map(|text| RawReference::new(ReferenceKind::Url, text)),
                SpanKind::Mention => span
                    .resolve(&annotated.text)
                    .map(|text| RawReference::new(ReferenceKind::Mention, text)),
            };
            match reference {
                Some(r) => {
                    debug!("Extracted {:?}: {}", r.kind, r.value);
                    refs.insert(r);
                }
                None => debug!(
                    "Span {:?} at {}+{} does not fit the text, skipping",
                    span.kind, span.offset, span.length
                ),
            }
        }
    }
    refs
}

/// Extracts from the effective message of the update, if any.
pub fn extract_update(update: &Update) -> FxHashSet<RawReference> {
    update
        .effective_message()
        .map(extract)
        .unwrap_or_default()
}

/// Reduces a reference to the string compared against blocklists.
///
/// Links become their authority (`host` or `host:port`), mentions are
/// lowercased. Returns `None` for links that do not parse.
pub fn canonicalize(reference: &RawReference) -> Option<String> {
    match reference.kind {
        ReferenceKind::Mention => Some(reference.value.to_lowercase()),
        ReferenceKind::Url | ReferenceKind::TextLink => host(&reference.value),
    }
}

/// Normalizes a URL-like string and returns its authority.
pub fn host(raw: &str) -> Option<String> {
    let url = parse_with_default_scheme(raw)?;
    let host = url.host_str()?;
    if host.is_empty() {
        return None;
    }
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

fn parse_with_default_scheme(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let candidate = if has_scheme(raw) {
        raw.to_string()
    } else if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("https://{}", raw)
    };
    match Url::parse(&candidate) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!("Dropping unparseable link {:?}: {}", raw, e);
            None
        }
    }
}

/// Whether `raw` starts with `scheme://`. A `://` further along, inside a
/// path, query or fragment, does not count.
fn has_scheme(raw: &str) -> bool {
    let Some(idx) = raw.find("://") else {
        return false;
    };
    let scheme = &raw[..idx];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Canonical references of the update's effective message.
pub fn canonical_references(update: &Update) -> FxHashSet<String> {
    extract_update(update)
        .iter()
        .filter_map(canonicalize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{AnnotatedText, ChatId, MessageId, Span};
    use proptest::prelude::*;

    fn message_with(text: &str, spans: Vec<Span>) -> Message {
        Message::new(ChatId(-100), MessageId(1)).with_body(AnnotatedText::new(text, spans))
    }

    fn span_of(text: &str, needle: &str, kind: SpanKind) -> Span {
        let start = text.find(needle).unwrap();
        let offset = text[..start].encode_utf16().count();
        Span::new(kind, offset, needle.encode_utf16().count())
    }

    #[test]
    fn test_no_spans_no_references() {
        let msg = message_with("just chatting, no links", vec![]);
        assert!(extract(&msg).is_empty());
        assert!(canonical_references(&Update::default()).is_empty());
    }

    #[test]
    fn test_extracts_all_kinds_from_body_and_caption() {
        let text = "see evil.example and ask @Support_Desk";
        let body = AnnotatedText::new(
            text,
            vec![
                span_of(text, "evil.example", SpanKind::Url),
                span_of(text, "@Support_Desk", SpanKind::Mention),
            ],
        );
        let caption = AnnotatedText::new(
            "click",
            vec![Span::new(
                SpanKind::TextLink {
                    url: "https://Hidden.Example/path".into(),
                },
                0,
                5,
            )],
        );
        let msg = Message::new(ChatId(1), MessageId(2))
            .with_body(body)
            .with_caption(caption);

        let refs = extract(&msg);
        assert_eq!(refs.len(), 3);
        assert!(refs.contains(&RawReference::new(ReferenceKind::Url, "evil.example")));
        assert!(refs.contains(&RawReference::new(
            ReferenceKind::Mention,
            "@Support_Desk"
        )));
        assert!(refs.contains(&RawReference::new(
            ReferenceKind::TextLink,
            "https://Hidden.Example/path"
        )));

        let update = Update::new_message(msg);
        let canonical = canonical_references(&update);
        let mut sorted: Vec<_> = canonical.into_iter().collect();
        sorted.sort();
        assert_eq!(
            sorted,
            vec!["@support_desk", "evil.example", "hidden.example"]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let text = "evil.example evil.example";
        let msg = message_with(
            text,
            vec![
                Span::new(SpanKind::Url, 0, 12),
                Span::new(SpanKind::Url, 13, 12),
            ],
        );
        assert_eq!(extract(&msg).len(), 1);
    }

    #[test]
    fn test_only_effective_message_is_scanned() {
        let original = message_with("a.example", vec![Span::new(SpanKind::Url, 0, 9)]);
        let edit = message_with("b.example", vec![Span::new(SpanKind::Url, 0, 9)]);
        let update = Update {
            message: Some(original),
            edited_message: Some(edit),
        };
        let refs = canonical_references(&update);
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("a.example"));
    }

    #[test]
    fn test_host_strips_path_query_fragment() {
        assert_eq!(host("https://evil.example/a").as_deref(), Some("evil.example"));
        assert_eq!(
            host("https://evil.example/b?x=1#frag").as_deref(),
            Some("evil.example")
        );
        assert_eq!(host("evil.example/x/../y").as_deref(), Some("evil.example"));
    }

    #[test]
    fn test_host_normalization() {
        assert_eq!(host("HTTP://Evil.EXAMPLE:80/").as_deref(), Some("evil.example"));
        assert_eq!(host("https://evil.example:443").as_deref(), Some("evil.example"));
        assert_eq!(
            host("https://evil.example:8443/x").as_deref(),
            Some("evil.example:8443")
        );
        assert_eq!(host("//t.me/scam").as_deref(), Some("t.me"));
        assert_eq!(
            host("https://user:pw@evil.example/").as_deref(),
            Some("evil.example")
        );
    }

    #[test]
    fn test_embedded_url_does_not_count_as_scheme() {
        assert_eq!(
            host("evil.example/go?to=https://x").as_deref(),
            Some("evil.example")
        );
        assert_eq!(host("evil.example/#http://x").as_deref(), Some("evil.example"));
        assert_eq!(
            host("Evil.Example:8080/login?next=https://bank.example").as_deref(),
            Some("evil.example:8080")
        );
        assert_eq!(
            host("https://evil.example/go?to=https://x").as_deref(),
            Some("evil.example")
        );
        assert_eq!(host("tg+x.y://resolve").as_deref(), Some("resolve"));
    }

    #[test]
    fn test_malformed_links_are_dropped() {
        assert_eq!(host(""), None);
        assert_eq!(host("http://"), None);
        assert_eq!(host("https://exa mple.com"), None);

        let text = "http:// and good.example";
        let msg = message_with(
            text,
            vec![
                Span::new(SpanKind::Url, 0, 7),
                span_of(text, "good.example", SpanKind::Url),
            ],
        );
        let refs = canonical_references(&Update::new_message(msg));
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("good.example"));
    }

    #[test]
    fn test_mentions_are_only_lowercased() {
        let r = RawReference::new(ReferenceKind::Mention, "@Evil_Bot");
        assert_eq!(canonicalize(&r).as_deref(), Some("@evil_bot"));
    }

    proptest! {
        #[test]
        fn prop_host_is_idempotent(
            label in "[a-zA-Z][a-zA-Z0-9]{0,10}",
            tld in "[a-z]{2,6}",
            path in "(/[a-z0-9]{0,6}){0,3}",
        ) {
            let raw = format!("https://{}.{}{}", label, tld, path);
            let once = host(&raw).unwrap();
            prop_assert_eq!(host(&once), Some(once.clone()));
        }

        #[test]
        fn prop_path_and_query_do_not_matter(
            path_a in "[a-z0-9]{0,8}",
            path_b in "[a-z0-9]{0,8}",
            query in "[a-z]{1,4}=[0-9]{1,3}",
        ) {
            let a = host(&format!("https://evil.example/{}", path_a));
            let b = host(&format!("https://evil.example/{}?{}", path_b, query));
            prop_assert_eq!(a.as_deref(), Some("evil.example"));
            prop_assert_eq!(a, b);
        }
    }
}
