// Citation Generator
// APA, MLA, Chicago and Harvard reference formatting

use serde::Deserialize;

use crate::models::{CitationRequest, CitationResponse, Engine};
use crate::services::providers::CompletionService;

use super::{ask_model, non_empty};

const CITATION_SYSTEM_PROMPT: &str = r#"You format bibliographic references exactly according to the requested style guide.
Return JSON only: {"citation": "...", "inTextCitation": "..."}"#;

const ANONYMOUS: &str = "Anonymous";
const NO_DATE: &str = "n.d.";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CitationStyle {
    Apa,
    Mla,
    Chicago,
    Harvard,
}

impl CitationStyle {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "mla" => Self::Mla,
            "chicago" => Self::Chicago,
            "harvard" => Self::Harvard,
            _ => Self::Apa,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apa => "apa",
            Self::Mla => "mla",
            Self::Chicago => "chicago",
            Self::Harvard => "harvard",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SourceType {
    Website,
    Book,
    Journal,
}

impl SourceType {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "book" => Self::Book,
            "journal" | "article" => Self::Journal,
            _ => Self::Website,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Name {
    given: Vec<String>,
    family: String,
}

impl Name {
    /// "Jane Q. Smith" or "Smith, Jane Q."
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some((family, given)) = raw.split_once(',') {
            return Some(Self {
                family: family.trim().to_string(),
                given: given.split_whitespace().map(str::to_string).collect(),
            });
        }
        let mut parts: Vec<&str> = raw.split_whitespace().collect();
        let family = parts.pop()?.to_string();
        Some(Self {
            given: parts.into_iter().map(str::to_string).collect(),
            family,
        })
    }

    fn initials(&self, sep: &str) -> String {
        self.given
            .iter()
            .filter_map(|g| g.chars().next())
            .map(|c| format!("{}.", c.to_uppercase()))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// "Smith, J. Q."
    fn inverted_initials(&self, sep: &str) -> String {
        if self.given.is_empty() {
            self.family.clone()
        } else {
            format!("{}, {}", self.family, self.initials(sep))
        }
    }

    /// "Smith, Jane Q."
    fn inverted(&self) -> String {
        if self.given.is_empty() {
            self.family.clone()
        } else {
            format!("{}, {}", self.family, self.given.join(" "))
        }
    }

    /// "Jane Q. Smith"
    fn full(&self) -> String {
        if self.given.is_empty() {
            self.family.clone()
        } else {
            format!("{} {}", self.given.join(" "), self.family)
        }
    }
}

/// Normalized request fields.
struct Source {
    kind: SourceType,
    names: Vec<Name>,
    title: String,
    year: Option<String>,
    publisher: Option<String>,
    journal: Option<String>,
    volume: Option<String>,
    pages: Option<String>,
    url: Option<String>,
    accessed: Option<String>,
}

impl Source {
    fn from_request(req: &CitationRequest) -> Self {
        Self {
            kind: SourceType::from_str(req.source_type.as_deref().unwrap_or("")),
            names: req.authors.iter().filter_map(|a| Name::parse(a)).collect(),
            title: non_empty(req.title.clone()).unwrap_or_else(|| "Untitled".to_string()),
            year: non_empty(req.year.clone()),
            publisher: non_empty(req.publisher.clone()),
            journal: non_empty(req.journal.clone()),
            volume: non_empty(req.volume.clone()),
            pages: non_empty(req.pages.clone()),
            url: non_empty(req.url.clone()),
            accessed: non_empty(req.accessed.clone()),
        }
    }

    fn year_or_nd(&self) -> &str {
        self.year.as_deref().unwrap_or(NO_DATE)
    }

    fn surnames(&self) -> Vec<&str> {
        self.names.iter().map(|n| n.family.as_str()).collect()
    }
}

/// Ensure terminal punctuation without doubling it.
fn terminate(s: &str) -> String {
    let s = s.trim();
    if s.ends_with(|c: char| matches!(c, '.' | '?' | '!')) {
        s.to_string()
    } else {
        format!("{}.", s)
    }
}

fn join_present(items: &[Option<String>], sep: &str) -> Option<String> {
    let present: Vec<&str> = items.iter().flatten().map(String::as_str).collect();
    (!present.is_empty()).then(|| present.join(sep))
}

// ============ Reference list entries ============

fn apa_authors(names: &[Name]) -> String {
    let formatted: Vec<String> = names.iter().map(|n| n.inverted_initials(" ")).collect();
    match formatted.as_slice() {
        [] => ANONYMOUS.to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{}, & {}", init.join(", "), last),
    }
}

fn apa(src: &Source) -> String {
    let mut parts = vec![
        format!("{} ({}).", apa_authors(&src.names), src.year_or_nd()),
        terminate(&src.title),
    ];
    let container = match src.kind {
        SourceType::Journal => join_present(
            &[src.journal.clone(), src.volume.clone(), src.pages.clone()],
            ", ",
        ),
        SourceType::Book | SourceType::Website => src.publisher.clone(),
    };
    if let Some(c) = container {
        parts.push(terminate(&c));
    }
    if let Some(url) = &src.url {
        parts.push(url.clone());
    }
    parts.join(" ")
}

fn mla_authors(names: &[Name]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(only.inverted()),
        [first, second] => Some(format!("{}, and {}", first.inverted(), second.full())),
        [first, ..] => Some(format!("{}, et al", first.inverted())),
    }
}

fn mla(src: &Source) -> String {
    let mut parts = Vec::new();
    if let Some(authors) = mla_authors(&src.names) {
        parts.push(terminate(&authors));
    }
    match src.kind {
        SourceType::Book => {
            parts.push(terminate(&src.title));
            if let Some(c) = join_present(&[src.publisher.clone(), src.year.clone()], ", ") {
                parts.push(terminate(&c));
            }
        }
        SourceType::Journal => {
            parts.push(format!("\"{}\"", terminate(&src.title)));
            let container = join_present(
                &[
                    src.journal.clone(),
                    src.volume.as_ref().map(|v| format!("vol. {}", v)),
                    src.year.clone(),
                    src.pages.as_ref().map(|p| format!("pp. {}", p)),
                ],
                ", ",
            );
            if let Some(c) = container {
                parts.push(terminate(&c));
            }
        }
        SourceType::Website => {
            parts.push(format!("\"{}\"", terminate(&src.title)));
            if let Some(c) = join_present(&[src.publisher.clone(), src.year.clone(), src.url.clone()], ", ") {
                parts.push(terminate(&c));
            }
            if let Some(accessed) = &src.accessed {
                parts.push(format!("Accessed {}.", accessed.trim_end_matches('.')));
            }
        }
    }
    parts.join(" ")
}

fn chicago_authors(names: &[Name]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(only.inverted()),
        [first, rest @ ..] => {
            let (last, middle) = rest.split_last()?;
            let mut out = first.inverted();
            for name in middle {
                out.push_str(", ");
                out.push_str(&name.full());
            }
            out.push_str(", and ");
            out.push_str(&last.full());
            Some(out)
        }
    }
}

fn chicago(src: &Source) -> String {
    let mut parts = Vec::new();
    if let Some(authors) = chicago_authors(&src.names) {
        parts.push(terminate(&authors));
    }
    match src.kind {
        SourceType::Book => {
            parts.push(terminate(&src.title));
            if let Some(c) = join_present(&[src.publisher.clone(), src.year.clone()], ", ") {
                parts.push(terminate(&c));
            }
        }
        SourceType::Journal => {
            parts.push(format!("\"{}\"", terminate(&src.title)));
            let mut container = src.journal.clone().unwrap_or_default();
            if let Some(v) = &src.volume {
                container.push(' ');
                container.push_str(v);
            }
            if let Some(y) = &src.year {
                container.push_str(&format!(" ({})", y));
            }
            if let Some(p) = &src.pages {
                container.push_str(&format!(": {}", p));
            }
            if !container.trim().is_empty() {
                parts.push(terminate(&container));
            }
        }
        SourceType::Website => {
            parts.push(format!("\"{}\"", terminate(&src.title)));
            for field in [&src.publisher, &src.year, &src.url].into_iter().flatten() {
                parts.push(terminate(field));
            }
        }
    }
    parts.join(" ")
}

fn harvard_authors(names: &[Name]) -> String {
    let formatted: Vec<String> = names.iter().map(|n| n.inverted_initials("")).collect();
    match formatted.as_slice() {
        [] => ANONYMOUS.to_string(),
        [only] => only.clone(),
        [a, b] => format!("{} and {}", a, b),
        [a, b, c] => format!("{}, {} and {}", a, b, c),
        [first, ..] => format!("{} et al.", first),
    }
}

fn harvard(src: &Source) -> String {
    let mut parts = vec![format!("{} ({})", harvard_authors(&src.names), src.year_or_nd())];
    match src.kind {
        SourceType::Book => {
            parts.push(terminate(&src.title));
            if let Some(p) = &src.publisher {
                parts.push(terminate(p));
            }
        }
        SourceType::Journal => {
            let body = join_present(
                &[
                    Some(format!("'{}'", src.title)),
                    src.journal.clone(),
                    src.volume.clone(),
                    src.pages.as_ref().map(|p| format!("pp. {}", p)),
                ],
                ", ",
            )
            .unwrap_or_default();
            parts.push(terminate(&body));
        }
        SourceType::Website => {
            parts.push(terminate(&src.title));
            if let Some(url) = &src.url {
                let mut available = format!("Available at: {}", url);
                if let Some(accessed) = &src.accessed {
                    available.push_str(&format!(" (Accessed: {})", accessed));
                }
                parts.push(terminate(&available));
            }
        }
    }
    parts.join(" ")
}

// ============ In-text citations ============

fn in_text(style: CitationStyle, src: &Source) -> String {
    let surnames = src.surnames();
    let amp = if style == CitationStyle::Apa { "&" } else { "and" };
    let who = match surnames.as_slice() {
        [] => ANONYMOUS.to_string(),
        [only] => only.to_string(),
        [a, b] => format!("{} {} {}", a, amp, b),
        [a, b, c] if style == CitationStyle::Chicago => format!("{}, {}, and {}", a, b, c),
        [first, ..] => format!("{} et al.", first),
    };
    match style {
        CitationStyle::Apa | CitationStyle::Harvard => format!("({}, {})", who, src.year_or_nd()),
        CitationStyle::Chicago => format!("({} {})", who, src.year_or_nd()),
        CitationStyle::Mla => match &src.pages {
            Some(pages) => format!("({} {})", who, pages),
            None => format!("({})", who),
        },
    }
}

/// Reference-list entry and in-text citation for `req` in `style`.
pub fn format_citation(req: &CitationRequest, style: CitationStyle) -> (String, String) {
    let src = Source::from_request(req);
    let citation = match style {
        CitationStyle::Apa => apa(&src),
        CitationStyle::Mla => mla(&src),
        CitationStyle::Chicago => chicago(&src),
        CitationStyle::Harvard => harvard(&src),
    };
    (citation, in_text(style, &src))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CitationReply {
    citation: Option<String>,
    in_text_citation: Option<String>,
}

pub async fn generate_citation(completer: Option<&dyn CompletionService>, req: &CitationRequest) -> CitationResponse {
    let style = CitationStyle::from_str(req.style.as_deref().unwrap_or(""));
    let (local_citation, local_in_text) = format_citation(req, style);

    let details = serde_json::to_string_pretty(req).unwrap_or_default();
    let user_prompt = format!("Style: {}\n\nSource details:\n{}", style.as_str(), details);

    if let Some(reply) = ask_model::<CitationReply>(completer, "citation", CITATION_SYSTEM_PROMPT, &user_prompt).await {
        if let Some(citation) = non_empty(reply.citation) {
            return CitationResponse {
                citation,
                in_text_citation: non_empty(reply.in_text_citation).unwrap_or(local_in_text),
                style: style.as_str().to_string(),
                engine: Engine::Model,
            };
        }
    }

    CitationResponse {
        citation: local_citation,
        in_text_citation: local_in_text,
        style: style.as_str().to_string(),
        engine: Engine::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(authors: &[&str]) -> CitationRequest {
        CitationRequest {
            title: Some("The Art of Code".into()),
            source_type: Some("book".into()),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            year: Some("2020".into()),
            publisher: Some("Tech Press".into()),
            ..Default::default()
        }
    }

    fn journal() -> CitationRequest {
        CitationRequest {
            title: Some("Testing Things".into()),
            source_type: Some("journal".into()),
            authors: vec!["Jane Smith".into(), "John Doe".into()],
            year: Some("2019".into()),
            journal: Some("Journal of Tests".into()),
            volume: Some("4".into()),
            pages: Some("10-20".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_parsing() {
        let n = Name::parse("Smith, Jane Q.").unwrap();
        assert_eq!(n.family, "Smith");
        assert_eq!(n.inverted_initials(" "), "Smith, J. Q.");
        assert_eq!(n.full(), "Jane Q. Smith");
        assert_eq!(Name::parse("Plato").unwrap().inverted(), "Plato");
        assert!(Name::parse("  ").is_none());
    }

    #[test]
    fn test_apa_book() {
        let (citation, in_text) = format_citation(&book(&["Jane Smith"]), CitationStyle::Apa);
        assert_eq!(citation, "Smith, J. (2020). The Art of Code. Tech Press.");
        assert_eq!(in_text, "(Smith, 2020)");
    }

    #[test]
    fn test_apa_author_lists() {
        let (citation, in_text) =
            format_citation(&book(&["Jane Smith", "John Doe", "Ann Lee"]), CitationStyle::Apa);
        assert!(citation.starts_with("Smith, J., Doe, J., & Lee, A. (2020)."));
        assert_eq!(in_text, "(Smith et al., 2020)");

        let (_, in_text) = format_citation(&book(&["Jane Smith", "John Doe"]), CitationStyle::Apa);
        assert_eq!(in_text, "(Smith & Doe, 2020)");
    }

    #[test]
    fn test_apa_without_author_or_year() {
        let req = CitationRequest {
            title: Some("Home".into()),
            url: Some("https://x.org".into()),
            ..Default::default()
        };
        let (citation, in_text) = format_citation(&req, CitationStyle::Apa);
        assert_eq!(citation, "Anonymous (n.d.). Home. https://x.org");
        assert_eq!(in_text, "(Anonymous, n.d.)");
    }

    #[test]
    fn test_mla_journal() {
        let (citation, in_text) = format_citation(&journal(), CitationStyle::Mla);
        assert_eq!(
            citation,
            "Smith, Jane, and John Doe. \"Testing Things.\" Journal of Tests, vol. 4, 2019, pp. 10-20."
        );
        assert_eq!(in_text, "(Smith and Doe 10-20)");
    }

    #[test]
    fn test_chicago() {
        let (citation, in_text) = format_citation(&book(&["Jane Smith"]), CitationStyle::Chicago);
        assert_eq!(citation, "Smith, Jane. The Art of Code. Tech Press, 2020.");
        assert_eq!(in_text, "(Smith 2020)");

        let (citation, _) = format_citation(&journal(), CitationStyle::Chicago);
        assert_eq!(
            citation,
            "Smith, Jane, and John Doe. \"Testing Things.\" Journal of Tests 4 (2019): 10-20."
        );
    }

    #[test]
    fn test_harvard_website() {
        let req = CitationRequest {
            title: Some("Title".into()),
            authors: vec!["Jane Smith".into()],
            year: Some("2020".into()),
            url: Some("https://x".into()),
            accessed: Some("1 May 2024".into()),
            ..Default::default()
        };
        let (citation, in_text) = format_citation(&req, CitationStyle::Harvard);
        assert_eq!(citation, "Smith, J. (2020) Title. Available at: https://x (Accessed: 1 May 2024).");
        assert_eq!(in_text, "(Smith, 2020)");
    }

    #[test]
    fn test_title_punctuation_not_doubled() {
        let mut req = book(&["Jane Smith"]);
        req.title = Some("Why Code?".into());
        let (citation, _) = format_citation(&req, CitationStyle::Apa);
        assert!(citation.contains("Why Code? Tech Press."));
    }

    #[tokio::test]
    async fn test_generate_without_model() {
        let mut req = book(&["Jane Smith"]);
        req.style = Some("Harvard".into());
        let resp = generate_citation(None, &req).await;
        assert_eq!(resp.engine, Engine::Local);
        assert_eq!(resp.style, "harvard");
        assert_eq!(resp.citation, "Smith, J. (2020) The Art of Code. Tech Press.");
    }
}
