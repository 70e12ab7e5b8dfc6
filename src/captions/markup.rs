use regex::Regex;

/// Colors that appear as `<c.color>` open tags in broadcast captions
pub const DEFAULT_COLOR_TAGS: &[&str] = &["white", "magenta", "red", "green", "cyan", "yellow"];

/// Text the broadcaster injects into the caption track
pub const DEFAULT_BOILERPLATE: &[&str] = &["Sous-titrage France Télévisions"];

pub const CLOSING_TAG: &str = "</c>";

/// Removes inline color markup and boilerplate fragments from a caption line.
///
/// Only exact tokens are removed: `<c.{color}>` for the configured colors,
/// the closing `</c>`, and each boilerplate fragment verbatim. Everything
/// else, including surrounding whitespace, is left alone.
#[derive(Debug, Clone)]
pub struct MarkupStripper {
    pattern: Regex,
}

impl MarkupStripper {
    pub fn new<C, B>(colors: &[C], boilerplate: &[B]) -> Result<Self, regex::Error>
    where
        C: AsRef<str>,
        B: AsRef<str>,
    {
        let mut alternatives = vec![regex::escape(CLOSING_TAG)];

        alternatives.extend(
            colors
                .iter()
                .map(|color| color.as_ref().trim())
                .filter(|color| !color.is_empty())
                .map(|color| regex::escape(&format!("<c.{}>", color))),
        );

        // Longest fragments first so overlapping boilerplate is removed whole
        let mut fragments: Vec<&str> = boilerplate
            .iter()
            .map(|fragment| fragment.as_ref())
            .filter(|fragment| !fragment.is_empty())
            .collect();
        fragments.sort_by(|a, b| b.len().cmp(&a.len()));
        alternatives.extend(fragments.into_iter().map(regex::escape));

        let pattern = Regex::new(&alternatives.join("|"))?;

        Ok(Self { pattern })
    }

    /// Stripper for the default color set and boilerplate
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_COLOR_TAGS, DEFAULT_BOILERPLATE)
    }

    /// Strip markup and trim the result
    pub fn clean(&self, line: &str) -> String {
        let mut text = self.pattern.replace_all(line, "").into_owned();
        // "<c.<c.red>cyan>" only reveals "<c.cyan>" after the first pass
        while self.pattern.is_match(&text) {
            text = self.pattern.replace_all(&text, "").into_owned();
        }
        text.trim().to_string()
    }

    /// Whether the line still carries any known token
    pub fn contains_markup(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}
