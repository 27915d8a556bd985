//! Keyword matching on record titles.
//!
//! A keyword list is written as free text: keywords are separated by commas
//! or spaces, and a phrase containing separators is enclosed in single or
//! double quotes (`Hidden "Smith's" '. Birthday'`). Matching is a
//! case-sensitive substring test.

/// A parsed keyword list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordsFilter {
    keywords: Vec<String>,
}

impl KeywordsFilter {
    /// Parses a keyword list. Empty items and duplicates are dropped.
    pub fn parse(text: &str) -> Self {
        let mut filter = Self::default();
        let mut quote: Option<char> = None;
        let mut current = String::new();

        for ch in text.chars() {
            match quote {
                Some(open) if ch == open => {
                    filter.push(&mut current);
                    quote = None;
                }
                Some(_) => current.push(ch),
                None if ch == '"' || ch == '\'' => {
                    filter.push(&mut current);
                    quote = Some(ch);
                }
                None if ch == ',' || ch == ' ' => filter.push(&mut current),
                None => current.push(ch),
            }
        }
        filter.push(&mut current);
        filter
    }

    fn push(&mut self, current: &mut String) {
        let keyword = std::mem::take(current);
        if !keyword.is_empty() && !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
    }

    /// Returns the keywords in the order they were written.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns true if the list holds no keyword.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Checks whether any keyword occurs in `text`.
    ///
    /// An empty list answers `match_on_empty`.
    pub fn matched(&self, text: &str, match_on_empty: bool) -> bool {
        if self.keywords.is_empty() {
            return match_on_empty;
        }
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }
}

impl std::fmt::Display for KeywordsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, keyword) in self.keywords.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let quote = if keyword.contains('"') { '\'' } else { '"' };
            write!(f, "{quote}{keyword}{quote}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(text: &str) -> Vec<String> {
        KeywordsFilter::parse(text).keywords().to_vec()
    }

    fn matches(query: &str, text: &str) -> bool {
        KeywordsFilter::parse(query).matched(text, false)
    }

    #[test]
    fn parses_words_and_phrases() {
        assert_eq!(keywords("\"do it\""), vec!["do it"]);
        assert_eq!(keywords("word \"do it\""), vec!["word", "do it"]);
        assert_eq!(
            keywords("Hidden \"Smith's\" '. Birthday'"),
            vec!["Hidden", "Smith's", ". Birthday"]
        );
        assert_eq!(keywords("a,b, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn drops_duplicates_and_empty_items() {
        assert_eq!(keywords("x, x,,  y \"\" x"), vec!["x", "y"]);
        assert!(KeywordsFilter::parse("  , ").is_empty());
    }

    #[test]
    fn unclosed_quote_takes_the_rest() {
        assert_eq!(keywords("a 'b c"), vec!["a", "b c"]);
    }

    #[test]
    fn phrase_matching() {
        assert!(matches("\"do it\"", "Looking for do it"));
        assert!(!matches("\"do it\"", "Looking for it do"));
        assert!(matches("those this that", "a word, that is interesting"));
        assert!(!matches("something other", "a word, that is interesting"));

        let query = "Hidden \"Smith's\" '. Birthday'";
        assert!(matches(query, "Smith. Birthday"));
        assert!(!matches(query, "Smith Birthday"));
        assert!(matches(query, "Smith's Birthday"));
        assert!(matches(query, "Smith Hidden Birthday"));
        assert!(!matches(query, "Smith.Birthday"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!matches("birthday", "Birthday party"));
    }

    #[test]
    fn empty_list_answers_default() {
        let filter = KeywordsFilter::parse("");
        assert!(filter.matched("anything", true));
        assert!(!filter.matched("anything", false));
    }

    #[test]
    fn display_quotes_keywords() {
        let filter = KeywordsFilter::parse("word 'say \"hi\"'");
        assert_eq!(filter.to_string(), "\"word\", 'say \"hi\"'");
    }
}
