//! Paragraph reassembly: merge wrapped content lines back into paragraphs.
//!
//! The text layer breaks lines wherever the page layout did, including in the
//! middle of words. Two signals are used to undo that:
//!
//! - **Sentence boundary**: the buffered text ends with `.`, `!` or `?` and
//!   the next line starts with an uppercase letter → new paragraph.
//! - **Hyphenation**: the buffered text ends with a hyphen-class character →
//!   the word was split; drop the hyphen and join without a space.
//!
//! Anything else is a soft wrap and is joined with a single space.

/// Separator between paragraphs (and between pages in per-page mode).
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const SENTENCE_END: [char; 3] = ['.', '!', '?'];

/// ASCII hyphen, soft hyphen, or a dash in U+2010–U+2014.
pub fn is_hyphen_class(c: char) -> bool {
    matches!(c, '-' | '\u{00AD}' | '\u{2010}'..='\u{2014}')
}

/// Accumulates one paragraph at a time; see the module docs for the rules.
#[derive(Debug, Default)]
pub struct ParagraphReassembler {
    buffer: String,
    paragraphs: Vec<String>,
}

impl ParagraphReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one content line (trimmed, non-empty, footnotes stripped).
    pub fn push_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        if self.buffer.is_empty() {
            self.buffer.push_str(line);
            return;
        }

        let starts_sentence = line.chars().next().is_some_and(char::is_uppercase);
        let ends_sentence = self
            .buffer
            .chars()
            .next_back()
            .is_some_and(|c| SENTENCE_END.contains(&c));

        if ends_sentence && starts_sentence {
            self.flush();
            self.buffer.push_str(line);
        } else if self.buffer.chars().next_back().is_some_and(is_hyphen_class) {
            self.buffer.pop();
            self.buffer.push_str(line);
        } else {
            self.buffer.push(' ');
            self.buffer.push_str(line);
        }
    }

    /// Flush the trailing buffer and return the finished paragraphs.
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.paragraphs
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Reassemble a sequence of content lines into paragraphs.
pub fn reassemble<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut reassembler = ParagraphReassembler::new();
    for line in lines {
        reassembler.push_line(line);
    }
    reassembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenated_word_is_rejoined() {
        assert_eq!(reassemble(["exam-", "ple sentence."]), vec!["example sentence."]);
    }

    #[test]
    fn test_unicode_hyphens_are_rejoined() {
        assert_eq!(reassemble(["пере\u{00AD}", "нос"]), vec!["перенос"]);
        assert_eq!(reassemble(["long\u{2010}", "word"]), vec!["longword"]);
        assert_eq!(reassemble(["em\u{2014}", "dash"]), vec!["emdash"]);
        // U+2015 (horizontal bar) is outside the class.
        assert_eq!(reassemble(["bar\u{2015}", "next"]), vec!["bar\u{2015} next"]);
    }

    #[test]
    fn test_sentence_boundary_splits_paragraph() {
        let paragraphs = reassemble(["End of one.", "Next one starts."]);
        assert_eq!(paragraphs, vec!["End of one.", "Next one starts."]);
        assert_eq!(
            paragraphs.join(PARAGRAPH_SEPARATOR),
            "End of one.\n\nNext one starts."
        );
    }

    #[test]
    fn test_soft_wrap_joins_with_space() {
        assert_eq!(
            reassemble(["The society was", "divided into classes."]),
            vec!["The society was divided into classes."]
        );
        // Terminal punctuation but lowercase continuation: still one paragraph.
        assert_eq!(
            reassemble(["See p. 4.", "and further."]),
            vec!["See p. 4. and further."]
        );
    }

    #[test]
    fn test_first_line_has_no_leading_space() {
        let paragraphs = reassemble(["Start here"]);
        assert_eq!(paragraphs, vec!["Start here"]);
    }

    #[test]
    fn test_no_empty_paragraphs() {
        assert!(reassemble(std::iter::empty()).is_empty());
        assert_eq!(reassemble(["", "Text.", ""]), vec!["Text."]);
    }

    #[test]
    fn test_question_and_exclamation_are_boundaries() {
        assert_eq!(
            reassemble(["Why?", "Because!", "Так."]),
            vec!["Why?", "Because!", "Так."]
        );
    }

    #[test]
    fn test_reassembling_output_keeps_content() {
        let first = reassemble(["One para-", "graph here.", "Second one", "continues."]);
        let again = reassemble(first.iter().map(String::as_str));
        assert_eq!(again, first);
    }
}
