//! Phrase-range extraction over the cleaned text.
//!
//! Matching runs over the merged document rather than per paragraph:
//! paragraph breaks are a heuristic of the reassembler, so a phrase may
//! legitimately straddle one.

use crate::error::{CleanFailure, Pdf2TextError};
use crate::pipeline::search::find_ignore_case;
use serde::{Deserialize, Serialize};

/// A pair of literal boundary phrases, matched case-insensitively.
///
/// Only constructed through [`PhraseRange::new`], deserialisation included,
/// so neither phrase is ever blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPhraseRange")]
pub struct PhraseRange {
    start: String,
    end: String,
}

#[derive(Deserialize)]
struct RawPhraseRange {
    start: String,
    end: String,
}

impl TryFrom<RawPhraseRange> for PhraseRange {
    type Error = Pdf2TextError;

    fn try_from(raw: RawPhraseRange) -> Result<Self, Self::Error> {
        PhraseRange::new(raw.start, raw.end)
    }
}

impl PhraseRange {
    /// Both phrases must contain something other than whitespace.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, Pdf2TextError> {
        let (start, end) = (start.into(), end.into());
        if start.trim().is_empty() || end.trim().is_empty() {
            return Err(Pdf2TextError::InvalidConfig(
                "Both the start phrase and the end phrase must be non-empty".into(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Slice `text` from the start phrase through the end of the end phrase.
    ///
    /// The end phrase is searched from the start phrase's first byte, so the
    /// two may overlap (identical phrases yield just that phrase).
    pub fn extract<'t>(&self, text: &'t str) -> Result<&'t str, CleanFailure> {
        let start = find_ignore_case(text, &self.start, 0).ok_or_else(|| {
            CleanFailure::StartPhraseNotFound {
                phrase: self.start.clone(),
            }
        })?;
        let end = find_ignore_case(text, &self.end, start.start).ok_or_else(|| {
            CleanFailure::EndPhraseNotFound {
                phrase: self.end.clone(),
            }
        })?;
        Ok(&text[start.start..end.end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "A. Intro text. B. Middle part. C. End.";

    #[test]
    fn test_extract_inclusive_of_end_phrase() {
        let range = PhraseRange::new("Intro", "Middle").unwrap();
        assert_eq!(range.extract(DOC), Ok("Intro text. B. Middle"));
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let range = PhraseRange::new("intro", "c. END").unwrap();
        assert_eq!(range.extract(DOC), Ok("Intro text. B. Middle part. C. End"));
    }

    #[test]
    fn test_extract_spans_paragraph_break() {
        let doc = "First paragraph ends.\n\nSecond starts here.";
        let range = PhraseRange::new("ends.\n\nSecond", "here").unwrap();
        assert_eq!(range.extract(doc), Ok("ends.\n\nSecond starts here"));
    }

    #[test]
    fn test_extract_cyrillic() {
        let doc = "Предисловие. ГЛАВА ПЕРВАЯ. Текст главы. Глава вторая.";
        let range = PhraseRange::new("глава первая", "ТЕКСТ ГЛАВЫ").unwrap();
        assert_eq!(range.extract(doc), Ok("ГЛАВА ПЕРВАЯ. Текст главы"));
    }

    #[test]
    fn test_end_phrase_before_start_is_not_found() {
        let range = PhraseRange::new("Middle", "Intro").unwrap();
        assert_eq!(
            range.extract(DOC),
            Err(CleanFailure::EndPhraseNotFound {
                phrase: "Intro".into()
            })
        );
    }

    #[test]
    fn test_missing_start_phrase() {
        let range = PhraseRange::new("Epilogue", "End").unwrap();
        assert_eq!(
            range.extract(DOC),
            Err(CleanFailure::StartPhraseNotFound {
                phrase: "Epilogue".into()
            })
        );
    }

    #[test]
    fn test_identical_phrases_yield_the_phrase() {
        let range = PhraseRange::new("Middle", "middle").unwrap();
        assert_eq!(range.extract(DOC), Ok("Middle"));
    }

    #[test]
    fn test_blank_phrases_rejected() {
        assert!(matches!(
            PhraseRange::new("  ", "End"),
            Err(Pdf2TextError::InvalidConfig(_))
        ));
        assert!(PhraseRange::new("Start", "").is_err());
    }

    #[test]
    fn test_deserialize_validates_phrases() {
        let range: PhraseRange =
            serde_json::from_str(r#"{"start":"Intro","end":"Middle"}"#).unwrap();
        assert_eq!(range.start(), "Intro");
        assert_eq!(range.end(), "Middle");

        assert!(serde_json::from_str::<PhraseRange>(r#"{"start":" ","end":"x"}"#).is_err());
        assert!(serde_json::from_str::<PhraseRange>(r#"{"start":"a","end":""}"#).is_err());
    }
}
