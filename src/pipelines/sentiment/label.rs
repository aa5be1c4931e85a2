use std::fmt;

/// Canonical sentiment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentCategory {
    /// Favourable feedback.
    Positive,
    /// Unfavourable feedback.
    Negative,
    /// Neither.
    Neutral,
    /// The classifier emitted a label outside the known vocabulary.
    Unknown,
}

impl SentimentCategory {
    /// Display glyph for this category.
    pub fn glyph(self) -> &'static str {
        match self {
            SentimentCategory::Positive => "😊",
            SentimentCategory::Negative => "😢",
            SentimentCategory::Neutral => "😐",
            SentimentCategory::Unknown => "🤔",
        }
    }

    /// Capitalized name, e.g. `"Positive"`.
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentCategory::Positive => "Positive",
            SentimentCategory::Negative => "Negative",
            SentimentCategory::Neutral => "Neutral",
            SentimentCategory::Unknown => "Unknown",
        }
    }

    /// Map a raw classifier label onto a category. Never fails: anything
    /// unrecognized becomes [`SentimentCategory::Unknown`].
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "POSITIVE" => SentimentCategory::Positive,
            "NEGATIVE" => SentimentCategory::Negative,
            "NEUTRAL" => SentimentCategory::Neutral,
            _ => SentimentCategory::Unknown,
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a raw label into its category and glyph.
pub fn normalize(raw_label: &str) -> (SentimentCategory, &'static str) {
    let category = SentimentCategory::from_label(raw_label);
    (category, category.glyph())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_labels_regardless_of_case_and_whitespace() {
        assert_eq!(normalize("positive"), (SentimentCategory::Positive, "😊"));
        assert_eq!(normalize("NEGATIVE"), (SentimentCategory::Negative, "😢"));
        assert_eq!(normalize(" Neutral "), (SentimentCategory::Neutral, "😐"));
        assert_eq!(normalize("\tPoSiTiVe\n"), (SentimentCategory::Positive, "😊"));
    }

    #[test]
    fn unrecognized_labels_fall_back_to_unknown() {
        for raw in ["LABEL_3", "", "   ", "pos", "very positive", "😊"] {
            assert_eq!(normalize(raw), (SentimentCategory::Unknown, "🤔"), "{raw:?}");
        }
    }

    #[test]
    fn display_capitalizes_first_letter_only() {
        assert_eq!(SentimentCategory::Positive.to_string(), "Positive");
        assert_eq!(SentimentCategory::Negative.to_string(), "Negative");
        assert_eq!(SentimentCategory::Neutral.to_string(), "Neutral");
        assert_eq!(SentimentCategory::Unknown.to_string(), "Unknown");
    }
}
