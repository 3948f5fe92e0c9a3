//! Diagnostic rendering shared by every phase.
//!
//! Errors implement [`Diagnostic`] and are formatted as
//! `[ErrorKind] Line L, Col C: message`, with the message language selected
//! by [`ErrorLanguage`] (bilingual by default, English first).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorLanguage {
    English,
    Hindi,
    #[default]
    Bilingual,
}

impl ErrorLanguage {
    /// Parse a CLI spelling (`en`, `hi`, `both`).
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "en" | "english" => Some(ErrorLanguage::English),
            "hi" | "hindi" => Some(ErrorLanguage::Hindi),
            "both" | "bilingual" => Some(ErrorLanguage::Bilingual),
            _ => None,
        }
    }
}

/// One reportable error with a position and a bilingual message pair.
pub trait Diagnostic {
    /// Taxonomy name shown in brackets, e.g. `LexerError` or `TypeError`.
    fn kind_label(&self) -> &'static str;

    /// 1-indexed line and, where meaningful, column.
    fn position(&self) -> (usize, Option<usize>);

    fn english_message(&self) -> String;

    fn hindi_message(&self) -> String;
}

pub fn render(diagnostic: &dyn Diagnostic, language: ErrorLanguage) -> String {
    let (line, column) = diagnostic.position();
    let position = match column {
        Some(column) => format!("Line {line}, Col {column}"),
        None => format!("Line {line}"),
    };
    let message = match language {
        ErrorLanguage::English => diagnostic.english_message(),
        ErrorLanguage::Hindi => diagnostic.hindi_message(),
        ErrorLanguage::Bilingual => format!(
            "{} | {}",
            diagnostic.english_message(),
            diagnostic.hindi_message()
        ),
    };
    format!("[{}] {}: {}", diagnostic.kind_label(), position, message)
}

mod impls {
    use super::Diagnostic;
    use crate::analyzer::SemanticError;
    use crate::interpreter::RuntimeError;
    use crate::lexer::LexerError;
    use crate::parser::ParserError;

    impl Diagnostic for LexerError {
        fn kind_label(&self) -> &'static str {
            "LexerError"
        }

        fn position(&self) -> (usize, Option<usize>) {
            let span = self.span();
            (span.line, Some(span.column))
        }

        fn english_message(&self) -> String {
            self.to_string()
        }

        fn hindi_message(&self) -> String {
            LexerError::hindi_message(self)
        }
    }

    impl Diagnostic for ParserError {
        fn kind_label(&self) -> &'static str {
            "ParserError"
        }

        fn position(&self) -> (usize, Option<usize>) {
            let span = self.span();
            (span.line, Some(span.column))
        }

        fn english_message(&self) -> String {
            self.to_string()
        }

        fn hindi_message(&self) -> String {
            ParserError::hindi_message(self)
        }
    }

    impl Diagnostic for SemanticError {
        fn kind_label(&self) -> &'static str {
            SemanticError::kind_label(self)
        }

        fn position(&self) -> (usize, Option<usize>) {
            (self.line(), None)
        }

        fn english_message(&self) -> String {
            self.to_string()
        }

        fn hindi_message(&self) -> String {
            SemanticError::hindi_message(self)
        }
    }

    impl Diagnostic for RuntimeError {
        fn kind_label(&self) -> &'static str {
            RuntimeError::kind_label(self)
        }

        fn position(&self) -> (usize, Option<usize>) {
            (self.line(), None)
        }

        fn english_message(&self) -> String {
            self.to_string()
        }

        fn hindi_message(&self) -> String {
            RuntimeError::hindi_message(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::LexerError;

    #[test]
    fn renders_bilingual_by_default() {
        let error = LexerError::UnexpectedCharacter {
            character: '@',
            line: 3,
            column: 7,
        };
        let line = render(&error, ErrorLanguage::default());
        assert_eq!(
            line,
            "[LexerError] Line 3, Col 7: Unexpected character '@' | अनपेक्षित वर्ण '@'"
        );
    }

    #[test]
    fn renders_single_language_when_asked() {
        let error = LexerError::UnterminatedString { line: 1, column: 2 };
        assert_eq!(
            render(&error, ErrorLanguage::English),
            "[LexerError] Line 1, Col 2: Unterminated string literal"
        );
        assert_eq!(
            render(&error, ErrorLanguage::Hindi),
            "[LexerError] Line 1, Col 2: अधूरी स्ट्रिंग"
        );
    }
}
