//! Panic-mode lexer.
//!
//! Bad input never stops the scan: every unexpected character, unterminated
//! string, or malformed number is recorded and lexing resumes, so one run
//! reports every lexical error in the source.

use std::fmt;

use thiserror::Error;

use crate::token::{Span, Token, TokenKind, keyword};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexerError {
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unterminated string literal")]
    UnterminatedString { line: usize, column: usize },
    #[error("Malformed number literal '{literal}'")]
    MalformedNumber {
        literal: String,
        line: usize,
        column: usize,
    },
}

impl LexerError {
    pub fn span(&self) -> Span {
        match self {
            LexerError::UnexpectedCharacter { line, column, .. }
            | LexerError::UnterminatedString { line, column }
            | LexerError::MalformedNumber { line, column, .. } => Span::new(*line, *column),
        }
    }

    pub(crate) fn hindi_message(&self) -> String {
        match self {
            LexerError::UnexpectedCharacter { character, .. } => {
                format!("अनपेक्षित वर्ण '{character}'")
            }
            LexerError::UnterminatedString { .. } => "अधूरी स्ट्रिंग".to_string(),
            LexerError::MalformedNumber { literal, .. } => {
                format!("गलत संख्या '{literal}'")
            }
        }
    }
}

/// All lexical errors of one source, surfaced as a single failure.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerErrorCollection {
    pub errors: Vec<LexerError>,
}

impl fmt::Display for LexerErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let span = error.span();
            write!(f, "Line {}, Col {}: {error}", span.line, span.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for LexerErrorCollection {}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token<'a>>,
    errors: Vec<LexerError>,
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || is_devanagari(c)
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Token<'a>>, Vec<LexerError>) {
        loop {
            self.skip_whitespace_and_comments();
            let span = self.span();
            let Some(ch) = self.peek_char() else {
                self.tokens.push(Token::new(TokenKind::EOF, span));
                return (self.tokens, self.errors);
            };

            if ch.is_ascii_digit() {
                self.read_number(span);
            } else if ch == '"' || ch == '\'' {
                self.read_string(ch, span);
            } else if is_identifier_start(ch) {
                self.read_identifier(span);
            } else if let Some(kind) = self.try_two_char_operator() {
                self.tokens.push(Token::new(kind, span));
            } else if let Some(kind) = self.try_single_char_operator(ch) {
                self.tokens.push(Token::new(kind, span));
            } else {
                self.consume_char();
                self.errors.push(LexerError::UnexpectedCharacter {
                    character: ch,
                    line: span.line,
                    column: span.column,
                });
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.consume_char();
            }
            if self.peek_char() == Some('/') && self.peek_next() == Some('/') {
                while matches!(self.peek_char(), Some(c) if c != '\n') {
                    self.consume_char();
                }
                continue;
            }
            return;
        }
    }

    /// Number literal. One embedded `.` promotes to floating point; a second
    /// `.` is recorded as an error but scanning keeps going and the token is
    /// emitted from the best-effort prefix.
    fn read_number(&mut self, span: Span) {
        let start = self.pos;
        self.consume_digits();

        let mut dots = 0;
        while self.peek_char() == Some('.')
            && matches!(self.peek_next(), Some(c) if c.is_ascii_digit())
        {
            dots += 1;
            self.consume_char();
            self.consume_digits();
        }

        let lexeme = &self.input[start..self.pos];
        let valid_prefix = if dots > 1 {
            self.errors.push(LexerError::MalformedNumber {
                literal: lexeme.to_string(),
                line: span.line,
                column: span.column,
            });
            // Keep the first two dot-separated segments: "1.2.3" scans as 1.2.
            let mut end = lexeme.len();
            let mut seen = 0;
            for (offset, c) in lexeme.char_indices() {
                if c == '.' {
                    seen += 1;
                    if seen == 2 {
                        end = offset;
                        break;
                    }
                }
            }
            &lexeme[..end]
        } else {
            lexeme
        };

        let kind = if valid_prefix.contains('.') {
            match valid_prefix.parse::<f64>() {
                Ok(value) => TokenKind::Float(value),
                Err(_) => {
                    self.errors.push(LexerError::MalformedNumber {
                        literal: lexeme.to_string(),
                        line: span.line,
                        column: span.column,
                    });
                    return;
                }
            }
        } else {
            match valid_prefix.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                Err(_) => {
                    self.errors.push(LexerError::MalformedNumber {
                        literal: lexeme.to_string(),
                        line: span.line,
                        column: span.column,
                    });
                    return;
                }
            }
        };
        self.tokens.push(Token::new(kind, span));
    }

    fn consume_digits(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.consume_char();
        }
    }

    /// String literal delimited by `"` or `'`. A newline or EOF before the
    /// closing quote records one error and leaves the cursor at the newline so
    /// lexing resumes on the next line.
    fn read_string(&mut self, quote: char, span: Span) {
        self.consume_char(); // opening quote
        let content_start = self.pos;
        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    let content = &self.input[content_start..self.pos];
                    self.consume_char();
                    self.tokens.push(Token::new(TokenKind::Str(content), span));
                    return;
                }
                Some('\n') | None => {
                    self.errors.push(LexerError::UnterminatedString {
                        line: span.line,
                        column: span.column,
                    });
                    return;
                }
                Some(_) => {
                    self.consume_char();
                }
            }
        }
    }

    fn read_identifier(&mut self, span: Span) {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) {
            self.consume_char();
        }
        let ident = &self.input[start..self.pos];
        let kind = keyword(ident).unwrap_or(TokenKind::Identifier(ident));
        self.tokens.push(Token::new(kind, span));
    }

    fn try_two_char_operator(&mut self) -> Option<TokenKind<'a>> {
        let kind = match (self.peek_char()?, self.peek_next()?) {
            ('=', '=') => TokenKind::EqEq,
            ('!', '=') => TokenKind::NotEq,
            ('>', '=') => TokenKind::GreaterEq,
            ('<', '=') => TokenKind::LessEq,
            ('-', '>') => TokenKind::Arrow,
            // Synonyms for 'aur' / 'ya'.
            ('&', '&') => TokenKind::Aur,
            ('|', '|') => TokenKind::Ya,
            _ => return None,
        };
        self.consume_char();
        self.consume_char();
        Some(kind)
    }

    fn try_single_char_operator(&mut self, ch: char) -> Option<TokenKind<'a>> {
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Assign,
            '>' => TokenKind::Greater,
            '<' => TokenKind::Less,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            _ => return None,
        };
        self.consume_char();
        Some(kind)
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

/// Scan the full source, returning the token stream and every lexical error.
/// The token stream always ends with an explicit `EOF` token.
pub fn tokenize_safe(input: &str) -> (Vec<Token<'_>>, Vec<LexerError>) {
    Lexer::new(input).run()
}

/// Scan the full source; any lexical error fails the whole phase with the
/// complete error collection.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexerErrorCollection> {
    let (tokens, errors) = tokenize_safe(input);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(LexerErrorCollection { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        let (tokens, errors) = tokenize_safe(input);
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn tokenizes_declaration_and_print() {
        let input = indoc! {r#"
            maan naam = "Duniya"
            likho("Namaste, " + naam + "!")
        "#};
        let expected = vec![
            TokenKind::Maan,
            TokenKind::Identifier("naam"),
            TokenKind::Assign,
            TokenKind::Str("Duniya"),
            TokenKind::Likho,
            TokenKind::LParen,
            TokenKind::Str("Namaste, "),
            TokenKind::Plus,
            TokenKind::Identifier("naam"),
            TokenKind::Plus,
            TokenKind::Str("!"),
            TokenKind::RParen,
            TokenKind::EOF,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn tracks_line_and_column() {
        let (tokens, _) = tokenize_safe("maan x = 5\n  likho(x)");
        assert_eq!(tokens[0].span, Span::new(1, 1));
        assert_eq!(tokens[1].span, Span::new(1, 6));
        assert_eq!(tokens[4].span, Span::new(2, 3));
    }

    #[test]
    fn positions_are_non_decreasing_and_stream_ends_with_eof() {
        let (tokens, _) = tokenize_safe("maan x = @ 5\nlikho(x)");
        let positions = tokens
            .iter()
            .map(|token| (token.line(), token.column()))
            .collect::<Vec<_>>();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::EOF));
    }

    #[test]
    fn records_every_unexpected_character_with_its_column() {
        let (tokens, errors) = tokenize_safe("maan x = 42 @ # ^");
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors[0],
            LexerError::UnexpectedCharacter {
                character: '@',
                line: 1,
                column: 13,
            }
        );
        assert_eq!(
            errors[1],
            LexerError::UnexpectedCharacter {
                character: '#',
                line: 1,
                column: 15,
            }
        );
        assert_eq!(
            errors[2],
            LexerError::UnexpectedCharacter {
                character: '^',
                line: 1,
                column: 17,
            }
        );
        // The good tokens around the bad characters survive.
        assert_eq!(tokens.len(), 5); // maan x = 42 EOF
    }

    #[test]
    fn unterminated_string_is_one_error_and_lexing_continues() {
        let input = indoc! {r#"
            maan x = "abc
            likho(x)
        "#};
        let (tokens, errors) = tokenize_safe(input);
        assert_eq!(
            errors,
            vec![LexerError::UnterminatedString { line: 1, column: 10 }]
        );
        let kinds = tokens.iter().map(|token| token.kind).collect::<Vec<_>>();
        assert!(kinds.contains(&TokenKind::Likho));
    }

    #[test]
    fn second_dot_in_number_is_an_error_with_best_effort_token() {
        let (tokens, errors) = tokenize_safe("maan x = 1.2.3");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            LexerError::MalformedNumber { literal, .. } if literal == "1.2.3"
        ));
        assert_eq!(tokens[3].kind, TokenKind::Float(1.2));
    }

    #[test]
    fn float_and_trailing_dot() {
        assert_eq!(
            kinds("3.25 7."),
            vec![
                TokenKind::Float(3.25),
                TokenKind::Int(7),
                TokenKind::Dot,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn devanagari_identifiers_are_legal() {
        let (tokens, errors) = tokenize_safe("maan संख्या = 5");
        assert!(errors.is_empty());
        assert_eq!(tokens[1].kind, TokenKind::Identifier("संख्या"));
    }

    #[test]
    fn symbolic_logic_operators_alias_aur_and_ya() {
        assert_eq!(
            kinds("sach && jhoot || sach"),
            vec![
                TokenKind::Sach,
                TokenKind::Aur,
                TokenKind::Jhoot,
                TokenKind::Ya,
                TokenKind::Sach,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            kinds("maan x = 1 // yeh ek tippani hai\nlikho(x)"),
            vec![
                TokenKind::Maan,
                TokenKind::Identifier("x"),
                TokenKind::Assign,
                TokenKind::Int(1),
                TokenKind::Likho,
                TokenKind::LParen,
                TokenKind::Identifier("x"),
                TokenKind::RParen,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::EOF]);
    }

    #[test]
    fn tokenize_surfaces_all_errors_as_one_collection() {
        let err = tokenize("maan x = @ ^").expect_err("expected lexical failure");
        assert_eq!(err.errors.len(), 2);
    }
}
