/// 1-indexed source position carried by every token and diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind<'a> {
    Identifier(&'a str),
    Int(i64),
    Float(f64),
    Str(&'a str),

    // Keywords
    Maan,
    Likho,
    LikhoOnline,
    Poocho,
    Agar,
    WarnaAgar,
    Warna,
    JabTak,
    Har,
    Mein,
    Ruk,
    AgeBadho,
    Kaam,
    Wapas,
    Lambda,
    Class,
    Extends,
    Naya,
    Yeh,
    Upar,
    Koshish,
    Pakad,
    Aakhir,
    Uchalo,
    Sach,
    Jhoot,
    Khaali,
    Nahi,
    Aur,
    Ya,
    Lao,

    // Operators
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Percent,   // %
    Assign,    // =
    EqEq,      // ==
    NotEq,     // !=
    Greater,   // >
    Less,      // <
    GreaterEq, // >=
    LessEq,    // <=
    Arrow,     // ->

    // Delimiters
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }
    Comma,    // ,
    Dot,      // .
    Colon,    // :

    EOF,
}

/// Keyword table. These literal spellings are the user-facing contract.
pub(crate) fn keyword(ident: &str) -> Option<TokenKind<'static>> {
    let kind = match ident {
        "maan" => TokenKind::Maan,
        "likho" => TokenKind::Likho,
        "likho_online" => TokenKind::LikhoOnline,
        "poocho" => TokenKind::Poocho,
        "agar" => TokenKind::Agar,
        "warna_agar" => TokenKind::WarnaAgar,
        "warna" => TokenKind::Warna,
        "jab_tak" => TokenKind::JabTak,
        "har" => TokenKind::Har,
        "mein" => TokenKind::Mein,
        "ruk" => TokenKind::Ruk,
        "age_badho" => TokenKind::AgeBadho,
        "kaam" => TokenKind::Kaam,
        "wapas" => TokenKind::Wapas,
        "lambda" => TokenKind::Lambda,
        "class" => TokenKind::Class,
        "extends" => TokenKind::Extends,
        "naya" => TokenKind::Naya,
        "yeh" => TokenKind::Yeh,
        "upar" => TokenKind::Upar,
        "koshish" => TokenKind::Koshish,
        "pakad" => TokenKind::Pakad,
        "aakhir" => TokenKind::Aakhir,
        "uchalo" => TokenKind::Uchalo,
        "sach" => TokenKind::Sach,
        "jhoot" => TokenKind::Jhoot,
        "khaali" => TokenKind::Khaali,
        "nahi" => TokenKind::Nahi,
        "aur" => TokenKind::Aur,
        "ya" => TokenKind::Ya,
        "lao" => TokenKind::Lao,
        _ => return None,
    };
    Some(kind)
}

impl TokenKind<'_> {
    /// Fixed source spelling for keyword/operator/delimiter kinds.
    pub fn lexeme(&self) -> Option<&'static str> {
        let lexeme = match self {
            TokenKind::Maan => "maan",
            TokenKind::Likho => "likho",
            TokenKind::LikhoOnline => "likho_online",
            TokenKind::Poocho => "poocho",
            TokenKind::Agar => "agar",
            TokenKind::WarnaAgar => "warna_agar",
            TokenKind::Warna => "warna",
            TokenKind::JabTak => "jab_tak",
            TokenKind::Har => "har",
            TokenKind::Mein => "mein",
            TokenKind::Ruk => "ruk",
            TokenKind::AgeBadho => "age_badho",
            TokenKind::Kaam => "kaam",
            TokenKind::Wapas => "wapas",
            TokenKind::Lambda => "lambda",
            TokenKind::Class => "class",
            TokenKind::Extends => "extends",
            TokenKind::Naya => "naya",
            TokenKind::Yeh => "yeh",
            TokenKind::Upar => "upar",
            TokenKind::Koshish => "koshish",
            TokenKind::Pakad => "pakad",
            TokenKind::Aakhir => "aakhir",
            TokenKind::Uchalo => "uchalo",
            TokenKind::Sach => "sach",
            TokenKind::Jhoot => "jhoot",
            TokenKind::Khaali => "khaali",
            TokenKind::Nahi => "nahi",
            TokenKind::Aur => "aur",
            TokenKind::Ya => "ya",
            TokenKind::Lao => "lao",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Assign => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Greater => ">",
            TokenKind::Less => "<",
            TokenKind::GreaterEq => ">=",
            TokenKind::LessEq => "<=",
            TokenKind::Arrow => "->",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Identifier(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::EOF => return None,
        };
        Some(lexeme)
    }

    /// Human-readable rendering used in parser diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{name}'"),
            TokenKind::Int(value) => format!("number {value}"),
            TokenKind::Float(value) => format!("number {value}"),
            TokenKind::Str(value) => format!("string \"{value}\""),
            TokenKind::EOF => "end of input".to_string(),
            other => format!(
                "'{}'",
                other
                    .lexeme()
                    .expect("non-literal token kinds have a lexeme")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }
}
