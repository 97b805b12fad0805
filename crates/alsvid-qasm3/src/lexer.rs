//! Lexer for `OpenQASM` 3.

use std::fmt;

use logos::Logos;

fn keyword(lex: &mut logos::Lexer<'_, Token>) -> String {
    lex.slice().to_string()
}

/// Tokens of the supported `OpenQASM` 3 subset.
///
/// Classical keywords outside the subset lex as [`Token::Reserved`] so the
/// parser can reject them by name instead of mistaking them for gate calls.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    #[token("OPENQASM")]
    OpenQasm,

    #[token("include")]
    Include,

    #[token("qubit")]
    Qubit,

    #[token("bit")]
    Bit,

    #[token("qreg")]
    Qreg,

    #[token("creg")]
    Creg,

    #[token("gate")]
    Gate,

    #[token("measure")]
    Measure,

    #[token("reset")]
    Reset,

    #[token("barrier")]
    Barrier,

    #[token("if", keyword)]
    #[token("else", keyword)]
    #[token("for", keyword)]
    #[token("while", keyword)]
    #[token("def", keyword)]
    #[token("return", keyword)]
    #[token("const", keyword)]
    #[token("let", keyword)]
    #[token("int", keyword)]
    #[token("float", keyword)]
    #[token("bool", keyword)]
    #[token("delay", keyword)]
    Reserved(String),

    #[token("pi")]
    #[token("π")]
    Pi,

    #[token("tau")]
    #[token("τ")]
    Tau,

    #[token("euler")]
    #[token("ℇ")]
    Euler,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    Int(u64),

    /// Physical qubit `$n`.
    #[regex(r"\$[0-9]+", |lex| lex.slice()[1..].parse::<u32>().ok())]
    Hardware(u32),

    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("**")]
    Power,

    #[token("=")]
    Assign,

    #[token("->")]
    Arrow,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Reserved(word) | Token::Ident(word) => return f.write_str(word),
            Token::Float(v) => return write!(f, "{v}"),
            Token::Int(v) => return write!(f, "{v}"),
            Token::Hardware(n) => return write!(f, "${n}"),
            Token::Str(s) => return write!(f, "\"{s}\""),
            Token::OpenQasm => "OPENQASM",
            Token::Include => "include",
            Token::Qubit => "qubit",
            Token::Bit => "bit",
            Token::Qreg => "qreg",
            Token::Creg => "creg",
            Token::Gate => "gate",
            Token::Measure => "measure",
            Token::Reset => "reset",
            Token::Barrier => "barrier",
            Token::Pi => "pi",
            Token::Tau => "tau",
            Token::Euler => "euler",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Power => "**",
            Token::Assign => "=",
            Token::Arrow => "->",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Comma => ",",
        };
        f.write_str(text)
    }
}

/// A token and the 1-based line it starts on.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
}

/// Text the lexer could not turn into a token.
#[derive(Debug, Clone)]
pub struct LexError {
    pub position: usize,
    pub line: usize,
    pub message: String,
}

/// Tokenize `source`, stopping at the first unrecognized input.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut scanned = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        line += source[scanned..span.start].matches('\n').count();
        scanned = span.start;
        match result {
            Ok(token) => tokens.push(SpannedToken { token, line }),
            Err(()) => {
                return Err(LexError {
                    position: span.start,
                    line,
                    message: format!("Invalid token: '{}'", lexer.slice()),
                });
            }
        }
    }
    Ok(tokens)
}
