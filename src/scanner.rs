use anyhow::anyhow;

use crate::ast::{Token, TokenType};

pub struct Scanner {
    source_chars: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: u32,
    col: u32,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source_chars: source.chars().collect(),
            tokens: vec![],
            start: 0,
            current: 0,
            line: 1,
            col: 0,
        }
    }

    pub fn tokens(&self) -> &Vec<Token> {
        &self.tokens
    }

    /// Source text between two char offsets, `end` exclusive and clamped to the source length.
    pub fn source_slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.source_chars.len());
        if start >= end {
            return String::new();
        }
        self.source_chars[start..end].iter().collect()
    }

    fn advance(&mut self) -> char {
        let c = self.source_chars[self.current];
        self.current += 1;
        self.col += 1;
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source_chars.len()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source_chars[self.current]
        }
    }

    fn peek_next_i(&self, i: usize) -> char {
        if self.current + i >= self.source_chars.len() {
            '\0'
        } else {
            self.source_chars[self.current + i]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != expected {
            return false;
        };

        self.current += 1;
        self.col += 1;
        true
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.tokens.push(Token {
            kind: token_type,
            lexeme: self.source_chars[self.start..self.current].iter().collect(),
            line: self.line,
            col: self.col,
            offset: self.start,
        });
    }

    fn current_source_str(&self) -> String {
        self.source_chars[self.start..self.current].iter().collect()
    }

    fn reset(&mut self) {
        self.tokens.clear();
        self.start = 0;
        self.current = 0;
        self.col = 1;
        self.line = 1;
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.col = 1;
    }

    pub fn scan(&mut self) -> anyhow::Result<()> {
        self.reset();
        while self.current < self.source_chars.len() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens.push(Token {
            kind: TokenType::Eof,
            lexeme: String::from("eof"),
            line: self.line,
            col: self.col,
            offset: self.source_chars.len(),
        });

        Ok(())
    }

    /// Scans up to the closing `delimiter`. A doubled delimiter is an escaped one.
    fn scan_delimited(&mut self, delimiter: char, backslash_escapes: bool) -> anyhow::Result<String> {
        let mut content = String::new();
        loop {
            if self.is_at_end() {
                return Err(anyhow!(self.error_str(&format!(
                    "Found unterminated literal delimited by {}",
                    delimiter
                ))));
            }
            let c = self.advance();
            if c == delimiter {
                if self.peek() == delimiter {
                    self.advance();
                    content.push(c);
                    continue;
                }
                break;
            }
            if backslash_escapes && c == '\\' && !self.is_at_end() {
                content.push(c);
                content.push(self.advance());
                continue;
            }
            if c == '\n' {
                self.new_line();
            }
            content.push(c);
        }
        Ok(content)
    }

    fn match_string(&mut self) -> anyhow::Result<()> {
        let content = self.scan_delimited('\'', true)?;
        self.add_token(TokenType::String(content));
        Ok(())
    }

    fn match_quoted_identifier(&mut self, delimiter: char) -> anyhow::Result<()> {
        let content = self.scan_delimited(delimiter, false)?;
        if content.is_empty() {
            return Err(anyhow!(self.error_str("Found empty quoted identifier.")));
        }
        self.add_token(TokenType::QuotedIdentifier(content));
        Ok(())
    }

    fn match_number(&mut self) -> anyhow::Result<()> {
        let mut found_dot = self.source_chars[self.start] == '.';
        let mut found_e = false;
        loop {
            let peek_char = self.peek();

            if peek_char == '.' {
                if found_dot || found_e {
                    return Err(anyhow!(self.error_str("Found invalid number")));
                }
                found_dot = true;
                self.advance();
            } else if peek_char == 'e' || peek_char == 'E' {
                if found_e {
                    return Err(anyhow!(self.error_str("Found invalid number")));
                }
                found_e = true;
                let peek_next_char = self.peek_next_i(1);
                if peek_next_char == '+' || peek_next_char == '-' {
                    self.advance();
                    if !(self.peek_next_i(1).is_ascii_digit()) {
                        return Err(anyhow!(self.error_str("Found invalid number")));
                    }
                    self.advance();
                } else if peek_next_char.is_ascii_digit() {
                    self.advance();
                } else {
                    return Err(anyhow!(self.error_str("Found invalid number")));
                }
            } else if peek_char.is_ascii_digit() {
                self.advance();
            } else {
                self.add_token(TokenType::Number(self.current_source_str()));
                break;
            }
        }

        Ok(())
    }

    fn match_keyword_or_identifier(&mut self) {
        loop {
            let peek_char = self.peek();
            if !(peek_char.is_alphanumeric() || peek_char == '_' || peek_char == '$') {
                break;
            }
            self.advance();
        }
        let identifier = self.current_source_str();

        match identifier.to_lowercase().as_str() {
            "distinct" => self.add_token(TokenType::Distinct),
            "except" => self.add_token(TokenType::Except),
            "from" => self.add_token(TokenType::From),
            "group" => self.add_token(TokenType::Group),
            "having" => self.add_token(TokenType::Having),
            "intersect" => self.add_token(TokenType::Intersect),
            "join" => self.add_token(TokenType::Join),
            "limit" => self.add_token(TokenType::Limit),
            "order" => self.add_token(TokenType::Order),
            "select" => self.add_token(TokenType::Select),
            "union" => self.add_token(TokenType::Union),
            "where" => self.add_token(TokenType::Where),
            "with" => self.add_token(TokenType::With),
            _ => self.add_token(TokenType::Identifier(identifier)),
        }
    }

    // ? is handled by the caller; this covers $1, $name, @name and @@name.
    fn match_parameter(&mut self) {
        self.match_char('@');
        loop {
            let peek_char = self.peek();
            if !(peek_char.is_alphanumeric() || peek_char == '_') {
                break;
            }
            self.advance();
        }
        self.add_token(TokenType::Parameter(self.current_source_str()));
    }

    fn skip_line_comment(&mut self) {
        loop {
            let peek_char = self.peek();
            if peek_char == '\n' || peek_char == '\0' {
                break;
            }
            self.advance();
        }
    }

    fn scan_token(&mut self) -> anyhow::Result<()> {
        let curr_char = self.advance();
        match curr_char {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '[' => self.add_token(TokenType::LeftSquare),
            ']' => self.add_token(TokenType::RightSquare),
            '*' => self.add_token(TokenType::Star),
            ',' => self.add_token(TokenType::Comma),
            ':' => self.add_token(TokenType::Colon),
            ';' => self.add_token(TokenType::Semicolon),
            '%' => self.add_token(TokenType::Percent),
            '.' => {
                if self.peek().is_ascii_digit() {
                    self.match_number()?;
                } else {
                    self.add_token(TokenType::Dot);
                }
            }
            '+' => self.add_token(TokenType::Plus),
            '=' => self.add_token(TokenType::Equal),
            '/' => {
                if self.match_char('*') {
                    loop {
                        if self.is_at_end() {
                            return Err(anyhow!(self.error_str("Found unterminated comment")));
                        }
                        if self.peek() == '*' && self.peek_next_i(1) == '/' {
                            self.advance();
                            self.advance();
                            break;
                        }
                        if self.advance() == '\n' {
                            self.new_line();
                        }
                    }
                } else {
                    self.add_token(TokenType::Slash)
                }
            }
            '#' => self.skip_line_comment(),
            '-' => {
                if self.match_char('-') {
                    self.skip_line_comment();
                } else {
                    self.add_token(TokenType::Minus)
                }
            }
            '<' => {
                if self.match_char('>') {
                    self.add_token(TokenType::NotEqual);
                } else if self.match_char('=') {
                    self.add_token(TokenType::LessEqual);
                } else {
                    self.add_token(TokenType::Less);
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenType::BangEqual);
                } else {
                    self.add_token(TokenType::Bang);
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.add_token(TokenType::GreaterEqual);
                } else {
                    self.add_token(TokenType::Greater);
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.add_token(TokenType::ConcatOperator);
                } else {
                    self.add_token(TokenType::BitwiseOr);
                }
            }
            '~' => self.add_token(TokenType::BitwiseNot),
            '&' => self.add_token(TokenType::BitwiseAnd),
            '^' => self.add_token(TokenType::BitwiseXor),
            '?' => self.add_token(TokenType::Parameter(String::from("?"))),
            '$' | '@' => self.match_parameter(),
            '\n' => {
                self.new_line();
            }
            '\r' | ' ' | '\t' => {}

            '\'' => self.match_string()?,
            '"' | '`' => self.match_quoted_identifier(curr_char)?,

            c if c.is_ascii_digit() => {
                self.match_number()?;
            }

            // Keywords and identifiers
            c if c.is_alphabetic() || c == '_' => {
                self.match_keyword_or_identifier();
            }

            _ => {
                log::debug!(
                    "[line: {}, col: {}] Keeping unexpected character {:?} as a symbol",
                    self.line,
                    self.col,
                    curr_char
                );
                self.add_token(TokenType::Symbol(curr_char.to_string()));
            }
        }
        Ok(())
    }

    fn error_str(&mut self, error: &str) -> String {
        format!(
            "[line: {}, col: {}] Scanner error: {}",
            self.line, self.col, error
        )
    }
}
