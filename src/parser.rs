use anyhow::anyhow;
use strum::IntoDiscriminant;

use crate::ast::{ColumnSpec, JoinFact, StatementKind, TableFact, Token, TokenType, TokenTypeVariant};
use crate::scanner::Scanner;

const SCHEMA_DEFINITION_PREFIX: &str = "CREATE";
const RELATIONSHIP_QUERY_PREFIX: &str = "SELECT";

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Classifies a statement by its leading keyword.
pub fn classify(statement: &str) -> StatementKind {
    let statement = statement.trim_start();
    if starts_with_ignore_case(statement, SCHEMA_DEFINITION_PREFIX) {
        StatementKind::SchemaDefinition
    } else if starts_with_ignore_case(statement, RELATIONSHIP_QUERY_PREFIX) {
        StatementKind::RelationshipQuery
    } else {
        StatementKind::Unrecognized
    }
}

/// Words of the `CREATE [OR REPLACE] [TEMP | TEMPORARY] TABLE [IF NOT EXISTS]` phrase.
struct KeywordCursor<'a> {
    rest: &'a str,
}

impl<'a> KeywordCursor<'a> {
    fn peek_word(&self) -> &'a str {
        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        &self.rest[..end]
    }

    fn match_word(&mut self, word: &str) -> bool {
        let peek = self.peek_word();
        if !peek.is_empty() && peek.eq_ignore_ascii_case(word) {
            self.rest = self.rest[peek.len()..].trim_start();
            true
        } else {
            false
        }
    }

    fn match_words(&mut self, words: &[&str]) -> bool {
        let checkpoint = self.rest;
        for word in words {
            if !self.match_word(word) {
                self.rest = checkpoint;
                return false;
            }
        }
        true
    }
}

fn strip_keyword_phrase(head: &str) -> &str {
    let mut cursor = KeywordCursor {
        rest: head.trim_start(),
    };
    if !cursor.match_word(SCHEMA_DEFINITION_PREFIX) {
        return cursor.rest.trim();
    }
    cursor.match_words(&["OR", "REPLACE"]);
    if !cursor.match_word("TEMPORARY") {
        cursor.match_word("TEMP");
    }
    if cursor.match_word("TABLE") {
        cursor.match_words(&["IF", "NOT", "EXISTS"]);
    }
    cursor.rest.trim()
}

fn strip_identifier_quotes(name: &str) -> &str {
    for quote in ['"', '`'] {
        if name.len() >= 2 && name.starts_with(quote) && name.ends_with(quote) {
            return &name[1..name.len() - 1];
        }
    }
    name
}

/// Splits a column list on top-level commas, leaving `DECIMAL(10,2)` or `'a,b'` intact.
fn split_declarations(body: &str) -> Vec<ColumnSpec> {
    let mut declarations = vec![];
    let mut depth = 0usize;
    let mut in_string = false;
    let mut current = String::new();

    for c in body.chars() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                declarations.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    declarations.push(current);

    declarations
        .iter()
        .map(|decl| decl.trim())
        .filter(|decl| !decl.is_empty())
        .map(ColumnSpec::new)
        .collect()
}

/// Column list of a table body: the text up to the parenthesis closing the first one,
/// or, when it is never closed, everything left after dropping a trailing `);`.
fn table_body(after_paren: &str) -> &str {
    let mut depth = 1usize;
    let mut in_string = false;
    for (idx, c) in after_paren.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return &after_paren[..idx];
                }
            }
            _ => {}
        }
    }
    let body = after_paren.trim_end();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    body.strip_suffix(')').unwrap_or(body)
}

/// Extracts the table name and raw column declarations from a `CREATE TABLE` statement.
///
/// A statement without a parenthesized body yields a table without columns.
pub fn parse_table_fact(statement: &str) -> TableFact {
    let (head, after_paren) = match statement.split_once('(') {
        Some((head, rest)) => (head, Some(rest)),
        None => (statement.trim_end().trim_end_matches(';'), None),
    };

    let name = strip_identifier_quotes(strip_keyword_phrase(head)).to_owned();
    let columns = after_paren
        .map(|rest| split_declarations(table_body(rest)))
        .unwrap_or_default();

    TableFact { name, columns }
}

/// The outermost statement or a parenthesized region of it.
struct Scope {
    is_query: bool,
    in_from: bool,
}

pub struct Parser<'a> {
    source_tokens: &'a Vec<Token>,
    curr: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a Vec<Token>) -> Parser<'a> {
        Self {
            source_tokens: tokens,
            curr: 0,
        }
    }

    fn peek_prev(&self) -> &Token {
        &self.source_tokens[self.curr - 1]
    }

    fn peek(&self) -> &Token {
        &self.source_tokens[self.curr]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            // Do not advance if we peek Eof
            self.curr += 1;
        }
        self.peek_prev()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenType::Eof
    }

    fn check_token_type(&self, token_type: TokenTypeVariant) -> bool {
        self.peek().kind.discriminant() == token_type
    }

    // Whether the token before the one just consumed is of `token_type`.
    fn follows(&self, token_type: TokenTypeVariant) -> bool {
        self.curr >= 2 && self.source_tokens[self.curr - 2].kind.discriminant() == token_type
    }

    fn check_identifier(&self) -> bool {
        self.check_token_type(TokenTypeVariant::Identifier)
            || self.check_token_type(TokenTypeVariant::QuotedIdentifier)
    }

    fn consume_identifier(&mut self) -> anyhow::Result<&Token> {
        self.consume_one_of(&[
            TokenTypeVariant::Identifier,
            TokenTypeVariant::QuotedIdentifier,
        ])
    }

    fn consume_one_of(&mut self, token_types: &[TokenTypeVariant]) -> anyhow::Result<&Token> {
        for token_type in token_types {
            if self.check_token_type(*token_type) {
                return Ok(self.advance());
            }
        }
        let err_msg = token_types
            .iter()
            .map(|el| format!("`{}`", el.variant_str()))
            .collect::<Vec<String>>()
            .join(" or ");
        Err(anyhow!(self.error(
            self.peek(),
            &format!("Expected one of: {}.", err_msg)
        )))
    }

    fn error(&self, token: &Token, message: &str) -> String {
        format!(
            "[line {}, col {}] Error {}: {}",
            token.line,
            token.col,
            &format!("at '{}'", token.lexeme),
            message
        )
    }

    // table_path -> ("Identifier" | "QuotedIdentifier") ("." ("Identifier" | "QuotedIdentifier"))*
    fn parse_table_path(&mut self) -> anyhow::Result<String> {
        let mut path = vec![self.consume_identifier()?.identifier().unwrap_or_default().to_owned()];
        while self.check_token_type(TokenTypeVariant::Dot) {
            self.advance();
            path.push(self.consume_identifier()?.identifier().unwrap_or_default().to_owned());
        }
        Ok(path.join("."))
    }

    // A table reference is the table path right after FROM or JOIN.
    // Anything else there (subqueries, table functions) is skipped.
    fn match_table_reference(&mut self, tables: &mut Vec<String>) -> anyhow::Result<()> {
        if self.check_identifier() {
            tables.push(self.parse_table_path()?);
        } else {
            log::debug!(
                "{}",
                self.error(self.peek(), "Skipping non-table reference.")
            );
        }
        Ok(())
    }

    /// Tables named after FROM and JOIN, in textual order. Empty when there is no FROM.
    ///
    /// Only FROM and JOIN of a query count: inside `EXTRACT(YEAR FROM x)` or after
    /// `IS DISTINCT` they are ignored, while a parenthesized `SELECT` is a query of its own.
    pub fn parse_table_references(&mut self) -> anyhow::Result<Vec<String>> {
        let mut tables = vec![];
        let mut scopes = vec![Scope {
            is_query: true,
            in_from: false,
        }];

        while !self.is_at_end() {
            let token_type = self.advance().kind.discriminant();
            let scope = scopes.len() - 1;
            match token_type {
                TokenTypeVariant::LeftParen => {
                    let is_query = self.check_token_type(TokenTypeVariant::Select)
                        || self.check_token_type(TokenTypeVariant::With);
                    scopes.push(Scope {
                        is_query,
                        in_from: false,
                    });
                }
                TokenTypeVariant::RightParen => {
                    if scopes.len() > 1 {
                        scopes.pop();
                    }
                }
                TokenTypeVariant::From
                    if scopes[scope].is_query && !self.follows(TokenTypeVariant::Distinct) =>
                {
                    scopes[scope].in_from = true;
                    self.match_table_reference(&mut tables)?;
                }
                TokenTypeVariant::Join if scopes[scope].in_from => {
                    self.match_table_reference(&mut tables)?;
                }
                TokenTypeVariant::Where
                | TokenTypeVariant::Group
                | TokenTypeVariant::Having
                | TokenTypeVariant::Order
                | TokenTypeVariant::Limit
                | TokenTypeVariant::Union
                | TokenTypeVariant::Except
                | TokenTypeVariant::Intersect => {
                    scopes[scope].in_from = false;
                }
                _ => {}
            }
        }

        Ok(tables)
    }
}

/// Extracts the tables a `SELECT` statement reads from, following FROM and JOIN clauses.
pub fn parse_join_fact(statement: &str) -> anyhow::Result<JoinFact> {
    log::debug!(
        "Extracting table references from {}",
        statement.chars().take(50).collect::<String>()
    );

    let mut scanner = Scanner::new(statement);
    scanner.scan()?;

    let mut parser = Parser::new(scanner.tokens());
    let tables = parser.parse_table_references()?;
    log::debug!("Table references: {:?}", tables);
    Ok(JoinFact { tables })
}
