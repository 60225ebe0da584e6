use std::path::Path;

use anyhow::anyhow;

use crate::{ast::TokenType, scanner::Scanner};

fn naive_split(sql: &str) -> Vec<String> {
    sql.split_inclusive(';')
        .map(|stmt| stmt.trim())
        .filter(|stmt| !stmt.is_empty() && *stmt != ";")
        .map(|stmt| stmt.to_owned())
        .collect()
}

/// Splits SQL text into statements at `;` tokens, keeping the terminator.
///
/// Semicolons inside strings, quoted identifiers and comments do not split, and
/// comments between statements are dropped. Text that cannot be scanned is split on
/// every `;` instead.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut scanner = Scanner::new(sql);
    if let Err(err) = scanner.scan() {
        log::warn!(
            "Falling back to splitting on every `;` since the SQL could not be scanned: {}",
            err
        );
        return naive_split(sql);
    }

    let mut statements = vec![];
    let mut stmt_start: Option<usize> = None;
    for token in scanner.tokens() {
        match token.kind {
            TokenType::Semicolon => {
                if let Some(start) = stmt_start.take() {
                    statements.push(scanner.source_slice(start, token.offset + 1));
                }
            }
            TokenType::Eof => {
                if let Some(start) = stmt_start.take() {
                    statements.push(scanner.source_slice(start, token.offset).trim_end().to_owned());
                }
            }
            _ => {
                stmt_start.get_or_insert(token.offset);
            }
        }
    }
    statements
}

/// Reads the statements of a `.sql` file, or of every `.sql` file directly inside a
/// directory in file-name order.
pub fn read_statements(path: &Path) -> anyhow::Result<Vec<String>> {
    if !path.is_dir() {
        return read_sql_file(path);
    }

    let mut sql_in_dir: Vec<_> = std::fs::read_dir(path)
        .map_err(|err| anyhow!("Failed to read directory {}: {}", path.display(), err))?
        .filter_map(|res| res.ok())
        .map(|entry| entry.path())
        .filter(|file| file.is_file() && file.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    sql_in_dir.sort();

    if sql_in_dir.is_empty() {
        log::warn!("No .sql files found in {}", path.display());
    }

    let mut statements = vec![];
    for sql_file in sql_in_dir {
        statements.extend(read_sql_file(&sql_file)?);
    }
    Ok(statements)
}

fn read_sql_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let sql = std::fs::read_to_string(path)
        .map_err(|_| anyhow!("Failed to read sql file {}", path.display().to_string()))?;
    let statements = split_statements(&sql);
    log::debug!("Read {} statements from {}", statements.len(), path.display());
    Ok(statements)
}
