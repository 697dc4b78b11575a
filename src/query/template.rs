use std::collections::HashMap;

use crate::{Result, RowkitError};

/// A parsed SQL template.
///
/// `sql` is the positional-parameter rewrite of `template`; `tokens` maps
/// each placeholder name to the ordered 1-based positions it occupies (a
/// name may be used more than once). Parsed once per template string; no
/// caching across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub template: String,
    pub sql: String,
    pub tokens: HashMap<String, Vec<usize>>,
}

impl Query {
    pub fn parse(template: &str) -> Result<Self> {
        let (sql, tokens) = parse_template(template)?;
        Ok(Query {
            template: template.to_string(),
            sql,
            tokens,
        })
    }
}

/// Rewrite a template with named placeholders (`:name` or `@name`) into
/// `?`-positional SQL, collecting the name-to-positions index.
///
/// A doubled start character (`::`, PostgreSQL's cast operator) never opens
/// a token, and a start character not followed by a valid name character is
/// emitted literally.
pub fn parse_template(template: &str) -> Result<(String, HashMap<String, Vec<usize>>)> {
    let trimmed = template.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    let mut sql = String::with_capacity(trimmed.len());
    let mut tokens: HashMap<String, Vec<usize>> = HashMap::new();
    let mut token_index = 0usize;
    let mut name: Option<String> = None;

    for (i, &c) in chars.iter().enumerate() {
        match name.take() {
            Some(mut current) => {
                if is_name_char(c) {
                    current.push(c);
                    name = Some(current);
                } else if is_separator(c) {
                    tokens.entry(current).or_default().push(token_index);
                    sql.push(c);
                } else {
                    return Err(RowkitError::Parse(format!(
                        "'{c}' is not a valid character inside a template token"
                    )));
                }
            }
            None => {
                if is_token_start(c)
                    && (i == 0 || !is_token_start(chars[i - 1]))
                    && matches!(chars.get(i + 1), Some(&next) if is_name_char(next))
                {
                    name = Some(String::new());
                    token_index += 1;
                    sql.push('?');
                } else {
                    sql.push(c);
                }
            }
        }
    }

    // A token still open at end-of-input closes without a separator.
    if let Some(current) = name {
        tokens.entry(current).or_default().push(token_index);
    }

    Ok((sql, tokens))
}

fn is_token_start(c: char) -> bool {
    c == ':' || c == '@'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | ',' | ')' | ';' | '\n' | '\t' | '\r')
}
