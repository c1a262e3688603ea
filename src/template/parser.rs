// src/template/parser.rs

//! Template text parsing
//!
//! Splits template text into literal text and `{{ ... }}` actions. The
//! action language is deliberately small: comments, field references,
//! string literals and calls to registered functions with literal or field
//! arguments.

use crate::error::{Error, Result};
use crate::template::functions::{FunctionTable, TemplateFunction, lookup};

/// A parsed template fragment
#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// Literal text copied to the output
    Text(String),
    /// A value printed as-is
    Value { arg: Arg, line: usize },
    /// A function call expanded to shell lines
    Call {
        function: &'static TemplateFunction,
        args: Vec<Arg>,
        line: usize,
    },
}

/// A function argument or printed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Arg {
    /// A string literal
    Literal(String),
    /// A field reference such as `.Version` or `.Data.prefix`
    Field(Vec<String>),
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Field(Vec<String>),
}

/// Result of lexing one action body
struct Action {
    tokens: Vec<Token>,
    /// Byte length of the action including the closing delimiter
    consumed: usize,
    trim_right: bool,
}

/// Parse template text into nodes, resolving function names against `table`
pub(crate) fn parse(text: &str, table: FunctionTable) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    let mut rest = text;
    let mut line = 1;
    let mut trim_next = false;

    while !rest.is_empty() {
        let Some(open) = rest.find("{{") else {
            push_text(&mut nodes, rest, trim_next, false);
            break;
        };

        let mut body = &rest[open + 2..];
        let trim_left = trims(body);
        push_text(&mut nodes, &rest[..open], trim_next, trim_left);
        line += rest[..open].matches('\n').count();
        if trim_left {
            body = &body[1..];
        }

        let action = lex_action(body, line)?;
        line += body[..action.consumed].matches('\n').count();
        if let Some(node) = build_node(action.tokens, table, line)? {
            nodes.push(node);
        }

        trim_next = action.trim_right;
        rest = &body[action.consumed..];
    }

    Ok(nodes)
}

/// `{{- ` trims whitespace before the action
fn trims(body: &str) -> bool {
    let mut chars = body.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

fn push_text(nodes: &mut Vec<Node>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start();
    }
    if trim_end {
        text = text.trim_end();
    }
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn lex_action(body: &str, line: usize) -> Result<Action> {
    let err = |message: String| Error::Template { line, message };

    let trimmed = body.trim_start();
    if let Some(comment) = trimmed.strip_prefix("/*") {
        let end = comment
            .find("*/")
            .ok_or_else(|| err("unclosed comment".to_string()))?;
        let after = comment[end + 2..].trim_start();
        let (trim_right, close_len) = if after.starts_with("-}}") {
            (true, 3)
        } else if after.starts_with("}}") {
            (false, 2)
        } else {
            return Err(err("comment must be the only content of an action".to_string()));
        };
        let consumed = body.len() - after.len() + close_len;
        return Ok(Action {
            tokens: Vec::new(),
            consumed,
            trim_right,
        });
    }

    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if body[i..].trim_start().starts_with("-}}") {
                    let dash = i + (body[i..].len() - body[i..].trim_start().len());
                    return Ok(Action {
                        tokens,
                        consumed: dash + 3,
                        trim_right: true,
                    });
                }
            }
            '}' if body[i..].starts_with("}}") => {
                return Ok(Action {
                    tokens,
                    consumed: i + 2,
                    trim_right: false,
                });
            }
            '"' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next().map(|(_, c)| c) {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some('\\') => value.push('\\'),
                            Some('"') => value.push('"'),
                            Some(other) => {
                                return Err(err(format!("unknown escape sequence \\{}", other)));
                            }
                            None => break,
                        },
                        '\n' => return Err(err("newline in string literal".to_string())),
                        c => value.push(c),
                    }
                }
                if !closed {
                    return Err(err("unterminated string literal".to_string()));
                }
                tokens.push(Token::Str(value));
            }
            '`' => {
                let start = i + 1;
                let end = body[start..]
                    .find('`')
                    .ok_or_else(|| err("unterminated raw string".to_string()))?;
                tokens.push(Token::Str(body[start..start + end].to_string()));
                while chars.peek().is_some_and(|&(j, _)| j <= start + end) {
                    chars.next();
                }
            }
            '.' => {
                let mut path = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                        path.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if path.is_empty() {
                    return Err(err("the bare '.' value is not supported".to_string()));
                }
                let segments: Vec<String> = path.split('.').map(str::to_string).collect();
                if segments.iter().any(String::is_empty) {
                    return Err(err(format!("malformed field reference .{}", path)));
                }
                tokens.push(Token::Field(segments));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = c.to_string();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            '|' => return Err(err("pipelines are not supported".to_string())),
            '(' | ')' => return Err(err("parenthesized expressions are not supported".to_string())),
            other => return Err(err(format!("unexpected character {:?} in action", other))),
        }
    }

    Err(err("unclosed action".to_string()))
}

fn build_node(tokens: Vec<Token>, table: FunctionTable, line: usize) -> Result<Option<Node>> {
    let mut tokens = tokens.into_iter();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };

    let arg = match first {
        Token::Str(s) => Arg::Literal(s),
        Token::Field(path) => Arg::Field(path),
        Token::Ident(name) => {
            let function = lookup(table, &name).ok_or(Error::UnknownFunction { name, line })?;

            let args = tokens
                .by_ref()
                .map(|token| match token {
                    Token::Str(s) => Ok(Arg::Literal(s)),
                    Token::Field(path) => Ok(Arg::Field(path)),
                    Token::Ident(name) => Err(Error::Template {
                        line,
                        message: format!("nested call to '{}' is not supported", name),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;

            function.check_arity(args.len())?;
            return Ok(Some(Node::Call {
                function,
                args,
                line,
            }));
        }
    };

    if tokens.next().is_some() {
        return Err(Error::Template {
            line,
            message: "unexpected argument after value".to_string(),
        });
    }
    Ok(Some(Node::Value { arg, line }))
}
