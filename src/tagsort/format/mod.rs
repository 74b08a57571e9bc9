//! # Format Strings
//!
//! Format strings produce file names and folder segments. Text is copied as-is
//! and operators are replaced with values from the file being processed:
//!
//! | Operator                     | Result                                         |
//! |------------------------------|------------------------------------------------|
//! | `/FILE\|`                    | base name, without tags or extension           |
//! | `/EXT\|`                     | extension, including its dot                   |
//! | `/TAGS\|`                    | the raw tag section of the original name       |
//! | `/?TIG\|group/\|`            | the file's first tag belonging to `group`      |
//! | `/?\|cond/T\|yes/F\|no/E?\|` | `yes` if the condition set holds, else `no`    |
//! | `/?T\|tag/\|`                | `tag` if the file carries it                   |
//! | `/?G\|group/\|`              | `group` if any tag belongs to it               |
//! | `/ITER\|… /#\| …/EITER\|`    | only emitted on name collisions, `/#\|` is the occurrence number |
//!
//! Evaluation happens in stages, each a small interpreter over the token
//! stream produced by [`lexer::tokenize`]:
//!
//! 1. [`simplify_to_conditionals`] rewrites the `/?T|` and `/?G|` shorthands
//!    into plain conditionals.
//! 2. [`strip_iters`] or [`evaluate_iters`] resolve the iteration spans.
//! 3. [`substitute_operators`] evaluates everything else against a file.
//!
//! Conditional branches may hold the simple operators and `/?TIG|`, but not
//! another conditional: nested markers come out as literal text.

pub mod lexer;

use crate::error::{Result, TagsortError};
use crate::filter::check_condition_set;
use crate::groups::GroupResolver;
use crate::model::FileRecord;
use lexer::{tokenize, Token};

fn malformed(format: &str, reason: &str) -> TagsortError {
    TagsortError::MalformedFormatString {
        format: format.to_string(),
        reason: reason.to_string(),
    }
}

/// Rewrites `/?T|tag/|` and `/?G|group/|` into the equivalent conditionals.
pub fn simplify_to_conditionals(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    for token in tokenize(format) {
        match token {
            Token::TagCond(tag) => {
                out.push_str(&format!("/?|{tag}/T|{tag}/F|/E?|", tag = tag));
            }
            Token::GroupCond(group) => {
                out.push_str(&format!("/?|/G|{group}/T|{group}/F|/E?|", group = group));
            }
            other => other.push_source(&mut out),
        }
    }
    out
}

enum IterPart<'t, 'a> {
    Plain(Token<'a>),
    Span(&'t [Token<'a>]),
}

/// Groups tokens into iteration spans and everything outside them. A span
/// closes at the first `/EITER|` after its `/ITER|`.
fn iter_parts<'t, 'a>(tokens: &'t [Token<'a>], format: &str) -> Result<Vec<IterPart<'t, 'a>>> {
    let mut parts = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == Token::IterStart {
            let len = tokens[i + 1..]
                .iter()
                .position(|t| *t == Token::IterEnd)
                .ok_or_else(|| malformed(format, "/ITER| without a closing /EITER|"))?;
            parts.push(IterPart::Span(&tokens[i + 1..i + 1 + len]));
            i += len + 2;
        } else {
            parts.push(IterPart::Plain(tokens[i]));
            i += 1;
        }
    }
    Ok(parts)
}

/// Removes every iteration span. A `/#|` left outside a span is an error.
pub fn strip_iters(format: &str) -> Result<String> {
    let tokens = tokenize(format);
    let mut out = String::with_capacity(format.len());
    for part in iter_parts(&tokens, format)? {
        match part {
            IterPart::Plain(Token::Occurrence) => {
                tracing::error!("Occurrence operator outside of /ITER| in \"{}\"", format);
                return Err(TagsortError::OutsideIterOperator(format.to_string()));
            }
            IterPart::Plain(token) => token.push_source(&mut out),
            IterPart::Span(_) => {}
        }
    }
    Ok(out)
}

/// Unwraps every iteration span and writes `occurrence` for each `/#|`.
pub fn evaluate_iters(format: &str, occurrence: u32) -> Result<String> {
    let tokens = tokenize(format);
    let number = occurrence.to_string();
    let mut out = String::with_capacity(format.len() + number.len());
    let push = |token: Token, out: &mut String| match token {
        Token::Occurrence => out.push_str(&number),
        other => other.push_source(out),
    };
    for part in iter_parts(&tokens, format)? {
        match part {
            IterPart::Plain(token) => push(token, &mut out),
            IterPart::Span(inner) => {
                if !inner.contains(&Token::Occurrence) {
                    tracing::warn!(
                        "Format string has an /ITER| operator without /#|, colliding names will stay identical: \"{}\"",
                        format
                    );
                }
                for token in inner {
                    push(*token, &mut out);
                }
            }
        }
    }
    Ok(out)
}

struct Conditional<'t, 'a> {
    condition: String,
    when_true: &'t [Token<'a>],
    when_false: &'t [Token<'a>],
    /// Tokens consumed after the opening marker, closing marker included.
    consumed: usize,
}

impl<'t, 'a> Conditional<'t, 'a> {
    /// Reads a conditional whose `/?|` has already been consumed.
    fn read(tokens: &'t [Token<'a>]) -> Option<Self> {
        let t = tokens.iter().position(|t| *t == Token::True)?;
        let f = t + 1 + tokens[t + 1..].iter().position(|t| *t == Token::False)?;
        let e = f + 1 + tokens[f + 1..].iter().position(|t| *t == Token::CondEnd)?;
        let mut condition = String::new();
        for token in &tokens[..t] {
            token.push_source(&mut condition);
        }
        Some(Self {
            condition,
            when_true: &tokens[t + 1..f],
            when_false: &tokens[f + 1..e],
            consumed: e + 1,
        })
    }
}

fn emit(
    token: &Token<'_>,
    file: &FileRecord,
    resolver: &dyn GroupResolver,
    format: &str,
    out: &mut String,
) -> Result<()> {
    match token {
        Token::Text(text) => out.push_str(text),
        Token::File => out.push_str(&file.base_name),
        Token::Ext => out.push_str(&file.extension),
        Token::Tags => out.push_str(&file.raw_tag_blob),
        Token::TagInGroup(group) => {
            if let Some(tag) = resolver.representative_tag(&file.tags, group) {
                out.push_str(tag);
            }
        }
        Token::IterStart | Token::IterEnd | Token::Occurrence => {
            return Err(malformed(
                format,
                "iteration operators must be resolved before substitution",
            ));
        }
        other => other.push_source(out),
    }
    Ok(())
}

/// Fully evaluates a format string, which must be free of iteration
/// operators, against one file.
pub fn substitute_operators(
    format: &str,
    file: &FileRecord,
    resolver: &dyn GroupResolver,
) -> Result<String> {
    if format.is_empty() {
        tracing::error!("Completely empty format string");
        return Err(TagsortError::EmptyFormatString(String::new()));
    }

    let simplified = simplify_to_conditionals(format);
    let tokens = tokenize(&simplified);
    let mut out = String::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == Token::CondStart {
            let conditional = Conditional::read(&tokens[i + 1..]).ok_or_else(|| {
                malformed(format, "conditional is missing its /T|, /F| or /E?| marker")
            })?;
            let branch = if check_condition_set(&file.tags, &conditional.condition, resolver)? {
                conditional.when_true
            } else {
                conditional.when_false
            };
            for token in branch {
                emit(token, file, resolver, format, &mut out)?;
            }
            i += 1 + conditional.consumed;
        } else {
            emit(&tokens[i], file, resolver, format, &mut out)?;
            i += 1;
        }
    }

    if out.contains('/') {
        tracing::warn!(
            "A \"/\" is still present after evaluating all operators, the format string is probably wrong. Format string: \"{}\", output: \"{}\"",
            format,
            out
        );
    }
    if out.is_empty() {
        tracing::error!("Completely empty format string after operators: \"{}\"", format);
        return Err(TagsortError::EmptyFormatString(format!(
            " after operators: \"{}\"",
            format
        )));
    }
    Ok(out)
}
