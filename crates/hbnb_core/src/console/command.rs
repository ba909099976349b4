//! Console command parsing.
//!
//! # Responsibility
//! - Turn one input line into a `Command`.
//! - Accept both `verb <Kind> <args>` and `<Kind>.verb(<args>)` forms.
//!
//! # Invariants
//! - Parsing never fails hard; unrecognized input becomes `Command::Unknown`.
//! - Missing arguments are kept as `None` so the dispatcher can report them
//!   in a fixed order.

use crate::model::record::EncodedRecord;
use crate::service::record_service::AttributeInput;
use once_cell::sync::Lazy;
use regex::Regex;

// A bracketed list stays one token so `["a", "b"]` survives as a value.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""((?:[^"\\]|\\.)*)"|(\[[^\]]*\]|\S+)"#).expect("valid token regex")
});
static CALL_ARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)"|([^,\s]+)"#).expect("valid call arg regex"));
static DOT_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\.(\w+)\((.*)\)$").expect("valid dot call regex"));
static DICT_ARGS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*"?([^",]*?)"?\s*,\s*(\{.*\})\s*$"#).expect("valid dict args regex")
});

/// One parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Quit,
    Help(Option<String>),
    Create {
        kind: Option<String>,
    },
    Show {
        kind: Option<String>,
        id: Option<String>,
    },
    Destroy {
        kind: Option<String>,
        id: Option<String>,
    },
    All {
        kind: Option<String>,
    },
    Update {
        kind: Option<String>,
        id: Option<String>,
        attribute: Option<String>,
        value: Option<AttributeInput>,
    },
    UpdateFields {
        kind: String,
        id: String,
        fields: EncodedRecord,
    },
    Count {
        kind: Option<String>,
    },
    /// Dictionary update whose payload is not a JSON object.
    MalformedFields(String),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    fn bare(text: &str) -> Self {
        Self {
            text: text.to_string(),
            quoted: false,
        }
    }
}

/// Parses one console line.
pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    if let Some(captures) = DOT_CALL_RE.captures(trimmed) {
        let kind = &captures[1];
        let verb = &captures[2];
        let args = &captures[3];

        if verb == "update" {
            if let Some(dict) = DICT_ARGS_RE.captures(args) {
                return parse_fields_update(kind, &dict[1], &dict[2]);
            }
        }

        let mut tokens = vec![Token::bare(kind)];
        tokens.extend(tokenize(&CALL_ARG_RE, args));
        return build(verb, tokens).unwrap_or_else(|| Command::Unknown(trimmed.to_string()));
    }

    let mut tokens = tokenize(&TOKEN_RE, trimmed).into_iter();
    let Some(verb) = tokens.next() else {
        return Command::Empty;
    };
    build(&verb.text, tokens.collect()).unwrap_or_else(|| Command::Unknown(trimmed.to_string()))
}

fn build(verb: &str, tokens: Vec<Token>) -> Option<Command> {
    let mut tokens = tokens.into_iter();

    let command = match verb {
        "quit" | "EOF" => Command::Quit,
        "help" => Command::Help(next_text(&mut tokens)),
        "create" => Command::Create {
            kind: next_text(&mut tokens),
        },
        "show" => Command::Show {
            kind: next_text(&mut tokens),
            id: next_text(&mut tokens),
        },
        "destroy" => Command::Destroy {
            kind: next_text(&mut tokens),
            id: next_text(&mut tokens),
        },
        "all" => Command::All {
            kind: next_text(&mut tokens),
        },
        "count" => Command::Count {
            kind: next_text(&mut tokens),
        },
        "update" => Command::Update {
            kind: next_text(&mut tokens),
            id: next_text(&mut tokens),
            attribute: next_text(&mut tokens),
            value: tokens
                .next()
                .map(|token| AttributeInput::new(token.text, token.quoted)),
        },
        _ => return None,
    };
    Some(command)
}

fn next_text(tokens: &mut impl Iterator<Item = Token>) -> Option<String> {
    tokens.next().map(|token| token.text)
}

fn parse_fields_update(kind: &str, id: &str, payload: &str) -> Command {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Object(fields)) => Command::UpdateFields {
            kind: kind.to_string(),
            id: id.trim().to_string(),
            fields,
        },
        _ => Command::MalformedFields(payload.to_string()),
    }
}

fn tokenize(pattern: &Regex, input: &str) -> Vec<Token> {
    pattern
        .captures_iter(input)
        .filter_map(|captures| {
            if let Some(quoted) = captures.get(1) {
                return Some(Token {
                    text: quoted.as_str().replace("\\\"", "\""),
                    quoted: true,
                });
            }
            captures.get(2).map(|bare| Token::bare(bare.as_str()))
        })
        .collect()
}
