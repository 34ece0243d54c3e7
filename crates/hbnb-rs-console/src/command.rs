//! Line parsing for console commands.
//!
//! Two syntaxes are accepted:
//! - `verb [args...]`, where quotes group words (`update User 1 name "Betty H"`)
//!   and `#` and `\` are ordinary characters,
//! - `<Type>.verb(args...)`, e.g. `User.show("1")` or
//!   `User.update("1", {"age": 30})`.

use log::debug;
use serde_json::{Map, Value};

/// Parsed console command. Arguments are raw text; validation happens on dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// `quit` or `EOF`.
    Quit,
    Help(Option<String>),
    Create(Vec<String>),
    Show(Vec<String>),
    Destroy(Vec<String>),
    All(Vec<String>),
    Count(Vec<String>),
    Update(Vec<String>),
    /// Dictionary form of update: `<Type>.update("<id>", {...})`.
    UpdateFrom {
        args: Vec<String>,
        attributes: Map<String, Value>,
    },
    /// Anything that does not parse; carries the input line.
    Unknown(String),
}

/// Parse a single input line.
pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if let Some(command) = parse_dot_call(trimmed) {
        return command;
    }
    verb_command(split_words(trimmed), trimmed)
}

/// Build a command from words that are already split, such as process
/// arguments. A single word may hold a dot call.
pub fn parse_words(words: Vec<String>) -> Command {
    match words.as_slice() {
        [] => return Command::Empty,
        [single] => {
            if let Some(command) = parse_dot_call(single.trim()) {
                return command;
            }
        }
        _ => {}
    }
    let line = words.join(" ");
    verb_command(words, &line)
}

fn verb_command(mut words: Vec<String>, line: &str) -> Command {
    if words.is_empty() {
        return Command::Empty;
    }
    let verb = words.remove(0);
    let args = words;
    match verb.as_str() {
        "quit" | "EOF" => Command::Quit,
        "help" | "?" => Command::Help(args.into_iter().next()),
        "create" => Command::Create(args),
        "show" => Command::Show(args),
        "destroy" => Command::Destroy(args),
        "all" => Command::All(args),
        "count" => Command::Count(args),
        "update" => Command::Update(args),
        _ => Command::Unknown(line.to_string()),
    }
}

/// Quote-grouped split, falling back to whitespace on unbalanced quotes.
fn split_words(line: &str) -> Vec<String> {
    match shell_words::split(&escape_literals(line)) {
        Ok(words) if !words.is_empty() => words,
        Ok(_) => vec![line.to_string()],
        Err(err) => {
            debug!("falling back to whitespace split: {err}");
            line.split_whitespace().map(str::to_string).collect()
        }
    }
}

/// Escape `#` and `\` so the shell splitter keeps them as typed.
///
/// Inside double quotes `\"` still stands for a literal quote. Single-quoted
/// text is already literal and passes through untouched.
fn escape_literals(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('\''), _) => {}
            (Some(_), '\\') if chars.peek() == Some(&'"') => {
                escaped.push(ch);
                if let Some(next) = chars.next() {
                    escaped.push(next);
                }
                continue;
            }
            (Some(_), '\\') => escaped.push('\\'),
            (None, '\'' | '"') => quote = Some(ch),
            (None, '\\' | '#') => escaped.push('\\'),
            _ => {}
        }
        escaped.push(ch);
    }
    escaped
}

/// Parse `<Type>.verb(args)`; `None` when the line is not in that shape.
fn parse_dot_call(line: &str) -> Option<Command> {
    let (kind, rest) = line.split_once('.')?;
    if kind.is_empty() || !kind.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        return None;
    }
    let (verb, rest) = rest.split_once('(')?;
    let inner = rest.strip_suffix(')')?;

    let unknown = || Command::Unknown(line.to_string());
    let mut args = vec![kind.to_string()];
    let command = match verb {
        "all" => Command::All(args),
        "count" => Command::Count(args),
        "show" => {
            args.extend(split_call_args(inner));
            Command::Show(args)
        }
        "destroy" => {
            args.extend(split_call_args(inner));
            Command::Destroy(args)
        }
        "update" => match inner.split_once(',') {
            Some((id, tail)) if tail.trim_start().starts_with('{') => {
                args.extend(split_call_args(id));
                match parse_attribute_map(tail.trim()) {
                    Some(attributes) => Command::UpdateFrom { args, attributes },
                    None => unknown(),
                }
            }
            _ => {
                args.extend(split_call_args(inner));
                Command::Update(args)
            }
        },
        _ => unknown(),
    };
    Some(command)
}

/// Split call arguments on commas outside quotes and strip the quotes.
fn split_call_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in inner.chars() {
        match (quote, ch) {
            (Some(open), ch) if ch == open => {
                quote = None;
                current.push(ch);
            }
            (Some(_), ch) => current.push(ch),
            (None, '"' | '\'') => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, ',') => args.push(std::mem::take(&mut current)),
            (None, ch) => current.push(ch),
        }
    }
    args.push(current);
    args.iter()
        .map(|arg| unquote(arg.trim()).to_string())
        .filter(|arg| !arg.is_empty())
        .collect()
}

fn unquote(arg: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = arg
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    arg
}

/// Parse a JSON object, accepting JSON5 (single quotes) as well.
fn parse_attribute_map(raw: &str) -> Option<Map<String, Value>> {
    let value = serde_json::from_str::<Value>(raw)
        .ok()
        .or_else(|| json5::from_str::<Value>(raw).ok())?;
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
