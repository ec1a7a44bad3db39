//! Line-oriented operator scripts.
//!
//! One action per line. Blank lines and lines starting with `#` are skipped.
//! Every parse error names its 1-based line.

use std::str::FromStr;
use std::time::Duration;

use modq_core::{Error, ItemId, Result, Status};
use modq_engine::KeyEvent;

/// One operator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Key(KeyEvent),
    Advance(Duration),
    Idle,
    Select(ItemId),
    Deselect(ItemId),
    Toggle(ItemId),
    SelectAll,
    Clear,
    Batch(Status),
    One(ItemId, Status),
    RequestReject(ItemId),
    Confirm,
    Cancel,
    Undo,
    NotificationUndo,
    Dismiss,
    Filter(Status),
    LoadMore,
    Sentinel,
    Open(usize),
    Close,
    Editing(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-based source line.
    pub line: usize,
    pub step: Step,
}

fn arg<'a>(args: &[&'a str], verb: &str) -> Result<&'a str> {
    match args {
        [one] => Ok(one),
        _ => Err(Error::InvalidArgument(format!(
            "`{verb}` takes exactly one argument"
        ))),
    }
}

fn no_args(args: &[&str], verb: &str) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("`{verb}` takes no arguments")))
    }
}

fn parse_num<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::InvalidArgument(format!("not a valid {what}: {raw:?}")))
}

fn parse_toggle(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(Error::InvalidArgument(format!("expected on or off, got {raw:?}"))),
    }
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(Error::InvalidArgument("empty step".into()));
        };
        let args: Vec<&str> = words.collect();
        let step = match verb {
            "key" => Self::Key(arg(&args, verb)?.parse()?),
            "advance" => Self::Advance(Duration::from_millis(parse_num(
                arg(&args, verb)?,
                "millisecond count",
            )?)),
            "idle" => no_args(&args, verb).map(|()| Self::Idle)?,
            "select" => Self::Select(arg(&args, verb)?.parse()?),
            "deselect" => Self::Deselect(arg(&args, verb)?.parse()?),
            "toggle" => Self::Toggle(arg(&args, verb)?.parse()?),
            "select-all" => no_args(&args, verb).map(|()| Self::SelectAll)?,
            "clear" => no_args(&args, verb).map(|()| Self::Clear)?,
            "batch" => Self::Batch(arg(&args, verb)?.parse()?),
            "one" => match args.as_slice() {
                [id, target] => Self::One(id.parse()?, target.parse()?),
                _ => {
                    return Err(Error::InvalidArgument(
                        "`one` takes an item id and a status".into(),
                    ));
                }
            },
            "request-reject" => Self::RequestReject(arg(&args, verb)?.parse()?),
            "confirm" => no_args(&args, verb).map(|()| Self::Confirm)?,
            "cancel" => no_args(&args, verb).map(|()| Self::Cancel)?,
            "undo" => no_args(&args, verb).map(|()| Self::Undo)?,
            "notification-undo" => no_args(&args, verb).map(|()| Self::NotificationUndo)?,
            "dismiss" => no_args(&args, verb).map(|()| Self::Dismiss)?,
            "filter" => Self::Filter(arg(&args, verb)?.parse()?),
            "load-more" => no_args(&args, verb).map(|()| Self::LoadMore)?,
            "sentinel" => no_args(&args, verb).map(|()| Self::Sentinel)?,
            "open" => Self::Open(parse_num(arg(&args, verb)?, "row index")?),
            "close" => no_args(&args, verb).map(|()| Self::Close)?,
            "editing" => Self::Editing(parse_toggle(arg(&args, verb)?)?),
            other => {
                return Err(Error::InvalidArgument(format!("unknown step {other:?}")));
            }
        };
        Ok(step)
    }
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = idx + 1;
        let step = trimmed.parse::<Step>().map_err(|err| match err {
            Error::InvalidArgument(msg) => Error::InvalidArgument(format!("line {line}: {msg}")),
            other => Error::InvalidArgument(format!("line {line}: {other}")),
        })?;
        lines.push(ScriptLine { line, step });
    }
    Ok(lines)
}
