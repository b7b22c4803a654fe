//! `:set`, `:setlocal` and `:setglobal`.
//!
//! Parsing turns a command line into a [`SetCommand`]; executing it against an
//! [`OptionGroup`] for the current view performs the writes through
//! [`OptionGroup::set_value`], so the usual change notifications follow.
//!
//! The command picks the [`AccessScope`] for both reads and writes:
//!
//! - `:set` works on the effective value
//! - `:setlocal` works on the view's local value (reading falls back to global)
//! - `:setglobal` works on the global value
//!
//! # Arguments
//!
//! | argument        | meaning                                          |
//! |-----------------|--------------------------------------------------|
//! | `name`          | switch a toggle on, show any other option        |
//! | `noname`        | switch a toggle off                              |
//! | `invname`, `name!` | invert a toggle                               |
//! | `name&`         | reset to the declared default                    |
//! | `name?`         | show the value                                   |
//! | `name=v`, `name:v` | assign                                        |
//! | `name+=v`       | add to a number, append to a string              |
//! | `name-=v`       | subtract from a number, remove from a string     |
//! | `name^=v`       | multiply a number, prepend to a string           |
//!
//! `no` and `inv` prefixes are resolved at execution time, since only the registry knows
//! whether `number` is an option or `ber` with a prefix.

use crate::{
    error::OptionError,
    group::OptionGroup,
    scope::AccessScope,
    value::{OptionKind, OptionValue},
    view::ViewHandle,
};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetCommandError {
    #[error("not a :set command: {0}")]
    UnknownCommand(String),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("number required after =: {name}={value}")]
    InvalidNumber { name: String, value: String },

    #[error("{0} is not a toggle option")]
    NotAToggle(String),

    #[error("{0} is a toggle option and takes no value")]
    ToggleTakesNoValue(String),

    #[error(transparent)]
    Option(#[from] OptionError),
}

/// Which member of the `:set` family was invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetCommandKind {
    Set,
    SetLocal,
    SetGlobal,
}

impl SetCommandKind {
    /// Match a command name, accepting the same abbreviations Vim does.
    pub fn from_name(name: &str) -> Option<Self> {
        if is_abbreviation(name, "setlocal", 4) {
            Some(SetCommandKind::SetLocal)
        } else if is_abbreviation(name, "setglobal", 4) {
            Some(SetCommandKind::SetGlobal)
        } else if is_abbreviation(name, "set", 2) {
            Some(SetCommandKind::Set)
        } else {
            None
        }
    }

    pub fn access_scope(self, view: ViewHandle) -> AccessScope {
        match self {
            SetCommandKind::Set => AccessScope::Effective(view),
            SetCommandKind::SetLocal => AccessScope::Local(view),
            SetCommandKind::SetGlobal => AccessScope::Global,
        }
    }
}

fn is_abbreviation(input: &str, full: &str, min_len: usize) -> bool {
    input.len() >= min_len && full.starts_with(input)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetOperation {
    /// Plain name, possibly carrying a `no`/`inv` prefix
    Bare,
    Query,
    Invert,
    Reset,
    Assign(String),
    Add(String),
    Subtract(String),
    Prepend(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetArgument {
    pub name: String,
    pub operation: SetOperation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetCommand {
    pub kind: SetCommandKind,
    pub arguments: Vec<SetArgument>,
}

/// Parse a `:set` family command line. The leading `:` is optional.
pub fn parse_set_command(input: &str) -> Result<SetCommand, SetCommandError> {
    let input = input.trim_start().trim_start_matches(':');
    let mut words = input.split_whitespace();
    let command = words.next().unwrap_or_default();
    let kind = SetCommandKind::from_name(command)
        .ok_or_else(|| SetCommandError::UnknownCommand(command.to_string()))?;

    let arguments = words.map(parse_argument).collect::<Result<Vec<_>, _>>()?;
    Ok(SetCommand { kind, arguments })
}

fn parse_argument(word: &str) -> Result<SetArgument, SetCommandError> {
    let (name, operation) = if let Some(split) = word.find(|c: char| c == '=' || c == ':') {
        let (head, raw) = (&word[..split], word[split + 1..].to_string());
        match head.chars().last() {
            Some('+') => (&head[..head.len() - 1], SetOperation::Add(raw)),
            Some('-') => (&head[..head.len() - 1], SetOperation::Subtract(raw)),
            Some('^') => (&head[..head.len() - 1], SetOperation::Prepend(raw)),
            _ => (head, SetOperation::Assign(raw)),
        }
    } else if let Some(name) = word.strip_suffix('?') {
        (name, SetOperation::Query)
    } else if let Some(name) = word.strip_suffix('!') {
        (name, SetOperation::Invert)
    } else if let Some(name) = word.strip_suffix('&') {
        (name, SetOperation::Reset)
    } else {
        (word, SetOperation::Bare)
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SetCommandError::InvalidArgument(word.to_string()));
    }

    Ok(SetArgument {
        name: name.to_string(),
        operation,
    })
}

impl SetCommand {
    /// Run the command for `view`, returning the `(name, value)` pairs it displays.
    ///
    /// Without arguments every option whose value differs from its default is shown.
    /// Arguments are applied in order and execution stops at the first failure; earlier
    /// writes stay in effect.
    pub fn execute(
        &self,
        group: &OptionGroup,
        view: ViewHandle,
    ) -> Result<Vec<(String, OptionValue)>, SetCommandError> {
        let scope = self.kind.access_scope(view);
        let mut shown = Vec::new();

        if self.arguments.is_empty() {
            for name in group.option_names() {
                let value = group.value(&name, scope)?;
                if value != group.declaration(&name)?.default {
                    shown.push((name, value));
                }
            }
            return Ok(shown);
        }

        for argument in &self.arguments {
            if let Some(value) = execute_argument(group, scope, argument)? {
                shown.push(value);
            }
        }
        Ok(shown)
    }
}

fn execute_argument(
    group: &OptionGroup,
    scope: AccessScope,
    argument: &SetArgument,
) -> Result<Option<(String, OptionValue)>, SetCommandError> {
    let name = match argument.operation {
        SetOperation::Bare => return execute_bare(group, scope, &argument.name),
        _ => resolve(group, &argument.name)?,
    };
    let kind = group.declaration(&name)?.kind();
    match &argument.operation {
        SetOperation::Bare | SetOperation::Query => {
            let value = group.value(&name, scope)?;
            return Ok(Some((name, value)));
        }
        SetOperation::Invert => {
            let current = toggle_value(group, &name, scope)?;
            group.set_value(&name, scope, !current)?;
        }
        SetOperation::Reset => group.reset_value(&name, scope)?,
        SetOperation::Assign(raw) => {
            let value = parse_value(&name, kind, raw)?;
            group.set_value(&name, scope, value)?;
        }
        SetOperation::Add(raw) | SetOperation::Subtract(raw) | SetOperation::Prepend(raw) => {
            let operand = parse_value(&name, kind, raw)?;
            let current = group.value(&name, scope)?;
            let value = combine(&argument.operation, current, operand);
            group.set_value(&name, scope, value)?;
        }
    }
    Ok(None)
}

fn execute_bare(
    group: &OptionGroup,
    scope: AccessScope,
    word: &str,
) -> Result<Option<(String, OptionValue)>, SetCommandError> {
    if let Some(name) = group.resolve_name(word) {
        if group.declaration(&name)?.kind() == OptionKind::Toggle {
            group.set_value(&name, scope, true)?;
            return Ok(None);
        }
        let value = group.value(&name, scope)?;
        return Ok(Some((name, value)));
    }

    if let Some(name) = word.strip_prefix("no").and_then(|rest| group.resolve_name(rest)) {
        toggle_value(group, &name, scope)?;
        group.set_value(&name, scope, false)?;
        return Ok(None);
    }

    if let Some(name) = word.strip_prefix("inv").and_then(|rest| group.resolve_name(rest)) {
        let current = toggle_value(group, &name, scope)?;
        group.set_value(&name, scope, !current)?;
        return Ok(None);
    }

    Err(SetCommandError::UnknownOption(word.to_string()))
}

fn resolve(group: &OptionGroup, name: &str) -> Result<String, SetCommandError> {
    group
        .resolve_name(name)
        .ok_or_else(|| SetCommandError::UnknownOption(name.to_string()))
}

/// Current value of a toggle option, failing for other kinds.
fn toggle_value(
    group: &OptionGroup,
    name: &str,
    scope: AccessScope,
) -> Result<bool, SetCommandError> {
    group
        .value(name, scope)?
        .as_bool()
        .ok_or_else(|| SetCommandError::NotAToggle(name.to_string()))
}

fn parse_value(name: &str, kind: OptionKind, raw: &str) -> Result<OptionValue, SetCommandError> {
    match kind {
        OptionKind::Toggle => Err(SetCommandError::ToggleTakesNoValue(name.to_string())),
        OptionKind::Number => raw
            .parse::<i64>()
            .map(OptionValue::Number)
            .map_err(|_| SetCommandError::InvalidNumber {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        OptionKind::String => Ok(OptionValue::String(raw.to_string())),
    }
}

fn combine(operation: &SetOperation, current: OptionValue, operand: OptionValue) -> OptionValue {
    match (operation, current, operand) {
        (SetOperation::Add(_), OptionValue::Number(a), OptionValue::Number(b)) => {
            OptionValue::Number(a.saturating_add(b))
        }
        (SetOperation::Subtract(_), OptionValue::Number(a), OptionValue::Number(b)) => {
            OptionValue::Number(a.saturating_sub(b))
        }
        (SetOperation::Prepend(_), OptionValue::Number(a), OptionValue::Number(b)) => {
            OptionValue::Number(a.saturating_mul(b))
        }
        (SetOperation::Add(_), OptionValue::String(a), OptionValue::String(b)) => {
            OptionValue::String(a + &b)
        }
        (SetOperation::Subtract(_), OptionValue::String(a), OptionValue::String(b)) => {
            OptionValue::String(a.replacen(&b, "", 1))
        }
        (SetOperation::Prepend(_), OptionValue::String(a), OptionValue::String(b)) => {
            OptionValue::String(b + &a)
        }
        (_, current, _) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        declaration::OptionDeclaration,
        scope::DeclaredScope,
        testing::{RecordingListener, TestViews},
    };
    use std::sync::Arc;

    fn setup() -> (Arc<TestViews>, OptionGroup) {
        optscope_log::test();
        let views = Arc::new(TestViews::new());
        let group = OptionGroup::new(views.clone());
        for declaration in [
            OptionDeclaration::new("number", DeclaredScope::LocalToWindow, false)
                .with_abbreviation("nu"),
            OptionDeclaration::new("scrolloff", DeclaredScope::GlobalOrLocalToWindow, 0_i64)
                .with_abbreviation("so"),
            OptionDeclaration::new("matchpairs", DeclaredScope::LocalToBuffer, "(:),{:},[:]")
                .with_abbreviation("mps"),
            OptionDeclaration::new("hlsearch", DeclaredScope::Global, false)
                .with_abbreviation("hls"),
        ] {
            group.add_option(declaration).unwrap();
        }
        (views, group)
    }

    fn run(group: &OptionGroup, view: ViewHandle, line: &str) -> Vec<(String, OptionValue)> {
        parse_set_command(line)
            .unwrap()
            .execute(group, view)
            .unwrap()
    }

    #[test]
    fn parses_command_names() {
        assert_eq!(parse_set_command(":se").unwrap().kind, SetCommandKind::Set);
        assert_eq!(
            parse_set_command("setl nu").unwrap().kind,
            SetCommandKind::SetLocal
        );
        assert_eq!(
            parse_set_command(":setglobal").unwrap().kind,
            SetCommandKind::SetGlobal
        );
        assert_eq!(
            parse_set_command(":s"),
            Err(SetCommandError::UnknownCommand("s".to_string()))
        );
    }

    #[test]
    fn parses_operations() {
        let command = parse_set_command("set so=5 mps+=<:> nu! hls& so? nonu").unwrap();
        let operations: Vec<_> = command
            .arguments
            .iter()
            .map(|arg| (arg.name.as_str(), arg.operation.clone()))
            .collect();
        assert_eq!(
            operations,
            vec![
                ("so", SetOperation::Assign("5".to_string())),
                ("mps", SetOperation::Add("<:>".to_string())),
                ("nu", SetOperation::Invert),
                ("hls", SetOperation::Reset),
                ("so", SetOperation::Query),
                ("nonu", SetOperation::Bare),
            ]
        );
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert_eq!(
            parse_set_command("set =5"),
            Err(SetCommandError::InvalidArgument("=5".to_string()))
        );
        assert!(parse_set_command("set a.b").is_err());
    }

    #[test]
    fn colon_value_assigns() {
        let (views, group) = setup();
        let view = views.open("a.txt");
        run(&group, view, "set so:3");
        assert_eq!(
            group.effective_value("scrolloff", view).unwrap(),
            OptionValue::from(3_i64)
        );
    }

    #[test]
    fn toggles_by_prefix() {
        let (views, group) = setup();
        let view = views.open("a.txt");

        run(&group, view, "set nu");
        assert_eq!(group.effective_value("number", view).unwrap(), OptionValue::from(true));
        run(&group, view, "set nonumber");
        assert_eq!(group.effective_value("number", view).unwrap(), OptionValue::from(false));
        run(&group, view, "set invnu");
        assert_eq!(group.effective_value("number", view).unwrap(), OptionValue::from(true));
        run(&group, view, "set nu!");
        assert_eq!(group.effective_value("number", view).unwrap(), OptionValue::from(false));
    }

    #[test]
    fn bare_non_toggle_is_a_query() {
        let (views, group) = setup();
        let view = views.open("a.txt");
        assert_eq!(
            run(&group, view, "set so"),
            vec![("scrolloff".to_string(), OptionValue::from(0_i64))]
        );
    }

    #[test]
    fn setlocal_only_touches_the_window() {
        let (views, group) = setup();
        let left = views.open("a.txt");
        let right = views.split(left);
        let listener = RecordingListener::new();
        group
            .add_effective_option_value_change_listener("scrolloff", Arc::new(listener.clone()))
            .unwrap();

        run(&group, left, "setlocal so=10");
        assert_eq!(listener.notified(), vec![left]);
        assert_eq!(group.global_value("scrolloff").unwrap(), OptionValue::from(0_i64));
        assert_eq!(
            run(&group, right, "set so?"),
            vec![("scrolloff".to_string(), OptionValue::from(0_i64))]
        );
    }

    #[test]
    fn setglobal_leaves_overrides_alone() {
        let (views, group) = setup();
        let left = views.open("a.txt");
        let right = views.split(left);
        run(&group, left, "setlocal so=10");

        let listener = RecordingListener::new();
        group
            .add_effective_option_value_change_listener("scrolloff", Arc::new(listener.clone()))
            .unwrap();
        run(&group, left, "setglobal so=4");
        assert_eq!(listener.notified(), vec![right]);
        assert_eq!(
            group.effective_value("scrolloff", left).unwrap(),
            OptionValue::from(10_i64)
        );
    }

    #[test]
    fn arithmetic_and_string_edits() {
        let (views, group) = setup();
        let view = views.open("a.txt");

        run(&group, view, "set so=4 so+=3 so^=2 so-=1");
        assert_eq!(
            group.effective_value("scrolloff", view).unwrap(),
            OptionValue::from(13_i64)
        );

        run(&group, view, "set mps+=,<:> mps-=(:), mps^=x");
        assert_eq!(
            group.effective_value("matchpairs", view).unwrap(),
            OptionValue::from("x{:},[:],<:>")
        );
    }

    #[test]
    fn reset_restores_default() {
        let (views, group) = setup();
        let view = views.open("a.txt");
        run(&group, view, "set hls");
        run(&group, view, "set hls&");
        assert_eq!(group.global_value("hlsearch").unwrap(), OptionValue::from(false));
    }

    #[test]
    fn no_arguments_lists_changed_options() {
        let (views, group) = setup();
        let view = views.open("a.txt");
        run(&group, view, "set hls so=2");
        assert_eq!(
            run(&group, view, "set"),
            vec![
                ("hlsearch".to_string(), OptionValue::from(true)),
                ("scrolloff".to_string(), OptionValue::from(2_i64)),
            ]
        );
    }

    #[test]
    fn execution_errors() {
        let (views, group) = setup();
        let view = views.open("a.txt");
        let execute = |line: &str| parse_set_command(line).unwrap().execute(&group, view);

        assert_eq!(
            execute("set bogus"),
            Err(SetCommandError::UnknownOption("bogus".to_string()))
        );
        assert_eq!(
            execute("set noso"),
            Err(SetCommandError::NotAToggle("scrolloff".to_string()))
        );
        assert_eq!(
            execute("set nu=1"),
            Err(SetCommandError::ToggleTakesNoValue("number".to_string()))
        );
        assert_eq!(
            execute("set so=abc"),
            Err(SetCommandError::InvalidNumber {
                name: "scrolloff".to_string(),
                value: "abc".to_string(),
            })
        );
    }
}
