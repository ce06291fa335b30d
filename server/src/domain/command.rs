//! Allow-listed actions and their concrete invocations

use crate::error::{Error, Result};

/// Actions exposed by the standard container runtime table
pub const ACTION_PS: &str = "ps";
pub const ACTION_IMAGES: &str = "images";
pub const ACTION_RESTART: &str = "restart";

/// Base invocation for one allowed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    /// Action name callers use
    pub action: String,
    /// Executable to spawn
    pub program: String,
    /// Fixed arguments
    pub args: Vec<String>,
    /// Whether a validated argument may be appended
    pub accepts_argument: bool,
}

impl CommandTemplate {
    pub fn new(action: &str, program: &str, args: &[&str]) -> Self {
        Self {
            action: action.to_string(),
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            accepts_argument: false,
        }
    }

    /// Allow one trailing argument
    pub fn with_argument(mut self) -> Self {
        self.accepts_argument = true;
        self
    }
}

/// The allow-list. Built once and never modified afterwards.
#[derive(Debug, Clone)]
pub struct CommandTable {
    templates: Vec<CommandTemplate>,
}

impl CommandTable {
    pub fn new(templates: Vec<CommandTemplate>) -> Self {
        Self { templates }
    }

    /// Standard `ps`/`images`/`restart` table on top of a runtime invocation
    /// prefix such as `["sudo", "docker"]`.
    pub fn container_runtime(runtime: &[String]) -> Self {
        let (program, prefix) = match runtime.split_first() {
            Some((program, prefix)) => (program.as_str(), prefix),
            None => ("docker", &[][..]),
        };

        let template = |action: &str| {
            let mut args: Vec<&str> = prefix.iter().map(String::as_str).collect();
            args.push(action);
            CommandTemplate::new(action, program, &args)
        };

        Self::new(vec![
            template(ACTION_PS),
            template(ACTION_IMAGES),
            template(ACTION_RESTART).with_argument(),
        ])
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, action: &str) -> Option<&CommandTemplate> {
        self.templates.iter().find(|t| t.action == action)
    }

    pub fn actions(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.action.as_str()).collect()
    }

    /// Turn a request into the argument vector to spawn
    pub fn resolve(&self, request: &InvocationRequest) -> Result<Invocation> {
        let template = self
            .lookup(&request.action)
            .ok_or_else(|| Error::ActionNotAllowed(request.action.clone()))?;

        let mut args = template.args.clone();
        match request.argument.as_deref() {
            Some(argument) if template.accepts_argument => {
                validate_argument(argument)?;
                args.push(argument.to_string());
            }
            Some(_) => return Err(Error::UnexpectedArgument(template.action.clone())),
            None => {}
        }

        Ok(Invocation {
            action: template.action.clone(),
            program: template.program.clone(),
            args,
        })
    }
}

/// A caller's request, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub action: String,
    pub argument: Option<String>,
}

impl InvocationRequest {
    pub fn new(action: impl Into<String>, argument: Option<String>) -> Self {
        Self {
            action: action.into(),
            argument,
        }
    }

    /// Split a raw `"<action> [argument]"` string at its first whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::MissingCommand);
        }

        let (action, rest) = match raw.split_once(char::is_whitespace) {
            Some((action, rest)) => (action, rest.trim()),
            None => (raw, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        Ok(Self::new(action, argument))
    }
}

/// Concrete program and argument vector for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: String,
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Space-joined form, for log lines only. Never executed.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Arguments must match `^[A-Za-z0-9_-]+$` in full.
pub fn validate_argument(argument: &str) -> Result<()> {
    let valid = !argument.is_empty()
        && argument
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument)
    }
}
