//! Command dispatcher.
//!
//! # Responsibility
//! - Execute parsed commands against the record service.
//! - Translate service outcomes into the console's user-facing messages.
//!
//! # Invariants
//! - Argument checks run in a fixed order: kind name, kind existence, id,
//!   record existence, attribute, value.
//! - Storage failures are reported and logged; the session continues.

use crate::console::command::{parse_line, Command};
use crate::model::record::RecordError;
use crate::service::record_service::{RecordService, ServiceError};
use crate::storage::RecordStorage;
use log::error;
use std::io::{self, Write};

pub const CLASS_NAME_MISSING: &str = "** class name missing **";
pub const CLASS_DOESNT_EXIST: &str = "** class doesn't exist **";
pub const INSTANCE_ID_MISSING: &str = "** instance id missing **";
pub const NO_INSTANCE_FOUND: &str = "** no instance found **";
pub const ATTRIBUTE_NAME_MISSING: &str = "** attribute name missing **";
pub const VALUE_MISSING: &str = "** value missing **";
pub const INVALID_DICTIONARY: &str = "** invalid syntax, use a JSON object of attribute values **";

const HELP_TOPICS: &[(&str, &str)] = &[
    ("all", "Prints all records, or all records of one kind: all [<Kind>]"),
    ("count", "Prints the number of records of a kind: count <Kind>"),
    ("create", "Creates a record, saves it and prints its id: create <Kind>"),
    ("destroy", "Deletes a record by kind and id: destroy <Kind> <id>"),
    ("help", "Lists commands, or describes one: help [<command>]"),
    ("quit", "Exits the console (Ctrl-D also works)"),
    ("show", "Prints one record: show <Kind> <id>"),
    (
        "update",
        "Sets one attribute and saves: update <Kind> <id> <attribute> \"<value>\"\n\
         List values are JSON arrays of strings, e.g. [\"a\", \"b\"]",
    ),
];

/// Whether the read-eval loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Console session bound to one service.
pub struct Console<S: RecordStorage> {
    service: RecordService<S>,
}

impl<S: RecordStorage> Console<S> {
    pub fn new(service: RecordService<S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &RecordService<S> {
        &self.service
    }

    pub fn into_service(self) -> RecordService<S> {
        self.service
    }

    /// Parses and executes one input line.
    pub fn execute_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        self.execute(parse_line(line), out)
    }

    /// Executes one parsed command, writing its output lines to `out`.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        match command {
            Command::Empty => {}
            Command::Quit => return Ok(Flow::Quit),
            Command::Help(topic) => write_help(topic.as_deref(), out)?,
            Command::Create { kind } => {
                let Some(kind) = kind else {
                    return line(out, CLASS_NAME_MISSING);
                };
                match self.service.create(&kind) {
                    Ok(id) => writeln!(out, "{id}")?,
                    Err(err) => report(&err, out)?,
                }
            }
            Command::Show { kind, id } => {
                let Some((kind, id)) = self.require_target(kind, id, out)? else {
                    return Ok(Flow::Continue);
                };
                match self.service.show(&kind, &id) {
                    Ok(rendered) => writeln!(out, "{rendered}")?,
                    Err(err) => report(&err, out)?,
                }
            }
            Command::Destroy { kind, id } => {
                let Some((kind, id)) = self.require_target(kind, id, out)? else {
                    return Ok(Flow::Continue);
                };
                if let Err(err) = self.service.destroy(&kind, &id) {
                    report(&err, out)?;
                }
            }
            Command::All { kind } => match self.service.all(kind.as_deref()) {
                Ok(rendered) => writeln!(out, "{}", render_list(&rendered))?,
                Err(err) => report(&err, out)?,
            },
            Command::Update {
                kind,
                id,
                attribute,
                value,
            } => {
                let Some((kind, id)) = self.require_target(kind, id, out)? else {
                    return Ok(Flow::Continue);
                };
                let Some(attribute) = attribute else {
                    return line(out, ATTRIBUTE_NAME_MISSING);
                };
                let Some(value) = value else {
                    return line(out, VALUE_MISSING);
                };
                if let Err(err) = self.service.update(&kind, &id, &attribute, &value) {
                    report(&err, out)?;
                }
            }
            Command::UpdateFields { kind, id, fields } => {
                let Some((kind, id)) = self.require_target(Some(kind), Some(id), out)? else {
                    return Ok(Flow::Continue);
                };
                if let Err(err) = self.service.update_fields(&kind, &id, &fields) {
                    report(&err, out)?;
                }
            }
            Command::Count { kind } => {
                let Some(kind) = kind else {
                    return line(out, CLASS_NAME_MISSING);
                };
                match self.service.count(&kind) {
                    Ok(count) => writeln!(out, "{count}")?,
                    Err(err) => report(&err, out)?,
                }
            }
            Command::MalformedFields(_) => writeln!(out, "{INVALID_DICTIONARY}")?,
            Command::Unknown(input) => writeln!(out, "*** Unknown syntax: {input}")?,
        }
        Ok(Flow::Continue)
    }

    /// Checks kind, id and record existence in order, reporting the first miss.
    fn require_target(
        &self,
        kind: Option<String>,
        id: Option<String>,
        out: &mut impl Write,
    ) -> io::Result<Option<(String, String)>> {
        let Some(kind) = kind else {
            writeln!(out, "{CLASS_NAME_MISSING}")?;
            return Ok(None);
        };
        if let Err(err) = self.service.resolve_kind(&kind) {
            report(&err, out)?;
            return Ok(None);
        }
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            writeln!(out, "{INSTANCE_ID_MISSING}")?;
            return Ok(None);
        };
        if let Err(err) = self.service.find_key(&kind, &id) {
            report(&err, out)?;
            return Ok(None);
        }
        Ok(Some((kind, id)))
    }
}

fn line(out: &mut impl Write, message: &str) -> io::Result<Flow> {
    writeln!(out, "{message}")?;
    Ok(Flow::Continue)
}

fn report(err: &ServiceError, out: &mut impl Write) -> io::Result<()> {
    match err {
        ServiceError::UnknownKind(_) => writeln!(out, "{CLASS_DOESNT_EXIST}"),
        ServiceError::NotFound(_) => writeln!(out, "{NO_INSTANCE_FOUND}"),
        ServiceError::InvalidArgument(RecordError::ReadOnlyField(field)) => {
            writeln!(out, "** attribute {field} is read-only **")
        }
        ServiceError::InvalidArgument(RecordError::InvalidField { field, .. }) => {
            writeln!(out, "** invalid value for {field} **")
        }
        ServiceError::InvalidArgument(other) => writeln!(out, "** {other} **"),
        ServiceError::Storage(storage_err) => {
            error!("event=console_command module=console status=error error={storage_err}");
            writeln!(out, "** storage error: {storage_err} **")
        }
    }
}

/// Bracketed list of double-quoted rendered records.
fn render_list(rendered: &[String]) -> String {
    let items: Vec<String> = rendered.iter().map(|item| format!("\"{item}\"")).collect();
    format!("[{}]", items.join(", "))
}

fn write_help(topic: Option<&str>, out: &mut impl Write) -> io::Result<()> {
    match topic {
        Some(topic) => match HELP_TOPICS.iter().find(|(name, _)| *name == topic) {
            Some((_, text)) => writeln!(out, "{text}"),
            None => writeln!(out, "*** No help on {topic}"),
        },
        None => {
            writeln!(out, "Documented commands (type help <topic>):")?;
            let names: Vec<&str> = HELP_TOPICS.iter().map(|(name, _)| *name).collect();
            writeln!(out, "{}", names.join("  "))
        }
    }
}
