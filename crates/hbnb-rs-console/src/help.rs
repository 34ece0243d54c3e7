//! Help text for console commands and record kinds.

use hbnb_rs_core::ModelType;
use std::io::{self, Write};

const COMMANDS: &[(&str, &str, &str)] = &[
    ("create", "create <Type>", "Create a record, save it and print its id."),
    ("show", "show <Type> <id>", "Print a record."),
    ("destroy", "destroy <Type> <id>", "Delete a record and save."),
    ("all", "all [<Type>]", "Print every record, or every record of one type."),
    ("count", "count <Type>", "Print the number of records of one type."),
    (
        "update",
        "update <Type> <id> <attribute> <value>",
        "Set one attribute and save. Digits become integers, digits with one '.' become floats.",
    ),
    ("help", "help [<command>|<Type>]", "Show help."),
    ("quit", "quit", "Exit the console."),
    ("EOF", "EOF", "Exit the console (end of input)."),
];

pub(crate) fn write_overview<W: Write>(out: &mut W, types: &[String]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Documented commands (type help <topic>):")?;
    writeln!(out, "========================================")?;
    let names: Vec<&str> = COMMANDS.iter().map(|(name, _, _)| *name).collect();
    writeln!(out, "{}", names.join("  "))?;
    writeln!(out)?;
    writeln!(out, "Types: {}", types.join(", "))?;
    writeln!(
        out,
        "Dot syntax: <Type>.all(), <Type>.count(), <Type>.show(\"<id>\"), \
         <Type>.destroy(\"<id>\"), <Type>.update(\"<id>\", \"<attribute>\", \"<value>\"), \
         <Type>.update(\"<id>\", {{...}})"
    )?;
    writeln!(out)
}

pub(crate) fn write_command<W: Write>(out: &mut W, topic: &str) -> io::Result<()> {
    match COMMANDS.iter().find(|(name, _, _)| *name == topic) {
        Some((_, usage, summary)) => {
            writeln!(out, "{summary}")?;
            writeln!(out, "Usage: {usage}")
        }
        None => writeln!(out, "*** No help on {topic}"),
    }
}

pub(crate) fn write_model<W: Write>(out: &mut W, model: &dyn ModelType) -> io::Result<()> {
    writeln!(out, "{}: id, created_at, updated_at", model.name())?;
    if !model.fields().is_empty() {
        writeln!(out, "Fields: {}", model.fields().join(", "))?;
    }
    Ok(())
}
