//! Command dispatch against a `FileStorage`.

use crate::command::{Command, parse_line};
use crate::help;
use hbnb_rs_core::{AttrValue, FileStorage, RecordError, StorageError, record_key};
use log::{debug, error};
use serde_json::{Map, Value};
use std::io::{self, BufRead, Write};

pub const CLASS_NAME_MISSING: &str = "class name missing";
pub const CLASS_DOESNT_EXIST: &str = "class doesn't exist";
pub const INSTANCE_ID_MISSING: &str = "instance id missing";
pub const NO_INSTANCE_FOUND: &str = "no instance found";
pub const ATTRIBUTE_NAME_MISSING: &str = "attribute name missing";
pub const VALUE_MISSING: &str = "value missing";
pub const ATTRIBUTE_RESERVED: &str = "attribute can't be updated";

/// Whether the session keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Presentation options for a read loop.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Prompt written before each read; `None` for piped input.
    pub prompt: Option<String>,
    /// Echo each command after reading it.
    pub echo: bool,
}

/// Line-oriented front end over a storage engine.
pub struct Console<'a> {
    storage: &'a mut FileStorage,
}

impl<'a> Console<'a> {
    pub fn new(storage: &'a mut FileStorage) -> Self {
        Self { storage }
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut out: W,
        options: &SessionOptions,
    ) -> io::Result<()> {
        let mut buffer = String::new();
        loop {
            if let Some(prompt) = &options.prompt {
                write!(out, "{prompt}")?;
                out.flush()?;
            }
            buffer.clear();
            if input.read_line(&mut buffer)? == 0 {
                if options.prompt.is_some() {
                    writeln!(out)?;
                }
                return Ok(());
            }
            let line = buffer.trim_end_matches(['\r', '\n']);
            if options.echo {
                writeln!(out, "{line}")?;
            }
            if self.execute(line, &mut out)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Parse and run a single line, writing any output to `out`.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        self.dispatch(parse_line(line), out)
    }

    /// Run an already parsed command.
    pub fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        debug!("dispatching command: {command:?}");
        match command {
            Command::Empty => {}
            Command::Quit => return Ok(Flow::Exit),
            Command::Help(topic) => self.help(topic.as_deref(), out)?,
            Command::Create(args) => self.create(&args, out)?,
            Command::Show(args) => self.show(&args, out)?,
            Command::Destroy(args) => self.destroy(&args, out)?,
            Command::All(args) => self.all(&args, out)?,
            Command::Count(args) => self.count(&args, out)?,
            Command::Update(args) => self.update(&args, out)?,
            Command::UpdateFrom { args, attributes } => {
                self.update_from(&args, &attributes, out)?
            }
            Command::Unknown(line) => writeln!(out, "*** Unknown syntax: {line}")?,
        }
        Ok(Flow::Continue)
    }

    fn create<W: Write>(&mut self, args: &[String], out: &mut W) -> io::Result<()> {
        let Some(kind) = self.resolve_kind(args, out)? else {
            return Ok(());
        };
        let (key, id) = match self.storage.create(kind) {
            Ok(record) => (record.key(), record.id().to_string()),
            Err(err) => return report(out, &err),
        };
        if let Err(err) = self.storage.save() {
            // Roll back: the id was never printed.
            self.storage.all_mut().shift_remove(&key);
            return report(out, &err);
        }
        writeln!(out, "{id}")
    }

    fn show<W: Write>(&mut self, args: &[String], out: &mut W) -> io::Result<()> {
        let Some(key) = self.resolve_key(args, out)? else {
            return Ok(());
        };
        match self.storage.all().get(&key) {
            Some(record) => writeln!(out, "{record}"),
            None => writeln!(out, "{NO_INSTANCE_FOUND}"),
        }
    }

    fn destroy<W: Write>(&mut self, args: &[String], out: &mut W) -> io::Result<()> {
        let Some(key) = self.resolve_key(args, out)? else {
            return Ok(());
        };
        if self.storage.all_mut().shift_remove(&key).is_none() {
            return writeln!(out, "{NO_INSTANCE_FOUND}");
        }
        if let Err(err) = self.storage.save() {
            return report(out, &err);
        }
        Ok(())
    }

    fn all<W: Write>(&mut self, args: &[String], out: &mut W) -> io::Result<()> {
        let kind = args.first().map(String::as_str);
        if let Some(kind) = kind
            && !self.storage.types().contains(kind)
        {
            return writeln!(out, "{CLASS_DOESNT_EXIST}");
        }
        let rendered: Vec<String> = self
            .storage
            .all()
            .values()
            .filter(|record| kind.is_none_or(|kind| record.kind() == kind))
            .map(|record| format!("\"{record}\""))
            .collect();
        writeln!(out, "[{}]", rendered.join(", "))
    }

    fn count<W: Write>(&mut self, args: &[String], out: &mut W) -> io::Result<()> {
        let Some(kind) = self.resolve_kind(args, out)? else {
            return Ok(());
        };
        writeln!(out, "{}", self.storage.count(Some(kind)))
    }

    fn update<W: Write>(&mut self, args: &[String], out: &mut W) -> io::Result<()> {
        let Some(key) = self.resolve_existing(args, out)? else {
            return Ok(());
        };
        let Some(name) = args.get(2) else {
            return writeln!(out, "{ATTRIBUTE_NAME_MISSING}");
        };
        let Some(raw) = args.get(3) else {
            return writeln!(out, "{VALUE_MISSING}");
        };
        self.apply(&key, [(name.as_str(), AttrValue::coerce(raw))], out)
    }

    fn update_from<W: Write>(
        &mut self,
        args: &[String],
        attributes: &Map<String, Value>,
        out: &mut W,
    ) -> io::Result<()> {
        let Some(key) = self.resolve_existing(args, out)? else {
            return Ok(());
        };
        let mut values = Vec::with_capacity(attributes.len());
        for (name, value) in attributes {
            match AttrValue::from_json(name, value) {
                Ok(value) => values.push((name.as_str(), value)),
                Err(err) => writeln!(out, "{err}")?,
            }
        }
        self.apply(&key, values, out)
    }

    /// Set attributes on a stored record, then stamp and save it.
    fn apply<'v, W: Write>(
        &mut self,
        key: &str,
        values: impl IntoIterator<Item = (&'v str, AttrValue)>,
        out: &mut W,
    ) -> io::Result<()> {
        let Some(record) = self.storage.all_mut().get_mut(key) else {
            return writeln!(out, "{NO_INSTANCE_FOUND}");
        };
        let mut changed = 0;
        for (name, value) in values {
            match record.set(name, value) {
                Ok(_) => changed += 1,
                Err(RecordError::ReservedAttribute(_)) => writeln!(out, "{ATTRIBUTE_RESERVED}")?,
                Err(err) => writeln!(out, "{err}")?,
            }
        }
        if changed == 0 {
            return Ok(());
        }
        if let Err(err) = self.storage.save_record(key) {
            return report(out, &err);
        }
        Ok(())
    }

    fn help<W: Write>(&self, topic: Option<&str>, out: &mut W) -> io::Result<()> {
        match topic {
            None => help::write_overview(out, &self.storage.types().names()),
            Some(topic) => match self.storage.types().get(topic) {
                Some(model) => help::write_model(out, model.as_ref()),
                None => help::write_command(out, topic),
            },
        }
    }

    /// Validate the type-name argument.
    fn resolve_kind<'s, W: Write>(
        &self,
        args: &'s [String],
        out: &mut W,
    ) -> io::Result<Option<&'s str>> {
        let Some(kind) = args.first() else {
            writeln!(out, "{CLASS_NAME_MISSING}")?;
            return Ok(None);
        };
        if !self.storage.types().contains(kind) {
            writeln!(out, "{CLASS_DOESNT_EXIST}")?;
            return Ok(None);
        }
        Ok(Some(kind))
    }

    /// Validate type name and id, returning the composite key.
    fn resolve_key<W: Write>(&self, args: &[String], out: &mut W) -> io::Result<Option<String>> {
        let Some(kind) = self.resolve_kind(args, out)? else {
            return Ok(None);
        };
        let Some(id) = args.get(1) else {
            writeln!(out, "{INSTANCE_ID_MISSING}")?;
            return Ok(None);
        };
        Ok(Some(record_key(kind, id)))
    }

    /// Like `resolve_key`, but also requires the record to exist.
    fn resolve_existing<W: Write>(
        &self,
        args: &[String],
        out: &mut W,
    ) -> io::Result<Option<String>> {
        let Some(key) = self.resolve_key(args, out)? else {
            return Ok(None);
        };
        if !self.storage.all().contains_key(&key) {
            writeln!(out, "{NO_INSTANCE_FOUND}")?;
            return Ok(None);
        }
        Ok(Some(key))
    }
}

/// Storage failures end the command, not the session.
fn report<W: Write>(out: &mut W, err: &StorageError) -> io::Result<()> {
    error!("storage operation failed: {err}");
    writeln!(out, "** {err} **")
}
