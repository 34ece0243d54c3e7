//! Line-oriented command front end for hbnb storage.
//!
//! The console parses one command per line, validates type names and ids
//! against the storage's type registry, and prints results or validation
//! messages. Validation failures are output, never errors.

pub mod command;
pub mod console;
mod help;

pub use command::{Command, parse_line, parse_words};
pub use console::{
    ATTRIBUTE_NAME_MISSING, ATTRIBUTE_RESERVED, CLASS_DOESNT_EXIST, CLASS_NAME_MISSING, Console,
    Flow, INSTANCE_ID_MISSING, NO_INSTANCE_FOUND, SessionOptions, VALUE_MISSING,
};
