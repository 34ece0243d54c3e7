//! Record model: identity, timestamps and the dynamic attribute bag.

mod record;
mod timestamp;
mod value;

pub use record::{
    CLASS_KEY, CREATED_AT_KEY, ID_KEY, RESERVED_KEYS, Record, UPDATED_AT_KEY, record_key,
};
pub use timestamp::{TIMESTAMP_FORMAT, format_timestamp, parse_timestamp};
pub use value::AttrValue;
