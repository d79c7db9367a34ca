use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code for unique index violations
pub const DUPLICATE_KEY_CODE: i32 = 11000;

fn duplicate_key_message(err: &Error) -> Option<&str> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE => {
            Some(e.message.as_str())
        }
        ErrorKind::Command(e) if e.code == DUPLICATE_KEY_CODE => Some(e.message.as_str()),
        _ => None,
    }
}

pub fn is_duplicate_key(err: &Error) -> bool {
    duplicate_key_message(err).is_some()
}

/// Duplicate key on the unique index covering `field`.
///
/// The server message names the index (`order_number_1`) and the offending
/// key (`dup key: { order_number: ... }`).
pub fn is_duplicate_key_on(err: &Error, field: &str) -> bool {
    duplicate_key_message(err).is_some_and(|message| message.contains(field))
}
