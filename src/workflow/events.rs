//! Contract event output parsing
//!
//! `soroban events --output json` prints one pretty JSON object per event with
//! nothing between them, while the node client prints a single JSON array.
//! Both are read as a stream of JSON values, and commas between top-level
//! values are skipped, so every shape ends up as one flat list of objects.

use serde_json::{Deserializer, Value};

use crate::common::{joined_output, Error, Result};

/// Parse captured event output into a list of event objects
pub fn parse_events(lines: &[String]) -> Result<Vec<Value>> {
    let text = joined_output(lines);
    if text.is_empty() {
        return Err(not_parseable(&text, "no output"));
    }

    let mut events = Vec::new();
    let mut rest = text.as_str();
    while !rest.is_empty() {
        let mut stream = Deserializer::from_str(rest).into_iter::<Value>();
        let value = match stream.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => return Err(not_parseable(&text, e)),
            None => break,
        };
        let consumed = stream.byte_offset();

        match value {
            Value::Array(items) => {
                for item in items {
                    push_event(&mut events, item, &text)?;
                }
            }
            item => push_event(&mut events, item, &text)?,
        }

        rest = rest[consumed..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    Ok(events)
}

fn push_event(events: &mut Vec<Value>, item: Value, text: &str) -> Result<()> {
    if !item.is_object() {
        return Err(not_parseable(
            text,
            format!("expected an event object, found {item}"),
        ));
    }
    events.push(item);
    Ok(())
}

fn not_parseable(output: &str, reason: impl ToString) -> Error {
    Error::EventsNotParseable {
        output: output.to_string(),
        reason: reason.to_string(),
    }
}
