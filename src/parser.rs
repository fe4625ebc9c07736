use crate::model::Member;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid member JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a member list, found {0}")]
    UnexpectedShape(&'static str),
}

/// Paginated list envelope as produced by the API server.
#[derive(Debug, Deserialize)]
struct Page {
    results: Vec<Member>,
}

/// Decode a member list. Accepts a bare array, a paginated `{"results": [...]}`
/// envelope, or a `{"members": [...]}` export.
pub fn parse_members(input: &str) -> Result<Vec<Member>, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    members_from_value(value)
}

pub fn members_from_value(value: Value) -> Result<Vec<Member>, ParseError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => {
            if map.contains_key("results") {
                let page: Page = serde_json::from_value(Value::Object(map))?;
                return Ok(page.results);
            }
            if let Some(members) = map.remove("members") {
                return Ok(serde_json::from_value(members)?);
            }
            Err(ParseError::UnexpectedShape("an object without `results` or `members`"))
        }
        Value::Null => Ok(Vec::new()),
        Value::Bool(_) => Err(ParseError::UnexpectedShape("a boolean")),
        Value::Number(_) => Err(ParseError::UnexpectedShape("a number")),
        Value::String(_) => Err(ParseError::UnexpectedShape("a string")),
    }
}
