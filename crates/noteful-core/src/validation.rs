//! Request body validation.
//!
//! Bodies arrive as untyped JSON so that presence, type and format can each be
//! reported with a precise message before any store call is made.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::uuid_utils::parse_id;

/// Minimum username length in characters.
pub const USERNAME_MIN_LEN: usize = 1;

/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Maximum password length in characters.
pub const PASSWORD_MAX_LEN: usize = 72;

const REQUIRED_REGISTRATION_FIELDS: [&str; 2] = ["username", "password"];

/// Message for a registration field carrying U+0000.
pub const NUL_NOT_ALLOWED: &str = "Cannot contain NUL characters";

fn as_object(body: &Value) -> Result<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| Error::InvalidInput("Request body must be a JSON object".to_string()))
}

// =============================================================================
// REGISTRATION & LOGIN
// =============================================================================

/// A validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub fullname: Option<String>,
}

impl Registration {
    /// Validate a `POST /users` body.
    ///
    /// Checks run in order (presence, type, surrounding whitespace, length) and
    /// the first failing field is reported as the error location.
    pub fn parse(body: &Value) -> Result<Self> {
        let obj = body
            .as_object()
            .ok_or_else(|| Error::validation("body", "Request body must be a JSON object"))?;

        if let Some(missing) = REQUIRED_REGISTRATION_FIELDS
            .iter()
            .find(|f| !obj.contains_key(**f))
        {
            return Err(Error::validation(*missing, "Missing field"));
        }

        let mut string_fields: Vec<&str> = REQUIRED_REGISTRATION_FIELDS.to_vec();
        if obj.contains_key("fullname") && !obj["fullname"].is_null() {
            string_fields.push("fullname");
        }
        if let Some(non_string) = string_fields.iter().find(|f| !obj[**f].is_string()) {
            return Err(Error::validation(
                *non_string,
                "Incorrect field type: expected string",
            ));
        }

        let username = obj["username"].as_str().unwrap_or_default();
        let password = obj["password"].as_str().unwrap_or_default();

        // PostgreSQL text columns cannot store U+0000.
        if let Some(field) = string_fields
            .iter()
            .find(|f| obj[**f].as_str().is_some_and(|v| v.contains('\0')))
        {
            return Err(Error::validation(*field, NUL_NOT_ALLOWED));
        }

        for (field, value) in [("username", username), ("password", password)] {
            if value.trim() != value {
                return Err(Error::validation(
                    field,
                    "Cannot start or end with whitespace",
                ));
            }
        }

        let bounds = [
            ("username", username, USERNAME_MIN_LEN, None),
            ("password", password, PASSWORD_MIN_LEN, Some(PASSWORD_MAX_LEN)),
        ];
        for (field, value, min, max) in bounds {
            let len = value.chars().count();
            if len < min {
                return Err(Error::validation(
                    field,
                    format!("Must be at least {} characters long", min),
                ));
            }
            if let Some(max) = max {
                if len > max {
                    return Err(Error::validation(
                        field,
                        format!("Must be at most {} characters long", max),
                    ));
                }
            }
        }

        let fullname = obj
            .get("fullname")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            fullname,
        })
    }
}

/// Login credentials. Any shape problem is reported as `None` so the caller can
/// answer with the same error as a wrong password.
pub fn parse_credentials(body: &Value) -> Option<(String, String)> {
    let username = body.get("username")?.as_str()?;
    let password = body.get("password")?.as_str()?;
    if username.is_empty() || password.is_empty() || username.contains('\0') {
        return None;
    }
    Some((username.to_string(), password.to_string()))
}

// =============================================================================
// FOLDERS & TAGS
// =============================================================================

/// Extract the required `name` of a folder or tag.
pub fn parse_name(body: &Value) -> Result<String> {
    let obj = as_object(body)?;
    match obj.get("name") {
        None | Some(Value::Null) => Err(missing("name")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(missing("name")),
        Some(Value::String(s)) => {
            reject_nul("name", s)?;
            Ok(s.clone())
        }
        Some(_) => Err(Error::InvalidInput("`name` must be a string".to_string())),
    }
}

fn missing(field: &str) -> Error {
    Error::InvalidInput(format!("Missing `{}` in request body", field))
}

/// Reject a string field containing U+0000, which PostgreSQL text cannot hold.
pub fn reject_nul(field: &str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(Error::InvalidInput(format!(
            "`{}` cannot contain NUL characters",
            field
        )));
    }
    Ok(())
}

// =============================================================================
// NOTES
// =============================================================================

/// A syntactically validated note body. References are not yet checked for
/// ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    /// Body `id`, if the client sent one.
    pub id: Option<String>,
    pub title: String,
    /// `None` when absent, `Some(None)` when explicitly null.
    pub content: Option<Option<String>>,
    pub folder_id: Option<Uuid>,
    /// Deduplicated, in first-seen order.
    pub tag_ids: Vec<Uuid>,
}

impl NoteInput {
    /// Validate a note create/update body.
    ///
    /// Tag ids are read from `tags`, falling back to `tagIds`.
    pub fn parse(body: &Value) -> Result<Self> {
        let obj = as_object(body)?;

        let id = match obj.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        let title = match obj.get("title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) | None | Some(Value::Null) => return Err(missing("title")),
            Some(_) => return Err(Error::InvalidInput("`title` must be a string".to_string())),
        };
        reject_nul("title", &title)?;

        let content = match obj.get("content") {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(s)) => {
                reject_nul("content", s)?;
                Some(Some(s.clone()))
            }
            Some(_) => {
                return Err(Error::InvalidInput(
                    "`content` must be a string".to_string(),
                ))
            }
        };

        let folder_id = match obj.get("folderId") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(
                parse_id(s)
                    .ok_or_else(|| Error::InvalidInput("The `folderId` is not valid".to_string()))?,
            ),
            Some(_) => {
                return Err(Error::InvalidInput(
                    "The `folderId` is not valid".to_string(),
                ))
            }
        };

        let tags_value = obj.get("tags").or_else(|| obj.get("tagIds"));
        let tag_ids = match tags_value {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut ids: Vec<Uuid> = Vec::with_capacity(items.len());
                for item in items {
                    let id = item.as_str().and_then(parse_id).ok_or_else(|| {
                        Error::InvalidInput(
                            "The `tags` array contains an invalid `id`".to_string(),
                        )
                    })?;
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                ids
            }
            Some(_) => return Err(Error::InvalidInput("`tags` is not an array".to_string())),
        };

        Ok(Self {
            id,
            title,
            content,
            folder_id,
            tag_ids,
        })
    }
}

/// Parse an optional id from a query string parameter. Empty means absent.
pub fn parse_optional_query_id(raw: Option<&str>, field: &str) -> Result<Option<Uuid>> {
    match raw {
        None => Ok(None),
        Some("") => Ok(None),
        Some(s) => parse_id(s)
            .map(Some)
            .ok_or_else(|| Error::InvalidInput(format!("The `{}` is not valid", field))),
    }
}
