//! Schema checks for HTTP payloads, run before anything reaches the service.

use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::IntoParams;

use super::domain::NewProperty;
use super::service::SearchQuery;
use super::validation::{ValidationError, Violations};

/// Validates a `POST /properties` body, reporting every offending field at once.
pub fn parse_create_request(body: &Value) -> Result<NewProperty, ValidationError> {
    let Some(object) = body.as_object() else {
        return Err(ValidationError::field(
            "body",
            format!("Expected object, received {}", type_name(body)),
        ));
    };

    let mut violations = Violations::default();
    let address = required_text(object, "address", "Address is required", &mut violations);
    let suburb = required_text(object, "suburb", "Suburb is required", &mut violations);
    let state = optional_text(object, "state", &mut violations);
    let postcode = optional_text(object, "postcode", &mut violations);
    let description = optional_text(object, "description", &mut violations);
    let sale_price = positive_number(object, "salePrice", &mut violations);

    if !violations.is_empty() {
        return Err(violations.into_error("Validation failed"));
    }

    Ok(NewProperty {
        address: address.unwrap_or_default(),
        suburb: suburb.unwrap_or_default(),
        state,
        postcode,
        sale_price: sale_price.unwrap_or_default(),
        description,
    })
}

/// Raw `GET /properties` query string values.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive suburb filter.
    pub suburb: Option<String>,
    /// Page number starting at 1 (default 1).
    #[param(value_type = Option<u32>, minimum = 1)]
    pub page: Option<String>,
    /// Results per page (default 50).
    #[param(value_type = Option<u32>, minimum = 1, maximum = 100)]
    pub limit: Option<String>,
}

impl SearchParams {
    /// Converts raw query values into a [`SearchQuery`]. Range checks stay with the service.
    pub fn into_query(self) -> Result<SearchQuery, ValidationError> {
        let mut violations = Violations::default();
        let page = integer_param(self.page.as_deref(), "page", &mut violations);
        let limit = integer_param(self.limit.as_deref(), "limit", &mut violations);

        if !violations.is_empty() {
            return Err(violations.into_error("Invalid pagination parameters"));
        }

        Ok(SearchQuery {
            suburb: self.suburb,
            page,
            limit,
        })
    }
}

fn required_text(
    object: &Map<String, Value>,
    field: &str,
    empty_message: &str,
    violations: &mut Violations,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            violations.push(field, "Required");
            None
        }
        Some(Value::String(text)) if text.is_empty() => {
            violations.push(field, empty_message);
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            violations.push(
                field,
                format!("Expected string, received {}", type_name(other)),
            );
            None
        }
    }
}

fn optional_text(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Violations,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            violations.push(
                field,
                format!("Expected string, received {}", type_name(other)),
            );
            None
        }
    }
}

fn positive_number(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Violations,
) -> Option<f64> {
    match object.get(field) {
        None | Some(Value::Null) => {
            violations.push(field, "Required");
            None
        }
        Some(Value::Number(number)) => match number.as_f64() {
            Some(price) if price > 0.0 => Some(price),
            _ => {
                violations.push(field, "Sale price must be positive");
                None
            }
        },
        Some(other) => {
            violations.push(
                field,
                format!("Expected number, received {}", type_name(other)),
            );
            None
        }
    }
}

fn integer_param(raw: Option<&str>, field: &str, violations: &mut Violations) -> Option<u32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<i64>() {
        // Out-of-range values are clamped so the service reports its own range error.
        Ok(value) if value < 0 => Some(0),
        Ok(value) => Some(u32::try_from(value).unwrap_or(u32::MAX)),
        Err(_) => {
            violations.push(field, format!("{field} must be an integer"));
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
