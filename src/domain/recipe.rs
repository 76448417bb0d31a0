use crate::domain::error::{DomainError, FieldErrors};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type RecipeId = u64;

pub const TITLE_MAX_LENGTH: usize = 255;
pub const LINK_MAX_LENGTH: usize = 255;
pub const PRICE_MAX_DIGITS: u32 = 5;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_STRING: &str = "Not a valid string.";

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub owner_id: String,
    pub fields: RecipeFields,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.title)
    }
}

/// The client-writable part of a recipe, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub time_minutes: u32,
    pub price: Decimal,
    pub link: String,
}

/// A raw scalar from a request body. Strings and numbers are both accepted
/// for every field and converted during validation; anything else is kept so
/// it can be reported against its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl FieldInput {
    fn into_text(self, field: &str, errors: &mut FieldErrors) -> Option<String> {
        match self {
            FieldInput::Text(text) => Some(text),
            FieldInput::Number(number) => Some(number.to_string()),
            FieldInput::Other(_) => {
                errors.add(field, INVALID_STRING);
                None
            }
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            FieldInput::Text(text) => text.trim().parse().ok(),
            FieldInput::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            FieldInput::Other(_) => None,
        }
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        FieldInput::Text(value.to_string())
    }
}

impl From<i64> for FieldInput {
    fn from(value: i64) -> Self {
        FieldInput::Number(value.into())
    }
}

/// Incoming recipe body. Only the mutable fields are declared, so `id`,
/// `user` or `owner` keys sent by a client never reach the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FieldInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<FieldInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<FieldInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<FieldInput>,
}

impl RecipePayload {
    /// Validates a complete field set. Missing optional fields fall back to
    /// their defaults; missing required ones are reported.
    pub fn into_fields(self) -> Result<RecipeFields, DomainError> {
        self.validate(None)
    }

    /// Merges supplied fields over `current`, validating only what was sent.
    pub fn merge_into(self, current: &RecipeFields) -> Result<RecipeFields, DomainError> {
        self.validate(Some(current))
    }

    fn validate(self, base: Option<&RecipeFields>) -> Result<RecipeFields, DomainError> {
        let mut errors = FieldErrors::new();

        let title = match self.title {
            Some(input) => match input.into_text("title", &mut errors) {
                Some(title) => check_title(&title, &mut errors).then_some(title),
                None => None,
            },
            None => required(base.map(|b| b.title.clone()), "title", &mut errors),
        };

        let time_minutes = match self.time_minutes {
            Some(input) => match input.as_integer() {
                Some(minutes) => check_time_minutes(minutes, &mut errors),
                None => {
                    errors.add("time_minutes", INVALID_INTEGER);
                    None
                }
            },
            None => required(base.map(|b| b.time_minutes), "time_minutes", &mut errors),
        };

        let price = match self.price {
            Some(input) => match parse_price(&input) {
                Ok(price) => Some(price),
                Err(messages) => {
                    for message in messages {
                        errors.add("price", message);
                    }
                    None
                }
            },
            None => required(base.map(|b| b.price), "price", &mut errors),
        };

        let link = match self.link {
            Some(input) => {
                let link = input.into_text("link", &mut errors).unwrap_or_default();
                if link.chars().count() > LINK_MAX_LENGTH {
                    errors.add(
                        "link",
                        format!(
                            "Ensure this field has no more than {} characters.",
                            LINK_MAX_LENGTH
                        ),
                    );
                }
                link
            }
            None => base.map(|b| b.link.clone()).unwrap_or_default(),
        };

        let description = match self.description {
            Some(input) => input
                .into_text("description", &mut errors)
                .unwrap_or_default(),
            None => base.map(|b| b.description.clone()).unwrap_or_default(),
        };

        errors.into_result()?;

        match (title, time_minutes, price) {
            (Some(title), Some(time_minutes), Some(price)) => Ok(RecipeFields {
                title,
                description,
                time_minutes,
                price,
                link,
            }),
            _ => Err(DomainError::Internal(
                "recipe validation passed with missing fields".to_string(),
            )),
        }
    }
}

fn required<T>(value: Option<T>, field: &str, errors: &mut FieldErrors) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

fn check_title(title: &str, errors: &mut FieldErrors) -> bool {
    if title.trim().is_empty() {
        errors.add("title", BLANK);
        return false;
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        errors.add(
            "title",
            format!(
                "Ensure this field has no more than {} characters.",
                TITLE_MAX_LENGTH
            ),
        );
        return false;
    }
    true
}

fn check_time_minutes(minutes: i64, errors: &mut FieldErrors) -> Option<u32> {
    if minutes < 0 {
        errors.add("time_minutes", "Ensure this value is greater than or equal to 0.");
        return None;
    }
    match u32::try_from(minutes) {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            errors.add(
                "time_minutes",
                format!("Ensure this value is less than or equal to {}.", u32::MAX),
            );
            None
        }
    }
}

/// Parses a price into a fixed-point decimal with two decimal places.
pub fn parse_price(input: &FieldInput) -> Result<Decimal, Vec<String>> {
    let text = match input {
        FieldInput::Text(text) => text.trim().to_string(),
        FieldInput::Number(number) => number.to_string(),
        FieldInput::Other(_) => return Err(vec![INVALID_NUMBER.to_string()]),
    };

    let parsed = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| vec![INVALID_NUMBER.to_string()])?;

    let normalized = parsed.normalize();
    let decimal_places = normalized.scale();
    let digits = digit_count(&normalized).max(decimal_places);
    let whole_digits = digits - decimal_places;

    let mut messages = Vec::new();
    if digits > PRICE_MAX_DIGITS {
        messages.push(format!(
            "Ensure that there are no more than {} digits in total.",
            PRICE_MAX_DIGITS
        ));
    }
    if decimal_places > PRICE_DECIMAL_PLACES {
        messages.push(format!(
            "Ensure that there are no more than {} decimal places.",
            PRICE_DECIMAL_PLACES
        ));
    }
    if whole_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        messages.push(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        ));
    }
    if !messages.is_empty() {
        return Err(messages);
    }

    let mut price = normalized;
    price.rescale(PRICE_DECIMAL_PLACES);
    Ok(price)
}

fn digit_count(value: &Decimal) -> u32 {
    if value.is_zero() {
        return 0;
    }
    value.mantissa().unsigned_abs().to_string().len() as u32
}

/// List and create shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: u32,
    pub price: Decimal,
    pub link: String,
}

/// Single-record shape: the summary plus `description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: u32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.fields.title.clone(),
            time_minutes: recipe.fields.time_minutes,
            price: recipe.fields.price,
            link: recipe.fields.link.clone(),
        }
    }
}

impl From<&Recipe> for RecipeDetail {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.fields.title.clone(),
            time_minutes: recipe.fields.time_minutes,
            price: recipe.fields.price,
            link: recipe.fields.link.clone(),
            description: recipe.fields.description.clone(),
        }
    }
}
