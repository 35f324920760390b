use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::{Uuid, fmt::Hyphenated};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Course {
    #[sqlx(try_from = "Hyphenated")]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "Hyphenated")]
    pub author_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_creation_title", skip_on_field_errors = false))]
pub struct CourseForCreationDto {
    #[validate(
        required(message = "You should fill out a title."),
        custom(function = "not_blank", message = "You should fill out a title."),
        length(max = 100, message = "The title shouldn't have more than 100 characters.")
    )]
    pub title: Option<String>,
    #[validate(length(
        max = 1500,
        message = "The description shouldn't have more than 1500 characters."
    ))]
    pub description: Option<String>,
}

/// Full replacement payload, also the document JSON Patch operations apply to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_title", skip_on_field_errors = false))]
pub struct CourseForUpdateDto {
    #[validate(
        required(message = "You should fill out a title."),
        custom(function = "not_blank", message = "You should fill out a title."),
        length(max = 100, message = "The title shouldn't have more than 100 characters.")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "You should fill out a description."),
        custom(function = "not_blank", message = "You should fill out a description."),
        length(
            max = 1500,
            message = "The description shouldn't have more than 1500 characters."
        )
    )]
    pub description: Option<String>,
}

/// Rejects empty and whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_creation_title(dto: &CourseForCreationDto) -> Result<(), ValidationError> {
    title_differs_from_description(dto.title.as_deref(), dto.description.as_deref())
}

fn validate_update_title(dto: &CourseForUpdateDto) -> Result<(), ValidationError> {
    title_differs_from_description(dto.title.as_deref(), dto.description.as_deref())
}

fn title_differs_from_description(
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(), ValidationError> {
    match (title, description) {
        (Some(title), Some(description)) if title == description => {
            Err(ValidationError::new("title_equals_description")
                .with_message("The provided description should be different from the title.".into()))
        }
        _ => Ok(()),
    }
}
