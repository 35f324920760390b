use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::{Uuid, fmt::Hyphenated};
use validator::Validate;

use crate::models::course::{Course, CourseForCreationDto, not_blank};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Author {
    #[sqlx(try_from = "Hyphenated")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: DateTime<FixedOffset>,
    pub main_category: String,
    #[sqlx(skip)]
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub main_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthorForCreationDto {
    #[validate(
        required(message = "You should fill out a first name."),
        custom(function = "not_blank", message = "You should fill out a first name."),
        length(max = 50, message = "The first name shouldn't have more than 50 characters.")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "You should fill out a last name."),
        custom(function = "not_blank", message = "You should fill out a last name."),
        length(max = 50, message = "The last name shouldn't have more than 50 characters.")
    )]
    pub last_name: Option<String>,
    #[validate(required(message = "You should fill out a date of birth."))]
    pub date_of_birth: Option<DateTime<FixedOffset>>,
    #[validate(
        required(message = "You should fill out a main category."),
        custom(function = "not_blank", message = "You should fill out a main category."),
        length(max = 50, message = "The main category shouldn't have more than 50 characters.")
    )]
    pub main_category: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub courses: Vec<CourseForCreationDto>,
}
