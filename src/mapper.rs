//! Conversions between persisted entities and wire DTOs.
//!
//! Input DTOs are expected to have passed validation before they get here,
//! so required fields that are still `None` fall back to empty values.

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use uuid::Uuid;

use crate::models::{
    Author, AuthorDto, AuthorForCreationDto, Course, CourseDto, CourseForCreationDto,
    CourseForUpdateDto,
};

/// Whole years between `date_of_birth` and `now`, in the author's own offset.
pub fn current_age(date_of_birth: DateTime<FixedOffset>, now: DateTime<Utc>) -> i32 {
    let today = now.with_timezone(date_of_birth.offset()).date_naive();
    let born = date_of_birth.date_naive();

    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    age
}

impl From<&Author> for AuthorDto {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            name: format!("{} {}", author.first_name, author.last_name),
            age: current_age(author.date_of_birth, Utc::now()),
            main_category: author.main_category.clone(),
        }
    }
}

impl From<AuthorForCreationDto> for Author {
    fn from(dto: AuthorForCreationDto) -> Self {
        let id = Uuid::new_v4();
        let courses = dto
            .courses
            .into_iter()
            .map(|course| Course::from_creation(course, id))
            .collect();

        Self {
            id,
            first_name: dto.first_name.unwrap_or_default(),
            last_name: dto.last_name.unwrap_or_default(),
            date_of_birth: dto.date_of_birth.unwrap_or_default(),
            main_category: dto.main_category.unwrap_or_default(),
            courses,
        }
    }
}

impl From<&Course> for CourseDto {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            author_id: course.author_id,
        }
    }
}

impl From<&Course> for CourseForUpdateDto {
    fn from(course: &Course) -> Self {
        Self {
            title: Some(course.title.clone()),
            description: course.description.clone(),
        }
    }
}

impl Course {
    /// New course with a server-assigned id.
    pub fn from_creation(dto: CourseForCreationDto, author_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: dto.title.unwrap_or_default(),
            description: dto.description,
            author_id,
        }
    }

    /// New course keyed by a caller-supplied id, used when PUT or PATCH upserts.
    pub fn from_update(dto: CourseForUpdateDto, id: Uuid, author_id: Uuid) -> Self {
        let mut course = Self {
            id,
            title: String::new(),
            description: None,
            author_id,
        };
        course.merge(dto);
        course
    }

    /// Copies every field of the update payload onto this course.
    pub fn merge(&mut self, dto: CourseForUpdateDto) {
        self.title = dto.title.unwrap_or_default();
        self.description = dto.description;
    }
}
