pub mod author;
pub mod course;
pub mod pagination;

pub use author::{Author, AuthorDto, AuthorForCreationDto};
pub use course::{Course, CourseDto, CourseForCreationDto, CourseForUpdateDto};
pub use pagination::{AuthorsResourceParameters, PagedList, PaginationMetadata};
