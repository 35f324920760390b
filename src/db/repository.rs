use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Author, AuthorsResourceParameters, Course, PagedList};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, date_of_birth, main_category";
const COURSE_COLUMNS: &str = "id, title, description, author_id";

pub async fn fetch_authors(
    conn: &mut SqliteConnection,
    params: &AuthorsResourceParameters,
) -> Result<PagedList<Author>, sqlx::Error> {
    let page_number = params.page_number();
    let page_size = params.page_size();

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM authors");
    push_author_filters(&mut count, params);
    let total_count: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {AUTHOR_COLUMNS} FROM authors"));
    push_author_filters(&mut query, params);
    query
        .push(" ORDER BY first_name, last_name LIMIT ")
        .push_bind(i64::from(page_size))
        .push(" OFFSET ")
        .push_bind(i64::from(page_number - 1) * i64::from(page_size));

    let authors = query.build_query_as::<Author>().fetch_all(&mut *conn).await?;
    debug!(
        "fetched {} of {} authors (page {}, size {})",
        authors.len(),
        total_count,
        page_number,
        page_size
    );

    Ok(PagedList::new(
        authors,
        total_count.max(0) as u64,
        page_number,
        page_size,
    ))
}

fn push_author_filters(query: &mut QueryBuilder<'_, Sqlite>, params: &AuthorsResourceParameters) {
    let mut keyword = " WHERE ";

    if let Some(main_category) = params.main_category() {
        query
            .push(keyword)
            .push("lower(main_category) = lower(")
            .push_bind(main_category.to_string())
            .push(")");
        keyword = " AND ";
    }

    if let Some(search) = params.search_query() {
        let needle = search.to_lowercase();
        query.push(keyword).push("(");
        for (i, column) in ["main_category", "first_name", "last_name"].iter().enumerate() {
            if i > 0 {
                query.push(" OR ");
            }
            query
                .push(format!("instr(lower({column}), "))
                .push_bind(needle.clone())
                .push(") > 0");
        }
        query.push(")");
    }
}

/// Authors whose ids appear in `ids`, returned in the order of `ids`.
pub async fn fetch_authors_by_ids(
    conn: &mut SqliteConnection,
    ids: &[Uuid],
) -> Result<Vec<Author>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        QueryBuilder::<Sqlite>::new(format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id IN ("));
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(")");

    let mut authors = query.build_query_as::<Author>().fetch_all(&mut *conn).await?;
    authors.sort_by_key(|author| ids.iter().position(|id| *id == author.id));
    Ok(authors)
}

pub async fn find_author(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<Author>, sqlx::Error> {
    sqlx::query_as::<_, Author>(&format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
}

pub async fn author_exists(conn: &mut SqliteConnection, id: Uuid) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM authors WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Inserts the author together with any courses it already owns.
pub async fn insert_author(conn: &mut SqliteConnection, author: &Author) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO authors (id, first_name, last_name, date_of_birth, main_category) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(author.id.to_string())
    .bind(&author.first_name)
    .bind(&author.last_name)
    .bind(author.date_of_birth)
    .bind(&author.main_category)
    .execute(&mut *conn)
    .await?;

    for course in &author.courses {
        insert_course(&mut *conn, course).await?;
    }

    Ok(())
}

/// Deletes the author and, through the foreign key, all of its courses.
pub async fn delete_author(conn: &mut SqliteConnection, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM authors WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_courses(
    conn: &mut SqliteConnection,
    author_id: Uuid,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE author_id = ? ORDER BY title"
    ))
    .bind(author_id.to_string())
    .fetch_all(&mut *conn)
    .await
}

pub async fn find_course(
    conn: &mut SqliteConnection,
    author_id: Uuid,
    course_id: Uuid,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE author_id = ? AND id = ?"
    ))
    .bind(author_id.to_string())
    .bind(course_id.to_string())
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_course(conn: &mut SqliteConnection, course: &Course) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO courses (id, title, description, author_id) VALUES (?, ?, ?, ?)")
        .bind(course.id.to_string())
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.author_id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn update_course(conn: &mut SqliteConnection, course: &Course) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE courses SET title = ?, description = ? WHERE id = ? AND author_id = ?",
    )
    .bind(&course.title)
    .bind(&course.description)
    .bind(course.id.to_string())
    .bind(course.author_id.to_string())
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_course(
    conn: &mut SqliteConnection,
    author_id: Uuid,
    course_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ? AND author_id = ?")
        .bind(course_id.to_string())
        .bind(author_id.to_string())
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}
