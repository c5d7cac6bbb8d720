#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fieldsfilter::{
    FieldsFilterBackend, FilterBackend, FilterError, ModelSchema, OrderFilterBackend, QueryParams,
    apply_backends,
};
use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use sea_orm_migration::prelude::*;

pub mod author_entity;
pub mod book_entity;
pub mod publisher_entity;

/// Send backend logs to the test writer; set `RUST_LOG=fieldsfilter=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;
    seed(&db).await?;

    Ok(db)
}

/// books -> authors -> publishers
pub fn book_schema() -> ModelSchema {
    let publisher = ModelSchema::from_entity::<publisher_entity::Entity>();
    let author = ModelSchema::from_entity::<author_entity::Entity>().with_relation(
        "publisher",
        "publisher_id",
        "id",
        publisher,
    );
    ModelSchema::from_entity::<book_entity::Entity>().with_relation("author", "author_id", "id", author)
}

/// Run the fields backend for `pairs` and return the sorted ids of matching books
pub async fn filtered_ids(
    db: &DatabaseConnection,
    pairs: &[(&str, &str)],
) -> Result<Vec<i32>, FilterError> {
    let params = QueryParams::from_pairs(pairs.iter().copied());
    let query = FieldsFilterBackend::new(book_schema())
        .filter_query(&params, book_entity::Entity::find())?;
    let books = query.all(db).await.expect("Filtered query should execute");

    let mut ids: Vec<i32> = books.iter().map(|book| book.id).collect();
    ids.sort_unstable();
    Ok(ids)
}

/// Run the ordering backend for `order_by` and return ids in result order
pub async fn ordered_ids(db: &DatabaseConnection, order_by: &str) -> Result<Vec<i32>, FilterError> {
    let params = QueryParams::from_pairs([("order_by", order_by)]);
    let query =
        OrderFilterBackend::new(book_schema()).filter_query(&params, book_entity::Entity::find())?;
    let books = query.all(db).await.expect("Ordered query should execute");
    Ok(books.iter().map(|book| book.id).collect())
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub fields: Arc<FieldsFilterBackend>,
    pub ordering: Arc<OrderFilterBackend>,
}

async fn list_books(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<Vec<book_entity::Model>>, Response> {
    let backends: [&dyn FilterBackend<book_entity::Entity>; 2] =
        [state.fields.as_ref(), state.ordering.as_ref()];
    let query = apply_backends(&backends, &params, book_entity::Entity::find())
        .map_err(IntoResponse::into_response)?;

    let books = query
        .all(&state.db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response())?;
    Ok(Json(books))
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let schema = book_schema();
    let state = AppState {
        db,
        fields: Arc::new(FieldsFilterBackend::new(schema.clone())),
        ordering: Arc::new(OrderFilterBackend::new(schema)),
    };

    let api = Router::new()
        .route("/books", axum::routing::get(list_books))
        .with_state(state);

    Router::new().nest("/api/v1", api)
}

fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|day| day.and_hms_opt(time.0, time.1, time.2))
        .expect("Fixture timestamps are valid")
}

fn utc(date: (i32, u32, u32), time: (u32, u32, u32)) -> DateTime<Utc> {
    at(date, time).and_utc()
}

/// Fixture data:
///
/// | id | title              | pages | price | in_print | published_at        | updated_at (UTC)     | author        | publisher |
/// |----|--------------------|-------|-------|----------|---------------------|----------------------|---------------|-----------|
/// | 1  | Ancillary Justice  | 386   | 15.99 | yes      | 2013-10-01 09:15:00 | 2024-01-15T10:00:00Z | Ann Leckie    | Tor Books |
/// | 2  | Ancillary Sword    | 356   | 14.50 | yes      | 2014-10-07 18:45:00 | 2024-01-15T23:30:00Z | Ann Leckie    | Tor Books |
/// | 3  | Dune (Book One)    | 412   | 9.99  | yes      | 1965-08-01 00:00:00 | 2024-02-01T08:00:00Z | Frank Herbert | Penguin   |
/// | 4  | Dune Messiah       | 256   | 8.99  | no       | 1969-10-15 12:00:00 | 2023-12-31T22:00:00Z | Frank Herbert | Penguin   |
/// | 5  | The Shipping News  | 337   | 12.00 | yes      | 1993-03-01 10:00:00 | 2024-03-10T12:00:00Z | Annie Proulx  | Penguin   |
async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    publisher_entity::Entity::insert_many([
        publisher_entity::ActiveModel {
            id: Set(1),
            name: Set("Tor Books".to_string()),
        },
        publisher_entity::ActiveModel {
            id: Set(2),
            name: Set("Penguin".to_string()),
        },
    ])
    .exec(db)
    .await?;

    author_entity::Entity::insert_many([
        author_entity::ActiveModel {
            id: Set(1),
            name: Set("Ann Leckie".to_string()),
            publisher_id: Set(1),
        },
        author_entity::ActiveModel {
            id: Set(2),
            name: Set("Frank Herbert".to_string()),
            publisher_id: Set(2),
        },
        author_entity::ActiveModel {
            id: Set(3),
            name: Set("Annie Proulx".to_string()),
            publisher_id: Set(2),
        },
    ])
    .exec(db)
    .await?;

    let books = [
        (1, "Ancillary Justice", None, 386, 15.99, true, at((2013, 10, 1), (9, 15, 0)), utc((2024, 1, 15), (10, 0, 0)), 1),
        (2, "Ancillary Sword", None, 356, 14.5, true, at((2014, 10, 7), (18, 45, 0)), utc((2024, 1, 15), (23, 30, 0)), 1),
        (3, "Dune", Some("Book One"), 412, 9.99, true, at((1965, 8, 1), (0, 0, 0)), utc((2024, 2, 1), (8, 0, 0)), 2),
        (4, "Dune Messiah", None, 256, 8.99, false, at((1969, 10, 15), (12, 0, 0)), utc((2023, 12, 31), (22, 0, 0)), 2),
        (5, "The Shipping News", None, 337, 12.0, true, at((1993, 3, 1), (10, 0, 0)), utc((2024, 3, 10), (12, 0, 0)), 3),
    ];
    book_entity::Entity::insert_many(books.into_iter().map(
        |(id, title, subtitle, pages, price, in_print, published_at, updated_at, author_id)| {
            book_entity::ActiveModel {
                id: Set(id),
                title: Set(title.to_string()),
                subtitle: Set(subtitle.map(str::to_string)),
                pages: Set(pages),
                price: Set(price),
                in_print: Set(in_print),
                published_at: Set(published_at),
                updated_at: Set(updated_at),
                author_id: Set(author_id),
            }
        },
    ))
    .exec(db)
    .await?;

    Ok(())
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateLibraryTables)]
    }
}

pub struct CreateLibraryTables;

impl MigrationName for CreateLibraryTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_library_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateLibraryTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(publisher_entity::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(author_entity::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(book_entity::Entity))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["books", "authors", "publishers"] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
