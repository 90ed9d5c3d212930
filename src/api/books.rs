/// Book catalog endpoints
use crate::{
    auth::{AdminContext, AuthContext, OptionalAuthContext},
    books::{BookDetail, BookView, NewBook},
    comments::CommentView,
    context::AppContext,
    error::{AppError, AppResult},
    media::MediaKind,
};
use axum::{
    extract::{Multipart, Path, State},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build book routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book)
                .put(mutate_book)
                .post(add_comment)
                .delete(delete_book),
        )
}

#[derive(Debug, Serialize)]
struct ListBooksResponse {
    books: Vec<BookView>,
}

#[derive(Debug, Serialize)]
struct CreateBookResponse {
    message: String,
    book: BookView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookDetailResponse {
    book: BookView,
    is_borrowed: bool,
    is_liked: bool,
    comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct CommentCreatedResponse {
    message: String,
    comment: CommentView,
}

#[derive(Debug, Deserialize)]
struct MutateRequest {
    #[serde(rename = "type")]
    action: String,
}

#[derive(Debug, Deserialize)]
struct CommentRequest {
    text: String,
}

/// List all books with their comments populated
async fn list_books(State(ctx): State<AppContext>) -> AppResult<Json<ListBooksResponse>> {
    let books = ctx.books.list().await?;

    let ids: Vec<String> = books.iter().map(|b| b.id.clone()).collect();
    let mut by_book = ctx.comments.for_books(&ids).await?;

    let views = books
        .into_iter()
        .map(|book| {
            let comments = by_book.remove(&book.id).unwrap_or_default();
            BookView { book, comments }
        })
        .collect();

    Ok(Json(ListBooksResponse { books: views }))
}

/// Fields collected from the book-creation form
#[derive(Default)]
struct CreateForm {
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    content: Option<String>,
    available: Option<String>,
    cover: Option<(Vec<u8>, Option<String>)>,
    pdf: Option<(Vec<u8>, Option<String>)>,
}

impl CreateForm {
    async fn parse(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?
        {
            let Some(name) = field.name().map(String::from) else {
                continue;
            };

            match name.as_str() {
                "coverImage" | "pdfFile" => {
                    let content_type = field.content_type().map(String::from);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?
                        .to_vec();
                    if name == "coverImage" {
                        form.cover = Some((data, content_type));
                    } else {
                        form.pdf = Some((data, content_type));
                    }
                }
                _ => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?;
                    match name.as_str() {
                        "title" => form.title = Some(value),
                        "author" => form.author = Some(value),
                        "description" => form.description = Some(value),
                        "content" => form.content = Some(value),
                        "available" => form.available = Some(value),
                        _ => {}
                    }
                }
            }
        }

        Ok(form)
    }
}

/// Create a book: store both media payloads, then persist the record.
///
/// A storage failure aborts the whole operation; no partial book is
/// created and no compensating delete of an already-stored sibling is
/// attempted.
async fn create_book(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = CreateForm::parse(multipart).await?;

    let (Some(title), Some(author), Some(description), Some(content), Some(cover), Some(pdf)) = (
        form.title,
        form.author,
        form.description,
        form.content,
        form.cover,
        form.pdf,
    ) else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    if title.is_empty() || author.is_empty() || description.is_empty() || content.is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }

    // Availability defaults true unless explicitly provided false.
    let available = form.available.as_deref() != Some("false");

    let (cover_data, cover_type) = cover;
    let stored_cover = ctx
        .media
        .upload(cover_data, cover_type.as_deref(), "books/covers", MediaKind::Image)
        .await?;

    let (pdf_data, pdf_type) = pdf;
    let stored_pdf = ctx
        .media
        .upload(pdf_data, pdf_type.as_deref(), "books/pdfs", MediaKind::Document)
        .await?;

    let book = ctx
        .books
        .create(NewBook {
            title,
            author,
            description,
            content,
            cover: stored_cover,
            pdf: stored_pdf,
            available,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookResponse {
            message: "Book created successfully".to_string(),
            book: BookView {
                book,
                comments: Vec::new(),
            },
        }),
    ))
}

/// Book detail with populated comments and the caller's borrow/like status
async fn get_book(
    State(ctx): State<AppContext>,
    OptionalAuthContext { auth }: OptionalAuthContext,
    Path(id): Path<String>,
) -> AppResult<Json<BookDetailResponse>> {
    let viewer = auth.as_ref().map(|a| &a.user);
    let detail = BookDetail::load(&ctx.books, &ctx.comments, &ctx.circulation, &id, viewer).await?;

    Ok(Json(BookDetailResponse {
        book: detail.book,
        is_borrowed: detail.is_borrowed,
        is_liked: detail.is_liked,
        comments: detail.comments,
    }))
}

/// Toggle the caller's borrow or like state for a book
async fn mutate_book(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<MutateRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(request) =
        body.map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))?;

    // Resolve the book before mutating anything.
    ctx.books.get_required(&id).await?;

    match request.action.as_str() {
        "borrow" => {
            let outcome = ctx.circulation.toggle_borrow(&auth.user.id, &id).await?;
            tracing::debug!(book = %id, borrowed = outcome.borrowed, "borrow toggled");
        }
        "like" => {
            let outcome = ctx.circulation.toggle_like(&auth.user.id, &id).await?;
            tracing::debug!(book = %id, liked = outcome.liked, "like toggled");
        }
        _ => return Err(AppError::Validation("Invalid action".to_string())),
    }

    Ok(Json(MessageResponse {
        message: "Book updated successfully".to_string(),
    }))
}

/// Add a comment to a book
async fn add_comment(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) =
        body.map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))?;

    ctx.books.get_required(&id).await?;

    let comment = ctx.comments.add(&auth.user, &id, &request.text).await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentCreatedResponse {
            message: "Comment added successfully".to_string(),
            comment,
        }),
    ))
}

/// Delete a book (admin only).
///
/// Stored media is cleaned up best-effort before the record is removed;
/// cleanup failures are logged and the deletion still succeeds. Comment
/// entities are not cascaded and stay unlinked.
async fn delete_book(
    State(ctx): State<AppContext>,
    admin: AdminContext,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let book = ctx.books.get_required(&id).await?;

    for key in [book.cover_key.as_deref(), book.pdf_key.as_deref()]
        .into_iter()
        .flatten()
    {
        if let Err(e) = ctx.media.delete(key).await {
            tracing::warn!(book = %id, key = %key, "media cleanup failed: {}", e);
        }
    }

    ctx.books.delete(&id).await?;

    tracing::info!(book = %id, admin = %admin.user.id, "book deleted by admin");

    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
