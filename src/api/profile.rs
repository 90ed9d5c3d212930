/// Profile endpoint
use crate::{
    auth::AuthContext,
    context::AppContext,
    db::models::{Book, Loan},
    error::AppResult,
};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Build profile routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/profile", get(get_profile))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    name: String,
    email: String,
    profile_image: String,
    borrowed_books: Vec<Book>,
    wishlist: Vec<Book>,
    loan_history: Vec<Loan>,
}

/// The caller's profile with populated borrowed/wishlist book lists and
/// the borrow-history ledger
async fn get_profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> AppResult<Json<ProfileResponse>> {
    let borrowed_books = ctx.circulation.borrowed_books(&auth.user.id).await?;
    let wishlist = ctx.circulation.wishlist(&auth.user.id).await?;
    let loan_history = ctx.circulation.loan_history(&auth.user.id).await?;

    Ok(Json(ProfileResponse {
        name: auth.user.username,
        email: auth.user.email,
        profile_image: auth.user.avatar_url,
        borrowed_books,
        wishlist,
        loan_history,
    }))
}
