//! Handlers for the `/reviews` resource.
//!
//! Each mutation recomputes the reviewed book's average rating inside the
//! repository transaction, so handlers only validate and shape responses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shelflog_core::error::CoreError;
use shelflog_core::types::DbId;
use shelflog_db::models::review::{CreateReview, Review, ReviewWithUser, UpdateReview};
use shelflog_db::repositories::{BookRepo, ReviewRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Lowest accepted rating (half-star scale).
const MIN_RATING: f64 = 0.5;

/// Highest accepted rating.
const MAX_RATING: f64 = 5.0;

fn validate_rating(rating: f64) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        ))));
    }
    Ok(())
}

fn review_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Review",
        id,
    })
}

/// GET /api/reviews/by-book/:bookId (public)
///
/// The book's reviews, newest first, each author expanded to `{id, name}`.
pub async fn list_by_book(
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
) -> AppResult<Json<Vec<ReviewWithUser>>> {
    let rows = ReviewRepo::list_for_book(&state.pool, book_id).await?;
    let reviews = rows.into_iter().map(ReviewWithUser::from).collect();
    Ok(Json(reviews))
}

/// POST /api/reviews
///
/// One review per user and book; a second one is 409.
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    validate_rating(input.rating)?;

    if !BookRepo::exists(&state.pool, input.book).await? {
        return Err(AppError::BadRequest("Book does not exist".into()));
    }

    // uq_reviews_user_book maps duplicates to 409 in classify_sqlx_error.
    let review = ReviewRepo::create(&state.pool, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /api/reviews/:id
///
/// Own review only; someone else's review looks like a missing one (404).
/// The referenced book is immutable.
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }

    let review = ReviewRepo::update(&state.pool, id, user.user_id, &input)
        .await?
        .ok_or_else(|| review_not_found(id))?;
    Ok(Json(review))
}

/// DELETE /api/reviews/:id
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ReviewRepo::delete(&state.pool, id, user.user_id).await? {
        return Err(review_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
