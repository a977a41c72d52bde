pub mod auth;
pub mod books;
pub mod favorites;
pub mod health;
pub mod reading;
pub mod reviews;
pub mod sagas;
pub mod tags;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
///
/// /tags/categories                     categories with visible tags (auth)
/// /tags                                create tag (auth)
/// /tags/{id}                           delete own tag (auth)
///
/// /books                               list (public), create (auth)
/// /books/quotes/favorites              favorite-quote feed (public)
/// /books/{id}                          get (public), patch, delete (auth)
/// /books/{id}/status                   patch status (auth)
/// /books/{id}/release                  patch release date (auth)
/// /books/{id}/saga                     patch / delete saga assignment (auth)
/// /books/{id}/quotes                   list (public), create (auth)
/// /books/{id}/quotes/{qid}             patch, delete (auth)
/// /books/{id}/{catKey}/{tagId}         attach / detach tag (auth)
///
/// /sagas                               list (public), create (auth)
/// /sagas/{id}                          get (public), patch, delete (auth)
/// /sagas/{id}/books/{bookId}           add / remove member (auth)
/// /sagas/{id}/{catKey}/{tagId}         attach / detach tag (auth)
///
/// /reviews/by-book/{bookId}            list (public)
/// /reviews                             create (auth)
/// /reviews/{id}                        patch, delete own review (auth)
///
/// /reading                             list, append (auth)
///
/// /favorites                           saved books (auth)
/// /favorites/{bookId}                  save / unsave book (auth)
/// /favorites/sagas                     saved sagas (auth)
/// /favorites/sagas/{sagaId}            save / unsave saga (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/tags", tags::router())
        .nest("/books", books::router())
        .nest("/sagas", sagas::router())
        .nest("/reviews", reviews::router())
        .nest("/reading", reading::router())
        .nest("/favorites", favorites::router())
}
