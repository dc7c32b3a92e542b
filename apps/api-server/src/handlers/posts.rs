//! Post handlers: CRUD, listing and search.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Comment, NewPost, PostUpdate};
use quill_core::query::{ListQuery, SearchQuery, search};
use quill_shared::dto::{
    CreatePostRequest, ListPostsParams, MessageResponse, PostPage, SearchPostsParams,
    UpdatePostRequest,
};

use crate::middleware::auth::WriteAccess;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    params: web::Query<ListPostsParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let query = ListQuery::parse(
        params.sort.as_deref(),
        params.direction.as_deref(),
        params.page.as_deref(),
        params.limit.as_deref(),
    )?;

    let page = query.apply(state.posts.list().await);

    Ok(HttpResponse::Ok().json(PostPage {
        posts: page.items,
        page: page.page,
        limit: page.limit,
        total_posts: page.total_posts,
        total_pages: page.total_pages,
    }))
}

/// GET /api/posts/search
pub async fn search_posts(
    state: web::Data<AppState>,
    params: web::Query<SearchPostsParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let query = SearchQuery {
        query: params.query,
        title: params.title,
        content: params.content,
        author: params.author,
        date: params.date,
    };

    let matches = search(state.posts.list().await, &query);
    tracing::debug!(matches = matches.len(), "Searched posts");

    HttpResponse::Ok().json(matches)
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<u64>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    access: WriteAccess,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut new_post = new_post_from(body.into_inner());
    if new_post.author.as_deref().is_none_or(|a| a.trim().is_empty()) {
        new_post.author = access.username().map(str::to_string);
    }

    let post = state.posts.create(new_post).await?;
    tracing::info!(post_id = post.id, "Created post");

    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    _access: WriteAccess,
    path: web::Path<u64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let changes = PostUpdate {
        title: body.title,
        content: body.content,
    };

    let post = state.posts.update(path.into_inner(), changes).await?;
    tracing::info!(post_id = post.id, "Updated post");

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    _access: WriteAccess,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(id).await?;
    tracing::info!(post_id = id, "Deleted post");

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "Post with id {id} has been deleted successfully."
    ))))
}

fn new_post_from(req: CreatePostRequest) -> NewPost {
    NewPost {
        title: req.title,
        content: req.content,
        author: req.author,
        date: req.date,
        category: req.category,
        tags: req.tags,
        comments: req
            .comments
            .into_iter()
            .map(|c| Comment {
                user: c.user,
                text: c.text,
            })
            .collect(),
    }
}
