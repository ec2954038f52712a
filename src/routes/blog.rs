use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};

use crate::db::models::{BlogPost, Record};
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/blog", get(list_posts))
}

/// Posts written into an empty blog on first read.
pub fn seed_posts() -> Vec<BlogPost> {
    vec![
        BlogPost {
            title: "Launching our pastel fintech SaaS".into(),
            slug: "launching-pastel-fintech-saas".into(),
            excerpt: "A clean, minimalist platform for modern teams.".into(),
            content: "Welcome to our new SaaS built with a pastel vibe.".into(),
            cover_image: None,
            tags: vec!["launch".into(), "product".into()],
            author: Some("Team".into()),
        },
        BlogPost {
            title: "Designing with softness and clarity".into(),
            slug: "designing-with-softness".into(),
            excerpt: "Why soft pastels improve readability and focus.".into(),
            content: "Soft palettes can reduce cognitive load for users.".into(),
            cover_image: None,
            tags: vec!["design".into(), "ui".into()],
            author: Some("Design".into()),
        },
    ]
}

/// GET /api/blog — every post, seeding the collection the first time it is empty
pub async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<Map<String, Value>>>> {
    let mut posts = state.gateway.get_documents(BlogPost::COLLECTION).await?;

    if posts.is_empty() {
        if state
            .gateway
            .seed_if_empty(BlogPost::COLLECTION, &seed_posts())
            .await?
        {
            tracing::info!("Seeded empty blog");
        }
        // Re-read even if another request seeded first.
        posts = state.gateway.get_documents(BlogPost::COLLECTION).await?;
    }

    Ok(Json(posts.into_iter().map(|p| p.into_public()).collect()))
}
