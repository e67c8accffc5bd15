use std::sync::Arc;

use ntex::util::Bytes;
use ntex::web;
use ntex_files::NamedFile;
use serde_json::json;
use spdlog::error;

use crate::comments::{CommentInput, SubmissionState};
use crate::config::Config;
use crate::page_cache::PageCache;
use crate::pages;
use crate::pages::{AppState, DetailOutcome, PageError};
use crate::store::client::StoreClient;

fn page_error_response(context: &str, e: PageError) -> web::HttpResponse {
    match e {
        PageError::Store(e) => {
            error!("Error talking to the content store for {}: {}", context, e);
            web::HttpResponse::BadGateway()
                .body("The content store is unavailable. Try again in a moment.")
        }
        PageError::Template(e) => {
            error!("Error rendering {}: {}", context, e);
            web::HttpResponse::InternalServerError().body("Error rendering page")
        }
    }
}

fn not_found() -> web::HttpResponse {
    web::HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body("<h1>404</h1><p>There is no post here.</p>")
}

fn html_page(html: String) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    match pages::render_listing(&state).await {
        Ok(html) => html_page(html),
        Err(e) => page_error_response("the listing", e),
    }
}

#[web::get("/post/{slug}")]
async fn view_post(
    path: web::types::Path<String>,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    let slug = path.into_inner();
    match pages::detail_page(&state, &slug).await {
        Ok(DetailOutcome::Rendered(html)) => html_page(html.as_str().to_string()),
        Ok(DetailOutcome::NotFound) => not_found(),
        Err(e) => page_error_response("the post page", e),
    }
}

/// Form submissions come back as the same page, re-rendered around the
/// submission outcome. An unreadable body counts as an empty form.
#[web::post("/post/{slug}/comment")]
async fn post_comment_form(
    path: web::types::Path<String>,
    body: Bytes,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    let slug = path.into_inner();
    let input: CommentInput = serde_urlencoded::from_bytes(&body).unwrap_or_default();

    match pages::comment_page(&state, &slug, &input).await {
        Ok(DetailOutcome::Rendered(html)) => html_page(html.as_str().to_string()),
        Ok(DetailOutcome::NotFound) => not_found(),
        Err(e) => page_error_response("the post page", e),
    }
}

#[web::post("/api/comments")]
async fn api_create_comment(
    payload: web::types::Json<CommentInput>,
    state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    match pages::submit_comment(&state, &payload).await {
        SubmissionState::Submitted => web::HttpResponse::Ok().json(&json!({"ok": true})),
        SubmissionState::Idle { errors } => {
            let messages: Vec<&str> = errors.iter().map(|e| e.message()).collect();
            web::HttpResponse::BadRequest().json(&json!({"errors": messages}))
        }
        SubmissionState::Failed => web::HttpResponse::BadGateway()
            .json(&json!({"message": "Could not submit comment"})),
        SubmissionState::Submitting => web::HttpResponse::InternalServerError().finish(),
    }
}

#[web::get("/feed.xml")]
async fn feed(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    match pages::render_feed(&state).await {
        Ok(Some(xml)) => web::HttpResponse::Ok()
            .content_type("application/rss+xml; charset=utf-8")
            .body(xml),
        Ok(None) => web::HttpResponse::NotFound().body("No feed configured"),
        Err(e) => page_error_response("the feed", e),
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(
    path: web::types::Path<String>,
    state: web::types::State<Arc<AppState>>,
) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> anyhow::Result<()> {
    let store = StoreClient::new(&config.content_store);
    let cache = PageCache::new(config.revalidate_window());

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;

    let app_state = Arc::new(AppState {
        config,
        store,
        cache,
    });

    pages::warm_detail_cache(&app_state).await?;

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(public_files)
            .service(feed)
            .service(view_post)
            .service(post_comment_form)
            .service(api_create_comment)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await?;

    Ok(())
}
