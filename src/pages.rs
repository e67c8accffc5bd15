use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::{fs, io};

use spdlog::{error, info, warn};
use thiserror::Error;

use crate::comments::{CommentInput, SubmissionState};
use crate::config::Config;
use crate::page_cache::{Lookup, PageCache};
use crate::store::client::{StoreClient, StoreError};
use crate::store::{NewComment, Post};
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::{FormView, PostRenderer};
use crate::view::rss_renderer::RssChannel;

/// Shared by every handler. All interior state is synchronized, so the
/// server holds it behind a plain `Arc`.
pub struct AppState {
    pub config: Config,
    pub store: StoreClient,
    pub cache: PageCache,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("content store: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Template(#[from] io::Error),
}

pub enum DetailOutcome {
    Rendered(Arc<String>),
    NotFound,
}

pub fn read_template(tpl_dir: &PathBuf, file_name: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(file_name);
    fs::read_to_string(full_path)
}

/// The listing is rendered from the store on every request; only detail
/// pages go through the cache.
pub async fn render_listing(state: &AppState) -> Result<String, PageError> {
    let posts = state.store.fetch_posts().await?;
    let template_src = read_template(&state.config.paths.template_dir, "home.tpl")?;
    let renderer = ListRenderer::new(&template_src)?;
    Ok(renderer.render(&posts))
}

fn render_detail(config: &Config, post: &Post, form: &FormView) -> Result<String, PageError> {
    let template_src = read_template(&config.paths.template_dir, "post.tpl")?;
    let renderer = PostRenderer::new(&template_src)?;
    Ok(renderer.render(post, form))
}

/// Serve a detail page. Fresh entries are returned as-is; stale entries
/// are returned as-is while at most one background refresh regenerates
/// them; unknown slugs block on one shared store fetch before
/// answering.
pub async fn detail_page(state: &Arc<AppState>, slug: &str) -> Result<DetailOutcome, PageError> {
    match state.cache.lookup(slug) {
        Lookup::Fresh { html, .. } => Ok(DetailOutcome::Rendered(html)),
        Lookup::Stale { html, .. } => {
            if state.cache.begin_refresh(slug) {
                let state = state.clone();
                let slug = slug.to_string();
                tokio::spawn(async move {
                    refresh_entry(state, slug).await;
                });
            }
            Ok(DetailOutcome::Rendered(html))
        }
        Lookup::Miss => {
            let gate = state.cache.render_gate(slug);
            let _guard = gate.lock().await;
            // A request queued behind the first miss finds the page
            // cached by the time it holds the gate.
            if let Lookup::Fresh { html, .. } | Lookup::Stale { html, .. } =
                state.cache.lookup(slug)
            {
                return Ok(DetailOutcome::Rendered(html));
            }

            info!("Rendering page for unknown slug {}", slug);
            let outcome = match state.store.fetch_post(slug).await {
                Ok(None) => Ok(DetailOutcome::NotFound),
                Ok(Some(post)) => {
                    render_detail(&state.config, &post, &FormView::empty()).map(|html| {
                        let (_, html) = state.cache.store(slug, post, html);
                        DetailOutcome::Rendered(html)
                    })
                }
                Err(e) => Err(e.into()),
            };
            state.cache.retire_gate(slug);
            outcome
        }
    }
}

/// Replace one stale entry with freshly fetched content. A post that
/// vanished from the store takes its page with it; on any failure the
/// stale entry stays served and the claim is released.
pub async fn refresh_entry(state: Arc<AppState>, slug: String) {
    match state.store.fetch_post(&slug).await {
        Ok(Some(post)) => match render_detail(&state.config, &post, &FormView::empty()) {
            Ok(html) => {
                state.cache.store(&slug, post, html);
                info!("Refreshed page for {}", slug);
            }
            Err(e) => {
                warn!("Keeping stale page for {}: {}", slug, e);
                state.cache.abort_refresh(&slug);
            }
        },
        Ok(None) => {
            info!("Post {} is gone, dropping its page", slug);
            state.cache.remove(&slug);
        }
        Err(e) => {
            warn!("Keeping stale page for {}: {}", slug, e);
            state.cache.abort_refresh(&slug);
        }
    }
}

/// The post a form submission belongs to, from the cache regardless of
/// freshness, or from the store for an uncached slug.
pub async fn lookup_post(state: &Arc<AppState>, slug: &str) -> Result<Option<Arc<Post>>, PageError> {
    match state.cache.lookup(slug) {
        Lookup::Fresh { post, .. } | Lookup::Stale { post, .. } => Ok(Some(post)),
        Lookup::Miss => match state.store.fetch_post(slug).await? {
            None => Ok(None),
            Some(post) => {
                let html = render_detail(&state.config, &post, &FormView::empty())?;
                let (post, _) = state.cache.store(slug, post, html);
                Ok(Some(post))
            }
        },
    }
}

/// Run one submission through its lifecycle. Invalid input never
/// reaches the store; a failed write comes back as `Failed`.
pub async fn submit_comment(state: &AppState, input: &CommentInput) -> SubmissionState {
    let submission = SubmissionState::new().submit(input);
    if submission != SubmissionState::Submitting {
        return submission;
    }

    let new_comment = NewComment {
        post_id: input.post_id.trim().to_string(),
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        comment: input.comment.trim().to_string(),
    };
    match state.store.create_comment(&new_comment).await {
        Ok(()) => submission.complete(true),
        Err(e) => {
            error!("Error storing comment for {}: {}", new_comment.post_id, e);
            submission.complete(false)
        }
    }
}

/// The form POST answers with the full detail page re-rendered around
/// the submission outcome.
pub async fn comment_page(
    state: &Arc<AppState>,
    slug: &str,
    input: &CommentInput,
) -> Result<DetailOutcome, PageError> {
    let post = match lookup_post(state, slug).await? {
        None => return Ok(DetailOutcome::NotFound),
        Some(post) => post,
    };

    let submission = submit_comment(state.as_ref(), input).await;
    let form = FormView::from_submission(&submission, input);
    let html = render_detail(&state.config, &post, &form)?;
    Ok(DetailOutcome::Rendered(Arc::new(html)))
}

/// `Ok(None)` when no feed is configured.
pub async fn render_feed(state: &AppState) -> Result<Option<Vec<u8>>, PageError> {
    let feed = match state.config.feed.as_ref() {
        None => return Ok(None),
        Some(feed) => feed,
    };

    let posts = state.store.fetch_posts().await?;
    let rss = RssChannel {
        ch_title: feed.title.as_str(),
        ch_link: feed.site_url.as_str(),
        ch_desc: feed.description.as_str(),
    };
    match rss.render(&posts) {
        Ok(xml) => Ok(Some(xml)),
        Err(e) => Err(PageError::Template(io::Error::new(
            ErrorKind::InvalidInput,
            format!("Error rendering feed: {}", e),
        ))),
    }
}

/// Pre-render every known detail page so the first visitors are served
/// from the cache. Failing to enumerate slugs is fatal; failing one
/// page is not.
pub async fn warm_detail_cache(state: &Arc<AppState>) -> Result<(), PageError> {
    let slugs = state.store.fetch_slugs().await?;
    for entry in slugs.iter() {
        let slug = entry.slug.current.as_str();
        match state.store.fetch_post(slug).await {
            Ok(Some(post)) => match render_detail(&state.config, &post, &FormView::empty()) {
                Ok(html) => {
                    state.cache.store(slug, post, html);
                }
                Err(e) => warn!("Skipping {} while warming up: {}", slug, e),
            },
            Ok(None) => warn!("Slug {} vanished while warming up", slug),
            Err(e) => warn!("Skipping {} while warming up: {}", slug, e),
        }
    }
    info!("Warmed {} of {} pages", state.cache.len(), slugs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_templates_from_the_template_dir() {
        let src = read_template(&PathBuf::from("res/template"), "home.tpl").unwrap();
        assert!(src.contains("{{#posts}}"));
    }

    #[test]
    fn missing_template_is_an_error() {
        assert!(read_template(&PathBuf::from("res/template"), "nope.tpl").is_err());
    }
}
