use chrono::{DateTime, Utc};
use serde::Deserialize;

pub mod body;
pub mod client;
pub mod queries;

use crate::store::body::Block;

/// Slug object as stored: `{"current": "hello-world"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Slug {
    pub current: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// Opaque image handle. URL construction is left to external tooling,
/// only the raw asset reference travels through this system.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageRef {
    pub asset: Reference,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub name: String,
    pub image: Option<ImageRef>,
}

/// Projection returned by the all-posts listing query.
#[derive(Debug, Clone, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: Author,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "mainImage")]
    pub main_image: Option<ImageRef>,
    pub slug: Slug,
}

/// Projection returned by the all-slugs query used for path enumeration.
#[derive(Debug, Clone, Deserialize)]
pub struct SlugEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Slug,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub comment: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub post: Option<Reference>,
}

impl Comment {
    pub fn belongs_to(&self, post_id: &str) -> bool {
        match self.post {
            Some(ref parent) => parent.reference == post_id,
            None => false,
        }
    }
}

/// Full document returned by the single-post query.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub author: Author,
    #[serde(rename = "mainImage")]
    pub main_image: Option<ImageRef>,
    pub slug: Slug,
    #[serde(default)]
    pub body: Vec<Block>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Comments allowed into the rendered page. The single-post query already
    /// filters on the store side; this re-checks the same condition so a
    /// misbehaving projection cannot leak unapproved or foreign comments.
    pub fn visible_comments(&self) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|c| c.approved && c.belongs_to(&self.id))
            .collect()
    }
}

/// Payload for the comment-creating mutation.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: String,
    pub name: String,
    pub email: String,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::{POSTS_JSON, POST_DETAIL_JSON, SLUGS_JSON};

    #[test]
    fn deserializes_listing_projection() {
        let posts: Vec<PostSummary> = serde_json::from_str(POSTS_JSON).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].slug.current, "hello-world");
        assert_eq!(posts[0].author.name, "Jane Porter");
        assert_eq!(posts[1].title, "Under the weather");
        assert!(posts[1].main_image.is_none());
    }

    #[test]
    fn deserializes_slug_enumeration() {
        let slugs: Vec<SlugEntry> = serde_json::from_str(SLUGS_JSON).unwrap();
        assert_eq!(slugs.len(), 2);
        assert_eq!(slugs[0].id, "post-1");
        assert_eq!(slugs[0].slug.current, "hello-world");
        assert_eq!(slugs[1].slug.current, "under-the-weather");
    }

    #[test]
    fn deserializes_detail_document() {
        let post: Post = serde_json::from_str(POST_DETAIL_JSON).unwrap();
        assert_eq!(post.id, "post-1");
        assert_eq!(post.slug.current, "hello-world");
        assert_eq!(post.created_at.to_rfc3339(), "2022-05-10T12:00:00+00:00");
        assert_eq!(post.body.len(), 6);
        assert_eq!(post.comments.len(), 3);
    }

    #[test]
    fn visible_comments_require_approval_and_matching_parent() {
        let post: Post = serde_json::from_str(POST_DETAIL_JSON).unwrap();
        let visible = post.visible_comments();
        // One approved comment of this post; the unapproved one and the
        // approved one referencing another post stay hidden.
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Ada");
        assert!(visible[0].approved);
        assert!(visible[0].belongs_to("post-1"));
    }

    #[test]
    fn comment_without_parent_reference_is_never_visible() {
        let orphan: Comment = serde_json::from_str(
            r#"{"_id": "c9", "name": "Nobody", "comment": "hi", "approved": true}"#,
        )
        .unwrap();
        assert!(!orphan.belongs_to("post-1"));
    }
}
