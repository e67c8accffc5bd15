use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::comments::{CommentInput, FieldError, SubmissionState};
use crate::store::body::render_blocks;
use crate::store::Post;
use crate::view::format_published;
use crate::view::list_renderer::image_reference;

#[derive(ramhorns::Content)]
struct DetailPage<'a> {
    title: &'a str,
    description: &'a str,
    author: &'a str,
    author_image_ref: String,
    has_author_image: bool,
    image_ref: String,
    has_image: bool,
    published: String,
    body_html: String,
    post_id: &'a str,
    slug: &'a str,
    comments: Vec<CommentView>,
    has_comments: bool,
    submitted: bool,
    failed: bool,
    field_errors: Vec<FieldMessage>,
    name_value: &'a str,
    email_value: &'a str,
    comment_value: &'a str,
}

#[derive(ramhorns::Content)]
struct CommentView {
    name: String,
    comment: String,
}

#[derive(ramhorns::Content)]
struct FieldMessage {
    message: &'static str,
}

/// What the comment form shows on top of the post itself. A fresh page
/// view is `empty`; after a POST it reflects the submission outcome,
/// echoing the typed values back so a rejected form keeps its input.
pub struct FormView {
    pub submitted: bool,
    pub failed: bool,
    pub errors: Vec<FieldError>,
    pub name: String,
    pub email: String,
    pub comment: String,
}

impl FormView {
    pub fn empty() -> FormView {
        FormView {
            submitted: false,
            failed: false,
            errors: vec![],
            name: String::new(),
            email: String::new(),
            comment: String::new(),
        }
    }

    pub fn from_submission(state: &SubmissionState, input: &CommentInput) -> FormView {
        match state {
            SubmissionState::Idle { errors } => FormView {
                submitted: false,
                failed: false,
                errors: errors.clone(),
                name: input.name.clone(),
                email: input.email.clone(),
                comment: input.comment.clone(),
            },
            SubmissionState::Submitting => FormView::empty(),
            SubmissionState::Submitted => FormView {
                submitted: true,
                ..FormView::empty()
            },
            SubmissionState::Failed => FormView {
                failed: true,
                errors: vec![],
                name: input.name.clone(),
                email: input.email.clone(),
                comment: input.comment.clone(),
                submitted: false,
            },
        }
    }
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, post: &Post, form: &FormView) -> String {
        let comments: Vec<CommentView> = post
            .visible_comments()
            .into_iter()
            .map(|c| CommentView {
                name: c.name.clone(),
                comment: c.comment.clone(),
            })
            .collect();
        let field_errors: Vec<FieldMessage> = form
            .errors
            .iter()
            .map(|e| FieldMessage { message: e.message() })
            .collect();

        let has_comments = !comments.is_empty();
        self.template.render(&DetailPage {
            title: post.title.as_str(),
            description: post.description.as_str(),
            author: post.author.name.as_str(),
            author_image_ref: image_reference(&post.author.image),
            has_author_image: post.author.image.is_some(),
            image_ref: image_reference(&post.main_image),
            has_image: post.main_image.is_some(),
            published: format_published(&post.created_at),
            body_html: render_blocks(&post.body),
            post_id: post.id.as_str(),
            slug: post.slug.current.as_str(),
            comments,
            has_comments,
            submitted: form.submitted,
            failed: form.failed,
            field_errors,
            name_value: form.name.as_str(),
            email_value: form.email.as_str(),
            comment_value: form.comment.as_str(),
        })
    }
}
