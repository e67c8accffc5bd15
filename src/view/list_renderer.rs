use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::store::PostSummary;

#[derive(ramhorns::Content)]
struct ListingPage {
    posts: Vec<PostCard>,
}

#[derive(ramhorns::Content)]
struct PostCard {
    link: String,
    title: String,
    description: String,
    author: String,
    author_image_ref: String,
    has_author_image: bool,
    image_ref: String,
    has_image: bool,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing listing template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
        })
    }

    pub fn render(&self, posts: &[PostSummary]) -> String {
        let mut cards = vec![];
        for post in posts {
            let card = PostCard {
                link: format!("/post/{}", post.slug.current),
                title: post.title.clone(),
                description: post.description.clone(),
                author: post.author.name.clone(),
                author_image_ref: image_reference(&post.author.image),
                has_author_image: post.author.image.is_some(),
                image_ref: image_reference(&post.main_image),
                has_image: post.main_image.is_some(),
            };
            cards.push(card);
        }

        self.template.render(&ListingPage {
            posts: cards,
        })
    }
}

/// Image documents only carry an opaque asset reference; the template
/// exposes it as an attribute instead of resolving a URL.
pub fn image_reference(image: &Option<crate::store::ImageRef>) -> String {
    match image {
        Some(image) => image.asset.reference.clone(),
        None => String::new(),
    }
}
