//! The three read queries this front-end issues. The store evaluates them;
//! this side only guarantees their shape.

/// Card fields for every post, author joined in.
pub const ALL_POSTS: &str = r#"*[_type == "post"]{
  _id,
  title,
  author -> {
    name,
    image
  },
  description,
  mainImage,
  slug
}"#;

/// Identifier and slug of every post, for path enumeration.
pub const ALL_SLUGS: &str = r#"*[_type == "post"]{
  _id,
  slug {
    current
  }
}"#;

/// One post by exact slug match, with author fields and the comments that
/// have been approved for it. `$slug` is the only parameter.
pub const POST_BY_SLUG: &str = r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  _createdAt,
  title,
  author -> {
    name,
    image
  },
  'comments': *[
    _type == "comment" &&
    post._ref == ^._id &&
    approved == true],
  description,
  mainImage,
  slug,
  body
}"#;
