#[cfg(test)]
pub const POSTS_JSON: &str = r#"[
  {
    "_id": "post-1",
    "title": "Hello world",
    "author": {
      "name": "Jane Porter",
      "image": {"asset": {"_ref": "image-jane-100x100-png"}}
    },
    "description": "A first post to say hello",
    "mainImage": {"asset": {"_ref": "image-abc-800x600-jpg"}},
    "slug": {"current": "hello-world"}
  },
  {
    "_id": "post-2",
    "title": "Under the weather",
    "author": {
      "name": "Tom Marvolo"
    },
    "description": "Rainy week field notes",
    "slug": {"current": "under-the-weather"}
  }
]"#;

#[cfg(test)]
pub const SLUGS_JSON: &str = r#"[
  {"_id": "post-1", "slug": {"current": "hello-world"}},
  {"_id": "post-2", "slug": {"current": "under-the-weather"}}
]"#;

#[cfg(test)]
pub const POST_DETAIL_JSON: &str = r#"{
  "_id": "post-1",
  "_createdAt": "2022-05-10T12:00:00Z",
  "title": "Hello world",
  "author": {
    "name": "Jane Porter",
    "image": {"asset": {"_ref": "image-jane-100x100-png"}}
  },
  "description": "A first post to say hello",
  "mainImage": {"asset": {"_ref": "image-abc-800x600-jpg"}},
  "slug": {"current": "hello-world"},
  "body": [
    {
      "_type": "block",
      "style": "h2",
      "markDefs": [],
      "children": [{"_type": "span", "text": "A loud hello", "marks": []}]
    },
    {
      "_type": "block",
      "style": "normal",
      "markDefs": [],
      "children": [
        {"_type": "span", "text": "It is ", "marks": []},
        {"_type": "span", "text": "very", "marks": ["strong"]},
        {"_type": "span", "text": " nice to be here.", "marks": []}
      ]
    },
    {
      "_type": "block",
      "style": "normal",
      "markDefs": [{"_key": "lk1", "_type": "link", "href": "https://example.com/about"}],
      "children": [
        {"_type": "span", "text": "Read ", "marks": []},
        {"_type": "span", "text": "more", "marks": ["lk1"]}
      ]
    },
    {
      "_type": "block",
      "style": "normal",
      "listItem": "bullet",
      "markDefs": [],
      "children": [{"_type": "span", "text": "First note", "marks": []}]
    },
    {
      "_type": "block",
      "style": "normal",
      "listItem": "bullet",
      "markDefs": [],
      "children": [{"_type": "span", "text": "Second note", "marks": []}]
    },
    {
      "_type": "block",
      "style": "normal",
      "markDefs": [],
      "children": [{"_type": "span", "text": "Bye for now.", "marks": []}]
    }
  ],
  "comments": [
    {
      "_id": "c1",
      "name": "Ada",
      "email": "ada@example.com",
      "comment": "What a start!",
      "approved": true,
      "post": {"_ref": "post-1"}
    },
    {
      "_id": "c2",
      "name": "Spam Bot",
      "email": "bot@example.com",
      "comment": "Buy things",
      "approved": false,
      "post": {"_ref": "post-1"}
    },
    {
      "_id": "c3",
      "name": "Tom Marvolo",
      "comment": "Same here",
      "approved": true,
      "post": {"_ref": "post-2"}
    }
  ]
}"#;
