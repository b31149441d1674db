//! Mapping of successful response bodies into domain types.
//!
//! # Design
//! The wire shape wraps `title` and `content` in `{"rendered", "raw"}`
//! objects; some servers send plain strings instead. Both are accepted.
//! Every field is optional so partial bodies map cleanly; `id` falls back
//! to the requested one for update responses. HTML is copied through
//! untouched.

use serde::Deserialize;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::{Post, PostId};

/// A field that is either a bare string or a `{"rendered", "raw"}` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Rendered {
    Plain(String),
    Object {
        #[serde(default)]
        rendered: Option<String>,
        #[serde(default)]
        raw: Option<String>,
    },
}

impl Rendered {
    fn rendered(&self) -> Option<&str> {
        match self {
            Rendered::Plain(s) => Some(s),
            Rendered::Object { rendered, raw } => rendered.as_deref().or(raw.as_deref()),
        }
    }

    fn raw(&self) -> Option<&str> {
        match self {
            Rendered::Plain(_) => None,
            Rendered::Object { raw, .. } => raw.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePost {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    title: Option<Rendered>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    content: Option<Rendered>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

impl WirePost {
    /// Convert to a `Post`, taking the id from `known_id` when the body
    /// omits it. A body without an id and no known id is an error.
    fn into_post(self, known_id: Option<PostId>) -> Result<Post, ApiError> {
        let id = self
            .id
            .map(PostId)
            .or(known_id)
            .ok_or_else(|| ApiError::Deserialization("missing field `id`".to_string()))?;
        let text = |field: &Option<Rendered>| {
            field
                .as_ref()
                .and_then(Rendered::rendered)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Post {
            id,
            title: text(&self.title),
            status: self.status.unwrap_or_default(),
            content_html: text(&self.content),
            content_raw: self
                .content
                .as_ref()
                .and_then(Rendered::raw)
                .map(str::to_string),
            slug: self.slug.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
        })
    }
}

/// Body of a permanent delete: `{"deleted": true, "previous": {..}}`.
#[derive(Debug, Deserialize)]
struct DeleteBody {
    #[serde(default)]
    deleted: Option<bool>,
}

fn parse_wire<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

pub fn map_post(body: &str) -> Result<Post, ApiError> {
    parse_wire::<WirePost>(body)?.into_post(None)
}

pub fn map_posts(body: &str) -> Result<Vec<Post>, ApiError> {
    parse_wire::<Vec<WirePost>>(body)?
        .into_iter()
        .map(|wire| wire.into_post(None))
        .collect()
}

/// Map an update response for the post `id`. The body may omit any field,
/// including `id`, or be empty altogether; the result then carries only
/// the id and the caller re-fetches for the rest.
pub fn map_updated_post(id: PostId, body: &str) -> Result<Post, ApiError> {
    if body.trim().is_empty() {
        return Ok(Post {
            id,
            title: String::new(),
            status: String::new(),
            content_html: String::new(),
            content_raw: None,
            slug: String::new(),
            link: String::new(),
        });
    }
    parse_wire::<WirePost>(body)?.into_post(Some(id))
}

/// Outcome of a successful delete. A trash response carries the post itself
/// and no `deleted` flag, which counts as success. A 2xx body reporting
/// `"deleted": false` is surfaced as an `Http` error.
pub fn map_deleted(response: &HttpResponse) -> Result<bool, ApiError> {
    if response.body.trim().is_empty() {
        return Ok(true);
    }
    match parse_wire::<DeleteBody>(&response.body)?.deleted {
        Some(false) => Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        }),
        _ => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_rendered_wrappers() {
        let body = r#"{
            "id": 12,
            "status": "publish",
            "title": {"rendered": "Hello"},
            "content": {"rendered": "<p class=\"hello-world\">Hello world</p>\n", "protected": false},
            "slug": "hello",
            "link": "http://example.test/?p=12",
            "author": 1
        }"#;
        let post = map_post(body).unwrap();
        assert_eq!(post.id, PostId(12));
        assert_eq!(post.title, "Hello");
        assert_eq!(post.status, "publish");
        assert_eq!(post.content_html, "<p class=\"hello-world\">Hello world</p>\n");
        assert_eq!(post.content_raw, None);
        assert_eq!(post.slug, "hello");
    }

    #[test]
    fn keeps_raw_content_when_present() {
        let body = r#"{"id":1,"content":{"raw":"<b>x</b>","rendered":"<p><b>x</b></p>\n"}}"#;
        let post = map_post(body).unwrap();
        assert_eq!(post.content_html, "<p><b>x</b></p>\n");
        assert_eq!(post.content_raw.as_deref(), Some("<b>x</b>"));
    }

    #[test]
    fn falls_back_to_raw_when_rendered_missing() {
        let post = map_post(r#"{"id":1,"title":{"raw":"Draft title"}}"#).unwrap();
        assert_eq!(post.title, "Draft title");
    }

    #[test]
    fn accepts_plain_string_fields() {
        let post = map_post(r#"{"id":3,"title":"Plain","content":"<em>hi</em>"}"#).unwrap();
        assert_eq!(post.title, "Plain");
        assert_eq!(post.content_html, "<em>hi</em>");
    }

    #[test]
    fn html_entities_are_not_decoded() {
        let post = map_post(r#"{"id":3,"content":{"rendered":"&lt;script&gt; &amp; <i>x</i>"}}"#).unwrap();
        assert_eq!(post.content_html, "&lt;script&gt; &amp; <i>x</i>");
    }

    #[test]
    fn tolerates_omitted_fields() {
        let post = map_post(r#"{"id":5}"#).unwrap();
        assert_eq!(post.id, PostId(5));
        assert!(post.title.is_empty());
        assert!(post.status.is_empty());
        assert!(post.content_html.is_empty());
    }

    #[test]
    fn missing_id_is_an_error() {
        let err = map_post(r#"{"title":"no id"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn maps_empty_list() {
        assert!(map_posts("[]").unwrap().is_empty());
    }

    #[test]
    fn delete_flag_defaults_to_true() {
        let ok = |body: &str| map_deleted(&HttpResponse::new(200, body)).unwrap();
        assert!(ok(r#"{"id":1,"status":"trash"}"#));
        assert!(ok(r#"{"deleted":true,"previous":{"id":1}}"#));
        assert!(ok(""));
    }

    #[test]
    fn delete_reported_as_not_done_is_an_error() {
        let err = map_deleted(&HttpResponse::new(200, r#"{"deleted":false}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 200, ref body } if body.contains("false")));
    }

    #[test]
    fn null_delete_body_is_a_deserialization_error() {
        let err = map_deleted(&HttpResponse::new(200, "null")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn updated_post_takes_id_from_request_when_body_omits_it() {
        let post = map_updated_post(PostId(5), r#"{"title":{"rendered":"New"}}"#).unwrap();
        assert_eq!(post.id, PostId(5));
        assert_eq!(post.title, "New");
    }

    #[test]
    fn updated_post_from_empty_body_carries_only_id() {
        let post = map_updated_post(PostId(5), "  ").unwrap();
        assert_eq!(post.id, PostId(5));
        assert!(post.title.is_empty());
        assert_eq!(post.content_raw, None);
    }

    #[test]
    fn list_entry_without_id_is_an_error() {
        let err = map_posts(r#"[{"id":1},{"title":"no id"}]"#).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
