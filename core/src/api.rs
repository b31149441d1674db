//! Stateless HTTP request builder and response parser for the posts resource.
//!
//! # Design
//! `PostApi` holds only the base URL and the collection path and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. Whoever executes the round-trip in between
//! (a `Transport`, or the host directly) stays out of this module.

use crate::classify::error_for;
use crate::config::{ClientConfig, DEFAULT_NAMESPACE};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::mapper::{map_deleted, map_post, map_posts, map_updated_post};
use crate::types::{DeleteOptions, ListOptions, Post, PostFields, PostId};

/// Synchronous, stateless request builder for `{base_url}/{namespace}/posts`.
#[derive(Debug, Clone)]
pub struct PostApi {
    base_url: String,
    collection: String,
}

impl PostApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_namespace(base_url, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(base_url: &str, namespace: &str) -> Self {
        let namespace = namespace.trim_matches('/');
        let collection = if namespace.is_empty() {
            "/posts".to_string()
        } else {
            format!("/{namespace}/posts")
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_namespace(&config.base_url, &config.namespace)
    }

    /// Collection path relative to the base URL, e.g. `/wp/v2/posts`.
    pub fn collection_path(&self) -> &str {
        &self.collection
    }

    fn post_path(&self, id: PostId) -> String {
        format!("{}/{id}", self.collection)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn build_list_posts(&self, options: &ListOptions) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(&self.collection),
            query: options.to_query(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_find_post(&self, id: PostId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(&self.post_path(id)),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_post(&self, fields: &PostFields) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.url(&self.collection),
            query: Vec::new(),
            headers: json_headers(),
            body: Some(to_json(fields)?),
        })
    }

    pub fn build_update_post(&self, id: PostId, fields: &PostFields) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: self.url(&self.post_path(id)),
            query: Vec::new(),
            headers: json_headers(),
            body: Some(to_json(fields)?),
        })
    }

    pub fn build_delete_post(&self, id: PostId, options: DeleteOptions) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.url(&self.post_path(id)),
            query: vec![("force".to_string(), options.force.to_string())],
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response, &self.collection)?;
        map_posts(&response.body)
    }

    pub fn parse_find_post(&self, id: PostId, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &self.post_path(id))?;
        map_post(&response.body)
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &self.collection)?;
        map_post(&response.body)
    }

    pub fn parse_update_post(&self, id: PostId, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &self.post_path(id))?;
        map_updated_post(id, &response.body)
    }

    pub fn parse_delete_post(&self, id: PostId, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response, &self.post_path(id))?;
        map_deleted(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json(fields: &PostFields) -> Result<String, ApiError> {
    serde_json::to_string(fields).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Route non-2xx responses through the classifier.
fn check_status(response: &HttpResponse, resource: &str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(error_for(resource, response))
}
