//! Post resource client: `PostApi` + a `Transport`.
//!
//! Every operation is build → send → parse, exactly one request per call.
//! The client keeps no state of its own beyond configuration, so a shared
//! reference can be used from several threads at once.

use tracing::{debug, warn};

use crate::api::PostApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{DeleteOptions, ListOptions, Post, PostFields, PostId};

#[derive(Debug, Clone)]
pub struct PostClient<T> {
    api: PostApi,
    transport: T,
}

impl PostClient<UreqTransport> {
    /// ureq-backed client for the configured site.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(PostApi::from_config(config), UreqTransport::from_config(config))
    }
}

impl<T: Transport> PostClient<T> {
    pub fn new(api: PostApi, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &PostApi {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.path, "sending request");
        let response = self.transport.send(&request)?;
        debug!(status = response.status, url = %request.path, "received response");
        Ok(response)
    }

    /// List posts. An empty page is an empty `Vec`, not an error.
    pub fn list_posts(&self, options: &ListOptions) -> Result<Vec<Post>, ApiError> {
        let response = self.execute(self.api.build_list_posts(options))?;
        let posts = self.api.parse_list_posts(response)?;
        if let Some(per_page) = options.per_page {
            if posts.len() > per_page as usize {
                warn!(per_page, returned = posts.len(), "server returned more posts than requested");
            }
        }
        Ok(posts)
    }

    /// Fetch one post. Trashed posts still resolve; permanently deleted
    /// ones are `NotFound`.
    pub fn find_post(&self, id: impl Into<PostId>) -> Result<Post, ApiError> {
        let id = id.into();
        let response = self.execute(self.api.build_find_post(id))?;
        self.api.parse_find_post(id, response)
    }

    pub fn create_post(&self, fields: &PostFields) -> Result<Post, ApiError> {
        let response = self.execute(self.api.build_create_post(fields)?)?;
        self.api.parse_create_post(response)
    }

    /// Partial update: fields left as `None` are not sent and stay as they
    /// are on the server.
    pub fn update_post(&self, id: impl Into<PostId>, fields: &PostFields) -> Result<Post, ApiError> {
        let id = id.into();
        let response = self.execute(self.api.build_update_post(id, fields)?)?;
        self.api.parse_update_post(id, response)
    }

    /// Move a post to the trash, or remove it for good with
    /// `DeleteOptions::force()`. Returns `true` on success.
    pub fn delete_post(&self, id: impl Into<PostId>, options: DeleteOptions) -> Result<bool, ApiError> {
        let id = id.into();
        let response = self.execute(self.api.build_delete_post(id, options))?;
        self.api.parse_delete_post(id, response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;

    /// Replays canned responses and records every request it sees.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn with(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::default(),
            }
        }

        fn seen(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    fn client(responses: Vec<Result<HttpResponse, TransportError>>) -> PostClient<ScriptedTransport> {
        PostClient::new(PostApi::new("http://wp.test"), ScriptedTransport::with(responses))
    }

    #[test]
    fn list_posts_sends_one_get_with_page_size() {
        let c = client(vec![Ok(HttpResponse::new(200, r#"[{"id":1,"title":{"rendered":"One"}}]"#))]);
        let posts = c.list_posts(&ListOptions::per_page(1)).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "One");

        let seen = c.transport().seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].path, "http://wp.test/wp/v2/posts");
        assert_eq!(seen[0].query, vec![("per_page".to_string(), "1".to_string())]);
    }

    #[test]
    fn oversized_page_is_returned_as_received() {
        let c = client(vec![Ok(HttpResponse::new(200, r#"[{"id":1},{"id":2}]"#))]);
        let posts = c.list_posts(&ListOptions::per_page(1)).unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn find_post_accepts_plain_integers() {
        let c = client(vec![Ok(HttpResponse::new(200, r#"{"id":42}"#))]);
        let post = c.find_post(42).unwrap();
        assert_eq!(post.id, PostId(42));
        assert_eq!(c.transport().seen()[0].path, "http://wp.test/wp/v2/posts/42");
    }

    #[test]
    fn find_post_missing_is_not_found() {
        let c = client(vec![Ok(HttpResponse::new(404, ""))]);
        let err = c.find_post(888888).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn create_post_validation_names_field() {
        let body = r#"{"code":"rest_invalid_param","message":"Invalid parameter(s): status","data":{"status":400,"params":{"status":"status is not one of publish, future, draft, pending, private."}}}"#;
        let c = client(vec![Ok(HttpResponse::new(400, body))]);
        let err = c
            .create_post(&PostFields::new().status("not really valid"))
            .unwrap_err();
        assert!(err.validation().is_some_and(|v| v.has_field("status")));
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn update_post_patches_item() {
        let c = client(vec![Ok(HttpResponse::new(200, r#"{"id":5,"title":{"rendered":"New"}}"#))]);
        let post = c.update_post(5, &PostFields::new().title("New")).unwrap();
        assert_eq!(post.title, "New");

        let seen = c.transport().seen();
        assert_eq!(seen[0].method, HttpMethod::Patch);
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"title":"New"}"#));
    }

    #[test]
    fn delete_post_forwards_force() {
        let c = client(vec![Ok(HttpResponse::new(
            200,
            r#"{"deleted":true,"previous":{"id":5}}"#,
        ))]);
        assert!(c.delete_post(5, DeleteOptions::force()).unwrap());
        let seen = c.transport().seen();
        assert_eq!(seen[0].method, HttpMethod::Delete);
        assert_eq!(seen[0].query, vec![("force".to_string(), "true".to_string())]);
    }

    #[test]
    fn transport_failure_is_propagated() {
        let c = client(vec![Err(TransportError::new("connection reset"))]);
        let err = c.find_post(1).unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref e) if e.message == "connection reset"));
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<PostClient<UreqTransport>>();
    }
}
