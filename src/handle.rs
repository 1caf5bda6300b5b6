//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use reqwest::header::{HeaderMap, HeaderValue};

use crate::envelope::{frame_command, ReplyEnvelope};
use crate::error::{param_err, user_agent};
use crate::error::BaasError;
use crate::handle_builder::HandleBuilder;
use crate::reader::Reader;
use crate::writer::Writer;

use std::result::Result;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

// Resource path templates, parameterized by the configured namespace.
pub(crate) const PATH_DB: &str = "/resource/v3/namespaces/{namespace}/db";
pub(crate) const PATH_CACHE: &str = "/resource/v2/namespaces/{namespace}/cache";
pub(crate) const PATH_FILE: &str = "/resource/v2/namespaces/{namespace}/file";

// Response header carrying the service-side diagnostic identifier.
const LOG_ID_HEADER: &str = "x-baas-logid";

/// **The main service handle**.
///
/// This should be created once by the application's composition root and used
/// throughout the application lifetime, across all threads.
///
/// Note: there is no need to enclose this struct in an `Rc` or [`Arc`], as it
/// uses an [`Arc`] internally, so calling `.clone()` on this struct will
/// always return the same underlying handle.
#[derive(Clone, Debug)]
pub struct Handle {
    // Use an inner Arc so cloning keeps the same contents
    pub(crate) inner: Arc<HandleRef>,
}

#[derive(Debug)]
pub(crate) struct HandleRef {
    pub(crate) client: reqwest::Client,
    pub(crate) endpoint: String,
    pub(crate) namespace: String,
    pub(crate) service_id: String,
    pub(crate) access_token: String,
    request_id: AtomicUsize,
    timeout: Duration,
}

// Per-request options threaded from the operation into the transport.
#[derive(Debug, Default)]
pub(crate) struct SendOptions {
    pub(crate) timeout: Duration,
    // operation name, for error context
    pub(crate) op: String,
}

impl Handle {
    /// Create a new [`HandleBuilder`].
    pub fn builder() -> HandleBuilder {
        HandleBuilder::new()
    }

    // Create the new Handle based on builder configuration
    pub(crate) fn new(b: &HandleBuilder) -> Result<Handle, BaasError> {
        if b.endpoint.is_empty() {
            if b.from_environment {
                return param_err!("can't determine service endpoint: set BAAS_ENDPOINT");
            }
            return param_err!("can't determine service endpoint: call HandleBuilder::endpoint()");
        }
        if b.namespace.is_empty() {
            if b.from_environment {
                return param_err!("can't determine namespace: set BAAS_NAMESPACE");
            }
            return param_err!("can't determine namespace: call HandleBuilder::namespace()");
        }
        // default timeout to 30 seconds
        let timeout = {
            if let Some(t) = b.timeout {
                t.clone()
            } else {
                Duration::new(30, 0)
            }
        };
        let c = {
            if let Some(c) = &b.client {
                c.clone()
            } else {
                let mut cb = reqwest::Client::builder()
                    .timeout(timeout)
                    .connect_timeout(timeout);
                if let Some(cert) = &b.add_cert {
                    cb = cb.add_root_certificate(cert.clone());
                }
                if b.accept_invalid_certs {
                    cb = cb.danger_accept_invalid_certs(true);
                }
                cb.build()?
            }
        };
        debug!(
            "Creating new Handle: endpoint={}, namespace={}",
            b.endpoint, b.namespace
        );
        Ok(Handle {
            inner: Arc::new(HandleRef {
                client: c,
                endpoint: b.endpoint.clone(),
                namespace: b.namespace.clone(),
                service_id: b.service_id.clone(),
                access_token: b.access_token.clone(),
                timeout: timeout,
                request_id: AtomicUsize::new(1),
            }),
        })
    }

    pub(crate) fn db_url(&self) -> String {
        self.resource_url(PATH_DB)
    }

    pub(crate) fn cache_url(&self) -> String {
        self.resource_url(PATH_CACHE)
    }

    #[allow(dead_code)]
    pub(crate) fn file_url(&self) -> String {
        self.resource_url(PATH_FILE)
    }

    fn resource_url(&self, template: &str) -> String {
        let mut url = self.inner.endpoint.clone();
        url.push_str(&template.replace("{namespace}", &self.inner.namespace));
        url
    }

    fn request_headers(&self) -> Result<HeaderMap, BaasError> {
        let request_id = self.inner.request_id.fetch_add(1, Ordering::Relaxed);
        let mut headers = HeaderMap::new();
        headers.insert("x-baas-request-id", HeaderValue::from(request_id));
        if !self.inner.access_token.is_empty() {
            let s = format!("Bearer {}", self.inner.access_token);
            headers.insert("Authorization", HeaderValue::from_str(s.as_str())?);
        }
        if !self.inner.service_id.is_empty() {
            headers.insert(
                "x-baas-service-id",
                HeaderValue::from_str(&self.inner.service_id)?,
            );
        }
        headers.insert("User-Agent", HeaderValue::from_str(user_agent())?);
        Ok(headers)
    }

    async fn post(
        &self,
        url: &str,
        content_type: &'static str,
        body: Vec<u8>,
        send_options: &SendOptions,
    ) -> Result<(Vec<u8>, String), BaasError> {
        let mut headers = self.request_headers()?;
        headers.insert("Content-Type", HeaderValue::from_static(content_type));
        trace!("POST {} ({} bytes)", url, body.len());
        let resp = self
            .inner
            .client
            .post(url)
            .body(body)
            .timeout(send_options.timeout.clone())
            .headers(headers)
            .send()
            .await?;
        // check resp status for 200, err on others
        if !resp.status().is_success() {
            let status = resp.status().clone();
            let content = resp.text().await?;
            return param_err!(
                "got unexpected http status: {}, response text: {}",
                status,
                content
            );
        }
        // the diagnostic identifier travels in a reply header; pass it
        // along for error messages
        let log_id = resp
            .headers()
            .get(LOG_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let result = resp.bytes().await?;
        Ok((result.to_vec(), log_id))
    }

    // Send one framed command document to the document-store path and
    // return a Reader over the reply's binary document payload.
    pub(crate) async fn send_doc_command(
        &self,
        w: Writer,
        send_options: &SendOptions,
    ) -> Result<Reader, BaasError> {
        let framed = frame_command(&w);
        let (body, log_id) = self
            .post(
                &self.db_url(),
                "application/octet-stream",
                framed.into_bytes(),
                send_options,
            )
            .await?;
        let env = ReplyEnvelope::parse(&body)?.check(&send_options.op, &log_id)?;
        let payload = env.doc_payload()?;
        Ok(Reader::new().from_bytes(&payload))
    }

    // Send one JSON command to the key-value path. The reply envelope is
    // returned unclassified along with the diagnostic id: the key-value
    // decode layer distinguishes absent-key payloads after classification.
    pub(crate) async fn send_json_command(
        &self,
        body: serde_json::Value,
        send_options: &SendOptions,
    ) -> Result<(ReplyEnvelope, String), BaasError> {
        let data = serde_json::to_vec(&body)?;
        let (body, log_id) = self
            .post(&self.cache_url(), "application/json", data, send_options)
            .await?;
        let env = ReplyEnvelope::parse(&body)?;
        Ok((env, log_id))
    }

    pub(crate) fn get_timeout(&self, t: &Option<Duration>) -> Duration {
        // if t is given, use that. If not, use handle's timeout
        if let Some(d) = t {
            return d.clone();
        }
        self.inner.timeout.clone()
    }
}
