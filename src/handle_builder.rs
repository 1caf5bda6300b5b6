//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Builder for creating a [`Handle`](crate::Handle)

use std::default::Default;
use std::env;
use std::result::Result;
use std::time::Duration;

use crate::error::{param_err, param_error, BaasError};
use crate::handle::Handle;
use reqwest::Certificate;
use reqwest::Client;
use url::Url;

/// Builder used to set all the parameters to create a [`Handle`](crate::Handle).
///
/// The handle is constructed explicitly by the application's composition
/// root and injected into every operation; the SDK itself never creates
/// process-wide clients behind the scenes.
#[derive(Default, Debug, Clone)]
pub struct HandleBuilder {
    pub(crate) endpoint: String,
    pub(crate) namespace: String,
    pub(crate) service_id: String,
    pub(crate) access_token: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) client: Option<Client>,
    pub(crate) add_cert: Option<Certificate>,
    pub(crate) accept_invalid_certs: bool,
    // For error messaging
    pub(crate) from_environment: bool,
}

impl HandleBuilder {
    /// Create a new HandleBuilder struct.
    ///
    /// The default HandleBuilder sets no endpoint or namespace. Consider
    /// calling [`from_environment()`](HandleBuilder::from_environment()) to
    /// collect all parameters from the local environment by default.
    pub fn new() -> Self {
        HandleBuilder {
            ..Default::default()
        }
    }

    /// Build a new [`Handle`].
    ///
    /// Note: Internally, if the [`HandleBuilder`] contains a reference to an
    /// existing [`reqwest::Client`], it will clone and use that. Otherwise, it
    /// will create a new [`reqwest::Client`] for its own internal use. See
    /// [`reqwest_client()`](HandleBuilder::reqwest_client()).
    pub fn build(self) -> Result<Handle, BaasError> {
        Handle::new(&self)
    }

    /// Gather configuration settings from the current environment.
    ///
    /// This method will scan the process [`standard environment`](std::env::Vars)
    /// to collect and set the configuration parameters. The values can be
    /// overridden in code if this method is called first and other methods are
    /// called afterwards.
    ///
    /// The following environment variables are used:
    ///
    /// | variable | description |
    /// | -------- | ----------- |
    /// | `BAAS_ENDPOINT` | The URL endpoint to use. See [`HandleBuilder::endpoint()`]. |
    /// | `BAAS_NAMESPACE` | The namespace segment substituted into resource paths. |
    /// | `BAAS_SERVICE_ID` | The service identifier sent with every request. |
    /// | `BAAS_TOKEN` | The opaque access token sent with every request. |
    /// | `BAAS_TIMEOUT_MS` | The default request timeout, in milliseconds. |
    /// | `BAAS_CA_CERT` | The path to a certificate file in `pem` format (see [`HandleBuilder::add_cert_from_pemfile()`]). |
    /// | `BAAS_ACCEPT_INVALID_CERTS` | If set to `1` or `true`, do not check certificates (see [`HandleBuilder::danger_accept_invalid_certs()`]). |
    ///
    pub fn from_environment(mut self) -> Result<Self, BaasError> {
        self.from_environment = true;
        if let Some(val) = env::var("BAAS_ENDPOINT").ok() {
            self = self.endpoint(&val)?;
        }
        if let Some(val) = env::var("BAAS_NAMESPACE").ok() {
            self = self.namespace(&val)?;
        }
        if let Some(val) = env::var("BAAS_SERVICE_ID").ok() {
            self = self.service_id(&val)?;
        }
        if let Some(val) = env::var("BAAS_TOKEN").ok() {
            self = self.access_token(&val)?;
        }
        if let Some(val) = env::var("BAAS_TIMEOUT_MS").ok() {
            match val.parse::<u64>() {
                Ok(ms) => {
                    self = self.timeout(Duration::from_millis(ms))?;
                }
                Err(_) => {
                    return param_err!("invalid BAAS_TIMEOUT_MS value '{}'", val);
                }
            }
        }
        if let Some(val) = env::var("BAAS_CA_CERT").ok() {
            self = self.add_cert_from_pemfile(&val)?;
        }
        if let Some(val) = env::var("BAAS_ACCEPT_INVALID_CERTS").ok() {
            let lv = val.to_lowercase();
            if lv == "true" || lv == "1" {
                self = self.danger_accept_invalid_certs(true)?;
            }
        }
        Ok(self)
    }

    /// Specify the service endpoint, as a full `http` or `https` URL.
    pub fn endpoint(mut self, endpoint: &str) -> Result<Self, BaasError> {
        let u = Url::parse(endpoint)?;
        match u.scheme() {
            "http" | "https" => {}
            s => {
                return param_err!("unsupported endpoint scheme '{}'", s);
            }
        }
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Specify the namespace segment substituted into the resource paths.
    ///
    /// Namespace resolution (from tenant credentials) is performed by the
    /// calling layer; this SDK only carries the resolved value.
    pub fn namespace(mut self, namespace: &str) -> Result<Self, BaasError> {
        if namespace.is_empty() {
            return param_err!("namespace is empty");
        }
        self.namespace = namespace.to_string();
        Ok(self)
    }

    /// Specify the service identifier sent with every request.
    pub fn service_id(mut self, service_id: &str) -> Result<Self, BaasError> {
        self.service_id = service_id.to_string();
        Ok(self)
    }

    /// Specify the opaque access token sent with every request.
    ///
    /// Token acquisition and refresh are performed by the calling layer.
    pub fn access_token(mut self, token: &str) -> Result<Self, BaasError> {
        self.access_token = token.to_string();
        Ok(self)
    }

    /// Specify the default timeout for all requests made with this handle.
    ///
    /// If not set, a default of 30 seconds is used. Individual operations can
    /// override this with their own `timeout()` setter.
    pub fn timeout(mut self, t: Duration) -> Result<Self, BaasError> {
        if t < Duration::from_millis(1) {
            return param_err!("timeout must be at least 1 millisecond");
        }
        self.timeout = Some(t);
        Ok(self)
    }

    /// Specify an existing [`reqwest::Client`] to use for all requests.
    ///
    /// If not set, the handle creates its own client.
    pub fn reqwest_client(mut self, client: &Client) -> Result<Self, BaasError> {
        self.client = Some(client.clone());
        Ok(self)
    }

    /// Add a root certificate, in PEM format, for verifying the service's
    /// certificate.
    pub fn add_cert_from_pemfile(mut self, path: &str) -> Result<Self, BaasError> {
        let pem = std::fs::read(path)
            .map_err(|e| param_error!("error reading pemfile {}: {}", path, e))?;
        let cert = Certificate::from_pem(&pem)
            .map_err(|e| param_error!("error parsing pemfile {}: {}", path, e))?;
        self.add_cert = Some(cert);
        Ok(self)
    }

    /// Skip verification of the service's certificate.
    ///
    /// Only intended for local or test deployments with self-signed
    /// certificates.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Result<Self, BaasError> {
        self.accept_invalid_certs = accept;
        Ok(self)
    }
}
