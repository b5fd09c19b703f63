use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Request, Response};
use http_body_util::Full;
use serde::Serialize;
use tower::Service;

#[derive(Clone, Debug)]
enum BodyKind {
    Empty,
    Bytes(Bytes),
    Json(Bytes),
    Form(Bytes),
}

/// Fluent request builder created by [`HttpClient`](crate::HttpClient) verbs.
///
/// Header errors are deferred and surface from [`send`](Self::send) so the
/// chain stays infallible.
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: String,
    query: Vec<(String, String)>,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: BodyKind,
    error: Option<HttpError>,
    transport_security: TransportSecurity,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: String,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: BodyKind::Empty,
            error: None,
            transport_security,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => self.headers.push((name, value)),
            (Err(e), _) => self.error = Some(HttpError::InvalidHeaderName(e)),
            (_, Err(e)) => self.error = Some(HttpError::InvalidHeaderValue(e)),
        }
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        for (name, value) in headers {
            self = self.header(&name, &value);
        }
        self
    }

    /// Append a query pair. Pairs are form-encoded onto the URL at send time,
    /// after any query already present in the URL.
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Serialize `body` as JSON. `Content-Type: application/json` is added
    /// unless the caller already set one.
    ///
    /// # Errors
    /// `HttpError::Json` if serialization fails, or a deferred header error.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.body = BodyKind::Json(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// # Errors
    /// `HttpError::FormEncode` if encoding fails, or a deferred header error.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.body = BodyKind::Form(Bytes::from(serde_urlencoded::to_string(fields)?));
        Ok(self)
    }

    pub fn body_string(mut self, body: String) -> Self {
        self.body = BodyKind::Bytes(Bytes::from(body));
        self
    }

    fn full_url(&self) -> Result<String, HttpError> {
        if self.query.is_empty() {
            return Ok(self.url.clone());
        }
        let encoded = serde_urlencoded::to_string(&self.query)?;
        let sep = if self.url.contains('?') { '&' } else { '?' };
        Ok(format!("{}{sep}{encoded}", self.url))
    }

    fn validate_url(&self, url: &str) -> Result<http::Uri, HttpError> {
        let uri: http::Uri = url.parse().map_err(|e: http::uri::InvalidUri| {
            HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::ParseError,
                reason: e.to_string(),
            }
        })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") if self.transport_security == TransportSecurity::AllowInsecureHttp => {
                Ok(uri)
            }
            Some("http") => Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
            }),
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            None => Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    /// Send the request.
    ///
    /// Any HTTP status comes back as `Ok`; only transport-level failures are `Err`.
    ///
    /// # Errors
    /// Deferred builder errors, URL/scheme validation, transport, timeout,
    /// authorization or `Overloaded` when the buffer is full.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let url = self.full_url()?;
        let uri = self.validate_url(&url)?;
        let mut builder = Request::builder().method(self.method).uri(uri);

        let has_content_type = self
            .headers
            .iter()
            .any(|(name, _)| name == http::header::CONTENT_TYPE);
        if !has_content_type {
            match &self.body {
                BodyKind::Json(_) => builder = builder.header("content-type", "application/json"),
                BodyKind::Form(_) => {
                    builder = builder.header("content-type", "application/x-www-form-urlencoded");
                }
                BodyKind::Empty | BodyKind::Bytes(_) => {}
            }
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let body = match self.body {
            BodyKind::Empty => Bytes::new(),
            BodyKind::Bytes(b) | BodyKind::Json(b) | BodyKind::Form(b) => b,
        };
        let request = builder.body(Full::new(body))?;

        try_acquire_buffer_slot(&mut self.service).await?;
        let inner: Response<ResponseBody> =
            self.service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}
