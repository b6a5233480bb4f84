//! In-memory runtime for exercising generated SDKs.
//!
//! Nothing goes over the network: every call records the request on the
//! `Context` and answers with the response the context was built with.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A request as the SDK handed it to the transport.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: String,
    pub method: reqwest::Method,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

/// Per-call context carrying the canned response.
#[derive(Debug, Default)]
pub struct Context {
    status: u16,
    body: Vec<u8>,
    sent: Mutex<Vec<SentRequest>>,
}

impl Context {
    pub fn respond(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            sent: Mutex::default(),
        }
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    fn record(&self, request: SentRequest) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }
}

/// A non-success response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status_code: u16,
    pub body: Vec<u8>,
}

impl ApiError {
    pub fn new(status_code: u16, body: Vec<u8>) -> Self {
        Self { status_code, body }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status {}: {}",
            self.status_code,
            String::from_utf8_lossy(&self.body)
        )
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug)]
pub enum Error {
    Api(ApiError),
    Structured(Box<dyn std::error::Error + Send + Sync>),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api(error) => write!(f, "{}", error),
            Error::Structured(error) => write!(f, "{}", error),
            Error::Json(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for Error {}

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        Error::Api(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json(error)
    }
}

#[derive(Debug, Clone)]
pub struct RequestBody {
    pub content: Vec<u8>,
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Self {
            content: serde_json::to_vec(value)?,
        })
    }
}

pub type ErrorDecoder = dyn Fn(u16, &[u8]) -> Error;

pub struct CallParams<'a> {
    pub url: String,
    pub method: reqwest::Method,
    pub headers: Headers,
    pub request: Option<RequestBody>,
    pub response_is_optional: bool,
    pub error_decoder: Option<&'a ErrorDecoder>,
}

#[derive(Debug, Clone)]
pub struct Caller {
    client: reqwest::Client,
}

impl Caller {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    fn send(
        &self,
        ctx: &Context,
        url: String,
        method: reqwest::Method,
        headers: Headers,
        request: Option<RequestBody>,
        error_decoder: Option<&ErrorDecoder>,
    ) -> Result<Vec<u8>, Error> {
        ctx.record(SentRequest {
            url,
            method,
            headers,
            body: request.map(|body| body.content),
        });
        if ctx.status >= 400 {
            return Err(match error_decoder {
                Some(decode) => decode(ctx.status, &ctx.body),
                None => ApiError::new(ctx.status, ctx.body.clone()).into(),
            });
        }
        Ok(ctx.body.clone())
    }

    fn send_call(&self, ctx: &Context, params: CallParams<'_>) -> Result<Vec<u8>, Error> {
        self.send(
            ctx,
            params.url,
            params.method,
            params.headers,
            params.request,
            params.error_decoder,
        )
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        params: CallParams<'_>,
    ) -> Result<T, Error> {
        let optional = params.response_is_optional;
        let body = self.send_call(ctx, params)?;
        if optional && body.is_empty() {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn call_bytes(&self, ctx: &Context, params: CallParams<'_>) -> Result<Vec<u8>, Error> {
        self.send_call(ctx, params)
    }

    pub async fn call_text(&self, ctx: &Context, params: CallParams<'_>) -> Result<String, Error> {
        let body = self.send_call(ctx, params)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    pub async fn call_empty(&self, ctx: &Context, params: CallParams<'_>) -> Result<(), Error> {
        self.send_call(ctx, params).map(|_| ())
    }
}

pub struct StreamParams<'a> {
    pub url: String,
    pub method: reqwest::Method,
    pub headers: Headers,
    pub request: Option<RequestBody>,
    pub error_decoder: Option<&'a ErrorDecoder>,
    pub delimiter: Option<&'a str>,
}

/// Items decoded from a line-delimited response.
#[derive(Debug)]
pub struct Stream<T> {
    items: Vec<T>,
}

impl<T> Stream<T> {
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

pub struct Streamer<'a> {
    caller: &'a Caller,
}

impl<'a> Streamer<'a> {
    pub fn new(caller: &'a Caller) -> Self {
        Self { caller }
    }

    pub async fn stream<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        params: StreamParams<'_>,
    ) -> Result<Stream<T>, Error> {
        let delimiter = params.delimiter.unwrap_or("\n").to_string();
        let body = self.caller.send(
            ctx,
            params.url,
            params.method,
            params.headers,
            params.request,
            params.error_decoder,
        )?;
        let text = String::from_utf8_lossy(&body).into_owned();
        let items = text
            .split(delimiter.as_str())
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Stream { items })
    }
}

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct FileParam {
    name: Option<String>,
    content: Vec<u8>,
}

impl FileParam {
    pub fn new(name: Option<&str>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.map(str::to_string),
            content: content.into(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

const BOUNDARY: &str = "sdkgen-boundary";

#[derive(Debug, Default)]
pub struct MultipartWriter {
    body: Vec<u8>,
}

impl MultipartWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_file(&mut self, name: &str, filename: &str, file: &FileParam) {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(&file.content);
        self.body.extend_from_slice(b"\r\n");
    }

    pub fn write_field(&mut self, name: &str, value: impl Into<String>) {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY,
                name,
                value.into()
            )
            .as_bytes(),
        );
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn finish(mut self) -> RequestBody {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        RequestBody { content: self.body }
    }
}

pub fn write_multipart_json<T: Serialize + ?Sized>(
    writer: &mut MultipartWriter,
    name: &str,
    value: &T,
) -> Result<(), Error> {
    writer.write_field(name, serde_json::to_string(value)?);
    Ok(())
}

/// A field that distinguishes "not sent" from an explicit `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Optional<T> {
    #[default]
    Omitted,
    Null,
    Value(T),
}

impl<T> Optional<T> {
    pub fn value(value: T) -> Self {
        Optional::Value(value)
    }

    pub fn null() -> Self {
        Optional::Null
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, Optional::Omitted)
    }
}

impl<T: Serialize> Serialize for Optional<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Optional::Value(value) => value.serialize(serializer),
            Optional::Omitted | Optional::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Optional<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Optional::Value(value),
            None => Optional::Null,
        })
    }
}
