//! HTTP endpoints: paths, parameters, request bodies and responses.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::errors::ResponseError;
use crate::name::{Name, NameAndWireValue};
use crate::types::{ObjectProperty, TypeReference};

/// HTTP methods supported by endpoints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// An endpoint path split at its parameters.
///
/// `/users/{userId}/posts` is `head: "/users/"` followed by one part with
/// `path_parameter: "userId"` and `tail: "/posts"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpPath {
    pub head: String,
    #[serde(default)]
    pub parts: Vec<HttpPathPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpPathPart {
    pub path_parameter: String,
    #[serde(default)]
    pub tail: String,
}

impl HttpPath {
    /// Parses a `{param}` template into head and parts.
    ///
    /// ## Examples
    ///
    /// ```
    /// use sdkgen_ir::HttpPath;
    ///
    /// let path = HttpPath::parse("/users/{userId}/posts");
    /// assert_eq!(path.head, "/users/");
    /// assert_eq!(path.parts[0].path_parameter, "userId");
    /// assert_eq!(path.parts[0].tail, "/posts");
    /// ```
    pub fn parse(template: &str) -> Self {
        let mut head = String::new();
        let mut parts: Vec<HttpPathPart> = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            let text = &rest[..open];
            match parts.last_mut() {
                Some(part) => part.tail.push_str(text),
                None => head.push_str(text),
            }
            parts.push(HttpPathPart {
                path_parameter: rest[open + 1..open + close].to_string(),
                tail: String::new(),
            });
            rest = &rest[open + close + 1..];
        }
        match parts.last_mut() {
            Some(part) => part.tail.push_str(rest),
            None => head.push_str(rest),
        }
        Self { head, parts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathParameter {
    pub name: Name,
    pub value_type: TypeReference,
    #[serde(default)]
    pub docs: Option<String>,
}

impl PathParameter {
    pub fn new(name: impl Into<Name>, value_type: TypeReference) -> Self {
        Self {
            name: name.into(),
            value_type,
            docs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameter {
    pub name: NameAndWireValue,
    pub value_type: TypeReference,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub docs: Option<String>,
}

impl QueryParameter {
    pub fn new(wire_value: impl Into<String>, value_type: TypeReference) -> Self {
        Self {
            name: NameAndWireValue::new(wire_value),
            value_type,
            allow_multiple: false,
            docs: None,
        }
    }

    /// Marks the parameter as repeatable (`?tag=a&tag=b`).
    pub fn multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpHeader {
    pub name: NameAndWireValue,
    pub value_type: TypeReference,
    #[serde(default)]
    pub docs: Option<String>,
}

impl HttpHeader {
    pub fn new(wire_value: &str, name: impl Into<Name>, value_type: TypeReference) -> Self {
        Self {
            name: NameAndWireValue::with_name(wire_value, name),
            value_type,
            docs: None,
        }
    }
}

/// Property of an inlined request body.
pub type InlinedRequestBodyProperty = ObjectProperty;

/// The shape of an endpoint's request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HttpRequestBody {
    /// An object declared inline on the endpoint.
    Inlined {
        name: Name,
        properties: Vec<InlinedRequestBodyProperty>,
        #[serde(default)]
        docs: Option<String>,
    },
    /// A reference to an existing type.
    #[serde(rename_all = "camelCase")]
    Reference { request_body_type: TypeReference },
    /// A multipart upload mixing files and ordinary fields.
    FileUpload {
        name: Name,
        properties: Vec<FileUploadProperty>,
    },
    /// Raw bytes.
    #[serde(rename_all = "camelCase")]
    Bytes {
        #[serde(default)]
        is_optional: bool,
    },
}

impl HttpRequestBody {
    /// The non-file properties of a file upload, in declaration order.
    pub fn file_body_properties(&self) -> Vec<&InlinedRequestBodyProperty> {
        match self {
            HttpRequestBody::FileUpload { properties, .. } => properties
                .iter()
                .filter_map(|p| match p {
                    FileUploadProperty::BodyProperty(property) => Some(property),
                    FileUploadProperty::File(_) => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The file parts of a file upload, in declaration order.
    pub fn file_properties(&self) -> Vec<&FileProperty> {
        match self {
            HttpRequestBody::FileUpload { properties, .. } => properties
                .iter()
                .filter_map(|p| match p {
                    FileUploadProperty::File(file) => Some(file),
                    FileUploadProperty::BodyProperty(_) => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_file_upload(&self) -> bool {
        matches!(self, HttpRequestBody::FileUpload { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileUploadProperty {
    File(FileProperty),
    BodyProperty(InlinedRequestBodyProperty),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProperty {
    pub key: NameAndWireValue,
    #[serde(default)]
    pub is_optional: bool,
}

/// How the SDK exposes an endpoint's request to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkRequest {
    pub request_parameter_name: Name,
    pub shape: SdkRequestShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SdkRequestShape {
    /// The caller passes the body type directly.
    JustRequestBody(TypeReference),
    /// A synthesized wrapper aggregates headers, query parameters and body.
    #[serde(rename_all = "camelCase")]
    Wrapper { wrapper_name: Name, body_key: Name },
}

/// The response of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HttpResponse {
    #[serde(rename_all = "camelCase")]
    Json {
        response_body_type: TypeReference,
        /// Return only this property of the decoded body.
        #[serde(default)]
        nested_property: Option<ObjectProperty>,
    },
    FileDownload,
    Text,
    Streaming {
        data_event: StreamingChunkType,
        #[serde(default)]
        terminator: Option<String>,
    },
}

impl HttpResponse {
    pub fn json(response_body_type: TypeReference) -> Self {
        HttpResponse::Json {
            response_body_type,
            nested_property: None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            HttpResponse::Json { .. } => "json",
            HttpResponse::FileDownload => "fileDownload",
            HttpResponse::Text => "text",
            HttpResponse::Streaming { .. } => "streaming",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamingChunkType {
    Json(TypeReference),
    Text,
}

/// An HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEndpoint {
    pub name: Name,
    #[serde(default)]
    pub docs: Option<String>,
    pub method: HttpMethod,
    pub path: HttpPath,
    #[serde(default)]
    pub path_parameters: Vec<PathParameter>,
    #[serde(default)]
    pub query_parameters: Vec<QueryParameter>,
    #[serde(default)]
    pub headers: Vec<HttpHeader>,
    #[serde(default)]
    pub request_body: Option<HttpRequestBody>,
    #[serde(default)]
    pub sdk_request: Option<SdkRequest>,
    #[serde(default)]
    pub response: Option<HttpResponse>,
    #[serde(default)]
    pub errors: Vec<ResponseError>,
    /// Base-URL slot (or environment) overriding the default environment.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl HttpEndpoint {
    /// Creates an endpoint from a `{param}` path template.
    ///
    /// Path parameters found in the template are added as strings.
    pub fn new(name: impl Into<Name>, method: HttpMethod, path: &str) -> Self {
        let path = HttpPath::parse(path);
        let path_parameters = path
            .parts
            .iter()
            .map(|part| PathParameter::new(part.path_parameter.as_str(), TypeReference::string()))
            .collect();
        Self {
            name: name.into(),
            docs: None,
            method,
            path,
            path_parameters,
            query_parameters: Vec::new(),
            headers: Vec::new(),
            request_body: None,
            sdk_request: None,
            response: None,
            errors: Vec::new(),
            base_url: None,
        }
    }

    /// Sets a wrapper request named `<Endpoint>Request` with body key `body`.
    pub fn with_wrapper(mut self, request_parameter_name: &str) -> Self {
        self.sdk_request = Some(SdkRequest {
            request_parameter_name: Name::new(request_parameter_name),
            shape: SdkRequestShape::Wrapper {
                wrapper_name: Name::new(format!("{}Request", self.name.pascal_case())),
                body_key: Name::new("body"),
            },
        });
        self
    }

    pub fn with_query(mut self, parameter: QueryParameter) -> Self {
        self.query_parameters.push(parameter);
        self
    }

    pub fn with_header(mut self, header: HttpHeader) -> Self {
        self.headers.push(header);
        self
    }

    pub fn with_body(mut self, body: HttpRequestBody) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_error(mut self, error_id: &str) -> Self {
        self.errors.push(ResponseError::new(error_id));
        self
    }

    /// Whether the generated method takes an aggregated request parameter.
    ///
    /// True when the endpoint has an SDK request and either has a body that
    /// is not a file upload made only of files, or has query parameters or
    /// headers to carry.
    pub fn needs_request_parameter(&self) -> bool {
        if self.sdk_request.is_none() {
            return false;
        }
        let has_other_inputs = !self.query_parameters.is_empty() || !self.headers.is_empty();
        match &self.request_body {
            Some(body) if body.is_file_upload() => {
                !body.file_body_properties().is_empty() || has_other_inputs
            }
            Some(_) => true,
            None => has_other_inputs,
        }
    }
}
