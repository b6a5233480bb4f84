//! Request bodies: what the wrapper type stores and how the body is sent.

use sdkgen_ir::{FileProperty, HttpEndpoint, HttpRequestBody, Literal, ObjectProperty, TypeReference};

use crate::errors::GeneratorError;

/// A body property whose value is fixed.
#[derive(Debug, Clone, Copy)]
pub struct BodyLiteral<'ir> {
    pub property: &'ir ObjectProperty,
    pub literal: &'ir Literal,
}

/// Body properties split into settable fields and literals.
#[derive(Debug, Clone, Default)]
pub struct BodyProperties<'ir> {
    pub fields: Vec<&'ir ObjectProperty>,
    pub literals: Vec<BodyLiteral<'ir>>,
    declared: Vec<&'ir ObjectProperty>,
}

impl<'ir> BodyProperties<'ir> {
    fn split(properties: impl IntoIterator<Item = &'ir ObjectProperty>) -> Self {
        let mut split = Self::default();
        for property in properties {
            split.declared.push(property);
            match property.value_type.as_literal() {
                Some(literal) => split.literals.push(BodyLiteral { property, literal }),
                None => split.fields.push(property),
            }
        }
        split
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Every property, literals included, in declaration order.
    pub fn declared_order(&self) -> &[&'ir ObjectProperty] {
        &self.declared
    }
}

/// An endpoint body with a generation strategy.
#[derive(Debug, Clone)]
pub enum RequestBodyModel<'ir> {
    /// JSON object declared on the endpoint.
    Inlined(BodyProperties<'ir>),
    /// An existing type sent as the whole JSON body.
    Reference(&'ir TypeReference),
    /// Multipart form: file parts plus ordinary fields.
    FileUpload {
        files: Vec<&'ir FileProperty>,
        body: BodyProperties<'ir>,
    },
}

impl<'ir> RequestBodyModel<'ir> {
    /// Classifies an endpoint's body.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::UnsupportedRequestBody` for raw byte bodies.
    pub fn from_endpoint(
        endpoint: &'ir HttpEndpoint,
        body: &'ir HttpRequestBody,
    ) -> Result<Self, GeneratorError> {
        Ok(match body {
            HttpRequestBody::Inlined { properties, .. } => {
                RequestBodyModel::Inlined(BodyProperties::split(properties))
            }
            HttpRequestBody::Reference { request_body_type } => {
                RequestBodyModel::Reference(request_body_type)
            }
            HttpRequestBody::FileUpload { .. } => RequestBodyModel::FileUpload {
                files: body.file_properties(),
                body: BodyProperties::split(body.file_body_properties()),
            },
            HttpRequestBody::Bytes { .. } => {
                return Err(GeneratorError::UnsupportedRequestBody {
                    endpoint: endpoint.name.original().to_string(),
                    kind: "bytes".to_string(),
                });
            }
        })
    }

    /// The properties stored on the wrapper type, if the body has any.
    pub fn properties(&self) -> Option<&BodyProperties<'ir>> {
        match self {
            RequestBodyModel::Inlined(body) | RequestBodyModel::FileUpload { body, .. } => Some(body),
            RequestBodyModel::Reference(_) => None,
        }
    }

    /// Whether the wrapper type needs hand-written serde impls.
    ///
    /// Only literals and reference bodies do. A body of plain fields keeps
    /// derived serde even when it is empty.
    pub fn needs_custom_serde(&self) -> bool {
        match self {
            RequestBodyModel::Inlined(body) => !body.literals.is_empty(),
            RequestBodyModel::Reference(_) => true,
            RequestBodyModel::FileUpload { body, .. } => !body.literals.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkgen_ir::{FileUploadProperty, HttpMethod, Name, NameAndWireValue};

    fn upload(properties: Vec<FileUploadProperty>) -> HttpEndpoint {
        HttpEndpoint::new("upload", HttpMethod::Post, "/files")
            .with_wrapper("request")
            .with_body(HttpRequestBody::FileUpload {
                name: Name::new("UploadRequest"),
                properties,
            })
    }

    #[test]
    fn inlined_body_splits_literals() {
        let endpoint = HttpEndpoint::new("create", HttpMethod::Post, "/users")
            .with_wrapper("request")
            .with_body(HttpRequestBody::Inlined {
                name: Name::new("CreateRequest"),
                properties: vec![
                    ObjectProperty::new("name", TypeReference::string()),
                    ObjectProperty::new("kind", TypeReference::literal_string("user")),
                ],
                docs: None,
            });
        let body = endpoint.request_body.as_ref().unwrap();
        let model = RequestBodyModel::from_endpoint(&endpoint, body).unwrap();
        let properties = model.properties().unwrap();
        assert_eq!(properties.fields.len(), 1);
        assert_eq!(properties.literals.len(), 1);
        assert!(model.needs_custom_serde());
    }

    #[test]
    fn plain_inlined_body_keeps_derived_serde() {
        let endpoint = HttpEndpoint::new("create", HttpMethod::Post, "/users")
            .with_wrapper("request")
            .with_body(HttpRequestBody::Inlined {
                name: Name::new("CreateRequest"),
                properties: vec![],
                docs: None,
            });
        let body = endpoint.request_body.as_ref().unwrap();
        let model = RequestBodyModel::from_endpoint(&endpoint, body).unwrap();
        assert!(!model.needs_custom_serde());
    }

    #[test]
    fn reference_body_always_needs_custom_serde() {
        let endpoint = HttpEndpoint::new("create", HttpMethod::Post, "/users")
            .with_wrapper("request")
            .with_body(HttpRequestBody::Reference {
                request_body_type: TypeReference::string(),
            });
        let body = endpoint.request_body.as_ref().unwrap();
        let model = RequestBodyModel::from_endpoint(&endpoint, body).unwrap();
        assert!(model.needs_custom_serde());
        assert!(model.properties().is_none());
    }

    #[test]
    fn file_upload_separates_files() {
        let endpoint = upload(vec![
            FileUploadProperty::File(FileProperty {
                key: NameAndWireValue::new("file"),
                is_optional: false,
            }),
            FileUploadProperty::BodyProperty(ObjectProperty::new(
                "caption",
                TypeReference::optional(TypeReference::string()),
            )),
        ]);
        let body = endpoint.request_body.as_ref().unwrap();
        let RequestBodyModel::FileUpload { files, body } =
            RequestBodyModel::from_endpoint(&endpoint, body).unwrap()
        else {
            panic!("expected file upload");
        };
        assert_eq!(files.len(), 1);
        assert_eq!(body.fields.len(), 1);
    }

    #[test]
    fn bytes_body_is_unsupported() {
        let endpoint = HttpEndpoint::new("raw", HttpMethod::Post, "/raw")
            .with_body(HttpRequestBody::Bytes { is_optional: false });
        let body = endpoint.request_body.as_ref().unwrap();
        let err = RequestBodyModel::from_endpoint(&endpoint, body).unwrap_err();
        assert!(
            matches!(err, GeneratorError::UnsupportedRequestBody { ref kind, .. } if kind == "bytes")
        );
        assert_eq!(err.to_string(), "Endpoint 'raw': bytes requests are not supported yet");
    }
}
