//! Endpoint method assembly.
//!
//! One endpoint becomes one `async fn` on its package client. Assembly runs
//! through fixed stages, each emitting one part of the method body:
//!
//! | stage | emits |
//! |---|---|
//! | `SignatureResolved` | parameters and return type |
//! | `UrlResolved` | base URL and path |
//! | `ParamsEmitted` | query string and headers |
//! | `BodyEmitted` | JSON or multipart body |
//! | `ErrorDecoderEmitted` | status or discriminant error decoding |
//! | `Dispatched` | the call through `crate::core` |
//!
//! A failure at any stage aborts the endpoint and, with it, the whole file.

use std::collections::BTreeSet;
use std::fmt;

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use sdkgen_ir::{
    EnvironmentsConfig, ErrorDiscriminationStrategy, HttpEndpoint, HttpMethod, HttpResponse,
    Literal, PackagePath, SdkRequestShape, StreamingChunkType, TypeReference, TypeShape,
};
use tracing::{debug, trace};

use crate::codegen::doc_attrs;
use crate::codegen::request_types::{Binding, RequestLayout};
use crate::errors::GeneratorError;
use crate::scope::{ChildScope, Namespace, Scope};
use crate::type_mapper::{TypeMapper, UsageContext, qualified_path};
use crate::value_format::{Transform, TransportFormat, format_for_transport};
use crate::visitors::{RequestBodyModel, resolve_base_url};

/// Identifiers the generated method body declares itself.
const RESERVED_LOCALS: [&str; 12] = [
    "ctx",
    "base_url",
    "endpoint_url",
    "query_params",
    "query",
    "headers",
    "writer",
    "filename",
    "error_decoder",
    "response",
    "item",
    "value",
];

/// Everything endpoint assembly reads besides the endpoint itself.
#[derive(Debug, Clone, Copy)]
pub struct EndpointContext<'ir> {
    pub mapper: TypeMapper<'ir>,
    pub package: &'ir PackagePath,
    pub environments: Option<&'ir EnvironmentsConfig>,
    pub error_discrimination: &'ir ErrorDiscriminationStrategy,
}

impl<'ir> EndpointContext<'ir> {
    fn usage(&self) -> UsageContext<'ir> {
        UsageContext::Local(self.package)
    }
}

/// Progress of one endpoint through assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EndpointStage {
    Unbuilt,
    SignatureResolved,
    UrlResolved,
    ParamsEmitted,
    BodyEmitted,
    ErrorDecoderEmitted,
    Dispatched,
}

impl fmt::Display for EndpointStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointStage::Unbuilt => "unbuilt",
            EndpointStage::SignatureResolved => "signature-resolved",
            EndpointStage::UrlResolved => "url-resolved",
            EndpointStage::ParamsEmitted => "params-emitted",
            EndpointStage::BodyEmitted => "body-emitted",
            EndpointStage::ErrorDecoderEmitted => "error-decoder-emitted",
            EndpointStage::Dispatched => "dispatched",
        };
        f.write_str(name)
    }
}

/// A fully assembled endpoint method.
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint {
    pub method_name: String,
    pub stage: EndpointStage,
    tokens: TokenStream,
}

impl ResolvedEndpoint {
    /// Assembles the method for `endpoint`.
    ///
    /// `method_name` is the name allocated on the client; `scope` is the
    /// file scope of the client, which receives any imports the method needs.
    ///
    /// ## Errors
    ///
    /// Fails on unknown types or errors, unsupported request bodies or
    /// responses, and unknown environments.
    pub fn build(
        endpoint: &HttpEndpoint,
        method_name: &str,
        context: &EndpointContext<'_>,
        scope: &mut Scope,
    ) -> Result<Self, GeneratorError> {
        debug!(endpoint = %endpoint.name, method = method_name, "assembling endpoint");
        let mut assembler = Assembler {
            endpoint,
            context,
            scope: scope.child(method_name),
            stage: EndpointStage::Unbuilt,
        };
        let tokens = assembler.assemble(method_name)?;
        Ok(Self {
            method_name: method_name.to_string(),
            stage: assembler.stage,
            tokens,
        })
    }

    /// The method definition.
    pub fn method(&self) -> &TokenStream {
        &self.tokens
    }
}

struct Assembler<'a, 'ir, 's> {
    endpoint: &'ir HttpEndpoint,
    context: &'a EndpointContext<'ir>,
    scope: ChildScope<'s>,
    stage: EndpointStage,
}

/// Names bound while resolving the signature.
struct Signature<'ir> {
    params: Vec<TokenStream>,
    path_args: Vec<TokenStream>,
    files: Vec<(Ident, &'ir sdkgen_ir::FileProperty)>,
    request: Option<Ident>,
    return_type: TokenStream,
}

impl<'a, 'ir, 's> Assembler<'a, 'ir, 's> {
    fn advance(&mut self, stage: EndpointStage) {
        trace!(endpoint = %self.endpoint.name, from = %self.stage, to = %stage, "endpoint stage");
        self.stage = stage;
    }

    fn assemble(&mut self, method_name: &str) -> Result<TokenStream, GeneratorError> {
        for name in RESERVED_LOCALS {
            self.scope.shadow(name);
        }
        let endpoint = self.endpoint;
        let body = endpoint
            .request_body
            .as_ref()
            .map(|body| RequestBodyModel::from_endpoint(endpoint, body))
            .transpose()?;
        let layout = RequestLayout::new(endpoint, body.as_ref());

        let signature = self.signature(layout.as_ref())?;
        self.advance(EndpointStage::SignatureResolved);

        let url = self.url(&signature)?;
        self.advance(EndpointStage::UrlResolved);

        let request = signature.request.as_ref();
        let params = self.params(layout.as_ref(), request);
        self.advance(EndpointStage::ParamsEmitted);

        let (body_setup, request_body) = self.body(body.as_ref(), layout.as_ref(), &signature);
        if body.is_some() {
            self.advance(EndpointStage::BodyEmitted);
        }

        let error_decoder = self.error_decoder()?;
        if error_decoder.is_some() {
            self.advance(EndpointStage::ErrorDecoderEmitted);
        }

        let dispatch = self.dispatch(request_body, error_decoder.is_some())?;
        self.advance(EndpointStage::Dispatched);

        let name = format_ident!("{}", method_name);
        let docs = doc_attrs(endpoint.docs.as_deref());
        let Signature {
            params: parameters,
            return_type,
            ..
        } = signature;
        Ok(quote! {
            #docs
            pub async fn #name(
                &self,
                ctx: &crate::core::Context,
                #(#parameters,)*
            ) -> Result<#return_type, crate::core::Error> {
                #url
                #params
                #body_setup
                #error_decoder
                #dispatch
            }
        })
    }

    fn signature(
        &mut self,
        layout: Option<&RequestLayout<'ir>>,
    ) -> Result<Signature<'ir>, GeneratorError> {
        let endpoint = self.endpoint;
        let mapper = self.context.mapper;
        let mut params = Vec::new();
        let mut path_args = Vec::new();

        for parameter in &endpoint.path_parameters {
            let ident = format_ident!("{}", self.scope.add_local(&parameter.name.safe_snake_case()));
            let ty = mapper.map_parameter_type(
                &parameter.value_type,
                self.context.usage(),
                &mut self.scope,
            )?;
            params.push(quote! { #ident: #ty });
            let format = format_for_transport(&parameter.value_type);
            path_args.push(match format.transform {
                Transform::PassThrough => quote! { #ident },
                _ => format.render(quote! { #ident }),
            });
        }

        let mut files = Vec::new();
        if let Some(body) = &endpoint.request_body {
            for file in body.file_properties() {
                let ident = format_ident!("{}", self.scope.add_local(&file.key.name.safe_snake_case()));
                params.push(if file.is_optional {
                    quote! { #ident: Option<&crate::core::FileParam> }
                } else {
                    quote! { #ident: &crate::core::FileParam }
                });
                files.push((ident, file));
            }
        }

        let mut request = None;
        if let Some(sdk_request) = &endpoint.sdk_request {
            let request_ty = match (&sdk_request.shape, layout) {
                (SdkRequestShape::Wrapper { .. }, Some(layout)) => {
                    let name = format_ident!("{}", layout.type_name);
                    Some(quote! { super::#name })
                }
                (SdkRequestShape::Wrapper { .. }, None) => None,
                (SdkRequestShape::JustRequestBody(reference), _) => {
                    Some(mapper.map_type(reference, self.context.usage(), &mut self.scope)?)
                }
            };
            if let Some(ty) = request_ty {
                let ident = format_ident!(
                    "{}",
                    self.scope.add_local(&sdk_request.request_parameter_name.safe_snake_case())
                );
                params.push(quote! { #ident: &#ty });
                request = Some(ident);
            }
        }

        self.check_inputs_bound(request.is_some())?;

        let return_type = self.return_type()?;
        Ok(Signature {
            params,
            path_args,
            files,
            request,
            return_type,
        })
    }

    /// Rejects endpoints whose query parameters, headers or body would have
    /// no request parameter to travel in.
    fn check_inputs_bound(&self, has_request: bool) -> Result<(), GeneratorError> {
        let endpoint = self.endpoint;
        let body_only = matches!(
            endpoint.sdk_request.as_ref().map(|r| &r.shape),
            Some(SdkRequestShape::JustRequestBody(_))
        );
        let mut unbound = Vec::new();
        if !endpoint.query_parameters.is_empty() && (!has_request || body_only) {
            unbound.push("query parameters");
        }
        if !endpoint.headers.is_empty() && (!has_request || body_only) {
            unbound.push("headers");
        }
        let body_fields = match &endpoint.request_body {
            Some(body) if body.is_file_upload() => !body.file_body_properties().is_empty(),
            Some(_) => true,
            None => false,
        };
        if body_fields && !has_request {
            unbound.push("body");
        }
        if unbound.is_empty() {
            return Ok(());
        }
        Err(GeneratorError::UnboundRequestInputs {
            endpoint: endpoint.name.original().to_string(),
            inputs: unbound.join(", "),
        })
    }

    fn return_type(&mut self) -> Result<TokenStream, GeneratorError> {
        let mapper = self.context.mapper;
        let usage = self.context.usage();
        Ok(match &self.endpoint.response {
            None => quote! { () },
            Some(HttpResponse::Json {
                response_body_type,
                nested_property,
            }) => match nested_property {
                Some(property) => {
                    self.nested_field(response_body_type, &property.name.wire_value)?;
                    mapper.map_type(&property.value_type, usage, &mut self.scope)?
                }
                None => mapper.map_type(response_body_type, usage, &mut self.scope)?,
            },
            Some(HttpResponse::FileDownload) => quote! { Vec<u8> },
            Some(HttpResponse::Text) => quote! { String },
            Some(HttpResponse::Streaming { data_event, .. }) => {
                let item = match data_event {
                    StreamingChunkType::Json(reference) => {
                        mapper.map_type(reference, usage, &mut self.scope)?
                    }
                    StreamingChunkType::Text => quote! { String },
                };
                quote! { crate::core::Stream<#item> }
            }
        })
    }

    /// Reads the nested-property response out of `response`. Literal
    /// properties are read through their accessor.
    fn nested_field(&self, response: &TypeReference, wire: &str) -> Result<TokenStream, GeneratorError> {
        let unsupported = || GeneratorError::UnsupportedResponseType {
            endpoint: self.endpoint.name.original().to_string(),
            kind: format!("json (nested property '{}')", wire),
        };
        let TypeReference::Named(id) = response else {
            return Err(unsupported());
        };
        let TypeShape::Object { properties } = &self.context.mapper.registry().resolve(id)?.shape
        else {
            return Err(unsupported());
        };
        // Field and accessor names of generated models follow declaration order.
        let mut fields = Scope::new(id.0.as_str());
        for property in properties {
            let field = format_ident!("{}", fields.add_local(&property.name.name.safe_snake_case()));
            if property.name.wire_value == wire {
                return Ok(match property.value_type.as_literal() {
                    Some(_) => quote! { response.#field().into() },
                    None => quote! { response.#field },
                });
            }
        }
        Err(unsupported())
    }

    fn url(&self, signature: &Signature<'_>) -> Result<TokenStream, GeneratorError> {
        let base = resolve_base_url(self.context.environments, self.endpoint.base_url.as_deref())?;
        let base = if base.is_empty() {
            quote! { String::new() }
        } else {
            quote! { #base.to_string() }
        };

        let path = &self.endpoint.path;
        let mut template = String::from("{}");
        let head = escape_braces(&path.head);
        if !head.starts_with('/') && !(head.is_empty() && path.parts.is_empty()) {
            template.push('/');
        }
        template.push_str(&head);
        for part in &path.parts {
            template.push_str("{}");
            template.push_str(&escape_braces(&part.tail));
        }
        let args = &signature.path_args;

        Ok(quote! {
            let mut base_url = #base;
            if !self.base_url.is_empty() {
                base_url = self.base_url.clone();
            }
            let endpoint_url = format!(#template, base_url #(, #args)*);
        })
    }

    fn params(&self, layout: Option<&RequestLayout<'ir>>, request: Option<&Ident>) -> TokenStream {
        let (Some(layout), Some(request)) = (layout, request) else {
            return quote! { let mut headers = self.header.clone(); };
        };
        let value = format_ident!("value");
        let item = format_ident!("item");

        let query = if layout.query.is_empty() {
            TokenStream::new()
        } else {
            let appends = layout.query.iter().map(|slot| {
                let wire = &slot.item.name.wire_value;
                let append = |format: &TransportFormat| {
                    let rendered = format.render(quote! { #value });
                    quote! { query_params.append_pair(#wire, &#rendered); }
                };
                match &slot.binding {
                    Binding::Literal { literal, .. } => {
                        let literal = literal_string(literal);
                        quote! { query_params.append_pair(#wire, #literal); }
                    }
                    Binding::Field(field) => {
                        let field = format_ident!("{}", field);
                        let format = format_for_transport(&slot.item.value_type);
                        if slot.item.allow_multiple {
                            let guarded = format.guarded(quote! { *#item }, &value, append(&format));
                            quote! {
                                for #item in &#request.#field {
                                    #guarded
                                }
                            }
                        } else {
                            format.guarded(quote! { #request.#field }, &value, append(&format))
                        }
                    }
                }
            });
            quote! {
                let mut query_params = url::form_urlencoded::Serializer::new(String::new());
                #(#appends)*
                let query = query_params.finish();
                let endpoint_url = if query.is_empty() {
                    endpoint_url
                } else {
                    format!("{}?{}", endpoint_url, query)
                };
            }
        };

        let headers = layout.headers.iter().map(|slot| {
            let wire = &slot.item.name.wire_value;
            match &slot.binding {
                Binding::Literal { literal, .. } => {
                    let literal = literal_string(literal);
                    quote! { headers.set(#wire, #literal.to_string()); }
                }
                Binding::Field(field) => {
                    let field = format_ident!("{}", field);
                    let format = format_for_transport(&slot.item.value_type);
                    let rendered = format.render(quote! { #value });
                    format.guarded(
                        quote! { #request.#field },
                        &value,
                        quote! { headers.set(#wire, #rendered); },
                    )
                }
            }
        });

        quote! {
            #query
            let mut headers = self.header.clone();
            #(#headers)*
        }
    }

    /// Returns the statements building the body and the `request` value
    /// passed to the caller.
    fn body(
        &self,
        body: Option<&RequestBodyModel<'ir>>,
        layout: Option<&RequestLayout<'ir>>,
        signature: &Signature<'ir>,
    ) -> (TokenStream, TokenStream) {
        let none = quote! { None };
        let Some(body) = body else {
            return (TokenStream::new(), none);
        };

        match body {
            RequestBodyModel::Inlined(_) | RequestBodyModel::Reference(_) => match &signature.request {
                Some(request) => (
                    TokenStream::new(),
                    quote! { Some(crate::core::RequestBody::json(#request)?) },
                ),
                None => (TokenStream::new(), none),
            },
            RequestBodyModel::FileUpload { .. } => {
                let value = format_ident!("value");
                let file_parts = signature.files.iter().map(|(ident, file)| {
                    let wire = &file.key.wire_value;
                    let default_name = format!("{}_filename", wire);
                    let write = quote! {
                        let filename = #ident.name().unwrap_or(#default_name);
                        writer.write_file(#wire, filename, #ident);
                    };
                    if file.is_optional {
                        quote! { if let Some(#ident) = #ident { #write } }
                    } else {
                        quote! { { #write } }
                    }
                });

                let fields = match (layout, &signature.request) {
                    (Some(layout), Some(request)) => layout
                        .body
                        .iter()
                        .map(|slot| {
                            let wire = &slot.item.name.wire_value;
                            match &slot.binding {
                                Binding::Literal { literal, .. } => {
                                    let literal = literal_string(literal);
                                    quote! { writer.write_field(#wire, #literal.to_string()); }
                                }
                                Binding::Field(field) => {
                                    let field = format_ident!("{}", field);
                                    let format = format_for_transport(&slot.item.value_type);
                                    let write = if format.is_primitive {
                                        let rendered = format.render(quote! { #value });
                                        quote! { writer.write_field(#wire, #rendered); }
                                    } else {
                                        quote! { crate::core::write_multipart_json(&mut writer, #wire, #value)?; }
                                    };
                                    format.guarded(quote! { #request.#field }, &value, write)
                                }
                            }
                        })
                        .collect(),
                    _ => Vec::new(),
                };

                (
                    quote! {
                        let mut writer = crate::core::MultipartWriter::new();
                        #(#file_parts)*
                        #(#fields)*
                        headers.set("Content-Type", writer.content_type());
                    },
                    quote! { Some(writer.finish()) },
                )
            }
        }
    }

    fn error_decoder(&mut self) -> Result<Option<TokenStream>, GeneratorError> {
        if self.endpoint.errors.is_empty() {
            return Ok(None);
        }
        let registry = self.context.mapper.registry();
        let usage = self.context.usage();
        let body = format_ident!("body");

        let decode = |path: TokenStream, data: TokenStream| {
            quote! {
                match #path::decode(api_error.clone(), #data) {
                    Ok(value) => crate::core::Error::Structured(Box::new(value)),
                    Err(_) => api_error.into(),
                }
            }
        };

        let dispatch = match self.context.error_discrimination {
            ErrorDiscriminationStrategy::StatusCode => {
                let mut seen = BTreeSet::new();
                let mut arms = Vec::new();
                for response_error in &self.endpoint.errors {
                    let declaration = registry.resolve_error(&response_error.error)?;
                    if !seen.insert(declaration.status_code) {
                        continue;
                    }
                    let path = qualified_path(
                        &declaration.name.package,
                        &declaration.name.name.safe_pascal_case(),
                        usage,
                        &mut self.scope,
                    );
                    let status = declaration.status_code;
                    let decoded = decode(path, quote! { #body });
                    arms.push(quote! { #status => #decoded, });
                }
                quote! {
                    match status_code {
                        #(#arms)*
                        _ => api_error.into(),
                    }
                }
            }
            ErrorDiscriminationStrategy::Property {
                discriminant,
                content_property,
            } => {
                let mut seen = BTreeSet::new();
                let mut arms = Vec::new();
                for response_error in &self.endpoint.errors {
                    let declaration = registry.resolve_error(&response_error.error)?;
                    let wire = &declaration.discriminant_value.wire_value;
                    if !seen.insert(wire.clone()) {
                        continue;
                    }
                    let path = qualified_path(
                        &declaration.name.package,
                        &declaration.name.name.safe_pascal_case(),
                        usage,
                        &mut self.scope,
                    );
                    let decoded = decode(path, quote! { content });
                    arms.push(quote! {
                        #wire => {
                            let content = probe
                                .content
                                .as_ref()
                                .map(|content| content.get().as_bytes())
                                .unwrap_or_default();
                            #decoded
                        }
                    });
                }
                let discriminant_wire = &discriminant.wire_value;
                let content_wire = &content_property.wire_value;
                quote! {
                    #[derive(serde::Deserialize)]
                    struct Discriminant {
                        #[serde(rename = #discriminant_wire)]
                        discriminant: String,
                        #[serde(rename = #content_wire, default)]
                        content: Option<Box<serde_json::value::RawValue>>,
                    }
                    let Ok(probe) = serde_json::from_slice::<Discriminant>(#body) else {
                        return api_error.into();
                    };
                    match probe.discriminant.as_str() {
                        #(#arms)*
                        _ => api_error.into(),
                    }
                }
            }
        };

        Ok(Some(quote! {
            let error_decoder = |status_code: u16, #body: &[u8]| -> crate::core::Error {
                let api_error = crate::core::ApiError::new(status_code, #body.to_vec());
                #dispatch
            };
        }))
    }

    fn dispatch(&mut self, request: TokenStream, has_decoder: bool) -> Result<TokenStream, GeneratorError> {
        let method = http_method(self.endpoint.method);
        let error_decoder = if has_decoder {
            quote! { Some(&error_decoder) }
        } else {
            quote! { None }
        };

        let call_params = |response_is_optional: bool| {
            quote! {
                crate::core::CallParams {
                    url: endpoint_url,
                    method: #method,
                    headers,
                    request: #request,
                    response_is_optional: #response_is_optional,
                    error_decoder: #error_decoder,
                }
            }
        };

        Ok(match &self.endpoint.response {
            None => {
                let params = call_params(false);
                quote! { self.caller.call_empty(ctx, #params).await }
            }
            Some(HttpResponse::Json {
                response_body_type,
                nested_property,
            }) => {
                let params = call_params(response_body_type.is_optional());
                match nested_property {
                    Some(property) => {
                        let nested = self.nested_field(response_body_type, &property.name.wire_value)?;
                        let ty = self.context.mapper.map_type(
                            response_body_type,
                            self.context.usage(),
                            &mut self.scope,
                        )?;
                        quote! {
                            let response: #ty = self.caller.call(ctx, #params).await?;
                            Ok(#nested)
                        }
                    }
                    None => quote! { self.caller.call(ctx, #params).await },
                }
            }
            Some(HttpResponse::FileDownload) => {
                let params = call_params(false);
                quote! { self.caller.call_bytes(ctx, #params).await }
            }
            Some(HttpResponse::Text) => {
                let params = call_params(false);
                quote! { self.caller.call_text(ctx, #params).await }
            }
            Some(HttpResponse::Streaming { terminator, .. }) => {
                let delimiter = match terminator {
                    Some(terminator) => quote! { Some(#terminator) },
                    None => quote! { None },
                };
                quote! {
                    crate::core::Streamer::new(&self.caller)
                        .stream(
                            ctx,
                            crate::core::StreamParams {
                                url: endpoint_url,
                                method: #method,
                                headers,
                                request: #request,
                                error_decoder: #error_decoder,
                                delimiter: #delimiter,
                            },
                        )
                        .await
                }
            }
        })
    }
}

fn escape_braces(segment: &str) -> String {
    segment.replace('{', "{{").replace('}', "}}")
}

fn literal_string(literal: &Literal) -> String {
    literal.to_wire_string()
}

fn http_method(method: HttpMethod) -> TokenStream {
    match method {
        HttpMethod::Get => quote! { reqwest::Method::GET },
        HttpMethod::Post => quote! { reqwest::Method::POST },
        HttpMethod::Put => quote! { reqwest::Method::PUT },
        HttpMethod::Patch => quote! { reqwest::Method::PATCH },
        HttpMethod::Delete => quote! { reqwest::Method::DELETE },
    }
}
