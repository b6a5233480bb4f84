use acme::client::Client;
use acme::core::{Context, Error, FileParam};
use acme::option::with_token;
use acme::users::{GetUserRequest, UploadAvatarRequest};
use acme::{ConflictError, NotFoundError};

fn client() -> Client {
    Client::new(&[with_token("secret")])
}

#[tokio::test]
async fn user_is_decoded_and_optional_query_is_left_out() {
    let ctx = Context::respond(200, r#"{"id":"u1","displayName":"Ada"}"#);
    let user = client()
        .users
        .get_user(&ctx, "u1", &GetUserRequest { shallow: None })
        .await
        .unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(user.display_name.as_deref(), Some("Ada"));
    let sent = ctx.sent();
    assert_eq!(sent[0].url, "https://api.example.com/users/u1");
    assert_eq!(sent[0].headers.get("Authorization"), Some("Bearer secret"));
}

#[tokio::test]
async fn optional_query_is_sent_when_set() {
    let ctx = Context::respond(200, r#"{"id":"u1"}"#);
    client()
        .users
        .get_user(&ctx, "u1", &GetUserRequest { shallow: Some(true) })
        .await
        .unwrap();

    assert_eq!(ctx.sent()[0].url, "https://api.example.com/users/u1?shallow=true");
}

#[tokio::test]
async fn declared_status_is_decoded_into_its_error() {
    let ctx = Context::respond(409, r#""taken""#);
    let error = client()
        .users
        .get_user(&ctx, "u1", &GetUserRequest { shallow: None })
        .await
        .unwrap_err();

    let Error::Structured(error) = error else {
        panic!("expected a structured error");
    };
    let conflict = error.downcast_ref::<ConflictError>().unwrap();
    assert_eq!(conflict.body, "taken");
    assert_eq!(conflict.api_error.status_code, 409);
}

#[tokio::test]
async fn bodiless_error_is_decoded_from_its_status() {
    let ctx = Context::respond(404, "");
    let error = client()
        .users
        .get_user(&ctx, "u1", &GetUserRequest { shallow: None })
        .await
        .unwrap_err();

    let Error::Structured(error) = error else {
        panic!("expected a structured error");
    };
    assert!(error.downcast_ref::<NotFoundError>().is_some());
}

#[tokio::test]
async fn undecodable_body_falls_back_to_api_error() {
    let ctx = Context::respond(409, "not json");
    let error = client()
        .users
        .get_user(&ctx, "u1", &GetUserRequest { shallow: None })
        .await
        .unwrap_err();

    match error {
        Error::Api(api_error) => assert_eq!(api_error.status_code, 409),
        other => panic!("expected an api error, got {:?}", other),
    }
}

#[tokio::test]
async fn undeclared_status_falls_back_to_api_error() {
    let ctx = Context::respond(500, "boom");
    let error = client()
        .users
        .get_user(&ctx, "u1", &GetUserRequest { shallow: None })
        .await
        .unwrap_err();

    match error {
        Error::Api(api_error) => assert_eq!(api_error.body, b"boom".to_vec()),
        other => panic!("expected an api error, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_sends_multipart_form() {
    let ctx = Context::respond(204, "");
    let file = FileParam::new(Some("me.png"), b"png".to_vec());
    client()
        .users
        .upload_avatar(&ctx, "u1", &file, &UploadAvatarRequest { caption: None })
        .await
        .unwrap();

    let sent = &ctx.sent()[0];
    assert_eq!(sent.url, "https://api.example.com/users/u1/avatar");
    assert!(
        sent.headers
            .get("Content-Type")
            .is_some_and(|value| value.starts_with("multipart/form-data"))
    );
    let body = String::from_utf8(sent.body.clone().unwrap()).unwrap();
    assert!(body.contains("name=\"file\"; filename=\"me.png\""));
    assert!(!body.contains("name=\"caption\""));
}
