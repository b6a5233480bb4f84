use events::client::Client;
use events::core::{Context, Error};
use events::option::with_base_url;
use events::{ConflictError, Event, NotFoundError};

fn client() -> Client {
    Client::new(&[with_base_url("https://events.test")])
}

#[test]
fn literal_mismatch_is_rejected_on_decode() {
    let error = serde_json::from_str::<Event>(r#"{"name":"a","kind":"other","final":true}"#)
        .unwrap_err()
        .to_string();
    assert!(error.contains(r#"expected literal "event", but found "other""#), "{}", error);

    let error = serde_json::from_str::<Event>(r#"{"name":"a","kind":"event","final":false}"#)
        .unwrap_err()
        .to_string();
    assert!(error.contains("expected literal true, but found false"), "{}", error);
}

#[test]
fn literal_values_are_written_back() {
    let event: Event = serde_json::from_str(r#"{"name":"a","kind":"event","final":true}"#).unwrap();
    assert_eq!(event.kind(), "event");
    assert!(event.final_());
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        serde_json::json!({ "name": "a", "kind": "event", "final": true })
    );
}

#[tokio::test]
async fn response_model_is_decoded() {
    let ctx = Context::respond(200, r#"{"name":"launch","kind":"event","final":true}"#);
    let event = client().get_event(&ctx, "e1").await.unwrap();

    assert_eq!(event.name, "launch");
    assert_eq!(ctx.sent()[0].url, "https://events.test/events/e1");
}

#[tokio::test]
async fn discriminated_error_is_decoded_from_its_content() {
    let ctx = Context::respond(400, r#"{"errorType":"conflict","content":"taken"}"#);
    let error = client().get_event(&ctx, "e1").await.unwrap_err();

    let Error::Structured(error) = error else {
        panic!("expected a structured error");
    };
    let conflict = error.downcast_ref::<ConflictError>().unwrap();
    assert_eq!(conflict.body, "taken");
    assert_eq!(conflict.api_error.status_code, 409);
}

#[tokio::test]
async fn discriminated_error_without_content_is_decoded() {
    let ctx = Context::respond(400, r#"{"errorType":"notFound"}"#);
    let error = client().get_event(&ctx, "e1").await.unwrap_err();

    let Error::Structured(error) = error else {
        panic!("expected a structured error");
    };
    assert_eq!(
        error.downcast_ref::<NotFoundError>().unwrap().api_error.status_code,
        404
    );
}

#[tokio::test]
async fn unknown_discriminant_falls_back_to_api_error() {
    let ctx = Context::respond(400, r#"{"errorType":"teapot","content":1}"#);
    let error = client().get_event(&ctx, "e1").await.unwrap_err();

    match error {
        Error::Api(api_error) => assert_eq!(api_error.status_code, 400),
        other => panic!("expected an api error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_error_body_falls_back_to_api_error() {
    let ctx = Context::respond(502, "<html>bad gateway</html>");
    let error = client().get_event(&ctx, "e1").await.unwrap_err();

    match error {
        Error::Api(api_error) => assert_eq!(api_error.status_code, 502),
        other => panic!("expected an api error, got {:?}", other),
    }
}
