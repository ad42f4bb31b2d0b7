//! Response validation against requests built by the same session

use serde_json::{Value, json};
use std::sync::Arc;
use std::thread;
use turul_json_rpc_base::prelude::*;

struct Session {
    pending: Arc<PendingRequestTable>,
    builder: MessageBuilder,
}

impl Session {
    fn new() -> Self {
        let pending = Arc::new(PendingRequestTable::new());
        Self {
            builder: MessageBuilder::new(pending.clone()),
            pending,
        }
    }

    fn request_id(&self, method: &str) -> Value {
        let request = self.builder.build_request(method, Arguments::none()).unwrap();
        json!(request.id)
    }
}

#[test]
fn falsy_result_is_returned_verbatim() {
    let session = Session::new();
    for result in [json!(0), json!(false), json!(""), json!(null), json!([]), json!({})] {
        let id = session.request_id("falsy");
        let payload = json!({"jsonrpc": "2.0", "result": result.clone(), "id": id});
        assert_eq!(validate_response(&payload, &session.pending), Ok(result));
    }
    assert!(session.pending.is_empty());
}

#[test]
fn response_without_result_or_error_is_a_protocol_error() {
    let session = Session::new();
    let id = session.request_id("empty");

    let error = validate_response(&json!({"jsonrpc": "2.0", "id": id}), &session.pending).unwrap_err();
    assert_eq!(error, JsonRpcBaseError::Protocol(ProtocolError::MissingResultAndError));
    assert!(error.is_protocol_error());
}

#[test]
fn server_error_becomes_application_error() {
    let session = Session::new();
    let id = session.request_id("does_not_exist");
    let payload = json!({
        "jsonrpc": "2.0",
        "error": {"code": -32601, "message": "Method not found"},
        "id": id
    });

    match validate_response(&payload, &session.pending) {
        Err(JsonRpcBaseError::Application(error)) => {
            assert_eq!(error.code, METHOD_NOT_FOUND);
            assert_eq!(error.message, "Method not found");
            assert_eq!(error.data, None);
            assert_eq!(
                error.kind(),
                Some(turul_json_rpc_base::JsonRpcErrorCode::MethodNotFound)
            );
        }
        other => panic!("expected application error, got {other:?}"),
    }
}

#[test]
fn stale_response_is_detected() {
    let session = Session::new();
    let id = session.request_id("once");
    let payload = json!({"jsonrpc": "2.0", "result": 1, "id": id});

    assert_eq!(validate_response(&payload, &session.pending), Ok(json!(1)));
    assert!(matches!(
        validate_response(&payload, &session.pending),
        Err(JsonRpcBaseError::Protocol(ProtocolError::UnexpectedId(_)))
    ));
}

#[test]
fn response_to_a_notification_is_unexpected() {
    let session = Session::new();
    session
        .builder
        .build_notification("fire_and_forget", Arguments::none())
        .unwrap();

    let payload = json!({"jsonrpc": "2.0", "result": 19, "id": 3});
    assert!(matches!(
        validate_response(&payload, &session.pending),
        Err(JsonRpcBaseError::Protocol(ProtocolError::UnexpectedId(RequestId::Number(3))))
    ));
}

#[test]
fn empty_batch_response_is_a_protocol_error() {
    let session = Session::new();
    let builder = &session.builder;
    builder
        .build_batch(vec![
            builder.build("a", Arguments::none(), false).unwrap(),
            builder.build("b", Arguments::none(), false).unwrap(),
        ])
        .unwrap();

    assert_eq!(
        validate_batch_response(&json!([]), &session.pending),
        Err(JsonRpcBaseError::Protocol(ProtocolError::EmptyBatchResponse))
    );
    assert_eq!(session.pending.len(), 2);
}

#[test]
fn batch_response_is_correlated_by_id() {
    let session = Session::new();
    let builder = &session.builder;
    let batch = builder
        .build_batch(vec![
            builder.build("sum", vec![json!(1), json!(2), json!(4)].into(), false).unwrap(),
            builder.build("notify_hello", vec![json!(7)].into(), true).unwrap(),
            builder.build("subtract", vec![json!(42), json!(23)].into(), false).unwrap(),
            builder.build("foo.get", Arguments::none().with_kwarg("name", "myself"), false).unwrap(),
        ])
        .unwrap();
    let ids = batch.request_ids();

    // Responses arrive in reverse order; the notification gets none
    let payload = json!([
        {"jsonrpc": "2.0", "error": {"code": -32601, "message": "Method not found"}, "id": ids[2]},
        {"jsonrpc": "2.0", "result": 19, "id": ids[1]},
        {"jsonrpc": "2.0", "result": 7, "id": ids[0]}
    ]);

    let mut responses = validate_batch_response(&payload, &session.pending).unwrap();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses.get(&ids[0]), Some(&Ok(json!(7))));
    assert_eq!(responses.take(&ids[1]), Some(Ok(json!(19))));
    assert_eq!(
        responses.take(&ids[2]).unwrap().unwrap_err().error_code(),
        Some(METHOD_NOT_FOUND)
    );
    assert!(responses.uncorrelated.is_empty());
    assert!(session.pending.is_empty());
}

#[test]
fn unanswered_batch_entries_are_reported() {
    let session = Session::new();
    let builder = &session.builder;
    let batch = builder
        .build_batch(vec![
            builder.build("a", Arguments::none(), false).unwrap(),
            builder.build("b", Arguments::none(), false).unwrap(),
        ])
        .unwrap();
    let ids = batch.request_ids();

    let payload = json!([{"jsonrpc": "2.0", "result": true, "id": ids[1]}]);
    let responses = validate_batch_response(&payload, &session.pending).unwrap();

    assert_eq!(responses.unanswered(&batch), vec![ids[0].clone()]);
    // The caller decides when to stop waiting
    assert!(session.pending.abandon(&ids[0]));
}

#[test]
fn malformed_batch_element_does_not_discard_its_siblings() {
    let session = Session::new();
    let builder = &session.builder;
    let batch = builder
        .build_batch(vec![
            builder.build("first", Arguments::none(), false).unwrap(),
            builder.build("second", Arguments::none(), false).unwrap(),
            builder.build("third", Arguments::none(), false).unwrap(),
        ])
        .unwrap();
    let ids = batch.request_ids();

    let payload = json!([
        {"jsonrpc": "2.0", "result": 1, "id": ids[0]},
        {"jsonrpc": "2.0", "error": {"code": "oops"}, "id": ids[1]},
        {"jsonrpc": "2.0", "result": 3, "id": ids[2]}
    ]);
    let responses = validate_batch_response(&payload, &session.pending).unwrap();

    assert_eq!(responses.get(&ids[0]), Some(&Ok(json!(1))));
    assert_eq!(responses.get(&ids[2]), Some(&Ok(json!(3))));
    assert!(matches!(
        responses.violation(&ids[1]),
        Some(ProtocolError::MalformedError(_))
    ));
    assert!(responses.unanswered(&batch).is_empty());
    assert!(session.pending.is_empty());
}

#[test]
fn batch_response_cannot_claim_a_separate_request() {
    let session = Session::new();
    let builder = &session.builder;
    let single = builder.build_request("single", Arguments::none()).unwrap();
    let batch = builder
        .build_batch(vec![builder.build("batched", Arguments::none(), false).unwrap()])
        .unwrap();
    let validator = ResponseValidator::new(&session.pending);

    let payload = json!([{"jsonrpc": "2.0", "result": 9, "id": single.id}]);
    let responses = validator.validate_batch_for(&batch, &payload).unwrap();

    assert!(responses.outcomes.is_empty());
    assert_eq!(
        responses.violation(&single.id),
        Some(&ProtocolError::UnexpectedId(single.id.clone()))
    );
    assert!(session.pending.contains(&single.id));
    assert_eq!(responses.unanswered(&batch), batch.request_ids());
}

#[test]
fn v1_server_without_version_field() {
    let session = Session::new();
    let id = session.request_id("legacy");

    let payload = json!({"result": "pong", "error": null, "id": id});
    assert_eq!(validate_response(&payload, &session.pending), Ok(json!("pong")));
}

#[test]
fn strict_validator_refuses_v1_responses() {
    let session = Session::new();
    let id = session.request_id("legacy");
    let config = ProtocolConfig::default().with_v1_responses(false);
    let validator = ResponseValidator::with_config(&session.pending, &config);

    assert_eq!(
        validator.validate(&json!({"result": "pong", "id": id})),
        Err(JsonRpcBaseError::Protocol(ProtocolError::MissingVersion))
    );
}

#[test]
fn concurrent_duplicate_deliveries_match_once() {
    let session = Session::new();
    let id = session.request_id("race");
    let payload = Arc::new(json!({"jsonrpc": "2.0", "result": "done", "id": id}));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pending = session.pending.clone();
            let payload = payload.clone();
            thread::spawn(move || validate_response(&payload, &pending).is_ok())
        })
        .collect();

    let matched = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(matched, 1);
}
