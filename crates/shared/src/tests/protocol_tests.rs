use super::*;

#[test]
fn store_response_serializes_status_as_lowercase_string() {
    let response = StoreCommandResponse {
        status: StoreStatus::Success,
        command: "highlight".to_string(),
    };
    let value = serde_json::to_value(&response).expect("json");
    assert_eq!(
        value,
        serde_json::json!({ "status": "success", "command": "highlight" })
    );
}

#[test]
fn command_record_serializes_id_as_bare_integer() {
    let record = CommandRecord {
        id: CommandId(7),
        command: "calculator".to_string(),
    };
    let value = serde_json::to_value(&record).expect("json");
    assert_eq!(value, serde_json::json!({ "id": 7, "command": "calculator" }));
}

#[test]
fn store_request_tolerates_missing_command_field() {
    let request: StoreCommandRequest = serde_json::from_str("{}").expect("json");
    assert!(request.command.is_none());
}
