use reportgen_engine::EngineError;
use reportgen_engine::request;

#[test]
fn parses_full_request() {
    let req = request::parse(
        r#"{"type":"livereport","team_info":{"id":"t1","name":"Ops","recipients":["a@example.com","b@example.com"]},
            "data":{"team_id":"t1","date_from":"2026-01-01","date_to":"2026-01-31"},"auto_send":true}"#,
    )
    .unwrap();

    assert_eq!(req.report_type, "livereport");
    assert_eq!(req.team_info.id, "t1");
    assert_eq!(req.team_info.recipients, vec!["a@example.com", "b@example.com"]);
    assert_eq!(req.data["date_to"], "2026-01-31");
    assert!(req.auto_send);
}

#[test]
fn auto_send_defaults_to_false() {
    let req = request::parse(r#"{"type":"scan","team_info":{"id":"t1"},"data":{}}"#).unwrap();
    assert!(!req.auto_send);
}

#[test]
fn rejects_missing_team_id() {
    let err = request::parse(r#"{"type":"scan","team_info":{"name":"Ops"},"data":{}}"#).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(ref m) if m.contains("team id")));
}

#[test]
fn rejects_missing_type() {
    let err = request::parse(r#"{"team_info":{"id":"t1"},"data":{}}"#).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(ref m) if m.contains("report type")));

    let err = request::parse(r#"{"type":"","team_info":{"id":"t1"}}"#).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
}

#[test]
fn rejects_undecodable_payloads() {
    for payload in ["", "not json", "[]", r#"{"type":1,"team_info":{"id":"t1"}}"#] {
        let err = request::parse(payload).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)), "{payload}");
        assert!(!err.is_transient());
    }
}
