use chrono::{DateTime, FixedOffset, TimeZone};
use uuid::Uuid;
use zhulong_core::db::open_db_in_memory;
use zhulong_core::{
    ContentListQuery, IntentKind, MemoListQuery, MessageListQuery, NewContent, Priority,
    RankingSettings, RequestContext, RoutedResult, ServiceError, Stores,
};

fn ctx() -> RequestContext {
    RequestContext {
        request_id: Uuid::new_v4(),
        now: now(),
    }
}

fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 19, 10, 0, 0)
        .unwrap()
}

fn all_memos() -> MemoListQuery {
    MemoListQuery {
        include_completed: true,
        limit: None,
    }
}

#[test]
fn dated_text_creates_memo() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();

    let routed = stores
        .router()
        .route(&ctx(), "Call mom tomorrow at 5pm", None)
        .unwrap();
    let RoutedResult::Memo { confidence, memo } = routed else {
        panic!("expected memo, got {routed:?}");
    };
    assert_eq!(confidence, 0.9);
    assert_eq!(memo.text, "Call mom tomorrow at 5pm");
    assert!(!memo.completed);
    let expected = now()
        .timezone()
        .with_ymd_and_hms(2026, 10, 20, 17, 0, 0)
        .unwrap()
        .timestamp_millis();
    assert_eq!(memo.due_at, Some(expected));
    assert_eq!(stores.memos.list(&all_memos()).unwrap().len(), 1);
}

#[test]
fn unknown_text_is_unclassified_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();

    let routed = stores.router().route(&ctx(), "xyzzy", None).unwrap();
    assert_eq!(
        routed,
        RoutedResult::Unclassified {
            confidence: 0.0,
            original_text: "xyzzy".to_string(),
        }
    );

    assert!(stores.memos.list(&all_memos()).unwrap().is_empty());
    assert!(stores
        .messages
        .list(&MessageListQuery::default())
        .unwrap()
        .is_empty());
    assert!(stores
        .contents
        .list(&ContentListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn blank_text_is_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();

    for text in ["", "   ", "\n\t"] {
        let err = stores.router().route(&ctx(), text, Some("memo")).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}

#[test]
fn sender_text_creates_message_with_priority() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();

    let routed = stores
        .router()
        .route(&ctx(), "from Alice: the order is stuck, urgent", None)
        .unwrap();
    let RoutedResult::Message { message, .. } = routed else {
        panic!("expected message, got {routed:?}");
    };
    assert_eq!(message.sender, "Alice");
    assert_eq!(message.content, "the order is stuck, urgent");
    assert_eq!(message.priority, Priority::High);
    assert!(!message.read);
}

#[test]
fn message_hint_forces_message() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();

    let routed = stores
        .router()
        .route(&ctx(), "see you", Some("wechat"))
        .unwrap();
    let RoutedResult::Message {
        confidence,
        message,
    } = routed
    else {
        panic!("expected message, got {routed:?}");
    };
    assert_eq!(confidence, 1.0);
    assert_eq!(message.sender, "");
    assert_eq!(message.content, "see you");
}

#[test]
fn feedback_text_targets_existing_content() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::new(["rust"])).unwrap();
    let item = stores
        .contents
        .ingest(&NewContent {
            title: "Rust 2026".to_string(),
            body: String::new(),
            url: String::new(),
            source: String::new(),
        })
        .unwrap();

    let text = format!("#{} was great, 5/5", item.id);
    let routed = stores.router().route(&ctx(), &text, None).unwrap();
    let RoutedResult::Feedback {
        confidence,
        feedback,
    } = routed
    else {
        panic!("expected feedback, got {routed:?}");
    };
    assert_eq!(confidence, 0.85);
    assert_eq!(feedback.content_id, item.id);
    assert_eq!(feedback.score, 5);
    assert_eq!(feedback.comment.as_deref(), Some(text.as_str()));
}

#[test]
fn labelled_chinese_feedback_is_not_a_message() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();
    let item = stores
        .contents
        .ingest(&NewContent {
            title: "周报".to_string(),
            body: String::new(),
            url: String::new(),
            source: String::new(),
        })
        .unwrap();

    let text = format!("内容{}：很好", item.id);
    let routed = stores.router().route(&ctx(), &text, None).unwrap();
    assert_eq!(routed.kind(), IntentKind::Feedback);
    let RoutedResult::Feedback { feedback, .. } = routed else {
        panic!("expected feedback, got {routed:?}");
    };
    assert_eq!(feedback.content_id, item.id);
    assert_eq!(feedback.score, 4);

    assert!(stores
        .messages
        .list(&MessageListQuery::default())
        .unwrap()
        .is_empty());
    assert_eq!(
        stores
            .contents
            .list_feedback(item.id, None)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn feedback_on_missing_content_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();

    let err = stores
        .router()
        .route(&ctx(), "content 41 was boring", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { id: 41, .. }));
}

#[test]
fn feedback_hint_without_reference_is_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let stores = Stores::try_new(&conn, RankingSettings::default()).unwrap();

    let err = stores
        .router()
        .route(&ctx(), "loved it", Some("feedback"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[test]
fn routed_result_serializes_with_kind_tag() {
    let routed = RoutedResult::Unclassified {
        confidence: 0.0,
        original_text: "xyzzy".to_string(),
    };
    assert_eq!(routed.kind(), IntentKind::Unknown);
    let value = serde_json::to_value(routed).unwrap();
    assert_eq!(value["kind"], "unclassified");
    assert_eq!(value["original_text"], "xyzzy");
}
