use zhulong_core::db::{open_db, open_db_in_memory};
use zhulong_core::repo::content_repo::{
    ContentRepository, FeedbackRepository, SqliteContentRepository, SqliteFeedbackRepository,
};
use zhulong_core::service::ContentService;
use zhulong_core::{
    ContentListQuery, EntityKind, FeedbackListQuery, NewContent, NewFeedback, RankingSettings,
    ServiceError,
};
use rusqlite::{Connection, TransactionBehavior};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn service(
    conn: &Connection,
) -> ContentService<SqliteContentRepository<'_>, SqliteFeedbackRepository<'_>> {
    ContentService::new(
        SqliteContentRepository::try_new(conn).unwrap(),
        SqliteFeedbackRepository::try_new(conn).unwrap(),
        RankingSettings::new(["Rust", "AI", "sqlite"]),
    )
}

fn content(title: &str, body: &str) -> NewContent {
    NewContent {
        title: title.to_string(),
        body: body.to_string(),
        url: "https://example.com/post".to_string(),
        source: "example".to_string(),
    }
}

fn feedback(content_id: i64, score: i64) -> NewFeedback {
    NewFeedback {
        content_id,
        score,
        comment: None,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn ingest_scores_relevance_and_lists_by_rank() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let off_topic = service.ingest(&content("Gardening", "tomatoes")).unwrap();
    let both = service
        .ingest(&content("Rust meets AI", "a survey"))
        .unwrap();
    let one = service.ingest(&content("SQLite tips", "indexes")).unwrap();

    assert_close(off_topic.relevance_score, 0.0);
    assert_close(both.relevance_score, 2.0);
    assert_close(one.relevance_score, 1.0);
    assert_eq!(service.ranking().interest_keywords, vec!["Rust", "AI", "sqlite"]);

    let ranked = service.list(&ContentListQuery::default()).unwrap();
    assert_eq!(
        ranked.iter().map(|item| item.id).collect::<Vec<_>>(),
        vec![both.id, one.id, off_topic.id]
    );

    let top = service.list(&ContentListQuery { limit: Some(1) }).unwrap();
    assert_eq!(top.len(), 1);
}

#[test]
fn blank_title_is_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.ingest(&content("  ", "body")).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[test]
fn feedback_on_missing_content_is_not_found_and_not_persisted() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let feedback_repo = SqliteFeedbackRepository::try_new(&conn).unwrap();

    let err = service.submit_feedback(&feedback(404, 5)).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Content,
            id: 404
        }
    ));

    let stored = feedback_repo
        .list_feedback(&FeedbackListQuery::default())
        .unwrap();
    assert!(stored.is_empty());
}

#[test]
fn feedback_score_outside_range_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let item = service.ingest(&content("Rust", "")).unwrap();

    for score in [-1, 6] {
        let err = service.submit_feedback(&feedback(item.id, score)).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
    assert!(service.list_feedback(item.id, None).unwrap().is_empty());
}

#[test]
fn positive_feedback_raises_keyword_weights() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let content_repo = SqliteContentRepository::try_new(&conn).unwrap();
    let item = service.ingest(&content("Rust and AI", "notes")).unwrap();

    service.submit_feedback(&feedback(item.id, 2)).unwrap();
    assert!(content_repo.keyword_weights().unwrap().is_empty());

    service.submit_feedback(&feedback(item.id, 5)).unwrap();
    let weights = content_repo.keyword_weights().unwrap();
    assert_close(weights["rust"], 1.2);
    assert_close(weights["ai"], 1.2);
    assert!(!weights.contains_key("sqlite"));

    service.submit_feedback(&feedback(item.id, 4)).unwrap();
    let weights = content_repo.keyword_weights().unwrap();
    assert_close(weights["rust"], 1.3);

    let next = service.ingest(&content("More Rust", "")).unwrap();
    assert_close(next.relevance_score, 1.3);
}

#[test]
fn learned_weight_is_capped() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let content_repo = SqliteContentRepository::try_new(&conn).unwrap();
    let item = service.ingest(&content("Rust", "")).unwrap();

    for _ in 0..40 {
        service.submit_feedback(&feedback(item.id, 5)).unwrap();
    }
    assert_close(content_repo.keyword_weights().unwrap()["rust"], 3.0);
}

#[test]
fn deleting_content_cascades_feedback() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let feedback_repo = SqliteFeedbackRepository::try_new(&conn).unwrap();

    let item = service.ingest(&content("Rust", "")).unwrap();
    let created = service
        .submit_feedback(&NewFeedback {
            content_id: item.id,
            score: 3,
            comment: Some("fine".to_string()),
        })
        .unwrap();
    assert_eq!(
        service.get_feedback(created.id).unwrap().comment.as_deref(),
        Some("fine")
    );

    service.delete(item.id).unwrap();

    assert!(feedback_repo.get_feedback(created.id).unwrap().is_none());
    assert!(matches!(
        service.list_feedback(item.id, None),
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.get(item.id),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn list_feedback_is_scoped_to_content() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service.ingest(&content("Rust", "")).unwrap();
    let second = service.ingest(&content("AI", "")).unwrap();
    service.submit_feedback(&feedback(first.id, 3)).unwrap();
    service.submit_feedback(&feedback(first.id, 1)).unwrap();
    service.submit_feedback(&feedback(second.id, 0)).unwrap();

    let scores: Vec<i64> = service
        .list_feedback(first.id, None)
        .unwrap()
        .iter()
        .map(|item| item.score)
        .collect();
    assert_eq!(scores, vec![1, 3]);
}

#[test]
fn content_deleted_while_feedback_waits_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zhulong.db");
    let conn = open_db(&path).unwrap();
    let service = service(&conn);
    let feedback_repo = SqliteFeedbackRepository::try_new(&conn).unwrap();
    let item = service.ingest(&content("Rust", "")).unwrap();
    let content_id = item.id;

    let (deleted_tx, deleted_rx) = mpsc::channel();
    let deleter = {
        let path = path.clone();
        thread::spawn(move || {
            let mut other = open_db(&path).unwrap();
            let tx = other
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .unwrap();
            tx.execute("DELETE FROM contents WHERE id = ?1;", [content_id])
                .unwrap();
            deleted_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(200));
            tx.commit().unwrap();
        })
    };

    // The delete holds the write lock but has not committed yet.
    deleted_rx.recv().unwrap();
    assert_eq!(service.get(content_id).unwrap().id, content_id);

    let err = service.submit_feedback(&feedback(content_id, 5)).unwrap_err();
    deleter.join().unwrap();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Content,
            id
        } if id == content_id
    ));
    assert!(feedback_repo
        .list_feedback(&FeedbackListQuery {
            content_id: Some(content_id),
            limit: None,
        })
        .unwrap()
        .is_empty());
    assert!(matches!(
        service.list_feedback(content_id, None),
        Err(ServiceError::NotFound { .. })
    ));
}
