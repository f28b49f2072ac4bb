use super::Store;
use chrono::NaiveDate;
use pacto_core::model::{GoalCategory, Phase};

async fn test_store() -> Store {
    Store::in_memory().await.unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_create_and_get_user() {
    let store = test_store().await;

    assert!(store.get_user("+5511999999999").await.unwrap().is_none());

    let user = store.create_user("+5511999999999", None).await.unwrap();
    assert_eq!(user.phase, Phase::SetupDaily);
    assert_eq!(user.name, "Campeão");

    let loaded = store.get_user("+5511999999999").await.unwrap().unwrap();
    assert_eq!(loaded.id, "+5511999999999");
    assert_eq!(loaded.phase, Phase::SetupDaily);
}

#[tokio::test]
async fn test_create_user_with_name() {
    let store = test_store().await;
    let user = store.create_user("+551100000001", Some("Ana")).await.unwrap();
    assert_eq!(user.name, "Ana");

    // Blank names fall back to the default.
    let user = store.create_user("+551100000002", Some("  ")).await.unwrap();
    assert_eq!(user.name, "Campeão");
}

#[tokio::test]
async fn test_set_phase() {
    let store = test_store().await;
    store.create_user("+551100000001", None).await.unwrap();

    store
        .set_phase("+551100000001", Phase::SetupMonthly)
        .await
        .unwrap();
    let user = store.get_user("+551100000001").await.unwrap().unwrap();
    assert_eq!(user.phase, Phase::SetupMonthly);

    store.set_phase("+551100000001", Phase::Active).await.unwrap();
    let user = store.get_user("+551100000001").await.unwrap().unwrap();
    assert_eq!(user.phase, Phase::Active);
}

#[tokio::test]
async fn test_list_active_users() {
    let store = test_store().await;
    store.create_user("+551100000001", Some("Ana")).await.unwrap();
    store.create_user("+551100000002", Some("Bia")).await.unwrap();
    store.create_user("+551100000003", Some("Caio")).await.unwrap();

    store.set_phase("+551100000001", Phase::Active).await.unwrap();
    store.set_phase("+551100000003", Phase::Active).await.unwrap();

    let active = store.list_active_users().await.unwrap();
    let ids: Vec<&str> = active.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["+551100000001", "+551100000003"]);
}

#[tokio::test]
async fn test_save_and_list_goals_creation_order() {
    let store = test_store().await;
    store.create_user("u1", None).await.unwrap();

    let saved = store
        .save_goals(
            "u1",
            &["Ler".to_string(), "Academia".to_string(), "  ".to_string()],
            GoalCategory::Daily,
        )
        .await
        .unwrap();
    assert_eq!(saved, 2);

    store
        .add_goal("u1", "Viajar", GoalCategory::Monthly)
        .await
        .unwrap();

    let all = store.list_goals("u1", None).await.unwrap();
    let descriptions: Vec<&str> = all.iter().map(|g| g.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Ler", "Academia", "Viajar"]);

    let daily = store.list_goals("u1", Some(GoalCategory::Daily)).await.unwrap();
    assert_eq!(daily.len(), 2);

    let monthly = store
        .list_goals("u1", Some(GoalCategory::Monthly))
        .await
        .unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].description, "Viajar");
}

#[tokio::test]
async fn test_remove_goal_by_query_unique_match() {
    let store = test_store().await;
    store.create_user("u1", None).await.unwrap();
    store
        .save_goals(
            "u1",
            &["Correr 5km".to_string(), "Ler 10 páginas".to_string()],
            GoalCategory::Daily,
        )
        .await
        .unwrap();

    let removed = store.remove_goal_by_query("u1", "correr").await.unwrap();
    assert_eq!(removed.as_deref(), Some("Correr 5km"));

    let remaining = store.list_goals("u1", None).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].description, "Ler 10 páginas");
}

#[tokio::test]
async fn test_remove_goal_by_query_ambiguous_or_missing() {
    let store = test_store().await;
    store.create_user("u1", None).await.unwrap();
    store
        .save_goals(
            "u1",
            &["Ler livros".to_string(), "Ler notícias".to_string()],
            GoalCategory::Daily,
        )
        .await
        .unwrap();

    // Two matches: nothing is deleted.
    assert!(store.remove_goal_by_query("u1", "ler").await.unwrap().is_none());
    assert_eq!(store.list_goals("u1", None).await.unwrap().len(), 2);

    // Zero matches: same.
    assert!(store
        .remove_goal_by_query("u1", "meditar")
        .await
        .unwrap()
        .is_none());
    assert_eq!(store.list_goals("u1", None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_remove_goal_deletes_its_progress() {
    let store = test_store().await;
    store.create_user("u1", None).await.unwrap();
    let goal = store.add_goal("u1", "Correr", GoalCategory::Daily).await.unwrap();
    store
        .record_progress(&goal.id, day("2026-08-01"), true)
        .await
        .unwrap();

    store.remove_goal_by_query("u1", "correr").await.unwrap();

    let progress = store
        .list_progress("u1", day("2026-08-01"), day("2026-08-31"))
        .await
        .unwrap();
    assert!(progress.is_empty());
}

#[tokio::test]
async fn test_record_progress_idempotent() {
    let store = test_store().await;
    store.create_user("u1", None).await.unwrap();
    let goal = store.add_goal("u1", "Correr", GoalCategory::Daily).await.unwrap();

    let d = day("2026-08-06");
    assert!(store.record_progress(&goal.id, d, true).await.unwrap());
    // Second write for the same (goal, date) is a no-op.
    assert!(!store.record_progress(&goal.id, d, true).await.unwrap());
    assert!(!store.record_progress(&goal.id, d, false).await.unwrap());

    let progress = store.list_progress("u1", d, d).await.unwrap();
    assert_eq!(progress.len(), 1);
    // First write wins.
    assert!(progress[0].achieved);
}

#[tokio::test]
async fn test_list_progress_range() {
    let store = test_store().await;
    store.create_user("u1", None).await.unwrap();
    let goal = store.add_goal("u1", "Correr", GoalCategory::Daily).await.unwrap();

    store.record_progress(&goal.id, day("2026-07-31"), true).await.unwrap();
    store.record_progress(&goal.id, day("2026-08-01"), false).await.unwrap();
    store.record_progress(&goal.id, day("2026-08-15"), true).await.unwrap();
    store.record_progress(&goal.id, day("2026-09-01"), true).await.unwrap();

    let progress = store
        .list_progress("u1", day("2026-08-01"), day("2026-08-31"))
        .await
        .unwrap();
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].date, day("2026-08-01"));
    assert!(!progress[0].achieved);
    assert_eq!(progress[0].description, "Correr");
    assert_eq!(progress[1].date, day("2026-08-15"));
}

#[tokio::test]
async fn test_progress_scoped_to_owner() {
    let store = test_store().await;
    store.create_user("u1", None).await.unwrap();
    store.create_user("u2", None).await.unwrap();
    let g1 = store.add_goal("u1", "Correr", GoalCategory::Daily).await.unwrap();
    let g2 = store.add_goal("u2", "Nadar", GoalCategory::Daily).await.unwrap();

    let d = day("2026-08-06");
    store.record_progress(&g1.id, d, true).await.unwrap();
    store.record_progress(&g2.id, d, true).await.unwrap();

    let progress = store.list_progress("u1", d, d).await.unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].description, "Correr");
}
