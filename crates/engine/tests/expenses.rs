use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Category, CategoryFilter, CsvRenderer, Deletion, Engine, EngineError, ExpenseFilter, ExpenseId,
    ExportScope, JsonRenderer, MoneyCents, NewExpense, ReportRenderer, SortOrder, UserId,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_expense(d: NaiveDate, category: Category, cents: i64, note: Option<&str>) -> NewExpense {
    NewExpense::new(d, category, MoneyCents::new(cents), note)
}

async fn alice_with_expenses(engine: &Engine) -> UserId {
    let alice = engine.create_user("alice", "wonderland", None).await.unwrap();
    engine
        .add_expense(alice, new_expense(date(2024, 1, 5), Category::Food, 1250, None))
        .await
        .unwrap();
    engine
        .add_expense(alice, new_expense(date(2024, 1, 20), Category::Food, 750, None))
        .await
        .unwrap();
    engine
        .add_expense(
            alice,
            new_expense(date(2024, 2, 1), Category::Transport, 3000, None),
        )
        .await
        .unwrap();
    alice
}

#[tokio::test]
async fn add_then_list_returns_identical_fields() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "wonderland", None).await.unwrap();

    let input = new_expense(
        date(2024, 3, 14),
        Category::Healthcare,
        4_299,
        Some("  pharmacy, receipt #42  "),
    );
    let id = engine.add_expense(alice, input.clone()).await.unwrap();

    let listed = engine.list_expenses(alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    let stored = &listed[0];
    assert_eq!(stored.id, id);
    assert_eq!(stored.user_id, alice);
    assert_eq!(stored.date, input.date);
    assert_eq!(stored.category, input.category);
    assert_eq!(stored.amount, input.amount);
    assert_eq!(stored.description, input.description);

    let second = engine
        .add_expense(alice, new_expense(date(2024, 3, 14), Category::Food, 1, None))
        .await
        .unwrap();
    assert_ne!(second, id);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected_without_writing() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "wonderland", None).await.unwrap();

    for cents in [0, -500] {
        let err = engine
            .add_expense(alice, new_expense(date(2024, 1, 1), Category::Other, cents, None))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert!(err.is_validation());
    }
    assert!(engine.list_expenses(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn adding_for_unknown_user_fails() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .add_expense(UserId(404), new_expense(date(2024, 1, 1), Category::Food, 100, None))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}

#[tokio::test]
async fn list_is_date_descending_and_scoped_to_owner() {
    let (engine, _db) = engine_with_db().await;
    let alice = alice_with_expenses(&engine).await;
    let bob = engine.create_user("bob", "builder", None).await.unwrap();
    engine
        .add_expense(bob, new_expense(date(2024, 5, 1), Category::Bills, 9_900, None))
        .await
        .unwrap();

    let dates: Vec<NaiveDate> = engine
        .list_expenses(alice)
        .await
        .unwrap()
        .iter()
        .map(|e| e.date)
        .collect();
    assert_eq!(dates, vec![date(2024, 2, 1), date(2024, 1, 20), date(2024, 1, 5)]);

    let bobs = engine.list_expenses(bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert!(bobs.iter().all(|e| e.user_id == bob));

    assert!(engine.list_expenses(UserId(999)).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_is_scoped_to_owner() {
    let (engine, _db) = engine_with_db().await;
    let alice = alice_with_expenses(&engine).await;
    let mallory = engine.create_user("mallory", "sneaky", None).await.unwrap();

    let target = engine.list_expenses(alice).await.unwrap()[0].id;

    assert_eq!(
        engine.delete_expense(mallory, target).await.unwrap(),
        Deletion::NotFoundOrUnauthorized
    );
    assert!(engine.expense(alice, target).await.unwrap().is_some());
    assert!(engine.expense(mallory, target).await.unwrap().is_none());

    assert_eq!(
        engine.delete_expense(alice, ExpenseId(10_000)).await.unwrap(),
        Deletion::NotFoundOrUnauthorized
    );

    let deleted = engine.delete_expense(alice, target).await.unwrap();
    assert!(deleted.is_removed());
    assert_eq!(engine.list_expenses(alice).await.unwrap().len(), 2);

    assert_eq!(
        engine.delete_expense(alice, target).await.unwrap(),
        Deletion::NotFoundOrUnauthorized
    );
}

#[tokio::test]
async fn alice_scenario_aggregates() {
    let (engine, _db) = engine_with_db().await;
    let alice = alice_with_expenses(&engine).await;

    let summary = engine.category_summary(alice).await.unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].category, Category::Transport);
    assert_eq!(summary[0].total, MoneyCents::new(3000));
    assert_eq!(summary[0].count, 1);
    assert_eq!(summary[0].percentage, 60.0);
    assert_eq!(summary[1].category, Category::Food);
    assert_eq!(summary[1].total, MoneyCents::new(2000));
    assert_eq!(summary[1].count, 2);
    assert_eq!(summary[1].percentage, 40.0);

    let january = engine.monthly_expenses(alice, 1, 2024).await.unwrap();
    let dates: Vec<NaiveDate> = january.iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![date(2024, 1, 20), date(2024, 1, 5)]);

    let report = engine.monthly_report(alice, 1, 2024).await.unwrap();
    assert_eq!(report.stats.total, MoneyCents::new(2000));
    assert_eq!(report.stats.average, MoneyCents::new(1000));
    assert_eq!(report.categories[0].percentage, 100.0);
    assert_eq!(report.top[0].amount, MoneyCents::new(1250));

    let records = engine.list_expenses(alice).await.unwrap();
    let top = engine::stats::top_n(&records, 1);
    assert_eq!(top[0].category, Category::Transport);
    assert_eq!(top[0].amount, MoneyCents::new(3000));

    let series = engine.monthly_series(alice).await.unwrap();
    let labels: Vec<String> = series.iter().map(|m| m.month.to_string()).collect();
    assert_eq!(labels, vec!["2024-01", "2024-02"]);
}

#[tokio::test]
async fn empty_user_gets_zeroed_stats() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "wonderland", None).await.unwrap();

    let stats = engine.overall_stats(alice).await.unwrap();
    assert_eq!(stats.total, MoneyCents::ZERO);
    assert_eq!(stats.count, 0);
    assert_eq!(stats.average, MoneyCents::ZERO);
    assert!(engine.category_summary(alice).await.unwrap().is_empty());
    assert!(engine.monthly_report(alice, 1, 2024).await.unwrap().is_empty());
}

#[tokio::test]
async fn filtered_expenses_apply_filter_then_sort() {
    let (engine, _db) = engine_with_db().await;
    let alice = alice_with_expenses(&engine).await;
    let now = date(2024, 2, 10).and_hms_opt(9, 0, 0).unwrap();

    let food = engine
        .filtered_expenses(
            alice,
            &ExpenseFilter {
                category: CategoryFilter::Only(Category::Food),
                since_days: None,
            },
            SortOrder::AmountLowHigh,
            now,
        )
        .await
        .unwrap();
    let amounts: Vec<i64> = food.iter().map(|e| e.amount.cents()).collect();
    assert_eq!(amounts, vec![750, 1250]);

    let recent = engine
        .filtered_expenses(
            alice,
            &ExpenseFilter {
                category: CategoryFilter::All,
                since_days: Some(10),
            },
            SortOrder::DateNewest,
            now,
        )
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].category, Category::Transport);

    let dashboard = engine.dashboard(alice, now).await.unwrap();
    assert_eq!(dashboard.stats.count, 3);
    assert_eq!(dashboard.last_30_days_total, MoneyCents::new(3750));
    assert_eq!(dashboard.daily.len(), 3);
    assert_eq!(dashboard.daily[0].date, date(2024, 1, 5));
}

#[tokio::test]
async fn export_report_round_trips_through_renderer() {
    let (engine, _db) = engine_with_db().await;
    let alice = alice_with_expenses(&engine).await;

    let report = engine
        .export_report(
            alice,
            ExportScope::Month {
                year: 2024,
                month: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.summary.total_spent, MoneyCents::new(2000));
    assert_eq!(report.summary.transaction_count, 2);

    let rendered = JsonRenderer.render(&report).unwrap();
    assert_eq!(rendered.file_name, "report_2024_01.json");
    let parsed = JsonRenderer::parse(&rendered.bytes).unwrap();
    assert_eq!(parsed.rows, report.rows);
    assert_eq!(parsed.summary, report.summary);

    let all = engine
        .export_report(
            alice,
            ExportScope::All {
                generated_on: date(2024, 3, 1),
            },
        )
        .await
        .unwrap();
    assert_eq!(all.rows.len(), 3);
    assert_eq!(all.summary.category_breakdown.len(), 2);
}

#[tokio::test]
async fn oversized_amounts_are_rejected_and_totals_stay_safe() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "wonderland", None).await.unwrap();

    let huge: MoneyCents = "90000000000000000".parse().unwrap();
    let err = engine
        .add_expense(alice, NewExpense::new(date(2024, 1, 1), Category::Bills, huge, None))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    for _ in 0..2 {
        engine
            .add_expense(
                alice,
                NewExpense::new(date(2024, 1, 1), Category::Bills, MoneyCents::MAX_EXPENSE, None),
            )
            .await
            .unwrap();
    }

    let stats = engine.overall_stats(alice).await.unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.total.cents(), 2 * MoneyCents::MAX_EXPENSE.cents());
    assert_eq!(stats.average, MoneyCents::MAX_EXPENSE);
    assert_eq!(engine.category_summary(alice).await.unwrap()[0].percentage, 100.0);
}

#[tokio::test]
async fn empty_description_round_trips_through_csv() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.create_user("alice", "wonderland", None).await.unwrap();
    engine
        .add_expense(alice, new_expense(date(2024, 1, 5), Category::Food, 1250, Some("")))
        .await
        .unwrap();
    engine
        .add_expense(alice, new_expense(date(2024, 1, 6), Category::Food, 300, Some("   ")))
        .await
        .unwrap();

    let stored = engine.list_expenses(alice).await.unwrap();
    assert!(stored.iter().all(|e| e.description.is_none()));

    let report = engine
        .export_report(
            alice,
            ExportScope::Month {
                year: 2024,
                month: 1,
            },
        )
        .await
        .unwrap();
    let rendered = CsvRenderer.render(&report).unwrap();
    let rows = CsvRenderer::parse(&rendered.bytes).unwrap();
    assert_eq!(rows, report.rows);
}
