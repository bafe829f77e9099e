//! End-to-end tests: stock file and dish catalog on disk, evaluated through the ledger

use chrono::NaiveDate;
use menu_engine::{
    evaluate_catalog, evaluate_with_supplier, Config, DishCatalog, DishId, Error, Menu,
    RecipeEvaluator, UnavailableReason,
};
use pantry_ledger::{IngredientId, Ledger};
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

const STOCK: &str = r#"{
    "flour":  { "name": "Flour", "unit": "g", "quantity_on_hand": "5000", "minimum_threshold": 500 },
    "egg":    { "name": "Egg", "unit": "un", "quantity": 0, "minimum": 1 },
    "milk":   { "name": "Milk", "unit": "ml", "quantity_on_hand": 2000, "expiry_date": "2026-10-19" },
    "cheese": { "name": "Cheese", "quantity_on_hand": 800, "expiry_date": "indefinido" }
}"#;

const CATALOG: &str = r#"{
    "1": { "name": "Pancakes", "ingredients": ["flour", "egg", "milk"], "base_price": "10.00" },
    "2": { "name": "Milkshake", "ingredients": ["milk"], "base_price": 12.99, "category": "Drinks" },
    "3": { "name": "Cheese toast", "ingredients": ["flour", "cheese"], "base_price": "7.50",
           "required_quantities": { "cheese": "120" } },
    "4": { "name": "Mystery", "ingredients": ["truffle"], "base_price": 30 },
    "5": { "name": "Broken", "ingredients": ["flour"], "base_price": "ten" }
}"#;

fn write_fixture() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let pantry_dir = dir.path().join("pantry");
    std::fs::create_dir_all(&pantry_dir).unwrap();
    std::fs::write(pantry_dir.join("stock.json"), STOCK).unwrap();
    std::fs::write(dir.path().join("dishes.json"), CATALOG).unwrap();

    let mut config = Config::default();
    config.ledger.data_dir = pantry_dir;
    config.catalog_path = dir.path().join("dishes.json");
    (dir, config)
}

#[tokio::test]
async fn test_menu_from_files() {
    let (_dir, config) = write_fixture();
    let ledger = Ledger::open(config.ledger.clone()).await.unwrap();
    let snapshot = ledger.snapshot().await.unwrap();
    let catalog = DishCatalog::load(&config.catalog_path).unwrap();

    let evaluator = RecipeEvaluator::new(config.evaluator.clone(), config.pricing.clone()).unwrap();
    let report = evaluate_catalog(&evaluator, &catalog, &snapshot, today());

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.available_count(), 2);
    assert_eq!(report.unavailable_count(), 2);
    assert_eq!(report.discounted_count(), 2);
    assert_eq!(report.failure_count(), 1);

    let pancakes = report.get(&DishId::new("1")).unwrap().as_ref().unwrap();
    assert!(!pancakes.available);
    assert_eq!(
        pancakes.unavailable_because.as_ref().map(|u| &u.ingredient_id),
        Some(&IngredientId::new("egg"))
    );
    // Milk expires tomorrow, so the unavailable dish still carries the discounted price
    assert_eq!(pancakes.price, dec!(8.00));

    let milkshake = report.get(&DishId::new("2")).unwrap().as_ref().unwrap();
    assert!(milkshake.available);
    assert_eq!(milkshake.price, dec!(10.39));

    let toast = report.get(&DishId::new("3")).unwrap().as_ref().unwrap();
    assert!(toast.available);
    assert_eq!(toast.price, dec!(7.50));

    let mystery = report.get(&DishId::new("4")).unwrap().as_ref().unwrap();
    assert_eq!(
        mystery.unavailable_because.as_ref().map(|u| u.reason),
        Some(UnavailableReason::Missing)
    );

    assert!(matches!(
        report.get(&DishId::new("5")),
        Some(Err(Error::InvalidDishData { .. }))
    ));

    let menu = Menu::from_report(&catalog, &report);
    let names: Vec<&str> = menu.sorted_by_name().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Cheese toast", "Milkshake", "Mystery", "Pancakes"]);

    ledger.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_scale_reading_changes_menu() {
    let (_dir, config) = write_fixture();
    let ledger = Ledger::open(config.ledger.clone()).await.unwrap();
    let catalog = DishCatalog::load(&config.catalog_path).unwrap();
    let evaluator = RecipeEvaluator::default();

    ledger
        .stock()
        .record_measurement(IngredientId::new("egg"), dec!(12))
        .await
        .unwrap();
    ledger
        .stock()
        .set_availability(IngredientId::new("cheese"), false)
        .await
        .unwrap();

    let snapshot = ledger.snapshot().await.unwrap();
    let report = evaluate_catalog(&evaluator, &catalog, &snapshot, today());

    let pancakes = report.get(&DishId::new("1")).unwrap().as_ref().unwrap();
    assert!(pancakes.available);

    let toast = report.get(&DishId::new("3")).unwrap().as_ref().unwrap();
    assert_eq!(
        toast.unavailable_because.as_ref().map(|u| u.reason),
        Some(UnavailableReason::Disabled)
    );

    ledger.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_stock_is_not_an_empty_menu() {
    let (dir, config) = write_fixture();
    std::fs::write(
        dir.path().join("pantry").join("stock.json"),
        r#"{ "egg": { "quantity_on_hand": "twelve" } }"#,
    )
    .unwrap();
    let catalog = DishCatalog::load(&config.catalog_path).unwrap();

    let storage = pantry_ledger::Storage::open(&config.ledger).unwrap();
    let result = evaluate_with_supplier(
        &RecipeEvaluator::default(),
        &catalog,
        || storage.load_snapshot(true),
        today(),
    );

    match result {
        Err(Error::LedgerUnavailable(reason)) => assert!(reason.contains("egg")),
        other => panic!("expected LedgerUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_catalog_edits_and_delivery_change_menu() {
    let (_dir, config) = write_fixture();
    let ledger = Ledger::open(config.ledger.clone()).await.unwrap();
    let evaluator = RecipeEvaluator::default();

    let mut catalog = DishCatalog::load(&config.catalog_path).unwrap();
    catalog.withdraw_dish(&DishId::new("2")).unwrap();
    catalog.set_promotion(&DishId::new("3"), true).unwrap();
    catalog
        .add_ingredient(&DishId::new("4"), IngredientId::new("truffle"), false, None)
        .unwrap();
    catalog.save(&config.catalog_path).unwrap();

    ledger
        .stock()
        .add_stock(IngredientId::new("egg"), dec!(6), NaiveDate::from_ymd_opt(2026, 10, 30))
        .await
        .unwrap();

    let catalog = DishCatalog::load(&config.catalog_path).unwrap();
    let snapshot = ledger.snapshot().await.unwrap();
    let report = evaluate_catalog(&evaluator, &catalog, &snapshot, today());

    let pancakes = report.get(&DishId::new("1")).unwrap().as_ref().unwrap();
    assert!(pancakes.available);

    let milkshake = report.get(&DishId::new("2")).unwrap().as_ref().unwrap();
    assert!(milkshake.withdrawn);
    assert!(!milkshake.available);

    let toast = report.get(&DishId::new("3")).unwrap().as_ref().unwrap();
    assert!(toast.promoted);
    assert_eq!(toast.price, dec!(6.00));

    let mystery = report.get(&DishId::new("4")).unwrap().as_ref().unwrap();
    assert!(mystery.available);

    // The rejected record is written back as it was
    assert!(matches!(
        report.get(&DishId::new("5")),
        Some(Err(Error::InvalidDishData { .. }))
    ));

    ledger.shutdown().await.unwrap();
}
