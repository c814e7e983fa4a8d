// ==========================================
// Интеграционные тесты - сводный расчёт по этапам
// ==========================================
// Сценарии: отбор по способу пополнения и этапу, накопление количеств
// по цепочкам, циклы, порядок вывода, метка asOf
// ==========================================

mod test_helpers;

use std::io::Write;

use test_helpers::*;

#[test]
fn test_rollup_filters_by_method_and_stage() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_standard_catalog(&conn);
    insert_root_product(&conn, 1); // A в плане выпуска
    let state = open_state(&db_path);

    let result = state.stages_api.calculate().unwrap();

    // B производится, но этап не указан - не попадает;
    // C имеет этап, но закупается - не попадает;
    // D производится и имеет этап 2 - попадает с qty 3 * 0.5 = 1.5
    assert_eq!(result.stages.len(), 1);
    let stage = &result.stages[0];
    assert_eq!(stage.stage_id, 2);
    assert_eq!(stage.stage_name, "Мехобработка");

    assert_eq!(stage.products.len(), 1);
    let product = &stage.products[0];
    assert_eq!(product.root_item_code, "PRD-001");

    assert_eq!(product.components.len(), 1);
    let d = &product.components[0];
    assert_eq!(d.item_code, "CMP-003");
    assert_eq!(d.qty_per_unit, 1.5);
    assert_eq!(d.replenishment_method.as_deref(), Some("Производство"));
    assert_eq!(d.min_batch, None, "источника данных о партиях запуска нет");

    assert_eq!(result.as_of, None, "файл метки синхронизации не настроен");
}

#[test]
fn test_rollup_accumulates_across_paths() {
    // E входит и в состав A (qty 1), и в состав B (qty 2):
    // итог на 1 изделие A = 1 + 3 * 2 = 7
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_standard_catalog(&conn);
    insert_item(&conn, 5, "CMP-004", "Деталь E", Some("Производство"), None, 4.0);
    insert_component(&conn, 100, 5, 1.0, Some(1));
    insert_component(&conn, 200, 5, 2.0, Some(1));
    insert_root_product(&conn, 1);
    let state = open_state(&db_path);

    let result = state.stages_api.calculate().unwrap();

    let stage1 = result
        .stages
        .iter()
        .find(|s| s.stage_id == 1)
        .expect("этап 'Сборка' присутствует");
    let e = stage1.products[0]
        .components
        .iter()
        .find(|c| c.item_code == "CMP-004")
        .expect("деталь E в этапе 1");
    assert_eq!(e.qty_per_unit, 7.0);
    assert_eq!(e.stock_qty, 4.0);

    // Порядок этапов - по stage_order
    let ids: Vec<i64> = result.stages.iter().map(|s| s.stage_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_rollup_survives_cycle() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    insert_stage(&conn, 1, "Сборка", Some(1));
    insert_item(&conn, 50, "CYC-001", "Изделие X", Some("Производство"), None, 0.0);
    insert_spec(&conn, 500, None, "Спецификация X");
    insert_default_spec(&conn, 50, 500);
    insert_component(&conn, 500, 50, 1.0, Some(1)); // X входит в само себя
    insert_root_product(&conn, 50);
    let state = open_state(&db_path);

    let result = state.stages_api.calculate().unwrap();

    // Расчёт завершается; X учтено один раз (дальше ветка остановлена)
    assert_eq!(result.stages.len(), 1);
    let x = &result.stages[0].products[0].components[0];
    assert_eq!(x.item_code, "CYC-001");
    assert_eq!(x.qty_per_unit, 1.0);
}

#[test]
fn test_rollup_skips_items_without_specification() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_standard_catalog(&conn);
    // C - закупаемая деталь без спецификации, но кто-то внёс её в план
    insert_root_product(&conn, 3);
    let state = open_state(&db_path);

    let result = state.stages_api.calculate().unwrap();
    assert!(
        result.stages.is_empty(),
        "изделие без спецификации пропускается, а не падает"
    );
}

#[test]
fn test_rollup_component_ordering_is_stable() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_standard_catalog(&conn);
    // Две детали одного этапа с кодами в "обратном" порядке вставки
    insert_item(&conn, 6, "CMP-900", "Деталь Я", Some("Производство"), None, 0.0);
    insert_item(&conn, 7, "CMP-100", "Деталь Б", Some("Производство"), None, 0.0);
    insert_component(&conn, 100, 6, 1.0, Some(1));
    insert_component(&conn, 100, 7, 1.0, Some(1));
    insert_root_product(&conn, 1);
    let state = open_state(&db_path);

    let result = state.stages_api.calculate().unwrap();
    let stage1 = result.stages.iter().find(|s| s.stage_id == 1).unwrap();
    let codes: Vec<&str> = stage1.products[0]
        .components
        .iter()
        .map(|c| c.item_code.as_str())
        .collect();
    assert_eq!(codes, vec!["CMP-100", "CMP-900"], "сортировка по коду");
}

#[test]
fn test_rollup_reads_as_of_from_sync_file() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_standard_catalog(&conn);
    insert_root_product(&conn, 1);

    let mut sync_file = tempfile::NamedTempFile::new().unwrap();
    write!(sync_file, r#"{{"last_sync": "2025-09-19T09:06:38.432061"}}"#).unwrap();

    let state = open_state_with_sync_file(&db_path, sync_file.path().to_str().unwrap());
    let result = state.stages_api.calculate().unwrap();
    assert_eq!(result.as_of.as_deref(), Some("2025-09-19T09:06:38.432061"));
}
