//! Relational backend tests
//!
//! Runs SeaOrmStorage against temporary SQLite databases.

use chrono::Utc;
use linkvault::config::{StaticConfig, StorageConfig};
use linkvault::errors::LinkVaultError;
use linkvault::services::ShortLinkStore;
use linkvault::storage::{LinkBackend, LinkRecord, SeaOrmStorage, StorageFactory};
use migration::entities::shortened_link;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use tempfile::TempDir;

fn sqlite_url(temp_dir: &TempDir) -> String {
    format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("test.db").display()
    )
}

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = SeaOrmStorage::new(&sqlite_url(&temp_dir), &StorageConfig::default())
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}

async fn row_count(storage: &SeaOrmStorage, initial_link: &str) -> usize {
    shortened_link::Entity::find()
        .filter(shortened_link::Column::InitialLink.eq(initial_link))
        .all(storage.get_db())
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_put_and_get() {
    let (mut storage, _dir) = create_temp_storage().await;
    assert_eq!(storage.backend_name(), "relational");
    assert_eq!(storage.database_kind(), "sqlite");

    storage
        .put(LinkRecord::new("https://example.com", "abcdefgh", 42))
        .await
        .unwrap();

    assert_eq!(storage.get("abcdefgh").await.unwrap(), "https://example.com");
    assert!(storage.get("missing1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_duplicate_put_is_conflict() {
    let (mut storage, _dir) = create_temp_storage().await;
    let record = LinkRecord::new("https://example.com", "abcdefgh", 42);

    storage.put(record.clone()).await.unwrap();
    match storage.put(record).await {
        Err(LinkVaultError::AlreadyExists { short_link, .. }) => {
            assert_eq!(short_link, "abcdefgh")
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(row_count(&storage, "https://example.com").await, 1);

    // 不同 owner 可以缩短同一链接
    storage
        .put(LinkRecord::new("https://example.com", "hgfedcba", 7))
        .await
        .unwrap();
    assert_eq!(row_count(&storage, "https://example.com").await, 2);
}

#[tokio::test]
async fn test_soft_delete_keeps_tombstone_on_recreate() {
    let (mut storage, _dir) = create_temp_storage().await;
    let mut record = LinkRecord::new("https://example.com", "abcdefgh", 42);
    record.created_at = Utc::now() - chrono::Duration::days(10);
    storage.put(record.clone()).await.unwrap();

    storage.soft_delete("abcdefgh", 7).await.unwrap();
    assert!(storage.get("abcdefgh").await.is_ok());

    storage.soft_delete("abcdefgh", 42).await.unwrap();
    assert!(storage.get("abcdefgh").await.unwrap_err().is_deleted());
    assert!(storage.list_by_owner(42).await.unwrap().is_empty());

    // 再次创建返回冲突，墓碑行原样保留
    let err = storage
        .put(LinkRecord::new("https://example.com", "abcdefgh", 42))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(storage.get("abcdefgh").await.unwrap_err().is_deleted());

    let rows = shortened_link::Entity::find()
        .filter(shortened_link::Column::InitialLink.eq("https://example.com"))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].deleted, Some(true));
    assert_eq!(
        rows[0].date_of_create.timestamp(),
        record.created_at.timestamp()
    );
}

#[tokio::test]
async fn test_long_initial_link_on_sqlite() {
    let (mut storage, _dir) = create_temp_storage().await;
    // SQLite 不校验 VARCHAR 长度；MySQL/PostgreSQL 上限为 512
    let long_link = format!("https://example.com/{}", "a".repeat(600));

    storage
        .put(LinkRecord::new(long_link.clone(), "longlink", 1))
        .await
        .unwrap();
    assert_eq!(storage.get("longlink").await.unwrap(), long_link);
}

#[tokio::test]
async fn test_batch_rolls_back_on_conflict() {
    let (mut storage, _dir) = create_temp_storage().await;
    storage
        .put(LinkRecord::new("https://a.example", "aaaaaaaa", 0))
        .await
        .unwrap();

    let result = storage
        .put_batch(vec![
            LinkRecord::new("https://b.example", "bbbbbbbb", 0),
            LinkRecord::new("https://a.example", "aaaaaaaa", 0),
        ])
        .await;
    assert!(result.unwrap_err().is_conflict());

    // 整批回滚
    assert!(storage.get("bbbbbbbb").await.unwrap_err().is_not_found());

    storage
        .put_batch(vec![
            LinkRecord::new("https://b.example", "bbbbbbbb", 0),
            LinkRecord::new("https://c.example", "cccccccc", 0),
        ])
        .await
        .unwrap();
    assert_eq!(storage.list_by_owner(0).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_by_owner_sorted_and_scoped() {
    let (mut storage, _dir) = create_temp_storage().await;
    let base = Utc::now();
    for (i, short) in ["cccccccc", "aaaaaaaa", "bbbbbbbb"].iter().enumerate() {
        let mut record = LinkRecord::new(format!("https://{}.example", short), *short, 5);
        record.created_at = base - chrono::Duration::seconds(i as i64);
        storage.put(record).await.unwrap();
    }
    storage
        .put(LinkRecord::new("https://other.example", "dddddddd", 6))
        .await
        .unwrap();

    let shorts: Vec<String> = storage
        .list_by_owner(5)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.short_link)
        .collect();
    assert_eq!(shorts, vec!["bbbbbbbb", "aaaaaaaa", "cccccccc"]);
}

#[tokio::test]
async fn test_null_user_id_is_anonymous() {
    let (storage, _dir) = create_temp_storage().await;
    shortened_link::Entity::insert(shortened_link::ActiveModel {
        initial_link: Set("https://legacy.example".to_string()),
        short_link: Set("legacy01".to_string()),
        user_id: Set(None),
        date_of_create: Set(Utc::now()),
        deleted: Set(None),
        ..Default::default()
    })
    .exec(storage.get_db())
    .await
    .unwrap();

    let anonymous = storage.list_by_owner(0).await.unwrap();
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0].owner_id, 0);
    assert_eq!(storage.get("legacy01").await.unwrap(), "https://legacy.example");
}

#[tokio::test]
async fn test_health_check() {
    let (storage, _dir) = create_temp_storage().await;
    storage.health_check().await.unwrap();
}

#[tokio::test]
async fn test_factory_prefers_database_dsn() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = StaticConfig::default();
    config.storage.database_dsn = Some(sqlite_url(&temp_dir));
    config.storage.file_storage_path =
        Some(temp_dir.path().join("unused.jsonl").display().to_string());

    let backend = StorageFactory::create(&config).await.unwrap();
    assert_eq!(backend.backend_name(), "relational");
    assert!(!temp_dir.path().join("unused.jsonl").exists());
}

#[tokio::test]
async fn test_store_example_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = StaticConfig::default();
    config.storage.database_dsn = Some(sqlite_url(&temp_dir));
    let store = ShortLinkStore::from_config(&config).await.unwrap();

    let a1 = store.create("https://example.com/a", 42).await.unwrap();
    let again = store.create("https://example.com/a", 42).await.unwrap();
    let a2 = store.create("https://example.com/a", 7).await.unwrap();

    assert!(!a1.conflict);
    assert!(again.conflict);
    assert_eq!(again.short_link, a1.short_link);
    assert_ne!(a2.short_link, a1.short_link);

    store.soft_delete(&a1.short_link, 42).await.unwrap();
    assert!(store.resolve(&a1.short_link).await.unwrap_err().is_deleted());
    assert_eq!(
        store.resolve(&a2.short_link).await.unwrap(),
        "https://example.com/a"
    );
}

#[tokio::test]
async fn test_unknown_dsn_is_config_error() {
    let result = SeaOrmStorage::new("redis://localhost", &StorageConfig::default()).await;
    assert!(matches!(result, Err(LinkVaultError::DatabaseConfig(_))));
}
