use crate::storage::{ANONYMOUS_OWNER, LinkRecord};
use migration::entities::shortened_link;

/// 将 Sea-ORM Model 转换为 LinkRecord
///
/// user_id 为 NULL（旧批量导入）或超出 u32 时视为匿名。
pub fn model_to_record(model: shortened_link::Model) -> LinkRecord {
    LinkRecord {
        initial_link: model.initial_link,
        short_link: model.short_link,
        owner_id: model
            .user_id
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(ANONYMOUS_OWNER),
        deleted: model.deleted.unwrap_or(false),
        created_at: model.date_of_create,
    }
}

/// 将 LinkRecord 转换为 ActiveModel（用于插入）
pub fn record_to_active_model(record: &LinkRecord) -> shortened_link::ActiveModel {
    use sea_orm::ActiveValue::*;

    shortened_link::ActiveModel {
        id: NotSet,
        initial_link: Set(record.initial_link.clone()),
        short_link: Set(record.short_link.clone()),
        user_id: Set(Some(i64::from(record.owner_id))),
        date_of_create: Set(record.created_at),
        deleted: Set(record.deleted.then_some(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    fn test_model() -> shortened_link::Model {
        shortened_link::Model {
            id: 1,
            initial_link: "https://example.com".to_string(),
            short_link: "abcdefgh".to_string(),
            user_id: Some(42),
            date_of_create: Utc::now(),
            deleted: None,
        }
    }

    #[test]
    fn test_model_to_record_basic() {
        let record = model_to_record(test_model());
        assert_eq!(record.initial_link, "https://example.com");
        assert_eq!(record.short_link, "abcdefgh");
        assert_eq!(record.owner_id, 42);
        assert!(!record.deleted);
    }

    #[test]
    fn test_null_user_is_anonymous() {
        let model = shortened_link::Model {
            user_id: None,
            ..test_model()
        };
        assert_eq!(model_to_record(model).owner_id, ANONYMOUS_OWNER);
    }

    #[test]
    fn test_deleted_flag() {
        let model = shortened_link::Model {
            deleted: Some(true),
            ..test_model()
        };
        assert!(model_to_record(model).deleted);

        let model = shortened_link::Model {
            deleted: Some(false),
            ..test_model()
        };
        assert!(!model_to_record(model).deleted);
    }

    #[test]
    fn test_record_to_active_model() {
        let record = LinkRecord::new("https://example.com", "abcdefgh", u32::MAX);
        let active_model = record_to_active_model(&record);

        assert!(matches!(active_model.id, ActiveValue::NotSet));
        assert_eq!(
            active_model.user_id,
            ActiveValue::Set(Some(i64::from(u32::MAX)))
        );
        // 未删除写 NULL
        assert_eq!(active_model.deleted, ActiveValue::Set(None));
    }
}
