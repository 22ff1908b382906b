use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "shortened_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub initial_link: String,
    pub short_link: String,
    /// 0 或 NULL 表示匿名导入
    pub user_id: Option<i64>,
    pub date_of_create: DateTimeUtc,
    /// NULL 视为未删除
    pub deleted: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
