//! TestCase entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub test_id: String,
    pub suite_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub file_path: String,
    pub function_name: String,
    pub priority: String,
    pub timeout: i32,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_suite::Entity",
        from = "Column::SuiteId",
        to = "super::test_suite::Column::Id",
        on_delete = "Cascade"
    )]
    TestSuite,
    #[sea_orm(has_many = "super::test_result::Entity")]
    Results,
}

impl Related<super::test_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestSuite.def()
    }
}

impl Related<super::test_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
