//! Settings entity: the singleton configuration row for the target system.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub aiops_url: Option<String>,
    pub api_token: Option<String>,
    pub ssh_host: Option<String>,
    pub ssh_port: Option<i32>,
    pub test_path: Option<String>,
    pub timeout: Option<i32>,
    pub parallel_execution: bool,
    pub max_parallel: i32,
    pub retry_failed: bool,
    pub retry_count: i32,
    pub updated_at: DateTimeUtc,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
