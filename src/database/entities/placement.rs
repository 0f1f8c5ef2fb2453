use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "placement")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
	pub coordinate: String,
	pub x: i32,
	pub y: i32,
	#[sea_orm(column_type = "Text")]
	pub color: String,
	#[sea_orm(column_type = "Text")]
	pub user_id: String,
	pub time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
