use async_trait::async_trait;
use bytes::Bytes;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
	ColumnTrait,
	DatabaseConnection,
	EntityTrait,
	PaginatorTrait,
	QueryFilter,
	Set,
	TryInsertResult,
	Value,
};

use crate::board::{CanvasError, CanvasStore};

use super::entities::*;

/// Keeps the canvas as a single `bytea` row keyed by name.
pub struct CanvasTable {
	connection: DatabaseConnection,
	name: String,
}

impl CanvasTable {
	pub fn new(
		connection: DatabaseConnection,
		name: String,
	) -> Self {
		Self { connection, name }
	}
}

#[async_trait]
impl CanvasStore for CanvasTable {
	async fn exists(&self) -> Result<bool, CanvasError> {
		let count = canvas::Entity::find_by_id(self.name.clone())
			.count(&self.connection).await?;

		Ok(count > 0)
	}

	async fn create(&self, data: Bytes) -> Result<bool, CanvasError> {
		let model = canvas::ActiveModel {
			name: Set(self.name.clone()),
			data: Set(data.to_vec()),
		};

		let insert = canvas::Entity::insert(model)
			.on_conflict_do_nothing()
			.exec(&self.connection).await?;

		match insert {
			TryInsertResult::Inserted(_) => Ok(true),
			TryInsertResult::Empty => Ok(false),
			TryInsertResult::Conflicted => Ok(false),
		}
	}

	async fn write_range(
		&self,
		offset: usize,
		data: &[u8],
	) -> Result<(), CanvasError> {
		let out_of_range = CanvasError::OutOfRange { offset, len: data.len() };
		let start = i32::try_from(offset + 1).map_err(|_| out_of_range)?;
		let len = data.len() as i32;

		// overlay rewrites the range in place without reading the row back
		let overlay = Expr::cust_with_values(
			r#"overlay("data" placing $1 from $2 for $3)"#,
			[Value::from(data.to_vec()), Value::from(start), Value::from(len)],
		);
		let fits = Expr::cust_with_values(
			r#"length("data") >= $1"#,
			[Value::from(start - 1 + len)],
		);

		let update = canvas::Entity::update_many()
			.col_expr(canvas::Column::Data, overlay)
			.filter(canvas::Column::Name.eq(self.name.as_str()))
			.filter(fits)
			.exec(&self.connection).await?;

		if update.rows_affected > 0 {
			Ok(())
		} else if self.exists().await? {
			Err(CanvasError::OutOfRange { offset, len: data.len() })
		} else {
			Err(CanvasError::Missing)
		}
	}

	async fn read(&self) -> Result<Option<Bytes>, CanvasError> {
		let canvas = canvas::Entity::find_by_id(self.name.clone())
			.one(&self.connection).await?;

		Ok(canvas.map(|canvas| Bytes::from(canvas.data)))
	}

	async fn replace(&self, data: Bytes) -> Result<(), CanvasError> {
		let model = canvas::ActiveModel {
			name: Set(self.name.clone()),
			data: Set(data.to_vec()),
		};

		let overwrite = OnConflict::column(canvas::Column::Name)
			.update_column(canvas::Column::Data)
			.to_owned();

		canvas::Entity::insert(model)
			.on_conflict(overwrite)
			.exec_without_returning(&self.connection).await?;

		Ok(())
	}
}
