use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::board::{coordinate, Color, LogError, Placement, PlacementLog};

use super::entities::*;

pub struct PlacementTable {
	connection: DatabaseConnection,
}

impl PlacementTable {
	pub fn new(connection: DatabaseConnection) -> Self {
		Self { connection }
	}
}

impl TryFrom<placement::Model> for Placement {
	type Error = LogError;

	fn try_from(model: placement::Model) -> Result<Self, Self::Error> {
		let corrupt = |reason: String| LogError::Corrupt {
			coordinate: model.coordinate.clone(),
			reason,
		};

		Ok(Placement {
			x: u32::try_from(model.x).map_err(|err| corrupt(err.to_string()))?,
			y: u32::try_from(model.y).map_err(|err| corrupt(err.to_string()))?,
			color: model.color.parse::<Color>().map_err(|err| corrupt(err.to_string()))?,
			time: u64::try_from(model.time).map_err(|err| corrupt(err.to_string()))?,
			user: model.user_id,
		})
	}
}

#[async_trait]
impl PlacementLog for PlacementTable {
	async fn record(&self, placement: &Placement) -> Result<(), LogError> {
		let model = placement::ActiveModel {
			coordinate: Set(placement.coordinate()),
			x: Set(placement.x as i32),
			y: Set(placement.y as i32),
			color: Set(placement.color.to_string()),
			user_id: Set(placement.user.clone()),
			time: Set(placement.time as i64),
		};

		let replace = OnConflict::column(placement::Column::Coordinate)
			.update_columns([
				placement::Column::X,
				placement::Column::Y,
				placement::Column::Color,
				placement::Column::UserId,
				placement::Column::Time,
			])
			.to_owned();

		placement::Entity::insert(model)
			.on_conflict(replace)
			.exec_without_returning(&self.connection).await?;

		Ok(())
	}

	async fn get(
		&self,
		x: u32,
		y: u32,
	) -> Result<Option<Placement>, LogError> {
		placement::Entity::find_by_id(coordinate(x, y))
			.one(&self.connection).await?
			.map(Placement::try_from)
			.transpose()
	}

	async fn list(&self) -> Result<Vec<Placement>, LogError> {
		placement::Entity::find()
			.order_by_asc(placement::Column::Time)
			.all(&self.connection).await?
			.into_iter()
			.map(Placement::try_from)
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn model() -> placement::Model {
		placement::Model {
			coordinate: String::from("3,4"),
			x: 3,
			y: 4,
			color: String::from("#0A0B0C"),
			user_id: String::from("u1"),
			time: 1700000000000,
		}
	}

	#[test]
	fn decodes_stored_rows() {
		let placement = Placement::try_from(model()).unwrap();
		assert_eq!(placement.coordinate(), "3,4");
		assert_eq!(placement.color.hex(), "0A0B0C");
		assert_eq!(placement.user, "u1");
		assert_eq!(placement.time, 1700000000000);
	}

	#[test]
	fn negative_coordinates_are_corrupt() {
		let row = placement::Model { x: -1, ..model() };
		assert!(matches!(
			Placement::try_from(row),
			Err(LogError::Corrupt { ref coordinate, .. }) if coordinate == "3,4",
		));
	}

	#[test]
	fn unparseable_colors_are_corrupt() {
		let row = placement::Model { color: String::from("red"), ..model() };
		assert!(matches!(Placement::try_from(row), Err(LogError::Corrupt { .. })));
	}

	#[test]
	fn negative_times_are_corrupt() {
		let row = placement::Model { time: -5, ..model() };
		assert!(matches!(Placement::try_from(row), Err(LogError::Corrupt { .. })));
	}
}
