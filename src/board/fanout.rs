use std::sync::Arc;
use async_trait::async_trait;
use log::{debug, warn};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::error::Elapsed;
use tokio::time::Instant;

use super::placement::Placement;

#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
	#[error("recipient is gone")]
	Gone,
	#[error("{0}")]
	Transport(String),
}

impl From<Elapsed> for DeliveryError {
	fn from(_: Elapsed) -> Self {
		Self::Transport(String::from("timed out"))
	}
}

/// Delivers a payload to one named recipient.
#[async_trait]
pub trait PushChannel: Send + Sync {
	async fn post(
		&self,
		recipient: &str,
		payload: &str,
	) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
	Delivered,
	Gone,
	Failed(String),
}

impl From<Result<(), DeliveryError>> for DeliveryOutcome {
	fn from(result: Result<(), DeliveryError>) -> Self {
		match result {
			Ok(()) => Self::Delivered,
			Err(DeliveryError::Gone) => Self::Gone,
			Err(DeliveryError::Transport(cause)) => Self::Failed(cause),
		}
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
	pub delivered: usize,
	pub gone: usize,
	pub failed: usize,
}

impl BroadcastReport {
	fn tally(&mut self, outcome: &DeliveryOutcome) {
		match outcome {
			DeliveryOutcome::Delivered => self.delivered += 1,
			DeliveryOutcome::Gone => self.gone += 1,
			DeliveryOutcome::Failed(_) => self.failed += 1,
		}
	}

	pub fn attempted(&self) -> usize {
		self.delivered + self.gone + self.failed
	}
}

pub struct Fanout {
	channel: Arc<dyn PushChannel>,
}

impl Fanout {
	pub fn new(channel: Arc<dyn PushChannel>) -> Self {
		Self { channel }
	}

	/// Sends `placement` to every recipient at once and waits for all of
	/// them. Individual failures are logged and counted, never returned.
	///
	/// Deliveries still pending at `deadline` count as failed.
	/// The only error is failing to build the payload in the first place.
	pub async fn broadcast(
		&self,
		placement: &Placement,
		recipients: Vec<String>,
		deadline: Instant,
	) -> Result<BroadcastReport, serde_json::Error> {
		let payload: Arc<str> = Arc::from(serde_json::to_string(placement)?);

		let mut deliveries = JoinSet::new();
		for recipient in recipients {
			let channel = Arc::clone(&self.channel);
			let payload = Arc::clone(&payload);

			deliveries.spawn(async move {
				let result = tokio::time::timeout_at(
					deadline,
					channel.post(&recipient, &payload),
				).await
					.map_err(DeliveryError::from)
					.and_then(|result| result);

				(recipient, DeliveryOutcome::from(result))
			});
		}

		let mut report = BroadcastReport::default();
		while let Some(joined) = deliveries.join_next().await {
			match joined {
				Ok((recipient, outcome)) => {
					match &outcome {
						DeliveryOutcome::Delivered => (),
						DeliveryOutcome::Gone => {
							warn!("Failed to deliver to {}: connection gone", recipient);
						},
						DeliveryOutcome::Failed(cause) => {
							warn!("Failed to deliver to {}: {}", recipient, cause);
						},
					}
					report.tally(&outcome);
				},
				Err(err) => {
					warn!("Delivery task did not finish: {}", err);
					report.failed += 1;
				},
			}
		}

		debug!(
			"Broadcast {} to {} recipients: {} delivered, {} gone, {} failed",
			placement.coordinate(),
			report.attempted(),
			report.delivered,
			report.gone,
			report.failed,
		);

		Ok(report)
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::testing::RecordingChannel;

	fn after(millis: u64) -> Instant {
		Instant::now() + Duration::from_millis(millis)
	}

	fn placement() -> Placement {
		Placement {
			x: 4,
			y: 5,
			color: "#0A0B0C".parse().unwrap(),
			user: String::from("u1"),
			time: 99,
		}
	}

	fn recipients(ids: &[&str]) -> Vec<String> {
		ids.iter().map(|id| id.to_string()).collect()
	}

	#[tokio::test]
	async fn delivers_the_same_payload_to_everyone() {
		let channel = Arc::new(RecordingChannel::default());
		let fanout = Fanout::new(channel.clone());

		let report = fanout.broadcast(&placement(), recipients(&["A", "B", "C"]), after(1000))
			.await.unwrap();

		assert_eq!(report.delivered, 3);
		let mut delivered = channel.delivered();
		delivered.sort();
		assert_eq!(
			delivered.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(),
			vec!["A", "B", "C"],
		);

		for (_, payload) in delivered {
			let received: Placement = serde_json::from_str(&payload).unwrap();
			assert_eq!(received, placement());
		}
	}

	#[tokio::test]
	async fn one_failing_recipient_does_not_stop_the_rest() {
		let channel = Arc::new(RecordingChannel::default());
		channel.fail_for("B", DeliveryError::Transport(String::from("reset")));
		let fanout = Fanout::new(channel.clone());

		let report = fanout.broadcast(&placement(), recipients(&["A", "B", "C"]), after(1000))
			.await.unwrap();

		assert_eq!(report, BroadcastReport { delivered: 2, gone: 0, failed: 1 });
		let mut delivered = channel.delivered()
			.into_iter()
			.map(|(id, _)| id)
			.collect::<Vec<_>>();
		delivered.sort();
		assert_eq!(delivered, vec!["A", "C"]);
		assert_eq!(channel.attempts(), 3);
	}

	#[tokio::test]
	async fn gone_recipients_are_counted_separately() {
		let channel = Arc::new(RecordingChannel::default());
		channel.fail_for("stale", DeliveryError::Gone);
		let fanout = Fanout::new(channel.clone());

		let report = fanout.broadcast(&placement(), recipients(&["stale", "live"]), after(1000))
			.await.unwrap();

		assert_eq!(report, BroadcastReport { delivered: 1, gone: 1, failed: 0 });
	}

	#[tokio::test]
	async fn slow_recipients_time_out_without_holding_up_others() {
		let channel = Arc::new(RecordingChannel::default());
		channel.stall_for("slow");
		let fanout = Fanout::new(channel.clone());

		let report = fanout.broadcast(&placement(), recipients(&["slow", "fast"]), after(50))
			.await.unwrap();

		assert_eq!(report, BroadcastReport { delivered: 1, gone: 0, failed: 1 });
	}

	#[tokio::test]
	async fn no_recipients_is_an_empty_report() {
		let channel = Arc::new(RecordingChannel::default());
		let fanout = Fanout::new(channel.clone());

		let report = fanout.broadcast(&placement(), vec![], after(1000)).await.unwrap();

		assert_eq!(report.attempted(), 0);
		assert_eq!(channel.attempts(), 0);
	}
}
