//! In-memory stores with failure switches, for exercising the placement
//! pipeline without a database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use crate::board::{
	coordinate,
	Board,
	Canvas,
	CanvasError,
	CanvasShape,
	CanvasStore,
	Color,
	ConnectionRegistry,
	DeliveryError,
	Fanout,
	LogError,
	Placement,
	PlacementLog,
	PushChannel,
	RegistryError,
};

/// Extra time every call to a store takes before answering.
#[derive(Default)]
struct Latency(Mutex<Duration>);

impl Latency {
	fn set(&self, delay: Duration) {
		*self.0.lock().unwrap() = delay;
	}

	async fn wait(&self) {
		let delay = *self.0.lock().unwrap();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
	}
}

#[derive(Default)]
pub struct MemoryLog {
	records: Mutex<HashMap<String, Placement>>,
	failing: AtomicBool,
	latency: Latency,
}

impl MemoryLog {
	pub fn fail(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn slow_down(&self, delay: Duration) {
		self.latency.set(delay);
	}

	pub fn records(&self) -> Vec<Placement> {
		self.records.lock().unwrap().values().cloned().collect()
	}

	fn check(&self) -> Result<(), LogError> {
		if self.failing.load(Ordering::SeqCst) {
			Err(LogError::Unavailable(String::from("log offline")))
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl PlacementLog for MemoryLog {
	async fn record(&self, placement: &Placement) -> Result<(), LogError> {
		self.latency.wait().await;
		self.check()?;
		self.records.lock().unwrap()
			.insert(placement.coordinate(), placement.clone());
		Ok(())
	}

	async fn get(
		&self,
		x: u32,
		y: u32,
	) -> Result<Option<Placement>, LogError> {
		self.check()?;
		Ok(self.records.lock().unwrap().get(&coordinate(x, y)).cloned())
	}

	async fn list(&self) -> Result<Vec<Placement>, LogError> {
		self.check()?;
		Ok(self.records())
	}
}

pub struct MemoryCanvas {
	len: usize,
	data: Mutex<Option<BytesMut>>,
	creations: AtomicUsize,
	writes: AtomicUsize,
	failing: AtomicBool,
	latency: Latency,
}

impl MemoryCanvas {
	pub fn new(len: usize) -> Self {
		Self {
			len,
			data: Mutex::new(None),
			creations: AtomicUsize::new(0),
			writes: AtomicUsize::new(0),
			failing: AtomicBool::new(false),
			latency: Latency::default(),
		}
	}

	pub fn fail(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn slow_down(&self, delay: Duration) {
		self.latency.set(delay);
	}

	/// Simulates the cache losing the canvas.
	pub fn clear(&self) {
		self.data.lock().unwrap().take();
	}

	pub fn contents(&self) -> Option<Bytes> {
		self.data.lock().unwrap()
			.as_ref()
			.map(|data| Bytes::copy_from_slice(data))
	}

	pub fn creations(&self) -> usize {
		self.creations.load(Ordering::SeqCst)
	}

	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	fn check(&self) -> Result<(), CanvasError> {
		if self.failing.load(Ordering::SeqCst) {
			Err(CanvasError::Unavailable(String::from("cache offline")))
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl CanvasStore for MemoryCanvas {
	async fn exists(&self) -> Result<bool, CanvasError> {
		self.latency.wait().await;
		self.check()?;
		Ok(self.data.lock().unwrap().is_some())
	}

	async fn create(&self, data: Bytes) -> Result<bool, CanvasError> {
		self.latency.wait().await;
		self.check()?;
		let mut canvas = self.data.lock().unwrap();
		if canvas.is_some() {
			return Ok(false);
		}

		canvas.replace(BytesMut::from(&data[..]));
		self.creations.fetch_add(1, Ordering::SeqCst);
		Ok(true)
	}

	async fn write_range(
		&self,
		offset: usize,
		data: &[u8],
	) -> Result<(), CanvasError> {
		self.latency.wait().await;
		self.check()?;
		self.writes.fetch_add(1, Ordering::SeqCst);

		if offset + data.len() > self.len {
			return Err(CanvasError::OutOfRange { offset, len: data.len() });
		}

		let mut canvas = self.data.lock().unwrap();
		let canvas = canvas.as_mut().ok_or(CanvasError::Missing)?;
		canvas[offset..offset + data.len()].copy_from_slice(data);
		Ok(())
	}

	async fn read(&self) -> Result<Option<Bytes>, CanvasError> {
		self.check()?;
		Ok(self.contents())
	}

	async fn replace(&self, data: Bytes) -> Result<(), CanvasError> {
		self.check()?;
		self.data.lock().unwrap().replace(BytesMut::from(&data[..]));
		Ok(())
	}
}

#[derive(Default)]
pub struct MemoryRegistry {
	connections: Mutex<Vec<String>>,
	reads: AtomicUsize,
	failing: AtomicBool,
	latency: Latency,
}

impl MemoryRegistry {
	pub fn new(connections: &[&str]) -> Self {
		Self {
			connections: Mutex::new(connections.iter().map(|c| c.to_string()).collect()),
			..Default::default()
		}
	}

	pub fn fail(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn slow_down(&self, delay: Duration) {
		self.latency.set(delay);
	}

	pub fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}

	pub fn connections(&self) -> Vec<String> {
		self.connections.lock().unwrap().clone()
	}

	fn check(&self) -> Result<(), RegistryError> {
		if self.failing.load(Ordering::SeqCst) {
			Err(RegistryError::Unavailable(String::from("registry offline")))
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl ConnectionRegistry for MemoryRegistry {
	async fn list_active(&self) -> Result<Vec<String>, RegistryError> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		self.latency.wait().await;
		self.check()?;
		Ok(self.connections())
	}

	async fn register(&self, id: &str) -> Result<(), RegistryError> {
		self.check()?;
		let mut connections = self.connections.lock().unwrap();
		if !connections.iter().any(|c| c == id) {
			connections.push(id.to_owned());
		}
		Ok(())
	}

	async fn unregister(&self, id: &str) -> Result<(), RegistryError> {
		self.check()?;
		self.connections.lock().unwrap().retain(|c| c != id);
		Ok(())
	}
}

#[derive(Default)]
pub struct RecordingChannel {
	delivered: Mutex<Vec<(String, String)>>,
	failures: Mutex<HashMap<String, DeliveryError>>,
	stalled: Mutex<HashSet<String>>,
	attempts: AtomicUsize,
}

impl RecordingChannel {
	pub fn fail_for(&self, recipient: &str, error: DeliveryError) {
		self.failures.lock().unwrap().insert(recipient.to_owned(), error);
	}

	/// Deliveries to `recipient` never complete.
	pub fn stall_for(&self, recipient: &str) {
		self.stalled.lock().unwrap().insert(recipient.to_owned());
	}

	pub fn delivered(&self) -> Vec<(String, String)> {
		self.delivered.lock().unwrap().clone()
	}

	pub fn attempts(&self) -> usize {
		self.attempts.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl PushChannel for RecordingChannel {
	async fn post(
		&self,
		recipient: &str,
		payload: &str,
	) -> Result<(), DeliveryError> {
		self.attempts.fetch_add(1, Ordering::SeqCst);

		let stalled = self.stalled.lock().unwrap().contains(recipient);
		if stalled {
			std::future::pending::<()>().await;
		}

		let failure = self.failures.lock().unwrap().get(recipient).cloned();
		if let Some(error) = failure {
			return Err(error);
		}

		self.delivered.lock().unwrap()
			.push((recipient.to_owned(), payload.to_owned()));
		Ok(())
	}
}

/// A board wired to in-memory stores, with handles on each of them.
pub struct Fixture<C = RecordingChannel> {
	pub log: Arc<MemoryLog>,
	pub canvas: Arc<MemoryCanvas>,
	pub registry: Arc<MemoryRegistry>,
	pub channel: Arc<C>,
	pub board: Arc<Board>,
}

impl Fixture {
	pub fn new(
		width: u32,
		height: u32,
		connections: &[&str],
	) -> Self {
		Self::with_channel(width, height, connections, Arc::default())
	}

	/// Like [`Fixture::new`] but every placement must finish within `deadline`.
	pub fn with_deadline(
		width: u32,
		height: u32,
		connections: &[&str],
		deadline: Duration,
	) -> Self {
		Self::build(width, height, connections, Arc::default(), deadline)
	}
}

impl<C: PushChannel + 'static> Fixture<C> {
	pub fn with_channel(
		width: u32,
		height: u32,
		connections: &[&str],
		channel: Arc<C>,
	) -> Self {
		Self::build(width, height, connections, channel, Duration::from_secs(1))
	}

	fn build(
		width: u32,
		height: u32,
		connections: &[&str],
		channel: Arc<C>,
		deadline: Duration,
	) -> Self {
		let shape = CanvasShape::new(width, height);
		let log = Arc::new(MemoryLog::default());
		let canvas = Arc::new(MemoryCanvas::new(shape.len()));
		let registry = Arc::new(MemoryRegistry::new(connections));

		let board = Board::new(
			log.clone(),
			Canvas::new(canvas.clone(), shape, Color::WHITE),
			registry.clone(),
			Fanout::new(channel.clone()),
			deadline,
		);

		Self {
			log,
			canvas,
			registry,
			channel,
			board: Arc::new(board),
		}
	}
}
