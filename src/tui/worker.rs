//! Background I/O worker.
//!
//! The projector and the event loop are synchronous; all HTTP runs on a single
//! worker thread that owns the API client. Requests go in through a channel,
//! results come back tagged with the sequence number the caller drew from its
//! [`RefreshGate`](crate::schedule::RefreshGate). Because one thread serves
//! the queue, responses arrive in request order; the gate only has to protect
//! against fetches that were already in flight when a local mutation landed.

use chrono::NaiveDate;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;
use tracing::{debug, error};

use crate::api::{ApiClient, ApiError, ScheduleFetch};
use crate::models::{Plant, PlantSummary, Section};

#[derive(Debug)]
pub enum WorkerRequest {
    FetchGarden { seq: u64 },
    FetchSections { seq: u64 },
    FetchWatering { seq: u64 },
    FetchPruning { seq: u64, year: i32 },
    Search { seq: u64, query: String },
    FetchSuggestions { seq: u64, section_id: String },
    AddPlant { plant_id: i64 },
    RemovePlant { plant_id: i64 },
    AssignSection { plant_id: i64, section: Option<String> },
    CreateSection { section_id: String, name: String, glyph: Option<String> },
    RenameSection { id: i64, name: String, glyph: Option<String> },
    DeleteSection { id: i64, assigned: Vec<i64> },
    MarkWatered { plant_id: i64, date: NaiveDate, completed: bool },
    Shutdown,
}

#[derive(Debug)]
pub enum WorkerEvent {
    Garden { seq: u64, result: Result<Vec<Plant>, ApiError> },
    Sections { seq: u64, result: Result<Vec<Section>, ApiError> },
    Watering { seq: u64, result: Result<ScheduleFetch, ApiError> },
    Pruning { seq: u64, result: Result<ScheduleFetch, ApiError> },
    SearchResults { seq: u64, result: Result<Vec<PlantSummary>, ApiError> },
    Suggestions { seq: u64, section_id: String, result: Result<Vec<PlantSummary>, ApiError> },
    PlantAdded { result: Result<Plant, ApiError> },
    /// A write finished; `description` is a short past-tense phrase for the
    /// status bar ("plant removed", "section renamed", ...)
    MutationDone { description: String, result: Result<(), ApiError> },
}

pub struct WorkerHandle {
    tx: Sender<WorkerRequest>,
    rx: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn spawn(api: ApiClient) -> Self {
        let (req_tx, req_rx) = channel::<WorkerRequest>();
        let (event_tx, event_rx) = channel::<WorkerEvent>();

        let thread = std::thread::spawn(move || {
            worker_loop(api, req_rx, event_tx);
        });

        Self {
            tx: req_tx,
            rx: event_rx,
            thread: Some(thread),
        }
    }

    /// Queue a request; a dead worker just drops it (the UI keeps running on
    /// the data it has)
    pub fn send(&self, request: WorkerRequest) {
        if let Err(e) = self.tx.send(request) {
            error!("worker channel closed: {}", e);
        }
    }

    /// Drain one pending event, non-blocking
    pub fn try_recv(&self) -> Option<WorkerEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn shutdown(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(api: ApiClient, requests: Receiver<WorkerRequest>, events: Sender<WorkerEvent>) {
    while let Ok(request) = requests.recv() {
        debug!(?request, "worker request");
        let event = match request {
            WorkerRequest::Shutdown => break,
            WorkerRequest::FetchGarden { seq } => WorkerEvent::Garden {
                seq,
                result: api.garden_plants(),
            },
            WorkerRequest::FetchSections { seq } => WorkerEvent::Sections {
                seq,
                result: api.sections(),
            },
            WorkerRequest::FetchWatering { seq } => WorkerEvent::Watering {
                seq,
                result: api.watering_schedule(),
            },
            WorkerRequest::FetchPruning { seq, year } => WorkerEvent::Pruning {
                seq,
                result: api.pruning_schedule(year),
            },
            WorkerRequest::Search { seq, query } => WorkerEvent::SearchResults {
                seq,
                result: api.search_plants(&query),
            },
            WorkerRequest::FetchSuggestions { seq, section_id } => {
                let result = api.suggestions(&section_id);
                WorkerEvent::Suggestions {
                    seq,
                    section_id,
                    result,
                }
            }
            WorkerRequest::AddPlant { plant_id } => WorkerEvent::PlantAdded {
                result: api.add_plant(plant_id),
            },
            WorkerRequest::RemovePlant { plant_id } => WorkerEvent::MutationDone {
                description: "plant removed".to_string(),
                result: api.remove_plant(plant_id),
            },
            WorkerRequest::AssignSection { plant_id, section } => WorkerEvent::MutationDone {
                description: "plant moved".to_string(),
                result: api.assign_section(plant_id, section.as_deref()),
            },
            WorkerRequest::CreateSection {
                section_id,
                name,
                glyph,
            } => WorkerEvent::MutationDone {
                description: format!("section '{}' created", name),
                result: api
                    .create_section(&section_id, &name, glyph.as_deref())
                    .map(|_| ()),
            },
            WorkerRequest::RenameSection { id, name, glyph } => WorkerEvent::MutationDone {
                description: format!("section renamed to '{}'", name),
                result: api.rename_section(id, &name, glyph.as_deref()).map(|_| ()),
            },
            WorkerRequest::DeleteSection { id, assigned } => WorkerEvent::MutationDone {
                description: "section deleted".to_string(),
                result: api.delete_section(id, &assigned),
            },
            WorkerRequest::MarkWatered {
                plant_id,
                date,
                completed,
            } => WorkerEvent::MutationDone {
                description: if completed {
                    "watering recorded".to_string()
                } else {
                    "watering cleared".to_string()
                },
                result: api.mark_watered(plant_id, date, completed),
            },
        };

        if events.send(event).is_err() {
            // UI side is gone, nothing left to do
            break;
        }
    }
}
