use crate::map::Position;
use serde_json::json;
use std::{collections::HashMap, fs::File, io::BufWriter, io::Write};
use uuid::Uuid;

pub fn create_replay_logger(
    filename: Option<String>,
    width: usize,
    height: usize,
    queen: Position,
) -> Box<dyn ReplayLogger> {
    match filename {
        None => Box::new(NoOpReplayLogger {}),
        Some(filename) => Box::new(JsonReplayLogger::new(filename, width, height, queen)),
    }
}

/// Records what happened on each tick of a simulation.
pub trait ReplayLogger {
    #[allow(unused_variables)]
    fn log_tick(&mut self, tick: u64, ants: usize, pending_eggs: usize, food_store: f64) {}

    #[allow(unused_variables)]
    fn log_event(&mut self, tick: u64, event: Event) {}

    fn save(&self) -> std::io::Result<()> {
        Ok(())
    }

    fn log_spawn_food(&mut self, tick: u64, location: Position, amount: f64) {
        self.log_event(
            tick,
            Event::new(EventType::Spawn, "Food", None, location, Some(amount)),
        );
    }

    fn log_pick_up(&mut self, tick: u64, id: Uuid, location: Position, amount: f64) {
        self.log_event(
            tick,
            Event::new(EventType::PickUp, "Ant", Some(id), location, Some(amount)),
        );
    }

    fn log_deposit(&mut self, tick: u64, id: Uuid, location: Position, amount: f64) {
        self.log_event(
            tick,
            Event::new(EventType::Deposit, "Ant", Some(id), location, Some(amount)),
        );
    }

    fn log_lay_eggs(&mut self, tick: u64, location: Position, count: usize) {
        self.log_event(
            tick,
            Event::new(EventType::Lay, "Egg", None, location, Some(count as f64)),
        );
    }

    fn log_hatch(&mut self, tick: u64, id: Uuid, location: Position) {
        self.log_event(
            tick,
            Event::new(EventType::Spawn, "Ant", Some(id), location, None),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum EventType {
    Spawn,
    PickUp,
    Deposit,
    Lay,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Event {
    event_type: EventType,
    entity: String,
    entity_id: Option<Uuid>,
    location: Position,
    amount: Option<f64>,
}

impl Event {
    fn new(
        event_type: EventType,
        entity: &str,
        entity_id: Option<Uuid>,
        location: Position,
        amount: Option<f64>,
    ) -> Event {
        Event {
            event_type,
            entity: entity.to_string(),
            entity_id,
            location,
            amount,
        }
    }
}

struct Tick {
    tick: u64,
    ants: usize,
    pending_eggs: usize,
    food_store: f64,
}

struct NoOpReplayLogger;
impl ReplayLogger for NoOpReplayLogger {}

struct JsonReplayLogger {
    filename: String,
    width: usize,
    height: usize,
    queen: Position,
    ticks: Vec<Tick>,
    events: HashMap<u64, Vec<Event>>,
}

impl JsonReplayLogger {
    pub fn new(filename: String, width: usize, height: usize, queen: Position) -> JsonReplayLogger {
        JsonReplayLogger {
            filename,
            width,
            height,
            queen,
            ticks: Vec::new(),
            events: HashMap::new(),
        }
    }
}

impl ReplayLogger for JsonReplayLogger {
    fn log_tick(&mut self, tick: u64, ants: usize, pending_eggs: usize, food_store: f64) {
        self.ticks.push(Tick {
            tick,
            ants,
            pending_eggs,
            food_store,
        });
    }

    fn log_event(&mut self, tick: u64, event: Event) {
        self.events.entry(tick).or_default().push(event);
    }

    fn save(&self) -> std::io::Result<()> {
        let file = File::create(&self.filename)?;
        let ticks: Vec<_> = self
            .ticks
            .iter()
            .map(|tick| {
                json!({
                    "tick": tick.tick,
                    "ants": tick.ants,
                    "pending_eggs": tick.pending_eggs,
                    "food_store": tick.food_store,
                    "events": self.events.get(&tick.tick).unwrap_or(&Vec::new()),
                })
            })
            .collect();

        let data = json!({
            "grid": {
                "width": self.width,
                "height": self.height,
            },
            "queen": self.queen,
            "ticks": ticks,
        });

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, &data)?;
        writer.flush()
    }
}
