use crate::{pagination::cursor::Cursor, records::event::Event};

/// A bounded group of events handed downstream together.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: String,
    pub events: Vec<Event>,
    pub cursor: Cursor, // last committed cursor when the rows were fetched
    pub ts: chrono::DateTime<chrono::Utc>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn size_bytes(&self) -> usize {
        self.events.iter().map(|e| e.body.len()).sum()
    }
}
