//! In-memory [`Notify`] double for tests of notifier consumers.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Message(String),
    File {
        name: String,
        caption: String,
        data: Vec<u8>,
    },
}

/// Records every call in order. File uploads whose name was registered with
/// [`RecordingNotifier::fail_file`] are recorded but reported as undelivered.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
    failing_files: Mutex<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_file(&self, name: impl Into<String>) {
        self.failing_files.lock().unwrap().insert(name.into());
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Message(text) => Some(text),
                Delivery::File { .. } => None,
            })
            .collect()
    }

    /// `(name, caption, data)` of every upload, in call order.
    pub fn files(&self) -> Vec<(String, String, Vec<u8>)> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::File {
                    name,
                    caption,
                    data,
                } => Some((name, caption, data)),
                Delivery::Message(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn send_message(&self, text: &str) -> bool {
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery::Message(text.to_string()));
        true
    }

    async fn send_file(&self, file_name: &str, data: &[u8], caption: &str) -> bool {
        self.deliveries.lock().unwrap().push(Delivery::File {
            name: file_name.to_string(),
            caption: caption.to_string(),
            data: data.to_vec(),
        });
        !self.failing_files.lock().unwrap().contains(file_name)
    }
}
