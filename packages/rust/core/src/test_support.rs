//! Fakes shared by the pipeline and exporter tests.

use std::future::Future;
use std::io::{Cursor, Read};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use docsplit_shared::{DocsplitError, Result};

use crate::exporter::{DownloadSink, Notifier};
use crate::pipeline::{ExportManifest, ProgressReporter};
use crate::renderer::SectionRenderer;

/// Returns the section markdown unchanged as a `.txt` blob.
#[derive(Default)]
pub(crate) struct EchoRenderer;

impl SectionRenderer for EchoRenderer {
    fn extension(&self) -> &str {
        "txt"
    }

    fn render(&self, markdown: &str) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let blob = markdown.as_bytes().to_vec();
        async move { Ok(blob) }
    }
}

/// Echoes sections until call number `fail_on` (1-based), which errors.
pub(crate) struct FailingRenderer {
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingRenderer {
    pub(crate) fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SectionRenderer for FailingRenderer {
    fn extension(&self) -> &str {
        "txt"
    }

    fn render(&self, markdown: &str) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let result = if call == self.fail_on {
            Err(DocsplitError::render(format!("renderer crashed on section {call}")))
        } else {
            Ok(markdown.as_bytes().to_vec())
        };
        async move { result }
    }
}

/// Echo renderer that blocks every render until the gate is opened.
#[derive(Default)]
pub(crate) struct GatedRenderer {
    pub(crate) gate: Notify,
}

impl SectionRenderer for GatedRenderer {
    fn extension(&self) -> &str {
        "txt"
    }

    fn render(&self, markdown: &str) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let blob = markdown.as_bytes().to_vec();
        async move {
            self.gate.notified().await;
            Ok(blob)
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingProgress {
    rendered: Mutex<Vec<String>>,
    finished: Mutex<Option<String>>,
}

impl RecordingProgress {
    pub(crate) fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }

    pub(crate) fn finished(&self) -> Option<String> {
        self.finished.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn phase(&self, _name: &str) {}

    fn section_rendered(&self, path: &str, current: usize, total: usize) {
        self.rendered
            .lock()
            .unwrap()
            .push(format!("{current}/{total} {path}"));
    }

    fn done(&self, manifest: &ExportManifest) {
        *self.finished.lock().unwrap() = Some(manifest.archive_file_name.clone());
    }
}

/// Keeps every saved archive; optionally refuses to save.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) refuse: bool,
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingSink {
    pub(crate) fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub(crate) fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl DownloadSink for RecordingSink {
    fn save(&self, file_name: &str, archive: &[u8]) -> Result<()> {
        if self.refuse {
            return Err(DocsplitError::io(
                file_name,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), archive.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub(crate) fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, manifest: &ExportManifest) {
        self.successes
            .lock()
            .unwrap()
            .push(manifest.archive_file_name.clone());
    }

    fn failure(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}

/// Entry names of a zip blob in central-directory order.
pub(crate) fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect()
}

/// Contents of one zip entry as UTF-8.
pub(crate) fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut file = archive.by_name(name).expect("entry present");
    let mut out = String::new();
    file.read_to_string(&mut out).expect("read entry");
    out
}
