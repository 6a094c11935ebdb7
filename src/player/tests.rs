use super::*;
use crate::audio::{EngineEvent, PlaybackEngine, Property, PropertyValue};
use crate::subsonic::{Directory, DirectoryBrowser, Entry, SubsonicError};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Load(String),
    Stop,
    Paused(bool),
    Volume(i64),
}

#[derive(Default)]
struct FakeEngine {
    calls: Mutex<Vec<Call>>,
    props: Mutex<Vec<(Property, PropertyValue)>>,
}

impl FakeEngine {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Load(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    fn set_prop(&self, property: Property, value: PropertyValue) {
        self.props.lock().unwrap().push((property, value));
    }
}

impl PlaybackEngine for FakeEngine {
    fn load_and_play(&self, uri: &str) {
        self.calls.lock().unwrap().push(Call::Load(uri.to_string()));
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push(Call::Stop);
    }

    fn set_paused(&self, paused: bool) {
        self.calls.lock().unwrap().push(Call::Paused(paused));
    }

    fn set_volume(&self, percent: i64) {
        self.calls.lock().unwrap().push(Call::Volume(percent));
    }

    fn get_property(&self, property: Property) -> Option<PropertyValue> {
        self.props
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }
}

#[derive(Default)]
struct FakeRenderer {
    queues: Mutex<Vec<Vec<QueueEntry>>>,
    status_lines: Mutex<Vec<String>>,
    labels: Mutex<Vec<(TransportState, Option<String>)>>,
    redraws: Mutex<usize>,
}

impl FakeRenderer {
    fn last_queue(&self) -> Option<Vec<QueueEntry>> {
        self.queues.lock().unwrap().last().cloned()
    }

    fn last_label(&self) -> Option<(TransportState, Option<String>)> {
        self.labels.lock().unwrap().last().cloned()
    }
}

impl Renderer for FakeRenderer {
    fn update_queue_display(&self, entries: Vec<QueueEntry>) {
        self.queues.lock().unwrap().push(entries);
    }

    fn update_status_line(&self, line: String) {
        self.status_lines.lock().unwrap().push(line);
    }

    fn update_transport_label(&self, transport: TransportState, current_title: Option<&str>) {
        self.labels
            .lock()
            .unwrap()
            .push((transport, current_title.map(str::to_string)));
    }

    fn request_redraw(&self) {
        *self.redraws.lock().unwrap() += 1;
    }
}

#[derive(Default)]
struct FakeBrowser {
    dirs: HashMap<String, Directory>,
}

impl FakeBrowser {
    fn with_dir(mut self, id: &str, entries: Vec<Entry>) -> Self {
        self.dirs.insert(
            id.to_string(),
            Directory {
                id: id.to_string(),
                parent: None,
                name: id.to_string(),
                entries,
            },
        );
        self
    }
}

impl DirectoryBrowser for FakeBrowser {
    fn resolve(&self, id: &str) -> Result<Directory, SubsonicError> {
        self.dirs.get(id).cloned().ok_or(SubsonicError::Api {
            code: 70,
            message: format!("directory {id} not found"),
        })
    }

    fn play_url(&self, entry: &Entry) -> String {
        format!("stream:{}", entry.id)
    }
}

fn song(id: &str, title: &str) -> Entry {
    Entry {
        id: id.into(),
        title: title.into(),
        is_dir: false,
        path: format!("{title}.mp3"),
        artist: String::new(),
    }
}

fn dir(id: &str) -> Entry {
    Entry {
        id: id.into(),
        title: id.into(),
        is_dir: true,
        path: id.into(),
        artist: String::new(),
    }
}

fn item(name: &str) -> QueueItem {
    QueueItem::new(format!("uri:{name}"), name, "artist")
}

fn setup() -> (Arc<FakeEngine>, Arc<FakeRenderer>, PlaybackController) {
    let engine = Arc::new(FakeEngine::default());
    let renderer = Arc::new(FakeRenderer::default());
    let controller = PlaybackController::new(engine.clone(), renderer.clone(), 100);
    (engine, renderer, controller)
}

fn titles(controller: &PlaybackController) -> Vec<String> {
    controller
        .queue()
        .items()
        .iter()
        .map(|i| i.title.clone())
        .collect()
}

#[test]
fn queue_remove_at_preserves_order_of_the_rest() {
    let mut queue = PlayQueue::new();
    for name in ["a", "b", "c", "d"] {
        queue.append(item(name));
    }

    assert_eq!(queue.remove_at(1), Some(item("b")));
    let rest: Vec<&str> = queue.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(rest, vec!["a", "c", "d"]);
}

#[test]
fn queue_remove_at_out_of_range_is_ignored() {
    let mut queue = PlayQueue::new();
    queue.append(item("a"));

    assert_eq!(queue.remove_at(1), None);
    assert_eq!(queue.remove_at(usize::MAX), None);
    assert_eq!(queue.len(), 1);

    let mut empty = PlayQueue::new();
    assert_eq!(empty.remove_at(0), None);
}

#[test]
fn controller_remove_at_out_of_range_pushes_nothing() {
    let (_engine, renderer, mut controller) = setup();
    controller.append(item("a"));
    let pushes = renderer.queues.lock().unwrap().len();

    controller.remove_at(1);
    controller.remove_at(7);

    assert_eq!(titles(&controller), vec!["a"]);
    assert_eq!(renderer.queues.lock().unwrap().len(), pushes);
}

#[test]
fn remove_at_non_head_while_playing_leaves_engine_alone() {
    let (engine, renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.append(item("y"));
    controller.append(item("z"));

    controller.remove_at(1);

    assert_eq!(titles(&controller), vec!["x", "z"]);
    assert!(!engine.calls().contains(&Call::Stop));
    assert_eq!(controller.transport(), TransportState::Playing);
    let shown: Vec<String> = renderer
        .last_queue()
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(shown, vec!["x", "z"]);
}

#[test]
fn removing_the_loaded_head_goes_through_stop() {
    let (engine, _renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.append(item("y"));

    controller.remove_at(0);

    assert!(engine.calls().contains(&Call::Stop));
    assert_eq!(controller.transport(), TransportState::Stopped);
    // Still there until the engine reports the end of file.
    assert_eq!(titles(&controller), vec!["x", "y"]);

    // A second request while the stop is in flight changes nothing.
    controller.remove_at(0);
    assert_eq!(titles(&controller), vec!["x", "y"]);
    assert_eq!(
        engine.calls().iter().filter(|c| **c == Call::Stop).count(),
        1
    );

    controller.on_end_file(1);
    assert_eq!(titles(&controller), vec!["y"]);
    assert_eq!(engine.loads(), vec!["uri:x", "uri:y"]);
    assert_eq!(controller.transport(), TransportState::Playing);
}

#[test]
fn removing_an_unloaded_head_is_structural() {
    let (engine, _renderer, mut controller) = setup();
    controller.append(item("a"));
    controller.append(item("b"));

    controller.remove_at(0);

    assert_eq!(titles(&controller), vec!["b"]);
    assert!(!engine.calls().contains(&Call::Stop));
}

#[test]
fn append_directory_flattens_depth_first() {
    let browser = FakeBrowser::default()
        .with_dir("d", vec![song("b", "B"), dir("e")])
        .with_dir("e", vec![song("c", "C")]);
    let (_engine, renderer, controller) = setup();
    let shared = Mutex::new(controller);

    let added = PlaybackController::append_directory(
        &shared,
        &browser,
        &[song("a", "A"), dir("d")],
        "Fallback",
    )
    .unwrap();
    let controller = shared.into_inner().unwrap();

    assert_eq!(added, 3);
    assert_eq!(titles(&controller), vec!["A", "B", "C"]);
    let uris: Vec<&str> = controller
        .queue()
        .items()
        .iter()
        .map(|i| i.uri.as_str())
        .collect();
    assert_eq!(uris, vec!["stream:a", "stream:b", "stream:c"]);
    assert!(controller
        .queue()
        .items()
        .iter()
        .all(|i| i.artist == "Fallback"));
    assert_eq!(renderer.last_queue().unwrap().len(), 3);
}

#[test]
fn append_directory_keeps_tagged_artist() {
    let browser = FakeBrowser::default();
    let mut tagged = song("a", "A");
    tagged.artist = "Tagged".into();
    let mut queue = PlayQueue::new();

    queue
        .append_directory(&browser, &[tagged, song("b", "")], "Dir")
        .unwrap();

    assert_eq!(queue.items()[0].artist, "Tagged");
    assert_eq!(queue.items()[1].artist, "Dir");
    assert_eq!(queue.items()[1].title, ".mp3");
}

#[test]
fn append_directory_appends_nothing_when_a_resolve_fails() {
    let browser = FakeBrowser::default().with_dir("d", vec![song("b", "B"), dir("missing")]);
    let (_engine, _renderer, mut controller) = setup();
    controller.append(item("existing"));
    let shared = Mutex::new(controller);

    let result = PlaybackController::append_directory(
        &shared,
        &browser,
        &[song("a", "A"), dir("d")],
        "Fallback",
    );

    assert!(matches!(result, Err(SubsonicError::Api { code: 70, .. })));
    assert_eq!(titles(&shared.lock().unwrap()), vec!["existing"]);
}

#[test]
fn end_of_file_pops_head_and_loads_next() {
    let (engine, renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.append(item("y"));
    controller.append(item("z"));

    controller.on_end_file(1);

    assert_eq!(titles(&controller), vec!["y", "z"]);
    assert_eq!(engine.loads().last().map(String::as_str), Some("uri:y"));
    assert_eq!(controller.transport(), TransportState::Playing);
    assert_eq!(
        renderer.last_label(),
        Some((TransportState::Playing, Some("y".to_string())))
    );
}

#[test]
fn end_of_file_on_last_track_stops() {
    let (engine, renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");

    controller.on_end_file(1);

    assert!(controller.queue().is_empty());
    assert_eq!(engine.loads(), vec!["uri:x"]);
    assert_eq!(controller.transport(), TransportState::Stopped);
    assert_eq!(renderer.last_label(), Some((TransportState::Stopped, None)));
    assert_eq!(renderer.last_queue(), Some(Vec::new()));
}

#[test]
fn new_clamps_and_applies_initial_volume() {
    let engine = Arc::new(FakeEngine::default());
    let renderer = Arc::new(FakeRenderer::default());
    let controller = PlaybackController::new(engine.clone(), renderer, 140);

    assert_eq!(controller.volume(), MAX_VOLUME);
    assert_eq!(engine.calls(), vec![Call::Volume(100)]);
}

#[test]
fn adjust_volume_clamps_to_percent_range() {
    let engine = Arc::new(FakeEngine::default());
    let renderer = Arc::new(FakeRenderer::default());

    let mut controller = PlaybackController::new(engine.clone(), renderer.clone(), 98);
    assert_eq!(controller.adjust_volume(5), 100);
    assert_eq!(engine.calls().last(), Some(&Call::Volume(100)));

    let mut controller = PlaybackController::new(engine.clone(), renderer, 2);
    assert_eq!(controller.adjust_volume(-5), 0);
    assert_eq!(engine.calls().last(), Some(&Call::Volume(0)));

    let before = engine.calls().len();
    assert_eq!(controller.adjust_volume(-5), 0);
    assert_eq!(engine.calls().len(), before);
}

#[test]
fn format_status_examples() {
    assert_eq!(format_status(100, 65.0, 185.0), "[100%][01:05/03:05]");
    assert_eq!(format_status(50, -1.0, 30.0), "[50%][00:00/00:30]");
    assert_eq!(format_status(0, 0.0, 0.0), "[0%][00:00/00:00]");
    assert_eq!(format_status(7, 59.9, 3600.0), "[7%][00:59/60:00]");
}

#[test]
fn pause_toggles_between_playing_and_paused() {
    let (engine, renderer, mut controller) = setup();
    assert_eq!(controller.pause(), TransportState::Stopped);
    assert!(!engine.calls().iter().any(|c| matches!(c, Call::Paused(_))));

    controller.play("uri:x", "x", "artist");
    assert_eq!(controller.pause(), TransportState::Paused);
    assert_eq!(engine.calls().last(), Some(&Call::Paused(true)));
    assert_eq!(
        renderer.last_label(),
        Some((TransportState::Paused, Some("x".to_string())))
    );

    assert_eq!(controller.pause(), TransportState::Playing);
    assert_eq!(engine.calls().last(), Some(&Call::Paused(false)));
}

#[test]
fn play_while_loaded_replaces_the_head() {
    let (engine, _renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.append(item("y"));

    controller.play("uri:w", "w", "artist");

    assert_eq!(titles(&controller), vec!["w", "y"]);
    assert_eq!(engine.loads(), vec!["uri:x", "uri:w"]);
    assert_eq!(controller.current_title(), Some("w"));
}

#[test]
fn play_while_stopped_goes_in_front() {
    let (_engine, _renderer, mut controller) = setup();
    controller.append(item("y"));

    controller.play("uri:w", "w", "artist");

    assert_eq!(titles(&controller), vec!["w", "y"]);
    assert_eq!(controller.transport(), TransportState::Playing);
}

#[test]
fn play_after_stop_ignores_the_stale_end_of_file() {
    let (engine, _renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.append(item("y"));
    controller.stop();

    controller.play("uri:w", "w", "artist");
    assert_eq!(titles(&controller), vec!["w", "y"]);

    // End of file for the stopped "x" arrives late.
    controller.on_end_file(1);
    assert_eq!(titles(&controller), vec!["w", "y"]);
    assert_eq!(controller.transport(), TransportState::Playing);
    assert_eq!(engine.loads(), vec!["uri:x", "uri:w"]);

    // The next one is real.
    controller.on_end_file(2);
    assert_eq!(titles(&controller), vec!["y"]);
    assert_eq!(engine.loads().last().map(String::as_str), Some("uri:y"));
}

#[test]
fn clear_stops_and_ignores_the_following_end_of_file() {
    let (engine, renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.append(item("y"));

    controller.clear();
    assert!(controller.queue().is_empty());
    assert!(engine.calls().contains(&Call::Stop));
    assert_eq!(renderer.last_queue(), Some(Vec::new()));

    controller.append(item("z"));
    controller.on_end_file(1);

    assert_eq!(titles(&controller), vec!["z"]);
    assert_eq!(engine.loads(), vec!["uri:x"]);
    assert_eq!(controller.transport(), TransportState::Stopped);
}

#[test]
fn natural_end_racing_play_now_keeps_the_new_track() {
    let (engine, _renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.append(item("y"));

    // "x" ends on its own while the user already picked "z".
    controller.play("uri:z", "z", "artist");
    controller.on_end_file(1);

    assert_eq!(titles(&controller), vec!["z", "y"]);
    assert_eq!(engine.loads(), vec!["uri:x", "uri:z"]);
    assert_eq!(controller.transport(), TransportState::Playing);

    controller.on_end_file(2);
    assert_eq!(titles(&controller), vec!["y"]);
    assert_eq!(engine.loads(), vec!["uri:x", "uri:z", "uri:y"]);
}

#[test]
fn start_file_after_stop_keeps_the_stopped_label() {
    let (_engine, renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.stop();

    controller.on_start_file(1);

    assert_eq!(controller.transport(), TransportState::Stopped);
    assert_eq!(renderer.last_label(), Some((TransportState::Stopped, None)));
}

#[test]
fn start_file_does_not_undo_a_pause() {
    let (_engine, renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.pause();

    controller.on_start_file(1);

    assert_eq!(controller.transport(), TransportState::Paused);
    assert_eq!(
        renderer.last_label(),
        Some((TransportState::Paused, Some("x".to_string())))
    );
}

#[test]
fn start_file_for_a_superseded_load_is_ignored() {
    let (_engine, renderer, mut controller) = setup();
    controller.play("uri:x", "x", "artist");
    controller.play("uri:z", "z", "artist");
    let labels = renderer.labels.lock().unwrap().len();

    controller.on_start_file(1);
    assert_eq!(renderer.labels.lock().unwrap().len(), labels);

    controller.on_start_file(2);
    assert_eq!(
        renderer.last_label(),
        Some((TransportState::Playing, Some("z".to_string())))
    );
}

#[test]
fn stop_when_stopped_is_a_no_op() {
    let (engine, _renderer, mut controller) = setup();
    controller.append(item("a"));

    controller.stop();

    assert!(!engine.calls().contains(&Call::Stop));
    assert_eq!(titles(&controller), vec!["a"]);
}

fn reconciler() -> (
    Arc<FakeEngine>,
    Arc<FakeRenderer>,
    Arc<Mutex<PlaybackController>>,
    EventReconciler,
) {
    let (engine, renderer, controller) = setup();
    let controller = Arc::new(Mutex::new(controller));
    let reconciler = EventReconciler::new(controller.clone(), engine.clone(), renderer.clone());
    (engine, renderer, controller, reconciler)
}

#[test]
fn shutdown_sentinel_ends_the_loop() {
    let (_engine, renderer, _controller, reconciler) = reconciler();
    assert!(reconciler.handle_event(EngineEvent::Shutdown).is_none());
    assert!(renderer.status_lines.lock().unwrap().is_empty());
}

#[test]
fn missing_properties_read_as_zero() {
    let (_engine, renderer, _controller, reconciler) = reconciler();

    let snapshot = reconciler
        .handle_event(EngineEvent::PropertyChange)
        .unwrap();

    assert_eq!(snapshot.volume_percent, 0);
    assert_eq!(snapshot.position_seconds, 0.0);
    assert_eq!(snapshot.duration_seconds, 0.0);
    assert_eq!(snapshot.transport, TransportState::Stopped);
    assert_eq!(
        renderer.status_lines.lock().unwrap().last().map(String::as_str),
        Some("[0%][00:00/00:00]")
    );
    assert_eq!(*renderer.redraws.lock().unwrap(), 1);
}

#[test]
fn property_change_refreshes_status_line() {
    let (engine, renderer, _controller, reconciler) = reconciler();
    engine.set_prop(Property::Volume, PropertyValue::Int(80));
    engine.set_prop(Property::TimePos, PropertyValue::Double(65.4));
    engine.set_prop(Property::Duration, PropertyValue::Double(185.0));

    reconciler.handle_event(EngineEvent::PropertyChange);

    assert_eq!(
        renderer.status_lines.lock().unwrap().last().map(String::as_str),
        Some("[80%][01:05/03:05]")
    );
}

#[test]
fn end_file_event_advances_the_queue() {
    let (engine, _renderer, controller, reconciler) = reconciler();
    {
        let mut c = controller.lock().unwrap();
        c.play("uri:x", "x", "artist");
        c.append(item("y"));
    }

    let snapshot = reconciler.handle_event(EngineEvent::EndFile(1)).unwrap();

    assert_eq!(snapshot.transport, TransportState::Playing);
    assert_eq!(titles(&controller.lock().unwrap()), vec!["y"]);
    assert_eq!(engine.loads().last().map(String::as_str), Some("uri:y"));
}

#[test]
fn run_drains_events_until_shutdown() {
    let (_engine, renderer, controller, reconciler) = reconciler();
    controller
        .lock()
        .unwrap()
        .play("uri:x", "x", "artist");

    let (tx, rx) = std::sync::mpsc::channel();
    tx.send(EngineEvent::StartFile(1)).unwrap();
    tx.send(EngineEvent::EndFile(1)).unwrap();
    tx.send(EngineEvent::Shutdown).unwrap();
    tx.send(EngineEvent::PropertyChange).unwrap();

    let handle = reconciler.spawn(rx).unwrap();
    handle.join().unwrap();

    assert!(controller.lock().unwrap().queue().is_empty());
    // StartFile and EndFile each refreshed the status; nothing after Shutdown.
    assert_eq!(renderer.status_lines.lock().unwrap().len(), 2);
}

#[test]
fn end_file_emitted_before_play_now_is_stale_on_the_reconciler_thread() {
    let (engine, _renderer, controller, reconciler) = reconciler();
    let (tx, rx) = mpsc::channel();
    {
        let mut c = controller.lock().unwrap();
        c.play("uri:x", "x", "artist");
        c.append(item("y"));
    }

    // The engine reported the natural end of "x" before the user picked "z".
    tx.send(EngineEvent::EndFile(1)).unwrap();
    controller.lock().unwrap().play("uri:z", "z", "artist");
    tx.send(EngineEvent::Shutdown).unwrap();

    reconciler.spawn(rx).unwrap().join().unwrap();

    let c = controller.lock().unwrap();
    assert_eq!(titles(&c), vec!["z", "y"]);
    assert_eq!(c.current_title(), Some("z"));
    assert_eq!(engine.loads(), vec!["uri:x", "uri:z"]);
}

/// Browser whose lookups block until the test lets them finish.
struct GatedBrowser {
    inner: FakeBrowser,
    entered: Sender<()>,
    release: Receiver<()>,
}

impl DirectoryBrowser for GatedBrowser {
    fn resolve(&self, id: &str) -> Result<Directory, SubsonicError> {
        self.entered.send(()).unwrap();
        self.release.recv().unwrap();
        self.inner.resolve(id)
    }

    fn play_url(&self, entry: &Entry) -> String {
        self.inner.play_url(entry)
    }
}

#[test]
fn directory_lookups_do_not_hold_the_controller() {
    let (_engine, renderer, controller, reconciler) = reconciler();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let browser = GatedBrowser {
        inner: FakeBrowser::default().with_dir("d", vec![song("b", "B")]),
        entered: entered_tx,
        release: release_rx,
    };

    let appender = {
        let controller = controller.clone();
        thread::spawn(move || {
            PlaybackController::append_directory(&controller, &browser, &[dir("d")], "Fallback")
        })
    };

    entered_rx.recv().unwrap();
    // Lookup in flight: the reconciler still gets through.
    assert!(controller.try_lock().is_ok());
    assert!(reconciler
        .handle_event(EngineEvent::PropertyChange)
        .is_some());
    assert_eq!(renderer.status_lines.lock().unwrap().len(), 1);

    release_tx.send(()).unwrap();
    assert_eq!(appender.join().unwrap().unwrap(), 1);
    assert_eq!(titles(&controller.lock().unwrap()), vec!["B"]);
}
