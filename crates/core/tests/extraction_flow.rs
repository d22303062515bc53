//! End-to-end pipeline tests over the public crate API: events feed the
//! queues, the dispatcher drains them, settings changes steer behavior.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use libretto_core::testing::{fixtures, MockChapterAnalysis, MockLibrary, MockSessionMonitor};
use libretto_core::{
    CatchupConfig, CatchupTriggers, ChapterAnalysis, ConcurrencyGate, ExtractConfig,
    ExtractionDispatcher, IntroSkipConfig, LibraryEvent, MediaLibrary, ModeResolver, ModeSnapshot,
    SessionMonitor, SettingsUpdate, WorkQueue,
};

struct Pipeline {
    dispatcher: Arc<ExtractionDispatcher>,
    resolver: Arc<ModeResolver>,
    triggers: Arc<CatchupTriggers>,
    library: Arc<MockLibrary>,
    chapters: Arc<MockChapterAnalysis>,
    analysis_queue: Arc<WorkQueue<libretto_core::WorkItem>>,
    extract_queue: Arc<WorkQueue<libretto_core::WorkItem>>,
}

fn pipeline(extract: ExtractConfig, catchup: CatchupConfig, intro_skip: IntroSkipConfig) -> Pipeline {
    let library = Arc::new(MockLibrary::new());
    let chapters = Arc::new(MockChapterAnalysis::new());
    let monitor = Arc::new(MockSessionMonitor::new());
    let extract_queue = Arc::new(WorkQueue::new());
    let analysis_queue = Arc::new(WorkQueue::new());
    let gate = ConcurrencyGate::new(extract.max_concurrent);

    let triggers = Arc::new(CatchupTriggers::new(
        Arc::clone(&library) as Arc<dyn MediaLibrary>,
        Arc::clone(&monitor) as Arc<dyn SessionMonitor>,
        Arc::clone(&extract_queue),
        Arc::clone(&analysis_queue),
    ));

    let resolver = Arc::new(ModeResolver::new(
        ModeSnapshot::from_parts(&extract, &catchup, &intro_skip),
        Arc::clone(&gate),
        Arc::clone(&triggers),
        Arc::clone(&monitor) as Arc<dyn SessionMonitor>,
    ));
    resolver.bootstrap();

    let dispatcher = Arc::new(ExtractionDispatcher::new(
        Arc::clone(&library) as Arc<dyn MediaLibrary>,
        Arc::clone(&chapters) as Arc<dyn ChapterAnalysis>,
        Arc::clone(&monitor) as Arc<dyn SessionMonitor>,
        Arc::clone(&resolver),
        gate,
        Arc::clone(&extract_queue),
        Arc::clone(&analysis_queue),
    ));

    Pipeline {
        dispatcher,
        resolver,
        triggers,
        library,
        chapters,
        analysis_queue,
        extract_queue,
    }
}

#[tokio::test]
async fn test_event_to_analysis_chain() {
    // Intro-skip on, every item in scope and pattern found: an added
    // episode without a stream flows event -> extraction queue -> drain
    // loop -> analysis queue.
    let p = pipeline(
        ExtractConfig::default(),
        CatchupConfig::default(),
        IntroSkipConfig {
            enabled: true,
            ..IntroSkipConfig::default()
        },
    );
    p.chapters.set_pattern_detected(true);
    p.dispatcher.start();

    let mut episode = fixtures::episode_item("e1");
    episode.has_media_stream = false;
    p.triggers.handle_event(LibraryEvent::ItemAdded { item: episode });

    tokio::time::timeout(Duration::from_secs(2), async {
        while p.analysis_queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("episode should reach the analysis queue");

    assert_eq!(p.library.probe_calls(), vec!["e1"]);
    assert_eq!(p.analysis_queue.try_pop().unwrap().id, "e1");
    p.dispatcher.stop();
}

#[tokio::test]
async fn test_settings_resize_steers_running_pipeline() {
    let p = pipeline(
        ExtractConfig::default(),
        CatchupConfig::default(),
        IntroSkipConfig::default(),
    );
    p.library.set_probe_delay(Duration::from_millis(15));

    let items: Vec<_> = (0..6)
        .map(|i| fixtures::media_item(&format!("i{}", i)))
        .collect();

    // Widen the gate while the capacity-1 run is in flight.
    let resolver = Arc::clone(&p.resolver);
    let resize = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(25)).await;
        let mut update = SettingsUpdate {
            extract: ExtractConfig::default(),
            catchup: CatchupConfig::default(),
            intro_skip: IntroSkipConfig::default(),
        };
        update.extract.max_concurrent = 4;
        resolver.apply_settings(update);
    });

    let report = p
        .dispatcher
        .run_items(items, CancellationToken::new(), None)
        .await;
    resize.await.unwrap();

    assert_eq!(report.succeeded, 6);
    assert!(p.library.peak_concurrency() <= 4);
    assert_eq!(p.resolver.current().max_concurrent, 4);
}

#[tokio::test]
async fn test_batch_and_catchup_share_the_gate() {
    // A batch run and the drain loop compete for the same permits; the
    // combined in-flight extraction count stays within capacity.
    let mut extract = ExtractConfig::default();
    extract.max_concurrent = 2;
    let p = pipeline(extract, CatchupConfig::default(), IntroSkipConfig::default());
    p.library.set_probe_delay(Duration::from_millis(10));
    p.dispatcher.start();

    for i in 0..4 {
        p.extract_queue.push(fixtures::media_item(&format!("q{}", i)));
    }
    let batch: Vec<_> = (0..4)
        .map(|i| fixtures::media_item(&format!("b{}", i)))
        .collect();

    let report = p
        .dispatcher
        .run_items(batch, CancellationToken::new(), None)
        .await;
    assert_eq!(report.succeeded, 4);

    tokio::time::timeout(Duration::from_secs(2), async {
        while p.library.probe_calls().len() < 8 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("queued items should drain too");

    assert!(p.library.peak_concurrency() <= 2);
    p.dispatcher.stop();
}

#[tokio::test]
async fn test_catchup_toggle_round_trip() {
    let p = pipeline(
        ExtractConfig::default(),
        CatchupConfig { enabled: true },
        IntroSkipConfig::default(),
    );
    assert!(p.triggers.is_enabled());

    let mut update = SettingsUpdate {
        extract: ExtractConfig::default(),
        catchup: CatchupConfig { enabled: false },
        intro_skip: IntroSkipConfig::default(),
    };
    p.resolver.apply_settings(update.clone());
    assert!(!p.triggers.is_enabled());

    // Disabled: a favorite save is ignored.
    p.triggers.handle_event(LibraryEvent::FavoriteSaved {
        item: fixtures::media_item("f1"),
        is_favorite: true,
    });
    assert!(p.extract_queue.is_empty());

    update.catchup.enabled = true;
    p.resolver.apply_settings(update);
    p.triggers.handle_event(LibraryEvent::FavoriteSaved {
        item: fixtures::media_item("f1"),
        is_favorite: true,
    });
    assert_eq!(p.extract_queue.len(), 1);
}
