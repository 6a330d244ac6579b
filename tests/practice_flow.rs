use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::json;
use tempfile::TempDir;

use azbuka::audio::local_asset::LocalAssetStrategy;
use azbuka::audio::on_device::OnDeviceStrategy;
use azbuka::audio::{AudioBuffer, AudioResolver, AudioSink, AudioStrategy, Outcome, Tier};
use azbuka::queue::build_queue;
use azbuka::session::{PracticeMode, QuizSession};
use azbuka::store::JsonStore;
use azbuka::{Inventory, Settings};

fn make_store() -> (TempDir, JsonStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

fn write_clip(dir: &TempDir, id: &str) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(dir.path().join(format!("{id}.wav")), spec).unwrap();
    for i in 0..240 {
        writer.write_sample(((i % 16) * 1000) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn saved_settings_drive_the_queue() {
    let (dir, store) = make_store();
    std::fs::write(
        dir.path().join("alphabet_settings.json"),
        json!({
            "sessionLimit": 20,
            "priorityLetters": " ш, щ ,zz",
            "quizOptionCount": "six",
            "somethingElse": true
        })
        .to_string(),
    )
    .unwrap();

    let settings = store.load_settings();
    assert_eq!(settings.session_limit, Some(20));
    assert_eq!(settings.quiz_option_count, Settings::default().quiz_option_count);

    let inventory = Inventory::load(&settings.inventory).unwrap();
    let mut rng = SmallRng::seed_from_u64(42);
    let queue = build_queue(&inventory, &settings, &mut rng);
    assert_eq!(queue.len(), 20);
    assert!(queue.iter().all(|s| inventory.contains(&s.id)));

    store.save_settings(&settings).unwrap();
    assert_eq!(store.load_settings(), settings);
}

#[tokio::test]
async fn resolver_walks_the_real_tiers() {
    let clips = TempDir::new().unwrap();
    write_clip(&clips, "Б");
    let settings = Settings {
        audio_asset_base: clips.path().to_string_lossy().into_owned(),
        on_device_command: if cfg!(unix) { "true" } else { "" }.to_string(),
        ..Settings::default()
    };

    let plays = Arc::new(AtomicUsize::new(0));
    let counter = plays.clone();
    let sink: Arc<dyn AudioSink> = Arc::new(move |buffer: &AudioBuffer| {
        assert_eq!(buffer.frames(), 240);
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let strategies: Vec<Arc<dyn AudioStrategy>> = vec![
        Arc::new(LocalAssetStrategy::new(reqwest::Client::new())),
        Arc::new(OnDeviceStrategy::new()),
    ];
    let resolver = AudioResolver::with_strategies(sink, strategies);
    let inventory = Inventory::ukrainian();
    let be = inventory.get("Б").unwrap();
    let ve = inventory.get("В").unwrap();

    assert_eq!(resolver.resolve(be, &settings).await, Outcome::Played(Tier::LocalAsset));
    assert_eq!(resolver.resolve(be, &settings).await, Outcome::Played(Tier::Cache));
    assert_eq!(plays.load(Ordering::SeqCst), 2);

    let fallback = resolver.resolve(ve, &settings).await;
    if cfg!(unix) {
        assert_eq!(fallback, Outcome::Played(Tier::OnDevice));
    } else {
        assert_eq!(fallback, Outcome::Silent);
    }
    assert!(!resolver.cache().contains("В"));
    assert_eq!(plays.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn quiz_result_lands_in_history() {
    let (_dir, store) = make_store();
    let settings = Settings {
        session_limit: Some(8),
        on_device_command: String::new(),
        ..Settings::default()
    };
    let resolver = AudioResolver::with_strategies(Arc::new(azbuka::audio::NullSink), Vec::new());
    let mut rng = SmallRng::seed_from_u64(5);
    let mut quiz = QuizSession::new(Inventory::ukrainian(), settings, resolver, &mut rng);

    while !quiz.is_finished() {
        let target = quiz.current().unwrap().id.clone();
        assert!(quiz.options().unwrap().contains(&target));
        assert_eq!(quiz.answer(&target), Some(true));
        quiz.next(&mut rng);
    }
    store.append_result(quiz.result()).unwrap();

    let history = store.load_history();
    assert_eq!(history.sessions.len(), 1);
    assert_eq!(history.sessions[0].mode, PracticeMode::Quiz);
    assert_eq!(history.sessions[0].score, 8);
    assert_eq!(history.sessions[0].accuracy(), 100.0);
}
