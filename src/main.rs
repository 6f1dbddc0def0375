use clap::Parser;
use log::info;
use overflights::cli::Cli;
use overflights::config::ApplicationConfig;
use overflights::decoder::{RawReport, ReportDecoder};
use overflights::flight_state::FlightStateStore;
use overflights::ingestor::Ingestor;
use overflights::logging::setup_logging;
use overflights::recorder::SqliteRecorder;
use overflights::report;
use overflights::resolver::{self, DestinationResolver, ResolutionOutcome, ResolverWorker};
use overflights::thread_manager::{TaskID, ThreadManager};
use overflights::tracker::{
    FlightTracker, InlineDispatch, QueuedDispatch, ResolutionDispatch, TrackerTask,
};

const FEED_POLL: std::time::Duration = std::time::Duration::from_millis(200);

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let application_config = match ApplicationConfig::construct_from_path(&cli.config_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    setup_logging(cli.logging_level);
    info!("Main: Application started.");

    match run(&cli, &application_config) {
        Ok(()) => {
            info!("Main: Program finished.");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Main: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &ApplicationConfig) -> Result<(), Box<dyn std::error::Error>> {
    let geofence = config.geofence.build()?;
    let store = FlightStateStore::new(config.cache.ttl()?);
    let recorder = SqliteRecorder::open(&config.storage.database_path)?;

    if let Some(path) = &cli.heatmap {
        let points = report::heatmap(recorder.connection())?;
        report::write_heatmap(&points, path)?;
        return Ok(());
    }

    let fallback = resolver::from_config(&config.resolver)?;
    info!(
        "Main: watching {geofence}, resolving destinations with {}",
        fallback.backend_names().join(", ")
    );
    let resolver: std::sync::Arc<dyn DestinationResolver> = std::sync::Arc::new(fallback);

    let (messages_sender, messages_receiver) = crossbeam_channel::unbounded::<String>();
    let (reports_sender, reports_receiver) = crossbeam_channel::unbounded::<RawReport>();

    let ingestor = Ingestor::connect(&config.feed, messages_sender)?;
    let decoder = ReportDecoder::new(messages_receiver, reports_sender);
    let purge_interval = std::time::Duration::from_secs(config.cache.purge_interval_seconds);

    let mut thread_manager = ThreadManager::new();
    let ingestor_task_id =
        thread_manager.add_task("ingestor", ingestor, std::time::Duration::ZERO)?;
    thread_manager.add_task("decoder", decoder, std::time::Duration::ZERO)?;

    if config.resolver.workers == 0 {
        let tracker = FlightTracker::new(
            store,
            geofence,
            config.resolver.policy,
            InlineDispatch::new(resolver),
            recorder,
        );
        spawn_tracker(
            &mut thread_manager,
            tracker,
            reports_receiver,
            crossbeam_channel::never(),
            purge_interval,
        )?;
    } else {
        let (requests_sender, requests_receiver) =
            crossbeam_channel::bounded(config.resolver.queue_capacity.max(1));
        let (outcomes_sender, outcomes_receiver) = crossbeam_channel::unbounded();
        for index in 0..config.resolver.workers {
            let worker = ResolverWorker::new(
                resolver.clone(),
                requests_receiver.clone(),
                outcomes_sender.clone(),
            );
            thread_manager.add_task(
                &format!("resolver-{index}"),
                worker,
                std::time::Duration::ZERO,
            )?;
        }
        let tracker = FlightTracker::new(
            store,
            geofence,
            config.resolver.policy,
            QueuedDispatch::new(requests_sender),
            recorder,
        );
        spawn_tracker(
            &mut thread_manager,
            tracker,
            reports_receiver,
            outcomes_receiver,
            purge_interval,
        )?;
    }

    let transport_lost = wait_for_feed(&thread_manager, ingestor_task_id, cli.duration);
    thread_manager.stop_all_tasks();
    thread_manager.wait_on_all_tasks();

    if transport_lost {
        return Err(Box::from("lost connection to the feed"));
    }
    Ok(())
}

fn spawn_tracker<D>(
    thread_manager: &mut ThreadManager,
    tracker: FlightTracker<SqliteRecorder, D>,
    reports: crossbeam_channel::Receiver<RawReport>,
    outcomes: crossbeam_channel::Receiver<ResolutionOutcome>,
    purge_interval: std::time::Duration,
) -> Result<TaskID, std::io::Error>
where
    D: ResolutionDispatch + 'static,
{
    let task = TrackerTask::new(tracker, reports, outcomes, purge_interval);
    thread_manager.add_task("tracker", task, std::time::Duration::ZERO)
}

/// Blocks until the ingestor stops or `duration` seconds pass. Returns true
/// if the ingestor stopped first.
fn wait_for_feed(
    thread_manager: &ThreadManager,
    ingestor_task_id: TaskID,
    duration: Option<u64>,
) -> bool {
    let deadline = duration
        .map(|seconds| std::time::Instant::now() + std::time::Duration::from_secs(seconds));
    loop {
        if thread_manager.is_task_finished(ingestor_task_id) {
            return true;
        }
        if deadline.is_some_and(|deadline| std::time::Instant::now() >= deadline) {
            info!("Main: run duration elapsed.");
            return false;
        }
        std::thread::sleep(FEED_POLL);
    }
}
