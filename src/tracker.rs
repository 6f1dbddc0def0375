pub mod dispatch;

pub use dispatch::{DispatchStatus, InlineDispatch, QueuedDispatch, ResolutionDispatch};

use crate::config::ResolutionPolicy;
use crate::decoder::{decode_report, RawReport};
use crate::flight_state::{
    DestinationState, FlightFact, FlightField, FlightPhase, FlightStateStore,
};
use crate::geofence::{Containment, Geofence};
use crate::recorder::{FlightRecord, FlightRecorder};
use crate::resolver::{ResolutionOutcome, ResolutionRequest};
use crate::thread_manager::SteppableTask;
use crate::types::ICAOAddress;

/// What happened to one report or resolution outcome.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Disposition {
    Malformed,
    AlreadyRecorded,
    /// A resolution outcome that no longer matches a live flight.
    Stale,
    Updated,
    Recorded,
}

/// Correlates reports per flight and writes one record for each flight that
/// passes through the geofence with a known callsign, destination and altitude.
pub struct FlightTracker<R: FlightRecorder, D: ResolutionDispatch> {
    store: FlightStateStore,
    geofence: Geofence,
    policy: ResolutionPolicy,
    dispatch: D,
    recorder: R,
}

impl<R: FlightRecorder, D: ResolutionDispatch> FlightTracker<R, D> {
    #[must_use]
    pub fn new(
        store: FlightStateStore,
        geofence: Geofence,
        policy: ResolutionPolicy,
        dispatch: D,
        recorder: R,
    ) -> Self {
        FlightTracker {
            store,
            geofence,
            policy,
            dispatch,
            recorder,
        }
    }

    #[must_use]
    pub fn store(&self) -> &FlightStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FlightStateStore {
        &mut self.store
    }

    pub fn process_line(&mut self, line: &str) -> Disposition {
        self.process_line_at(line, chrono::Utc::now())
    }

    pub fn process_line_at(&mut self, line: &str, now: chrono::DateTime<chrono::Utc>) -> Disposition {
        match decode_report(line) {
            Ok(report) => self.process_report_at(report, now),
            Err(err) => {
                log::debug!("Failed to decode message '{}': {err}", line.trim_end());
                Disposition::Malformed
            }
        }
    }

    pub fn process_report(&mut self, report: RawReport) -> Disposition {
        self.process_report_at(report, chrono::Utc::now())
    }

    pub fn process_report_at(
        &mut self,
        report: RawReport,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Disposition {
        let flight = report.flight;
        self.store.touch_at(flight, now);

        if self.store.get_at(flight, FlightField::Phase, now)
            == Some(FlightFact::Phase(FlightPhase::Recorded))
        {
            return Disposition::AlreadyRecorded;
        }

        if let Some(callsign) = report.callsign {
            self.observe_callsign(flight, callsign, now);
        }

        let has_been_overhead = self
            .store
            .aggregate_at(flight, now)
            .is_some_and(|aggregate| aggregate.has_been_overhead());
        if !has_been_overhead && self.geofence.evaluate(report.position) == Containment::Inside {
            log::info!("Flight {flight} is overhead");
            self.set_fact(flight, FlightFact::Phase(FlightPhase::Overhead), now);
            if let Some(altitude) = report.altitude {
                self.set_fact(flight, FlightFact::Altitude(altitude), now);
            }
        }

        self.record_if_complete(flight, now)
    }

    pub fn apply_resolution(&mut self, outcome: ResolutionOutcome) -> Disposition {
        self.apply_resolution_at(outcome, chrono::Utc::now())
    }

    pub fn apply_resolution_at(
        &mut self,
        outcome: ResolutionOutcome,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Disposition {
        let flight = outcome.flight;
        if !self.accept_resolution(outcome, now) {
            return Disposition::Stale;
        }
        self.record_if_complete(flight, now)
    }

    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(chrono::Utc::now())
    }

    pub fn purge_expired_at(&mut self, now: chrono::DateTime<chrono::Utc>) -> usize {
        let purged = self.store.purge_expired_at(now);
        if purged > 0 {
            log::debug!(
                "Purged {purged} expired flights, {} still tracked",
                self.store.len()
            );
        }
        purged
    }

    /// Stores the lookup result if it still belongs to a live, unrecorded
    /// flight with the same callsign.
    fn accept_resolution(
        &mut self,
        outcome: ResolutionOutcome,
        now: chrono::DateTime<chrono::Utc>,
    ) -> bool {
        let flight = outcome.flight;
        let Some(aggregate) = self.store.aggregate_at(flight, now) else {
            log::debug!(
                "Flight {flight} ({}) expired before its destination was resolved",
                outcome.callsign
            );
            return false;
        };
        let same_callsign = aggregate.callsign.as_deref() == Some(outcome.callsign.as_str());
        if aggregate.is_recorded() || !same_callsign {
            return false;
        }

        match outcome.result {
            Ok(location) => {
                log::debug!("{} ({flight}) is heading to {location}", outcome.callsign);
                self.set_fact(
                    flight,
                    FlightFact::Destination(DestinationState::Resolved(location)),
                    now,
                );
            }
            Err(err) => {
                log::warn!(
                    "Failed to resolve destination of {} ({flight}): {err}",
                    outcome.callsign
                );
                self.set_fact(flight, FlightFact::Destination(DestinationState::Failed), now);
            }
        }
        true
    }

    fn observe_callsign(
        &mut self,
        flight: ICAOAddress,
        callsign: String,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let (known_callsign, destination) = match self.store.aggregate_at(flight, now) {
            Some(aggregate) => (aggregate.callsign.clone(), aggregate.destination.clone()),
            None => (None, DestinationState::Unrequested),
        };

        match known_callsign {
            None => {
                self.set_fact(flight, FlightFact::Callsign(callsign.clone()), now);
                self.request_destination(flight, callsign, now);
            }
            Some(known) => {
                let retry = self.policy == ResolutionPolicy::RetryOnNextReport
                    && destination == DestinationState::Failed;
                if retry {
                    log::debug!("Retrying destination lookup for {known} ({flight})");
                    self.request_destination(flight, known, now);
                }
            }
        }
    }

    fn request_destination(
        &mut self,
        flight: ICAOAddress,
        callsign: String,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        self.set_fact(flight, FlightFact::Destination(DestinationState::Pending), now);
        match self.dispatch.dispatch(ResolutionRequest { flight, callsign }) {
            DispatchStatus::Completed(outcome) => {
                // completion is checked once the rest of the report is applied
                self.accept_resolution(outcome, now);
            }
            DispatchStatus::Queued => {}
            DispatchStatus::Rejected(err) => {
                log::warn!("Destination lookup for {flight} not dispatched: {err}");
                self.set_fact(flight, FlightFact::Destination(DestinationState::Failed), now);
            }
        }
    }

    fn record_if_complete(
        &mut self,
        flight: ICAOAddress,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Disposition {
        let Some(completed) = self
            .store
            .aggregate_at(flight, now)
            .and_then(|aggregate| aggregate.completed())
        else {
            return Disposition::Updated;
        };

        let record = FlightRecord {
            location: completed.destination,
            callsign: completed.callsign,
            altitude: completed.altitude,
            recorded_at: now,
        };
        match self.recorder.append(&record) {
            Ok(()) => {
                log::info!(
                    "{} just flew overhead at {} ft heading to {}, written to {}",
                    record.callsign,
                    record.altitude,
                    record.location,
                    self.recorder.backend_type()
                );
                self.set_fact(flight, FlightFact::Phase(FlightPhase::Recorded), now);
                Disposition::Recorded
            }
            Err(err) => {
                log::error!(
                    "{} ({flight}) just flew overhead, but failed to write record: {err}",
                    record.callsign
                );
                Disposition::Updated
            }
        }
    }

    fn set_fact(&mut self, flight: ICAOAddress, fact: FlightFact, now: chrono::DateTime<chrono::Utc>) {
        if let Err(err) = self.store.set_at(flight, fact, now) {
            log::error!("Flight {flight}: {err}");
        }
    }
}

const TICK: std::time::Duration = std::time::Duration::from_millis(250);

/// Runs the tracker on its own thread, taking decoded reports and resolver
/// outcomes as they arrive.
pub struct TrackerTask<R: FlightRecorder, D: ResolutionDispatch> {
    tracker: FlightTracker<R, D>,
    reports: crossbeam_channel::Receiver<RawReport>,
    outcomes: crossbeam_channel::Receiver<ResolutionOutcome>,
    purge_interval: std::time::Duration,
    last_purge: std::time::Instant,
}

impl<R: FlightRecorder, D: ResolutionDispatch> TrackerTask<R, D> {
    #[must_use]
    pub fn new(
        tracker: FlightTracker<R, D>,
        reports: crossbeam_channel::Receiver<RawReport>,
        outcomes: crossbeam_channel::Receiver<ResolutionOutcome>,
        purge_interval: std::time::Duration,
    ) -> Self {
        TrackerTask {
            tracker,
            reports,
            outcomes,
            purge_interval,
            last_purge: std::time::Instant::now(),
        }
    }
}

impl<R, D> SteppableTask for TrackerTask<R, D>
where
    R: FlightRecorder + 'static,
    D: ResolutionDispatch + 'static,
{
    fn step(&mut self) -> bool {
        let mut workers_stopped = false;
        crossbeam_channel::select! {
            recv(self.reports) -> report => match report {
                Ok(report) => {
                    let _ = self.tracker.process_report(report);
                }
                Err(_) => {
                    log::info!("TrackerTask: report stream closed");
                    return false;
                }
            },
            recv(self.outcomes) -> outcome => match outcome {
                Ok(outcome) => {
                    let _ = self.tracker.apply_resolution(outcome);
                }
                Err(_) => workers_stopped = true,
            },
            default(TICK) => {}
        }

        if workers_stopped {
            log::warn!("TrackerTask: resolver workers stopped");
            self.outcomes = crossbeam_channel::never();
        }

        if self.last_purge.elapsed() >= self.purge_interval {
            self.tracker.purge_expired();
            self.last_purge = std::time::Instant::now();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::PersistenceError;
    use crate::resolver::{DestinationResolver, ResolutionError};
    use crate::types::Location;

    const HEX: &str = "4CA2D6";

    fn flight() -> ICAOAddress {
        ICAOAddress::from_hex_str(HEX).unwrap()
    }

    fn identification(callsign: &str) -> String {
        format!("MSG,1,1,1,{HEX},1,,,,,{callsign},,,,,,,,,,,0")
    }

    fn position(altitude: &str, latitude: f64, longitude: f64) -> String {
        format!("MSG,3,1,1,{HEX},1,,,,,,{altitude},,,{latitude},{longitude},,,,,,0")
    }

    fn inside(altitude: &str) -> String {
        position(altitude, 51.45, -0.45)
    }

    fn outside() -> String {
        position("36000", 53.0, -2.0)
    }

    fn to_datetime(time_string: &str) -> chrono::DateTime<chrono::Utc> {
        let today = chrono::Utc::now().date_naive();
        let time = chrono::NaiveTime::parse_from_str(time_string, "%H:%M:%S")
            .expect("time string not in %H:%M:%S format");
        today.and_time(time).and_utc()
    }

    #[derive(Clone, Default)]
    struct ScriptedResolver {
        answers: std::sync::Arc<std::sync::Mutex<Vec<Option<&'static str>>>>,
        calls: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl ScriptedResolver {
        // answers are handed out in order; the last one repeats
        fn answering(answers: &[Option<&'static str>]) -> Self {
            ScriptedResolver {
                answers: std::sync::Arc::new(std::sync::Mutex::new(answers.to_vec())),
                calls: std::sync::Arc::default(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DestinationResolver for ScriptedResolver {
        fn resolve(&self, callsign: &str) -> Result<Location, ResolutionError> {
            self.calls.lock().unwrap().push(callsign.to_string());
            let mut answers = self.answers.lock().unwrap();
            let answer = if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers.first().copied().flatten()
            };
            answer.map(Location::new).ok_or(ResolutionError::NotFound {
                backend: "scripted",
                callsign: callsign.to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[derive(Clone, Default)]
    struct MemoryRecorder {
        records: std::sync::Arc<std::sync::Mutex<Vec<FlightRecord>>>,
        failures_left: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl MemoryRecorder {
        fn failing(times: usize) -> Self {
            let recorder = MemoryRecorder::default();
            recorder
                .failures_left
                .store(times, std::sync::atomic::Ordering::SeqCst);
            recorder
        }

        fn records(&self) -> Vec<FlightRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl FlightRecorder for MemoryRecorder {
        fn append(&mut self, record: &FlightRecord) -> Result<(), PersistenceError> {
            let failing = self
                .failures_left
                .fetch_update(
                    std::sync::atomic::Ordering::SeqCst,
                    std::sync::atomic::Ordering::SeqCst,
                    |left| left.checked_sub(1),
                )
                .is_ok();
            if failing {
                return Err(PersistenceError::Io(std::io::Error::other("disk full")));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn backend_type(&self) -> &'static str {
            "memory"
        }
    }

    fn geofence() -> Geofence {
        Geofence::new(51.4, 51.5, -0.5, -0.4).unwrap()
    }

    fn inline_tracker(
        resolver: &ScriptedResolver,
        recorder: &MemoryRecorder,
        policy: ResolutionPolicy,
    ) -> FlightTracker<MemoryRecorder, InlineDispatch> {
        FlightTracker::new(
            FlightStateStore::default(),
            geofence(),
            policy,
            InlineDispatch::new(std::sync::Arc::new(resolver.clone())),
            recorder.clone(),
        )
    }

    fn phase(tracker: &mut FlightTracker<MemoryRecorder, impl ResolutionDispatch>) -> Option<FlightPhase> {
        tracker
            .store_mut()
            .aggregate(flight())
            .map(|aggregate| aggregate.phase)
    }

    #[test]
    fn when_callsign_then_overhead_then_outside_reports_arrive_then_one_record_is_written() {
        let resolver = ScriptedResolver::answering(&[Some("36.847621,10.21709")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        assert_eq!(tracker.process_line(&identification("BA123")), Disposition::Updated);
        assert_eq!(tracker.process_line(&inside("35000")), Disposition::Recorded);
        assert_eq!(tracker.process_line(&outside()), Disposition::AlreadyRecorded);

        assert_eq!(resolver.calls(), vec![String::from("BA123")]);
        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].callsign, "BA123");
        assert_eq!(records[0].altitude, 35000);
        assert_eq!(records[0].location, Location::new("36.847621,10.21709"));
        assert_eq!(phase(&mut tracker), Some(FlightPhase::Recorded));
    }

    #[test]
    fn when_overhead_arrives_before_callsign_then_record_is_written_on_callsign() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        assert_eq!(tracker.process_line(&inside("12000")), Disposition::Updated);
        assert_eq!(
            tracker.process_line(&identification("EZY42")),
            Disposition::Recorded
        );
        assert_eq!(recorder.records()[0].altitude, 12000);
    }

    #[test]
    fn when_resolver_fails_then_no_record_is_ever_written_under_single_attempt() {
        let resolver = ScriptedResolver::answering(&[None, Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        tracker.process_line(&identification("BA123"));
        tracker.process_line(&inside("35000"));
        tracker.process_line(&identification("BA123"));
        tracker.process_line(&inside("35000"));

        assert_eq!(resolver.calls().len(), 1);
        assert!(recorder.records().is_empty());
        assert_eq!(phase(&mut tracker), Some(FlightPhase::Overhead));
    }

    #[test]
    fn when_resolver_fails_then_later_callsign_report_retries_under_retry_policy() {
        let resolver = ScriptedResolver::answering(&[None, Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker =
            inline_tracker(&resolver, &recorder, ResolutionPolicy::RetryOnNextReport);

        tracker.process_line(&identification("BA123"));
        assert_eq!(tracker.process_line(&inside("35000")), Disposition::Updated);
        assert_eq!(
            tracker.process_line(&identification("BA123")),
            Disposition::Recorded
        );

        assert_eq!(resolver.calls().len(), 2);
        assert_eq!(recorder.records().len(), 1);
    }

    #[test]
    fn when_recorded_flight_messages_are_replayed_then_nothing_more_happens() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        let messages = [identification("BA123"), inside("35000"), outside()];
        for message in &messages {
            tracker.process_line(message);
        }
        for message in &messages {
            assert_eq!(tracker.process_line(message), Disposition::AlreadyRecorded);
        }

        assert_eq!(recorder.records().len(), 1);
        assert_eq!(resolver.calls().len(), 1);
    }

    #[test]
    fn when_message_is_malformed_then_no_state_is_created() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        assert_eq!(
            tracker.process_line("MSG,3,1,1,4CA2D6,1,,,,,,abc,,,51.45,-0.45,,,,,,0"),
            Disposition::Malformed
        );
        assert_eq!(tracker.process_line("MSG,3,1"), Disposition::Malformed);
        assert!(tracker.store().is_empty());
        assert!(resolver.calls().is_empty());
    }

    #[test]
    fn when_overhead_is_latched_then_later_reports_do_not_change_altitude_or_phase() {
        let resolver = ScriptedResolver::answering(&[None]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        tracker.process_line(&inside("30000"));
        tracker.process_line(&outside());
        tracker.process_line(&inside("31000"));

        let aggregate = tracker.store_mut().aggregate(flight()).unwrap().clone();
        assert_eq!(aggregate.phase, FlightPhase::Overhead);
        assert_eq!(aggregate.altitude, Some(30000));
    }

    #[test]
    fn when_overhead_report_has_no_altitude_then_flight_never_completes() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        tracker.process_line(&identification("BA123"));
        tracker.process_line(&inside(""));
        tracker.process_line(&inside("35000"));

        assert!(recorder.records().is_empty());
        assert_eq!(phase(&mut tracker), Some(FlightPhase::Overhead));
    }

    #[test]
    fn when_report_has_no_position_then_overhead_is_not_latched() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        tracker.process_line(&identification("BA123"));
        tracker.process_line(&format!("MSG,5,1,1,{HEX},1,,,,,,35000,,,,,,,,,,0"));

        assert_eq!(phase(&mut tracker), Some(FlightPhase::Approaching));
    }

    #[test]
    fn when_persistence_fails_then_a_later_report_retries_the_write() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::failing(1);
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        tracker.process_line(&identification("BA123"));
        assert_eq!(tracker.process_line(&inside("35000")), Disposition::Updated);
        assert_eq!(phase(&mut tracker), Some(FlightPhase::Overhead));

        assert_eq!(tracker.process_line(&outside()), Disposition::Recorded);
        assert_eq!(recorder.records().len(), 1);
        assert_eq!(tracker.process_line(&outside()), Disposition::AlreadyRecorded);
    }

    #[test]
    fn when_flight_expires_then_next_report_starts_a_fresh_aggregate() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        let start = to_datetime("10:00:00");
        tracker.process_line_at(&identification("BA123"), start);
        tracker.process_line_at(&inside("35000"), start);
        assert_eq!(recorder.records().len(), 1);

        let later = to_datetime("10:10:00");
        assert_eq!(
            tracker.process_line_at(&inside("20000"), later),
            Disposition::Updated
        );
        let aggregate = tracker.store_mut().aggregate_at(flight(), later).unwrap();
        assert_eq!(aggregate.phase, FlightPhase::Overhead);
        assert_eq!(aggregate.altitude, Some(20000));
        assert_eq!(aggregate.callsign, None);
        assert_eq!(recorder.records().len(), 1);
    }

    #[test]
    fn when_recorded_flight_keeps_reporting_past_the_ttl_then_it_is_recorded_once() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        let start = to_datetime("10:00:00");
        tracker.process_line_at(&identification("BA123"), start);
        assert_eq!(
            tracker.process_line_at(&inside("35000"), start),
            Disposition::Recorded
        );

        for minute in 1..=12 {
            let now = start + chrono::TimeDelta::minutes(minute);
            assert_eq!(
                tracker.process_line_at(&identification("BA123"), now),
                Disposition::AlreadyRecorded
            );
            assert_eq!(
                tracker.process_line_at(&inside("35000"), now),
                Disposition::AlreadyRecorded
            );
        }

        assert_eq!(recorder.records().len(), 1);
        assert_eq!(resolver.calls().len(), 1);
    }

    #[test]
    fn when_purging_then_expired_flights_are_dropped() {
        let resolver = ScriptedResolver::answering(&[Some("1,2")]);
        let recorder = MemoryRecorder::default();
        let mut tracker = inline_tracker(&resolver, &recorder, ResolutionPolicy::SingleAttempt);

        tracker.process_line_at(&identification("BA123"), to_datetime("10:00:00"));
        assert_eq!(tracker.purge_expired_at(to_datetime("10:05:00")), 0);
        assert_eq!(tracker.purge_expired_at(to_datetime("10:10:00")), 1);
        assert!(tracker.store().is_empty());
    }

    mod when_resolution_is_queued {
        use super::*;

        fn queued_tracker(
            recorder: &MemoryRecorder,
            capacity: usize,
        ) -> (
            FlightTracker<MemoryRecorder, QueuedDispatch>,
            crossbeam_channel::Receiver<ResolutionRequest>,
        ) {
            let (sender, receiver) = crossbeam_channel::bounded(capacity);
            let tracker = FlightTracker::new(
                FlightStateStore::default(),
                geofence(),
                ResolutionPolicy::SingleAttempt,
                QueuedDispatch::new(sender),
                recorder.clone(),
            );
            (tracker, receiver)
        }

        #[test]
        fn and_outcome_arrives_after_overhead_then_record_is_written_on_arrival() {
            let recorder = MemoryRecorder::default();
            let (mut tracker, requests) = queued_tracker(&recorder, 4);

            tracker.process_line(&identification("BA123"));
            tracker.process_line(&inside("35000"));
            tracker.process_line(&outside());
            assert!(recorder.records().is_empty());
            assert_eq!(
                tracker.store_mut().get(flight(), FlightField::Destination),
                Some(FlightFact::Destination(DestinationState::Pending))
            );

            let request = requests.try_recv().expect("request queued");
            assert_eq!(request.callsign, "BA123");
            let disposition = tracker.apply_resolution(ResolutionOutcome {
                flight: request.flight,
                callsign: request.callsign,
                result: Ok(Location::new("1,2")),
            });

            assert_eq!(disposition, Disposition::Recorded);
            assert_eq!(recorder.records().len(), 1);
        }

        #[test]
        fn and_queue_is_full_then_destination_is_marked_failed() {
            let recorder = MemoryRecorder::default();
            let (mut tracker, _requests) = queued_tracker(&recorder, 1);

            tracker.process_line("MSG,1,1,1,AAAAAA,1,,,,,OTHER1,,,,,,,,,,,0");
            tracker.process_line(&identification("BA123"));

            assert_eq!(
                tracker.store_mut().get(flight(), FlightField::Destination),
                Some(FlightFact::Destination(DestinationState::Failed))
            );
        }

        #[test]
        fn and_outcome_is_for_unknown_flight_then_it_is_stale() {
            let recorder = MemoryRecorder::default();
            let (mut tracker, _requests) = queued_tracker(&recorder, 4);

            let disposition = tracker.apply_resolution(ResolutionOutcome {
                flight: flight(),
                callsign: String::from("BA123"),
                result: Ok(Location::new("1,2")),
            });
            assert_eq!(disposition, Disposition::Stale);
            assert!(tracker.store().is_empty());
        }

        #[test]
        fn and_outcome_is_for_recorded_flight_then_it_is_stale() {
            let recorder = MemoryRecorder::default();
            let (mut tracker, requests) = queued_tracker(&recorder, 4);

            tracker.process_line(&identification("BA123"));
            tracker.process_line(&inside("35000"));
            let request = requests.try_recv().unwrap();
            let outcome = |location: &str| ResolutionOutcome {
                flight: request.flight,
                callsign: request.callsign.clone(),
                result: Ok(Location::new(location)),
            };

            assert_eq!(tracker.apply_resolution(outcome("1,2")), Disposition::Recorded);
            assert_eq!(tracker.apply_resolution(outcome("3,4")), Disposition::Stale);
            assert_eq!(recorder.records().len(), 1);
        }
    }

    #[test]
    fn when_task_runs_over_channels_then_reports_and_outcomes_are_applied() {
        let recorder = MemoryRecorder::default();
        let (request_sender, request_receiver) = crossbeam_channel::bounded(4);
        let (outcome_sender, outcome_receiver) = crossbeam_channel::unbounded();
        let (report_sender, report_receiver) = crossbeam_channel::unbounded();
        let tracker = FlightTracker::new(
            FlightStateStore::default(),
            geofence(),
            ResolutionPolicy::SingleAttempt,
            QueuedDispatch::new(request_sender),
            recorder.clone(),
        );
        let mut task = TrackerTask::new(
            tracker,
            report_receiver,
            outcome_receiver,
            std::time::Duration::from_secs(60),
        );

        for line in [identification("BA123"), inside("35000")] {
            report_sender
                .send(decode_report(&line).unwrap())
                .unwrap();
        }
        assert!(task.step());
        assert!(task.step());

        let request: ResolutionRequest = request_receiver.try_recv().unwrap();
        outcome_sender
            .send(ResolutionOutcome {
                flight: request.flight,
                callsign: request.callsign,
                result: Ok(Location::new("1,2")),
            })
            .unwrap();
        assert!(task.step());
        assert_eq!(recorder.records().len(), 1);

        drop(report_sender);
        assert!(!task.step());
    }
}
