use crate::{
    BasicFlakeGenerator, BitLayout, Error, Field, Flake, FlakeConfig, FlakeGenerator,
    GeneratorState, IdGenStatus, LockFlakeGenerator, Sleeper, SystemClock, ThreadSleep,
    TimeSource, TimeUnit, Timestamp, decode_timestamp,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::scope;

const EPOCH: u64 = 1_600_000_000_000;

type MockBasic = BasicFlakeGenerator<StepClock, AdvancingSleep>;
type MockLock = LockFlakeGenerator<StepClock, AdvancingSleep>;

#[derive(Clone, Default)]
struct StepClock {
    now: Rc<Cell<u64>>,
}

impl StepClock {
    fn at(millis: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(millis)),
        }
    }

    fn set(&self, millis: u64) {
        self.now.set(millis);
    }

    fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

impl TimeSource for StepClock {
    fn current_millis(&self) -> u64 {
        self.now.get()
    }
}

/// Records every wait and moves the mock clock forward by the same amount.
#[derive(Clone)]
struct AdvancingSleep {
    clock: StepClock,
    slept: Rc<RefCell<Vec<u64>>>,
}

impl AdvancingSleep {
    fn new(clock: &StepClock) -> Self {
        Self {
            clock: clock.clone(),
            slept: Rc::default(),
        }
    }

    fn waits(&self) -> Vec<u64> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for AdvancingSleep {
    fn sleep_ms(&self, millis: u64) {
        self.slept.borrow_mut().push(millis);
        self.clock.advance(millis);
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> Flake;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> Flake {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn mock<G>(config: FlakeConfig, now: u64) -> (G, StepClock, AdvancingSleep)
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let clock = StepClock::at(now);
    let sleep = AdvancingSleep::new(&clock);
    let generator = G::new(config, clock.clone(), sleep.clone()).unwrap();
    (generator, clock, sleep)
}

fn run_first_id_matches_reference_packing<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let (generator, _, _) = mock::<G>(FlakeConfig::new(EPOCH, 3, 7), EPOCH + 5_000);

    let id = generator.generate().unwrap();
    assert_eq!(id.raw(), (5_000 << 22) | (7 << 17) | (3 << 12));
    assert_eq!(id.timestamp(), EPOCH + 5_000);
    assert_eq!(id.worker_id(), 3);
    assert_eq!(id.seed(), 7);
    assert_eq!(id.sequence(), 0);
    assert_eq!(
        decode_timestamp(EPOCH, id.raw(), TimeUnit::Millis),
        Timestamp::Millis(EPOCH + 5_000)
    );
}

fn run_sequence_increments_within_same_tick<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let (generator, _, _) = mock::<G>(FlakeConfig::new(EPOCH, 3, 7), EPOCH + 42);

    let id0 = generator.generate().unwrap();
    let id1 = generator.generate().unwrap();
    let id2 = generator.generate().unwrap();

    assert_eq!(id0.timestamp(), id1.timestamp());
    assert_eq!(id1.timestamp(), id2.timestamp());
    assert_eq!(id0.sequence(), 0);
    assert_eq!(id1.sequence(), 1);
    assert_eq!(id2.sequence(), 2);
    assert_eq!(id1.raw(), id0.raw() + 1);
    assert!(id0 < id1 && id1 < id2);
}

fn run_sequence_resets_on_new_tick<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let (generator, clock, _) = mock::<G>(FlakeConfig::new(EPOCH, 1, 1), EPOCH + 10);

    generator.generate().unwrap();
    generator.generate().unwrap();
    clock.advance(3);
    let id = generator.generate().unwrap();
    assert_eq!(id.timestamp(), EPOCH + 13);
    assert_eq!(id.sequence(), 0);
}

fn run_sequence_exhaustion_waits_for_next_tick<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let layout = BitLayout::new(5, 5, 2).unwrap();
    let config = FlakeConfig::new(EPOCH, 1, 1).with_layout(layout);
    let (generator, _, sleep) = mock::<G>(config, EPOCH + 42);

    for i in 0..=layout.max_sequence() {
        let id = generator.poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), EPOCH + 42);
    }

    // The sequence space for this millisecond is spent; every further attempt
    // in the same millisecond asks for a 1ms wait.
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 1);
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 1);

    let id = generator.generate().unwrap();
    assert_eq!(sleep.waits(), vec![1]);
    assert_eq!(id.timestamp(), EPOCH + 43);
    assert_eq!(id.sequence(), 0);
}

fn run_backward_clock_waits_until_caught_up<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let (generator, clock, sleep) = mock::<G>(FlakeConfig::new(EPOCH, 2, 2), EPOCH + 1_000);

    let first = generator.generate().unwrap();

    clock.set(EPOCH + 995);
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 5);

    let second = generator.generate().unwrap();
    assert_eq!(sleep.waits(), vec![5]);
    assert!(second.timestamp() >= first.timestamp());
    assert!(second > first);
}

fn run_clock_before_epoch_is_rejected<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    // A year-ahead epoch must fail immediately rather than sleep a year.
    let epoch = EPOCH + 365 * 24 * 60 * 60 * 1000;
    let (generator, clock, sleep) = mock::<G>(FlakeConfig::new(epoch, 0, 0), EPOCH);
    let expected = Error::InvalidField {
        field: Field::Timestamp,
        value: EPOCH,
        min: epoch,
        max: epoch + BitLayout::DEFAULT.max_timestamp(),
    };

    assert_eq!(generator.poll_id().unwrap_err(), expected);
    assert_eq!(generator.generate().unwrap_err(), expected);
    assert!(sleep.waits().is_empty());

    // Nothing was recorded, so the generator works once the clock catches up.
    clock.set(epoch);
    let id = generator.generate().unwrap();
    assert_eq!(id.timestamp(), epoch);
    assert_eq!(id.sequence(), 0);
}

fn run_timestamp_overflow_is_reported<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let layout = BitLayout::new(21, 21, 21).unwrap();
    let config = FlakeConfig::new(EPOCH, 0, 0).with_layout(layout);
    let (generator, clock, _) = mock::<G>(config, EPOCH + 1);

    assert_eq!(generator.generate().unwrap().timestamp(), EPOCH + 1);
    clock.advance(1);
    assert_eq!(
        generator.generate().unwrap_err(),
        Error::TimestampOverflow { delta: 2, max: 1 }
    );
}

fn run_validation_bounds<G>()
where
    G: FlakeGenerator<StepClock, AdvancingSleep>,
{
    let clock = StepClock::at(EPOCH);
    let sleep = AdvancingSleep::new(&clock);
    let make = |config: FlakeConfig| G::new(config, clock.clone(), sleep.clone());

    assert!(make(FlakeConfig::new(EPOCH, 31, 0)).is_ok());
    assert!(make(FlakeConfig::new(EPOCH, 0, 31)).is_ok());
    assert!(matches!(
        make(FlakeConfig::new(EPOCH, 32, 0)),
        Err(Error::InvalidField {
            field: Field::WorkerId,
            value: 32,
            max: 31,
            ..
        })
    ));
    assert!(matches!(
        make(FlakeConfig::new(EPOCH, 0, 32)),
        Err(Error::InvalidField {
            field: Field::Seed,
            ..
        })
    ));

    let wide = BitLayout::new(8, 2, 12).unwrap();
    assert!(make(FlakeConfig::new(EPOCH, 255, 3).with_layout(wide)).is_ok());
    assert!(make(FlakeConfig::new(EPOCH, 256, 3).with_layout(wide)).is_err());
    assert!(make(FlakeConfig::new(EPOCH, 255, 4).with_layout(wide)).is_err());
}

fn run_generator_monotonic<G>(generator: &G)
where
    G: FlakeGenerator<SystemClock, ThreadSleep>,
{
    const TOTAL_IDS: usize = 4096 * 64;

    let mut seen = HashSet::with_capacity(TOTAL_IDS);
    let mut last: Option<Flake> = None;

    for _ in 0..TOTAL_IDS {
        let id = generator.generate().unwrap();
        if let Some(prev) = last {
            assert!(id.raw() > prev.raw(), "{id} not above {prev}");
            if id.timestamp() == prev.timestamp() {
                assert_eq!(id.sequence(), prev.sequence() + 1);
            } else {
                assert_eq!(id.sequence(), 0);
            }
        }
        assert!(seen.insert(id.raw()));
        last = Some(id);
    }
}

#[test]
fn basic_generator_reference_packing() {
    run_first_id_matches_reference_packing::<MockBasic>();
}

#[test]
fn lock_generator_reference_packing() {
    run_first_id_matches_reference_packing::<MockLock>();
}

#[test]
fn basic_generator_sequence_test() {
    run_sequence_increments_within_same_tick::<MockBasic>();
}

#[test]
fn lock_generator_sequence_test() {
    run_sequence_increments_within_same_tick::<MockLock>();
}

#[test]
fn basic_generator_rollover_test() {
    run_sequence_resets_on_new_tick::<MockBasic>();
}

#[test]
fn lock_generator_rollover_test() {
    run_sequence_resets_on_new_tick::<MockLock>();
}

#[test]
fn basic_generator_pending_test() {
    run_sequence_exhaustion_waits_for_next_tick::<MockBasic>();
}

#[test]
fn lock_generator_pending_test() {
    run_sequence_exhaustion_waits_for_next_tick::<MockLock>();
}

#[test]
fn basic_generator_backward_clock() {
    run_backward_clock_waits_until_caught_up::<MockBasic>();
}

#[test]
fn lock_generator_backward_clock() {
    run_backward_clock_waits_until_caught_up::<MockLock>();
}

#[test]
fn basic_generator_before_epoch() {
    run_clock_before_epoch_is_rejected::<MockBasic>();
}

#[test]
fn lock_generator_before_epoch() {
    run_clock_before_epoch_is_rejected::<MockLock>();
}

#[test]
fn basic_generator_timestamp_overflow() {
    run_timestamp_overflow_is_reported::<MockBasic>();
}

#[test]
fn lock_generator_timestamp_overflow() {
    run_timestamp_overflow_is_reported::<MockLock>();
}

#[test]
fn basic_generator_validation() {
    run_validation_bounds::<MockBasic>();
}

#[test]
fn lock_generator_validation() {
    run_validation_bounds::<MockLock>();
}

#[test]
fn basic_generator_system_clock_monotonic() {
    let generator = BasicFlakeGenerator::with_system_clock(FlakeConfig::new(EPOCH, 1, 1)).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn lock_generator_system_clock_monotonic() {
    let generator = LockFlakeGenerator::with_system_clock(FlakeConfig::new(EPOCH, 1, 1)).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn lock_generator_threaded_unique() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 4096 * 8;

    let generator = LockFlakeGenerator::with_system_clock(FlakeConfig::new(EPOCH, 5, 9)).unwrap();
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(THREADS * IDS_PER_THREAD)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = generator.clone();
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let mut last = 0;
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.generate().unwrap();
                    // Each thread's calls are serialized with respect to each
                    // other, so its own view stays strictly increasing.
                    assert!(id.raw() > last);
                    last = id.raw();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, THREADS * IDS_PER_THREAD);
}

#[test]
fn lock_generator_clones_share_state() {
    let clock = StepClock::at(EPOCH + 7);
    let generator =
        LockFlakeGenerator::new(FlakeConfig::new(EPOCH, 1, 1), clock.clone(), ThreadSleep)
            .unwrap();
    let handle = generator.clone();

    assert_eq!(generator.generate().unwrap().sequence(), 0);
    assert_eq!(handle.generate().unwrap().sequence(), 1);
    assert_eq!(generator.generate().unwrap().sequence(), 2);
}

#[test]
fn distinct_workers_do_not_collide_in_same_tick() {
    let clock = StepClock::at(EPOCH + 99);
    let generators: Vec<_> = (0..4)
        .map(|worker| {
            BasicFlakeGenerator::new(FlakeConfig::new(EPOCH, worker, 17), clock.clone(), ThreadSleep)
                .unwrap()
        })
        .collect();

    let mut seen = HashSet::new();
    for _ in 0..100 {
        for generator in &generators {
            assert!(seen.insert(generator.generate().unwrap()));
        }
    }
    assert_eq!(seen.len(), 400);
}

#[test]
fn state_step_leaves_state_untouched_when_pending() {
    let config = FlakeConfig::new(0, 0, 0);
    let mut state = GeneratorState::from_components(Some(100), 7);

    assert_eq!(
        state.step(90, &config).unwrap(),
        IdGenStatus::Pending { yield_for: 10 }
    );
    assert_eq!(state, GeneratorState::from_components(Some(100), 7));

    let id = state.step(100, &config).unwrap().unwrap_ready();
    assert_eq!(id.sequence(), 8);
    assert_eq!(state.last_timestamp(), Some(100));
    assert_eq!(state.sequence(), 8);
}

#[test]
fn state_pins_sequence_at_max_on_overflow() {
    let config = FlakeConfig::new(0, 0, 0);
    let max = config.layout().max_sequence();
    let mut state = GeneratorState::from_components(Some(5), max);

    assert_eq!(state.step(5, &config).unwrap().unwrap_pending(), 1);
    assert_eq!(state.sequence(), max);
    assert_eq!(state.last_timestamp(), Some(5));

    let id = state.step(6, &config).unwrap().unwrap_ready();
    assert_eq!(id.sequence(), 0);
}

#[test]
fn state_clamps_oversized_restored_sequence() {
    let config = FlakeConfig::new(0, 0, 0);
    let max = config.layout().max_sequence();
    let mut state = GeneratorState::from_components(Some(5), u64::MAX);

    assert_eq!(state.step(5, &config).unwrap().unwrap_pending(), 1);
    assert_eq!(state.sequence(), max);
    assert_eq!(state.step(6, &config).unwrap().unwrap_ready().sequence(), 0);
}

#[test]
fn zero_sequence_bits_allow_one_id_per_tick() {
    let layout = BitLayout::new(5, 5, 0).unwrap();
    let config = FlakeConfig::new(0, 1, 1).with_layout(layout);
    let mut state = GeneratorState::new();

    state.step(10, &config).unwrap().unwrap_ready();
    assert_eq!(state.step(10, &config).unwrap().unwrap_pending(), 1);
    assert_eq!(state.step(11, &config).unwrap().unwrap_ready().timestamp(), 11);
}

#[test]
fn basic_generator_from_state_resumes() {
    let clock = StepClock::at(EPOCH + 50);
    let generator = BasicFlakeGenerator::from_state(
        FlakeConfig::new(EPOCH, 1, 1),
        GeneratorState::from_components(Some(EPOCH + 50), 41),
        clock,
        ThreadSleep,
    )
    .unwrap();

    assert_eq!(generator.generate().unwrap().sequence(), 42);
    assert_eq!(generator.state().sequence(), 42);
}
