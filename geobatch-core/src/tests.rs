use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::{
    entities::*,
    gateways::geocode::*,
    rate_limit::{Clock, RateLimiter},
    resolver::RateLimitedResolver,
};

#[derive(Debug)]
struct FakeClockState {
    now: Instant,
    sleeps: Vec<Duration>,
}

/// A clock that only advances when asked to.
#[derive(Debug, Clone)]
pub struct FakeClock(Arc<Mutex<FakeClockState>>);

impl Default for FakeClock {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(FakeClockState {
            now: Instant::now(),
            sleeps: vec![],
        })))
    }
}

impl FakeClock {
    pub fn advance(&self, duration: Duration) {
        self.0.lock().now += duration;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.0.lock().sleeps.clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.0.lock().now
    }
    fn sleep(&self, duration: Duration) {
        let mut state = self.0.lock();
        state.sleeps.push(duration);
        state.now += duration;
    }
}

type ForwardResult = Result<Option<ForwardMatch>, ProviderError>;
type ReverseResult = Result<Option<ReverseMatch>, ProviderError>;

/// Answers with scripted responses and records every call.
///
/// Addresses without a script are not found. If more than one
/// response is scripted for an address they are returned one
/// after another, the last one repeatedly.
pub struct MockGateway {
    clock: FakeClock,
    forward: RefCell<HashMap<String, VecDeque<ForwardResult>>>,
    reverse: HashMap<String, ReverseResult>,
    calls: RefCell<Vec<String>>,
    call_times: RefCell<Vec<Instant>>,
}

impl MockGateway {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            forward: Default::default(),
            reverse: Default::default(),
            calls: Default::default(),
            call_times: Default::default(),
        }
    }

    pub fn with_point(self, address: &str, lat: f64, lng: f64) -> Self {
        let point = GeoPoint::try_new(lat, lng, None).unwrap();
        self.with_responses(address, vec![Ok(Some(ForwardMatch::new(point)))])
    }

    pub fn with_error(self, address: &str, err: ProviderError) -> Self {
        self.with_responses(address, vec![Err(err)])
    }

    pub fn with_responses(self, address: &str, responses: Vec<ForwardResult>) -> Self {
        self.forward
            .borrow_mut()
            .insert(address.to_owned(), responses.into());
        self
    }

    pub fn with_address(mut self, pos: &GeoPoint, address: &str) -> Self {
        self.reverse.insert(
            pos.to_string(),
            Ok(Some(ReverseMatch::new(address.to_owned()))),
        );
        self
    }

    pub fn with_reverse_error(mut self, pos: &GeoPoint, err: ProviderError) -> Self {
        self.reverse.insert(pos.to_string(), Err(err));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.borrow().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.borrow_mut().push(call);
        self.call_times.borrow_mut().push(self.clock.now());
    }
}

impl GeoCodingGateway for MockGateway {
    fn forward(&self, address: &str) -> ForwardResult {
        self.record_call(address.to_owned());
        let mut scripts = self.forward.borrow_mut();
        let Some(responses) = scripts.get_mut(address) else {
            return Ok(None);
        };
        if responses.len() > 1 {
            responses.pop_front().unwrap_or(Ok(None))
        } else {
            responses.front().cloned().unwrap_or(Ok(None))
        }
    }
}

impl ReverseGeoCodingGateway for MockGateway {
    fn reverse(&self, pos: &GeoPoint) -> ReverseResult {
        self.record_call(pos.to_string());
        self.reverse.get(&pos.to_string()).cloned().unwrap_or(Ok(None))
    }
}

pub fn resolver_with_clock(
    gw: MockGateway,
    clock: &FakeClock,
    min_delay: Duration,
) -> RateLimitedResolver<MockGateway> {
    let limiter = RateLimiter::with_clock(min_delay, clock.clone());
    RateLimitedResolver::new(gw, Arc::new(limiter))
}
