use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
	Closed,
	Open,
	HalfOpen,
}

/// Consecutive-failure circuit breaker guarding the inference service.
///
/// Owned by the gateway and shared across requests behind a mutex; methods
/// take `now` explicitly so transitions are testable with a manual clock.
/// Counters only need to be approximately correct under concurrency: the
/// breaker must eventually open under sustained failure and eventually
/// recover, not observe every interleaving exactly.
#[derive(Debug)]
pub struct CircuitBreaker {
	failure_threshold: u32,
	reset_timeout: Duration,
	state: CircuitState,
	failure_count: u32,
	last_failure: Option<Instant>,
}

impl CircuitBreaker {
	pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
		Self {
			failure_threshold: failure_threshold.max(1),
			reset_timeout,
			state: CircuitState::Closed,
			failure_count: 0,
			last_failure: None,
		}
	}

	pub fn state(&self) -> CircuitState {
		self.state
	}

	pub fn failure_count(&self) -> u32 {
		self.failure_count
	}

	/// Whether a call may proceed. Moves Open to HalfOpen once the reset
	/// timeout has elapsed; returns `false` while the circuit is open and
	/// cooling down, in which case the caller must fail fast without I/O.
	pub fn check(&mut self, now: Instant) -> bool {
		if self.state != CircuitState::Open {
			return true;
		}

		let elapsed = self.last_failure.map(|at| now.duration_since(at) >= self.reset_timeout);

		if elapsed.unwrap_or(true) {
			self.state = CircuitState::HalfOpen;

			return true;
		}

		false
	}

	pub fn record_success(&mut self) {
		self.state = CircuitState::Closed;
		self.failure_count = 0;
		self.last_failure = None;
	}

	pub fn record_failure(&mut self, now: Instant) {
		self.failure_count = self.failure_count.saturating_add(1);
		self.last_failure = Some(now);

		if self.state == CircuitState::HalfOpen || self.failure_count >= self.failure_threshold {
			self.state = CircuitState::Open;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn breaker() -> CircuitBreaker {
		CircuitBreaker::new(3, Duration::from_secs(30))
	}

	#[test]
	fn opens_after_threshold_consecutive_failures() {
		let mut breaker = breaker();
		let now = Instant::now();

		breaker.record_failure(now);
		breaker.record_failure(now);

		assert_eq!(breaker.state(), CircuitState::Closed);
		assert!(breaker.check(now));

		breaker.record_failure(now);

		assert_eq!(breaker.state(), CircuitState::Open);
		assert!(!breaker.check(now));
	}

	#[test]
	fn half_opens_after_reset_timeout() {
		let mut breaker = breaker();
		let start = Instant::now();

		for _ in 0..3 {
			breaker.record_failure(start);
		}

		assert!(!breaker.check(start + Duration::from_secs(29)));
		assert!(breaker.check(start + Duration::from_secs(30)));
		assert_eq!(breaker.state(), CircuitState::HalfOpen);
	}

	#[test]
	fn success_in_half_open_closes_and_resets() {
		let mut breaker = breaker();
		let start = Instant::now();

		for _ in 0..3 {
			breaker.record_failure(start);
		}

		assert!(breaker.check(start + Duration::from_secs(31)));

		breaker.record_success();

		assert_eq!(breaker.state(), CircuitState::Closed);
		assert_eq!(breaker.failure_count(), 0);
	}

	#[test]
	fn failure_in_half_open_reopens() {
		let mut breaker = breaker();
		let start = Instant::now();

		for _ in 0..3 {
			breaker.record_failure(start);
		}

		let later = start + Duration::from_secs(31);

		assert!(breaker.check(later));

		breaker.record_failure(later);

		assert_eq!(breaker.state(), CircuitState::Open);
		assert!(!breaker.check(later + Duration::from_secs(1)));
	}

	#[test]
	fn success_resets_consecutive_count() {
		let mut breaker = breaker();
		let now = Instant::now();

		breaker.record_failure(now);
		breaker.record_failure(now);
		breaker.record_success();
		breaker.record_failure(now);
		breaker.record_failure(now);

		assert_eq!(breaker.state(), CircuitState::Closed);
	}
}
