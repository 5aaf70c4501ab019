//! Rate limit policy contract and the process-wide fixed-window limiter.
//!
//! The window is deliberately coarse: one counter shared by every caller of the
//! completion client, not keyed per end user. The check and the later increment are not
//! atomic with each other, so a few extra calls may slip through right at the window
//! boundary under heavy concurrency; that overshoot is an accepted trade-off, not a bug.

// self
use crate::_prelude::*;

/// Length of the fixed rate-limit window.
pub const WINDOW_LENGTH: Duration = Duration::seconds(60);

/// Boxed future returned by [`RateLimitPolicy::evaluate`].
pub type RateLimitFuture<'a> = Pin<Box<dyn Future<Output = RateLimitDecision> + 'a + Send>>;

/// Strategy that budgets outbound completion calls.
///
/// Injected into the client at construction so deployments can swap in a keyed or
/// distributed limiter without touching the client's contract.
pub trait RateLimitPolicy
where
	Self: Send + Sync,
{
	/// Evaluates whether the next call may proceed.
	fn evaluate(&self, now: OffsetDateTime) -> RateLimitFuture<'_>;

	/// Records one successful call against the budget.
	fn record(&self, now: OffsetDateTime);
}

/// Result emitted by a [`RateLimitPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// The call may proceed immediately.
	Allow,
	/// The budget for the current window is exhausted.
	Deny,
}

/// Counter state for the current window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitWindow {
	/// Calls recorded in the current window.
	pub count: u32,
	/// Timestamp the current window began.
	pub window_started_at: OffsetDateTime,
}
impl RateLimitWindow {
	fn roll(&mut self, now: OffsetDateTime) {
		if now - self.window_started_at > WINDOW_LENGTH {
			self.count = 0;
			self.window_started_at = now;
		}
	}
}

/// Process-wide fixed-window limiter with read-then-write semantics.
pub struct FixedWindowLimiter {
	limit: u32,
	window: Mutex<RateLimitWindow>,
}
impl FixedWindowLimiter {
	/// Creates a limiter allowing `limit` calls per [`WINDOW_LENGTH`].
	pub fn new(limit: u32) -> Self {
		Self {
			limit,
			window: Mutex::new(RateLimitWindow {
				count: 0,
				window_started_at: OffsetDateTime::now_utc(),
			}),
		}
	}

	/// Returns a copy of the current window state.
	pub fn snapshot(&self) -> RateLimitWindow {
		*self.window.lock()
	}
}
impl RateLimitPolicy for FixedWindowLimiter {
	fn evaluate(&self, now: OffsetDateTime) -> RateLimitFuture<'_> {
		let decision = {
			let mut window = self.window.lock();

			window.roll(now);

			if window.count >= self.limit { RateLimitDecision::Deny } else { RateLimitDecision::Allow }
		};

		Box::pin(async move { decision })
	}

	fn record(&self, now: OffsetDateTime) {
		let mut window = self.window.lock();

		window.roll(now);

		window.count += 1;
	}
}
impl Debug for FixedWindowLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FixedWindowLimiter")
			.field("limit", &self.limit)
			.field("window", &self.snapshot())
			.finish()
	}
}
