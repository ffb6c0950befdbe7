use std::time::Duration;

use dashmap::DashMap;
use log::debug;
use tokio::time::Instant;

/// Shared upstream budgets. Each lane is paced independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    SpacescanCatInfo,
    SpacescanWallet,
    SpacescanTokenBalance,
    MintGarden,
    DexScreener,
    BaseRpc,
}

impl Lane {
    pub fn label(&self) -> &'static str {
        match self {
            Lane::SpacescanCatInfo => "spacescan-cat-info",
            Lane::SpacescanWallet => "spacescan-wallet",
            Lane::SpacescanTokenBalance => "spacescan-token-balance",
            Lane::MintGarden => "mintgarden",
            Lane::DexScreener => "dexscreener",
            Lane::BaseRpc => "base-rpc",
        }
    }
}

/// `capacity` calls may go out back to back, after which one token comes back
/// every `refill_every`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub capacity: u32,
    pub refill_every: Duration,
}

impl RateLimit {
    pub const fn new(capacity: u32, refill_every: Duration) -> Self {
        Self {
            capacity,
            refill_every,
        }
    }

    pub const fn unlimited() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn is_unlimited(&self) -> bool {
        self.refill_every.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimits {
    pub spacescan_cat_info: RateLimit,
    pub spacescan_wallet: RateLimit,
    pub spacescan_token_balance: RateLimit,
    pub mintgarden: RateLimit,
    pub dexscreener: RateLimit,
    pub base_rpc: RateLimit,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            spacescan_cat_info: RateLimit::new(1, Duration::from_millis(250)),
            spacescan_wallet: RateLimit::new(1, Duration::from_millis(800)),
            spacescan_token_balance: RateLimit::new(1, Duration::from_secs(2)),
            mintgarden: RateLimit::new(1, Duration::from_millis(200)),
            dexscreener: RateLimit::new(1, Duration::from_millis(300)),
            base_rpc: RateLimit::new(1, Duration::from_millis(150)),
        }
    }
}

impl RateLimits {
    pub fn unlimited() -> Self {
        Self {
            spacescan_cat_info: RateLimit::unlimited(),
            spacescan_wallet: RateLimit::unlimited(),
            spacescan_token_balance: RateLimit::unlimited(),
            mintgarden: RateLimit::unlimited(),
            dexscreener: RateLimit::unlimited(),
            base_rpc: RateLimit::unlimited(),
        }
    }

    pub fn limit(&self, lane: Lane) -> RateLimit {
        match lane {
            Lane::SpacescanCatInfo => self.spacescan_cat_info,
            Lane::SpacescanWallet => self.spacescan_wallet,
            Lane::SpacescanTokenBalance => self.spacescan_token_balance,
            Lane::MintGarden => self.mintgarden,
            Lane::DexScreener => self.dexscreener,
            Lane::BaseRpc => self.base_rpc,
        }
    }
}

/// Token bucket per lane, kept as the theoretical arrival time of the next
/// token. A caller reserves its slot under the map lock and sleeps outside it.
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimits,
    next_slot: DashMap<Lane, Instant>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            next_slot: DashMap::new(),
        }
    }

    pub fn limits(&self) -> &RateLimits {
        &self.limits
    }

    /// Waits until `lane` has a token available and consumes it.
    pub async fn acquire(&self, lane: Lane) {
        let wait = self.reserve(lane, Instant::now());
        if !wait.is_zero() {
            debug!("[RATE] {} waiting {}ms", lane.label(), wait.as_millis());
            tokio::time::sleep(wait).await;
        }
    }

    fn reserve(&self, lane: Lane, now: Instant) -> Duration {
        let limit = self.limits.limit(lane);
        if limit.is_unlimited() {
            return Duration::ZERO;
        }

        let burst = limit.refill_every * limit.capacity.saturating_sub(1);
        let mut slot = self.next_slot.entry(lane).or_insert(now);
        let tat = (*slot).max(now);
        let earliest = tat.checked_sub(burst).unwrap_or(now);
        let wait = earliest.saturating_duration_since(now);

        *slot = tat + limit.refill_every;
        wait
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limits_with(lane_limit: RateLimit) -> RateLimits {
        RateLimits {
            mintgarden: lane_limit,
            ..RateLimits::unlimited()
        }
    }

    #[test]
    fn test_reservations_are_spaced_by_refill_interval() {
        let limiter = RateLimiter::new(limits_with(RateLimit::new(1, Duration::from_millis(200))));
        let now = Instant::now();

        assert_eq!(limiter.reserve(Lane::MintGarden, now), Duration::ZERO);
        assert_eq!(limiter.reserve(Lane::MintGarden, now), Duration::from_millis(200));
        assert_eq!(limiter.reserve(Lane::MintGarden, now), Duration::from_millis(400));
        assert_eq!(limiter.reserve(Lane::DexScreener, now), Duration::ZERO);
    }

    #[test]
    fn test_capacity_allows_burst() {
        let limiter = RateLimiter::new(limits_with(RateLimit::new(3, Duration::from_millis(100))));
        let now = Instant::now();

        for _ in 0..3 {
            assert_eq!(limiter.reserve(Lane::MintGarden, now), Duration::ZERO);
        }
        assert_eq!(limiter.reserve(Lane::MintGarden, now), Duration::from_millis(100));
    }

    #[test]
    fn test_idle_lane_refills() {
        let limiter = RateLimiter::new(limits_with(RateLimit::new(1, Duration::from_millis(100))));
        let now = Instant::now();

        limiter.reserve(Lane::MintGarden, now);
        let later = now + Duration::from_secs(1);
        assert_eq!(limiter.reserve(Lane::MintGarden, later), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_acquire_paces_concurrent_callers() {
        let limiter = Arc::new(RateLimiter::new(limits_with(RateLimit::new(1, Duration::from_millis(80)))));
        let started = std::time::Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.acquire(Lane::MintGarden).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(started.elapsed() >= Duration::from_millis(160));
    }

    #[tokio::test]
    async fn test_unlimited_lane_never_waits() {
        let limiter = RateLimiter::new(RateLimits::unlimited());
        let started = std::time::Instant::now();
        for _ in 0..50 {
            limiter.acquire(Lane::BaseRpc).await;
        }
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
