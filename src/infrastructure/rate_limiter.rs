use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// この件数を超えたら期限切れのウィンドウを掃除する。
const PRUNE_THRESHOLD: usize = 10_000;

/// RateLimitDecision はレート制限の判定結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// 現在のウィンドウが終わるまでの秒数。
    pub reset_after_secs: u64,
}

impl RateLimitDecision {
    pub fn allowed(remaining: u32, reset_after_secs: u64) -> Self {
        Self {
            allowed: true,
            remaining,
            reset_after_secs,
        }
    }

    pub fn denied(reset_after_secs: u64) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_after_secs,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// FixedWindowLimiter はクライアント IP ごとの固定ウィンドウ方式のレート制限。
/// 状態はプロセス内のみに保持する。
#[derive(Debug)]
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window_secs: u64) -> Self {
        Self {
            limit,
            window: Duration::from_secs(window_secs),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// リクエストを 1 件数え、上限内かどうかを返す。拒否されたリクエストも数える。
    pub async fn acquire(&self, key: IpAddr) -> RateLimitDecision {
        self.acquire_at(key, Instant::now()).await
    }

    /// acquire で数えた 1 件を取り消す。成功したリクエストを数えない制限で使う。
    pub async fn release(&self, key: IpAddr) {
        self.release_at(key, Instant::now()).await;
    }

    async fn acquire_at(&self, key: IpAddr, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().await;
        if windows.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count = entry.count.saturating_add(1);

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(entry.started))
            .as_secs();
        if entry.count > self.limit {
            RateLimitDecision::denied(reset_after)
        } else {
            RateLimitDecision::allowed(self.limit - entry.count, reset_after)
        }
    }

    async fn release_at(&self, key: IpAddr, now: Instant) {
        let mut windows = self.windows.lock().await;
        if let Some(entry) = windows.get_mut(&key) {
            if now.duration_since(entry.started) < self.window {
                entry.count = entry.count.saturating_sub(1);
            }
        }
    }
}
