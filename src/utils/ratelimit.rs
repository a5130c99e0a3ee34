use std::collections::HashMap;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use tokio::sync::Mutex;

lazy_static! {
    // Key: (discord user id, command group), value: when the cooldown started
    static ref COMMAND_COOLDOWNS: Mutex<HashMap<(u64, &'static str), Instant>> =
        Mutex::new(HashMap::new());
}

pub const COOLDOWN: Duration = Duration::from_secs(3);

/// Start a cooldown for `group` unless one is running.
///
/// Returns the whole seconds left (at least 1) while still cooling down.
pub async fn check_cooldown(user_id: u64, group: &'static str) -> Result<(), u64> {
    let now = Instant::now();
    let mut cooldowns = COMMAND_COOLDOWNS.lock().await;

    // Keep the map from growing with every user ever seen
    cooldowns.retain(|_, started| now.duration_since(*started) < COOLDOWN);

    match cooldowns.get(&(user_id, group)) {
        Some(started) => {
            let remaining = COOLDOWN.saturating_sub(now.duration_since(*started));
            Err(remaining.as_secs().max(1))
        }
        None => {
            cooldowns.insert((user_id, group), now);
            Ok(())
        }
    }
}
