//! Process-wide lazily-initialized `MemoryService` singleton: fast
//! unlocked read, then an async mutex with a double-check once the lock
//! is held, so concurrent first callers only build the service once.

use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;
use tracing::info;

use tribal_core::config::TribalConfig;
use tribal_core::errors::TribalResult;

use crate::builder::ServiceBuilder;
use crate::service::MemoryService;

struct Singleton {
    slot: Mutex<Option<Arc<MemoryService>>>,
}

fn singleton() -> &'static Singleton {
    static INSTANCE: OnceLock<Singleton> = OnceLock::new();
    INSTANCE.get_or_init(|| Singleton { slot: Mutex::new(None) })
}

/// Returns the process-wide `MemoryService`, building it from `config` on
/// first call. The config passed by whichever caller wins the race to
/// build is the one that takes effect; later callers get the already-built
/// instance regardless of what they passed.
pub async fn get_or_init_service(config: TribalConfig) -> TribalResult<Arc<MemoryService>> {
    let state = singleton();

    if let Some(existing) = state.slot.lock().await.as_ref() {
        return Ok(existing.clone());
    }

    let mut guard = state.slot.lock().await;
    if let Some(existing) = guard.as_ref() {
        return Ok(existing.clone());
    }

    let instance_id = config.instance_id.clone();
    let service = Arc::new(ServiceBuilder::new(config).build()?);
    info!(instance_id = %instance_id, "memory service initialized");
    *guard = Some(service.clone());
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_first_callers_observe_exactly_one_build() {
        let mut handles = Vec::new();
        for _ in 0..8 {
            handles.push(tokio::spawn(get_or_init_service(TribalConfig::default())));
        }
        let mut instances = Vec::new();
        for h in handles {
            instances.push(h.await.unwrap().unwrap());
        }
        let first_ptr = Arc::as_ptr(&instances[0]);
        assert!(instances.iter().all(|i| Arc::as_ptr(i) == first_ptr));
    }
}
