//! Process-wide state that outlives any single environment: the list of
//! environments currently allocated, and the hidden sentinel direct-mode
//! environment backing utility handles (section 4.5, Design Notes Open Question ii).
//! Two separate mutexes, never held at the same time, matching the lock-ordering
//! rule the dispatch shims follow elsewhere (child locks before parent locks, and
//! this registry's lock is always released before a driver is called).

use crate::error::DmResult;
use crate::handles::{Environment, UtilityHandle};
use crate::loader::{self, FunctionTable, Kind};
use std::sync::{Arc, Mutex, OnceLock};

struct UtilitySentinel {
    table: Arc<FunctionTable>,
    open_handles: usize,
}

struct Registry {
    environments: Mutex<Vec<Arc<Environment>>>,
    utility: Mutex<Option<UtilitySentinel>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry {
        environments: Mutex::new(Vec::new()),
        utility: Mutex::new(None),
    })
}

/// Allocates a new environment. The direct/client libraries load on whichever
/// environment happens to be first; later environments reuse the already-resolved
/// `FunctionTable`s through `Environment::new`'s own loader calls (section 4.1).
pub fn alloc_environment() -> DmResult<Arc<Environment>> {
    let environment = Arc::new(Environment::new()?);
    registry().environments.lock().unwrap().push(environment.clone());
    Ok(environment)
}

pub fn free_environment(environment: &Arc<Environment>) {
    registry()
        .environments
        .lock()
        .unwrap()
        .retain(|e| !Arc::ptr_eq(e, environment));
}

pub fn environment_count() -> usize {
    registry().environments.lock().unwrap().len()
}

/// Allocates a utility handle. Creates the sentinel environment's direct-mode table
/// on the first call; subsequent calls share it.
pub fn alloc_utility_handle() -> DmResult<UtilityHandle> {
    let mut utility = registry().utility.lock().unwrap();
    let table = match utility.as_mut() {
        Some(sentinel) => {
            sentinel.open_handles += 1;
            sentinel.table.clone()
        }
        None => {
            let table = Arc::new(loader::load(Kind::Utility)?);
            *utility = Some(UtilitySentinel {
                table: table.clone(),
                open_handles: 1,
            });
            table
        }
    };
    Ok(UtilityHandle::new(table))
}

/// Releases one utility handle, tearing down the sentinel once the last one frees.
pub fn free_utility_handle() {
    let mut utility = registry().utility.lock().unwrap();
    if let Some(sentinel) = utility.as_mut() {
        sentinel.open_handles = sentinel.open_handles.saturating_sub(1);
        if sentinel.open_handles == 0 {
            *utility = None;
        }
    }
}

#[cfg(test)]
pub(crate) fn utility_sentinel_is_live() -> bool {
    registry().utility.lock().unwrap().is_some()
}
