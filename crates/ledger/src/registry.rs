//! Hook Registry - transfer-hook programs known to the ledger

use std::collections::BTreeMap;
use std::sync::Arc;

use hookgate_core::Address;
use hookgate_hook::HookProgram;

/// Registry of hook programs keyed by program id
///
/// A mint names its hook by program id; the ledger looks it up here on
/// every transfer.
#[derive(Default, Clone)]
pub struct HookRegistry {
    programs: BTreeMap<Address, Arc<dyn HookProgram>>,
}

impl HookRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook program, replacing any previous one with the same id
    pub fn register(&mut self, program: Arc<dyn HookProgram>) {
        let program_id = program.program_id();
        tracing::debug!(hook = program.name(), program_id = %program_id, "Hook registered");
        self.programs.insert(program_id, program);
    }

    /// Look up a program
    pub fn get(&self, program_id: &Address) -> Option<Arc<dyn HookProgram>> {
        self.programs.get(program_id).cloned()
    }

    /// Whether a program is registered
    pub fn contains(&self, program_id: &Address) -> bool {
        self.programs.contains_key(program_id)
    }

    /// Registered program ids in order
    pub fn program_ids(&self) -> impl Iterator<Item = &Address> {
        self.programs.keys()
    }

    /// Get number of registered programs
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.programs.iter().map(|(id, p)| (id, p.name())))
            .finish()
    }
}
