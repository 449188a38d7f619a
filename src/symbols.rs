use crate::types::SymbolId;
use rustc_hash::FxHashMap;

#[derive(Default, Debug)]
pub struct SymbolTable {
    str_to_id: FxHashMap<String, SymbolId>,
    id_to_str: Vec<String>,
}

impl SymbolTable {
    pub fn intern(&mut self, value: &str) -> SymbolId {
        if let Some(id) = self.str_to_id.get(value) {
            return *id;
        }

        let id = SymbolId::try_from(self.id_to_str.len())
            .expect("symbol table exceeded SymbolId capacity (u32)");
        self.id_to_str.push(value.to_string());
        self.str_to_id.insert(value.to_string(), id);
        id
    }

    pub fn id_for(&self, value: &str) -> Option<SymbolId> {
        self.str_to_id.get(value).copied()
    }

    pub fn resolve(&self, id: SymbolId) -> &str {
        &self.id_to_str[id as usize]
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }

    pub fn clear(&mut self) {
        self.str_to_id.clear();
        self.id_to_str.clear();
    }
}

#[derive(Clone, Debug)]
pub struct NonterminalAllocator {
    next: u64,
    prefix: String,
}

impl Default for NonterminalAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl NonterminalAllocator {
    pub fn new() -> Self {
        Self::with_prefix("t")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            next: 0,
            prefix: prefix.into(),
        }
    }

    pub fn starting_at(prefix: impl Into<String>, next: u64) -> Self {
        Self {
            next,
            prefix: prefix.into(),
        }
    }

    pub fn allocate(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    pub fn allocated(&self) -> u64 {
        self.next
    }
}
