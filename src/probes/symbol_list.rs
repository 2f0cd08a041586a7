use std::error::Error;
use std::fmt;

/// A function or probe name along with its address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub address: u64,
}

/// Symbols in the order they were found in the image. Names may repeat, e.g. a probe
/// compiled into several call sites.
#[derive(Clone, Debug, Default)]
pub struct SymbolList {
    symbols: Vec<Symbol>,
}

impl SymbolList {
    pub fn new() -> Self {
        SymbolList::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    /// First symbol with exactly this name.
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Every address recorded for name, in encounter order.
    pub fn addresses(&self, name: &str) -> Vec<u64> {
        self.symbols
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.address)
            .collect()
    }

    /// Frees the names and the list itself.
    pub fn release(self) {}
}

impl<'a> IntoIterator for &'a SymbolList {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

impl IntoIterator for SymbolList {
    type Item = Symbol;
    type IntoIter = std::vec::IntoIter<Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.into_iter()
    }
}

/// The list couldn't grow. Whatever had been collected is gone.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListFull {
    /// More than this many entries were appended.
    Limit(usize),

    /// An allocation failed.
    OutOfMemory,
}

impl fmt::Display for ListFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListFull::Limit(max) => write!(f, "symbol list is full (limit is {max} entries)"),
            ListFull::OutOfMemory => write!(f, "out of memory growing the symbol list"),
        }
    }
}

impl Error for ListFull {}

/// Collects symbols for a single extraction. This is all or nothing: once an append
/// fails everything collected so far is released and all later appends fail too.
pub struct SymbolListBuilder {
    symbols: Vec<Symbol>,
    limit: Option<usize>,
    failed: Option<ListFull>,
}

impl SymbolListBuilder {
    pub fn new(limit: Option<usize>) -> Self {
        SymbolListBuilder {
            symbols: Vec::new(),
            limit,
            failed: None,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn append(&mut self, name: &str, address: u64) -> Result<(), ListFull> {
        if let Some(err) = self.failed {
            return Err(err);
        }
        if let Some(max) = self.limit
            && self.symbols.len() >= max
        {
            return Err(self.rollback(ListFull::Limit(max)));
        }

        let mut owned = String::new();
        if owned.try_reserve_exact(name.len()).is_err() || self.symbols.try_reserve(1).is_err() {
            return Err(self.rollback(ListFull::OutOfMemory));
        }
        owned.push_str(name);
        self.symbols.push(Symbol {
            name: owned,
            address,
        });
        Ok(())
    }

    pub fn build(self) -> Result<SymbolList, ListFull> {
        match self.failed {
            Some(err) => Err(err),
            None => Ok(SymbolList {
                symbols: self.symbols,
            }),
        }
    }

    fn rollback(&mut self, err: ListFull) -> ListFull {
        self.symbols = Vec::new();
        self.failed = Some(err);
        err
    }
}
