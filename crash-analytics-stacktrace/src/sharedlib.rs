/// Symbol availability for a shared library, as reported by GDB's `info
/// sharedlibrary` block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolStatus {
    /// Symbols were loaded successfully (`Yes`).
    Ok,
    /// GDB could not find a matching library at all.
    NotFound,
    /// A library was found at the address, but it is not the one GDB
    /// loaded symbols for (`*` marker in the `Syms Read` column, or the
    /// address falls outside every known range).
    Wrong,
}

/// One line of a GDB `info sharedlibrary` table:
/// `0xFROM 0xTO Yes|No (*|)  /path`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SharedLib {
    /// Start address of the mapped range.
    pub from: u64,
    /// End address of the mapped range.
    pub to: u64,
    /// Whether GDB reports symbols as loaded for this range.
    pub symbols_read: bool,
    /// Path to the backing file.
    pub path: String,
}

/// The collected shared-library map of one GDB backtrace, supporting
/// address lookups that classify symbol availability.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SharedLibMap {
    libs: Vec<SharedLib>,
}

impl SharedLibMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one parsed `info sharedlibrary` row.
    pub fn push(&mut self, lib: SharedLib) {
        self.libs.push(lib);
    }

    /// All entries, in the order GDB printed them.
    pub fn entries(&self) -> &[SharedLib] {
        &self.libs
    }

    /// Classifies symbol availability for `address`.
    ///
    /// Returns [`SymbolStatus::NotFound`] if no entry's range contains the
    /// address, [`SymbolStatus::Wrong`] if a containing entry exists but
    /// did not have symbols loaded, and [`SymbolStatus::Ok`] otherwise.
    pub fn lookup(&self, address: u64) -> SymbolStatus {
        match self
            .libs
            .iter()
            .find(|lib| lib.from <= address && address < lib.to)
        {
            None => SymbolStatus::NotFound,
            Some(lib) if lib.symbols_read => SymbolStatus::Ok,
            Some(_) => SymbolStatus::Wrong,
        }
    }
}
