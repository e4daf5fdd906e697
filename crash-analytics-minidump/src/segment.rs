//! The PT_LOAD segment table an unwind driver resolves addresses against.

/// One executable (`PF_X`) PT_LOAD segment, already mapped back to its
/// backing file by the binding layer.
///
/// `build_id` is the backing file's `NT_GNU_BUILD_ID` note, already
/// extracted; this crate never reads ELF notes itself.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Segment {
    /// Offset into the backing file where this segment's data begins.
    pub offset: u64,
    /// Virtual address this segment was mapped at.
    pub vaddr: u64,
    /// Size of the segment's data within the file.
    pub filesz: u64,
    /// Size of the segment once mapped into memory (`>= filesz`, the
    /// remainder zero-filled).
    pub memsz: u64,
    /// Path to the backing file, if a mapping recorded one.
    pub file_name: Option<String>,
    /// Lowercase hex build id of the backing file, if resolved.
    pub build_id: Option<String>,
}

impl Segment {
    /// `true` if `vaddr` falls within this segment's mapped range.
    pub fn contains(&self, vaddr: u64) -> bool {
        self.vaddr <= vaddr && vaddr < self.vaddr + self.memsz
    }
}

/// Resolves instruction addresses to the segment that maps them.
///
/// Built once per unwind and consulted once per stepped frame.
#[derive(Clone, Debug, Default)]
pub struct SegmentTable {
    segments: Vec<Segment>,
}

/// What is known about an address once resolved against the segment table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AddressInfo {
    /// Build id of the backing file, if the owning segment had one.
    pub build_id: Option<String>,
    /// Offset of the address within its segment's backing file.
    pub build_id_offset: Option<u64>,
    /// Path to the backing file, if known.
    pub file_name: Option<String>,
}

impl SegmentTable {
    /// Builds a table from the segments enumerated for this coredump,
    /// sorted by virtual address for lookup.
    pub fn new(mut segments: Vec<Segment>) -> Self {
        segments.sort_by_key(|s| s.vaddr);
        SegmentTable { segments }
    }

    /// Resolves `ip` against the segment containing it, if any.
    pub fn resolve(&self, ip: u64) -> Option<AddressInfo> {
        let segment = self.segments.iter().find(|s| s.contains(ip))?;
        Some(AddressInfo {
            build_id: segment.build_id.clone(),
            build_id_offset: Some(ip - segment.vaddr),
            file_name: segment.file_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(vaddr: u64, memsz: u64, build_id: &str) -> Segment {
        Segment { offset: 0, vaddr, filesz: memsz, memsz, file_name: Some("/usr/bin/crashy".into()), build_id: Some(build_id.into()) }
    }

    #[test]
    fn resolves_address_to_owning_segment() {
        let table = SegmentTable::new(vec![seg(0x1000, 0x1000, "aaaa"), seg(0x5000, 0x1000, "bbbb")]);
        let info = table.resolve(0x5010).unwrap();
        assert_eq!(info.build_id.as_deref(), Some("bbbb"));
        assert_eq!(info.build_id_offset, Some(0x10));
    }

    #[test]
    fn address_outside_every_segment_is_unresolved() {
        let table = SegmentTable::new(vec![seg(0x1000, 0x1000, "aaaa")]);
        assert!(table.resolve(0x9000).is_none());
    }
}
