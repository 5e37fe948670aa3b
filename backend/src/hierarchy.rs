//! Attaches subsection descriptors to top-level sections by numeric range.
//!
//! Subsection descriptor files carry no parent pointer, only the record range
//! a subsection covers. For each descriptor the parent is found in two passes
//! over the top-level sections of the same collection and language, in row
//! insertion order:
//!
//! 1. containment: the first section whose bounds hold the descriptor's start
//!    `first`
//! 2. overlap: failing that, the first section whose bounds intersect the
//!    descriptor's range `[first, last]` (just `first` when `last` is absent)
//!
//! The overlap pass recovers subsections whose boundaries are off by one
//! relative to a loosely declared parent. A descriptor without a start bound,
//! or one that neither pass places, is skipped; no placeholder parent is made.

use std::fmt;

use crate::db::corpus_models::{NewSection, Section};
use crate::documents::SubsectionDescriptor;
use crate::types::{CollectionId, FileIndex, Language, SectionId};

/// A top-level section as seen by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentCandidate {
    pub section_id: SectionId,
    pub first: Option<f64>,
    pub last: Option<f64>,
}

impl ParentCandidate {
    pub fn new(section_id: impl Into<String>, first: f64, last: f64) -> Self {
        ParentCandidate {
            section_id: SectionId::new(section_id),
            first: Some(first),
            last: Some(last),
        }
    }

    fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.first?, self.last?))
    }

    fn contains(&self, n: f64) -> bool {
        match self.bounds() {
            Some((lo, hi)) => lo <= n && n <= hi,
            None => false,
        }
    }

    fn overlaps(&self, first: f64, last: f64) -> bool {
        match self.bounds() {
            Some((lo, hi)) => hi >= first && lo <= last,
            None => false,
        }
    }
}

impl From<&Section> for ParentCandidate {
    fn from(section: &Section) -> Self {
        ParentCandidate {
            section_id: SectionId::new(section.section_id.clone()),
            first: section.hadith_number_first,
            last: section.hadith_number_last,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Contained,
    Overlapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingStart,
    MissingFileIndex,
    NoParent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingStart => f.write_str("missing hadithNumberFirst"),
            SkipReason::MissingFileIndex => f.write_str("missing fileIndex"),
            SkipReason::NoParent => f.write_str("no matching top-level section"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParentMatch {
    pub parent_id: SectionId,
    pub kind: MatchKind,
}

/// Finds the parent of one descriptor among `candidates`, which must be the
/// top-level sections of the descriptor's scope in row insertion order.
pub fn find_parent(
    candidates: &[ParentCandidate],
    descriptor: &SubsectionDescriptor,
) -> Result<ParentMatch, SkipReason> {
    let first = descriptor.hadith_number_first
        .ok_or(SkipReason::MissingStart)?
        .value();
    let last = descriptor.hadith_number_last
        .map(|n| n.value())
        .unwrap_or(first);

    if let Some(c) = candidates.iter().find(|c| c.contains(first)) {
        return Ok(ParentMatch {
            parent_id: c.section_id.clone(),
            kind: MatchKind::Contained,
        });
    }

    if let Some(c) = candidates.iter().find(|c| c.overlaps(first, last)) {
        return Ok(ParentMatch {
            parent_id: c.section_id.clone(),
            kind: MatchKind::Overlapped,
        });
    }

    Err(SkipReason::NoParent)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSubsection {
    pub section_id: SectionId,
    pub parent_id: SectionId,
    pub kind: MatchKind,
    pub title: Option<String>,
    pub first: f64,
    pub last: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSubsection {
    /// Position of the descriptor in its file.
    pub position: usize,
    pub reason: SkipReason,
    pub title: Option<String>,
    pub first: Option<f64>,
    pub last: Option<f64>,
}

impl fmt::Display for SkippedSubsection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_num = |n: Option<f64>| n.map(|v| crate::types::HadithNumber(v).to_string())
            .unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "#{} '{}' ({}-{}): {}",
            self.position,
            self.title.as_deref().unwrap_or(""),
            fmt_num(self.first),
            fmt_num(self.last),
            self.reason,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeResolution {
    pub attached: Vec<ResolvedSubsection>,
    pub skipped: Vec<SkippedSubsection>,
}

impl ScopeResolution {
    pub fn count_by_kind(&self, kind: MatchKind) -> usize {
        self.attached.iter().filter(|s| s.kind == kind).count()
    }
}

/// Resolves every descriptor of one (collection, language) scope.
pub fn resolve_scope(candidates: &[ParentCandidate], descriptors: &[SubsectionDescriptor]) -> ScopeResolution {
    let mut resolution = ScopeResolution::default();

    for (position, d) in descriptors.iter().enumerate() {
        let outcome = find_parent(candidates, d).and_then(|m| {
            let file_index: &FileIndex = d.file_index.as_ref().ok_or(SkipReason::MissingFileIndex)?;
            Ok((m, file_index))
        });

        match outcome {
            Ok((m, file_index)) => resolution.attached.push(ResolvedSubsection {
                section_id: m.parent_id.child(file_index),
                parent_id: m.parent_id,
                kind: m.kind,
                title: d.section_title.clone(),
                // find_parent rejects descriptors without a start
                first: d.hadith_number_first.map(|n| n.value()).unwrap_or_default(),
                last: d.hadith_number_last.map(|n| n.value()),
            }),
            Err(reason) => resolution.skipped.push(SkippedSubsection {
                position,
                reason,
                title: d.section_title.clone(),
                first: d.hadith_number_first.map(|n| n.value()),
                last: d.hadith_number_last.map(|n| n.value()),
            }),
        }
    }

    resolution
}

impl ResolvedSubsection {
    pub fn to_new_section<'a>(&'a self, collection_id: CollectionId, language: Language) -> NewSection<'a> {
        NewSection {
            collection_id: collection_id.0,
            section_id: self.section_id.as_str(),
            language: language.as_str(),
            section_title: self.title.as_deref(),
            hadith_number_first: Some(self.first),
            hadith_number_last: self.last,
            arabic_number_first: None,
            arabic_number_last: None,
            parent_section_id: Some(self.parent_id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HadithNumber;

    fn descriptor(file_index: &str, first: Option<f64>, last: Option<f64>) -> SubsectionDescriptor {
        SubsectionDescriptor {
            file_index: Some(FileIndex::new(file_index)),
            section_title: Some(format!("Chapter {}", file_index)),
            hadith_number_first: first.map(HadithNumber),
            hadith_number_last: last.map(HadithNumber),
        }
    }

    #[test]
    fn test_containment() {
        let parents = vec![ParentCandidate::new("3", 10.0, 20.0)];
        let m = find_parent(&parents, &descriptor("1", Some(12.0), Some(15.0))).unwrap();
        assert_eq!(m.parent_id.as_str(), "3");
        assert_eq!(m.kind, MatchKind::Contained);

        let res = resolve_scope(&parents, &[descriptor("1", Some(12.0), Some(15.0))]);
        assert_eq!(res.attached[0].section_id.as_str(), "3-1");
        assert_eq!(res.attached[0].parent_id.as_str(), "3");
    }

    #[test]
    fn test_end_past_parent_still_contained() {
        let parents = vec![ParentCandidate::new("3", 10.0, 20.0)];
        let m = find_parent(&parents, &descriptor("2", Some(19.0), Some(22.0))).unwrap();
        assert_eq!(m.parent_id.as_str(), "3");
        assert_eq!(m.kind, MatchKind::Contained);

        let res = resolve_scope(&parents, &[descriptor("2", Some(19.0), Some(22.0))]);
        assert_eq!(res.attached[0].section_id.as_str(), "3-2");
    }

    #[test]
    fn test_overlap_fallback() {
        let parents = vec![ParentCandidate::new("3", 10.0, 20.0)];
        let m = find_parent(&parents, &descriptor("2", Some(8.0), Some(12.0))).unwrap();
        assert_eq!(m.parent_id.as_str(), "3");
        assert_eq!(m.kind, MatchKind::Overlapped);
    }

    #[test]
    fn test_start_decides_over_earlier_overlapping_parent() {
        // Row order puts [21,30] before [10,20].
        let parents = vec![
            ParentCandidate::new("b", 21.0, 30.0),
            ParentCandidate::new("a", 10.0, 20.0),
        ];
        let m = find_parent(&parents, &descriptor("1", Some(15.0), Some(25.0))).unwrap();
        assert_eq!(m.parent_id.as_str(), "a");
        assert_eq!(m.kind, MatchKind::Contained);
    }

    #[test]
    fn test_off_by_one_start_recovered_by_overlap() {
        let parents = vec![
            ParentCandidate::new("1", 1.0, 9.0),
            ParentCandidate::new("2", 11.0, 20.0),
        ];
        // Starts one past section 1, which ends at 9; lands in section 2 by overlap.
        let m = find_parent(&parents, &descriptor("4", Some(10.0), Some(14.0))).unwrap();
        assert_eq!(m.parent_id.as_str(), "2");
        assert_eq!(m.kind, MatchKind::Overlapped);
    }

    #[test]
    fn test_no_false_match() {
        let parents = vec![ParentCandidate::new("3", 10.0, 20.0)];
        let res = resolve_scope(&parents, &[descriptor("5", Some(30.0), Some(35.0))]);
        assert!(res.attached.is_empty());
        assert_eq!(res.skipped.len(), 1);
        assert_eq!(res.skipped[0].reason, SkipReason::NoParent);
    }

    #[test]
    fn test_missing_start_always_rejected() {
        let parents = vec![ParentCandidate::new("3", 10.0, 20.0)];
        // The end alone lies inside the parent; still rejected.
        let res = resolve_scope(&parents, &[descriptor("6", None, Some(15.0))]);
        assert!(res.attached.is_empty());
        assert_eq!(res.skipped[0].reason, SkipReason::MissingStart);
    }

    #[test]
    fn test_missing_file_index_skipped() {
        let parents = vec![ParentCandidate::new("3", 10.0, 20.0)];
        let mut d = descriptor("7", Some(11.0), Some(12.0));
        d.file_index = None;
        let res = resolve_scope(&parents, &[d]);
        assert_eq!(res.skipped[0].reason, SkipReason::MissingFileIndex);
    }

    #[test]
    fn test_point_containment_without_last() {
        let parents = vec![ParentCandidate::new("a", 10.0, 20.0)];
        let m = find_parent(&parents, &descriptor("1", Some(20.0), None)).unwrap();
        assert_eq!(m.kind, MatchKind::Contained);
    }

    #[test]
    fn test_first_in_insertion_order_wins() {
        // Duplicate ranges are not expected, but must not fail.
        let parents = vec![
            ParentCandidate::new("9", 10.0, 20.0),
            ParentCandidate::new("1", 10.0, 20.0),
        ];
        let m = find_parent(&parents, &descriptor("1", Some(12.0), Some(13.0))).unwrap();
        assert_eq!(m.parent_id.as_str(), "9");
    }

    #[test]
    fn test_containment_preferred_over_earlier_overlap() {
        let parents = vec![
            ParentCandidate::new("1", 16.0, 18.0),
            ParentCandidate::new("2", 10.0, 15.0),
        ];
        let m = find_parent(&parents, &descriptor("1", Some(14.0), Some(17.0))).unwrap();
        assert_eq!(m.parent_id.as_str(), "2");
        assert_eq!(m.kind, MatchKind::Contained);
    }

    #[test]
    fn test_parent_without_bounds_never_matches() {
        let parents = vec![ParentCandidate {
            section_id: SectionId::new("0"),
            first: None,
            last: Some(100.0),
        }];
        let res = find_parent(&parents, &descriptor("1", Some(5.0), Some(6.0)));
        assert_eq!(res, Err(SkipReason::NoParent));
    }

    #[test]
    fn test_file_index_is_opaque() {
        let parents = vec![ParentCandidate::new("12", 1.0, 50.0)];
        let res = resolve_scope(&parents, &[
            descriptor("007", Some(2.0), Some(3.0)),
            descriptor("b", Some(4.0), Some(5.0)),
        ]);
        let ids: Vec<&str> = res.attached.iter().map(|s| s.section_id.as_str()).collect();
        assert_eq!(ids, vec!["12-007", "12-b"]);
    }
}
