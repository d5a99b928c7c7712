//! Three-way file-status classification
//!
//! Classifies every path in the union of the receiver, giver, and base TOCs
//! into one of five statuses. The base defaults to the receiver when no
//! common ancestor is supplied (two-way mode); in that mode CONFLICT can
//! never arise, because the receiver side trivially equals the base.

use crate::artifacts::diff::Toc;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Per-path change classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileStatus {
    Add,
    Modify,
    Delete,
    Same,
    Conflict,
}

impl FileStatus {
    pub fn status_char(&self) -> char {
        match self {
            FileStatus::Add => 'A',
            FileStatus::Modify => 'M',
            FileStatus::Delete => 'D',
            FileStatus::Same => ' ',
            FileStatus::Conflict => 'C',
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status_char())
    }
}

/// Classification of one path, with the content hash each side holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub status: FileStatus,
    pub receiver: Option<ObjectId>,
    pub base: Option<ObjectId>,
    pub giver: Option<ObjectId>,
}

impl DiffEntry {
    /// Classify a single path from the hash each TOC holds for it
    ///
    /// The rules, evaluated in order:
    /// 1. present in both receiver and giver with differing hashes:
    ///    CONFLICT when both sides changed relative to the base, MODIFY when
    ///    exactly one did;
    /// 2. receiver hash equals giver hash (covers absent-in-both): SAME;
    /// 3. absent from base and present in exactly one side: ADD;
    /// 4. present in base and absent from exactly one side: DELETE;
    /// 5. anything left: SAME.
    pub fn classify(
        receiver: Option<&ObjectId>,
        base: Option<&ObjectId>,
        giver: Option<&ObjectId>,
    ) -> Self {
        let status = match (receiver, giver) {
            (Some(r), Some(g)) if r != g => {
                if Some(r) != base && Some(g) != base {
                    FileStatus::Conflict
                } else {
                    FileStatus::Modify
                }
            }
            _ if receiver == giver => FileStatus::Same,
            _ if base.is_none() && (receiver.is_some() ^ giver.is_some()) => FileStatus::Add,
            _ if base.is_some() && (receiver.is_none() ^ giver.is_none()) => FileStatus::Delete,
            _ => FileStatus::Same,
        };

        DiffEntry {
            status,
            receiver: receiver.cloned(),
            base: base.cloned(),
            giver: giver.cloned(),
        }
    }
}

/// One DiffEntry per path in the union of the input TOCs' key sets
pub type TocDiff = BTreeMap<PathBuf, DiffEntry>;

/// Classify every path across the receiver, giver, and base TOCs
///
/// When `base` is `None` it defaults to the receiver, turning this into a
/// two-way diff in which CONFLICT is unreachable.
pub fn toc_diff(receiver: &Toc, giver: &Toc, base: Option<&Toc>) -> TocDiff {
    let base = base.unwrap_or(receiver);

    let paths = receiver
        .keys()
        .chain(giver.keys())
        .chain(base.keys())
        .collect::<std::collections::BTreeSet<_>>();

    paths
        .into_iter()
        .map(|path| {
            let entry = DiffEntry::classify(receiver.get(path), base.get(path), giver.get(path));
            (path.clone(), entry)
        })
        .collect()
}

/// Per-path statuses with SAME entries dropped, for reporting
pub fn name_status(diff: &TocDiff) -> BTreeMap<&Path, FileStatus> {
    diff.iter()
        .filter(|(_, entry)| entry.status != FileStatus::Same)
        .map(|(path, entry)| (path.as_path(), entry.status))
        .collect()
}

/// Sorted, deduplicated list of conflicted paths
pub fn conflicted_paths(diff: &TocDiff) -> Vec<&Path> {
    diff.iter()
        .filter(|(_, entry)| entry.status == FileStatus::Conflict)
        .map(|(path, _)| path.as_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn oid(seed: &str) -> ObjectId {
        let mut hex = seed
            .bytes()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();
        while hex.len() < 40 {
            hex.push('0');
        }
        hex.truncate(40);
        ObjectId::try_parse(hex).unwrap()
    }

    fn toc(entries: &[(&str, &str)]) -> Toc {
        entries
            .iter()
            .map(|(path, seed)| (PathBuf::from(path), oid(seed)))
            .collect()
    }

    fn statuses(diff: &TocDiff) -> BTreeMap<String, FileStatus> {
        diff.iter()
            .map(|(path, entry)| (path.display().to_string(), entry.status))
            .collect()
    }

    #[test]
    fn files_new_on_either_side_classify_as_adds() {
        let receiver = toc(&[("a", "h1"), ("b", "h2")]);
        let giver = toc(&[("a", "h1"), ("c", "h3")]);
        let base = toc(&[("a", "h1")]);

        let diff = toc_diff(&receiver, &giver, Some(&base));

        // `b` and `c` are each absent from the base and present on exactly
        // one side, so both classify as additions
        assert_eq!(
            statuses(&diff),
            BTreeMap::from([
                ("a".to_string(), FileStatus::Same),
                ("b".to_string(), FileStatus::Add),
                ("c".to_string(), FileStatus::Add),
            ])
        );
    }

    #[test]
    fn both_sides_diverging_from_base_is_a_conflict() {
        let base = toc(&[("f", "h0")]);
        let receiver = toc(&[("f", "h1")]);
        let giver = toc(&[("f", "h2")]);

        let diff = toc_diff(&receiver, &giver, Some(&base));

        assert_eq!(diff[Path::new("f")].status, FileStatus::Conflict);
        assert_eq!(diff[Path::new("f")].base, Some(oid("h0")));
        assert_eq!(diff[Path::new("f")].receiver, Some(oid("h1")));
        assert_eq!(diff[Path::new("f")].giver, Some(oid("h2")));
    }

    #[test]
    fn only_one_side_changing_is_a_modify() {
        let base = toc(&[("f", "h0")]);
        let receiver = toc(&[("f", "h0")]);
        let giver = toc(&[("f", "h2")]);

        let diff = toc_diff(&receiver, &giver, Some(&base));

        assert_eq!(diff[Path::new("f")].status, FileStatus::Modify);
    }

    #[test]
    fn deleted_on_one_side_while_present_in_base() {
        let base = toc(&[("f", "h0")]);
        let receiver = toc(&[("f", "h0")]);
        let giver = toc(&[]);

        let diff = toc_diff(&receiver, &giver, Some(&base));

        assert_eq!(diff[Path::new("f")].status, FileStatus::Delete);
    }

    #[test]
    fn two_way_mode_defaults_base_to_receiver_and_never_conflicts() {
        // both sides hold different content than each other, which would
        // conflict against any third base
        let receiver = toc(&[("f", "h1")]);
        let giver = toc(&[("f", "h2")]);

        let diff = toc_diff(&receiver, &giver, None);

        assert_eq!(diff[Path::new("f")].status, FileStatus::Modify);
    }

    #[test]
    fn diffing_a_toc_against_itself_yields_only_same() {
        let receiver = toc(&[("a", "h1"), ("b", "h2")]);

        let diff = toc_diff(&receiver, &receiver.clone(), Some(&receiver.clone()));

        assert!(diff.values().all(|e| e.status == FileStatus::Same));
    }

    #[test]
    fn name_status_excludes_same_entries() {
        let receiver = toc(&[("a", "h1"), ("b", "h2")]);
        let giver = toc(&[("a", "h1"), ("c", "h3")]);

        let diff = toc_diff(&receiver, &giver, None);
        let report = name_status(&diff);

        assert!(!report.contains_key(Path::new("a")));
        assert_eq!(report[Path::new("b")], FileStatus::Delete);
        assert_eq!(report[Path::new("c")], FileStatus::Add);
    }

    #[test]
    fn conflicted_paths_are_sorted() {
        let base = toc(&[("z", "h0"), ("a", "h0")]);
        let receiver = toc(&[("z", "h1"), ("a", "h1")]);
        let giver = toc(&[("z", "h2"), ("a", "h2")]);

        let diff = toc_diff(&receiver, &giver, Some(&base));

        assert_eq!(
            conflicted_paths(&diff),
            vec![Path::new("a"), Path::new("z")]
        );
    }

    // An entry is `None` (absent) or one of three distinct hashes
    fn maybe_oid() -> impl Strategy<Value = Option<ObjectId>> {
        prop_oneof![
            Just(None),
            Just(Some(oid("h0"))),
            Just(Some(oid("h1"))),
            Just(Some(oid("h2"))),
        ]
    }

    proptest! {
        #[test]
        fn classification_is_total_and_same_iff_hashes_match(
            receiver in maybe_oid(),
            base in maybe_oid(),
            giver in maybe_oid(),
        ) {
            let entry = DiffEntry::classify(receiver.as_ref(), base.as_ref(), giver.as_ref());

            // exactly one of the five statuses, and SAME iff receiver == giver
            prop_assert_eq!(entry.status == FileStatus::Same, receiver == giver);
        }

        #[test]
        fn two_way_mode_never_produces_conflicts(
            receiver in maybe_oid(),
            giver in maybe_oid(),
        ) {
            let entry = DiffEntry::classify(receiver.as_ref(), receiver.as_ref(), giver.as_ref());

            prop_assert_ne!(entry.status, FileStatus::Conflict);
        }
    }
}
