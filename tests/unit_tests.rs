//! Scenario tests for CUGO segmentation through the public API.
//!
//! These tests check the group partitioning and boundary invariants on small
//! hand-built annotations, including strand mirroring of boundaries.

use cugo::config::Config;
use cugo::output::{format_output_line, write_rows};
use cugo::parser::gff::{GffReader, Lookahead, Lookback};
use cugo::segment::{classify, segment, Case, Relation};
use cugo::types::{BoundaryKind, CugoRow, Strand};
use std::io::BufReader;

// -------------------------------------------------------------------------
// Helper functions
// -------------------------------------------------------------------------

/// One GFF line for a coding feature.
fn cds(parent: &str, start: u64, strand: char, id: &str) -> String {
    format!(
        "{}\tprodigal\tCDS\t{}\t{}\t.\t{}\t0\tID={};db_xref=COG{}\n",
        parent,
        start,
        start + 299,
        strand,
        id,
        id
    )
}

/// One GFF line for a non-coding feature.
fn rna(parent: &str, start: u64, strand: char, id: &str) -> String {
    format!(
        "{}\tprodigal\ttRNA\t{}\t{}\t.\t{}\t.\tID={}\n",
        parent,
        start,
        start + 75,
        strand,
        id
    )
}

fn annotate(gff: &str) -> Vec<CugoRow> {
    cugo::annotate(BufReader::new(gff.as_bytes()), &Config::default()).unwrap()
}

fn groups(rows: &[CugoRow]) -> Vec<u64> {
    rows.iter().map(|r| r.cugo).collect()
}

fn kinds(row: &CugoRow) -> (BoundaryKind, BoundaryKind) {
    (row.start_kind, row.end_kind)
}

/// Boundary on the genome-downstream side of a row (end for `+`, start for `-`).
fn downstream_kind(row: &CugoRow) -> BoundaryKind {
    match row.feature.strand {
        Strand::Positive => row.end_kind,
        Strand::Negative => row.start_kind,
    }
}

use cugo::types::BoundaryKind::{None as Na, SequenceEdge as Edge, StrandChange as Flip};

// -------------------------------------------------------------------------
// 1. Scenarios
// -------------------------------------------------------------------------

mod scenarios {
    use super::*;

    #[test]
    fn test_forward_run_then_reverse_run() {
        let gff = [
            cds("C1", 100, '+', "a"),
            cds("C1", 500, '+', "b"),
            cds("C1", 900, '+', "c"),
            cds("C1", 1300, '-', "d"),
            cds("C1", 1700, '-', "e"),
        ]
        .concat();
        let rows = annotate(&gff);

        assert_eq!(groups(&rows), vec![0, 0, 0, 1, 1]);
        assert!(rows[..3].iter().all(|r| r.size == Some(3)));
        assert!(rows[3..].iter().all(|r| r.size == Some(2)));

        // Forward group: contig edge at its start, strand change at its end
        assert_eq!(kinds(&rows[0]), (Edge, Na));
        assert_eq!(kinds(&rows[1]), (Na, Na));
        assert_eq!(kinds(&rows[2]), (Na, Flip));

        // Reverse group is read tail first: the strand change (lower
        // coordinate side) is its end, the contig edge is its start
        assert_eq!(kinds(&rows[3]), (Na, Flip));
        assert_eq!(kinds(&rows[4]), (Edge, Na));
    }

    #[test]
    fn test_single_feature_contig() {
        let rows = annotate(&cds("C1", 1, '+', "only"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cugo, 0);
        assert_eq!(rows[0].size, Some(1));
        assert_eq!(kinds(&rows[0]), (Edge, Edge));
    }

    #[test]
    fn test_single_reverse_feature_contig() {
        let rows = annotate(&cds("C1", 1, '-', "only"));
        assert_eq!(kinds(&rows[0]), (Edge, Edge));
    }

    #[test]
    fn test_two_single_feature_contigs() {
        let gff = [cds("C1", 1, '+', "a"), cds("C2", 1, '+', "b")].concat();
        let rows = annotate(&gff);

        assert_eq!(groups(&rows), vec![0, 1]);
        for row in &rows {
            assert_eq!(row.size, Some(1));
            assert_eq!(kinds(row), (Edge, Edge));
        }
    }

    #[test]
    fn test_non_coding_feature_splits_run() {
        let gff = [
            cds("C1", 100, '+', "a"),
            cds("C1", 500, '+', "b"),
            rna("C1", 900, '+', "t1"),
            cds("C1", 1100, '+', "c"),
            cds("C1", 1500, '+', "d"),
        ]
        .concat();
        let rows = annotate(&gff);

        assert_eq!(rows.len(), 4, "no row is emitted for the tRNA");
        assert_eq!(groups(&rows), vec![0, 0, 1, 1]);
        assert_eq!(kinds(&rows[1]), (Na, Edge));
        assert_eq!(kinds(&rows[2]), (Edge, Na));
    }

    #[test]
    fn test_non_coding_run_splits_once() {
        let gff = [
            cds("C1", 100, '-', "a"),
            rna("C1", 500, '-', "t1"),
            rna("C1", 700, '+', "t2"),
            rna("C1", 900, '-', "t3"),
            cds("C1", 1100, '-', "b"),
        ]
        .concat();
        let rows = annotate(&gff);

        assert_eq!(groups(&rows), vec![0, 1]);
        assert!(rows.iter().all(|r| kinds(r) == (Edge, Edge)));
    }

    #[test]
    fn test_trailing_non_coding_record_closes_last_group() {
        let gff = [
            cds("C1", 100, '+', "a"),
            cds("C1", 500, '+', "b"),
            cds("C2", 100, '-', "c"),
            rna("C2", 500, '-', "t1"),
        ]
        .concat();
        let rows = annotate(&gff);

        assert_eq!(rows.len(), 3);
        assert_eq!(groups(&rows), vec![0, 0, 1]);
        assert_eq!(rows[1].size, Some(2));
        assert_eq!(rows[2].size, Some(1));
        assert_eq!(kinds(&rows[1]), (Na, Edge));
        assert_eq!(kinds(&rows[2]), (Edge, Edge));
    }

    #[test]
    fn test_leading_non_coding_records_ignored() {
        let gff = [
            rna("C1", 1, '+', "t1"),
            rna("C1", 100, '+', "t2"),
            cds("C1", 300, '+', "a"),
            cds("C1", 700, '+', "b"),
        ]
        .concat();
        let rows = annotate(&gff);

        assert_eq!(groups(&rows), vec![0, 0]);
        assert_eq!(kinds(&rows[0]), (Edge, Na));
        assert_eq!(kinds(&rows[1]), (Na, Edge));
    }

    #[test]
    fn test_alternating_strands() {
        let gff = [
            cds("C1", 100, '+', "a"),
            cds("C1", 500, '-', "b"),
            cds("C1", 900, '+', "c"),
        ]
        .concat();
        let rows = annotate(&gff);

        assert_eq!(groups(&rows), vec![0, 1, 2]);
        assert_eq!(kinds(&rows[0]), (Edge, Flip));
        assert_eq!(kinds(&rows[1]), (Flip, Flip));
        assert_eq!(kinds(&rows[2]), (Flip, Edge));
    }

    #[test]
    fn test_reverse_run_at_contig_start() {
        let gff = [
            cds("C1", 100, '-', "a"),
            cds("C1", 500, '-', "b"),
            cds("C1", 900, '+', "c"),
            cds("C2", 100, '-', "d"),
            cds("C2", 500, '-', "e"),
        ]
        .concat();
        let rows = annotate(&gff);

        assert_eq!(groups(&rows), vec![0, 0, 1, 2, 2]);
        assert_eq!(kinds(&rows[0]), (Na, Edge));
        assert_eq!(kinds(&rows[1]), (Flip, Na));
        assert_eq!(kinds(&rows[2]), (Flip, Edge));
        assert_eq!(kinds(&rows[3]), (Na, Edge));
        assert_eq!(kinds(&rows[4]), (Edge, Na));
    }
}

// -------------------------------------------------------------------------
// 2. Invariants over a mixed annotation
// -------------------------------------------------------------------------

mod invariants {
    use super::*;

    fn mixed() -> String {
        [
            "##gff-version 3\n".to_string(),
            cds("C1", 100, '+', "1"),
            cds("C1", 500, '+', "2"),
            cds("C1", 900, '-', "3"),
            rna("C1", 1300, '-', "t1"),
            cds("C1", 1500, '-', "4"),
            cds("C1", 1900, '-', "5"),
            cds("C1", 2300, '+', "6"),
            cds("C2", 10, '-', "7"),
            "C2\ttruncated\n".to_string(),
            cds("C2", 400, '+', "8"),
            cds("C2", 800, '+', "9"),
            cds("C3", 1, '+', "10"),
        ]
        .concat()
    }

    #[test]
    fn test_every_coding_feature_in_one_group() {
        let rows = annotate(&mixed());
        assert_eq!(rows.len(), 10);
        let ids: Vec<&str> = rows.iter().map(|r| r.feature.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
    }

    #[test]
    fn test_group_ids_contiguous_from_zero() {
        let rows = annotate(&mixed());
        let mut last = 0;
        for (idx, row) in rows.iter().enumerate() {
            if idx == 0 {
                assert_eq!(row.cugo, 0);
            } else {
                assert!(row.cugo == last || row.cugo == last + 1);
            }
            last = row.cugo;
        }
        assert_eq!(last, 6);
    }

    #[test]
    fn test_sizes_sum_to_feature_count() {
        let rows = annotate(&mixed());
        let mut seen = std::collections::BTreeMap::new();
        for row in &rows {
            seen.insert(row.cugo, row.size.unwrap());
        }
        let total: usize = seen.values().sum();
        assert_eq!(total, rows.len());

        for (cugo, size) in &seen {
            let members = rows.iter().filter(|r| r.cugo == *cugo).count();
            assert_eq!(members, *size);
        }
    }

    #[test]
    fn test_same_strand_neighbours_share_group() {
        let gff = mixed();
        let rows = annotate(&gff);
        // 1-2, 4-5 and 8-9 are consecutive same-strand coding pairs
        for (a, b) in [(0, 1), (3, 4), (7, 8)] {
            assert_eq!(rows[a].cugo, rows[b].cugo);
        }
        // 3 and 4 are separated by a tRNA
        assert_ne!(rows[2].cugo, rows[3].cugo);
    }

    #[test]
    fn test_contig_last_features_close_at_edge() {
        let rows = annotate(&mixed());
        for idx in [5, 8, 9] {
            assert_eq!(downstream_kind(&rows[idx]), Edge, "row {}", idx);
        }
    }

    #[test]
    fn test_strand_change_on_downstream_side() {
        let rows = annotate(&mixed());
        // 2 -> 3 and 5 -> 6 are same-contig strand reversals
        assert_eq!(downstream_kind(&rows[1]), Flip);
        assert_eq!(downstream_kind(&rows[4]), Flip);
    }

    #[test]
    fn test_rerun_on_own_output_is_idempotent() {
        let rows = annotate(&mixed());

        // Rebuild a coding-only annotation from the output rows
        let rebuilt: String = rows
            .iter()
            .map(|r| {
                format!(
                    "{}\tcugo\tCDS\t{}\t{}\t.\t{}\t0\tID={};x={}\n",
                    r.feature.parent,
                    r.feature.start,
                    r.feature.end,
                    r.feature.strand,
                    r.feature.id,
                    r.feature.tag
                )
            })
            .collect();
        let again = annotate(&rebuilt);

        // The tRNA break between 3 and 4 is gone; otherwise identical
        let merged: Vec<u64> = groups(&rows)
            .into_iter()
            .map(|g| if g >= 2 { g - 1 } else { g })
            .collect();
        assert_eq!(groups(&again), merged);

        let twice = annotate(
            &again
                .iter()
                .map(|r| {
                    format!(
                        "{}\tcugo\tCDS\t{}\t{}\t.\t{}\t0\tID={}\n",
                        r.feature.parent,
                        r.feature.start,
                        r.feature.end,
                        r.feature.strand,
                        r.feature.id
                    )
                })
                .collect::<String>(),
        );
        assert_eq!(groups(&twice), groups(&again));
    }
}

// -------------------------------------------------------------------------
// 3. Decision table and windows
// -------------------------------------------------------------------------

mod decision_table {
    use super::*;

    #[test]
    fn test_case_priority() {
        let c = classify(Relation::SequenceEdge, Relation::SequenceEdge, Strand::Positive);
        assert_eq!(c.case, Case::ContigStart);

        let c = classify(Relation::StrandChange, Relation::SequenceEdge, Strand::Positive);
        assert_eq!(c.case, Case::ContigEnd);

        let c = classify(Relation::StrandChange, Relation::StrandChange, Strand::Positive);
        assert_eq!(c.case, Case::StrandStart);
    }

    #[test]
    fn test_mirroring_swaps_sides() {
        let relations = [
            Relation::Continues,
            Relation::SequenceEdge,
            Relation::StrandChange,
        ];
        for left in relations {
            for right in relations {
                let fwd = classify(left, right, Strand::Positive);
                let rev = classify(left, right, Strand::Negative);
                assert_eq!(fwd.case, rev.case);
                assert_eq!((fwd.start, fwd.end), (rev.end, rev.start));
                assert_eq!(fwd.opens, left != Relation::Continues);
                assert_eq!(fwd.closes, right != Relation::Continues);
            }
        }
    }

    #[test]
    fn test_terminal_window_has_no_lookahead() {
        let gff = [cds("C1", 1, '+', "a"), cds("C1", 400, '+', "b")].concat();
        let reader = GffReader::new(BufReader::new(gff.as_bytes()), Config::default());
        let windows: Vec<_> = reader.windows().map(|w| w.unwrap()).collect();

        assert_eq!(windows[0].prev, Lookback::StartOfStream);
        assert_eq!(windows[1].next, Lookahead::EndOfStream);

        let reader = GffReader::new(BufReader::new(gff.as_bytes()), Config::default());
        let result = segment(reader.windows()).unwrap();
        assert_eq!(result.sizes.size_of(0), Some(2));
        assert!(result.sizes.open_group().is_none());
    }
}

// -------------------------------------------------------------------------
// 4. Output
// -------------------------------------------------------------------------

mod output {
    use super::*;

    #[test]
    fn test_table_rows() {
        let gff = [cds("C1", 100, '+', "g___1"), cds("C1", 500, '-', "g___2")].concat();
        let rows = annotate(&gff);

        assert_eq!(
            format_output_line(&rows[0]),
            "g_1\tC1\t100\t399\t300\t100\t+\tCOGg___1\t0\tsequence_edge\tstrand_change\t1"
        );

        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(2).unwrap().ends_with("\t1\tsequence_edge\tstrand_change\t1"));
    }

    #[test]
    fn test_extreme_coordinates() {
        let gff = format!("C1\tsrc\tCDS\t1\t{}\t.\t+\t0\tID=g1\n", u64::MAX);
        let rows = annotate(&gff);

        assert_eq!(rows[0].feature.nuc_length(), u64::MAX);
        assert!(format_output_line(&rows[0]).starts_with(&format!(
            "g1\tC1\t1\t{}\t{}\t{}\t+",
            u64::MAX,
            u64::MAX,
            u64::MAX / 3
        )));
    }

    #[test]
    fn test_negative_coordinate_rejected() {
        let gff = "C1\tsrc\tCDS\t-5\t300\t.\t+\t0\tID=g1\n";
        let result = cugo::annotate(BufReader::new(gff.as_bytes()), &Config::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_coding_type() {
        let gff = "C1\tsrc\tgene\t1\t300\t.\t+\t.\tID=a\nC1\tsrc\tCDS\t1\t300\t.\t+\t0\tID=a_cds\n";
        let mut config = Config::new();
        config.coding_feature_type = "gene".to_string();
        let rows = cugo::annotate(BufReader::new(gff.as_bytes()), &config).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].feature.id, "a");
    }
}
