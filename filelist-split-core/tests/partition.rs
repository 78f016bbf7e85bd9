use std::path::PathBuf;

use filelist_split_core::bins::Bin;
use filelist_split_core::contract::{BinConfig, BinWriter, Item, MockBinWriter};
use filelist_split_core::error::{InputError, PartitionError};
use filelist_split_core::partition::{partition, Partitioner};

/// What a writer saw of a closed bin.
#[derive(Debug, Clone)]
struct Written {
    paths: Vec<String>,
    size: u64,
    oversized: bool,
}

#[derive(Default)]
struct RecordingWriter {
    bins: Vec<Written>,
}

impl BinWriter for RecordingWriter {
    fn write_bin(&mut self, bin: &Bin) -> std::io::Result<PathBuf> {
        self.bins.push(Written {
            paths: bin.items().iter().map(|i| i.path().to_owned()).collect(),
            size: bin.cumulative_size(),
            oversized: bin.is_oversized(),
        });
        Ok(PathBuf::from(format!("{}.filelist", bin.id())))
    }
}

fn config(max_size: u64, max_count: usize, fill_ratio: f64) -> BinConfig {
    BinConfig {
        max_size,
        max_count,
        fill_ratio,
        allow_oversized: true,
    }
}

fn items(list: &[(u64, &str)]) -> Vec<Result<Item, InputError>> {
    list.iter()
        .map(|(size, path)| Ok(Item::new(*path, *size)))
        .collect()
}

fn sorted_groups(writer: &RecordingWriter) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = writer.bins.iter().map(|b| b.paths.clone()).collect();
    groups.sort();
    groups
}

#[test]
fn test_simple_first_fit_packing() {
    let mut writer = RecordingWriter::default();
    let outcome = partition(
        items(&[(60, "A"), (50, "B"), (10, "C")]),
        config(100, 10, 1.0),
        &mut writer,
    )
    .expect("partition should succeed");

    assert_eq!(outcome.items, 3);
    assert_eq!(outcome.total_bytes, 120);
    assert_eq!(outcome.bins_written, 2);

    let a_bin = writer.bins.iter().find(|b| b.paths[0] == "A").unwrap();
    assert_eq!(a_bin.paths, ["A", "C"]);
    assert_eq!(a_bin.size, 70);
    let b_bin = writer.bins.iter().find(|b| b.paths[0] == "B").unwrap();
    assert_eq!(b_bin.paths, ["B"]);
    assert_eq!(b_bin.size, 50);
}

#[test]
fn test_oversized_item_gets_its_own_bin() {
    let mut writer = RecordingWriter::default();
    partition(items(&[(500, "X")]), config(100, 10, 1.0), &mut writer).unwrap();

    assert_eq!(writer.bins.len(), 1);
    assert_eq!(writer.bins[0].paths, ["X"]);
    assert_eq!(writer.bins[0].size, 500);
    assert!(writer.bins[0].oversized);
}

#[test]
fn test_oversized_bin_closed_immediately() {
    let mut writer = RecordingWriter::default();
    let mut partitioner = Partitioner::new(config(100, 10, 1.0), &mut writer).unwrap();

    partitioner.push(Item::new("X", 500)).unwrap();
    assert!(partitioner.open_bins().is_empty());

    partitioner.push(Item::new("y", 5)).unwrap();
    let open: Vec<&str> = partitioner
        .open_bins()
        .iter()
        .flat_map(|b| b.items().iter().map(Item::path))
        .collect();
    assert_eq!(open, ["y"]);

    partitioner.finish().unwrap();
    assert_eq!(writer.bins.len(), 2);
    assert_eq!(writer.bins[0].paths, ["X"]);
    assert!(writer.bins[0].oversized);
    assert_eq!(writer.bins[1].paths, ["y"]);
}

#[test]
fn test_new_bin_past_soft_threshold_admits_nothing_more() {
    let mut writer = RecordingWriter::default();
    let mut partitioner = Partitioner::new(config(100, 10, 0.5), &mut writer).unwrap();

    // 55 >= 100 * 0.5 on the very first item.
    partitioner.push(Item::new("a", 55)).unwrap();
    assert!(partitioner.open_bins().is_empty());

    partitioner.push(Item::new("b", 10)).unwrap();
    partitioner.finish().unwrap();

    assert_eq!(
        sorted_groups(&writer),
        vec![vec!["a".to_string()], vec!["b".to_string()]]
    );
}

#[test]
fn test_soft_closure_stops_admitting_items() {
    let mut writer = RecordingWriter::default();
    let mut partitioner = Partitioner::new(config(100, 10, 0.5), &mut writer).unwrap();

    partitioner.push(Item::new("a", 30)).unwrap();
    // "b" brings the bin to 55, past the soft threshold: closed right away.
    partitioner.push(Item::new("b", 25)).unwrap();
    assert!(partitioner.open_bins().is_empty());

    partitioner.push(Item::new("c", 10)).unwrap();
    partitioner.finish().unwrap();

    assert_eq!(writer.bins.len(), 2);
    assert_eq!(writer.bins[0].paths, ["a", "b"]);
    assert_eq!(writer.bins[0].size, 55);
    assert_eq!(writer.bins[1].paths, ["c"]);
}

#[test]
fn test_count_limit_closes_bins() {
    let mut writer = RecordingWriter::default();
    let input: Vec<(u64, String)> = (0..7).map(|i| (1, format!("f{i}"))).collect();
    let input: Vec<(u64, &str)> = input.iter().map(|(s, p)| (*s, p.as_str())).collect();

    partition(items(&input), config(1_000, 3, 1.0), &mut writer).unwrap();

    assert_eq!(
        sorted_groups(&writer),
        vec![
            vec!["f0".to_string(), "f1".into(), "f2".into()],
            vec!["f3".to_string(), "f4".into(), "f5".into()],
            vec!["f6".to_string()],
        ]
    );
}

#[test]
fn test_first_fit_prefers_oldest_open_bin() {
    let mut writer = RecordingWriter::default();
    // Two bins are open after "a" and "b"; "c" fits both and must go to the first.
    partition(
        items(&[(70, "a"), (70, "b"), (20, "c")]),
        config(100, 10, 1.0),
        &mut writer,
    )
    .unwrap();

    let a_bin = writer.bins.iter().find(|b| b.paths[0] == "a").unwrap();
    assert_eq!(a_bin.paths, ["a", "c"]);
}

#[test]
fn test_placement_is_reproducible() {
    let input = items(&[
        (40, "a"),
        (70, "b"),
        (30, "c"),
        (90, "d"),
        (10, "e"),
        (55, "f"),
        (5, "g"),
    ]);
    let rerun = || {
        let mut writer = RecordingWriter::default();
        let input: Vec<Result<Item, InputError>> = input
            .iter()
            .map(|r| Ok(r.as_ref().unwrap().clone()))
            .collect();
        partition(input, config(100, 3, 0.9), &mut writer).unwrap();
        sorted_groups(&writer)
    };
    assert_eq!(rerun(), rerun());
}

#[test]
fn test_unplaceable_item_is_fatal_when_oversized_disabled() {
    let mut cfg = config(100, 10, 1.0);
    cfg.allow_oversized = false;
    let mut writer = RecordingWriter::default();

    let err = partition(items(&[(10, "ok"), (101, "huge")]), cfg, &mut writer).unwrap_err();
    match err {
        PartitionError::Unplaceable {
            path,
            size,
            max_size,
        } => {
            assert_eq!(path, "huge");
            assert_eq!(size, 101);
            assert_eq!(max_size, 100);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_config_rejected_before_processing() {
    let mut writer = MockBinWriter::new();
    writer.expect_write_bin().never();

    for cfg in [
        config(0, 10, 1.0),
        config(100, 0, 1.0),
        config(100, 10, 0.0),
        config(100, 10, f64::NAN),
    ] {
        let err = partition(items(&[(1, "a")]), cfg, &mut writer).unwrap_err();
        assert!(matches!(err, PartitionError::InvalidConfig { .. }), "got {err:?}");
    }
}

#[test]
fn test_input_error_aborts_run() {
    let mut writer = MockBinWriter::new();
    writer.expect_write_bin().never();

    let input = vec![
        Ok(Item::new("a", 1)),
        Err(InputError::InvalidSize {
            line: 2,
            value: "x".into(),
        }),
        Ok(Item::new("c", 1)),
    ];
    let err = partition(input, config(100, 10, 1.0), &mut writer).unwrap_err();
    assert!(matches!(
        err,
        PartitionError::Input(InputError::InvalidSize { line: 2, .. })
    ));
}

#[test]
fn test_each_bin_written_exactly_once() {
    let mut writer = MockBinWriter::new();
    writer
        .expect_write_bin()
        .times(2)
        .returning(|bin| Ok(PathBuf::from(bin.id().to_string())));

    partition(
        items(&[(60, "A"), (50, "B"), (10, "C")]),
        config(100, 10, 1.0),
        &mut writer,
    )
    .unwrap();
}

#[test]
fn test_write_failure_is_fatal() {
    let mut writer = MockBinWriter::new();
    writer
        .expect_write_bin()
        .times(1)
        .returning(|_| Err(std::io::Error::other("disk full")));

    let err = partition(items(&[(10, "a")]), config(100, 10, 1.0), &mut writer).unwrap_err();
    assert!(matches!(err, PartitionError::Write { .. }));
}

#[test]
fn test_empty_input_writes_nothing() {
    let mut writer = RecordingWriter::default();
    let outcome = partition(items(&[]), config(100, 10, 1.0), &mut writer).unwrap();
    assert_eq!(outcome.items, 0);
    assert_eq!(outcome.bins_written, 0);
    assert!(writer.bins.is_empty());
    assert!(outcome.stats.summarize().is_err());
}
