use frame_metrics::aggregate::LineSource;
use frame_metrics::records::PacketRecord;
use frame_metrics::summary::{
    build_summary_table, format_summary_line, is_ascending_by_frame_size, upsert_summary_line,
    ConfigurationSummary, SummarySchema,
};
use std::fs;
use tempfile::tempdir;

const SUMMARY_LOG: &str = "\
Frame size: 1.25 | Average End to End:  18.250 | Average RTT:   3.125 | Average Inter-Arrival:   1.250 | Jitter:   0.210 | Unordered Packets: 0.00% | Lost Packets: 0.10%
Frame size:  2.50 | Average End to End:  19.500 | Average RTT:   3.500 | Average Inter-Arrival:   2.500 | Jitter:   0.300 | Unordered Packets: 0.10% | Lost Packets: 0.00%

Frame size:    5 | Average End to End:  21.000 | Average RTT:   4.000 | Average Inter-Arrival:   5.000 | Jitter:   0.400 | Unordered Packets: 0.00% | Lost Packets: 0.00%
Frame size:   10 | Average End to End:  25.000 | Average RTT:   4.500 | Average Inter-Arrival:  10.000 | Jitter:   0.500 | Unordered Packets: 0.00% | Lost Packets: 0.00%
Frame size:   20 | Average End to End:  33.000 | Average RTT:   5.000 | Average Inter-Arrival:  20.000 | Jitter:   0.600 | Unordered Packets: 0.00% | Lost Packets: 1.20%
";

#[test]
fn summary_log_from_disk_is_parsed_in_file_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SummarizedStats.txt");
    fs::write(&path, SUMMARY_LOG).unwrap();

    let lines = path.read_lines().unwrap();
    let rows = build_summary_table(&lines, SummarySchema::EndToEndExtended, "summary").unwrap();

    let sizes: Vec<f64> = rows.iter().map(|r| r.frame_size_ms).collect();
    assert_eq!(sizes, vec![1.25, 2.5, 5.0, 10.0, 20.0]);
    assert!(is_ascending_by_frame_size(&rows));
    assert_eq!(rows[4].lost_pct, Some(1.2));
    assert_eq!(rows[1].unordered_pct, Some(0.1));

    let again = build_summary_table(&lines, SummarySchema::EndToEndExtended, "summary").unwrap();
    assert_eq!(rows, again);

    // The RTT-only layout does not match extended rows
    let rtt_only = build_summary_table(&lines, SummarySchema::RttOnly, "summary").unwrap();
    assert!(rtt_only.is_empty());
}

#[test]
fn computed_summary_is_upserted_into_an_existing_log() {
    let lines: Vec<String> = SUMMARY_LOG.lines().map(str::to_string).collect();

    let records: Vec<PacketRecord> = (0..4)
        .map(|index| PacketRecord {
            index,
            end_to_end_micros: Some(30_000),
            rtt_micros: 6_000,
        })
        .collect();
    let summary =
        ConfigurationSummary::from_measurements(10.0, &records, &[10_000, 10_000]).unwrap();

    let updated = upsert_summary_line(&lines, &summary, SummarySchema::EndToEndExtended).unwrap();
    assert!(updated.contains(&format_summary_line(
        &summary,
        SummarySchema::EndToEndExtended
    )));

    let rows = build_summary_table(&updated, SummarySchema::EndToEndExtended, "updated").unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[3].frame_size_ms, 10.0);
    assert_eq!(rows[3].avg_rtt_ms, 6.0);
    assert_eq!(rows[3].avg_end_to_end_ms, Some(30.0));
    assert_eq!(rows[3].jitter_ms, 0.0);
    assert!(is_ascending_by_frame_size(&rows));
}
