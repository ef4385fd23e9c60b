//! Lookup Module Tests
//!
//! Validates address conversion, table construction and ordered resolution.
//!
//! ## Test Scopes
//! - **Codec**: Accepted and rejected address strings, key arithmetic.
//! - **IntervalTable**: Inclusive bounds, misses between ranges, sorting at build time.
//! - **Loader**: Quote stripping, absent vs empty values, fatal bound errors, diagnostics.
//! - **Engine**: Proxy-over-location precedence, not-found coverage, rejections, idempotence.

#[cfg(test)]
mod tests {
    use crate::lookup::codec::{format_ipv4, parse_ipv4};
    use crate::lookup::engine::{ResolutionEngine, TableSource};
    use crate::lookup::error::LoadError;
    use crate::lookup::loader::{load, load_path, record_fields};
    use crate::lookup::table::IntervalTable;
    use crate::lookup::types::{
        Coverage, FieldSchema, LOCATION_ATTRIBUTION, LookupOutcome, PROXY_ATTRIBUTION,
        RangeRecord, RejectReason, TableStats, TableTag,
    };
    use csv::StringRecord;
    use std::io::{Cursor, Write};
    use std::sync::Arc;

    fn name_schema() -> FieldSchema {
        FieldSchema::new(["name"])
    }

    fn named(from: u32, to: u32, name: &str) -> RangeRecord {
        RangeRecord::new(from, to, name_schema(), vec![Some(name.to_string())])
    }

    fn name_of(record: &RangeRecord) -> &str {
        record.get("name").flatten().unwrap()
    }

    fn engine_from(proxy: Vec<RangeRecord>, location: Vec<RangeRecord>) -> ResolutionEngine {
        ResolutionEngine::new(
            IntervalTable::from_records(proxy),
            IntervalTable::from_records(location),
        )
    }

    // ============================================================
    // CODEC TESTS
    // ============================================================

    #[test]
    fn test_parse_computes_big_endian_key() {
        assert_eq!(parse_ipv4("0.0.0.0"), Some(0));
        assert_eq!(parse_ipv4("1.2.3.4"), Some(16_909_060));
        assert_eq!(parse_ipv4("8.8.8.8"), Some(134_744_072));
        assert_eq!(parse_ipv4("255.255.255.255"), Some(u32::MAX));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in ["1.2.3", "1.2.3.4.5", "1.2.3.256", "a.b.c.d", ""] {
            assert_eq!(parse_ipv4(input), None, "{:?} should be rejected", input);
        }
    }

    #[test]
    fn test_parse_rejects_extraneous_characters() {
        for input in [
            "1.2.3.4 ", " 1.2.3.4", "1.2.3.+4", "1.2.3.-4", "1..3.4", "1.2.3.", "1.2.3.4x",
            "1.2.3.0004",
        ] {
            assert_eq!(parse_ipv4(input), None, "{:?} should be rejected", input);
        }
    }

    #[test]
    fn test_parse_accepts_leading_zeros() {
        assert_eq!(parse_ipv4("010.001.000.009"), parse_ipv4("10.1.0.9"));
    }

    #[test]
    fn test_format_reproduces_key() {
        for (a, b, c, d) in [(0, 0, 0, 0), (10, 0, 0, 1), (192, 168, 1, 254), (255, 255, 255, 255)]
        {
            let input = format!("{}.{}.{}.{}", a, b, c, d);
            let key = parse_ipv4(&input).unwrap();
            let formatted = format_ipv4(key);

            assert_eq!(formatted, input);
            assert_eq!(parse_ipv4(&formatted), Some(key));
        }
    }

    // ============================================================
    // INTERVAL TABLE TESTS
    // ============================================================

    #[test]
    fn test_find_inclusive_bounds_and_gaps() {
        let table = IntervalTable::from_records(vec![named(10, 20, "X"), named(30, 40, "Y")]);

        assert_eq!(table.find(15).map(name_of), Some("X"));
        assert_eq!(table.find(25).map(name_of), None);
        assert_eq!(table.find(35).map(name_of), Some("Y"));
        assert_eq!(table.find(20).map(name_of), Some("X"));
        assert_eq!(table.find(30).map(name_of), Some("Y"));
        assert_eq!(table.find(10).map(name_of), Some("X"));
        assert_eq!(table.find(40).map(name_of), Some("Y"));
    }

    #[test]
    fn test_find_outside_coverage() {
        let table = IntervalTable::from_records(vec![named(10, 20, "X"), named(30, 40, "Y")]);

        assert!(table.find(0).is_none());
        assert!(table.find(9).is_none());
        assert!(table.find(41).is_none());
        assert!(table.find(u32::MAX).is_none());
    }

    #[test]
    fn test_find_on_empty_table() {
        let table = IntervalTable::empty();

        assert!(table.is_empty());
        assert!(table.find(0).is_none());
        assert!(table.bounds().is_none());
    }

    #[test]
    fn test_build_sorts_by_lower_bound() {
        let table = IntervalTable::from_records(vec![
            named(50, 60, "C"),
            named(0, 9, "A"),
            named(10, 49, "B"),
        ]);

        let order: Vec<&str> = table.records().iter().map(name_of).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(table.bounds(), Some((0, 60)));
        assert_eq!(table.find(55).map(name_of), Some("C"));
    }

    #[test]
    fn test_find_across_many_ranges() {
        let records: Vec<RangeRecord> = (0..1000u32)
            .rev()
            .map(|i| named(i * 100, i * 100 + 49, &i.to_string()))
            .collect();
        let table = IntervalTable::from_records(records);

        for i in 0..1000u32 {
            let expected = i.to_string();
            assert_eq!(table.find(i * 100 + 25).map(name_of), Some(expected.as_str()));
            assert!(table.find(i * 100 + 75).is_none());
        }
    }

    #[test]
    fn test_find_covers_full_address_space() {
        let table = IntervalTable::from_records(vec![named(0, u32::MAX, "ALL")]);

        assert_eq!(table.find(0).map(name_of), Some("ALL"));
        assert_eq!(table.find(u32::MAX).map(name_of), Some("ALL"));
    }

    #[test]
    fn test_overlaps_detects_intersecting_neighbours() {
        let table = IntervalTable::from_records(vec![
            named(0, 10, "A"),
            named(5, 20, "B"),
            named(21, 30, "C"),
        ]);

        let overlaps: Vec<(&str, &str)> = table
            .overlaps()
            .map(|(a, b)| (name_of(a), name_of(b)))
            .collect();
        assert_eq!(overlaps, vec![("A", "B")]);
    }

    // ============================================================
    // LOADER TESTS
    // ============================================================

    #[test]
    fn test_record_fields_strips_quotes() {
        let row = StringRecord::from(vec![
            "\"16777216\"",
            "\"16777471\"",
            "US",
            "\"United States\"",
        ]);

        assert_eq!(
            record_fields(&row),
            vec!["16777216", "16777471", "US", "United States"]
        );
    }

    #[test]
    fn test_load_does_not_honour_quoted_commas() {
        let schema = FieldSchema::new(["region", "city"]);
        let source = "\"1\",\"2\",\"Washington, D.C.\"\n";
        let (table, _) = load(Cursor::new(source), &schema).unwrap();
        let record = table.find(1).unwrap();

        assert_eq!(record.get("region"), Some(Some("Washington")));
        assert_eq!(record.get("city"), Some(Some(" D.C.")));
    }

    #[test]
    fn test_load_strips_byte_order_mark() {
        let source = "\u{feff}\"1\",\"10\",\"a\"\n\"11\",\"20\",\"b\"\n";
        let (table, report) = load(Cursor::new(source), &name_schema()).unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.bounds, Some((1, 20)));
        assert_eq!(table.find(5).map(name_of), Some("a"));
    }

    #[test]
    fn test_load_skips_whitespace_only_lines() {
        let source = "1,2,A\n   \n3,4,B\n";
        let (table, report) = load(Cursor::new(source), &name_schema()).unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(table.find(3).map(name_of), Some("B"));
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let source: &[u8] = b"1,2,\xff\xfe\n";
        let err = load(source, &name_schema()).unwrap_err();

        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_load_parses_and_sorts() {
        let source = "\"30\",\"40\",\"Y\"\n\"10\",\"20\",\"X\"\n";
        let (table, report) = load(Cursor::new(source), &name_schema()).unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.bounds, Some((10, 40)));
        assert_eq!(report.overlaps, 0);
        assert_eq!(table.records()[0].from, 10);
        assert_eq!(table.find(35).map(name_of), Some("Y"));
    }

    #[test]
    fn test_load_distinguishes_absent_from_empty() {
        let schema = FieldSchema::new(["a", "b", "c"]);
        let source = "\"1\",\"2\",\"-\",\"\",\"value\"\n";
        let (table, _) = load(Cursor::new(source), &schema).unwrap();
        let record = table.find(1).unwrap();

        assert_eq!(record.get("a"), Some(None));
        assert_eq!(record.get("b"), Some(Some("")));
        assert_eq!(record.get("c"), Some(Some("value")));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_load_preserves_column_order() {
        let schema = FieldSchema::new(["first", "second"]);
        let (table, _) = load(Cursor::new("0,5,one,two\n"), &schema).unwrap();

        let attrs: Vec<(&str, Option<&str>)> = table.records()[0].attributes().collect();
        assert_eq!(attrs, vec![("first", Some("one")), ("second", Some("two"))]);
    }

    #[test]
    fn test_load_handles_crlf_and_blank_lines() {
        let source = "\"1\",\"2\",\"A\"\r\n\r\n\"3\",\"4\",\"B\"\r\n";
        let (table, report) = load(Cursor::new(source), &name_schema()).unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(table.find(4).map(name_of), Some("B"));
    }

    #[test]
    fn test_load_short_rows_pad_absent() {
        let schema = FieldSchema::new(["a", "b"]);
        let (table, report) = load(Cursor::new("1,2,x\n3,4,y,z,extra\n"), &schema).unwrap();

        assert_eq!(report.short_rows, 1);
        assert_eq!(table.find(1).unwrap().get("b"), Some(None));
        assert_eq!(table.find(3).unwrap().get("b"), Some(Some("z")));
    }

    #[test]
    fn test_load_reports_overlaps_without_failing() {
        let source = "0,10,A\n5,20,B\n30,40,C\n";
        let (table, report) = load(Cursor::new(source), &name_schema()).unwrap();

        assert_eq!(report.rows, 3);
        assert_eq!(report.overlaps, 1);
        assert_eq!(table.find(35).map(name_of), Some("C"));
    }

    #[test]
    fn test_load_rejects_non_numeric_bound() {
        let err = load(Cursor::new("1,2,A\nabc,4,B\n"), &name_schema()).unwrap_err();

        match err {
            LoadError::InvalidBound { line, field, value } => {
                assert_eq!(line, 2);
                assert_eq!(field, "from");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_bound_beyond_address_space() {
        let err = load(Cursor::new("0,4294967296,A\n"), &name_schema()).unwrap_err();

        assert!(matches!(err, LoadError::InvalidBound { field: "to", .. }));
    }

    #[test]
    fn test_load_rejects_missing_bound() {
        let err = load(Cursor::new("12345\n"), &name_schema()).unwrap_err();

        assert!(matches!(err, LoadError::MissingBound { line: 1 }));
    }

    #[test]
    fn test_load_rejects_inverted_bounds() {
        let err = load(Cursor::new("20,10,A\n"), &name_schema()).unwrap_err();

        assert!(matches!(
            err,
            LoadError::InvertedBounds {
                line: 1,
                from: 20,
                to: 10
            }
        ));
    }

    #[test]
    fn test_load_empty_source() {
        let (table, report) = load(Cursor::new(""), &name_schema()).unwrap();

        assert!(table.is_empty());
        assert_eq!(report.rows, 0);
        assert_eq!(report.bounds, None);
    }

    #[test]
    fn test_load_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"0\",\"16777215\",\"-\"").unwrap();
        writeln!(file, "\"16777216\",\"16777471\",\"AU\"").unwrap();

        let (table, report) = load_path(file.path(), &name_schema()).unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(table.find(parse_ipv4("1.0.0.1").unwrap()).map(name_of), Some("AU"));
        assert_eq!(table.find(5).unwrap().get("name"), Some(None));
    }

    #[test]
    fn test_load_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.csv");

        let err = load_path(&path, &name_schema()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_standard_schemas_have_expected_widths() {
        assert_eq!(FieldSchema::proxy().len(), 13);
        assert_eq!(FieldSchema::location().len(), 20);
        assert_eq!(FieldSchema::proxy().position("proxyType"), Some(0));
        assert_eq!(FieldSchema::location().position("usageType"), Some(19));
    }

    // ============================================================
    // ENGINE TESTS
    // ============================================================

    #[test]
    fn test_resolve_prefers_proxy_table() {
        let engine = engine_from(vec![named(0, 100, "proxy")], vec![named(0, 100, "location")]);

        match engine.resolve("0.0.0.50") {
            LookupOutcome::Matched {
                tag,
                attribution,
                record,
            } => {
                assert_eq!(tag, TableTag::Proxy);
                assert_eq!(attribution, PROXY_ATTRIBUTION);
                assert_eq!(name_of(record), "proxy");
            }
            other => panic!("expected proxy match, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_falls_back_to_location() {
        let engine = engine_from(vec![named(0, 10, "proxy")], vec![named(0, 100, "location")]);

        match engine.resolve("0.0.0.50") {
            LookupOutcome::Matched {
                tag,
                attribution,
                record,
            } => {
                assert_eq!(tag, TableTag::Location);
                assert_eq!(attribution, LOCATION_ATTRIBUTION);
                assert_eq!(name_of(record), "location");
            }
            other => panic!("expected location match, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_not_found_reports_coverage() {
        let engine = engine_from(vec![named(10, 20, "p")], vec![named(30, 40, "l")]);

        assert_eq!(
            engine.resolve("0.0.0.50"),
            LookupOutcome::NotFound {
                key: 50,
                coverage: vec![
                    Coverage {
                        tag: TableTag::Proxy,
                        bounds: Some((10, 20)),
                    },
                    Coverage {
                        tag: TableTag::Location,
                        bounds: Some((30, 40)),
                    },
                ],
            }
        );
    }

    #[test]
    fn test_resolve_not_found_with_empty_table() {
        let engine = engine_from(vec![], vec![named(30, 40, "l")]);

        match engine.resolve("0.0.0.1") {
            LookupOutcome::NotFound { coverage, .. } => {
                assert_eq!(coverage[0].to_string(), "unknown");
                assert_eq!(coverage[1].to_string(), "30 - 40");
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_rejects_sentinels_before_probing() {
        // Both tables cover every key, so any lookup would match.
        let engine = engine_from(vec![named(0, u32::MAX, "p")], vec![named(0, u32::MAX, "l")]);

        for input in ["", "127.0.0.1", "localhost"] {
            assert_eq!(
                engine.resolve(input),
                LookupOutcome::Rejected(RejectReason::NoAddress),
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_resolve_rejects_invalid_format() {
        let engine = engine_from(vec![named(0, u32::MAX, "p")], vec![]);

        for input in ["1.2.3", "1.2.3.256", "::1", "example.com"] {
            assert_eq!(
                engine.resolve(input),
                LookupOutcome::Rejected(RejectReason::InvalidFormat),
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_resolve_other_loopback_addresses_are_looked_up() {
        let engine = engine_from(vec![], vec![named(0x7F00_0000, 0x7FFF_FFFF, "loop")]);

        assert!(matches!(
            engine.resolve("127.0.0.2"),
            LookupOutcome::Matched {
                tag: TableTag::Location,
                ..
            }
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let engine = engine_from(vec![named(10, 20, "p")], vec![named(0, 100, "l")]);

        for input in ["0.0.0.15", "0.0.0.50", "0.0.1.0", "bogus", ""] {
            let first = engine.resolve(input);
            for _ in 0..5 {
                assert_eq!(engine.resolve(input), first);
            }
        }
    }

    #[test]
    fn test_resolve_with_custom_lookup_order() {
        let engine = ResolutionEngine::with_sources(vec![
            TableSource {
                tag: TableTag::Location,
                table: IntervalTable::from_records(vec![named(0, 100, "l")]),
                attribution: LOCATION_ATTRIBUTION,
            },
            TableSource {
                tag: TableTag::Proxy,
                table: IntervalTable::from_records(vec![named(0, 100, "p")]),
                attribution: PROXY_ATTRIBUTION,
            },
        ]);

        assert!(matches!(
            engine.resolve_key(5),
            LookupOutcome::Matched {
                tag: TableTag::Location,
                ..
            }
        ));
    }

    #[test]
    fn test_entries_per_table() {
        let engine = engine_from(vec![named(0, 1, "a"), named(2, 3, "b")], vec![named(0, 1, "c")]);

        assert_eq!(engine.entries(TableTag::Proxy), 2);
        assert_eq!(engine.entries(TableTag::Location), 1);
    }

    #[test]
    fn test_stats_per_table_in_lookup_order() {
        let engine = engine_from(vec![named(10, 20, "a"), named(0, 5, "b")], vec![]);

        assert_eq!(
            engine.stats(),
            vec![
                TableStats {
                    tag: TableTag::Proxy,
                    rows: 2,
                    bounds: Some((0, 20)),
                },
                TableStats {
                    tag: TableTag::Location,
                    rows: 0,
                    bounds: None,
                },
            ]
        );
        assert_eq!(engine.stats()[0].coverage().to_string(), "0 - 20");
        assert_eq!(engine.stats()[1].coverage().to_string(), "unknown");
    }

    #[tokio::test]
    async fn test_engine_load_from_files() {
        let mut proxy = tempfile::NamedTempFile::new().unwrap();
        writeln!(proxy, "\"16777216\",\"16777471\",\"VPN\",\"AU\"").unwrap();
        let mut location = tempfile::NamedTempFile::new().unwrap();
        writeln!(location, "\"0\",\"4294967295\",\"US\"").unwrap();

        let engine =
            ResolutionEngine::load(proxy.path().to_path_buf(), location.path().to_path_buf())
                .await
                .unwrap();

        assert_eq!(engine.entries(TableTag::Proxy), 1);
        assert_eq!(engine.entries(TableTag::Location), 1);
        match engine.resolve("1.0.0.1") {
            LookupOutcome::Matched { tag, record, .. } => {
                assert_eq!(tag, TableTag::Proxy);
                assert_eq!(record.get("proxyType"), Some(Some("VPN")));
                assert_eq!(record.get("provider"), Some(None));
            }
            other => panic!("expected proxy match, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_engine_load_failure_names_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut location = tempfile::NamedTempFile::new().unwrap();
        writeln!(location, "0,10,US").unwrap();

        let missing = dir.path().join("missing.csv");
        let err = ResolutionEngine::load(missing, location.path().to_path_buf())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to load IP2Proxy database");
        let io_cause = err
            .chain()
            .any(|cause| matches!(cause.downcast_ref::<LoadError>(), Some(LoadError::Io { .. })));
        assert!(io_cause);
    }

    #[test]
    fn test_concurrent_resolution() {
        let engine = Arc::new(engine_from(
            vec![named(0, 999, "p")],
            vec![named(1000, 1999, "l")],
        ));

        std::thread::scope(|scope| {
            for t in 0..8u32 {
                let engine = engine.clone();
                scope.spawn(move || {
                    for i in 0..500u32 {
                        let key = (t * 500 + i) % 3000;
                        match engine.resolve_key(key) {
                            LookupOutcome::Matched { tag, .. } if key < 1000 => {
                                assert_eq!(tag, TableTag::Proxy)
                            }
                            LookupOutcome::Matched { tag, .. } if key < 2000 => {
                                assert_eq!(tag, TableTag::Location)
                            }
                            LookupOutcome::NotFound { .. } => assert!(key >= 2000),
                            other => panic!("unexpected outcome for {}: {:?}", key, other),
                        }
                    }
                });
            }
        });
    }
}
