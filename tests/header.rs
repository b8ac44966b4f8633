mod support;

use crex::{
    DecodeError,
    avec::{DecodeOptions, decode_header, decode_slice},
    table::TableError,
    value::Vartype,
};

use support::{T000201, code, tables};

fn decode(data: &[u8]) -> Result<crex::Bulletin, DecodeError> {
    decode_slice(data, &mut tables(), &DecodeOptions::new())
}

#[test]
fn single_missing_value() {
    let bulletin = decode(b"CREX++T000201A012B12101++/++7777").unwrap();

    assert_eq!(bulletin.master_table_number(), 0);
    assert_eq!(bulletin.edition(), 2);
    assert_eq!(bulletin.table(), 1);
    assert_eq!(bulletin.category(), 12);
    assert_eq!(bulletin.subtype(), 255);
    assert_eq!(bulletin.localsubtype(), 0);
    assert_eq!(bulletin.datadesc(), [code("B12101")]);

    let [subset] = bulletin.subsets() else {
        panic!("expected one subset");
    };
    let [var] = &subset[..] else {
        panic!("expected one variable");
    };
    assert_eq!(var.code(), code("B12101"));
    assert!(!var.isset());
}

#[test]
fn descriptor_list_needs_terminator_before_data() {
    let err = decode(b"CREX++T000201A012B12101/+++7777").unwrap_err();
    assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
}

#[test]
fn edition_round_trips() {
    for (token, expected) in [("T000201", (0, 2, 1)), ("T980713", (98, 7, 13)), ("T000000", (0, 0, 0))] {
        let data = format!("CREX++{token} A012 ++");
        let header = decode_header(data.as_bytes(), &mut AnyTable, &DecodeOptions::new()).unwrap();

        let version = header.version;
        assert_eq!(
            (version.master_table_number, version.edition, version.table),
            expected
        );
        assert_eq!(version.to_string(), token);
    }
}

#[test]
fn malformed_edition() {
    for token in ["Txx0101", "T00020", "T0002010", "X000201"] {
        let data = format!("CREX++{token} A012 B12101 ++/++7777");
        let err = decode(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }), "{token}: {err}");
    }
}

#[test]
fn category_forms() {
    let header = decode_header(b"CREX++T000201A012++", &mut tables(), &DecodeOptions::new()).unwrap();
    assert_eq!(header.category.category, 12);
    assert_eq!(header.category.subtype, 255);
    assert_eq!(header.category.localsubtype, 0);

    let header =
        decode_header(b"CREX++T000201A012034++", &mut tables(), &DecodeOptions::new()).unwrap();
    assert_eq!(header.category.category, 12);
    assert_eq!(header.category.subtype, 255);
    assert_eq!(header.category.localsubtype, 34);
}

#[test]
fn overlong_header_tokens() {
    for data in [
        &b"CREX++T000201000000 A012 B12101 ++/++7777"[..],
        b"CREX++T000201 A012034000000000000000 B12101 ++/++7777",
    ] {
        let err = decode(data).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
        assert!(err.to_string().contains("is longer than"), "{err}");
    }
}

#[test]
fn malformed_category() {
    for token in ["A01", "A0123", "A0120345", "A01X", "012"] {
        let data = format!("CREX++T000201 {token} B12101 ++/++7777");
        let err = decode(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }), "{token}: {err}");
    }
}

#[test]
fn descriptor_list_is_stable() {
    let data = b"CREX++T000201A012 D01001 R01002 B12101 B01015 E ++";

    let first = decode_header(data, &mut tables(), &DecodeOptions::new()).unwrap();
    let second = decode_header(data, &mut tables(), &DecodeOptions::new()).unwrap();

    assert_eq!(first, second);
    assert!(first.has_check_digit);
    assert_eq!(
        first.datadesc,
        [code("D01001"), code("R01002"), code("B12101"), code("B01015")]
    );
}

#[test]
fn bad_indicator() {
    let err = decode(b"BUFR++T000201A012B12101++/++7777").unwrap_err();
    assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
}

#[test]
fn unexpected_byte_in_descriptor_list() {
    let err = decode(b"CREX++T000201A012 B12101 X12101 ++/++7777").unwrap_err();
    assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
}

#[test]
fn lone_plus_ends_descriptor_list() {
    let err = decode(b"CREX++T000201A012B12101+/++7777").unwrap_err();
    assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
}

#[test]
fn unterminated_descriptor_list() {
    for data in [
        &b"CREX++T000201A012B12101"[..],
        b"CREX++T000201A012B121",
        b"CREX++T000201A012 ",
        b"CREX++T000201",
        b"CREX+",
    ] {
        let err = decode(data).unwrap_err();
        assert!(matches!(err, DecodeError::Framing { .. }), "{err}");
    }
}

#[test]
fn missing_terminator() {
    for data in [
        &b"CREX++T000201A012B12101++/++"[..],
        b"CREX++T000201A012B12101++/++777",
        b"CREX++T000201A012B12101++/++7778",
        b"CREX++T000201A012B12101++/++SUPP ++",
    ] {
        let err = decode(data).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
    }
}

#[test]
fn supplement_is_skipped() {
    let err = decode(b"CREX++T000201A012B12101++2735++ SUPP 12 ++ 34 ++ 7777").unwrap_err();
    assert!(matches!(err, DecodeError::Parse { .. }), "{err}");

    let bulletin = decode(b"CREX++T000201A012B12101++2735++ SUPP 12 + 34 ++ 7777").unwrap();
    assert_eq!(bulletin.subsets()[0][0].enqd(), Ok(27.35));
}

#[test]
fn error_locations() {
    let options = DecodeOptions::new().with_fname("bulletin.crex").with_offset(1000);
    let err = decode_slice(b"CREX++T000201A012B12101++X++7777", &mut tables(), &options)
        .unwrap_err();

    let location = err.location();
    assert_eq!(location.fname.as_deref(), Some("bulletin.crex"));
    assert_eq!(location.offset, 1025);
    assert_eq!(location.section, 2);
    assert!(err.to_string().starts_with("bulletin.crex:1025 (section 2): "));
}

#[test]
fn unknown_table() {
    let err = decode(b"CREX++T000999A012B12101++/++7777").unwrap_err();
    assert!(
        matches!(err, DecodeError::Table { source: TableError::UnknownTable(_), .. }),
        "{err}"
    );
}

#[test]
fn unknown_element() {
    let err = decode(b"CREX++T000201A012B12102++/++7777").unwrap_err();
    assert!(
        matches!(err, DecodeError::Table { source: TableError::UnknownElement { .. }, .. }),
        "{err}"
    );

    let err = decode(b"CREX++T000201A012D01002++/++7777").unwrap_err();
    assert!(
        matches!(err, DecodeError::Table { source: TableError::UnknownSequence { .. }, .. }),
        "{err}"
    );
}

#[test]
fn operators_are_unsupported() {
    let err = decode(b"CREX++T000201A012C01002 B12101++/++7777").unwrap_err();
    assert!(
        matches!(err, DecodeError::Unsupported { code, .. } if code == support::code("C01002")),
        "{err}"
    );
}

#[test]
fn replication() {
    let bulletin = decode(b"CREX++T000201A012 R02002 B04004 B12101 ++ 00 2735 06 //// ++ 7777").unwrap();
    let codes: Vec<_> = bulletin.subsets()[0].iter().map(|v| v.code().to_string()).collect();
    assert_eq!(codes, ["B04004", "B12101", "B04004", "B12101"]);

    let bulletin = decode(b"CREX++T000201A012 R01000 B12101 ++ 003 1 2 3 + 000 ++ 7777").unwrap();
    let [first, second] = bulletin.subsets() else {
        panic!("expected two subsets");
    };
    assert_eq!(first.len(), 4);
    assert_eq!(first.find(code("B31001")).unwrap().enqi(), Ok(3));
    assert_eq!(first.find_all(code("B12101")).count(), 3);
    assert_eq!(second.len(), 1);
}

#[test]
fn bad_replication() {
    for data in [
        &b"CREX++T000201A012 R02002 B12101 ++ 1 ++ 7777"[..],
        b"CREX++T000201A012 R01000 B12101 ++ / ++ 7777",
        b"CREX++T000201A012 R01000 B12101 ++ -01 ++ 7777",
    ] {
        let err = decode(data).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
    }
}

#[test]
fn check_digit_mismatch() {
    let err = decode(b"CREX++T000201A012 B12101 B12101 E ++ 12735 32735 ++ 7777").unwrap_err();
    assert!(matches!(err, DecodeError::Parse { .. }), "{err}");
    assert!(err.to_string().contains("expected 2"), "{err}");
}

#[test]
fn check_digit_wraps() {
    let data = b"CREX++T000201A012 R01012 B04004 E ++ 101 202 303 404 505 606 707 808 909 000 111 212 ++ 7777";
    let bulletin = decode(data).unwrap();

    let hours: Vec<_> = bulletin.subsets()[0].iter().map(|v| v.enqi().unwrap()).collect();
    assert_eq!(hours, [1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 11, 12]);
}

#[test]
fn text_values_have_declared_length() {
    let name = "MILANO LINATE       ";
    assert_eq!(name.len(), 20);

    let data = format!("CREX++T000201A012 B01015 ++{name}++7777");
    let bulletin = decode(data.as_bytes()).unwrap();
    let var = &bulletin.subsets()[0][0];
    assert_eq!(var.info().kind, Vartype::String);
    assert_eq!(var.enqc(), Ok(name));

    // One byte longer leaves a byte before the end of the subset.
    let data = format!("CREX++T000201A012 B01015 ++{name}X++7777");
    assert!(decode(data.as_bytes()).is_err());

    // One byte shorter runs into the end of the data section.
    let data = format!("CREX++T000201A012 B01015 ++{}++7777", &name[..19]);
    assert!(decode(data.as_bytes()).is_err());
}

#[test]
fn missing_text_spans_declared_length() {
    let bulletin = decode(b"CREX++T000201A012 B01015 B01001 ++/ABCDEFGHIJKLMNOPQRS 16++7777").unwrap();

    let [name, block] = &bulletin.subsets()[0][..] else {
        panic!("expected two variables");
    };
    assert_eq!(name.code(), code("B01015"));
    assert!(!name.isset());
    assert_eq!(block.enqi(), Ok(16));

    // A short run of slashes does not stand in for the whole text value.
    let err = decode(b"CREX++T000201A012 B01015 B01001 ++//// 16++7777").unwrap_err();
    assert!(matches!(err, DecodeError::Framing { .. }), "{err}");
}

#[test]
fn missing_values_of_every_kind() {
    let data = format!("CREX++T000201A012 B01001 B12101 B01015 B33002 ++ / / {:<20} // ++ 7777", "/");
    let bulletin = decode(data.as_bytes()).unwrap();

    assert_eq!(bulletin.subsets()[0].len(), 4);
    assert!(bulletin.subsets()[0].iter().all(|v| !v.isset()));
}

#[test]
fn header_only() {
    let header = decode_header(b"CREX++T000201A012B12101++", &mut tables(), &DecodeOptions::new())
        .unwrap();
    assert_eq!(header.version, T000201);
    assert_eq!(header.table_key().version, T000201);
}

/// A resolver accepting every table version, and resolving nothing.
struct AnyTable;

impl crex::table::Resolver for AnyTable {
    fn load(&mut self, _: &crex::table::TableVersion) -> Result<(), TableError> {
        Ok(())
    }

    fn element(
        &self,
        key: &crex::table::TableKey,
        code: crex::Varcode,
    ) -> Result<std::sync::Arc<crex::Varinfo>, TableError> {
        Err(TableError::UnknownElement {
            version: key.version,
            code,
        })
    }

    fn sequence(
        &self,
        key: &crex::table::TableKey,
        code: crex::Varcode,
    ) -> Result<&[crex::Varcode], TableError> {
        Err(TableError::UnknownSequence {
            version: key.version,
            code,
        })
    }
}
