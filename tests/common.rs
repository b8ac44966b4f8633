#![cfg(feature = "std")]

mod support;

use std::path::Path;

use crex::{
    Bulletin,
    avec::{DecodeOptions, messages},
};
use csv::ReaderBuilder;

#[test]
fn decode_slice_synop() {
    const PATH: &str = "fixtures/synop.crex";
    let data = std::fs::read(PATH).unwrap();
    let options = DecodeOptions::new().with_fname(PATH);
    let bulletin = crex::avec::decode_slice(&data, &mut support::tables(), &options).unwrap();

    assert_eq!(bulletin.fname(), Some(PATH));
    assert_eq!(bulletin.master_table_number(), 0);
    assert_eq!(bulletin.edition(), 1);
    assert_eq!(bulletin.table(), 3);
    assert_eq!(bulletin.category(), 0);
    assert_eq!(bulletin.subtype(), 255);
    assert_eq!(bulletin.datadesc().len(), 11);
    assert!(!bulletin.has_check_digit());

    Validator::new(PATH).validate(&bulletin);
}

#[test]
fn decode_slice_check_digit() {
    const PATH: &str = "fixtures/check-digit.crex";
    let data = std::fs::read(PATH).unwrap();
    let bulletin =
        crex::avec::decode_slice(&data, &mut support::tables(), &DecodeOptions::new()).unwrap();

    assert!(bulletin.has_check_digit());
    Validator::new(PATH).validate(&bulletin);
}

#[test]
fn decode_reader_synop() {
    const PATH: &str = "fixtures/synop.crex";
    let mut file = std::fs::File::open(PATH).unwrap();
    let bulletin =
        crex::avec::decode_reader(&mut file, &mut support::tables(), &DecodeOptions::new())
            .unwrap();

    Validator::new(PATH).validate(&bulletin);
}

#[test]
fn decode_reader_check_digit() {
    const PATH: &str = "fixtures/check-digit.crex";
    let mut file = std::fs::File::open(PATH).unwrap();
    let bulletin =
        crex::avec::decode_reader(&mut file, &mut support::tables(), &DecodeOptions::new())
            .unwrap();

    Validator::new(PATH).validate(&bulletin);
}

#[test]
fn decode_all_stream() {
    const PATH: &str = "fixtures/stream.crex";
    let data = std::fs::read(PATH).unwrap();
    let mut file = std::fs::File::open(PATH).unwrap();
    let options = DecodeOptions::new().with_fname(PATH).with_offset(100);
    let bulletins = crex::avec::decode_all(&mut file, &mut support::tables(), &options).unwrap();

    assert_eq!(bulletins.len(), 2);

    let offsets: Vec<_> = messages(&data).map(|(offset, _)| offset + 100).collect();
    assert_eq!(offsets, [bulletins[0].offset(), bulletins[1].offset()]);
    assert_eq!(&data[offsets[1] - 100..][..6], b"CREX++");

    Validator::new("fixtures/check-digit.crex").validate(&bulletins[0]);
    Validator::new(PATH).validate(&bulletins[1]);

    assert_eq!(bulletins[1].edition(), 2);
    assert_eq!(bulletins[1].category(), 12);
}

#[test]
fn messages_end_after_terminator() {
    let data = std::fs::read("fixtures/stream.crex").unwrap();

    for (_, message) in messages(&data) {
        assert!(message.starts_with(b"CREX++"));
        assert!(message.ends_with(b"7777"));
    }
}

/// Compares decoded subsets with a CSV file holding one row per subset, of
/// alternating descriptors and formatted values.
struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let expected: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(expected)
    }

    fn validate(self, bulletin: &Bulletin) {
        assert_eq!(bulletin.subsets().len(), self.0.len());

        for (subset, expected) in bulletin.subsets().iter().zip(self.0) {
            let found: Vec<String> = subset
                .iter()
                .flat_map(|var| [var.code().to_string(), var.format("None")])
                .collect();

            assert_eq!(found, expected);
        }
    }
}
