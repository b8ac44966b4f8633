#![allow(dead_code)]

use crex::{
    Varcode,
    table::{MemoryTables, TableSet, TableVersion},
    value::Varinfo,
};

pub const T000103: TableVersion = TableVersion {
    master_table_number: 0,
    edition: 1,
    table: 3,
};

pub const T000201: TableVersion = TableVersion {
    master_table_number: 0,
    edition: 2,
    table: 1,
};

/// Parse a descriptor written as in CREX, such as `B12101`.
pub fn code(token: &str) -> Varcode {
    Varcode::parse(token.as_bytes().try_into().unwrap()).unwrap()
}

/// A small subset of table B and D, installed for two table versions.
pub fn tables() -> MemoryTables {
    let set = TableSet::new()
        .with_element(Varinfo::integer(code("B01001"), 2, "NUMERIC", "WMO BLOCK NUMBER"))
        .with_element(Varinfo::integer(code("B01002"), 3, "NUMERIC", "WMO STATION NUMBER"))
        .with_element(Varinfo::string(code("B01015"), 20, "STATION OR SITE NAME"))
        .with_element(Varinfo::integer(code("B04001"), 4, "YEAR", "YEAR"))
        .with_element(Varinfo::integer(code("B04002"), 2, "MONTH", "MONTH"))
        .with_element(Varinfo::integer(code("B04003"), 2, "DAY", "DAY"))
        .with_element(Varinfo::integer(code("B04004"), 2, "HOUR", "HOUR"))
        .with_element(Varinfo::decimal(code("B05001"), 7, 5, "DEGREE", "LATITUDE (HIGH ACCURACY)"))
        .with_element(Varinfo::decimal(code("B06001"), 8, 5, "DEGREE", "LONGITUDE (HIGH ACCURACY)"))
        .with_element(Varinfo::decimal(code("B12101"), 4, 2, "C", "TEMPERATURE/AIR TEMPERATURE"))
        .with_element(Varinfo::integer(
            code("B31001"),
            3,
            "NUMERIC",
            "DELAYED DESCRIPTOR REPLICATION FACTOR",
        ))
        .with_element(Varinfo::binary(code("B33002"), 2, "QUALITY INFORMATION"))
        .with_sequence(code("D01001"), [code("B01001"), code("B01002")]);

    MemoryTables::new()
        .with(T000103, set.clone())
        .with(T000201, set)
}
