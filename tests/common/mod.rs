//! Builders for InterOp files used by the integration tests.

#![allow(dead_code)]

use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

/// `[version][record_size]`
pub fn header(version: u8, record_size: u8) -> Vec<u8> {
    vec![version, record_size]
}

/// `[version][bin_count][{value, lower, upper}...]`
pub fn binned_header(version: u8, bins: &[(u16, u16, u16)]) -> Vec<u8> {
    let mut out = vec![version, u8::try_from(bins.len()).unwrap()];
    for &(value, lower, upper) in bins {
        out.write_u16::<LittleEndian>(value).unwrap();
        out.write_u16::<LittleEndian>(lower).unwrap();
        out.write_u16::<LittleEndian>(upper).unwrap();
    }
    out
}

fn ltc(out: &mut Vec<u8>, lane: u16, tile: u16, third: u16) {
    out.write_u16::<LittleEndian>(lane).unwrap();
    out.write_u16::<LittleEndian>(tile).unwrap();
    out.write_u16::<LittleEndian>(third).unwrap();
}

pub fn tile_record(out: &mut Vec<u8>, lane: u16, tile: u16, code: u16, value: f32) {
    ltc(out, lane, tile, code);
    out.write_f32::<LittleEndian>(value).unwrap();
}

pub fn error_record(out: &mut Vec<u8>, lane: u16, tile: u16, cycle: u16, rate: f32) {
    ltc(out, lane, tile, cycle);
    out.write_f32::<LittleEndian>(rate).unwrap();
    for count in [100, 5, 1, 0, 0] {
        out.write_u32::<LittleEndian>(count).unwrap();
    }
}

pub fn q_record(out: &mut Vec<u8>, lane: u16, tile: u16, cycle: u16, hist: &[u32]) {
    ltc(out, lane, tile, cycle);
    for &count in hist {
        out.write_u32::<LittleEndian>(count).unwrap();
    }
}

pub fn index_record(
    out: &mut Vec<u8>,
    (lane, tile, read): (u16, u16, u16),
    index_seq: &str,
    clusters: u32,
    sample: &str,
    project: &str,
) {
    ltc(out, lane, tile, read);
    write_str(out, index_seq);
    out.write_u32::<LittleEndian>(clusters).unwrap();
    write_str(out, sample);
    write_str(out, project);
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.write_u16::<LittleEndian>(u16::try_from(s.len()).unwrap())
        .unwrap();
    out.extend_from_slice(s.as_bytes());
}

/// Uncompressed histogram with `count` bases at each `(qscore, count)`
pub fn raw_hist(counts: &[(usize, u32)]) -> Vec<u32> {
    let mut hist = vec![0; 50];
    for &(q, count) in counts {
        hist[q - 1] = count;
    }
    hist
}

/// A tile file: lane 1 tiles 1101 and 2101, lane 2 tile 1101
pub fn tile_file() -> Vec<u8> {
    let mut out = header(2, 10);
    for (lane, tile, density, count, count_pf) in [
        (1, 1101, 200.0, 1000.0, 800.0),
        (1, 2101, 300.0, 1000.0, 900.0),
        (2, 1101, 250.0, 2000.0, 1000.0),
    ] {
        tile_record(&mut out, lane, tile, 100, density);
        tile_record(&mut out, lane, tile, 101, density * 0.8);
        tile_record(&mut out, lane, tile, 102, count);
        tile_record(&mut out, lane, tile, 103, count_pf);
        tile_record(&mut out, lane, tile, 200, 0.001);
        tile_record(&mut out, lane, tile, 300, 90.0);
    }
    out
}

/// An uncompressed q-score file: two tiles of lane 1 over two cycles
pub fn q_file() -> Vec<u8> {
    let mut out = header(4, 206);
    q_record(&mut out, 1, 1101, 1, &raw_hist(&[(30, 10), (20, 5)]));
    q_record(&mut out, 1, 1102, 1, &raw_hist(&[(30, 30)]));
    q_record(&mut out, 1, 1101, 2, &raw_hist(&[(10, 8)]));
    q_record(&mut out, 1, 1102, 2, &raw_hist(&[(10, 2)]));
    out
}

/// Write a run folder with the given files under `InterOp/`
pub fn write_run(dir: &Path, files: &[(&str, Vec<u8>)]) {
    let interop = dir.join("InterOp");
    std::fs::create_dir_all(&interop).unwrap();
    for (name, bytes) in files {
        std::fs::write(interop.join(name), bytes).unwrap();
    }
}
