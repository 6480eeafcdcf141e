//! Hand-assembled little-endian fragments for building test streams.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

pub const QM7_TEXT: &str = "MATLAB 5.0 MAT-file, Platform: posix, Created on: Mon Feb 18 17:12:08 2013";

pub const MI_INT8: u32 = 1;
pub const MI_UINT8: u32 = 2;
pub const MI_INT16: u32 = 3;
pub const MI_INT32: u32 = 5;
pub const MI_UINT32: u32 = 6;
pub const MI_DOUBLE: u32 = 9;
pub const MI_MATRIX: u32 = 14;
pub const MI_COMPRESSED: u32 = 15;
pub const MI_UTF8: u32 = 16;

pub fn qm7_created() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2013, 2, 18)
        .unwrap()
        .and_hms_opt(17, 12, 8)
        .unwrap()
}

/// 128-byte header with the given text and endian indicator.
pub fn raw_header(text: &str, marker: &[u8; 2]) -> Vec<u8> {
    let mut buf = vec![b' '; 128];
    buf[..text.len()].copy_from_slice(text.as_bytes());
    buf[116..124].fill(0);
    if marker == b"MI" {
        buf[124..126].copy_from_slice(&[0x01, 0x00]);
    } else {
        buf[124..126].copy_from_slice(&[0x00, 0x01]);
    }
    buf[126..].copy_from_slice(marker);
    buf
}

pub fn tag_le(data_type: u32, length: u32) -> Vec<u8> {
    let mut out = data_type.to_le_bytes().to_vec();
    out.extend_from_slice(&length.to_le_bytes());
    out
}

pub fn small_le(data_type: u32, payload: &[u8]) -> Vec<u8> {
    assert!(!payload.is_empty() && payload.len() <= 4);
    let word = ((payload.len() as u32) << 16) | data_type;
    let mut out = word.to_le_bytes().to_vec();
    let mut inline = [0u8; 4];
    inline[..payload.len()].copy_from_slice(payload);
    out.extend_from_slice(&inline);
    out
}

/// Regular tag, payload and zero padding.
pub fn element_le(data_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = tag_le(data_type, payload.len() as u32);
    out.extend_from_slice(payload);
    while out.len() % 8 != 0 {
        out.push(0);
    }
    out
}

pub fn u32s_le(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn i32s_le(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn f64s_le(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// miMATRIX element assembled from already framed sub-elements.
pub fn matrix_le(parts: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = parts.concat();
    let mut out = tag_le(MI_MATRIX, payload.len() as u32);
    out.extend_from_slice(&payload);
    out
}

/// Array flags sub-element for a class code and flag bits.
pub fn flags_le(class: u32, bits: u32) -> Vec<u8> {
    element_le(MI_UINT32, &u32s_le(&[class | bits, 0]))
}

pub fn dims_le(dims: &[i32]) -> Vec<u8> {
    element_le(MI_INT32, &i32s_le(dims))
}

pub fn name_le(name: &str) -> Vec<u8> {
    if (1..=4).contains(&name.len()) {
        small_le(MI_INT8, name.as_bytes())
    } else {
        element_le(MI_INT8, name.as_bytes())
    }
}
