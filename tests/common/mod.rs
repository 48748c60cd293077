#![allow(dead_code)]

use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const NFDB_HEADER: &str = "NFDBFIREID,FIRE_ID,FIRENAME,SRC_AGENCY,RESPONSE,YEAR,MONTH,DAY,REP_DATE,ATTK_DATE,OUT_DATE,ACQ_DATE,CAUSE,CAUSE2,FIRE_TYPE,SIZE_HA,PRESCRIBED,NAT_PARK,PROTZONE,MORE_INFO,CFS_NOTE1,CFS_NOTE2,LATITUDE,LONGITUDE";

/// Three Quebec fires: one fully dated, one with placeholder dates, one with
/// blank dates.
pub fn sample_fire_rows() -> Vec<&'static str> {
    vec![
        "A001,QC2023_001,Rouge,SOPFEU,Full,2023,6,12,2023/06/12,2023/06/13,2023/06/20,2023/06/25,Lightning,,WF,1220.5,False,,Z1,,,,48.25,-70.1",
        "A002,QC2023_002,Bleu,SOPFEU,Monitor,2023,7,1,0000/00/00,0000/00/00,0000/00/00,2023-07-15,Campfire,,WF,2.0,False,La Mauricie,Z2,,,,47.7,-72.5",
        "A003,QC2023_003,Vert,SOPFEU,Full,2023,8,5,,,,,Debris burning,,WF,15.0,False,,Z3,,,,49.0,-71.0",
    ]
}

pub fn nfdb_text(rows: &[&str]) -> String {
    let mut text = String::from(NFDB_HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

/// Packs `text` into an in-memory NFDB style archive next to a readme.
pub fn nfdb_archive(text: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("README.pdf", FileOptions::default())
        .unwrap();
    zip.write_all(b"%PDF-1.4").unwrap();

    zip.start_file::<_, ()>("NFDB_point_20240613.txt", FileOptions::default())
        .unwrap();
    zip.write_all(text.as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

pub fn sample_archive() -> Vec<u8> {
    nfdb_archive(&nfdb_text(&sample_fire_rows()))
}
