//! Byte-level fixture builders shared by the unit and integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::TrackError;
use crate::library::{Track, TrackFactory, TrackSource};

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no CRC, no padding
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const FRAME_LEN: usize = 417;
const FRAME_COUNT: usize = 8;

fn mpeg_frames() -> Vec<u8> {
    let mut frames = Vec::with_capacity(FRAME_LEN * FRAME_COUNT);
    for _ in 0..FRAME_COUNT {
        frames.extend_from_slice(&FRAME_HEADER);
        frames.extend(std::iter::repeat(0u8).take(FRAME_LEN - FRAME_HEADER.len()));
    }
    frames
}

fn syncsafe(size: usize) -> [u8; 4] {
    [
        ((size >> 21) & 0x7F) as u8,
        ((size >> 14) & 0x7F) as u8,
        ((size >> 7) & 0x7F) as u8,
        (size & 0x7F) as u8,
    ]
}

/// An ID3v2.3 tag holding latin-1 TIT2/TPE1/TALB frames
pub fn id3v2_tag(title: Option<&str>, artist: Option<&str>, album: Option<&str>) -> Vec<u8> {
    let mut frames = Vec::new();
    for (id, value) in [(b"TIT2", title), (b"TPE1", artist), (b"TALB", album)] {
        if let Some(value) = value {
            let body_len = value.len() + 1;
            frames.extend_from_slice(id);
            frames.extend_from_slice(&(body_len as u32).to_be_bytes());
            frames.extend_from_slice(&[0, 0]);
            frames.push(0); // ISO-8859-1
            frames.extend_from_slice(value.as_bytes());
        }
    }

    let mut tag = Vec::with_capacity(10 + frames.len());
    tag.extend_from_slice(b"ID3");
    tag.extend_from_slice(&[3, 0, 0]);
    tag.extend_from_slice(&syncsafe(frames.len()));
    tag.extend_from_slice(&frames);
    tag
}

/// A 128-byte ID3v1 tag
pub fn id3v1_tag(title: &str, artist: &str, album: &str) -> Vec<u8> {
    fn field(value: &str, len: usize) -> Vec<u8> {
        let mut bytes: Vec<u8> = value.bytes().take(len).collect();
        bytes.resize(len, 0);
        bytes
    }

    let mut tag = Vec::with_capacity(128);
    tag.extend_from_slice(b"TAG");
    tag.extend(field(title, 30));
    tag.extend(field(artist, 30));
    tag.extend(field(album, 30));
    tag.extend(field("2001", 4));
    tag.extend(field("", 30));
    tag.push(255);
    tag
}

/// Write an MP3 with an optional ID3v2 tag in front and ID3v1 tag at the end
pub fn write_mp3(
    dir: &Path,
    file_name: &str,
    v2: Option<(Option<&str>, Option<&str>, Option<&str>)>,
    v1: Option<(&str, &str, &str)>,
) -> PathBuf {
    let mut bytes = Vec::new();
    if let Some((title, artist, album)) = v2 {
        bytes.extend(id3v2_tag(title, artist, album));
    }
    bytes.extend(mpeg_frames());
    if let Some((title, artist, album)) = v1 {
        bytes.extend(id3v1_tag(title, artist, album));
    }

    let path = dir.join(file_name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Write an MP3 fully tagged through ID3v2
pub fn write_tagged_mp3(dir: &Path, file_name: &str, title: &str, artist: &str, album: &str) -> PathBuf {
    write_mp3(dir, file_name, Some((Some(title), Some(artist), Some(album))), None)
}

/// Write an untagged MP3
pub fn write_bare_mp3(dir: &Path, file_name: &str) -> PathBuf {
    write_mp3(dir, file_name, None, None)
}

fn atom(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut atom = Vec::with_capacity(8 + body.len());
    atom.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
    atom.extend_from_slice(kind);
    atom.extend_from_slice(body);
    atom
}

/// An atom with a version byte and 24-bit flags ahead of its body
fn full_atom(kind: &[u8; 4], flags: u32, body: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(4 + body.len());
    full.extend_from_slice(&(flags & 0x00FF_FFFF).to_be_bytes());
    full.extend_from_slice(body);
    atom(kind, &full)
}

fn be32(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

const UNITY_MATRIX: [u32; 9] = [0x0001_0000, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000];
const MDAT_PAYLOAD: usize = 64;

/// One audio track whose single chunk starts at `chunk_offset`
fn sound_trak(chunk_offset: u32) -> Vec<u8> {
    let mut tkhd = be32(&[0, 0, 1, 0, 0, 0, 0]);
    tkhd.extend_from_slice(&[0, 0, 0, 0, 0x01, 0x00, 0, 0]);
    tkhd.extend(be32(&UNITY_MATRIX));
    tkhd.extend(be32(&[0, 0]));

    let mut mdhd = be32(&[0, 0, 44_100, 0]);
    mdhd.extend_from_slice(&[0x55, 0xC4, 0, 0]);

    let mut hdlr = be32(&[0]);
    hdlr.extend_from_slice(b"soun");
    hdlr.extend_from_slice(&[0; 12]);
    hdlr.extend_from_slice(b"SoundHandler\0");

    let mut mp4a = vec![0; 6];
    mp4a.extend_from_slice(&[0, 1]);
    mp4a.extend_from_slice(&[0; 8]);
    mp4a.extend_from_slice(&[0, 2, 0, 16, 0, 0, 0, 0]);
    mp4a.extend(be32(&[44_100 << 16]));
    let mut stsd = be32(&[1]);
    stsd.extend(atom(b"mp4a", &mp4a));

    let stbl = [
        full_atom(b"stsd", 0, &stsd),
        full_atom(b"stts", 0, &be32(&[0])),
        full_atom(b"stsc", 0, &be32(&[0])),
        full_atom(b"stsz", 0, &be32(&[0, 0])),
        full_atom(b"stco", 0, &be32(&[1, chunk_offset])),
    ]
    .concat();
    let minf = [full_atom(b"smhd", 0, &[0; 4]), atom(b"stbl", &stbl)].concat();
    let mdia = [
        full_atom(b"mdhd", 0, &mdhd),
        full_atom(b"hdlr", 0, &hdlr),
        atom(b"minf", &minf),
    ]
    .concat();

    atom(b"trak", &[full_atom(b"tkhd", 0x07, &tkhd), atom(b"mdia", &mdia)].concat())
}

/// `udta.meta.ilst` holding UTF-8 title, artist and album items
fn ilst_udta(title: &str, artist: &str, album: &str) -> Vec<u8> {
    let mut items = Vec::new();
    for (kind, value) in [(b"\xA9nam", title), (b"\xA9ART", artist), (b"\xA9alb", album)] {
        let mut data = be32(&[1, 0]);
        data.extend_from_slice(value.as_bytes());
        items.extend(atom(kind, &atom(b"data", &data)));
    }

    let mut hdlr = be32(&[0]);
    hdlr.extend_from_slice(b"mdir");
    hdlr.extend_from_slice(b"appl");
    hdlr.extend_from_slice(&[0; 8]);
    hdlr.push(0);

    let meta = full_atom(b"meta", 0, &[full_atom(b"hdlr", 0, &hdlr), atom(b"ilst", &items)].concat());
    atom(b"udta", &meta)
}

fn moov(chunk_offset: u32, tags: Option<(&str, &str, &str)>) -> Vec<u8> {
    let mut mvhd = be32(&[0, 0, 1000, 0, 0x0001_0000]);
    mvhd.extend_from_slice(&[0x01, 0x00]);
    mvhd.extend_from_slice(&[0; 10]);
    mvhd.extend(be32(&UNITY_MATRIX));
    mvhd.extend_from_slice(&[0; 24]);
    mvhd.extend(be32(&[2]));

    let mut body = full_atom(b"mvhd", 0, &mvhd);
    body.extend(sound_trak(chunk_offset));
    if let Some((title, artist, album)) = tags {
        body.extend(ilst_udta(title, artist, album));
    }
    atom(b"moov", &body)
}

/// Write an M4A (ftyp, moov with one sound trak, mdat), optionally carrying
/// an iTunes-style tag
pub fn write_m4a(dir: &Path, file_name: &str, tags: Option<(&str, &str, &str)>) -> PathBuf {
    let mut ftyp = b"M4A ".to_vec();
    ftyp.extend(be32(&[0x200]));
    ftyp.extend_from_slice(b"M4A mp42isom");
    let ftyp = atom(b"ftyp", &ftyp);

    let moov_len = moov(0, tags).len();
    let chunk_offset = (ftyp.len() + moov_len + 8) as u32;

    let mut bytes = ftyp;
    bytes.extend(moov(chunk_offset, tags));
    bytes.extend(atom(b"mdat", &[0; MDAT_PAYLOAD]));

    let path = dir.join(file_name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Write a file whose body is not a valid container
pub fn write_garbage(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, b"definitely not audio data").unwrap();
    path
}

/// Sleeps on files whose stem starts with "slow" so batches can be pushed
/// past their deadline
pub struct SlowSource {
    delay: Duration,
}

impl SlowSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl TrackSource for SlowSource {
    fn create(&self, path: &Path) -> Result<Track, TrackError> {
        let slow = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.starts_with("slow"))
            .unwrap_or(false);
        if slow {
            thread::sleep(self.delay);
        }
        TrackFactory::create(path)
    }
}
