//! In-memory TZif files for tests
use std::path::Path;

/// Builds the bytes of a TZif file. Times and offsets are in seconds,
/// as they are stored on disk.
#[derive(Debug, Clone)]
pub(crate) struct TzifBuilder {
    version: u8,
    types: Vec<(i32, bool)>,
    transitions: Vec<(i64, u8)>,
    leapcnt: usize,
    footer: Option<String>,
}

const DESIGNATIONS: &[u8] = b"LMT\0";

impl TzifBuilder {
    pub(crate) fn new() -> Self {
        Self {
            version: b'2',
            types: Vec::new(),
            transitions: Vec::new(),
            leapcnt: 0,
            footer: None,
        }
    }

    /// `0` for a v1 file, otherwise the ASCII version digit
    pub(crate) fn version(mut self, v: u8) -> Self {
        self.version = v;
        self
    }

    pub(crate) fn local_type(mut self, utoff: i32, is_dst: bool) -> Self {
        self.types.push((utoff, is_dst));
        self
    }

    pub(crate) fn transition(mut self, at: i64, type_idx: u8) -> Self {
        self.transitions.push((at, type_idx));
        self
    }

    pub(crate) fn footer(mut self, tz: &str) -> Self {
        self.footer = Some(tz.to_string());
        self
    }

    pub(crate) fn with_leap_records(mut self, n: usize) -> Self {
        self.leapcnt = n;
        self
    }

    fn header(&self, out: &mut Vec<u8>, timecnt: usize) {
        out.extend_from_slice(b"TZif");
        out.push(self.version);
        out.extend_from_slice(&[0; 15]);
        let typecnt = self.types.len();
        for n in [
            typecnt, // isutcnt
            typecnt, // isstdcnt
            self.leapcnt,
            timecnt,
            typecnt,
            DESIGNATIONS.len(),
        ] {
            out.extend_from_slice(&(n as u32).to_be_bytes());
        }
    }

    fn block(&self, out: &mut Vec<u8>, wide: bool) {
        for &(at, _) in &self.transitions {
            if wide {
                out.extend_from_slice(&at.to_be_bytes());
            } else {
                out.extend_from_slice(&(at as i32).to_be_bytes());
            }
        }
        out.extend(self.transitions.iter().map(|&(_, idx)| idx));
        for &(utoff, is_dst) in &self.types {
            out.extend_from_slice(&utoff.to_be_bytes());
            out.push(is_dst as u8);
            out.push(0);
        }
        out.extend_from_slice(DESIGNATIONS);
        for i in 0..self.leapcnt {
            let at = 78_796_800 + i as i64 * 15_897_600;
            if wide {
                out.extend_from_slice(&at.to_be_bytes());
            } else {
                out.extend_from_slice(&(at as i32).to_be_bytes());
            }
            out.extend_from_slice(&(i as i32 + 1).to_be_bytes());
        }
        // std/wall and ut/local indicators
        out.extend(std::iter::repeat_n(0, self.types.len() * 2));
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.version == 0 {
            self.header(&mut out, self.transitions.len());
            self.block(&mut out, false);
            return out;
        }
        // A v1 block without transitions, which readers of v2+ skip
        let v1 = Self {
            transitions: Vec::new(),
            ..self.clone()
        };
        v1.header(&mut out, 0);
        v1.block(&mut out, false);
        self.header(&mut out, self.transitions.len());
        self.block(&mut out, true);
        out.push(b'\n');
        if let Some(footer) = &self.footer {
            out.extend_from_slice(footer.as_bytes());
        }
        out.push(b'\n');
        out
    }

    pub(crate) fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}
