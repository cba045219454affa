//! PSSH box parsing and manifest scanning.
//!
//! A `pssh` box is an ISO-BMFF full box:
//!
//! ```text
//! size:u32  type:"pssh"  version:u8  flags:u24  system_id:[u8;16]
//! (version > 0) kid_count:u32  kids:[[u8;16]; kid_count]
//! data_size:u32  data:[u8; data_size]
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use crate::error::{Error, Result};

/// Widevine system id `edef8ba9-79d6-4ace-a3c8-27dcd51d21ed`.
pub const WIDEVINE_SYSTEM_ID: [u8; 16] = [
    0xed, 0xef, 0x8b, 0xa9, 0x79, 0xd6, 0x4a, 0xce, 0xa3, 0xc8, 0x27, 0xdc, 0xd5, 0x1d, 0x21, 0xed,
];

/// A parsed protection system specific header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsshBox {
    pub version: u8,
    pub flags: u32,
    pub system_id: [u8; 16],
    pub key_ids: Vec<[u8; 16]>,
    /// System specific payload (the Widevine init data).
    pub data: Vec<u8>,
}

impl PsshBox {
    /// Parse a single `pssh` box. Trailing bytes beyond the declared size are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = BoxReader::new(bytes);

        let size = reader.u32()? as u64;
        let box_type = reader.take(4)?;
        if box_type != b"pssh" {
            return Err(Error::InvalidPssh(format!(
                "expected 'pssh' box, found '{}'",
                String::from_utf8_lossy(box_type)
            )));
        }

        let size = match size {
            1 => reader.u64()?,
            0 => bytes.len() as u64,
            n => n,
        };
        if size > bytes.len() as u64 {
            return Err(Error::InvalidPssh(format!(
                "box declares {} bytes but only {} available",
                size,
                bytes.len()
            )));
        }
        reader.limit(size as usize);

        let version = reader.u8()?;
        let flags_bytes = reader.take(3)?;
        let flags = u32::from_be_bytes([0, flags_bytes[0], flags_bytes[1], flags_bytes[2]]);

        let mut system_id = [0u8; 16];
        system_id.copy_from_slice(reader.take(16)?);

        let mut key_ids = Vec::new();
        if version > 0 {
            let count = reader.u32()?;
            for _ in 0..count {
                let mut kid = [0u8; 16];
                kid.copy_from_slice(reader.take(16)?);
                key_ids.push(kid);
            }
        }

        let data_size = reader.u32()? as usize;
        let data = reader.take(data_size)?.to_vec();

        Ok(Self {
            version,
            flags,
            system_id,
            key_ids,
            data,
        })
    }

    pub fn is_widevine(&self) -> bool {
        self.system_id == WIDEVINE_SYSTEM_ID
    }
}

/// Bounds-checked big-endian reader over a box.
struct BoxReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> BoxReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            end: bytes.len(),
        }
    }

    fn limit(&mut self, end: usize) {
        self.end = end.min(self.bytes.len());
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let stop = self
            .pos
            .checked_add(n)
            .filter(|&stop| stop <= self.end)
            .ok_or_else(|| {
                Error::InvalidPssh(format!(
                    "truncated box: need {} bytes at offset {}, box ends at {}",
                    n, self.pos, self.end
                ))
            })?;
        let slice = &self.bytes[self.pos..stop];
        self.pos = stop;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_be_bytes(buf))
    }
}

/// Find the Widevine PSSH box in a DASH manifest.
///
/// Every `<pssh>` element (any namespace prefix) is decoded and parsed; the
/// first box carrying the Widevine system id wins. Entries that are not valid
/// base64 or not valid boxes are skipped.
pub fn find_widevine_pssh(manifest: &str) -> Result<PsshBox> {
    let pattern = Regex::new(r"(?s)<(?:[A-Za-z0-9_]+:)?pssh\b[^>]*>(.*?)</(?:[A-Za-z0-9_]+:)?pssh>")
        .map_err(|e| Error::DrmExtraction(format!("invalid pattern: {}", e)))?;

    let mut seen = 0usize;
    for captures in pattern.captures_iter(manifest) {
        seen += 1;
        let Some(text) = captures.get(1) else {
            continue;
        };
        let encoded: String = text
            .as_str()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let bytes = match STANDARD.decode(encoded.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Skipping undecodable pssh element: {}", e);
                continue;
            }
        };

        match PsshBox::parse(&bytes) {
            Ok(pssh) if pssh.is_widevine() => return Ok(pssh),
            Ok(pssh) => {
                tracing::debug!(
                    "Skipping pssh for system {}",
                    hex::encode(pssh.system_id)
                );
            }
            Err(e) => tracing::debug!("Skipping malformed pssh element: {}", e),
        }
    }

    Err(Error::DrmExtraction(format!(
        "{} pssh element(s) scanned, none for system edef8ba9-79d6-4ace-a3c8-27dcd51d21ed",
        seen
    )))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a pssh box for tests.
    pub(crate) fn build_pssh(version: u8, system_id: [u8; 16], kids: &[[u8; 16]], data: &[u8]) -> Vec<u8> {
        let mut body = vec![version, 0, 0, 0];
        body.extend_from_slice(&system_id);
        if version > 0 {
            body.extend_from_slice(&(kids.len() as u32).to_be_bytes());
            for kid in kids {
                body.extend_from_slice(kid);
            }
        }
        body.extend_from_slice(&(data.len() as u32).to_be_bytes());
        body.extend_from_slice(data);

        let mut out = ((body.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(b"pssh");
        out.extend_from_slice(&body);
        out
    }

    const PLAYREADY: [u8; 16] = [
        0x9a, 0x04, 0xf0, 0x79, 0x98, 0x40, 0x42, 0x86, 0xab, 0x92, 0xe6, 0x5b, 0xe0, 0x88, 0x5f,
        0x95,
    ];

    #[test]
    fn test_parse_v0() {
        let raw = build_pssh(0, WIDEVINE_SYSTEM_ID, &[], b"\x08\x01\x12\x10init");
        let pssh = PsshBox::parse(&raw).unwrap();
        assert_eq!(pssh.version, 0);
        assert!(pssh.is_widevine());
        assert!(pssh.key_ids.is_empty());
        assert_eq!(pssh.data, b"\x08\x01\x12\x10init");
    }

    #[test]
    fn test_parse_v1_with_kids() {
        let kid = [7u8; 16];
        let raw = build_pssh(1, WIDEVINE_SYSTEM_ID, &[kid], b"data");
        let pssh = PsshBox::parse(&raw).unwrap();
        assert_eq!(pssh.version, 1);
        assert_eq!(pssh.key_ids, vec![kid]);
        assert_eq!(pssh.data, b"data");
    }

    #[test]
    fn test_truncated_box() {
        let raw = build_pssh(0, WIDEVINE_SYSTEM_ID, &[], b"abcdef");
        assert!(matches!(
            PsshBox::parse(&raw[..raw.len() - 2]),
            Err(Error::InvalidPssh(_))
        ));

        // data_size pointing past the declared box size
        let mut lying = raw.clone();
        let n = lying.len();
        lying[n - 7] = 0xff;
        assert!(PsshBox::parse(&lying).is_err());
    }

    #[test]
    fn test_wrong_box_type() {
        let mut raw = build_pssh(0, WIDEVINE_SYSTEM_ID, &[], b"x");
        raw[4..8].copy_from_slice(b"moov");
        assert!(matches!(
            PsshBox::parse(&raw),
            Err(Error::InvalidPssh(_))
        ));
    }

    fn manifest(psshs: &[Vec<u8>]) -> String {
        let mut protections = String::new();
        for raw in psshs {
            protections.push_str(&format!(
                "<ContentProtection schemeIdUri=\"urn:uuid:x\">\n  <cenc:pssh>\n{}\n  </cenc:pssh>\n</ContentProtection>\n",
                STANDARD.encode(raw)
            ));
        }
        format!(
            "<?xml version=\"1.0\"?>\n<MPD xmlns:cenc=\"urn:mpeg:cenc:2013\"><Period><AdaptationSet>\n{}</AdaptationSet></Period></MPD>",
            protections
        )
    }

    #[test]
    fn test_find_widevine_among_others() {
        let playready = build_pssh(0, PLAYREADY, &[], b"playready");
        let widevine = build_pssh(0, WIDEVINE_SYSTEM_ID, &[], b"widevine");
        let mpd = manifest(&[playready, widevine]);

        let pssh = find_widevine_pssh(&mpd).unwrap();
        assert_eq!(pssh.data, b"widevine");
    }

    #[test]
    fn test_missing_widevine_is_typed_error() {
        let playready = build_pssh(0, PLAYREADY, &[], b"playready");
        let mpd = manifest(&[playready]);
        assert!(matches!(
            find_widevine_pssh(&mpd),
            Err(Error::DrmExtraction(_))
        ));

        assert!(matches!(
            find_widevine_pssh("<MPD></MPD>"),
            Err(Error::DrmExtraction(_))
        ));
    }

    #[test]
    fn test_garbage_pssh_is_skipped() {
        let widevine = build_pssh(0, WIDEVINE_SYSTEM_ID, &[], b"wv");
        let mpd = format!(
            "<cenc:pssh>!!not base64!!</cenc:pssh><pssh>{}</pssh>",
            STANDARD.encode(widevine)
        );
        assert_eq!(find_widevine_pssh(&mpd).unwrap().data, b"wv");
    }
}
