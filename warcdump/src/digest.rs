use std::io::{self, BufRead};

use data_encoding::BASE32;

pub trait Digester: Sized + Default {
    type Digest: Eq + Clone;

    /// Collect data from a record body and accumulate it into the digest.
    fn handle_data(&mut self, data: &[u8]);
    /// Compute the final digest from any accumulated data.
    fn finalize(self) -> Self::Digest;

    /// Write a digest as a `labelled-digest` as specified by WARC 1.1 section 5.8.
    fn format_digest(digest: &Self::Digest) -> String;

    /// Compute the digest of everything remaining in `input`.
    fn digest_reader<R: BufRead>(input: &mut R) -> io::Result<Self::Digest> {
        let mut digester = Self::default();

        loop {
            // Digest the input's own buffer to avoid copying it into ours
            let n = {
                let buf = input.fill_buf()?;
                if buf.is_empty() {
                    break;
                }
                digester.handle_data(buf);
                buf.len()
            };
            input.consume(n);
        }
        Ok(digester.finalize())
    }
}

/// A digester computing the SHA-1 hash of content.
///
/// The output digests are base32-encoded (RFC 4648) as suggested by sections
/// 5.8 and 5.9 of the WARC 1.1 specification.
#[derive(Default)]
pub struct Sha1Digester {
    hasher: sha1::Sha1,
}

impl Digester for Sha1Digester {
    type Digest = [u8; 20];

    fn handle_data(&mut self, data: &[u8]) {
        use sha1::Digest;

        self.hasher.update(data)
    }

    fn finalize(self) -> Self::Digest {
        use sha1::Digest;

        let mut out = [0u8; 20];
        out.copy_from_slice(self.hasher.finalize().as_slice());
        out
    }

    fn format_digest(digest: &Self::Digest) -> String {
        let digest_len = BASE32.encode_len(digest.len());
        let mut out = String::with_capacity(5 + digest_len);
        let initial_capacity = out.capacity();

        out += "sha1:";
        BASE32.encode_append(&digest[..], &mut out);
        debug_assert_eq!(initial_capacity, out.len());

        out
    }
}

/// Compare a computed labelled digest with one declared by a record.
///
/// Algorithm labels are case-insensitive and base32 is written in either case in the wild, so
/// the comparison ignores ASCII case and surrounding whitespace.
pub fn digests_match(declared: &str, computed: &str) -> bool {
    declared.trim().eq_ignore_ascii_case(computed)
}
